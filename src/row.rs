//! Header-indexed rows with copy-on-write field storage.
//!
//! A [`Row`] starts out as a view over the reader's reusable record buffer.
//! Reads never allocate. The first [`Row::set_field`] copies every field into
//! a private `Vec<String>`; from then on only that copy is written, so the
//! buffer the reader hands to the next record is never touched.

use csv::StringRecord;

use crate::error::Result;
use crate::header::Header;

#[derive(Debug, Clone)]
enum Fields<'a> {
    /// Borrowed from the reader's read buffer.
    Shared(&'a StringRecord),
    /// Private copy made on the first write.
    Owned(Vec<String>),
}

/// One data record plus the header of the stream it came from.
#[derive(Debug, Clone)]
pub struct Row<'a> {
    header: &'a Header,
    fields: Fields<'a>,
    line: u64,
}

impl<'a> Row<'a> {
    /// Wrap a record read from a stream whose header is `header`.
    ///
    /// The caller guarantees `record.len() == header.len()`.
    pub(crate) fn shared(header: &'a Header, record: &'a StringRecord, line: u64) -> Self {
        Self {
            header,
            fields: Fields::Shared(record),
            line,
        }
    }

    /// Build an owned row from field values, mainly for tests and embedding.
    ///
    /// Returns `None` if the number of values differs from the header width.
    pub fn from_values<I, S>(header: &'a Header, values: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        (values.len() == header.len()).then_some(Self {
            header,
            fields: Fields::Owned(values),
            line: 0,
        })
    }

    /// Value of the column called `name`.
    pub fn field(&self, name: &str) -> Result<&str> {
        let idx = self.header.require(name)?;
        Ok(self.get(idx).unwrap_or_default())
    }

    /// Overwrite the column called `name`.
    ///
    /// An unknown name fails before anything is copied.
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let idx = self.header.require(name)?;
        let value = value.into();
        match &mut self.fields {
            Fields::Owned(values) => {
                if let Some(slot) = values.get_mut(idx) {
                    *slot = value;
                }
            }
            Fields::Shared(record) => {
                let mut values: Vec<String> = record.iter().map(str::to_owned).collect();
                if let Some(slot) = values.get_mut(idx) {
                    *slot = value;
                }
                self.fields = Fields::Owned(values);
            }
        }
        Ok(())
    }

    /// Value at position `idx`.
    pub fn get(&self, idx: usize) -> Option<&str> {
        match &self.fields {
            Fields::Shared(record) => record.get(idx),
            Fields::Owned(values) => values.get(idx).map(String::as_str),
        }
    }

    /// Field values in header order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        (0..self.len()).filter_map(move |idx| self.get(idx))
    }

    pub fn len(&self) -> usize {
        self.header.len()
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_empty()
    }

    pub fn header(&self) -> &'a Header {
        self.header
    }

    /// 1-based record number in the source (the header is record 1).
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Whether this row has made its private copy yet.
    pub fn is_owned(&self) -> bool {
        matches!(self.fields, Fields::Owned(_))
    }

    /// Take the field values, copying them if still shared.
    pub fn into_values(self) -> Vec<String> {
        match self.fields {
            Fields::Shared(record) => record.iter().map(str::to_owned).collect(),
            Fields::Owned(values) => values,
        }
    }
}
