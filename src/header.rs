//! Column names and the name-to-position index built from a header row.

use std::collections::HashMap;

use crate::error::{FilterError, Result};

/// The header of a stream: ordered, unique column names.
///
/// Built once from the first record and shared read-only by every
/// [`Row`](crate::Row) produced from the same stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl Header {
    /// Build a header from the names of the first record.
    ///
    /// Fails with [`FilterError::DuplicateColumn`] naming the first
    /// repeated column.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(names.len());
        for (pos, name) in names.iter().enumerate() {
            if index.insert(name.clone(), pos).is_some() {
                return Err(FilterError::DuplicateColumn { name: name.clone() });
            }
        }
        Ok(Self { names, index })
    }

    /// Position of `name`, if the header has such a column.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Position of `name`, or [`FilterError::FieldNotFound`].
    pub fn require(&self, name: &str) -> Result<usize> {
        self.position(name)
            .ok_or_else(|| FilterError::field_not_found(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Column names in header order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
