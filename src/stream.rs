//! Source and sink interfaces for delimited text, and their `csv` bindings.
//!
//! Tokenizing (quoting, escaping, line endings) is left entirely to the
//! `csv` crate. The driver only needs "give me the next record" and
//! "write this record", plus a final flush.

use std::io::{self, Write};

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};

/// Supplies records one at a time.
pub trait RecordSource {
    /// Read the next record into `buf`, reusing its allocation.
    ///
    /// Returns `Ok(false)` at end of input; every other failure is an error.
    fn read_record(&mut self, buf: &mut StringRecord) -> Result<bool, csv::Error>;
}

/// Accepts records one at a time.
pub trait RecordSink {
    fn write_record<'f, I>(&mut self, fields: I) -> Result<(), csv::Error>
    where
        I: IntoIterator<Item = &'f str>;

    /// Push buffered output to the underlying writer.
    fn flush(&mut self) -> io::Result<()>;
}

impl<T: RecordSource + ?Sized> RecordSource for &mut T {
    fn read_record(&mut self, buf: &mut StringRecord) -> Result<bool, csv::Error> {
        (**self).read_record(buf)
    }
}

impl<T: RecordSink + ?Sized> RecordSink for &mut T {
    fn write_record<'f, I>(&mut self, fields: I) -> Result<(), csv::Error>
    where
        I: IntoIterator<Item = &'f str>,
    {
        (**self).write_record(fields)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

impl<R: io::Read> RecordSource for csv::Reader<R> {
    fn read_record(&mut self, buf: &mut StringRecord) -> Result<bool, csv::Error> {
        csv::Reader::read_record(self, buf)
    }
}

impl<W: io::Write> RecordSink for csv::Writer<W> {
    /// An empty record is written as a bare line terminator.
    ///
    /// `csv::Writer` would write `""` instead, which reads back as a
    /// one-column record.
    fn write_record<'f, I>(&mut self, fields: I) -> Result<(), csv::Error>
    where
        I: IntoIterator<Item = &'f str>,
    {
        let mut fields = fields.into_iter().peekable();
        if fields.peek().is_some() {
            return csv::Writer::write_record(self, fields);
        }
        csv::Writer::flush(self)?;
        self.get_mut().write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        csv::Writer::flush(self)
    }
}

/// Tokenizer settings shared by the reading and writing side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    /// Field separator byte.
    pub delimiter: u8,
    /// Strip leading and trailing whitespace from every field on read.
    pub trim: bool,
    /// Let the tokenizer accept records of varying width.
    ///
    /// Width mismatches against the header are still rejected by
    /// [`HeaderReader`](crate::HeaderReader).
    pub flexible: bool,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            delimiter: b',',
            trim: false,
            flexible: false,
        }
    }
}

impl Dialect {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    pub fn with_flexible(mut self, flexible: bool) -> Self {
        self.flexible = flexible;
        self
    }
}

/// Build a `csv` reader that hands the header row through as a record.
pub fn csv_reader<R: io::Read>(rdr: R, dialect: &Dialect) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(false)
        .delimiter(dialect.delimiter)
        .trim(if dialect.trim { Trim::All } else { Trim::None })
        .flexible(dialect.flexible)
        .from_reader(rdr)
}

/// Build a `csv` writer using the same delimiter as the reader.
pub fn csv_writer<W: io::Write>(wtr: W, dialect: &Dialect) -> csv::Writer<W> {
    WriterBuilder::new()
        .has_headers(false)
        .delimiter(dialect.delimiter)
        .from_writer(wtr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_reader_yields_header_as_record() {
        let mut rdr = csv_reader("a,b\n1,2\n".as_bytes(), &Dialect::default());
        let mut buf = StringRecord::new();
        assert!(RecordSource::read_record(&mut rdr, &mut buf).unwrap());
        assert_eq!(buf, vec!["a", "b"]);
        assert!(RecordSource::read_record(&mut rdr, &mut buf).unwrap());
        assert_eq!(buf, vec!["1", "2"]);
        assert!(!RecordSource::read_record(&mut rdr, &mut buf).unwrap());
    }

    #[test]
    fn test_dialect_delimiter_and_trim() {
        let dialect = Dialect::default().with_delimiter(b';').with_trim(true);
        let mut rdr = csv_reader("a ; b\n".as_bytes(), &dialect);
        let mut buf = StringRecord::new();
        assert!(RecordSource::read_record(&mut rdr, &mut buf).unwrap());
        assert_eq!(buf, vec!["a", "b"]);

        let mut out = Vec::new();
        {
            let mut wtr = csv_writer(&mut out, &dialect);
            RecordSink::write_record(&mut wtr, ["x", "y z"]).unwrap();
            RecordSink::flush(&mut wtr).unwrap();
        }
        assert_eq!(String::from_utf8(out).unwrap(), "x;y z\n");
    }

    #[test]
    fn test_empty_record_is_blank_line() {
        let mut out = Vec::new();
        {
            let mut wtr = csv_writer(&mut out, &Dialect::default());
            RecordSink::write_record(&mut wtr, ["a"]).unwrap();
            RecordSink::write_record(&mut wtr, std::iter::empty()).unwrap();
            RecordSink::write_record(&mut wtr, ["b", ""]).unwrap();
            RecordSink::flush(&mut wtr).unwrap();
        }
        assert_eq!(String::from_utf8(out).unwrap(), "a\n\nb,\n");
    }

    #[test]
    fn test_strict_reader_rejects_ragged_rows() {
        let mut rdr = csv_reader("a,b\n1\n".as_bytes(), &Dialect::default());
        let mut buf = StringRecord::new();
        assert!(RecordSource::read_record(&mut rdr, &mut buf).unwrap());
        assert!(RecordSource::read_record(&mut rdr, &mut buf).is_err());
    }
}
