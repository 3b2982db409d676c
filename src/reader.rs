//! A reader that treats the first record as the header.

use csv::StringRecord;
use tracing::debug;

use crate::error::{FilterError, Result};
use crate::header::Header;
use crate::row::Row;
use crate::stream::RecordSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Nothing read yet.
    Start,
    /// Header known, data records follow.
    HeaderRead,
    /// Source exhausted.
    Done,
    /// A read or header error was returned; nothing more is read.
    Failed,
}

/// Wraps a [`RecordSource`] and yields [`Row`]s addressed by column name.
///
/// The first record becomes the [`Header`] and is never returned as a row.
/// Every row borrows the reader's single read buffer, so only one row is
/// alive at a time.
pub struct HeaderReader<S> {
    source: S,
    buf: StringRecord,
    header: Option<Header>,
    state: State,
    line: u64,
}

impl<S: RecordSource> HeaderReader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            buf: StringRecord::new(),
            header: None,
            state: State::Start,
            line: 0,
        }
    }

    /// Read and index the header if that has not happened yet.
    ///
    /// Returns `Ok(None)` when the source holds no records at all. Fails
    /// with [`FilterError::DuplicateColumn`] if a name repeats; after any
    /// error the reader reports end of input and reads nothing further.
    pub fn read_header(&mut self) -> Result<Option<&Header>> {
        if self.state == State::Start {
            if !self.next_record()? {
                self.state = State::Done;
                return Ok(None);
            }
            let header = match Header::new(self.buf.iter()) {
                Ok(header) => header,
                Err(err) => {
                    self.state = State::Failed;
                    return Err(err);
                }
            };
            debug!(columns = header.len(), "read header");
            self.header = Some(header);
            self.state = State::HeaderRead;
        }
        Ok(self.header.as_ref())
    }

    /// Read the next data record.
    ///
    /// Reads the header first if needed. Returns `Ok(None)` at end of input.
    pub fn read(&mut self) -> Result<Option<Row<'_>>> {
        if self.read_header()?.is_none() || self.state != State::HeaderRead {
            return Ok(None);
        }
        if !self.next_record()? {
            self.state = State::Done;
            return Ok(None);
        }
        let Some(header) = self.header.as_ref() else {
            return Ok(None);
        };
        if self.buf.len() != header.len() {
            self.state = State::Failed;
            return Err(FilterError::RowWidth {
                line: self.line,
                expected: header.len(),
                found: self.buf.len(),
            });
        }
        Ok(Some(Row::shared(header, &self.buf, self.line)))
    }

    /// The header, once it has been read.
    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    /// Number of records consumed so far, header included.
    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn into_inner(self) -> S {
        self.source
    }

    fn next_record(&mut self) -> Result<bool> {
        match self.source.read_record(&mut self.buf) {
            Ok(more) => {
                if more {
                    self.line += 1;
                }
                Ok(more)
            }
            Err(err) => {
                self.state = State::Failed;
                Err(FilterError::Read(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySource;
    use crate::stream::{Dialect, csv_reader};

    #[test]
    fn test_header_is_not_a_row() {
        let source = MemorySource::new([["id", "name"], ["1", "alice"], ["2", "bob"]]);
        let mut reader = HeaderReader::new(source);

        let row = reader.read().unwrap().unwrap();
        assert_eq!(row.field("name").unwrap(), "alice");
        assert_eq!(row.line(), 2);
        assert!(!row.is_owned());

        let row = reader.read().unwrap().unwrap();
        assert_eq!(row.field("id").unwrap(), "2");

        assert!(reader.read().unwrap().is_none());
        assert!(reader.read().unwrap().is_none());
        assert_eq!(reader.header().unwrap().names(), ["id", "name"]);
    }

    #[test]
    fn test_read_header_is_idempotent() {
        let source = MemorySource::new([["a", "b"], ["1", "2"]]);
        let mut reader = HeaderReader::new(source);
        assert_eq!(reader.read_header().unwrap().unwrap().len(), 2);
        assert_eq!(reader.read_header().unwrap().unwrap().len(), 2);
        assert_eq!(reader.line(), 1);
        let row = reader.read().unwrap().unwrap();
        assert_eq!(row.field("b").unwrap(), "2");
    }

    #[test]
    fn test_empty_source() {
        let mut reader = HeaderReader::new(MemorySource::default());
        assert!(reader.read_header().unwrap().is_none());
        assert!(reader.read().unwrap().is_none());
    }

    #[test]
    fn test_header_only() {
        let mut reader = HeaderReader::new(MemorySource::new([["a", "b"]]));
        assert!(reader.read().unwrap().is_none());
        assert_eq!(reader.header().unwrap().len(), 2);
    }

    #[test]
    fn test_duplicate_header_stops_reading() {
        let source = MemorySource::new([["a", "b", "a"], ["1", "2", "3"]]);
        let mut reader = HeaderReader::new(source);
        assert!(matches!(
            reader.read(),
            Err(FilterError::DuplicateColumn { name }) if name == "a"
        ));
        assert!(reader.read().unwrap().is_none());
        assert_eq!(reader.line(), 1);
    }

    #[test]
    fn test_width_mismatch() {
        let source = MemorySource::new(vec![vec!["a", "b"], vec!["1"]]);
        let mut reader = HeaderReader::new(source);
        match reader.read() {
            Err(FilterError::RowWidth {
                line,
                expected,
                found,
            }) => {
                assert_eq!(line, 2);
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("Expected RowWidth, got {other:?}"),
        }
    }

    #[test]
    fn test_source_error_is_not_end_of_input() {
        let source = MemorySource::new([["a"], ["1"], ["2"]]).fail_after(2);
        let mut reader = HeaderReader::new(source);
        assert!(reader.read().unwrap().is_some());
        assert!(matches!(reader.read(), Err(FilterError::Read(_))));
    }

    #[test]
    fn test_over_csv_reader() {
        let rdr = csv_reader("x,y\n\"1,5\",2\n".as_bytes(), &Dialect::default());
        let mut reader = HeaderReader::new(rdr);
        let row = reader.read().unwrap().unwrap();
        assert_eq!(row.field("x").unwrap(), "1,5");
        assert_eq!(row.field("y").unwrap(), "2");
    }
}
