//! In-memory sources and sinks.
//!
//! Handy for embedding the driver where the data is already parsed, and
//! for exercising failure paths that a real file rarely produces.

use std::collections::VecDeque;
use std::io;

use csv::StringRecord;

use crate::stream::{RecordSink, RecordSource};

/// A source that replays a fixed list of records.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: VecDeque<Vec<String>>,
    fail_after: Option<usize>,
    reads: usize,
}

impl MemorySource {
    pub fn new<R, S>(records: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            records: records
                .into_iter()
                .map(|r| r.into_iter().map(Into::into).collect())
                .collect(),
            fail_after: None,
            reads: 0,
        }
    }

    /// Fail every read after the first `n` successful ones.
    pub fn fail_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }
}

impl RecordSource for MemorySource {
    fn read_record(&mut self, buf: &mut StringRecord) -> Result<bool, csv::Error> {
        if self.fail_after.is_some_and(|n| self.reads >= n) {
            return Err(io::Error::other("simulated read failure").into());
        }
        let Some(record) = self.records.pop_front() else {
            return Ok(false);
        };
        self.reads += 1;
        buf.clear();
        for field in &record {
            buf.push_field(field);
        }
        Ok(true)
    }
}

/// A sink that collects written records.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub records: Vec<Vec<String>>,
    pub flushes: usize,
    fail_writes: bool,
    fail_flush: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every `write_record` call.
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Accept writes but fail the final flush.
    pub fn failing_flush() -> Self {
        Self {
            fail_flush: true,
            ..Self::default()
        }
    }
}

impl RecordSink for MemorySink {
    fn write_record<'f, I>(&mut self, fields: I) -> Result<(), csv::Error>
    where
        I: IntoIterator<Item = &'f str>,
    {
        if self.fail_writes {
            return Err(io::Error::other("simulated write failure").into());
        }
        self.records
            .push(fields.into_iter().map(str::to_owned).collect());
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        if self.fail_flush {
            return Err(io::Error::other("simulated flush failure"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_replays_then_ends() {
        let mut source = MemorySource::new([["a", "b"], ["1", "2"]]);
        let mut buf = StringRecord::new();
        assert!(source.read_record(&mut buf).unwrap());
        assert_eq!(buf, vec!["a", "b"]);
        assert!(source.read_record(&mut buf).unwrap());
        assert_eq!(buf, vec!["1", "2"]);
        assert!(!source.read_record(&mut buf).unwrap());
        assert!(!source.read_record(&mut buf).unwrap());
    }

    #[test]
    fn test_source_fail_after() {
        let mut source = MemorySource::new([["a"], ["1"]]).fail_after(1);
        let mut buf = StringRecord::new();
        assert!(source.read_record(&mut buf).unwrap());
        assert!(source.read_record(&mut buf).is_err());
    }

    #[test]
    fn test_sink_collects_and_counts_flushes() {
        let mut sink = MemorySink::new();
        sink.write_record(["x", "y"]).unwrap();
        sink.flush().unwrap();
        assert_eq!(sink.records, vec![vec!["x", "y"]]);
        assert_eq!(sink.flushes, 1);

        assert!(MemorySink::failing_writes().write_record(["x"]).is_err());
        assert!(MemorySink::failing_flush().flush().is_err());
    }
}
