//! Error types for header-aware CSV processing.

use std::io;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FilterError>;

/// Everything that can stop a stream from being processed.
///
/// End of input is not an error: readers report it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The header row names the same column more than once.
    #[error("duplicate column name '{name}' in header")]
    DuplicateColumn { name: String },

    /// A policy asked for a column the header does not have.
    #[error("no column named '{name}'")]
    FieldNotFound { name: String },

    /// A data record has a different number of fields than the header.
    #[error("record {line} has {found} fields, header has {expected}")]
    RowWidth {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// The source failed for a reason other than end of input.
    #[error("read error")]
    Read(#[source] csv::Error),

    /// The sink rejected a record.
    #[error("write error")]
    Write(#[source] csv::Error),

    /// The sink could not be flushed once the stream ended.
    #[error("flush error")]
    Flush(#[from] io::Error),
}

impl FilterError {
    /// Shorthand for [`FilterError::FieldNotFound`].
    pub fn field_not_found(name: impl Into<String>) -> Self {
        FilterError::FieldNotFound { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_column() {
        let err = FilterError::field_not_found("zzz");
        assert_eq!(err.to_string(), "no column named 'zzz'");

        let err = FilterError::DuplicateColumn {
            name: "a".to_string(),
        };
        assert_eq!(err.to_string(), "duplicate column name 'a' in header");
    }

    #[test]
    fn test_row_width_message() {
        let err = FilterError::RowWidth {
            line: 3,
            expected: 2,
            found: 4,
        };
        assert_eq!(err.to_string(), "record 3 has 4 fields, header has 2");
    }

    #[test]
    fn test_flush_from_io() {
        let err: FilterError = io::Error::other("disk full").into();
        assert!(matches!(err, FilterError::Flush(_)));
        // The cause is reported once, through the source chain.
        assert_eq!(err.to_string(), "flush error");
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "disk full");
    }
}
