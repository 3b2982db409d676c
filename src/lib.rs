//! # filtercsv
//!
//! Header-aware CSV filtering: keep some columns, keep some rows, rewrite
//! fields, all by column name, in a single streaming pass.
//!
//! ## Overview
//!
//! - **Header**: the first record names the columns; names must be unique
//! - **Rows**: fields are read and written by column name, never by index
//! - **Copy-on-write**: a row only copies its fields when first modified
//! - **Streaming**: one record in memory at a time
//!
//! ## Example
//!
//! ```
//! use filtercsv::{Config, Dialect, process_str};
//!
//! let input = "id,name,score\n1,alice,10\n2,bob,20\n";
//!
//! let mut config = Config::new()
//!     .with_keep_column(|name| name != "score")
//!     .with_keep_row(|row| Ok(row.field("score")? == "10"))
//!     .with_modify_row(|row| {
//!         let name = row.field("name")?.to_uppercase();
//!         row.set_field("name", name)
//!     });
//!
//! let (output, summary) = process_str(input, &Dialect::default(), &mut config).unwrap();
//!
//! assert_eq!(output, "id,name\n1,ALICE\n");
//! assert_eq!(summary.rows_written, 1);
//! ```

pub mod error;
pub mod header;
pub mod memory;
pub mod process;
pub mod projection;
pub mod reader;
pub mod row;
pub mod rules;
pub mod stream;

pub use error::{FilterError, Result};
pub use header::Header;
pub use memory::{MemorySink, MemorySource};
pub use process::{
    Config, KeepColumnFn, KeepRowFn, ModifyRowFn, Summary, process, process_csv, process_str,
};
pub use projection::{KeepMask, project};
pub use reader::HeaderReader;
pub use row::Row;
pub use rules::{CompareOp, Rule, RuleError, compile, parse_rules};
pub use stream::{Dialect, RecordSink, RecordSource, csv_reader, csv_writer};
