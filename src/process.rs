//! The single-pass filter/transform driver.
//!
//! ```text
//! Start -> HeaderRead -> Streaming -> Done
//!    \__________\____________\______-> Failed
//! ```
//!
//! The header is read and projected once. Each data row then flows through
//! `keep_row`, `modify_row` and the keep-mask before it is written. Only
//! one row is held at a time.

use std::io;

use tracing::{debug, trace};

use crate::error::{FilterError, Result};
use crate::projection::KeepMask;
use crate::reader::HeaderReader;
use crate::row::Row;
use crate::stream::{Dialect, RecordSink, RecordSource, csv_reader, csv_writer};

/// Decides whether a column survives, given its name.
pub type KeepColumnFn = Box<dyn FnMut(&str) -> bool>;
/// Decides whether a data row survives.
pub type KeepRowFn = Box<dyn FnMut(&Row<'_>) -> Result<bool>>;
/// Rewrites a kept row in place.
pub type ModifyRowFn = Box<dyn FnMut(&mut Row<'_>) -> Result<()>>;

/// The three policies applied by [`process`].
///
/// Any policy left as `None` keeps everything or changes nothing. Policies
/// may carry state (counters, "first N rows"); it persists across runs that
/// reuse the same `Config`.
#[derive(Default)]
pub struct Config {
    pub keep_column: Option<KeepColumnFn>,
    pub keep_row: Option<KeepRowFn>,
    pub modify_row: Option<ModifyRowFn>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keep_column(mut self, f: impl FnMut(&str) -> bool + 'static) -> Self {
        self.keep_column = Some(Box::new(f));
        self
    }

    pub fn with_keep_row(mut self, f: impl FnMut(&Row<'_>) -> Result<bool> + 'static) -> Self {
        self.keep_row = Some(Box::new(f));
        self
    }

    pub fn with_modify_row(mut self, f: impl FnMut(&mut Row<'_>) -> Result<()> + 'static) -> Self {
        self.modify_row = Some(Box::new(f));
        self
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("keep_column", &self.keep_column.is_some())
            .field("keep_row", &self.keep_row.is_some())
            .field("modify_row", &self.modify_row.is_some())
            .finish()
    }
}

/// Counts reported after a successful run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Columns in the input header.
    pub columns_read: usize,
    /// Columns in the output header.
    pub columns_kept: usize,
    /// Data rows read, header excluded.
    pub rows_read: usize,
    /// Data rows written, header excluded.
    pub rows_written: usize,
}

fn keep_every_row(_: &Row<'_>) -> Result<bool> {
    Ok(true)
}

fn leave_row_unchanged(_: &mut Row<'_>) -> Result<()> {
    Ok(())
}

/// Stream `source` into `sink`, applying the policies in `config`.
///
/// The projected header is written as soon as it is known, even if no data
/// rows follow; an input with no records at all writes nothing. The sink is
/// flushed exactly once, after the last row, and a flush failure is
/// returned as [`FilterError::Flush`].
///
/// Any error aborts the run: nothing after the failing record is read or
/// written, and the sink is not flushed.
pub fn process<S, W>(source: S, mut sink: W, config: &mut Config) -> Result<Summary>
where
    S: RecordSource,
    W: RecordSink,
{
    let mut reader = HeaderReader::new(source);
    let mut summary = Summary::default();

    let Some(header) = reader.read_header()? else {
        debug!("input has no header, nothing to write");
        sink.flush()?;
        return Ok(summary);
    };

    let mask = match &mut config.keep_column {
        Some(keep) => KeepMask::from_header(header, |name| keep(name)),
        None => KeepMask::all(header.len()),
    };
    summary.columns_read = header.len();
    summary.columns_kept = mask.kept();
    sink.write_record(mask.project(header.iter()))
        .map_err(FilterError::Write)?;

    let mut keep_all = keep_every_row;
    let mut unchanged = leave_row_unchanged;
    let keep_row: &mut dyn FnMut(&Row<'_>) -> Result<bool> =
        match config.keep_row.as_deref_mut() {
            Some(keep) => keep,
            None => &mut keep_all,
        };
    let modify_row: &mut dyn FnMut(&mut Row<'_>) -> Result<()> =
        match config.modify_row.as_deref_mut() {
            Some(modify) => modify,
            None => &mut unchanged,
        };

    while let Some(mut row) = reader.read()? {
        summary.rows_read += 1;
        if !keep_row(&row)? {
            trace!(line = row.line(), "row dropped");
            continue;
        }
        modify_row(&mut row)?;
        sink.write_record(mask.project(row.iter()))
            .map_err(FilterError::Write)?;
        summary.rows_written += 1;
    }

    sink.flush()?;
    debug!(
        columns_read = summary.columns_read,
        columns_kept = summary.columns_kept,
        rows_read = summary.rows_read,
        rows_written = summary.rows_written,
        "stream processed"
    );
    Ok(summary)
}

/// Run [`process`] over byte streams using the `csv` tokenizer.
pub fn process_csv<R, W>(
    input: R,
    output: W,
    dialect: &Dialect,
    config: &mut Config,
) -> Result<Summary>
where
    R: io::Read,
    W: io::Write,
{
    process(csv_reader(input, dialect), csv_writer(output, dialect), config)
}

/// Run [`process`] over an in-memory document and return the output text.
pub fn process_str(
    input: &str,
    dialect: &Dialect,
    config: &mut Config,
) -> Result<(String, Summary)> {
    let mut out = Vec::new();
    let summary = process_csv(input.as_bytes(), &mut out, dialect, config)?;
    Ok((String::from_utf8_lossy(&out).into_owned(), summary))
}
