//! A small rule language that compiles into a [`Config`].
//!
//! One rule per line:
//! ```text
//! # comments and blank lines are ignored
//! KEEP id,name,score
//! DROP score
//! WHERE score < 15
//! WHERE name ~ "li"
//! SET status = "seen"
//! UPPER name
//! LOWER email
//! TRIM name
//! CHANGE phone "-" ""
//! ```
//!
//! - `KEEP c1,c2,...` - keep only the listed columns (rules accumulate)
//! - `DROP c1,c2,...` - drop the listed columns, even if kept
//! - `WHERE col OP value` - keep rows matching; all WHERE rules must hold.
//!   OP is one of `=`, `!=`, `<`, `<=`, `>`, `>=`, `~` (contains),
//!   `!~` (does not contain). Ordering compares numbers numerically when
//!   both sides parse as numbers, otherwise as text.
//! - `SET col = value` - overwrite a field
//! - `UPPER col`, `LOWER col`, `TRIM col` - rewrite a field
//! - `CHANGE col "old" "new"` - replace occurrences within a field
//!
//! Keywords are case-insensitive. Values are bare words or delimited
//! strings whose first character is the delimiter (`"a b"`, `/a b/`).
//! Column names containing spaces or operator characters must be quoted.

use std::cmp::Ordering;
use std::collections::HashSet;

use thiserror::Error;

use crate::error::Result;
use crate::process::Config;
use crate::row::Row;

/// A rule that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct RuleError {
    /// 1-based line number within the parsed text.
    pub line: usize,
    pub message: String,
}

/// Comparison used by `WHERE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Contains,
    NotContains,
}

/// Longest tokens first so `<=` is not read as `<`.
const OPERATORS: [(&str, CompareOp); 8] = [
    ("!=", CompareOp::Ne),
    ("<=", CompareOp::Le),
    (">=", CompareOp::Ge),
    ("!~", CompareOp::NotContains),
    ("=", CompareOp::Eq),
    ("<", CompareOp::Lt),
    (">", CompareOp::Gt),
    ("~", CompareOp::Contains),
];

impl CompareOp {
    /// Evaluate `left OP right`.
    pub fn eval(self, left: &str, right: &str) -> bool {
        match self {
            CompareOp::Eq => left == right,
            CompareOp::Ne => left != right,
            CompareOp::Lt => compare_values(left, right).is_lt(),
            CompareOp::Le => compare_values(left, right).is_le(),
            CompareOp::Gt => compare_values(left, right).is_gt(),
            CompareOp::Ge => compare_values(left, right).is_ge(),
            CompareOp::Contains => left.contains(right),
            CompareOp::NotContains => !left.contains(right),
        }
    }
}

/// Numeric order when both sides are numbers, text order otherwise.
fn compare_values(left: &str, right: &str) -> Ordering {
    if let (Ok(l), Ok(r)) = (left.trim().parse::<f64>(), right.trim().parse::<f64>())
        && let Some(ord) = l.partial_cmp(&r)
    {
        return ord;
    }
    left.cmp(right)
}

/// One parsed rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// KEEP c1,c2,...
    Keep { columns: Vec<String> },
    /// DROP c1,c2,...
    Drop { columns: Vec<String> },
    /// WHERE col OP value
    Where {
        column: String,
        op: CompareOp,
        value: String,
    },
    /// SET col = value
    Set { column: String, value: String },
    /// UPPER col
    Upper { column: String },
    /// LOWER col
    Lower { column: String },
    /// TRIM col
    Trim { column: String },
    /// CHANGE col "old" "new"
    Change {
        column: String,
        old: String,
        new: String,
    },
}

impl Rule {
    /// The rule keyword, for messages.
    pub fn name(&self) -> &'static str {
        match self {
            Rule::Keep { .. } => "KEEP",
            Rule::Drop { .. } => "DROP",
            Rule::Where { .. } => "WHERE",
            Rule::Set { .. } => "SET",
            Rule::Upper { .. } => "UPPER",
            Rule::Lower { .. } => "LOWER",
            Rule::Trim { .. } => "TRIM",
            Rule::Change { .. } => "CHANGE",
        }
    }

    /// Does this rule rewrite fields?
    pub fn is_edit(&self) -> bool {
        matches!(
            self,
            Rule::Set { .. }
                | Rule::Upper { .. }
                | Rule::Lower { .. }
                | Rule::Trim { .. }
                | Rule::Change { .. }
        )
    }

    /// Whether `row` passes this rule. Rules other than `WHERE` pass all rows.
    pub fn matches(&self, row: &Row<'_>) -> Result<bool> {
        match self {
            Rule::Where { column, op, value } => Ok(op.eval(row.field(column)?, value)),
            _ => Ok(true),
        }
    }

    /// Apply this rule's edit to `row`. Non-edit rules leave it alone.
    pub fn apply(&self, row: &mut Row<'_>) -> Result<()> {
        let (column, value) = match self {
            Rule::Set { column, value } => (column, value.clone()),
            Rule::Upper { column } => (column, row.field(column)?.to_uppercase()),
            Rule::Lower { column } => (column, row.field(column)?.to_lowercase()),
            Rule::Trim { column } => (column, row.field(column)?.trim().to_string()),
            Rule::Change { column, old, new } => {
                let current = row.field(column)?;
                if old.is_empty() || !current.contains(old.as_str()) {
                    return Ok(());
                }
                (column, current.replace(old.as_str(), new))
            }
            _ => return Ok(()),
        };
        row.set_field(column, value)
    }
}

/// Parse rule text, one rule per line.
pub fn parse_rules(text: &str) -> std::result::Result<Vec<Rule>, RuleError> {
    let mut rules = Vec::new();

    for (line_num, line) in text.lines().enumerate() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let rule = parse_rule(line).map_err(|message| RuleError {
            line: line_num + 1,
            message,
        })?;
        rules.push(rule);
    }

    Ok(rules)
}

/// Build the policies described by `rules`.
///
/// Policies with no matching rules are left unset.
pub fn compile(rules: &[Rule]) -> Config {
    let mut keep: HashSet<String> = HashSet::new();
    let mut drop: HashSet<String> = HashSet::new();
    let mut filters = Vec::new();
    let mut edits = Vec::new();

    for rule in rules {
        match rule {
            Rule::Keep { columns } => keep.extend(columns.iter().cloned()),
            Rule::Drop { columns } => drop.extend(columns.iter().cloned()),
            Rule::Where { .. } => filters.push(rule.clone()),
            _ => edits.push(rule.clone()),
        }
    }

    let mut config = Config::new();
    if !keep.is_empty() || !drop.is_empty() {
        config = config.with_keep_column(move |name| {
            (keep.is_empty() || keep.contains(name)) && !drop.contains(name)
        });
    }
    if !filters.is_empty() {
        config = config.with_keep_row(move |row| {
            for rule in &filters {
                if !rule.matches(row)? {
                    return Ok(false);
                }
            }
            Ok(true)
        });
    }
    if !edits.is_empty() {
        config = config.with_modify_row(move |row| {
            for rule in &edits {
                rule.apply(row)?;
            }
            Ok(())
        });
    }
    config
}

/// Parse a single rule line.
fn parse_rule(line: &str) -> std::result::Result<Rule, String> {
    let (keyword, rest) = line
        .split_once(char::is_whitespace)
        .unwrap_or((line, ""));

    match keyword.to_uppercase().as_str() {
        "KEEP" => Ok(Rule::Keep {
            columns: parse_column_list(rest, "KEEP")?,
        }),
        "DROP" => Ok(Rule::Drop {
            columns: parse_column_list(rest, "DROP")?,
        }),
        "WHERE" => parse_where(rest),
        "SET" => parse_set(rest),
        "UPPER" => Ok(Rule::Upper {
            column: parse_single_column(rest, "UPPER")?,
        }),
        "LOWER" => Ok(Rule::Lower {
            column: parse_single_column(rest, "LOWER")?,
        }),
        "TRIM" => Ok(Rule::Trim {
            column: parse_single_column(rest, "TRIM")?,
        }),
        "CHANGE" => parse_change(rest),
        _ => Err(format!("Unknown rule: {keyword}")),
    }
}

/// Parse `c1,c2,...` for KEEP and DROP.
fn parse_column_list(rest: &str, rule: &str) -> std::result::Result<Vec<String>, String> {
    let rest = rest.trim();
    if rest.is_empty() {
        return Err(format!("{rule} requires at least one column"));
    }

    let mut columns = Vec::new();
    for part in rest.split(',') {
        let name = unquote(part.trim());
        if name.is_empty() {
            return Err(format!("Empty column name in {rule}"));
        }
        columns.push(name.to_string());
    }
    Ok(columns)
}

/// Parse WHERE col OP value.
fn parse_where(rest: &str) -> std::result::Result<Rule, String> {
    let (column, rest) = parse_name(rest)?;
    let (op, rest) = parse_operator(rest)?;
    let (value, rest) = parse_value(rest)?;
    expect_end(rest, "WHERE")?;
    Ok(Rule::Where { column, op, value })
}

/// Parse SET col = value.
fn parse_set(rest: &str) -> std::result::Result<Rule, String> {
    let (column, rest) = parse_name(rest)?;
    let rest = rest
        .trim_start()
        .strip_prefix('=')
        .ok_or("SET requires '=' after the column name")?;
    let (value, rest) = parse_value(rest)?;
    expect_end(rest, "SET")?;
    Ok(Rule::Set { column, value })
}

/// Parse CHANGE col "old" "new".
fn parse_change(rest: &str) -> std::result::Result<Rule, String> {
    let (column, rest) = parse_name(rest)?;
    let (old, rest) = parse_delimited_string(rest)?;
    let (new, rest) = parse_delimited_string(rest)?;
    expect_end(rest, "CHANGE")?;
    if old.is_empty() {
        return Err("CHANGE requires a non-empty search string".to_string());
    }
    Ok(Rule::Change { column, old, new })
}

fn parse_single_column(rest: &str, rule: &str) -> std::result::Result<String, String> {
    let (column, rest) = parse_name(rest)?;
    expect_end(rest, rule)?;
    Ok(column)
}

/// Parse a column name: a bare word, or a quoted string.
/// Returns (name, rest_of_input).
fn parse_name(s: &str) -> std::result::Result<(String, &str), String> {
    let s = s.trim_start();
    match s.chars().next() {
        None => Err("Expected column name".to_string()),
        Some('"' | '\'') => parse_delimited_string(s),
        Some(_) => {
            let end = s
                .find(|c: char| c.is_whitespace() || "=!<>~".contains(c))
                .unwrap_or(s.len());
            if end == 0 {
                return Err("Expected column name".to_string());
            }
            Ok((s[..end].to_string(), &s[end..]))
        }
    }
}

fn parse_operator(s: &str) -> std::result::Result<(CompareOp, &str), String> {
    let s = s.trim_start();
    OPERATORS
        .iter()
        .find(|(token, _)| s.starts_with(token))
        .map(|(token, op)| (*op, &s[token.len()..]))
        .ok_or_else(|| format!("Expected comparison operator, found '{s}'"))
}

/// Parse a value: a bare word (`15`, `-3.5`, `SALES`) or a delimited string.
fn parse_value(s: &str) -> std::result::Result<(String, &str), String> {
    let s = s.trim_start();
    match s.chars().next() {
        None => Err("Expected value".to_string()),
        Some(c) if c.is_alphanumeric() || "-+._".contains(c) => {
            let end = s.find(char::is_whitespace).unwrap_or(s.len());
            Ok((s[..end].to_string(), &s[end..]))
        }
        Some(_) => parse_delimited_string(s),
    }
}

/// Parse a delimited string: the first non-blank character is the
/// delimiter, and the string runs until its next occurrence.
/// Returns (extracted_string, rest_of_input).
fn parse_delimited_string(s: &str) -> std::result::Result<(String, &str), String> {
    let s = s.trim_start();
    let Some(delim) = s.chars().next() else {
        return Err("Expected delimited string".to_string());
    };
    let after_delim = &s[delim.len_utf8()..];

    match after_delim.find(delim) {
        Some(end) => Ok((
            after_delim[..end].to_string(),
            &after_delim[end + delim.len_utf8()..],
        )),
        None => Err(format!("Unclosed delimiter '{delim}'")),
    }
}

fn expect_end(rest: &str, rule: &str) -> std::result::Result<(), String> {
    let rest = rest.trim();
    if rest.is_empty() {
        Ok(())
    } else {
        Err(format!("Unexpected text after {rule}: '{rest}'"))
    }
}

/// Strip one pair of matching surrounding quotes.
fn unquote(s: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = s
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    s
}
