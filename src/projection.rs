//! Column projection through a keep-mask.

use crate::header::Header;

/// One flag per header position: `true` keeps the column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeepMask(Vec<bool>);

impl KeepMask {
    /// Ask `keep_column` about each header name, in header order.
    pub fn from_header(header: &Header, keep_column: impl FnMut(&str) -> bool) -> Self {
        Self(header.iter().map(keep_column).collect())
    }

    pub fn all(width: usize) -> Self {
        Self(vec![true; width])
    }

    /// Number of columns kept.
    pub fn kept(&self) -> usize {
        self.0.iter().filter(|keep| **keep).count()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }

    /// Fields of `fields` whose mask bit is set, in their original order.
    pub fn project<'f, I>(&self, fields: I) -> impl Iterator<Item = &'f str>
    where
        I: IntoIterator<Item = &'f str>,
    {
        project(fields, &self.0)
    }
}

impl From<Vec<bool>> for KeepMask {
    fn from(mask: Vec<bool>) -> Self {
        Self(mask)
    }
}

/// Keep the fields whose flag in `keep` is `true`, preserving order.
///
/// Fields beyond the end of `keep` are dropped.
pub fn project<'f, I>(fields: I, keep: &[bool]) -> impl Iterator<Item = &'f str>
where
    I: IntoIterator<Item = &'f str>,
{
    fields
        .into_iter()
        .zip(keep)
        .filter_map(|(field, keep)| keep.then_some(field))
}
