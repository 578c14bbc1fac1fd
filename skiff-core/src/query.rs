use crate::{AsValue, Result, Value};
use std::{fmt, sync::Arc};

/// Metadata about modify operations (INSERT/UPDATE/DELETE).
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsAffected {
    /// Total number of rows impacted.
    pub rows_affected: u64,
    /// Rowid of the last inserted row, when the backend reports one.
    pub last_affected_id: Option<i64>,
}

/// Shared reference-counted column name list.
pub type RowNames = Arc<[String]>;
/// Owned row value slice matching `RowNames` length.
pub type Row = Box<[Value]>;

/// A result row with its corresponding column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLabeled {
    /// Column names.
    pub labels: RowNames,
    /// Data values (aligned by index with `labels`).
    pub values: Row,
}

impl RowLabeled {
    pub fn new(labels: RowNames, values: Row) -> Self {
        Self { labels, values }
    }
    pub fn names(&self) -> &[String] {
        &self.labels
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
    pub fn get_column(&self, name: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v == name)
            .map(|i| &self.values[i])
    }
    /// Converts the column at `index`.
    pub fn get<T: AsValue>(&self, index: usize) -> Result<T> {
        let value = self.values.get(index).cloned().ok_or_else(|| {
            crate::Error::msg(format!(
                "Column index {index} out of range, the row has {} columns",
                self.values.len()
            ))
        })?;
        T::try_from_value(value)
    }
}

/// Blocking cursor over the rows of a query.
///
/// It borrows whatever issued it, the session cannot run another statement
/// until the cursor is dropped or closed.
pub struct Rows<'c> {
    inner: Box<dyn Iterator<Item = Result<RowLabeled>> + 'c>,
}

impl<'c> Rows<'c> {
    pub fn new(inner: impl Iterator<Item = Result<RowLabeled>> + 'c) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }

    /// A cursor that yields nothing.
    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }

    /// Releases the underlying statement.
    pub fn close(self) {}
}

impl<'c> Iterator for Rows<'c> {
    type Item = Result<RowLabeled>;
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl<'c> fmt::Debug for Rows<'c> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rows").finish_non_exhaustive()
    }
}
