use crate::{Dialect, Result, Rows, RowsAffected, Value};
use std::sync::Arc;

/// Runs SQL statements with positional `?` parameters.
pub trait Executor {
    /// Runs a statement that returns no rows.
    fn execute(&self, sql: &str, params: &[Value]) -> Result<RowsAffected>;

    /// Runs a query, the rows are read lazily while iterating.
    fn fetch<'s>(&'s self, sql: &str, params: &[Value]) -> Result<Rows<'s>>;
}

/// An open database handle, shared by every session of an engine.
pub trait Connection: Executor + Send + Sync {
    /// Checks the database is reachable.
    fn ping(&self) -> Result<()>;
    fn begin(&self) -> Result<()>;
    fn commit(&self) -> Result<()>;
    fn rollback(&self) -> Result<()>;
}

/// Backend entry point, registered by name.
pub trait Driver: Send + Sync {
    fn name(&self) -> &'static str;
    fn dialect(&self) -> Arc<dyn Dialect>;
    /// Opens a connection to `source`, whose format depends on the backend.
    fn connect(&self, source: &str) -> Result<Arc<dyn Connection>>;
}
