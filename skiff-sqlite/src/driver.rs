use crate::{SqliteConnection, SqliteDialect};
use skiff_core::{Connection, Dialect, Driver, Result};
use std::sync::Arc;

#[derive(Default, Debug)]
pub struct SqliteDriver {}

impl SqliteDriver {
    pub const NAME: &'static str = "sqlite3";

    pub const fn new() -> Self {
        Self {}
    }
}

impl Driver for SqliteDriver {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn dialect(&self) -> Arc<dyn Dialect> {
        Arc::new(SqliteDialect)
    }

    fn connect(&self, source: &str) -> Result<Arc<dyn Connection>> {
        Ok(Arc::new(SqliteConnection::open(source)?))
    }
}
