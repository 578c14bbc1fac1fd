use crate::{Connection, Executor, Result, Rows, RowsAffected, Value};
use std::sync::Arc;

/// An open transaction on a connection.
///
/// `commit` and `rollback` consume it. Dropping it while still open rolls
/// back, so an early return or a panic never leaves the transaction behind.
pub struct Transaction {
    connection: Arc<dyn Connection>,
    active: bool,
}

impl Transaction {
    pub fn begin(connection: Arc<dyn Connection>) -> Result<Self> {
        log::info!("Transaction begin");
        connection.begin()?;
        Ok(Self {
            connection,
            active: true,
        })
    }

    pub fn commit(mut self) -> Result<()> {
        log::info!("Transaction commit");
        self.connection.commit().inspect_err(|e| {
            log::error!("Failed to commit the transaction: {e:#}");
        })?;
        self.active = false;
        Ok(())
    }

    pub fn rollback(mut self) -> Result<()> {
        log::info!("Transaction rollback");
        self.active = false;
        self.connection.rollback().inspect_err(|e| {
            log::error!("Failed to rollback the transaction: {e:#}");
        })
    }
}

impl Executor for Transaction {
    fn execute(&self, sql: &str, params: &[Value]) -> Result<RowsAffected> {
        self.connection.execute(sql, params)
    }

    fn fetch<'s>(&'s self, sql: &str, params: &[Value]) -> Result<Rows<'s>> {
        self.connection.fetch(sql, params)
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if self.active {
            log::warn!("Transaction dropped while still open, rolling back");
            if let Err(e) = self.connection.rollback() {
                log::error!("Failed to rollback the transaction: {e:#}");
            }
        }
    }
}
