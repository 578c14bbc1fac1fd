use crate::get_driver;
use skiff_core::{AnyEntity, Connection, Dialect, OrmError, Result, Session};
use std::sync::Arc;

/// Entry point: one open connection shared by every session it creates.
pub struct Engine {
    connection: Arc<dyn Connection>,
    dialect: Arc<dyn Dialect>,
}

impl Engine {
    /// Opens `source` with the driver registered as `driver`, then pings it.
    ///
    /// ```no_run
    /// let engine = skiff::Engine::new("sqlite3", "sqlite://app.db?mode=rwc")?;
    /// # Ok::<(), skiff::Error>(())
    /// ```
    pub fn new(driver: &str, source: &str) -> Result<Engine> {
        let Some(driver) = get_driver(driver) else {
            let error = OrmError::UnknownDialect(driver.to_string());
            log::error!("{}", error);
            return Err(error.into());
        };
        let connection = driver.connect(source).inspect_err(|e| {
            log::error!("Error opening the database connection: {e:#}");
        })?;
        connection.ping().inspect_err(|e| {
            log::error!("Error pinging the database: {e:#}");
        })?;
        log::info!("Connected to `{}` using {}", source, driver.name());
        Ok(Engine {
            connection,
            dialect: driver.dialect(),
        })
    }

    pub fn new_session(&self) -> Session {
        Session::new(self.connection.clone(), self.dialect.clone())
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }

    /// Creates the table of `value`'s type unless it already exists.
    /// Existing tables are never altered.
    pub fn migrate(&self, value: &dyn AnyEntity) -> Result<()> {
        let mut session = self.new_session();
        value.bind_to(&mut session)?;
        let Some(schema) = session.schema() else {
            return Err(OrmError::NoModel.into());
        };
        let table = schema.table_name().to_string();
        if log::log_enabled!(log::Level::Debug) {
            for (i, field) in schema.fields.iter().enumerate() {
                log::debug!(
                    "{}.{} field {}: {} {} (attribute {}, primary key {}, auto increment {}, unique {}, index {})",
                    schema.name,
                    i,
                    field.name,
                    field.data_type,
                    field.tag,
                    field.attribute,
                    field.primary_key,
                    field.auto_increment,
                    field.unique,
                    field.index,
                );
            }
        }
        if session.has_table()? {
            log::info!("Table `{}` already exists", table);
            return Ok(());
        }
        log::info!("Table `{}` does not exist, creating it", table);
        session.create_table()
    }

    /// Migrates every value in order, stopping at the first failure.
    pub fn migrate_all(&self, values: &[&dyn AnyEntity]) -> Result<()> {
        for value in values {
            self.migrate(*value)?;
        }
        Ok(())
    }

    /// Releases this engine's handle on the connection, the database closes
    /// once the sessions still using it are gone.
    pub fn close(self) {
        log::info!("Closing the engine");
    }
}
