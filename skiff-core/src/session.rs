use crate::{
    Connection, Dialect, Entity, Executor, HookKind, Hooks, OrmError, Result, RowLabeled, Rows,
    RowsAffected, Schema, Transaction, Value, dispatch, truncate_long,
};
use std::{
    any::TypeId,
    fmt::Write,
    mem,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

/// Type bound to a session with [`Session::model`].
struct Model {
    type_id: TypeId,
    type_name: &'static str,
    schema: Arc<Schema>,
    /// Value passed to `model`, it receives the hooks of table wide operations.
    prototype: Box<dyn Hooks>,
}

/// A unit of work against one connection.
///
/// It accumulates one statement at a time (`raw`), runs it (`exec`,
/// `query_row`, `query_rows`) and keeps the model bound by `model` for the
/// record operations. While a transaction is open every statement runs
/// inside it.
pub struct Session {
    connection: Arc<dyn Connection>,
    dialect: Arc<dyn Dialect>,
    sql: String,
    params: Vec<Value>,
    model: Option<Model>,
    transaction: Option<Transaction>,
}

impl Session {
    pub fn new(connection: Arc<dyn Connection>, dialect: Arc<dyn Dialect>) -> Self {
        Self {
            connection,
            dialect,
            sql: String::new(),
            params: Vec::new(),
            model: None,
            transaction: None,
        }
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Binds the type of `value` as the current model.
    ///
    /// The schema is parsed again only when the concrete type changes, the
    /// value itself always becomes the new prototype.
    pub fn model<E: Entity + Clone>(&mut self, value: &E) -> Result<&mut Self> {
        let type_id = TypeId::of::<E>();
        let schema = match &self.model {
            Some(model) if model.type_id == type_id => {
                log::debug!("Reusing the schema of `{}`", E::type_name());
                model.schema.clone()
            }
            _ => {
                log::info!("Parsing the schema of `{}`", E::type_name());
                Arc::new(Schema::parse::<E>(Some(self.dialect.as_ref()))?)
            }
        };
        self.model = Some(Model {
            type_id,
            type_name: E::type_name(),
            schema,
            prototype: Box::new(value.clone()),
        });
        Ok(self)
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Schema of the bound model.
    pub fn schema(&self) -> Option<&Schema> {
        self.model.as_ref().map(|v| v.schema.as_ref())
    }

    pub(crate) fn bound_schema(&self) -> Result<Arc<Schema>> {
        self.model
            .as_ref()
            .map(|v| v.schema.clone())
            .ok_or_else(|| OrmError::NoModel.into())
    }

    /// Schema of the bound model, which must be `E`.
    pub(crate) fn bound_schema_of<E: Entity>(&self) -> Result<Arc<Schema>> {
        let Some(model) = &self.model else {
            return Err(OrmError::NoModel.into());
        };
        if model.type_id != TypeId::of::<E>() {
            return Err(OrmError::ModelMismatch {
                bound: model.type_name,
                requested: E::type_name(),
            }
            .into());
        }
        Ok(model.schema.clone())
    }

    /// Runs a hook on the prototype of the bound model, if any.
    pub(crate) fn prototype_hook(&mut self, hook: HookKind) -> Result<()> {
        match &mut self.model {
            Some(model) => dispatch(&mut *model.prototype, hook),
            None => Ok(()),
        }
    }

    /// Appends SQL text and its parameters to the pending statement.
    pub fn raw(&mut self, sql: &str, params: impl IntoIterator<Item = Value>) -> &mut Self {
        if !self.sql.is_empty() && !sql.is_empty() {
            self.sql.push(' ');
        }
        self.sql.push_str(sql);
        self.params.extend(params);
        self
    }

    /// Pending statement and its parameters.
    pub fn pending(&self) -> (&str, &[Value]) {
        (&self.sql, &self.params)
    }

    /// Discards the pending statement.
    pub fn clear(&mut self) {
        self.sql.clear();
        self.params.clear();
    }

    fn take_pending(&mut self) -> (String, Vec<Value>) {
        let sql = mem::take(&mut self.sql);
        let params = mem::take(&mut self.params);
        if log::log_enabled!(log::Level::Info) {
            let mut rendered = String::new();
            for (i, v) in params.iter().enumerate() {
                let _ = write!(rendered, "{}{v}", if i > 0 { ", " } else { "" });
            }
            log::info!("{} [{}]", truncate_long!(sql), rendered);
        }
        (sql, params)
    }

    /// Runs the pending statement, the buffer is cleared whatever the outcome.
    pub fn exec(&mut self) -> Result<RowsAffected> {
        let (sql, params) = self.take_pending();
        let result = match &self.transaction {
            Some(transaction) => transaction.execute(&sql, &params),
            None => self.connection.execute(&sql, &params),
        };
        result.inspect_err(|e| log::error!("{e:#}"))
    }

    /// Runs the pending query and returns its first row.
    pub fn query_row(&mut self) -> Result<Option<RowLabeled>> {
        let mut rows = self.query_rows()?;
        let row = rows.next().transpose();
        row.inspect_err(|e| log::error!("{e:#}"))
    }

    /// Runs the pending query, no other statement can be issued until the
    /// returned cursor is gone.
    pub fn query_rows(&mut self) -> Result<Rows<'_>> {
        let (sql, params) = self.take_pending();
        let result = match &self.transaction {
            Some(transaction) => transaction.fetch(&sql, &params),
            None => self.connection.fetch(&sql, &params),
        };
        result.inspect_err(|e| log::error!("{e:#}"))
    }

    pub fn is_active(&self) -> bool {
        self.transaction.is_some()
    }

    /// Opens a transaction, does nothing when one is already open.
    pub fn begin(&mut self) -> Result<()> {
        if self.transaction.is_none() {
            self.transaction = Some(Transaction::begin(self.connection.clone())?);
        }
        Ok(())
    }

    /// Commits the open transaction, does nothing when there is none.
    pub fn commit(&mut self) -> Result<()> {
        match self.transaction.take() {
            Some(transaction) => transaction.commit(),
            None => Ok(()),
        }
    }

    /// Rolls back the open transaction, does nothing when there is none.
    pub fn rollback(&mut self) -> Result<()> {
        match self.transaction.take() {
            Some(transaction) => transaction.rollback(),
            None => Ok(()),
        }
    }

    /// Runs `f` inside a transaction.
    ///
    /// Commits when `f` succeeds, rolls back when it returns an error or
    /// panics (the panic then continues). When a transaction is already open
    /// `f` simply joins it and the outer scope decides the outcome.
    pub fn transaction<T>(&mut self, f: impl FnOnce(&mut Session) -> Result<T>) -> Result<T> {
        if self.is_active() {
            return f(self);
        }
        self.begin()?;
        match panic::catch_unwind(AssertUnwindSafe(|| f(self))) {
            Ok(Ok(value)) => {
                self.commit()?;
                Ok(value)
            }
            Ok(Err(e)) => {
                if let Err(rollback) = self.rollback() {
                    log::error!("Rollback after a failed transaction body also failed: {rollback:#}");
                }
                Err(e)
            }
            Err(payload) => {
                let _ = self.rollback();
                panic::resume_unwind(payload)
            }
        }
    }
}
