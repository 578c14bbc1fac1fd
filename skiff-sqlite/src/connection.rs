use crate::{
    CBox, SqlitePrepared, error_message_from_ptr,
    extract::{extract_name, extract_value},
};
use libsqlite3_sys::{
    SQLITE_DONE, SQLITE_OK, SQLITE_OPEN_CREATE, SQLITE_OPEN_FULLMUTEX, SQLITE_OPEN_READWRITE,
    SQLITE_OPEN_URI, SQLITE_ROW, sqlite3, sqlite3_busy_timeout, sqlite3_changes64,
    sqlite3_close, sqlite3_column_count, sqlite3_db_mutex, sqlite3_errmsg, sqlite3_finalize,
    sqlite3_last_insert_rowid, sqlite3_mutex, sqlite3_mutex_enter, sqlite3_mutex_leave,
    sqlite3_open_v2, sqlite3_prepare_v2, sqlite3_step,
};
use skiff_core::{
    Connection, Context, Error, Executor, Result, RowLabeled, RowNames, Rows, RowsAffected,
    Value, truncate_long,
};
use std::{
    ffi::{CStr, CString, c_char, c_int},
    ptr,
    sync::Arc,
};

/// Milliseconds a statement waits on a locked database before failing.
pub const BUSY_TIMEOUT_MS: c_int = 5_000;

/// Holds the database mutex, statements and the counters they update stay consistent.
struct DbLock(*mut sqlite3_mutex);

impl DbLock {
    fn acquire(db: *mut sqlite3) -> Self {
        unsafe {
            let mutex = sqlite3_db_mutex(db);
            if !mutex.is_null() {
                sqlite3_mutex_enter(mutex);
            }
            Self(mutex)
        }
    }
}

impl Drop for DbLock {
    fn drop(&mut self) {
        if !self.0.is_null() {
            unsafe { sqlite3_mutex_leave(self.0) }
        }
    }
}

/// A sqlite database handle opened in serialized mode, safe to share between threads.
pub struct SqliteConnection {
    pub(crate) connection: CBox<*mut sqlite3>,
}

impl SqliteConnection {
    pub const PREFIX: &'static str = "sqlite://";

    /// Opens `source`: a path, `:memory:` or a `sqlite://` URI such as
    /// `sqlite://data.db?mode=rwc`.
    pub fn open(source: &str) -> Result<Self> {
        let context = || format!("While opening the sqlite database `{}`", source);
        let path = match source.strip_prefix(Self::PREFIX) {
            Some(path) => format!("file:{path}"),
            None if source.contains("://") => {
                let error = Error::msg(format!(
                    "Sqlite connection url must start with `{}`",
                    Self::PREFIX
                ))
                .context(context());
                log::error!("{:#}", error);
                return Err(error);
            }
            None => source.to_string(),
        };
        let path = CString::new(path).with_context(context)?;
        let mut connection = CBox::new(ptr::null_mut(), |p| unsafe {
            sqlite3_close(p);
        });
        unsafe {
            let rc = sqlite3_open_v2(
                path.as_ptr(),
                &mut *connection,
                SQLITE_OPEN_READWRITE | SQLITE_OPEN_CREATE | SQLITE_OPEN_URI | SQLITE_OPEN_FULLMUTEX,
                ptr::null(),
            );
            if rc != SQLITE_OK {
                let message = if connection.is_null() {
                    "Out of memory".to_string()
                } else {
                    error_message_from_ptr(&sqlite3_errmsg(*connection)).to_string()
                };
                let error = Error::msg(message).context(context());
                log::error!("{:#}", error);
                return Err(error);
            }
            sqlite3_busy_timeout(*connection, BUSY_TIMEOUT_MS);
        }
        log::info!("Opened the sqlite database `{}`", source);
        Ok(Self { connection })
    }

    fn error(&self, context: impl FnOnce() -> String) -> Error {
        let message =
            unsafe { error_message_from_ptr(&sqlite3_errmsg(*self.connection)).to_string() };
        Error::msg(message).context(context())
    }

    /// Compiles a single statement, `None` when the text holds no statement at all.
    pub fn prepare(&self, sql: &str) -> Result<Option<SqlitePrepared>> {
        let context = || format!("While preparing the query:\n{}", truncate_long!(sql));
        let query = CString::new(sql)
            .context("Could not create a CString from the query String")
            .with_context(context)?;
        let mut statement = CBox::new(ptr::null_mut(), |p| unsafe {
            sqlite3_finalize(p);
        });
        let mut tail: *const c_char = ptr::null();
        unsafe {
            let rc = sqlite3_prepare_v2(
                *self.connection,
                query.as_ptr(),
                -1,
                &mut *statement,
                &mut tail,
            );
            if rc != SQLITE_OK {
                return Err(self.error(context));
            }
            if !tail.is_null() {
                let remaining = CStr::from_ptr(tail).to_string_lossy();
                if !remaining.trim_matches(|c: char| c.is_whitespace() || c == ';').is_empty() {
                    return Err(Error::msg("Cannot prepare more than one statement at a time")
                        .context(context()));
                }
            }
        }
        if statement.is_null() {
            return Ok(None);
        }
        Ok(Some(SqlitePrepared::new(statement)))
    }

    fn prepare_with(&self, sql: &str, params: &[Value]) -> Result<Option<SqlitePrepared>> {
        let Some(mut prepared) = self.prepare(sql)? else {
            if !params.is_empty() {
                return Err(Error::msg(format!(
                    "The query has no statement but {} parameters were provided",
                    params.len()
                )));
            }
            return Ok(None);
        };
        prepared
            .bind_all(params)
            .with_context(|| format!("While binding the query:\n{}", truncate_long!(sql)))?;
        Ok(Some(prepared))
    }

    fn run(&self, sql: &str, query: &str) -> Result<()> {
        self.execute(query, &[])
            .with_context(|| format!("While running `{sql}`"))
            .map(|_| ())
    }
}

impl Executor for SqliteConnection {
    fn execute(&self, sql: &str, params: &[Value]) -> Result<RowsAffected> {
        let _lock = DbLock::acquire(*self.connection);
        let Some(prepared) = self.prepare_with(sql, params)? else {
            return Ok(RowsAffected::default());
        };
        loop {
            match unsafe { sqlite3_step(*prepared.statement) } {
                SQLITE_ROW => continue,
                SQLITE_DONE => break,
                _ => {
                    return Err(self.error(|| {
                        format!("While executing the query:\n{}", truncate_long!(sql))
                    }));
                }
            }
        }
        unsafe {
            Ok(RowsAffected {
                rows_affected: sqlite3_changes64(*self.connection) as u64,
                last_affected_id: Some(sqlite3_last_insert_rowid(*self.connection)),
            })
        }
    }

    fn fetch<'s>(&'s self, sql: &str, params: &[Value]) -> Result<Rows<'s>> {
        let Some(prepared) = self.prepare_with(sql, params)? else {
            return Ok(Rows::empty());
        };
        let count = unsafe { sqlite3_column_count(*prepared.statement) };
        let labels = (0..count)
            .map(|i| extract_name(*prepared.statement, i))
            .collect::<Result<RowNames>>()?;
        Ok(Rows::new(SqliteRows {
            connection: self,
            prepared,
            labels,
            count,
            sql: sql.into(),
            done: false,
        }))
    }
}

impl Connection for SqliteConnection {
    fn ping(&self) -> Result<()> {
        let mut rows = self.fetch("SELECT 1", &[])?;
        rows.next().transpose()?;
        Ok(())
    }

    fn begin(&self) -> Result<()> {
        self.run("begin", "BEGIN")
    }

    fn commit(&self) -> Result<()> {
        self.run("commit", "COMMIT")
    }

    fn rollback(&self) -> Result<()> {
        self.run("rollback", "ROLLBACK")
    }
}

/// Steps a statement lazily, finalized when dropped.
struct SqliteRows<'c> {
    connection: &'c SqliteConnection,
    prepared: SqlitePrepared,
    labels: RowNames,
    count: c_int,
    sql: Arc<str>,
    done: bool,
}

impl<'c> Iterator for SqliteRows<'c> {
    type Item = Result<RowLabeled>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let statement = *self.prepared.statement;
        match unsafe { sqlite3_step(statement) } {
            SQLITE_ROW => Some(
                (0..self.count)
                    .map(|i| extract_value(statement, i))
                    .collect::<Result<Box<[_]>>>()
                    .map(|values| RowLabeled::new(self.labels.clone(), values)),
            ),
            SQLITE_DONE => {
                self.done = true;
                None
            }
            _ => {
                self.done = true;
                let error = self.connection.error(|| {
                    format!("While fetching the rows of:\n{}", truncate_long!(self.sql))
                });
                log::error!("{:#}", error);
                Some(Err(error))
            }
        }
    }
}
