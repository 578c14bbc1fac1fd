use crate::{CBox, error_message_from_ptr};
use libsqlite3_sys::*;
use skiff_core::{Error, Result, TIMESTAMP_FORMAT, Value, truncate_long};
use std::{
    ffi::{CStr, c_int},
    fmt::{self, Display},
    os::raw::{c_char, c_void},
};
use time::format_description::well_known::Rfc3339;

/// A compiled statement with its positional parameters.
pub struct SqlitePrepared {
    pub(crate) statement: CBox<*mut sqlite3_stmt>,
    pub(crate) index: c_int,
}

impl SqlitePrepared {
    pub(crate) fn new(statement: CBox<*mut sqlite3_stmt>) -> Self {
        unsafe {
            sqlite3_clear_bindings(*statement);
        }
        Self {
            statement,
            index: 1,
        }
    }

    pub fn bind_all<'v>(&mut self, values: impl IntoIterator<Item = &'v Value>) -> Result<&mut Self> {
        for value in values {
            self.bind(value)?;
        }
        let expected = unsafe { sqlite3_bind_parameter_count(*self.statement) };
        if self.index - 1 != expected {
            return Err(Error::msg(format!(
                "The query expects {} parameters but {} were provided",
                expected,
                self.index - 1
            )));
        }
        Ok(self)
    }

    pub fn bind(&mut self, value: &Value) -> Result<&mut Self> {
        let index = self.index;
        self.bind_index(value, index)
    }

    fn bind_text(&mut self, index: c_int, v: &str) -> c_int {
        unsafe {
            sqlite3_bind_text(
                *self.statement,
                index,
                v.as_ptr() as *const c_char,
                v.len() as c_int,
                SQLITE_TRANSIENT(),
            )
        }
    }

    fn bind_blob(&mut self, index: c_int, v: &[u8]) -> c_int {
        unsafe {
            sqlite3_bind_blob(
                *self.statement,
                index,
                v.as_ptr() as *const c_void,
                v.len() as c_int,
                SQLITE_TRANSIENT(),
            )
        }
    }

    pub fn bind_index(&mut self, value: &Value, index: c_int) -> Result<&mut Self> {
        let out_of_range = |v: &dyn Display| {
            Error::msg(format!(
                "Cannot bind value `{v}` into a sqlite integer because it's out of bounds"
            ))
        };
        let statement = *self.statement;
        let rc = unsafe {
            match value {
                v if v.is_null() => sqlite3_bind_null(statement, index),
                Value::Boolean(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
                Value::Int8(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
                Value::Int16(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
                Value::Int32(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
                Value::Int64(Some(v)) => sqlite3_bind_int64(statement, index, *v),
                Value::UInt8(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
                Value::UInt16(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
                Value::UInt32(Some(v)) => sqlite3_bind_int64(statement, index, *v as sqlite3_int64),
                Value::UInt64(Some(v)) => {
                    let Ok(v) = sqlite3_int64::try_from(*v) else {
                        return Err(out_of_range(v));
                    };
                    sqlite3_bind_int64(statement, index, v)
                }
                Value::Float32(Some(v)) => sqlite3_bind_double(statement, index, *v as f64),
                Value::Float64(Some(v)) => sqlite3_bind_double(statement, index, *v),
                Value::Varchar(Some(v)) | Value::Unknown(Some(v)) => self.bind_text(index, v),
                Value::Blob(Some(v)) => self.bind_blob(index, v),
                Value::Timestamp(Some(v)) => {
                    let v = v.format(TIMESTAMP_FORMAT)?;
                    self.bind_text(index, &v)
                }
                Value::TimestampWithTimezone(Some(v)) => {
                    let v = v.format(&Rfc3339)?;
                    self.bind_text(index, &v)
                }
                Value::Uuid(Some(v)) => self.bind_blob(index, v.as_bytes()),
                _ => {
                    let error =
                        Error::msg(format!("Cannot use a {:?} as a query parameter", value));
                    log::error!("{:#}", error);
                    return Err(error);
                }
            }
        };
        if rc != SQLITE_OK {
            let error = unsafe {
                let db = sqlite3_db_handle(statement);
                let query = sqlite3_sql(statement);
                Error::msg(error_message_from_ptr(&sqlite3_errmsg(db)).to_string()).context(
                    format!(
                        "Cannot bind parameter {} to query:\n{}",
                        index,
                        truncate_long!(CStr::from_ptr(query).to_string_lossy())
                    ),
                )
            };
            log::error!("{:#}", error);
            return Err(error);
        }
        self.index = index + 1;
        Ok(self)
    }
}

impl Display for SqlitePrepared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sql = unsafe { sqlite3_sql(*self.statement) };
        if sql.is_null() {
            return write!(f, "{:p}", *self.statement);
        }
        let sql = unsafe { CStr::from_ptr(sql) }.to_string_lossy();
        write!(f, "{}", truncate_long!(sql))
    }
}
