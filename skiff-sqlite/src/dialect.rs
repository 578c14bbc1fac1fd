use skiff_core::{Dialect, Value};

/// Storage types and catalog queries of sqlite.
#[derive(Default, Debug, Clone, Copy)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite3"
    }

    fn data_type_of(&self, value: &Value) -> &'static str {
        match value {
            Value::Int8(..)
            | Value::Int16(..)
            | Value::Int32(..)
            | Value::UInt8(..)
            | Value::UInt16(..)
            | Value::UInt32(..) => "INTEGER",
            Value::Boolean(..) => "BOOLEAN",
            Value::Int64(..) | Value::UInt64(..) => "BIGINT",
            Value::Float32(..) | Value::Float64(..) => "REAL",
            Value::Varchar(..) => "TEXT",
            Value::Blob(..) | Value::Uuid(..) => "BINARY",
            Value::Timestamp(..) | Value::TimestampWithTimezone(..) => "DATETIME",
            Value::Null | Value::Unknown(..) => "TEXT",
        }
    }

    fn table_exists(&self, table: &str) -> (String, Value) {
        (
            "SELECT name FROM sqlite_master WHERE type='table' AND name = ?".into(),
            table.into(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skiff_core::AsValue;

    #[test]
    fn storage_types() {
        let dialect = SqliteDialect;
        assert_eq!(dialect.data_type_of(&i32::as_empty_value()), "INTEGER");
        assert_eq!(dialect.data_type_of(&u8::as_empty_value()), "INTEGER");
        assert_eq!(dialect.data_type_of(&i64::as_empty_value()), "BIGINT");
        assert_eq!(dialect.data_type_of(&usize::as_empty_value()), "BIGINT");
        assert_eq!(dialect.data_type_of(&bool::as_empty_value()), "BOOLEAN");
        assert_eq!(dialect.data_type_of(&f32::as_empty_value()), "REAL");
        assert_eq!(dialect.data_type_of(&String::as_empty_value()), "TEXT");
        assert_eq!(dialect.data_type_of(&Vec::<u8>::as_empty_value()), "BINARY");
        assert_eq!(dialect.data_type_of(&uuid::Uuid::as_empty_value()), "BINARY");
        assert_eq!(
            dialect.data_type_of(&time::PrimitiveDateTime::as_empty_value()),
            "DATETIME"
        );
        assert_eq!(dialect.data_type_of(&Value::Unknown(None)), "TEXT");
    }

    #[test]
    fn table_exists_query() {
        let (sql, param) = SqliteDialect.table_exists("user");
        assert_eq!(
            sql,
            "SELECT name FROM sqlite_master WHERE type='table' AND name = ?"
        );
        assert_eq!(param, Value::from("user"));
    }
}
