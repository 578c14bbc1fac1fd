use crate::{OrmError, Result, Schema, Session};
use std::fmt::Write;

/// Statements creating the table of `schema` and its indexes.
pub fn create_table_statements(schema: &Schema) -> Result<Vec<String>> {
    if schema.fields.is_empty() {
        return Err(OrmError::NoFields(schema.name.to_string()).into());
    }
    let table = schema.table_name().to_lowercase();
    let mut sql = format!("CREATE TABLE IF NOT EXISTS {table} (");
    let mut indexes = Vec::new();
    for (i, field) in schema.fields.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        if field.is_generated_key() {
            // SQLite only accepts AUTOINCREMENT on a INTEGER PRIMARY KEY column
            let _ = write!(sql, "{} INTEGER PRIMARY KEY AUTOINCREMENT", field.name);
        } else {
            let _ = write!(sql, "{} {}", field.name, field.data_type);
            if field.primary_key {
                sql.push_str(" PRIMARY KEY");
            }
            if field.unique {
                sql.push_str(" UNIQUE");
            }
        }
        if field.index {
            indexes.push(format!(
                "CREATE INDEX IF NOT EXISTS idx_{table}_{} ON {table}({})",
                field.name.to_lowercase(),
                field.name,
            ));
        }
    }
    sql.push(')');
    let mut result = Vec::with_capacity(1 + indexes.len());
    result.push(sql);
    result.extend(indexes);
    Ok(result)
}

impl Session {
    /// Creates the table of the bound model and its indexes, when missing.
    pub fn create_table(&mut self) -> Result<()> {
        let schema = self.bound_schema()?;
        for statement in create_table_statements(&schema)? {
            self.raw(&statement, []).exec()?;
        }
        Ok(())
    }

    pub fn drop_table(&mut self) -> Result<()> {
        let schema = self.bound_schema()?;
        let sql = format!("DROP TABLE IF EXISTS {}", schema.table_name());
        self.raw(&sql, []).exec()?;
        Ok(())
    }

    pub fn has_table(&mut self) -> Result<bool> {
        let schema = self.bound_schema()?;
        let (sql, param) = self.dialect().table_exists(schema.table_name());
        Ok(self.raw(&sql, [param]).query_row()?.is_some())
    }
}
