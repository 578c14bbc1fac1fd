use crate::Value;

/// Backend specific knowledge the core needs to describe a schema.
pub trait Dialect: Send + Sync {
    fn name(&self) -> &'static str;

    /// Storage type of a column whose attribute has the type of `value`.
    fn data_type_of(&self, value: &Value) -> &'static str;

    /// Parameterized query returning one row when `table` exists.
    fn table_exists(&self, table: &str) -> (String, Value);
}
