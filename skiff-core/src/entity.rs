use crate::{FieldDef, Hooks, Result, Session, Value};

/// A struct mapped to a table, implemented by `#[derive(Entity)]`.
///
/// The derive replaces runtime reflection: `field_defs` lists the attributes
/// in declaration order, `get` and `set` access them by attribute name.
pub trait Entity: Hooks + Default + 'static {
    /// Name of the concrete type, the table name is its lowercase form.
    fn type_name() -> &'static str;

    /// Attribute descriptors in declaration order.
    fn field_defs() -> &'static [FieldDef];

    /// Current value of the attribute, `None` when no such attribute exists.
    fn get(&self, attribute: &str) -> Option<Value>;

    /// Assigns the attribute. Returns `false` when no such attribute exists
    /// and an error when the value does not convert to the attribute type.
    fn set(&mut self, attribute: &str, value: Value) -> Result<bool>;
}

/// Type erased entity value, lets heterogeneous models be migrated together.
pub trait AnyEntity {
    fn type_name(&self) -> &'static str;
    /// Binds the value as the session model.
    fn bind_to(&self, session: &mut Session) -> Result<()>;
}

impl<E: Entity + Clone> AnyEntity for E {
    fn type_name(&self) -> &'static str {
        E::type_name()
    }
    fn bind_to(&self, session: &mut Session) -> Result<()> {
        session.model(self).map(|_| ())
    }
}
