use crate::HookKind;

/// Failure kinds raised by the ORM itself.
///
/// They travel inside `anyhow::Error`, callers match on them with
/// `error.downcast_ref::<OrmError>()`. Storage errors are not wrapped, they
/// come back with the driver message and the query attached as context.
#[derive(Debug, thiserror::Error)]
pub enum OrmError {
    #[error("No driver registered under the name `{0}`")]
    UnknownDialect(String),
    #[error("The session is bound to `{bound}`, cannot operate on `{requested}`")]
    ModelMismatch {
        bound: &'static str,
        requested: &'static str,
    },
    #[error("A dialect is required to parse the schema of `{0}`")]
    MissingDialect(&'static str),
    #[error("No model is bound to the session, call `model` first")]
    NoModel,
    #[error("Nothing to insert, the slice of values is empty")]
    EmptyInsert,
    #[error("The schema of `{0}` has no fields")]
    NoFields(String),
    #[error("Column `{column}` does not map to any attribute of `{entity}`")]
    SchemaMismatch { entity: &'static str, column: String },
    #[error("Cannot resolve `{column}`, `{entity}` has no such identifier")]
    MissingIdentifier { entity: &'static str, column: String },
    #[error("Hook {hook} failed after the statement affected {outcome} rows")]
    AfterHook {
        hook: HookKind,
        outcome: i64,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl OrmError {
    pub(crate) fn after_hook(hook: HookKind, outcome: i64, error: crate::Error) -> Self {
        OrmError::AfterHook {
            hook,
            outcome,
            source: error.into(),
        }
    }
}
