use crate::Result;
use std::fmt::{self, Display};

/// Lifecycle callbacks run by the record engine around each operation.
///
/// Every method defaults to doing nothing. A failing `before_*` hook aborts
/// the operation before any SQL runs, a failing `after_*` hook is reported
/// as [`OrmError::AfterHook`](crate::OrmError) but the statement stays applied.
///
/// `#[derive(Entity)]` emits an empty implementation, annotate the struct
/// with `#[skiff(hooks)]` to write your own.
pub trait Hooks {
    fn before_insert(&mut self) -> Result<()> {
        Ok(())
    }
    fn after_insert(&mut self) -> Result<()> {
        Ok(())
    }
    fn before_update(&mut self) -> Result<()> {
        Ok(())
    }
    fn after_update(&mut self) -> Result<()> {
        Ok(())
    }
    fn before_delete(&mut self) -> Result<()> {
        Ok(())
    }
    fn after_delete(&mut self) -> Result<()> {
        Ok(())
    }
    fn before_query(&mut self) -> Result<()> {
        Ok(())
    }
    fn after_query(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    BeforeInsert,
    AfterInsert,
    BeforeUpdate,
    AfterUpdate,
    BeforeDelete,
    AfterDelete,
    BeforeQuery,
    AfterQuery,
}

impl Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HookKind::BeforeInsert => "before_insert",
            HookKind::AfterInsert => "after_insert",
            HookKind::BeforeUpdate => "before_update",
            HookKind::AfterUpdate => "after_update",
            HookKind::BeforeDelete => "before_delete",
            HookKind::AfterDelete => "after_delete",
            HookKind::BeforeQuery => "before_query",
            HookKind::AfterQuery => "after_query",
        })
    }
}

/// Runs one hook on the value.
pub fn dispatch(value: &mut dyn Hooks, hook: HookKind) -> Result<()> {
    log::debug!("Running hook {hook}");
    let result = match hook {
        HookKind::BeforeInsert => value.before_insert(),
        HookKind::AfterInsert => value.after_insert(),
        HookKind::BeforeUpdate => value.before_update(),
        HookKind::AfterUpdate => value.after_update(),
        HookKind::BeforeDelete => value.before_delete(),
        HookKind::AfterDelete => value.after_delete(),
        HookKind::BeforeQuery => value.before_query(),
        HookKind::AfterQuery => value.after_query(),
    };
    if let Err(ref e) = result {
        log::debug!("Hook {hook} failed: {e:#}");
    }
    result
}
