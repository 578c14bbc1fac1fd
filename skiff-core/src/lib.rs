mod as_value;
mod clause;
mod dialect;
mod entity;
mod error;
mod executor;
mod field;
mod hooks;
mod query;
mod record;
mod schema;
mod session;
mod table;
mod transaction;
mod util;
mod value;

pub use ::anyhow::Context;
pub use as_value::*;
pub use clause::*;
pub use dialect::*;
pub use entity::*;
pub use error::*;
pub use executor::*;
pub use field::*;
pub use hooks::*;
pub use query::*;
pub use record::*;
pub use schema::*;
pub use session::*;
pub use table::*;
pub use transaction::*;
pub use util::*;
pub use value::*;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
