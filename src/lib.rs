//! Skiff maps Rust structs to tables, runs CRUD statements around lifecycle
//! hooks and scopes work in transactions.
//!
//! ```no_run
//! use skiff::{Engine, Entity, params};
//!
//! #[derive(Entity, Default, Clone, Debug)]
//! struct User {
//!     #[skiff(primary_key)]
//!     name: String,
//!     age: i32,
//! }
//!
//! # fn main() -> skiff::Result<()> {
//! let engine = Engine::new("sqlite3", "sqlite://users.db?mode=rwc")?;
//! engine.migrate(&User::default())?;
//! let mut session = engine.new_session();
//! session.model(&User::default())?;
//! session.insert(&mut [User { name: "Tom".into(), age: 18 }])?;
//! let mut users = Vec::<User>::new();
//! session.find(&mut users, "age > ?", params![10])?;
//! # Ok(())
//! # }
//! ```
mod engine;
mod registry;

pub use ::skiff_core::*;
pub use ::skiff_macros::Entity;
pub use ::skiff_sqlite::{SqliteConnection, SqliteDialect, SqliteDriver};
pub use engine::*;
pub use registry::*;
