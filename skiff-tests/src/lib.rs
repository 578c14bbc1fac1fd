mod hooks;
mod migration;
mod profile;
mod raw;
mod transaction;
mod user;

use crate::{
    hooks::hooks, migration::migration, profile::profiles, raw::raw, transaction::transaction,
    user::users,
};
use log::LevelFilter;
use skiff::Engine;
use std::env;

pub use user::User;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Runs every scenario against `engine`, the database should start empty.
pub fn execute_tests(engine: &Engine) {
    users(engine);
    profiles(engine);
    hooks(engine);
    transaction(engine);
    migration(engine);
    raw(engine);
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
