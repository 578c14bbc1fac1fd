use skiff_core::Driver;
use skiff_sqlite::SqliteDriver;
use std::{
    collections::HashMap,
    sync::{Arc, LazyLock, RwLock},
};

static DRIVERS: LazyLock<RwLock<HashMap<String, Arc<dyn Driver>>>> = LazyLock::new(|| {
    let sqlite: Arc<dyn Driver> = Arc::new(SqliteDriver::new());
    RwLock::new(HashMap::from([
        ("sqlite3".to_string(), sqlite.clone()),
        ("sqlite".to_string(), sqlite),
    ]))
});

/// Makes `driver` available to [`Engine::new`](crate::Engine::new) under `name`,
/// replacing any driver previously registered with the same name.
pub fn register_driver(name: impl Into<String>, driver: Arc<dyn Driver>) {
    let name = name.into();
    log::debug!("Registering the driver `{}` as `{}`", driver.name(), name);
    DRIVERS
        .write()
        .unwrap_or_else(|e| e.into_inner())
        .insert(name, driver);
}

pub fn get_driver(name: &str) -> Option<Arc<dyn Driver>> {
    DRIVERS
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .get(name)
        .cloned()
}
