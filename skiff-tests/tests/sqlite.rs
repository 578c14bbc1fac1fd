#[cfg(test)]
mod tests {
    use skiff::Engine;
    use skiff_tests::{execute_tests, init_logs};
    use std::{fs, path::Path, sync::Mutex};

    static MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn sqlite() {
        init_logs();
        const DB_PATH: &'static str = "../target/debug/tests.sqlite";
        let _guard = MUTEX.lock().unwrap();
        if Path::new(DB_PATH).exists() {
            fs::remove_file(DB_PATH)
                .expect(format!("Failed to remove test database file {}", DB_PATH).as_str());
        }
        let engine = Engine::new("sqlite3", &format!("sqlite://{}?mode=rwc", DB_PATH))
            .expect("Could not open the database");
        execute_tests(&engine);
        engine.close();
    }

    #[test]
    fn sqlite_memory() {
        init_logs();
        let engine = Engine::new("sqlite", ":memory:").expect("Could not open the database");
        execute_tests(&engine);
    }
}
