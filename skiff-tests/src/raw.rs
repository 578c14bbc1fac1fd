use skiff::{Engine, OrmError, Value, params};
use std::sync::Mutex;

static MUTEX: Mutex<()> = Mutex::new(());

pub fn raw(engine: &Engine) {
    let _lock = MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let mut session = engine.new_session();

    // Statements accumulate until executed
    session.raw("SELECT ? + ?,", params![40, 2]).raw("?", params!["text"]);
    let (sql, params) = session.pending();
    assert_eq!(sql, "SELECT ? + ?, ?");
    assert_eq!(params.len(), 3);
    let row = session
        .query_row()
        .expect("Failed to run the raw query")
        .expect("The query returns one row");
    assert_eq!(row.get::<i64>(0).unwrap(), 42);
    assert_eq!(row.values()[1], Value::Varchar(Some("text".into())));
    assert_eq!(session.pending().0, "");

    // The buffer is cleared on failure too
    crate::silent_logs! {
        assert!(session.raw("SELEKT 1", []).exec().is_err());
    }
    assert_eq!(session.pending(), ("", &[][..]));

    // Discarded statements never run
    session.raw("DELETE FROM user", []).clear();
    assert_eq!(session.pending().0, "");

    // Too many parameters
    crate::silent_logs! {
        assert!(session.raw("SELECT ?", params![1, 2]).query_row().is_err());
    }

    // Record operations need a model
    let error = session
        .count("", [])
        .expect_err("Counting without a model should fail");
    assert!(matches!(
        error.downcast_ref::<OrmError>(),
        Some(OrmError::NoModel)
    ));

    // Statements affecting rows report it
    session
        .raw("CREATE TABLE IF NOT EXISTS raw_numbers (value INTEGER)", [])
        .exec()
        .expect("Failed to create raw_numbers");
    let affected = session
        .raw("INSERT INTO raw_numbers (value) VALUES (?), (?), (?)", params![1, 2, 3])
        .exec()
        .expect("Failed to insert into raw_numbers");
    assert_eq!(affected.rows_affected, 3);
    let sum = session
        .raw("SELECT SUM(value) FROM raw_numbers", [])
        .query_row()
        .unwrap()
        .unwrap()
        .get::<i64>(0)
        .unwrap();
    assert_eq!(sum, 6);
    let values = session
        .raw("SELECT value FROM raw_numbers ORDER BY value DESC", [])
        .query_rows()
        .unwrap()
        .map(|row| row.and_then(|v| v.get::<i32>(0)))
        .collect::<skiff::Result<Vec<_>>>()
        .unwrap();
    assert_eq!(values, [3, 2, 1]);
    let mut rows = session
        .raw("SELECT value FROM raw_numbers", [])
        .query_rows()
        .unwrap();
    assert!(rows.next().is_some());
    rows.close();
    session
        .raw("DROP TABLE raw_numbers", [])
        .exec()
        .expect("Failed to drop raw_numbers");
}
