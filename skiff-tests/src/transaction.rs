use skiff::{Engine, Entity, Error, Session, params};
use std::{
    panic::{self, AssertUnwindSafe},
    sync::Mutex,
};

static MUTEX: Mutex<()> = Mutex::new(());

#[derive(Entity, Default, Clone, Debug)]
pub struct Ledger {
    #[skiff(primary_key, auto_increment)]
    pub id: i64,
    pub entry: String,
    pub amount: i64,
}

fn entry(entry: &str, amount: i64) -> Ledger {
    Ledger {
        id: 0,
        entry: entry.into(),
        amount,
    }
}

fn model(engine: &Engine) -> Session {
    let mut session = engine.new_session();
    session
        .model(&Ledger::default())
        .expect("Failed to bind the Ledger model");
    session
}

pub fn transaction(engine: &Engine) {
    let _lock = MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let mut session = model(engine);
    session.drop_table().expect("Failed to drop the ledger table");
    session
        .create_table()
        .expect("Failed to create the ledger table");

    // An error rolls back
    let result = session.transaction(|session| {
        session.insert(&mut [entry("rent", -900)])?;
        session.insert(&mut [entry("salary", 2500)])?;
        Err::<(), _>(Error::msg("Changed my mind"))
    });
    assert!(result.is_err());
    assert!(!session.is_active());
    assert_eq!(session.count("", []).unwrap(), 0);

    // A panic rolls back and keeps unwinding
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        session.transaction::<()>(|session| {
            session.insert(&mut [entry("groceries", -80)])?;
            panic!("Unexpected failure inside the transaction");
        })
    }));
    assert!(result.is_err());
    assert!(!session.is_active());
    assert_eq!(session.count("", []).unwrap(), 0);

    // Success commits
    let total = session
        .transaction(|session| {
            session.insert(&mut [entry("rent", -900), entry("salary", 2500)])?;
            session.count("amount > ?", params![0])
        })
        .expect("The transaction should commit");
    assert_eq!(total, 1);
    assert_eq!(session.count("", []).unwrap(), 2);

    // Nested scopes join the outer one
    let result = session.transaction(|session| {
        session.insert(&mut [entry("coffee", -3)])?;
        session.transaction(|session| {
            session.insert(&mut [entry("tea", -2)])?;
            Ok(())
        })?;
        assert!(session.is_active());
        Err::<(), _>(Error::msg("Outer scope fails"))
    });
    assert!(result.is_err());
    assert_eq!(session.count("", []).unwrap(), 2);

    // Explicit begin and rollback
    session.begin().expect("Failed to begin");
    session
        .insert(&mut [entry("bonus", 300)])
        .expect("Failed to insert inside the transaction");
    assert_eq!(session.count("", []).unwrap(), 3);
    session.rollback().expect("Failed to rollback");
    assert_eq!(session.count("", []).unwrap(), 2);

    // A session dropped with an open transaction rolls it back
    {
        let mut session = model(engine);
        session.begin().expect("Failed to begin");
        session
            .insert(&mut [entry("lost", 1)])
            .expect("Failed to insert inside the transaction");
    }
    assert_eq!(session.count("", []).unwrap(), 2);

    session.delete("", []).expect("Failed to clean the ledger");
}
