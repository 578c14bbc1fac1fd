use crate::{hooks::Note, user::User};
use skiff::{AnyEntity, Engine, Entity, params};
use std::sync::Mutex;

static MUTEX: Mutex<()> = Mutex::new(());

#[derive(Entity, Default, Clone, Debug)]
pub struct Invoice {
    #[skiff(primary_key, auto_increment)]
    pub id: i64,
    #[skiff(tag = "name:InvoiceNumber;unique")]
    pub number: String,
    #[skiff(index)]
    pub customer: String,
    pub total: f64,
}

#[derive(Entity, Default, Clone, Debug)]
pub struct Empty {
    #[skiff(skip)]
    pub ignored: i32,
}

pub fn migration(engine: &Engine) {
    let _lock = MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let mut session = engine.new_session();
    session
        .model(&Invoice::default())
        .expect("Failed to bind the Invoice model");
    session.drop_table().expect("Failed to drop the invoice table");
    assert!(!session.has_table().unwrap());

    // Creates what is missing, leaves the rest alone
    let user = User::default();
    let invoice = Invoice::default();
    let note = Note::default();
    let entities: [&dyn AnyEntity; 3] = [&user, &invoice, &note];
    let result = engine.migrate_all(&entities);
    assert!(
        result.is_ok(),
        "Failed to migrate: {:?}",
        result.unwrap_err()
    );
    assert!(session.has_table().unwrap());
    session
        .insert(&mut [Invoice {
            id: 0,
            number: "INV-001".into(),
            customer: "ACME".into(),
            total: 120.0,
        }])
        .expect("Failed to insert an invoice");
    engine
        .migrate(&invoice)
        .expect("Migrating an existing table should succeed");
    assert_eq!(session.count("InvoiceNumber = ?", params!["INV-001"]).unwrap(), 1);

    // The index exists
    let index = session
        .raw(
            "SELECT name FROM sqlite_master WHERE type = 'index' AND tbl_name = ?",
            params!["invoice"],
        )
        .query_rows()
        .expect("Failed to list the indexes")
        .map(|row| row.and_then(|v| v.get::<String>(0)))
        .collect::<skiff::Result<Vec<_>>>()
        .expect("Failed to read the indexes");
    assert!(
        index.iter().any(|v| v == "idx_invoice_customer"),
        "Missing index in {index:?}"
    );

    // A type without fields cannot be migrated
    crate::silent_logs! {
        assert!(engine.migrate(&Empty::default()).is_err());
    }
    session.drop_table().expect("Failed to drop the invoice table");
}
