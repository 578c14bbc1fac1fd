use skiff_core::{
    Connection, Dialect, Entity, Executor, FieldDef, FieldOptions, FindOptions, Hooks, OrmError,
    Result, RowLabeled, RowNames, Rows, RowsAffected, Session, Value, create_table_statements,
    params,
};
use std::{
    collections::VecDeque,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, LazyLock, Mutex},
};

#[derive(Default)]
struct RecordingConnection {
    log: Mutex<Vec<(String, Vec<Value>)>>,
    results: Mutex<VecDeque<Vec<RowLabeled>>>,
    fail_next: Mutex<bool>,
}

impl RecordingConnection {
    fn record(&self, sql: &str, params: &[Value]) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        let mut fail = self.fail_next.lock().unwrap();
        if *fail {
            *fail = false;
            return Err(anyhow::anyhow!("no such table: account"));
        }
        Ok(())
    }
    fn statements(&self) -> Vec<String> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .map(|(sql, _)| sql.clone())
            .collect()
    }
    fn last(&self) -> (String, Vec<Value>) {
        self.log.lock().unwrap().last().cloned().unwrap()
    }
    fn push_rows(&self, rows: Vec<RowLabeled>) {
        self.results.lock().unwrap().push_back(rows);
    }
}

impl Executor for RecordingConnection {
    fn execute(&self, sql: &str, params: &[Value]) -> Result<RowsAffected> {
        self.record(sql, params)?;
        Ok(RowsAffected {
            rows_affected: 2,
            last_affected_id: Some(11),
        })
    }
    fn fetch<'s>(&'s self, sql: &str, params: &[Value]) -> Result<Rows<'s>> {
        self.record(sql, params)?;
        let rows = self.results.lock().unwrap().pop_front().unwrap_or_default();
        Ok(Rows::new(rows.into_iter().map(Ok)))
    }
}

impl Connection for RecordingConnection {
    fn ping(&self) -> Result<()> {
        Ok(())
    }
    fn begin(&self) -> Result<()> {
        self.record("BEGIN", &[])
    }
    fn commit(&self) -> Result<()> {
        self.record("COMMIT", &[])
    }
    fn rollback(&self) -> Result<()> {
        self.record("ROLLBACK", &[])
    }
}

struct TestDialect;
impl Dialect for TestDialect {
    fn name(&self) -> &'static str {
        "test"
    }
    fn data_type_of(&self, value: &Value) -> &'static str {
        match value {
            Value::Int64(..) => "BIGINT",
            Value::Float64(..) => "REAL",
            _ => "TEXT",
        }
    }
    fn table_exists(&self, table: &str) -> (String, Value) {
        ("SELECT name FROM tables WHERE name = ?".into(), table.into())
    }
}

#[derive(Default, Debug, Clone, PartialEq)]
struct Account {
    id: i64,
    name: String,
    balance: f64,
}

impl Hooks for Account {}

impl Entity for Account {
    fn type_name() -> &'static str {
        "Account"
    }
    fn field_defs() -> &'static [FieldDef] {
        static DEFS: LazyLock<Box<[FieldDef]>> = LazyLock::new(|| {
            vec![
                FieldDef {
                    attribute: "id",
                    value: Value::Int64(None),
                    tag: "primarykey;autoincrement",
                    options: FieldOptions::from_tag("primarykey;autoincrement"),
                },
                FieldDef {
                    attribute: "name",
                    value: Value::Varchar(None),
                    tag: "name:full_name;index",
                    options: FieldOptions::from_tag("name:full_name;index"),
                },
                FieldDef {
                    attribute: "balance",
                    value: Value::Float64(None),
                    tag: "",
                    options: FieldOptions::default(),
                },
            ]
            .into_boxed_slice()
        });
        &DEFS
    }
    fn get(&self, attribute: &str) -> Option<Value> {
        Some(match attribute {
            "id" => self.id.into(),
            "name" => self.name.clone().into(),
            "balance" => self.balance.into(),
            _ => return None,
        })
    }
    fn set(&mut self, attribute: &str, value: Value) -> Result<bool> {
        match attribute {
            "id" => self.id = skiff_core::AsValue::try_from_value(value)?,
            "name" => self.name = skiff_core::AsValue::try_from_value(value)?,
            "balance" => self.balance = skiff_core::AsValue::try_from_value(value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

fn session() -> (Arc<RecordingConnection>, Session) {
    let connection = Arc::new(RecordingConnection::default());
    let session = Session::new(connection.clone(), Arc::new(TestDialect));
    (connection, session)
}

fn orm_error(error: &anyhow::Error) -> &OrmError {
    error.downcast_ref::<OrmError>().expect("Expected an OrmError")
}

#[test]
fn model_parses_schema() {
    let (_, mut session) = session();
    assert!(!session.has_model());
    session.model(&Account::default()).unwrap();
    let schema = session.schema().unwrap();
    assert_eq!(schema.table_name(), "account");
    assert_eq!(schema.field_names, ["id", "full_name", "balance"]);
    assert_eq!(schema.fields[0].data_type, "BIGINT");
    assert!(schema.fields[0].is_generated_key());
    assert_eq!(schema.get_field("full_name").unwrap().attribute, "name");
    assert_eq!(schema.attribute_of("full_name"), Some("name"));
    assert_eq!(schema.attribute_of("name"), Some("name"));
    assert_eq!(schema.column_of("name"), Some("full_name"));
    assert_eq!(schema.resolve::<Account>("FULL_NAME").unwrap(), "name");
    let error = schema.resolve::<Account>("missing").unwrap_err();
    assert!(matches!(orm_error(&error), OrmError::SchemaMismatch { .. }));
}

#[test]
fn insert_multiple_values() {
    let (connection, mut session) = session();
    session.model(&Account::default()).unwrap();
    let mut values = [
        Account {
            id: 0,
            name: "Tom".into(),
            balance: 10.0,
        },
        Account {
            id: 0,
            name: "Sam".into(),
            balance: 2.5,
        },
    ];
    let id = session.insert(&mut values).unwrap();
    assert_eq!(id, 11);
    let (sql, params) = connection.last();
    assert_eq!(
        sql,
        "INSERT INTO account (full_name, balance) VALUES (?, ?), (?, ?)"
    );
    assert_eq!(params, params!["Tom", 10.0, "Sam", 2.5]);
    assert_eq!(session.pending(), ("", &[][..]));
}

#[test]
fn insert_requires_values_and_model() {
    let (connection, mut session) = session();
    let error = session.insert(&mut [Account::default()]).unwrap_err();
    assert!(matches!(orm_error(&error), OrmError::NoModel));
    session.model(&Account::default()).unwrap();
    let error = session.insert::<Account>(&mut []).unwrap_err();
    assert!(matches!(orm_error(&error), OrmError::EmptyInsert));
    assert!(connection.statements().is_empty());
}

#[test]
fn find_decodes_rows() {
    let (connection, mut session) = session();
    session.model(&Account::default()).unwrap();
    let labels: RowNames = ["id", "full_name", "balance"]
        .into_iter()
        .map(String::from)
        .collect();
    connection.push_rows(vec![
        RowLabeled::new(labels.clone(), params![1i64, "Tom", 10.0].into()),
        RowLabeled::new(labels.clone(), params![2i64, "Sam", 2.5].into()),
    ]);
    let mut accounts = Vec::<Account>::new();
    session
        .find(&mut accounts, "balance > ?", params![1.0])
        .unwrap();
    assert_eq!(
        connection.last(),
        (
            "SELECT id, full_name, balance FROM account WHERE balance > ?".to_string(),
            params![1.0].to_vec()
        )
    );
    assert_eq!(
        accounts,
        [
            Account {
                id: 1,
                name: "Tom".into(),
                balance: 10.0
            },
            Account {
                id: 2,
                name: "Sam".into(),
                balance: 2.5
            },
        ]
    );
}

#[test]
fn find_with_options() {
    let (connection, mut session) = session();
    session.model(&Account::default()).unwrap();
    let mut accounts = Vec::<Account>::new();
    session
        .find_with(
            &mut accounts,
            "",
            [],
            FindOptions::default().order_by("balance", true).limit(3),
        )
        .unwrap();
    assert!(accounts.is_empty());
    let (sql, params) = connection.last();
    assert_eq!(
        sql,
        "SELECT id, full_name, balance FROM account ORDER BY balance DESC LIMIT ?"
    );
    assert_eq!(params, [Value::UInt64(Some(3))]);
    let first = session.first::<Account>("id = ?", params![5i64]).unwrap();
    assert_eq!(first, None);
    assert_eq!(
        connection.last().0,
        "SELECT id, full_name, balance FROM account WHERE id = ? LIMIT ?"
    );
}

#[test]
fn update_delete_count() {
    let (connection, mut session) = session();
    session.model(&Account::default()).unwrap();
    let mut account = Account {
        id: 4,
        name: "Tom".into(),
        balance: 1.0,
    };
    assert_eq!(session.update(&mut account, "id = ?", params![4i64]).unwrap(), 2);
    assert_eq!(
        connection.last(),
        (
            "UPDATE account SET full_name = ?, balance = ? WHERE id = ?".to_string(),
            params!["Tom", 1.0, 4i64].to_vec()
        )
    );
    assert_eq!(session.delete("", []).unwrap(), 2);
    assert_eq!(connection.last().0, "DELETE FROM account");
    let labels: RowNames = ["COUNT(*)".to_string()].into();
    connection.push_rows(vec![RowLabeled::new(labels, params![7i64].into())]);
    assert_eq!(session.count("balance < ?", params![0.0]).unwrap(), 7);
    assert_eq!(
        connection.last().0,
        "SELECT COUNT(*) FROM account WHERE balance < ?"
    );
}

#[test]
fn raw_is_cleared_on_failure() {
    let (connection, mut session) = session();
    session.raw("DELETE FROM", []).raw("account WHERE id = ?", params![1]);
    assert_eq!(
        session.pending(),
        ("DELETE FROM account WHERE id = ?", &params![1][..])
    );
    *connection.fail_next.lock().unwrap() = true;
    assert!(session.exec().is_err());
    assert_eq!(session.pending().0, "");
    session.raw("SELECT 1", []).clear();
    assert_eq!(session.pending().0, "");
}

#[test]
fn transaction_commit_and_rollback() {
    let (connection, mut session) = session();
    session.model(&Account::default()).unwrap();
    session.begin().unwrap();
    session.begin().unwrap();
    assert!(session.is_active());
    session.commit().unwrap();
    session.commit().unwrap();
    session.rollback().unwrap();
    assert!(!session.is_active());
    assert_eq!(connection.statements(), ["BEGIN", "COMMIT"]);

    let result: Result<()> = session.transaction(|session| {
        session.delete("", [])?;
        Err(anyhow::anyhow!("stop"))
    });
    assert_eq!(result.unwrap_err().to_string(), "stop");
    assert_eq!(
        connection.statements()[2..],
        ["BEGIN", "DELETE FROM account", "ROLLBACK"]
    );

    let count = session
        .transaction(|session| session.delete("", []))
        .unwrap();
    assert_eq!(count, 2);
    assert_eq!(connection.statements().last().unwrap(), "COMMIT");
}

#[test]
fn transaction_panic_rolls_back() {
    let (connection, mut session) = session();
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let _ = session.transaction(|_| -> Result<()> { panic!("boom") });
    }));
    assert!(result.is_err());
    assert!(!session.is_active());
    assert_eq!(connection.statements(), ["BEGIN", "ROLLBACK"]);
}

#[test]
fn dropped_session_rolls_back() {
    let (connection, mut session) = session();
    session.begin().unwrap();
    drop(session);
    assert_eq!(connection.statements(), ["BEGIN", "ROLLBACK"]);
}

#[test]
fn create_table_sql() {
    let (connection, mut session) = session();
    session.model(&Account::default()).unwrap();
    let statements = create_table_statements(session.schema().unwrap()).unwrap();
    assert_eq!(
        statements,
        [
            "CREATE TABLE IF NOT EXISTS account (id INTEGER PRIMARY KEY AUTOINCREMENT, full_name TEXT, balance REAL)",
            "CREATE INDEX IF NOT EXISTS idx_account_full_name ON account(full_name)",
        ]
    );
    assert!(!session.has_table().unwrap());
    assert_eq!(
        connection.last(),
        (
            "SELECT name FROM tables WHERE name = ?".to_string(),
            vec![Value::from("account")]
        )
    );
}

#[derive(Default, Debug, Clone, PartialEq)]
struct Tag {
    id: i64,
    name: String,
}

impl Hooks for Tag {}

impl Entity for Tag {
    fn type_name() -> &'static str {
        "Tag"
    }
    fn field_defs() -> &'static [FieldDef] {
        static DEFS: LazyLock<Box<[FieldDef]>> = LazyLock::new(|| {
            vec![
                FieldDef {
                    attribute: "id",
                    value: Value::Int64(None),
                    tag: "primarykey;autoincrement",
                    options: FieldOptions::from_tag("primarykey;autoincrement"),
                },
                FieldDef {
                    attribute: "name",
                    value: Value::Varchar(None),
                    tag: "",
                    options: FieldOptions::default(),
                },
            ]
            .into_boxed_slice()
        });
        &DEFS
    }
    fn get(&self, attribute: &str) -> Option<Value> {
        Some(match attribute {
            "id" => self.id.into(),
            "name" => self.name.clone().into(),
            _ => return None,
        })
    }
    fn set(&mut self, attribute: &str, value: Value) -> Result<bool> {
        match attribute {
            "id" => self.id = skiff_core::AsValue::try_from_value(value)?,
            "name" => self.name = skiff_core::AsValue::try_from_value(value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

#[test]
fn record_type_must_match_model() {
    let (connection, mut session) = session();
    session.model(&Account::default()).unwrap();
    let mismatch = |error: &anyhow::Error| {
        matches!(
            orm_error(error),
            OrmError::ModelMismatch {
                bound: "Account",
                requested: "Tag"
            }
        )
    };

    let mut tags = [Tag {
        id: 0,
        name: "rust".into(),
    }];
    let error = session.insert(&mut tags).unwrap_err();
    assert!(mismatch(&error), "Unexpected error {error:#}");
    let error = session.find(&mut Vec::<Tag>::new(), "", []).unwrap_err();
    assert!(mismatch(&error), "Unexpected error {error:#}");
    let error = session.first::<Tag>("id = ?", params![1]).unwrap_err();
    assert!(mismatch(&error), "Unexpected error {error:#}");
    let error = session.update(&mut tags[0], "", []).unwrap_err();
    assert!(mismatch(&error), "Unexpected error {error:#}");
    assert!(connection.statements().is_empty());

    session.model(&Tag::default()).unwrap();
    session.insert(&mut tags).unwrap();
    assert_eq!(
        connection.last().0,
        "INSERT INTO tag (name) VALUES (?)"
    );
}
