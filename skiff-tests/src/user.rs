use skiff::{Engine, Entity, params};
use std::sync::Mutex;

static MUTEX: Mutex<()> = Mutex::new(());

#[derive(Entity, Default, Clone, Debug, PartialEq)]
pub struct User {
    #[skiff(primary_key, auto_increment)]
    pub id: i64,
    #[skiff(unique)]
    pub username: String,
    #[skiff(index)]
    pub age: i32,
}

pub fn users(engine: &Engine) {
    let _lock = MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let mut session = engine.new_session();
    session
        .model(&User::default())
        .expect("Failed to bind the User model");

    // Cleanup
    let result = session.drop_table();
    assert!(
        result.is_ok(),
        "Failed to drop the user table: {:?}",
        result.unwrap_err()
    );

    // Setup
    let result = session.create_table();
    assert!(
        result.is_ok(),
        "Failed to create the user table: {:?}",
        result.unwrap_err()
    );
    assert!(session.has_table().expect("Failed to check the user table"));

    // Insert
    let mut alice = [User {
        id: 0,
        username: "alice".into(),
        age: 30,
    }];
    let id = session.insert(&mut alice).expect("Failed to insert alice");
    assert_eq!(id, 1);

    // Find
    let mut found = Vec::<User>::new();
    session
        .find(&mut found, "age > ?", params![25])
        .expect("Failed to find the users older than 25");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, 1);
    assert_eq!(found[0].username, "alice");
    assert_eq!(found[0].age, 30);

    // Update
    let mut older = User {
        id: 1,
        username: "alice".into(),
        age: 31,
    };
    let affected = session
        .update(&mut older, "id = ?", params![1])
        .expect("Failed to update alice");
    assert_eq!(affected, 1);
    let updated = session
        .first::<User>("id = ?", params![1])
        .expect("Failed to query alice")
        .expect("Alice should still exist");
    assert_eq!(updated, older);
    assert_eq!(session.count("age > ?", params![30]).unwrap(), 1);

    // Many values
    let mut others = [
        User {
            id: 0,
            username: "bob".into(),
            age: 19,
        },
        User {
            id: 0,
            username: "carol".into(),
            age: 45,
        },
        User {
            id: 0,
            username: "dave".into(),
            age: 27,
        },
    ];
    let id = session.insert(&mut others).expect("Failed to insert 3 users");
    assert_eq!(id, 4);
    assert_eq!(session.count("", []).unwrap(), 4);
    let mut found = Vec::<User>::new();
    session
        .find_with(
            &mut found,
            "age >= ?",
            params![20],
            skiff::FindOptions::default().order_by("age", true).limit(2),
        )
        .expect("Failed to find the two oldest users");
    assert_eq!(
        found
            .iter()
            .map(|v| v.username.as_str())
            .collect::<Vec<_>>(),
        ["carol", "alice"]
    );

    // Unique constraint
    let result;
    crate::silent_logs! {
        result = session.insert(&mut [User {
            id: 0,
            username: "bob".into(),
            age: 50,
        }]);
    }
    assert!(result.is_err(), "The username should be unique");
    assert!(
        format!("{:#}", result.unwrap_err()).contains("UNIQUE"),
        "The error should come from the storage"
    );

    // Delete
    let affected = session
        .delete("age > ?", params![30])
        .expect("Failed to delete the users older than 30");
    assert_eq!(affected, 2);
    assert_eq!(session.count("age > ?", params![30]).unwrap(), 0);
    let affected = session
        .delete("", [])
        .expect("Failed to delete every user");
    assert_eq!(affected, 2);
    assert_eq!(session.count("", []).unwrap(), 0);
}
