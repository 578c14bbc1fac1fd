use skiff::{Engine, Entity, Value, params};
use std::sync::Mutex;
use time::{PrimitiveDateTime, macros::datetime};
use uuid::Uuid;

static MUTEX: Mutex<()> = Mutex::new(());

#[derive(Entity, Default, Clone, Debug, PartialEq)]
pub struct Profile {
    #[skiff(primary_key, name = "profile_id")]
    pub id: Uuid,
    pub display_name: Option<String>,
    pub is_active: bool,
    pub score: f64,
    pub followers: u32,
    pub joined: Option<PrimitiveDateTime>,
    pub avatar: Vec<u8>,
    #[skiff(skip)]
    pub cached_rank: u32,
}

pub fn profiles(engine: &Engine) {
    let _lock = MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let mut session = engine.new_session();
    session
        .model(&Profile::default())
        .expect("Failed to bind the Profile model");
    let schema = session.schema().expect("The model should be bound");
    assert_eq!(schema.fields.len(), 7);
    assert_eq!(schema.field_names[0], "profile_id");
    assert_eq!(schema.attribute_of("profile_id"), Some("id"));

    // Setup
    session.drop_table().expect("Failed to drop the profile table");
    let result = session.create_table();
    assert!(
        result.is_ok(),
        "Failed to create the profile table: {:?}",
        result.unwrap_err()
    );

    // Insert
    let mut profiles = [
        Profile {
            id: Uuid::parse_str("a1a1a1a1-a1a1-a1a1-a1a1-a1a1a1a1a1a1").unwrap(),
            display_name: Some("Alice Wonderland".into()),
            is_active: true,
            score: 98.5,
            followers: 56,
            joined: Some(datetime!(2023-11-12 08:15:30.25)),
            avatar: vec![0x89, 0x50, 0x4e, 0x47],
            cached_rank: 3,
        },
        Profile {
            id: Uuid::parse_str("b2b2b2b2-b2b2-b2b2-b2b2-b2b2b2b2b2b2").unwrap(),
            display_name: None,
            is_active: false,
            score: -1.0,
            followers: 0,
            joined: None,
            avatar: vec![],
            cached_rank: 0,
        },
    ];
    let result = session.insert(&mut profiles);
    assert!(
        result.is_ok(),
        "Failed to insert the profiles: {:?}",
        result.unwrap_err()
    );

    // Round trip, skipped attributes come back with their default
    let mut found = Vec::<Profile>::new();
    session
        .find_with(
            &mut found,
            "",
            [],
            skiff::FindOptions::default().order_by("score", true),
        )
        .expect("Failed to find the profiles");
    assert_eq!(found.len(), 2);
    assert_eq!(
        found[0],
        Profile {
            cached_rank: 0,
            ..profiles[0].clone()
        }
    );
    assert_eq!(found[1], profiles[1]);

    // Condition on the overridden column name
    let bob = session
        .first::<Profile>("profile_id = ?", params![profiles[1].id])
        .expect("Failed to query by profile_id")
        .expect("The profile should exist");
    assert_eq!(bob.display_name, None);

    // Update rewrites every attribute, only the changed ones differ
    let mut changed = Profile {
        followers: 57,
        ..found[0].clone()
    };
    let id = changed.id;
    let affected = session
        .update(&mut changed, "profile_id = ?", params![id])
        .expect("Failed to update the profile");
    assert_eq!(affected, 1);
    let after = session
        .first::<Profile>("profile_id = ?", params![id])
        .expect("Failed to query the profile")
        .expect("The profile should exist");
    assert_eq!(after.followers, 57);
    assert_eq!(after, changed);

    // Plain rows
    let row = session
        .raw("SELECT display_name, followers FROM profile WHERE followers > ?", params![10])
        .query_row()
        .expect("Failed to query the raw row")
        .expect("A row should match");
    assert_eq!(row.names(), ["display_name", "followers"]);
    assert_eq!(
        row.get_column("display_name"),
        Some(&Value::Varchar(Some("Alice Wonderland".into())))
    );
    assert_eq!(row.get::<u32>(1).unwrap(), 57);

    assert_eq!(session.delete("", []).unwrap(), 2);
}
