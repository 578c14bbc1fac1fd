use skiff::{Engine, Entity, Error, HookKind, Hooks, OrmError, Result, params};
use std::sync::Mutex;

static MUTEX: Mutex<()> = Mutex::new(());

#[derive(Entity, Default, Clone, Debug)]
#[skiff(hooks)]
pub struct Note {
    #[skiff(primary_key, auto_increment)]
    pub id: i64,
    pub title: String,
    pub slug: String,
    #[skiff(skip)]
    pub reject_after_insert: bool,
    #[skiff(skip)]
    pub locked: bool,
    #[skiff(skip)]
    pub loaded: bool,
}

impl Hooks for Note {
    fn before_insert(&mut self) -> Result<()> {
        if self.title.is_empty() {
            return Err(Error::msg("A note needs a title"));
        }
        self.slug = self.title.to_lowercase().replace(' ', "-");
        Ok(())
    }
    fn after_insert(&mut self) -> Result<()> {
        if self.reject_after_insert {
            return Err(Error::msg("Rejected after insert"));
        }
        Ok(())
    }
    fn before_delete(&mut self) -> Result<()> {
        if self.locked {
            return Err(Error::msg("Notes are locked"));
        }
        Ok(())
    }
    fn after_query(&mut self) -> Result<()> {
        self.loaded = true;
        Ok(())
    }
}

pub fn hooks(engine: &Engine) {
    let _lock = MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let mut session = engine.new_session();
    session
        .model(&Note::default())
        .expect("Failed to bind the Note model");
    session.drop_table().expect("Failed to drop the note table");
    session
        .create_table()
        .expect("Failed to create the note table");

    // The value changed by before_insert is the one persisted
    let mut notes = [Note {
        title: "Hello World".into(),
        ..Default::default()
    }];
    session.insert(&mut notes).expect("Failed to insert a note");
    assert_eq!(notes[0].slug, "hello-world");
    let stored = session
        .first::<Note>("title = ?", params!["Hello World"])
        .expect("Failed to query the note")
        .expect("The note should exist");
    assert_eq!(stored.slug, "hello-world");
    assert!(stored.loaded, "after_query should run on every decoded value");

    // A failing before hook stops the statement
    let result = session.insert(&mut [Note::default()]);
    assert!(result.is_err());
    assert_eq!(session.count("", []).unwrap(), 1);

    // A failing after hook keeps the row
    let result = session.insert(&mut [Note {
        title: "Second note".into(),
        reject_after_insert: true,
        ..Default::default()
    }]);
    let error = result.expect_err("The after_insert hook should fail");
    match error.downcast_ref::<OrmError>() {
        Some(OrmError::AfterHook { hook, outcome, .. }) => {
            assert_eq!(*hook, HookKind::AfterInsert);
            assert_eq!(*outcome, 2);
        }
        other => panic!("Unexpected error {other:?}"),
    }
    assert_eq!(session.count("", []).unwrap(), 2);

    // Delete hooks run on the bound value
    session
        .model(&Note {
            locked: true,
            ..Default::default()
        })
        .expect("Failed to bind the locked Note");
    assert!(session.delete("", []).is_err());
    assert_eq!(session.count("", []).unwrap(), 2);
    session
        .model(&Note::default())
        .expect("Failed to bind the Note model");
    assert_eq!(session.delete("", []).unwrap(), 2);
}
