#[cfg(test)]
mod tests {
    use skiff::{AsValue, Entity, OrmError, Schema, SqliteDialect, Value};
    use time::PrimitiveDateTime;
    use uuid::Uuid;

    #[test]
    fn field_defs_follow_declaration_order() {
        #[derive(Entity, Default, Clone)]
        struct SomeEntity {
            a: i8,
            b: String,
            c: Option<f64>,
            d: Vec<u8>,
        }
        let defs = SomeEntity::field_defs();
        assert_eq!(SomeEntity::type_name(), "SomeEntity");
        assert_eq!(defs.len(), 4);
        assert_eq!(
            defs.iter().map(|v| v.attribute).collect::<Vec<_>>(),
            ["a", "b", "c", "d"]
        );
        assert!(matches!(defs[0].value, Value::Int8(None)));
        assert!(matches!(defs[1].value, Value::Varchar(None)));
        assert!(matches!(defs[2].value, Value::Float64(None)));
        assert!(matches!(defs[3].value, Value::Blob(None)));

        let schema = Schema::parse::<SomeEntity>(Some(&SqliteDialect)).unwrap();
        assert_eq!(schema.name, "SomeEntity");
        assert_eq!(schema.table_name(), "someentity");
        assert_eq!(schema.field_names, ["a", "b", "c", "d"]);
        assert_eq!(
            schema
                .fields
                .iter()
                .map(|v| v.data_type)
                .collect::<Vec<_>>(),
            ["INTEGER", "TEXT", "REAL", "BINARY"]
        );
    }

    #[test]
    fn options_and_names() {
        #[derive(Entity, Default, Clone)]
        struct Account {
            #[skiff(primary_key, auto_increment)]
            id: i64,
            #[skiff(name = "EmailAddress", unique)]
            email: String,
            #[skiff(tag = "name:Country;index")]
            country: String,
            r#type: u16,
            #[skiff(skip)]
            #[allow(dead_code)]
            session_token: Option<String>,
        }
        let defs = Account::field_defs();
        assert_eq!(defs.len(), 4);
        assert!(defs[0].options.is_generated_key());
        assert_eq!(defs[1].options.column_name.as_deref(), Some("EmailAddress"));
        assert!(defs[1].options.unique);
        assert_eq!(defs[2].tag, "name:Country;index");
        assert!(defs[2].options.index);
        assert_eq!(defs[3].attribute, "type");

        let schema = Schema::parse::<Account>(Some(&SqliteDialect)).unwrap();
        assert_eq!(schema.field_names, ["id", "EmailAddress", "Country", "type"]);
        assert_eq!(schema.column_of("email"), Some("EmailAddress"));
        assert_eq!(schema.attribute_of("EmailAddress"), Some("email"));
        assert_eq!(schema.attribute_of("email"), Some("email"));
        assert_eq!(
            schema
                .writable_fields()
                .map(|v| v.name.as_str())
                .collect::<Vec<_>>(),
            ["EmailAddress", "Country", "type"]
        );
        assert_eq!(schema.resolve::<Account>("emailaddress").unwrap(), "email");
        let error = schema.resolve::<Account>("password").unwrap_err();
        assert!(matches!(
            error.downcast_ref::<OrmError>(),
            Some(OrmError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn visibility_does_not_exclude_fields() {
        #[derive(Entity, Default, Clone)]
        pub struct Visibility {
            pub public: i32,
            hidden: i32,
            pub(crate) restricted: i32,
            #[skiff(skip)]
            pub skipped: i32,
        }
        let schema = Schema::parse::<Visibility>(Some(&SqliteDialect)).unwrap();
        assert_eq!(schema.fields.len(), schema.field_names.len());
        assert_eq!(schema.field_names, ["public", "hidden", "restricted"]);
        let value = Visibility {
            hidden: 2,
            ..Default::default()
        };
        assert_eq!(value.get("hidden"), Some(Value::Int32(Some(2))));
        assert_eq!(value.get("skipped"), None);
    }

    #[test]
    fn missing_dialect() {
        #[derive(Entity, Default, Clone)]
        struct Orphan {
            value: i32,
        }
        let error = Schema::parse::<Orphan>(None).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<OrmError>(),
            Some(OrmError::MissingDialect("Orphan"))
        ));
    }

    #[test]
    fn get_and_set() {
        #[derive(Entity, Default, Clone, Debug, PartialEq)]
        struct Event {
            id: Uuid,
            title: String,
            at: Option<PrimitiveDateTime>,
            seats: u32,
        }
        let id = Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        let mut event = Event::default();
        assert!(event.set("id", id.as_value()).unwrap());
        assert!(event.set("title", "Launch".into()).unwrap());
        assert!(event.set("at", Value::Null).unwrap());
        assert!(event.set("seats", Value::Int64(Some(120))).unwrap());
        assert!(!event.set("missing", Value::Null).unwrap());
        assert_eq!(
            event,
            Event {
                id,
                title: "Launch".into(),
                at: None,
                seats: 120,
            }
        );
        assert_eq!(
            event.get("title"),
            Some(Value::Varchar(Some("Launch".into())))
        );
        assert_eq!(event.get("seats"), Some(Value::UInt32(Some(120))));
        assert_eq!(event.get("missing"), None);

        let error = event.set("seats", Value::Int64(Some(-1))).unwrap_err();
        assert!(format!("{error:#}").contains("While decoding `Event::seats`"));
    }
}
