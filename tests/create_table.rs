#[cfg(test)]
mod tests {
    use indoc::indoc;
    use skiff::{Entity, OrmError, Schema, SqliteDialect, create_table_statements};

    #[derive(Entity, Default, Clone)]
    struct User {
        #[skiff(primary_key, auto_increment)]
        id: i64,
        #[skiff(unique)]
        username: String,
        #[skiff(index)]
        age: i32,
    }

    #[derive(Entity, Default, Clone)]
    struct Product {
        #[skiff(tag = "name:SKU;primarykey")]
        sku: String,
        #[skiff(name = "DisplayName", index)]
        display_name: String,
        price: f64,
        #[skiff(unique, index)]
        barcode: Option<String>,
    }

    #[test]
    fn user_table() {
        let schema = Schema::parse::<User>(Some(&SqliteDialect)).unwrap();
        assert_eq!(
            create_table_statements(&schema).unwrap().join(";\n"),
            indoc! {"
                CREATE TABLE IF NOT EXISTS user (id INTEGER PRIMARY KEY AUTOINCREMENT, username TEXT UNIQUE, age INTEGER);
                CREATE INDEX IF NOT EXISTS idx_user_age ON user(age)
            "}
            .trim()
        );
    }

    #[test]
    fn product_table() {
        let schema = Schema::parse::<Product>(Some(&SqliteDialect)).unwrap();
        assert_eq!(
            create_table_statements(&schema).unwrap().join(";\n"),
            indoc! {"
                CREATE TABLE IF NOT EXISTS product (SKU TEXT PRIMARY KEY, DisplayName TEXT, price REAL, barcode TEXT UNIQUE);
                CREATE INDEX IF NOT EXISTS idx_product_displayname ON product(DisplayName);
                CREATE INDEX IF NOT EXISTS idx_product_barcode ON product(barcode)
            "}
            .trim()
        );
    }

    #[test]
    fn empty_table() {
        #[derive(Entity, Default, Clone)]
        struct Nothing {}
        let schema = Schema::parse::<Nothing>(Some(&SqliteDialect)).unwrap();
        let error = create_table_statements(&schema).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<OrmError>(),
            Some(OrmError::NoFields(..))
        ));
    }
}
