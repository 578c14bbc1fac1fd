use crate::{Dialect, Entity, Field, OrmError, Result};
use std::collections::HashMap;

/// Table layout derived from an [`Entity`] type.
///
/// `fields` keeps the declaration order, it decides the column order of every
/// INSERT, UPDATE and SELECT. Once parsed a schema never changes.
#[derive(Debug, Clone)]
pub struct Schema {
    /// Name of the concrete type.
    pub name: &'static str,
    pub table: String,
    pub fields: Vec<Field>,
    /// Column names, same order as `fields`.
    pub field_names: Vec<String>,
    field_map: HashMap<String, usize>,
    column_to_attribute: HashMap<String, &'static str>,
    attribute_to_column: HashMap<&'static str, String>,
}

impl Schema {
    /// Derives the schema of `E`, storage types come from the dialect.
    pub fn parse<E: Entity>(dialect: Option<&dyn Dialect>) -> Result<Schema> {
        let Some(dialect) = dialect else {
            return Err(OrmError::MissingDialect(E::type_name()).into());
        };
        let defs = E::field_defs();
        let mut schema = Schema {
            name: E::type_name(),
            table: E::type_name().to_lowercase(),
            fields: Vec::with_capacity(defs.len()),
            field_names: Vec::with_capacity(defs.len()),
            field_map: HashMap::with_capacity(defs.len()),
            column_to_attribute: HashMap::with_capacity(defs.len() * 2),
            attribute_to_column: HashMap::with_capacity(defs.len()),
        };
        for def in defs {
            let column = def
                .options
                .column_name
                .clone()
                .unwrap_or_else(|| def.attribute.to_string());
            // The attribute name keeps resolving to itself even when renamed
            schema
                .column_to_attribute
                .insert(def.attribute.to_string(), def.attribute);
            schema
                .column_to_attribute
                .insert(column.clone(), def.attribute);
            schema
                .attribute_to_column
                .insert(def.attribute, column.clone());
            schema.field_map.insert(column.clone(), schema.fields.len());
            schema.field_names.push(column.clone());
            schema.fields.push(Field {
                name: column,
                attribute: def.attribute,
                data_type: dialect.data_type_of(&def.value),
                tag: def.tag,
                primary_key: def.options.primary_key,
                auto_increment: def.options.auto_increment,
                unique: def.options.unique,
                index: def.options.index,
            });
        }
        Ok(schema)
    }

    pub fn get_field(&self, column: &str) -> Option<&Field> {
        self.field_map.get(column).map(|i| &self.fields[*i])
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn column_of(&self, attribute: &str) -> Option<&str> {
        self.attribute_to_column.get(attribute).map(String::as_str)
    }

    pub fn attribute_of(&self, column: &str) -> Option<&'static str> {
        self.column_to_attribute.get(column).copied()
    }

    /// Fields written by explicit INSERT and UPDATE statements.
    pub fn writable_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| !f.is_generated_key())
    }

    /// Attribute of `E` that stores `column`.
    ///
    /// Lookups are exact first then case-insensitive, a case-insensitive hit
    /// is logged as a recovery.
    pub fn resolve<E: Entity>(&self, column: &str) -> Result<&'static str> {
        let mapped = self.attribute_of(column).or_else(|| {
            let found = self
                .column_to_attribute
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(column))
                .map(|(_, v)| *v);
            if let Some(attribute) = found {
                log::warn!(
                    "Column `{column}` of `{}` matched attribute `{attribute}` ignoring case",
                    self.name
                );
            }
            found
        });
        let Some(mapped) = mapped else {
            return Err(OrmError::SchemaMismatch {
                entity: E::type_name(),
                column: column.to_string(),
            }
            .into());
        };
        let defs = E::field_defs();
        if let Some(def) = defs.iter().find(|d| d.attribute == mapped) {
            return Ok(def.attribute);
        }
        if let Some(def) = defs
            .iter()
            .find(|d| d.attribute.eq_ignore_ascii_case(mapped))
        {
            log::warn!(
                "Attribute `{mapped}` resolved to `{}` of `{}` ignoring case",
                def.attribute,
                E::type_name(),
            );
            return Ok(def.attribute);
        }
        Err(OrmError::SchemaMismatch {
            entity: E::type_name(),
            column: column.to_string(),
        }
        .into())
    }
}
