use crate::{Value, quote_option};
use proc_macro2::TokenStream;
use quote::{ToTokens, TokenStreamExt, quote};
use std::collections::BTreeMap;

/// Splits a tag like `name:user_id;primarykey;autoincrement` into its entries.
///
/// Empty segments are skipped, a key without `:` gets an empty value and any
/// further `:` stays part of the value.
pub fn parse_tag(tag: &str) -> BTreeMap<String, String> {
    tag.split(';')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|segment| match segment.split_once(':') {
            Some((key, value)) => (key.trim().to_string(), value.trim().to_string()),
            None => (segment.to_string(), String::new()),
        })
        .collect()
}

/// Typed column options of an entity attribute.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct FieldOptions {
    pub primary_key: bool,
    pub auto_increment: bool,
    pub unique: bool,
    pub index: bool,
    /// Column name override, the attribute name is used when missing.
    pub column_name: Option<String>,
}

impl FieldOptions {
    /// Options out of the tag grammar, unrecognized keys are ignored.
    pub fn from_tag(tag: &str) -> Self {
        let mut options = FieldOptions::default();
        for (key, value) in parse_tag(tag) {
            match key.as_str() {
                "name" if !value.is_empty() => options.column_name = Some(value),
                "primarykey" => options.primary_key = true,
                "autoincrement" => options.auto_increment = true,
                "unique" => options.unique = true,
                "index" => options.index = true,
                _ => {}
            }
        }
        options
    }

    /// Fields matching this never appear in explicit INSERT or UPDATE column lists.
    pub fn is_generated_key(&self) -> bool {
        self.primary_key && self.auto_increment
    }
}

impl ToTokens for FieldOptions {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let primary_key = self.primary_key;
        let auto_increment = self.auto_increment;
        let unique = self.unique;
        let index = self.index;
        let column_name = quote_option(
            &self
                .column_name
                .as_ref()
                .map(|v| quote!(::std::string::String::from(#v))),
        );
        tokens.append_all(quote! {
            ::skiff::FieldOptions {
                primary_key: #primary_key,
                auto_increment: #auto_increment,
                unique: #unique,
                index: #index,
                column_name: #column_name,
            }
        });
    }
}

/// Compile time descriptor of one attribute, emitted by `#[derive(Entity)]`.
#[derive(Debug)]
pub struct FieldDef {
    /// Attribute name as declared on the struct.
    pub attribute: &'static str,
    /// Type prototype of the attribute.
    pub value: Value,
    /// Raw tag text, empty when the options come from attributes only.
    pub tag: &'static str,
    pub options: FieldOptions,
}

/// One attribute to column mapping of a parsed schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Column name.
    pub name: String,
    pub attribute: &'static str,
    /// Storage type as rendered by the dialect.
    pub data_type: &'static str,
    pub tag: &'static str,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub unique: bool,
    pub index: bool,
}

impl Field {
    pub fn is_generated_key(&self) -> bool {
        self.primary_key && self.auto_increment
    }
}
