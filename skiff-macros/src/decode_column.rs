use quote::ToTokens;
use skiff_core::FieldOptions;
use syn::{Field, Ident, LitStr, Type, ext::IdentExt, parse::ParseBuffer};

pub(crate) struct FieldMetadata {
    pub(crate) ident: Ident,
    pub(crate) ty: Type,
    /// Attribute name, the field identifier without the raw prefix.
    pub(crate) attribute: String,
    pub(crate) tag: String,
    pub(crate) options: FieldOptions,
    pub(crate) skip: bool,
}

pub fn decode_column(field: &Field) -> FieldMetadata {
    let ident = field
        .ident
        .clone()
        .expect("Entity must be a struct with named fields");
    let mut metadata = FieldMetadata {
        attribute: ident.unraw().to_string(),
        ident,
        ty: field.ty.clone(),
        tag: String::new(),
        options: FieldOptions::default(),
        skip: false,
    };
    for attr in &field.attrs {
        let meta = &attr.meta;
        if !meta.path().is_ident("skiff") {
            continue;
        }
        let Ok(list) = meta.require_list() else {
            panic!("Error while parsing `skiff`, use it like: `#[skiff(attribute = value, ...)]`");
        };
        let _ = list.parse_nested_meta(|arg| {
            if arg.path.is_ident("name") {
                let Ok(v) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                    panic!("Error while parsing `name`, use it like: `#[skiff(name = \"my_column\")]`");
                };
                metadata.options.column_name = Some(v.value());
            } else if arg.path.is_ident("tag") {
                let Ok(v) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                    panic!("Error while parsing `tag`, use it like: `#[skiff(tag = \"primarykey;autoincrement\")]`");
                };
                let parsed = FieldOptions::from_tag(&v.value());
                let options = &mut metadata.options;
                options.primary_key |= parsed.primary_key;
                options.auto_increment |= parsed.auto_increment;
                options.unique |= parsed.unique;
                options.index |= parsed.index;
                if parsed.column_name.is_some() {
                    options.column_name = parsed.column_name;
                }
                metadata.tag = v.value();
            } else {
                let flag = if arg.path.is_ident("primary_key") {
                    &mut metadata.options.primary_key
                } else if arg.path.is_ident("auto_increment") {
                    &mut metadata.options.auto_increment
                } else if arg.path.is_ident("unique") {
                    &mut metadata.options.unique
                } else if arg.path.is_ident("index") {
                    &mut metadata.options.index
                } else if arg.path.is_ident("skip") {
                    &mut metadata.skip
                } else {
                    panic!(
                        "Unknown attribute `{}` inside skiff macro",
                        arg.path.to_token_stream()
                    );
                };
                // value() is Err for Meta::Path
                let Err(..) = arg.value() else {
                    panic!(
                        "Error while parsing `{}`, it is a flag: `#[skiff({})]`",
                        arg.path.to_token_stream(),
                        arg.path.to_token_stream(),
                    );
                };
                *flag = true;
            }
            Ok(())
        });
    }
    metadata
}
