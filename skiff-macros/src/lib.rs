mod decode_column;
mod decode_table;
mod encode_field_def;

use decode_column::decode_column;
use decode_table::decode_table;
use encode_field_def::encode_field_def;
use proc_macro::TokenStream;
use quote::quote;
use syn::{Fields, ItemStruct, parse_macro_input};

/// Maps a struct with named fields to a table.
///
/// Field attributes: `#[skiff(primary_key, auto_increment, unique, index)]`,
/// `#[skiff(name = "column")]`, `#[skiff(tag = "primarykey;autoincrement")]`
/// and `#[skiff(skip)]`. Annotate the struct with `#[skiff(hooks)]` to
/// implement `Hooks` yourself.
#[proc_macro_derive(Entity, attributes(skiff))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let item: ItemStruct = parse_macro_input!(input as ItemStruct);
    let name = &item.ident;
    let type_name = name.to_string();
    let (impl_generics, ty_generics, where_clause) = item.generics.split_for_impl();
    let Fields::Named(..) = item.fields else {
        panic!("Entity `{}` must be a struct with named fields", name);
    };
    let table = decode_table(&item);
    let fields: Vec<_> = item
        .fields
        .iter()
        .map(decode_column)
        .filter(|f| !f.skip)
        .collect();
    let field_defs = fields.iter().map(encode_field_def);
    let get_arms = fields.iter().map(|f| {
        let attribute = &f.attribute;
        let ident = &f.ident;
        quote! {
            #attribute => Some(::skiff::AsValue::as_value(::std::clone::Clone::clone(&self.#ident)))
        }
    });
    let set_arms = fields.iter().map(|f| {
        let attribute = &f.attribute;
        let ident = &f.ident;
        let ty = &f.ty;
        let message = format!("While decoding `{}::{}`", type_name, attribute);
        quote! {
            #attribute => {
                self.#ident = <#ty as ::skiff::AsValue>::try_from_value(value)
                    .map_err(|e| e.context(#message))?;
            }
        }
    });
    let hooks = if table.hooks {
        quote!()
    } else {
        quote! {
            impl #impl_generics ::skiff::Hooks for #name #ty_generics #where_clause {}
        }
    };
    quote! {
        #hooks
        impl #impl_generics ::skiff::Entity for #name #ty_generics #where_clause {
            fn type_name() -> &'static str {
                #type_name
            }

            fn field_defs() -> &'static [::skiff::FieldDef] {
                static RESULT: ::std::sync::LazyLock<Box<[::skiff::FieldDef]>> =
                    ::std::sync::LazyLock::new(|| vec![#(#field_defs),*].into_boxed_slice());
                &RESULT
            }

            fn get(&self, attribute: &str) -> Option<::skiff::Value> {
                match attribute {
                    #(#get_arms,)*
                    _ => None,
                }
            }

            fn set(&mut self, attribute: &str, value: ::skiff::Value) -> ::skiff::Result<bool> {
                match attribute {
                    #(#set_arms)*
                    _ => return Ok(false),
                }
                Ok(true)
            }
        }
    }
    .into()
}
