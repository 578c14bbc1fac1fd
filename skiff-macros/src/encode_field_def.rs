use crate::decode_column::FieldMetadata;
use proc_macro2::TokenStream;
use quote::quote;

pub fn encode_field_def(metadata: &FieldMetadata) -> TokenStream {
    let attribute = &metadata.attribute;
    let ty = &metadata.ty;
    let tag = &metadata.tag;
    let options = &metadata.options;
    quote! {
        ::skiff::FieldDef {
            attribute: #attribute,
            value: <#ty as ::skiff::AsValue>::as_empty_value(),
            tag: #tag,
            options: #options,
        }
    }
}
