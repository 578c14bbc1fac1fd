use quote::ToTokens;
use syn::ItemStruct;

pub(crate) struct TableMetadata {
    /// The user implements `Hooks` by hand.
    pub(crate) hooks: bool,
}

pub fn decode_table(item: &ItemStruct) -> TableMetadata {
    let mut metadata = TableMetadata { hooks: false };
    for attr in &item.attrs {
        let meta = &attr.meta;
        if meta.path().is_ident("skiff") {
            let Ok(list) = meta.require_list() else {
                panic!("Error while parsing `skiff`, use it like: `#[skiff(hooks)]`");
            };
            let _ = list.parse_nested_meta(|arg| {
                if arg.path.is_ident("hooks") {
                    metadata.hooks = true;
                } else {
                    panic!(
                        "Unknown attribute `{}` inside skiff macro",
                        arg.path.to_token_stream()
                    );
                }
                Ok(())
            });
        }
    }
    metadata
}
