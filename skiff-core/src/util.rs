use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use std::fmt::{self, Display};

pub fn quote_option<T: ToTokens>(value: &Option<T>) -> TokenStream {
    match value {
        None => quote! { None },
        Some(v) => quote! { Some(#v) },
    }
}

pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

/// Characters of the statement kept when logging it.
pub const LOG_TRUNCATE_LEN: usize = 497;

/// Displays a statement cut to [`LOG_TRUNCATE_LEN`] characters.
pub struct TruncateLong<'a>(pub &'a str);

impl Display for TruncateLong<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let end = self
            .0
            .char_indices()
            .map(|(i, _)| i)
            .nth(LOG_TRUNCATE_LEN)
            .unwrap_or(self.0.len());
        write!(
            f,
            "{}{}",
            self.0[..end].trim_end(),
            if end < self.0.len() { "..." } else { "" },
        )
    }
}

#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {
        $crate::TruncateLong(&$query)
    };
}

/// Builds a parameter array out of anything convertible into a `Value`.
/// ```
/// use skiff_core::{Value, params};
/// let params = params!["Alice", 33, true];
/// assert_eq!(params[1], Value::Int32(Some(33)));
/// ```
#[macro_export]
macro_rules! params {
    ($($value:expr),* $(,)?) => {
        [$($crate::Value::from($value)),*]
    };
}
