use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod subject;

/// Derive macro for implementing `Subject` on a fieldless enum.
///
/// Each variant's wire name is its name in lowerCamelCase, unless
/// overridden with `#[subject(rename = "...")]`. Also implements
/// `AsRef<str>` and `Display`. The enum must derive `Clone` and `Copy`.
///
/// ```rust,ignore
/// #[derive(Subject, Clone, Copy)]
/// enum Parent {
///     StartPayment,          // "startPayment"
///     #[subject(rename = "scrollRelay")]
///     Scroll,
/// }
/// ```
#[proc_macro_derive(Subject, attributes(subject))]
pub fn derive_subject(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    subject::expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
