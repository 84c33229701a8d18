use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, Variant};

pub(crate) fn expand(input: DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Subject can only be derived for enums",
        ));
    };
    if data.variants.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Subject enum must have at least one variant",
        ));
    }

    let mut idents = Vec::with_capacity(data.variants.len());
    let mut names = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                &variant.fields,
                "Subject variants cannot carry fields",
            ));
        }
        let wire = wire_name(variant)?;
        if names.contains(&wire) {
            return Err(syn::Error::new_spanned(
                &variant.ident,
                format!("duplicate subject name `{wire}`"),
            ));
        }
        idents.push(&variant.ident);
        names.push(wire);
    }

    Ok(quote! {
        impl #impl_generics ::courier::Subject for #name #ty_generics #where_clause {
            const ALL: &'static [Self] = &[#(Self::#idents),*];

            fn as_str(&self) -> &'static str {
                match self {
                    #(Self::#idents => #names,)*
                }
            }
        }

        impl #impl_generics ::core::convert::AsRef<str> for #name #ty_generics #where_clause {
            fn as_ref(&self) -> &str {
                ::courier::Subject::as_str(self)
            }
        }

        impl #impl_generics ::core::fmt::Display for #name #ty_generics #where_clause {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(::courier::Subject::as_str(self))
            }
        }
    })
}

fn wire_name(variant: &Variant) -> syn::Result<String> {
    let mut rename = None;
    for attr in variant.attrs.iter().filter(|attr| attr.path().is_ident("subject")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                rename = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported subject attribute, expected `rename`"))
            }
        })?;
    }

    match rename {
        Some(name) if name.is_empty() => Err(syn::Error::new_spanned(
            &variant.ident,
            "subject name cannot be empty",
        )),
        Some(name) => Ok(name),
        None => Ok(lower_camel(&variant.ident.to_string())),
    }
}

/// `StartPayment` -> `startPayment`, `HTTPReady` -> `httpReady`.
fn lower_camel(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len());
    let mut leading = true;
    for (i, c) in chars.iter().enumerate() {
        if leading && c.is_uppercase() {
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if i > 0 && next_is_lower {
                leading = false;
                out.push(*c);
            } else {
                out.extend(c.to_lowercase());
            }
        } else {
            leading = false;
            out.push(*c);
        }
    }
    out
}
