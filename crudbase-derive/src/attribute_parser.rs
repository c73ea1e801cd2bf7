use syn::parse::Parser;
use syn::{Lit, Meta, punctuated::Punctuated, token::Comma};

fn crudbase_metas(field: &syn::Field) -> Vec<Meta> {
    field
        .attrs
        .iter()
        .filter(|attr| attr.path().is_ident("crudbase"))
        .filter_map(|attr| match &attr.meta {
            Meta::List(meta_list) => Punctuated::<Meta, Comma>::parse_terminated
                .parse2(meta_list.tokens.clone())
                .ok(),
            _ => None,
        })
        .flatten()
        .collect()
}

/// Reads a boolean option from `#[crudbase(...)]`.
///
/// `key = true` / `key = false` are explicit; a bare `key` means `true`.
pub(crate) fn get_crudbase_bool(field: &syn::Field, key: &str) -> Option<bool> {
    for meta in crudbase_metas(field) {
        match meta {
            Meta::NameValue(nv) if nv.path.is_ident(key) => {
                if let syn::Expr::Lit(expr_lit) = &nv.value
                    && let Lit::Bool(b) = &expr_lit.lit
                {
                    return Some(b.value());
                }
            }
            Meta::Path(path) if path.is_ident(key) => return Some(true),
            _ => {}
        }
    }
    None
}

/// Reads an expression option such as `on_create = chrono::Utc::now()`.
pub(crate) fn get_crudbase_expr(field: &syn::Field, key: &str) -> Option<syn::Expr> {
    crudbase_metas(field).into_iter().find_map(|meta| match meta {
        Meta::NameValue(nv) if nv.path.is_ident(key) => Some(nv.value),
        _ => None,
    })
}

/// Rejects options this crate does not understand so typos fail loudly.
pub(crate) fn check_known_keys(field: &syn::Field) -> Result<(), syn::Error> {
    const KNOWN: [&str; 4] = ["create_model", "update_model", "on_create", "on_update"];
    for meta in crudbase_metas(field) {
        let path = meta.path();
        if !KNOWN.iter().any(|known| path.is_ident(known)) {
            return Err(syn::Error::new_spanned(
                path,
                format!(
                    "unknown crudbase option, expected one of: {}",
                    KNOWN.join(", ")
                ),
            ));
        }
    }
    Ok(())
}

/// Extracts a string literal from a struct-level attribute of the form
/// `#[active_model = "some::path"]`.
pub(crate) fn get_string_from_attr(attr: &syn::Attribute) -> Option<String> {
    if let Meta::NameValue(nv) = &attr.meta
        && let syn::Expr::Lit(expr_lit) = &nv.value
        && let Lit::Str(s) = &expr_lit.lit
    {
        return Some(s.value());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn field(tokens: syn::FieldsNamed) -> syn::Field {
        tokens.named.into_iter().next().unwrap()
    }

    #[test]
    fn test_explicit_and_implicit_bools() {
        let f = field(parse_quote!({ #[crudbase(create_model = false, update_model)] pub id: i32 }));
        assert_eq!(get_crudbase_bool(&f, "create_model"), Some(false));
        assert_eq!(get_crudbase_bool(&f, "update_model"), Some(true));
        assert_eq!(get_crudbase_bool(&f, "on_create"), None);
    }

    #[test]
    fn test_expressions_are_returned_verbatim() {
        let f = field(parse_quote!({ #[crudbase(on_create = chrono::Utc::now())] pub at: i64 }));
        let expr = get_crudbase_expr(&f, "on_create").unwrap();
        assert_eq!(quote::quote!(#expr).to_string(), "chrono :: Utc :: now ()");
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        let f = field(parse_quote!({ #[crudbase(on_craete = 1)] pub n: i32 }));
        assert!(check_known_keys(&f).is_err());
    }

    #[test]
    fn test_other_attributes_are_ignored() {
        let f = field(parse_quote!({ #[serde(default)] pub n: i32 }));
        assert!(check_known_keys(&f).is_ok());
        assert_eq!(get_crudbase_bool(&f, "create_model"), None);
    }

    #[test]
    fn test_active_model_string() {
        let attr: syn::Attribute = parse_quote!(#[active_model = "super::ActiveModel"]);
        assert_eq!(get_string_from_attr(&attr).as_deref(), Some("super::ActiveModel"));
    }
}
