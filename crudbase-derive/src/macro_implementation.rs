use super::attribute_parser::{get_crudbase_bool, get_crudbase_expr};
use super::field_analyzer::{extract_inner_type, field_is_optional};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{punctuated::Punctuated, token::Comma};

type Fields = Punctuated<syn::Field, Comma>;

/// Field declarations of the `<Name>Create` struct.
///
/// Fields with an `on_create` expression become `Option<...>` so the caller
/// may override the creation default.
pub(crate) fn generate_create_struct_fields(fields: &Fields) -> Vec<TokenStream> {
    fields
        .iter()
        .filter(|field| get_crudbase_bool(field, "create_model").unwrap_or(true))
        .map(|field| {
            let ident = &field.ident;
            let ty = &field.ty;
            if get_crudbase_expr(field, "on_create").is_some() {
                quote! {
                    #[serde(default)]
                    pub #ident: Option<#ty>
                }
            } else if field_is_optional(field) {
                quote! {
                    #[serde(default)]
                    pub #ident: #ty
                }
            } else {
                quote! {
                    pub #ident: #ty
                }
            }
        })
        .collect()
}

/// Field initializers of the `From<<Name>Create> for ActiveModel` body.
pub(crate) fn generate_create_conversion_lines(fields: &Fields) -> Vec<TokenStream> {
    fields
        .iter()
        .map(|field| {
            let ident = &field.ident;
            let include = get_crudbase_bool(field, "create_model").unwrap_or(true);
            let is_optional = field_is_optional(field);
            let on_create = get_crudbase_expr(field, "on_create");

            match (include, on_create, is_optional) {
                (true, Some(expr), true) => quote! {
                    #ident: sea_orm::ActiveValue::Set(match create.#ident {
                        Some(Some(inner)) => Some(inner.into()),
                        Some(None) => None,
                        None => Some((#expr).into()),
                    })
                },
                (true, Some(expr), false) => quote! {
                    #ident: sea_orm::ActiveValue::Set(match create.#ident {
                        Some(value) => value.into(),
                        None => (#expr).into(),
                    })
                },
                (true, None, true) => quote! {
                    #ident: sea_orm::ActiveValue::Set(create.#ident.map(Into::into))
                },
                (true, None, false) => quote! {
                    #ident: sea_orm::ActiveValue::Set(create.#ident.into())
                },
                (false, Some(expr), true) => quote! {
                    #ident: sea_orm::ActiveValue::Set(Some((#expr).into()))
                },
                (false, Some(expr), false) => quote! {
                    #ident: sea_orm::ActiveValue::Set((#expr).into())
                },
                // store-assigned, e.g. an auto-increment key
                (false, None, _) => quote! {
                    #ident: sea_orm::ActiveValue::NotSet
                },
            }
        })
        .collect()
}

/// Fields that appear in the `<Name>Update` struct.
pub(crate) fn filter_update_fields(fields: &Fields) -> Vec<&syn::Field> {
    fields
        .iter()
        .filter(|field| get_crudbase_bool(field, "update_model").unwrap_or(true))
        .collect()
}

/// Every update field is `Option<Option<T>>`: outer `None` when the key was
/// omitted, `Some(None)` for an explicit null.
pub(crate) fn generate_update_struct_fields(included_fields: &[&syn::Field]) -> Vec<TokenStream> {
    included_fields
        .iter()
        .map(|field| {
            let ident = &field.ident;
            let inner_ty = extract_inner_type(&field.ty);
            quote! {
                #[serde(
                    default,
                    skip_serializing_if = "Option::is_none",
                    with = "crudbase::serde_with::rust::double_option"
                )]
                pub #ident: Option<Option<#inner_ty>>
            }
        })
        .collect()
}

pub(crate) fn generate_included_merge_code(included_fields: &[&syn::Field]) -> Vec<TokenStream> {
    included_fields
        .iter()
        .map(|field| {
            let ident = &field.ident;
            if field_is_optional(field) {
                quote! {
                    match self.#ident {
                        Some(Some(value)) => model.#ident = sea_orm::ActiveValue::Set(Some(value.into())),
                        Some(None) => model.#ident = sea_orm::ActiveValue::Set(None),
                        None => {}
                    }
                }
            } else {
                quote! {
                    match self.#ident {
                        Some(Some(value)) => model.#ident = sea_orm::ActiveValue::Set(value.into()),
                        Some(None) => errors.add(crudbase::ValidationError::new(
                            stringify!(#ident),
                            "field is required and cannot be set to null",
                        )),
                        None => {}
                    }
                }
            }
        })
        .collect()
}

/// `on_update` expressions of fields excluded from the update struct.
pub(crate) fn generate_excluded_merge_code(fields: &Fields) -> Vec<TokenStream> {
    fields
        .iter()
        .filter(|field| get_crudbase_bool(field, "update_model") == Some(false))
        .filter_map(|field| {
            let expr = get_crudbase_expr(field, "on_update")?;
            let ident = &field.ident;
            Some(if field_is_optional(field) {
                quote! { model.#ident = sea_orm::ActiveValue::Set(Some((#expr).into())); }
            } else {
                quote! { model.#ident = sea_orm::ActiveValue::Set((#expr).into()); }
            })
        })
        .collect()
}

pub(crate) fn generate_is_empty_body(included_fields: &[&syn::Field]) -> TokenStream {
    if included_fields.is_empty() {
        return quote! { true };
    }
    let checks = included_fields.iter().map(|field| {
        let ident = &field.ident;
        quote! { self.#ident.is_none() }
    });
    quote! { #(#checks)&&* }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn user_fields() -> Fields {
        let named: syn::FieldsNamed = parse_quote!({
            #[crudbase(create_model = false, update_model = false)]
            pub id: i32,
            pub username: String,
            pub bio: Option<String>,
            #[crudbase(on_create = true)]
            pub is_active: bool,
            #[crudbase(create_model = false, update_model = false, on_update = now())]
            pub updated_at: Option<i64>,
        });
        named.named
    }

    fn render(tokens: &[TokenStream]) -> Vec<String> {
        tokens.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_create_struct_skips_excluded_fields() {
        let fields = user_fields();
        let rendered = render(&generate_create_struct_fields(&fields));
        assert_eq!(rendered.len(), 3);
        assert!(rendered[0].contains("pub username : String"));
        assert!(rendered[1].contains("serde (default)"));
        assert!(rendered[2].contains("pub is_active : Option < bool >"));
    }

    #[test]
    fn test_create_conversion_covers_every_column() {
        let fields = user_fields();
        let rendered = render(&generate_create_conversion_lines(&fields));
        assert_eq!(rendered.len(), 5);
        assert!(rendered[0].contains("NotSet"));
        assert!(rendered[3].contains("None => (true) . into ()"));
        assert!(rendered[4].contains("NotSet"));
    }

    #[test]
    fn test_update_struct_is_double_option() {
        let fields = user_fields();
        let included = filter_update_fields(&fields);
        let rendered = render(&generate_update_struct_fields(&included));
        assert_eq!(rendered.len(), 3);
        assert!(rendered[1].contains("pub bio : Option < Option < String > >"));
        assert!(rendered[1].contains("double_option"));
    }

    #[test]
    fn test_null_on_required_field_is_a_validation_error() {
        let fields = user_fields();
        let included = filter_update_fields(&fields);
        let rendered = render(&generate_included_merge_code(&included));
        assert!(rendered[0].contains("cannot be set to null"));
        assert!(rendered[1].contains("Set (None)"));
    }

    #[test]
    fn test_on_update_only_for_excluded_fields() {
        let fields = user_fields();
        let rendered = render(&generate_excluded_merge_code(&fields));
        assert_eq!(rendered.len(), 1);
        assert!(rendered[0].contains("model . updated_at"));
    }

    #[test]
    fn test_is_empty_checks_each_field() {
        let fields = user_fields();
        let included = filter_update_fields(&fields);
        let body = generate_is_empty_body(&included).to_string();
        assert_eq!(body.matches("is_none").count(), 3);
        assert_eq!(generate_is_empty_body(&[]).to_string(), "true");
    }
}
