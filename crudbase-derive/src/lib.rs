mod attribute_parser;
mod field_analyzer;
mod macro_implementation;

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, parse_macro_input};

fn extract_active_model_type(input: &DeriveInput) -> Result<proc_macro2::TokenStream, syn::Error> {
    for attr in &input.attrs {
        if attr.path().is_ident("active_model") {
            let Some(s) = attribute_parser::get_string_from_attr(attr) else {
                return Err(syn::Error::new_spanned(
                    attr,
                    "expected #[active_model = \"path::to::ActiveModel\"]",
                ));
            };
            let ty = syn::parse_str::<syn::Type>(&s)
                .map_err(|e| syn::Error::new_spanned(attr, format!("invalid active_model type: {e}")))?;
            return Ok(quote! { #ty });
        }
    }
    let ident = format_ident!("{}ActiveModel", input.ident);
    Ok(quote! { #ident })
}

fn extract_named_fields(
    input: &DeriveInput,
) -> Result<syn::punctuated::Punctuated<syn::Field, syn::token::Comma>, syn::Error> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            "crudbase models can only be derived for structs",
        ));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(syn::Error::new_spanned(
            input,
            "crudbase models require a struct with named fields",
        ));
    };
    for field in &named.named {
        attribute_parser::check_known_keys(field)?;
    }
    Ok(named.named.clone())
}

fn expand_create_model(input: &DeriveInput) -> Result<proc_macro2::TokenStream, syn::Error> {
    let create_name = format_ident!("{}Create", input.ident);
    let active_model_type = extract_active_model_type(input)?;
    let fields = extract_named_fields(input)?;
    let create_struct_fields = macro_implementation::generate_create_struct_fields(&fields);
    let conv_lines = macro_implementation::generate_create_conversion_lines(&fields);

    Ok(quote! {
        #[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
        pub struct #create_name {
            #(#create_struct_fields),*
        }

        impl From<#create_name> for #active_model_type {
            fn from(create: #create_name) -> Self {
                #active_model_type {
                    #(#conv_lines),*
                }
            }
        }
    })
}

fn expand_update_model(input: &DeriveInput) -> Result<proc_macro2::TokenStream, syn::Error> {
    let update_name = format_ident!("{}Update", input.ident);
    let active_model_type = extract_active_model_type(input)?;
    let fields = extract_named_fields(input)?;
    let included_fields = macro_implementation::filter_update_fields(&fields);
    let update_struct_fields = macro_implementation::generate_update_struct_fields(&included_fields);
    let included_merge = macro_implementation::generate_included_merge_code(&included_fields);
    let excluded_merge = macro_implementation::generate_excluded_merge_code(&fields);
    let is_empty_body = macro_implementation::generate_is_empty_body(&included_fields);

    Ok(quote! {
        #[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
        pub struct #update_name {
            #(#update_struct_fields),*
        }

        impl crudbase::MergeIntoActiveModel<#active_model_type> for #update_name {
            #[allow(unused_mut)]
            fn merge_into_activemodel(
                self,
                mut model: #active_model_type,
            ) -> Result<#active_model_type, crudbase::ValidationErrors> {
                let touched = !crudbase::MergeIntoActiveModel::<#active_model_type>::is_empty(&self);
                let mut errors = crudbase::ValidationErrors::new();
                #(#included_merge)*
                errors.result()?;
                if touched {
                    #(#excluded_merge)*
                }
                Ok(model)
            }

            fn is_empty(&self) -> bool {
                #is_empty_body
            }
        }
    })
}

/// Generates `<Name>Create` from a Read schema plus
/// `impl From<<Name>Create> for ActiveModel`.
///
/// Field options, all inside `#[crudbase(...)]`:
/// - `create_model = false` leaves the field out of the create struct.
/// - `on_create = expr` supplies a default; an included field becomes `Option<T>`
///   so callers may still override it.
///
/// The active model defaults to `<Name>ActiveModel`; override it with
/// `#[active_model = "path::ActiveModel"]` on the struct.
#[proc_macro_derive(ToCreateModel, attributes(crudbase, active_model))]
pub fn to_create_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_create_model(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Generates `<Name>Update`, a presence-aware patch, and its
/// `crudbase::MergeIntoActiveModel` impl.
///
/// For each included field:
/// - omitted leaves the column untouched,
/// - `null` clears a nullable column and is a validation error on a required one,
/// - a value overwrites the column.
///
/// `on_update = expr` on a field excluded with `update_model = false` is applied
/// whenever the patch carries at least one field.
#[proc_macro_derive(ToUpdateModel, attributes(crudbase, active_model))]
pub fn to_update_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_update_model(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
