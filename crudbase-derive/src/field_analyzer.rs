/// True when the field's declared type is `Option<...>`.
pub(crate) fn field_is_optional(field: &syn::Field) -> bool {
    if let syn::Type::Path(type_path) = &field.ty
        && let Some(last_seg) = type_path.path.segments.last()
    {
        last_seg.ident == "Option"
    } else {
        false
    }
}

/// `Option<T>` -> `T`, anything else unchanged.
pub(crate) fn extract_inner_type(ty: &syn::Type) -> syn::Type {
    if let syn::Type::Path(type_path) = ty
        && let Some(last_seg) = type_path.path.segments.last()
        && last_seg.ident == "Option"
        && let syn::PathArguments::AngleBracketed(args) = &last_seg.arguments
        && let Some(syn::GenericArgument::Type(inner)) = args.args.first()
    {
        return inner.clone();
    }
    ty.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::ToTokens;
    use syn::parse_quote;

    #[test]
    fn test_detects_option_fields() {
        let fields: syn::FieldsNamed = parse_quote!({ a: Option<String>, b: String, c: std::option::Option<i32> });
        let flags: Vec<bool> = fields.named.iter().map(field_is_optional).collect();
        assert_eq!(flags, vec![true, false, true]);
    }

    #[test]
    fn test_unwraps_one_option_layer() {
        let ty: syn::Type = parse_quote!(Option<Option<i32>>);
        assert_eq!(extract_inner_type(&ty).to_token_stream().to_string(), "Option < i32 >");
        let ty: syn::Type = parse_quote!(String);
        assert_eq!(extract_inner_type(&ty).to_token_stream().to_string(), "String");
    }
}
