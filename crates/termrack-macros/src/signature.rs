//! Classifies a function signature into a [`Signature`] the dispatch crate
//! can validate.
//!
//! | Written type | Shape |
//! |--------------|-------|
//! | `&Request`, `&mut Request` | `Request` |
//! | `&Next`, `Next` | `Next` |
//! | `&dyn Any`, `&mut dyn Any` | `Open` |
//! | `Response`, `HandlerResult`, `Result<Response, E>` | `Response` |
//! | `()` or no return | `Unit` |
//! | anything else | `Other` |
//!
//! Only the last path segment is inspected, so qualified paths such as
//! `termrack::Request` or `anyhow::Result<Response>` classify the same way.
//! A by-value `Request` is not accepted: the request is shared by the whole
//! chain and is only ever lent out.

use quote::ToTokens;
use syn::{FnArg, GenericArgument, PathArguments, ReturnType, Type, TypeParamBound};
use termrack_dispatch::{Signature, TypeShape};

/// How a parameter is passed from the generated adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassBy {
    /// Pass the adapter's reference straight through (with coercion).
    Reference,
    /// Pass an owned clone (`Next` by value).
    Clone,
}

fn last_segment(ty: &Type) -> Option<&syn::PathSegment> {
    match ty {
        Type::Path(type_path) => type_path.path.segments.last(),
        Type::Group(group) => last_segment(&group.elem),
        Type::Paren(paren) => last_segment(&paren.elem),
        _ => None,
    }
}

fn is_named(ty: &Type, name: &str) -> bool {
    last_segment(ty).is_some_and(|segment| segment.ident == name)
}

fn is_any_object(ty: &Type) -> bool {
    match ty {
        Type::TraitObject(object) => object.bounds.iter().any(|bound| match bound {
            TypeParamBound::Trait(tr) => tr
                .path
                .segments
                .last()
                .is_some_and(|segment| segment.ident == "Any"),
            _ => false,
        }),
        _ => false,
    }
}

fn written(ty: &Type) -> String {
    ty.to_token_stream().to_string()
}

/// Shape of a parameter type, plus how the adapter must pass it.
pub fn classify_param(ty: &Type) -> (TypeShape, PassBy) {
    match ty {
        Type::Reference(reference) => {
            let elem = reference.elem.as_ref();
            if is_named(elem, "Request") {
                (TypeShape::Request, PassBy::Reference)
            } else if is_named(elem, "Next") {
                (TypeShape::Next, PassBy::Reference)
            } else if is_any_object(elem) {
                (TypeShape::Open, PassBy::Reference)
            } else {
                (TypeShape::Other(written(ty)), PassBy::Reference)
            }
        }
        _ if is_named(ty, "Next") => (TypeShape::Next, PassBy::Clone),
        _ => (TypeShape::Other(written(ty)), PassBy::Reference),
    }
}

/// Shape of a return type.
pub fn classify_output(output: &ReturnType) -> TypeShape {
    let ty = match output {
        ReturnType::Default => return TypeShape::Unit,
        ReturnType::Type(_, ty) => ty.as_ref(),
    };

    if let Type::Tuple(tuple) = ty {
        if tuple.elems.is_empty() {
            return TypeShape::Unit;
        }
    }

    let Some(segment) = last_segment(ty) else {
        return TypeShape::Other(written(ty));
    };

    if segment.ident == "Response" || segment.ident == "HandlerResult" {
        return TypeShape::Response;
    }

    if segment.ident == "Result" {
        if let PathArguments::AngleBracketed(args) = &segment.arguments {
            if let Some(GenericArgument::Type(ok)) = args.args.first() {
                if is_named(ok, "Response") {
                    return TypeShape::Response;
                }
            }
        }
    }

    TypeShape::Other(written(ty))
}

/// Builds the signature of `sig`, identified by the function name, and the
/// pass mode of each typed parameter.
pub fn describe(sig: &syn::Signature) -> (Signature, Vec<PassBy>) {
    let mut has_receiver = false;
    let mut inputs = Vec::new();
    let mut passing = Vec::new();

    for arg in &sig.inputs {
        match arg {
            FnArg::Receiver(_) => has_receiver = true,
            FnArg::Typed(pat_type) => {
                let (shape, pass) = classify_param(&pat_type.ty);
                inputs.push(shape);
                passing.push(pass);
            }
        }
    }

    let mut signature = Signature::new(sig.ident.to_string(), inputs, classify_output(&sig.output));
    signature.has_receiver = has_receiver;
    (signature, passing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_request_params() {
        let ty: Type = parse_quote!(&mut Request);
        assert_eq!(classify_param(&ty).0, TypeShape::Request);

        let ty: Type = parse_quote!(&termrack::Request);
        assert_eq!(classify_param(&ty).0, TypeShape::Request);
    }

    #[test]
    fn test_by_value_request_rejected() {
        let ty: Type = parse_quote!(Request);
        assert_eq!(classify_param(&ty).0, TypeShape::Other("Request".into()));
    }

    #[test]
    fn test_next_params() {
        let ty: Type = parse_quote!(&Next);
        assert_eq!(classify_param(&ty), (TypeShape::Next, PassBy::Reference));

        let ty: Type = parse_quote!(Next);
        assert_eq!(classify_param(&ty), (TypeShape::Next, PassBy::Clone));
    }

    #[test]
    fn test_open_params() {
        let ty: Type = parse_quote!(&dyn Any);
        assert_eq!(classify_param(&ty).0, TypeShape::Open);

        let ty: Type = parse_quote!(&mut dyn std::any::Any);
        assert_eq!(classify_param(&ty).0, TypeShape::Open);
    }

    #[test]
    fn test_other_params() {
        let ty: Type = parse_quote!(&str);
        assert_eq!(classify_param(&ty).0, TypeShape::Other("& str".into()));
    }

    #[test]
    fn test_outputs() {
        let cases: Vec<(ReturnType, TypeShape)> = vec![
            (parse_quote!(-> Response), TypeShape::Response),
            (parse_quote!(-> HandlerResult), TypeShape::Response),
            (parse_quote!(-> Result<Response, MyError>), TypeShape::Response),
            (parse_quote!(-> anyhow::Result<Response>), TypeShape::Response),
            (parse_quote!(), TypeShape::Unit),
            (parse_quote!(-> ()), TypeShape::Unit),
            (
                parse_quote!(-> Result<String, MyError>),
                TypeShape::Other("Result < String , MyError >".into()),
            ),
        ];
        for (output, expected) in cases {
            assert_eq!(classify_output(&output), expected);
        }
    }

    #[test]
    fn test_describe() {
        let item: syn::ItemFn = parse_quote! {
            fn version(request: &mut Request, next: &Next) -> HandlerResult {
                next.invoke(request)
            }
        };
        let (signature, passing) = describe(&item.sig);
        assert_eq!(signature, Signature::middleware("version"));
        assert_eq!(passing, vec![PassBy::Reference, PassBy::Reference]);
    }

    #[test]
    fn test_describe_receiver() {
        let item: syn::ImplItemFn = parse_quote! {
            fn run(&self, request: &mut Request) -> Response {
                todo!()
            }
        };
        let (signature, _) = describe(&item.sig);
        assert!(signature.has_receiver);
        assert_eq!(signature.inputs, vec![TypeShape::Request]);
    }
}
