//! Shared implementation of the handler attribute macros.
//!
//! Each attribute keeps the annotated function unchanged and adds a
//! constructor next to it:
//!
//! ```rust,ignore
//! #[middleware(name = "version", first)]
//! fn version(request: &mut Request, next: &Next) -> HandlerResult { .. }
//!
//! // Generates:
//! // pub fn version_middleware() -> ::termrack::MiddlewareDescriptor {
//! //     ::termrack::MiddlewareDescriptor::new(
//! //         |request: &mut ::termrack::Request, next: &::termrack::Next| version(request, next),
//! //     )
//! //     .with_identifier(concat!(module_path!(), "::", "version"))
//! //     .with_metadata(::termrack::Metadata::new().name("version"))
//! //     .with_placement(::termrack::Placement { first: true, .. })
//! // }
//! ```
//!
//! The signature is validated with the same rules the runtime uses; a
//! mismatch becomes a compile error carrying the full violation list.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{spanned::Spanned, Error, ItemFn, Result};
use termrack_dispatch::{validate, HandlerKind};

use crate::attrs::HandlerAttrs;
use crate::signature::{describe, PassBy};

fn optional_str(value: &Option<String>) -> TokenStream {
    match value {
        Some(v) => quote! { ::std::option::Option::Some(::std::string::String::from(#v)) },
        None => quote! { ::std::option::Option::None },
    }
}

fn metadata_tokens(attrs: &HandlerAttrs) -> TokenStream {
    let name = optional_str(&attrs.name);
    let description = optional_str(&attrs.description);
    quote! {
        ::termrack::Metadata {
            name: #name,
            description: #description,
        }
    }
}

fn placement_tokens(attrs: &HandlerAttrs) -> TokenStream {
    let before = optional_str(&attrs.before);
    let after = optional_str(&attrs.after);
    let first = attrs.first;
    let last = attrs.last;
    quote! {
        ::termrack::Placement {
            before: #before,
            after: #after,
            first: #first,
            last: #last,
        }
    }
}

fn suffix(kind: HandlerKind) -> &'static str {
    match kind {
        HandlerKind::Application => "application",
        HandlerKind::Command => "command",
        HandlerKind::Middleware => "middleware",
    }
}

/// Expands `#[application]`, `#[command]` or `#[middleware]`.
pub fn handler_impl(
    kind: HandlerKind,
    attr: TokenStream,
    item: TokenStream,
) -> Result<TokenStream> {
    let attrs: HandlerAttrs = syn::parse2(attr)?;
    let fn_item: ItemFn = syn::parse2(item)?;
    let sig = &fn_item.sig;

    if kind.is_terminal() {
        attrs.reject_placement(suffix(kind))?;
    }
    if sig.asyncness.is_some() {
        return Err(Error::new(sig.asyncness.span(), "handler functions cannot be async"));
    }
    if !sig.generics.params.is_empty() {
        return Err(Error::new(sig.generics.span(), "handler functions cannot be generic"));
    }

    let (signature, passing) = describe(sig);
    validate(kind, &signature).map_err(|err| Error::new(sig.span(), err.to_string()))?;

    let fn_name = &sig.ident;
    let fn_name_str = fn_name.to_string();
    let fn_vis = &fn_item.vis;
    let ctor_name = format_ident!("{}_{}", fn_name, suffix(kind));
    let metadata = metadata_tokens(&attrs);
    let doc = format!("Builds the {} descriptor for [`{}`].", suffix(kind), fn_name_str);

    let constructor = match kind {
        HandlerKind::Application | HandlerKind::Command => {
            let build = format_ident!("{}", suffix(kind));
            quote! {
                #[doc = #doc]
                #fn_vis fn #ctor_name() -> ::termrack::Descriptor {
                    ::termrack::Descriptor::#build(
                        |__request: &mut ::termrack::Request| #fn_name(__request),
                    )
                        .with_identifier(concat!(module_path!(), "::", #fn_name_str))
                        .with_metadata(#metadata)
                }
            }
        }
        HandlerKind::Middleware => {
            let next_arg = match passing.get(1) {
                Some(PassBy::Clone) => quote! { ::std::clone::Clone::clone(__next) },
                _ => quote! { __next },
            };
            let placement = placement_tokens(&attrs);
            quote! {
                #[doc = #doc]
                #fn_vis fn #ctor_name() -> ::termrack::MiddlewareDescriptor {
                    ::termrack::MiddlewareDescriptor::new(
                        |__request: &mut ::termrack::Request, __next: &::termrack::Next| {
                            #fn_name(__request, #next_arg)
                        },
                    )
                    .with_identifier(concat!(module_path!(), "::", #fn_name_str))
                    .with_metadata(#metadata)
                    .with_placement(#placement)
                }
            }
        }
    };

    Ok(quote! {
        #fn_item

        #constructor
    })
}
