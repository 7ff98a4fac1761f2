//! Attribute macros for termrack.
//!
//! These macros are the declaration surface for handlers: they attach a
//! declared name, description and (for middleware) placement hints to a
//! plain function, check its shape at compile time, and generate a
//! constructor returning the matching descriptor.
//!
//! # Available Macros
//!
//! - [`application`] - terminal handler run at the bottom of the chain
//! - [`command`] - terminal handler selected by name
//! - [`middleware`] - wrapper receiving the request and the next handler
//!
//! # Generated Constructors
//!
//! | Attribute | Constructor | Returns |
//! |-----------|-------------|---------|
//! | `#[application]` on `fn run` | `run_application()` | `Descriptor` |
//! | `#[command]` on `fn list` | `list_command()` | `Descriptor` |
//! | `#[middleware]` on `fn banner` | `banner_middleware()` | `MiddlewareDescriptor` |
//!
//! The derived identifier of every generated descriptor is
//! `module_path!()::fn_name`. The annotated function itself is left
//! untouched and can still be called directly.
//!
//! # Attribute Keys
//!
//! | Key | Type | Allowed on |
//! |-----|------|------------|
//! | `name` | string | all |
//! | `description` | string | all |
//! | `before` | string | `middleware` |
//! | `after` | string | `middleware` |
//! | `first` | flag or bool | `middleware` |
//! | `last` | flag or bool | `middleware` |
//!
//! The generated code refers to `::termrack`, so use these macros through
//! the `termrack` crate.

mod attrs;
mod handler;
mod signature;

use proc_macro::TokenStream;
use termrack_dispatch::HandlerKind;

fn expand(kind: HandlerKind, attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr = proc_macro2::TokenStream::from(attr);
    let item = proc_macro2::TokenStream::from(item);
    handler::handler_impl(kind, attr, item)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Declares an application: a terminal handler taking the request.
///
/// ```rust,ignore
/// use termrack::{application, Request, Response};
///
/// #[application(name = "greet", description = "Says hello")]
/// fn greet(request: &mut Request) -> Response {
///     Response::with_output(format!("Hello! You passed: {}", request.arguments.join(", ")))
/// }
///
/// let app = greet_application();
/// assert_eq!(app.name(), "greet");
/// ```
///
/// # Compile-Time Errors
///
/// The function must take exactly one request parameter (`&mut Request`,
/// `&Request` or `&dyn Any`), must return a `Response`-compatible type and
/// must not be async or generic.
#[proc_macro_attribute]
pub fn application(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand(HandlerKind::Application, attr, item)
}

/// Declares a command: a terminal handler selected by (possibly
/// abbreviated) name.
///
/// Same shape rules as [`application`].
#[proc_macro_attribute]
pub fn command(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand(HandlerKind::Command, attr, item)
}

/// Declares a middleware: a wrapper taking the request and the next handler.
///
/// ```rust,ignore
/// use termrack::{middleware, HandlerResult, Next, Request};
///
/// #[middleware(name = "banner", last)]
/// fn banner(request: &mut Request, next: &Next) -> HandlerResult {
///     Ok(next.invoke(request)?.prepend("[My App]\n"))
/// }
///
/// let mw = banner_middleware();
/// assert!(mw.last());
/// ```
///
/// # Compile-Time Errors
///
/// The function must take exactly two parameters, the request and the next
/// handler (`&Next`, `Next` or `&dyn Any`), and must return a
/// `Response`-compatible type.
#[proc_macro_attribute]
pub fn middleware(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand(HandlerKind::Middleware, attr, item)
}
