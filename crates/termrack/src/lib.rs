//! # termrack - Middleware Racks for Console Programs
//!
//! termrack treats a console program as a handler that turns arguments into a
//! [`Response`] (output text, error text, exit code), and lets you stack
//! middleware around it: version flags, banners, timing, logging. The
//! handler never needs to know.
//!
//! ## Core Concepts
//!
//! - [`Request`]: the argument vector plus a typed side channel ([`Data`])
//! - [`Response`]: output and error buffers with an exit code
//! - [`Descriptor`]: a terminal handler (application or command)
//! - [`MiddlewareDescriptor`]: a wrapper that receives the request and [`Next`]
//! - [`Placement`]: `first`, `last`, `before` and `after` ordering hints
//! - [`Rack`]: registered handlers plus [`RackConfig`], ready to run
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use termrack::{application, middleware, HandlerResult, Next, Rack, Request, Response};
//!
//! #[application]
//! fn my_app(request: &mut Request) -> Response {
//!     Response::with_output(format!("Hello from MyApp!  You passed: {}", request.arguments.join(", ")))
//! }
//!
//! #[middleware]
//! fn version(request: &mut Request, next: &Next) -> HandlerResult {
//!     if matches!(request.first(), Some("-v" | "--version")) {
//!         return Ok(Response::with_output("MyApp version 1.0.5.9"));
//!     }
//!     next.invoke(request)
//! }
//!
//! #[middleware(last)]
//! fn add_header_and_footer(request: &mut Request, next: &Next) -> HandlerResult {
//!     Ok(next
//!         .invoke(request)?
//!         .prepend("[My App]\n==========\n")
//!         .append("==========\nCopyright (c) 2010 Some Cool Guys, Inc.\n"))
//! }
//!
//! fn main() {
//!     Rack::builder()
//!         .application(my_app_application())
//!         .middleware(version_middleware())
//!         .middleware(add_header_and_footer_middleware())
//!         .build()
//!         .execute_env();
//! }
//! ```
//!
//! ## Ordering
//!
//! Middleware runs in registration order unless placement hints say
//! otherwise. See [`sort`] for the exact rules, including what happens to a
//! middleware whose `before`/`after` target does not exist
//! ([`PlacementPolicy`]).
//!
//! ## Logging
//!
//! termrack emits [`tracing`](https://docs.rs/tracing) events: `debug` for
//! loading, sorting, linking and dispatch decisions, `warn` for excluded
//! handlers and dropped middleware. Install any subscriber to see them.

mod config;
mod error;
mod handlers;
mod rack;

pub use config::RackConfig;
pub use error::SetupError;
pub use handlers::Handlers;
pub use rack::{Loader, Rack, RackBuilder};

// Core types
pub use termrack_dispatch::{
    ApplicationList, Candidate, CommandList, Data, Descriptor, HandlerResult, IntoHandlerResult,
    Metadata, MiddlewareDescriptor, MiddlewareFn, MiddlewareList, Named, NamedList, Next,
    Placement, Request, Response, TerminalFn,
};

// Chain operations
pub use termrack_dispatch::{invoke, link, sort, sort_with, PlacementPolicy};

// Validation
pub use termrack_dispatch::{validate, violations, HandlerKind, Signature, TypeShape, Violation};

// Errors
pub use termrack_dispatch::{ChainError, InvalidHandlerError, SelectionError};

// Boundary
pub use termrack_dispatch::{write_response, OutputMode};

// Attribute macros
pub use termrack_macros::{application, command, middleware};
