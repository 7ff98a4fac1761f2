//! Handler-chain dispatch for console programs.
//!
//! `termrack-dispatch` models a console program as a terminal handler that
//! turns an argument vector into a [`Response`] (output text, error text and
//! an exit code), wrapped by a chain of middleware that adds cross-cutting
//! behavior such as version flags, banners or logging without touching the
//! handler itself.
//!
//! # Features
//!
//! - **Shape validation**: [`validate`] checks a candidate's declared
//!   [`Signature`] and reports every violated rule at once
//! - **Descriptors**: [`Descriptor`] (terminal) and [`MiddlewareDescriptor`]
//!   with three-tier name resolution and placement hints
//! - **Ordering**: [`sort`] arranges middleware by `first`/`last`/`before`/`after`
//! - **Chains**: [`link`] and [`MiddlewareList::invoke`] wire and run a chain
//! - **Registry**: [`NamedList`] with exact and prefix lookup for commands
//! - **Boundary**: [`Response::execute`] writes the buffers and exits
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use termrack_dispatch::{
//!     Descriptor, HandlerResult, MiddlewareDescriptor, MiddlewareList, Next, Request, Response,
//! };
//!
//! fn app(request: &mut Request) -> Response {
//!     Response::with_output(format!("Hello! You passed: {}", request.arguments.join(", ")))
//! }
//!
//! fn version(request: &mut Request, next: &Next) -> HandlerResult {
//!     if request.has_flag(&["-v", "--version"]) {
//!         return Ok(Response::with_output("MyApp version 1.0.5.9"));
//!     }
//!     next.invoke(request)
//! }
//!
//! let terminal = Rc::new(Descriptor::application(app));
//! let mut chain: MiddlewareList = vec![Rc::new(MiddlewareDescriptor::new(version))].into();
//!
//! let response = chain.invoke(&mut Request::new(["--version"]), &terminal)?;
//! assert_eq!(response.output, "MyApp version 1.0.5.9\n");
//!
//! let response = chain.invoke(&mut Request::new(["a", "b"]), &terminal)?;
//! assert_eq!(response.output, "Hello! You passed: a, b\n");
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! # Threading
//!
//! Everything here is single-threaded and synchronous. Descriptors are shared
//! through `Rc` and hold their runtime state (`next`, overrides) in cells, so
//! a chain must be sorted and linked to completion before it is invoked.

mod chain;
mod descriptor;
mod error;
mod middleware;
mod ordering;
mod output;
mod registry;
mod request;
mod response;
mod shape;

pub use chain::{invoke, link};

pub use descriptor::{
    Candidate, Descriptor, HandlerResult, IntoHandlerResult, Metadata, TerminalFn,
};

pub use error::{ChainError, InvalidHandlerError, SelectionError};

pub use middleware::{MiddlewareDescriptor, MiddlewareFn, Next, Placement};

pub use ordering::{sort, sort_with, PlacementPolicy};

pub use output::{write_response, OutputMode};

pub use registry::{ApplicationList, CommandList, MiddlewareList, Named, NamedList};

pub use request::{Data, Request};

pub use response::Response;

pub use shape::{validate, violations, HandlerKind, Signature, TypeShape, Violation};
