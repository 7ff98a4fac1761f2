//! Middleware descriptors.
//!
//! Middleware wraps the rest of the chain. Each middleware callable receives
//! the request and a [`Next`] handle, and decides per invocation how often to
//! call it:
//!
//! - never: the chain is short-circuited and its own response is returned
//!   (a `--version` interceptor),
//! - once: normal pass-through, optionally decorating the response
//!   (a header/footer banner),
//! - several times: everything below runs again, producing independent
//!   responses the middleware may combine.
//!
//! ```text
//! request → [first] → ... → [middleware] → ... → [last] → terminal
//! response ←──────────────────────────────────────────────┘
//! ```
//!
//! # Placement Hints
//!
//! Unordered middleware is arranged by the ordering engine using
//! [`Placement`] hints: `first`, `last`, `before = "<name>"` and
//! `after = "<name>"`. When `first` or `last` is set, `before`/`after` are
//! ignored for that node. Hints resolve like names: a runtime override
//! (`set_before`, `set_first`, ...) wins over the declared value.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::descriptor::{
    Candidate, Descriptor, HandlerResult, IntoHandlerResult, Metadata, Naming,
};
use crate::error::{ChainError, InvalidHandlerError};
use crate::request::Request;
use crate::shape::{validate, HandlerKind};

/// Type-erased middleware callable.
pub type MiddlewareFn = Rc<dyn Fn(&mut Request, &Next) -> HandlerResult>;

/// Declared ordering hints for a middleware.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement {
    /// Name of the middleware this one must run directly in front of.
    pub before: Option<String>,
    /// Name of the middleware this one must run directly behind.
    pub after: Option<String>,
    /// Pin to the front of the chain.
    pub first: bool,
    /// Pin to the back of the chain, just above the terminal handler.
    pub last: bool,
}

impl Placement {
    /// No hints: keep registration order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin to the front.
    pub fn first() -> Self {
        Self {
            first: true,
            ..Self::default()
        }
    }

    /// Pin to the back.
    pub fn last() -> Self {
        Self {
            last: true,
            ..Self::default()
        }
    }

    /// Run directly in front of `name`.
    pub fn before(name: impl Into<String>) -> Self {
        Self {
            before: Some(name.into()),
            ..Self::default()
        }
    }

    /// Run directly behind `name`.
    pub fn after(name: impl Into<String>) -> Self {
        Self {
            after: Some(name.into()),
            ..Self::default()
        }
    }

    /// Returns true if this node is pinned with `first` or `last`.
    pub fn is_pinned(&self) -> bool {
        self.first || self.last
    }
}

/// The handler a middleware hands control to.
///
/// Assigned by the linker: every middleware's `next` is the following
/// middleware, and the last one's is the terminal descriptor.
#[derive(Clone)]
pub enum Next {
    /// Another middleware further down the chain.
    Middleware(Rc<MiddlewareDescriptor>),
    /// The terminal handler at the bottom of the chain.
    Terminal(Rc<Descriptor>),
}

impl Next {
    /// Runs the rest of the chain.
    pub fn invoke(&self, request: &mut Request) -> HandlerResult {
        match self {
            Next::Middleware(mw) => mw.invoke(request),
            Next::Terminal(app) => app.invoke(request),
        }
    }

    /// Resolved name of the handler.
    pub fn name(&self) -> String {
        match self {
            Next::Middleware(mw) => mw.name(),
            Next::Terminal(app) => app.name(),
        }
    }

    /// Returns true if this is the terminal handler.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Next::Terminal(_))
    }

    /// Returns true if this is exactly `middleware` (same allocation).
    pub fn is_middleware(&self, middleware: &Rc<MiddlewareDescriptor>) -> bool {
        matches!(self, Next::Middleware(mw) if Rc::ptr_eq(mw, middleware))
    }

    /// Returns true if this is exactly `terminal` (same allocation).
    pub fn is_descriptor(&self, terminal: &Rc<Descriptor>) -> bool {
        matches!(self, Next::Terminal(app) if Rc::ptr_eq(app, terminal))
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Next::Middleware(_) => f.debug_tuple("Middleware").field(&self.name()).finish(),
            Next::Terminal(_) => f.debug_tuple("Terminal").field(&self.name()).finish(),
        }
    }
}

/// A middleware node: a callable plus naming, placement hints and the
/// linker-assigned `next`.
pub struct MiddlewareDescriptor {
    naming: Naming,
    declared: Placement,
    before_override: RefCell<Option<String>>,
    after_override: RefCell<Option<String>>,
    first_override: Cell<Option<bool>>,
    last_override: Cell<Option<bool>>,
    next: RefCell<Option<Next>>,
    callable: MiddlewareFn,
}

impl MiddlewareDescriptor {
    /// Creates a middleware descriptor from a callable.
    ///
    /// ```rust
    /// use termrack_dispatch::{MiddlewareDescriptor, Next, Request, HandlerResult};
    ///
    /// fn banner(request: &mut Request, next: &Next) -> HandlerResult {
    ///     Ok(next.invoke(request)?.prepend("[My App]\n"))
    /// }
    ///
    /// let mw = MiddlewareDescriptor::new(banner);
    /// assert!(mw.name().ends_with("::banner"));
    /// assert!(!mw.is_linked());
    /// ```
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn(&mut Request, &Next) -> R + 'static,
        R: IntoHandlerResult,
    {
        Self {
            naming: Naming::new(std::any::type_name::<F>()),
            declared: Placement::default(),
            before_override: RefCell::new(None),
            after_override: RefCell::new(None),
            first_override: Cell::new(None),
            last_override: Cell::new(None),
            next: RefCell::new(None),
            callable: Rc::new(move |request: &mut Request, next: &Next| {
                f(request, next).into_handler_result()
            }),
        }
    }

    /// Validates a candidate's declared shape and builds a middleware from it.
    pub fn try_from_candidate<F, R>(candidate: Candidate<F>) -> Result<Self, InvalidHandlerError>
    where
        F: Fn(&mut Request, &Next) -> R + 'static,
        R: IntoHandlerResult,
    {
        validate(HandlerKind::Middleware, &candidate.signature)?;
        Ok(Self::new(candidate.callable)
            .with_identifier(candidate.signature.identifier)
            .with_metadata(candidate.metadata)
            .with_placement(candidate.placement))
    }

    /// Replaces the derived identifier.
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.naming.set_identifier(identifier.into());
        self
    }

    /// Sets the declared metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.naming.set_declared(metadata);
        self
    }

    /// Sets the declared placement hints.
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.declared = placement;
        self
    }

    /// Shorthand for `with_metadata(Metadata::new().name(name))`.
    pub fn named(self, name: impl Into<String>) -> Self {
        let metadata = self.naming.declared().clone().name(name);
        self.with_metadata(metadata)
    }

    /// The derived fully-qualified identifier.
    pub fn identifier(&self) -> &str {
        self.naming.identifier()
    }

    /// The declared metadata.
    pub fn metadata(&self) -> &Metadata {
        self.naming.declared()
    }

    /// The resolved name.
    pub fn name(&self) -> String {
        self.naming.name()
    }

    /// The resolved description.
    pub fn description(&self) -> Option<String> {
        self.naming.description()
    }

    /// Overrides the name.
    pub fn set_name(&self, name: impl Into<String>) {
        self.naming.set_name(name.into());
    }

    /// Overrides the description.
    pub fn set_description(&self, description: impl Into<String>) {
        self.naming.set_description(description.into());
    }

    /// Resolved `before` hint. Empty names count as unset.
    pub fn before(&self) -> Option<String> {
        self.before_override
            .borrow()
            .clone()
            .or_else(|| self.declared.before.clone())
            .filter(|name| !name.is_empty())
    }

    /// Resolved `after` hint. Empty names count as unset.
    pub fn after(&self) -> Option<String> {
        self.after_override
            .borrow()
            .clone()
            .or_else(|| self.declared.after.clone())
            .filter(|name| !name.is_empty())
    }

    /// Resolved `first` flag.
    pub fn first(&self) -> bool {
        self.first_override.get().unwrap_or(self.declared.first)
    }

    /// Resolved `last` flag.
    pub fn last(&self) -> bool {
        self.last_override.get().unwrap_or(self.declared.last)
    }

    /// All resolved hints at once.
    pub fn placement(&self) -> Placement {
        Placement {
            before: self.before(),
            after: self.after(),
            first: self.first(),
            last: self.last(),
        }
    }

    /// Overrides the `before` hint.
    pub fn set_before(&self, name: impl Into<String>) {
        *self.before_override.borrow_mut() = Some(name.into());
    }

    /// Overrides the `after` hint.
    pub fn set_after(&self, name: impl Into<String>) {
        *self.after_override.borrow_mut() = Some(name.into());
    }

    /// Overrides the `first` flag.
    pub fn set_first(&self, first: bool) {
        self.first_override.set(Some(first));
    }

    /// Overrides the `last` flag.
    pub fn set_last(&self, last: bool) {
        self.last_override.set(Some(last));
    }

    /// The linker-assigned next handler, if linked.
    pub fn next(&self) -> Option<Next> {
        self.next.borrow().clone()
    }

    /// Assigns the next handler.
    pub fn set_next(&self, next: Next) {
        *self.next.borrow_mut() = Some(next);
    }

    /// Removes the next handler, returning the node to the unlinked state.
    pub fn unlink(&self) -> Option<Next> {
        self.next.borrow_mut().take()
    }

    /// Returns true once a next handler has been assigned.
    pub fn is_linked(&self) -> bool {
        self.next.borrow().is_some()
    }

    /// Calls the wrapped callable with `request` and the linked next handler.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Unlinked`] if the node has not been linked.
    /// Errors from the callable itself are returned unchanged.
    pub fn invoke(&self, request: &mut Request) -> HandlerResult {
        let next = self.next().ok_or_else(|| ChainError::Unlinked { name: self.name() })?;
        (self.callable)(request, &next)
    }

    /// Wraps `arguments` into a fresh request and invokes.
    pub fn invoke_args<I, S>(&self, arguments: I) -> HandlerResult
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.invoke(&mut Request::new(arguments))
    }
}

impl fmt::Debug for MiddlewareDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareDescriptor")
            .field("name", &self.name())
            .field("placement", &self.placement())
            .field("next", &self.next().map(|next| next.name()))
            .finish_non_exhaustive()
    }
}
