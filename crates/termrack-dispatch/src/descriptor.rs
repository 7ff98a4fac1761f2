//! Terminal handler descriptors.
//!
//! A [`Descriptor`] wraps a callable that turns a [`Request`] into a
//! [`Response`]. It is the node at the bottom of every chain: applications
//! and commands are both descriptors, distinguished by their
//! [`HandlerKind`].
//!
//! # Naming
//!
//! A descriptor's name resolves in three tiers:
//!
//! 1. an explicit override set with [`Descriptor::set_name`],
//! 2. the declared name from its [`Metadata`] (what `#[application(name = ..)]`
//!    and friends produce),
//! 3. the derived fully-qualified identifier of the callable.
//!
//! Descriptions follow the same order minus the derived fallback, so they
//! default to `None`.
//!
//! # Handler Results
//!
//! Callables may return a bare [`Response`] or any `Result<Response, E>`
//! whose error converts into `anyhow::Error`. Both are normalized to
//! [`HandlerResult`] through [`IntoHandlerResult`]. Errors are never caught
//! or translated by the chain; they propagate to the caller as-is.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::InvalidHandlerError;
use crate::middleware::Placement;
use crate::request::Request;
use crate::response::Response;
use crate::shape::{validate, HandlerKind, Signature};

/// The result type every handler invocation produces.
pub type HandlerResult = Result<Response, anyhow::Error>;

/// Type-erased terminal callable.
pub type TerminalFn = Rc<dyn Fn(&mut Request) -> HandlerResult>;

/// Types a handler may return.
///
/// ```rust
/// use termrack_dispatch::{HandlerResult, IntoHandlerResult, Response};
///
/// let plain: HandlerResult = Response::with_output("hi").into_handler_result();
/// assert!(plain.is_ok());
///
/// let failed: Result<Response, std::io::Error> =
///     Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
/// assert!(failed.into_handler_result().is_err());
/// ```
pub trait IntoHandlerResult {
    /// Converts this value into a [`HandlerResult`].
    fn into_handler_result(self) -> HandlerResult;
}

impl IntoHandlerResult for Response {
    fn into_handler_result(self) -> HandlerResult {
        Ok(self)
    }
}

impl<E> IntoHandlerResult for Result<Response, E>
where
    E: Into<anyhow::Error>,
{
    fn into_handler_result(self) -> HandlerResult {
        self.map_err(Into::into)
    }
}

/// Declared name and description, as supplied by registration metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Declared name, overriding the derived identifier.
    pub name: Option<String>,
    /// Declared description.
    pub description: Option<String>,
}

impl Metadata {
    /// Creates empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the declared name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the declared description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A callable offered for registration together with its declared shape and
/// metadata.
///
/// This is what a discovery or registration layer hands to
/// [`Descriptor::try_application`], [`Descriptor::try_command`] or
/// [`MiddlewareDescriptor::try_from_candidate`](crate::MiddlewareDescriptor::try_from_candidate).
/// The signature describes the callable as it was declared, which is what
/// the shape rules are checked against.
pub struct Candidate<F> {
    /// Declared shape of the callable.
    pub signature: Signature,
    /// Declared name and description.
    pub metadata: Metadata,
    /// Declared ordering hints. Ignored for terminal handlers.
    pub placement: Placement,
    /// The invocable adapter.
    pub callable: F,
}

impl<F> Candidate<F> {
    /// Creates a candidate with empty metadata and placement.
    pub fn new(signature: Signature, callable: F) -> Self {
        Self {
            signature,
            metadata: Metadata::default(),
            placement: Placement::default(),
            callable,
        }
    }

    /// Sets the declared metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Sets the declared placement hints.
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }
}

/// Three-tier name/description resolution shared by both descriptor kinds.
pub(crate) struct Naming {
    identifier: String,
    declared: Metadata,
    name_override: RefCell<Option<String>>,
    description_override: RefCell<Option<String>>,
}

impl Naming {
    pub(crate) fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            declared: Metadata::default(),
            name_override: RefCell::new(None),
            description_override: RefCell::new(None),
        }
    }

    pub(crate) fn identifier(&self) -> &str {
        &self.identifier
    }

    pub(crate) fn set_identifier(&mut self, identifier: String) {
        self.identifier = identifier;
    }

    pub(crate) fn declared(&self) -> &Metadata {
        &self.declared
    }

    pub(crate) fn set_declared(&mut self, metadata: Metadata) {
        self.declared = metadata;
    }

    pub(crate) fn name(&self) -> String {
        self.name_override
            .borrow()
            .clone()
            .or_else(|| self.declared.name.clone())
            .unwrap_or_else(|| self.identifier.clone())
    }

    pub(crate) fn description(&self) -> Option<String> {
        self.description_override
            .borrow()
            .clone()
            .or_else(|| self.declared.description.clone())
    }

    pub(crate) fn set_name(&self, name: String) {
        *self.name_override.borrow_mut() = Some(name);
    }

    pub(crate) fn set_description(&self, description: String) {
        *self.description_override.borrow_mut() = Some(description);
    }
}

/// A terminal handler: an application or a command.
pub struct Descriptor {
    kind: HandlerKind,
    naming: Naming,
    callable: TerminalFn,
}

impl Descriptor {
    fn build<F, R>(kind: HandlerKind, f: F) -> Self
    where
        F: Fn(&mut Request) -> R + 'static,
        R: IntoHandlerResult,
    {
        Self {
            kind,
            naming: Naming::new(std::any::type_name::<F>()),
            callable: Rc::new(move |request: &mut Request| f(request).into_handler_result()),
        }
    }

    /// Creates an application descriptor.
    ///
    /// The derived identifier is the callable's type name, which for a
    /// function item is its full path (`my_app::cli::run`).
    ///
    /// ```rust
    /// use termrack_dispatch::{Descriptor, Request, Response};
    ///
    /// fn greet(request: &mut Request) -> Response {
    ///     Response::with_output(format!("You requested: {}", request.arguments.join(", ")))
    /// }
    ///
    /// let app = Descriptor::application(greet);
    /// assert!(app.name().ends_with("::greet"));
    ///
    /// let response = app.invoke_args(["hello", "world"])?;
    /// assert_eq!(response.output, "You requested: hello, world\n");
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn application<F, R>(f: F) -> Self
    where
        F: Fn(&mut Request) -> R + 'static,
        R: IntoHandlerResult,
    {
        Self::build(HandlerKind::Application, f)
    }

    /// Creates a command descriptor.
    pub fn command<F, R>(f: F) -> Self
    where
        F: Fn(&mut Request) -> R + 'static,
        R: IntoHandlerResult,
    {
        Self::build(HandlerKind::Command, f)
    }

    /// Validates a candidate's declared shape as an application and builds
    /// the descriptor.
    ///
    /// The candidate's signature identifier becomes the derived identifier.
    pub fn try_application<F, R>(candidate: Candidate<F>) -> Result<Self, InvalidHandlerError>
    where
        F: Fn(&mut Request) -> R + 'static,
        R: IntoHandlerResult,
    {
        Self::from_candidate(HandlerKind::Application, candidate)
    }

    /// Validates a candidate's declared shape as a command and builds the
    /// descriptor.
    pub fn try_command<F, R>(candidate: Candidate<F>) -> Result<Self, InvalidHandlerError>
    where
        F: Fn(&mut Request) -> R + 'static,
        R: IntoHandlerResult,
    {
        Self::from_candidate(HandlerKind::Command, candidate)
    }

    /// `kind` is always terminal: middleware candidates go through
    /// [`MiddlewareDescriptor::try_from_candidate`](crate::MiddlewareDescriptor::try_from_candidate).
    fn from_candidate<F, R>(
        kind: HandlerKind,
        candidate: Candidate<F>,
    ) -> Result<Self, InvalidHandlerError>
    where
        F: Fn(&mut Request) -> R + 'static,
        R: IntoHandlerResult,
    {
        debug_assert!(kind.is_terminal());
        validate(kind, &candidate.signature)?;
        Ok(Self::build(kind, candidate.callable)
            .with_identifier(candidate.signature.identifier)
            .with_metadata(candidate.metadata))
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

    /// The role of this descriptor.
    pub fn kind(&self) -> HandlerKind {
        self.kind
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

    /// Overrides the name for the rest of this descriptor's life.
    pub fn set_name(&self, name: impl Into<String>) {
        self.naming.set_name(name.into());
    }

    /// Overrides the description for the rest of this descriptor's life.
    pub fn set_description(&self, description: impl Into<String>) {
        self.naming.set_description(description.into());
    }

    /// Calls the wrapped callable with `request`.
    pub fn invoke(&self, request: &mut Request) -> HandlerResult {
        (self.callable)(request)
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

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("kind", &self.kind)
            .field("name", &self.name())
            .field("identifier", &self.identifier())
            .finish_non_exhaustive()
    }
}
