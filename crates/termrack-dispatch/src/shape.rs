//! Handler shape validation.
//!
//! Before a callable can become a [`Descriptor`](crate::Descriptor) or
//! [`MiddlewareDescriptor`](crate::MiddlewareDescriptor) its declared shape
//! is checked against the rules for its [`HandlerKind`]:
//!
//! | Rule | Terminal (`Application`, `Command`) | `Middleware` |
//! |------|-------------------------------------|--------------|
//! | Receiver | none (free function) | none |
//! | Return | Response-compatible | Response-compatible |
//! | Parameter count | 1 | 2 |
//! | Parameter 1 | accepts a `Request` | accepts a `Request` |
//! | Parameter 2 | - | accepts a `Next` |
//!
//! "Accepts" is contravariant: an open parameter type such as `&dyn Any`
//! accepts a request as well. Returns are covariant: `Response`,
//! `HandlerResult` and `Result<Response, E>` are all Response-compatible.
//!
//! Every violated rule is collected, so the resulting
//! [`InvalidHandlerError`] lists all problems in one message. The
//! `termrack-macros` attributes run the same checks at compile time.

use std::fmt;

use crate::error::InvalidHandlerError;

/// The role a handler plays in a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    /// A terminal handler run at the bottom of the chain.
    Application,
    /// A terminal handler selected by name from a command list.
    Command,
    /// A wrapper that receives the request and the next handler.
    Middleware,
}

impl HandlerKind {
    /// Returns true for kinds that end a chain.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, HandlerKind::Middleware)
    }

    /// Number of parameters a callable of this kind takes.
    pub fn arity(&self) -> usize {
        if self.is_terminal() {
            1
        } else {
            2
        }
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerKind::Application => write!(f, "Application"),
            HandlerKind::Command => write!(f, "Command"),
            HandlerKind::Middleware => write!(f, "Middleware"),
        }
    }
}

/// Coarse classification of a declared parameter or return type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeShape {
    /// A borrowed request (`&Request`, `&mut Request`).
    Request,
    /// `Response`, or a result wrapping one.
    Response,
    /// The next handler in the chain (`&Next`, `Next`).
    Next,
    /// An open type that accepts any value (`&dyn Any`).
    Open,
    /// The unit type, or no declared return.
    Unit,
    /// Anything else, by its written name.
    Other(String),
}

impl TypeShape {
    /// Returns true if a parameter of this shape can receive a request.
    pub fn accepts_request(&self) -> bool {
        matches!(self, TypeShape::Request | TypeShape::Open)
    }

    /// Returns true if a parameter of this shape can receive the next handler.
    pub fn accepts_next(&self) -> bool {
        matches!(self, TypeShape::Next | TypeShape::Open)
    }

    /// Returns true if a return of this shape yields a response.
    pub fn is_response_compatible(&self) -> bool {
        matches!(self, TypeShape::Response)
    }
}

/// The declared shape of a candidate callable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Fully-qualified identifier, e.g. `my_app::cli::version`.
    pub identifier: String,
    /// True if the callable needs an owning instance (`self` receiver).
    pub has_receiver: bool,
    /// Shape of the return type.
    pub output: TypeShape,
    /// Shapes of the parameters, in order, excluding any receiver.
    pub inputs: Vec<TypeShape>,
}

impl Signature {
    /// Creates a signature for a free function.
    pub fn new(identifier: impl Into<String>, inputs: Vec<TypeShape>, output: TypeShape) -> Self {
        Self {
            identifier: identifier.into(),
            has_receiver: false,
            output,
            inputs,
        }
    }

    /// The canonical terminal shape: `fn(&mut Request) -> HandlerResult`.
    pub fn terminal(identifier: impl Into<String>) -> Self {
        Self::new(identifier, vec![TypeShape::Request], TypeShape::Response)
    }

    /// The canonical middleware shape: `fn(&mut Request, &Next) -> HandlerResult`.
    pub fn middleware(identifier: impl Into<String>) -> Self {
        Self::new(
            identifier,
            vec![TypeShape::Request, TypeShape::Next],
            TypeShape::Response,
        )
    }

    /// Marks the callable as needing an owning instance.
    pub fn with_receiver(mut self) -> Self {
        self.has_receiver = true;
        self
    }
}

/// A single violated shape rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Violation {
    /// The callable takes `self`.
    NotStatic,
    /// The return type is not Response-compatible.
    WrongReturnType,
    /// The callable takes the wrong number of parameters.
    ParameterCount {
        /// Kind validated against, which fixes the expected count.
        kind: HandlerKind,
    },
    /// The parameter at `position` (1-based) has the wrong type.
    ParameterType {
        /// Kind validated against.
        kind: HandlerKind,
        /// 1-based position of the offending parameter.
        position: usize,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::NotStatic => write!(f, "Must be static (no self receiver)"),
            Violation::WrongReturnType => write!(f, "Must return a Response"),
            Violation::ParameterCount { kind } if kind.is_terminal() => {
                write!(f, "Must take 1 parameter (Request)")
            }
            Violation::ParameterCount { .. } => write!(f, "Must take 2 parameters (Request, Next)"),
            Violation::ParameterType { kind, .. } if kind.is_terminal() => {
                write!(f, "Parameter must be a Request")
            }
            Violation::ParameterType { position: 1, .. } => {
                write!(f, "Parameter 1 must be a Request")
            }
            Violation::ParameterType { position, .. } => {
                write!(f, "Parameter {} must be a Next", position)
            }
        }
    }
}

/// Collects every rule `signature` violates for `kind`, in stable order.
pub fn violations(kind: HandlerKind, signature: &Signature) -> Vec<Violation> {
    let mut found = Vec::new();

    if signature.has_receiver {
        found.push(Violation::NotStatic);
    }

    if !signature.output.is_response_compatible() {
        found.push(Violation::WrongReturnType);
    }

    if signature.inputs.len() != kind.arity() {
        found.push(Violation::ParameterCount { kind });
    } else {
        if !signature.inputs[0].accepts_request() {
            found.push(Violation::ParameterType { kind, position: 1 });
        }
        if !kind.is_terminal() && !signature.inputs[1].accepts_next() {
            found.push(Violation::ParameterType { kind, position: 2 });
        }
    }

    found
}

/// Validates `signature` for `kind`.
///
/// # Example
///
/// ```rust
/// use termrack_dispatch::{validate, HandlerKind, Signature, TypeShape};
///
/// let ok = Signature::terminal("app::run");
/// assert!(validate(HandlerKind::Application, &ok).is_ok());
///
/// let bad = Signature::new("app::broken", vec![], TypeShape::Unit);
/// let err = validate(HandlerKind::Application, &bad).unwrap_err();
/// assert_eq!(
///     err.to_string(),
///     "app::broken cannot be used as Application. Must return a Response. Must take 1 parameter (Request)."
/// );
/// ```
pub fn validate(kind: HandlerKind, signature: &Signature) -> Result<(), InvalidHandlerError> {
    let violations = violations(kind, signature);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(InvalidHandlerError {
            identifier: signature.identifier.clone(),
            kind,
            violations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    fn other(name: &str) -> TypeShape {
        TypeShape::Other(name.into())
    }

    #[test]
    fn test_valid_terminal() {
        let sig = Signature::terminal("demo::foo");
        assert!(validate(HandlerKind::Application, &sig).is_ok());
        assert!(validate(HandlerKind::Command, &sig).is_ok());
    }

    #[test]
    fn test_valid_middleware() {
        let sig = Signature::middleware("demo::version");
        assert!(validate(HandlerKind::Middleware, &sig).is_ok());
    }

    #[test]
    fn test_open_parameter_accepts_request() {
        let sig = Signature::new("demo::object_param", vec![TypeShape::Open], TypeShape::Response);
        assert!(validate(HandlerKind::Command, &sig).is_ok());

        let sig = Signature::new(
            "demo::open_next",
            vec![TypeShape::Open, TypeShape::Open],
            TypeShape::Response,
        );
        assert!(validate(HandlerKind::Middleware, &sig).is_ok());
    }

    #[test]
    fn test_instance_method() {
        let sig = Signature::terminal("demo::Handlers::instance_method").with_receiver();
        let err = validate(HandlerKind::Command, &sig).unwrap_err();
        assert_eq!(err.violations, vec![Violation::NotStatic]);
        assert_snapshot!(err.to_string(), @"demo::Handlers::instance_method cannot be used as Command. Must be static (no self receiver).");
    }

    #[test]
    fn test_wrong_return_type() {
        let sig = Signature::new("demo::wrong_return", vec![TypeShape::Request], TypeShape::Open);
        let err = validate(HandlerKind::Command, &sig).unwrap_err();
        assert_snapshot!(err.to_string(), @"demo::wrong_return cannot be used as Command. Must return a Response.");
    }

    #[test]
    fn test_parameter_count() {
        let none = Signature::new("demo::no_params", vec![], TypeShape::Response);
        let err = validate(HandlerKind::Command, &none).unwrap_err();
        assert_snapshot!(err.to_string(), @"demo::no_params cannot be used as Command. Must take 1 parameter (Request).");

        let many = Signature::new(
            "demo::too_many",
            vec![TypeShape::Request, TypeShape::Open],
            TypeShape::Response,
        );
        let err = validate(HandlerKind::Command, &many).unwrap_err();
        assert_eq!(
            err.violations,
            vec![Violation::ParameterCount {
                kind: HandlerKind::Command
            }]
        );
    }

    #[test]
    fn test_wrong_parameter_type() {
        let sig = Signature::new("demo::wrong_param", vec![other("&str")], TypeShape::Response);
        let err = validate(HandlerKind::Command, &sig).unwrap_err();
        assert_snapshot!(err.to_string(), @"demo::wrong_param cannot be used as Command. Parameter must be a Request.");
    }

    #[test]
    fn test_middleware_parameter_types() {
        let sig = Signature::new(
            "demo::swapped",
            vec![TypeShape::Next, TypeShape::Request],
            TypeShape::Response,
        );
        let err = validate(HandlerKind::Middleware, &sig).unwrap_err();
        assert_snapshot!(err.to_string(), @"demo::swapped cannot be used as Middleware. Parameter 1 must be a Request. Parameter 2 must be a Next.");
    }

    #[test]
    fn test_middleware_with_terminal_shape() {
        let sig = Signature::terminal("demo::not_middleware");
        let err = validate(HandlerKind::Middleware, &sig).unwrap_err();
        assert_snapshot!(err.to_string(), @"demo::not_middleware cannot be used as Middleware. Must take 2 parameters (Request, Next).");
    }

    #[test]
    fn test_all_violations_collected_in_order() {
        let sig = Signature::new("demo::everything_wrong", vec![], TypeShape::Unit).with_receiver();
        let err = validate(HandlerKind::Application, &sig).unwrap_err();
        assert_eq!(
            err.violations,
            vec![
                Violation::NotStatic,
                Violation::WrongReturnType,
                Violation::ParameterCount {
                    kind: HandlerKind::Application
                },
            ]
        );
    }

    #[test]
    fn test_parameter_types_skipped_when_count_wrong() {
        let sig = Signature::new(
            "demo::three",
            vec![other("u8"), other("u8"), other("u8")],
            TypeShape::Response,
        );
        let err = validate(HandlerKind::Middleware, &sig).unwrap_err();
        assert_eq!(err.violations.len(), 1);
    }
}
