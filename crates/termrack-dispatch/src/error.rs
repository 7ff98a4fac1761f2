//! Error types for chain construction and invocation.

use thiserror::Error;

use crate::shape::{HandlerKind, Violation};

/// A candidate callable does not have the shape required for its kind.
///
/// Carries every violated rule, in a stable order (receiver, return type,
/// parameter count, parameter types), so all problems can be fixed at once.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{identifier} cannot be used as {kind}. {}.", join_violations(.violations))]
pub struct InvalidHandlerError {
    /// Fully-qualified identifier of the rejected callable.
    pub identifier: String,
    /// The kind of handler it was validated as.
    pub kind: HandlerKind,
    /// Violated rules, never empty.
    pub violations: Vec<Violation>,
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(". ")
}

/// Errors raised while ordering, linking or invoking a chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// A middleware was invoked before the linker assigned its `next`.
    ///
    /// This is a programming error: always link (or go through
    /// [`MiddlewareList::invoke`](crate::MiddlewareList)) before invoking.
    #[error("middleware '{name}' was invoked before being linked to a next handler")]
    Unlinked {
        /// Resolved name of the unlinked middleware.
        name: String,
    },

    /// A placement hint names a middleware that is not in the list.
    ///
    /// Only produced under [`PlacementPolicy::Error`](crate::PlacementPolicy).
    #[error("middleware '{name}' must be placed {relation} '{target}', which is not registered")]
    UnresolvedPlacement {
        /// Resolved name of the constrained middleware.
        name: String,
        /// `"before"` or `"after"`.
        relation: &'static str,
        /// The name that could not be found.
        target: String,
    },
}

/// Top-level terminal selection failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// Other than exactly one application was registered and none was given.
    #[error("expected exactly 1 application but found {found}; pass one explicitly to run it")]
    AmbiguousOrMissingTerminal {
        /// Number of registered applications.
        found: usize,
    },
}
