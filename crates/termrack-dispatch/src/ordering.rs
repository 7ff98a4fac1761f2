//! Middleware ordering.
//!
//! Middleware arrives in registration order. [`sort`] rearranges it in place
//! according to each node's [`Placement`](crate::Placement) hints, in two
//! passes over a snapshot of the incoming list:
//!
//! 1. **Pinning.** In original order, every `first` node is moved to the
//!    front and every `last` node to the back. Each move is applied to the
//!    list as left by the previous ones, so the node processed last ends up
//!    outermost: several `first` nodes end up in *reverse* registration
//!    order (`[A, B, C]` becomes `[C, B, A]`), while several `last` nodes
//!    keep it with `C` at the very back.
//! 2. **Relative placement.** Every node that is neither `first` nor `last`
//!    and has a `before` hint is moved directly in front of the node with
//!    that name; failing that, a node with an `after` hint is moved directly
//!    behind its target. Pinned nodes ignore `before`/`after`.
//!
//! The hint values are read once, before anything moves.
//!
//! # Unresolved Targets
//!
//! A node whose `before`/`after` target is not in the list is handled by the
//! [`PlacementPolicy`]. The default, [`PlacementPolicy::Drop`], removes the
//! node: it will not be part of the chain and never runs.
//!
//! # Cycles
//!
//! There is no cycle detection. Contradictory hints resolve by the sequence
//! of moves, so the outcome depends on registration order.
//!
//! ```rust
//! use std::rc::Rc;
//! use termrack_dispatch::{sort, HandlerResult, MiddlewareDescriptor, MiddlewareList, Next, Placement, Request};
//!
//! fn pass(request: &mut Request, next: &Next) -> HandlerResult { next.invoke(request) }
//!
//! let mw = |name: &str, placement: Placement| {
//!     Rc::new(MiddlewareDescriptor::new(pass).named(name).with_placement(placement))
//! };
//!
//! let mut list: MiddlewareList = vec![
//!     mw("a", Placement::last()),
//!     mw("b", Placement::new()),
//!     mw("c", Placement::before("b")),
//!     mw("d", Placement::first()),
//!     mw("e", Placement::after("ghost")),
//! ].into();
//!
//! sort(&mut list);
//! assert_eq!(list.names(), ["d", "c", "b", "a"]);
//! ```

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use tracing::{debug, trace, warn};

use crate::error::ChainError;
use crate::middleware::MiddlewareDescriptor;
use crate::registry::MiddlewareList;

/// What to do with a middleware whose `before`/`after` target is missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PlacementPolicy {
    /// Leave the node out of the chain.
    #[default]
    Drop,
    /// Abort sorting with [`ChainError::UnresolvedPlacement`]. The list is
    /// left as it was before sorting.
    Error,
    /// Keep the node, at the end of the list.
    Append,
}

impl fmt::Display for PlacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementPolicy::Drop => write!(f, "drop"),
            PlacementPolicy::Error => write!(f, "error"),
            PlacementPolicy::Append => write!(f, "append"),
        }
    }
}

impl FromStr for PlacementPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "drop" => Ok(PlacementPolicy::Drop),
            "error" => Ok(PlacementPolicy::Error),
            "append" => Ok(PlacementPolicy::Append),
            _ => Err(format!("Invalid placement policy: {}", s)),
        }
    }
}

/// Hint values captured before any move.
struct Snapshot {
    node: Rc<MiddlewareDescriptor>,
    first: bool,
    last: bool,
    before: Option<String>,
    after: Option<String>,
}

/// Sorts `list` in place, dropping nodes with unresolved targets.
pub fn sort(list: &mut MiddlewareList) {
    // Drop never fails.
    let _ = sort_with(list, PlacementPolicy::Drop);
}

/// Sorts `list` in place under `policy`.
///
/// # Errors
///
/// Only with [`PlacementPolicy::Error`]: returns
/// [`ChainError::UnresolvedPlacement`] for the first node whose target is
/// missing, with `list` restored to its original order.
pub fn sort_with(list: &mut MiddlewareList, policy: PlacementPolicy) -> Result<(), ChainError> {
    let original = list.clone();
    let snapshot: Vec<Snapshot> = list
        .iter()
        .map(|node| Snapshot {
            node: node.clone(),
            first: node.first(),
            last: node.last(),
            before: node.before(),
            after: node.after(),
        })
        .collect();

    debug!(count = snapshot.len(), %policy, "sorting middleware");

    for entry in &snapshot {
        if entry.first {
            trace!(name = %entry.node.name(), "pinning to top");
            list.move_to_top(&entry.node);
        } else if entry.last {
            trace!(name = %entry.node.name(), "pinning to bottom");
            list.move_to_bottom(&entry.node);
        }
    }

    for entry in &snapshot {
        if entry.first || entry.last {
            continue;
        }

        let (relation, target) = match (&entry.before, &entry.after) {
            (Some(target), _) => ("before", target),
            (None, Some(target)) => ("after", target),
            (None, None) => continue,
        };

        trace!(name = %entry.node.name(), relation, target = %target, "placing");
        let placed = if relation == "before" {
            list.move_before(&entry.node, target)
        } else {
            list.move_after(&entry.node, target)
        };
        if placed {
            continue;
        }

        let name = entry.node.name();
        match policy {
            PlacementPolicy::Drop => {
                warn!(
                    name = %name,
                    relation,
                    target = %target,
                    "placement target not found; middleware dropped"
                );
            }
            PlacementPolicy::Append => {
                warn!(
                    name = %name,
                    relation,
                    target = %target,
                    "placement target not found; middleware appended"
                );
                list.move_to_bottom(&entry.node);
            }
            PlacementPolicy::Error => {
                *list = original;
                return Err(ChainError::UnresolvedPlacement {
                    name,
                    relation,
                    target: target.clone(),
                });
            }
        }
    }

    debug!(order = ?list.names(), "middleware sorted");
    Ok(())
}
