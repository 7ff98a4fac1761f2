//! Chain linking and invocation.
//!
//! [`link`] wires each middleware's `next` to its successor and the last one
//! to the terminal handler. [`invoke`] sorts, links and runs a middleware
//! list in one step, falling straight through to the terminal handler when
//! the list is empty.
//!
//! ```rust
//! use std::rc::Rc;
//! use termrack_dispatch::{
//!     Descriptor, HandlerResult, MiddlewareDescriptor, MiddlewareList, Next, Placement, Request, Response,
//! };
//!
//! fn app(request: &mut Request) -> Response {
//!     Response::with_output(format!("args: {}", request.arguments.join(" ")))
//! }
//!
//! fn banner(request: &mut Request, next: &Next) -> HandlerResult {
//!     Ok(next.invoke(request)?.prepend("[My App]\n"))
//! }
//!
//! let terminal = Rc::new(Descriptor::application(app));
//! let mut middleware: MiddlewareList =
//!     vec![Rc::new(MiddlewareDescriptor::new(banner).with_placement(Placement::last()))].into();
//!
//! let response = middleware.invoke(&mut Request::new(["a", "b"]), &terminal)?;
//! assert_eq!(response.output, "[My App]\nargs: a b\n");
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::rc::Rc;

use tracing::debug;

use crate::descriptor::{Descriptor, HandlerResult};
use crate::middleware::Next;
use crate::ordering::{sort_with, PlacementPolicy};
use crate::registry::MiddlewareList;
use crate::request::Request;

/// Links `list` in order, ending at `terminal`.
///
/// Re-linking an unchanged list yields the same links. Run it again
/// whenever the list changes.
pub fn link(list: &MiddlewareList, terminal: &Rc<Descriptor>) {
    let nodes = list.as_slice();
    for pair in nodes.windows(2) {
        pair[0].set_next(Next::Middleware(pair[1].clone()));
    }
    if let Some(tail) = nodes.last() {
        tail.set_next(Next::Terminal(terminal.clone()));
    }
    debug!(count = nodes.len(), terminal = %terminal.name(), "chain linked");
}

/// Runs `request` through `list` and down to `terminal`.
///
/// An empty list calls `terminal` directly. Otherwise the list is sorted in
/// place (unresolved placements are dropped), linked, and its head invoked.
pub fn invoke(
    request: &mut Request,
    terminal: &Rc<Descriptor>,
    list: &mut MiddlewareList,
) -> HandlerResult {
    list.invoke(request, terminal)
}

impl MiddlewareList {
    /// Sorts and links this list, then invokes its head.
    pub fn invoke(&mut self, request: &mut Request, terminal: &Rc<Descriptor>) -> HandlerResult {
        self.invoke_with(request, terminal, PlacementPolicy::Drop)
    }

    /// Like [`invoke`](Self::invoke), resolving placements under `policy`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::UnresolvedPlacement`](crate::ChainError) under
    /// [`PlacementPolicy::Error`], before anything runs. Handler errors
    /// propagate unchanged.
    pub fn invoke_with(
        &mut self,
        request: &mut Request,
        terminal: &Rc<Descriptor>,
        policy: PlacementPolicy,
    ) -> HandlerResult {
        if self.is_empty() {
            debug!(terminal = %terminal.name(), "no middleware; invoking terminal directly");
            return terminal.invoke(request);
        }

        sort_with(self, policy)?;
        link(self, terminal);
        self.head(terminal).invoke(request)
    }

    /// Invokes a sorted and linked list without re-sorting.
    ///
    /// Use this when caching a prepared list across invocations.
    pub fn invoke_linked(&self, request: &mut Request, terminal: &Rc<Descriptor>) -> HandlerResult {
        self.head(terminal).invoke(request)
    }

    /// The entry point of the chain: the first middleware, or `terminal`
    /// when every node was dropped.
    fn head(&self, terminal: &Rc<Descriptor>) -> Next {
        match self.first() {
            Some(mw) => Next::Middleware(mw.clone()),
            None => Next::Terminal(terminal.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChainError;
    use crate::middleware::{MiddlewareDescriptor, Placement};
    use crate::response::Response;
    use std::cell::Cell;

    fn app(request: &mut Request) -> Response {
        Response::with_output(format!("app: {}", request.arguments.join(" ")))
    }

    fn pass(request: &mut Request, next: &Next) -> HandlerResult {
        next.invoke(request)
    }

    fn mw(name: &str) -> Rc<MiddlewareDescriptor> {
        Rc::new(MiddlewareDescriptor::new(pass).named(name))
    }

    #[test]
    fn test_link_wires_successors() {
        let terminal = Rc::new(Descriptor::application(app));
        let list: MiddlewareList = vec![mw("m0"), mw("m1"), mw("m2")].into();

        link(&list, &terminal);

        let m = list.as_slice();
        assert!(m[0].next().unwrap().is_middleware(&m[1]));
        assert!(m[1].next().unwrap().is_middleware(&m[2]));
        assert!(m[2].next().unwrap().is_descriptor(&terminal));
    }

    #[test]
    fn test_link_is_idempotent() {
        let terminal = Rc::new(Descriptor::application(app));
        let list: MiddlewareList = vec![mw("m0"), mw("m1")].into();

        link(&list, &terminal);
        link(&list, &terminal);

        let m = list.as_slice();
        assert!(m[0].next().unwrap().is_middleware(&m[1]));
        assert!(m[1].next().unwrap().is_descriptor(&terminal));
    }

    #[test]
    fn test_empty_list_calls_terminal() {
        let terminal = Rc::new(Descriptor::application(app));
        let mut list = MiddlewareList::new();

        let via_chain = invoke(&mut Request::new(["x"]), &terminal, &mut list).unwrap();
        let direct = terminal.invoke_args(["x"]).unwrap();
        assert_eq!(via_chain, direct);
    }

    #[test]
    fn test_short_circuit_skips_downstream() {
        let hits = Rc::new(Cell::new(0));

        let counter = hits.clone();
        let terminal = Rc::new(Descriptor::application(move |_req: &mut Request| {
            counter.set(counter.get() + 1);
            Response::with_output("terminal")
        }));

        let downstream_hits = hits.clone();
        let downstream = Rc::new(
            MiddlewareDescriptor::new(move |request: &mut Request, next: &Next| {
                downstream_hits.set(downstream_hits.get() + 1);
                next.invoke(request)
            })
            .named("downstream"),
        );
        let stopper = Rc::new(
            MiddlewareDescriptor::new(|_req: &mut Request, _next: &Next| {
                Response::with_output("stopped")
            })
            .named("stopper")
            .with_placement(Placement::first()),
        );

        let mut list: MiddlewareList = vec![downstream, stopper].into();
        let response = list.invoke(&mut Request::default(), &terminal).unwrap();

        assert_eq!(response.text(), "stopped\n");
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn test_calling_next_twice_reruns_rest() {
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let terminal = Rc::new(Descriptor::application(move |_req: &mut Request| {
            counter.set(counter.get() + 1);
            Response::with_output(format!("run {}", counter.get()))
        }));

        let twice = Rc::new(MiddlewareDescriptor::new(|request: &mut Request, next: &Next| {
            let first = next.invoke(request)?;
            let second = next.invoke(request)?;
            Ok::<_, anyhow::Error>(first.append(second.output))
        }));

        let mut list: MiddlewareList = vec![twice].into();
        let response = list.invoke(&mut Request::default(), &terminal).unwrap();

        assert_eq!(response.text(), "run 1\nrun 2\n");
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_all_dropped_falls_back_to_terminal() {
        let terminal = Rc::new(Descriptor::application(app));
        let orphan =
            Rc::new(MiddlewareDescriptor::new(pass).with_placement(Placement::before("ghost")));
        let mut list: MiddlewareList = vec![orphan].into();

        let response = list.invoke(&mut Request::new(["y"]), &terminal).unwrap();
        assert_eq!(response.text(), "app: y\n");
        assert!(list.is_empty());
    }

    #[test]
    fn test_error_policy_stops_before_running() {
        let terminal = Rc::new(Descriptor::application(app));
        let orphan = Rc::new(
            MiddlewareDescriptor::new(pass)
                .named("orphan")
                .with_placement(Placement::after("ghost")),
        );
        let mut list: MiddlewareList = vec![orphan].into();

        let err = list
            .invoke_with(&mut Request::default(), &terminal, PlacementPolicy::Error)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ChainError>(),
            Some(ChainError::UnresolvedPlacement { .. })
        ));
    }

    #[test]
    fn test_request_data_flows_between_stages() {
        let terminal = Rc::new(Descriptor::application(|request: &mut Request| {
            let verbose = request.data.get::<bool>("verbose").copied().unwrap_or(false);
            Response::with_output(format!("verbose={}", verbose))
        }));
        let flags = Rc::new(MiddlewareDescriptor::new(|request: &mut Request, next: &Next| {
            let verbose = request.has_flag(&["--verbose"]);
            request.data.insert("verbose", verbose);
            next.invoke(request)
        }));

        let mut list: MiddlewareList = vec![flags].into();
        let response = list
            .invoke(&mut Request::new(["--verbose"]), &terminal)
            .unwrap();
        assert_eq!(response.text(), "verbose=true\n");
    }
}
