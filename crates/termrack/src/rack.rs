//! The rack: a configured handler set ready to run.
//!
//! A [`Rack`] owns the registered [`Handlers`] and a [`RackConfig`]. Each run
//! clones the middleware list, sorts and links it against the selected
//! terminal handler, and invokes it with a fresh [`Request`].
//!
//! # Two Modes
//!
//! - **Application mode** ([`Rack::run`]): exactly one application must be
//!   registered. It becomes the terminal handler for every run.
//! - **Command mode** ([`Rack::dispatch`]): the first argument selects a
//!   command by (possibly abbreviated) name, and the remaining arguments are
//!   passed through the middleware chain to it.
//!
//! [`Rack::execute`] picks command mode when commands but no applications
//! are registered, and writes the response at the boundary.
//!
//! # Lazy Loading
//!
//! A loader closure given to [`RackBuilder::loader`] runs once, on first
//! access to the handler set. Afterwards the set is read-only.
//!
//! ```rust
//! use termrack::{Descriptor, MiddlewareDescriptor, Next, Placement, Rack, Request, Response, HandlerResult};
//!
//! fn app(request: &mut Request) -> Response {
//!     Response::with_output(format!("Hello! You passed: {}", request.arguments.join(", ")))
//! }
//!
//! fn banner(request: &mut Request, next: &Next) -> HandlerResult {
//!     Ok(next.invoke(request)?.prepend("[My App]\n"))
//! }
//!
//! let rack = Rack::builder()
//!     .application(Descriptor::application(app))
//!     .middleware(MiddlewareDescriptor::new(banner).with_placement(Placement::last()))
//!     .exit_on_finish(false)
//!     .build();
//!
//! let response = rack.run(["a", "b"])?;
//! assert_eq!(response.output, "[My App]\nHello! You passed: a, b\n");
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use once_cell::unsync::OnceCell;
use termrack_dispatch::{
    Candidate, Descriptor, HandlerResult, IntoHandlerResult, MiddlewareDescriptor, Next,
    OutputMode, PlacementPolicy, Request, Response, SelectionError,
};
use tracing::{debug, error};

use crate::config::RackConfig;
use crate::error::SetupError;
use crate::handlers::Handlers;

/// Deferred registration, run once on first use.
pub type Loader = Box<dyn FnOnce(&mut Handlers)>;

/// Builder for [`Rack`].
#[derive(Default)]
pub struct RackBuilder {
    handlers: Handlers,
    loader: Option<Loader>,
    config: RackConfig,
}

impl RackBuilder {
    /// Creates a builder with no handlers and default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an application.
    pub fn application(mut self, application: Descriptor) -> Self {
        self.handlers.add_application(application);
        self
    }

    /// Registers a command.
    pub fn command(mut self, command: Descriptor) -> Self {
        self.handlers.add_command(command);
        self
    }

    /// Registers a middleware.
    pub fn middleware(mut self, middleware: MiddlewareDescriptor) -> Self {
        self.handlers.add_middleware(middleware);
        self
    }

    /// Offers an application candidate; invalid ones are excluded.
    pub fn candidate_application<F, R>(mut self, candidate: Candidate<F>) -> Self
    where
        F: Fn(&mut Request) -> R + 'static,
        R: IntoHandlerResult,
    {
        self.handlers.offer_application(candidate);
        self
    }

    /// Offers a command candidate; invalid ones are excluded.
    pub fn candidate_command<F, R>(mut self, candidate: Candidate<F>) -> Self
    where
        F: Fn(&mut Request) -> R + 'static,
        R: IntoHandlerResult,
    {
        self.handlers.offer_command(candidate);
        self
    }

    /// Offers a middleware candidate; invalid ones are excluded.
    pub fn candidate_middleware<F, R>(mut self, candidate: Candidate<F>) -> Self
    where
        F: Fn(&mut Request, &Next) -> R + 'static,
        R: IntoHandlerResult,
    {
        self.handlers.offer_middleware(candidate);
        self
    }

    /// Defers registration to `loader`, which runs on first use after the
    /// handlers registered directly.
    pub fn loader<L>(mut self, loader: L) -> Self
    where
        L: FnOnce(&mut Handlers) + 'static,
    {
        self.loader = Some(Box::new(loader));
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: RackConfig) -> Self {
        self.config = config;
        self
    }

    /// Overlays the configuration with `TERMRACK_*` environment variables.
    pub fn with_env(mut self) -> Result<Self, SetupError> {
        self.config = self.config.with_env()?;
        Ok(self)
    }

    /// Whether [`Rack::execute`] terminates the process.
    pub fn exit_on_finish(mut self, exit: bool) -> Self {
        self.config.exit_on_finish = exit;
        self
    }

    /// Policy for middleware with a missing placement target.
    pub fn placement_policy(mut self, policy: PlacementPolicy) -> Self {
        self.config.placement_policy = policy;
        self
    }

    /// Command run in command mode when no arguments are given.
    pub fn default_command(mut self, name: impl Into<String>) -> Self {
        self.config.default_command = Some(name.into());
        self
    }

    /// How [`Rack::execute`] writes the response.
    pub fn output_mode(mut self, mode: OutputMode) -> Self {
        self.config.output_mode = mode;
        self
    }

    /// Builds the rack. Registration from a loader is deferred.
    pub fn build(self) -> Rack {
        Rack {
            config: self.config,
            pending: RefCell::new(Some((self.handlers, self.loader))),
            handlers: OnceCell::new(),
        }
    }
}

/// A configured set of handlers.
pub struct Rack {
    config: RackConfig,
    pending: RefCell<Option<(Handlers, Option<Loader>)>>,
    handlers: OnceCell<Handlers>,
}

impl Rack {
    /// Starts building a rack.
    pub fn builder() -> RackBuilder {
        RackBuilder::new()
    }

    /// The configuration.
    pub fn config(&self) -> &RackConfig {
        &self.config
    }

    /// The handler set, loading it on first access.
    pub fn handlers(&self) -> &Handlers {
        self.handlers.get_or_init(|| {
            let (mut handlers, loader) = self.pending.borrow_mut().take().unwrap_or_default();
            if let Some(loader) = loader {
                loader(&mut handlers);
            }
            debug!(
                applications = handlers.applications.len(),
                commands = handlers.commands.len(),
                middleware = handlers.middleware.len(),
                rejected = handlers.rejected.len(),
                "handlers loaded"
            );
            handlers
        })
    }

    /// The single registered application.
    ///
    /// # Errors
    ///
    /// [`SelectionError::AmbiguousOrMissingTerminal`] unless exactly one
    /// application is registered.
    pub fn application(&self) -> Result<Rc<Descriptor>, SelectionError> {
        match self.handlers().applications.as_slice() {
            [application] => Ok(application.clone()),
            others => Err(SelectionError::AmbiguousOrMissingTerminal {
                found: others.len(),
            }),
        }
    }

    /// Runs the single registered application through the middleware chain.
    pub fn run<I, S>(&self, arguments: I) -> anyhow::Result<Response>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let application = self.application()?;
        self.run_with(&application, arguments)
    }

    /// Runs `terminal` through the middleware chain.
    pub fn run_with<I, S>(
        &self,
        terminal: &Rc<Descriptor>,
        arguments: I,
    ) -> anyhow::Result<Response>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run_request(terminal, &mut Request::new(arguments))
    }

    /// Runs an existing request through the middleware chain to `terminal`.
    pub fn run_request(&self, terminal: &Rc<Descriptor>, request: &mut Request) -> HandlerResult {
        let mut chain = self.handlers().middleware.clone();
        debug!(terminal = %terminal.name(), arguments = ?request.arguments, "running chain");
        chain.invoke_with(request, terminal, self.config.placement_policy)
    }

    /// Command mode: resolves the first argument to a command and runs it
    /// with the remaining arguments.
    ///
    /// Unknown and ambiguous names produce a failed response (exit code 1)
    /// rather than an error. With no arguments, the configured default
    /// command runs, or the command listing is returned.
    pub fn dispatch<I, S>(&self, arguments: I) -> anyhow::Result<Response>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let arguments: Vec<String> = arguments.into_iter().map(Into::into).collect();
        let commands = &self.handlers().commands;

        let Some((requested, rest)) = arguments.split_first() else {
            return match &self.config.default_command {
                Some(name) => match commands.by_name(name) {
                    Some(command) => self.run_with(command, Vec::<String>::new()),
                    None => Ok(Response::with_error(format!("unknown command '{}'", name), 1)),
                },
                None => Ok(self.command_listing()),
            };
        };

        let matches = commands.match_prefix(requested);
        match matches.as_slice() {
            [] => {
                debug!(requested = %requested, "no command matched");
                Ok(Response::with_error(format!("unknown command '{}'", requested), 1))
            }
            [command] => {
                debug!(requested = %requested, command = %command.name(), "command matched");
                self.run_with(command, rest.iter().cloned())
            }
            _ => {
                let names = matches.names();
                debug!(requested = %requested, candidates = ?names, "ambiguous command");
                Ok(Response::with_error(
                    format!(
                        "ambiguous command '{}'; did you mean one of: {}?",
                        requested,
                        names.join(", ")
                    ),
                    1,
                ))
            }
        }
    }

    /// Lists registered commands with their descriptions.
    pub fn command_listing(&self) -> Response {
        let commands = &self.handlers().commands;
        let mut response = Response::with_output("Available commands:");
        let width = commands.iter().map(|c| c.name().len()).max().unwrap_or(0);
        for command in commands {
            let line = match command.description() {
                Some(description) => {
                    format!("  {:<width$}  {}", command.name(), description, width = width)
                }
                None => format!("  {}", command.name()),
            };
            response.writeln_out(line);
        }
        response
    }

    /// The response [`execute`](Self::execute) would write, without writing
    /// it.
    ///
    /// Uses command mode when commands but no applications are registered.
    /// Errors become an `error: ...` line on the error stream with exit
    /// code 1.
    pub fn respond<I, S>(&self, arguments: I) -> Response
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let handlers = self.handlers();
        let command_mode = handlers.applications.is_empty() && !handlers.commands.is_empty();

        let response = if command_mode {
            self.dispatch(arguments)
        } else {
            self.run(arguments)
        };

        response.unwrap_or_else(|err| {
            error!(error = %err, "run failed");
            Response::with_error(format!("error: {:#}", err), 1)
        })
    }

    /// Runs the rack and writes the response at the boundary.
    ///
    /// See [`respond`](Self::respond) for mode selection and error
    /// reporting. Terminates the process when `exit_on_finish` is set,
    /// otherwise returns the exit code.
    pub fn execute<I, S>(&self, arguments: I) -> i32
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let response = self.respond(arguments);
        match response.execute_as(self.config.output_mode, self.config.exit_on_finish) {
            Ok(code) => code,
            Err(err) => {
                error!(error = %err, "failed to write response");
                1
            }
        }
    }

    /// [`execute`](Self::execute) with the process arguments.
    pub fn execute_env(&self) -> i32 {
        self.execute(Request::from_env().arguments)
    }
}
