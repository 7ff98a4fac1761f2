//! The set of handlers a rack runs.
//!
//! [`Handlers`] collects applications, commands and middleware. Descriptors
//! built in code (or by the attribute macros) are added as-is. Candidates
//! coming from a discovery step are validated first; invalid ones are
//! excluded and remembered in [`Handlers::rejected`] instead of aborting
//! the whole registration.

use std::rc::Rc;

use termrack_dispatch::{
    ApplicationList, Candidate, CommandList, Descriptor, IntoHandlerResult, InvalidHandlerError,
    MiddlewareDescriptor, MiddlewareList, Next, Request,
};
use tracing::warn;

/// Applications, commands and middleware registered with a rack.
#[derive(Debug, Default)]
pub struct Handlers {
    /// Terminal handlers of kind `Application`.
    pub applications: ApplicationList,
    /// Terminal handlers of kind `Command`.
    pub commands: CommandList,
    /// Middleware in registration order.
    pub middleware: MiddlewareList,
    /// Candidates that failed validation.
    pub rejected: Vec<InvalidHandlerError>,
}

impl Handlers {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an application.
    pub fn add_application(&mut self, application: Descriptor) -> Rc<Descriptor> {
        let application = Rc::new(application);
        self.applications.push(application.clone());
        application
    }

    /// Adds a command.
    pub fn add_command(&mut self, command: Descriptor) -> Rc<Descriptor> {
        let command = Rc::new(command);
        self.commands.push(command.clone());
        command
    }

    /// Adds a middleware.
    pub fn add_middleware(&mut self, middleware: MiddlewareDescriptor) -> Rc<MiddlewareDescriptor> {
        let middleware = Rc::new(middleware);
        self.middleware.push(middleware.clone());
        middleware
    }

    fn reject(&mut self, err: InvalidHandlerError) {
        warn!(
            identifier = %err.identifier,
            kind = %err.kind,
            error = %err,
            "excluding invalid handler"
        );
        self.rejected.push(err);
    }

    /// Validates and adds an application candidate. Returns false if it was
    /// rejected.
    pub fn offer_application<F, R>(&mut self, candidate: Candidate<F>) -> bool
    where
        F: Fn(&mut Request) -> R + 'static,
        R: IntoHandlerResult,
    {
        match Descriptor::try_application(candidate) {
            Ok(application) => {
                self.add_application(application);
                true
            }
            Err(err) => {
                self.reject(err);
                false
            }
        }
    }

    /// Validates and adds a command candidate.
    pub fn offer_command<F, R>(&mut self, candidate: Candidate<F>) -> bool
    where
        F: Fn(&mut Request) -> R + 'static,
        R: IntoHandlerResult,
    {
        match Descriptor::try_command(candidate) {
            Ok(command) => {
                self.add_command(command);
                true
            }
            Err(err) => {
                self.reject(err);
                false
            }
        }
    }

    /// Validates and adds a middleware candidate.
    pub fn offer_middleware<F, R>(&mut self, candidate: Candidate<F>) -> bool
    where
        F: Fn(&mut Request, &Next) -> R + 'static,
        R: IntoHandlerResult,
    {
        match MiddlewareDescriptor::try_from_candidate(candidate) {
            Ok(middleware) => {
                self.add_middleware(middleware);
                true
            }
            Err(err) => {
                self.reject(err);
                false
            }
        }
    }
}
