//! MyApp: an application wrapped by two middleware.
//!
//! `version` answers `-v`/`--version` on its own, so neither the banner nor
//! the application runs. `add_header_and_footer` is pinned last, directly
//! above the application, so its banner surrounds the application's output
//! only.

use termrack::{application, middleware, HandlerResult, Next, Rack, RackBuilder, Request, Response};
use tracing::debug;

pub const VERSION_LINE: &str = "MyApp version 1.0.5.9";

#[application(name = "myapp", description = "Echoes its arguments")]
pub fn my_app(request: &mut Request) -> Response {
    Response::with_output(format!(
        "Hello from MyApp!  You passed: {}",
        request.arguments.join(", ")
    ))
}

#[middleware(name = "version")]
pub fn version(request: &mut Request, next: &Next) -> HandlerResult {
    if matches!(request.first(), Some("-v" | "--version")) {
        debug!("version requested");
        return Ok(Response::with_output(VERSION_LINE));
    }
    next.invoke(request)
}

#[middleware(name = "banner", last)]
pub fn add_header_and_footer(request: &mut Request, next: &Next) -> HandlerResult {
    Ok(next
        .invoke(request)?
        .prepend("[My App]\n==========\n")
        .append("==========\nCopyright (c) 2010 Some Cool Guys, Inc.\n"))
}

/// The rack builder with all MyApp handlers registered.
///
/// The banner is registered first; its `last` pin still moves it below
/// `version`, closest to the application.
pub fn rack() -> RackBuilder {
    Rack::builder()
        .middleware(add_header_and_footer_middleware())
        .middleware(version_middleware())
        .application(my_app_application())
}
