//! The response produced by a chain.
//!
//! A [`Response`] accumulates standard output text, standard error text and
//! an exit code. Terminal handlers create one; middleware may return the one
//! they received from `next` after decorating it, or build their own to
//! short-circuit the chain.
//!
//! ```rust
//! use termrack_dispatch::Response;
//!
//! let response = Response::with_output("body")
//!     .prepend("[header]\n")
//!     .append("[footer]\n");
//!
//! assert_eq!(response.output, "[header]\nbody\n[footer]\n");
//! assert_eq!(response.exit_code, 0);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Output text, error text and exit code of one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Text destined for standard output.
    pub output: String,
    /// Text destined for standard error.
    pub error: String,
    /// Process exit code. Zero means success.
    pub exit_code: i32,
}

impl Response {
    /// Creates an empty, successful response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a response whose output is `line` followed by a newline.
    pub fn with_output(line: impl AsRef<str>) -> Self {
        let mut response = Self::new();
        response.writeln_out(line);
        response
    }

    /// Creates a failed response whose error is `line` followed by a newline.
    pub fn with_error(line: impl AsRef<str>, exit_code: i32) -> Self {
        let mut response = Self::new();
        response.writeln_err(line);
        response.exit_code = exit_code;
        response
    }

    /// Sets the exit code.
    pub fn exit_code(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    /// Appends text to the output.
    pub fn append(mut self, text: impl AsRef<str>) -> Self {
        self.output.push_str(text.as_ref());
        self
    }

    /// Prepends text to the output.
    pub fn prepend(mut self, text: impl AsRef<str>) -> Self {
        self.output.insert_str(0, text.as_ref());
        self
    }

    /// Appends text to the error stream.
    pub fn append_error(mut self, text: impl AsRef<str>) -> Self {
        self.error.push_str(text.as_ref());
        self
    }

    /// Prepends text to the error stream.
    pub fn prepend_error(mut self, text: impl AsRef<str>) -> Self {
        self.error.insert_str(0, text.as_ref());
        self
    }

    /// Writes `line` plus a newline to the output.
    pub fn writeln_out(&mut self, line: impl AsRef<str>) {
        self.output.push_str(line.as_ref());
        self.output.push('\n');
    }

    /// Writes `line` plus a newline to the error stream.
    pub fn writeln_err(&mut self, line: impl AsRef<str>) {
        self.error.push_str(line.as_ref());
        self.error.push('\n');
    }

    /// Replaces the output text.
    pub fn set_output(&mut self, text: impl Into<String>) {
        self.output = text.into();
    }

    /// Replaces the error text.
    pub fn set_error(&mut self, text: impl Into<String>) {
        self.error = text.into();
    }

    /// Shortcut for the output text.
    pub fn text(&self) -> &str {
        &self.output
    }

    /// Returns `true` if the exit code is zero.
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// `write!` on a response writes to its output.
impl fmt::Write for Response {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.output.push_str(s);
        Ok(())
    }
}

impl From<String> for Response {
    fn from(output: String) -> Self {
        Self {
            output,
            ..Self::default()
        }
    }
}

impl From<&str> for Response {
    fn from(output: &str) -> Self {
        Self::from(output.to_string())
    }
}
