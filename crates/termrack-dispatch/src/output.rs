//! Boundary output: writing a finished [`Response`] to the process streams.
//!
//! This is the last step of an invocation. The chain itself never touches
//! stdout or stderr; it only fills a response, which is written here exactly
//! once.
//!
//! [`OutputMode`] selects between the plain buffers (the default) and a JSON
//! document describing the whole response, for scripts that want to capture
//! output, error and exit code together.

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use crate::response::Response;

/// How a response is written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Output to stdout, error to stderr, verbatim.
    #[default]
    Text,
    /// The whole response as one JSON object on stdout.
    Json,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Text => write!(f, "text"),
            OutputMode::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputMode::Text),
            "json" => Ok(OutputMode::Json),
            _ => Err(format!("Invalid output mode: {}", s)),
        }
    }
}

/// Writes `response` to the given streams.
///
/// In text mode empty buffers are skipped entirely.
pub fn write_response<O, E>(
    response: &Response,
    mode: OutputMode,
    out: &mut O,
    err: &mut E,
) -> io::Result<()>
where
    O: Write + ?Sized,
    E: Write + ?Sized,
{
    match mode {
        OutputMode::Text => {
            if !response.output.is_empty() {
                out.write_all(response.output.as_bytes())?;
                out.flush()?;
            }
            if !response.error.is_empty() {
                err.write_all(response.error.as_bytes())?;
                err.flush()?;
            }
        }
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *out, response).map_err(io::Error::from)?;
            writeln!(out)?;
            out.flush()?;
        }
    }
    Ok(())
}

impl Response {
    /// Writes this response to stdout/stderr in text mode, then either exits
    /// the process with the exit code (`exit == true`) or returns it.
    pub fn execute(&self, exit: bool) -> io::Result<i32> {
        self.execute_as(OutputMode::Text, exit)
    }

    /// Like [`execute`](Self::execute), in the given mode.
    pub fn execute_as(&self, mode: OutputMode, exit: bool) -> io::Result<i32> {
        let stdout = io::stdout();
        let stderr = io::stderr();
        write_response(self, mode, &mut stdout.lock(), &mut stderr.lock())?;

        if exit {
            std::process::exit(self.exit_code);
        }
        Ok(self.exit_code)
    }
}
