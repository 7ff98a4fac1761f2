//! Rack configuration.
//!
//! [`RackConfig`] holds the settings that shape a run but not the handlers
//! themselves. Values come from the builder, and may be overlaid from
//! environment variables:
//!
//! | Variable | Values | Field |
//! |----------|--------|-------|
//! | `TERMRACK_OUTPUT` | `text`, `json` | `output_mode` |
//! | `TERMRACK_PLACEMENT` | `drop`, `error`, `append` | `placement_policy` |
//! | `TERMRACK_EXIT` | `true`, `false`, `1`, `0` | `exit_on_finish` |
//! | `TERMRACK_DEFAULT_COMMAND` | command name | `default_command` |

use termrack_dispatch::{OutputMode, PlacementPolicy};

use crate::error::SetupError;

/// Settings for a [`Rack`](crate::Rack).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RackConfig {
    /// Terminate the process with the response's exit code after writing it.
    /// When false, [`Rack::execute`](crate::Rack::execute) returns the code.
    pub exit_on_finish: bool,
    /// What to do with middleware whose placement target is missing.
    pub placement_policy: PlacementPolicy,
    /// Command run when command mode receives no arguments.
    pub default_command: Option<String>,
    /// How the final response is written.
    pub output_mode: OutputMode,
}

impl Default for RackConfig {
    fn default() -> Self {
        Self {
            exit_on_finish: true,
            placement_policy: PlacementPolicy::Drop,
            default_command: None,
            output_mode: OutputMode::Text,
        }
    }
}

const ENV_OUTPUT: &str = "TERMRACK_OUTPUT";
const ENV_PLACEMENT: &str = "TERMRACK_PLACEMENT";
const ENV_EXIT: &str = "TERMRACK_EXIT";
const ENV_DEFAULT_COMMAND: &str = "TERMRACK_DEFAULT_COMMAND";

fn invalid(key: &str, value: &str, reason: impl Into<String>) -> SetupError {
    SetupError::InvalidConfig {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, SetupError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(invalid(key, value, "expected true or false")),
    }
}

impl RackConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self, SetupError> {
        Self::default().with_env()
    }

    /// Overlays this configuration with the process environment.
    pub fn with_env(self) -> Result<Self, SetupError> {
        self.with_lookup(|key| std::env::var(key).ok())
    }

    /// Overlays this configuration with values from `lookup`.
    ///
    /// Missing keys leave the current value untouched.
    pub fn with_lookup<L>(mut self, lookup: L) -> Result<Self, SetupError>
    where
        L: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_OUTPUT) {
            self.output_mode = value
                .parse()
                .map_err(|reason: String| invalid(ENV_OUTPUT, &value, reason))?;
        }
        if let Some(value) = lookup(ENV_PLACEMENT) {
            self.placement_policy = value
                .parse()
                .map_err(|reason: String| invalid(ENV_PLACEMENT, &value, reason))?;
        }
        if let Some(value) = lookup(ENV_EXIT) {
            self.exit_on_finish = parse_bool(ENV_EXIT, &value)?;
        }
        if let Some(value) = lookup(ENV_DEFAULT_COMMAND) {
            self.default_command = Some(value).filter(|name| !name.is_empty());
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RackConfig::default();
        assert!(config.exit_on_finish);
        assert_eq!(config.placement_policy, PlacementPolicy::Drop);
        assert!(config.default_command.is_none());
        assert_eq!(config.output_mode, OutputMode::Text);
    }

    #[test]
    fn test_lookup_overlays() {
        let config = RackConfig::default()
            .with_lookup(lookup(&[
                ("TERMRACK_OUTPUT", "json"),
                ("TERMRACK_PLACEMENT", "Append"),
                ("TERMRACK_EXIT", "0"),
                ("TERMRACK_DEFAULT_COMMAND", "help"),
            ]))
            .unwrap();

        assert_eq!(config.output_mode, OutputMode::Json);
        assert_eq!(config.placement_policy, PlacementPolicy::Append);
        assert!(!config.exit_on_finish);
        assert_eq!(config.default_command.as_deref(), Some("help"));
    }

    #[test]
    fn test_missing_keys_keep_values() {
        let base = RackConfig {
            exit_on_finish: false,
            ..RackConfig::default()
        };
        let config = base.clone().with_lookup(lookup(&[])).unwrap();
        assert_eq!(config, base);
    }

    #[test]
    fn test_invalid_values() {
        let err = RackConfig::default()
            .with_lookup(lookup(&[("TERMRACK_PLACEMENT", "keep")]))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value 'keep' for TERMRACK_PLACEMENT: Invalid placement policy: keep"
        );

        let err = RackConfig::default()
            .with_lookup(lookup(&[("TERMRACK_EXIT", "maybe")]))
            .unwrap_err();
        assert!(err.to_string().contains("expected true or false"));
    }
}
