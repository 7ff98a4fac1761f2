//! Error types for rack setup.

use thiserror::Error;

/// Error raised while configuring a [`Rack`](crate::Rack).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    /// A configuration value could not be parsed.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidConfig {
        /// The configuration key, e.g. `TERMRACK_OUTPUT`.
        key: String,
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_error_display() {
        let err = SetupError::InvalidConfig {
            key: "TERMRACK_OUTPUT".into(),
            value: "yaml".into(),
            reason: "Invalid output mode: yaml".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid value 'yaml' for TERMRACK_OUTPUT: Invalid output mode: yaml"
        );
    }
}
