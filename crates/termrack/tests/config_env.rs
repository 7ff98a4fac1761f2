//! Environment overlay for rack configuration.

use serial_test::serial;
use termrack::{OutputMode, PlacementPolicy, Rack, RackConfig, SetupError};

const KEYS: [&str; 4] = [
    "TERMRACK_OUTPUT",
    "TERMRACK_PLACEMENT",
    "TERMRACK_EXIT",
    "TERMRACK_DEFAULT_COMMAND",
];

fn clear_env() {
    for key in KEYS {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_from_env_defaults_when_unset() {
    clear_env();
    assert_eq!(RackConfig::from_env().unwrap(), RackConfig::default());
}

#[test]
#[serial]
fn test_from_env_reads_variables() {
    clear_env();
    std::env::set_var("TERMRACK_OUTPUT", "json");
    std::env::set_var("TERMRACK_PLACEMENT", "error");
    std::env::set_var("TERMRACK_EXIT", "false");

    let config = RackConfig::from_env().unwrap();
    assert_eq!(config.output_mode, OutputMode::Json);
    assert_eq!(config.placement_policy, PlacementPolicy::Error);
    assert!(!config.exit_on_finish);
    clear_env();
}

#[test]
#[serial]
fn test_builder_with_env_overrides_builder_values() {
    clear_env();
    std::env::set_var("TERMRACK_DEFAULT_COMMAND", "status");

    let rack = Rack::builder()
        .default_command("list")
        .placement_policy(PlacementPolicy::Append)
        .with_env()
        .unwrap()
        .build();

    assert_eq!(rack.config().default_command.as_deref(), Some("status"));
    assert_eq!(rack.config().placement_policy, PlacementPolicy::Append);
    clear_env();
}

#[test]
#[serial]
fn test_invalid_variable_is_setup_error() {
    clear_env();
    std::env::set_var("TERMRACK_OUTPUT", "yaml");

    let err = Rack::builder().with_env().err().unwrap();
    assert!(matches!(err, SetupError::InvalidConfig { ref key, .. } if key == "TERMRACK_OUTPUT"));
    clear_env();
}
