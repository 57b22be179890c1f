// Configuration module for rc-recorder
//
// Provides:
// - YAML configuration file loading
// - Environment variable substitution
// - Configuration validation
// - Default values

mod loader;
pub mod types;

pub use loader::{ConfigLoader, MAX_CONCURRENT_WRITES, MAX_QUEUE_CAPACITY};
pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable overriding `recorder.records_path`
pub const RECORD_PATH_ENV: &str = "RECORD_PATH";

/// Environment variables overriding `recorder.topic`, in priority order
pub const RECORD_TOPIC_ENVS: [&str; 2] = ["RECORD_TOPIC", "MQTT_TOPIC_RECORDS"];

/// Load configuration from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RecorderConfig> {
    ConfigLoader::load(path).context("Failed to load configuration")
}

/// Load configuration with environment variable overrides
///
/// Without a file the built-in defaults are used as the base.
pub fn load_config_with_env<P: AsRef<Path>>(path: Option<P>) -> Result<RecorderConfig> {
    let config = read_config_with_env(path)?;
    ConfigLoader::validate(&config)?;

    Ok(config)
}

/// Same as `load_config_with_env` but leaves validation to the caller, which
/// must run `ConfigLoader::validate` after its own overrides
pub fn read_config_with_env<P: AsRef<Path>>(path: Option<P>) -> Result<RecorderConfig> {
    let mut config = match path {
        Some(path) => ConfigLoader::read(path).context("Failed to load configuration")?,
        None => RecorderConfig::default(),
    };

    apply_env_overrides(&mut config);

    Ok(config)
}

/// Allow environment variables to override config values
pub fn apply_env_overrides(config: &mut RecorderConfig) {
    if let Some(path) = non_empty_env(RECORD_PATH_ENV) {
        config.recorder.records_path = PathBuf::from(path);
    }

    if let Some(topic) = RECORD_TOPIC_ENVS.iter().find_map(|name| non_empty_env(name)) {
        config.recorder.topic = topic;
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}
