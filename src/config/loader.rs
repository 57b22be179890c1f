// Configuration loader with environment variable substitution

use super::types::*;
use anyhow::{bail, Context, Result};
use regex::Regex;
use std::path::Path;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["text", "compact"];
const ZENOH_MODES: [&str; 3] = ["peer", "client", "router"];

/// Upper bound for `workers.queue_capacity`
pub const MAX_QUEUE_CAPACITY: usize = 1 << 20;
/// Upper bound for `workers.max_concurrent_writes`
pub const MAX_CONCURRENT_WRITES: usize = 1024;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file with environment variable substitution
    pub fn load<P: AsRef<Path>>(path: P) -> Result<RecorderConfig> {
        let config = Self::read(path)?;
        Self::validate(&config)?;

        Ok(config)
    }

    /// Read and parse a config file without validating it, for callers that
    /// apply further overrides first
    pub fn read<P: AsRef<Path>>(path: P) -> Result<RecorderConfig> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file {}", path.as_ref().display()))?;

        Self::parse(&content)
    }

    /// Parse YAML content after substituting environment variables
    pub fn parse(content: &str) -> Result<RecorderConfig> {
        let content = Self::substitute_env_vars(content)?;

        serde_yaml::from_str(&content).context("Failed to parse YAML configuration")
    }

    /// Substitute ${VAR} and ${VAR:-default} patterns with environment variables
    ///
    /// Examples:
    /// - ${HOME} -> /home/user
    /// - ${RECORD_PATH:-/data/records} -> /data/records (if RECORD_PATH not set)
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}:]+)(?::-([^}]+))?\}")?;

        let substituted = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            let default_value = caps.get(2).map(|m| m.as_str());

            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => match default_value {
                    Some(default) => default.to_string(),
                    // Keep original if no default and var not found
                    None => format!("${{{}}}", var_name),
                },
            }
        });

        Ok(substituted.into_owned())
    }

    /// Validate configuration
    pub fn validate(config: &RecorderConfig) -> Result<()> {
        if !ZENOH_MODES.contains(&config.zenoh.mode.as_str()) {
            bail!(
                "zenoh.mode '{}' is not one of: {}",
                config.zenoh.mode,
                ZENOH_MODES.join(", ")
            );
        }

        if config.recorder.topic.trim().is_empty() {
            bail!("recorder.topic cannot be empty");
        }

        if config.recorder.records_path.as_os_str().is_empty() {
            bail!("recorder.records_path cannot be empty");
        }

        let workers = &config.recorder.workers;
        if workers.queue_capacity == 0 || workers.queue_capacity > MAX_QUEUE_CAPACITY {
            bail!(
                "workers.queue_capacity must be between 1 and {}, got {}",
                MAX_QUEUE_CAPACITY,
                workers.queue_capacity
            );
        }

        if workers.max_concurrent_writes == 0 || workers.max_concurrent_writes > MAX_CONCURRENT_WRITES
        {
            bail!(
                "workers.max_concurrent_writes must be between 1 and {}, got {}",
                MAX_CONCURRENT_WRITES,
                workers.max_concurrent_writes
            );
        }

        let level = config.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            bail!(
                "logging.level '{}' is not one of: {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            );
        }

        if !LOG_FORMATS.contains(&config.logging.format.as_str()) {
            bail!(
                "logging.format '{}' is not one of: {}",
                config.logging.format,
                LOG_FORMATS.join(", ")
            );
        }

        Ok(())
    }
}
