// Copyright 2025 coScene
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Configuration types for rc-recorder

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RecorderConfig {
    #[serde(default)]
    pub zenoh: ZenohConfig,
    #[serde(default)]
    pub recorder: RecorderSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Zenoh configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ZenohConfig {
    #[serde(default = "default_mode")]
    pub mode: String, // "peer", "client", or "router"

    /// `connect: null` disables the default endpoint
    #[serde(default = "default_connect")]
    pub connect: Option<EndpointsConfig>,

    #[serde(default)]
    pub listen: Option<EndpointsConfig>,
}

impl Default for ZenohConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            connect: default_connect(),
            listen: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointsConfig {
    pub endpoints: Vec<String>,
}

/// Recorder-specific settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecorderSettings {
    /// Key expression carrying record events
    #[serde(default = "default_topic")]
    pub topic: String,

    /// Root directory of the record sets
    #[serde(default = "default_records_path")]
    pub records_path: PathBuf,

    #[serde(default)]
    pub workers: WorkerConfig,
}

impl Default for RecorderSettings {
    fn default() -> Self {
        Self {
            topic: default_topic(),
            records_path: default_records_path(),
            workers: WorkerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkerConfig {
    /// Payloads buffered between the subscriber and the writers
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Upper bound on persists running at the same time
    #[serde(default = "default_max_concurrent_writes")]
    pub max_concurrent_writes: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            max_concurrent_writes: default_max_concurrent_writes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String, // "trace", "debug", "info", "warn", "error"

    #[serde(default = "default_log_format")]
    pub format: String, // "text", "compact"
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_mode() -> String { "peer".to_string() }
fn default_connect() -> Option<EndpointsConfig> {
    Some(EndpointsConfig { endpoints: vec!["tcp/localhost:7447".to_string()] })
}
fn default_topic() -> String { "robocar/records".to_string() }
fn default_records_path() -> PathBuf { PathBuf::from("/data/records") }
fn default_queue_capacity() -> usize { 1000 }
fn default_max_concurrent_writes() -> usize { 16 }
fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "text".to_string() }
