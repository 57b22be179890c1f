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

use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use rc_recorder::config::{read_config_with_env, ConfigLoader, LoggingConfig, ZenohConfig};
use rc_recorder::{FilesystemBackend, Recorder, StorageBackend};

/// rc-recorder - Store robocar record events as training data
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path where to write records files (overrides RECORD_PATH and config)
    #[arg(short, long)]
    record_path: Option<PathBuf>,

    /// Key expression that carries record data (overrides RECORD_TOPIC and config)
    #[arg(short, long)]
    topic: Option<String>,

    /// Zenoh endpoint to connect to, may be repeated
    #[arg(long)]
    connect: Vec<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long)]
    log_level: Option<String>,
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    // RUST_LOG takes precedence over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(logging.level.to_lowercase()))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match logging.format.as_str() {
        "compact" => builder.compact().try_init(),
        _ => builder.try_init(),
    }
    .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))
}

fn build_zenoh_config(zenoh: &ZenohConfig) -> Result<zenoh::Config> {
    let mut config = zenoh::Config::default();

    config
        .insert_json5("mode", &serde_json::to_string(&zenoh.mode)?)
        .map_err(|e| anyhow!("Invalid zenoh mode '{}': {}", zenoh.mode, e))?;

    if let Some(connect) = &zenoh.connect {
        config
            .insert_json5("connect/endpoints", &serde_json::to_string(&connect.endpoints)?)
            .map_err(|e| anyhow!("Invalid connect endpoints: {}", e))?;
    }

    if let Some(listen) = &zenoh.listen {
        config
            .insert_json5("listen/endpoints", &serde_json::to_string(&listen.endpoints)?)
            .map_err(|e| anyhow!("Invalid listen endpoints: {}", e))?;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Validated once, after env and CLI overrides
    let mut config = read_config_with_env(args.config.as_ref())?;

    // Apply CLI overrides
    if let Some(record_path) = args.record_path {
        config.recorder.records_path = record_path;
    }
    if let Some(topic) = args.topic {
        config.recorder.topic = topic;
    }
    if !args.connect.is_empty() {
        config.zenoh.connect = Some(rc_recorder::config::EndpointsConfig {
            endpoints: args.connect,
        });
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    ConfigLoader::validate(&config)?;

    init_tracing(&config.logging)?;

    info!("Starting rc-recorder");
    if let Some(path) = &args.config {
        info!("Loaded configuration from: {}", path.display());
    }
    info!("Records path: {}", config.recorder.records_path.display());

    let backend = FilesystemBackend::new(&config.recorder.records_path)?;
    if !backend.health_check().await? {
        warn!(
            "Records path {} is not writable, records will fail until it is",
            config.recorder.records_path.display()
        );
    }
    info!("Storage backend initialized: {}", backend.backend_type());

    let session = zenoh::open(build_zenoh_config(&config.zenoh)?)
        .await
        .map_err(|e| anyhow!("Failed to open Zenoh session: {}", e))?;
    info!("Zenoh session opened ({} mode)", config.zenoh.mode);

    let recorder = Arc::new(Recorder::new(Arc::new(backend), &config.recorder));

    // Run until the subscription ends or Ctrl+C
    let run = recorder.start(&session);
    tokio::pin!(run);

    tokio::select! {
        result = &mut run => {
            if let Err(e) = result {
                error!("Recorder error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
            recorder.stop();
            if let Err(e) = run.await {
                error!("Recorder error: {}", e);
            }
        }
    }

    if let Err(e) = session.close().await {
        warn!("Failed to close Zenoh session: {}", e);
    }
    info!("rc-recorder shut down successfully");

    Ok(())
}
