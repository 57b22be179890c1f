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
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use zenoh::Session;

use crate::config::{RecorderSettings, WorkerConfig};
use crate::error::RecordError;
use crate::protocol::RecordEvent;
use crate::storage::{StorageBackend, StoredRecord};

/// Counters of handled payloads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecorderStats {
    pub received: u64,
    pub stored: u64,
    pub failed: u64,
}

#[derive(Debug, Default)]
struct Counters {
    received: AtomicU64,
    stored: AtomicU64,
    failed: AtomicU64,
}

/// Decodes and persists single payloads, absorbing every per-payload error
pub struct RecordHandler {
    backend: Arc<dyn StorageBackend>,
    counters: Counters,
}

impl RecordHandler {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            counters: Counters::default(),
        }
    }

    /// Handle one payload.
    ///
    /// The error is logged here and returned only for the caller's benefit;
    /// it never affects other payloads.
    pub async fn handle(&self, payload: &[u8]) -> Result<StoredRecord, RecordError> {
        self.counters.received.fetch_add(1, Ordering::Relaxed);

        let result = match RecordEvent::decode(payload) {
            Ok(event) => self.backend.persist(&event).await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(_) => {
                self.counters.stored.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                error!("Dropping record payload ({}): {}", e.kind(), e);
            }
        }

        result
    }

    pub fn stats(&self) -> RecorderStats {
        RecorderStats {
            received: self.counters.received.load(Ordering::Relaxed),
            stored: self.counters.stored.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }
}

/// Resolves once the recorder is stopped. The `watch::Ref` (a read guard) is
/// dropped here so the futures selecting on this stay `Send`.
async fn stopped(shutdown_rx: &mut watch::Receiver<bool>) {
    let _ = shutdown_rx.wait_for(|stopped| *stopped).await;
}

/// Subscribes to record events and persists each one independently
///
/// `start` runs until `stop` is called. A stopped recorder does not restart.
pub struct Recorder {
    handler: Arc<RecordHandler>,
    topic: String,
    workers: WorkerConfig,
    shutdown_tx: watch::Sender<bool>,
}

impl Recorder {
    pub fn new(backend: Arc<dyn StorageBackend>, settings: &RecorderSettings) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            handler: Arc::new(RecordHandler::new(backend)),
            topic: settings.topic.clone(),
            workers: settings.workers.clone(),
            shutdown_tx,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn handler(&self) -> &Arc<RecordHandler> {
        &self.handler
    }

    /// Subscribe to the record topic and block until `stop` is called
    pub async fn start(&self, session: &Session) -> Result<()> {
        let subscriber = session
            .declare_subscriber(self.topic.as_str())
            .await
            .map_err(|e| anyhow!("Failed to subscribe to '{}': {}", self.topic, e))?;

        info!("Recording samples from '{}'", self.topic);

        let (tx, rx) = mpsc::channel::<Vec<u8>>(self.workers.queue_capacity);
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let topic = self.topic.clone();

        let forward = async move {
            loop {
                tokio::select! {
                    _ = stopped(&mut shutdown_rx) => break,
                    sample = subscriber.recv_async() => {
                        match sample {
                            Ok(sample) => {
                                let payload = sample.payload().to_bytes().to_vec();
                                // Consumer gone means the recorder is stopping
                                if tx.send(payload).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                warn!("Subscriber on '{}' closed: {}", topic, e);
                                break;
                            }
                        }
                    }
                }
            }

            if let Err(e) = subscriber.undeclare().await {
                warn!("Failed to undeclare subscriber on '{}': {}", topic, e);
            }
            info!("Subscription on '{}' stopped", topic);
        };

        let ((), result) = tokio::join!(forward, self.consume(rx));
        result
    }

    /// Consume payloads until `stop` is called or the channel closes.
    ///
    /// Each payload is handled in its own task. Persists already started are
    /// awaited before returning.
    pub async fn consume(&self, mut payloads: mpsc::Receiver<Vec<u8>>) -> Result<()> {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let permits = Arc::new(Semaphore::new(self.workers.max_concurrent_writes));
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                biased;

                _ = stopped(&mut shutdown_rx) => {
                    info!("Recorder received shutdown signal");
                    break;
                }

                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        error!("Record task failed: {}", e);
                    }
                }

                payload = payloads.recv() => {
                    let Some(payload) = payload else {
                        debug!("Payload channel closed");
                        break;
                    };

                    let permit = permits.clone().acquire_owned().await?;
                    let handler = self.handler.clone();
                    in_flight.spawn(async move {
                        let _permit = permit;
                        // Already logged by the handler
                        let _ = handler.handle(&payload).await;
                    });
                }
            }
        }

        if !in_flight.is_empty() {
            debug!("Waiting for {} in-flight records", in_flight.len());
        }
        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                error!("Record task failed: {}", e);
            }
        }

        let stats = self.stats();
        info!(
            "Recorder stopped: {} received, {} stored, {} failed",
            stats.received, stats.stored, stats.failed
        );

        Ok(())
    }

    /// Stop accepting payloads and release `start`
    pub fn stop(&self) {
        self.shutdown_tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    pub fn stats(&self) -> RecorderStats {
        self.handler.stats()
    }
}
