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

// Storage backend trait for record persistence

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::RecordError;
use crate::protocol::RecordEvent;

/// Locations written for one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub image_path: PathBuf,
    pub record_path: PathBuf,
}

/// Write-only sink for decoded record events
///
/// Implementations must tolerate concurrent calls: events with different
/// record set / frame id pairs never share a path, and same-key calls are
/// last-write-wins per file.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Persist one event, image first then its sidecar
    async fn persist(&self, event: &RecordEvent) -> Result<StoredRecord, RecordError>;

    /// Check that the backend can currently accept writes
    async fn health_check(&self) -> anyhow::Result<bool>;

    /// Get backend type identifier
    fn backend_type(&self) -> &str;
}
