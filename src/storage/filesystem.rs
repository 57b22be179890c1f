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

// Filesystem backend implementation
//
// Layout under the records root:
//   <root>/<recordSet>/cam/cam-image_array_<frameId>.jpg
//   <root>/<recordSet>/record_<frameId>.json

use super::backend::{StorageBackend, StoredRecord};
use crate::error::RecordError;
use crate::protocol::{PersistedRecord, RecordEvent, IMAGE_DIR};
use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Filesystem backend writing one image and one JSON sidecar per record
#[derive(Debug, Clone)]
pub struct FilesystemBackend {
    base_path: PathBuf,
}

impl FilesystemBackend {
    /// Create the backend, creating the records root if needed
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, RecordError> {
        let base_path = base_path.as_ref().to_path_buf();

        info!("Initializing filesystem backend at: {}", base_path.display());

        std::fs::create_dir_all(&base_path).map_err(|source| RecordError::Directory {
            path: base_path.clone(),
            source,
        })?;

        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Directory of a record set
    pub fn record_dir(&self, record_set: &str) -> PathBuf {
        self.base_path.join(record_set)
    }

    /// Directory holding the frames of a record set
    pub fn image_dir(&self, record_set: &str) -> PathBuf {
        self.record_dir(record_set).join(IMAGE_DIR)
    }

    pub fn image_path(&self, event: &RecordEvent) -> PathBuf {
        self.image_dir(&event.record_set).join(event.image_file_name())
    }

    pub fn record_path(&self, event: &RecordEvent) -> PathBuf {
        self.record_dir(&event.record_set).join(event.record_file_name())
    }
}

async fn ensure_directory(path: &Path) -> Result<(), RecordError> {
    fs::create_dir_all(path)
        .await
        .map_err(|source| RecordError::Directory {
            path: path.to_path_buf(),
            source,
        })
}

async fn write_file(path: &Path, contents: &[u8]) -> Result<(), RecordError> {
    fs::write(path, contents)
        .await
        .map_err(|source| RecordError::Write {
            path: path.to_path_buf(),
            source,
        })
}

#[async_trait]
impl StorageBackend for FilesystemBackend {
    async fn persist(&self, event: &RecordEvent) -> Result<StoredRecord, RecordError> {
        event.validate_keys()?;

        let record_dir = self.record_dir(&event.record_set);
        let image_dir = self.image_dir(&event.record_set);

        // The sidecar references the image, so the image goes first
        ensure_directory(&image_dir).await?;
        let image_path = image_dir.join(event.image_file_name());
        write_file(&image_path, &event.frame_bytes).await?;

        ensure_directory(&record_dir).await?;
        let record_path = record_dir.join(event.record_file_name());
        let record = PersistedRecord::from(event);
        let json = serde_json::to_vec(&record).map_err(|source| RecordError::Marshal {
            path: record_path.clone(),
            source,
        })?;
        write_file(&record_path, &json).await?;

        debug!("record {}: {}", event.record_set, event.frame_id);

        Ok(StoredRecord {
            image_path,
            record_path,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        // Check if base directory is accessible and writable
        match fs::metadata(&self.base_path).await {
            Ok(metadata) if metadata.is_dir() => {
                let test_file = self.base_path.join(".health_check_test");
                match fs::write(&test_file, b"test").await {
                    Ok(()) => {
                        let _ = fs::remove_file(&test_file).await;
                        Ok(true)
                    }
                    Err(e) => {
                        warn!("Health check failed - cannot write: {}", e);
                        Ok(false)
                    }
                }
            }
            Ok(_) => {
                warn!(
                    "Health check failed - records path is not a directory: {}",
                    self.base_path.display()
                );
                Ok(false)
            }
            Err(e) => {
                warn!(
                    "Health check failed - cannot access records path {}: {}",
                    self.base_path.display(),
                    e
                );
                Ok(false)
            }
        }
    }

    fn backend_type(&self) -> &str {
        "filesystem"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::DriveMode;
    use bytes::Bytes;
    use tempfile::TempDir;

    fn create_test_backend() -> (FilesystemBackend, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let backend = FilesystemBackend::new(temp_dir.path().join("records")).unwrap();
        (backend, temp_dir)
    }

    fn event(record_set: &str, frame_id: &str) -> RecordEvent {
        RecordEvent {
            frame_id: frame_id.to_string(),
            frame_bytes: Bytes::from_static(b"frame content"),
            user_steering: 0.1,
            autopilot_steering: 0.2,
            drive_mode: DriveMode::User,
            record_set: record_set.to_string(),
        }
    }

    #[test]
    fn test_new_creates_root() {
        let (backend, _temp_dir) = create_test_backend();
        assert!(backend.base_path().is_dir());
    }

    #[test]
    fn test_new_fails_when_root_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();

        let result = FilesystemBackend::new(file.join("records"));
        assert!(matches!(result, Err(RecordError::Directory { .. })));
    }

    #[test]
    fn test_paths() {
        let (backend, _temp_dir) = create_test_backend();
        let e = event("session", "42");
        assert_eq!(
            backend.image_path(&e),
            backend
                .base_path()
                .join("session/cam/cam-image_array_42.jpg")
        );
        assert_eq!(
            backend.record_path(&e),
            backend.base_path().join("session/record_42.json")
        );
    }

    #[tokio::test]
    async fn test_persist_returns_written_paths() {
        let (backend, _temp_dir) = create_test_backend();
        let e = event("session", "7");

        let stored = backend.persist(&e).await.unwrap();
        assert_eq!(stored.image_path, backend.image_path(&e));
        assert_eq!(stored.record_path, backend.record_path(&e));
        assert!(stored.image_path.is_file());
        assert!(stored.record_path.is_file());
    }

    #[tokio::test]
    async fn test_persist_rejects_traversal() {
        let (backend, temp_dir) = create_test_backend();

        let result = backend.persist(&event("..", "1")).await;
        assert!(matches!(result, Err(RecordError::InvalidKey { .. })));

        let result = backend.persist(&event("set", "../../escape")).await;
        assert!(matches!(result, Err(RecordError::InvalidKey { .. })));

        // Nothing besides the empty root was created
        let entries: Vec<_> = std::fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(std::fs::read_dir(backend.base_path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_health_check() {
        let (backend, _temp_dir) = create_test_backend();

        let result = backend.health_check().await;
        assert!(result.unwrap());
        assert!(!backend.base_path().join(".health_check_test").exists());
    }

    #[tokio::test]
    async fn test_health_check_missing_root() {
        let (backend, _temp_dir) = create_test_backend();
        std::fs::remove_dir(backend.base_path()).unwrap();

        assert!(!backend.health_check().await.unwrap());
    }
}
