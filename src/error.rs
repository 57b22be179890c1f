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

// Errors raised while handling a single record payload

use std::path::PathBuf;
use thiserror::Error;

/// Failure of one payload. None of these stop the subscription.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("unable to decode {message_type}: {source}")]
    Decode {
        message_type: &'static str,
        #[source]
        source: prost::DecodeError,
    },

    #[error("unable to create {} directory: {source}", .path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to write file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to marshal json content for {}: {source}", .path.display())]
    Marshal {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Record set or frame id would escape its record directory
    #[error("invalid {field} '{value}': {reason}")]
    InvalidKey {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl RecordError {
    /// Short label used in logs and statistics
    pub fn kind(&self) -> &'static str {
        match self {
            RecordError::Decode { .. } => "decode",
            RecordError::Directory { .. } => "directory",
            RecordError::Write { .. } => "write",
            RecordError::Marshal { .. } => "marshal",
            RecordError::InvalidKey { .. } => "invalid_key",
        }
    }
}
