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

// Record store for robocar training data
//
// Subscribes to record events on Zenoh and writes each one as a dataset entry:
// - Decodes protobuf `RecordMessage` payloads
// - Stores the frame as `<recordSet>/cam/cam-image_array_<frameId>.jpg`
// - Stores steering values and drive mode as `<recordSet>/record_<frameId>.json`
// - Isolates failures per message so one bad payload never stops the stream

pub mod config;
pub mod error;
pub mod protocol;
pub mod recorder;
pub mod storage;

// Re-export main types
pub use config::{load_config, load_config_with_env, RecorderConfig};
pub use error::RecordError;
pub use protocol::{DriveMode, PersistedRecord, RecordEvent};
pub use recorder::{RecordHandler, Recorder, RecorderStats};
pub use storage::{FilesystemBackend, StorageBackend, StoredRecord};

// Include protobuf definitions
pub mod proto {
    include!(concat!(env!("OUT_DIR"), "/robocar.events.rs"));
}
