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

use bytes::Bytes;
use prost::Message;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

use crate::error::RecordError;
use crate::proto;

/// Fully qualified name of the wire message, reported on decode failures
pub const RECORD_MESSAGE_TYPE: &str = "robocar.events.RecordMessage";

/// Sub-directory of a record set holding the frames
pub const IMAGE_DIR: &str = "cam";

/// Control regime active when a frame was captured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveMode {
    Invalid,
    User,
    Pilot,
    /// Wire value outside the known enumeration, kept as-is
    Unrecognized(i32),
}

impl DriveMode {
    /// Symbolic name written to the sidecar, e.g. "PILOT"
    pub fn name(&self) -> Cow<'static, str> {
        match self {
            DriveMode::Invalid => Cow::Borrowed(proto::DriveMode::Invalid.as_str_name()),
            DriveMode::User => Cow::Borrowed(proto::DriveMode::User.as_str_name()),
            DriveMode::Pilot => Cow::Borrowed(proto::DriveMode::Pilot.as_str_name()),
            DriveMode::Unrecognized(value) => Cow::Owned(value.to_string()),
        }
    }
}

impl From<i32> for DriveMode {
    fn from(value: i32) -> Self {
        match proto::DriveMode::try_from(value) {
            Ok(proto::DriveMode::Invalid) => DriveMode::Invalid,
            Ok(proto::DriveMode::User) => DriveMode::User,
            Ok(proto::DriveMode::Pilot) => DriveMode::Pilot,
            Err(_) => DriveMode::Unrecognized(value),
        }
    }
}

impl From<proto::DriveMode> for DriveMode {
    fn from(value: proto::DriveMode) -> Self {
        DriveMode::from(value as i32)
    }
}

impl fmt::Display for DriveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// A decoded training sample, consumed entirely by one persist call
#[derive(Debug, Clone, PartialEq)]
pub struct RecordEvent {
    pub frame_id: String,
    pub frame_bytes: Bytes,
    pub user_steering: f32,
    pub autopilot_steering: f32,
    pub drive_mode: DriveMode,
    pub record_set: String,
}

impl RecordEvent {
    /// Decode a bus payload into an event.
    ///
    /// Absent sub-messages fall back to protobuf defaults: empty frame id and
    /// bytes, zero steering, `INVALID` drive mode.
    pub fn decode(payload: &[u8]) -> Result<Self, RecordError> {
        let msg = proto::RecordMessage::decode(payload).map_err(|source| RecordError::Decode {
            message_type: RECORD_MESSAGE_TYPE,
            source,
        })?;

        let (frame_id, frame_bytes) = match msg.frame {
            Some(frame) => (frame.id.map(|id| id.id).unwrap_or_default(), frame.frame),
            None => (String::new(), Bytes::new()),
        };

        Ok(Self {
            frame_id,
            frame_bytes,
            user_steering: msg.steering.map(|s| s.steering).unwrap_or_default(),
            autopilot_steering: msg
                .autopilot_steering
                .map(|s| s.steering)
                .unwrap_or_default(),
            drive_mode: msg
                .drive_mode
                .map(|m| DriveMode::from(m.drive_mode))
                .unwrap_or(DriveMode::Invalid),
            record_set: msg.record_set,
        })
    }

    /// `cam-image_array_<frameId>.jpg`
    pub fn image_file_name(&self) -> String {
        format!("cam-image_array_{}.jpg", self.frame_id)
    }

    /// Image path relative to the record set directory
    pub fn image_ref(&self) -> String {
        format!("{}/{}", IMAGE_DIR, self.image_file_name())
    }

    /// `record_<frameId>.json`
    pub fn record_file_name(&self) -> String {
        format!("record_{}.json", self.frame_id)
    }

    /// Reject keys that would resolve outside `<root>/<recordSet>/`
    pub fn validate_keys(&self) -> Result<(), RecordError> {
        check_path_component("record set", &self.record_set)?;
        check_path_component("frame id", &self.frame_id)
    }
}

fn check_path_component(field: &'static str, value: &str) -> Result<(), RecordError> {
    let reason = if value == "." || value == ".." {
        "must not be '.' or '..'"
    } else if value.contains('/') {
        "path separator '/' is not allowed"
    } else if value.contains('\\') {
        "path separator '\\' is not allowed"
    } else {
        return Ok(());
    };

    Err(RecordError::InvalidKey {
        field,
        value: value.to_string(),
        reason,
    })
}

/// JSON sidecar stored next to each frame.
///
/// Field names, trailing commas included, are matched literally by the
/// training tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedRecord {
    #[serde(rename = "user/angle,")]
    pub user_angle: f32,
    #[serde(rename = "autopilot/angle,")]
    pub autopilot_angle: f32,
    #[serde(rename = "cam/image_array,")]
    pub cam_image_array: String,
    #[serde(
        rename = "drive/mode,",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub drive_mode: String,
}

impl From<&RecordEvent> for PersistedRecord {
    fn from(event: &RecordEvent) -> Self {
        Self {
            user_angle: event.user_steering,
            autopilot_angle: event.autopilot_steering,
            cam_image_array: event.image_ref(),
            drive_mode: event.drive_mode.name().into_owned(),
        }
    }
}
