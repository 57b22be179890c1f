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

//! Helpers shared by the integration tests

#![allow(dead_code)]

use bytes::Bytes;
use prost::Message;
use rc_recorder::proto::{
    DriveMode, DriveModeMessage, FrameMessage, FrameRef, RecordMessage, SteeringMessage,
};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

pub const FRAME_CONTENT: &[u8] = b"frame content";

fn frame_ref(id: &str) -> FrameRef {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap();
    FrameRef {
        name: format!("framie-{}", id),
        id: id.to_string(),
        created_at: Some(prost_types::Timestamp {
            seconds: now.as_secs() as i64,
            nanos: now.subsec_nanos() as i32,
        }),
    }
}

/// Build a complete record message as producers publish it
pub fn record_message(
    id: &str,
    record_set: &str,
    user_angle: f32,
    autopilot_angle: f32,
    drive_mode: DriveMode,
) -> RecordMessage {
    RecordMessage {
        frame: Some(FrameMessage {
            id: Some(frame_ref(id)),
            frame: Bytes::from_static(FRAME_CONTENT),
        }),
        steering: Some(SteeringMessage {
            steering: user_angle,
            confidence: 1.0,
            frame_ref: Some(frame_ref(id)),
        }),
        autopilot_steering: Some(SteeringMessage {
            steering: autopilot_angle,
            confidence: 0.8,
            frame_ref: Some(frame_ref(id)),
        }),
        drive_mode: Some(DriveModeMessage {
            drive_mode: drive_mode as i32,
        }),
        record_set: record_set.to_string(),
    }
}

/// Encoded payload of `record_message`
pub fn record_payload(
    id: &str,
    record_set: &str,
    user_angle: f32,
    autopilot_angle: f32,
    drive_mode: DriveMode,
) -> Vec<u8> {
    record_message(id, record_set, user_angle, autopilot_angle, drive_mode).encode_to_vec()
}

/// Sorted entry names of a directory
pub fn list_dir(path: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(path)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Every regular file below `path`, relative to it
pub fn list_files_recursive(path: &Path) -> Vec<String> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let entry = entry.unwrap();
            let path = entry.path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                let rel = path.strip_prefix(root).unwrap();
                out.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }
    }

    let mut out = Vec::new();
    walk(path, path, &mut out);
    out.sort();
    out
}
