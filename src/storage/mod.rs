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

// Storage backend module
//
// The recorder hands every decoded event to a `StorageBackend`. The
// filesystem backend owns the on-disk dataset layout consumed by training
// tooling. This module is WRITE-ONLY: records are never read back or deleted.

pub mod backend;
pub mod filesystem;

pub use backend::{StorageBackend, StoredRecord};
pub use filesystem::FilesystemBackend;
