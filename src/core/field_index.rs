// Copyright 2025 Veld Contributors
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

//! Field index - the symbol table mapping field names to row positions
//!
//! Positions are assigned append-only and never reused; the same name
//! (case-insensitive) always maps to the same position for the lifetime of
//! the index. The index is internally locked so expressions compiling on
//! different threads can share one instance.

use std::sync::OnceLock;

use ahash::AHashMap;
use parking_lot::RwLock;

/// Reserved name for the event time field
pub const TIME_FIELD: &str = "__time__";
/// Fallback name for the event time field
pub const FALLBACK_TIME_FIELD: &str = "EventTime";
/// Reserved name for the stream id field
pub const STREAM_ID_FIELD: &str = "__stream_id__";
/// Fallback name for the stream id field
pub const FALLBACK_STREAM_ID_FIELD: &str = "StreamId";
/// Reserved name for the event id field
pub const EVENT_ID_FIELD: &str = "__event_id__";
/// Fallback name for the event id field
pub const FALLBACK_EVENT_ID_FIELD: &str = "EventId";

#[derive(Default)]
struct Inner {
    /// Lowercased name -> position
    positions: AHashMap<String, usize>,
    /// Position -> name as first seen
    names: Vec<String>,
}

/// Case-insensitive mapping from field name to stable integer position
#[derive(Default)]
pub struct FieldIndex {
    inner: RwLock<Inner>,
    time_pos: OnceLock<Option<usize>>,
    stream_id_pos: OnceLock<Option<usize>>,
    event_id_pos: OnceLock<Option<usize>>,
}

impl FieldIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the position for a field name, assigning the next position if the
    /// name has not been seen before
    pub fn create(&self, name: &str) -> usize {
        let key = name.to_lowercase();
        {
            let inner = self.inner.read();
            if let Some(pos) = inner.positions.get(&key) {
                return *pos;
            }
        }
        let mut inner = self.inner.write();
        // Another thread may have raced us between the locks
        if let Some(pos) = inner.positions.get(&key) {
            return *pos;
        }
        let pos = inner.names.len();
        inner.names.push(name.to_string());
        inner.positions.insert(key, pos);
        pos
    }

    /// Look up an existing position without creating one
    pub fn get(&self, name: &str) -> Option<usize> {
        self.inner.read().positions.get(&name.to_lowercase()).copied()
    }

    /// The name registered at a position, as first seen
    pub fn name_of(&self, pos: usize) -> Option<String> {
        self.inner.read().names.get(pos).cloned()
    }

    /// Number of registered fields
    pub fn len(&self) -> usize {
        self.inner.read().names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position of the time field, resolved once and cached
    pub fn time_field_pos(&self) -> Option<usize> {
        *self
            .time_pos
            .get_or_init(|| self.get(TIME_FIELD).or_else(|| self.get(FALLBACK_TIME_FIELD)))
    }

    /// Position of the stream id field, resolved once and cached
    pub fn stream_id_field_pos(&self) -> Option<usize> {
        *self.stream_id_pos.get_or_init(|| {
            self.get(STREAM_ID_FIELD)
                .or_else(|| self.get(FALLBACK_STREAM_ID_FIELD))
        })
    }

    /// Position of the event id field, resolved once and cached
    pub fn event_id_field_pos(&self) -> Option<usize> {
        *self.event_id_pos.get_or_init(|| {
            self.get(EVENT_ID_FIELD)
                .or_else(|| self.get(FALLBACK_EVENT_ID_FIELD))
        })
    }
}
