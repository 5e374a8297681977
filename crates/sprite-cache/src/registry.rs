// Copyright 2025 eraflo
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

//! The lock-protected state of the cache.

use crate::entry::AssetEntry;
use crate::recency::RecencyTracker;
use sprite_core::asset::{AssetId, AssetState, Priority};
use std::collections::HashMap;
use std::time::Instant;

/// Everything the cache mutates, kept behind one `RwLock`.
#[derive(Debug)]
pub(crate) struct Registry<R> {
    pub(crate) entries: HashMap<AssetId, AssetEntry<R>>,
    pub(crate) recency: RecencyTracker,
    /// Sum of `size_bytes` over loaded entries.
    pub(crate) memory_used: u64,
    /// Whether load jobs may be queued for worker threads.
    pub(crate) workers_online: bool,
}

impl<R: Clone> Registry<R> {
    pub(crate) fn new(max_tracked: usize) -> Self {
        Self {
            entries: HashMap::new(),
            recency: RecencyTracker::new(max_tracked),
            memory_used: 0,
            workers_online: false,
        }
    }

    /// Returns the entry for `id`, creating it with `priority` if needed.
    ///
    /// The priority of an existing entry is never changed.
    pub(crate) fn entry_or_insert(
        &mut self,
        id: &AssetId,
        priority: Priority,
        now: Instant,
    ) -> &mut AssetEntry<R> {
        if !self.entries.contains_key(id) {
            log::debug!("AssetCache: Registering '{}' at {:?} priority", id, priority);
        }
        self.entries
            .entry(id.clone())
            .or_insert_with(|| AssetEntry::new(priority, now))
    }

    /// Records that `id` was just used.
    pub(crate) fn touch(&mut self, id: &AssetId) {
        for dropped in self.recency.touch(id) {
            log::trace!("AssetCache: '{}' fell out of recency tracking", dropped);
        }
    }

    pub(crate) fn charge(&mut self, bytes: u64) {
        self.memory_used = self.memory_used.saturating_add(bytes);
    }

    pub(crate) fn credit(&mut self, bytes: u64) {
        self.memory_used = self.memory_used.saturating_sub(bytes);
    }

    pub(crate) fn loaded_count(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.state == AssetState::Loaded)
            .count()
    }
}
