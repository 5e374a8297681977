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

//! Least-recently-used ordering of asset identifiers.

use sprite_core::asset::AssetId;
use std::collections::VecDeque;

/// Bounded recency list. The most recently used identifier is at the back.
///
/// Each identifier appears at most once. When the list grows past its bound
/// the oldest identifiers fall off the front; this only stops tracking them,
/// it does not unload anything.
#[derive(Debug)]
pub(crate) struct RecencyTracker {
    order: VecDeque<AssetId>,
    max_tracked: usize,
}

impl RecencyTracker {
    pub(crate) fn new(max_tracked: usize) -> Self {
        Self {
            order: VecDeque::with_capacity(max_tracked.min(1024)),
            max_tracked,
        }
    }

    /// Moves `id` to the most recently used position.
    ///
    /// Returns the identifiers that fell out of tracking.
    pub(crate) fn touch(&mut self, id: &AssetId) -> Vec<AssetId> {
        self.order.retain(|tracked| tracked != id);
        self.order.push_back(id.clone());

        let mut dropped = Vec::new();
        while self.order.len() > self.max_tracked {
            if let Some(oldest) = self.order.pop_front() {
                dropped.push(oldest);
            }
        }
        dropped
    }

    /// Identifiers from least to most recently used.
    pub(crate) fn iter_lru(&self) -> impl Iterator<Item = &AssetId> {
        self.order.iter()
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, id: &AssetId) -> bool {
        self.order.contains(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }
}
