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

//! Ownership groups: bulk acquisition and release for one subsystem.

use crate::cache::AssetCache;
use crate::error::AssetError;
use sprite_core::asset::{AssetId, Priority, ResourceLoader};

/// The result of [`AssetGroup::load_group`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupLoadReport {
    /// Identifiers whose request now holds a reference.
    pub requested: Vec<AssetId>,
    /// Requests that failed. These hold no reference.
    pub failed: Vec<AssetError>,
}

impl GroupLoadReport {
    /// Returns `true` if every request succeeded.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Tracks the assets one logical owner (a character, the UI) requested so they
/// can be released together.
///
/// The group holds no cache state of its own: every call goes through the
/// shared [`AssetCache`].
#[derive(Debug)]
pub struct AssetGroup<L: ResourceLoader> {
    name: String,
    cache: AssetCache<L>,
    owned: Vec<AssetId>,
}

impl<L: ResourceLoader> AssetGroup<L> {
    /// Creates an empty group.
    pub fn new(cache: &AssetCache<L>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cache: cache.clone(),
            owned: Vec::new(),
        }
    }

    /// The group's name, used in log lines.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identifiers the group holds a reference to, once per request.
    pub fn owned(&self) -> &[AssetId] {
        &self.owned
    }

    /// Requests every identifier at `priority`.
    ///
    /// At [`Priority::High`] and above each request blocks in turn. Failed
    /// requests are reported and not recorded, so [`AssetGroup::unload_group`]
    /// only releases references that were actually taken.
    pub fn load_group<I, T>(&mut self, ids: I, priority: Priority) -> GroupLoadReport
    where
        I: IntoIterator<Item = T>,
        T: Into<AssetId>,
    {
        let mut report = GroupLoadReport::default();
        for id in ids {
            let id = id.into();
            match self.cache.request_asset(id.clone(), priority) {
                Ok(_) => {
                    self.owned.push(id.clone());
                    report.requested.push(id);
                }
                Err(e) => {
                    log::warn!("AssetGroup '{}': {}", self.name, e);
                    report.failed.push(e);
                }
            }
        }

        log::info!(
            "AssetGroup '{}': Requested {} assets at {:?} priority ({} failed)",
            self.name,
            report.requested.len(),
            priority,
            report.failed.len()
        );
        report
    }

    /// Releases every reference the group holds and forgets them.
    ///
    /// Returns the number of references released.
    pub fn unload_group(&mut self) -> usize {
        let released = self.owned.len();
        for id in self.owned.drain(..) {
            self.cache.release_asset(&id);
        }
        log::info!("AssetGroup '{}': Released {} assets", self.name, released);
        released
    }

    /// Returns the resource for `id` if it is loaded.
    pub fn resource(&self, id: impl AsRef<str>) -> Option<L::Resource> {
        self.cache.get_resource(id)
    }
}
