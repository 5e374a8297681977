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

//! Foundational types for the asset cache.
//!
//! This module defines the vocabulary shared by the cache and its collaborators:
//! - [`AssetId`]: the opaque string key identifying an asset.
//! - [`Priority`]: the tier that controls load blocking and eviction eligibility.
//! - [`AssetState`]: the lifecycle state of a cached entry.
//! - [`ResourceLoader`]: the contract a backend implements to build and destroy
//!   the resource behind an identifier.
//!
//! Nothing here knows how assets are stored or scheduled; that lives in
//! `sprite-cache`.

mod loader;

pub use loader::*;

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// An opaque, cheaply clonable identifier for an asset.
///
/// The mapping from an identifier to a storage location is the loader's
/// concern. Any string is accepted, including the empty string; a malformed
/// identifier simply produces a failed load later on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(Arc<str>);

impl AssetId {
    /// Creates a new identifier from any string-like value.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for AssetId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for AssetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AssetId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AssetId {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl From<&String> for AssetId {
    fn from(value: &String) -> Self {
        Self::new(value)
    }
}

impl From<&AssetId> for AssetId {
    fn from(value: &AssetId) -> Self {
        value.clone()
    }
}

/// The priority tier of an asset.
///
/// Tiers are ordered `Low < Medium < High < Critical`. Requests at `High` or
/// above block until the asset is usable, and `Critical` assets are never
/// evicted automatically.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Background assets, first to go under memory pressure.
    Low,
    /// Regular assets.
    #[default]
    Medium,
    /// Assets needed right now; requests block until loaded.
    High,
    /// Assets that must stay resident for the lifetime of the process.
    Critical,
}

impl Priority {
    /// Returns `true` if a request at this priority waits for the load to finish.
    pub fn blocks_on_load(self) -> bool {
        self >= Priority::High
    }

    /// Returns `true` if an unreferenced asset at this priority may be unloaded
    /// by the debounce worker or the budget monitor.
    pub fn is_evictable(self) -> bool {
        self != Priority::Critical
    }
}

/// The lifecycle state of a cached asset.
///
/// The state machine cycles `Unloaded → Loading → Loaded → Unloading → Unloaded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AssetState {
    /// No resource is held. Either never loaded, evicted, or the last load failed.
    #[default]
    Unloaded,
    /// A load job is queued or in flight.
    Loading,
    /// The resource handle is valid.
    Loaded,
    /// The resource handle is being destroyed.
    Unloading,
}

impl AssetState {
    /// Returns a short lowercase name, used in log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            AssetState::Unloaded => "unloaded",
            AssetState::Loading => "loading",
            AssetState::Loaded => "loaded",
            AssetState::Unloading => "unloading",
        }
    }
}
