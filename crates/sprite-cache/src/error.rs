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

//! Error types for the asset cache.

use sprite_core::asset::AssetId;
use sprite_core::telemetry::MetricsError;
use thiserror::Error;

/// A per-asset failure.
///
/// None of these are fatal to the cache: each one leaves the entry in a defined
/// state and the asset can be requested again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    /// The loader failed to build the resource. The entry is back to
    /// `Unloaded` and keeps the reason as its last error.
    #[error("failed to load asset '{id}': {reason}")]
    Load {
        /// The asset that failed.
        id: AssetId,
        /// The loader's error message.
        reason: String,
    },
    /// The load was still queued when the workers shut down.
    #[error("load of asset '{id}' abandoned at shutdown")]
    ShutDown {
        /// The asset whose load was abandoned.
        id: AssetId,
    },
    /// Every reference taken while the asset was being unloaded was given back
    /// before it could be loaded again, so no load was started.
    #[error("asset '{id}' was released before it was loaded again")]
    Released {
        /// The asset that was released.
        id: AssetId,
    },
    /// A release for an asset with no outstanding references.
    #[error("release of asset '{id}' with no outstanding reference")]
    StaleRelease {
        /// The asset that was released.
        id: AssetId,
    },
}

impl AssetError {
    /// The asset this error is about.
    pub fn id(&self) -> &AssetId {
        match self {
            AssetError::Load { id, .. }
            | AssetError::ShutDown { id }
            | AssetError::Released { id }
            | AssetError::StaleRelease { id } => id,
        }
    }
}

/// A failure while building the cache or starting its workers.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The configuration is unusable.
    #[error("invalid cache configuration: {0}")]
    InvalidConfig(String),
    /// A cache metric could not be registered.
    #[error("failed to register cache metrics: {0}")]
    Metrics(#[from] MetricsError),
    /// A worker thread could not be spawned.
    #[error("failed to spawn cache worker: {0}")]
    Spawn(#[from] std::io::Error),
    /// Workers for this cache are already running.
    #[error("cache workers are already running")]
    WorkersRunning,
}
