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

//! # Sprite Cache
//!
//! A concurrent, reference-counted cache for device resources such as
//! textures.
//!
//! Callers request assets by identifier and priority and release them when
//! done. Loading happens on worker threads, unreferenced assets are unloaded
//! after a debounce interval, and a budget monitor evicts the least recently
//! used assets when memory runs over the configured limit. Resource
//! construction is delegated to a [`ResourceLoader`](sprite_core::asset::ResourceLoader).
//!
//! ```
//! use sprite_cache::{AssetCache, CacheConfig};
//! use sprite_core::asset::{AssetId, LoadedResource, LoaderError, Priority, ResourceLoader};
//! use sprite_telemetry::MetricsRegistry;
//!
//! struct NameLength;
//!
//! impl ResourceLoader for NameLength {
//!     type Resource = usize;
//!
//!     fn load(&self, id: &AssetId) -> Result<LoadedResource<usize>, LoaderError> {
//!         Ok(LoadedResource::new(id.as_str().len(), 1024))
//!     }
//!
//!     fn destroy(&self, _resource: usize) {}
//! }
//!
//! let cache = AssetCache::new(CacheConfig::default(), NameLength, &MetricsRegistry::new())?;
//! let workers = cache.spawn_workers()?;
//!
//! cache.request_asset("stand1", Priority::High)?;
//! assert_eq!(cache.get_resource("stand1"), Some(6));
//! cache.release_asset("stand1");
//!
//! drop(workers);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]

mod cache;
mod config;
mod entry;
mod error;
mod group;
mod metrics;
mod monitor;
mod pipeline;
mod recency;
mod registry;
mod workers;

pub use cache::AssetCache;
pub use config::{CacheConfig, DEFAULT_MEMORY_LIMIT};
pub use entry::{AssetHandle, AssetSnapshot};
pub use error::{AssetError, CacheError};
pub use group::{AssetGroup, GroupLoadReport};
pub use metrics::CacheStats;
pub use monitor::BudgetReport;
pub use workers::CacheWorkers;
