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

use super::AssetId;
use std::error::Error;

/// The error type returned by a [`ResourceLoader`].
///
/// Loaders are backend-specific, so the cache only needs something it can
/// render into a message and move between threads.
pub type LoaderError = Box<dyn Error + Send + Sync + 'static>;

/// A freshly constructed resource and its memory footprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedResource<R> {
    /// The resource handle. Ownership moves into the cache entry.
    pub resource: R,
    /// The number of bytes the resource occupies, charged against the budget.
    pub size_bytes: u64,
}

impl<R> LoadedResource<R> {
    /// Bundles a resource with its size.
    pub fn new(resource: R, size_bytes: u64) -> Self {
        Self {
            resource,
            size_bytes,
        }
    }
}

/// The backend that turns an identifier into a resource and back.
///
/// Implementations wrap the expensive, blocking part of asset management
/// (file I/O, decoding, device upload). The cache calls them from worker
/// threads and from requester threads concurrently, and never while holding
/// its own lock.
///
/// A failed `load` must not leave anything allocated.
///
/// # Examples
///
/// ```
/// use sprite_core::asset::{AssetId, LoadedResource, LoaderError, ResourceLoader};
///
/// struct FixedSize;
///
/// impl ResourceLoader for FixedSize {
///     type Resource = u32;
///
///     fn load(&self, id: &AssetId) -> Result<LoadedResource<u32>, LoaderError> {
///         if id.as_str().is_empty() {
///             return Err("empty identifier".into());
///         }
///         Ok(LoadedResource::new(id.as_str().len() as u32, 64))
///     }
///
///     fn destroy(&self, _resource: u32) {}
/// }
///
/// assert!(FixedSize.load(&AssetId::from("")).is_err());
/// ```
pub trait ResourceLoader: Send + Sync + 'static {
    /// The opaque handle produced by a load. Copies of it are handed to
    /// readers, so it should be a lightweight id rather than the data itself.
    type Resource: Clone + Send + Sync + 'static;

    /// Builds the resource for `id`. Blocking.
    fn load(&self, id: &AssetId) -> Result<LoadedResource<Self::Resource>, LoaderError>;

    /// Releases a resource previously returned by [`ResourceLoader::load`].
    fn destroy(&self, resource: Self::Resource);
}
