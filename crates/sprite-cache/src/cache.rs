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

//! The cache context shared by every consumer.

use crate::config::CacheConfig;
use crate::entry::{AssetHandle, AssetSnapshot};
use crate::error::{AssetError, CacheError};
use crate::metrics::{bump, read_counter, CacheMetrics, CacheStats};
use crate::pipeline::unload::UnloadCandidate;
use crate::registry::Registry;
use crossbeam_channel::{Receiver, Sender};
use sprite_core::asset::{AssetId, AssetState, Priority, ResourceLoader};
use sprite_telemetry::MetricsRegistry;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

pub(crate) struct CacheShared<L: ResourceLoader> {
    pub(crate) config: CacheConfig,
    pub(crate) loader: L,
    pub(crate) registry: RwLock<Registry<L::Resource>>,
    pub(crate) load_tx: Sender<AssetId>,
    pub(crate) load_rx: Receiver<AssetId>,
    pub(crate) unload_tx: Sender<UnloadCandidate>,
    pub(crate) unload_rx: Receiver<UnloadCandidate>,
    pub(crate) metrics: CacheMetrics,
}

/// A concurrent, reference-counted asset cache.
///
/// Built once at startup and cloned into every subsystem that needs assets;
/// clones share the same state. Loading, debounced unloading and the budget
/// monitor run on the threads started by [`AssetCache::spawn_workers`].
/// Without workers every load runs on the requesting thread and nothing is
/// unloaded automatically.
///
/// All bookkeeping sits behind a single `RwLock`. The lock is never held
/// while the loader builds or destroys a resource, nor while a caller waits
/// for a load.
pub struct AssetCache<L: ResourceLoader> {
    pub(crate) shared: Arc<CacheShared<L>>,
}

impl<L: ResourceLoader> Clone for AssetCache<L> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<L: ResourceLoader> fmt::Debug for AssetCache<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetCache")
            .field("config", &self.shared.config)
            .field("memory_used", &self.memory_used())
            .finish_non_exhaustive()
    }
}

impl<L: ResourceLoader> AssetCache<L> {
    /// Creates a cache around `loader` and registers its metrics.
    pub fn new(
        config: CacheConfig,
        loader: L,
        metrics_registry: &MetricsRegistry,
    ) -> Result<Self, CacheError> {
        config.validate()?;
        let metrics = CacheMetrics::new(metrics_registry)?;
        let (load_tx, load_rx) = crossbeam_channel::bounded(config.load_queue_capacity);
        let (unload_tx, unload_rx) = crossbeam_channel::bounded(config.unload_queue_capacity);

        log::info!(
            "AssetCache: Created with a {} byte budget (target {:.0}%)",
            config.memory_limit,
            config.target_fraction * 100.0
        );

        Ok(Self {
            shared: Arc::new(CacheShared {
                registry: RwLock::new(Registry::new(config.max_tracked)),
                config,
                loader,
                load_tx,
                load_rx,
                unload_tx,
                unload_rx,
                metrics,
            }),
        })
    }

    /// Takes a reference to an asset, loading it if needed.
    ///
    /// The first request for an identifier fixes its priority. Requests at
    /// [`Priority::High`] or above block until the asset is loaded; if the load
    /// fails the reference taken here is given back and the error returned.
    /// Lower priorities return at once with a handle that can be polled or
    /// waited on.
    pub fn request_asset(
        &self,
        id: impl Into<AssetId>,
        priority: Priority,
    ) -> Result<AssetHandle, AssetError> {
        let id = id.into();
        let (handle, load_inline) = {
            let mut registry = self.write();
            let workers_online = registry.workers_online;
            let now = Instant::now();
            registry.touch(&id);

            let entry = registry.entry_or_insert(&id, priority, now);
            if entry.priority != priority {
                log::debug!(
                    "AssetCache: '{}' requested at {:?} but keeps its {:?} priority",
                    id,
                    priority,
                    entry.priority
                );
            }
            entry.ref_count = entry.ref_count.saturating_add(1);
            entry.last_used = now;

            let load_inline = match entry.state {
                AssetState::Unloaded => self.begin_load(entry, &id, workers_online),
                AssetState::Unloading => {
                    entry.reload_requested = true;
                    entry.arm_signal();
                    false
                }
                AssetState::Loading | AssetState::Loaded => false,
            };
            (AssetHandle::new(id.clone(), entry.signal.clone()), load_inline)
        };

        if load_inline {
            self.run_load(&id);
        }

        if priority.blocks_on_load() {
            if let Err(e) = handle.wait() {
                self.release_asset(&id);
                return Err(e);
            }
        }
        Ok(handle)
    }

    /// Gives back one reference to an asset.
    ///
    /// When the last reference goes, a non-critical asset becomes an unload
    /// candidate and is destroyed after the debounce interval unless it is
    /// requested again. Releasing an unknown or unreferenced asset is logged
    /// and counted, and changes nothing.
    pub fn release_asset(&self, id: impl AsRef<str>) {
        let id = id.as_ref();
        let stale = {
            let mut registry = self.write();
            let workers_online = registry.workers_online;
            match registry.entries.get_mut(id) {
                Some(entry) if entry.ref_count > 0 => {
                    entry.ref_count -= 1;
                    if entry.is_evictable() {
                        self.schedule_unload(entry, AssetId::new(id), workers_online);
                    }
                    false
                }
                _ => true,
            }
        };

        if stale {
            let error = AssetError::StaleRelease {
                id: AssetId::new(id),
            };
            log::warn!("AssetCache: {}", error);
            bump(&self.shared.metrics.stale_releases_total);
        }
    }

    /// Returns a copy of the resource handle if the asset is loaded.
    ///
    /// Never blocks on a load and does not count as a use.
    pub fn get_resource(&self, id: impl AsRef<str>) -> Option<L::Resource> {
        let registry = self.read();
        registry
            .entries
            .get(id.as_ref())
            .filter(|entry| entry.state == AssetState::Loaded)
            .and_then(|entry| entry.resource.clone())
    }

    /// Returns a copy of an entry's bookkeeping.
    pub fn snapshot(&self, id: impl AsRef<str>) -> Option<AssetSnapshot> {
        let registry = self.read();
        registry
            .entries
            .get_key_value(id.as_ref())
            .map(|(id, entry)| entry.snapshot(id))
    }

    /// Bytes currently held by loaded assets.
    pub fn memory_used(&self) -> u64 {
        self.read().memory_used
    }

    /// The configured memory budget in bytes.
    pub fn memory_limit(&self) -> u64 {
        self.shared.config.memory_limit
    }

    /// The configuration the cache was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.shared.config
    }

    /// The loader the cache builds resources with.
    pub fn loader(&self) -> &L {
        &self.shared.loader
    }

    /// Returns a summary of the cache and its counters.
    pub fn stats(&self) -> CacheStats {
        let (entries, loaded, tracked, memory_used) = {
            let registry = self.read();
            (
                registry.entries.len(),
                registry.loaded_count(),
                registry.recency.len(),
                registry.memory_used,
            )
        };
        let metrics = &self.shared.metrics;
        CacheStats {
            entries,
            loaded,
            tracked,
            memory_used,
            memory_limit: self.shared.config.memory_limit,
            loads: read_counter(&metrics.loads_total),
            load_failures: read_counter(&metrics.load_failures_total),
            sync_fallbacks: read_counter(&metrics.sync_fallbacks_total),
            unloads: read_counter(&metrics.unloads_total),
            evictions: read_counter(&metrics.evictions_total),
            stale_releases: read_counter(&metrics.stale_releases_total),
            budget_exceeded: read_counter(&metrics.budget_exceeded_total),
            unload_candidates_dropped: read_counter(&metrics.unload_candidates_dropped_total),
        }
    }

    /// Destroys every loaded resource, whatever its references or priority.
    ///
    /// Entries, reference counts and recency are kept, so a later request
    /// loads the asset again. Returns the number of resources destroyed.
    pub fn purge(&self) -> usize {
        let victims = {
            let mut registry = self.write();
            let mut victims = Vec::new();
            let mut freed = 0;
            for (id, entry) in registry.entries.iter_mut() {
                if let Some((resource, size)) = entry.begin_unload() {
                    freed += size;
                    victims.push((id.clone(), resource));
                }
            }
            registry.credit(freed);
            self.shared.metrics.record_memory(registry.memory_used);
            victims
        };

        let count = self.unload_entries(victims);
        log::info!("AssetCache: Purged {} loaded assets", count);
        count
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Registry<L::Resource>> {
        self.shared
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Registry<L::Resource>> {
        self.shared
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprite_core::asset::{LoadedResource, LoaderError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingLoader {
        loads: AtomicUsize,
        destroyed: AtomicUsize,
    }

    impl ResourceLoader for CountingLoader {
        type Resource = u32;

        fn load(&self, id: &AssetId) -> Result<LoadedResource<u32>, LoaderError> {
            if id.as_str().starts_with("missing") {
                return Err(format!("no such file: {id}").into());
            }
            let n = self.loads.fetch_add(1, Ordering::SeqCst) as u32;
            Ok(LoadedResource::new(n, 100))
        }

        fn destroy(&self, _resource: u32) {
            self.destroyed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn cache() -> AssetCache<CountingLoader> {
        AssetCache::new(
            CacheConfig::default(),
            CountingLoader::default(),
            &MetricsRegistry::new(),
        )
        .unwrap()
    }

    #[test]
    fn request_without_workers_loads_inline() {
        let cache = cache();
        let handle = cache.request_asset("stand1", Priority::Low).unwrap();

        assert!(handle.is_ready());
        assert_eq!(cache.get_resource("stand1"), Some(0));
        assert_eq!(cache.memory_used(), 100);

        let snapshot = cache.snapshot("stand1").unwrap();
        assert_eq!(snapshot.state, AssetState::Loaded);
        assert_eq!(snapshot.ref_count, 1);
        assert_eq!(snapshot.load_count, 1);
    }

    #[test]
    fn repeated_requests_share_one_load() {
        let cache = cache();
        cache.request_asset("move1", Priority::High).unwrap();
        cache.request_asset("move1", Priority::Low).unwrap();

        let snapshot = cache.snapshot("move1").unwrap();
        assert_eq!(snapshot.ref_count, 2);
        assert_eq!(snapshot.priority, Priority::High);
        assert_eq!(cache.loader().loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stale_release_is_counted_and_ignored() {
        let cache = cache();
        cache.release_asset("never-requested");

        cache.request_asset("hit1", Priority::Low).unwrap();
        cache.release_asset("hit1");
        cache.release_asset("hit1");

        let snapshot = cache.snapshot("hit1").unwrap();
        assert_eq!(snapshot.ref_count, 0);
        assert_eq!(snapshot.state, AssetState::Loaded);
        assert_eq!(cache.stats().stale_releases, 2);
        assert!(cache.snapshot("never-requested").is_none());
    }

    #[test]
    fn failed_blocking_request_rolls_back_its_reference() {
        let cache = cache();
        let err = cache.request_asset("missing1", Priority::High).unwrap_err();

        assert!(matches!(err, AssetError::Load { .. }));
        let snapshot = cache.snapshot("missing1").unwrap();
        assert_eq!(snapshot.ref_count, 0);
        assert_eq!(snapshot.state, AssetState::Unloaded);
        assert!(snapshot.last_error.unwrap().contains("no such file"));
        assert_eq!(cache.stats().load_failures, 1);
        assert_eq!(cache.memory_used(), 0);
    }

    #[test]
    fn failed_background_request_keeps_its_reference() {
        let cache = cache();
        let handle = cache.request_asset("missing2", Priority::Low).unwrap();

        assert!(matches!(handle.wait(), Err(AssetError::Load { .. })));
        assert_eq!(cache.snapshot("missing2").unwrap().ref_count, 1);
        assert_eq!(cache.get_resource("missing2"), None);
    }

    #[test]
    fn purge_destroys_everything_loaded() {
        let cache = cache();
        cache.request_asset("a", Priority::Critical).unwrap();
        cache.request_asset("b", Priority::Low).unwrap();

        assert_eq!(cache.purge(), 2);
        assert_eq!(cache.memory_used(), 0);
        assert_eq!(cache.loader().destroyed.load(Ordering::SeqCst), 2);

        let snapshot = cache.snapshot("a").unwrap();
        assert_eq!(snapshot.state, AssetState::Unloaded);
        assert_eq!(snapshot.ref_count, 1);
    }

    #[test]
    fn stats_reflect_the_registry() {
        let cache = cache();
        cache.request_asset("a", Priority::Low).unwrap();
        cache.request_asset("missing", Priority::Low).unwrap();

        let stats = cache.stats();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.loaded, 1);
        assert_eq!(stats.tracked, 2);
        assert_eq!(stats.loads, 1);
        assert_eq!(stats.load_failures, 1);
        assert_eq!(stats.sync_fallbacks, 2);
        assert_eq!(stats.memory_limit, CacheConfig::default().memory_limit);
    }
}
