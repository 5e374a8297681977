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

//! Lifecycle of the cache's background threads.

use crate::cache::AssetCache;
use crate::error::CacheError;
use crossbeam_channel::Sender;
use sprite_core::asset::ResourceLoader;
use std::thread::{self, JoinHandle};

/// The running load workers, unload worker and budget monitor of a cache.
///
/// Stops the threads on [`CacheWorkers::shutdown`] or when dropped. Loads
/// still queued at that point are abandoned; callers waiting on them get
/// [`AssetError::ShutDown`](crate::AssetError::ShutDown). The cache stays
/// usable afterwards and loads on the requesting thread.
pub struct CacheWorkers<L: ResourceLoader> {
    cache: AssetCache<L>,
    shutdown_tx: Option<Sender<()>>,
    handles: Vec<JoinHandle<()>>,
}

impl<L: ResourceLoader> AssetCache<L> {
    /// Starts the background threads.
    ///
    /// Fails with [`CacheError::WorkersRunning`] if this cache already has
    /// workers.
    pub fn spawn_workers(&self) -> Result<CacheWorkers<L>, CacheError> {
        {
            let mut registry = self.write();
            if registry.workers_online {
                return Err(CacheError::WorkersRunning);
            }
            registry.workers_online = true;
        }

        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(0);
        let mut workers = CacheWorkers {
            cache: self.clone(),
            shutdown_tx: Some(shutdown_tx),
            handles: Vec::new(),
        };

        let load_workers = self.shared.config.load_workers;
        for index in 0..load_workers {
            let cache = self.clone();
            let shutdown = shutdown_rx.clone();
            workers.handles.push(
                thread::Builder::new()
                    .name(format!("asset-load-{index}"))
                    .spawn(move || cache.run_load_worker(&shutdown))?,
            );
        }

        let cache = self.clone();
        let shutdown = shutdown_rx.clone();
        workers.handles.push(
            thread::Builder::new()
                .name("asset-unload".to_string())
                .spawn(move || cache.run_unload_worker(&shutdown))?,
        );

        let cache = self.clone();
        workers.handles.push(
            thread::Builder::new()
                .name("asset-budget".to_string())
                .spawn(move || cache.run_budget_monitor(&shutdown_rx))?,
        );

        log::info!(
            "AssetCache: Started {} load workers, the unload worker and the budget monitor",
            load_workers
        );
        Ok(workers)
    }

    fn set_workers_online(&self, online: bool) {
        self.write().workers_online = online;
    }
}

impl<L: ResourceLoader> CacheWorkers<L> {
    /// Number of running threads.
    pub fn thread_count(&self) -> usize {
        self.handles.len()
    }

    /// Stops every thread and abandons the loads left in the queue.
    ///
    /// Returns the number of abandoned loads. Calling it again does nothing.
    pub fn shutdown(&mut self) -> usize {
        let Some(shutdown_tx) = self.shutdown_tx.take() else {
            return 0;
        };

        self.cache.set_workers_online(false);
        drop(shutdown_tx);
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                log::error!("AssetCache: A worker thread panicked");
            }
        }

        let abandoned = self.cache.abandon_queued_loads();
        log::info!(
            "AssetCache: Workers stopped, {} queued loads abandoned",
            abandoned
        );
        abandoned
    }
}

impl<L: ResourceLoader> Drop for CacheWorkers<L> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
