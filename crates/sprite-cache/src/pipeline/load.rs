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

//! Resource construction, on a worker or on the requesting thread.

use crate::cache::AssetCache;
use crate::entry::{AssetEntry, LoadSignal};
use crate::error::AssetError;
use crate::metrics::bump;
use crossbeam_channel::{select, Receiver, TrySendError};
use sprite_core::asset::{AssetId, AssetState, LoadedResource, LoaderError, ResourceLoader};
use sprite_telemetry::ScopedMetricTimer;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

enum Job {
    Run,
    Abandon(Arc<LoadSignal>),
    Skip,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic payload");
    format!("loader panicked: {detail}")
}

impl<L: ResourceLoader> AssetCache<L> {
    /// Moves an unloaded entry to `Loading` and dispatches the load.
    ///
    /// Called with the write lock held. Returns `true` if the caller must run
    /// the load itself once the lock is released.
    pub(crate) fn begin_load(
        &self,
        entry: &mut AssetEntry<L::Resource>,
        id: &AssetId,
        workers_online: bool,
    ) -> bool {
        entry.state = AssetState::Loading;
        entry.reload_requested = false;
        entry.arm_signal();

        if workers_online {
            match self.shared.load_tx.try_send(id.clone()) {
                Ok(()) => {
                    log::trace!("AssetCache: Queued load of '{}'", id);
                    return false;
                }
                Err(TrySendError::Full(_)) => {
                    log::debug!("AssetCache: Load queue full, loading '{}' inline", id);
                }
                Err(TrySendError::Disconnected(_)) => {
                    log::debug!("AssetCache: Load queue closed, loading '{}' inline", id);
                }
            }
        }

        bump(&self.shared.metrics.sync_fallbacks_total);
        entry.load_claimed = true;
        true
    }

    /// Builds the resource for a claimed entry and commits the outcome.
    pub(crate) fn run_load(&self, id: &AssetId) {
        let outcome = {
            let _timer = ScopedMetricTimer::new(&self.shared.metrics.load_time);
            panic::catch_unwind(AssertUnwindSafe(|| self.shared.loader.load(id)))
                .unwrap_or_else(|payload| Err(panic_message(payload.as_ref()).into()))
        };
        self.commit_load(id, outcome);
    }

    fn commit_load(
        &self,
        id: &AssetId,
        outcome: Result<LoadedResource<L::Resource>, LoaderError>,
    ) {
        let mut orphan = None;
        let completion = {
            let mut registry = self.write();
            let workers_online = registry.workers_online;
            match registry.entries.get_mut(id) {
                Some(entry) if entry.state == AssetState::Loading => {
                    entry.load_claimed = false;
                    match outcome {
                        Ok(loaded) => {
                            entry.state = AssetState::Loaded;
                            entry.resource = Some(loaded.resource);
                            entry.size_bytes = loaded.size_bytes;
                            entry.last_error = None;
                            entry.load_count += 1;
                            if entry.is_evictable() {
                                self.schedule_unload(entry, id.clone(), workers_online);
                            }
                            let signal = entry.signal.clone();

                            registry.charge(loaded.size_bytes);
                            self.shared.metrics.record_memory(registry.memory_used);
                            bump(&self.shared.metrics.loads_total);
                            log::debug!(
                                "AssetCache: Loaded '{}' ({} bytes, {} in use)",
                                id,
                                loaded.size_bytes,
                                registry.memory_used
                            );
                            Some((signal, Ok(())))
                        }
                        Err(e) => {
                            let reason = e.to_string();
                            entry.state = AssetState::Unloaded;
                            entry.size_bytes = 0;
                            entry.last_error = Some(reason.clone());
                            bump(&self.shared.metrics.load_failures_total);
                            log::warn!("AssetCache: Failed to load '{}': {}", id, reason);
                            Some((
                                entry.signal.clone(),
                                Err(AssetError::Load {
                                    id: id.clone(),
                                    reason,
                                }),
                            ))
                        }
                    }
                }
                other => {
                    log::warn!(
                        "AssetCache: Dropping load result for '{}', entry is {}",
                        id,
                        other.map_or("gone", |entry| entry.state.as_str())
                    );
                    orphan = outcome.ok().map(|loaded| loaded.resource);
                    None
                }
            }
        };

        if let Some(resource) = orphan {
            self.shared.loader.destroy(resource);
        }
        if let Some((signal, result)) = completion {
            signal.complete(result);
        }
    }

    /// Claims the entry a queued job refers to and loads it.
    ///
    /// Jobs whose entry is no longer waiting for a loader are skipped. Jobs
    /// picked up after shutdown began are abandoned.
    pub(crate) fn process_load_job(&self, id: &AssetId) {
        let job = {
            let mut registry = self.write();
            let workers_online = registry.workers_online;
            match registry.entries.get_mut(id) {
                Some(entry) if entry.state == AssetState::Loading && !entry.load_claimed => {
                    if workers_online {
                        entry.load_claimed = true;
                        Job::Run
                    } else {
                        entry.state = AssetState::Unloaded;
                        Job::Abandon(entry.signal.clone())
                    }
                }
                _ => Job::Skip,
            }
        };

        match job {
            Job::Run => self.run_load(id),
            Job::Abandon(signal) => {
                log::debug!("AssetCache: Abandoned queued load of '{}'", id);
                signal.complete(Err(AssetError::ShutDown { id: id.clone() }));
            }
            Job::Skip => log::trace!("AssetCache: Skipping stale load job for '{}'", id),
        }
    }

    /// Fails every load still in the queue with [`AssetError::ShutDown`].
    ///
    /// Called once the workers are gone. Returns the number of abandoned loads.
    pub(crate) fn abandon_queued_loads(&self) -> usize {
        let abandoned: Vec<_> = {
            let mut registry = self.write();
            let mut abandoned = Vec::new();
            while let Ok(id) = self.shared.load_rx.try_recv() {
                if let Some(entry) = registry.entries.get_mut(&id) {
                    if entry.state == AssetState::Loading && !entry.load_claimed {
                        entry.state = AssetState::Unloaded;
                        abandoned.push((id, entry.signal.clone()));
                    }
                }
            }
            while self.shared.unload_rx.try_recv().is_ok() {}
            abandoned
        };

        for (id, signal) in &abandoned {
            log::debug!("AssetCache: Abandoned queued load of '{}'", id);
            signal.complete(Err(AssetError::ShutDown { id: id.clone() }));
        }
        abandoned.len()
    }

    pub(crate) fn run_load_worker(&self, shutdown: &Receiver<()>) {
        log::debug!("AssetCache: Load worker started");
        loop {
            select! {
                recv(shutdown) -> _ => break,
                recv(self.shared.load_rx) -> job => match job {
                    Ok(id) => self.process_load_job(&id),
                    Err(_) => break,
                },
            }
        }
        log::debug!("AssetCache: Load worker stopped");
    }
}
