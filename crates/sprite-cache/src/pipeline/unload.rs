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

//! Debounced unloading and the unload transition shared with the monitor.

use crate::cache::AssetCache;
use crate::entry::AssetEntry;
use crate::error::AssetError;
use crate::metrics::bump;
use crossbeam_channel::{after, select, Receiver, TrySendError};
use sprite_core::asset::{AssetId, AssetState, ResourceLoader};
use std::time::Instant;

/// An asset whose last reference went away.
#[derive(Debug, Clone)]
pub(crate) struct UnloadCandidate {
    pub(crate) id: AssetId,
    /// The entry's release epoch when the candidate was queued.
    pub(crate) epoch: u64,
    /// Earliest time the asset may be unloaded.
    pub(crate) due: Instant,
}

impl<L: ResourceLoader> AssetCache<L> {
    /// Queues an unreferenced entry for unloading after the debounce interval.
    ///
    /// Called with the write lock held. Any candidate queued earlier for the
    /// same entry is superseded.
    pub(crate) fn schedule_unload(
        &self,
        entry: &mut AssetEntry<L::Resource>,
        id: AssetId,
        workers_online: bool,
    ) {
        entry.release_epoch += 1;
        if !workers_online {
            log::trace!("AssetCache: No unload worker, '{}' stays resident", id);
            return;
        }

        let candidate = UnloadCandidate {
            id,
            epoch: entry.release_epoch,
            due: Instant::now() + self.shared.config.debounce(),
        };
        match self.shared.unload_tx.try_send(candidate) {
            Ok(()) => {}
            Err(TrySendError::Full(candidate)) => {
                bump(&self.shared.metrics.unload_candidates_dropped_total);
                log::debug!(
                    "AssetCache: Unload queue full, '{}' stays resident",
                    candidate.id
                );
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }

    /// Unloads a candidate if it is still unreferenced, evictable and loaded.
    pub(crate) fn process_unload_candidate(&self, candidate: &UnloadCandidate) {
        let victim = {
            let mut registry = self.write();
            let Some(entry) = registry.entries.get_mut(&candidate.id) else {
                return;
            };
            if entry.release_epoch != candidate.epoch || !entry.is_evictable() {
                log::trace!(
                    "AssetCache: '{}' was reused during debounce, keeping it",
                    candidate.id
                );
                return;
            }
            let Some((resource, size)) = entry.begin_unload() else {
                return;
            };
            registry.credit(size);
            self.shared.metrics.record_memory(registry.memory_used);
            (candidate.id.clone(), resource)
        };

        log::debug!("AssetCache: Unloading idle asset '{}'", victim.0);
        self.unload_entries(vec![victim]);
    }

    /// Destroys resources taken out of `Unloading` entries and completes the
    /// transition for each. Must be called without the lock held.
    pub(crate) fn unload_entries(&self, victims: Vec<(AssetId, L::Resource)>) -> usize {
        let count = victims.len();
        for (id, resource) in victims {
            self.shared.loader.destroy(resource);
            bump(&self.shared.metrics.unloads_total);
            self.finish_unload(&id);
        }
        count
    }

    /// Moves an entry from `Unloading` to `Unloaded`, or straight back to
    /// `Loading` if it was requested while its resource was being destroyed.
    ///
    /// A reload whose references were all given back before the destroy
    /// finished is not started, and its waiters get [`AssetError::Released`].
    fn finish_unload(&self, id: &AssetId) {
        let (load_inline, dropped_reload) = {
            let mut registry = self.write();
            let workers_online = registry.workers_online;
            let Some(entry) = registry.entries.get_mut(id) else {
                return;
            };
            if entry.state != AssetState::Unloading {
                log::trace!(
                    "AssetCache: '{}' left unloading early, now {}",
                    id,
                    entry.state.as_str()
                );
                return;
            }
            entry.state = AssetState::Unloaded;

            if entry.reload_requested && entry.ref_count > 0 {
                log::debug!("AssetCache: '{}' was requested while unloading, reloading", id);
                (self.begin_load(entry, id, workers_online), None)
            } else {
                let pending = (entry.reload_requested && !entry.signal.is_complete())
                    .then(|| entry.signal.clone());
                entry.reload_requested = false;
                (false, pending)
            }
        };

        if let Some(signal) = dropped_reload {
            log::debug!(
                "AssetCache: '{}' was released again while unloading, not reloading",
                id
            );
            signal.complete(Err(AssetError::Released { id: id.clone() }));
        }
        if load_inline {
            self.run_load(id);
        }
    }

    pub(crate) fn run_unload_worker(&self, shutdown: &Receiver<()>) {
        log::debug!("AssetCache: Unload worker started");
        loop {
            let candidate = select! {
                recv(shutdown) -> _ => break,
                recv(self.shared.unload_rx) -> candidate => match candidate {
                    Ok(candidate) => candidate,
                    Err(_) => break,
                },
            };

            let wait = candidate.due.saturating_duration_since(Instant::now());
            if !wait.is_zero() {
                select! {
                    recv(shutdown) -> _ => break,
                    recv(after(wait)) -> _ => {}
                }
            }
            self.process_unload_candidate(&candidate);
        }
        log::debug!("AssetCache: Unload worker stopped");
    }
}
