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

//! Per-asset state and the completion signal shared with waiting callers.

use crate::error::AssetError;
use sprite_core::asset::{AssetId, AssetState, Priority};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// One-shot completion notification for a single load cycle.
///
/// Any number of threads may wait on it. Completing it twice keeps the first
/// outcome.
#[derive(Debug, Default)]
pub(crate) struct LoadSignal {
    outcome: Mutex<Option<Result<(), AssetError>>>,
    ready: Condvar,
}

impl LoadSignal {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn complete(&self, outcome: Result<(), AssetError>) {
        let mut slot = self.outcome.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            *slot = Some(outcome);
            self.ready.notify_all();
        }
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.peek().is_some()
    }

    pub(crate) fn peek(&self) -> Option<Result<(), AssetError>> {
        self.outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn wait(&self) -> Result<(), AssetError> {
        let mut slot = self.outcome.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(outcome) = slot.as_ref() {
                return outcome.clone();
            }
            slot = self
                .ready
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    pub(crate) fn wait_timeout(&self, timeout: Duration) -> Option<Result<(), AssetError>> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.outcome.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(outcome) = slot.as_ref() {
                return Some(outcome.clone());
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            slot = self
                .ready
                .wait_timeout(slot, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }
}

/// The cached state of one asset. Owned by the registry.
#[derive(Debug)]
pub(crate) struct AssetEntry<R> {
    pub(crate) state: AssetState,
    pub(crate) priority: Priority,
    pub(crate) size_bytes: u64,
    pub(crate) last_used: Instant,
    pub(crate) ref_count: u32,
    pub(crate) resource: Option<R>,
    pub(crate) signal: Arc<LoadSignal>,
    pub(crate) last_error: Option<String>,
    pub(crate) load_count: u64,
    /// Set while a thread is constructing the resource for the current cycle.
    pub(crate) load_claimed: bool,
    /// Set when a request arrives during `Unloading`.
    pub(crate) reload_requested: bool,
    /// Bumped each time the reference count drops to zero. An unload candidate
    /// only acts if the epoch it was queued with is still current.
    pub(crate) release_epoch: u64,
}

impl<R: Clone> AssetEntry<R> {
    pub(crate) fn new(priority: Priority, now: Instant) -> Self {
        Self {
            state: AssetState::Unloaded,
            priority,
            size_bytes: 0,
            last_used: now,
            ref_count: 0,
            resource: None,
            signal: LoadSignal::new(),
            last_error: None,
            load_count: 0,
            load_claimed: false,
            reload_requested: false,
            release_epoch: 0,
        }
    }

    /// Installs a fresh signal unless the current one is still pending.
    pub(crate) fn arm_signal(&mut self) {
        if self.signal.is_complete() {
            self.signal = LoadSignal::new();
        }
    }

    /// Whether the debounce worker or the budget monitor may unload this entry.
    pub(crate) fn is_evictable(&self) -> bool {
        self.ref_count == 0 && self.priority.is_evictable() && self.state == AssetState::Loaded
    }

    /// Moves a loaded entry to `Unloading` and hands out its resource and size.
    pub(crate) fn begin_unload(&mut self) -> Option<(R, u64)> {
        if self.state != AssetState::Loaded {
            return None;
        }
        let resource = self.resource.take()?;
        let size = std::mem::take(&mut self.size_bytes);
        self.state = AssetState::Unloading;
        Some((resource, size))
    }

    pub(crate) fn snapshot(&self, id: &AssetId) -> AssetSnapshot {
        AssetSnapshot {
            id: id.clone(),
            state: self.state,
            priority: self.priority,
            ref_count: self.ref_count,
            size_bytes: self.size_bytes,
            last_used: self.last_used,
            last_error: self.last_error.clone(),
            load_count: self.load_count,
        }
    }
}

/// A read-only copy of an entry's bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSnapshot {
    /// The asset identifier.
    pub id: AssetId,
    /// Lifecycle state at the time of the snapshot.
    pub state: AssetState,
    /// The priority the asset was first requested with.
    pub priority: Priority,
    /// Outstanding references.
    pub ref_count: u32,
    /// Bytes charged against the budget. Zero unless loaded.
    pub size_bytes: u64,
    /// When the asset was last requested.
    pub last_used: Instant,
    /// Message of the most recent failed load, cleared by a successful one.
    pub last_error: Option<String>,
    /// Number of successful loads so far.
    pub load_count: u64,
}

/// The result of a request: a reference to a possibly still loading asset.
///
/// The handle does not own the reference. Give it back with
/// [`AssetCache::release_asset`](crate::AssetCache::release_asset).
#[derive(Debug, Clone)]
pub struct AssetHandle {
    id: AssetId,
    signal: Arc<LoadSignal>,
}

impl AssetHandle {
    pub(crate) fn new(id: AssetId, signal: Arc<LoadSignal>) -> Self {
        Self { id, signal }
    }

    /// The requested asset.
    pub fn id(&self) -> &AssetId {
        &self.id
    }

    /// Returns `true` once the load this request depends on has succeeded.
    pub fn is_ready(&self) -> bool {
        matches!(self.signal.peek(), Some(Ok(())))
    }

    /// Returns the outcome of the load, if it has finished.
    pub fn outcome(&self) -> Option<Result<(), AssetError>> {
        self.signal.peek()
    }

    /// Blocks until the load finishes.
    pub fn wait(&self) -> Result<(), AssetError> {
        self.signal.wait()
    }

    /// Blocks until the load finishes or `timeout` elapses.
    ///
    /// Returns `None` on timeout.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<(), AssetError>> {
        self.signal.wait_timeout(timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn signal_wakes_every_waiter() {
        let signal = LoadSignal::new();
        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let signal = signal.clone();
                thread::spawn(move || signal.wait())
            })
            .collect();

        thread::sleep(Duration::from_millis(20));
        signal.complete(Ok(()));

        for waiter in waiters {
            assert_eq!(waiter.join().unwrap(), Ok(()));
        }
    }

    #[test]
    fn signal_keeps_first_outcome() {
        let signal = LoadSignal::new();
        let id = AssetId::from("hit1");
        signal.complete(Err(AssetError::ShutDown { id: id.clone() }));
        signal.complete(Ok(()));
        assert_eq!(signal.wait(), Err(AssetError::ShutDown { id }));
    }

    #[test]
    fn wait_timeout_returns_none_while_pending() {
        let signal = LoadSignal::new();
        assert_eq!(signal.wait_timeout(Duration::from_millis(10)), None);
    }

    #[test]
    fn arm_signal_only_replaces_completed_signals() {
        let mut entry: AssetEntry<u32> = AssetEntry::new(Priority::Low, Instant::now());
        let pending = entry.signal.clone();
        entry.arm_signal();
        assert!(Arc::ptr_eq(&pending, &entry.signal));

        pending.complete(Ok(()));
        entry.arm_signal();
        assert!(!Arc::ptr_eq(&pending, &entry.signal));
        assert!(!entry.signal.is_complete());
    }

    #[test]
    fn begin_unload_requires_loaded_state() {
        let mut entry: AssetEntry<u32> = AssetEntry::new(Priority::Low, Instant::now());
        assert!(entry.begin_unload().is_none());

        entry.state = AssetState::Loaded;
        entry.resource = Some(9);
        entry.size_bytes = 64;
        assert_eq!(entry.begin_unload(), Some((9, 64)));
        assert_eq!(entry.state, AssetState::Unloading);
        assert_eq!(entry.size_bytes, 0);
    }
}
