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

#![allow(dead_code)]

use sprite_cache::{AssetCache, CacheConfig};
use sprite_core::asset::{AssetId, LoadedResource, LoaderError, ResourceLoader};
use sprite_telemetry::MetricsRegistry;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

pub const ASSET_SIZE: u64 = 100;

/// A loader that hands out numbered handles and can be told to fail or panic
/// on ids, or hold loads and destroys until released.
#[derive(Default)]
pub struct FakeLoader {
    next_handle: AtomicU32,
    state: Mutex<FakeState>,
    changed: Condvar,
}

#[derive(Default)]
struct FakeState {
    failing: HashSet<String>,
    panicking: HashSet<String>,
    sizes: HashMap<String, u64>,
    held: HashSet<String>,
    load_calls: HashMap<String, usize>,
    started: HashSet<String>,
    live: HashMap<u32, String>,
    destroyed: Vec<String>,
}

impl FakeLoader {
    pub fn fail(&self, id: &str) {
        self.state.lock().unwrap().failing.insert(id.to_string());
    }

    /// Makes loads of `id` panic instead of returning.
    pub fn panic_on(&self, id: &str) {
        self.state.lock().unwrap().panicking.insert(id.to_string());
    }

    pub fn set_size(&self, id: &str, size: u64) {
        self.state.lock().unwrap().sizes.insert(id.to_string(), size);
    }

    /// Makes loads of `key` (or destroys, with a `destroy:` prefix) block.
    pub fn hold(&self, key: &str) {
        self.state.lock().unwrap().held.insert(key.to_string());
    }

    pub fn release(&self, key: &str) {
        self.state.lock().unwrap().held.remove(key);
        self.changed.notify_all();
    }

    pub fn load_calls(&self, id: &str) -> usize {
        self.state.lock().unwrap().load_calls.get(id).copied().unwrap_or(0)
    }

    pub fn live_count(&self) -> usize {
        self.state.lock().unwrap().live.len()
    }

    pub fn destroyed(&self) -> Vec<String> {
        self.state.lock().unwrap().destroyed.clone()
    }

    /// Blocks until a load or destroy of `key` has started.
    pub fn wait_started(&self, key: &str) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut state = self.state.lock().unwrap();
        while !state.started.contains(key) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            state = self.changed.wait_timeout(state, remaining).unwrap().0;
        }
        true
    }

    fn enter(&self, key: &str) -> std::sync::MutexGuard<'_, FakeState> {
        let mut state = self.state.lock().unwrap();
        state.started.insert(key.to_string());
        self.changed.notify_all();
        while state.held.contains(key) {
            state = self.changed.wait(state).unwrap();
        }
        state
    }
}

impl ResourceLoader for FakeLoader {
    type Resource = u32;

    fn load(&self, id: &AssetId) -> Result<LoadedResource<u32>, LoaderError> {
        let mut state = self.enter(id.as_str());
        *state.load_calls.entry(id.to_string()).or_default() += 1;
        if state.panicking.contains(id.as_str()) {
            drop(state);
            panic!("decoder crashed on {id}");
        }
        if state.failing.contains(id.as_str()) {
            return Err(format!("cannot decode {id}").into());
        }

        let handle = self.next_handle.fetch_add(1, Ordering::SeqCst);
        state.live.insert(handle, id.to_string());
        let size = state.sizes.get(id.as_str()).copied().unwrap_or(ASSET_SIZE);
        Ok(LoadedResource::new(handle, size))
    }

    fn destroy(&self, resource: u32) {
        let key = {
            let state = self.state.lock().unwrap();
            state.live.get(&resource).map(|id| format!("destroy:{id}"))
        };
        let mut state = match key {
            Some(key) => self.enter(&key),
            None => self.state.lock().unwrap(),
        };
        if let Some(id) = state.live.remove(&resource) {
            state.destroyed.push(id);
        }
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn fast_config() -> CacheConfig {
    CacheConfig::default()
        .with_debounce(Duration::from_millis(30))
        .with_monitor_period(Duration::from_secs(60))
}

pub fn new_cache(config: CacheConfig) -> AssetCache<FakeLoader> {
    init_logging();
    AssetCache::new(config, FakeLoader::default(), &MetricsRegistry::new()).unwrap()
}

/// Polls `condition` until it holds or five seconds pass.
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}
