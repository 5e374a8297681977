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

//! Metric handles published by the cache.

use sprite_core::telemetry::MetricsResult;
use sprite_telemetry::{CounterHandle, GaugeHandle, HistogramHandle, MetricsRegistry};

const NAMESPACE: &str = "assets";

/// Handles for every metric the cache updates.
#[derive(Debug, Clone)]
pub(crate) struct CacheMetrics {
    pub(crate) loads_total: CounterHandle,
    pub(crate) load_failures_total: CounterHandle,
    pub(crate) sync_fallbacks_total: CounterHandle,
    pub(crate) unloads_total: CounterHandle,
    pub(crate) evictions_total: CounterHandle,
    pub(crate) stale_releases_total: CounterHandle,
    pub(crate) budget_exceeded_total: CounterHandle,
    pub(crate) unload_candidates_dropped_total: CounterHandle,
    pub(crate) memory_used: GaugeHandle,
    /// Resource construction time in milliseconds.
    pub(crate) load_time: HistogramHandle,
}

impl CacheMetrics {
    pub(crate) fn new(registry: &MetricsRegistry) -> MetricsResult<Self> {
        Ok(Self {
            loads_total: registry.register_counter(
                NAMESPACE,
                "loads_total",
                "Successful asset loads",
            )?,
            load_failures_total: registry.register_counter(
                NAMESPACE,
                "load_failures_total",
                "Asset loads that failed",
            )?,
            sync_fallbacks_total: registry.register_counter(
                NAMESPACE,
                "sync_fallbacks_total",
                "Loads run on the requesting thread instead of a worker",
            )?,
            unloads_total: registry.register_counter(
                NAMESPACE,
                "unloads_total",
                "Asset resources destroyed",
            )?,
            evictions_total: registry.register_counter(
                NAMESPACE,
                "evictions_total",
                "Assets unloaded by the budget monitor",
            )?,
            stale_releases_total: registry.register_counter(
                NAMESPACE,
                "stale_releases_total",
                "Releases of assets without outstanding references",
            )?,
            budget_exceeded_total: registry.register_counter(
                NAMESPACE,
                "budget_exceeded_total",
                "Budget passes that could not reach the target usage",
            )?,
            unload_candidates_dropped_total: registry.register_counter(
                NAMESPACE,
                "unload_candidates_dropped_total",
                "Unload candidates dropped because the unload queue was full",
            )?,
            memory_used: registry.register_gauge(
                NAMESPACE,
                "memory_used",
                "Bytes held by loaded assets",
                "bytes",
            )?,
            load_time: registry.register_histogram(
                NAMESPACE,
                "load_time",
                "Asset construction time",
                "ms",
                vec![1.0, 5.0, 16.0, 33.0, 100.0, 500.0],
            )?,
        })
    }

    pub(crate) fn record_memory(&self, bytes: u64) {
        if let Err(e) = self.memory_used.set(bytes as f64) {
            log::warn!(
                "AssetCache: Failed to update metric {}: {}",
                self.memory_used.id(),
                e
            );
        }
    }
}

/// A point-in-time summary of the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries ever requested.
    pub entries: usize,
    /// Entries currently loaded.
    pub loaded: usize,
    /// Identifiers in the recency list.
    pub tracked: usize,
    /// Bytes held by loaded assets.
    pub memory_used: u64,
    /// The configured budget.
    pub memory_limit: u64,
    /// Successful loads.
    pub loads: u64,
    /// Failed loads.
    pub load_failures: u64,
    /// Loads run on the requesting thread.
    pub sync_fallbacks: u64,
    /// Resources destroyed.
    pub unloads: u64,
    /// Resources destroyed by the budget monitor.
    pub evictions: u64,
    /// Releases without an outstanding reference.
    pub stale_releases: u64,
    /// Budget passes that missed the target.
    pub budget_exceeded: u64,
    /// Unload candidates dropped on a full queue.
    pub unload_candidates_dropped: u64,
}

pub(crate) fn bump(counter: &CounterHandle) {
    if let Err(e) = counter.increment() {
        log::warn!("AssetCache: Failed to update metric {}: {}", counter.id(), e);
    }
}

pub(crate) fn read_counter(counter: &CounterHandle) -> u64 {
    counter.get().unwrap_or(0)
}
