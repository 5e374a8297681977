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

//! Construction-time settings for the asset cache.

use crate::error::CacheError;
use serde::Deserialize;
use std::time::Duration;

/// Default memory budget: 512 MiB.
pub const DEFAULT_MEMORY_LIMIT: u64 = 512 * 1024 * 1024;

/// Configuration for an [`AssetCache`](crate::AssetCache).
///
/// Values are fixed once the cache is built. The struct deserializes from a
/// settings file with every field optional, e.g.
///
/// ```toml
/// memory_limit = 268435456
/// debounce_ms = 2000
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Memory budget in bytes, compared against the sum of loaded asset sizes.
    pub memory_limit: u64,
    /// Fraction of the limit the budget monitor evicts down to. In `(0, 1]`.
    pub target_fraction: f64,
    /// How long an unreferenced asset stays resident before the unload worker
    /// reconsiders it, in milliseconds.
    pub debounce_ms: u64,
    /// Interval between two budget monitor passes, in milliseconds.
    pub monitor_period_ms: u64,
    /// Capacity of the load queue. A request that finds it full loads inline.
    pub load_queue_capacity: usize,
    /// Capacity of the unload queue. Candidates that find it full are dropped.
    pub unload_queue_capacity: usize,
    /// Maximum number of identifiers kept in the recency list.
    pub max_tracked: usize,
    /// Number of load worker threads.
    pub load_workers: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            memory_limit: DEFAULT_MEMORY_LIMIT,
            target_fraction: 0.8,
            debounce_ms: 5_000,
            monitor_period_ms: 10_000,
            load_queue_capacity: 100,
            unload_queue_capacity: 100,
            max_tracked: 50,
            load_workers: 1,
        }
    }
}

impl CacheConfig {
    /// Sets the memory budget in bytes.
    pub fn with_memory_limit(mut self, bytes: u64) -> Self {
        self.memory_limit = bytes;
        self
    }

    /// Sets the fraction of the limit the budget monitor evicts down to.
    pub fn with_target_fraction(mut self, fraction: f64) -> Self {
        self.target_fraction = fraction;
        self
    }

    /// Sets the unload debounce interval.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce_ms = duration_to_ms(debounce);
        self
    }

    /// Sets the budget monitor period.
    pub fn with_monitor_period(mut self, period: Duration) -> Self {
        self.monitor_period_ms = duration_to_ms(period);
        self
    }

    /// Sets the load queue capacity.
    pub fn with_load_queue_capacity(mut self, capacity: usize) -> Self {
        self.load_queue_capacity = capacity;
        self
    }

    /// Sets the unload queue capacity.
    pub fn with_unload_queue_capacity(mut self, capacity: usize) -> Self {
        self.unload_queue_capacity = capacity;
        self
    }

    /// Sets the maximum recency list length.
    pub fn with_max_tracked(mut self, max_tracked: usize) -> Self {
        self.max_tracked = max_tracked;
        self
    }

    /// Sets the number of load worker threads.
    pub fn with_load_workers(mut self, workers: usize) -> Self {
        self.load_workers = workers;
        self
    }

    /// The unload debounce interval.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// The budget monitor period.
    pub fn monitor_period(&self) -> Duration {
        Duration::from_millis(self.monitor_period_ms)
    }

    /// The usage, in bytes, the budget monitor evicts down to.
    pub fn target_bytes(&self) -> u64 {
        (self.memory_limit as f64 * self.target_fraction) as u64
    }

    /// Checks that the configuration can drive a cache.
    pub fn validate(&self) -> Result<(), CacheError> {
        if !(self.target_fraction > 0.0 && self.target_fraction <= 1.0) {
            return Err(CacheError::InvalidConfig(format!(
                "target_fraction must be in (0, 1], got {}",
                self.target_fraction
            )));
        }
        if self.load_queue_capacity == 0 || self.unload_queue_capacity == 0 {
            return Err(CacheError::InvalidConfig(
                "queue capacities must be at least 1".to_string(),
            ));
        }
        if self.load_workers == 0 {
            return Err(CacheError::InvalidConfig(
                "at least one load worker is required".to_string(),
            ));
        }
        if self.max_tracked == 0 {
            return Err(CacheError::InvalidConfig(
                "max_tracked must be at least 1".to_string(),
            ));
        }
        if self.monitor_period_ms == 0 {
            return Err(CacheError::InvalidConfig(
                "monitor_period_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn duration_to_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = CacheConfig::default();
        assert_eq!(config.memory_limit, 512 * 1024 * 1024);
        assert_eq!(config.debounce(), Duration::from_secs(5));
        assert_eq!(config.monitor_period(), Duration::from_secs(10));
        assert_eq!(config.load_queue_capacity, 100);
        assert_eq!(config.unload_queue_capacity, 100);
        assert_eq!(config.max_tracked, 50);
        assert_eq!(config.target_bytes(), (512.0 * 1024.0 * 1024.0 * 0.8) as u64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builders_override_fields() {
        let config = CacheConfig::default()
            .with_memory_limit(1_000)
            .with_target_fraction(0.5)
            .with_debounce(Duration::from_millis(20))
            .with_load_workers(3);

        assert_eq!(config.memory_limit, 1_000);
        assert_eq!(config.target_bytes(), 500);
        assert_eq!(config.debounce_ms, 20);
        assert_eq!(config.load_workers, 3);
    }

    #[test]
    fn invalid_values_are_rejected() {
        for config in [
            CacheConfig::default().with_target_fraction(0.0),
            CacheConfig::default().with_target_fraction(1.5),
            CacheConfig::default().with_target_fraction(f64::NAN),
            CacheConfig::default().with_load_queue_capacity(0),
            CacheConfig::default().with_unload_queue_capacity(0),
            CacheConfig::default().with_load_workers(0),
            CacheConfig::default().with_max_tracked(0),
        ] {
            assert!(
                matches!(config.validate(), Err(CacheError::InvalidConfig(_))),
                "{config:?} should be rejected"
            );
        }
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: CacheConfig = toml::from_str(
            r#"
            memory_limit = 4096
            debounce_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.memory_limit, 4096);
        assert_eq!(config.debounce(), Duration::from_millis(250));
        assert_eq!(config.max_tracked, 50);
        assert_eq!(config.target_fraction, 0.8);
    }
}
