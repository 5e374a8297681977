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

//! Budget-driven eviction.

use crate::cache::AssetCache;
use crate::metrics::bump;
use crate::registry::Registry;
use crossbeam_channel::{select, tick, Receiver};
use sprite_core::asset::{AssetId, ResourceLoader};

/// Outcome of one budget pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetReport {
    /// Usage when the pass started.
    pub memory_before: u64,
    /// Usage once the selected assets were taken out of the budget.
    pub memory_after: u64,
    /// The configured limit.
    pub memory_limit: u64,
    /// The usage the pass evicts down to.
    pub target: u64,
    /// Assets unloaded by this pass, least recently used first.
    pub evicted: Vec<AssetId>,
    /// Whether usage ended at or below the target. Always `true` when the
    /// limit was not exceeded to begin with.
    pub target_met: bool,
}

impl BudgetReport {
    /// Returns `true` if the pass had to evict anything.
    pub fn evicted_any(&self) -> bool {
        !self.evicted.is_empty()
    }
}

impl<L: ResourceLoader> AssetCache<L> {
    /// Runs one budget pass now.
    ///
    /// If usage exceeds the limit, unreferenced non-critical loaded assets are
    /// unloaded from least to most recently used, skipping the debounce, until
    /// usage is at or below `target_fraction * memory_limit`. Assets that fell
    /// out of the recency list are not considered. Missing the target is
    /// logged and counted, never fatal.
    pub fn run_budget_pass(&self) -> BudgetReport {
        let limit = self.shared.config.memory_limit;
        let target = self.shared.config.target_bytes();

        let (memory_before, memory_after, victims) = {
            let mut registry = self.write();
            let memory_before = registry.memory_used;
            if memory_before <= limit {
                return BudgetReport {
                    memory_before,
                    memory_after: memory_before,
                    memory_limit: limit,
                    target,
                    evicted: Vec::new(),
                    target_met: true,
                };
            }

            let Registry {
                entries,
                recency,
                memory_used,
                ..
            } = &mut *registry;

            let mut victims = Vec::new();
            for id in recency.iter_lru() {
                if *memory_used <= target {
                    break;
                }
                let Some(entry) = entries.get_mut(id) else {
                    continue;
                };
                if !entry.is_evictable() {
                    continue;
                }
                if let Some((resource, size)) = entry.begin_unload() {
                    *memory_used = memory_used.saturating_sub(size);
                    victims.push((id.clone(), resource));
                }
            }

            let memory_after = registry.memory_used;
            self.shared.metrics.record_memory(memory_after);
            (memory_before, memory_after, victims)
        };

        let evicted: Vec<AssetId> = victims.iter().map(|(id, _)| id.clone()).collect();
        for id in &evicted {
            bump(&self.shared.metrics.evictions_total);
            log::debug!("AssetCache: Evicting '{}' to meet the memory budget", id);
        }
        self.unload_entries(victims);

        let target_met = memory_after <= target;
        if target_met {
            log::info!(
                "AssetCache: Budget pass evicted {} assets ({} -> {} bytes)",
                evicted.len(),
                memory_before,
                memory_after
            );
        } else {
            bump(&self.shared.metrics.budget_exceeded_total);
            log::warn!(
                "AssetCache: Budget exceeded, {} bytes in use after evicting {} assets (limit {}, target {})",
                memory_after,
                evicted.len(),
                limit,
                target
            );
        }

        BudgetReport {
            memory_before,
            memory_after,
            memory_limit: limit,
            target,
            evicted,
            target_met,
        }
    }

    pub(crate) fn run_budget_monitor(&self, shutdown: &Receiver<()>) {
        log::debug!("AssetCache: Budget monitor started");
        let ticker = tick(self.shared.config.monitor_period());
        loop {
            select! {
                recv(shutdown) -> _ => break,
                recv(ticker) -> _ => {
                    let report = self.run_budget_pass();
                    log::trace!("AssetCache: Budget pass {:?}", report);
                }
            }
        }
        log::debug!("AssetCache: Budget monitor stopped");
    }
}
