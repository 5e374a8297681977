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

use sprite_core::telemetry::{Metric, MetricId, MetricType, MetricValue, MetricsError, MetricsResult};
use std::fmt::Debug;

/// Trait defining the interface for metrics storage backends.
///
/// Updates go through [`MetricsBackend::update_metric`], which must apply the
/// closure atomically with respect to other updates of the same metric. The
/// cache bumps counters from several worker threads at once, so a
/// read-modify-write split across two calls would lose increments.
pub trait MetricsBackend: Send + Sync + Debug + 'static {
    /// Stores a metric, replacing any existing metric with the same id.
    fn put_metric(&self, metric: Metric) -> MetricsResult<()>;

    /// Returns a copy of a metric.
    fn get_metric(&self, id: &MetricId) -> MetricsResult<Metric>;

    /// Applies `update` to the stored metric in place.
    fn update_metric(
        &self,
        id: &MetricId,
        update: &mut dyn FnMut(&mut Metric) -> MetricsResult<()>,
    ) -> MetricsResult<()>;

    /// Checks if a metric exists.
    fn contains_metric(&self, id: &MetricId) -> bool;

    /// Returns every stored metric.
    fn list_all_metrics(&self) -> Vec<Metric>;

    /// Number of stored metrics.
    fn metric_count(&self) -> usize;

    /// Increments a counter and returns the new value.
    fn increment_counter(&self, id: &MetricId, delta: u64) -> MetricsResult<u64> {
        let mut result = 0;
        self.update_metric(id, &mut |metric: &mut Metric| match metric.value {
            MetricValue::Counter(ref mut value) => {
                *value = value.saturating_add(delta);
                result = *value;
                metric.touch();
                Ok(())
            }
            _ => Err(MetricsError::TypeMismatch {
                expected: MetricType::Counter,
                found: metric.value.metric_type(),
            }),
        })?;
        Ok(result)
    }

    /// Sets a gauge value.
    fn set_gauge(&self, id: &MetricId, value: f64) -> MetricsResult<()> {
        self.update_metric(id, &mut |metric: &mut Metric| match metric.value {
            MetricValue::Gauge(ref mut gauge) => {
                *gauge = value;
                metric.touch();
                Ok(())
            }
            _ => Err(MetricsError::TypeMismatch {
                expected: MetricType::Gauge,
                found: metric.value.metric_type(),
            }),
        })
    }

    /// Adds a sample to a histogram.
    fn record_histogram_sample(&self, id: &MetricId, sample: f64) -> MetricsResult<()> {
        self.update_metric(id, &mut |metric: &mut Metric| match metric.value {
            MetricValue::Histogram {
                ref mut samples,
                ref bucket_bounds,
                ref mut bucket_counts,
            } => {
                samples.push(sample);
                for (count, &bound) in bucket_counts.iter_mut().zip(bucket_bounds) {
                    if sample <= bound {
                        *count += 1;
                    }
                }
                metric.touch();
                Ok(())
            }
            _ => Err(MetricsError::TypeMismatch {
                expected: MetricType::Histogram,
                found: metric.value.metric_type(),
            }),
        })
    }
}
