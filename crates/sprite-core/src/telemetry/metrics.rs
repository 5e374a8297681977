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

//! Abstract definitions for metrics.

use std::fmt::{self, Display};
use std::time::Instant;

/// A structured identifier for a metric: a namespace and a name.
///
/// Cache metrics live in the `assets` namespace, e.g. `assets:loads_total`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetricId {
    /// The broad category of the metric (e.g., "assets").
    pub namespace: String,
    /// The specific name of the metric (e.g., "evictions_total").
    pub name: String,
}

impl MetricId {
    /// Creates a new `MetricId`.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

/// The fundamental type of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    /// A value that only ever increases.
    Counter,
    /// A value that can go up or down.
    Gauge,
    /// A distribution of measurements across fixed buckets.
    Histogram,
}

/// The current value of a metric.
#[derive(Debug, Clone)]
pub enum MetricValue {
    /// Counter value.
    Counter(u64),
    /// Gauge value.
    Gauge(f64),
    /// Histogram samples and per-bucket counts.
    Histogram {
        /// The raw samples recorded.
        samples: Vec<f64>,
        /// The upper bounds of the buckets.
        bucket_bounds: Vec<f64>,
        /// The number of samples at or below each bound.
        bucket_counts: Vec<u64>,
    },
}

impl MetricValue {
    /// Returns the [`MetricType`] corresponding to this value.
    pub fn metric_type(&self) -> MetricType {
        match self {
            MetricValue::Counter(_) => MetricType::Counter,
            MetricValue::Gauge(_) => MetricType::Gauge,
            MetricValue::Histogram { .. } => MetricType::Histogram,
        }
    }

    /// Returns the value as a `u64` if it is a `Counter`.
    pub fn as_counter(&self) -> Option<u64> {
        match self {
            MetricValue::Counter(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as an `f64` if it is a `Gauge`.
    pub fn as_gauge(&self) -> Option<f64> {
        match self {
            MetricValue::Gauge(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the number of samples if it is a `Histogram`.
    pub fn sample_count(&self) -> Option<usize> {
        match self {
            MetricValue::Histogram { samples, .. } => Some(samples.len()),
            _ => None,
        }
    }
}

/// A metric entry: descriptive metadata plus its current value.
#[derive(Debug, Clone)]
pub struct Metric {
    /// The metric's identifier.
    pub id: MetricId,
    /// What the metric measures.
    pub description: String,
    /// The unit of measurement (e.g., "bytes", "ms").
    pub unit: String,
    /// When the metric was last written.
    pub last_updated: Instant,
    /// The current value.
    pub value: MetricValue,
}

impl Metric {
    fn new(
        id: MetricId,
        description: impl Into<String>,
        unit: impl Into<String>,
        value: MetricValue,
    ) -> Self {
        Self {
            id,
            description: description.into(),
            unit: unit.into(),
            last_updated: Instant::now(),
            value,
        }
    }

    /// Creates a counter starting at zero.
    pub fn new_counter(id: MetricId, description: impl Into<String>) -> Self {
        Self::new(id, description, "count", MetricValue::Counter(0))
    }

    /// Creates a gauge starting at zero.
    pub fn new_gauge(id: MetricId, description: impl Into<String>, unit: impl Into<String>) -> Self {
        Self::new(id, description, unit, MetricValue::Gauge(0.0))
    }

    /// Creates an empty histogram with the given bucket upper bounds.
    pub fn new_histogram(
        id: MetricId,
        description: impl Into<String>,
        unit: impl Into<String>,
        bucket_bounds: Vec<f64>,
    ) -> Self {
        let bucket_counts = vec![0; bucket_bounds.len()];
        Self::new(
            id,
            description,
            unit,
            MetricValue::Histogram {
                samples: Vec::new(),
                bucket_bounds,
                bucket_counts,
            },
        )
    }

    /// Marks the metric as written now.
    pub fn touch(&mut self) {
        self.last_updated = Instant::now();
    }
}

/// A specialized `Result` type for metric operations.
pub type MetricsResult<T> = Result<T, MetricsError>;

/// An error that can occur within the metrics system.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricsError {
    /// The requested metric was not registered.
    MetricNotFound(MetricId),
    /// An operation was attempted on a metric of the wrong type.
    TypeMismatch {
        /// The type the operation needed.
        expected: MetricType,
        /// The type that was found.
        found: MetricType,
    },
    /// The backend failed to store or read the metric.
    StorageError(String),
}

impl Display for MetricsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricsError::MetricNotFound(id) => write!(f, "Metric not found: {id}"),
            MetricsError::TypeMismatch { expected, found } => {
                write!(f, "Type mismatch: expected {expected:?}, found {found:?}")
            }
            MetricsError::StorageError(msg) => write!(f, "Storage error: {msg}"),
        }
    }
}

impl std::error::Error for MetricsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_id_display() {
        let id = MetricId::new("assets", "evictions_total");
        assert_eq!(id.to_string(), "assets:evictions_total");
    }

    #[test]
    fn constructors_set_types_and_units() {
        let counter = Metric::new_counter(MetricId::new("assets", "loads_total"), "loads");
        assert_eq!(counter.value.metric_type(), MetricType::Counter);
        assert_eq!(counter.unit, "count");
        assert_eq!(counter.value.as_counter(), Some(0));

        let gauge = Metric::new_gauge(MetricId::new("assets", "memory_used"), "bytes", "bytes");
        assert_eq!(gauge.value.as_gauge(), Some(0.0));
        assert_eq!(gauge.value.as_counter(), None);

        let histogram = Metric::new_histogram(
            MetricId::new("assets", "load_time"),
            "load time",
            "ms",
            vec![1.0, 10.0],
        );
        assert_eq!(histogram.value.sample_count(), Some(0));
    }
}
