//! Metrics port - per-score usage emission to a telemetry collaborator.

use crate::domain::models::UsageRecord;

/// Dimension tags attached to every usage emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDimensions {
    pub owner_id: String,
    pub owner_name: String,
    pub score_name: String,
    pub score_id: String,
    /// Content modality being scored, e.g. `transcript`.
    pub modality: String,
    /// Deployment environment, e.g. `development` or `production`.
    pub environment: String,
}

/// Trait for telemetry sinks.
///
/// Called after each score completes. Transport is external; emissions are
/// fire-and-forget and must never block the scheduler.
pub trait MetricsSink: Send + Sync {
    fn record_usage(&self, dimensions: &MetricDimensions, usage: &UsageRecord);
}

/// A no-op metrics sink for callers that do not ship telemetry.
#[derive(Debug, Clone, Default)]
pub struct NullMetricsSink;

impl NullMetricsSink {
    pub fn new() -> Self {
        Self
    }
}

impl MetricsSink for NullMetricsSink {
    fn record_usage(&self, _dimensions: &MetricDimensions, _usage: &UsageRecord) {}
}
