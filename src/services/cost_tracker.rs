//! Run- and lifetime-scoped cost aggregation.
//!
//! Totals are purely additive: every completed prediction's usage record is
//! folded in once, on the completion transition, and never decremented. The
//! cost-per-item figure is not stored - it is recomputed on read from the
//! total cost and the number of items scored so far.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::domain::models::UsageRecord;

/// Accumulated usage and cost across the scores of one or more runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CostTotals {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub cached_tokens: u64,
    pub llm_calls: u64,
    pub input_cost: f64,
    pub output_cost: f64,
    pub total_cost: f64,
    /// Number of top-level scoring runs, not individual scores.
    pub items_processed: u64,
}

impl CostTotals {
    /// Fold one prediction's usage into the totals.
    pub fn accumulate(&mut self, usage: &UsageRecord) {
        self.prompt_tokens += usage.prompt_tokens;
        self.completion_tokens += usage.completion_tokens;
        self.cached_tokens += usage.cached_tokens;
        self.llm_calls += usage.llm_calls;
        self.input_cost += usage.input_cost;
        self.output_cost += usage.output_cost;
        self.total_cost += usage.total_cost;
    }

    /// Count one top-level scoring run.
    pub fn record_item(&mut self) {
        self.items_processed += 1;
    }

    /// Average cost per scored item, zero when nothing has been scored.
    pub fn cost_per_item(&self) -> f64 {
        if self.items_processed == 0 {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            {
                self.total_cost / self.items_processed as f64
            }
        }
    }
}

/// Shared accumulator for a long-lived scorecard instance.
///
/// Concurrent runs against the same instance may accumulate at the same
/// time, so the totals sit behind a lock rather than being mutated by the
/// scheduler directly.
#[derive(Debug, Clone, Default)]
pub struct CostTracker {
    totals: Arc<RwLock<CostTotals>>,
}

impl CostTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record_usage(&self, usage: &UsageRecord) {
        self.totals.write().await.accumulate(usage);
    }

    pub async fn record_item(&self) {
        self.totals.write().await.record_item();
    }

    /// Snapshot of the current totals.
    pub async fn totals(&self) -> CostTotals {
        self.totals.read().await.clone()
    }
}
