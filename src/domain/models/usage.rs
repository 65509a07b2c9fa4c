//! Per-prediction usage accounting.

use serde::{Deserialize, Serialize};

/// Token and cost usage reported by a single prediction.
///
/// Costs are USD. All fields are additive into [`CostTotals`]
/// (`crate::services::CostTotals`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub cached_tokens: u64,
    /// Number of external LLM calls made for this prediction.
    #[serde(default)]
    pub llm_calls: u64,
    #[serde(default)]
    pub input_cost: f64,
    #[serde(default)]
    pub output_cost: f64,
    #[serde(default)]
    pub total_cost: f64,
}

impl UsageRecord {
    /// A single-call usage record with token counts and costs.
    pub fn single_call(
        prompt_tokens: u64,
        completion_tokens: u64,
        input_cost: f64,
        output_cost: f64,
    ) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            cached_tokens: 0,
            llm_calls: 1,
            input_cost,
            output_cost,
            total_cost: input_cost + output_cost,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_call_totals() {
        let usage = UsageRecord::single_call(1_000, 200, 0.003, 0.015);
        assert_eq!(usage.llm_calls, 1);
        assert!((usage.total_cost - 0.018).abs() < 1e-9);
    }

    #[test]
    fn test_default_is_empty() {
        assert!(UsageRecord::default().is_empty());
        assert!(!UsageRecord::single_call(1, 0, 0.0, 0.0).is_empty());
    }
}
