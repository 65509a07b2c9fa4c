//! Terminal outcomes for scores in a run.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::usage::UsageRecord;

/// Degraded-outcome code for a requested score with no registration.
pub const CODE_SCORE_NOT_FOUND: &str = "score_not_found";
/// Degraded-outcome code for an administratively disabled score.
pub const CODE_SCORE_DISABLED: &str = "score_disabled";
/// Degraded-outcome code for a prediction that failed under
/// `ErrorPolicy::ContinueDegraded`.
pub const CODE_EXECUTION_FAILED: &str = "score_execution_failed";

/// The payload of a completed score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// The classification value downstream conditions are evaluated against.
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default)]
    pub usage: UsageRecord,
}

impl ScoreResult {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            explanation: None,
            usage: UsageRecord::default(),
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    pub fn with_usage(mut self, usage: UsageRecord) -> Self {
        self.usage = usage;
        self
    }

    /// String form of the result value, used for condition comparison.
    /// JSON strings are taken verbatim; other values are stringified.
    pub fn value_as_string(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Why a score was skipped instead of executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// One or more dependency conditions evaluated unsatisfied.
    ConditionsUnsatisfied,
    /// The predictor itself declined to produce a result.
    PredictorDeclined { detail: String },
}

/// Terminal state of one score within a run's result map.
///
/// Entries are monotonic: once stored, an outcome is never overwritten or
/// removed for the duration of the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ScoreOutcome {
    Completed { result: ScoreResult },
    /// The skip sentinel. Carries no value; downstream conditions treat it
    /// as "dependency absent".
    Skipped { reason: SkipReason },
    /// Placeholder for a score awaiting an out-of-band continuation.
    Paused { token: String },
    /// Degraded placeholder: not found, disabled, or failed-but-continued.
    Errored { code: String, message: String },
}

impl ScoreOutcome {
    pub fn completed(result: ScoreResult) -> Self {
        Self::Completed { result }
    }

    pub fn errored(code: &str, message: impl Into<String>) -> Self {
        Self::Errored {
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// The completed result, if any. Skipped, paused, and errored outcomes
    /// carry no readable value.
    pub fn result(&self) -> Option<&ScoreResult> {
        match self {
            Self::Completed { result } => Some(result),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused { .. })
    }
}

/// The three-way return of a black-box prediction.
///
/// Suspension is modeled as data rather than an unwinding error so the
/// scheduler can branch on it explicitly.
#[derive(Debug, Clone, PartialEq)]
pub enum Prediction {
    Completed { result: ScoreResult },
    Skipped { reason: String },
    /// The prediction cannot complete now; its result will arrive
    /// asynchronously under the given continuation token.
    Paused { token: String },
}
