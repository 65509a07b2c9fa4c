//! Predictor port - interface for black-box score prediction backends.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Prediction, ScoreConfig, ScoreResult};

/// Identifying pair attached to every prediction for telemetry attribution
/// by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreAttribution {
    /// Name of the owning scorecard.
    pub owner_name: String,
    /// Name of the score being predicted.
    pub score_name: String,
}

/// Everything a predictor receives for one invocation.
#[derive(Debug, Clone)]
pub struct PredictionInput {
    /// The content item under scoring (e.g. a transcript).
    pub item: Arc<str>,
    /// Static configuration of the score being predicted.
    pub config: ScoreConfig,
    /// Completed results of this score's dependencies, keyed by dependency
    /// name. Skipped dependencies carry no payload and are absent.
    pub dependency_results: HashMap<String, ScoreResult>,
    pub attribution: ScoreAttribution,
}

/// Trait for score prediction backends.
///
/// A predictor is the expensive external collaborator (typically an LLM
/// call) behind one score. The core treats it as opaque: it either
/// completes with a typed result, declines, pauses for an out-of-band
/// continuation, or fails.
#[async_trait]
pub trait ScorePredictor: Send + Sync {
    /// Predictor type name, for logging.
    fn name(&self) -> &'static str;

    /// Run one prediction to a three-way outcome.
    async fn predict(&self, input: PredictionInput) -> DomainResult<Prediction>;
}
