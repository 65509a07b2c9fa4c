//! Mock predictor for testing.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Prediction, ScoreResult, UsageRecord};
use crate::domain::ports::{PredictionInput, ScorePredictor};

/// Scripted behavior for one prediction.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    Complete { value: Value, usage: UsageRecord },
    Decline { reason: String },
    Pause { token: String },
    Fail { message: String },
}

impl MockBehavior {
    pub fn complete(value: impl Into<Value>) -> Self {
        Self::Complete {
            value: value.into(),
            usage: UsageRecord::default(),
        }
    }

    pub fn complete_with_usage(value: impl Into<Value>, usage: UsageRecord) -> Self {
        Self::Complete {
            value: value.into(),
            usage,
        }
    }
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self::complete("ok")
    }
}

/// Mock predictor with a default behavior and per-score overrides.
///
/// One instance can back every score in a test registry; overrides are
/// keyed by score name. Received inputs are recorded for assertions.
#[derive(Debug, Default)]
pub struct MockPredictor {
    default_behavior: MockBehavior,
    overrides: RwLock<HashMap<String, MockBehavior>>,
    received: RwLock<Vec<PredictionInput>>,
    delay: Option<Duration>,
}

impl MockPredictor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn completing(value: impl Into<Value>) -> Self {
        Self {
            default_behavior: MockBehavior::complete(value),
            ..Self::default()
        }
    }

    pub fn with_default(behavior: MockBehavior) -> Self {
        Self {
            default_behavior: behavior,
            ..Self::default()
        }
    }

    /// Sleep this long before answering, to exercise overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Script a behavior for a specific score name.
    pub async fn set_behavior(&self, score_name: impl Into<String>, behavior: MockBehavior) {
        self.overrides
            .write()
            .await
            .insert(score_name.into(), behavior);
    }

    /// Every input this predictor has received, in arrival order.
    pub async fn received(&self) -> Vec<PredictionInput> {
        self.received.read().await.clone()
    }

    async fn behavior_for(&self, score_name: &str) -> MockBehavior {
        self.overrides
            .read()
            .await
            .get(score_name)
            .cloned()
            .unwrap_or_else(|| self.default_behavior.clone())
    }
}

#[async_trait]
impl ScorePredictor for MockPredictor {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn predict(&self, input: PredictionInput) -> DomainResult<Prediction> {
        self.received.write().await.push(input.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.behavior_for(&input.config.name).await {
            MockBehavior::Complete { value, usage } => Ok(Prediction::Completed {
                result: ScoreResult::new(value).with_usage(usage),
            }),
            MockBehavior::Decline { reason } => Ok(Prediction::Skipped { reason }),
            MockBehavior::Pause { token } => Ok(Prediction::Paused { token }),
            MockBehavior::Fail { message } => Err(DomainError::PredictionFailed(message)),
        }
    }
}
