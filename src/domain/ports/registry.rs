//! Registry port - maps score names to executable registrations.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::ScoreConfig;

use super::predictor::ScorePredictor;

/// A score's registration: its static configuration plus the predictor
/// that executes it.
#[derive(Clone)]
pub struct RegisteredScore {
    pub config: ScoreConfig,
    pub predictor: Arc<dyn ScorePredictor>,
}

impl std::fmt::Debug for RegisteredScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredScore")
            .field("config", &self.config)
            .field("predictor", &self.predictor.name())
            .finish()
    }
}

/// Trait for score registries.
///
/// Registries are explicit objects passed into the scorecard; there is no
/// process-wide ambient registry. Whether registrations are append-only is
/// an implementation decision of the adapter.
#[async_trait]
pub trait ScoreRegistry: Send + Sync {
    /// Look up a registration by score name.
    async fn get(&self, name: &str) -> DomainResult<Option<RegisteredScore>>;

    /// All known score configurations, used to resolve dependency names
    /// that may fall outside a requested subset.
    async fn all_configs(&self) -> DomainResult<Vec<ScoreConfig>>;
}
