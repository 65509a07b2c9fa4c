//! In-memory score registry adapter.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::ScoreConfig;
use crate::domain::ports::{RegisteredScore, ScorePredictor, ScoreRegistry};

#[derive(Debug, Default)]
struct Inner {
    order: Vec<String>,
    scores: HashMap<String, RegisteredScore>,
}

/// Registry backed by process memory.
///
/// Registrations are append-only for the lifetime of the instance:
/// re-registering a name is an error rather than a silent replacement.
#[derive(Debug, Default)]
pub struct InMemoryScoreRegistry {
    inner: RwLock<Inner>,
}

impl InMemoryScoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a score under its configured name.
    pub async fn register(
        &self,
        config: ScoreConfig,
        predictor: Arc<dyn ScorePredictor>,
    ) -> DomainResult<()> {
        let mut inner = self.inner.write().await;
        let name = config.name.clone();
        if inner.scores.contains_key(&name) {
            return Err(DomainError::DuplicateScore(name));
        }
        inner.order.push(name.clone());
        inner.scores.insert(name, RegisteredScore { config, predictor });
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.order.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.order.is_empty()
    }
}

#[async_trait]
impl ScoreRegistry for InMemoryScoreRegistry {
    async fn get(&self, name: &str) -> DomainResult<Option<RegisteredScore>> {
        Ok(self.inner.read().await.scores.get(name).cloned())
    }

    async fn all_configs(&self) -> DomainResult<Vec<ScoreConfig>> {
        let inner = self.inner.read().await;
        Ok(inner
            .order
            .iter()
            .filter_map(|name| inner.scores.get(name))
            .map(|registration| registration.config.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock_predictor::MockPredictor;

    #[tokio::test]
    async fn test_register_and_get() {
        let registry = InMemoryScoreRegistry::new();
        let predictor = Arc::new(MockPredictor::new());

        registry
            .register(ScoreConfig::new("intent"), predictor.clone())
            .await
            .unwrap();

        assert!(registry.get("intent").await.unwrap().is_some());
        assert!(registry.get("missing").await.unwrap().is_none());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_registration_is_rejected() {
        let registry = InMemoryScoreRegistry::new();
        let predictor = Arc::new(MockPredictor::new());

        registry
            .register(ScoreConfig::new("intent"), predictor.clone())
            .await
            .unwrap();
        let result = registry
            .register(ScoreConfig::new("intent"), predictor)
            .await;

        assert!(matches!(result, Err(DomainError::DuplicateScore(_))));
    }

    #[tokio::test]
    async fn test_all_configs_preserves_registration_order() {
        let registry = InMemoryScoreRegistry::new();
        let predictor = Arc::new(MockPredictor::new());

        for name in ["c", "a", "b"] {
            registry
                .register(ScoreConfig::new(name), predictor.clone())
                .await
                .unwrap();
        }

        let names: Vec<String> = registry
            .all_configs()
            .await
            .unwrap()
            .into_iter()
            .map(|config| config.name)
            .collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }
}
