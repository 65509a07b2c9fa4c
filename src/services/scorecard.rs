//! The scorecard facade: the long-lived owner of runs against one registry.
//!
//! A `Scorecard` resolves requested score names through its registry,
//! expands them to their dependency closure, builds the run graph, seeds
//! degraded placeholders for unregistered or disabled scores, and drives
//! the ready-queue scheduler. Usage is folded into run and lifetime totals
//! and emitted to the metrics sink as each score completes.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::domain::models::{
    synthesize_id, Prediction, ScoreOutcome, ScoreResult, CODE_SCORE_DISABLED,
    CODE_SCORE_NOT_FOUND,
};
use crate::domain::ports::{
    MetricDimensions, MetricsSink, NullMetricsSink, PredictionInput, RegisteredScore,
    ScoreAttribution, ScoreRegistry,
};
use crate::services::cost_tracker::{CostTotals, CostTracker};
use crate::services::graph_builder::GraphBuilder;
use crate::services::scheduler::{ExecuteFuture, ReadyQueueScheduler, RunError, RunOptions};

/// Everything a caller gets back from one completed scoring run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    /// Terminal outcome for every score that reached one.
    pub outcomes: HashMap<String, ScoreOutcome>,
    /// Usage accumulated by this run alone.
    pub usage: CostTotals,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Long-lived scoring facade. Reusable across items; lifetime cost totals
/// accumulate for as long as the instance lives.
pub struct Scorecard {
    owner_id: String,
    owner_name: String,
    modality: String,
    environment: String,
    registry: Arc<dyn ScoreRegistry>,
    metrics: Arc<dyn MetricsSink>,
    lifetime: CostTracker,
}

impl Scorecard {
    pub fn new(owner_name: impl Into<String>, registry: Arc<dyn ScoreRegistry>) -> Self {
        Self {
            owner_id: Uuid::new_v4().to_string(),
            owner_name: owner_name.into(),
            modality: "transcript".to_string(),
            environment: "development".to_string(),
            registry,
            metrics: Arc::new(NullMetricsSink::new()),
            lifetime: CostTracker::new(),
        }
    }

    pub fn with_owner_id(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = owner_id.into();
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_modality(mut self, modality: impl Into<String>) -> Self {
        self.modality = modality.into();
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    /// Lifetime totals across every run this instance has performed.
    pub async fn lifetime_totals(&self) -> CostTotals {
        self.lifetime.totals().await
    }

    /// Score one content item against the requested scores and their
    /// transitive dependencies.
    pub async fn score(
        &self,
        item: &str,
        requested: &[String],
        options: RunOptions,
    ) -> Result<RunReport, RunError> {
        self.score_seeded(item, requested, HashMap::new(), options)
            .await
    }

    /// Score with prior outcomes seeded in, the resume path after a
    /// suspension. Seeded scores are not re-executed; paused placeholders
    /// in the seed are dropped so those scores run again.
    #[instrument(skip_all, fields(owner = %self.owner_name, requested = requested.len()))]
    pub async fn score_seeded(
        &self,
        item: &str,
        requested: &[String],
        seeds: HashMap<String, ScoreOutcome>,
        options: RunOptions,
    ) -> Result<RunReport, RunError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        let all_configs = self.registry.all_configs().await.map_err(RunError::Setup)?;
        let known: HashSet<&str> = all_configs.iter().map(|c| c.name.as_str()).collect();

        let mut seeds = seeds;
        seeds.retain(|id, outcome| {
            if outcome.is_paused() {
                debug!(score_id = %id, "dropping paused seed so the score is retried");
                false
            } else {
                true
            }
        });

        // Requested names with no configuration degrade in place; their
        // siblings still run.
        let mut subset: Vec<String> = Vec::new();
        let mut seen_requests: HashSet<&str> = HashSet::new();
        for name in requested {
            if !seen_requests.insert(name.as_str()) {
                continue;
            }
            if known.contains(name.as_str()) {
                subset.push(name.clone());
            } else {
                warn!(score = %name, "requested score is not registered");
                seeds.insert(
                    synthesize_id(name),
                    ScoreOutcome::errored(
                        CODE_SCORE_NOT_FOUND,
                        format!("no registered score named '{name}'"),
                    ),
                );
            }
        }

        let expanded = GraphBuilder::expand_subset(&all_configs, &subset);
        let (graph, _name_to_id) = GraphBuilder::build(&all_configs, &expanded)?;

        // Resolve an executable registration per node. Disabled scores are
        // seeded as degraded outcomes and never dispatched; their
        // dependents are gated exactly as if a condition had failed.
        let mut registrations: HashMap<String, RegisteredScore> = HashMap::new();
        for node in graph.nodes_in_order() {
            match self
                .registry
                .get(&node.name)
                .await
                .map_err(RunError::Setup)?
            {
                Some(registration) if registration.config.disabled => {
                    debug!(score = %node.name, "score disabled, seeding degraded outcome");
                    seeds.entry(node.id.clone()).or_insert_with(|| {
                        ScoreOutcome::errored(
                            CODE_SCORE_DISABLED,
                            format!("score '{}' is disabled", node.name),
                        )
                    });
                }
                Some(registration) => {
                    registrations.insert(node.id.clone(), registration);
                }
                None => {
                    warn!(score = %node.name, "score has configuration but no registration");
                    seeds.entry(node.id.clone()).or_insert_with(|| {
                        ScoreOutcome::errored(
                            CODE_SCORE_NOT_FOUND,
                            format!("no registered score named '{}'", node.name),
                        )
                    });
                }
            }
        }

        let run_costs = CostTracker::new();
        let context = Arc::new(ExecuteContext {
            item: Arc::from(item),
            registrations,
            id_to_name: graph.id_to_name(),
            run_costs: run_costs.clone(),
            lifetime: self.lifetime.clone(),
            metrics: self.metrics.clone(),
            owner_id: self.owner_id.clone(),
            owner_name: self.owner_name.clone(),
            modality: self.modality.clone(),
            environment: self.environment.clone(),
        });

        let scheduler = ReadyQueueScheduler::new(options);
        let outcomes = scheduler
            .run(&graph, seeds, move |score_id, dep_results| {
                context.clone().execute(score_id, dep_results)
            })
            .await?;

        // One item per completed run: a suspend/resume pair counts once,
        // on the resuming run.
        run_costs.record_item().await;
        self.lifetime.record_item().await;

        Ok(RunReport {
            run_id,
            outcomes,
            usage: run_costs.totals().await,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

impl std::fmt::Debug for Scorecard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scorecard")
            .field("owner_id", &self.owner_id)
            .field("owner_name", &self.owner_name)
            .field("modality", &self.modality)
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}

/// Shared state captured by the scheduler's execute callback.
struct ExecuteContext {
    item: Arc<str>,
    registrations: HashMap<String, RegisteredScore>,
    id_to_name: HashMap<String, String>,
    run_costs: CostTracker,
    lifetime: CostTracker,
    metrics: Arc<dyn MetricsSink>,
    owner_id: String,
    owner_name: String,
    modality: String,
    environment: String,
}

impl ExecuteContext {
    fn execute(
        self: Arc<Self>,
        score_id: String,
        dep_results: HashMap<String, ScoreResult>,
    ) -> ExecuteFuture {
        Box::pin(async move {
            let Some(registration) = self.registrations.get(&score_id) else {
                // Unregistered nodes are seeded before scheduling; reaching
                // here means the seed was lost, which is a bug upstream.
                return Err(crate::domain::errors::DomainError::ScoreNotFound(score_id));
            };

            // Dependency results travel by id inside the scheduler but
            // predictors see dependency names.
            let dependency_results: HashMap<String, ScoreResult> = dep_results
                .into_iter()
                .map(|(dep_id, result)| {
                    let name = self
                        .id_to_name
                        .get(&dep_id)
                        .cloned()
                        .unwrap_or_else(|| dep_id.clone());
                    (name, result)
                })
                .collect();

            let input = PredictionInput {
                item: self.item.clone(),
                config: registration.config.clone(),
                dependency_results,
                attribution: ScoreAttribution {
                    owner_name: self.owner_name.clone(),
                    score_name: registration.config.name.clone(),
                },
            };

            let prediction = registration.predictor.predict(input).await?;

            if let Prediction::Completed { result } = &prediction {
                self.run_costs.record_usage(&result.usage).await;
                self.lifetime.record_usage(&result.usage).await;
                self.metrics.record_usage(
                    &MetricDimensions {
                        owner_id: self.owner_id.clone(),
                        owner_name: self.owner_name.clone(),
                        score_name: registration.config.name.clone(),
                        score_id: score_id.clone(),
                        modality: self.modality.clone(),
                        environment: self.environment.clone(),
                    },
                    &result.usage,
                );
            }

            Ok(prediction)
        })
    }
}
