//! Scorecard - dependency-graph orchestration for LLM-backed content scoring.
//!
//! A scorecard evaluates one content item (e.g. a transcript) against a
//! named set of classification tasks ("scores"). Scores may depend on each
//! other, optionally gated by conditions on upstream result values; the
//! engine runs independent subtrees concurrently, prunes gated subtrees by
//! skipping, surfaces cooperative pause signals without losing completed
//! work, and aggregates usage and cost across every prediction.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, ports, and errors - no I/O
//! - **Service Layer** (`services`): graph building, condition evaluation,
//!   the ready-queue scheduler, cost aggregation, and the `Scorecard` facade
//! - **Adapters** (`adapters`): in-memory registry and a mock predictor
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use scorecard::adapters::{InMemoryScoreRegistry, MockPredictor};
//! use scorecard::{RunOptions, Scorecard, ScoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let registry = Arc::new(InMemoryScoreRegistry::new());
//!     registry
//!         .register(ScoreConfig::new("intent"), Arc::new(MockPredictor::new()))
//!         .await?;
//!
//!     let card = Scorecard::new("support-qa", registry);
//!     let report = card
//!         .score("transcript text", &["intent".to_string()], RunOptions::default())
//!         .await?;
//!     println!("{} scores finished", report.outcomes.len());
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod domain;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    Condition, ConditionOperator, ConditionSpec, ConditionValue, DependsOn, Prediction,
    ScoreConfig, ScoreGraph, ScoreNode, ScoreOutcome, ScoreResult, SkipReason, UsageRecord,
    CODE_EXECUTION_FAILED, CODE_SCORE_DISABLED, CODE_SCORE_NOT_FOUND,
};
pub use domain::ports::{
    MetricDimensions, MetricsSink, NullMetricsSink, PredictionInput, RegisteredScore,
    ScoreAttribution, ScorePredictor, ScoreRegistry,
};
pub use services::{
    CostTotals, CostTracker, ErrorPolicy, GraphBuilder, ReadyQueueScheduler, RunError,
    RunOptions, RunReport, Scorecard,
};
