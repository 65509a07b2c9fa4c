//! Domain models for score configuration, graphs, outcomes, and usage.

pub mod graph;
pub mod outcome;
pub mod score_config;
pub mod usage;

pub use graph::{ScoreGraph, ScoreNode};
pub use outcome::{
    Prediction, ScoreOutcome, ScoreResult, SkipReason, CODE_EXECUTION_FAILED,
    CODE_SCORE_DISABLED, CODE_SCORE_NOT_FOUND,
};
pub use score_config::{
    synthesize_id, Condition, ConditionOperator, ConditionSpec, ConditionValue, DependsOn,
    ScoreConfig,
};
pub use usage::UsageRecord;
