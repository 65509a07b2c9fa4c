//! Service layer: graph construction, condition evaluation, scheduling,
//! cost aggregation, and the scorecard facade.

pub mod conditions;
pub mod cost_tracker;
pub mod graph_builder;
pub mod scheduler;
pub mod scorecard;

pub use conditions::conditions_satisfied;
pub use cost_tracker::{CostTotals, CostTracker};
pub use graph_builder::GraphBuilder;
pub use scheduler::{ErrorPolicy, ExecuteFuture, ReadyQueueScheduler, RunError, RunOptions};
pub use scorecard::{RunReport, Scorecard};
