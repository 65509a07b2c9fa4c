//! Ports: interfaces to the external collaborators this core consumes.

pub mod metrics;
pub mod predictor;
pub mod registry;

pub use metrics::{MetricDimensions, MetricsSink, NullMetricsSink};
pub use predictor::{PredictionInput, ScoreAttribution, ScorePredictor};
pub use registry::{RegisteredScore, ScoreRegistry};
