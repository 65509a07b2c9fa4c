//! Adapters: concrete implementations of the domain ports.

pub mod mock_predictor;
pub mod registry;

pub use mock_predictor::{MockBehavior, MockPredictor};
pub use registry::InMemoryScoreRegistry;
