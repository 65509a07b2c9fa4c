//! Domain errors for the scorecard system.

use thiserror::Error;

/// Format a cycle path as a human-readable string: `a -> b -> c -> a`.
fn format_cycle_path(path: &[String]) -> String {
    path.join(" -> ")
}

/// Domain-level errors that can occur while building or running a score graph.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("score not found: {0}")]
    ScoreNotFound(String),

    #[error("score disabled: {0}")]
    ScoreDisabled(String),

    #[error("score already registered: {0}")]
    DuplicateScore(String),

    #[error("score dependency cycle detected: {}", format_cycle_path(.0))]
    DependencyCycle(Vec<String>),

    #[error("prediction failed: {0}")]
    PredictionFailed(String),

    #[error("registry error: {0}")]
    Registry(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_error_formats_path() {
        let err = DomainError::DependencyCycle(vec![
            "a".to_string(),
            "b".to_string(),
            "a".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "score dependency cycle detected: a -> b -> a"
        );
    }
}
