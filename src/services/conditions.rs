//! Condition evaluation for dependency edges.
//!
//! A score's conditions gate whether it executes or is skipped once all of
//! its dependencies have reached a terminal state. Comparison is always
//! against the string-normalized (trimmed, lower-cased) form of the
//! upstream result value; all conditions on a score must hold (AND).

use std::collections::HashMap;

use serde_json::Value;
use tracing::warn;

use crate::domain::models::{Condition, ConditionOperator, ScoreNode, ScoreOutcome};

/// Whether every condition attached to `node` is satisfied by the outcomes
/// recorded so far.
///
/// Only meaningful once each conditioned dependency has *some* entry in
/// `outcomes`; a missing entry reads as not-yet-determinable and therefore
/// unsatisfied. A skipped, paused, or errored upstream carries no value and
/// blocks any condition that reads it.
pub fn conditions_satisfied(node: &ScoreNode, outcomes: &HashMap<String, ScoreOutcome>) -> bool {
    if !node.has_conditions() {
        return true;
    }

    node.conditions.iter().all(|(dep_id, condition)| {
        let Some(outcome) = outcomes.get(dep_id) else {
            return false;
        };
        let Some(result) = outcome.result() else {
            return false;
        };
        evaluate(condition, &result.value_as_string())
    })
}

/// Evaluate one condition against the raw string form of an upstream value.
pub fn evaluate(condition: &Condition, actual: &str) -> bool {
    let actual = normalize(actual);

    match &condition.operator {
        ConditionOperator::Eq => condition
            .value
            .as_scalar()
            .is_some_and(|expected| normalize_value(expected) == actual),
        ConditionOperator::Ne => condition
            .value
            .as_scalar()
            .is_some_and(|expected| normalize_value(expected) != actual),
        ConditionOperator::In => condition
            .value
            .candidates()
            .iter()
            .any(|candidate| normalize_value(candidate) == actual),
        ConditionOperator::NotIn => !condition
            .value
            .candidates()
            .iter()
            .any(|candidate| normalize_value(candidate) == actual),
        ConditionOperator::Unknown(raw) => {
            warn!(operator = %raw, "unknown condition operator, treating as unsatisfied");
            false
        }
    }
}

fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn normalize_value(value: &Value) -> String {
    match value {
        Value::String(s) => normalize(s),
        other => normalize(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ConditionValue, ScoreResult, SkipReason};
    use serde_json::json;

    fn condition(operator: ConditionOperator, value: Value) -> Condition {
        let value = match value {
            Value::Array(items) => ConditionValue::Many(items),
            other => ConditionValue::One(other),
        };
        Condition::new(operator, value)
    }

    fn node_with_condition(dep: &str, c: Condition) -> ScoreNode {
        let mut node = ScoreNode::new("downstream", "downstream");
        node.deps.push(dep.to_string());
        node.conditions.insert(dep.to_string(), c);
        node
    }

    fn completed(value: &str) -> ScoreOutcome {
        ScoreOutcome::completed(ScoreResult::new(value))
    }

    #[test]
    fn test_eq_is_case_insensitive_and_trimmed() {
        let c = condition(ConditionOperator::Eq, json!("Yes"));
        assert!(evaluate(&c, " yes "));
        assert!(evaluate(&c, "YES"));
        assert!(!evaluate(&c, "no"));
    }

    #[test]
    fn test_ne() {
        let c = condition(ConditionOperator::Ne, json!("denied"));
        assert!(evaluate(&c, "approved"));
        assert!(!evaluate(&c, " Denied"));
    }

    #[test]
    fn test_in_with_list_and_singleton() {
        let many = condition(ConditionOperator::In, json!(["red", "Blue"]));
        assert!(evaluate(&many, "BLUE "));
        assert!(!evaluate(&many, "green"));

        let singleton = condition(ConditionOperator::In, json!("red"));
        assert!(evaluate(&singleton, "red"));
    }

    #[test]
    fn test_not_in() {
        let c = condition(ConditionOperator::NotIn, json!(["spam", "abuse"]));
        assert!(evaluate(&c, "ham"));
        assert!(!evaluate(&c, "Spam"));
    }

    #[test]
    fn test_eq_against_list_value_never_matches() {
        let c = condition(ConditionOperator::Eq, json!(["a", "b"]));
        assert!(!evaluate(&c, "a"));
    }

    #[test]
    fn test_unknown_operator_is_unsatisfied() {
        let c = condition(ConditionOperator::Unknown("matches".to_string()), json!("x"));
        assert!(!evaluate(&c, "x"));
    }

    #[test]
    fn test_non_string_values_compare_by_stringified_form() {
        let c = condition(ConditionOperator::Eq, json!(3));
        assert!(evaluate(&c, "3"));

        let c = condition(ConditionOperator::Eq, json!(true));
        assert!(evaluate(&c, " True "));
    }

    #[test]
    fn test_no_conditions_is_always_satisfied() {
        let mut node = ScoreNode::new("x", "x");
        node.deps.push("dep".to_string());
        assert!(conditions_satisfied(&node, &HashMap::new()));
    }

    #[test]
    fn test_missing_dependency_entry_is_unsatisfied() {
        let node = node_with_condition("dep", Condition::equals("yes"));
        assert!(!conditions_satisfied(&node, &HashMap::new()));
    }

    #[test]
    fn test_skipped_upstream_blocks_condition() {
        let node = node_with_condition("dep", Condition::equals("yes"));
        let outcomes = HashMap::from([(
            "dep".to_string(),
            ScoreOutcome::Skipped {
                reason: SkipReason::ConditionsUnsatisfied,
            },
        )]);
        assert!(!conditions_satisfied(&node, &outcomes));
    }

    #[test]
    fn test_all_conditions_must_hold() {
        let mut node = ScoreNode::new("x", "x");
        for dep in ["a", "b"] {
            node.deps.push(dep.to_string());
            node.conditions
                .insert(dep.to_string(), Condition::equals("yes"));
        }

        let outcomes = HashMap::from([
            ("a".to_string(), completed("yes")),
            ("b".to_string(), completed("no")),
        ]);
        assert!(!conditions_satisfied(&node, &outcomes));

        let outcomes = HashMap::from([
            ("a".to_string(), completed("yes")),
            ("b".to_string(), completed("Yes ")),
        ]);
        assert!(conditions_satisfied(&node, &outcomes));
    }
}
