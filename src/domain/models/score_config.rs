//! Static score configuration models.
//!
//! A `ScoreConfig` describes one named classification task: its identifier,
//! the upstream scores it depends on, and an optional per-edge condition
//! gating whether it runs at all. Configs are owned by the score registry
//! and are read-only to the execution core.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Static description of one score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreConfig {
    /// Display name, unique within a run.
    pub name: String,

    /// Stable identifier. Synthesized from the name when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Upstream dependencies, either a plain ordering list or a mapping
    /// from dependency name to a condition on its result value.
    #[serde(default, deserialize_with = "deserialize_depends_on")]
    pub depends_on: Option<DependsOn>,

    /// Administratively disabled scores are never executed.
    #[serde(default)]
    pub disabled: bool,
}

impl ScoreConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            depends_on: None,
            disabled: false,
        }
    }

    pub fn with_depends_on(mut self, depends_on: DependsOn) -> Self {
        self.depends_on = Some(depends_on);
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// The identifier used to key this score in graphs and result maps.
    ///
    /// Falls back to a synthesized id when none was configured.
    pub fn effective_id(&self) -> String {
        self.id
            .clone()
            .unwrap_or_else(|| synthesize_id(&self.name))
    }

    /// Names of all upstream dependencies, in declaration order.
    pub fn dependency_names(&self) -> Vec<&str> {
        match &self.depends_on {
            None => Vec::new(),
            Some(DependsOn::List(names)) => names.iter().map(String::as_str).collect(),
            Some(DependsOn::Conditional(map)) => map.keys().map(String::as_str).collect(),
        }
    }
}

/// Synthesize a stable id from a score name: trimmed, lower-cased,
/// whitespace collapsed to underscores.
pub fn synthesize_id(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// The two supported dependency shapes.
///
/// A plain list is a pure ordering gate. A mapping attaches a condition to
/// each edge; string shorthand (`{upstream: "approved"}`) normalizes to an
/// equality condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependsOn {
    List(Vec<String>),
    Conditional(BTreeMap<String, ConditionSpec>),
}

impl DependsOn {
    /// Dependency entries as `(name, condition)` pairs, shorthand already
    /// normalized. Declaration order is preserved for lists; conditional
    /// mappings iterate in name order.
    pub fn entries(&self) -> Vec<(String, Option<Condition>)> {
        match self {
            Self::List(names) => names.iter().map(|n| (n.clone(), None)).collect(),
            Self::Conditional(map) => map
                .iter()
                .map(|(n, spec)| (n.clone(), Some(spec.clone().into_condition())))
                .collect(),
        }
    }
}

/// Any dependency shape other than a list or a mapping degrades to "no
/// dependencies" with a warning rather than failing the whole config load.
fn deserialize_depends_on<'de, D>(deserializer: D) -> Result<Option<DependsOn>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(value) => match serde_json::from_value::<DependsOn>(value.clone()) {
            Ok(depends_on) => Ok(Some(depends_on)),
            Err(_) => {
                warn!(
                    shape = %value,
                    "unsupported depends_on shape, treating score as having no dependencies"
                );
                Ok(None)
            }
        },
    }
}

/// A condition as written in configuration: either the full operator/value
/// form or a bare string shorthand for equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionSpec {
    Full(Condition),
    Shorthand(String),
}

impl ConditionSpec {
    /// Normalize to a structured condition. Done once at graph-build time,
    /// never re-sniffed during evaluation.
    pub fn into_condition(self) -> Condition {
        match self {
            Self::Full(condition) => condition,
            Self::Shorthand(value) => Condition {
                operator: ConditionOperator::Eq,
                value: ConditionValue::One(Value::String(value)),
            },
        }
    }
}

/// A predicate on an upstream score's result value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub operator: ConditionOperator,
    pub value: ConditionValue,
}

impl Condition {
    pub fn new(operator: ConditionOperator, value: ConditionValue) -> Self {
        Self { operator, value }
    }

    /// Equality against a single scalar, the most common gate.
    pub fn equals(value: impl Into<Value>) -> Self {
        Self::new(ConditionOperator::Eq, ConditionValue::One(value.into()))
    }
}

/// Comparison operator for a dependency condition.
///
/// An operator string outside the known set deserializes to `Unknown` and
/// always evaluates unsatisfied (with a logged warning) instead of failing
/// the config load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionOperator {
    Eq,
    Ne,
    In,
    NotIn,
    Unknown(String),
}

impl ConditionOperator {
    pub fn parse_lossy(raw: &str) -> Self {
        match raw {
            "==" => Self::Eq,
            "!=" => Self::Ne,
            "in" => Self::In,
            "not-in" => Self::NotIn,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::In => "in",
            Self::NotIn => "not-in",
            Self::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ConditionOperator {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ConditionOperator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse_lossy(&raw))
    }
}

/// A condition's comparison value: a scalar or a list of scalars.
///
/// `Many` is declared first so JSON arrays deserialize as lists rather than
/// being swallowed by the catch-all scalar variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Many(Vec<Value>),
    One(Value),
}

impl ConditionValue {
    /// The scalar form, when this value is not a list.
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Self::One(value) => Some(value),
            Self::Many(_) => None,
        }
    }

    /// All candidate values, treating a scalar as a singleton list.
    pub fn candidates(&self) -> Vec<&Value> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values.iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_effective_id_prefers_configured_id() {
        let mut config = ScoreConfig::new("Needs Review");
        assert_eq!(config.effective_id(), "needs_review");

        config.id = Some("custom_id".to_string());
        assert_eq!(config.effective_id(), "custom_id");
    }

    #[test]
    fn test_depends_on_list_shape() {
        let config: ScoreConfig = serde_json::from_value(json!({
            "name": "summary",
            "depends_on": ["intent", "sentiment"]
        }))
        .unwrap();

        assert_eq!(config.dependency_names(), vec!["intent", "sentiment"]);
        let entries = config.depends_on.unwrap().entries();
        assert!(entries.iter().all(|(_, c)| c.is_none()));
    }

    #[test]
    fn test_depends_on_conditional_shorthand_normalizes_to_eq() {
        let config: ScoreConfig = serde_json::from_value(json!({
            "name": "escalation",
            "depends_on": {"triage": "urgent"}
        }))
        .unwrap();

        let entries = config.depends_on.unwrap().entries();
        assert_eq!(entries.len(), 1);
        let condition = entries[0].1.clone().unwrap();
        assert_eq!(condition.operator, ConditionOperator::Eq);
        assert_eq!(
            condition.value.as_scalar(),
            Some(&Value::String("urgent".to_string()))
        );
    }

    #[test]
    fn test_depends_on_full_condition_with_list_value() {
        let config: ScoreConfig = serde_json::from_value(json!({
            "name": "refund",
            "depends_on": {
                "resolution": {"operator": "in", "value": ["refund", "partial refund"]}
            }
        }))
        .unwrap();

        let entries = config.depends_on.unwrap().entries();
        let condition = entries[0].1.clone().unwrap();
        assert_eq!(condition.operator, ConditionOperator::In);
        assert_eq!(condition.value.candidates().len(), 2);
    }

    #[test]
    fn test_unknown_operator_is_lossy_not_fatal() {
        let condition: Condition = serde_json::from_value(json!({
            "operator": "matches",
            "value": "x"
        }))
        .unwrap();

        assert_eq!(
            condition.operator,
            ConditionOperator::Unknown("matches".to_string())
        );
    }

    #[test]
    fn test_bad_depends_on_shape_degrades_to_none() {
        let config: ScoreConfig = serde_json::from_value(json!({
            "name": "broken",
            "depends_on": 42
        }))
        .unwrap();

        assert!(config.depends_on.is_none());
    }

    #[test]
    fn test_yaml_conditional_shape() {
        let yaml = r"
name: compliance
depends_on:
  outcome:
    operator: '!='
    value: denied
";
        let config: ScoreConfig = serde_yaml::from_str(yaml).unwrap();
        let entries = config.depends_on.unwrap().entries();
        assert_eq!(entries[0].1.clone().unwrap().operator, ConditionOperator::Ne);
    }
}
