//! Score dependency graph models.
//!
//! A `ScoreGraph` is built fresh for every run and discarded afterwards.
//! Nodes are keyed by score id; edges point from a score to the upstream
//! ids it depends on, with an optional condition attached per edge.

use std::collections::HashMap;

use super::score_config::Condition;

/// A node in the score graph.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreNode {
    /// Score id, the graph key.
    pub id: String,
    /// Display name from the config.
    pub name: String,
    /// Ids of upstream scores this node waits on, in declaration order.
    pub deps: Vec<String>,
    /// Conditions keyed by upstream id. Edges without an entry here are
    /// pure ordering gates.
    pub conditions: HashMap<String, Condition>,
}

impl ScoreNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            deps: Vec::new(),
            conditions: HashMap::new(),
        }
    }

    pub fn has_conditions(&self) -> bool {
        !self.conditions.is_empty()
    }
}

/// Directed acyclic graph of scores for one run.
///
/// Acyclicity is enforced at build time; unresolvable dependency names are
/// never inserted as edges.
#[derive(Debug, Clone, Default)]
pub struct ScoreGraph {
    nodes: HashMap<String, ScoreNode>,
    /// Node ids in insertion order, the FIFO seed order for the scheduler.
    order: Vec<String>,
}

impl ScoreGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node. Later inserts with the same id are ignored so the
    /// first configuration for an id wins.
    pub fn insert(&mut self, node: ScoreNode) {
        if !self.nodes.contains_key(&node.id) {
            self.order.push(node.id.clone());
            self.nodes.insert(node.id.clone(), node);
        }
    }

    pub fn node(&self, id: &str) -> Option<&ScoreNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Nodes in insertion order.
    pub fn nodes_in_order(&self) -> impl Iterator<Item = &ScoreNode> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Ids of nodes that list `id` as a dependency, in insertion order.
    pub fn dependents(&self, id: &str) -> Vec<&str> {
        self.order
            .iter()
            .filter_map(|candidate| self.nodes.get(candidate))
            .filter(|node| node.deps.iter().any(|dep| dep == id))
            .map(|node| node.id.as_str())
            .collect()
    }

    /// Map from node id to display name.
    pub fn id_to_name(&self) -> HashMap<String, String> {
        self.nodes
            .values()
            .map(|node| (node.id.clone(), node.name.clone()))
            .collect()
    }
}
