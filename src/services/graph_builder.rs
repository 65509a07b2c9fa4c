//! Graph builder service.
//!
//! Converts a flat list of score configurations into the per-run dependency
//! graph. Dependency names are resolved against the name map of *all* known
//! configs, not just the requested subset; names that do not resolve, or
//! that resolve to a score outside this run's graph, are dropped with a
//! warning rather than inserted as dangling edges. An explicit cycle check
//! rejects cyclic configurations instead of letting them deadlock.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{instrument, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ScoreConfig, ScoreGraph, ScoreNode};

/// Service for building per-run score graphs.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphBuilder;

impl GraphBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Expand a requested subset of score names to its transitive
    /// dependency closure, preserving request order first and discovery
    /// order after. Unknown names pass through untouched; their absence is
    /// handled downstream.
    pub fn expand_subset(all_configs: &[ScoreConfig], requested: &[String]) -> Vec<String> {
        let by_name: HashMap<&str, &ScoreConfig> = all_configs
            .iter()
            .map(|config| (config.name.as_str(), config))
            .collect();

        let mut expanded = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = requested.iter().cloned().collect();

        while let Some(name) = queue.pop_front() {
            if !seen.insert(name.clone()) {
                continue;
            }
            if let Some(config) = by_name.get(name.as_str()) {
                for dep in config.dependency_names() {
                    queue.push_back(dep.to_string());
                }
            }
            expanded.push(name);
        }

        expanded
    }

    /// Build the dependency graph for `subset` plus the name-to-id map
    /// over all known configs.
    ///
    /// Returns `DomainError::DependencyCycle` if the resolved edges form a
    /// cycle (self-dependencies included).
    #[instrument(skip(all_configs, subset), fields(config_count = all_configs.len(), subset_count = subset.len()))]
    pub fn build(
        all_configs: &[ScoreConfig],
        subset: &[String],
    ) -> DomainResult<(ScoreGraph, HashMap<String, String>)> {
        // The name map spans every known config: a dependency may point at
        // a score outside the requested subset.
        let mut name_to_id: HashMap<String, String> = HashMap::new();
        for config in all_configs {
            if name_to_id
                .insert(config.name.clone(), config.effective_id())
                .is_some()
            {
                warn!(score = %config.name, "duplicate score name in configs, later id wins");
            }
        }

        let by_name: HashMap<&str, &ScoreConfig> = all_configs
            .iter()
            .map(|config| (config.name.as_str(), config))
            .collect();

        // First pass: materialize the run's node set so edge resolution can
        // tell in-graph targets from filtered-out ones.
        let mut members: Vec<&ScoreConfig> = Vec::new();
        let mut member_ids: HashSet<String> = HashSet::new();
        for name in subset {
            let Some(config) = by_name.get(name.as_str()) else {
                warn!(score = %name, "requested score has no configuration, skipping");
                continue;
            };
            if member_ids.insert(config.effective_id()) {
                members.push(config);
            }
        }

        // Second pass: link resolvable edges and attach conditions.
        let mut graph = ScoreGraph::new();
        for config in members {
            let id = config.effective_id();
            let mut node = ScoreNode::new(id.clone(), config.name.clone());

            if let Some(depends_on) = &config.depends_on {
                for (dep_name, condition) in depends_on.entries() {
                    let Some(dep_id) = name_to_id.get(&dep_name) else {
                        warn!(
                            score = %config.name,
                            dependency = %dep_name,
                            "dependency name does not resolve, dropping edge"
                        );
                        continue;
                    };
                    if !member_ids.contains(dep_id) {
                        warn!(
                            score = %config.name,
                            dependency = %dep_name,
                            "dependency resolves outside this run's graph, dropping edge"
                        );
                        continue;
                    }
                    node.deps.push(dep_id.clone());
                    if let Some(condition) = condition {
                        node.conditions.insert(dep_id.clone(), condition);
                    }
                }
            }

            graph.insert(node);
        }

        if let Some(cycle) = detect_cycle(&graph) {
            return Err(DomainError::DependencyCycle(cycle));
        }

        Ok((graph, name_to_id))
    }
}

/// DFS cycle detection over resolved edges. Returns the cycle path when one
/// exists.
fn detect_cycle(graph: &ScoreGraph) -> Option<Vec<String>> {
    let mut visited: HashSet<String> = HashSet::new();
    let mut rec_stack: HashSet<String> = HashSet::new();
    let mut path: Vec<String> = Vec::new();

    for id in graph.ids() {
        if !visited.contains(id)
            && visit(id, graph, &mut visited, &mut rec_stack, &mut path)
        {
            return Some(path);
        }
    }

    None
}

fn visit(
    node: &str,
    graph: &ScoreGraph,
    visited: &mut HashSet<String>,
    rec_stack: &mut HashSet<String>,
    path: &mut Vec<String>,
) -> bool {
    visited.insert(node.to_string());
    rec_stack.insert(node.to_string());
    path.push(node.to_string());

    if let Some(score) = graph.node(node) {
        for dep in &score.deps {
            if !visited.contains(dep) {
                if visit(dep, graph, visited, rec_stack, path) {
                    return true;
                }
            } else if rec_stack.contains(dep) {
                // Trim the prefix so the reported path starts at the cycle.
                if let Some(start) = path.iter().position(|id| id == dep) {
                    path.drain(0..start);
                }
                path.push(dep.clone());
                return true;
            }
        }
    }

    rec_stack.remove(node);
    path.pop();
    false
}
