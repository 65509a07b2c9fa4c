//! Property coverage for graph construction and condition normalization.

use std::collections::HashSet;

use proptest::prelude::*;

use scorecard::services::conditions;
use scorecard::{Condition, DependsOn, GraphBuilder, ScoreConfig};

fn chain_configs(size: usize) -> Vec<ScoreConfig> {
    (0..size)
        .map(|i| {
            let mut config = ScoreConfig::new(format!("score_{i}"));
            if i > 0 {
                config.depends_on = Some(DependsOn::List(vec![format!("score_{}", i - 1)]));
            }
            config
        })
        .collect()
}

proptest! {
    /// Property: dependency names that do not resolve never become edges,
    /// even when they would form a cycle if linked.
    #[test]
    fn prop_unresolvable_names_never_become_edges(
        size in 1usize..12,
        ghost in "[a-z]{4,10}",
    ) {
        let mut configs = chain_configs(size);
        // Every config also claims a dependency on a name that is not
        // registered anywhere.
        for config in &mut configs {
            let mut deps = match config.depends_on.take() {
                Some(DependsOn::List(deps)) => deps,
                _ => Vec::new(),
            };
            deps.push(format!("ghost_{ghost}"));
            config.depends_on = Some(DependsOn::List(deps));
        }

        let subset: Vec<String> = configs.iter().map(|c| c.name.clone()).collect();
        let (graph, name_to_id) = GraphBuilder::build(&configs, &subset).unwrap();

        prop_assert_eq!(graph.len(), size);
        for node in graph.nodes_in_order() {
            for dep in &node.deps {
                prop_assert!(graph.contains(dep), "edge to {} dangles", dep);
                prop_assert!(!dep.starts_with("ghost_"));
            }
        }
        let ghost_key = format!("ghost_{}", ghost);
        prop_assert!(!name_to_id.contains_key(&ghost_key));
    }

    /// Property: the transitive closure of a request contains every
    /// ancestor and nothing outside the reachable set.
    #[test]
    fn prop_expand_subset_is_exactly_the_reachable_set(
        size in 2usize..15,
        request_index in 0usize..14,
    ) {
        let configs = chain_configs(size);
        let request_index = request_index % size;
        let requested = vec![format!("score_{request_index}")];

        let expanded = GraphBuilder::expand_subset(&configs, &requested);
        let expanded_set: HashSet<&str> = expanded.iter().map(String::as_str).collect();

        // A chain's reachable set from node k is 0..=k.
        prop_assert_eq!(expanded.len(), request_index + 1);
        for i in 0..=request_index {
            let score_key = format!("score_{}", i);
            prop_assert!(expanded_set.contains(score_key.as_str()));
        }
    }

    /// Property: every node of a built graph is schedulable - walking
    /// "all deps terminal first" reaches the whole graph (no hidden
    /// cycles, no dangling edges).
    #[test]
    fn prop_built_graphs_always_drain(
        size in 1usize..12,
    ) {
        let configs = chain_configs(size);
        let subset: Vec<String> = configs.iter().map(|c| c.name.clone()).collect();
        let (graph, _) = GraphBuilder::build(&configs, &subset).unwrap();

        let mut terminal: HashSet<String> = HashSet::new();
        let mut progressed = true;
        while progressed {
            progressed = false;
            for node in graph.nodes_in_order() {
                if !terminal.contains(&node.id)
                    && node.deps.iter().all(|dep| terminal.contains(dep))
                {
                    terminal.insert(node.id.clone());
                    progressed = true;
                }
            }
        }
        prop_assert_eq!(terminal.len(), graph.len());
    }

    /// Property: equality conditions are insensitive to case and
    /// surrounding whitespace on both sides.
    #[test]
    fn prop_condition_normalization(
        word in "[a-zA-Z]{1,12}",
        left_pad in " {0,3}",
        right_pad in " {0,3}",
    ) {
        let condition = Condition::equals(word.to_uppercase());
        let actual = format!("{left_pad}{}{right_pad}", word.to_lowercase());
        prop_assert!(conditions::evaluate(&condition, &actual));
    }

    /// Property: ids synthesized from distinct chain names stay distinct,
    /// so the name map never aliases two scores together.
    #[test]
    fn prop_name_to_id_has_no_collisions_for_chains(
        size in 1usize..20,
    ) {
        let configs = chain_configs(size);
        let subset: Vec<String> = configs.iter().map(|c| c.name.clone()).collect();
        let (_, name_to_id) = GraphBuilder::build(&configs, &subset).unwrap();

        let ids: HashSet<&String> = name_to_id.values().collect();
        prop_assert_eq!(ids.len(), size);
    }
}
