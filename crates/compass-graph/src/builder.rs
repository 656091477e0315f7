use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use compass_core::error::{CompassError, Result};

use crate::edge::{RouteLabel, RouterFn, Transition, END};
use crate::executor::Graph;
use crate::stage::{Stage, StageFn};

/// Builds an immutable `Graph`. Stages and edges are recorded fluently;
/// all structural constraints are checked in `build`, before anything runs:
/// unique stage names, known edge endpoints, exactly one entry, at most one
/// outgoing edge group per stage, and no cycles (including self-loops).
pub struct GraphBuilder<S> {
    stages: Vec<Stage<S>>,
    transitions: HashMap<String, Transition<S>>,
    duplicate_groups: Vec<String>,
    entry: Option<String>,
    entry_set_count: usize,
}

impl<S> Default for GraphBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> GraphBuilder<S> {
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            transitions: HashMap::new(),
            duplicate_groups: Vec::new(),
            entry: None,
            entry_set_count: 0,
        }
    }

    /// Register a named stage. Names must be unique within the graph.
    pub fn add_stage(mut self, name: impl Into<String>, func: StageFn<S>) -> Self {
        self.stages.push(Stage::new(name, func));
        self
    }

    /// Register an unconditional edge. `to` may be `END`.
    pub fn add_edge(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        let from = from.into();
        let transition = Transition::Unconditional { to: to.into() };
        if self.transitions.insert(from.clone(), transition).is_some() {
            self.duplicate_groups.push(from);
        }
        self
    }

    /// Register a routed branch. The router runs synchronously against the
    /// post-stage state and must be pure; its label selects the successor
    /// from `targets`. A label missing from `targets` surfaces as
    /// `UnknownRoute` at routing time.
    pub fn add_conditional_edges<L, R, N, T>(
        mut self,
        from: impl Into<String>,
        router: R,
        targets: T,
    ) -> Self
    where
        L: RouteLabel,
        R: Fn(&S) -> L + Send + Sync + 'static,
        N: Into<String>,
        T: IntoIterator<Item = (L, N)>,
    {
        let from = from.into();
        let mut target_names = Vec::new();
        let mut table = HashMap::new();
        for (label, stage) in targets {
            let stage = stage.into();
            target_names.push(stage.clone());
            table.insert(label, stage);
        }

        let stage_name = from.clone();
        let route: RouterFn<S> = Arc::new(move |state| {
            let label = router(state);
            table
                .get(&label)
                .cloned()
                .ok_or_else(|| CompassError::UnknownRoute {
                    stage: stage_name.clone(),
                    label: format!("{label:?}"),
                })
        });

        let transition = Transition::Conditional {
            targets: target_names,
            route,
        };
        if self.transitions.insert(from.clone(), transition).is_some() {
            self.duplicate_groups.push(from);
        }
        self
    }

    /// Set the entry stage. Exactly one entry is required.
    pub fn set_entry(mut self, name: impl Into<String>) -> Self {
        self.entry = Some(name.into());
        self.entry_set_count += 1;
        self
    }

    /// Validate and freeze the graph. No stage executes here.
    pub fn build(self) -> Result<Graph<S>> {
        let mut stages = HashMap::new();
        for stage in self.stages {
            let name = stage.name.clone();
            if name == END {
                return Err(CompassError::Config(format!(
                    "stage name '{END}' is reserved for the terminal sentinel"
                )));
            }
            if stages.insert(name.clone(), stage).is_some() {
                return Err(CompassError::Config(format!(
                    "duplicate stage name '{name}'"
                )));
            }
        }

        if let Some(from) = self.duplicate_groups.first() {
            return Err(CompassError::Config(format!(
                "stage '{from}' has more than one outgoing edge group"
            )));
        }

        if self.entry_set_count > 1 {
            return Err(CompassError::Config(
                "entry stage set more than once".to_string(),
            ));
        }
        let entry = self
            .entry
            .ok_or_else(|| CompassError::Config("no entry stage set".to_string()))?;
        if !stages.contains_key(&entry) {
            return Err(CompassError::Config(format!(
                "entry stage '{entry}' is not a registered stage"
            )));
        }

        for (from, transition) in &self.transitions {
            if !stages.contains_key(from) {
                return Err(CompassError::Config(format!(
                    "edge from unknown stage '{from}'"
                )));
            }
            for target in transition.targets() {
                if target != END && !stages.contains_key(target) {
                    return Err(CompassError::Config(format!(
                        "edge from '{from}' targets unknown stage '{target}'"
                    )));
                }
                if target == from {
                    return Err(CompassError::GraphCycle {
                        cycle: format!("{from} -> {from}"),
                    });
                }
            }
        }

        for name in stages.keys() {
            if !self.transitions.contains_key(name) {
                return Err(CompassError::Config(format!(
                    "stage '{name}' has no outgoing edge group"
                )));
            }
        }

        detect_cycle(&stages, &self.transitions)?;

        Ok(Graph::new(entry, stages, self.transitions))
    }
}

/// Kahn topological traversal. Conditional branches contribute every
/// registered target, so a cycle reachable through any label is rejected.
fn detect_cycle<S>(
    stages: &HashMap<String, Stage<S>>,
    transitions: &HashMap<String, Transition<S>>,
) -> Result<()> {
    let mut in_degree: HashMap<&str, usize> = stages.keys().map(|n| (n.as_str(), 0)).collect();
    for transition in transitions.values() {
        for target in transition.targets() {
            if target != END {
                *in_degree.entry(target).or_insert(0) += 1;
            }
        }
    }

    let mut queue: Vec<&str> = in_degree
        .iter()
        .filter(|(_, d)| **d == 0)
        .map(|(n, _)| *n)
        .collect();
    let mut removed = HashSet::new();

    while let Some(node) = queue.pop() {
        removed.insert(node);
        if let Some(transition) = transitions.get(node) {
            for target in transition.targets() {
                if target == END {
                    continue;
                }
                let degree = in_degree.get_mut(target).expect("target validated");
                *degree -= 1;
                if *degree == 0 {
                    queue.push(target);
                }
            }
        }
    }

    if removed.len() == stages.len() {
        Ok(())
    } else {
        let mut cyclic: Vec<&str> = in_degree
            .keys()
            .filter(|n| !removed.contains(*n))
            .copied()
            .collect();
        cyclic.sort_unstable();
        Err(CompassError::GraphCycle {
            cycle: cyclic.join(" -> "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::stage_fn;

    fn noop() -> StageFn<u64> {
        stage_fn(|state: u64| async move { Ok(state) })
    }

    #[test]
    fn test_linear_graph_builds() {
        let graph = GraphBuilder::new()
            .add_stage("a", noop())
            .add_stage("b", noop())
            .add_edge("a", "b")
            .add_edge("b", END)
            .set_entry("a")
            .build();
        assert!(graph.is_ok());
    }

    #[test]
    fn test_two_stage_cycle_rejected() {
        let err = GraphBuilder::new()
            .add_stage("x", noop())
            .add_stage("y", noop())
            .add_edge("x", "y")
            .add_edge("y", "x")
            .set_entry("x")
            .build()
            .unwrap_err();
        match err {
            CompassError::GraphCycle { cycle } => {
                assert!(cycle.contains('x'));
                assert!(cycle.contains('y'));
            }
            other => panic!("expected GraphCycle, got {other:?}"),
        }
    }

    #[test]
    fn test_self_loop_rejected() {
        let err = GraphBuilder::new()
            .add_stage("a", noop())
            .add_edge("a", "a")
            .set_entry("a")
            .build()
            .unwrap_err();
        assert!(matches!(err, CompassError::GraphCycle { .. }));
    }

    #[test]
    fn test_cycle_through_conditional_branch_rejected() {
        let err = GraphBuilder::new()
            .add_stage("a", noop())
            .add_stage("b", noop())
            .add_stage("c", noop())
            .add_edge("a", "b")
            .add_conditional_edges("b", |_: &u64| true, [(true, "c"), (false, "a")])
            .add_edge("c", END)
            .set_entry("a")
            .build()
            .unwrap_err();
        assert!(matches!(err, CompassError::GraphCycle { .. }));
    }

    #[test]
    fn test_duplicate_stage_name_rejected() {
        let err = GraphBuilder::new()
            .add_stage("a", noop())
            .add_stage("a", noop())
            .add_edge("a", END)
            .set_entry("a")
            .build()
            .unwrap_err();
        assert!(matches!(err, CompassError::Config(_)));
    }

    #[test]
    fn test_edge_to_unknown_stage_rejected() {
        let err = GraphBuilder::new()
            .add_stage("a", noop())
            .add_edge("a", "missing")
            .set_entry("a")
            .build()
            .unwrap_err();
        assert!(matches!(err, CompassError::Config(_)));
    }

    #[test]
    fn test_second_outgoing_group_rejected() {
        let err = GraphBuilder::new()
            .add_stage("a", noop())
            .add_stage("b", noop())
            .add_stage("c", noop())
            .add_edge("a", "b")
            .add_edge("a", "c")
            .add_edge("b", END)
            .add_edge("c", END)
            .set_entry("a")
            .build()
            .unwrap_err();
        assert!(matches!(err, CompassError::Config(_)));
    }

    #[test]
    fn test_missing_entry_rejected() {
        let err = GraphBuilder::new()
            .add_stage("a", noop())
            .add_edge("a", END)
            .build()
            .unwrap_err();
        assert!(matches!(err, CompassError::Config(_)));
    }

    #[test]
    fn test_stage_without_outgoing_group_rejected() {
        let err = GraphBuilder::new()
            .add_stage("a", noop())
            .add_stage("dangling", noop())
            .add_edge("a", END)
            .set_entry("a")
            .build()
            .unwrap_err();
        assert!(matches!(err, CompassError::Config(_)));
    }

    #[test]
    fn test_reserved_end_name_rejected() {
        let err = GraphBuilder::new()
            .add_stage(END, noop())
            .set_entry(END)
            .build()
            .unwrap_err();
        assert!(matches!(err, CompassError::Config(_)));
    }

    #[test]
    fn test_diamond_join_builds() {
        // Three branches converging on one successor is not a cycle.
        let graph = GraphBuilder::new()
            .add_stage("eval", noop())
            .add_stage("left", noop())
            .add_stage("mid", noop())
            .add_stage("right", noop())
            .add_stage("join", noop())
            .add_conditional_edges(
                "eval",
                |state: &u64| *state % 3,
                [(0u64, "left"), (1, "mid"), (2, "right")],
            )
            .add_edge("left", "join")
            .add_edge("mid", "join")
            .add_edge("right", "join")
            .add_edge("join", END)
            .set_entry("eval")
            .build();
        assert!(graph.is_ok());
    }
}
