use std::collections::{HashMap, HashSet};
use std::time::Instant;

use tracing::{debug, error, info};

use compass_core::error::{CompassError, Result};

use crate::edge::{Transition, END};
use crate::stage::Stage;

/// A failed run: the stage that failed, the underlying error, and the
/// accumulated state as it stood before the failing stage ran. No partial
/// application: a stage either fully replaced the state or left it alone.
pub struct RunError<S> {
    pub stage: String,
    pub error: CompassError,
    pub state: S,
}

impl<S> RunError<S> {
    /// Drop the diagnostic state and keep the error.
    pub fn into_error(self) -> CompassError {
        self.error
    }
}

impl<S> std::fmt::Debug for RunError<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunError")
            .field("stage", &self.stage)
            .field("error", &self.error)
            .finish()
    }
}

impl<S> std::fmt::Display for RunError<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "run failed at stage '{}': {}", self.stage, self.error)
    }
}

/// Outcome of one run: the final state, or a `RunError` naming the failing
/// stage and carrying the pre-failure state.
pub type RunResult<S> = std::result::Result<S, RunError<S>>;

/// An immutable workflow graph.
///
/// Built once by `GraphBuilder`, then shared by reference across any number
/// of concurrent runs. Each run owns its own state, so no synchronization
/// is needed: the graph is read-only and runs never share mutable data.
#[derive(Debug)]
pub struct Graph<S> {
    entry: String,
    stages: HashMap<String, Stage<S>>,
    transitions: HashMap<String, Transition<S>>,
}

impl<S> Graph<S> {
    pub(crate) fn new(
        entry: String,
        stages: HashMap<String, Stage<S>>,
        transitions: HashMap<String, Transition<S>>,
    ) -> Self {
        Self {
            entry,
            stages,
            transitions,
        }
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

impl<S: Clone + Send + 'static> Graph<S> {
    /// Execute the graph from its entry stage.
    ///
    /// Stages run strictly sequentially: await the current stage, replace
    /// the accumulated state with its output, evaluate the outgoing
    /// transition (routers run synchronously on the updated state), advance.
    /// Terminates when a transition targets `END`. Because the graph is a
    /// DAG, each stage runs at most once and the walk is bounded by the
    /// stage count.
    pub async fn run(&self, initial: S) -> RunResult<S> {
        let start = Instant::now();
        let mut state = initial;
        let mut current = self.entry.clone();
        let mut visited: HashSet<String> = HashSet::new();
        let mut executed = 0usize;

        loop {
            if !visited.insert(current.clone()) {
                // Unreachable on a built DAG; guards hand-assembled graphs.
                return Err(RunError {
                    error: CompassError::StageExecution {
                        stage: current.clone(),
                        message: "stage visited twice in one run".to_string(),
                    },
                    stage: current,
                    state,
                });
            }

            let stage = match self.stages.get(&current) {
                Some(s) => s,
                None => {
                    return Err(RunError {
                        error: CompassError::StageExecution {
                            stage: current.clone(),
                            message: "stage not found in graph".to_string(),
                        },
                        stage: current,
                        state,
                    });
                }
            };

            debug!(stage = %stage.name, "executing stage");
            let stage_start = Instant::now();

            // Snapshot so a failure surfaces the pre-stage state.
            let snapshot = state.clone();
            state = match (stage.func)(state).await {
                Ok(next_state) => next_state,
                Err(e) => {
                    error!(stage = %stage.name, error = %e, "stage failed, aborting run");
                    return Err(RunError {
                        stage: current,
                        error: e,
                        state: snapshot,
                    });
                }
            };
            executed += 1;

            debug!(
                stage = %stage.name,
                elapsed_ms = stage_start.elapsed().as_millis() as u64,
                "stage complete"
            );

            let transition = match self.transitions.get(&current) {
                Some(t) => t,
                None => {
                    return Err(RunError {
                        error: CompassError::StageExecution {
                            stage: current.clone(),
                            message: "stage has no outgoing transition".to_string(),
                        },
                        stage: current,
                        state,
                    });
                }
            };

            let next = match transition {
                Transition::Unconditional { to } => to.clone(),
                Transition::Conditional { route, .. } => match route(&state) {
                    Ok(target) => target,
                    Err(e) => {
                        error!(stage = %current, error = %e, "routing failed, aborting run");
                        return Err(RunError {
                            stage: current,
                            error: e,
                            state,
                        });
                    }
                },
            };

            if next == END {
                info!(
                    stages_executed = executed,
                    total_elapsed_ms = start.elapsed().as_millis() as u64,
                    "run complete"
                );
                return Ok(state);
            }
            current = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::builder::GraphBuilder;
    use crate::stage::stage_fn;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct TestState {
        x: Option<i64>,
        y: Option<i64>,
        z: Option<i64>,
    }

    fn linear_graph() -> Graph<TestState> {
        GraphBuilder::new()
            .add_stage(
                "a",
                stage_fn(|mut s: TestState| async move {
                    s.x = Some(1);
                    Ok(s)
                }),
            )
            .add_stage(
                "b",
                stage_fn(|mut s: TestState| async move {
                    s.y = Some(s.x.expect("a ran before b") + 1);
                    Ok(s)
                }),
            )
            .add_stage(
                "c",
                stage_fn(|mut s: TestState| async move {
                    s.z = Some(s.y.expect("b ran before c") * 2);
                    Ok(s)
                }),
            )
            .add_edge("a", "b")
            .add_edge("b", "c")
            .add_edge("c", END)
            .set_entry("a")
            .build()
            .expect("linear graph builds")
    }

    #[tokio::test]
    async fn test_linear_run_accumulates_state() {
        let graph = linear_graph();
        let result = graph.run(TestState::default()).await.unwrap();
        assert_eq!(result.x, Some(1));
        assert_eq!(result.y, Some(2));
        assert_eq!(result.z, Some(4));
    }

    #[tokio::test]
    async fn test_linear_run_deterministic() {
        let graph = linear_graph();
        let first = graph.run(TestState::default()).await.unwrap();
        let second = graph.run(TestState::default()).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_failing_stage_reports_name_and_pre_failure_state() {
        let graph = GraphBuilder::new()
            .add_stage(
                "a",
                stage_fn(|mut s: TestState| async move {
                    s.x = Some(1);
                    Ok(s)
                }),
            )
            .add_stage(
                "b",
                stage_fn(|_: TestState| async move {
                    Err(CompassError::StageExecution {
                        stage: "b".to_string(),
                        message: "boom".to_string(),
                    })
                }),
            )
            .add_stage(
                "c",
                stage_fn(|mut s: TestState| async move {
                    s.z = Some(99);
                    Ok(s)
                }),
            )
            .add_edge("a", "b")
            .add_edge("b", "c")
            .add_edge("c", END)
            .set_entry("a")
            .build()
            .unwrap();

        let err = graph.run(TestState::default()).await.unwrap_err();
        assert_eq!(err.stage, "b");
        assert_eq!(err.state.x, Some(1));
        assert_eq!(err.state.y, None);
        assert_eq!(err.state.z, None);
    }

    #[tokio::test]
    async fn test_conditional_routing_picks_branch() {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        enum Band {
            High,
            Low,
        }

        let graph = GraphBuilder::new()
            .add_stage("score", stage_fn(|s: i64| async move { Ok(s) }))
            .add_stage("high", stage_fn(|s: i64| async move { Ok(s + 1000) }))
            .add_stage("low", stage_fn(|s: i64| async move { Ok(s - 1000) }))
            .add_conditional_edges(
                "score",
                |s: &i64| if *s >= 50 { Band::High } else { Band::Low },
                [(Band::High, "high"), (Band::Low, "low")],
            )
            .add_edge("high", END)
            .add_edge("low", END)
            .set_entry("score")
            .build()
            .unwrap();

        assert_eq!(graph.run(80).await.unwrap(), 1080);
        assert_eq!(graph.run(10).await.unwrap(), -990);
    }

    #[tokio::test]
    async fn test_unregistered_route_label_fails_run() {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        enum Band {
            High,
            Low,
        }

        // Router can emit Low but only High is registered.
        let graph = GraphBuilder::new()
            .add_stage("score", stage_fn(|s: i64| async move { Ok(s) }))
            .add_stage("high", stage_fn(|s: i64| async move { Ok(s) }))
            .add_conditional_edges(
                "score",
                |s: &i64| if *s >= 50 { Band::High } else { Band::Low },
                [(Band::High, "high")],
            )
            .add_edge("high", END)
            .set_entry("score")
            .build()
            .unwrap();

        let err = graph.run(10).await.unwrap_err();
        assert_eq!(err.stage, "score");
        match err.error {
            CompassError::UnknownRoute { stage, label } => {
                assert_eq!(stage, "score");
                assert_eq!(label, "Low");
            }
            other => panic!("expected UnknownRoute, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_concurrent_runs_are_isolated() {
        // Each seeded run must match a pure single-threaded replay.
        let graph = Arc::new(
            GraphBuilder::new()
                .add_stage("double", stage_fn(|s: i64| async move { Ok(s * 2) }))
                .add_stage("inc", stage_fn(|s: i64| async move { Ok(s + 1) }))
                .add_edge("double", "inc")
                .add_edge("inc", END)
                .set_entry("double")
                .build()
                .unwrap(),
        );

        let mut handles = Vec::new();
        for seed in 0..32i64 {
            let graph = Arc::clone(&graph);
            handles.push(tokio::spawn(async move {
                (seed, graph.run(seed).await.unwrap())
            }));
        }
        for handle in handles {
            let (seed, result) = handle.await.unwrap();
            assert_eq!(result, seed * 2 + 1);
        }
    }

    #[tokio::test]
    async fn test_router_purity_under_concurrency() {
        let route: crate::edge::RouterFn<i64> = Arc::new(|s| {
            Ok(if *s >= 0 {
                "pos".to_string()
            } else {
                "neg".to_string()
            })
        });

        let mut handles = Vec::new();
        for _ in 0..16 {
            let route = Arc::clone(&route);
            handles.push(tokio::spawn(async move { route(&7).unwrap() }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), "pos");
        }
    }
}
