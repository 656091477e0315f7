//! Graph execution engine: DAG-based multi-stage workflow orchestration.
//!
//! A workflow is a directed acyclic graph of named `Stage`s over a typed
//! state. Each stage is an async function `S -> S`. Transitions are either
//! unconditional or routed: a synchronous, pure router inspects the updated
//! state and returns a label from a closed enum, which selects the successor.
//!
//! Graphs are built once with `GraphBuilder` (which rejects cycles at build
//! time), then shared immutably across any number of concurrent runs. Each
//! run owns its state; the executor walks stages strictly sequentially and
//! stops at the `END` sentinel.

pub mod builder;
pub mod edge;
pub mod executor;
pub mod stage;

pub use builder::GraphBuilder;
pub use edge::{RouteLabel, Transition, END};
pub use executor::{Graph, RunError, RunResult};
pub use stage::{stage_fn, Stage, StageFn};
