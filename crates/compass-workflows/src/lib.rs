//! Workflow facades.
//!
//! Three fixed graphs built once per facade and shared across runs:
//!
//! - news intelligence: linear scan, extract, analyze gaps, prioritize
//! - generative-engine optimization: linear prefix, a three-way routed
//!   branch on the evaluation score, convergence into prediction
//! - content generation: linear brief, draft, brand check, SEO, review
//!
//! Facades take their collaborator capabilities in the constructor and
//! expose a single `run` that awaits graph completion. A failed run is
//! logged with the failing stage and surfaced as `WorkflowError`; analysis
//! that did not complete is never presented as if it had.

pub mod content_generation;
pub mod geo_optimization;
pub mod news_intelligence;
pub mod state;

pub use content_generation::ContentGenerationWorkflow;
pub use geo_optimization::{GeoOptimizationWorkflow, OptimizationRoute};
pub use news_intelligence::NewsIntelligenceWorkflow;
pub use state::{ContentGenState, GeoState, NewsIntelState};

use thiserror::Error;

use compass_core::error::CompassError;
use compass_core::types::RunId;
use compass_graph::RunError;

/// A workflow run that aborted, naming the run and the stage where it
/// stopped.
#[derive(Debug, Error)]
#[error("workflow run {run_id} failed at stage '{stage}': {source}")]
pub struct WorkflowError {
    pub run_id: RunId,
    pub stage: String,
    #[source]
    pub source: CompassError,
}

impl WorkflowError {
    fn from_run<S>(run_id: RunId, err: RunError<S>) -> Self {
        tracing::error!(
            run_id = %run_id,
            stage = %err.stage,
            error = %err.error,
            "workflow run failed"
        );
        Self {
            run_id,
            stage: err.stage,
            source: err.error,
        }
    }
}

pub type WorkflowResult<T> = std::result::Result<T, WorkflowError>;
