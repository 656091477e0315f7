use std::sync::Arc;

use tracing::{info, warn};

use compass_agents::{BrandEnforcer, ContentOptimizer};
use compass_core::config::AppConfig;
use compass_core::error::Result;
use compass_core::traits::CompletionClient;
use compass_core::types::{FinalArticle, RunId};
use compass_graph::{stage_fn, Graph, GraphBuilder, END};

use crate::state::ContentGenState;
use crate::{WorkflowError, WorkflowResult};

/// Content generation: brief, draft, brand check, SEO pass, final review.
/// Linear five-stage chain.
pub struct ContentGenerationWorkflow {
    graph: Graph<ContentGenState>,
}

impl ContentGenerationWorkflow {
    pub fn new(client: Arc<dyn CompletionClient>, config: &AppConfig) -> Result<Self> {
        let optimizer = Arc::new(ContentOptimizer::new(
            Arc::clone(&client),
            config.model_for("content_optimizer").clone(),
        ));
        let enforcer = Arc::new(BrandEnforcer::new(
            Arc::clone(&client),
            config.model_for("brand_enforcer").clone(),
        ));

        let create_brief = {
            let optimizer = Arc::clone(&optimizer);
            stage_fn(move |mut state: ContentGenState| {
                let optimizer = Arc::clone(&optimizer);
                async move {
                    state.content_brief = optimizer.create_brief(&state.opportunity_id).await?;
                    Ok(state)
                }
            })
        };

        let generate_content = {
            let optimizer = Arc::clone(&optimizer);
            stage_fn(move |mut state: ContentGenState| {
                let optimizer = Arc::clone(&optimizer);
                async move {
                    state.generated_content =
                        optimizer.generate_article(&state.content_brief).await?;
                    Ok(state)
                }
            })
        };

        let enforce_brand = {
            let enforcer = Arc::clone(&enforcer);
            stage_fn(move |mut state: ContentGenState| {
                let enforcer = Arc::clone(&enforcer);
                async move {
                    let verdict = enforcer.validate_compliance(&state.generated_content).await?;
                    if !verdict.compliant {
                        warn!(issues = verdict.issues.len(), "draft failed brand check");
                        if let Some(revised) = &verdict.revised_content {
                            state.generated_content = revised.clone();
                        }
                    }
                    state.brand_compliance = verdict;
                    Ok(state)
                }
            })
        };

        let optimize_seo = {
            let optimizer = Arc::clone(&optimizer);
            stage_fn(move |mut state: ContentGenState| {
                let optimizer = Arc::clone(&optimizer);
                async move {
                    state.seo_optimization = optimizer
                        .optimize_seo(
                            &state.generated_content,
                            &state.content_brief.target_keywords,
                        )
                        .await?;
                    Ok(state)
                }
            })
        };

        let final_review = {
            let optimizer = Arc::clone(&optimizer);
            stage_fn(move |mut state: ContentGenState| {
                let optimizer = Arc::clone(&optimizer);
                async move {
                    state.final_article = optimizer
                        .final_review(&state.seo_optimization.optimized_content)
                        .await?;
                    Ok(state)
                }
            })
        };

        let graph = GraphBuilder::new()
            .add_stage("create_brief", create_brief)
            .add_stage("generate_content", generate_content)
            .add_stage("enforce_brand", enforce_brand)
            .add_stage("optimize_seo", optimize_seo)
            .add_stage("final_review", final_review)
            .add_edge("create_brief", "generate_content")
            .add_edge("generate_content", "enforce_brand")
            .add_edge("enforce_brand", "optimize_seo")
            .add_edge("optimize_seo", "final_review")
            .add_edge("final_review", END)
            .set_entry("create_brief")
            .build()?;

        Ok(Self { graph })
    }

    pub async fn run(&self, opportunity_id: impl Into<String>) -> WorkflowResult<FinalArticle> {
        let run_id = RunId::new();
        let initial = ContentGenState {
            opportunity_id: opportunity_id.into(),
            ..ContentGenState::default()
        };

        let finished = self
            .graph
            .run(initial)
            .await
            .map_err(|e| WorkflowError::from_run(run_id.clone(), e))?;

        info!(
            run_id = %run_id,
            quality_score = finished.final_article.quality_score,
            "content generation run complete"
        );
        Ok(finished.final_article)
    }
}
