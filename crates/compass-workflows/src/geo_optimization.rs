use std::collections::HashMap;
use std::sync::Arc;

use futures::future::try_join_all;
use tracing::info;

use compass_agents::{ContentEvaluator, ContentOptimizer};
use compass_core::config::AppConfig;
use compass_core::error::Result;
use compass_core::traits::{CompletionClient, SerpSource};
use compass_core::types::{
    AiOverview, CompetitorSnippet, GeoReport, KeywordOptimization, OptimizedContent, RunId,
};
use compass_graph::{stage_fn, Graph, GraphBuilder, END};

use crate::state::GeoState;
use crate::{WorkflowError, WorkflowResult};

/// Route labels for the optimization branch. A closed set: the edge table
/// registers every variant, so the router can never produce an
/// unregistered label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptimizationRoute {
    AlreadyWinning,
    MinorOptimization,
    MajorOptimization,
}

/// Band the average inclusion score. Lower bounds are inclusive: 85 is
/// already winning, 60 is a minor optimization.
pub(crate) fn classify_score(score: f64) -> OptimizationRoute {
    if score >= 85.0 {
        OptimizationRoute::AlreadyWinning
    } else if score >= 60.0 {
        OptimizationRoute::MinorOptimization
    } else {
        OptimizationRoute::MajorOptimization
    }
}

/// Generative-engine optimization: scrape AI Overview data, analyze the
/// competitor snippets winning placement, evaluate our content, then take
/// one of three optimization branches before predicting inclusion. The
/// branches converge on the prediction stage; whichever branch ran leaves
/// `optimized_content` populated for it.
pub struct GeoOptimizationWorkflow {
    graph: Graph<GeoState>,
}

impl GeoOptimizationWorkflow {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        serp: Arc<dyn SerpSource>,
        config: &AppConfig,
    ) -> Result<Self> {
        let evaluator = Arc::new(ContentEvaluator::new(
            Arc::clone(&client),
            config.model_for("content_evaluator").clone(),
        ));
        let optimizer = Arc::new(ContentOptimizer::new(
            Arc::clone(&client),
            config.model_for("content_optimizer").clone(),
        ));

        let scrape_ai_overview = {
            let serp = Arc::clone(&serp);
            stage_fn(move |mut state: GeoState| {
                let serp = Arc::clone(&serp);
                async move {
                    // Concurrent sub-calls within the stage; the engine
                    // itself stays sequential.
                    let fetches = state.target_keywords.iter().map(|keyword| {
                        let serp = Arc::clone(&serp);
                        let keyword = keyword.clone();
                        async move {
                            let overview = serp.fetch_ai_overview(&keyword).await?;
                            Ok::<_, compass_core::CompassError>((keyword, overview))
                        }
                    });
                    state.ai_overview_data = try_join_all(fetches).await?.into_iter().collect();
                    Ok(state)
                }
            })
        };

        let analyze_competitors = stage_fn(|mut state: GeoState| async move {
            state.competitor_snippets = extract_snippets(&state.ai_overview_data);
            Ok(state)
        });

        let evaluate_content = {
            let evaluator = Arc::clone(&evaluator);
            stage_fn(move |mut state: GeoState| {
                let evaluator = Arc::clone(&evaluator);
                async move {
                    state.content_analysis = evaluator
                        .evaluate_content(&state.target_keywords, &state.competitor_snippets)
                        .await?;
                    Ok(state)
                }
            })
        };

        let monitor_only = stage_fn(|mut state: GeoState| async move {
            state.optimization_strategy = "monitor".to_string();
            state.optimized_content = OptimizedContent::no_changes_needed();
            Ok(state)
        });

        let targeted_optimization = {
            let optimizer = Arc::clone(&optimizer);
            stage_fn(move |mut state: GeoState| {
                let optimizer = Arc::clone(&optimizer);
                async move {
                    state.optimized_content = optimizer
                        .targeted_optimize(&state.content_analysis, &state.competitor_snippets)
                        .await?;
                    state.optimization_strategy = "targeted".to_string();
                    Ok(state)
                }
            })
        };

        let comprehensive_rewrite = {
            let optimizer = Arc::clone(&optimizer);
            stage_fn(move |mut state: GeoState| {
                let optimizer = Arc::clone(&optimizer);
                async move {
                    state.optimized_content = optimizer
                        .comprehensive_rewrite(
                            &state.target_keywords,
                            &state.competitor_snippets,
                            &state.content_analysis,
                        )
                        .await?;
                    state.optimization_strategy = "comprehensive".to_string();
                    Ok(state)
                }
            })
        };

        let predict_inclusion = {
            let evaluator = Arc::clone(&evaluator);
            stage_fn(move |mut state: GeoState| {
                let evaluator = Arc::clone(&evaluator);
                async move {
                    state.inclusion_predictions = evaluator
                        .predict_inclusion(
                            &state.optimized_content,
                            &state.competitor_snippets,
                            &state.target_keywords,
                        )
                        .await?;
                    Ok(state)
                }
            })
        };

        let graph = GraphBuilder::new()
            .add_stage("scrape_ai_overview", scrape_ai_overview)
            .add_stage("analyze_competitors", analyze_competitors)
            .add_stage("evaluate_content", evaluate_content)
            .add_stage("monitor_only", monitor_only)
            .add_stage("targeted_optimization", targeted_optimization)
            .add_stage("comprehensive_rewrite", comprehensive_rewrite)
            .add_stage("predict_inclusion", predict_inclusion)
            .add_edge("scrape_ai_overview", "analyze_competitors")
            .add_edge("analyze_competitors", "evaluate_content")
            .add_conditional_edges(
                "evaluate_content",
                |state: &GeoState| classify_score(state.content_analysis.average_inclusion_score),
                [
                    (OptimizationRoute::AlreadyWinning, "monitor_only"),
                    (OptimizationRoute::MinorOptimization, "targeted_optimization"),
                    (OptimizationRoute::MajorOptimization, "comprehensive_rewrite"),
                ],
            )
            .add_edge("monitor_only", "predict_inclusion")
            .add_edge("targeted_optimization", "predict_inclusion")
            .add_edge("comprehensive_rewrite", "predict_inclusion")
            .add_edge("predict_inclusion", END)
            .set_entry("scrape_ai_overview")
            .build()?;

        Ok(Self { graph })
    }

    pub async fn run(&self, target_keywords: Vec<String>) -> WorkflowResult<GeoReport> {
        let run_id = RunId::new();
        let initial = GeoState {
            target_keywords,
            ..GeoState::default()
        };

        let finished = self
            .graph
            .run(initial)
            .await
            .map_err(|e| WorkflowError::from_run(run_id.clone(), e))?;

        info!(
            run_id = %run_id,
            strategy = %finished.optimization_strategy,
            score = finished.content_analysis.average_inclusion_score,
            "GEO optimization run complete"
        );

        Ok(GeoReport {
            optimization_results: finished
                .content_analysis
                .per_keyword_scores
                .iter()
                .map(|ks| KeywordOptimization {
                    keyword: ks.keyword.clone(),
                    inclusion_score: ks.score,
                })
                .collect(),
            strategy: finished.optimization_strategy,
            optimized_content: finished.optimized_content,
            prediction: finished.inclusion_predictions,
        })
    }
}

/// Flatten scraped AI Overview data into competitor snippets.
fn extract_snippets(data: &HashMap<String, AiOverview>) -> Vec<CompetitorSnippet> {
    let mut snippets: Vec<CompetitorSnippet> = data
        .iter()
        .filter(|(_, overview)| overview.present)
        .flat_map(|(keyword, overview)| {
            overview
                .cited_sources
                .iter()
                .enumerate()
                .map(move |(idx, domain)| CompetitorSnippet {
                    keyword: keyword.clone(),
                    domain: domain.clone(),
                    snippet: overview.summary.clone(),
                    position: Some(idx as u32 + 1),
                })
        })
        .collect();
    // HashMap iteration order is arbitrary; keep output deterministic.
    snippets.sort_by(|a, b| (&a.keyword, a.position).cmp(&(&b.keyword, b.position)));
    snippets
}
