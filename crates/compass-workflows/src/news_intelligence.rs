use std::cmp::Ordering;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use compass_agents::{GapAnalyzer, IntentExtractor, NewsScanner};
use compass_core::config::AppConfig;
use compass_core::error::Result;
use compass_core::traits::CompletionClient;
use compass_core::types::{Article, ContentOpportunity, NewsReport, RunId, UrgencyLevel};
use compass_graph::{stage_fn, Graph, GraphBuilder, END};

use crate::state::NewsIntelState;
use crate::{WorkflowError, WorkflowResult};

const URGENCY_THRESHOLD: f64 = 80.0;
const TOP_OPPORTUNITIES: usize = 5;

/// News intelligence: scan incoming articles for relevance, extract the
/// search intents they trigger, find competitive gaps, and prioritize the
/// resulting content opportunities. Linear four-stage chain.
pub struct NewsIntelligenceWorkflow {
    graph: Graph<NewsIntelState>,
}

impl NewsIntelligenceWorkflow {
    pub fn new(client: Arc<dyn CompletionClient>, config: &AppConfig) -> Result<Self> {
        let scanner = Arc::new(NewsScanner::new(
            Arc::clone(&client),
            config.model_for("news_scanner").clone(),
        ));
        let extractor = Arc::new(IntentExtractor::new(
            Arc::clone(&client),
            config.model_for("intent_extractor").clone(),
        ));
        let analyzer = Arc::new(GapAnalyzer::new(
            Arc::clone(&client),
            config.model_for("gap_analyzer").clone(),
        ));

        let scan_news = {
            let scanner = Arc::clone(&scanner);
            stage_fn(move |mut state: NewsIntelState| {
                let scanner = Arc::clone(&scanner);
                async move {
                    state.relevant_news = scanner
                        .analyze_relevance(&state.rss_articles, &state.tracked_keywords)
                        .await?;
                    Ok(state)
                }
            })
        };

        let extract_intents = {
            let extractor = Arc::clone(&extractor);
            stage_fn(move |mut state: NewsIntelState| {
                let extractor = Arc::clone(&extractor);
                async move {
                    state.extracted_intents =
                        extractor.extract_from_news(&state.relevant_news).await?;
                    Ok(state)
                }
            })
        };

        let analyze_gaps = {
            let analyzer = Arc::clone(&analyzer);
            stage_fn(move |mut state: NewsIntelState| {
                let analyzer = Arc::clone(&analyzer);
                async move {
                    state.competitive_gaps = analyzer
                        .find_opportunities(&state.extracted_intents, &state.tracked_keywords)
                        .await?;
                    Ok(state)
                }
            })
        };

        let prioritize = stage_fn(|mut state: NewsIntelState| async move {
            let (opportunities, priority_level) = prioritize_gaps(&state);
            state.content_opportunities = opportunities;
            state.priority_level = priority_level;
            Ok(state)
        });

        let graph = GraphBuilder::new()
            .add_stage("scan_news", scan_news)
            .add_stage("extract_intents", extract_intents)
            .add_stage("analyze_gaps", analyze_gaps)
            .add_stage("prioritize_opportunities", prioritize)
            .add_edge("scan_news", "extract_intents")
            .add_edge("extract_intents", "analyze_gaps")
            .add_edge("analyze_gaps", "prioritize_opportunities")
            .add_edge("prioritize_opportunities", END)
            .set_entry("scan_news")
            .build()?;

        Ok(Self { graph })
    }

    /// Run the full pipeline and shape the result for the dashboard.
    pub async fn run(
        &self,
        rss_articles: Vec<Article>,
        tracked_keywords: Vec<String>,
    ) -> WorkflowResult<NewsReport> {
        let run_id = RunId::new();
        let total_analyzed = rss_articles.len();
        let initial = NewsIntelState {
            rss_articles,
            tracked_keywords,
            ..NewsIntelState::default()
        };

        let finished = self
            .graph
            .run(initial)
            .await
            .map_err(|e| WorkflowError::from_run(run_id.clone(), e))?;

        let urgent_count = finished
            .content_opportunities
            .iter()
            .filter(|op| op.urgency_level == UrgencyLevel::Urgent)
            .count();
        info!(
            run_id = %run_id,
            opportunities = finished.content_opportunities.len(),
            urgent_count, total_analyzed, "news intelligence run complete"
        );

        Ok(NewsReport {
            content_opportunities: finished.content_opportunities,
            urgent_count,
            total_analyzed,
            analysis_timestamp: Utc::now(),
        })
    }
}

/// Rank gaps into the top content opportunities.
///
/// The run-level priority is urgent only when a non-empty top slice
/// contains an opportunity above the threshold; an empty gap list yields a
/// normal, empty report.
fn prioritize_gaps(state: &NewsIntelState) -> (Vec<ContentOpportunity>, UrgencyLevel) {
    let mut opportunities: Vec<ContentOpportunity> = state
        .competitive_gaps
        .iter()
        .map(|gap| ContentOpportunity {
            headline: gap.potential_headline.clone(),
            priority: gap.urgency_score,
            keywords: gap.target_keywords.clone(),
            content_angle: gap.recommended_angle.clone(),
            ai_overview_gap: gap.competitor_weakness.clone(),
            estimated_traffic: gap.traffic_potential.clone(),
            urgency_level: if gap.urgency_score > URGENCY_THRESHOLD {
                UrgencyLevel::Urgent
            } else {
                UrgencyLevel::Normal
            },
        })
        .collect();

    opportunities.sort_by(|a, b| {
        b.priority
            .partial_cmp(&a.priority)
            .unwrap_or(Ordering::Equal)
    });
    opportunities.truncate(TOP_OPPORTUNITIES);

    let priority_level = match opportunities.first() {
        Some(top) if top.priority > URGENCY_THRESHOLD => UrgencyLevel::Urgent,
        _ => UrgencyLevel::Normal,
    };

    (opportunities, priority_level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use compass_core::types::CompetitiveGap;
    use compass_test_utils::{article, MockCompletionClient};

    fn config() -> AppConfig {
        AppConfig {
            model: compass_core::config::ModelConfig {
                provider: "azure".into(),
                model_id: "gpt-4o-mini".into(),
                api_key: None,
                base_url: None,
                azure_resource: None,
                azure_deployment: None,
                azure_api_version: None,
                max_tokens: 1500,
                temperature: 0.3,
            },
            models: Default::default(),
            rank_tracker: None,
            serp: None,
            news: Default::default(),
            workflow: Default::default(),
        }
    }

    fn gap(headline: &str, score: f64) -> CompetitiveGap {
        CompetitiveGap {
            potential_headline: headline.to_string(),
            urgency_score: score,
            target_keywords: vec!["mortgage rates".to_string()],
            recommended_angle: "explainer".to_string(),
            competitor_weakness: "shallow".to_string(),
            traffic_potential: "high".to_string(),
        }
    }

    #[test]
    fn test_prioritize_sorts_and_truncates() {
        let state = NewsIntelState {
            competitive_gaps: (0..8).map(|i| gap(&format!("g{i}"), i as f64 * 10.0)).collect(),
            ..NewsIntelState::default()
        };
        let (ops, _) = prioritize_gaps(&state);
        assert_eq!(ops.len(), 5);
        assert_eq!(ops[0].headline, "g7");
        assert!(ops.windows(2).all(|w| w[0].priority >= w[1].priority));
    }

    #[test]
    fn test_priority_level_urgent_above_threshold() {
        let state = NewsIntelState {
            competitive_gaps: vec![gap("hot", 90.0), gap("cool", 40.0)],
            ..NewsIntelState::default()
        };
        let (ops, level) = prioritize_gaps(&state);
        assert_eq!(level, UrgencyLevel::Urgent);
        assert_eq!(ops[0].urgency_level, UrgencyLevel::Urgent);
        assert_eq!(ops[1].urgency_level, UrgencyLevel::Normal);
    }

    #[test]
    fn test_empty_gap_list_is_normal_not_a_panic() {
        let state = NewsIntelState::default();
        let (ops, level) = prioritize_gaps(&state);
        assert!(ops.is_empty());
        assert_eq!(level, UrgencyLevel::Normal);
    }

    #[test]
    fn test_threshold_boundary_is_exclusive() {
        let state = NewsIntelState {
            competitive_gaps: vec![gap("edge", 80.0)],
            ..NewsIntelState::default()
        };
        let (_, level) = prioritize_gaps(&state);
        assert_eq!(level, UrgencyLevel::Normal);
    }

    #[tokio::test]
    async fn test_full_run_over_mock_completions() {
        let client = Arc::new(MockCompletionClient::new([
            // scan_news
            r#"{"relevant_articles":[{"headline":"ECB cuts rates","url":"https://x","relevance_score":92,"relevance_reason":"rates","matched_keywords":["mortgage rates"]}]}"#,
            // extract_intents
            r#"{"extracted_intents":[{"query":"will mortgage rates drop","intent_type":"informational","audience":"homeowners","source_headline":"ECB cuts rates"}]}"#,
            // analyze_gaps
            r#"[{"potential_headline":"What the cut means for you","urgency_score":86,"target_keywords":["mortgage rates"],"recommended_angle":"explainer","competitor_weakness":"no numbers","traffic_potential":"high"}]"#,
        ]));
        let workflow = NewsIntelligenceWorkflow::new(client, &config()).unwrap();

        let report = workflow
            .run(
                vec![article("ECB cuts rates", 0), article("Other story", 1)],
                vec!["mortgage rates".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(report.total_analyzed, 2);
        assert_eq!(report.content_opportunities.len(), 1);
        assert_eq!(report.urgent_count, 1);
    }

    #[tokio::test]
    async fn test_failed_scan_names_the_stage() {
        let client = Arc::new(MockCompletionClient::failing("HTTP 503: overloaded"));
        let workflow = NewsIntelligenceWorkflow::new(client, &config()).unwrap();

        let err = workflow
            .run(vec![article("x", 0)], vec![])
            .await
            .unwrap_err();
        assert_eq!(err.stage, "scan_news");
        // Every failed run carries a v4 uuid naming the run.
        assert_eq!(err.run_id.0.len(), 36);
    }
}
