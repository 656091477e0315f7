use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use compass_core::config::AppConfig;
use compass_core::traits::{NewsSource, RankTracker, SerpSource};
use compass_core::types::Article;
use compass_llm::RetryOnceClient;
use compass_sources::{HttpRankTracker, HttpSerpSource, StaticNewsSource};
use compass_workflows::{
    ContentGenerationWorkflow, GeoOptimizationWorkflow, NewsIntelligenceWorkflow, WorkflowError,
};

/// Keywords assumed when the rank tracker is unavailable.
const FALLBACK_KEYWORDS: &[&str] = &["mortgage rates", "digital banking", "investment options"];

/// Default log filter when RUST_LOG is unset. Library crates compile with
/// underscored target names, so each one needs its own directive.
const DEFAULT_LOG_FILTER: &str = "warn,compass=info,compass_core=info,compass_graph=info,\
     compass_llm=info,compass_agents=info,compass_workflows=info,compass_sources=info";

#[derive(Parser)]
#[command(name = "compass", version, about = "Content marketing intelligence workflows")]
struct Cli {
    /// Path to config file
    #[arg(short, long, env = "COMPASS_CONFIG", default_value = "compass.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the news intelligence workflow over pre-fetched articles
    News {
        /// JSON file holding the article list (defaults to stdin)
        #[arg(long)]
        articles: Option<PathBuf>,
    },
    /// Run the generative-engine optimization workflow
    Geo {
        /// Keyword to optimize for (repeatable; tracked keywords if omitted)
        #[arg(long)]
        keyword: Vec<String>,
    },
    /// Generate a full article for a content opportunity
    Content {
        /// Opportunity identifier from a previous news run
        #[arg(long)]
        opportunity_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;
    let timeout = Duration::from_secs(config.workflow.timeout_secs);

    let client: Arc<dyn compass_core::traits::CompletionClient> = Arc::new(RetryOnceClient::new(
        compass_llm::client_for(&config.model)?,
    ));

    let outcome = match cli.command {
        Commands::News { articles } => {
            let raw_articles = load_articles(articles.as_deref())?;
            let source = StaticNewsSource::new(raw_articles, config.news.clone());
            let articles = source.fetch_articles().await?;
            let keywords = tracked_keywords(&config).await;
            info!(
                articles = articles.len(),
                keywords = keywords.len(),
                "starting news intelligence run"
            );

            let workflow = NewsIntelligenceWorkflow::new(Arc::clone(&client), &config)?;
            run_with_timeout(timeout, workflow.run(articles, keywords)).await
        }
        Commands::Geo { keyword } => {
            let serp_config = config
                .serp
                .clone()
                .ok_or_else(|| anyhow::anyhow!("[serp] section is required for geo runs"))?;
            let serp: Arc<dyn SerpSource> = Arc::new(HttpSerpSource::new(serp_config));

            let keywords = if keyword.is_empty() {
                tracked_keywords(&config).await
            } else {
                keyword
            };
            info!(keywords = keywords.len(), "starting geo optimization run");

            let workflow = GeoOptimizationWorkflow::new(Arc::clone(&client), serp, &config)?;
            run_with_timeout(timeout, workflow.run(keywords)).await
        }
        Commands::Content { opportunity_id } => {
            info!(%opportunity_id, "starting content generation run");
            let workflow = ContentGenerationWorkflow::new(Arc::clone(&client), &config)?;
            run_with_timeout(timeout, workflow.run(opportunity_id)).await
        }
    };

    match outcome {
        Ok(report) => {
            println!("{report}");
            Ok(())
        }
        Err(rendered) => {
            println!("{rendered}");
            std::process::exit(1);
        }
    }
}

/// Await a workflow run under the configured timeout, rendering either
/// outcome as JSON. An incomplete run is reported as a failure, never as
/// a partial result.
async fn run_with_timeout<T, F>(
    timeout: Duration,
    run: F,
) -> std::result::Result<String, String>
where
    T: serde::Serialize,
    F: std::future::Future<Output = std::result::Result<T, WorkflowError>>,
{
    match tokio::time::timeout(timeout, run).await {
        Ok(Ok(report)) => Ok(serde_json::to_string_pretty(&report)
            .unwrap_or_else(|e| json!({ "stage": "render", "message": e.to_string() }).to_string())),
        Ok(Err(e)) => Err(json!({ "stage": e.stage, "message": e.source.to_string() }).to_string()),
        Err(_) => Err(json!({
            "stage": "timeout",
            "message": format!("workflow did not finish within {}s", timeout.as_secs()),
        })
        .to_string()),
    }
}

/// Tracked keywords from the rank tracker, degrading to the static
/// fallback set when the tracker is missing or unreachable.
async fn tracked_keywords(config: &AppConfig) -> Vec<String> {
    let fallback = || FALLBACK_KEYWORDS.iter().map(|s| s.to_string()).collect();

    let Some(tracker_config) = config.rank_tracker.clone() else {
        info!("no rank tracker configured, using fallback keywords");
        return fallback();
    };

    let tracker = HttpRankTracker::new(tracker_config);
    match tracker.tracked_keywords().await {
        Ok(keywords) if !keywords.is_empty() => keywords,
        Ok(_) => {
            warn!("rank tracker returned no keywords, using fallback set");
            fallback()
        }
        Err(e) => {
            warn!(error = %e, "rank tracker unavailable, using fallback set");
            fallback()
        }
    }
}

/// Articles from a JSON file, or stdin when no path is given.
fn load_articles(path: Option<&std::path::Path>) -> anyhow::Result<Vec<Article>> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)?,
        None => std::io::read_to_string(std::io::stdin())?,
    };
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_filter_covers_library_crates() {
        assert!(EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
        for target in [
            "compass=info",
            "compass_graph=info",
            "compass_workflows=info",
            "compass_sources=info",
        ] {
            assert!(
                DEFAULT_LOG_FILTER.contains(target),
                "missing directive {target}"
            );
        }
    }

    #[test]
    fn test_config_path_from_flag_env_and_default() {
        std::env::remove_var("COMPASS_CONFIG");
        let cli = Cli::try_parse_from(["compass", "news"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("compass.toml"));

        let cli = Cli::try_parse_from(["compass", "--config", "/etc/compass.toml", "news"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/compass.toml"));

        std::env::set_var("COMPASS_CONFIG", "/srv/alt.toml");
        let cli = Cli::try_parse_from(["compass", "news"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("/srv/alt.toml"));
        std::env::remove_var("COMPASS_CONFIG");
    }
}
