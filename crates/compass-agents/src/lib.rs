//! Analysis agents.
//!
//! Each agent owns a completion client handle and the model parameters it
//! calls with (the heavier optimizer gets a larger model via per-agent
//! config). Agents render an embedded prompt template, await the raw
//! completion, and parse it into the shared record types; a response that
//! cannot be parsed surfaces as `ResponseParse`.

pub mod brand_enforcer;
pub mod content_evaluator;
pub mod content_optimizer;
pub mod gap_analyzer;
pub mod intent_extractor;
pub mod news_scanner;
pub mod prompts;

pub use brand_enforcer::BrandEnforcer;
pub use content_evaluator::ContentEvaluator;
pub use content_optimizer::ContentOptimizer;
pub use gap_analyzer::GapAnalyzer;
pub use intent_extractor::IntentExtractor;
pub use news_scanner::NewsScanner;
