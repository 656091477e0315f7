use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompassError {
    // Graph wiring errors: programming defects, never retried
    #[error("graph contains a cycle: {cycle}")]
    GraphCycle { cycle: String },

    #[error("router at stage '{stage}' produced unregistered label '{label}'")]
    UnknownRoute { stage: String, label: String },

    // Completion errors
    #[error("completion response could not be parsed ({detail}): {raw}")]
    ResponseParse { detail: String, raw: String },

    // Collaborator capability errors
    #[error("external call to {capability} failed: {message}")]
    ExternalCall { capability: String, message: String },

    // Stage errors
    #[error("stage '{stage}' failed: {message}")]
    StageExecution { stage: String, message: String },

    // Config errors
    #[error("config error: {0}")]
    Config(String),

    #[error("config file not found: {0}")]
    ConfigNotFound(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CompassError {
    /// Build a `ResponseParse` error, truncating the offending text so
    /// diagnostics stay bounded.
    pub fn response_parse(detail: impl Into<String>, raw: &str) -> Self {
        const MAX_RAW: usize = 200;
        let truncated = if raw.len() > MAX_RAW {
            let mut end = MAX_RAW;
            while !raw.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...", &raw[..end])
        } else {
            raw.to_string()
        };
        Self::ResponseParse {
            detail: detail.into(),
            raw: truncated,
        }
    }

    pub fn external(capability: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalCall {
            capability: capability.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CompassError>;
