//! Doctor- and patient-facing summaries from a text-in/text-out oracle.
//!
//! The oracle is never allowed to fail a report: errors become
//! [`SUMMARY_UNAVAILABLE`] and a warning.

pub mod ollama;

pub use ollama::OllamaSummarizer;

use crate::models::Audience;

/// Placeholder shown when no summary could be produced.
pub const SUMMARY_UNAVAILABLE: &str = "(summary unavailable)";

#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("Ollama not reachable at {0}")]
    OllamaConnection(String),

    #[error("Summary request timed out after {0}s")]
    Timeout(u64),

    #[error("Ollama returned error {status}: {body}")]
    OllamaError { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Failed to parse summary response: {0}")]
    ResponseParsing(String),

    #[error("Summary response was empty")]
    EmptyResponse,

    #[error("No summarizer configured")]
    Disabled,
}

pub trait Summarizer: Send + Sync {
    fn summarize(&self, text: &str, audience: Audience) -> Result<String, SummaryError>;
}

/// Summarize, or return the placeholder if the oracle fails.
pub fn summarize_or_placeholder(summarizer: &dyn Summarizer, text: &str, audience: Audience) -> String {
    match summarizer.summarize(text, audience) {
        Ok(summary) => summary,
        Err(e) => {
            tracing::warn!(audience = %audience, error = %e, "Summary unavailable");
            SUMMARY_UNAVAILABLE.to_string()
        }
    }
}

/// Summarizer used when none could be configured; always unavailable.
pub struct DisabledSummarizer;

impl Summarizer for DisabledSummarizer {
    fn summarize(&self, _text: &str, _audience: Audience) -> Result<String, SummaryError> {
        Err(SummaryError::Disabled)
    }
}

/// Mock summarizer for testing: returns `"<prefix> (<audience>)"` or fails.
pub struct MockSummarizer {
    response: Option<String>,
}

impl MockSummarizer {
    pub fn new(response: &str) -> Self {
        Self {
            response: Some(response.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self { response: None }
    }
}

impl Summarizer for MockSummarizer {
    fn summarize(&self, _text: &str, audience: Audience) -> Result<String, SummaryError> {
        match &self.response {
            Some(r) => Ok(format!("{r} ({audience})")),
            None => Err(SummaryError::OllamaConnection("mock".into())),
        }
    }
}
