use serde::{Deserialize, Serialize};

use super::{Summarizer, SummaryError};
use crate::models::Audience;

/// Report text beyond this many characters is not sent.
const MAX_INPUT_CHARS: usize = 12_000;

const DOCTOR_SYSTEM_PROMPT: &str = "You are a clinician assistant. Read the lab report text and \
produce a concise, technical summary. If any values look out of range, mention them briefly.";

const PATIENT_SYSTEM_PROMPT: &str = "You are a friendly health coach. Summarize the report for a \
patient in simple language, avoid jargon, highlight anything that may need attention, and suggest \
general next steps to discuss with a doctor.";

pub fn system_prompt(audience: Audience) -> &'static str {
    match audience {
        Audience::Doctor => DOCTOR_SYSTEM_PROMPT,
        Audience::Patient => PATIENT_SYSTEM_PROMPT,
    }
}

/// Ollama `/api/chat` client used as the summarization oracle.
pub struct OllamaSummarizer {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaSummarizer {
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self, SummaryError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SummaryError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    stream: bool,
    options: ChatOptions,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<ChatResponseMessage>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

/// First `max` characters of `text`, never splitting a code point.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

impl Summarizer for OllamaSummarizer {
    fn summarize(&self, text: &str, audience: Audience) -> Result<String, SummaryError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            stream: false,
            options: ChatOptions {
                temperature: 0.2,
                num_predict: 400,
            },
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt(audience),
                },
                ChatMessage {
                    role: "user",
                    content: truncate_chars(text, MAX_INPUT_CHARS),
                },
            ],
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    SummaryError::OllamaConnection(self.base_url.clone())
                } else if e.is_timeout() {
                    SummaryError::Timeout(self.timeout_secs)
                } else {
                    SummaryError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SummaryError::OllamaError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| SummaryError::ResponseParsing(e.to_string()))?;

        let content = parsed
            .message
            .map(|m| m.content.trim().to_string())
            .unwrap_or_default();
        if content.is_empty() {
            return Err(SummaryError::EmptyResponse);
        }

        tracing::debug!(audience = %audience, chars = content.len(), "Summary received");
        Ok(content)
    }
}
