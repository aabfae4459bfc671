//! Reasoning-engine access.
//!
//! Callers never see an engine failure as an error: [`complete_json`] and
//! [`complete_text`] fold every failure into [`AiOutcome::Degraded`], which
//! carries a placeholder value plus the diagnostic string.

mod openai;
pub mod prompts;
#[cfg(test)]
pub mod scripted;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

pub use openai::OpenAiClient;

/// One chat completion: a system instruction plus a user prompt.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: &'static str,
    pub prompt: String,
    pub temperature: f32,
    /// Ask the engine for a JSON object only.
    pub json_output: bool,
}

#[derive(Error, Debug)]
pub enum AiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("engine returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("engine returned no content")]
    EmptyResponse,

    #[error("invalid JSON in engine output: {0}")]
    Decode(#[from] serde_json::Error),
}

#[async_trait]
pub trait ReasoningEngine: Send + Sync {
    /// Returns the raw text content of the first completion choice.
    async fn complete(&self, request: CompletionRequest) -> Result<String, AiError>;
}

/// Result of a reasoning call that is not allowed to fail.
#[derive(Debug, Clone, PartialEq)]
pub enum AiOutcome<T> {
    Parsed(T),
    Degraded { value: T, reason: String },
}

impl<T> AiOutcome<T> {
    pub fn value(&self) -> &T {
        match self {
            AiOutcome::Parsed(v) | AiOutcome::Degraded { value: v, .. } => v,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            AiOutcome::Parsed(v) | AiOutcome::Degraded { value: v, .. } => v,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, AiOutcome::Degraded { .. })
    }
}

/// Strips a surrounding markdown code fence (```` ```json ```` or ```` ``` ````).
pub fn strip_code_fences(raw: &str) -> &str {
    let mut content = raw.trim();
    if let Some(rest) = content.strip_prefix("```json") {
        content = rest;
    }
    if let Some(rest) = content.strip_prefix("```") {
        content = rest;
    }
    if let Some(rest) = content.strip_suffix("```") {
        content = rest;
    }
    content.trim()
}

pub fn decode_json<T: DeserializeOwned>(raw: &str) -> Result<T, AiError> {
    Ok(serde_json::from_str(strip_code_fences(raw))?)
}

pub async fn complete_json<T, F>(
    engine: &dyn ReasoningEngine,
    request: CompletionRequest,
    fallback: F,
) -> AiOutcome<T>
where
    T: DeserializeOwned,
    F: FnOnce(&str) -> T,
{
    let decoded = match engine.complete(request).await {
        Ok(raw) => decode_json::<T>(&raw),
        Err(e) => Err(e),
    };
    match decoded {
        Ok(value) => AiOutcome::Parsed(value),
        Err(e) => degrade(e, fallback),
    }
}

pub async fn complete_text<F>(
    engine: &dyn ReasoningEngine,
    request: CompletionRequest,
    fallback: F,
) -> AiOutcome<String>
where
    F: FnOnce(&str) -> String,
{
    match engine.complete(request).await {
        Ok(text) => AiOutcome::Parsed(text.trim().to_string()),
        Err(e) => degrade(e, fallback),
    }
}

fn degrade<T, F: FnOnce(&str) -> T>(error: AiError, fallback: F) -> AiOutcome<T> {
    let reason = error.to_string();
    warn!(error = %reason, "reasoning engine call degraded to fallback");
    AiOutcome::Degraded {
        value: fallback(&reason),
        reason,
    }
}
