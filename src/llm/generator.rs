//! Core `ScriptGenerator` trait and the `ApiGenerator` implementation.
//!
//! `ApiGenerator` calls any OpenAI-compatible `/v1/chat/completions` endpoint:
//! OpenAI, Moonshot, Ollama (OpenAI mode), LM Studio, vLLM, etc.
//! All connection details come from [`LlmConfig`]; nothing is hardcoded.

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::config::{GenerationConfig, LlmConfig};
use crate::llm::prompt::PromptBuilder;
use crate::llm::response::{clean_script, parse_terms};
use crate::params::{VideoLanguage, VideoTerms};

// ---------------------------------------------------------------------------
// LlmError
// ---------------------------------------------------------------------------

/// Errors that can occur while talking to the generation backend.
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("LLM request timed out")]
    Timeout,

    /// The provider needs an API key and none is configured.
    #[error("no API key configured for this provider")]
    MissingApiKey,

    /// The provider rejected the credentials (401 / 403).
    #[error("authentication rejected: {0}")]
    Auth(String),

    /// The provider is rate limiting or the quota is exhausted (429).
    #[error("quota exceeded or rate limited: {0}")]
    Quota(String),

    /// Any other non-success HTTP status.
    #[error("LLM endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The HTTP response could not be parsed as expected.
    #[error("failed to parse LLM response: {0}")]
    Parse(String),

    /// The LLM returned a response with no usable content.
    #[error("LLM returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// ScriptGenerator trait
// ---------------------------------------------------------------------------

/// Async trait for the two generation stages.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn ScriptGenerator>`.  Neither method may return an empty value on
/// success: an empty reply is [`LlmError::EmptyResponse`].
#[async_trait]
pub trait ScriptGenerator: Send + Sync {
    /// Draft a narration script for `subject`.  [`VideoLanguage::Auto`]
    /// leaves the language to the backend.
    async fn generate_script(
        &self,
        subject: &str,
        language: VideoLanguage,
    ) -> Result<String, LlmError>;

    /// Derive English search terms from `subject` and a non-empty `script`.
    async fn generate_terms(&self, subject: &str, script: &str) -> Result<VideoTerms, LlmError>;
}

// ---------------------------------------------------------------------------
// ApiGenerator
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/chat/completions` endpoint.
pub struct ApiGenerator {
    client: reqwest::Client,
    config: LlmConfig,
    prompts: PromptBuilder,
}

impl ApiGenerator {
    /// Build an `ApiGenerator` from application config.
    ///
    /// The HTTP client carries the per-request timeout from
    /// `llm.timeout_secs`.  A default client is used if the builder fails.
    pub fn from_config(llm: &LlmConfig, generation: &GenerationConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(llm.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: llm.clone(),
            prompts: PromptBuilder::new(generation.paragraph_number, generation.term_amount),
        }
    }

    /// Send one system + user exchange and return the trimmed reply text.
    ///
    /// The `Authorization: Bearer …` header is attached only when
    /// `config.api_key` is a non-empty string.
    async fn chat(&self, system_msg: &str, user_msg: &str) -> Result<String, LlmError> {
        let key = self.config.api_key.as_deref().unwrap_or("");
        if key.is_empty() && self.config.provider.requires_api_key() {
            return Err(LlmError::MissingApiKey);
        }

        let url = format!("{}/v1/chat/completions", self.config.endpoint());

        let body = serde_json::json!({
            "model":       self.config.model,
            "messages": [
                { "role": "system", "content": system_msg },
                { "role": "user",   "content": user_msg   }
            ],
            "stream":      false,
            "temperature": self.config.temperature
        });

        let mut req = self.client.post(&url).json(&body);
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        log::debug!("llm: POST {url} (model={})", self.config.model);
        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(status, text));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(LlmError::EmptyResponse)?
            .trim()
            .to_string();

        if content.is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        Ok(content)
    }
}

fn status_error(status: StatusCode, body: String) -> LlmError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::Auth(body),
        StatusCode::TOO_MANY_REQUESTS => LlmError::Quota(body),
        other => LlmError::Status {
            status: other.as_u16(),
            body,
        },
    }
}

#[async_trait]
impl ScriptGenerator for ApiGenerator {
    async fn generate_script(
        &self,
        subject: &str,
        language: VideoLanguage,
    ) -> Result<String, LlmError> {
        let (system_msg, user_msg) = self.prompts.script_chat(subject, language);
        let reply = self.chat(&system_msg, &user_msg).await?;

        let script = clean_script(&reply, self.prompts.paragraph_number());
        if script.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        log::info!("llm: generated script ({} chars)", script.chars().count());
        Ok(script)
    }

    async fn generate_terms(&self, subject: &str, script: &str) -> Result<VideoTerms, LlmError> {
        let (system_msg, user_msg) = self.prompts.terms_chat(subject, script);
        let reply = self.chat(&system_msg, &user_msg).await?;

        let terms = parse_terms(&reply)?;
        log::info!("llm: generated terms: {terms}");
        Ok(terms)
    }
}

// ---------------------------------------------------------------------------
// MockGenerator  (test-only)
// ---------------------------------------------------------------------------

/// A test double that returns pre-configured replies and counts how often
/// each stage was called.
#[cfg(test)]
pub struct MockGenerator {
    script: Result<String, LlmError>,
    terms: Result<VideoTerms, LlmError>,
    delay: Option<std::time::Duration>,
    script_calls: std::sync::atomic::AtomicUsize,
    terms_calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockGenerator {
    /// Both stages succeed with the given values.
    pub fn ok(script: &str, terms: &[&str]) -> Self {
        Self::with(Ok(script.to_string()), Ok(VideoTerms::from_terms(terms)))
    }

    pub fn with(script: Result<String, LlmError>, terms: Result<VideoTerms, LlmError>) -> Self {
        Self {
            script,
            terms,
            delay: None,
            script_calls: Default::default(),
            terms_calls: Default::default(),
        }
    }

    /// Sleep before every reply.
    pub fn delayed(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn script_calls(&self) -> usize {
        self.script_calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn terms_calls(&self) -> usize {
        self.terms_calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl ScriptGenerator for MockGenerator {
    async fn generate_script(
        &self,
        _subject: &str,
        _language: VideoLanguage,
    ) -> Result<String, LlmError> {
        self.script_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.script.clone()
    }

    async fn generate_terms(&self, _subject: &str, _script: &str) -> Result<VideoTerms, LlmError> {
        self.terms_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.terms.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
