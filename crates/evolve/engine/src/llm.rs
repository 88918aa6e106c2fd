use crate::error::ProposerError;
use crate::prompt::PromptBuilder;
use crate::proposer::Proposer;
use async_trait::async_trait;
use maple_evolve_types::ProgramRecord;
use reqwest::{Client, Url};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const AUTH_ENV_VAR: &str = "GEMINI_API_KEY";
pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Sends a prompt to a text-completion service.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ProposerError>;
}

/// [`Proposer`] backed by a language model.
#[derive(Clone)]
pub struct LlmProposer {
    transport: Arc<dyn CompletionTransport>,
    prompts: PromptBuilder,
    task: Option<String>,
}

impl std::fmt::Debug for LlmProposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmProposer")
            .field("prompts", &self.prompts)
            .field("task", &self.task)
            .finish()
    }
}

impl LlmProposer {
    pub fn new(transport: Arc<dyn CompletionTransport>) -> Self {
        Self {
            transport,
            prompts: PromptBuilder::new(),
            task: None,
        }
    }

    /// Problem statement included in every prompt.
    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.task = Some(task.into());
        self
    }

    pub fn with_prompt_builder(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }
}

#[async_trait]
impl Proposer for LlmProposer {
    #[instrument(skip_all, fields(parent_id = %parent.id, inspirations = inspirations.len()))]
    async fn propose(
        &self,
        parent: &ProgramRecord,
        inspirations: &[ProgramRecord],
    ) -> Result<String, ProposerError> {
        let prompt = self.prompts.build(self.task.as_deref(), parent, inspirations);
        debug!(prompt_len = prompt.len(), "requesting completion");
        let raw = self.transport.complete(&prompt).await?;
        let patch = strip_code_fences(&raw);
        if patch.is_empty() {
            return Err(ProposerError::InvalidResponse("empty completion".into()));
        }
        Ok(patch)
    }
}

/// Remove a surrounding markdown code fence, if any.
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    // drop the info string (```diff, ```python, ...)
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim_end()
        .to_string()
}

/// Gemini `generateContent` transport.
#[derive(Clone)]
pub struct GeminiTransport {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl std::fmt::Debug for GeminiTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiTransport")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiTransport {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProposerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| ProposerError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
        })
    }

    /// Read the API key from `GEMINI_API_KEY`.
    pub fn from_env() -> Result<Self, ProposerError> {
        let key = std::env::var(AUTH_ENV_VAR)
            .map_err(|_| ProposerError::Config(format!("missing {}", AUTH_ENV_VAR)))?;
        Self::new(key)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> Result<Url, ProposerError> {
        let mut url = if self.endpoint.contains(":generateContent") {
            Url::parse(&self.endpoint)
        } else {
            Url::parse(&format!(
                "{}/v1beta/models/{}:generateContent",
                self.endpoint.trim_end_matches('/'),
                self.model
            ))
        }
        .map_err(|e| ProposerError::Config(format!("invalid gemini endpoint: {}", e)))?;

        if !url.query_pairs().any(|(k, _)| k == "key") {
            url.query_pairs_mut().append_pair("key", &self.api_key);
        }
        Ok(url)
    }
}

#[async_trait]
impl CompletionTransport for GeminiTransport {
    async fn complete(&self, prompt: &str) -> Result<String, ProposerError> {
        let payload = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .client
            .post(self.url()?)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ProposerError::Transport(format!("gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = format!("gemini error {}: {}", status, truncate(&body, 320));
            // 4xx other than rate limiting will not improve on retry
            return if status.is_server_error() || status.as_u16() == 429 {
                Err(ProposerError::Transport(message))
            } else {
                Err(ProposerError::InvalidResponse(message))
            };
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProposerError::InvalidResponse(format!("invalid gemini response: {}", e)))?;
        extract_text(&body)
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_text(body: &Value) -> Result<String, ProposerError> {
    let text = body["candidates"]
        .as_array()
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate["content"]["parts"].as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part["text"].as_str())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(ProposerError::InvalidResponse(
            "gemini response carried no text".into(),
        ));
    }
    Ok(text)
}

fn truncate(value: &str, max_chars: usize) -> String {
    let mut chars = value.chars();
    let truncated: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", truncated)
    } else {
        truncated
    }
}
