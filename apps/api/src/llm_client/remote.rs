//! Remote tier: an Ollama-compatible `/api/generate` endpoint.
//!
//! Every failure (transport, non-2xx, bad body, empty text) is folded into an
//! `AdapterOutcome` so the gateway never sees a protocol-level error.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::llm_client::{AdapterOutcome, BackendAdapter, Prompt};

const GENERATE_PATH: &str = "/api/generate";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateReply {
    #[serde(default)]
    response: String,
}

#[derive(Debug, Deserialize)]
struct OllamaError {
    error: String,
}

/// Client for a networked inference server speaking the Ollama generate API.
#[derive(Clone)]
pub struct RemoteAdapter {
    client: Client,
    base_url: String,
    default_model: String,
}

impl RemoteAdapter {
    pub fn new(base_url: impl Into<String>, default_model: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, default_model)
    }

    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            default_model: default_model.into(),
        }
    }

    /// Makes a single, non-streaming generate call. No retries: the cascade
    /// moves to the next tier instead.
    pub async fn call(
        &self,
        prompt: &Prompt,
        model: &str,
        timeout: Option<Duration>,
    ) -> Result<String, LlmError> {
        let body = GenerateBody {
            model,
            prompt: &prompt.user_text,
            system: Some(prompt.system_text.as_str()).filter(|s| !s.is_empty()),
            stream: false,
        };

        let mut request = self
            .client
            .post(format!("{}{GENERATE_PATH}", self.base_url))
            .json(&body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OllamaError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?;
        let reply: GenerateReply = serde_json::from_slice(&bytes)?;

        if reply.response.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }

        debug!(
            "Remote generate succeeded: model={}, chars={}",
            model,
            reply.response.len()
        );

        Ok(reply.response)
    }
}

#[async_trait]
impl BackendAdapter for RemoteAdapter {
    fn name(&self) -> &str {
        "remote"
    }

    fn supports_model_selection(&self) -> bool {
        true
    }

    fn model_id(&self, model: Option<&str>) -> String {
        model.unwrap_or(&self.default_model).to_string()
    }

    async fn invoke(
        &self,
        prompt: &Prompt,
        model: Option<&str>,
        timeout: Option<Duration>,
    ) -> AdapterOutcome {
        let model = model.unwrap_or(&self.default_model);
        match self.call(prompt, model, timeout).await {
            Ok(text) => AdapterOutcome::Success(text),
            Err(LlmError::Http(e)) if e.is_timeout() => AdapterOutcome::Timeout,
            Err(e) => AdapterOutcome::Unavailable(e.to_string()),
        }
    }
}
