/// LLM Client: the single point of entry for all model calls in Scribe.
///
/// ARCHITECTURAL RULE: No other module may talk to an inference backend directly.
/// Handlers build a `Prompt` and hand it to the `InferenceGateway`, which walks
/// the configured tiers (remote → local → mock) until one of them answers.
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod gateway;
pub mod gguf;
pub mod local;
pub mod mock;
pub mod prompts;
pub mod remote;

pub use gateway::{GatewayConfig, GatewayError, InferenceGateway, Tier};
pub use local::LocalAdapter;
pub use mock::MockAdapter;
pub use remote::RemoteAdapter;

/// A model-ready prompt. Built once per request by the prompt builder and
/// owned by the dispatch call that consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system_text: String,
    pub user_text: String,
    /// Named model requested by the caller, if any.
    pub model_hint: Option<String>,
}

impl Prompt {
    pub fn new(system_text: impl Into<String>, user_text: impl Into<String>) -> Self {
        Self {
            system_text: system_text.into(),
            user_text: user_text.into(),
            model_hint: None,
        }
    }

    pub fn with_model_hint(mut self, model: Option<String>) -> Self {
        self.model_hint = model;
        self
    }
}

/// Result of a single tier attempt. Failure is a value here, not an error:
/// the cascade inspects it and moves on. Never leaves the crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AdapterOutcome {
    Success(String),
    Unavailable(String),
    Timeout,
}

/// The normalized response returned to callers.
///
/// `latency_ms` is serialized as `processing_time_ms` to match the public contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub content: String,
    pub model_used: String,
    #[serde(rename = "processing_time_ms", skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<f64>,
}

/// One inference provider in the fallback cascade.
///
/// Implementations must never surface transport errors: every failure is
/// reported through `AdapterOutcome`.
#[async_trait]
pub(crate) trait BackendAdapter: Send + Sync {
    /// Short label used in logs and tier errors, e.g. "remote".
    fn name(&self) -> &str;

    /// Whether this backend can honour a caller-supplied model name.
    fn supports_model_selection(&self) -> bool {
        false
    }

    /// The identifier reported as `model_used` when this tier answers.
    fn model_id(&self, model: Option<&str>) -> String;

    /// Sends the prompt to the backend. `model` is only passed to adapters that
    /// support model selection. `timeout` is the tier budget, if any.
    async fn invoke(
        &self,
        prompt: &Prompt,
        model: Option<&str>,
        timeout: Option<Duration>,
    ) -> AdapterOutcome;
}
