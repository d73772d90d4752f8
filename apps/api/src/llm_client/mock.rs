//! Mock tier: deterministic placeholder used only in disconnected/dev mode.
//!
//! The gateway appends this tier only when `GatewayConfig::mock_enabled` is set.

use std::time::Duration;

use async_trait::async_trait;

use crate::llm_client::prompts::{preview, MOCK_PREVIEW_CHARS};
use crate::llm_client::{AdapterOutcome, BackendAdapter, Prompt};

pub const MOCK_MODEL_ID: &str = "mock";

#[derive(Debug, Clone, Copy, Default)]
pub struct MockAdapter;

impl MockAdapter {
    /// Same prompt in, same placeholder out.
    pub fn placeholder(prompt: &Prompt) -> String {
        format!(
            "[DEV MODE] Mock response for: {}...",
            preview(&prompt.user_text, MOCK_PREVIEW_CHARS)
        )
    }
}

#[async_trait]
impl BackendAdapter for MockAdapter {
    fn name(&self) -> &str {
        "mock"
    }

    fn model_id(&self, _model: Option<&str>) -> String {
        MOCK_MODEL_ID.to_string()
    }

    async fn invoke(
        &self,
        prompt: &Prompt,
        _model: Option<&str>,
        _timeout: Option<Duration>,
    ) -> AdapterOutcome {
        AdapterOutcome::Success(Self::placeholder(prompt))
    }
}
