use std::sync::Arc;

use crate::llm_client::InferenceGateway;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Built once at startup; tiers and budgets are read-only afterwards.
    pub gateway: Arc<InferenceGateway>,
}
