//! Generation: the one operation the HTTP layer calls.
//!
//! Flow: build_prompt → gateway.dispatch → ResponseEnvelope.
//! Dropping the returned future (client went away) cancels the in-flight tier.

use tracing::info;

use crate::generation::builder::build_prompt;
use crate::generation::request::GenerationRequest;
use crate::llm_client::{GatewayError, InferenceGateway, ResponseEnvelope};

pub async fn generate(
    gateway: &InferenceGateway,
    request: GenerationRequest,
) -> Result<ResponseEnvelope, GatewayError> {
    let kind = request.kind();
    let prompt = build_prompt(request);
    let envelope = gateway.dispatch(&prompt, None).await?;

    info!(
        "Generated {} via {} ({} chars)",
        kind,
        envelope.model_used,
        envelope.content.len()
    );

    Ok(envelope)
}
