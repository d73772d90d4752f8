//! Axum route handlers for the Generation API.

use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::generation::generator::generate;
use crate::generation::request::{
    ChatMessageRequest, GenerationRequest, JobLetterRequest, ListingDescriptionRequest,
    RawPromptRequest,
};
use crate::llm_client::ResponseEnvelope;
use crate::state::AppState;

async fn run(
    state: &AppState,
    request: GenerationRequest,
) -> Result<Json<ResponseEnvelope>, AppError> {
    request.validate()?;
    let envelope = generate(&state.gateway, request).await?;
    Ok(Json(envelope))
}

/// POST /generate-job-letter
pub async fn handle_job_letter(
    State(state): State<AppState>,
    Json(request): Json<JobLetterRequest>,
) -> Result<Json<ResponseEnvelope>, AppError> {
    run(&state, GenerationRequest::JobLetter(request)).await
}

/// POST /generate-listing-description
pub async fn handle_listing_description(
    State(state): State<AppState>,
    Json(request): Json<ListingDescriptionRequest>,
) -> Result<Json<ResponseEnvelope>, AppError> {
    run(&state, GenerationRequest::ListingDescription(request)).await
}

/// POST /chatbot-reply
///
/// Persona picks the system prompt unless the caller supplies one.
pub async fn handle_chatbot_reply(
    State(state): State<AppState>,
    Json(request): Json<ChatMessageRequest>,
) -> Result<Json<ResponseEnvelope>, AppError> {
    run(&state, GenerationRequest::ChatMessage(request)).await
}

/// POST /generate
///
/// Raw prompt passthrough. `model` is honoured by the remote tier only.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<RawPromptRequest>,
) -> Result<Json<ResponseEnvelope>, AppError> {
    run(&state, GenerationRequest::RawPrompt(request)).await
}
