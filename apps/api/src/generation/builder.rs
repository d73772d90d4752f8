//! Prompt builder: turns a typed request into a (system, user) prompt pair.
//!
//! Pure and infallible: input is validated before it gets here. Optional fields
//! that are absent drop their clause entirely instead of rendering a blank.

use crate::generation::prompts::{persona_system_prompt, JOB_LETTER_SYSTEM, LISTING_SYSTEM};
use crate::generation::request::{
    ChatMessageRequest, GenerationRequest, JobLetterRequest, ListingDescriptionRequest,
    RawPromptRequest,
};
use crate::llm_client::Prompt;

pub fn build_prompt(request: GenerationRequest) -> Prompt {
    match request {
        GenerationRequest::JobLetter(r) => job_letter(r),
        GenerationRequest::ListingDescription(r) => listing_description(r),
        GenerationRequest::ChatMessage(r) => chat_message(r),
        GenerationRequest::RawPrompt(r) => raw_prompt(r),
    }
}

fn job_letter(r: JobLetterRequest) -> Prompt {
    let mut user = format!(
        "Write a {} job application letter for {} applying for the position of {} at {}. \
        They have {} years of experience.",
        r.tone, r.applicant_name, r.position, r.company_name, r.experience_years
    );
    push_list_clause(&mut user, "Key skills", &r.skills);
    Prompt::new(JOB_LETTER_SYSTEM, user)
}

fn listing_description(r: ListingDescriptionRequest) -> Prompt {
    let mut user = format!(
        "Write a {} description for a {} ({}). Condition: {}.",
        r.tone, r.title, r.category, r.condition
    );
    push_list_clause(&mut user, "Key features", &r.features);
    if let Some(price) = r.price {
        user.push_str(&format!(" Price: TT${price:.2}."));
    }
    Prompt::new(LISTING_SYSTEM, user)
}

/// Appends ` {label}: a, b.` unless the list has nothing non-blank in it.
fn push_list_clause(user: &mut String, label: &str, items: &[String]) {
    let items: Vec<&str> = items
        .iter()
        .map(|i| i.trim())
        .filter(|i| !i.is_empty())
        .collect();
    if !items.is_empty() {
        user.push_str(&format!(" {label}: {}.", items.join(", ")));
    }
}

fn chat_message(r: ChatMessageRequest) -> Prompt {
    let system = match r.system_prompt {
        Some(explicit) if !explicit.trim().is_empty() => explicit,
        _ => persona_system_prompt(r.persona).to_string(),
    };

    let mut user = String::new();
    if let Some(context) = r.context.as_deref().filter(|c| !c.trim().is_empty()) {
        user.push_str(&format!("Context: {context}\n\n"));
    }
    user.push_str(&format!("User: {}\nBot:", r.message));

    Prompt::new(system, user)
}

fn raw_prompt(r: RawPromptRequest) -> Prompt {
    Prompt::new(r.system_prompt.unwrap_or_default(), r.prompt).with_model_hint(r.model)
}
