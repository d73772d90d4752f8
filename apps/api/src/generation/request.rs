//! Typed generation requests. Bodies are deserialized and validated at the
//! HTTP edge; by the time a `GenerationRequest` exists it is well-formed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Tone for job application letters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterTone {
    #[default]
    Professional,
    Enthusiastic,
    Confident,
}

impl fmt::Display for LetterTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Professional => write!(f, "professional"),
            Self::Enthusiastic => write!(f, "enthusiastic"),
            Self::Confident => write!(f, "confident"),
        }
    }
}

/// Tone for marketplace listing copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingTone {
    #[default]
    Persuasive,
    Neutral,
    Descriptive,
    Urgent,
}

impl fmt::Display for ListingTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Persuasive => write!(f, "persuasive"),
            Self::Neutral => write!(f, "neutral"),
            Self::Descriptive => write!(f, "descriptive"),
            Self::Urgent => write!(f, "urgent"),
        }
    }
}

/// Chatbot behavioural profile. Unknown persona names are rejected at
/// deserialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    #[default]
    SupportBot,
    SalesAgent,
    BusinessExpert,
    General,
    Jobs,
    RealEstate,
    Services,
    Events,
    Rideshare,
    Marketplace,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobLetterRequest {
    pub applicant_name: String,
    pub position: String,
    pub company_name: String,
    #[serde(default)]
    pub skills: Vec<String>,
    pub experience_years: u32,
    #[serde(default)]
    pub tone: LetterTone,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingDescriptionRequest {
    pub title: String,
    pub category: String,
    pub features: Vec<String>,
    pub condition: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub tone: ListingTone,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessageRequest {
    pub message: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub persona: Persona,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPromptRequest {
    pub prompt: String,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// One content request, by kind. Consumed exactly once by the prompt builder.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationRequest {
    JobLetter(JobLetterRequest),
    ListingDescription(ListingDescriptionRequest),
    ChatMessage(ChatMessageRequest),
    RawPrompt(RawPromptRequest),
}

impl GenerationRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::JobLetter(_) => "job_letter",
            Self::ListingDescription(_) => "listing_description",
            Self::ChatMessage(_) => "chat_message",
            Self::RawPrompt(_) => "raw_prompt",
        }
    }

    /// Rejects blank required fields. Type-level problems (unknown persona,
    /// missing field, negative years) are already caught by serde.
    pub fn validate(&self) -> Result<(), AppError> {
        match self {
            Self::JobLetter(r) => {
                require("applicant_name", &r.applicant_name)?;
                require("position", &r.position)?;
                require("company_name", &r.company_name)?;
            }
            Self::ListingDescription(r) => {
                require("title", &r.title)?;
                require("category", &r.category)?;
                require("condition", &r.condition)?;
                if let Some(price) = r.price {
                    if !price.is_finite() || price < 0.0 {
                        return Err(AppError::Validation(
                            "price must be a non-negative number".to_string(),
                        ));
                    }
                }
            }
            Self::ChatMessage(r) => require("message", &r.message)?,
            Self::RawPrompt(r) => require("prompt", &r.prompt)?,
        }
        Ok(())
    }
}

fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_letter_defaults_tone_and_skills() {
        let request: JobLetterRequest = serde_json::from_value(json!({
            "applicant_name": "Ana",
            "position": "Clerk",
            "company_name": "Acme",
            "experience_years": 2
        }))
        .unwrap();
        assert_eq!(request.tone, LetterTone::Professional);
        assert!(request.skills.is_empty());
    }

    #[test]
    fn test_unknown_persona_is_rejected() {
        let result: Result<ChatMessageRequest, _> = serde_json::from_value(json!({
            "message": "hi",
            "persona": "pirate"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_persona_defaults_to_support_bot() {
        let request: ChatMessageRequest =
            serde_json::from_value(json!({"message": "hi"})).unwrap();
        assert_eq!(request.persona, Persona::SupportBot);
    }

    #[test]
    fn test_business_expert_persona_parses() {
        let request: ChatMessageRequest = serde_json::from_value(json!({
            "message": "How do I register a business?",
            "persona": "business_expert"
        }))
        .unwrap();
        assert_eq!(request.persona, Persona::BusinessExpert);
    }

    #[test]
    fn test_negative_experience_is_rejected() {
        let result: Result<JobLetterRequest, _> = serde_json::from_value(json!({
            "applicant_name": "Ana",
            "position": "Clerk",
            "company_name": "Acme",
            "experience_years": -1
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_blank_fields() {
        let request = GenerationRequest::ChatMessage(ChatMessageRequest {
            message: "   ".to_string(),
            context: None,
            persona: Persona::SupportBot,
            system_prompt: None,
        });
        assert!(matches!(request.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_negative_price() {
        let request = GenerationRequest::ListingDescription(ListingDescriptionRequest {
            title: "Bike".to_string(),
            category: "Sports".to_string(),
            features: vec![],
            condition: "Used".to_string(),
            price: Some(-5.0),
            tone: ListingTone::Neutral,
        });
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_tone_display_is_lowercase() {
        assert_eq!(LetterTone::Confident.to_string(), "confident");
        assert_eq!(ListingTone::Urgent.to_string(), "urgent");
    }
}
