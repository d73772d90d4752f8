//! Local tier: an in-process fallback model, loaded lazily on first use.
//!
//! The model handle lives in a `OnceCell` owned by the adapter: the first caller
//! runs the loader, concurrent callers wait on the same initialization, and a
//! failed load is cached as `None` so we never retry an expensive load.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use crate::llm_client::gguf::{GgufModelLoader, GgufSource};
use crate::llm_client::{AdapterOutcome, BackendAdapter, Prompt};

pub const DEFAULT_MAX_NEW_TOKENS: usize = 256;

/// A loaded in-process model, shared read-only across requests.
#[async_trait]
pub trait LocalModel: Send + Sync {
    async fn generate(&self, prompt: &Prompt, max_new_tokens: usize) -> Result<String>;
}

/// Produces the model handle. Called at most once per `LocalAdapter`.
#[async_trait]
pub trait LocalModelLoader: Send + Sync {
    fn describe(&self) -> String;
    async fn load(&self) -> Result<Arc<dyn LocalModel>>;
}

/// Where the local tier gets its model from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalModelSource {
    /// A GGUF chat model run by mistral.rs (needs the `local-gguf` feature).
    Gguf(GgufSource),
    /// A keyword response table read from JSON, for fully offline installs.
    Table(PathBuf),
}

impl LocalModelSource {
    pub fn loader(&self) -> Box<dyn LocalModelLoader> {
        match self {
            Self::Gguf(source) => Box::new(GgufModelLoader::new(source.clone())),
            Self::Table(path) => Box::new(TemplateModelLoader::new(path.clone())),
        }
    }
}

pub struct LocalAdapter {
    model_name: String,
    max_new_tokens: usize,
    loader: Box<dyn LocalModelLoader>,
    model: OnceCell<Option<Arc<dyn LocalModel>>>,
}

impl LocalAdapter {
    pub fn new(
        model_name: impl Into<String>,
        max_new_tokens: usize,
        loader: Box<dyn LocalModelLoader>,
    ) -> Self {
        Self {
            model_name: model_name.into(),
            max_new_tokens,
            loader,
            model: OnceCell::new(),
        }
    }

    /// Returns the shared model handle, loading it on first call.
    async fn model(&self) -> Option<Arc<dyn LocalModel>> {
        self.model
            .get_or_init(|| async {
                info!("Loading local model ({})...", self.loader.describe());
                match self.loader.load().await {
                    Ok(model) => {
                        info!("Local model loaded successfully.");
                        Some(model)
                    }
                    Err(e) => {
                        error!("Failed to load local model: {e:#}");
                        None
                    }
                }
            })
            .await
            .clone()
    }

    async fn run(&self, prompt: &Prompt) -> AdapterOutcome {
        let Some(model) = self.model().await else {
            return AdapterOutcome::Unavailable("local model failed to load".to_string());
        };

        debug!("Generating with local model {}...", self.model_name);
        match model.generate(prompt, self.max_new_tokens).await {
            Ok(text) if !text.trim().is_empty() => AdapterOutcome::Success(text),
            Ok(_) => AdapterOutcome::Unavailable("local model returned no text".to_string()),
            Err(e) => AdapterOutcome::Unavailable(format!("local inference failed: {e:#}")),
        }
    }
}

#[async_trait]
impl BackendAdapter for LocalAdapter {
    fn name(&self) -> &str {
        "local"
    }

    fn model_id(&self, _model: Option<&str>) -> String {
        self.model_name.clone()
    }

    async fn invoke(
        &self,
        prompt: &Prompt,
        _model: Option<&str>,
        timeout: Option<Duration>,
    ) -> AdapterOutcome {
        match timeout {
            Some(budget) => tokio::time::timeout(budget, self.run(prompt))
                .await
                .unwrap_or(AdapterOutcome::Timeout),
            None => self.run(prompt).await,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// TemplateModel: keyword response table for installs without a GGUF runtime
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseRule {
    pub keywords: Vec<String>,
    pub response: String,
}

/// Picks the canned response whose keywords best match the user turn.
/// Multi-word keywords weigh by their word count, ties go to the earlier
/// rule, and no match yields `fallback`.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateModel {
    pub rules: Vec<ResponseRule>,
    pub fallback: String,
}

impl TemplateModel {
    fn score(rule: &ResponseRule, haystack: &str) -> usize {
        rule.keywords
            .iter()
            .map(|k| normalize(k))
            .filter(|k| !k.trim().is_empty() && haystack.contains(k.as_str()))
            .map(|k| k.split_whitespace().count())
            .sum()
    }

    fn respond(&self, user_text: &str, max_words: usize) -> String {
        let haystack = normalize(user_text);

        let mut best: Option<(usize, &ResponseRule)> = None;
        for rule in &self.rules {
            let score = Self::score(rule, &haystack);
            if score > 0 && best.map_or(true, |(top, _)| score > top) {
                best = Some((score, rule));
            }
        }

        let text = best.map_or(self.fallback.as_str(), |(_, rule)| rule.response.as_str());
        truncate_words(text, max_words)
    }
}

#[async_trait]
impl LocalModel for TemplateModel {
    async fn generate(&self, prompt: &Prompt, max_new_tokens: usize) -> Result<String> {
        Ok(self.respond(&prompt.user_text, max_new_tokens))
    }
}

/// Lowercases and collapses `text` to space-separated alphanumeric words,
/// padded with a space on each side so that `" word "` matches whole words.
fn normalize(text: &str) -> String {
    let words: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();
    format!(" {} ", words.join(" "))
}

/// Caps output at `max_words` whitespace-separated words, keeping line breaks.
fn truncate_words(text: &str, max_words: usize) -> String {
    let mut count = 0;
    let mut end = text.len();
    let mut in_word = false;
    for (idx, c) in text.char_indices() {
        if c.is_whitespace() {
            in_word = false;
        } else if !in_word {
            in_word = true;
            count += 1;
            if count > max_words {
                end = idx;
                break;
            }
        }
    }
    text[..end].trim_end().to_string()
}

/// Reads a `TemplateModel` from a JSON file.
#[derive(Debug, Clone)]
pub struct TemplateModelLoader {
    path: PathBuf,
}

impl TemplateModelLoader {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl LocalModelLoader for TemplateModelLoader {
    fn describe(&self) -> String {
        format!("template table at {}", self.path.display())
    }

    async fn load(&self) -> Result<Arc<dyn LocalModel>> {
        let raw = tokio::fs::read_to_string(&self.path).await.with_context(|| {
            format!("Failed to read template table '{}'", self.path.display())
        })?;
        let model: TemplateModel = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid template table '{}'", self.path.display()))?;

        if model.fallback.trim().is_empty() {
            bail!("Template table '{}' has an empty fallback", self.path.display());
        }

        Ok(Arc::new(model))
    }
}

/// Hands out an already-built model. Used where tests need a working local tier.
#[cfg(test)]
pub(crate) struct StaticModelLoader(pub TemplateModel);

#[cfg(test)]
#[async_trait]
impl LocalModelLoader for StaticModelLoader {
    fn describe(&self) -> String {
        "static test model".to_string()
    }

    async fn load(&self) -> Result<Arc<dyn LocalModel>> {
        Ok(Arc::new(self.0.clone()))
    }
}

#[cfg(test)]
impl TemplateModel {
    pub(crate) fn sample() -> Self {
        fn rule(keywords: &[&str], response: &str) -> ResponseRule {
            ResponseRule {
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
                response: response.to_string(),
            }
        }

        Self {
            rules: vec![
                rule(
                    &["job application letter", "cover letter"],
                    "Dear Hiring Manager,\n\nI am writing to express my strong interest in \
                    this position.\n\nSincerely",
                ),
                rule(
                    &["register", "registration", "business", "bir", "company"],
                    "Register the name at the Companies Registry, then get a BIR number \
                    and register for TAMIS with the Board of Inland Revenue.",
                ),
                rule(
                    &["hi", "hello", "hey", "good morning"],
                    "Hi there! What can I assist you with today?",
                ),
                rule(
                    &["price", "pricing", "cost", "premium", "plan"],
                    "The FREE plan covers 10 listings. Premium starts at $99 TTD/month.",
                ),
            ],
            fallback: "I can tell you about the marketplace, pricing, jobs or real estate."
                .to_string(),
        }
    }
}
