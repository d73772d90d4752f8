//! GGUF chat model run in-process by mistral.rs.
//!
//! Gated behind the `local-gguf` feature. Without it the loader still exists,
//! but every load fails and the local tier reports Unavailable.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;

#[cfg(feature = "local-gguf")]
use mistralrs::{GgufModelBuilder, Model, RequestBuilder, TextMessageRole};

use crate::llm_client::local::{LocalModel, LocalModelLoader};
#[cfg(feature = "local-gguf")]
use crate::llm_client::Prompt;

pub const DEFAULT_GGUF_REPO: &str = "TheBloke/TinyLlama-1.1B-Chat-v1.0-GGUF";
pub const DEFAULT_GGUF_FILE: &str = "tinyllama-1.1b-chat-v1.0.Q4_K_M.gguf";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GgufSource {
    /// Repository id and file name on the Hugging Face hub.
    Hub { repo: String, file: String },
    /// A `.gguf` file, or a directory holding one.
    Path(PathBuf),
}

impl Default for GgufSource {
    fn default() -> Self {
        Self::Hub {
            repo: DEFAULT_GGUF_REPO.to_string(),
            file: DEFAULT_GGUF_FILE.to_string(),
        }
    }
}

impl GgufSource {
    /// Resolves to the `(model_id, file)` pair mistral.rs expects.
    fn resolve(&self) -> Result<(String, String)> {
        match self {
            Self::Hub { repo, file } => Ok((repo.clone(), file.clone())),
            Self::Path(path) => resolve_local(path),
        }
    }
}

fn resolve_local(path: &Path) -> Result<(String, String)> {
    if path.is_file() {
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let file = path
            .file_name()
            .and_then(|f| f.to_str())
            .with_context(|| format!("Invalid model filename '{}'", path.display()))?;
        return Ok((dir.to_string_lossy().into_owned(), file.to_string()));
    }

    if !path.is_dir() {
        bail!("Local model path '{}' does not exist", path.display());
    }

    // Directory provided: take the first .gguf file by name
    let mut files: Vec<String> = std::fs::read_dir(path)
        .with_context(|| format!("Failed to list '{}'", path.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "gguf"))
        .filter_map(|p| p.file_name().and_then(|f| f.to_str()).map(str::to_string))
        .collect();
    files.sort();

    match files.into_iter().next() {
        Some(file) => Ok((path.to_string_lossy().into_owned(), file)),
        None => bail!("No .gguf files found in '{}'", path.display()),
    }
}

#[derive(Debug, Clone)]
pub struct GgufModelLoader {
    source: GgufSource,
}

impl GgufModelLoader {
    pub fn new(source: GgufSource) -> Self {
        Self { source }
    }
}

#[async_trait]
impl LocalModelLoader for GgufModelLoader {
    fn describe(&self) -> String {
        match &self.source {
            GgufSource::Hub { repo, file } => format!("GGUF {file} from {repo}"),
            GgufSource::Path(path) => format!("GGUF at {}", path.display()),
        }
    }

    #[cfg(feature = "local-gguf")]
    async fn load(&self) -> Result<Arc<dyn LocalModel>> {
        let (model_id, file) = self.source.resolve()?;
        let model = GgufModelBuilder::new(model_id, vec![file])
            .build()
            .await
            .context("mistral.rs failed to build the GGUF model")?;
        Ok(Arc::new(GgufModel { model }))
    }

    #[cfg(not(feature = "local-gguf"))]
    async fn load(&self) -> Result<Arc<dyn LocalModel>> {
        self.source.resolve()?;
        bail!("GGUF support not compiled in. Build with --features local-gguf")
    }
}

#[cfg(feature = "local-gguf")]
struct GgufModel {
    model: Model,
}

#[cfg(feature = "local-gguf")]
#[async_trait]
impl LocalModel for GgufModel {
    /// The GGUF file carries its own chat template; mistral.rs applies it.
    async fn generate(&self, prompt: &Prompt, max_new_tokens: usize) -> Result<String> {
        let mut request = RequestBuilder::new();
        if !prompt.system_text.trim().is_empty() {
            request = request.add_message(TextMessageRole::System, &prompt.system_text);
        }
        let request = request
            .add_message(TextMessageRole::User, &prompt.user_text)
            .set_sampler_max_len(max_new_tokens);

        let response = self
            .model
            .send_chat_request(request)
            .await
            .context("GGUF generation failed")?;

        Ok(response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default())
    }
}
