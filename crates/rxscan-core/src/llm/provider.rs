//! LLM provider trait, request/response types, and credential resolution.

use crate::config::Config;
use crate::error::{ConfigError, LlmError};
use crate::types::UploadedImage;
use async_trait::async_trait;
use base64::Engine;

use super::prompt::PRESCRIPTION_PROMPT;

/// Base64-encoded image ready to send to an LLM API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Encode an uploaded image's original bytes.
    pub fn from_upload(image: &UploadedImage) -> Self {
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(&image.bytes),
            media_type: image.media_type().to_string(),
        }
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// A single multimodal request: one instruction plus one image.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// The prescription image
    pub image: ImageInput,
    /// Text instruction for the model
    pub prompt: String,
}

impl LlmRequest {
    /// Build the transcription request for a prescription image.
    pub fn transcribe_prescription(image: ImageInput) -> Self {
        Self {
            image,
            prompt: PRESCRIPTION_PROMPT.to_string(),
        }
    }
}

/// The response from a model call.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Generated text, exactly as returned
    pub text: String,
    /// Model identifier used
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all hosted model providers implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Box<dyn LlmProvider>` for dynamic dispatch).
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logging (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send one request. Implementations make exactly one HTTP attempt.
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok()
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Resolve an API key: the configured value first, then `env_var`.
///
/// Blank values count as absent.
pub fn resolve_api_key(configured: &str, env_var: &str) -> Option<String> {
    resolve_env_var(configured)
        .filter(|k| !k.trim().is_empty())
        .or_else(|| std::env::var(env_var).ok())
        .filter(|k| !k.trim().is_empty())
}

/// Supported hosted model backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    OpenAi,
}

impl ProviderKind {
    /// Config section name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAi => "openai",
        }
    }

    /// Environment variable consulted when the config carries no key.
    pub fn env_var(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "GEMINI_API_KEY",
            ProviderKind::OpenAi => "OPENAI_API_KEY",
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gemini" => Ok(ProviderKind::Gemini),
            "openai" => Ok(ProviderKind::OpenAi),
            other => Err(ConfigError::ValidationError(format!(
                "Unknown LLM provider: {other}"
            ))),
        }
    }
}

/// Everything needed to build a provider client, with the credential resolved.
///
/// Building the spec never touches the network; [`ProviderSpec::build`]
/// creates the HTTP client.
#[derive(Clone)]
pub struct ProviderSpec {
    pub kind: ProviderKind,
    pub model: String,
    pub endpoint: String,
    api_key: String,
}

impl std::fmt::Debug for ProviderSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSpec")
            .field("kind", &self.kind)
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl ProviderSpec {
    /// Resolve the configured provider and its credential.
    ///
    /// Fails with [`ConfigError::MissingApiKey`] when neither the config file
    /// nor the environment yields a key.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let kind: ProviderKind = config.llm.provider.parse()?;
        let (configured_key, model, endpoint) = match kind {
            ProviderKind::Gemini => {
                let cfg = &config.llm.gemini;
                (&cfg.api_key, &cfg.model, &cfg.endpoint)
            }
            ProviderKind::OpenAi => {
                let cfg = &config.llm.openai;
                (&cfg.api_key, &cfg.model, &cfg.endpoint)
            }
        };

        let api_key = resolve_api_key(configured_key, kind.env_var()).ok_or_else(|| {
            ConfigError::MissingApiKey {
                provider: kind.as_str().to_string(),
                env_var: kind.env_var().to_string(),
                config_path: config.display_path(),
            }
        })?;

        Ok(Self {
            kind,
            model: model.clone(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Construct the provider client.
    pub fn build(&self) -> Box<dyn LlmProvider> {
        match self.kind {
            ProviderKind::Gemini => Box::new(super::gemini::GeminiProvider::new(
                &self.endpoint,
                &self.api_key,
                &self.model,
            )),
            ProviderKind::OpenAi => Box::new(super::openai::OpenAiProvider::new(
                &self.endpoint,
                &self.api_key,
                &self.model,
            )),
        }
    }
}
