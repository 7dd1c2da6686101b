//! Hosted model integration.
//!
//! A provider abstraction over Gemini and OpenAI-compatible backends, the
//! fixed transcription prompt, and the credential resolution that has to
//! succeed before anything is served.

pub(crate) mod gemini;
pub(crate) mod openai;
pub mod prompt;
pub(crate) mod provider;

pub use prompt::PRESCRIPTION_PROMPT;
pub use provider::{
    resolve_api_key, resolve_env_var, ImageInput, LlmProvider, LlmRequest, LlmResponse,
    ProviderKind, ProviderSpec,
};
