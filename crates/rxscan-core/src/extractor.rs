//! The request orchestrator: one image in, one string out.

use std::sync::OnceLock;

use crate::config::Config;
use crate::error::ConfigError;
use crate::llm::{ImageInput, LlmProvider, LlmRequest, ProviderSpec};
use crate::types::{ExtractionResult, UploadedImage};

/// Prefix of every result produced by a failed extraction.
pub const FAILURE_PREFIX: &str = "Error processing image: ";

/// Sends prescription images to the hosted model.
///
/// The credential is resolved when the extractor is built; the HTTP client
/// is created on the first extraction and reused afterwards.
pub struct Extractor {
    spec: ProviderSpec,
    provider: OnceLock<Box<dyn LlmProvider>>,
}

impl Extractor {
    /// Resolve the credential for the configured provider.
    ///
    /// Fails with [`ConfigError::MissingApiKey`] before any client exists.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let spec = ProviderSpec::from_config(config)?;
        tracing::debug!(provider = spec.kind.as_str(), model = %spec.model, "Credential resolved");
        Ok(Self {
            spec,
            provider: OnceLock::new(),
        })
    }

    /// Provider and model this extractor talks to.
    pub fn spec(&self) -> &ProviderSpec {
        &self.spec
    }

    /// Whether the client has been built yet.
    pub fn is_initialized(&self) -> bool {
        self.provider.get().is_some()
    }

    fn provider(&self) -> &dyn LlmProvider {
        self.provider
            .get_or_init(|| {
                tracing::debug!(provider = self.spec.kind.as_str(), "Initializing model client");
                self.spec.build()
            })
            .as_ref()
    }

    /// Transcribe one image. Never fails: errors become the result text.
    pub async fn extract(&self, image: &UploadedImage) -> ExtractionResult {
        let request = LlmRequest::transcribe_prescription(ImageInput::from_upload(image));
        let provider = self.provider();

        tracing::info!(
            file = %image.file_name,
            provider = provider.name(),
            bytes = image.file_size(),
            "Extracting prescription text"
        );

        match provider.generate(&request).await {
            Ok(resp) => {
                tracing::info!(
                    model = %resp.model,
                    latency_ms = resp.latency_ms,
                    tokens = ?resp.tokens_used,
                    "Extraction complete"
                );
                ExtractionResult::new(resp.text, false)
            }
            Err(e) => {
                tracing::warn!(status = ?e.status_code, "Extraction failed: {}", e.message);
                ExtractionResult::new(format!("{FAILURE_PREFIX}{e}"), true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::PRESCRIPTION_PROMPT;
    use crate::test_support::png_bytes;
    use mockito::Matcher;

    fn upload() -> UploadedImage {
        UploadedImage {
            file_name: "rx.png".into(),
            bytes: png_bytes(2, 2),
            format: "png".into(),
            width: 2,
            height: 2,
        }
    }

    fn config_for(endpoint: &str) -> Config {
        let mut config = Config::default();
        config.llm.gemini.api_key = "test-key".into();
        config.llm.gemini.endpoint = endpoint.into();
        config.llm.gemini.model = "gemini-test".into();
        config
    }

    #[test]
    fn test_missing_credential_halts_before_client() {
        if std::env::var("GEMINI_API_KEY").is_ok() {
            return;
        }
        let mut config = Config::default();
        config.llm.gemini.api_key = String::new();
        let err = Extractor::from_config(&config).err().unwrap();
        assert!(matches!(err, ConfigError::MissingApiKey { .. }));
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_client_is_lazy() {
        let extractor = Extractor::from_config(&config_for("http://127.0.0.1:9")).unwrap();
        assert!(!extractor.is_initialized());
        assert_eq!(extractor.spec().model, "gemini-test");
    }

    #[tokio::test]
    async fn test_extract_sends_one_request_with_prompt_and_image() {
        let mut server = mockito::Server::new_async().await;
        let image = upload();
        let encoded = ImageInput::from_upload(&image).data;
        let prompt_json = serde_json::to_string(PRESCRIPTION_PROMPT).unwrap();

        let mock = server
            .mock("POST", "/models/gemini-test:generateContent")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(regex_escape(&prompt_json[1..prompt_json.len() - 1])),
                Matcher::Regex(encoded.replace('+', "\\+")),
                Matcher::Regex("image/png".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"1. Patient Name: [unclear]"}]}}]}"#)
            .expect(1)
            .create_async()
            .await;

        let extractor = Extractor::from_config(&config_for(&server.url())).unwrap();
        let result = extractor.extract(&image).await;

        mock.assert_async().await;
        assert!(!result.failed);
        assert_eq!(result.text, "1. Patient Name: [unclear]");
        assert!(extractor.is_initialized());
    }

    #[tokio::test]
    async fn test_extract_http_failure_is_fail_soft() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .with_status(500)
            .with_body("internal")
            .expect(1)
            .create_async()
            .await;

        let extractor = Extractor::from_config(&config_for(&server.url())).unwrap();
        let result = extractor.extract(&upload()).await;

        // One attempt only, no retry
        mock.assert_async().await;
        assert!(result.failed);
        assert!(result.text.starts_with(FAILURE_PREFIX));
        assert!(result.text.contains("500"));
    }

    #[tokio::test]
    async fn test_extract_connection_failure_is_fail_soft() {
        let extractor = Extractor::from_config(&config_for("http://127.0.0.1:1")).unwrap();
        let result = extractor.extract(&upload()).await;
        assert!(result.failed);
        assert!(result.text.starts_with("Error processing image: Gemini request failed"));
        assert!(!result.text.contains("test-key"));
    }

    #[tokio::test]
    async fn test_client_reused_across_calls() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .with_status(200)
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"ok"}]}}]}"#)
            .expect(2)
            .create_async()
            .await;

        let extractor = Extractor::from_config(&config_for(&server.url())).unwrap();
        let first = extractor.provider() as *const dyn LlmProvider as *const u8;
        extractor.extract(&upload()).await;
        extractor.extract(&upload()).await;
        let second = extractor.provider() as *const dyn LlmProvider as *const u8;

        mock.assert_async().await;
        assert_eq!(first, second);
    }

    fn regex_escape(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for c in s.chars() {
            if "\\.+*?()|[]{}^$".contains(c) {
                out.push('\\');
            }
            out.push(c);
        }
        out
    }
}
