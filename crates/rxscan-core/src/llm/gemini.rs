//! Gemini provider using the `generateContent` API.
//!
//! Sends the instruction as a text part and the image as an `inline_data` part.

use super::provider::{LlmProvider, LlmRequest, LlmResponse};
use crate::error::LlmError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Gemini provider for `models/{model}:generateContent`.
pub struct GeminiProvider {
    endpoint: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(endpoint: &str, api_key: &str, model: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

// --- Request types ---

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

// --- Response types ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    model_version: Option<String>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    total_token_count: Option<u32>,
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = Instant::now();

        let body = GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![
                    Part::Text {
                        text: request.prompt.clone(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: request.image.media_type.clone(),
                            data: request.image.data.clone(),
                        },
                    },
                ],
            }],
        };

        // Key goes in a header so it never shows up in reqwest's URL-bearing errors
        let resp = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::new(format!("Gemini request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(LlmError::with_status(
                format!("Gemini HTTP {status}: {text}"),
                status.as_u16(),
            ));
        }

        let gen_resp: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::new(format!("Failed to parse Gemini response: {e}")))?;

        let parts: Vec<String> = gen_resp
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if parts.is_empty() {
            return Err(LlmError::new(
                "Gemini returned no text candidates (the response may have been blocked)",
            ));
        }

        Ok(LlmResponse {
            text: parts.concat(),
            model: gen_resp.model_version.unwrap_or_else(|| self.model.clone()),
            tokens_used: gen_resp.usage_metadata.and_then(|u| u.total_token_count),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::ImageInput;
    use mockito::Matcher;

    fn request() -> LlmRequest {
        LlmRequest::transcribe_prescription(ImageInput {
            data: "AQID".into(),
            media_type: "image/png".into(),
        })
    }

    #[test]
    fn test_request_serialization() {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user".into(),
                parts: vec![
                    Part::Text { text: "hi".into() },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: "image/png".into(),
                            data: "AQID".into(),
                        },
                    },
                ],
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(
            json["contents"][0]["parts"][1]["inline_data"]["mime_type"],
            "image/png"
        );
    }

    #[tokio::test]
    async fn test_generate_returns_text_unmodified() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/gemini-test:generateContent")
            .match_header("x-goog-api-key", "k")
            .with_status(200)
            .with_body(
                r#"{"candidates":[{"content":{"parts":[{"text":"  Patient: "},{"text":"[unclear]\n"}]}}],
                    "usageMetadata":{"totalTokenCount":42},"modelVersion":"gemini-test-001"}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let provider = GeminiProvider::new(&format!("{}/v1beta", server.url()), "k", "gemini-test");
        let resp = provider.generate(&request()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(resp.text, "  Patient: [unclear]\n");
        assert_eq!(resp.tokens_used, Some(42));
        assert_eq!(resp.model, "gemini-test-001");
    }

    #[tokio::test]
    async fn test_generate_http_error_carries_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", Matcher::Any)
            .with_status(403)
            .with_body("API key not valid")
            .create_async()
            .await;

        let provider = GeminiProvider::new(&server.url(), "bad", "gemini-test");
        let err = provider.generate(&request()).await.unwrap_err();
        assert_eq!(err.status_code, Some(403));
        assert!(err.message.contains("API key not valid"));
    }

    #[tokio::test]
    async fn test_generate_no_candidates_is_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", Matcher::Any)
            .with_status(200)
            .with_body(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#)
            .create_async()
            .await;

        let provider = GeminiProvider::new(&server.url(), "k", "gemini-test");
        let err = provider.generate(&request()).await.unwrap_err();
        assert!(err.message.contains("no text candidates"));
    }

    #[tokio::test]
    async fn test_generate_malformed_json_is_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", Matcher::Any)
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let provider = GeminiProvider::new(&server.url(), "k", "gemini-test");
        let err = provider.generate(&request()).await.unwrap_err();
        assert!(err.message.starts_with("Failed to parse Gemini response"));
    }
}
