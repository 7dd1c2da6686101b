//! OpenAI-compatible provider using the Chat Completions API.
//!
//! Sends the image via data URL in the user message content array.

use super::provider::{LlmProvider, LlmRequest, LlmResponse};
use crate::error::LlmError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Provider for any `/chat/completions` endpoint that accepts image URLs.
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
    url: String,
}

impl OpenAiProvider {
    pub fn new(endpoint: &str, api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
            url: format!("{}/chat/completions", endpoint.trim_end_matches('/')),
        }
    }
}

// --- Request types ---

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ChatContent>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ChatContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

// --- Response types ---

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    model: String,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = Instant::now();

        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ChatContent::Text {
                        text: request.prompt.clone(),
                    },
                    ChatContent::ImageUrl {
                        image_url: ImageUrl {
                            url: request.image.data_url(),
                        },
                    },
                ],
            }],
        };

        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::new(format!("OpenAI request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(LlmError::with_status(
                format!("OpenAI HTTP {status}: {text}"),
                status.as_u16(),
            ));
        }

        let chat_resp: ChatResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::new(format!("Failed to parse OpenAI response: {e}")))?;

        let text = chat_resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::new("OpenAI returned empty choices array"))?;

        Ok(LlmResponse {
            text,
            model: chat_resp.model,
            tokens_used: chat_resp.usage.map(|u| u.total_tokens),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::ImageInput;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_generate_sends_data_url_and_prompt() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("data:image/jpeg;base64,AQID".into()),
                Matcher::Regex("handwritten medical prescription".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"model":"gpt-test","choices":[{"message":{"content":"Patient: Jane"}}],
                    "usage":{"total_tokens":7}}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let provider =
            OpenAiProvider::new(&format!("{}/v1/", server.url()), "sk-test", "gpt-test");
        let request = LlmRequest::transcribe_prescription(ImageInput {
            data: "AQID".into(),
            media_type: "image/jpeg".into(),
        });
        let resp = provider.generate(&request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(resp.text, "Patient: Jane");
        assert_eq!(resp.tokens_used, Some(7));
    }

    #[tokio::test]
    async fn test_generate_empty_choices_is_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", Matcher::Any)
            .with_status(200)
            .with_body(r#"{"model":"gpt-test","choices":[]}"#)
            .create_async()
            .await;

        let provider = OpenAiProvider::new(&server.url(), "sk-test", "gpt-test");
        let request = LlmRequest::transcribe_prescription(ImageInput {
            data: "AQID".into(),
            media_type: "image/jpeg".into(),
        });
        let err = provider.generate(&request).await.unwrap_err();
        assert!(err.message.contains("empty choices"));
    }
}
