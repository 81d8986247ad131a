//! Gemini provider
//!
//! Calls the `generateContent` REST method. The API key travels in the
//! `x-goog-api-key` header rather than the query string so request URLs are
//! safe to log.

use super::{ChatProvider, ProviderError};
use crate::config::{ApiKey, ProviderConfig};
use crate::error::{AppError, AppResult};
use crate::history::{Role, Turn};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Longest upstream error text kept in a `ProviderError::Api`
const MAX_ERROR_TEXT: usize = 500;

/// Gemini text provider
pub struct GeminiProvider {
    client: Client,
    api_key: ApiKey,
    model: String,
    endpoint_url: String,
    system_prompt: String,
}

impl GeminiProvider {
    /// Build a provider from configuration and a resolved API key
    pub fn new(config: &ProviderConfig, api_key: ApiKey) -> AppResult<Self> {
        let mut builder = Client::builder();
        if let Some(seconds) = config.timeout_seconds() {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            model: config.model().to_string(),
            endpoint_url: generate_content_url(config.base_url(), config.model()),
            system_prompt: config.system_prompt().to_string(),
        })
    }

    fn build_request<'a>(
        &'a self,
        history: &'a [Turn],
        message: &'a str,
    ) -> GenerateContentRequest<'a> {
        let mut contents: Vec<Content<'a>> = history
            .iter()
            .map(|turn| Content {
                role: Some(turn.role.as_str()),
                parts: turn
                    .parts
                    .iter()
                    .map(|text| Part {
                        text: text.as_str(),
                    })
                    .collect(),
            })
            .collect();

        contents.push(Content {
            role: Some(Role::User.as_str()),
            parts: vec![Part { text: message }],
        });

        GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: self.system_prompt.as_str(),
                }],
            },
            contents,
        }
    }
}

#[async_trait]
impl ChatProvider for GeminiProvider {
    async fn send_message(&self, history: &[Turn], message: &str) -> Result<String, ProviderError> {
        let request = self.build_request(history, message);

        tracing::debug!(
            model = %self.model,
            history_turns = history.len(),
            message_length = message.len(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(&self.endpoint_url)
            .header(API_KEY_HEADER, self.api_key.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Network(format!("request timed out: {}", e))
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(ProviderError::RateLimited);
            }

            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: api_error_message(&error_text),
            });
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let reply = extract_reply(body)?;

        tracing::debug!(
            model = %self.model,
            reply_length = reply.len(),
            "Gemini API replied"
        );

        Ok(reply)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Build `{base_url}/models/{model}:generateContent`
pub fn generate_content_url(base_url: &str, model: &str) -> String {
    format!(
        "{}/models/{}:generateContent",
        base_url.trim_end_matches('/'),
        model
    )
}

/// Pull the reply text out of a successful response
///
/// All text parts of the first candidate are joined, matching what the
/// official SDKs expose as `response.text`.
fn extract_reply(response: GenerateContentResponse) -> Result<String, ProviderError> {
    if let Some(reason) = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        return Err(ProviderError::Blocked(reason));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::EmptyResponse("no candidates".to_string()))?;

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ProviderError::EmptyResponse(
            candidate
                .finish_reason
                .unwrap_or_else(|| "unknown".to_string()),
        ));
    }

    Ok(text)
}

/// Prefer the structured `error.message`, fall back to truncated raw text
fn api_error_message(raw: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorResponse>(raw) {
        return parsed.error.message;
    }
    raw.chars().take(MAX_ERROR_TEXT).collect()
}

// Wire types for the generateContent request/response.

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(value).expect("should deserialize response")
    }

    fn test_provider() -> GeminiProvider {
        GeminiProvider::new(&ProviderConfig::default(), ApiKey::new("test-key"))
            .expect("should build provider")
    }

    #[test]
    fn test_generate_content_url() {
        assert_eq!(
            generate_content_url("https://host/v1beta", "gemini-2.0-flash"),
            "https://host/v1beta/models/gemini-2.0-flash:generateContent"
        );
        assert_eq!(
            generate_content_url("https://host/v1beta/", "m"),
            "https://host/v1beta/models/m:generateContent"
        );
    }

    #[test]
    fn test_endpoint_url_does_not_contain_key() {
        let provider = test_provider();
        assert!(!provider.endpoint_url.contains("test-key"));
    }

    #[test]
    fn test_request_body_shape() {
        let provider = test_provider();
        let history = vec![Turn::new(Role::User, "hi"), Turn::new(Role::Model, "hello")];
        let request = provider.build_request(&history, "what's up");

        let value = serde_json::to_value(&request).expect("should serialize");
        assert_eq!(
            value["contents"],
            json!([
                {"role": "user", "parts": [{"text": "hi"}]},
                {"role": "model", "parts": [{"text": "hello"}]},
                {"role": "user", "parts": [{"text": "what's up"}]}
            ])
        );
        assert_eq!(
            value["systemInstruction"],
            json!({"parts": [{"text": crate::config::DEFAULT_SYSTEM_PROMPT}]})
        );
    }

    #[test]
    fn test_extract_reply_joins_text_parts() {
        let response = parse(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hello"}, {"text": ", world"}]},
                "finishReason": "STOP"
            }]
        }));
        assert_eq!(extract_reply(response).expect("should extract"), "Hello, world");
    }

    #[test]
    fn test_extract_reply_blocked_prompt() {
        let response = parse(json!({"promptFeedback": {"blockReason": "SAFETY"}}));
        assert!(matches!(
            extract_reply(response),
            Err(ProviderError::Blocked(reason)) if reason == "SAFETY"
        ));
    }

    #[test]
    fn test_extract_reply_no_candidates() {
        let response = parse(json!({"candidates": []}));
        assert!(matches!(
            extract_reply(response),
            Err(ProviderError::EmptyResponse(_))
        ));
    }

    #[test]
    fn test_extract_reply_candidate_without_text() {
        let response = parse(json!({
            "candidates": [{"finishReason": "SAFETY"}]
        }));
        assert!(matches!(
            extract_reply(response),
            Err(ProviderError::EmptyResponse(reason)) if reason == "SAFETY"
        ));
    }

    #[test]
    fn test_api_error_message_prefers_structured_message() {
        let raw = r#"{"error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}}"#;
        assert_eq!(api_error_message(raw), "API key not valid");
    }

    #[test]
    fn test_api_error_message_truncates_raw_text() {
        let raw = "x".repeat(2_000);
        assert_eq!(api_error_message(&raw).len(), MAX_ERROR_TEXT);
    }
}
