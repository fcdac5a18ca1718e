//! Gemini AI provider implementation.
//!
//! Calls the `generateContent` REST method once per prompt. No retries and no
//! timeout override: the transport default applies.

use super::{FinishReason, ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Secret<String>,
    pub model: String,
    pub api_base: String,
}

/// Gemini text provider.
pub struct GeminiTextProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiTextProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder().build().map_err(|e| {
            ProviderError::NotConfigured(format!("failed to build HTTP client: {}", e))
        })?;

        Ok(Self { config, client })
    }

    /// Build the API URL for the given method. Accepts model names with or
    /// without the `models/` prefix.
    fn api_url(&self, method: &str) -> String {
        let model = self
            .config
            .model
            .strip_prefix("models/")
            .unwrap_or(&self.config.model);
        format!(
            "{}/models/{}:{}",
            self.config.api_base.trim_end_matches('/'),
            model,
            method
        )
    }
}

#[async_trait]
impl TextProvider for GeminiTextProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, prompt: &str) -> Result<ProviderResponse, ProviderError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(self.api_url("generateContent"))
            .header(API_KEY_HEADER, self.config.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::ApiError(format!(
                "Gemini API error {}: {}",
                status,
                api_error_message(&error_text)
            )));
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        parse_response(api_response)
    }
}

/// Turn a successful API payload into a provider response.
fn parse_response(api_response: GenerateContentResponse) -> Result<ProviderResponse, ProviderError> {
    if let Some(reason) = api_response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        return Err(ProviderError::ContentFiltered(format!(
            "prompt blocked: {}",
            reason
        )));
    }

    let candidate = api_response
        .candidates
        .into_iter()
        .next()
        .ok_or(ProviderError::EmptyResponse)?;

    let finish_reason = match candidate.finish_reason.as_deref() {
        Some("STOP") | None => FinishReason::Complete,
        Some("MAX_TOKENS") => FinishReason::Length,
        Some("SAFETY") => FinishReason::ContentFilter,
        Some(_) => FinishReason::Other,
    };

    if finish_reason == FinishReason::ContentFilter {
        return Err(ProviderError::ContentFiltered(
            "response blocked by safety filters".to_string(),
        ));
    }

    // A candidate may split its answer across several text parts.
    let text: String = candidate
        .content
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect();

    if text.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }

    let usage = api_response.usage_metadata.unwrap_or_default();

    tracing::debug!(
        input_tokens = usage.prompt_token_count.unwrap_or(0),
        output_tokens = usage.candidates_token_count.unwrap_or(0),
        finish_reason = ?finish_reason,
        "Gemini response received"
    );

    Ok(ProviderResponse {
        text,
        input_tokens: usage.prompt_token_count.unwrap_or(0),
        output_tokens: usage.candidates_token_count.unwrap_or(0),
        finish_reason,
    })
}

/// Pull `error.message` out of a Gemini error body, falling back to the raw text.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.to_string())
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Content,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<i32>,
    candidates_token_count: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
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

    fn provider(model: &str, api_base: &str) -> GeminiTextProvider {
        GeminiTextProvider::new(GeminiConfig {
            api_key: Secret::new("test-key".to_string()),
            model: model.to_string(),
            api_base: api_base.to_string(),
        })
        .unwrap()
    }

    fn parse(value: serde_json::Value) -> Result<ProviderResponse, ProviderError> {
        parse_response(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn api_url_accepts_prefixed_and_bare_model_names() {
        let expected = "https://example.test/v1beta/models/gemini-1.5-flash-latest:generateContent";
        assert_eq!(
            provider("models/gemini-1.5-flash-latest", "https://example.test/v1beta/")
                .api_url("generateContent"),
            expected
        );
        assert_eq!(
            provider("gemini-1.5-flash-latest", "https://example.test/v1beta")
                .api_url("generateContent"),
            expected
        );
    }

    #[test]
    fn api_key_is_not_part_of_the_url() {
        assert!(!provider("m", "https://example.test").api_url("generateContent").contains("test-key"));
    }

    #[test]
    fn request_serializes_in_gemini_shape() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some("hello".to_string()),
                }],
            }],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"contents": [{"role": "user", "parts": [{"text": "hello"}]}]})
        );
    }

    #[test]
    fn joins_text_parts_and_reads_usage() {
        let response = parse(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "申請期限は"}, {"text": "3月末です。"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 120, "candidatesTokenCount": 8, "totalTokenCount": 128}
        }))
        .unwrap();

        assert_eq!(response.text, "申請期限は3月末です。");
        assert_eq!(response.input_tokens, 120);
        assert_eq!(response.output_tokens, 8);
        assert_eq!(response.finish_reason, FinishReason::Complete);
    }

    #[test]
    fn max_tokens_still_returns_text() {
        let response = parse(json!({
            "candidates": [{"content": {"parts": [{"text": "partial"}]}, "finishReason": "MAX_TOKENS"}]
        }))
        .unwrap();
        assert_eq!(response.finish_reason, FinishReason::Length);
        assert_eq!(response.text, "partial");
    }

    #[test]
    fn safety_stop_is_content_filtered() {
        let err = parse(json!({
            "candidates": [{"content": {"parts": []}, "finishReason": "SAFETY"}]
        }))
        .unwrap_err();
        assert!(matches!(err, ProviderError::ContentFiltered(_)));
    }

    #[test]
    fn blocked_prompt_is_content_filtered() {
        let err = parse(json!({"promptFeedback": {"blockReason": "OTHER"}})).unwrap_err();
        assert_eq!(
            err,
            ProviderError::ContentFiltered("prompt blocked: OTHER".to_string())
        );
    }

    #[test]
    fn no_candidates_is_empty_response() {
        assert_eq!(parse(json!({})).unwrap_err(), ProviderError::EmptyResponse);
        assert_eq!(
            parse(json!({"candidates": [{"finishReason": "STOP"}]})).unwrap_err(),
            ProviderError::EmptyResponse
        );
    }

    #[test]
    fn error_body_message_is_extracted() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#;
        assert_eq!(api_error_message(body), "API key not valid.");
        assert_eq!(api_error_message("upstream down"), "upstream down");
    }
}
