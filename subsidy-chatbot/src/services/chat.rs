//! Question answering over the subsidy documents.

use crate::services::metrics;
use crate::services::prompt::PromptBuilder;
use crate::services::providers::{ProviderError, TextProvider};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// How many characters of each answer go into the debug log.
const LOG_PREVIEW_CHARS: usize = 50;

/// Why a question could not be answered. The display strings are shown to
/// the user verbatim.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("APIキーが設定されていないため、LLMからの応答はできません。")]
    MissingCredential,

    #[error("LLMからの応答エラー: {0}")]
    Generation(#[from] ProviderError),
}

#[derive(Clone)]
pub struct ChatService {
    prompt_builder: Arc<PromptBuilder>,
    provider: Option<Arc<dyn TextProvider>>,
    prompt_warn_bytes: usize,
}

impl ChatService {
    /// `provider` is `None` when no API key is configured.
    pub fn new(
        prompt_builder: Arc<PromptBuilder>,
        provider: Option<Arc<dyn TextProvider>>,
        prompt_warn_bytes: usize,
    ) -> Self {
        Self {
            prompt_builder,
            provider,
            prompt_warn_bytes,
        }
    }

    pub fn llm_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Build the prompt for `message` and ask the model once.
    pub async fn answer(&self, message: &str) -> Result<String, ChatError> {
        let prompt = self.prompt_builder.build(message);

        if prompt.len() > self.prompt_warn_bytes {
            tracing::warn!(
                prompt_bytes = prompt.len(),
                threshold = self.prompt_warn_bytes,
                "Prompt exceeds size threshold; sending untruncated"
            );
        }

        let provider = self.provider.as_ref().ok_or(ChatError::MissingCredential)?;

        let started = Instant::now();
        let result = provider.generate(&prompt).await;
        metrics::record_provider_latency(
            provider.name(),
            provider.model(),
            started.elapsed().as_secs_f64(),
        );

        match result {
            Ok(response) => {
                metrics::record_tokens(
                    provider.model(),
                    response.input_tokens,
                    response.output_tokens,
                );
                tracing::debug!(
                    preview = %preview(&response.text),
                    "LLM response received"
                );
                Ok(response.text)
            }
            Err(e) => {
                metrics::record_provider_error(provider.name(), e.kind());
                tracing::error!(
                    provider = provider.name(),
                    model = provider.model(),
                    error = %e,
                    "LLM invocation failed"
                );
                Err(ChatError::Generation(e))
            }
        }
    }
}

fn preview(text: &str) -> String {
    text.chars().take(LOG_PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::documents::SubsidyDocuments;
    use crate::services::providers::mock::MockTextProvider;

    fn builder() -> Arc<PromptBuilder> {
        Arc::new(PromptBuilder::new(&SubsidyDocuments::new(
            "RULES: max grant 500000 yen",
            "GUIDE: apply by March",
        )))
    }

    #[tokio::test]
    async fn returns_model_text() {
        let mock = Arc::new(MockTextProvider::replying("March"));
        let service = ChatService::new(builder(), Some(mock.clone()), usize::MAX);

        let answer = service.answer("What is the deadline?").await.unwrap();

        assert_eq!(answer, "March");
        assert_eq!(mock.calls(), 1);
        let prompt = mock.last_prompt().unwrap();
        assert!(prompt.contains("RULES: max grant 500000 yen"));
        assert!(prompt.contains("What is the deadline?"));
    }

    #[tokio::test]
    async fn missing_credential_short_circuits() {
        let service = ChatService::new(builder(), None, usize::MAX);

        let err = service.answer("hello").await.unwrap_err();

        assert!(matches!(err, ChatError::MissingCredential));
        assert_eq!(
            err.to_string(),
            "APIキーが設定されていないため、LLMからの応答はできません。"
        );
        assert!(!service.llm_configured());
    }

    #[tokio::test]
    async fn provider_failure_is_prefixed() {
        let failure = ProviderError::NetworkError("connection refused".to_string());
        let mock = Arc::new(MockTextProvider::failing(failure.clone()));
        let service = ChatService::new(builder(), Some(mock.clone()), usize::MAX);

        let err = service.answer("hello").await.unwrap_err();

        assert_eq!(err.to_string(), format!("LLMからの応答エラー: {}", failure));
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn oversized_prompt_is_still_sent_whole() {
        let mock = Arc::new(MockTextProvider::replying("ok"));
        let service = ChatService::new(builder(), Some(mock.clone()), 16);

        service.answer("hello").await.unwrap();

        assert!(mock.last_prompt().unwrap().contains("GUIDE: apply by March"));
    }

    #[test]
    fn preview_counts_characters_not_bytes() {
        let text = "あ".repeat(80);
        assert_eq!(preview(&text).chars().count(), LOG_PREVIEW_CHARS);
    }
}
