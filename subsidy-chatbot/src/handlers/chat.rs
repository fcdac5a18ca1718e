use crate::models::{ChatRequest, ChatResponse};
use crate::services::metrics;
use crate::services::ChatError;
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use validator::Validate;

pub const MISSING_MESSAGE: &str = "メッセージがありません。";

/// Result of one chat request, mapped to HTTP by [`IntoResponse`].
#[derive(Debug)]
pub enum ChatOutcome {
    MissingMessage,
    /// The body could not be read at all; the message may well be present.
    Unreadable(JsonRejection),
    Completed(Result<String, ChatError>),
}

impl IntoResponse for ChatOutcome {
    fn into_response(self) -> Response {
        match self {
            ChatOutcome::MissingMessage => (
                StatusCode::BAD_REQUEST,
                Json(ChatResponse::new(MISSING_MESSAGE)),
            )
                .into_response(),
            ChatOutcome::Unreadable(rejection) => rejection.into_response(),
            ChatOutcome::Completed(Ok(text)) => {
                (StatusCode::OK, Json(ChatResponse::new(text))).into_response()
            }
            // Generation problems are reported in the body only; the status
            // stays 200.
            ChatOutcome::Completed(Err(err)) => {
                (StatusCode::OK, Json(ChatResponse::new(err.to_string()))).into_response()
            }
        }
    }
}

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ChatOutcome {
    let message = match payload {
        Ok(Json(request)) if request.validate().is_ok() => request.message.unwrap_or_default(),
        Ok(_) => {
            metrics::record_chat_request("missing_message");
            return ChatOutcome::MissingMessage;
        }
        Err(JsonRejection::BytesRejection(rejection)) => {
            tracing::warn!(error = %rejection, "Failed to read chat body");
            metrics::record_chat_request("unreadable_body");
            return ChatOutcome::Unreadable(JsonRejection::BytesRejection(rejection));
        }
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejected chat body");
            metrics::record_chat_request("missing_message");
            return ChatOutcome::MissingMessage;
        }
    };

    let result = state.chat.answer(&message).await;

    metrics::record_chat_request(match &result {
        Ok(_) => "answered",
        Err(ChatError::MissingCredential) => "no_credential",
        Err(ChatError::Generation(_)) => "llm_error",
    });

    ChatOutcome::Completed(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::ProviderError;
    use axum::body::to_bytes;

    async fn body_of(outcome: ChatOutcome) -> (StatusCode, ChatResponse) {
        let response = outcome.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn missing_message_is_400() {
        let (status, body) = body_of(ChatOutcome::MissingMessage).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.response, MISSING_MESSAGE);
    }

    #[tokio::test]
    async fn generation_errors_stay_200() {
        let (status, body) = body_of(ChatOutcome::Completed(Err(ChatError::Generation(
            ProviderError::RateLimited,
        ))))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.response, "LLMからの応答エラー: Rate limited");
    }
}
