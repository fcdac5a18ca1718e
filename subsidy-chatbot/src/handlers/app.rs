use crate::startup::AppState;
use askama::Template;
use axum::{extract::State, http::Uri, response::IntoResponse, Json};
use serde_json::json;
use service_core::error::AppError;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub model: String,
}

/// Chat UI page.
pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    IndexTemplate {
        model: state.config.models.text_model.clone(),
    }
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "subsidy-chatbot",
        "version": env!("CARGO_PKG_VERSION"),
        "llm_configured": state.chat.llm_configured(),
    }))
}

pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(anyhow::anyhow!("No route for {}", uri.path()))
}
