use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /chat`.
#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(required, length(min = 1))]
    pub message: Option<String>,
}

/// Body of every `POST /chat` reply, success or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

impl ChatResponse {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}
