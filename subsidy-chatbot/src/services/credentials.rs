//! Gemini API credential lookup.
//!
//! The key comes from the `GOOGLE_API_KEY` environment variable only (a
//! `.env` file is honoured because `dotenvy` runs first). The value is a
//! single line; surrounding whitespace is dropped and a blank value counts
//! as unset.

use secrecy::Secret;
use std::env;

pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Read the API key from the environment. Never fails: a missing key only
/// disables generation.
pub fn load_api_key() -> Option<Secret<String>> {
    let key = api_key_from(env::var(API_KEY_ENV).ok());

    if key.is_some() {
        tracing::info!(env = API_KEY_ENV, "Gemini API key loaded");
    } else {
        tracing::warn!(
            env = API_KEY_ENV,
            "Gemini API key not set; chat requests will not reach the LLM"
        );
    }

    key
}

fn api_key_from(raw: Option<String>) -> Option<Secret<String>> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(Secret::new)
}
