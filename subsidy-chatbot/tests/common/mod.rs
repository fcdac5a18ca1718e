#![allow(dead_code)]

use secrecy::Secret;
use service_core::config::Config;
use std::path::Path;
use subsidy_chatbot::config::{ChatbotConfig, DocumentsConfig, GoogleConfig, ModelConfig};
use subsidy_chatbot::startup::Application;

pub const TEST_MODEL: &str = "gemini-test";
pub const TEST_API_KEY: &str = "test-api-key";
pub const RULES: &str = "RULES: max grant 500000 yen";
pub const GUIDE: &str = "GUIDE: apply by March";

pub fn test_config(documents_dir: &Path, api_key: Option<&str>, api_base: &str) -> ChatbotConfig {
    ChatbotConfig {
        common: Config {
            host: "127.0.0.1".to_string(),
            port: 0, // Random port
        },
        documents: DocumentsConfig {
            dir: documents_dir.to_path_buf(),
        },
        models: ModelConfig {
            text_model: TEST_MODEL.to_string(),
            prompt_warn_bytes: 1_048_576,
        },
        google: GoogleConfig {
            api_key: api_key.map(|k| Secret::new(k.to_string())),
            api_base: api_base.to_string(),
        },
    }
}

/// Write both documents into a fresh temp directory.
pub fn write_documents(requirements: &str, guidance: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("youkou.txt"), requirements).expect("Failed to write youkou.txt");
    std::fs::write(dir.path().join("tebiki.txt"), guidance).expect("Failed to write tebiki.txt");
    dir
}

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn the application on a random port.
    pub async fn spawn(config: ChatbotConfig) -> Self {
        let app = Application::build(config)
            .await
            .expect("Failed to build application");
        let address = format!("http://127.0.0.1:{}", app.port());

        tokio::spawn(async move {
            let _ = app.run_until_stopped().await;
        });

        Self {
            address,
            client: reqwest::Client::new(),
        }
    }

    pub async fn post_chat(&self, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}/chat", self.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to send request")
    }
}
