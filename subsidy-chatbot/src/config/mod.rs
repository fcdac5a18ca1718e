use crate::services::credentials;
use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::{Path, PathBuf};

/// Default Gemini model; the `models/` prefix is optional.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-1.5-flash-latest";

/// Gemini REST API base URL.
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Prompts above this size are still sent whole, but logged as a warning.
const DEFAULT_PROMPT_WARN_BYTES: usize = 1_048_576;

/// File name of the subsidy requirements document (要綱).
pub const REQUIREMENTS_FILE: &str = "youkou.txt";

/// File name of the application guidance document (手引き).
pub const GUIDANCE_FILE: &str = "tebiki.txt";

#[derive(Debug, Clone)]
pub struct ChatbotConfig {
    pub common: core_config::Config,
    pub documents: DocumentsConfig,
    pub models: ModelConfig,
    pub google: GoogleConfig,
}

#[derive(Debug, Clone)]
pub struct DocumentsConfig {
    /// Directory holding `youkou.txt` and `tebiki.txt`.
    pub dir: PathBuf,
}

impl DocumentsConfig {
    pub fn requirements_path(&self) -> PathBuf {
        self.dir.join(REQUIREMENTS_FILE)
    }

    pub fn guidance_path(&self) -> PathBuf {
        self.dir.join(GUIDANCE_FILE)
    }
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            dir: default_documents_dir(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Model used for answering chat questions (e.g., gemini-1.5-flash-latest)
    pub text_model: String,
    pub prompt_warn_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// `None` disables generation; chat requests then get a fixed notice.
    pub api_key: Option<Secret<String>>,
    pub api_base: String,
}

impl ChatbotConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        let documents = match env::var("CHATBOT_DOCUMENTS_DIR") {
            Ok(dir) if !dir.trim().is_empty() => DocumentsConfig {
                dir: PathBuf::from(dir),
            },
            _ => DocumentsConfig::default(),
        };

        let prompt_warn_bytes = get_env(
            "GENAI_PROMPT_WARN_BYTES",
            &DEFAULT_PROMPT_WARN_BYTES.to_string(),
        )
        .parse()
        .map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "GENAI_PROMPT_WARN_BYTES must be a byte count: {}",
                e
            ))
        })?;

        Ok(ChatbotConfig {
            common: common_config,
            documents,
            models: ModelConfig {
                text_model: get_env("GENAI_TEXT_MODEL", DEFAULT_TEXT_MODEL),
                prompt_warn_bytes,
            },
            google: GoogleConfig {
                api_key: credentials::load_api_key(),
                api_base: get_env("GEMINI_API_BASE", DEFAULT_GEMINI_API_BASE),
            },
        })
    }

    pub fn llm_configured(&self) -> bool {
        self.google.api_key.is_some()
    }
}

/// Documents live in a `data/` directory next to the running executable.
/// When there is none (e.g. `cargo run` from `target/`), the crate's own
/// `data/` directory is used.
fn default_documents_dir() -> PathBuf {
    let exe = env::current_exe().ok();
    documents_dir_for(exe.as_deref())
}

fn documents_dir_for(exe: Option<&Path>) -> PathBuf {
    exe.and_then(Path::parent)
        .map(|dir| dir.join("data"))
        .filter(|dir| dir.is_dir())
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data"))
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
