//! Startup loading of the two subsidy documents.
//!
//! Documents are read once. A document that cannot be read does not stop the
//! service: its slot holds a visible placeholder instead, and that text is
//! what every prompt carries for the rest of the process lifetime.

use crate::config::DocumentsConfig;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read document {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DocumentError {
    /// Text that stands in for the document when it could not be read.
    pub fn placeholder(&self) -> String {
        match self {
            DocumentError::NotFound { path } => {
                format!("Error: File not found at {}", path.display())
            }
            DocumentError::Read { path, source } => {
                format!("Error reading file {}: {}", path.display(), source)
            }
        }
    }
}

/// Read a whole UTF-8 text file.
pub fn read_document(path: &Path) -> Result<String, DocumentError> {
    std::fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => DocumentError::NotFound {
            path: path.to_path_buf(),
        },
        _ => DocumentError::Read {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Read a document, substituting its placeholder on failure.
pub fn load_document(path: &Path) -> String {
    match read_document(path) {
        Ok(content) => {
            tracing::info!(path = %path.display(), bytes = content.len(), "Loaded document");
            content
        }
        Err(e) => {
            tracing::warn!(error = %e, "Document unavailable, using placeholder");
            e.placeholder()
        }
    }
}

/// The requirements (要綱) and guidance (手引き) texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsidyDocuments {
    pub requirements: String,
    pub guidance: String,
}

impl SubsidyDocuments {
    pub fn new(requirements: impl Into<String>, guidance: impl Into<String>) -> Self {
        Self {
            requirements: requirements.into(),
            guidance: guidance.into(),
        }
    }

    pub fn load(config: &DocumentsConfig) -> Self {
        Self {
            requirements: load_document(&config.requirements_path()),
            guidance: load_document(&config.guidance_path()),
        }
    }
}
