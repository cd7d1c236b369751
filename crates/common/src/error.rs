//! Error types shared across FormCheck crates.

use std::path::PathBuf;

/// Top-level error type for FormCheck operations.
#[derive(Debug, thiserror::Error)]
pub enum FormcheckError {
    #[error("Model not found. Searched: {}", display_paths(searched))]
    ModelNotFound { searched: Vec<PathBuf> },

    #[error("Accelerator unavailable: {message}")]
    AcceleratorUnavailable { message: String },

    #[error("Detector error: {message}")]
    Detector { message: String },

    #[error("No processing path available: {message}")]
    NoProcessingPath { message: String },

    #[error("Pipeline error: {message}")]
    Pipeline { message: String },

    #[error("Analysis error: {message}")]
    Analysis { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Too many frames. Maximum {max} allowed (got {count}).")]
    TooManyFrames { count: usize, max: usize },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using FormcheckError.
pub type FormcheckResult<T> = Result<T, FormcheckError>;

impl FormcheckError {
    pub fn accelerator_unavailable(msg: impl Into<String>) -> Self {
        Self::AcceleratorUnavailable {
            message: msg.into(),
        }
    }

    pub fn detector(msg: impl Into<String>) -> Self {
        Self::Detector {
            message: msg.into(),
        }
    }

    pub fn no_processing_path(msg: impl Into<String>) -> Self {
        Self::NoProcessingPath {
            message: msg.into(),
        }
    }

    pub fn pipeline(msg: impl Into<String>) -> Self {
        Self::Pipeline {
            message: msg.into(),
        }
    }

    pub fn analysis(msg: impl Into<String>) -> Self {
        Self::Analysis {
            message: msg.into(),
        }
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether this error means no batch can be processed at all.
    pub fn is_fatal_for_batch(&self) -> bool {
        matches!(
            self,
            Self::ModelNotFound { .. } | Self::NoProcessingPath { .. }
        )
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "(none)".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
