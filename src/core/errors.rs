//! Custom error types for service operations

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Boxed source error carried by wrapping variants
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Per-field validation messages, rendered as `{"field": ["message", ...]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Turn the collected messages into an error, if any were recorded
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::ValidationError(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Stage of the translate chain in which an external call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Simplify,
    Readability,
    Translate,
    Bleu,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Simplify => write!(f, "simplification"),
            Stage::Readability => write!(f, "readability"),
            Stage::Translate => write!(f, "translation"),
            Stage::Bleu => write!(f, "bleu"),
        }
    }
}

/// Service-related errors
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Request body failed validation
    #[error("Validation failed: {0}")]
    ValidationError(FieldErrors),

    /// Unknown import extension or export format tag
    #[error("Unsupported format: {format}")]
    UnsupportedFormat {
        format: String,
    },

    /// Document could not be parsed or decoded
    #[error("Failed to import {format} document: {source}")]
    ImportError {
        format: String,
        #[source]
        source: BoxError,
    },

    /// Document could not be rendered or written
    #[error("Failed to export {format} document: {source}")]
    ExportError {
        format: String,
        #[source]
        source: BoxError,
    },

    /// A stage of the translate chain failed
    #[error("{stage} service failed: {source}")]
    UpstreamError {
        stage: Stage,
        #[source]
        source: Box<ServiceError>,
    },

    /// API request failed
    #[error("API error: {status} - {message}")]
    ApiError {
        status: u16,
        message: String,
    },

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(#[source] reqwest::Error),

    /// Invalid response from API
    #[error("Invalid response: {message}")]
    InvalidResponseError {
        message: String,
    },

    /// Client exceeded its request budget
    #[error("Muitas requisições. Por favor, tente novamente mais tarde.")]
    RateLimited,

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
    },

    /// Blocking task panicked or was cancelled
    #[error("Task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ServiceError {
    pub fn unsupported(format: impl Into<String>) -> Self {
        ServiceError::UnsupportedFormat {
            format: format.into(),
        }
    }

    pub fn import(format: impl fmt::Display, source: impl Into<BoxError>) -> Self {
        ServiceError::ImportError {
            format: format.to_string(),
            source: source.into(),
        }
    }

    pub fn export(format: impl fmt::Display, source: impl Into<BoxError>) -> Self {
        ServiceError::ExportError {
            format: format.to_string(),
            source: source.into(),
        }
    }

    /// Attribute an error to a stage of the translate chain
    pub fn at_stage(self, stage: Stage) -> Self {
        ServiceError::UpstreamError {
            stage,
            source: Box::new(self),
        }
    }
}

impl From<config::ConfigError> for ServiceError {
    fn from(err: config::ConfigError) -> Self {
        ServiceError::ConfigError {
            message: err.to_string(),
        }
    }
}

/// Result type for service operations
pub type Result<T> = std::result::Result<T, ServiceError>;
