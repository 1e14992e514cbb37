//! Simplify Translator - text simplification and translation service
//!
//! Simplifies text with an OpenAI-compatible model, scores readability before and
//! after, translates the simplified text and evaluates it with BLEU. Documents in
//! PDF, DOCX, EPUB and TXT can be imported as plain text, and results exported to
//! PDF, DOCX or TXT together with their readability metrics.

#![forbid(unsafe_code)]

pub mod cli;
pub mod core;
pub mod processors;
pub mod server;

// Re-export key types for convenience
pub use crate::core::{
    config::AppConfig,
    errors::{Result, ServiceError},
    models::{Language, Metrics, TranslationOutcome, TranslationRequest},
    pipeline::TranslationPipeline,
    rate_limit::RateLimiter,
};

pub use crate::processors::{
    export::{export_document, ExportJob},
    format::{ExportFormat, ImportFormat},
    import::import_document,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
