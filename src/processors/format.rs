//! Document formats accepted for import and produced by export

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::core::errors::ServiceError;

/// Formats text can be imported from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportFormat {
    Pdf,
    Docx,
    Epub,
    Txt,
}

impl ImportFormat {
    /// Detect the format from a filename's extension (case-insensitive)
    pub fn from_filename(name: &str) -> Result<Self, ServiceError> {
        let ext = Path::new(name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "pdf" => Ok(ImportFormat::Pdf),
            "docx" => Ok(ImportFormat::Docx),
            "epub" => Ok(ImportFormat::Epub),
            "txt" => Ok(ImportFormat::Txt),
            "" => Err(ServiceError::unsupported(name)),
            other => Err(ServiceError::unsupported(format!(".{}", other))),
        }
    }
}

impl fmt::Display for ImportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportFormat::Pdf => write!(f, "PDF"),
            ImportFormat::Docx => write!(f, "DOCX"),
            ImportFormat::Epub => write!(f, "EPUB"),
            ImportFormat::Txt => write!(f, "TXT"),
        }
    }
}

/// Formats text and metrics can be exported to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Docx,
    Txt,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Pdf, ExportFormat::Docx, ExportFormat::Txt];

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
            ExportFormat::Txt => "txt",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Txt => "text/plain; charset=utf-8",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "docx" => Ok(ExportFormat::Docx),
            "txt" => Ok(ExportFormat::Txt),
            _ => Err(ServiceError::unsupported(s)),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension().to_uppercase())
    }
}
