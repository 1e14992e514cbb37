//! Plain-text extraction from uploaded documents

use tracing::{debug, warn};

use crate::core::errors::{Result, ServiceError};
use crate::processors::format::ImportFormat;
use crate::processors::{docx, epub, pdf};

/// Extract trimmed text from `bytes`, choosing the parser by `filename`'s extension
pub fn import_document(filename: &str, bytes: &[u8]) -> Result<String> {
    let format = ImportFormat::from_filename(filename)?;
    debug!("Importing {} ({} bytes) as {}", filename, bytes.len(), format);

    let text = match format {
        ImportFormat::Pdf => pdf::extract_text(bytes),
        ImportFormat::Docx => docx::extract_text(bytes),
        ImportFormat::Epub => epub::extract_text(bytes),
        ImportFormat::Txt => import_txt(bytes),
    }
    .map_err(|source| ServiceError::import(format, source))?;

    if text.is_empty() {
        warn!("No text found in {}", filename);
    }

    Ok(text)
}

/// Strict UTF-8 decode
fn import_txt(bytes: &[u8]) -> std::result::Result<String, crate::core::errors::BoxError> {
    let text = std::str::from_utf8(bytes)?;
    Ok(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_import_txt() {
        let text = import_document("hello.txt", b"Hello\nWorld").unwrap();
        assert_eq!(text, "Hello\nWorld");
    }

    #[test]
    fn test_import_txt_trims() {
        let text = import_document("NOTES.TXT", "  \n Olá \t\n".as_bytes()).unwrap();
        assert_eq!(text, "Olá");
    }

    #[test]
    fn test_import_txt_invalid_utf8() {
        let err = import_document("bad.txt", &[0x66, 0x6f, 0xff]).unwrap_err();
        assert!(matches!(err, ServiceError::ImportError { ref format, .. } if format == "TXT"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_unsupported_extension() {
        let err = import_document("image.png", b"\x89PNG").unwrap_err();
        assert!(matches!(err, ServiceError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_corrupt_documents_fail_with_import_error() {
        for name in ["broken.pdf", "broken.docx", "broken.epub"] {
            let err = import_document(name, b"not a real document").unwrap_err();
            assert!(
                matches!(err, ServiceError::ImportError { .. }),
                "{name}: {err}"
            );
        }
    }
}
