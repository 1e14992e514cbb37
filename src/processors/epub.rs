//! ePub text extraction

use epub::doc::EpubDoc;
use std::io::Cursor;
use tracing::debug;

use crate::core::errors::BoxError;

/// Media types of content documents
const DOCUMENT_MIME_TYPES: &[&str] = &["application/xhtml+xml", "text/html"];

/// Decoded body of every content document, spine order first, one per line
pub fn extract_text(bytes: &[u8]) -> Result<String, BoxError> {
    let mut book = EpubDoc::from_reader(Cursor::new(bytes.to_vec()))
        .map_err(|e| format!("invalid ePub: {}", e))?;

    let mut ids: Vec<String> = book.spine.iter().map(|item| item.idref.clone()).collect();
    let mut extra: Vec<String> = book
        .resources
        .keys()
        .filter(|id| !ids.contains(*id))
        .cloned()
        .collect();
    extra.sort();
    ids.extend(extra);

    let mut text = String::new();
    let mut documents = 0;
    for id in ids {
        let Some((content, mime)) = book.get_resource(&id) else {
            continue;
        };
        if !is_document(&mime) {
            continue;
        }

        let body = String::from_utf8(content)?;
        text.push_str(&body);
        text.push('\n');
        documents += 1;
    }

    debug!("Extracted {} content documents from ePub", documents);
    Ok(text.trim().to_string())
}

fn is_document(mime: &str) -> bool {
    let essence = mime.split(';').next().unwrap_or_default().trim();
    DOCUMENT_MIME_TYPES
        .iter()
        .any(|m| m.eq_ignore_ascii_case(essence))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::{Cursor, Write};
    use zip::write::FileOptions;
    use zip::{CompressionMethod, ZipWriter};

    /// Minimal EPUB 2 package with the given (id, xhtml) chapters in spine order
    pub fn sample_epub(chapters: &[(&str, &str)]) -> Vec<u8> {
        let mut manifest = String::from(
            r#"<item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/><item id="css" href="style.css" media-type="text/css"/>"#,
        );
        let mut spine = String::new();
        let mut nav_points = String::new();
        for (i, (id, _)) in chapters.iter().enumerate() {
            manifest.push_str(&format!(
                r#"<item id="{id}" href="{id}.xhtml" media-type="application/xhtml+xml"/>"#
            ));
            spine.push_str(&format!(r#"<itemref idref="{id}"/>"#));
            nav_points.push_str(&format!(
                r#"<navPoint id="np{n}" playOrder="{n}"><navLabel><text>{id}</text></navLabel><content src="{id}.xhtml"/></navPoint>"#,
                n = i + 1
            ));
        }

        let opf = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="bookid">
<metadata xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title>Livro</dc:title><dc:identifier id="bookid">urn:uuid:1</dc:identifier><dc:language>pt</dc:language></metadata>
<manifest>{manifest}</manifest>
<spine toc="ncx">{spine}</spine>
</package>"#
        );
        let ncx = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1"><head><meta name="dtb:uid" content="urn:uuid:1"/></head><docTitle><text>Livro</text></docTitle><navMap>{nav_points}</navMap></ncx>"#
        );
        let container = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container"><rootfiles><rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/></rootfiles></container>"#;

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let stored = FileOptions::default().compression_method(CompressionMethod::Stored);
        zip.start_file("mimetype", stored).unwrap();
        zip.write_all(b"application/epub+zip").unwrap();

        let mut files: Vec<(String, String)> = vec![
            ("META-INF/container.xml".to_string(), container.to_string()),
            ("OEBPS/content.opf".to_string(), opf),
            ("OEBPS/toc.ncx".to_string(), ncx),
            ("OEBPS/style.css".to_string(), "p { margin: 0; }".to_string()),
        ];
        for (id, body) in chapters {
            files.push((format!("OEBPS/{id}.xhtml"), body.to_string()));
        }
        for (name, content) in files {
            zip.start_file(name, FileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }

        zip.finish().unwrap().into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::sample_epub;
    use super::*;

    #[test]
    fn test_extract_documents_in_spine_order() {
        let bytes = sample_epub(&[
            ("ch2", "<html><body><p>Segundo</p></body></html>"),
            ("ch1", "<html><body><p>Primeiro</p></body></html>"),
        ]);

        let text = extract_text(&bytes).unwrap();
        let second = text.find("Segundo").unwrap();
        let first = text.find("Primeiro").unwrap();

        assert!(second < first);
        assert!(!text.contains("margin"));
        assert!(!text.contains("navMap"));
    }

    #[test]
    fn test_is_document() {
        assert!(is_document("application/xhtml+xml"));
        assert!(is_document("text/html; charset=utf-8"));
        assert!(!is_document("text/css"));
        assert!(!is_document("application/x-dtbncx+xml"));
    }

    #[test]
    fn test_invalid_archive() {
        assert!(extract_text(b"PK\x03\x04 nope").is_err());
    }
}
