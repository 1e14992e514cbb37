//! DOCX (WordprocessingML) text extraction and rendering

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::borrow::Cow;
use std::io::{Cursor, Read, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::core::errors::{BoxError, Result, ServiceError};
use crate::processors::export::{ExportJob, TITLE};

const DOCUMENT_PART: &str = "word/document.xml";
const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:rPr><w:sz w:val="22"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:keepNext/><w:spacing w:before="480" w:after="120"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="32"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:keepNext/><w:spacing w:before="200" w:after="80"/><w:outlineLvl w:val="1"/></w:pPr><w:rPr><w:b/><w:sz w:val="26"/></w:rPr></w:style></w:styles>"#;

/// Text of every paragraph in the main document part, joined by newlines
pub fn extract_text(bytes: &[u8]) -> std::result::Result<String, BoxError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut xml = String::new();
    archive.by_name(DOCUMENT_PART)?.read_to_string(&mut xml)?;

    let paragraphs = paragraphs_of(&xml)?;
    Ok(paragraphs.join("\n").trim().to_string())
}

fn paragraphs_of(xml: &str) -> std::result::Result<Vec<String>, BoxError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => current = Some(String::new()),
                b"r" => in_run = true,
                b"t" => in_text = true,
                b"tab" if in_run => push(&mut current, "\t"),
                b"br" | b"cr" if in_run => push(&mut current, "\n"),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"p" => paragraphs.push(String::new()),
                b"tab" if in_run => push(&mut current, "\t"),
                b"br" | b"cr" if in_run => push(&mut current, "\n"),
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"p" => {
                    if let Some(paragraph) = current.take() {
                        paragraphs.push(paragraph);
                    }
                }
                b"r" => in_run = false,
                b"t" => in_text = false,
                _ => {}
            },
            Event::Text(e) if in_text => push(&mut current, &e.unescape()?),
            Event::CData(e) if in_text => {
                push(&mut current, &String::from_utf8_lossy(&e.into_inner()))
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

fn push(current: &mut Option<String>, text: &str) {
    if let Some(paragraph) = current.as_mut() {
        paragraph.push_str(text);
    }
}

/// Render the export as a DOCX package
pub fn render(job: &ExportJob) -> Result<Vec<u8>> {
    build_package(job).map_err(|e| ServiceError::export(job.format, e))
}

fn build_package(job: &ExportJob) -> std::result::Result<Vec<u8>, BoxError> {
    let document = document_xml(job)?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts: [(&str, &[u8]); 5] = [
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
        ("_rels/.rels", PACKAGE_RELS.as_bytes()),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS.as_bytes()),
        ("word/styles.xml", STYLES.as_bytes()),
        (DOCUMENT_PART, &document),
    ];
    for (name, content) in parts {
        zip.start_file(name, options)?;
        zip.write_all(content)?;
    }

    Ok(zip.finish()?.into_inner())
}

fn document_xml(job: &ExportJob) -> std::result::Result<Vec<u8>, BoxError> {
    let mut w = Writer::new(Vec::new());
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    w.write_event(Event::Start(
        BytesStart::new("w:document").with_attributes([("xmlns:w", WORDML_NS)]),
    ))?;
    w.write_event(Event::Start(BytesStart::new("w:body")))?;

    write_paragraph(&mut w, Some("Heading1"), TITLE)?;
    write_paragraph(&mut w, None, &job.text)?;

    for section in job.metric_sections() {
        write_paragraph(&mut w, Some("Heading2"), section.title)?;
        for line in &section.lines {
            write_paragraph(&mut w, None, line)?;
        }
    }

    w.write_event(Event::End(BytesEnd::new("w:body")))?;
    w.write_event(Event::End(BytesEnd::new("w:document")))?;
    Ok(w.into_inner())
}

/// Replace characters XML 1.0 cannot carry with `?`
fn xml_safe(text: &str) -> Cow<'_, str> {
    let allowed = |ch: char| {
        matches!(ch, '\t' | '\n' | '\r') || (ch >= ' ' && ch != '\u{FFFE}' && ch != '\u{FFFF}')
    };
    if text.chars().all(allowed) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().map(|ch| if allowed(ch) { ch } else { '?' }).collect())
    }
}

/// One `w:p`; embedded newlines become `w:br` breaks inside the run
fn write_paragraph(
    w: &mut Writer<Vec<u8>>,
    style: Option<&str>,
    text: &str,
) -> std::result::Result<(), BoxError> {
    w.write_event(Event::Start(BytesStart::new("w:p")))?;

    if let Some(style) = style {
        w.write_event(Event::Start(BytesStart::new("w:pPr")))?;
        w.write_event(Event::Empty(
            BytesStart::new("w:pStyle").with_attributes([("w:val", style)]),
        ))?;
        w.write_event(Event::End(BytesEnd::new("w:pPr")))?;
    }

    w.write_event(Event::Start(BytesStart::new("w:r")))?;
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            w.write_event(Event::Empty(BytesStart::new("w:br")))?;
        }
        w.write_event(Event::Start(
            BytesStart::new("w:t").with_attributes([("xml:space", "preserve")]),
        ))?;
        w.write_event(Event::Text(BytesText::new(&xml_safe(line))))?;
        w.write_event(Event::End(BytesEnd::new("w:t")))?;
    }
    w.write_event(Event::End(BytesEnd::new("w:r")))?;

    w.write_event(Event::End(BytesEnd::new("w:p")))?;
    Ok(())
}
