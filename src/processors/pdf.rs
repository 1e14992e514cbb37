//! PDF text extraction and export rendering
//!
//! Export is split in two steps: [`layout_pages`] places every line on US Letter
//! pages, wrapping words against the Helvetica metrics and breaking pages at the
//! bottom margin; [`render`] then serialises the placed lines with lopdf using the
//! standard Helvetica fonts, one text object per line.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use tracing::debug;

use crate::core::errors::{BoxError, Result, ServiceError};
use crate::processors::export::{ExportJob, TITLE};
use crate::processors::fonts::{encode_win_ansi, helvetica_width};

pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
pub const MARGIN: f32 = 50.0;

const BODY_SIZE: f32 = 12.0;
const HEADING_SIZE: f32 = 14.0;
const LEADING_FACTOR: f32 = 1.2;

/// Widest a body line may be
pub const MAX_LINE_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource_name(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

/// A line of text placed at its baseline origin
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub font: Font,
    pub size: f32,
    pub x: f32,
    pub y: f32,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub lines: Vec<PlacedLine>,
}

/// Cursor state while laying out lines
struct Layout {
    pages: Vec<Page>,
    current: Page,
    y: f32,
    font: Font,
    size: f32,
}

impl Layout {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Page::default(),
            y: PAGE_HEIGHT - MARGIN,
            font: Font::Regular,
            size: BODY_SIZE,
        }
    }

    fn set_font(&mut self, font: Font, size: f32) {
        self.font = font;
        self.size = size;
    }

    /// Place one line and advance; start a new page once the bottom margin is reached
    fn line(&mut self, text: &str) {
        self.current.lines.push(PlacedLine {
            font: self.font,
            size: self.size,
            x: MARGIN,
            y: self.y,
            text: text.to_string(),
        });
        self.y -= self.size * LEADING_FACTOR;

        if self.y <= MARGIN {
            self.pages.push(std::mem::take(&mut self.current));
            self.y = PAGE_HEIGHT - MARGIN;
            self.set_font(Font::Regular, BODY_SIZE);
        }
    }

    /// Greedy word wrap of one input line at the body font
    fn wrapped(&mut self, input: &str) {
        let mut buffer = String::new();

        for word in input.split(' ') {
            let candidate = format!("{}{}", buffer, word);
            if helvetica_width(&candidate, BODY_SIZE) < MAX_LINE_WIDTH {
                buffer = candidate;
                buffer.push(' ');
                continue;
            }

            if !buffer.is_empty() {
                self.line(buffer.trim());
            }
            buffer = self.split_long_word(word);
            buffer.push(' ');
        }

        if !buffer.is_empty() {
            self.line(buffer.trim());
        }
    }

    /// Emit full-width chunks of a word wider than a line; returns the remainder
    fn split_long_word(&mut self, word: &str) -> String {
        let mut chunk = String::new();
        for ch in word.chars() {
            chunk.push(ch);
            if helvetica_width(&chunk, BODY_SIZE) >= MAX_LINE_WIDTH && chunk.chars().count() > 1 {
                chunk.pop();
                self.line(&chunk);
                chunk.clear();
                chunk.push(ch);
            }
        }
        chunk
    }

    fn finish(mut self) -> Vec<Page> {
        if !self.current.lines.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

/// Place the title, wrapped text and metric sections on pages
pub fn layout_pages(job: &ExportJob) -> Vec<Page> {
    let mut layout = Layout::new();

    layout.set_font(Font::Bold, HEADING_SIZE);
    layout.line(TITLE);
    layout.set_font(Font::Regular, BODY_SIZE);
    layout.line("");

    for input in job.text.split('\n') {
        layout.wrapped(input.trim_end_matches('\r'));
    }
    layout.line("");

    for (i, section) in job.metric_sections().iter().enumerate() {
        if i > 0 {
            layout.line("");
        }
        layout.set_font(Font::Bold, HEADING_SIZE);
        layout.line(section.title);
        layout.set_font(Font::Regular, BODY_SIZE);
        layout.line("");
        for metric in &section.lines {
            layout.line(metric);
        }
    }

    layout.finish()
}

/// Render the export as a PDF document
pub fn render(job: &ExportJob) -> Result<Vec<u8>> {
    let pages = layout_pages(job);
    debug!("PDF export laid out on {} pages", pages.len());
    write_document(&pages).map_err(|e| ServiceError::export(job.format, e))
}

fn page_content(page: &Page) -> Content {
    let mut operations = Vec::new();

    for line in page.lines.iter().filter(|l| !l.text.is_empty()) {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![line.font.resource_name().into(), line.size.into()],
        ));
        operations.push(Operation::new("Td", vec![line.x.into(), line.y.into()]));
        operations.push(Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(&line.text), StringFormat::Hexadecimal)],
        ));
        operations.push(Operation::new("ET", vec![]));
    }

    Content { operations }
}

fn write_document(pages: &[Page]) -> std::result::Result<Vec<u8>, BoxError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, page_content(page).encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

/// Text of every page, each non-empty page followed by a newline
pub fn extract_text(bytes: &[u8]) -> std::result::Result<String, BoxError> {
    let doc = Document::load_mem(bytes)?;

    let mut text = String::new();
    for page_number in doc.get_pages().keys() {
        let page_text = doc.extract_text(&[*page_number])?;
        if !page_text.trim().is_empty() {
            text.push_str(&page_text);
            text.push('\n');
        }
    }

    Ok(text.trim().to_string())
}
