//! Paginated PDF export of the note log
//!
//! Layout: the title centered on the first page, then every note as a
//! `[timestamp]` line followed by its wrapped text and a blank line. Pages
//! break after a fixed number of text lines.

use super::{NoteLog, NotesError};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::io::Write;

/// A4 in points
const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 56;
const FONT_SIZE: i64 = 12;
const TITLE_SIZE: i64 = 16;
const LINE_HEIGHT: i64 = 14;
/// Helvetica at 12pt fits roughly this many characters per line
const WRAP_COLUMNS: usize = 85;

/// Render options for the PDF export
#[derive(Debug, Clone)]
pub struct PdfOptions {
    pub title: String,
    pub lines_per_page: usize,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            title: "Affectrum CRM Notes".to_string(),
            lines_per_page: 50,
        }
    }
}

impl NoteLog {
    /// Write the log as a paginated PDF document
    pub fn export_pdf<W: Write>(&self, writer: &mut W, options: &PdfOptions) -> Result<(), NotesError> {
        let pages = paginate(&self.text_lines(), options.lines_per_page.max(1));
        let mut doc = Document::with_version("1.5");

        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => Object::Reference(font_id),
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for (idx, lines) in pages.iter().enumerate() {
            let title = (idx == 0).then_some(options.title.as_str());
            let content = page_content(title, lines);
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
                "Contents" => Object::Reference(content_id),
            });
            kids.push(Object::Reference(page_id));
        }

        let page_count = kids.len() as i64;
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(page_count),
            "Resources" => Object::Reference(resources_id),
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let catalog_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));
        doc.compress();

        doc.save_to(writer)?;
        tracing::debug!(notes = self.len(), pages = page_count, "Exported notes as PDF");
        Ok(())
    }

    /// Flatten notes into the printed text lines
    fn text_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for note in self.notes() {
            lines.push(format!("[{}]", note.timestamp));
            for paragraph in note.text.lines() {
                lines.extend(wrap(paragraph, WRAP_COLUMNS));
            }
            lines.push(String::new());
        }
        lines
    }
}

/// Split lines into pages; an empty log still yields one (title) page
fn paginate(lines: &[String], per_page: usize) -> Vec<Vec<String>> {
    if lines.is_empty() {
        return vec![Vec::new()];
    }
    lines.chunks(per_page).map(<[String]>::to_vec).collect()
}

/// Greedy word wrap; words longer than the width are split
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let needed = if current.is_empty() { word.len() } else { current.chars().count() + 1 + word.len() };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn page_content(title: Option<&str>, lines: &[String]) -> Content {
    let mut operations = vec![Operation::new("BT", vec![])];
    let mut y = PAGE_HEIGHT - MARGIN;

    if let Some(title) = title {
        // Approximate centering: Helvetica averages about half an em per glyph
        let width = title.chars().count() as i64 * TITLE_SIZE / 2;
        let x = ((PAGE_WIDTH - width) / 2).max(MARGIN);
        operations.extend(text_at(title, x, y, TITLE_SIZE));
        y -= LINE_HEIGHT * 2;
    }

    for line in lines {
        if !line.is_empty() {
            operations.extend(text_at(line, MARGIN, y, FONT_SIZE));
        }
        y -= LINE_HEIGHT;
    }

    operations.push(Operation::new("ET", vec![]));
    Content { operations }
}

/// Absolute positioning via the text matrix, so lines are independent
fn text_at(text: &str, x: i64, y: i64, size: i64) -> Vec<Operation> {
    vec![
        Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(size)]),
        Operation::new(
            "Tm",
            vec![
                Object::Integer(1),
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(1),
                Object::Integer(x),
                Object::Integer(y),
            ],
        ),
        Operation::new("Tj", vec![Object::string_literal(latin1(text))]),
    ]
}

/// The standard Helvetica font only covers Latin-1
fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| if (c as u32) < 256 { c as u8 } else { b'?' })
        .collect()
}
