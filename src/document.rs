//! Reading tables and body paragraphs out of a `.docx` file.
//!
//! A `.docx` is a ZIP container; everything needed here lives in
//! `word/document.xml`.

use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use thiserror::Error;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("cannot read document: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a .docx container: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("missing {0} in container")]
    MissingPart(&'static str),
    #[error("malformed document XML: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// A table as rows of cell text, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub rows: Vec<Vec<String>>,
}

/// The searchable content of a Word document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordDocument {
    pub tables: Vec<RawTable>,
    /// Trimmed, non-empty body paragraphs. Paragraphs inside tables are not
    /// repeated here.
    pub paragraphs: Vec<String>,
}

impl WordDocument {
    pub fn open(path: &Path) -> Result<Self, DocumentError> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocumentError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut part = match archive.by_name(DOCUMENT_PART) {
            Ok(part) => part,
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(DocumentError::MissingPart(DOCUMENT_PART));
            }
            Err(e) => return Err(e.into()),
        };
        let mut xml = String::new();
        part.read_to_string(&mut xml)?;
        parse_document_xml(&xml)
    }
}

/// Cell being filled, and the table it belongs to.
#[derive(Default)]
struct TableState {
    rows: Vec<Vec<String>>,
    row: Vec<String>,
    cell: String,
    cell_paragraphs: usize,
}

/// Walk `document.xml`, collecting `w:t` text into paragraphs and cells.
///
/// Only the outermost table is structured; text of nested tables is folded
/// into the enclosing cell, and text-box paragraphs into the paragraph that
/// anchors them.
pub fn parse_document_xml(xml: &str) -> Result<WordDocument, DocumentError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut document = WordDocument::default();
    let mut table: Option<TableState> = None;
    let mut table_depth = 0usize;
    let mut paragraph = String::new();
    // Text boxes (`w:txbxContent`) put whole paragraphs inside a run.
    let mut paragraph_depth = 0usize;
    let mut in_text = false;
    // Tab stops inside paragraph properties are layout, not content.
    let mut in_properties = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"tbl" => {
                    table_depth += 1;
                    if table_depth == 1 {
                        table = Some(TableState::default());
                    }
                }
                b"tr" if table_depth == 1 => {
                    if let Some(t) = table.as_mut() {
                        t.row.clear();
                    }
                }
                b"tc" if table_depth == 1 => {
                    if let Some(t) = table.as_mut() {
                        t.cell.clear();
                        t.cell_paragraphs = 0;
                    }
                }
                b"p" => {
                    if paragraph_depth == 0 {
                        paragraph.clear();
                    } else if !paragraph.is_empty() {
                        paragraph.push('\n');
                    }
                    paragraph_depth += 1;
                }
                b"pPr" => in_properties = true,
                b"t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" if !in_properties => paragraph.push('\t'),
                b"br" | b"cr" => paragraph.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text => paragraph.push_str(&t.unescape()?),
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"pPr" => in_properties = false,
                b"p" if paragraph_depth > 1 => {
                    paragraph_depth -= 1;
                    paragraph.push('\n');
                }
                b"p" => {
                    paragraph_depth = 0;
                    let text = paragraph.trim();
                    match table.as_mut() {
                        Some(t) if table_depth > 0 => {
                            if t.cell_paragraphs > 0 {
                                t.cell.push('\n');
                            }
                            t.cell.push_str(text);
                            t.cell_paragraphs += 1;
                        }
                        _ if !text.is_empty() => document.paragraphs.push(text.to_string()),
                        _ => {}
                    }
                    paragraph.clear();
                }
                b"tc" if table_depth == 1 => {
                    if let Some(t) = table.as_mut() {
                        let cell = t.cell.trim().to_string();
                        t.row.push(cell);
                    }
                }
                b"tr" if table_depth == 1 => {
                    if let Some(t) = table.as_mut() {
                        let row = std::mem::take(&mut t.row);
                        t.rows.push(row);
                    }
                }
                b"tbl" => {
                    table_depth = table_depth.saturating_sub(1);
                    if table_depth == 0
                        && let Some(t) = table.take()
                    {
                        document.tables.push(RawTable { rows: t.rows });
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(document)
}
