//! Writing a search summary out as CSV, plain text, Word or JSON.

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use clap::ValueEnum;
use docdate_types::{Hit, HitOrigin, Summary};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zip::ZipWriter;
use zip::write::FileOptions;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Word XML generation failed: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("Word container generation failed: {0}")]
    Archive(#[from] zip::result::ZipError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Txt,
    Docx,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Txt => "txt",
            ExportFormat::Docx => "docx",
            ExportFormat::Json => "json",
        }
    }

    pub fn render(self, summary: &Summary) -> Result<Vec<u8>, ExportError> {
        match self {
            ExportFormat::Csv => Ok(render_csv(summary).into_bytes()),
            ExportFormat::Txt => Ok(render_txt(summary).into_bytes()),
            ExportFormat::Docx => render_docx(summary),
            ExportFormat::Json => Ok(serde_json::to_vec_pretty(summary)?),
        }
    }
}

/// `summary_{target}.{ext}`, or `summary_{stem}_{target}.{ext}` when several
/// documents share one output directory.
pub fn default_file_name(target: &str, stem: Option<&str>, format: ExportFormat) -> String {
    let ext = format.extension();
    match stem {
        Some(stem) => format!("summary_{stem}_{target}.{ext}"),
        None => format!("summary_{target}.{ext}"),
    }
}

pub fn write_summary(path: &Path, summary: &Summary, format: ExportFormat) -> Result<(), ExportError> {
    let bytes = format.render(summary)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
//  CSV
// ═══════════════════════════════════════════════════════════════════════

const CSV_BOM: &str = "\u{feff}";
const PARA_INDEX: &str = "para_index";
const TRAILING_COLUMNS: [&str; 3] = ["text", "_source_table", "_matched_column"];

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_line(out: &mut String, fields: &[&str]) {
    let line: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
    out.push_str(&line.join(","));
    out.push_str("\r\n");
}

/// Original column names in order of first appearance, then `para_index`
/// when any hit is a paragraph. Names that collide with the trailing
/// columns are left out; the trailing value wins.
fn csv_columns(hits: &[Hit]) -> Vec<&str> {
    let mut columns: Vec<&str> = Vec::new();
    for cell in hits.iter().flat_map(|h| h.row.iter()) {
        let name = cell.column.as_str();
        if !columns.contains(&name) && !TRAILING_COLUMNS.contains(&name) && name != PARA_INDEX {
            columns.push(name);
        }
    }
    if hits
        .iter()
        .any(|h| matches!(h.origin, HitOrigin::Paragraph { .. }))
    {
        columns.push(PARA_INDEX);
    }
    columns
}

fn render_csv(summary: &Summary) -> String {
    let columns = csv_columns(&summary.hits);
    let mut out = String::from(CSV_BOM);

    let header: Vec<&str> = columns.iter().copied().chain(TRAILING_COLUMNS).collect();
    csv_line(&mut out, &header);

    for hit in &summary.hits {
        let para_index = match hit.origin {
            HitOrigin::Paragraph { index } => index.to_string(),
            HitOrigin::TableCell { .. } => String::new(),
        };
        let source = hit.origin.source_label();
        let mut fields: Vec<&str> = columns
            .iter()
            .map(|&column| {
                if column == PARA_INDEX {
                    return para_index.as_str();
                }
                hit.row
                    .iter()
                    .find(|cell| cell.column == column)
                    .map_or("", |cell| cell.value.as_str())
            })
            .collect();
        fields.extend([hit.snippet.as_str(), source.as_str(), hit.origin.field_label()]);
        csv_line(&mut out, &fields);
    }
    out
}

// ═══════════════════════════════════════════════════════════════════════
//  TXT
// ═══════════════════════════════════════════════════════════════════════

fn render_txt(summary: &Summary) -> String {
    let mut out = String::new();
    for hit in &summary.hits {
        out.push_str(&format!(
            "來源: {}, 欄位: {}\n",
            hit.origin.source_label(),
            hit.origin.field_label()
        ));
        out.push_str(&hit.snippet);
        out.push('\n');
        out.push_str("----\n");
    }
    out
}

// ═══════════════════════════════════════════════════════════════════════
//  DOCX
// ═══════════════════════════════════════════════════════════════════════

const DOCX_HEADING: &str = "搜尋摘要結果";
const WORD_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="32"/></w:rPr></w:style></w:styles>"#;

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// A text run, optionally highlighted yellow.
fn write_run(w: &mut XmlWriter, text: &str, highlight: bool) -> quick_xml::Result<()> {
    w.write_event(Event::Start(BytesStart::new("w:r")))?;
    if highlight {
        w.write_event(Event::Start(BytesStart::new("w:rPr")))?;
        w.write_event(Event::Empty(
            BytesStart::new("w:highlight").with_attributes([("w:val", "yellow")]),
        ))?;
        w.write_event(Event::End(BytesEnd::new("w:rPr")))?;
    }
    w.write_event(Event::Start(
        BytesStart::new("w:t").with_attributes([("xml:space", "preserve")]),
    ))?;
    w.write_event(Event::Text(BytesText::new(text)))?;
    w.write_event(Event::End(BytesEnd::new("w:t")))?;
    w.write_event(Event::End(BytesEnd::new("w:r")))
}

fn write_paragraph(
    w: &mut XmlWriter,
    style: Option<&str>,
    runs: &[(&str, bool)],
) -> quick_xml::Result<()> {
    w.write_event(Event::Start(BytesStart::new("w:p")))?;
    if let Some(style) = style {
        w.write_event(Event::Start(BytesStart::new("w:pPr")))?;
        w.write_event(Event::Empty(
            BytesStart::new("w:pStyle").with_attributes([("w:val", style)]),
        ))?;
        w.write_event(Event::End(BytesEnd::new("w:pPr")))?;
    }
    for &(text, highlight) in runs {
        if !text.is_empty() {
            write_run(w, text, highlight)?;
        }
    }
    w.write_event(Event::End(BytesEnd::new("w:p")))
}

fn document_xml(summary: &Summary) -> quick_xml::Result<Vec<u8>> {
    let mut w = Writer::new(Cursor::new(Vec::new()));
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    w.write_event(Event::Start(
        BytesStart::new("w:document").with_attributes([("xmlns:w", WORD_NS)]),
    ))?;
    w.write_event(Event::Start(BytesStart::new("w:body")))?;

    write_paragraph(&mut w, Some("Heading1"), &[(DOCX_HEADING, false)])?;
    let keyword = format!("搜尋日期關鍵字：{}", summary.target);
    write_paragraph(&mut w, None, &[(&keyword, false)])?;
    write_paragraph(&mut w, None, &[(" ", false)])?;

    for (n, hit) in summary.hits.iter().enumerate() {
        let number = format!("{}. ", n + 1);
        write_paragraph(
            &mut w,
            None,
            &[
                (&number, false),
                (hit.date_text(), true),
                (hit.trailing_text(), false),
            ],
        )?;
    }

    w.write_event(Event::End(BytesEnd::new("w:body")))?;
    w.write_event(Event::End(BytesEnd::new("w:document")))?;
    Ok(w.into_inner().into_inner())
}

/// A Word document listing every snippet with its date highlighted.
fn render_docx(summary: &Summary) -> Result<Vec<u8>, ExportError> {
    let document = document_xml(summary)?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    let parts: [(&str, &[u8]); 5] = [
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
        ("_rels/.rels", PACKAGE_RELS.as_bytes()),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS.as_bytes()),
        ("word/styles.xml", STYLES.as_bytes()),
        ("word/document.xml", &document),
    ];
    for (name, bytes) in parts {
        zip.start_file(name, options)?;
        zip.write_all(bytes)?;
    }
    Ok(zip.finish()?.into_inner())
}
