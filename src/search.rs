//! One search request against one parsed document.

use chrono::NaiveDate;
use docdate_types::{Hit, HitOrigin, HitScope, Summary};
use tracing::{debug, info, warn};

use crate::config::DEFAULT_NUM_CHARS;
use crate::document::WordDocument;
use crate::matcher::{SourceRecord, filter_matches};
use crate::snippet::{SnippetQuery, extract_snippet};
use crate::table::{self, Frame, HeaderRow};

/// Columns searched when none are named.
pub const DEFAULT_COLUMN_COUNT: usize = 2;

/// Which table columns to search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ColumnChoice {
    /// The first [`DEFAULT_COLUMN_COUNT`] column names in document order.
    #[default]
    Default,
    All,
    Named(Vec<String>),
}

impl ColumnChoice {
    /// Pick from the column names the document actually has.
    pub fn resolve(&self, available: &[&str]) -> Vec<String> {
        match self {
            ColumnChoice::Default => available
                .iter()
                .take(DEFAULT_COLUMN_COUNT)
                .map(|c| c.to_string())
                .collect(),
            ColumnChoice::All => available.iter().map(|c| c.to_string()).collect(),
            ColumnChoice::Named(names) => {
                let mut chosen: Vec<String> = Vec::new();
                for name in names {
                    if !available.contains(&name.as_str()) {
                        warn!(column = %name, "no table has this column");
                    } else if !chosen.contains(name) {
                        chosen.push(name.clone());
                    }
                }
                chosen
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub target: NaiveDate,
    /// The date as the user typed it, used as a last-resort literal.
    pub needle: Option<String>,
    pub num_chars: usize,
    pub columns: ColumnChoice,
    /// Search table columns before falling back to paragraphs.
    pub prefer_tables: bool,
    pub header_row: HeaderRow,
    pub roc_years: bool,
}

impl SearchRequest {
    pub fn new(target: NaiveDate) -> Self {
        SearchRequest {
            target,
            needle: None,
            num_chars: DEFAULT_NUM_CHARS,
            columns: ColumnChoice::Default,
            prefer_tables: true,
            header_row: HeaderRow::First,
            roc_years: true,
        }
    }

    fn snippet_query(&self) -> SnippetQuery {
        SnippetQuery::new(self.target, self.num_chars)
            .with_needle(self.needle.clone())
            .with_roc_years(self.roc_years)
    }
}

/// Cut snippets for the kept records, dropping any without one.
fn collect_hits(
    records: &[SourceRecord<'_>],
    request: &SearchRequest,
    query: &SnippetQuery,
    frame: Option<&Frame>,
) -> Vec<Hit> {
    let mut hits = Vec::new();
    for record in filter_matches(records, request.target, request.roc_years) {
        let Some(snippet) = extract_snippet(record.text, query) else {
            debug!(origin = ?record.origin, "matched record has no snippet, dropped");
            continue;
        };
        let row = match (&record.origin, frame) {
            (HitOrigin::TableCell { row, .. }, Some(frame)) => frame.row_values(*row),
            _ => Vec::new(),
        };
        hits.push(Hit {
            origin: record.origin.clone(),
            snippet: snippet.text,
            date_chars: snippet.date_chars,
            row,
        });
    }
    hits
}

fn search_tables(frames: &[Frame], request: &SearchRequest, query: &SnippetQuery) -> Vec<Hit> {
    let available = table::column_names(frames);
    let chosen = request.columns.resolve(&available);
    if chosen.is_empty() {
        info!("no table columns selected, skipping tables");
        return Vec::new();
    }
    info!(columns = ?chosen, "scanning table columns");

    let mut hits = Vec::new();
    for frame in frames {
        for column in &chosen {
            let records = frame.column_records(column);
            hits.extend(collect_hits(&records, request, query, Some(frame)));
        }
    }
    hits
}

fn search_paragraphs(paragraphs: &[String], request: &SearchRequest, query: &SnippetQuery) -> Vec<Hit> {
    let records: Vec<SourceRecord<'_>> = paragraphs
        .iter()
        .enumerate()
        .map(|(index, text)| SourceRecord {
            origin: HitOrigin::Paragraph { index },
            text: text.as_str(),
        })
        .collect();
    collect_hits(&records, request, query, None)
}

/// Search the document's tables, then its paragraphs if the tables produced
/// nothing. Table hits are ordered by table, then chosen column, then row.
pub fn run_search(document: &WordDocument, request: &SearchRequest) -> Summary {
    let target = request.target.format("%Y-%m-%d").to_string();
    info!(date = %target, "searching document");

    let query = request.snippet_query();
    let frames = table::frames(document, request.header_row);

    let mut hits = Vec::new();
    let mut scope = HitScope::Nothing;
    if request.prefer_tables && !frames.is_empty() {
        info!(tables = frames.len(), "tables detected");
        hits = search_tables(&frames, request, &query);
        if !hits.is_empty() {
            scope = HitScope::Tables;
        }
    }
    if hits.is_empty() {
        info!(paragraphs = document.paragraphs.len(), "searching paragraphs");
        hits = search_paragraphs(&document.paragraphs, request, &query);
        if !hits.is_empty() {
            scope = HitScope::Paragraphs;
        }
    }
    info!(hits = hits.len(), "search finished");

    Summary {
        target,
        tables_found: frames.len(),
        scope,
        hits,
    }
}
