use serde::{Deserialize, Serialize};

// ── Table row values ─────────────────────────────────────────────────────

/// One cell of the table row a hit was found in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellValue {
    pub column: String,
    pub value: String,
}

// ── Where a hit came from ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HitOrigin {
    /// A cell of a table column. `table` and `row` are 0-based.
    TableCell {
        table: usize,
        column: String,
        row: usize,
    },
    /// A body paragraph, indexed over the non-empty paragraphs only.
    Paragraph { index: usize },
}

impl HitOrigin {
    /// `table_N` (1-based) for table cells, `paragraphs` otherwise.
    pub fn source_label(&self) -> String {
        match self {
            HitOrigin::TableCell { table, .. } => format!("table_{}", table + 1),
            HitOrigin::Paragraph { .. } => "paragraphs".to_string(),
        }
    }

    /// The column name for table cells, `text` for paragraphs.
    pub fn field_label(&self) -> &str {
        match self {
            HitOrigin::TableCell { column, .. } => column,
            HitOrigin::Paragraph { .. } => "text",
        }
    }
}

// ── Hits ─────────────────────────────────────────────────────────────────

/// A record that contains the target date, with the excerpt cut from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hit {
    pub origin: HitOrigin,
    /// Never empty.
    pub snippet: String,
    /// How many leading characters of `snippet` are the date text itself.
    pub date_chars: usize,
    /// The full table row for table hits; empty for paragraphs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub row: Vec<CellValue>,
}

impl Hit {
    /// The leading date text of the snippet.
    pub fn date_text(&self) -> &str {
        match self.snippet.char_indices().nth(self.date_chars) {
            Some((idx, _)) => &self.snippet[..idx],
            None => &self.snippet,
        }
    }

    /// The snippet text following the date.
    pub fn trailing_text(&self) -> &str {
        &self.snippet[self.date_text().len()..]
    }
}

// ── Run summary ──────────────────────────────────────────────────────────

/// Which part of the document produced the hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitScope {
    Tables,
    Paragraphs,
    Nothing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    /// Target date, `YYYY-MM-DD`.
    pub target: String,
    pub tables_found: usize,
    pub scope: HitScope,
    pub hits: Vec<Hit>,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}
