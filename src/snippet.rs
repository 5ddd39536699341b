//! Cutting a bounded excerpt that starts at the date mention.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::candidates::{date_candidates, locate};
use crate::normalize::normalize;
use crate::recognize::{Calendar, recognize_dates};

static RE_ISO_NEEDLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]{4})[-/]([0-9]{1,2})[-/]([0-9]{1,2})").unwrap());

/// What to look for, and how much text to keep after it.
#[derive(Debug, Clone)]
pub struct SnippetQuery {
    pub target: NaiveDate,
    /// Literal search text. Defaults to the target as `YYYY-MM-DD`.
    pub needle: Option<String>,
    /// Characters kept after the date text.
    pub num_chars: usize,
    pub roc_years: bool,
}

impl SnippetQuery {
    pub fn new(target: NaiveDate, num_chars: usize) -> Self {
        SnippetQuery {
            target,
            needle: None,
            num_chars,
            roc_years: true,
        }
    }

    pub fn with_needle(mut self, needle: Option<String>) -> Self {
        self.needle = needle;
        self
    }

    pub fn with_roc_years(mut self, roc_years: bool) -> Self {
        self.roc_years = roc_years;
        self
    }

    fn needle(&self) -> String {
        match &self.needle {
            Some(needle) => normalize(needle.trim()).into_owned(),
            None => self.target.format("%Y-%m-%d").to_string(),
        }
    }
}

/// An excerpt of a source text that begins with the date mention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub text: String,
    /// Character offset of the excerpt in the source text.
    pub char_offset: usize,
    /// Leading characters of `text` that are the date itself.
    pub date_chars: usize,
}

/// `2025年10月5日` for a needle containing `2025-10-05` or `2025/10/5`.
pub fn chinese_long_form(needle: &str) -> Option<String> {
    let caps = RE_ISO_NEEDLE.captures(needle)?;
    let year: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    Some(format!("{year}年{month}月{day}日"))
}

fn char_offset(text: &str, byte: usize) -> usize {
    text[..byte].chars().count()
}

/// Character offset and character length of the date mention to cut from.
///
/// Search order: the fixed renderings in priority order, the needle as a
/// plain substring, the Chinese long form of the needle, then the first
/// recognized mention equal to the target.
pub fn locate_date(text: &str, query: &SnippetQuery) -> Option<(usize, usize)> {
    let normalized = normalize(text);

    let candidates = date_candidates(query.target, query.roc_years);
    if let Some((candidate, byte)) = locate(&normalized, &candidates) {
        return Some((char_offset(&normalized, byte), candidate.text.chars().count()));
    }

    let needle = query.needle();
    if !needle.is_empty()
        && let Some(byte) = normalized.find(needle.as_str())
    {
        return Some((char_offset(&normalized, byte), needle.chars().count()));
    }
    if let Some(chinese) = chinese_long_form(&needle)
        && let Some(byte) = normalized.find(chinese.as_str())
    {
        return Some((char_offset(&normalized, byte), chinese.chars().count()));
    }

    recognize_dates(&normalized, Calendar::around(query.target, query.roc_years))
        .into_iter()
        .find(|mention| mention.matches(query.target))
        .map(|mention| (mention.char_start, mention.char_len))
}

/// Cut `date + num_chars` characters starting at the date mention, clipped
/// to the end of `text`. `None` when no mention is found.
pub fn extract_snippet(text: &str, query: &SnippetQuery) -> Option<Snippet> {
    let (char_offset, date_chars) = locate_date(text, query)?;
    let excerpt: String = text
        .chars()
        .skip(char_offset)
        .take(date_chars + query.num_chars)
        .collect();
    if excerpt.is_empty() {
        return None;
    }
    Some(Snippet {
        text: excerpt,
        char_offset,
        date_chars,
    })
}
