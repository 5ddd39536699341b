//! Deciding which table cells and paragraphs mention the target date.

use chrono::NaiveDate;
use docdate_types::HitOrigin;
use tracing::debug;

use crate::candidates::{CandidateForm, date_candidates, locate};
use crate::normalize::normalize;
use crate::recognize::{Calendar, recognize_dates};

/// One unit of searchable text, borrowed from the parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord<'a> {
    pub origin: HitOrigin,
    pub text: &'a str,
}

/// Which strategy accepted a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchVia {
    /// A fixed rendering of the target occurs verbatim.
    Candidate(CandidateForm),
    /// The free-text recognizer found a date equal to the target.
    Recognized,
}

/// Test one text against the target date.
///
/// Exact renderings are tried first; the recognizer only runs when none of
/// them occurs.
pub fn match_text(text: &str, target: NaiveDate, roc_years: bool) -> Option<MatchVia> {
    if text.trim().is_empty() {
        return None;
    }
    let normalized = normalize(text);

    let candidates = date_candidates(target, roc_years);
    if let Some((candidate, _)) = locate(&normalized, &candidates) {
        return Some(MatchVia::Candidate(candidate.form));
    }

    recognize_dates(&normalized, Calendar::around(target, roc_years))
        .iter()
        .any(|mention| mention.matches(target))
        .then_some(MatchVia::Recognized)
}

/// Keep the records that mention `target`, in their original order.
pub fn filter_matches<'r, 'a>(
    records: &'r [SourceRecord<'a>],
    target: NaiveDate,
    roc_years: bool,
) -> Vec<&'r SourceRecord<'a>> {
    records
        .iter()
        .filter(|record| match match_text(record.text, target, roc_years) {
            Some(via) => {
                debug!(origin = ?record.origin, ?via, "record mentions target date");
                true
            }
            None => false,
        })
        .collect()
}
