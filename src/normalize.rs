//! Punctuation canonicalization and Republic-of-China year handling.
//!
//! Dates in office documents show up with full-width separators from CJK
//! input methods (`2025／10／23`) or with underscores (`2025_10_23`). Every
//! rewrite here is one character for one character, so a character offset
//! found in the normalized text points at the same character in the
//! original.

use std::borrow::Cow;

/// Gregorian year of ROC year 0.
pub const ROC_OFFSET: i32 = 1911;

/// Year fields below this value are read as ROC years.
pub const ROC_CUTOFF: i32 = 200;

/// Two-digit years below this are 20xx, the rest 19xx (chrono's `%y` rule).
pub const TWO_DIGIT_PIVOT: i32 = 69;

const REWRITES: &[(char, char)] = &[('／', '/'), ('－', '-'), ('_', '/'), ('．', '.')];

fn rewrite(c: char) -> Option<char> {
    REWRITES
        .iter()
        .find(|(from, _)| *from == c)
        .map(|(_, to)| *to)
}

/// Rewrite full-width and underscore separators to ASCII.
///
/// Borrows when there is nothing to rewrite.
pub fn normalize(text: &str) -> Cow<'_, str> {
    if !text.chars().any(|c| rewrite(c).is_some()) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.chars().map(|c| rewrite(c).unwrap_or(c)).collect())
}

/// Resolve a year field, treating values below [`ROC_CUTOFF`] as ROC years
/// when `roc_years` is on.
pub fn resolve_year(raw: i32, roc_years: bool) -> i32 {
    if roc_years && raw < ROC_CUTOFF {
        raw + ROC_OFFSET
    } else {
        raw
    }
}

/// Expand the `25` of `10/23/25` to a full year.
pub fn expand_two_digit_year(yy: i32) -> i32 {
    if yy < TWO_DIGIT_PIVOT { 2000 + yy } else { 1900 + yy }
}

/// The ROC year for a Gregorian year, if it falls in the range that
/// [`resolve_year`] would read back.
pub fn roc_year(gregorian: i32) -> Option<i32> {
    let roc = gregorian - ROC_OFFSET;
    (1..ROC_CUTOFF).contains(&roc).then_some(roc)
}
