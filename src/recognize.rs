//! Free-text date recognition.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{Datelike, Local, NaiveDate};
use regex::{Captures, Regex};
use thiserror::Error;
use tracing::trace;

use crate::normalize::{expand_two_digit_year, normalize, resolve_year};

// ── Regex patterns ─────────────────────────────────────────────────
//
// Pattern families, highest priority first. The alternation is
// leftmost-first, so at any position an earlier family wins:
//
//   20251023            compact
//   10/23/2025          month-first with a four-digit year
//   10/23/25            month-first with a two-digit year; read year-first
//                       (99/12/31) when the first field is not a month
//   2025/10/23          year-first, also 114-10-23 (ROC year), 2025.10.23
//   2025年10月23日       glyph form, year optional (10月23日, 114年10月23日)
//   10/23               year omitted
//
// Digits are ASCII only; full-width digits are not dates here.
const DATE_PATTERN: &str = concat!(
    r"(?P<cy>[0-9]{4})(?P<cm>[0-9]{2})(?P<cd>[0-9]{2})",
    r"|(?P<um>[0-9]{1,2})[/\-](?P<ud>[0-9]{1,2})[/\-](?P<uy>[0-9]{4})",
    r"|(?P<sm>[0-9]{1,2})[/\-](?P<sd>[0-9]{1,2})[/\-](?P<sy>[0-9]{2})",
    r"|(?P<y>[0-9]{2,4})[/\-.](?P<m>[0-9]{1,2})[/\-.](?P<d>[0-9]{1,2})",
    r"|(?:(?P<gy>[0-9]{2,4})\s*年\s*)?(?P<gm>[0-9]{1,2})\s*月\s*(?P<gd>[0-9]{1,2})\s*[日號号]",
    r"|(?P<om>[0-9]{1,2})[/\-](?P<od>[0-9]{1,2})",
);

static RE_DATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(DATE_PATTERN).unwrap());

static RE_DATE_EXACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^\s*(?:{DATE_PATTERN})\s*$")).unwrap());

// ── Calendar construction ──────────────────────────────────────────

/// Why a numeric triple is not a calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidDate {
    #[error("month {month} is out of range")]
    MonthOutOfRange { month: u32 },
    #[error("day {day} does not exist in {year}-{month:02}")]
    DayOutOfRange { year: i32, month: u32, day: u32 },
}

/// Build a calendar date, reporting which field is wrong.
pub fn build_date(year: i32, month: u32, day: u32) -> Result<NaiveDate, InvalidDate> {
    if !(1..=12).contains(&month) {
        return Err(InvalidDate::MonthOutOfRange { month });
    }
    NaiveDate::from_ymd_opt(year, month, day).ok_or(InvalidDate::DayOutOfRange { year, month, day })
}

/// What year-omitted mentions and short year fields resolve against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    /// Year given to year-omitted mentions.
    pub reference_year: i32,
    /// Read year fields below 200 as ROC years.
    pub roc_years: bool,
}

impl Calendar {
    /// Resolve against the current local year.
    pub fn current(roc_years: bool) -> Self {
        Calendar {
            reference_year: Local::now().year(),
            roc_years,
        }
    }

    /// Resolve against the year of the date being searched for.
    pub fn around(target: NaiveDate, roc_years: bool) -> Self {
        Calendar {
            reference_year: target.year(),
            roc_years,
        }
    }
}

/// Month and day with an optional year. ROC years are already converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DateFields {
    pub year: Option<i32>,
    pub month: u32,
    pub day: u32,
}

fn group<T: FromStr>(caps: &Captures, name: &str) -> Option<T> {
    caps.name(name).and_then(|m| m.as_str().parse().ok())
}

impl DateFields {
    fn from_captures(caps: &Captures, roc_years: bool) -> Option<Self> {
        let (year, month, day): (Option<i32>, u32, u32) = if caps.name("cy").is_some() {
            (Some(group(caps, "cy")?), group(caps, "cm")?, group(caps, "cd")?)
        } else if caps.name("uy").is_some() {
            (Some(group(caps, "uy")?), group(caps, "um")?, group(caps, "ud")?)
        } else if caps.name("sy").is_some() {
            let first: i32 = group(caps, "sm")?;
            let second: u32 = group(caps, "sd")?;
            let third: i32 = group(caps, "sy")?;
            match u32::try_from(first) {
                Ok(month) if (1..=12).contains(&month) => {
                    (Some(expand_two_digit_year(third)), month, second)
                }
                _ => (Some(resolve_year(first, roc_years)), second, u32::try_from(third).ok()?),
            }
        } else if caps.name("y").is_some() {
            let year = resolve_year(group(caps, "y")?, roc_years);
            (Some(year), group(caps, "m")?, group(caps, "d")?)
        } else if caps.name("gm").is_some() {
            let year = group(caps, "gy").map(|y| resolve_year(y, roc_years));
            (year, group(caps, "gm")?, group(caps, "gd")?)
        } else {
            (None, group(caps, "om")?, group(caps, "od")?)
        };
        Some(DateFields { year, month, day })
    }

    pub fn resolve(self, reference_year: i32) -> Result<NaiveDate, InvalidDate> {
        build_date(self.year.unwrap_or(reference_year), self.month, self.day)
    }
}

/// Parse text that consists of exactly one date expression.
pub(crate) fn parse_exact(text: &str, roc_years: bool) -> Option<DateFields> {
    let normalized = normalize(text);
    let caps = RE_DATE_EXACT.captures(&normalized)?;
    DateFields::from_captures(&caps, roc_years)
}

fn is_digit(c: Option<char>) -> bool {
    c.is_some_and(|c| c.is_ascii_digit())
}

/// True when `text[start..end]` runs into a longer number: it starts with a
/// digit that follows another, ends with a digit that precedes another, or is
/// a dotted date inside a longer dotted run (`192.168.1.1`). A date ending in
/// `日` may be followed directly by a time (`23日14:00`).
pub(crate) fn digit_bounded(text: &str, start: usize, end: usize) -> bool {
    let inner = &text[start..end];
    let mut before = text[..start].chars().rev();
    let mut after = text[end..].chars();
    let (b1, b2) = (before.next(), before.next());
    let (a1, a2) = (after.next(), after.next());

    if inner.contains('.')
        && ((b1 == Some('.') && is_digit(b2)) || (a1 == Some('.') && is_digit(a2)))
    {
        return true;
    }
    (is_digit(inner.chars().next()) && is_digit(b1))
        || (is_digit(inner.chars().next_back()) && is_digit(a1))
}

// ── Mentions ───────────────────────────────────────────────────────

/// A calendar date found in text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateMention {
    pub date: NaiveDate,
    /// The text gave only month and day; `date` carries the reference year.
    pub year_omitted: bool,
    /// Character offset of the match in the source text.
    pub char_start: usize,
    /// Length of the match in characters.
    pub char_len: usize,
    /// The matched text, normalized.
    pub raw: String,
}

impl DateMention {
    /// Year-omitted mentions compare month and day only. This is looser than
    /// it looks: "10/23" equals 2025-10-23 and 1999-10-23 alike.
    pub fn matches(&self, target: NaiveDate) -> bool {
        if self.year_omitted {
            self.date.month() == target.month() && self.date.day() == target.day()
        } else {
            self.date == target
        }
    }
}

/// Find every date in `text`, in order of occurrence.
///
/// Matches that do not form a real date (month 13, April 31, Feb 29 in a
/// common year) are skipped; the scan never fails.
pub fn recognize_dates(text: &str, calendar: Calendar) -> Vec<DateMention> {
    let normalized = normalize(text);
    let mut mentions = Vec::new();

    for caps in RE_DATE.captures_iter(&normalized) {
        let Some(whole) = caps.get(0) else { continue };
        let raw = whole.as_str();

        if digit_bounded(&normalized, whole.start(), whole.end()) {
            trace!(raw, "skipping date inside a longer number");
            continue;
        }
        let Some(fields) = DateFields::from_captures(&caps, calendar.roc_years) else {
            continue;
        };

        match fields.resolve(calendar.reference_year) {
            Ok(date) => mentions.push(DateMention {
                date,
                year_omitted: fields.year.is_none(),
                char_start: normalized[..whole.start()].chars().count(),
                char_len: raw.chars().count(),
                raw: raw.to_string(),
            }),
            Err(err) => trace!(raw, %err, "dropping unparsable date"),
        }
    }

    mentions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn cal(year: i32) -> Calendar {
        Calendar {
            reference_year: year,
            roc_years: true,
        }
    }

    fn dates(text: &str) -> Vec<NaiveDate> {
        recognize_dates(text, cal(2025))
            .into_iter()
            .map(|m| m.date)
            .collect()
    }

    #[test]
    fn test_recognize_year_first_forms() {
        assert_eq!(dates("出貨 2025-10-23"), vec![ymd(2025, 10, 23)]);
        assert_eq!(dates("出貨 2025/1/5"), vec![ymd(2025, 1, 5)]);
        assert_eq!(dates("20251023"), vec![ymd(2025, 10, 23)]);
        assert_eq!(dates("10/23/2025"), vec![ymd(2025, 10, 23)]);
    }

    #[test]
    fn test_recognize_two_digit_year_month_first() {
        assert_eq!(dates("出貨 10/23/25"), vec![ymd(2025, 10, 23)]);
        assert_eq!(dates("12/31/99"), vec![ymd(1999, 12, 31)]);
        assert_eq!(dates("10-23-2025"), vec![ymd(2025, 10, 23)]);
        // First field is no month: a short ROC year.
        assert_eq!(dates("88/12/31"), vec![ymd(1999, 12, 31)]);
        let found = recognize_dates("10/23/25", cal(2019));
        assert!(!found[0].year_omitted);
    }

    #[test]
    fn test_recognize_dot_separators() {
        assert_eq!(dates("預定 2025.10.23 出貨"), vec![ymd(2025, 10, 23)]);
        assert_eq!(dates("114．10．23"), vec![ymd(2025, 10, 23)]);
        assert!(dates("圓周率 3.14，版本 1.2.3").is_empty());
        assert!(dates("伺服器 192.168.1.1").is_empty());
        assert_eq!(dates("2025.10.23."), vec![ymd(2025, 10, 23)]);
    }

    #[test]
    fn test_recognize_glyph_date_followed_by_time() {
        assert_eq!(dates("2025年10月23日14:00開會"), vec![ymd(2025, 10, 23)]);
        assert_eq!(dates("預計10月23日9點到貨"), vec![ymd(2025, 10, 23)]);
        assert!(!digit_bounded("23日9", 0, "23日".len()));
        assert!(digit_bounded("10/239", 0, 5));
        assert!(digit_bounded("110/23", 1, 6));
    }

    #[test]
    fn test_recognize_roc_years() {
        assert_eq!(dates("交期 114/10/23"), vec![ymd(2025, 10, 23)]);
        assert_eq!(dates("民國114年10月23日"), vec![ymd(2025, 10, 23)]);

        let literal = Calendar {
            reference_year: 2025,
            roc_years: false,
        };
        let found = recognize_dates("114/10/23", literal);
        assert_eq!(found[0].date, ymd(114, 10, 23));
    }

    #[test]
    fn test_recognize_glyph_forms() {
        assert_eq!(dates("2025年10月23日開會"), vec![ymd(2025, 10, 23)]);
        assert_eq!(dates("預計 10月23日 到貨"), vec![ymd(2025, 10, 23)]);
        assert_eq!(dates("10 月 23 號"), vec![ymd(2025, 10, 23)]);
    }

    #[test]
    fn test_recognize_normalizes_first() {
        assert_eq!(dates("2025／10／23"), vec![ymd(2025, 10, 23)]);
        assert_eq!(dates("2025_10_23"), vec![ymd(2025, 10, 23)]);
        assert_eq!(dates("2025－10－23"), vec![ymd(2025, 10, 23)]);
    }

    #[test]
    fn test_recognize_year_omitted_uses_reference_year() {
        let found = recognize_dates("約 10/23 前", cal(2019));
        assert_eq!(found.len(), 1);
        assert!(found[0].year_omitted);
        assert_eq!(found[0].date, ymd(2019, 10, 23));
    }

    #[test]
    fn test_recognize_drops_invalid_dates_and_continues() {
        assert_eq!(dates("2025/13/01 與 2025/02/29 與 2025/03/01"), vec![ymd(2025, 3, 1)]);
        assert_eq!(dates("4/31"), vec![]);
    }

    #[test]
    fn test_recognize_leap_day_depends_on_reference_year() {
        assert_eq!(recognize_dates("2/29", cal(2024)).len(), 1);
        assert!(recognize_dates("2/29", cal(2025)).is_empty());
    }

    #[test]
    fn test_recognize_order_of_occurrence() {
        assert_eq!(
            dates("先 2025/12/01，後 10月5日，再 20240101"),
            vec![ymd(2025, 12, 1), ymd(2025, 10, 5), ymd(2024, 1, 1)]
        );
    }

    #[test]
    fn test_recognize_skips_longer_numbers() {
        assert!(dates("單號 12025/10/23").is_empty());
        assert!(dates("電話 0912345678").is_empty());
    }

    #[test]
    fn test_recognize_no_dates() {
        assert!(dates("本週無出貨").is_empty());
        assert!(dates("").is_empty());
    }

    #[test]
    fn test_recognize_char_offsets() {
        let found = recognize_dates("出貨日期：2025／10／23", cal(2025));
        assert_eq!(found[0].char_start, 5);
        assert_eq!(found[0].char_len, 10);
        assert_eq!(found[0].raw, "2025/10/23");
    }

    #[test]
    fn test_mention_equality_policy() {
        let omitted = &recognize_dates("10/23", cal(2025))[0];
        assert!(omitted.matches(ymd(2025, 10, 23)));
        assert!(omitted.matches(ymd(1999, 10, 23)));
        assert!(!omitted.matches(ymd(2025, 10, 24)));

        let full = &recognize_dates("2024/10/23", cal(2025))[0];
        assert!(full.matches(ymd(2024, 10, 23)));
        assert!(!full.matches(ymd(2025, 10, 23)));
    }

    #[test]
    fn test_build_date_reasons() {
        assert_eq!(build_date(2025, 10, 23), Ok(ymd(2025, 10, 23)));
        assert_eq!(
            build_date(2025, 13, 1),
            Err(InvalidDate::MonthOutOfRange { month: 13 })
        );
        assert_eq!(
            build_date(2025, 2, 30),
            Err(InvalidDate::DayOutOfRange {
                year: 2025,
                month: 2,
                day: 30
            })
        );
    }

    #[test]
    fn test_parse_exact() {
        let fields = parse_exact(" 2025-02-28 ", true).unwrap();
        assert_eq!(fields.year, Some(2025));
        assert_eq!(parse_exact("10/23", true).unwrap().year, None);
        assert!(parse_exact("2025-10-23 morning", true).is_none());
        assert!(parse_exact("tomorrow", true).is_none());
        assert_eq!(parse_exact("2025.10.23", true).unwrap().year, Some(2025));
    }
}
