//! Fixed textual renderings of a target date, in search priority order.

use chrono::{Datelike, NaiveDate};

use crate::normalize::roc_year;
use crate::recognize::digit_bounded;

/// One way of writing a date. Variants are declared in priority order:
/// year-bearing forms first, then month/day-only forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateForm {
    /// 2025-10-23
    IsoDash,
    /// 2025/10/23
    IsoSlash,
    /// 2025年10月23日
    ChineseLong,
    /// 20251023
    Compact,
    /// 114/10/23
    Roc,
    /// 10/23/2025
    MonthDayYear,
    /// 10月23日
    ChineseShort,
    /// 03/05
    MonthDayPadded,
    /// 3/5
    MonthDay,
}

impl CandidateForm {
    pub fn has_year(self) -> bool {
        !matches!(
            self,
            CandidateForm::ChineseShort | CandidateForm::MonthDayPadded | CandidateForm::MonthDay
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub form: CandidateForm,
    pub text: String,
}

/// All renderings of `date`, most specific first. Identical renderings
/// (`10/23` as both padded and unpadded month/day) appear once.
pub fn date_candidates(date: NaiveDate, roc_years: bool) -> Vec<Candidate> {
    use CandidateForm::*;

    let (y, m, d) = (date.year(), date.month(), date.day());
    let mut forms = vec![
        (IsoDash, date.format("%Y-%m-%d").to_string()),
        (IsoSlash, date.format("%Y/%m/%d").to_string()),
        (ChineseLong, format!("{y}年{m}月{d}日")),
        (Compact, date.format("%Y%m%d").to_string()),
    ];
    if roc_years && let Some(roc) = roc_year(y) {
        forms.push((Roc, format!("{roc}/{m}/{d}")));
    }
    forms.push((MonthDayYear, format!("{m}/{d}/{y}")));
    forms.push((ChineseShort, format!("{m}月{d}日")));
    forms.push((MonthDayPadded, format!("{m:02}/{d:02}")));
    forms.push((MonthDay, format!("{m}/{d}")));
    forms.dedup_by(|later, earlier| later.1 == earlier.1);

    forms
        .into_iter()
        .map(|(form, text)| Candidate { form, text })
        .collect()
}

impl Candidate {
    /// Byte offset of the first standalone occurrence in `haystack`.
    ///
    /// Standalone: not part of a longer digit run, and for month/day forms,
    /// not the tail or head of a date that carries a year ("2024/10/23",
    /// "2024年10月23日", "10/23/2024").
    pub fn find_in(&self, haystack: &str) -> Option<usize> {
        haystack
            .match_indices(self.text.as_str())
            .map(|(start, _)| start)
            .find(|&start| self.standalone(haystack, start, start + self.text.len()))
    }

    fn standalone(&self, haystack: &str, start: usize, end: usize) -> bool {
        if digit_bounded(haystack, start, end) {
            return false;
        }
        if self.form.has_year() {
            return true;
        }
        !follows_year(&haystack[..start]) && !precedes_year(&haystack[end..])
    }
}

/// `before` ends with a year and its separator: "2024/", "2024-", "114年 ".
fn follows_year(before: &str) -> bool {
    let before = before.trim_end();
    let Some(last) = before.chars().next_back() else {
        return false;
    };
    let rest = &before[..before.len() - last.len_utf8()];
    matches!(last, '/' | '-' | '.' | '年')
        && rest
            .trim_end()
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_digit())
}

/// `after` starts with a separator and another number: "/2024".
fn precedes_year(after: &str) -> bool {
    let mut chars = after.chars();
    matches!(chars.next(), Some('/' | '-')) && chars.next().is_some_and(|c| c.is_ascii_digit())
}

/// The first candidate, in priority order, with a standalone occurrence in
/// `haystack`, and the byte offset of that occurrence.
pub fn locate<'c>(haystack: &str, candidates: &'c [Candidate]) -> Option<(&'c Candidate, usize)> {
    candidates
        .iter()
        .find_map(|c| c.find_in(haystack).map(|offset| (c, offset)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::recognize::{Calendar, recognize_dates};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn texts(date: NaiveDate, roc: bool) -> Vec<String> {
        date_candidates(date, roc).into_iter().map(|c| c.text).collect()
    }

    #[test]
    fn test_candidates_priority_order() {
        assert_eq!(
            texts(ymd(2025, 10, 23), true),
            vec![
                "2025-10-23",
                "2025/10/23",
                "2025年10月23日",
                "20251023",
                "114/10/23",
                "10/23/2025",
                "10月23日",
                "10/23",
            ]
        );
    }

    #[test]
    fn test_candidates_unpadded_forms() {
        let list = texts(ymd(2025, 3, 5), true);
        assert!(list.contains(&"2025-03-05".to_string()));
        assert!(list.contains(&"2025年3月5日".to_string()));
        assert!(list.contains(&"114/3/5".to_string()));
        assert!(list.contains(&"3月5日".to_string()));
        assert!(list.ends_with(&["03/05".to_string(), "3/5".to_string()]));
    }

    #[test]
    fn test_candidates_roc_only_when_enabled_and_in_range() {
        assert!(!texts(ymd(2025, 10, 23), false).contains(&"114/10/23".to_string()));
        let far = date_candidates(ymd(2200, 1, 1), true);
        assert!(far.iter().all(|c| c.form != CandidateForm::Roc));
    }

    #[test]
    fn test_every_candidate_is_recognizable() {
        for date in [
            ymd(2025, 10, 23),
            ymd(2025, 3, 5),
            ymd(2024, 2, 29),
            ymd(1999, 12, 31),
            ymd(2030, 1, 1),
        ] {
            for candidate in date_candidates(date, true) {
                let normalized = normalize(&candidate.text);
                let found = recognize_dates(&normalized, Calendar::around(date, true));
                assert!(
                    found.iter().any(|m| m.matches(date)),
                    "{} not recognized as {date}",
                    candidate.text
                );
            }
        }
    }

    fn candidate(form: CandidateForm, text: &str) -> Candidate {
        Candidate {
            form,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_find_in_standalone() {
        let short = candidate(CandidateForm::ChineseShort, "10月23日");
        assert_eq!(short.find_in("預計 10月23日 到貨"), Some(7));
        assert_eq!(short.find_in("2024年10月23日"), None);
        assert_eq!(short.find_in("114 年 10月23日"), None);
        assert_eq!(short.find_in("去年10月23日"), Some(6));

        let md = candidate(CandidateForm::MonthDayPadded, "10/23");
        assert_eq!(md.find_in("2024/10/23"), None);
        assert_eq!(md.find_in("10/23/2024"), None);
        assert_eq!(md.find_in("約 10/23 前"), Some(4));
        assert_eq!(md.find_in("2024/10/23 或 10/23"), Some(15));
    }

    #[test]
    fn test_find_in_rejects_digit_neighbors() {
        let md = candidate(CandidateForm::MonthDay, "10/2");
        assert_eq!(md.find_in("10/23"), None);

        let iso = candidate(CandidateForm::IsoDash, "2025-10-23");
        assert_eq!(iso.find_in("12025-10-23"), None);
        assert_eq!(iso.find_in("於2025-10-23出貨"), Some(3));

        let long = candidate(CandidateForm::ChineseLong, "2025年10月23日");
        assert_eq!(long.find_in("2025年10月23日14:00"), Some(0));
        assert_eq!(long.find_in("12025年10月23日"), None);
    }

    #[test]
    fn test_locate_uses_priority_not_position() {
        let list = date_candidates(ymd(2025, 10, 23), true);
        let text = "10月23日 或 2025/10/23";
        let (found, offset) = locate(text, &list).unwrap();
        assert_eq!(found.form, CandidateForm::IsoSlash);
        assert_eq!(&text[offset..offset + found.text.len()], "2025/10/23");
    }
}
