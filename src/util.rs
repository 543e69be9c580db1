use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate, Utc};
use regex::Regex;

/// Placeholder the AI is told to use for string fields it could not find.
pub const NOT_AVAILABLE: &str = "N/A";

fn re_whitespace_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex should compile"))
}

fn re_non_word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_-]+").expect("non-word regex should compile"))
}

/// Derive a record id from a company display name.
///
/// Lowercases, turns whitespace runs into `-`, and strips everything that is
/// not an ASCII word character or hyphen.
///
/// Example: "Acme Inc." → "acme-inc"
///
/// Two names differing only in case or punctuation map to the same id; the
/// store treats that as the same record.
pub fn company_to_id(name: &str) -> String {
    let lowered = name.to_lowercase();
    let hyphenated = re_whitespace_run().replace_all(&lowered, "-");
    re_non_word().replace_all(&hyphenated, "").into_owned()
}

/// Rolling fiscal-year label for the year containing `today`.
///
/// Example: 2026-10-19 → "2026-27"
pub fn fiscal_year_label(today: NaiveDate) -> String {
    let year = today.year();
    let next = (year + 1).to_string();
    let suffix = &next[next.len().saturating_sub(2)..];
    format!("{}-{}", year, suffix)
}

/// Today's date (UTC), as used for `dataRetrievalDate` and prompt dating.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Current instant as an RFC 3339 string (`lastFetched`).
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

/// True when a string field carries no information: absent, blank, or "N/A".
pub fn is_empty_sentinel(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(v) => {
            let v = v.trim();
            v.is_empty() || v.eq_ignore_ascii_case(NOT_AVAILABLE)
        }
    }
}

/// Split newline-separated batch input into trimmed, non-empty company names.
pub fn parse_batch_names(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_to_id_basic() {
        assert_eq!(company_to_id("Acme Inc"), "acme-inc");
    }

    #[test]
    fn test_company_to_id_strips_punctuation() {
        assert_eq!(company_to_id("Tata Consultancy Services Ltd."), "tata-consultancy-services-ltd");
        assert_eq!(company_to_id("AT&T"), "att");
    }

    #[test]
    fn test_company_to_id_collapses_whitespace() {
        assert_eq!(company_to_id("  Big \t  Co  "), "-big-co-");
    }

    #[test]
    fn test_company_to_id_keeps_underscores_and_hyphens() {
        assert_eq!(company_to_id("Bring-a-Trailer_2"), "bring-a-trailer_2");
    }

    #[test]
    fn test_company_to_id_idempotent() {
        for name in ["Acme Inc", "Tata Consultancy Services / TCS", "Reliance Industries (RIL)", "ÉCOLE Co"] {
            let once = company_to_id(name);
            assert_eq!(company_to_id(&once), once, "not idempotent for {:?}", name);
        }
    }

    #[test]
    fn test_company_to_id_collision_is_silent() {
        assert_eq!(company_to_id("Acme, Inc"), company_to_id("ACME Inc"));
    }

    #[test]
    fn test_fiscal_year_label() {
        let d = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(fiscal_year_label(d), "2026-27");
        let d = NaiveDate::from_ymd_opt(2099, 1, 1).unwrap();
        assert_eq!(fiscal_year_label(d), "2099-00");
    }

    #[test]
    fn test_is_empty_sentinel() {
        assert!(is_empty_sentinel(None));
        assert!(is_empty_sentinel(Some("")));
        assert!(is_empty_sentinel(Some("  n/a ")));
        assert!(!is_empty_sentinel(Some("U12345MH2000PLC000001")));
    }

    #[test]
    fn test_parse_batch_names() {
        let names = parse_batch_names("Acme Inc\n\n  Globex \r\n   \nInitech");
        assert_eq!(names, vec!["Acme Inc", "Globex", "Initech"]);
    }
}
