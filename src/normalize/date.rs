use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b((?:19|20)\d{2})\b").unwrap());

/// Parse a record date for ordering. Accepts `YYYY-MM-DD`, `YYYY-MM`, `YYYY` and RFC 3339
/// timestamps.
pub fn parse(raw: &str) -> Option<NaiveDate> {
    let t = raw.trim();
    if t.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(t, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(t) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    if let Some((y, m)) = t.split_once('-')
        && y.len() == 4
        && m.len() <= 2
    {
        return NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, 1);
    }
    if t.len() == 4 && t.chars().all(|c| c.is_ascii_digit()) {
        return NaiveDate::from_ymd_opt(t.parse().ok()?, 1, 1);
    }
    None
}

/// Ordering key; missing or unparsable dates sort as the epoch (`NaiveDate::default()`).
pub fn sort_key(raw: Option<&str>) -> NaiveDate {
    raw.and_then(parse).unwrap_or_default()
}

/// `display_date` verbatim, else the year of `date`, else empty.
pub fn badge(display_date: Option<&str>, date: Option<&str>) -> String {
    if let Some(d) = display_date.map(str::trim).filter(|s| !s.is_empty()) {
        return d.to_string();
    }
    date.and_then(year_of).unwrap_or_default()
}

/// Last two digits of the year, from `display_date` first, then `date`.
pub fn short_year(display_date: Option<&str>, date: Option<&str>) -> Option<String> {
    display_date
        .and_then(year_of)
        .or_else(|| date.and_then(year_of))
        .map(|y| y[2..].to_string())
}

fn year_of(raw: &str) -> Option<String> {
    if let Some(d) = parse(raw) {
        return Some(format!("{:04}", chrono::Datelike::year(&d)));
    }
    YEAR_RE.captures(raw).map(|c| c[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_variants() {
        assert_eq!(parse("2023-01-05"), NaiveDate::from_ymd_opt(2023, 1, 5));
        assert_eq!(parse("2023-04"), NaiveDate::from_ymd_opt(2023, 4, 1));
        assert_eq!(parse("2021"), NaiveDate::from_ymd_opt(2021, 1, 1));
        assert_eq!(
            parse("2022-03-01T10:00:00Z"),
            NaiveDate::from_ymd_opt(2022, 3, 1)
        );
        assert_eq!(parse("sometime"), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn unparsable_sorts_as_epoch() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(sort_key(None), epoch);
        assert_eq!(sort_key(Some("soon")), epoch);
    }

    #[test]
    fn badge_precedence() {
        assert_eq!(badge(Some("Spring 2024"), Some("2023-01-01")), "Spring 2024");
        assert_eq!(badge(None, Some("2023-01-01")), "2023");
        assert_eq!(badge(Some("  "), None), "");
    }

    #[test]
    fn short_year_prefers_display_date() {
        assert_eq!(short_year(Some("Dec 2024"), Some("2023-01-01")).as_deref(), Some("24"));
        assert_eq!(short_year(None, Some("2023-01-01")).as_deref(), Some("23"));
        assert_eq!(short_year(Some("Forthcoming"), None), None);
    }
}
