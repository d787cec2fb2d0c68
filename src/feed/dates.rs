use chrono::{DateTime, NaiveDateTime, Utc};
use feed_rs::model::Entry;

/// Fixed-width, sortable form used for all stored `published` values.
/// Interpreted as UTC by convention.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Canonical timestamp for a feed entry, preferring `published` over
/// `updated`. Returns an empty string when neither is present; a missing
/// date never blocks ingestion.
pub fn normalize_entry_date(entry: &Entry) -> String {
    entry
        .published
        .or(entry.updated)
        .map(|dt| dt.with_timezone(&Utc).format(CANONICAL_FORMAT).to_string())
        .unwrap_or_default()
}

/// Best-effort parse of a raw date string: RFC 3339, then RFC 2822, then
/// the canonical format itself (so normalization is idempotent).
pub fn parse_date_str(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, CANONICAL_FORMAT) {
        return Some(naive.and_utc());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonicalize(raw: &str) -> String {
        parse_date_str(raw)
            .map(|dt| dt.format(CANONICAL_FORMAT).to_string())
            .unwrap_or_default()
    }

    #[test]
    fn rfc2822_is_canonicalized() {
        assert_eq!(
            canonicalize("Mon, 01 Jan 2024 12:00:00 GMT"),
            "2024-01-01 12:00:00"
        );
    }

    #[test]
    fn rfc3339_is_canonicalized_to_utc() {
        assert_eq!(
            canonicalize("2024-01-01T14:00:00+02:00"),
            "2024-01-01 12:00:00"
        );
    }

    #[test]
    fn canonical_form_parses_to_itself() {
        let canonical = "2024-01-01 12:00:00";
        assert_eq!(canonicalize(canonical), canonical);
        assert_eq!(canonicalize(&canonicalize("Mon, 01 Jan 2024 12:00:00 GMT")), canonical);
    }

    #[test]
    fn unparseable_input_yields_none() {
        assert_eq!(parse_date_str("next Tuesday-ish"), None);
        assert_eq!(parse_date_str(""), None);
        assert_eq!(parse_date_str("   "), None);
    }
}
