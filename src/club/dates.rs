use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};

/// Alle Datumsangaben der App sind KST (UTC+9), unabhängig von der
/// Zeitzone des Servers.
const KST_OFFSET_SECS: i32 = 9 * 3600;

fn kst_offset() -> FixedOffset {
    FixedOffset::east_opt(KST_OFFSET_SECS).expect("valid KST offset")
}

/// Aktuelle Zeit in KST
pub fn kst_now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&kst_offset())
}

/// Aktuelles Datum in KST als YYYY-MM-DD
pub fn kst_date_string() -> String {
    kst_now().format("%Y-%m-%d").to_string()
}

/// Aktuelle Zeit in KST als ISO 8601 String
pub fn kst_iso_string() -> String {
    kst_now().to_rfc3339()
}

/// Aktueller Monat in KST als YYYY-MM Prefix
pub fn kst_month_prefix() -> String {
    kst_now().format("%Y-%m").to_string()
}

/// Parse YYYY-MM-DD, None bei ungültigem Format
pub fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Liegt das Datum innerhalb der letzten `days` Tage (KST, heute inklusive)?
pub fn within_last_days(date: &str, days: i64) -> bool {
    let Some(date) = parse_date(date) else {
        return false;
    };
    let today = kst_now().date_naive();
    let cutoff = today - Duration::days(days);
    date >= cutoff && date <= today
}

/// Gehört das Datum zum aktuellen KST-Monat?
pub fn is_current_month(date: &str) -> bool {
    date.starts_with(&kst_month_prefix())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kst_date_has_expected_shape() {
        let date = kst_date_string();
        assert_eq!(date.len(), 10);
        assert!(parse_date(&date).is_some());
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_date("2025-13-40").is_none());
        assert!(parse_date("yesterday").is_none());
        assert!(parse_date("2025-03-15").is_some());
    }

    #[test]
    fn today_is_within_last_seven_days() {
        assert!(within_last_days(&kst_date_string(), 7));
    }

    #[test]
    fn old_date_is_not_recent() {
        assert!(!within_last_days("2001-01-01", 30));
    }

    #[test]
    fn current_month_matches_today() {
        assert!(is_current_month(&kst_date_string()));
        assert!(!is_current_month("1999-12-31"));
    }
}
