//! Event year extraction.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

/// Year of a date string, trying each `strftime` format in turn.
///
/// Each format is tried as a plain date first and then as a date-time, so
/// `%Y-%m-%d %H:%M:%S` and `%Y-%m-%d` can share one list. Returns `None` when
/// nothing matches.
pub fn parse_year(value: &str, formats: &[String]) -> Option<i32> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    formats.iter().find_map(|format| {
        NaiveDate::parse_from_str(value, format)
            .map(|d| d.year())
            .or_else(|_| NaiveDateTime::parse_from_str(value, format).map(|dt| dt.year()))
            .ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_DATE_FORMATS;

    fn formats() -> Vec<String> {
        DEFAULT_DATE_FORMATS.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_iso_date() {
        assert_eq!(parse_year("1982-10-24", &formats()), Some(1982));
    }

    #[test]
    fn test_datetime() {
        assert_eq!(parse_year("2001-07-04 13:45:00", &formats()), Some(2001));
    }

    #[test]
    fn test_us_date() {
        assert_eq!(parse_year("10/24/1982", &formats()), Some(1982));
    }

    #[test]
    fn test_surrounding_whitespace() {
        assert_eq!(parse_year("  1999-01-02 ", &formats()), Some(1999));
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(parse_year("not a date", &formats()), None);
        assert_eq!(parse_year("1982-13-45", &formats()), None);
        assert_eq!(parse_year("", &formats()), None);
    }

    #[test]
    fn test_custom_formats_only() {
        let formats = vec!["%d.%m.%Y".to_string()];
        assert_eq!(parse_year("24.10.1982", &formats), Some(1982));
        assert_eq!(parse_year("1982-10-24", &formats), None);
    }
}
