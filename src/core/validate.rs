//! Input shape checks shared by the REST handlers and the chat flows.

use chrono::{NaiveDate, NaiveTime};

/// `YYYY-MM-DD`; calendar-invalid dates are rejected along with malformed
/// ones.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").ok()
}

/// 24-hour `HH:MM`.
pub fn parse_time(input: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(input.trim(), "%H:%M").ok()
}

pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

pub fn is_valid_phone(phone: &str) -> bool {
    phone.len() == 10 && phone.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ada@nodot"));
        assert!(!is_valid_email("ada@.com"));
        assert!(!is_valid_email("ada bell@example.com"));
    }

    #[test]
    fn phone_must_be_ten_digits() {
        assert!(is_valid_phone("0123456789"));
        assert!(!is_valid_phone("123456789"));
        assert!(!is_valid_phone("01234567890"));
        assert!(!is_valid_phone("01234abc89"));
    }

    #[test]
    fn date_parsing_requires_iso_shape() {
        assert_eq!(
            parse_date("2025-03-10"),
            NaiveDate::from_ymd_opt(2025, 3, 10)
        );
        assert!(parse_date("10-03-2025").is_none());
        assert!(parse_date("2025-13-01").is_none());
        assert!(parse_date("2025-02-30").is_none());
        assert!(parse_date("soon").is_none());
    }

    #[test]
    fn time_parsing_requires_24_hour_shape() {
        assert_eq!(parse_time("09:15"), NaiveTime::from_hms_opt(9, 15, 0));
        assert_eq!(parse_time("23:59"), NaiveTime::from_hms_opt(23, 59, 0));
        assert!(parse_time("25:00").is_none());
        assert!(parse_time("9pm").is_none());
    }
}
