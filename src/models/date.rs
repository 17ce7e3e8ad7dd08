//! Calendar-day and clock parsing shared by the stores and the CLI.
//!
//! Days travel as `YYYY-MM-DD` strings at the service boundary and as
//! `time::Date` inside the core. The zero-padded text form sorts
//! lexicographically in chronological order, which the `day` columns rely
//! on for range scans.

use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, Time};

use crate::error::TagError;

const DAY_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
const CLOCK_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]");

/// Parses a `YYYY-MM-DD` calendar day.
///
/// # Examples
///
/// ```
/// use gutlog::models::date;
///
/// assert!(date::parse_day("2025-10-25").is_ok());
/// assert!(date::parse_day("2025-13-01").is_err());
/// assert!(date::parse_day("25/10/2025").is_err());
/// ```
pub fn parse_day(text: &str) -> Result<Date, TagError> {
    Date::parse(text, DAY_FORMAT).map_err(|_| TagError::InvalidDate(text.to_string()))
}

/// Formats a day in the canonical `YYYY-MM-DD` form.
pub fn format_day(day: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        day.year(),
        u8::from(day.month()),
        day.day()
    )
}

/// Parses an `HH:MM` 24-hour clock time.
pub fn parse_clock(text: &str) -> Result<Time, TagError> {
    Time::parse(text, CLOCK_FORMAT).map_err(|_| TagError::InvalidEntry {
        reasons: vec![format!("invalid time '{text}': expected HH:MM")],
    })
}

/// Formats a clock time in the canonical `HH:MM` form.
pub fn format_clock(clock: Time) -> String {
    format!("{:02}:{:02}", clock.hour(), clock.minute())
}

/// Serde adapter serializing a `time::Date` as a `YYYY-MM-DD` string.
pub mod serde_day {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S: Serializer>(day: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_day(*day))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_day(&text).map_err(D::Error::custom)
    }
}

/// Serde adapter serializing a `time::Time` as an `HH:MM` string.
pub mod serde_clock {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Time;

    pub fn serialize<S: Serializer>(clock: &Time, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_clock(*clock))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Time, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_clock(&text).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_format_round_trip() {
        let day = parse_day("2025-10-25").unwrap();
        assert_eq!(format_day(day), "2025-10-25");

        let clock = parse_clock("08:30").unwrap();
        assert_eq!(format_clock(clock), "08:30");
    }

    #[test]
    fn single_digit_components_are_zero_padded() {
        let day = Date::from_calendar_date(2025, time::Month::March, 7).unwrap();
        assert_eq!(format_day(day), "2025-03-07");
    }

    #[test]
    fn rejects_malformed_days() {
        assert!(parse_day("").is_err());
        assert!(parse_day("2025-10").is_err());
        assert!(parse_day("2025-02-30").is_err());
        assert!(parse_day("2025-10-25T00:00").is_err());
        assert!(parse_day("tomorrow").is_err());
    }

    #[test]
    fn rejects_malformed_clocks() {
        assert!(parse_clock("25:00").is_err());
        assert!(parse_clock("8am").is_err());
    }

    #[test]
    fn formatted_days_sort_chronologically() {
        let mut keys = vec![
            format_day(parse_day("2025-10-02").unwrap()),
            format_day(parse_day("2025-02-10").unwrap()),
            format_day(parse_day("2024-12-31").unwrap()),
        ];
        keys.sort();
        assert_eq!(keys, vec!["2024-12-31", "2025-02-10", "2025-10-02"]);
    }
}
