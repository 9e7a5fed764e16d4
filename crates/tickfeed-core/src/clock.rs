//! Wall-clock formatting for the time feed.
//!
//! Frames carry local time as `HH:MM:SS.fffff`: five fractional digits,
//! truncated rather than rounded.

use chrono::{DateTime, Local, TimeZone, Timelike};
use std::fmt::Display;

/// Nanoseconds per unit of the fifth fractional digit.
const NANOS_PER_TICK_DIGIT: u32 = 10_000;

/// Format a timestamp as `HH:MM:SS.fffff`.
pub fn format_timestamp<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    // chrono reports leap seconds as nanosecond values >= 1_000_000_000
    let nanos = at.nanosecond() % 1_000_000_000;
    format!(
        "{}.{:05}",
        at.format("%H:%M:%S"),
        nanos / NANOS_PER_TICK_DIGIT
    )
}

/// The current local time, formatted for a feed frame.
pub fn now_stamp() -> String {
    format_timestamp(&Local::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use regex::Regex;

    fn utc(h: u32, m: u32, s: u32, nanos: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_nano_opt(h, m, s, nanos)
            .unwrap()
            .and_utc()
    }

    #[test]
    fn test_formats_half_second() {
        assert_eq!(format_timestamp(&utc(14, 3, 21, 500_000_000)), "14:03:21.50000");
    }

    #[test]
    fn test_pads_small_fractions() {
        assert_eq!(format_timestamp(&utc(0, 0, 0, 0)), "00:00:00.00000");
        assert_eq!(format_timestamp(&utc(1, 2, 3, 10_000)), "01:02:03.00001");
    }

    #[test]
    fn test_truncates_instead_of_rounding() {
        assert_eq!(format_timestamp(&utc(23, 59, 59, 999_999_999)), "23:59:59.99999");
    }

    #[test]
    fn test_leap_second_keeps_five_digits() {
        let leap = NaiveDate::from_ymd_opt(2016, 12, 31)
            .unwrap()
            .and_hms_nano_opt(23, 59, 59, 1_250_000_000)
            .unwrap()
            .and_utc();
        assert_eq!(format_timestamp(&leap), "23:59:60.25000");
    }

    #[test]
    fn test_now_stamp_matches_frame_pattern() {
        let pattern = Regex::new(r"^\d{2}:\d{2}:\d{2}\.\d{5}$").unwrap();
        let stamp = now_stamp();
        assert!(pattern.is_match(&stamp), "unexpected stamp {stamp}");
    }
}
