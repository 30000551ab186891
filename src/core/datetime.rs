//! HL7 timestamp parsing
//!
//! Dispatches purely on input length to a fixed set of patterns, from bare
//! year down to a full timestamp with fractional seconds. The length gate
//! is syntactic and runs before any calendar validation: a length with no
//! registered pattern is rejected outright. Within a matched pattern,
//! chrono's checked constructors enforce calendar and time-of-day bounds.
//!
//! The lenient [`parse_datetime`] is the primary API: it absorbs failures
//! into `None` and additionally recognizes a trailing signed offset on the
//! full-precision pattern. [`parse_datetime_strict`] surfaces the typed
//! error instead.

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::{Hl7Error, Hl7Result};

/// Registered pattern lengths: yyyy, yyyyMM, yyyyMMdd, yyyyMMddHH,
/// yyyyMMddHHmm, yyyyMMddHHmmss, yyyyMMddHHmmss.f, yyyyMMddHHmmss.ffff.
const SUPPORTED_LENGTHS: [usize; 8] = [4, 6, 8, 10, 12, 14, 16, 19];

/// Best-effort parse of a trimmed HL7 timestamp.
///
/// Recognizes a trailing 4-digit signed timezone offset (`+1358`) on the
/// full-precision pattern and returns it separately from the instant.
/// Returns `None` on any failure instead of raising.
pub fn parse_datetime(input: &str) -> Option<(NaiveDateTime, Option<FixedOffset>)> {
    let trimmed = input.trim();
    let (body, offset) = match split_offset(trimmed) {
        Some((body, suffix)) => {
            // Offset suffix is only defined for the full-precision pattern
            if body.len() != 19 {
                return None;
            }
            (body, Some(parse_offset(suffix)?))
        }
        None => (trimmed, None),
    };
    parse_parts(body).ok().map(|dt| (dt, offset))
}

/// Strict variant used internally: raises on any failure, no offset
/// suffix support.
pub fn parse_datetime_strict(input: &str) -> Hl7Result<NaiveDateTime> {
    parse_parts(input.trim())
}

/// Render a timestamp with fractional-second precision
/// (`yyyyMMddHHmmss.FFFF`); trailing fraction zeros and a bare trailing
/// dot are trimmed.
pub fn long_date_with_fraction(dt: &NaiveDateTime) -> String {
    let mut out = dt.format("%Y%m%d%H%M%S").to_string();
    let ten_thousandths = dt.nanosecond() / 100_000;
    if ten_thousandths > 0 {
        let mut digits = format!("{:04}", ten_thousandths);
        while digits.ends_with('0') {
            digits.pop();
        }
        out.push('.');
        out.push_str(&digits);
    }
    out
}

fn parse_parts(s: &str) -> Hl7Result<NaiveDateTime> {
    if !SUPPORTED_LENGTHS.contains(&s.len()) {
        return Err(Hl7Error::UnsupportedPattern(format!(
            "no pattern registered for length {}",
            s.len()
        )));
    }
    let year = num(s, 0..4)?;
    let month = if s.len() >= 6 { num(s, 4..6)? } else { 1 };
    let day = if s.len() >= 8 { num(s, 6..8)? } else { 1 };
    let hour = if s.len() >= 10 { num(s, 8..10)? } else { 0 };
    let minute = if s.len() >= 12 { num(s, 10..12)? } else { 0 };
    let second = if s.len() >= 14 { num(s, 12..14)? } else { 0 };
    let nanos = if s.len() > 14 {
        if s.as_bytes()[14] != b'.' {
            return Err(Hl7Error::Format(format!(
                "expected fractional seconds after position 14 in {:?}",
                s
            )));
        }
        let digits = &s[15..];
        let fraction = num(s, 15..s.len())?;
        fraction * 10u32.pow(9 - digits.len() as u32)
    } else {
        0
    };

    let date = NaiveDate::from_ymd_opt(year as i32, month, day)
        .ok_or_else(|| Hl7Error::Format(format!("invalid calendar date in {:?}", s)))?;
    let time = NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)
        .ok_or_else(|| Hl7Error::Format(format!("invalid time of day in {:?}", s)))?;
    Ok(NaiveDateTime::new(date, time))
}

fn num(s: &str, range: std::ops::Range<usize>) -> Hl7Result<u32> {
    let part = &s[range];
    if part.bytes().all(|b| b.is_ascii_digit()) {
        part.parse()
            .map_err(|_| Hl7Error::Format(format!("bad numeric group {:?} in {:?}", part, s)))
    } else {
        Err(Hl7Error::Format(format!(
            "non-digit in group {:?} of {:?}",
            part, s
        )))
    }
}

/// Detach a trailing `[+|-]HHMM` suffix, if present.
fn split_offset(s: &str) -> Option<(&str, &str)> {
    if s.len() < 5 {
        return None;
    }
    let bytes = s.as_bytes();
    let at = s.len() - 5;
    if matches!(bytes[at], b'+' | b'-') && bytes[at + 1..].iter().all(|b| b.is_ascii_digit()) {
        Some((&s[..at], &s[at..]))
    } else {
        None
    }
}

fn parse_offset(suffix: &str) -> Option<FixedOffset> {
    let hours: i32 = suffix[1..3].parse().ok()?;
    let minutes: i32 = suffix[3..5].parse().ok()?;
    // Offset hours above 19 are outside the accepted range
    if hours > 19 || minutes > 59 {
        return None;
    }
    let seconds = hours * 3600 + minutes * 60;
    let signed = if suffix.starts_with('-') { -seconds } else { seconds };
    FixedOffset::east_opt(signed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_lengths_parse() {
        for input in [
            "2015",
            "201512",
            "20151231",
            "2015123123",
            "201512312345",
            "20151231234500",
            "20151231234500.1",
            "20151231234500.1234",
        ] {
            assert!(parse_datetime(input).is_some(), "failed on {input:?}");
        }
    }

    #[test]
    fn test_unsupported_lengths_fail() {
        for input in [
            "201",
            "20151",
            "2015123",
            "201512312",
            "20151231234",
            "2015123123450",
            "20151231234500.",
            "20151231234500.12",
            "20151231234500.12345",
        ] {
            assert!(parse_datetime(input).is_none(), "accepted {input:?}");
        }
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        assert!(parse_datetime("   20151231234500.1234+1358   ").is_some());
    }

    #[test]
    fn test_offset_bounds() {
        assert!(parse_datetime("20151231234500.1234+1358").is_some());
        assert!(parse_datetime("20151231234500.1234-1358").is_some());
        // Offset hour above 19, truncated offset, trailing junk
        assert!(parse_datetime("20151231234500.1234+2359").is_none());
        assert!(parse_datetime("20151231234500.1234+23").is_none());
        assert!(parse_datetime("20151231234500.1234+23581").is_none());
    }

    #[test]
    fn test_offset_and_fraction_values() {
        let (dt, offset) = parse_datetime("20151231234500.1234-1359").unwrap();
        let expected = NaiveDate::from_ymd_opt(2015, 12, 31)
            .unwrap()
            .and_hms_nano_opt(23, 45, 0, 123_400_000)
            .unwrap();
        assert_eq!(dt, expected);
        assert_eq!(offset, FixedOffset::east_opt(-(13 * 3600 + 59 * 60)));
    }

    #[test]
    fn test_calendar_bounds_enforced() {
        // Month 13, day 32, hour 25: right lengths, wrong values
        assert!(parse_datetime("20151301").is_none());
        assert!(parse_datetime("20151232").is_none());
        assert!(parse_datetime("2015123125").is_none());
    }

    #[test]
    fn test_strict_error_kinds() {
        assert!(matches!(
            parse_datetime_strict("20151"),
            Err(Hl7Error::UnsupportedPattern(_))
        ));
        assert!(matches!(
            parse_datetime_strict("20151301"),
            Err(Hl7Error::Format(_))
        ));
        // Strict form has no offset support: the suffix breaks the gate
        assert!(matches!(
            parse_datetime_strict("20151231234500.1234+1358"),
            Err(Hl7Error::UnsupportedPattern(_))
        ));
    }

    #[test]
    fn test_strict_rejects_non_digits() {
        assert!(matches!(
            parse_datetime_strict("2015123a"),
            Err(Hl7Error::Format(_))
        ));
    }

    #[test]
    fn test_long_date_with_fraction() {
        let dt = NaiveDate::from_ymd_opt(2011, 6, 13)
            .unwrap()
            .and_hms_nano_opt(8, 36, 17, 500_000_000)
            .unwrap();
        assert_eq!(long_date_with_fraction(&dt), "20110613083617.5");

        let whole = NaiveDate::from_ymd_opt(2011, 6, 13)
            .unwrap()
            .and_hms_opt(8, 36, 17)
            .unwrap();
        assert_eq!(long_date_with_fraction(&whole), "20110613083617");
    }

    #[test]
    fn test_long_date_round_trips_through_parser() {
        let dt = NaiveDate::from_ymd_opt(2015, 12, 31)
            .unwrap()
            .and_hms_nano_opt(23, 45, 0, 123_400_000)
            .unwrap();
        let rendered = long_date_with_fraction(&dt);
        let (parsed, offset) = parse_datetime(&rendered).unwrap();
        assert_eq!(parsed, dt);
        assert_eq!(offset, None);
    }
}
