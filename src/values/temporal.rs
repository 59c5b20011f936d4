//! XSD temporal values
//!
//! One instant model backs the eight temporal primitives (`dateTime`,
//! `date`, `time`, `gYearMonth`, `gYear`, `gMonthDay`, `gDay`,
//! `gMonth`). Components a lexical form does not carry are filled from
//! a fixed reference so that values of the same primitive stay mutually
//! comparable. Whether the lexical form bore a timezone is part of the
//! value: it affects both equality and ordering.

use crate::error::{Error, Result};
use crate::values::duration::XsdDuration;
use chrono::{Datelike, Duration as ChronoDuration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use num_bigint::BigInt;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::RoundingStrategy;
use std::fmt;

// Reference components for lexical forms that omit fields. 1972 is a
// leap year, so `--02-29` maps onto a real date.
const REF_YEAR: i32 = 1972;
const REF_MONTH: u32 = 1;
const REF_DAY: u32 = 1;

/// Maximum timezone offset magnitude, in minutes (14:00)
const MAX_TZ_OFFSET_MINUTES: i32 = 14 * 60;

static DATETIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(-?\d{4,})-(\d{2})-(\d{2})T(\d{2}):(\d{2}):(\d{2})(\.\d+)?(Z|[+-]\d{2}:\d{2})?$")
        .unwrap()
});
static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-?\d{4,})-(\d{2})-(\d{2})(Z|[+-]\d{2}:\d{2})?$").unwrap());
static TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2}):(\d{2}):(\d{2})(\.\d+)?(Z|[+-]\d{2}:\d{2})?$").unwrap()
});
static GYEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-?\d{4,})(Z|[+-]\d{2}:\d{2})?$").unwrap());
static GYEAR_MONTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-?\d{4,})-(\d{2})(Z|[+-]\d{2}:\d{2})?$").unwrap());
static GMONTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^--(\d{2})(Z|[+-]\d{2}:\d{2})?$").unwrap());
static GMONTH_DAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^--(\d{2})-(\d{2})(Z|[+-]\d{2}:\d{2})?$").unwrap());
static GDAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^---(\d{2})(Z|[+-]\d{2}:\d{2})?$").unwrap());

/// An instant on the proleptic Gregorian calendar plus timezone presence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XsdInstant {
    /// Local date and time components (reference-filled where omitted)
    pub datetime: NaiveDateTime,
    /// Timezone offset in minutes east of UTC, when the lexical had one
    pub offset_minutes: Option<i32>,
}

impl XsdInstant {
    /// Whether the lexical form carried `Z` or an explicit offset
    pub fn has_timezone(&self) -> bool {
        self.offset_minutes.is_some()
    }

    /// The instant normalized to UTC; meaningful only with a timezone.
    /// Saturates at the representable timeline edges.
    pub fn utc_datetime(&self) -> NaiveDateTime {
        match self.offset_minutes {
            Some(off) => self
                .datetime
                .checked_sub_signed(ChronoDuration::minutes(off as i64))
                .unwrap_or(if off > 0 {
                    NaiveDateTime::MIN
                } else {
                    NaiveDateTime::MAX
                }),
            None => self.datetime,
        }
    }
}

impl fmt::Display for XsdInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dt = &self.datetime;
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            dt.year(),
            dt.month(),
            dt.day(),
            dt.hour(),
            dt.minute(),
            dt.second()
        )?;
        let nanos = dt.nanosecond();
        if nanos != 0 {
            let frac = format!("{:09}", nanos);
            write!(f, ".{}", frac.trim_end_matches('0'))?;
        }
        match self.offset_minutes {
            Some(0) => write!(f, "Z"),
            Some(off) => {
                let sign = if off < 0 { '-' } else { '+' };
                let off = off.abs();
                write!(f, "{}{:02}:{:02}", sign, off / 60, off % 60)
            }
            None => Ok(()),
        }
    }
}

/// Parse an `xs:dateTime` lexical form
pub fn parse_date_time(lexical: &str) -> Result<XsdInstant> {
    let caps = DATETIME_RE
        .captures(lexical)
        .ok_or_else(|| Error::lexical("dateTime", lexical))?;
    let year = parse_year(caps.get(1).unwrap().as_str(), "dateTime", lexical)?;
    let month: u32 = caps[2].parse().unwrap();
    let day: u32 = caps[3].parse().unwrap();
    let date = make_date(year, month, day, "dateTime", lexical)?;
    let (time, next_day) = parse_time_components(
        &caps[4],
        &caps[5],
        &caps[6],
        caps.get(7).map(|m| m.as_str()),
        "dateTime",
        lexical,
    )?;
    let date = if next_day {
        date.succ_opt()
            .ok_or_else(|| Error::lexical("dateTime", lexical))?
    } else {
        date
    };
    let offset = parse_timezone(caps.get(8).map(|m| m.as_str()), "dateTime", lexical)?;
    Ok(XsdInstant {
        datetime: date.and_time(time),
        offset_minutes: offset,
    })
}

/// Parse an `xs:date` lexical form
pub fn parse_date(lexical: &str) -> Result<XsdInstant> {
    let caps = DATE_RE
        .captures(lexical)
        .ok_or_else(|| Error::lexical("date", lexical))?;
    let year = parse_year(caps.get(1).unwrap().as_str(), "date", lexical)?;
    let month: u32 = caps[2].parse().unwrap();
    let day: u32 = caps[3].parse().unwrap();
    let date = make_date(year, month, day, "date", lexical)?;
    let offset = parse_timezone(caps.get(4).map(|m| m.as_str()), "date", lexical)?;
    Ok(XsdInstant {
        datetime: date.and_time(NaiveTime::MIN),
        offset_minutes: offset,
    })
}

/// Parse an `xs:time` lexical form
pub fn parse_time(lexical: &str) -> Result<XsdInstant> {
    let caps = TIME_RE
        .captures(lexical)
        .ok_or_else(|| Error::lexical("time", lexical))?;
    let (time, next_day) = parse_time_components(
        &caps[1],
        &caps[2],
        &caps[3],
        caps.get(4).map(|m| m.as_str()),
        "time",
        lexical,
    )?;
    if next_day {
        // 24:00:00 as a time of day is midnight
        return parse_time(&lexical.replacen("24:", "00:", 1));
    }
    let offset = parse_timezone(caps.get(5).map(|m| m.as_str()), "time", lexical)?;
    let date = NaiveDate::from_ymd_opt(REF_YEAR, 12, 31).unwrap();
    Ok(XsdInstant {
        datetime: date.and_time(time),
        offset_minutes: offset,
    })
}

/// Parse an `xs:gYear` lexical form
pub fn parse_g_year(lexical: &str) -> Result<XsdInstant> {
    let caps = GYEAR_RE
        .captures(lexical)
        .ok_or_else(|| Error::lexical("gYear", lexical))?;
    let year = parse_year(caps.get(1).unwrap().as_str(), "gYear", lexical)?;
    let date = make_date(year, REF_MONTH, REF_DAY, "gYear", lexical)?;
    let offset = parse_timezone(caps.get(2).map(|m| m.as_str()), "gYear", lexical)?;
    Ok(XsdInstant {
        datetime: date.and_time(NaiveTime::MIN),
        offset_minutes: offset,
    })
}

/// Parse an `xs:gYearMonth` lexical form
pub fn parse_g_year_month(lexical: &str) -> Result<XsdInstant> {
    let caps = GYEAR_MONTH_RE
        .captures(lexical)
        .ok_or_else(|| Error::lexical("gYearMonth", lexical))?;
    let year = parse_year(caps.get(1).unwrap().as_str(), "gYearMonth", lexical)?;
    let month: u32 = caps[2].parse().unwrap();
    let date = make_date(year, month, REF_DAY, "gYearMonth", lexical)?;
    let offset = parse_timezone(caps.get(3).map(|m| m.as_str()), "gYearMonth", lexical)?;
    Ok(XsdInstant {
        datetime: date.and_time(NaiveTime::MIN),
        offset_minutes: offset,
    })
}

/// Parse an `xs:gMonth` lexical form
pub fn parse_g_month(lexical: &str) -> Result<XsdInstant> {
    let caps = GMONTH_RE
        .captures(lexical)
        .ok_or_else(|| Error::lexical("gMonth", lexical))?;
    let month: u32 = caps[1].parse().unwrap();
    let date = make_date(REF_YEAR, month, REF_DAY, "gMonth", lexical)?;
    let offset = parse_timezone(caps.get(2).map(|m| m.as_str()), "gMonth", lexical)?;
    Ok(XsdInstant {
        datetime: date.and_time(NaiveTime::MIN),
        offset_minutes: offset,
    })
}

/// Parse an `xs:gMonthDay` lexical form
pub fn parse_g_month_day(lexical: &str) -> Result<XsdInstant> {
    let caps = GMONTH_DAY_RE
        .captures(lexical)
        .ok_or_else(|| Error::lexical("gMonthDay", lexical))?;
    let month: u32 = caps[1].parse().unwrap();
    let day: u32 = caps[2].parse().unwrap();
    let date = make_date(REF_YEAR, month, day, "gMonthDay", lexical)?;
    let offset = parse_timezone(caps.get(3).map(|m| m.as_str()), "gMonthDay", lexical)?;
    Ok(XsdInstant {
        datetime: date.and_time(NaiveTime::MIN),
        offset_minutes: offset,
    })
}

/// Parse an `xs:gDay` lexical form
pub fn parse_g_day(lexical: &str) -> Result<XsdInstant> {
    let caps = GDAY_RE
        .captures(lexical)
        .ok_or_else(|| Error::lexical("gDay", lexical))?;
    let day: u32 = caps[1].parse().unwrap();
    // reference month is January, which admits all 31 days
    let date = make_date(REF_YEAR, REF_MONTH, day, "gDay", lexical)?;
    let offset = parse_timezone(caps.get(2).map(|m| m.as_str()), "gDay", lexical)?;
    Ok(XsdInstant {
        datetime: date.and_time(NaiveTime::MIN),
        offset_minutes: offset,
    })
}

/// True iff the lexical form of a temporal primitive carries a timezone.
///
/// Pure function of the lexical; also stored on the parsed instant.
pub fn has_timezone(lexical: &str) -> bool {
    if lexical.ends_with('Z') {
        return true;
    }
    // An offset is [+-]hh:mm at the end; a leading year sign or the date
    // separators must not count.
    let b = lexical.as_bytes();
    if b.len() < 6 {
        return false;
    }
    let tail = &b[b.len() - 6..];
    (tail[0] == b'+' || tail[0] == b'-')
        && tail[1].is_ascii_digit()
        && tail[2].is_ascii_digit()
        && tail[3] == b':'
        && tail[4].is_ascii_digit()
        && tail[5].is_ascii_digit()
}

fn parse_year(s: &str, type_name: &str, lexical: &str) -> Result<i32> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.len() > 4 && digits.starts_with('0') {
        // extra digits must not be zero padding
        return Err(Error::lexical(type_name, lexical));
    }
    let year: i32 = s
        .parse()
        .map_err(|_| Error::lexical(type_name, lexical))?;
    if year == 0 {
        // year 0000 does not exist in XSD 1.0
        return Err(Error::lexical(type_name, lexical));
    }
    Ok(year)
}

fn make_date(year: i32, month: u32, day: u32, type_name: &str, lexical: &str) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| Error::lexical(type_name, lexical))
}

/// Parse hh/mm/ss plus optional fraction; returns the time and whether
/// `24:00:00` rolled over to the next day.
fn parse_time_components(
    hh: &str,
    mm: &str,
    ss: &str,
    frac: Option<&str>,
    type_name: &str,
    lexical: &str,
) -> Result<(NaiveTime, bool)> {
    let hour: u32 = hh.parse().unwrap();
    let minute: u32 = mm.parse().unwrap();
    let second: u32 = ss.parse().unwrap();
    let nanos = match frac {
        Some(f) => {
            let digits = &f[1..];
            if digits.len() > 9 {
                return Err(Error::lexical(type_name, lexical));
            }
            let mut padded = digits.to_string();
            while padded.len() < 9 {
                padded.push('0');
            }
            padded.parse::<u32>().unwrap()
        }
        None => 0,
    };
    if hour == 24 {
        if minute != 0 || second != 0 || nanos != 0 {
            return Err(Error::lexical(type_name, lexical));
        }
        return Ok((NaiveTime::MIN, true));
    }
    let time = NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)
        .ok_or_else(|| Error::lexical(type_name, lexical))?;
    Ok((time, false))
}

fn parse_timezone(tz: Option<&str>, type_name: &str, lexical: &str) -> Result<Option<i32>> {
    let tz = match tz {
        None => return Ok(None),
        Some(t) => t,
    };
    if tz == "Z" {
        return Ok(Some(0));
    }
    let sign = if tz.starts_with('-') { -1 } else { 1 };
    let hours: i32 = tz[1..3].parse().unwrap();
    let minutes: i32 = tz[4..6].parse().unwrap();
    if minutes > 59 {
        return Err(Error::lexical(type_name, lexical));
    }
    let total = hours * 60 + minutes;
    if total > MAX_TZ_OFFSET_MINUTES {
        return Err(Error::lexical(type_name, lexical));
    }
    Ok(Some(sign * total))
}

/// Add an XSD duration to a dateTime per the XSD 1.0 algorithm:
/// months are added with f-quotient/modulo carry, the day of month is
/// clamped to the target month's length, then the day/time part is
/// added as an exact number of seconds. Returns `None` when the result
/// leaves the representable timeline; component magnitudes are
/// unbounded, so every arithmetic step is checked.
pub fn add_duration(dt: NaiveDateTime, dur: &XsdDuration) -> Option<NaiveDateTime> {
    let months_total = dur.total_months();
    let month_index = dt.year() as i128 * 12 + (dt.month() as i128 - 1) + months_total;
    let year = i32::try_from(month_index.div_euclid(12)).ok()?;
    let month = (month_index.rem_euclid(12) + 1) as u32;
    let day = dt.day().min(days_in_month(year, month));
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let carried = date.and_time(dt.time());

    let day_seconds = BigInt::from(dur.days) * 86_400
        + BigInt::from(dur.hours) * 3_600
        + BigInt::from(dur.minutes) * 60
        + BigInt::from(dur.seconds.trunc().to_i128()?);
    let whole = i64::try_from(day_seconds).ok()?;
    let frac = dur
        .seconds
        .fract()
        .round_dp_with_strategy(9, RoundingStrategy::ToZero);
    let nanos = (frac * rust_decimal::Decimal::from(1_000_000_000i64)).to_i64()?;
    let sign = if dur.negative { -1i64 } else { 1 };
    let shift = ChronoDuration::try_seconds(sign * whole)?
        .checked_add(&ChronoDuration::nanoseconds(sign * nanos))?;
    carried.checked_add_signed(shift)
}

/// Number of days in a Gregorian month
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

/// Gregorian leap year rule
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_time() {
        let v = parse_date_time("2024-01-15T10:30:00").unwrap();
        assert!(!v.has_timezone());
        let v = parse_date_time("2024-01-15T10:30:00Z").unwrap();
        assert_eq!(v.offset_minutes, Some(0));
        let v = parse_date_time("2024-01-15T10:30:00+05:30").unwrap();
        assert_eq!(v.offset_minutes, Some(330));
        assert!(parse_date_time("2024-01-15").is_err());
        assert!(parse_date_time("invalid").is_err());
    }

    #[test]
    fn test_year_zero_rejected() {
        assert!(parse_date_time("0000-01-01T00:00:00").is_err());
        assert!(parse_g_year("0000").is_err());
        assert!(parse_g_year("-0001").is_ok());
    }

    #[test]
    fn test_year_padding() {
        assert!(parse_g_year("12024").is_ok());
        assert!(parse_g_year("02024").is_err()); // 5 digits may not be zero-padded
        assert!(parse_g_year("202").is_err());
    }

    #[test]
    fn test_hour_24() {
        let v = parse_date_time("2024-01-15T24:00:00").unwrap();
        assert_eq!(v.datetime.day(), 16);
        assert_eq!(v.datetime.hour(), 0);
        assert!(parse_date_time("2024-01-15T24:00:01").is_err());
        assert!(parse_date_time("2024-01-15T24:30:00").is_err());
    }

    #[test]
    fn test_leap_day() {
        assert!(parse_date("2024-02-29").is_ok());
        assert!(parse_date("2023-02-29").is_err());
        assert!(parse_date("1900-02-29").is_err());
        assert!(parse_date("2000-02-29").is_ok());
    }

    #[test]
    fn test_fractional_seconds() {
        assert!(parse_time("10:30:00.123456789").is_ok());
        assert!(parse_time("10:30:00.1234567890").is_err()); // >9 digits
    }

    #[test]
    fn test_timezone_limits() {
        assert!(parse_date("2024-01-15+14:00").is_ok());
        assert!(parse_date("2024-01-15-14:00").is_ok());
        assert!(parse_date("2024-01-15+14:01").is_err());
        assert!(parse_date("2024-01-15+15:00").is_err());
        assert!(parse_date("2024-01-15+10:60").is_err());
    }

    #[test]
    fn test_g_types() {
        assert!(parse_g_year("2024").is_ok());
        assert!(parse_g_year_month("2024-06").is_ok());
        assert!(parse_g_year_month("2024-13").is_err());
        assert!(parse_g_month("--06").is_ok());
        assert!(parse_g_month("--00").is_err());
        assert!(parse_g_month_day("--02-29").is_ok()); // reference year is leap
        assert!(parse_g_month_day("--02-30").is_err());
        assert!(parse_g_day("---15").is_ok());
        assert!(parse_g_day("---32").is_err());
    }

    #[test]
    fn test_g_day_offset_equivalence() {
        // ---15Z and ---15+00:00 are the same value
        let a = parse_g_day("---15Z").unwrap();
        let b = parse_g_day("---15+00:00").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_has_timezone() {
        assert!(has_timezone("2024-01-15T10:30:00Z"));
        assert!(has_timezone("2024-01-15T10:30:00+05:30"));
        assert!(has_timezone("---15-05:00"));
        assert!(!has_timezone("2024-01-15T10:30:00"));
        assert!(!has_timezone("-0001"));
        assert!(!has_timezone("2024-01-15"));
    }

    #[test]
    fn test_add_duration_month_clamp() {
        // Jan 31 + P1M clamps to Feb 29 in a leap year
        let dt = NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_time(NaiveTime::MIN);
        let d = XsdDuration::parse("P1M").unwrap();
        let r = add_duration(dt, &d).unwrap();
        assert_eq!((r.year(), r.month(), r.day()), (2024, 2, 29));
    }

    #[test]
    fn test_add_duration_negative() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_time(NaiveTime::MIN);
        let d = XsdDuration::parse("-P1D").unwrap();
        let r = add_duration(dt, &d).unwrap();
        assert_eq!((r.year(), r.month(), r.day()), (2024, 2, 29));
    }

    #[test]
    fn test_display_round_trip() {
        let v = parse_date_time("2024-01-15T10:30:00.5Z").unwrap();
        assert_eq!(v.to_string(), "2024-01-15T10:30:00.5Z");
        let v = parse_date_time("2024-01-15T10:30:00-05:00").unwrap();
        assert_eq!(v.to_string(), "2024-01-15T10:30:00-05:00");
    }
}
