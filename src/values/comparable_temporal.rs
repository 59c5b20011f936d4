//! Partial order on temporal instants and durations
//!
//! Two comparisons in the XSD 1.0 value space are genuinely partial:
//! instants where only one side carries a timezone, and durations that
//! mix month and day components. Both are implemented here as functions
//! returning `Option<Ordering>`, with `None` meaning indeterminate.

use crate::values::duration::XsdDuration;
use crate::values::temporal::{add_duration, XsdInstant};
use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use std::cmp::Ordering;

/// The widest legal timezone offset, which bounds the indeterminate
/// window when exactly one instant has a timezone
const MAX_TZ_MINUTES: i64 = 14 * 60;

/// Compare two instants of the same primitive.
///
/// Both timezoned: compare on the UTC timeline. Neither: compare local
/// components. Mixed: the untimezoned side could sit anywhere within
/// +-14:00 of UTC, so the result is determinate only when the gap
/// exceeds that window.
pub fn compare_instants(a: &XsdInstant, b: &XsdInstant) -> Option<Ordering> {
    match (a.offset_minutes, b.offset_minutes) {
        (Some(_), Some(_)) => Some(a.utc_datetime().cmp(&b.utc_datetime())),
        (None, None) => Some(a.datetime.cmp(&b.datetime)),
        (Some(_), None) => {
            let a_utc = a.utc_datetime();
            // earliest and latest UTC instants b could denote; a window
            // edge past the representable timeline never excludes `a`
            let b_min = b
                .datetime
                .checked_sub_signed(ChronoDuration::minutes(MAX_TZ_MINUTES));
            let b_max = b
                .datetime
                .checked_add_signed(ChronoDuration::minutes(MAX_TZ_MINUTES));
            if b_min.is_some_and(|m| a_utc < m) {
                Some(Ordering::Less)
            } else if b_max.is_some_and(|m| a_utc > m) {
                Some(Ordering::Greater)
            } else {
                None
            }
        }
        (None, Some(_)) => compare_instants(b, a).map(Ordering::reverse),
    }
}

// The four reference dateTimes from the XSD 1.0 duration order relation.
// They are chosen so that month arithmetic diverges maximally: two sit
// just before month-length transitions in the Julian-reform era, two in
// a modern leap and non-leap context.
static DURATION_ANCHORS: Lazy<[NaiveDateTime; 4]> = Lazy::new(|| {
    let d = |y, m, day| {
        NaiveDate::from_ymd_opt(y, m, day)
            .unwrap()
            .and_time(NaiveTime::MIN)
    };
    [
        d(1696, 9, 1),
        d(1697, 2, 1),
        d(1903, 3, 1),
        d(1903, 7, 1),
    ]
});

/// Compare two durations per the XSD 1.0 order relation.
///
/// Day-time durations have a fixed length in seconds and compare
/// totally. Otherwise each duration is added to the four reference
/// dateTimes; the durations are ordered only when all four results
/// agree (equality requires four ties, strict order requires no
/// disagreement and at least one strict result).
pub fn compare_durations(a: &XsdDuration, b: &XsdDuration) -> Option<Ordering> {
    if a.is_day_time() && b.is_day_time() {
        return Some(a.total_seconds().cmp(&b.total_seconds()));
    }

    let mut saw_less = false;
    let mut saw_greater = false;
    for anchor in DURATION_ANCHORS.iter() {
        let ra = add_duration(*anchor, a)?;
        let rb = add_duration(*anchor, b)?;
        match ra.cmp(&rb) {
            Ordering::Less => saw_less = true,
            Ordering::Greater => saw_greater = true,
            Ordering::Equal => {}
        }
    }
    match (saw_less, saw_greater) {
        (true, true) => None,
        (true, false) => Some(Ordering::Less),
        (false, true) => Some(Ordering::Greater),
        (false, false) => Some(Ordering::Equal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::temporal::parse_date_time;

    fn dur(s: &str) -> XsdDuration {
        XsdDuration::parse(s).unwrap()
    }

    #[test]
    fn test_instants_both_timezoned() {
        let a = parse_date_time("2024-01-15T10:00:00Z").unwrap();
        let b = parse_date_time("2024-01-15T05:00:00-05:00").unwrap();
        assert_eq!(compare_instants(&a, &b), Some(Ordering::Equal));
        let c = parse_date_time("2024-01-15T10:00:01Z").unwrap();
        assert_eq!(compare_instants(&a, &c), Some(Ordering::Less));
    }

    #[test]
    fn test_instants_neither_timezoned() {
        let a = parse_date_time("2024-01-15T10:00:00").unwrap();
        let b = parse_date_time("2024-01-15T11:00:00").unwrap();
        assert_eq!(compare_instants(&a, &b), Some(Ordering::Less));
        assert_eq!(compare_instants(&a, &a), Some(Ordering::Equal));
    }

    #[test]
    fn test_instants_mixed_window() {
        // within 14 hours of each other: indeterminate
        let z = parse_date_time("2024-01-15T10:00:00Z").unwrap();
        let local = parse_date_time("2024-01-15T12:00:00").unwrap();
        assert_eq!(compare_instants(&z, &local), None);
        assert_eq!(compare_instants(&local, &z), None);

        // more than 14 hours apart: determinate
        let far = parse_date_time("2024-01-16T10:00:01").unwrap();
        assert_eq!(compare_instants(&z, &far), Some(Ordering::Less));
        assert_eq!(compare_instants(&far, &z), Some(Ordering::Greater));

        // exactly at the edge counts as indeterminate
        let edge = parse_date_time("2024-01-16T00:00:00").unwrap();
        assert_eq!(compare_instants(&z, &edge), None);
    }

    #[test]
    fn test_durations_day_time_total() {
        assert_eq!(
            compare_durations(&dur("PT24H"), &dur("P1D")),
            Some(Ordering::Equal)
        );
        assert_eq!(
            compare_durations(&dur("P1D"), &dur("PT25H")),
            Some(Ordering::Less)
        );
        assert_eq!(
            compare_durations(&dur("-PT1S"), &dur("PT0S")),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn test_durations_huge_components() {
        // day-time totals stay exact at any magnitude
        assert_eq!(
            compare_durations(&dur("P400000000000000000D"), &dur("P1D")),
            Some(Ordering::Greater)
        );
        assert_eq!(
            compare_durations(&dur("-P400000000000000000D"), &dur("P1D")),
            Some(Ordering::Less)
        );
        // a year count past the representable timeline cannot be
        // anchored, so the order against a day count is indeterminate
        assert_eq!(
            compare_durations(&dur("P18446744073709551615Y"), &dur("P1D")),
            None
        );
    }

    #[test]
    fn test_durations_month_vs_days() {
        // P1M vs P30D is the canonical indeterminate pair
        assert_eq!(compare_durations(&dur("P1M"), &dur("P30D")), None);
        // P1M < P32D at every anchor
        assert_eq!(
            compare_durations(&dur("P1M"), &dur("P32D")),
            Some(Ordering::Less)
        );
        // P1M > P27D at every anchor
        assert_eq!(
            compare_durations(&dur("P1M"), &dur("P27D")),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn test_durations_year_month() {
        assert_eq!(
            compare_durations(&dur("P1Y"), &dur("P12M")),
            Some(Ordering::Equal)
        );
        assert_eq!(
            compare_durations(&dur("P1Y"), &dur("P13M")),
            Some(Ordering::Less)
        );
        assert_eq!(compare_durations(&dur("P1Y"), &dur("P365D")), None);
        assert_eq!(
            compare_durations(&dur("P1Y"), &dur("P366D")),
            Some(Ordering::Less)
        );
        assert_eq!(
            compare_durations(&dur("P1Y"), &dur("P364D")),
            Some(Ordering::Greater)
        );
    }
}
