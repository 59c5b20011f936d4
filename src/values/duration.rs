//! XSD duration values
//!
//! A duration keeps its seven lexical components instead of collapsing
//! to a single number: months and days do not have a fixed ratio, which
//! is exactly why the XSD order relation on durations is partial.
//! Seconds are a `Decimal` so fractional digits survive the round trip.

use crate::error::{Error, Result};
use crate::values::decimal::BigDecimal;
use num_bigint::BigInt;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::fmt;

static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(-)?P(?:(\d+)Y)?(?:(\d+)M)?(?:(\d+)D)?(T)?(?:(\d+)H)?(?:(\d+)M)?(?:(\d+(?:\.\d+)?)S)?$",
    )
    .unwrap()
});

/// An XSD `duration` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XsdDuration {
    /// Sign of the whole duration
    pub negative: bool,
    /// Years component
    pub years: u64,
    /// Months component
    pub months: u64,
    /// Days component
    pub days: u64,
    /// Hours component
    pub hours: u64,
    /// Minutes component
    pub minutes: u64,
    /// Seconds component, fractional digits preserved
    pub seconds: Decimal,
}

impl XsdDuration {
    /// Parse an XSD duration lexical form
    ///
    /// At least one component must be present, and a `T` must be
    /// followed by at least one time component.
    pub fn parse(lexical: &str) -> Result<Self> {
        let caps = DURATION_RE
            .captures(lexical)
            .ok_or_else(|| Error::lexical("duration", lexical))?;

        let negative = caps.get(1).is_some();
        let years = number(&caps, 2, lexical)?;
        let months = number(&caps, 3, lexical)?;
        let days = number(&caps, 4, lexical)?;
        let has_t = caps.get(5).is_some();
        let hours = number(&caps, 6, lexical)?;
        let minutes = number(&caps, 7, lexical)?;
        let seconds = match caps.get(8) {
            Some(m) => Some(
                m.as_str()
                    .parse::<Decimal>()
                    .map_err(|_| Error::lexical("duration", lexical))?,
            ),
            None => None,
        };

        let any_date = caps.get(2).is_some() || caps.get(3).is_some() || caps.get(4).is_some();
        let any_time = caps.get(6).is_some() || caps.get(7).is_some() || seconds.is_some();
        if has_t && !any_time {
            return Err(Error::lexical("duration", lexical));
        }
        if !has_t && any_time {
            // time digits without the T separator
            return Err(Error::lexical("duration", lexical));
        }
        if !any_date && !any_time {
            return Err(Error::lexical("duration", lexical));
        }

        Ok(Self {
            negative,
            years: years.unwrap_or(0),
            months: months.unwrap_or(0),
            days: days.unwrap_or(0),
            hours: hours.unwrap_or(0),
            minutes: minutes.unwrap_or(0),
            seconds: seconds.unwrap_or_default(),
        })
    }

    /// True when the duration has no year or month component, i.e. its
    /// magnitude is a fixed number of seconds
    pub fn is_day_time(&self) -> bool {
        self.years == 0 && self.months == 0
    }

    /// Total signed months of the year/month part. Components carry the
    /// full `u64` range, so the total is wider than a machine word.
    pub fn total_months(&self) -> i128 {
        let m = self.years as i128 * 12 + self.months as i128;
        if self.negative {
            -m
        } else {
            m
        }
    }

    /// Total signed seconds of the day/time part, exact at any magnitude
    pub fn total_seconds(&self) -> BigDecimal {
        let whole = BigInt::from(self.days) * 86_400
            + BigInt::from(self.hours) * 3_600
            + BigInt::from(self.minutes) * 60;
        let total = BigDecimal::from_big_int(whole) + BigDecimal::from_decimal(&self.seconds);
        if self.negative {
            -total
        } else {
            total
        }
    }

    /// True when every component is zero
    pub fn is_zero(&self) -> bool {
        self.total_months() == 0 && self.total_seconds().is_zero()
    }
}

fn number(caps: &regex::Captures<'_>, idx: usize, lexical: &str) -> Result<Option<u64>> {
    match caps.get(idx) {
        Some(m) => m
            .as_str()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| Error::lexical("duration", lexical)),
        None => Ok(None),
    }
}

impl fmt::Display for XsdDuration {
    /// Canonical form: zero components are omitted, an all-zero
    /// duration prints as `PT0S`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative && !self.is_zero() {
            write!(f, "-")?;
        }
        write!(f, "P")?;
        if self.years != 0 {
            write!(f, "{}Y", self.years)?;
        }
        if self.months != 0 {
            write!(f, "{}M", self.months)?;
        }
        if self.days != 0 {
            write!(f, "{}D", self.days)?;
        }
        let has_time = self.hours != 0 || self.minutes != 0 || !self.seconds.is_zero();
        if has_time {
            write!(f, "T")?;
            if self.hours != 0 {
                write!(f, "{}H", self.hours)?;
            }
            if self.minutes != 0 {
                write!(f, "{}M", self.minutes)?;
            }
            if !self.seconds.is_zero() {
                write!(f, "{}S", self.seconds.normalize())?;
            }
        } else if self.is_zero() {
            write!(f, "T0S")?;
        }
        Ok(())
    }
}
