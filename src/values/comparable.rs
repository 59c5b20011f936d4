//! Comparable bounds for range facets
//!
//! A `Comparable` is a parsed facet bound or instance value in one of
//! the six ordered families. Comparison may fail: NaN refuses to order
//! against anything, and the temporal and duration orders are partial.
//! Those cases surface as `Error::Indeterminate` so a range facet can
//! report them instead of silently passing or failing.

use crate::error::{Error, Result};
use crate::values::comparable_temporal::{compare_durations, compare_instants};
use crate::values::decimal::BigDecimal;
use crate::values::duration::XsdDuration;
use crate::values::temporal::XsdInstant;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt;

/// A value in one of the ordered value spaces
#[derive(Debug, Clone)]
pub enum Comparable {
    /// Any member of the integer family, unbounded
    Int(BigInt),
    /// decimal
    Dec(Decimal),
    /// decimal beyond the fast-path precision
    BigDec(BigDecimal),
    /// float
    Float(f32),
    /// double
    Double(f64),
    /// the eight temporal primitives
    DateTime(XsdInstant),
    /// duration
    Duration(XsdDuration),
}

impl Comparable {
    /// Compare two comparables of compatible families.
    ///
    /// Integer and decimal widen to each other. Float and double stay
    /// in their own families (a float bound only ever meets float
    /// instances, and likewise for double). Errors: `Indeterminate`
    /// when either side is NaN or the partial order does not decide,
    /// `Value` when the families cannot meet.
    pub fn compare(&self, other: &Comparable) -> Result<Ordering> {
        use Comparable::*;
        match (self, other) {
            (Int(a), Int(b)) => Ok(a.cmp(b)),
            (Dec(a), Dec(b)) => Ok(a.cmp(b)),
            (Int(a), Dec(b)) => compare_int_dec(a, b),
            (Dec(a), Int(b)) => compare_int_dec(b, a).map(Ordering::reverse),
            (BigDec(a), BigDec(b)) => Ok(a.cmp(b)),
            (BigDec(a), Dec(b)) => Ok(a.cmp(&BigDecimal::from_decimal(b))),
            (Dec(a), BigDec(b)) => Ok(BigDecimal::from_decimal(a).cmp(b)),
            (BigDec(a), Int(b)) => Ok(a.cmp(&BigDecimal::from_big_int(b.clone()))),
            (Int(a), BigDec(b)) => Ok(BigDecimal::from_big_int(a.clone()).cmp(b)),
            (Float(a), Float(b)) => compare_float(*a as f64, *b as f64),
            (Double(a), Double(b)) => compare_float(*a, *b),
            (DateTime(a), DateTime(b)) => compare_instants(a, b).ok_or_else(|| {
                Error::Indeterminate(format!("{} <> {}", a, b))
            }),
            (Duration(a), Duration(b)) => compare_durations(a, b).ok_or_else(|| {
                Error::Indeterminate(format!("{} <> {}", a, b))
            }),
            _ => Err(Error::Value(format!(
                "cannot compare {} with {}",
                self.family(),
                other.family()
            ))),
        }
    }

    fn family(&self) -> &'static str {
        match self {
            Comparable::Int(_) => "integer",
            Comparable::Dec(_) => "decimal",
            Comparable::BigDec(_) => "decimal",
            Comparable::Float(_) => "float",
            Comparable::Double(_) => "double",
            Comparable::DateTime(_) => "dateTime",
            Comparable::Duration(_) => "duration",
        }
    }
}

fn compare_int_dec(a: &BigInt, b: &Decimal) -> Result<Ordering> {
    // Most integers fit in a Decimal; those that do not lie strictly
    // outside its 96-bit range and order by sign alone.
    if let Some(ai) = a.to_i128() {
        if let Some(ad) = Decimal::from_i128(ai) {
            return Ok(ad.cmp(b));
        }
    }
    use num_bigint::Sign;
    match a.sign() {
        Sign::Plus => Ok(Ordering::Greater),
        Sign::Minus => Ok(Ordering::Less),
        Sign::NoSign => Ok(Decimal::ZERO.cmp(b)),
    }
}

fn compare_float(a: f64, b: f64) -> Result<Ordering> {
    // NaN is unordered against everything, including itself
    a.partial_cmp(&b)
        .ok_or_else(|| Error::Indeterminate("NaN is unordered".to_string()))
}

impl fmt::Display for Comparable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparable::Int(v) => write!(f, "{}", v),
            Comparable::Dec(v) => write!(f, "{}", v),
            Comparable::BigDec(v) => write!(f, "{}", v),
            Comparable::Float(v) => write!(f, "{}", v),
            Comparable::Double(v) => write!(f, "{}", v),
            Comparable::DateTime(v) => write!(f, "{}", v),
            Comparable::Duration(v) => write!(f, "{}", v),
        }
    }
}
