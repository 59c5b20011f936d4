//! Exact decimals beyond the fixed-width fast path
//!
//! The XSD decimal value space is unbounded. `rust_decimal::Decimal`
//! covers the common 96-bit range; lexicals outside it land here as an
//! unscaled `BigInt` plus a decimal scale. Values are normalized on
//! construction (no trailing fraction zeros), so structural equality is
//! value equality.

use num_bigint::{BigInt, Sign};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Neg};

/// An arbitrary-precision decimal: `unscaled * 10^(-scale)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BigDecimal {
    unscaled: BigInt,
    scale: u32,
}

impl BigDecimal {
    /// Build from an unscaled integer and a fraction-digit count,
    /// normalizing away trailing zeros in the fraction.
    pub fn new(mut unscaled: BigInt, mut scale: u32) -> Self {
        let ten = BigInt::from(10);
        while scale > 0 && (&unscaled % &ten).sign() == Sign::NoSign {
            unscaled /= &ten;
            scale -= 1;
        }
        if unscaled.sign() == Sign::NoSign {
            scale = 0;
        }
        BigDecimal { unscaled, scale }
    }

    /// Exact conversion from the fast-path representation
    pub fn from_decimal(d: &Decimal) -> Self {
        Self::new(BigInt::from(d.mantissa()), d.scale())
    }

    pub fn from_big_int(i: BigInt) -> Self {
        Self::new(i, 0)
    }

    /// The value as an integer, when it has no fractional part
    pub fn as_big_int(&self) -> Option<BigInt> {
        if self.scale == 0 {
            Some(self.unscaled.clone())
        } else {
            None
        }
    }

    pub fn is_zero(&self) -> bool {
        self.unscaled.sign() == Sign::NoSign
    }
}

fn pow10(exp: u32) -> BigInt {
    let mut v = BigInt::from(1);
    for _ in 0..exp {
        v *= 10;
    }
    v
}

impl Ord for BigDecimal {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.scale.cmp(&other.scale) {
            Ordering::Equal => self.unscaled.cmp(&other.unscaled),
            Ordering::Less => {
                (&self.unscaled * pow10(other.scale - self.scale)).cmp(&other.unscaled)
            }
            Ordering::Greater => {
                self.unscaled.cmp(&(&other.unscaled * pow10(self.scale - other.scale)))
            }
        }
    }
}

impl PartialOrd for BigDecimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add for BigDecimal {
    type Output = BigDecimal;

    fn add(self, rhs: BigDecimal) -> BigDecimal {
        let scale = self.scale.max(rhs.scale);
        let a = self.unscaled * pow10(scale - self.scale);
        let b = rhs.unscaled * pow10(scale - rhs.scale);
        BigDecimal::new(a + b, scale)
    }
}

impl Neg for BigDecimal {
    type Output = BigDecimal;

    fn neg(self) -> BigDecimal {
        BigDecimal {
            unscaled: -self.unscaled,
            scale: self.scale,
        }
    }
}

impl From<i64> for BigDecimal {
    fn from(v: i64) -> Self {
        Self::new(BigInt::from(v), 0)
    }
}

impl fmt::Display for BigDecimal {
    /// Canonical form: no sign on zero, no trailing fraction zeros,
    /// no point on integers.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.unscaled);
        }
        if self.unscaled.sign() == Sign::Minus {
            write!(f, "-")?;
        }
        let digits = self.unscaled.magnitude().to_string();
        let scale = self.scale as usize;
        if digits.len() > scale {
            let split = digits.len() - scale;
            write!(f, "{}.{}", &digits[..split], &digits[split..])
        } else {
            write!(f, "0.{}{}", "0".repeat(scale - digits.len()), digits)
        }
    }
}
