//! Occurrence bounds
//!
//! A tri-state non-negative bound used by particle code around the type
//! engine: a small machine integer, an arbitrary-precision integer for
//! schema documents that spell out absurd counts, or `unbounded`.

use num_bigint::BigUint;
use std::cmp::Ordering;
use std::fmt;

/// A non-negative occurrence bound
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Occurs {
    /// A bound that fits in a machine word
    Bounded(u64),
    /// A bound beyond `u64::MAX`
    Big(BigUint),
    /// No upper bound
    Unbounded,
}

impl Occurs {
    /// Parse an occurrence attribute value (`"unbounded"` or digits)
    pub fn parse(s: &str) -> Option<Self> {
        if s == "unbounded" {
            return Some(Occurs::Unbounded);
        }
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        match s.parse::<u64>() {
            Ok(n) => Some(Occurs::Bounded(n)),
            Err(_) => s.parse::<BigUint>().ok().map(Occurs::Big),
        }
    }

    /// The zero bound
    pub fn zero() -> Self {
        Occurs::Bounded(0)
    }

    /// True if this bound is unbounded
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Occurs::Unbounded)
    }

    /// Sum of two bounds; unbounded absorbs
    pub fn add(&self, other: &Occurs) -> Occurs {
        match (self, other) {
            (Occurs::Unbounded, _) | (_, Occurs::Unbounded) => Occurs::Unbounded,
            (Occurs::Bounded(a), Occurs::Bounded(b)) => match a.checked_add(*b) {
                Some(n) => Occurs::Bounded(n),
                None => Occurs::Big(BigUint::from(*a) + BigUint::from(*b)),
            },
            (a, b) => Occurs::Big(a.to_big() + b.to_big()),
        }
    }

    /// Product of two bounds; unbounded absorbs unless the other side is zero
    pub fn mul(&self, other: &Occurs) -> Occurs {
        if self.is_zero() || other.is_zero() {
            return Occurs::zero();
        }
        match (self, other) {
            (Occurs::Unbounded, _) | (_, Occurs::Unbounded) => Occurs::Unbounded,
            (Occurs::Bounded(a), Occurs::Bounded(b)) => match a.checked_mul(*b) {
                Some(n) => Occurs::Bounded(n),
                None => Occurs::Big(BigUint::from(*a) * BigUint::from(*b)),
            },
            (a, b) => Occurs::Big(a.to_big() * b.to_big()),
        }
    }

    fn is_zero(&self) -> bool {
        match self {
            Occurs::Bounded(n) => *n == 0,
            Occurs::Big(n) => *n == BigUint::from(0u8),
            Occurs::Unbounded => false,
        }
    }

    fn to_big(&self) -> BigUint {
        match self {
            Occurs::Bounded(n) => BigUint::from(*n),
            Occurs::Big(n) => n.clone(),
            Occurs::Unbounded => unreachable!("unbounded has no numeric value"),
        }
    }
}

impl PartialOrd for Occurs {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(match (self, other) {
            (Occurs::Unbounded, Occurs::Unbounded) => Ordering::Equal,
            (Occurs::Unbounded, _) => Ordering::Greater,
            (_, Occurs::Unbounded) => Ordering::Less,
            (Occurs::Bounded(a), Occurs::Bounded(b)) => a.cmp(b),
            (a, b) => a.to_big().cmp(&b.to_big()),
        })
    }
}

impl fmt::Display for Occurs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Occurs::Bounded(n) => write!(f, "{}", n),
            Occurs::Big(n) => write!(f, "{}", n),
            Occurs::Unbounded => write!(f, "unbounded"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(Occurs::parse("0"), Some(Occurs::Bounded(0)));
        assert_eq!(Occurs::parse("42"), Some(Occurs::Bounded(42)));
        assert_eq!(Occurs::parse("unbounded"), Some(Occurs::Unbounded));
        assert!(matches!(
            Occurs::parse("99999999999999999999999999"),
            Some(Occurs::Big(_))
        ));
        assert_eq!(Occurs::parse(""), None);
        assert_eq!(Occurs::parse("-1"), None);
        assert_eq!(Occurs::parse("1x"), None);
    }

    #[test]
    fn test_add() {
        assert_eq!(
            Occurs::Bounded(2).add(&Occurs::Bounded(3)),
            Occurs::Bounded(5)
        );
        assert_eq!(
            Occurs::Bounded(1).add(&Occurs::Unbounded),
            Occurs::Unbounded
        );
        // Overflow promotes to Big
        assert!(matches!(
            Occurs::Bounded(u64::MAX).add(&Occurs::Bounded(1)),
            Occurs::Big(_)
        ));
    }

    #[test]
    fn test_mul() {
        assert_eq!(
            Occurs::Bounded(4).mul(&Occurs::Bounded(5)),
            Occurs::Bounded(20)
        );
        // Zero beats unbounded
        assert_eq!(Occurs::zero().mul(&Occurs::Unbounded), Occurs::zero());
        assert_eq!(
            Occurs::Bounded(2).mul(&Occurs::Unbounded),
            Occurs::Unbounded
        );
    }

    #[test]
    fn test_ordering() {
        assert!(Occurs::Bounded(1) < Occurs::Unbounded);
        assert!(Occurs::Unbounded <= Occurs::Unbounded);
        assert!(Occurs::Bounded(3) > Occurs::Bounded(2));
    }
}
