//! Typed values
//!
//! `XsdValue` is the native-value side of the two-part model: every
//! successfully validated instance carries both its normalized lexical
//! form and, where a native representation exists, an `XsdValue`.
//! Equality between typed values is value-space equality, which is what
//! enumeration facets and identity constraints need.

use crate::namespaces::QName;
use crate::values::comparable_temporal::{compare_durations, compare_instants};
use crate::values::decimal::BigDecimal;
use crate::values::duration::XsdDuration;
use crate::values::temporal::XsdInstant;
use num_bigint::BigInt;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt;

/// A native XSD value
#[derive(Debug, Clone)]
pub enum XsdValue {
    /// string and its whitespace-derived family
    String(String),
    Boolean(bool),
    Decimal(Decimal),
    /// decimals whose precision exceeds the `Decimal` fast path
    BigDecimal(BigDecimal),
    /// integer and its unbounded-sign subtypes
    Integer(BigInt),
    Long(i64),
    Int(i32),
    Short(i16),
    Byte(i8),
    UnsignedLong(u64),
    UnsignedInt(u32),
    UnsignedShort(u16),
    UnsignedByte(u8),
    Float(f32),
    Double(f64),
    /// the eight temporal primitives
    DateTime(XsdInstant),
    Duration(XsdDuration),
    /// hexBinary and base64Binary, as decoded octets
    Binary(Vec<u8>),
    /// QName and NOTATION, resolved against a namespace context
    QName(QName),
    /// list types, item values in document order
    List(Vec<XsdValue>),
}

impl XsdValue {
    /// The value as an unbounded integer, when it is in the integer family
    pub fn as_big_int(&self) -> Option<BigInt> {
        match self {
            XsdValue::Integer(v) => Some(v.clone()),
            XsdValue::Long(v) => Some(BigInt::from(*v)),
            XsdValue::Int(v) => Some(BigInt::from(*v)),
            XsdValue::Short(v) => Some(BigInt::from(*v)),
            XsdValue::Byte(v) => Some(BigInt::from(*v)),
            XsdValue::UnsignedLong(v) => Some(BigInt::from(*v)),
            XsdValue::UnsignedInt(v) => Some(BigInt::from(*v)),
            XsdValue::UnsignedShort(v) => Some(BigInt::from(*v)),
            XsdValue::UnsignedByte(v) => Some(BigInt::from(*v)),
            _ => None,
        }
    }
}

/// Value-space equality between two native values.
///
/// The integer family widens to unbounded integers, and integers meet
/// decimals through exact conversion. NaN equals NaN here; enumeration
/// membership is a set question, not an order question. Temporal and
/// duration values are equal exactly when their order relation is
/// determinate and says so, which makes equality sensitive to timezone
/// presence. Values from different spaces are never equal.
pub fn values_equal(a: &XsdValue, b: &XsdValue) -> bool {
    use XsdValue::*;
    if let (Some(ia), Some(ib)) = (a.as_big_int(), b.as_big_int()) {
        return ia == ib;
    }
    match (a, b) {
        (String(x), String(y)) => x == y,
        (Boolean(x), Boolean(y)) => x == y,
        (Decimal(x), Decimal(y)) => x == y,
        (BigDecimal(x), BigDecimal(y)) => x == y,
        (BigDecimal(x), Decimal(y)) | (Decimal(y), BigDecimal(x)) => {
            *x == crate::values::decimal::BigDecimal::from_decimal(y)
        }
        (BigDecimal(x), _) => match b.as_big_int() {
            Some(i) => x.as_big_int() == Some(i),
            None => false,
        },
        (_, BigDecimal(x)) => match a.as_big_int() {
            Some(i) => x.as_big_int() == Some(i),
            None => false,
        },
        (Decimal(d), _) => match b.as_big_int() {
            Some(i) => int_equals_decimal(&i, d),
            None => false,
        },
        (_, Decimal(d)) => match a.as_big_int() {
            Some(i) => int_equals_decimal(&i, d),
            None => false,
        },
        (Float(x), Float(y)) => float_equal(*x as f64, *y as f64),
        (Double(x), Double(y)) => float_equal(*x, *y),
        (DateTime(x), DateTime(y)) => compare_instants(x, y) == Some(Ordering::Equal),
        (Duration(x), Duration(y)) => compare_durations(x, y) == Some(Ordering::Equal),
        (Binary(x), Binary(y)) => x == y,
        (QName(x), QName(y)) => x == y,
        (List(x), List(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(i, j)| values_equal(i, j))
        }
        _ => false,
    }
}

fn int_equals_decimal(i: &BigInt, d: &Decimal) -> bool {
    use rust_decimal::prelude::FromPrimitive;
    use num_traits::ToPrimitive;
    if d.fract() != Decimal::ZERO {
        return false;
    }
    match i.to_i128().and_then(Decimal::from_i128) {
        Some(di) => di == *d,
        // outside Decimal's range the two cannot coincide
        None => false,
    }
}

fn float_equal(a: f64, b: f64) -> bool {
    if a.is_nan() && b.is_nan() {
        return true;
    }
    a == b
}

impl fmt::Display for XsdValue {
    /// Canonical lexical form where one is defined, a faithful
    /// rendering otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use XsdValue::*;
        match self {
            String(v) => write!(f, "{}", v),
            Boolean(v) => write!(f, "{}", super::parsers::boolean_lexical(*v)),
            Decimal(v) => write!(f, "{}", v.normalize()),
            BigDecimal(v) => write!(f, "{}", v),
            Integer(v) => write!(f, "{}", v),
            Long(v) => write!(f, "{}", v),
            Int(v) => write!(f, "{}", v),
            Short(v) => write!(f, "{}", v),
            Byte(v) => write!(f, "{}", v),
            UnsignedLong(v) => write!(f, "{}", v),
            UnsignedInt(v) => write!(f, "{}", v),
            UnsignedShort(v) => write!(f, "{}", v),
            UnsignedByte(v) => write!(f, "{}", v),
            Float(v) => write_float(f, *v as f64),
            Double(v) => write_float(f, *v),
            DateTime(v) => write!(f, "{}", v),
            Duration(v) => write!(f, "{}", v),
            Binary(v) => {
                for b in v {
                    write!(f, "{:02X}", b)?;
                }
                Ok(())
            }
            QName(v) => write!(f, "{}", v),
            List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

fn write_float(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    if v.is_nan() {
        write!(f, "NaN")
    } else if v == f64::INFINITY {
        write!(f, "INF")
    } else if v == f64::NEG_INFINITY {
        write!(f, "-INF")
    } else {
        write!(f, "{}", v)
    }
}

/// A validated instance: the type it validated against, the
/// whitespace-normalized lexical form, and the native value when the
/// type family has one.
#[derive(Debug, Clone)]
pub struct TypedValue {
    /// Qualified name of the validating type
    pub type_name: QName,
    /// Lexical form after whitespace normalization
    pub lexical: String,
    /// Native value, absent for purely lexical families like anyURI
    pub value: Option<XsdValue>,
}

impl TypedValue {
    pub fn new(type_name: QName, lexical: impl Into<String>, value: Option<XsdValue>) -> Self {
        TypedValue {
            type_name,
            lexical: lexical.into(),
            value,
        }
    }
}

impl PartialEq for TypedValue {
    /// Value-space equality when both sides have a native value,
    /// lexical equality otherwise.
    fn eq(&self, other: &Self) -> bool {
        match (&self.value, &other.value) {
            (Some(a), Some(b)) => values_equal(a, b),
            _ => self.lexical == other.lexical,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lexical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::temporal::{parse_date_time, parse_g_day};

    #[test]
    fn test_integer_family_widening() {
        assert!(values_equal(&XsdValue::Byte(5), &XsdValue::UnsignedLong(5)));
        assert!(values_equal(
            &XsdValue::Integer(BigInt::from(-3)),
            &XsdValue::Long(-3)
        ));
        assert!(!values_equal(&XsdValue::Byte(5), &XsdValue::Byte(6)));
    }

    #[test]
    fn test_integer_decimal_bridge() {
        assert!(values_equal(
            &XsdValue::Integer(BigInt::from(100)),
            &XsdValue::Decimal(Decimal::from(100))
        ));
        assert!(values_equal(
            &XsdValue::Decimal("100.00".parse().unwrap()),
            &XsdValue::Int(100)
        ));
        assert!(!values_equal(
            &XsdValue::Decimal("100.5".parse().unwrap()),
            &XsdValue::Int(100)
        ));
    }

    #[test]
    fn test_big_decimal_bridge() {
        use crate::values::parsers::parse_big_decimal;
        let digits = "123456789012345678901234567890";
        let plain = XsdValue::BigDecimal(parse_big_decimal(digits).unwrap());
        let trailing = XsdValue::BigDecimal(
            parse_big_decimal("123456789012345678901234567890.000").unwrap(),
        );
        assert!(values_equal(&plain, &trailing));
        assert!(values_equal(&plain, &XsdValue::Integer(digits.parse().unwrap())));
        assert!(values_equal(
            &XsdValue::BigDecimal(parse_big_decimal("1.5").unwrap()),
            &XsdValue::Decimal("1.500".parse().unwrap())
        ));
        assert!(!values_equal(&plain, &XsdValue::Decimal(Decimal::MAX)));
        assert!(!values_equal(
            &XsdValue::BigDecimal(parse_big_decimal("0.5").unwrap()),
            &XsdValue::Int(0)
        ));
    }

    #[test]
    fn test_nan_equals_nan() {
        assert!(values_equal(
            &XsdValue::Double(f64::NAN),
            &XsdValue::Double(f64::NAN)
        ));
        assert!(values_equal(
            &XsdValue::Float(f32::NAN),
            &XsdValue::Float(f32::NAN)
        ));
        assert!(!values_equal(
            &XsdValue::Double(f64::NAN),
            &XsdValue::Double(1.0)
        ));
    }

    #[test]
    fn test_temporal_timezone_presence() {
        let z = XsdValue::DateTime(parse_date_time("2024-01-15T10:00:00Z").unwrap());
        let plus = XsdValue::DateTime(parse_date_time("2024-01-15T11:00:00+01:00").unwrap());
        let local = XsdValue::DateTime(parse_date_time("2024-01-15T10:00:00").unwrap());
        assert!(values_equal(&z, &plus));
        assert!(!values_equal(&z, &local));

        let a = XsdValue::DateTime(parse_g_day("---15Z").unwrap());
        let b = XsdValue::DateTime(parse_g_day("---15+00:00").unwrap());
        assert!(values_equal(&a, &b));
    }

    #[test]
    fn test_duration_equality() {
        let a = XsdValue::Duration(XsdDuration::parse("PT24H").unwrap());
        let b = XsdValue::Duration(XsdDuration::parse("P1D").unwrap());
        assert!(values_equal(&a, &b));
        let m = XsdValue::Duration(XsdDuration::parse("P1M").unwrap());
        let d30 = XsdValue::Duration(XsdDuration::parse("P30D").unwrap());
        assert!(!values_equal(&m, &d30));
    }

    #[test]
    fn test_cross_space_never_equal() {
        assert!(!values_equal(
            &XsdValue::String("1".into()),
            &XsdValue::Int(1)
        ));
        assert!(!values_equal(
            &XsdValue::Boolean(true),
            &XsdValue::Int(1)
        ));
    }

    #[test]
    fn test_list_equality() {
        let a = XsdValue::List(vec![XsdValue::Int(1), XsdValue::Int(2)]);
        let b = XsdValue::List(vec![XsdValue::Long(1), XsdValue::Long(2)]);
        let c = XsdValue::List(vec![XsdValue::Int(1)]);
        assert!(values_equal(&a, &b));
        assert!(!values_equal(&a, &c));
    }

    #[test]
    fn test_typed_value_fallback() {
        let t = QName::xsd("anyURI");
        let a = TypedValue::new(t.clone(), "http://a", None);
        let b = TypedValue::new(t.clone(), "http://a", None);
        let c = TypedValue::new(t, "http://b", None);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_display_canonical() {
        assert_eq!(XsdValue::Boolean(true).to_string(), "true");
        assert_eq!(
            XsdValue::Decimal("1.500".parse().unwrap()).to_string(),
            "1.5"
        );
        assert_eq!(XsdValue::Binary(vec![0x0A, 0xFF]).to_string(), "0AFF");
        assert_eq!(XsdValue::Double(f64::INFINITY).to_string(), "INF");
        assert_eq!(
            XsdValue::List(vec![XsdValue::Int(1), XsdValue::Int(2)]).to_string(),
            "1 2"
        );
    }
}
