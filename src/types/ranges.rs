//! Range facet construction
//!
//! Builds minInclusive / minExclusive / maxInclusive / maxExclusive
//! facets by parsing the bound lexical in the value space the base type
//! dictates. Integer-derived bases get an unbounded integer bound even
//! when their primitive is decimal; everything else dispatches on the
//! primitive. An unresolved base surfaces the `UnresolvedType` sentinel
//! so schema loaders can defer construction until link time.

use crate::error::{Error, Result};
use crate::types::base::TypeRef;
use crate::types::builtins::{self, BuiltinType};
use crate::types::facets::{Facet, RangeFacet};
use crate::values::parsers;
use crate::values::temporal;
use crate::values::{Comparable, XsdDuration};
use std::cmp::Ordering;

/// Build a minInclusive facet
pub fn new_min_inclusive(lexical: &str, base: &TypeRef) -> Result<Facet> {
    new_range_facet("minInclusive", lexical, base)
}

/// Build a minExclusive facet
pub fn new_min_exclusive(lexical: &str, base: &TypeRef) -> Result<Facet> {
    new_range_facet("minExclusive", lexical, base)
}

/// Build a maxInclusive facet
pub fn new_max_inclusive(lexical: &str, base: &TypeRef) -> Result<Facet> {
    new_range_facet("maxInclusive", lexical, base)
}

/// Build a maxExclusive facet
pub fn new_max_exclusive(lexical: &str, base: &TypeRef) -> Result<Facet> {
    new_range_facet("maxExclusive", lexical, base)
}

/// The comparison the facet applies to `cmp(value, bound)`
fn facet_predicate(name: &str) -> Option<(fn(Ordering) -> bool, &'static str)> {
    match name {
        "minInclusive" => Some((|o| o != Ordering::Less, ">=")),
        "minExclusive" => Some((|o| o == Ordering::Greater, ">")),
        "maxInclusive" => Some((|o| o != Ordering::Greater, "<=")),
        "maxExclusive" => Some((|o| o == Ordering::Less, "<")),
        _ => None,
    }
}

/// Build one range facet from its bound lexical and base type
pub fn new_range_facet(name: &'static str, lexical: &str, base: &TypeRef) -> Result<Facet> {
    let (predicate, operator) = facet_predicate(name)
        .ok_or_else(|| Error::Type(format!("unknown range facet: {}", name)))?;

    // An unordered value space admits no range facet. Facets that are
    // not yet computable (unlinked user chains) defer the check to
    // schema validation instead of failing the parse.
    if let Some(facets) = base.fundamental_facets() {
        if !facets.is_ordered() {
            return Err(Error::Value(format!(
                "{} only applies to ordered types, not {}",
                name,
                base.qname()
            )));
        }
    }

    let bound = parse_bound(lexical, base)?;
    Ok(Facet::Range(RangeFacet::new(
        name, lexical, bound, operator, predicate,
    )))
}

pub(crate) fn parse_bound(lexical: &str, base: &TypeRef) -> Result<Comparable> {
    if is_integer_derived(base) {
        return parsers::parse_integer(lexical).map(Comparable::Int);
    }
    let primitive = base
        .primitive_type()
        .ok_or_else(|| Error::UnresolvedType(base.qname().to_string()))?;
    parse_primitive_bound(lexical, primitive)
}

fn parse_primitive_bound(lexical: &str, primitive: &BuiltinType) -> Result<Comparable> {
    match primitive.name {
        builtins::XSD_DECIMAL => match parsers::parse_decimal(lexical) {
            Ok(v) => Ok(Comparable::Dec(v)),
            // over-precision bounds are valid decimals too
            Err(_) => parsers::parse_big_decimal(lexical).map(Comparable::BigDec),
        },
        builtins::XSD_FLOAT => parsers::parse_float(lexical).map(Comparable::Float),
        builtins::XSD_DOUBLE => parsers::parse_double(lexical).map(Comparable::Double),
        builtins::XSD_DURATION => XsdDuration::parse(lexical).map(Comparable::Duration),
        builtins::XSD_DATETIME => temporal::parse_date_time(lexical).map(Comparable::DateTime),
        builtins::XSD_DATE => temporal::parse_date(lexical).map(Comparable::DateTime),
        builtins::XSD_TIME => temporal::parse_time(lexical).map(Comparable::DateTime),
        builtins::XSD_GYEAR => temporal::parse_g_year(lexical).map(Comparable::DateTime),
        builtins::XSD_GYEAR_MONTH => {
            temporal::parse_g_year_month(lexical).map(Comparable::DateTime)
        }
        builtins::XSD_GMONTH => temporal::parse_g_month(lexical).map(Comparable::DateTime),
        builtins::XSD_GMONTH_DAY => {
            temporal::parse_g_month_day(lexical).map(Comparable::DateTime)
        }
        builtins::XSD_GDAY => temporal::parse_g_day(lexical).map(Comparable::DateTime),
        other => Err(Error::Type(format!(
            "no range bound parser for primitive {}",
            other
        ))),
    }
}

/// True when the base reduces to the XSD integer family, determined by
/// walking the resolved base chain against the fixed set of integer
/// local names.
fn is_integer_derived(base: &TypeRef) -> bool {
    base.derivation_chain().iter().any(|t| {
        let name = t.qname();
        name.is_xsd() && builtins::INTEGER_TYPE_NAMES.contains(&name.local_name.as_str())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::{NamespaceContext, QName};
    use crate::types::builtins::get_builtin;
    use crate::types::simple_types::XsdSimpleType;
    use num_bigint::BigInt;

    fn builtin_ref(name: &str) -> TypeRef {
        TypeRef::Builtin(get_builtin(name).unwrap())
    }

    fn range(facet: Facet) -> RangeFacet {
        match facet {
            Facet::Range(r) => r,
            other => panic!("expected range facet, got {}", other.name()),
        }
    }

    #[test]
    fn test_decimal_bound() {
        let f = range(new_max_exclusive("100", &builtin_ref("decimal")).unwrap());
        assert_eq!(f.operator, "<");
        assert!(matches!(f.bound, Comparable::Dec(_)));
    }

    #[test]
    fn test_integer_derived_bound() {
        let f = range(new_min_inclusive("0", &builtin_ref("unsignedByte")).unwrap());
        assert!(matches!(f.bound, Comparable::Int(_)));
        // huge bound stays exact
        let f = range(
            new_max_inclusive("99999999999999999999999999999999", &builtin_ref("integer"))
                .unwrap(),
        );
        match f.bound {
            Comparable::Int(i) => {
                assert_eq!(i.to_string(), "99999999999999999999999999999999")
            }
            _ => panic!("expected integer bound"),
        }
    }

    #[test]
    fn test_over_precision_decimal_bound() {
        let f = range(
            new_max_exclusive("123456789012345678901234567890", &builtin_ref("decimal")).unwrap(),
        );
        assert!(matches!(f.bound, Comparable::BigDec(_)));
    }

    #[test]
    fn test_temporal_bound_keeps_timezone() {
        let f = range(new_min_inclusive("2024-01-01T00:00:00Z", &builtin_ref("dateTime")).unwrap());
        match f.bound {
            Comparable::DateTime(v) => assert!(v.has_timezone()),
            _ => panic!("expected dateTime bound"),
        }
    }

    #[test]
    fn test_duration_bound() {
        let f = range(new_min_inclusive("P30D", &builtin_ref("duration")).unwrap());
        assert!(matches!(f.bound, Comparable::Duration(_)));
        assert_eq!(f.operator, ">=");
    }

    #[test]
    fn test_unordered_base_rejected() {
        let err = new_min_inclusive("a", &builtin_ref("string")).unwrap_err();
        assert!(err.to_string().contains("ordered"));
        assert!(new_max_inclusive("true", &builtin_ref("boolean")).is_err());
    }

    #[test]
    fn test_unresolved_base_sentinel() {
        // a user type whose base never resolves
        let t = XsdSimpleType::atomic(
            QName::local("pending"),
            QName::local("alsoPending"),
            vec![],
            NamespaceContext::new(),
        );
        let base = TypeRef::Simple(std::sync::Arc::new(t));
        let err = new_min_inclusive("5", &base).unwrap_err();
        assert!(err.is_unresolved());
    }

    #[test]
    fn test_invalid_bound_lexical() {
        assert!(new_min_inclusive("abc", &builtin_ref("decimal")).is_err());
        assert!(new_min_inclusive("P1Z", &builtin_ref("duration")).is_err());
    }

    #[test]
    fn test_float_family_bound() {
        let f = range(new_max_inclusive("1.5e3", &builtin_ref("float")).unwrap());
        assert!(matches!(f.bound, Comparable::Float(_)));
        let f = range(new_max_inclusive("-INF", &builtin_ref("double")).unwrap());
        assert!(matches!(f.bound, Comparable::Double(_)));
        let int_val = Comparable::Int(BigInt::from(1));
        // family mismatch surfaces as an error, not a silent pass
        let facet = range(new_max_inclusive("1.0", &builtin_ref("double")).unwrap());
        assert!(facet.validate(&int_val).is_err());
    }
}
