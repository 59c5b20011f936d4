//! XSD built-in types
//!
//! The process-wide registry of built-in simple types: `anyType`,
//! `anySimpleType`, the 19 primitives, and the 25 derived types. Each
//! entry carries its validator, whitespace policy, and base-type link;
//! primitive and fundamental-facet lookups are computed once and cached
//! on the singleton. The registry is immutable after initialization.

use crate::error::{Error, Result};
use crate::namespaces::QName;
use crate::types::facets::WhiteSpace;
use crate::types::fundamental::{self, FundamentalFacets};
use crate::values::parsers;
use crate::values::temporal;
use crate::values::{XsdDuration, XsdValue};
use indexmap::IndexMap;
use once_cell::sync::OnceCell;

// =============================================================================
// Type name constants
// =============================================================================

// Special types
pub const XSD_ANY_TYPE: &str = "anyType";
pub const XSD_ANY_SIMPLE_TYPE: &str = "anySimpleType";

// String types
pub const XSD_STRING: &str = "string";
pub const XSD_NORMALIZED_STRING: &str = "normalizedString";
pub const XSD_TOKEN: &str = "token";
pub const XSD_LANGUAGE: &str = "language";
pub const XSD_NAME: &str = "Name";
pub const XSD_NCNAME: &str = "NCName";
pub const XSD_ID: &str = "ID";
pub const XSD_IDREF: &str = "IDREF";
pub const XSD_IDREFS: &str = "IDREFS";
pub const XSD_ENTITY: &str = "ENTITY";
pub const XSD_ENTITIES: &str = "ENTITIES";
pub const XSD_NMTOKEN: &str = "NMTOKEN";
pub const XSD_NMTOKENS: &str = "NMTOKENS";

// Boolean
pub const XSD_BOOLEAN: &str = "boolean";

// Numeric types
pub const XSD_DECIMAL: &str = "decimal";
pub const XSD_INTEGER: &str = "integer";
pub const XSD_NON_POSITIVE_INTEGER: &str = "nonPositiveInteger";
pub const XSD_NEGATIVE_INTEGER: &str = "negativeInteger";
pub const XSD_LONG: &str = "long";
pub const XSD_INT: &str = "int";
pub const XSD_SHORT: &str = "short";
pub const XSD_BYTE: &str = "byte";
pub const XSD_NON_NEGATIVE_INTEGER: &str = "nonNegativeInteger";
pub const XSD_UNSIGNED_LONG: &str = "unsignedLong";
pub const XSD_UNSIGNED_INT: &str = "unsignedInt";
pub const XSD_UNSIGNED_SHORT: &str = "unsignedShort";
pub const XSD_UNSIGNED_BYTE: &str = "unsignedByte";
pub const XSD_POSITIVE_INTEGER: &str = "positiveInteger";
pub const XSD_FLOAT: &str = "float";
pub const XSD_DOUBLE: &str = "double";

// Temporal types
pub const XSD_DURATION: &str = "duration";
pub const XSD_DATETIME: &str = "dateTime";
pub const XSD_TIME: &str = "time";
pub const XSD_DATE: &str = "date";
pub const XSD_GYEAR_MONTH: &str = "gYearMonth";
pub const XSD_GYEAR: &str = "gYear";
pub const XSD_GMONTH_DAY: &str = "gMonthDay";
pub const XSD_GDAY: &str = "gDay";
pub const XSD_GMONTH: &str = "gMonth";

// Binary types
pub const XSD_HEX_BINARY: &str = "hexBinary";
pub const XSD_BASE64_BINARY: &str = "base64Binary";

// Other types
pub const XSD_ANY_URI: &str = "anyURI";
pub const XSD_QNAME: &str = "QName";
pub const XSD_NOTATION: &str = "NOTATION";

/// Local names of the XSD integer family, primitive `decimal` excluded
pub const INTEGER_TYPE_NAMES: &[&str] = &[
    XSD_INTEGER,
    XSD_NON_POSITIVE_INTEGER,
    XSD_NEGATIVE_INTEGER,
    XSD_LONG,
    XSD_INT,
    XSD_SHORT,
    XSD_BYTE,
    XSD_NON_NEGATIVE_INTEGER,
    XSD_UNSIGNED_LONG,
    XSD_UNSIGNED_INT,
    XSD_UNSIGNED_SHORT,
    XSD_UNSIGNED_BYTE,
    XSD_POSITIVE_INTEGER,
];

/// Category of a built-in type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    /// One of the 19 irreducible primitives
    Primitive,
    /// Derived from another built-in by restriction or list
    Derived,
    /// anyType / anySimpleType
    Special,
}

/// Definition of a built-in XSD type
#[derive(Debug)]
pub struct BuiltinType {
    /// Local name in the XSD namespace
    pub name: &'static str,
    /// Type category
    pub category: TypeCategory,
    /// Base type local name (None only for anyType)
    pub base_type: Option<&'static str>,
    /// White space policy
    pub white_space: WhiteSpace,
    /// Validator function over a whitespace-normalized lexical
    validator: fn(&str) -> Result<Option<XsdValue>>,
    primitive_cache: OnceCell<Option<&'static BuiltinType>>,
    facets_cache: OnceCell<Option<FundamentalFacets>>,
}

impl BuiltinType {
    fn new(
        name: &'static str,
        category: TypeCategory,
        base_type: Option<&'static str>,
        white_space: WhiteSpace,
        validator: fn(&str) -> Result<Option<XsdValue>>,
    ) -> Self {
        Self {
            name,
            category,
            base_type,
            white_space,
            validator,
            primitive_cache: OnceCell::new(),
            facets_cache: OnceCell::new(),
        }
    }

    /// The qualified name of this type
    pub fn qname(&self) -> QName {
        QName::xsd(self.name)
    }

    /// Validate a whitespace-normalized lexical form, returning the
    /// native value when the type family has one
    pub fn validate(&self, value: &str) -> Result<Option<XsdValue>> {
        (self.validator)(value)
    }

    /// The base type, if any
    pub fn base(&self) -> Option<&'static BuiltinType> {
        self.base_type.and_then(get_builtin)
    }

    /// The primitive this type reduces to. `anyType` and
    /// `anySimpleType` have none; a primitive is its own primitive.
    pub fn primitive_type(&self) -> Option<&'static BuiltinType> {
        *self.primitive_cache.get_or_init(|| match self.category {
            TypeCategory::Special => None,
            TypeCategory::Primitive => get_builtin(self.name),
            TypeCategory::Derived => self.base().and_then(|b| b.primitive_type()),
        })
    }

    /// Fundamental facets, inherited from the primitive with the
    /// bounded-integer tightening
    pub fn fundamental_facets(&self) -> Option<FundamentalFacets> {
        *self.facets_cache.get_or_init(|| {
            let primitive = self.primitive_type()?;
            fundamental::for_builtin(self.name, primitive.name)
        })
    }

    /// True if the value space carries an order relation
    pub fn is_ordered(&self) -> bool {
        self.fundamental_facets()
            .map(|f| f.is_ordered())
            .unwrap_or(false)
    }

    /// True for QName and NOTATION
    pub fn is_qname_or_notation(&self) -> bool {
        matches!(self.name, XSD_QNAME | XSD_NOTATION)
    }

    /// True if this type is in the integer family
    pub fn is_integer_derived(&self) -> bool {
        INTEGER_TYPE_NAMES.contains(&self.name)
    }
}

// =============================================================================
// Validator functions
// =============================================================================

fn validate_any(_value: &str) -> Result<Option<XsdValue>> {
    Ok(None)
}

fn validate_string(value: &str) -> Result<Option<XsdValue>> {
    Ok(Some(XsdValue::String(value.to_string())))
}

fn validate_normalized_string(value: &str) -> Result<Option<XsdValue>> {
    parsers::parse_normalized_string(value).map(|s| Some(XsdValue::String(s)))
}

fn validate_token(value: &str) -> Result<Option<XsdValue>> {
    parsers::parse_token(value).map(|s| Some(XsdValue::String(s)))
}

fn validate_language(value: &str) -> Result<Option<XsdValue>> {
    parsers::parse_language(value).map(|s| Some(XsdValue::String(s)))
}

fn validate_name(value: &str) -> Result<Option<XsdValue>> {
    parsers::parse_name(value).map(|s| Some(XsdValue::String(s)))
}

fn validate_ncname(value: &str) -> Result<Option<XsdValue>> {
    parsers::parse_ncname(value).map(|s| Some(XsdValue::String(s)))
}

fn validate_nmtoken(value: &str) -> Result<Option<XsdValue>> {
    parsers::parse_nmtoken(value).map(|s| Some(XsdValue::String(s)))
}

fn string_list(items: Vec<String>) -> Option<XsdValue> {
    Some(XsdValue::List(
        items.into_iter().map(XsdValue::String).collect(),
    ))
}

fn validate_nmtokens(value: &str) -> Result<Option<XsdValue>> {
    parsers::parse_nmtokens(value).map(string_list)
}

fn validate_idrefs(value: &str) -> Result<Option<XsdValue>> {
    parsers::parse_idrefs(value).map(string_list)
}

fn validate_entities(value: &str) -> Result<Option<XsdValue>> {
    parsers::parse_entities(value).map(string_list)
}

fn validate_boolean(value: &str) -> Result<Option<XsdValue>> {
    parsers::parse_boolean(value).map(|v| Some(XsdValue::Boolean(v)))
}

fn validate_decimal(value: &str) -> Result<Option<XsdValue>> {
    // fast path first; over-precision lexicals are still valid decimals
    match parsers::parse_decimal(value) {
        Ok(v) => Ok(Some(XsdValue::Decimal(v))),
        Err(_) => parsers::parse_big_decimal(value).map(|v| Some(XsdValue::BigDecimal(v))),
    }
}

fn validate_integer(value: &str) -> Result<Option<XsdValue>> {
    parsers::parse_integer(value).map(|v| Some(XsdValue::Integer(v)))
}

fn validate_non_positive_integer(value: &str) -> Result<Option<XsdValue>> {
    parsers::parse_non_positive_integer(value).map(|v| Some(XsdValue::Integer(v)))
}

fn validate_negative_integer(value: &str) -> Result<Option<XsdValue>> {
    parsers::parse_negative_integer(value).map(|v| Some(XsdValue::Integer(v)))
}

fn validate_non_negative_integer(value: &str) -> Result<Option<XsdValue>> {
    parsers::parse_non_negative_integer(value).map(|v| Some(XsdValue::Integer(v)))
}

fn validate_positive_integer(value: &str) -> Result<Option<XsdValue>> {
    parsers::parse_positive_integer(value).map(|v| Some(XsdValue::Integer(v)))
}

fn validate_long(value: &str) -> Result<Option<XsdValue>> {
    parsers::parse_long(value).map(|v| Some(XsdValue::Long(v)))
}

fn validate_int(value: &str) -> Result<Option<XsdValue>> {
    parsers::parse_int(value).map(|v| Some(XsdValue::Int(v)))
}

fn validate_short(value: &str) -> Result<Option<XsdValue>> {
    parsers::parse_short(value).map(|v| Some(XsdValue::Short(v)))
}

fn validate_byte(value: &str) -> Result<Option<XsdValue>> {
    parsers::parse_byte(value).map(|v| Some(XsdValue::Byte(v)))
}

fn validate_unsigned_long(value: &str) -> Result<Option<XsdValue>> {
    parsers::parse_unsigned_long(value).map(|v| Some(XsdValue::UnsignedLong(v)))
}

fn validate_unsigned_int(value: &str) -> Result<Option<XsdValue>> {
    parsers::parse_unsigned_int(value).map(|v| Some(XsdValue::UnsignedInt(v)))
}

fn validate_unsigned_short(value: &str) -> Result<Option<XsdValue>> {
    parsers::parse_unsigned_short(value).map(|v| Some(XsdValue::UnsignedShort(v)))
}

fn validate_unsigned_byte(value: &str) -> Result<Option<XsdValue>> {
    parsers::parse_unsigned_byte(value).map(|v| Some(XsdValue::UnsignedByte(v)))
}

fn validate_float(value: &str) -> Result<Option<XsdValue>> {
    parsers::parse_float(value).map(|v| Some(XsdValue::Float(v)))
}

fn validate_double(value: &str) -> Result<Option<XsdValue>> {
    parsers::parse_double(value).map(|v| Some(XsdValue::Double(v)))
}

fn validate_duration(value: &str) -> Result<Option<XsdValue>> {
    XsdDuration::parse(value).map(|v| Some(XsdValue::Duration(v)))
}

fn validate_date_time(value: &str) -> Result<Option<XsdValue>> {
    temporal::parse_date_time(value).map(|v| Some(XsdValue::DateTime(v)))
}

fn validate_time(value: &str) -> Result<Option<XsdValue>> {
    temporal::parse_time(value).map(|v| Some(XsdValue::DateTime(v)))
}

fn validate_date(value: &str) -> Result<Option<XsdValue>> {
    temporal::parse_date(value).map(|v| Some(XsdValue::DateTime(v)))
}

fn validate_g_year_month(value: &str) -> Result<Option<XsdValue>> {
    temporal::parse_g_year_month(value).map(|v| Some(XsdValue::DateTime(v)))
}

fn validate_g_year(value: &str) -> Result<Option<XsdValue>> {
    temporal::parse_g_year(value).map(|v| Some(XsdValue::DateTime(v)))
}

fn validate_g_month_day(value: &str) -> Result<Option<XsdValue>> {
    temporal::parse_g_month_day(value).map(|v| Some(XsdValue::DateTime(v)))
}

fn validate_g_day(value: &str) -> Result<Option<XsdValue>> {
    temporal::parse_g_day(value).map(|v| Some(XsdValue::DateTime(v)))
}

fn validate_g_month(value: &str) -> Result<Option<XsdValue>> {
    temporal::parse_g_month(value).map(|v| Some(XsdValue::DateTime(v)))
}

fn validate_hex_binary(value: &str) -> Result<Option<XsdValue>> {
    parsers::parse_hex_binary(value).map(|v| Some(XsdValue::Binary(v)))
}

fn validate_base64_binary(value: &str) -> Result<Option<XsdValue>> {
    parsers::parse_base64_binary(value).map(|v| Some(XsdValue::Binary(v)))
}

fn validate_any_uri(value: &str) -> Result<Option<XsdValue>> {
    parsers::parse_any_uri(value).map(|_| None)
}

fn validate_qname(value: &str) -> Result<Option<XsdValue>> {
    // only the lexical check; prefix resolution needs a namespace
    // context and happens in parse_qname_value
    parsers::parse_qname_lexical(value).map(|_| None)
}

fn validate_notation(value: &str) -> Result<Option<XsdValue>> {
    parsers::parse_notation_lexical(value).map(|_| None)
}

// =============================================================================
// The registry
// =============================================================================

lazy_static::lazy_static! {
    /// All built-in XSD types, in declaration order, keyed by local name
    pub static ref BUILTIN_TYPES: IndexMap<&'static str, BuiltinType> = {
        use TypeCategory::*;
        use WhiteSpace::*;
        let entries = [
            // Special types
            BuiltinType::new(XSD_ANY_TYPE, Special, None, Preserve, validate_any),
            BuiltinType::new(XSD_ANY_SIMPLE_TYPE, Special, Some(XSD_ANY_TYPE), Preserve, validate_any),

            // String primitive and its derivation chain
            BuiltinType::new(XSD_STRING, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Preserve, validate_string),
            BuiltinType::new(XSD_NORMALIZED_STRING, Derived, Some(XSD_STRING), Replace, validate_normalized_string),
            BuiltinType::new(XSD_TOKEN, Derived, Some(XSD_NORMALIZED_STRING), Collapse, validate_token),
            BuiltinType::new(XSD_LANGUAGE, Derived, Some(XSD_TOKEN), Collapse, validate_language),
            BuiltinType::new(XSD_NAME, Derived, Some(XSD_TOKEN), Collapse, validate_name),
            BuiltinType::new(XSD_NCNAME, Derived, Some(XSD_NAME), Collapse, validate_ncname),
            BuiltinType::new(XSD_ID, Derived, Some(XSD_NCNAME), Collapse, validate_ncname),
            BuiltinType::new(XSD_IDREF, Derived, Some(XSD_NCNAME), Collapse, validate_ncname),
            BuiltinType::new(XSD_IDREFS, Derived, Some(XSD_ANY_SIMPLE_TYPE), Collapse, validate_idrefs),
            BuiltinType::new(XSD_ENTITY, Derived, Some(XSD_NCNAME), Collapse, validate_ncname),
            BuiltinType::new(XSD_ENTITIES, Derived, Some(XSD_ANY_SIMPLE_TYPE), Collapse, validate_entities),
            BuiltinType::new(XSD_NMTOKEN, Derived, Some(XSD_TOKEN), Collapse, validate_nmtoken),
            BuiltinType::new(XSD_NMTOKENS, Derived, Some(XSD_ANY_SIMPLE_TYPE), Collapse, validate_nmtokens),

            // Boolean
            BuiltinType::new(XSD_BOOLEAN, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Collapse, validate_boolean),

            // Decimal and the integer family
            BuiltinType::new(XSD_DECIMAL, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Collapse, validate_decimal),
            BuiltinType::new(XSD_INTEGER, Derived, Some(XSD_DECIMAL), Collapse, validate_integer),
            BuiltinType::new(XSD_NON_POSITIVE_INTEGER, Derived, Some(XSD_INTEGER), Collapse, validate_non_positive_integer),
            BuiltinType::new(XSD_NEGATIVE_INTEGER, Derived, Some(XSD_NON_POSITIVE_INTEGER), Collapse, validate_negative_integer),
            BuiltinType::new(XSD_LONG, Derived, Some(XSD_INTEGER), Collapse, validate_long),
            BuiltinType::new(XSD_INT, Derived, Some(XSD_LONG), Collapse, validate_int),
            BuiltinType::new(XSD_SHORT, Derived, Some(XSD_INT), Collapse, validate_short),
            BuiltinType::new(XSD_BYTE, Derived, Some(XSD_SHORT), Collapse, validate_byte),
            BuiltinType::new(XSD_NON_NEGATIVE_INTEGER, Derived, Some(XSD_INTEGER), Collapse, validate_non_negative_integer),
            BuiltinType::new(XSD_UNSIGNED_LONG, Derived, Some(XSD_NON_NEGATIVE_INTEGER), Collapse, validate_unsigned_long),
            BuiltinType::new(XSD_UNSIGNED_INT, Derived, Some(XSD_UNSIGNED_LONG), Collapse, validate_unsigned_int),
            BuiltinType::new(XSD_UNSIGNED_SHORT, Derived, Some(XSD_UNSIGNED_INT), Collapse, validate_unsigned_short),
            BuiltinType::new(XSD_UNSIGNED_BYTE, Derived, Some(XSD_UNSIGNED_SHORT), Collapse, validate_unsigned_byte),
            BuiltinType::new(XSD_POSITIVE_INTEGER, Derived, Some(XSD_NON_NEGATIVE_INTEGER), Collapse, validate_positive_integer),

            // IEEE floats
            BuiltinType::new(XSD_FLOAT, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Collapse, validate_float),
            BuiltinType::new(XSD_DOUBLE, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Collapse, validate_double),

            // Temporal primitives
            BuiltinType::new(XSD_DURATION, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Collapse, validate_duration),
            BuiltinType::new(XSD_DATETIME, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Collapse, validate_date_time),
            BuiltinType::new(XSD_TIME, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Collapse, validate_time),
            BuiltinType::new(XSD_DATE, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Collapse, validate_date),
            BuiltinType::new(XSD_GYEAR_MONTH, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Collapse, validate_g_year_month),
            BuiltinType::new(XSD_GYEAR, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Collapse, validate_g_year),
            BuiltinType::new(XSD_GMONTH_DAY, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Collapse, validate_g_month_day),
            BuiltinType::new(XSD_GDAY, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Collapse, validate_g_day),
            BuiltinType::new(XSD_GMONTH, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Collapse, validate_g_month),

            // Binaries
            BuiltinType::new(XSD_HEX_BINARY, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Collapse, validate_hex_binary),
            BuiltinType::new(XSD_BASE64_BINARY, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Collapse, validate_base64_binary),

            // Remaining primitives
            BuiltinType::new(XSD_ANY_URI, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Collapse, validate_any_uri),
            BuiltinType::new(XSD_QNAME, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Collapse, validate_qname),
            BuiltinType::new(XSD_NOTATION, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Collapse, validate_notation),
        ];
        entries.into_iter().map(|t| (t.name, t)).collect()
    };
}

/// Look up a built-in by local name
pub fn get_builtin(local_name: &str) -> Option<&'static BuiltinType> {
    BUILTIN_TYPES.get(local_name)
}

/// Look up a built-in by namespace and local name
pub fn get_builtin_ns(namespace: &str, local_name: &str) -> Option<&'static BuiltinType> {
    if namespace != crate::XSD_NAMESPACE {
        return None;
    }
    get_builtin(local_name)
}

/// Look up a built-in by QName
pub fn get_builtin_qname(name: &QName) -> Option<&'static BuiltinType> {
    match name.namespace.as_deref() {
        Some(ns) => get_builtin_ns(ns, &name.local_name),
        None => None,
    }
}

/// True for the three built-in list types
pub fn is_builtin_list_type(local_name: &str) -> bool {
    matches!(local_name, XSD_NMTOKENS | XSD_IDREFS | XSD_ENTITIES)
}

/// Item type of a built-in list type
pub fn builtin_list_item_type(local_name: &str) -> Option<&'static BuiltinType> {
    let item = match local_name {
        XSD_NMTOKENS => XSD_NMTOKEN,
        XSD_IDREFS => XSD_IDREF,
        XSD_ENTITIES => XSD_ENTITY,
        _ => return None,
    };
    get_builtin(item)
}

/// Validate a value against a built-in looked up by local name
pub fn validate_builtin(type_name: &str, value: &str) -> Result<Option<XsdValue>> {
    let t = get_builtin(type_name)
        .ok_or_else(|| Error::Type(format!("unknown built-in type: {}", type_name)))?;
    t.validate(value)
}

/// Populate every built-in's primitive and fundamental-facets cache.
/// Opt-in warmup for hosts that want no lazy work after startup.
pub fn precompute_builtin_caches() {
    for t in BUILTIN_TYPES.values() {
        let _ = t.primitive_type();
        let _ = t.fundamental_facets();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fundamental::Ordered;

    #[test]
    fn test_registry_completeness() {
        // 2 special + 19 primitives + 25 derived
        assert_eq!(BUILTIN_TYPES.len(), 46);
        let primitives = BUILTIN_TYPES
            .values()
            .filter(|t| t.category == TypeCategory::Primitive)
            .count();
        assert_eq!(primitives, 19);
    }

    #[test]
    fn test_base_links_resolve() {
        for t in BUILTIN_TYPES.values() {
            if let Some(base) = t.base_type {
                assert!(get_builtin(base).is_some(), "dangling base for {}", t.name);
            } else {
                assert_eq!(t.name, XSD_ANY_TYPE);
            }
        }
    }

    #[test]
    fn test_primitive_resolution() {
        assert_eq!(get_builtin(XSD_BYTE).unwrap().primitive_type().unwrap().name, XSD_DECIMAL);
        assert_eq!(get_builtin(XSD_ID).unwrap().primitive_type().unwrap().name, XSD_STRING);
        assert_eq!(get_builtin(XSD_DECIMAL).unwrap().primitive_type().unwrap().name, XSD_DECIMAL);
        assert!(get_builtin(XSD_ANY_TYPE).unwrap().primitive_type().is_none());
        assert!(get_builtin(XSD_ANY_SIMPLE_TYPE).unwrap().primitive_type().is_none());
    }

    #[test]
    fn test_primitive_idempotence() {
        for t in BUILTIN_TYPES.values() {
            if let Some(p) = t.primitive_type() {
                assert_eq!(p.primitive_type().unwrap().name, p.name);
            }
        }
    }

    #[test]
    fn test_fundamental_facets() {
        assert_eq!(
            get_builtin(XSD_INTEGER).unwrap().fundamental_facets().unwrap().ordered,
            Ordered::Total
        );
        assert!(get_builtin(XSD_BYTE).unwrap().fundamental_facets().unwrap().bounded);
        assert!(!get_builtin(XSD_STRING).unwrap().is_ordered());
        assert!(get_builtin(XSD_DURATION).unwrap().is_ordered());
    }

    #[test]
    fn test_lookup() {
        assert!(get_builtin("decimal").is_some());
        assert!(get_builtin("nosuch").is_none());
        assert!(get_builtin_ns(crate::XSD_NAMESPACE, "decimal").is_some());
        assert!(get_builtin_ns("http://other", "decimal").is_none());
        assert!(get_builtin_qname(&QName::xsd("decimal")).is_some());
        assert!(get_builtin_qname(&QName::local("decimal")).is_none());
    }

    #[test]
    fn test_builtin_list_types() {
        assert!(is_builtin_list_type(XSD_NMTOKENS));
        assert!(!is_builtin_list_type(XSD_NMTOKEN));
        assert_eq!(builtin_list_item_type(XSD_IDREFS).unwrap().name, XSD_IDREF);
        assert!(builtin_list_item_type(XSD_STRING).is_none());
    }

    #[test]
    fn test_validate_builtin_dispatch() {
        assert!(validate_builtin("int", "42").is_ok());
        assert!(validate_builtin("int", "abc").is_err());
        assert!(validate_builtin("nosuch", "42").is_err());
        assert!(matches!(
            validate_builtin("boolean", "true").unwrap(),
            Some(XsdValue::Boolean(true))
        ));
        // QName validates lexically but produces no value
        assert!(validate_builtin("QName", "p:local").unwrap().is_none());
    }
}
