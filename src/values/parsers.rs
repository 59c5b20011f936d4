//! Per-primitive lexical parsers
//!
//! Each primitive has exactly one parser mapping a whitespace-normalized
//! lexical form to its native value. Parsers reject lexical space
//! violations with `LexicalInvalid` and numeric range violations with
//! `OutOfRange`; they never panic on input. Whitespace normalization is
//! the caller's job (see `types::validation`).

use crate::error::{Error, Result};
use crate::names::{is_valid_ncname, is_valid_nmtoken, is_valid_qname};
use crate::namespaces::{NamespaceContext, QName};
use crate::values::decimal::BigDecimal;
use base64::Engine;
use lazy_static::lazy_static;
use num_bigint::BigInt;
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::HashMap;

lazy_static! {
    /// XSD boolean value mapping
    static ref XSD_BOOLEAN_MAP: HashMap<&'static str, bool> = {
        let mut m = HashMap::new();
        m.insert("false", false);
        m.insert("0", false);
        m.insert("true", true);
        m.insert("1", true);
        m
    };

    static ref DECIMAL_RE: Regex = Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)$").unwrap();
    static ref INTEGER_RE: Regex = Regex::new(r"^[+-]?\d+$").unwrap();
    static ref FLOAT_RE: Regex =
        Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$").unwrap();
    static ref HEX_BINARY_RE: Regex = Regex::new(r"^([0-9a-fA-F]{2})*$").unwrap();
    static ref LANGUAGE_RE: Regex =
        Regex::new(r"^[a-zA-Z]{1,8}(-[a-zA-Z0-9]{1,8})*$").unwrap();
}

// =============================================================================
// Boolean
// =============================================================================

/// Parse an `xs:boolean` lexical form (`true|false|1|0`)
pub fn parse_boolean(lexical: &str) -> Result<bool> {
    XSD_BOOLEAN_MAP
        .get(lexical)
        .copied()
        .ok_or_else(|| Error::lexical("boolean", lexical))
}

/// Convert a Rust bool to the canonical XSD boolean lexical
pub fn boolean_lexical(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

// =============================================================================
// Decimal and the integer family
// =============================================================================

/// Parse an `xs:decimal` lexical form into the fixed-width fast path
pub fn parse_decimal(lexical: &str) -> Result<Decimal> {
    if !DECIMAL_RE.is_match(lexical) {
        return Err(Error::lexical("decimal", lexical));
    }
    lexical
        .parse::<Decimal>()
        .map_err(|_| Error::lexical("decimal", lexical))
}

/// Parse an `xs:decimal` of any precision. The value space is unbounded,
/// so lexicals that overflow `Decimal` take this exact path.
pub fn parse_big_decimal(lexical: &str) -> Result<BigDecimal> {
    if !DECIMAL_RE.is_match(lexical) {
        return Err(Error::lexical("decimal", lexical));
    }
    let (int_part, frac_part) = match lexical.split_once('.') {
        Some((i, f)) => (i, f),
        None => (lexical, ""),
    };
    let unscaled = format!("{}{}", int_part, frac_part)
        .parse::<BigInt>()
        .map_err(|_| Error::lexical("decimal", lexical))?;
    Ok(BigDecimal::new(unscaled, frac_part.len() as u32))
}

/// Parse an `xs:integer` lexical form (unbounded)
pub fn parse_integer(lexical: &str) -> Result<BigInt> {
    if !INTEGER_RE.is_match(lexical) {
        return Err(Error::lexical("integer", lexical));
    }
    // BigInt::parse accepts a leading '+', and "-0" lands on zero
    lexical
        .parse::<BigInt>()
        .map_err(|_| Error::lexical("integer", lexical))
}

fn bounded_int(lexical: &str, type_name: &str, min: i128, max: i128) -> Result<i128> {
    if !INTEGER_RE.is_match(lexical) {
        return Err(Error::lexical(type_name, lexical));
    }
    let big = lexical
        .parse::<BigInt>()
        .map_err(|_| Error::lexical(type_name, lexical))?;
    let v = i128::try_from(&big)
        .map_err(|_| Error::out_of_range(type_name, lexical, format!("{} <= x <= {}", min, max)))?;
    if v < min || v > max {
        return Err(Error::out_of_range(
            type_name,
            lexical,
            format!("{} <= x <= {}", min, max),
        ));
    }
    Ok(v)
}

/// Parse an `xs:long` lexical form
pub fn parse_long(lexical: &str) -> Result<i64> {
    Ok(bounded_int(lexical, "long", i64::MIN as i128, i64::MAX as i128)? as i64)
}

/// Parse an `xs:int` lexical form
pub fn parse_int(lexical: &str) -> Result<i32> {
    Ok(bounded_int(lexical, "int", i32::MIN as i128, i32::MAX as i128)? as i32)
}

/// Parse an `xs:short` lexical form
pub fn parse_short(lexical: &str) -> Result<i16> {
    Ok(bounded_int(lexical, "short", i16::MIN as i128, i16::MAX as i128)? as i16)
}

/// Parse an `xs:byte` lexical form
pub fn parse_byte(lexical: &str) -> Result<i8> {
    Ok(bounded_int(lexical, "byte", i8::MIN as i128, i8::MAX as i128)? as i8)
}

/// Parse an `xs:unsignedLong` lexical form
pub fn parse_unsigned_long(lexical: &str) -> Result<u64> {
    Ok(bounded_int(lexical, "unsignedLong", 0, u64::MAX as i128)? as u64)
}

/// Parse an `xs:unsignedInt` lexical form
pub fn parse_unsigned_int(lexical: &str) -> Result<u32> {
    Ok(bounded_int(lexical, "unsignedInt", 0, u32::MAX as i128)? as u32)
}

/// Parse an `xs:unsignedShort` lexical form
pub fn parse_unsigned_short(lexical: &str) -> Result<u16> {
    Ok(bounded_int(lexical, "unsignedShort", 0, u16::MAX as i128)? as u16)
}

/// Parse an `xs:unsignedByte` lexical form
pub fn parse_unsigned_byte(lexical: &str) -> Result<u8> {
    Ok(bounded_int(lexical, "unsignedByte", 0, u8::MAX as i128)? as u8)
}

/// Parse an `xs:nonNegativeInteger` lexical form
pub fn parse_non_negative_integer(lexical: &str) -> Result<BigInt> {
    let v = parse_integer(lexical).map_err(|_| Error::lexical("nonNegativeInteger", lexical))?;
    if v.sign() == num_bigint::Sign::Minus {
        return Err(Error::out_of_range("nonNegativeInteger", lexical, "x >= 0"));
    }
    Ok(v)
}

/// Parse an `xs:nonPositiveInteger` lexical form
pub fn parse_non_positive_integer(lexical: &str) -> Result<BigInt> {
    let v = parse_integer(lexical).map_err(|_| Error::lexical("nonPositiveInteger", lexical))?;
    if v.sign() == num_bigint::Sign::Plus {
        return Err(Error::out_of_range("nonPositiveInteger", lexical, "x <= 0"));
    }
    Ok(v)
}

/// Parse an `xs:positiveInteger` lexical form
pub fn parse_positive_integer(lexical: &str) -> Result<BigInt> {
    let v = parse_integer(lexical).map_err(|_| Error::lexical("positiveInteger", lexical))?;
    if v.sign() != num_bigint::Sign::Plus {
        return Err(Error::out_of_range("positiveInteger", lexical, "x >= 1"));
    }
    Ok(v)
}

/// Parse an `xs:negativeInteger` lexical form
pub fn parse_negative_integer(lexical: &str) -> Result<BigInt> {
    let v = parse_integer(lexical).map_err(|_| Error::lexical("negativeInteger", lexical))?;
    if v.sign() != num_bigint::Sign::Minus {
        return Err(Error::out_of_range("negativeInteger", lexical, "x <= -1"));
    }
    Ok(v)
}

// =============================================================================
// Float and double
// =============================================================================

/// Parse an `xs:float` lexical form, including `INF`, `-INF`, `NaN`
pub fn parse_float(lexical: &str) -> Result<f32> {
    match lexical {
        "NaN" => Ok(f32::NAN),
        "INF" => Ok(f32::INFINITY),
        "-INF" => Ok(f32::NEG_INFINITY),
        // +INF is not in the XSD 1.0 lexical space
        _ => {
            if !FLOAT_RE.is_match(lexical) {
                return Err(Error::lexical("float", lexical));
            }
            lexical
                .parse::<f32>()
                .map_err(|_| Error::lexical("float", lexical))
        }
    }
}

/// Parse an `xs:double` lexical form, including `INF`, `-INF`, `NaN`
pub fn parse_double(lexical: &str) -> Result<f64> {
    match lexical {
        "NaN" => Ok(f64::NAN),
        "INF" => Ok(f64::INFINITY),
        "-INF" => Ok(f64::NEG_INFINITY),
        _ => {
            if !FLOAT_RE.is_match(lexical) {
                return Err(Error::lexical("double", lexical));
            }
            lexical
                .parse::<f64>()
                .map_err(|_| Error::lexical("double", lexical))
        }
    }
}

// =============================================================================
// Binary
// =============================================================================

/// Parse an `xs:hexBinary` lexical form (even-length, case-insensitive)
pub fn parse_hex_binary(lexical: &str) -> Result<Vec<u8>> {
    if !HEX_BINARY_RE.is_match(lexical) {
        return Err(Error::lexical("hexBinary", lexical));
    }
    (0..lexical.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&lexical[i..i + 2], 16)
                .map_err(|_| Error::lexical("hexBinary", lexical))
        })
        .collect()
}

/// Parse an `xs:base64Binary` lexical form
///
/// Embedded XML whitespace is stripped before strict decoding.
pub fn parse_base64_binary(lexical: &str) -> Result<Vec<u8>> {
    let cleaned: String = lexical
        .chars()
        .filter(|c| !matches!(c, ' ' | '\t' | '\n' | '\r'))
        .collect();
    if cleaned.is_empty() {
        return Ok(Vec::new());
    }
    base64::engine::general_purpose::STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|_| Error::lexical("base64Binary", lexical))
}

// =============================================================================
// URI, QName, NOTATION
// =============================================================================

/// Parse an `xs:anyURI` lexical form
///
/// Deliberately permissive: relative references are URIs too. Only
/// embedded whitespace is rejected.
pub fn parse_any_uri(lexical: &str) -> Result<String> {
    if lexical
        .chars()
        .any(|c| matches!(c, ' ' | '\t' | '\n' | '\r'))
    {
        return Err(Error::lexical("anyURI", lexical));
    }
    Ok(lexical.to_string())
}

/// Check an `xs:QName` lexical form without resolving the prefix
pub fn parse_qname_lexical(lexical: &str) -> Result<()> {
    if !is_valid_qname(lexical) {
        return Err(Error::lexical("QName", lexical));
    }
    if let Some((prefix, _)) = lexical.split_once(':') {
        if prefix == "xmlns" {
            return Err(Error::lexical("QName", lexical));
        }
    }
    Ok(())
}

/// Parse an `xs:QName` value, resolving the prefix in the given context
pub fn parse_qname_value(lexical: &str, ctx: &NamespaceContext) -> Result<QName> {
    parse_qname_lexical(lexical)?;
    ctx.resolve(lexical)
}

/// Check an `xs:NOTATION` lexical form (same rules as QName)
pub fn parse_notation_lexical(lexical: &str) -> Result<()> {
    parse_qname_lexical(lexical).map_err(|_| Error::lexical("NOTATION", lexical))
}

// =============================================================================
// String family
// =============================================================================

/// Check an `xs:normalizedString` (no CR, LF, or TAB)
pub fn parse_normalized_string(lexical: &str) -> Result<String> {
    if lexical.contains(['\r', '\n', '\t']) {
        return Err(Error::lexical("normalizedString", lexical));
    }
    Ok(lexical.to_string())
}

/// Check an `xs:token` (collapsed form: no edge or double spaces)
pub fn parse_token(lexical: &str) -> Result<String> {
    if lexical.contains(['\r', '\n', '\t'])
        || lexical.starts_with(' ')
        || lexical.ends_with(' ')
        || lexical.contains("  ")
    {
        return Err(Error::lexical("token", lexical));
    }
    Ok(lexical.to_string())
}

/// Check an `xs:language` tag (RFC 3066 shape)
pub fn parse_language(lexical: &str) -> Result<String> {
    if !LANGUAGE_RE.is_match(lexical) {
        return Err(Error::lexical("language", lexical));
    }
    Ok(lexical.to_string())
}

/// Check an `xs:Name`
pub fn parse_name(lexical: &str) -> Result<String> {
    if !crate::names::is_valid_name(lexical) {
        return Err(Error::lexical("Name", lexical));
    }
    Ok(lexical.to_string())
}

/// Check an `xs:NCName` (also the lexical space of ID, IDREF, ENTITY)
pub fn parse_ncname(lexical: &str) -> Result<String> {
    if !is_valid_ncname(lexical) {
        return Err(Error::lexical("NCName", lexical));
    }
    Ok(lexical.to_string())
}

/// Check an `xs:NMTOKEN`
pub fn parse_nmtoken(lexical: &str) -> Result<String> {
    if !is_valid_nmtoken(lexical) {
        return Err(Error::lexical("NMTOKEN", lexical));
    }
    Ok(lexical.to_string())
}

/// Split a list lexical on XML whitespace (exactly SPACE, TAB, CR, LF)
pub fn split_xml_whitespace(lexical: &str) -> Vec<&str> {
    lexical
        .split(['\x20', '\t', '\n', '\r'])
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_name_list(
    lexical: &str,
    type_name: &str,
    item: fn(&str) -> Result<String>,
) -> Result<Vec<String>> {
    let items = split_xml_whitespace(lexical);
    if items.is_empty() {
        return Err(Error::lexical(type_name, lexical));
    }
    items
        .into_iter()
        .map(|i| item(i).map_err(|_| Error::lexical(type_name, lexical)))
        .collect()
}

/// Check an `xs:NMTOKENS` list (non-empty)
pub fn parse_nmtokens(lexical: &str) -> Result<Vec<String>> {
    parse_name_list(lexical, "NMTOKENS", parse_nmtoken)
}

/// Check an `xs:IDREFS` list (non-empty)
pub fn parse_idrefs(lexical: &str) -> Result<Vec<String>> {
    parse_name_list(lexical, "IDREFS", parse_ncname)
}

/// Check an `xs:ENTITIES` list (non-empty)
pub fn parse_entities(lexical: &str) -> Result<Vec<String>> {
    parse_name_list(lexical, "ENTITIES", parse_ncname)
}
