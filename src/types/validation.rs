//! Normalization and facet composition
//!
//! The engine's outer entry points: whitespace normalization, parsing a
//! lexical into a `TypedValue` for a type, and running a facet list
//! over a value. Facet iteration stops at the first violation; one type
//! check returns one error.

use crate::error::{Error, Result};
use crate::namespaces::NamespaceContext;
use crate::types::base::TypeRef;
use crate::types::builtins::BuiltinType;
use crate::types::facets::{self, Facet, WhiteSpace};
use crate::types::ranges;
use crate::types::simple_types::{Variety, XsdSimpleType};
use crate::values::parsers::split_xml_whitespace;
use crate::values::{Comparable, TypedValue, XsdValue};

/// Apply a whitespace policy to a raw value
pub fn apply_whitespace(value: &str, policy: WhiteSpace) -> String {
    policy.normalize(value)
}

/// Normalize a raw value with the type's whitespace policy
pub fn normalize_value(value: &str, t: &TypeRef) -> Result<String> {
    Ok(t.white_space().normalize(value))
}

/// The nearest built-in on the resolved base chain, which carries the
/// lexical validator a user-defined atomic inherits
fn nearest_builtin(t: &TypeRef) -> Option<&'static BuiltinType> {
    for link in t.derivation_chain() {
        if let TypeRef::Builtin(b) = link {
            return Some(b);
        }
    }
    None
}

/// Normalize and parse a lexical form for a type.
///
/// Atomics validate against the nearest built-in on their chain, lists
/// parse item-wise, and unions accept the first member that does.
pub fn parse_value_for_type(value: &str, t: &TypeRef) -> Result<TypedValue> {
    let normalized = normalize_value(value, t)?;
    match t {
        TypeRef::Builtin(b) => {
            let native = b.validate(&normalized)?;
            Ok(TypedValue::new(b.qname(), normalized, native))
        }
        TypeRef::Simple(s) => parse_simple(&normalized, s, t),
    }
}

fn parse_simple(normalized: &str, s: &XsdSimpleType, t: &TypeRef) -> Result<TypedValue> {
    match s.variety() {
        Variety::Atomic => {
            let builtin = nearest_builtin(t)
                .ok_or_else(|| Error::UnresolvedType(s.name.to_string()))?;
            let native = builtin.validate(normalized)?;
            Ok(TypedValue::new(s.name.clone(), normalized.to_string(), native))
        }
        Variety::List => {
            let item_type = facets::list_item_type(t)
                .ok_or_else(|| Error::UnresolvedType(s.name.to_string()))?;
            let mut items = Vec::new();
            for item in split_xml_whitespace(normalized) {
                let parsed = parse_value_for_type(item, &item_type)
                    .map_err(|_| Error::lexical(&s.name.local_name, normalized))?;
                // value-less items degrade to their lexical form
                items.push(parsed.value.unwrap_or(XsdValue::String(item.to_string())));
            }
            Ok(TypedValue::new(
                s.name.clone(),
                normalized.to_string(),
                Some(XsdValue::List(items)),
            ))
        }
        Variety::Union => {
            let members = s
                .identity_member_types()
                .ok_or_else(|| Error::UnresolvedType(s.name.to_string()))?;
            for member in &members {
                if let Ok(parsed) = parse_value_for_type(normalized, member) {
                    return Ok(TypedValue::new(
                        s.name.clone(),
                        parsed.lexical,
                        parsed.value,
                    ));
                }
            }
            Err(Error::lexical(&s.name.local_name, normalized))
        }
    }
}

/// The range-comparable view of a native value, if its family has one
pub(crate) fn comparable_from(value: &XsdValue) -> Option<Comparable> {
    if let Some(i) = value.as_big_int() {
        return Some(Comparable::Int(i));
    }
    match value {
        XsdValue::Decimal(d) => Some(Comparable::Dec(*d)),
        XsdValue::BigDecimal(d) => Some(Comparable::BigDec(d.clone())),
        XsdValue::Float(f) => Some(Comparable::Float(*f)),
        XsdValue::Double(d) => Some(Comparable::Double(*d)),
        XsdValue::DateTime(t) => Some(Comparable::DateTime(t.clone())),
        XsdValue::Duration(d) => Some(Comparable::Duration(d.clone())),
        _ => None,
    }
}

/// Run a facet list over a normalized lexical. Facets apply in order;
/// the first violation stops iteration. Length facets are skipped for
/// non-list QName/NOTATION bases, and enumeration reroutes to QName
/// resolution there. The typed parse happens at most once, on the
/// first facet that needs it.
pub fn validate_value_against_facets(
    value: &str,
    base: &TypeRef,
    facet_list: &[Facet],
    ns_context: Option<&NamespaceContext>,
) -> Result<()> {
    if facet_list.is_empty() {
        return Ok(());
    }
    let qname_base = base.is_qname_or_notation() && !base.is_list();
    let mut parsed: Option<Option<Comparable>> = None;

    for facet in facet_list {
        match facet {
            Facet::WhiteSpace(_) => {}
            Facet::Pattern(p) => p.validate_lexical(value)?,
            Facet::Length(f) => {
                if !qname_base {
                    f.validate_lexical(value, base)?;
                }
            }
            Facet::MinLength(f) => {
                if !qname_base {
                    f.validate_lexical(value, base)?;
                }
            }
            Facet::MaxLength(f) => {
                if !qname_base {
                    f.validate_lexical(value, base)?;
                }
            }
            Facet::TotalDigits(f) => f.validate_lexical(value)?,
            Facet::FractionDigits(f) => f.validate_lexical(value)?,
            Facet::Enumeration(e) => e.validate_lexical(value, base, ns_context)?,
            Facet::Range(r) => {
                let comparable = match &parsed {
                    Some(c) => c.clone(),
                    None => {
                        let c = comparable_for(value, base)?;
                        parsed = Some(c.clone());
                        c
                    }
                };
                match comparable {
                    Some(c) => r.validate(&c)?,
                    None => {
                        return Err(Error::Value(format!(
                            "cannot compare '{}' against the {} bound",
                            value, r.name
                        )))
                    }
                }
            }
        }
    }
    Ok(())
}

/// Parse the instance into the comparable family of its base. A native
/// raw string (or a value-less family) is re-parsed in the primitive's
/// space, matching how range bounds are constructed.
fn comparable_for(value: &str, base: &TypeRef) -> Result<Option<Comparable>> {
    let typed = parse_value_for_type(value, base)?;
    if let Some(native) = &typed.value {
        if let Some(c) = comparable_from(native) {
            return Ok(Some(c));
        }
    }
    Ok(ranges::parse_bound(&typed.lexical, base).ok())
}

/// Populate every cache of one simple type. Opt-in warmup mirroring
/// `precompute_builtin_caches`.
pub fn precompute_simple_type_caches(t: &XsdSimpleType) {
    let _ = t.primitive_type();
    let _ = t.fundamental_facets();
    let _ = t.is_qname_or_notation();
    let _ = t.identity_normalizable();
}
