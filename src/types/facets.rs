//! XSD constraining facets
//!
//! Whitespace policy plus the facet library: pattern (with OR semantics
//! inside one derivation step), enumeration (value-space membership),
//! the length family, the digits family, and range facets. Range facet
//! construction lives in `ranges`; the composition rules that skip or
//! reroute facets per type family live in `validation`.

use crate::error::{Error, FacetViolation, Result};
use crate::namespaces::{NamespaceContext, QName};
use crate::types::base::TypeRef;
use crate::types::builtins;
use crate::types::simple_types::Variety;
use crate::values::parsers::{self, split_xml_whitespace};
use crate::values::{values_equal, Comparable, XsdValue};
use crate::xregex;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::{Mutex, PoisonError};

// =============================================================================
// White space
// =============================================================================

/// White space handling modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhiteSpace {
    /// Keep the value as written
    Preserve,
    /// Map TAB, CR, LF to SPACE
    Replace,
    /// Replace, trim, and collapse internal runs to one SPACE
    Collapse,
}

impl WhiteSpace {
    /// Parse the schema-document attribute value
    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "preserve" => Ok(WhiteSpace::Preserve),
            "replace" => Ok(WhiteSpace::Replace),
            "collapse" => Ok(WhiteSpace::Collapse),
            _ => Err(Error::Value(format!(
                "invalid whiteSpace value: '{}'",
                s
            ))),
        }
    }

    /// Normalize a string according to this mode
    pub fn normalize(&self, s: &str) -> String {
        match self {
            WhiteSpace::Preserve => s.to_string(),
            WhiteSpace::Replace => s.replace(['\t', '\n', '\r'], " "),
            WhiteSpace::Collapse => {
                let replaced = s.replace(['\t', '\n', '\r'], " ");
                let mut result = String::with_capacity(replaced.len());
                let mut prev_space = true;
                for c in replaced.chars() {
                    if c == ' ' {
                        if !prev_space {
                            result.push(' ');
                            prev_space = true;
                        }
                    } else {
                        result.push(c);
                        prev_space = false;
                    }
                }
                result.trim_end().to_string()
            }
        }
    }
}

impl fmt::Display for WhiteSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WhiteSpace::Preserve => "preserve",
            WhiteSpace::Replace => "replace",
            WhiteSpace::Collapse => "collapse",
        };
        write!(f, "{}", s)
    }
}

// =============================================================================
// Pattern
// =============================================================================

/// One compiled XSD pattern
#[derive(Debug)]
pub struct PatternFacet {
    /// The pattern as written in the schema
    pub source: String,
    regex: Regex,
}

impl PatternFacet {
    /// Translate and compile an XSD 1.0 pattern. Compilation happens
    /// once, here; validation reuses the compiled form.
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let source = pattern.into();
        let regex = xregex::compile_pattern(&source)?;
        Ok(Self { source, regex })
    }

    /// Whether the full lexical matches
    pub fn matches(&self, lexical: &str) -> bool {
        self.regex.is_match(lexical)
    }
}

/// The patterns of one derivation step, validated with OR semantics.
/// Patterns from different steps compose as AND through the per-step
/// facet lists.
#[derive(Debug)]
pub struct PatternSet {
    patterns: Vec<PatternFacet>,
}

impl PatternSet {
    pub fn new(patterns: Vec<PatternFacet>) -> Self {
        Self { patterns }
    }

    /// Build from pattern sources, compiling each
    pub fn compile(sources: &[&str]) -> Result<Self> {
        let patterns = sources
            .iter()
            .map(|s| PatternFacet::new(*s))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(patterns))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// At least one pattern must match
    pub fn validate_lexical(&self, lexical: &str) -> Result<()> {
        if self.patterns.is_empty() || self.patterns.iter().any(|p| p.matches(lexical)) {
            return Ok(());
        }
        let sources: Vec<&str> = self.patterns.iter().map(|p| p.source.as_str()).collect();
        Err(FacetViolation::new(
            "pattern",
            format!(
                "value '{}' does not match pattern '{}'",
                lexical,
                sources.join("' or '")
            ),
        )
        .into())
    }
}

// =============================================================================
// Enumeration
// =============================================================================

#[derive(Debug)]
struct EnumerationInner {
    values: Vec<String>,
    contexts: Vec<Option<NamespaceContext>>,
    sealed: bool,
    // parsed variants per entry, valid for cache_base only
    cache_base: Option<QName>,
    cache: Option<Vec<Vec<XsdValue>>>,
}

/// The enumeration facet. Schema parse appends allowed lexicals with
/// their prefix contexts, then seals; membership testing compares in
/// value space against the base type, with the parsed forms cached per
/// base.
#[derive(Debug)]
pub struct Enumeration {
    inner: Mutex<EnumerationInner>,
}

impl Default for Enumeration {
    fn default() -> Self {
        Self::new()
    }
}

impl Enumeration {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(EnumerationInner {
                values: Vec::new(),
                contexts: Vec::new(),
                sealed: false,
                cache_base: None,
                cache: None,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, EnumerationInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add an allowed lexical with the prefix context it was written in
    pub fn append(
        &self,
        lexical: impl Into<String>,
        context: Option<NamespaceContext>,
    ) -> Result<()> {
        let mut inner = self.lock();
        if inner.sealed {
            return Err(Error::Type("enumeration is sealed".to_string()));
        }
        inner.values.push(lexical.into());
        inner.contexts.push(context);
        inner.cache = None;
        Ok(())
    }

    /// End schema parse; appends fail afterwards
    pub fn seal(&self) {
        self.lock().sealed = true;
    }

    /// The allowed lexicals, for messages
    pub fn values(&self) -> Vec<String> {
        self.lock().values.clone()
    }

    /// Test membership of a normalized lexical against the base type.
    ///
    /// QName/NOTATION bases resolve both sides and compare QNames
    /// structurally. List bases compare item-wise. Everything else
    /// parses each allowed lexical once per base and compares with
    /// value-space equality, falling back to lexical equality for
    /// families without a native value.
    pub fn validate_lexical(
        &self,
        lexical: &str,
        base: &TypeRef,
        ns_context: Option<&NamespaceContext>,
    ) -> Result<()> {
        if base.is_qname_or_notation() && !base.is_list() {
            return self.validate_lexical_qname(lexical, ns_context);
        }
        if base.is_list() {
            return self.validate_list(lexical, base);
        }

        let variants = parse_variants(lexical, base);
        let (values, allowed) = self.allowed_variants(base);
        for (allowed_lexical, allowed_variants) in values.iter().zip(allowed.iter()) {
            if variants_match(&variants, allowed_variants, lexical, allowed_lexical) {
                return Ok(());
            }
        }
        Err(self.not_found(lexical))
    }

    /// QName membership: resolve the instance against the caller's
    /// context and each entry against its preserved context.
    pub fn validate_lexical_qname(
        &self,
        lexical: &str,
        ns_context: Option<&NamespaceContext>,
    ) -> Result<()> {
        let empty = NamespaceContext::new();
        let actual =
            parsers::parse_qname_value(lexical, ns_context.unwrap_or(&empty))?;
        let inner = self.lock();
        for (value, context) in inner.values.iter().zip(inner.contexts.iter()) {
            let entry_ctx = context.as_ref().unwrap_or(&empty);
            if let Ok(allowed) = parsers::parse_qname_value(value, entry_ctx) {
                if allowed == actual {
                    return Ok(());
                }
            }
        }
        drop(inner);
        Err(self.not_found(lexical))
    }

    fn validate_list(&self, lexical: &str, base: &TypeRef) -> Result<()> {
        let item_type = list_item_type(base);
        let actual_items = split_xml_whitespace(lexical);
        let inner = self.lock();
        'entries: for value in inner.values.iter() {
            let allowed_items = split_xml_whitespace(value);
            if allowed_items.len() != actual_items.len() {
                continue;
            }
            for (a, b) in actual_items.iter().zip(allowed_items.iter()) {
                if !list_items_equal(a, b, item_type.as_ref()) {
                    continue 'entries;
                }
            }
            return Ok(());
        }
        drop(inner);
        Err(self.not_found(lexical))
    }

    /// Parse every allowed lexical against the base, reusing the cache
    /// when the base has not changed since it was built.
    fn allowed_variants(&self, base: &TypeRef) -> (Vec<String>, Vec<Vec<XsdValue>>) {
        let base_name = base.qname();
        let mut inner = self.lock();
        if inner.cache_base.as_ref() == Some(&base_name) {
            if let Some(cache) = &inner.cache {
                return (inner.values.clone(), cache.clone());
            }
        }
        let parsed: Vec<Vec<XsdValue>> = inner
            .values
            .iter()
            .map(|v| parse_variants(v, base))
            .collect();
        inner.cache_base = Some(base_name);
        inner.cache = Some(parsed.clone());
        (inner.values.clone(), parsed)
    }

    fn not_found(&self, lexical: &str) -> Error {
        let values = self.values();
        let quoted: Vec<String> = values.iter().map(|v| format!("'{}'", v)).collect();
        FacetViolation::new(
            "enumeration",
            format!(
                "value '{}' is not in the allowed set [{}]",
                lexical,
                quoted.join(", ")
            ),
        )
        .into()
    }
}

/// All native values a lexical can take under a type: one for atomics,
/// one per successful member for unions, none for value-less families.
pub(crate) fn parse_variants(lexical: &str, t: &TypeRef) -> Vec<XsdValue> {
    match t {
        TypeRef::Builtin(b) => b.validate(lexical).ok().flatten().into_iter().collect(),
        TypeRef::Simple(s) => match s.variety() {
            Variety::Atomic => match s.primitive_type() {
                Some(p) => p.validate(lexical).ok().flatten().into_iter().collect(),
                None => Vec::new(),
            },
            Variety::Union => match s.identity_member_types() {
                Some(members) => members
                    .iter()
                    .flat_map(|m| parse_variants(lexical, m))
                    .collect(),
                None => Vec::new(),
            },
            // list values are compared item-wise, never as one variant
            Variety::List => Vec::new(),
        },
    }
}

fn variants_match(
    a: &[XsdValue],
    b: &[XsdValue],
    a_lexical: &str,
    b_lexical: &str,
) -> bool {
    if a.is_empty() && b.is_empty() {
        return a_lexical == b_lexical;
    }
    a.iter().any(|x| b.iter().any(|y| values_equal(x, y)))
}

/// The item type of a list-varietied type
pub(crate) fn list_item_type(base: &TypeRef) -> Option<TypeRef> {
    match base {
        TypeRef::Builtin(b) => builtins::builtin_list_item_type(b.name).map(TypeRef::Builtin),
        TypeRef::Simple(s) => s.identity_list_item_type(),
    }
}

fn list_items_equal(a: &str, b: &str, item_type: Option<&TypeRef>) -> bool {
    match item_type {
        Some(t) => variants_match(&parse_variants(a, t), &parse_variants(b, t), a, b),
        None => a == b,
    }
}

// =============================================================================
// Length family
// =============================================================================

/// Units-aware length of a lexical under a base type. Returns None for
/// QName/NOTATION bases, where the length facets are a no-op per the
/// XSD 1.0 erratum.
pub fn measured_length(lexical: &str, base: &TypeRef) -> Option<usize> {
    if base.is_list() {
        // a whitespace-only list value measures 0 items, not an error
        return Some(split_xml_whitespace(lexical).len());
    }
    if base.is_qname_or_notation() {
        return None;
    }
    match base.primitive_type().map(|p| p.name) {
        Some(builtins::XSD_HEX_BINARY) => Some(lexical.len() / 2),
        Some(builtins::XSD_BASE64_BINARY) => parsers::parse_base64_binary(lexical)
            .ok()
            .map(|octets| octets.len()),
        _ => Some(lexical.chars().count()),
    }
}

/// Exact length facet
#[derive(Debug, Clone)]
pub struct LengthFacet {
    pub value: usize,
}

impl LengthFacet {
    pub fn new(value: usize) -> Self {
        Self { value }
    }

    pub fn validate_lexical(&self, lexical: &str, base: &TypeRef) -> Result<()> {
        match measured_length(lexical, base) {
            Some(n) if n == self.value => Ok(()),
            None => Ok(()),
            Some(n) => Err(FacetViolation::new(
                "length",
                format!("expected length {}, got {}", self.value, n),
            )
            .into()),
        }
    }
}

/// Minimum length facet
#[derive(Debug, Clone)]
pub struct MinLengthFacet {
    pub value: usize,
}

impl MinLengthFacet {
    pub fn new(value: usize) -> Self {
        Self { value }
    }

    pub fn validate_lexical(&self, lexical: &str, base: &TypeRef) -> Result<()> {
        match measured_length(lexical, base) {
            Some(n) if n >= self.value => Ok(()),
            None => Ok(()),
            Some(n) => Err(FacetViolation::new(
                "minLength",
                format!("expected length >= {}, got {}", self.value, n),
            )
            .into()),
        }
    }
}

/// Maximum length facet
#[derive(Debug, Clone)]
pub struct MaxLengthFacet {
    pub value: usize,
}

impl MaxLengthFacet {
    pub fn new(value: usize) -> Self {
        Self { value }
    }

    pub fn validate_lexical(&self, lexical: &str, base: &TypeRef) -> Result<()> {
        match measured_length(lexical, base) {
            Some(n) if n <= self.value => Ok(()),
            None => Ok(()),
            Some(n) => Err(FacetViolation::new(
                "maxLength",
                format!("expected length <= {}, got {}", self.value, n),
            )
            .into()),
        }
    }
}

// =============================================================================
// Digits family
// =============================================================================

/// Maximum count of significant digits
#[derive(Debug, Clone)]
pub struct TotalDigitsFacet {
    pub value: usize,
}

impl TotalDigitsFacet {
    pub fn new(value: usize) -> Self {
        Self { value }
    }

    pub fn validate_lexical(&self, lexical: &str) -> Result<()> {
        // sign and decimal point are excluded from the count
        let digits = lexical.chars().filter(|c| c.is_ascii_digit()).count();
        if digits <= self.value {
            Ok(())
        } else {
            Err(FacetViolation::new(
                "totalDigits",
                format!("expected at most {} digits, got {}", self.value, digits),
            )
            .into())
        }
    }
}

/// Maximum count of fraction digits
#[derive(Debug, Clone)]
pub struct FractionDigitsFacet {
    pub value: usize,
}

impl FractionDigitsFacet {
    pub fn new(value: usize) -> Self {
        Self { value }
    }

    pub fn validate_lexical(&self, lexical: &str) -> Result<()> {
        let digits = match lexical.find('.') {
            Some(dot) => lexical[dot + 1..]
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .count(),
            None => 0,
        };
        if digits <= self.value {
            Ok(())
        } else {
            Err(FacetViolation::new(
                "fractionDigits",
                format!(
                    "expected at most {} fraction digits, got {}",
                    self.value, digits
                ),
            )
            .into())
        }
    }
}

// =============================================================================
// Range family
// =============================================================================

/// A range facet with its parsed bound. Built by the `ranges` factory,
/// which chooses the `Comparable` family from the base type.
#[derive(Debug, Clone)]
pub struct RangeFacet {
    /// Facet name: minInclusive, minExclusive, maxInclusive, maxExclusive
    pub name: &'static str,
    /// The bound as written in the schema
    pub lexical: String,
    /// The parsed bound
    pub bound: Comparable,
    /// Operator symbol for messages
    pub operator: &'static str,
    predicate: fn(Ordering) -> bool,
}

impl RangeFacet {
    pub fn new(
        name: &'static str,
        lexical: impl Into<String>,
        bound: Comparable,
        operator: &'static str,
        predicate: fn(Ordering) -> bool,
    ) -> Self {
        Self {
            name,
            lexical: lexical.into(),
            bound,
            operator,
            predicate,
        }
    }

    /// Compare a value against the bound. An indeterminate comparison
    /// is a violation, reported with the operator and bound, never a
    /// silent pass.
    pub fn validate(&self, value: &Comparable) -> Result<()> {
        match value.compare(&self.bound) {
            Ok(ord) if (self.predicate)(ord) => Ok(()),
            Ok(_) => Err(FacetViolation::new(
                self.name,
                format!("value {} must be {} {}", value, self.operator, self.lexical),
            )
            .into()),
            Err(Error::Indeterminate(_)) => Err(FacetViolation::new(
                self.name,
                format!(
                    "value {} must be {} {} but the comparison is indeterminate",
                    value, self.operator, self.lexical
                ),
            )
            .into()),
            Err(e) => Err(e),
        }
    }
}

// =============================================================================
// The facet sum
// =============================================================================

/// One constraining facet on a derivation step
#[derive(Debug)]
pub enum Facet {
    WhiteSpace(WhiteSpace),
    Pattern(PatternSet),
    Enumeration(Enumeration),
    Length(LengthFacet),
    MinLength(MinLengthFacet),
    MaxLength(MaxLengthFacet),
    TotalDigits(TotalDigitsFacet),
    FractionDigits(FractionDigitsFacet),
    Range(RangeFacet),
}

impl Facet {
    /// The schema name of this facet
    pub fn name(&self) -> &str {
        match self {
            Facet::WhiteSpace(_) => "whiteSpace",
            Facet::Pattern(_) => "pattern",
            Facet::Enumeration(_) => "enumeration",
            Facet::Length(_) => "length",
            Facet::MinLength(_) => "minLength",
            Facet::MaxLength(_) => "maxLength",
            Facet::TotalDigits(_) => "totalDigits",
            Facet::FractionDigits(_) => "fractionDigits",
            Facet::Range(r) => r.name,
        }
    }

    /// True for length, minLength, and maxLength
    pub fn is_length_facet(&self) -> bool {
        matches!(
            self,
            Facet::Length(_) | Facet::MinLength(_) | Facet::MaxLength(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::builtins::get_builtin;
    use num_bigint::BigInt;

    fn builtin_ref(name: &str) -> TypeRef {
        TypeRef::Builtin(get_builtin(name).unwrap())
    }

    #[test]
    fn test_whitespace_modes() {
        assert_eq!(WhiteSpace::Preserve.normalize(" a\tb "), " a\tb ");
        assert_eq!(WhiteSpace::Replace.normalize(" a\tb "), " a b ");
        assert_eq!(WhiteSpace::Collapse.normalize("  a\t\n b  "), "a b");
        assert_eq!(WhiteSpace::Collapse.normalize("   "), "");
    }

    #[test]
    fn test_whitespace_idempotent() {
        for policy in [WhiteSpace::Preserve, WhiteSpace::Replace, WhiteSpace::Collapse] {
            let once = policy.normalize(" a \t b\n c ");
            assert_eq!(policy.normalize(&once), once);
        }
    }

    #[test]
    fn test_whitespace_round_trip() {
        for s in ["preserve", "replace", "collapse"] {
            assert_eq!(WhiteSpace::from_str(s).unwrap().to_string(), s);
        }
        assert!(WhiteSpace::from_str("trim").is_err());
    }

    #[test]
    fn test_pattern_anchored() {
        let p = PatternFacet::new("[A-Z]{3}").unwrap();
        assert!(p.matches("ABC"));
        assert!(!p.matches("AB"));
        assert!(!p.matches("ABCD"));
        assert!(!p.matches("xABC"));
    }

    #[test]
    fn test_pattern_set_or_semantics() {
        let set = PatternSet::compile(&["[a-z]+", "[0-9]+"]).unwrap();
        assert!(set.validate_lexical("abc").is_ok());
        assert!(set.validate_lexical("123").is_ok());
        assert!(set.validate_lexical("a1").is_err());
        let err = set.validate_lexical("a1").unwrap_err();
        assert!(err.to_string().contains("pattern"));
    }

    #[test]
    fn test_enumeration_value_space() {
        let e = Enumeration::new();
        e.append("1.0", None).unwrap();
        e.append("2.5", None).unwrap();
        e.seal();
        let base = builtin_ref("decimal");
        // 1.000 equals 1.0 in value space
        assert!(e.validate_lexical("1.000", &base, None).is_ok());
        assert!(e.validate_lexical("2.50", &base, None).is_ok());
        assert!(e.validate_lexical("3", &base, None).is_err());
    }

    #[test]
    fn test_enumeration_append_after_seal() {
        let e = Enumeration::new();
        e.append("a", None).unwrap();
        e.seal();
        assert!(e.append("b", None).is_err());
    }

    #[test]
    fn test_enumeration_qname() {
        let mut entry_ctx = NamespaceContext::new();
        entry_ctx.add_prefix("a", "http://example.com");
        let e = Enumeration::new();
        e.append("a:name", Some(entry_ctx)).unwrap();
        e.seal();

        let mut use_ctx = NamespaceContext::new();
        use_ctx.add_prefix("b", "http://example.com");
        let base = builtin_ref("QName");
        // different prefix, same namespace
        assert!(e.validate_lexical("b:name", &base, Some(&use_ctx)).is_ok());
        let mut other_ctx = NamespaceContext::new();
        other_ctx.add_prefix("b", "http://other.com");
        assert!(e.validate_lexical("b:name", &base, Some(&other_ctx)).is_err());
    }

    #[test]
    fn test_length_units() {
        let s = builtin_ref("string");
        assert_eq!(measured_length("héllo", &s), Some(5));
        let hex = builtin_ref("hexBinary");
        assert_eq!(measured_length("0AFF", &hex), Some(2));
        let b64 = builtin_ref("base64Binary");
        assert_eq!(measured_length("SGVsbG8=", &b64), Some(5));
        let list = builtin_ref("NMTOKENS");
        assert_eq!(measured_length("a b c", &list), Some(3));
        assert_eq!(measured_length("", &list), Some(0));
        let q = builtin_ref("QName");
        assert_eq!(measured_length("p:x", &q), None);
    }

    #[test]
    fn test_length_facets() {
        let base = builtin_ref("string");
        assert!(LengthFacet::new(3).validate_lexical("abc", &base).is_ok());
        assert!(LengthFacet::new(3).validate_lexical("ab", &base).is_err());
        assert!(MinLengthFacet::new(2).validate_lexical("ab", &base).is_ok());
        assert!(MinLengthFacet::new(3).validate_lexical("ab", &base).is_err());
        assert!(MaxLengthFacet::new(2).validate_lexical("ab", &base).is_ok());
        assert!(MaxLengthFacet::new(1).validate_lexical("ab", &base).is_err());
    }

    #[test]
    fn test_length_noop_for_qname() {
        let base = builtin_ref("QName");
        assert!(LengthFacet::new(1).validate_lexical("p:verylong", &base).is_ok());
        assert!(MinLengthFacet::new(100).validate_lexical("p:x", &base).is_ok());
        assert!(MaxLengthFacet::new(0).validate_lexical("p:x", &base).is_ok());
    }

    #[test]
    fn test_digits() {
        assert!(TotalDigitsFacet::new(4).validate_lexical("-12.34").is_ok());
        assert!(TotalDigitsFacet::new(3).validate_lexical("-12.34").is_err());
        assert!(FractionDigitsFacet::new(2).validate_lexical("1.25").is_ok());
        assert!(FractionDigitsFacet::new(1).validate_lexical("1.25").is_err());
        assert!(FractionDigitsFacet::new(0).validate_lexical("125").is_ok());
    }

    #[test]
    fn test_range_facet() {
        let bound = Comparable::Dec("100".parse().unwrap());
        let facet = RangeFacet::new("maxExclusive", "100", bound, "<", |o| o == Ordering::Less);
        assert!(facet.validate(&Comparable::Int(BigInt::from(50))).is_ok());
        let err = facet
            .validate(&Comparable::Int(BigInt::from(100)))
            .unwrap_err();
        assert!(err.to_string().contains("value 100 must be < 100"));
        assert!(facet.validate(&Comparable::Int(BigInt::from(150))).is_err());
    }
}
