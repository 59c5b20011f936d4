//! Fundamental facets
//!
//! The four non-constraining properties of a value space: ordered,
//! bounded, cardinality, and numeric. They are fixed per primitive and
//! inherited through derivation, with the bounded integer subtypes
//! tightening bounded and cardinality.

/// The order property of a value space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordered {
    /// No order relation is defined
    None,
    /// A partial order (duration, the timezoned temporals, NaN floats)
    Partial,
    /// A total order
    Total,
}

/// The cardinality of a value space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Finite,
    CountablyInfinite,
    UncountablyInfinite,
}

/// The fundamental facets of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FundamentalFacets {
    pub ordered: Ordered,
    pub bounded: bool,
    pub cardinality: Cardinality,
    pub numeric: bool,
}

impl FundamentalFacets {
    pub const fn new(
        ordered: Ordered,
        bounded: bool,
        cardinality: Cardinality,
        numeric: bool,
    ) -> Self {
        Self {
            ordered,
            bounded,
            cardinality,
            numeric,
        }
    }

    /// True if the value space carries any order relation at all
    pub fn is_ordered(&self) -> bool {
        self.ordered != Ordered::None
    }
}

const UNORDERED: FundamentalFacets = FundamentalFacets::new(
    Ordered::None,
    false,
    Cardinality::CountablyInfinite,
    false,
);

/// Fundamental facets of a primitive type, by local name
pub fn for_primitive(local_name: &str) -> Option<FundamentalFacets> {
    use Cardinality::*;
    let f = match local_name {
        "string" | "hexBinary" | "base64Binary" | "anyURI" | "QName" | "NOTATION" => UNORDERED,
        "boolean" => FundamentalFacets::new(Ordered::None, false, Finite, false),
        "decimal" => FundamentalFacets::new(Ordered::Total, false, CountablyInfinite, true),
        "float" | "double" => FundamentalFacets::new(Ordered::Partial, true, Finite, true),
        "duration" | "dateTime" | "time" | "date" | "gYearMonth" | "gYear" | "gMonthDay"
        | "gDay" | "gMonth" => {
            FundamentalFacets::new(Ordered::Partial, false, CountablyInfinite, false)
        }
        _ => return None,
    };
    Some(f)
}

/// Per-type adjustment for derived built-ins whose value space is a
/// bounded slice of their primitive's (the fixed-width integers).
pub fn for_builtin(local_name: &str, primitive_local: &str) -> Option<FundamentalFacets> {
    let mut f = for_primitive(primitive_local)?;
    match local_name {
        "long" | "int" | "short" | "byte" | "unsignedLong" | "unsignedInt" | "unsignedShort"
        | "unsignedByte" => {
            f.bounded = true;
            f.cardinality = Cardinality::Finite;
        }
        _ => {}
    }
    Some(f)
}
