//! The type system
//!
//! Built-in singletons, user-defined simple types, constraining facets,
//! and the validation entry points that tie them to the value model.

pub mod base;
pub mod builtins;
pub mod facets;
pub mod fundamental;
pub mod ranges;
pub mod simple_types;
pub mod validation;

pub use base::TypeRef;
pub use builtins::{get_builtin, get_builtin_ns, precompute_builtin_caches, BuiltinType};
pub use facets::{Enumeration, Facet, PatternFacet, PatternSet, RangeFacet, WhiteSpace};
pub use fundamental::{Cardinality, FundamentalFacets, Ordered};
pub use ranges::{
    new_max_exclusive, new_max_inclusive, new_min_exclusive, new_min_inclusive,
};
pub use simple_types::{Variety, XsdSimpleType};
pub use validation::{
    apply_whitespace, normalize_value, parse_value_for_type, precompute_simple_type_caches,
    validate_value_against_facets,
};
