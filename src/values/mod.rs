//! The XSD value model
//!
//! Native value types for the 19 primitives, per-primitive lexical
//! parsers, the `TypedValue` pairing of lexical and native forms, and
//! the comparable bounds used by range facets.

pub mod comparable;
pub mod comparable_temporal;
pub mod decimal;
pub mod duration;
pub mod parsers;
pub mod temporal;
pub mod typed;

pub use comparable::Comparable;
pub use decimal::BigDecimal;
pub use duration::XsdDuration;
pub use temporal::XsdInstant;
pub use typed::{values_equal, TypedValue, XsdValue};
