//! Error types for xsdtypes
//!
//! This module defines all error types used throughout the library.
//! Each variant of [`Error`] is a fixed tag; detail goes into the
//! variant's fields, never into specialized tags.

use std::fmt;
use thiserror::Error;

/// Result type alias using the xsdtypes Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for xsdtypes operations
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// A lexical parser rejected the input
    #[error("'{value}' is not a valid lexical form of xs:{type_name}")]
    LexicalInvalid {
        /// Target type local name
        type_name: String,
        /// The offending lexical
        value: String,
    },

    /// Lexical is valid but outside the numeric range of a bounded type
    #[error("value '{value}' is out of range for xs:{type_name} ({bound})")]
    OutOfRange {
        /// Target type local name
        type_name: String,
        /// The offending lexical
        value: String,
        /// Human-readable description of the violated bound
        bound: String,
    },

    /// A constraining facet rejected the value
    #[error("facet violation: {0}")]
    Facet(#[from] FacetViolation),

    /// An XSD pattern is syntactically invalid
    #[error("invalid XSD pattern: {0}")]
    PatternSyntax(String),

    /// An XSD pattern uses a feature the host regex engine cannot express
    #[error("XSD pattern not expressible in host regex: {0}")]
    PatternUnsupported(String),

    /// A partial-order comparison could not decide
    #[error("indeterminate comparison: {0}")]
    Indeterminate(String),

    /// A base/item/member pointer was not resolved before a query needed it
    #[error("unresolved type reference: {0}")]
    UnresolvedType(String),

    /// Value error (invalid value for a context)
    #[error("value error: {0}")]
    Value(String),

    /// Type error (unknown or inapplicable type)
    #[error("type error: {0}")]
    Type(String),
}

impl Error {
    /// Build a `LexicalInvalid` error
    pub fn lexical(type_name: impl Into<String>, value: impl Into<String>) -> Self {
        Error::LexicalInvalid {
            type_name: type_name.into(),
            value: value.into(),
        }
    }

    /// Build an `OutOfRange` error
    pub fn out_of_range(
        type_name: impl Into<String>,
        value: impl Into<String>,
        bound: impl Into<String>,
    ) -> Self {
        Error::OutOfRange {
            type_name: type_name.into(),
            value: value.into(),
            bound: bound.into(),
        }
    }

    /// True if this error is the "defer to schema validation" sentinel
    /// raised when a range facet is constructed against an unresolved base.
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Error::UnresolvedType(_))
    }
}

/// A constraining-facet failure with the facet name and detail
#[derive(Debug, Clone)]
pub struct FacetViolation {
    /// Facet name (e.g. `pattern`, `enumeration`, `maxExclusive`)
    pub facet: String,
    /// Human-readable detail of the violation
    pub detail: String,
}

impl FacetViolation {
    /// Create a new facet violation
    pub fn new(facet: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            facet: facet.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for FacetViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.facet, self.detail)
    }
}

impl std::error::Error for FacetViolation {}
