//! # xsdtypes
//!
//! An XSD 1.0 simple type engine for Rust.
//!
//! This library implements the value-space machinery an XML Schema
//! validator embeds to decide whether a textual value conforms to a
//! declared simple type:
//!
//! - The 44 built-in simple types with their lexical parsers and
//!   whitespace policies
//! - User-defined simple types (restriction, list, union) with lazily
//!   computed derivation caches
//! - Constraining facets (pattern, enumeration, length family, digits
//!   family, range family) applied in value space
//! - XSD order relations, including the partial orders on `duration`
//!   and timezone-mixed temporals
//! - A translator from the XSD 1.0 regular expression dialect to the
//!   host `regex` engine
//!
//! Element and attribute declarations, content models, schema document
//! parsing, and XML readers are external collaborators and are out of
//! scope here.
//!
//! ## Example
//!
//! ```rust
//! use xsdtypes::types::{get_builtin, parse_value_for_type, TypeRef};
//!
//! let decimal = TypeRef::Builtin(get_builtin("decimal").unwrap());
//! let value = parse_value_for_type(" 1.000 ", &decimal).unwrap();
//! assert_eq!(value.lexical, "1.000");
//! ```

#![warn(clippy::all)]

// Foundation
pub mod error;

// Utilities
pub mod names;
pub mod namespaces;
pub mod occurs;

// Pattern dialect translation
pub mod xregex;

// Value model
pub mod values;

// Type system
pub mod types;

// Re-exports for convenience
pub use error::{Error, FacetViolation, Result};
pub use namespaces::QName;

/// Version of the xsdtypes library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// XSD 1.0 namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// XML namespace
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// XMLNS namespace
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";
