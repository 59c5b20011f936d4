//! XML name validation and utilities
//!
//! Character tables for XML 1.0 names (NameStartChar / NameChar) and
//! checks for Name, NCName, NMTOKEN, and lexical QNames. The same
//! tables back the `\i`/`\c` escapes of the XSD pattern dialect, so the
//! class bodies are also exported as regex fragments.

use crate::error::{Error, Result};

/// Regex character-class body for XML NameStartChar (the `\i` escape).
///
/// Intended for interpolation inside `[...]` of the host regex.
pub const NAME_START_CHAR_CLASS: &str = ":A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}\u{F8}-\u{2FF}\u{370}-\u{37D}\u{37F}-\u{1FFF}\u{200C}-\u{200D}\u{2070}-\u{218F}\u{2C00}-\u{2FEF}\u{3001}-\u{D7FF}\u{F900}-\u{FDCF}\u{FDF0}-\u{FFFD}\u{10000}-\u{EFFFF}";

/// Regex character-class body for XML NameChar (the `\c` escape).
pub const NAME_CHAR_CLASS: &str = "\\-.0-9:A-Z_a-z\u{B7}\u{C0}-\u{D6}\u{D8}-\u{F6}\u{F8}-\u{37D}\u{37F}-\u{1FFF}\u{200C}-\u{200D}\u{203F}-\u{2040}\u{2070}-\u{218F}\u{2C00}-\u{2FEF}\u{3001}-\u{D7FF}\u{F900}-\u{FDCF}\u{FDF0}-\u{FFFD}\u{10000}-\u{EFFFF}";

/// True for XML 1.0 NameStartChar (colon included)
pub fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | '_'
        | 'A'..='Z' | 'a'..='z'
        | '\u{C0}'..='\u{D6}' | '\u{D8}'..='\u{F6}' | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}' | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}' | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}' | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}' | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

/// True for XML 1.0 NameChar (colon included)
pub fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}'
            | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}')
}

/// Check if a string is a valid XML Name
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if is_name_start_char(c) => chars.all(is_name_char),
        _ => false,
    }
}

/// Check if a string is a valid NCName (non-colonized name)
pub fn is_valid_ncname(name: &str) -> bool {
    !name.contains(':') && is_valid_name(name)
}

/// Check if a string is a valid NMTOKEN (one or more NameChars)
pub fn is_valid_nmtoken(name: &str) -> bool {
    !name.is_empty() && name.chars().all(is_name_char)
}

/// Check if a string is a valid lexical QName (`NCName` or `NCName:NCName`)
pub fn is_valid_qname(name: &str) -> bool {
    if let Some((prefix, local)) = name.split_once(':') {
        is_valid_ncname(prefix) && is_valid_ncname(local)
    } else {
        is_valid_ncname(name)
    }
}

/// Validate an NCName and return an error if invalid
pub fn validate_ncname(name: &str) -> Result<()> {
    if is_valid_ncname(name) {
        Ok(())
    } else {
        Err(Error::lexical("NCName", name))
    }
}

/// Validate a lexical QName and return an error if invalid
pub fn validate_qname(name: &str) -> Result<()> {
    if is_valid_qname(name) {
        Ok(())
    } else {
        Err(Error::lexical("QName", name))
    }
}

/// Split a QName into prefix and local name
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    match qname.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, qname),
    }
}
