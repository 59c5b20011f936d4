//! XML namespace handling
//!
//! Qualified names (QNames) and namespace prefix mappings. A `QName`
//! compares structurally; the empty namespace and the XSD namespace are
//! distinct values.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fmt;

/// XML Namespace URI
pub type NamespaceUri = String;

/// Namespace prefix
pub type Prefix = String;

/// Qualified name (QName) - combination of namespace and local name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace URI (None for no namespace)
    pub namespace: Option<NamespaceUri>,
    /// Local name
    pub local_name: String,
}

impl QName {
    /// Create a new QName
    pub fn new(namespace: Option<impl Into<String>>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(|s| s.into()),
            local_name: local_name.into(),
        }
    }

    /// Create a QName without a namespace
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_name: local_name.into(),
        }
    }

    /// Create a QName with a namespace
    pub fn namespaced(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local_name: local_name.into(),
        }
    }

    /// Create a QName in the XSD namespace
    pub fn xsd(local_name: impl Into<String>) -> Self {
        Self::namespaced(crate::XSD_NAMESPACE, local_name)
    }

    /// True if this name lives in the XSD namespace
    pub fn is_xsd(&self) -> bool {
        self.namespace.as_deref() == Some(crate::XSD_NAMESPACE)
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => write!(f, "{}", self.local_name),
        }
    }
}

/// Namespace context for resolving prefixes
#[derive(Debug, Clone, Default)]
pub struct NamespaceContext {
    /// Mapping from prefix to namespace URI
    prefixes: HashMap<Prefix, NamespaceUri>,
    /// Default namespace (no prefix)
    default_namespace: Option<NamespaceUri>,
}

impl NamespaceContext {
    /// Create a new empty namespace context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a namespace prefix mapping
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Set the default namespace
    pub fn set_default_namespace(&mut self, namespace: impl Into<String>) {
        self.default_namespace = Some(namespace.into());
    }

    /// Get the namespace for a prefix
    pub fn get_namespace(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(|s| s.as_str())
    }

    /// Get the default namespace
    pub fn get_default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// Resolve a prefixed name to a QName
    ///
    /// An unprefixed name takes the default namespace. An unknown prefix
    /// is an error.
    pub fn resolve(&self, prefixed_name: &str) -> Result<QName> {
        if let Some((prefix, local)) = prefixed_name.split_once(':') {
            let namespace = self
                .get_namespace(prefix)
                .ok_or_else(|| Error::Value(format!("unknown namespace prefix: {}", prefix)))?;
            Ok(QName::namespaced(namespace, local))
        } else {
            Ok(QName::new(self.default_namespace.clone(), prefixed_name))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qname_creation() {
        let qname = QName::namespaced("http://example.com", "element");
        assert_eq!(qname.namespace, Some("http://example.com".to_string()));
        assert_eq!(qname.local_name, "element");
    }

    #[test]
    fn test_qname_display() {
        let qname = QName::namespaced("http://example.com", "element");
        assert_eq!(qname.to_string(), "{http://example.com}element");

        let qname_local = QName::local("element");
        assert_eq!(qname_local.to_string(), "element");
    }

    #[test]
    fn test_qname_structural_equality() {
        assert_eq!(QName::xsd("decimal"), QName::xsd("decimal"));
        assert_ne!(QName::xsd("decimal"), QName::local("decimal"));
    }

    #[test]
    fn test_namespace_context() {
        let mut ctx = NamespaceContext::new();
        ctx.add_prefix("xs", crate::XSD_NAMESPACE);
        ctx.set_default_namespace("http://example.com");

        assert_eq!(ctx.get_namespace("xs"), Some(crate::XSD_NAMESPACE));
        assert_eq!(ctx.get_default_namespace(), Some("http://example.com"));
    }

    #[test]
    fn test_resolve_prefixed_name() {
        let mut ctx = NamespaceContext::new();
        ctx.add_prefix("xs", crate::XSD_NAMESPACE);

        let qname = ctx.resolve("xs:element").unwrap();
        assert_eq!(qname, QName::xsd("element"));

        assert!(ctx.resolve("unknown:element").is_err());
    }

    #[test]
    fn test_resolve_unprefixed_without_default() {
        let ctx = NamespaceContext::new();
        let qname = ctx.resolve("element").unwrap();
        assert_eq!(qname, QName::local("element"));
    }
}
