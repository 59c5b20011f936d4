//! Type references and derivation queries
//!
//! `TypeRef` is the two-variant sum over built-in singletons and
//! user-defined simple types. All capability questions (primitive,
//! fundamental facets, whitespace, lineage) dispatch exhaustively on
//! the tag; derivation queries walk resolved base chains with a
//! visited set so cyclic input graphs terminate.

use crate::namespaces::QName;
use crate::types::builtins::{self, BuiltinType, XSD_ANY_SIMPLE_TYPE};
use crate::types::facets::WhiteSpace;
use crate::types::fundamental::FundamentalFacets;
use crate::types::simple_types::{Variety, XsdSimpleType};
use std::collections::HashSet;
use std::sync::Arc;

/// A reference to any type the engine knows
#[derive(Debug, Clone)]
pub enum TypeRef {
    /// One of the built-in singletons
    Builtin(&'static BuiltinType),
    /// A user-defined or structural simple type
    Simple(Arc<XsdSimpleType>),
}

impl TypeRef {
    /// The qualified name
    pub fn qname(&self) -> QName {
        match self {
            TypeRef::Builtin(b) => b.qname(),
            TypeRef::Simple(s) => s.name.clone(),
        }
    }

    /// True for built-in singletons
    pub fn is_builtin(&self) -> bool {
        matches!(self, TypeRef::Builtin(_))
    }

    /// The base type, when one is known.
    ///
    /// A simple type's base is its restriction base; list and union
    /// types derive from `anySimpleType` directly.
    pub fn base_type(&self) -> Option<TypeRef> {
        match self {
            TypeRef::Builtin(b) => b.base().map(TypeRef::Builtin),
            TypeRef::Simple(s) => match s.variety() {
                Variety::Atomic => s.resolved_base(),
                Variety::List | Variety::Union => {
                    builtins::get_builtin(XSD_ANY_SIMPLE_TYPE).map(TypeRef::Builtin)
                }
            },
        }
    }

    /// The primitive this type reduces to
    pub fn primitive_type(&self) -> Option<&'static BuiltinType> {
        match self {
            TypeRef::Builtin(b) => b.primitive_type(),
            TypeRef::Simple(s) => s.primitive_type(),
        }
    }

    /// Fundamental facets, inherited from the primitive
    pub fn fundamental_facets(&self) -> Option<FundamentalFacets> {
        match self {
            TypeRef::Builtin(b) => b.fundamental_facets(),
            TypeRef::Simple(s) => s.fundamental_facets(),
        }
    }

    /// Whitespace policy
    pub fn white_space(&self) -> WhiteSpace {
        match self {
            TypeRef::Builtin(b) => b.white_space,
            TypeRef::Simple(s) => s.white_space(),
        }
    }

    /// True when this type or any base in its chain is QName or NOTATION
    pub fn is_qname_or_notation(&self) -> bool {
        match self {
            TypeRef::Builtin(b) => {
                let mut cur = Some(*b);
                while let Some(t) = cur {
                    if t.is_qname_or_notation() {
                        return true;
                    }
                    cur = t.base();
                }
                false
            }
            TypeRef::Simple(s) => s.is_qname_or_notation(),
        }
    }

    /// True for list-varietied types, built-in list types included
    pub fn is_list(&self) -> bool {
        match self {
            TypeRef::Builtin(b) => builtins::is_builtin_list_type(b.name),
            TypeRef::Simple(s) => s.variety() == Variety::List,
        }
    }

    pub(crate) fn identity_walk(&self, visiting: &mut HashSet<QName>) -> bool {
        match self {
            // every built-in value space supports identity comparison
            TypeRef::Builtin(_) => true,
            TypeRef::Simple(s) => s.identity_walk(visiting),
        }
    }

    pub(crate) fn primitive_walk(
        &self,
        visiting: &mut HashSet<QName>,
    ) -> Option<&'static BuiltinType> {
        match self {
            TypeRef::Builtin(b) => b.primitive_type(),
            TypeRef::Simple(s) => s.primitive_walk(visiting),
        }
    }

    pub(crate) fn qname_or_notation_walk(&self, visiting: &mut HashSet<QName>) -> bool {
        match self {
            TypeRef::Builtin(_) => self.is_qname_or_notation(),
            TypeRef::Simple(s) => s.qname_or_notation_walk(visiting),
        }
    }

    // =========================================================================
    // Derivation queries
    // =========================================================================

    /// True when `self` reaches `base` by walking base links.
    /// A type is derived from itself.
    pub fn is_derived_from(&self, base: &TypeRef) -> bool {
        let target = base.qname();
        let mut visited = HashSet::new();
        let mut cur = Some(self.clone());
        while let Some(t) = cur {
            let name = t.qname();
            if name == target {
                return true;
            }
            if !visited.insert(name) {
                // input cycle; nothing more to find
                return false;
            }
            cur = t.base_type();
        }
        false
    }

    /// `is_derived_from` extended with union-member equivalence: a type
    /// is validly derived from a union when it is validly derived from
    /// one of its members.
    pub fn is_validly_derived_from(&self, base: &TypeRef) -> bool {
        if self.is_derived_from(base) {
            return true;
        }
        if let TypeRef::Simple(s) = base {
            if s.variety() == Variety::Union {
                if let Some(members) = s.identity_member_types() {
                    return members.iter().any(|m| self.is_validly_derived_from(m));
                }
            }
        }
        false
    }

    /// The chain from this type up through its bases, self first.
    /// A cyclic input graph yields the prefix up to the repeat.
    pub fn derivation_chain(&self) -> Vec<TypeRef> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut cur = Some(self.clone());
        while let Some(t) = cur {
            if !visited.insert(t.qname()) {
                break;
            }
            cur = t.base_type();
            chain.push(t);
        }
        chain
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.qname() == other.qname()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::builtins::get_builtin;

    fn builtin(name: &str) -> TypeRef {
        TypeRef::Builtin(get_builtin(name).unwrap())
    }

    #[test]
    fn test_builtin_derivation() {
        assert!(builtin("byte").is_derived_from(&builtin("short")));
        assert!(builtin("byte").is_derived_from(&builtin("decimal")));
        assert!(builtin("byte").is_derived_from(&builtin("anySimpleType")));
        assert!(builtin("byte").is_derived_from(&builtin("byte")));
        assert!(!builtin("short").is_derived_from(&builtin("byte")));
        assert!(!builtin("byte").is_derived_from(&builtin("string")));
    }

    #[test]
    fn test_derivation_chain() {
        let chain = builtin("byte").derivation_chain();
        let names: Vec<String> = chain.iter().map(|t| t.qname().local_name.clone()).collect();
        assert_eq!(
            names,
            ["byte", "short", "int", "long", "integer", "decimal", "anySimpleType", "anyType"]
        );
    }

    #[test]
    fn test_qname_lineage() {
        assert!(builtin("QName").is_qname_or_notation());
        assert!(builtin("NOTATION").is_qname_or_notation());
        assert!(!builtin("string").is_qname_or_notation());
    }

    #[test]
    fn test_is_list() {
        assert!(builtin("NMTOKENS").is_list());
        assert!(!builtin("NMTOKEN").is_list());
    }
}
