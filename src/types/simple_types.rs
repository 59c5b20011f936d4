//! User-defined simple types
//!
//! An `XsdSimpleType` is built during schema load, has its resolved
//! base/item/member pointers attached, and is then sealed. After
//! sealing it is read-only apart from its cache block: one mutex plus
//! condition variable guards four lazily computed answers (primitive
//! type, fundamental facets, QName/NOTATION lineage, identity
//! normalizability), each computed exactly once even under concurrent
//! first lookups. Cyclic reference graphs are tolerated by every walk
//! and the cycle outcome is cached like any other.

use crate::error::{Error, Result};
use crate::namespaces::{NamespaceContext, QName};
use crate::types::base::TypeRef;
use crate::types::builtins::{self, BuiltinType};
use crate::types::facets::{Facet, WhiteSpace};
use crate::types::fundamental::FundamentalFacets;
use once_cell::sync::OnceCell;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Condvar, Mutex, PoisonError};

/// The variety of a simple type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variety {
    Atomic,
    List,
    Union,
}

/// Restriction descriptor: base type plus constraining facets
#[derive(Debug)]
pub struct RestrictionDesc {
    /// QName of the base type
    pub base_name: QName,
    base: OnceCell<TypeRef>,
    /// Constraining facets of this derivation step, in schema order
    pub facets: Vec<Facet>,
    /// Prefix context the facet lexicals were written in
    pub ns_context: NamespaceContext,
}

/// List descriptor: the item type
#[derive(Debug)]
pub struct ListDesc {
    pub item_name: QName,
    item: OnceCell<TypeRef>,
}

/// Union descriptor: the member types
#[derive(Debug)]
pub struct UnionDesc {
    pub member_names: Vec<QName>,
    members: OnceCell<Vec<TypeRef>>,
}

/// One lazily computed cache slot
#[derive(Debug, Clone)]
enum CacheSlot<T> {
    Empty,
    Computing,
    Ready(T),
}

#[derive(Debug)]
struct CacheBlock {
    primitive: CacheSlot<Option<&'static BuiltinType>>,
    fundamental: CacheSlot<Option<FundamentalFacets>>,
    qname_or_notation: CacheSlot<bool>,
    identity: CacheSlot<bool>,
}

impl CacheBlock {
    fn new() -> Self {
        Self {
            primitive: CacheSlot::Empty,
            fundamental: CacheSlot::Empty,
            qname_or_notation: CacheSlot::Empty,
            identity: CacheSlot::Empty,
        }
    }
}

/// A user-defined or structural simple type
#[derive(Debug)]
pub struct XsdSimpleType {
    /// Qualified name
    pub name: QName,
    variety: Variety,
    restriction: Option<RestrictionDesc>,
    list: Option<ListDesc>,
    union: Option<UnionDesc>,
    caches: Mutex<CacheBlock>,
    cache_ready: Condvar,
    sealed: AtomicBool,
}

impl XsdSimpleType {
    /// An atomic type derived by restriction
    pub fn atomic(
        name: QName,
        base_name: QName,
        facets: Vec<Facet>,
        ns_context: NamespaceContext,
    ) -> Self {
        Self {
            name,
            variety: Variety::Atomic,
            restriction: Some(RestrictionDesc {
                base_name,
                base: OnceCell::new(),
                facets,
                ns_context,
            }),
            list: None,
            union: None,
            caches: Mutex::new(CacheBlock::new()),
            cache_ready: Condvar::new(),
            sealed: AtomicBool::new(false),
        }
    }

    /// A list type over the given item type
    pub fn list(name: QName, item_name: QName) -> Self {
        Self {
            name,
            variety: Variety::List,
            restriction: None,
            list: Some(ListDesc {
                item_name,
                item: OnceCell::new(),
            }),
            union: None,
            caches: Mutex::new(CacheBlock::new()),
            cache_ready: Condvar::new(),
            sealed: AtomicBool::new(false),
        }
    }

    /// A union type over the given member types
    pub fn union(name: QName, member_names: Vec<QName>) -> Self {
        Self {
            name,
            variety: Variety::Union,
            restriction: None,
            list: None,
            union: Some(UnionDesc {
                member_names,
                members: OnceCell::new(),
            }),
            caches: Mutex::new(CacheBlock::new()),
            cache_ready: Condvar::new(),
            sealed: AtomicBool::new(false),
        }
    }

    // =========================================================================
    // Load-time resolution
    // =========================================================================

    fn check_unsealed(&self) -> Result<()> {
        if self.sealed.load(AtomicOrdering::Acquire) {
            return Err(Error::Type(format!(
                "simple type {} is sealed",
                self.name
            )));
        }
        Ok(())
    }

    /// Attach the resolved restriction base
    pub fn resolve_base(&self, base: TypeRef) -> Result<()> {
        self.check_unsealed()?;
        let desc = self
            .restriction
            .as_ref()
            .ok_or_else(|| Error::Type(format!("{} has no restriction", self.name)))?;
        desc.base
            .set(base)
            .map_err(|_| Error::Type(format!("base of {} already resolved", self.name)))
    }

    /// Attach the resolved list item type
    pub fn resolve_item(&self, item: TypeRef) -> Result<()> {
        self.check_unsealed()?;
        let desc = self
            .list
            .as_ref()
            .ok_or_else(|| Error::Type(format!("{} is not a list", self.name)))?;
        desc.item
            .set(item)
            .map_err(|_| Error::Type(format!("item of {} already resolved", self.name)))
    }

    /// Attach the resolved union member types
    pub fn resolve_members(&self, members: Vec<TypeRef>) -> Result<()> {
        self.check_unsealed()?;
        let desc = self
            .union
            .as_ref()
            .ok_or_else(|| Error::Type(format!("{} is not a union", self.name)))?;
        desc.members
            .set(members)
            .map_err(|_| Error::Type(format!("members of {} already resolved", self.name)))
    }

    /// End the load phase; resolution setters fail afterwards
    pub fn seal(&self) {
        self.sealed.store(true, AtomicOrdering::Release);
    }

    // =========================================================================
    // Read surface
    // =========================================================================

    pub fn variety(&self) -> Variety {
        self.variety
    }

    /// The constraining facets of this derivation step
    pub fn facets(&self) -> &[Facet] {
        self.restriction
            .as_ref()
            .map(|r| r.facets.as_slice())
            .unwrap_or(&[])
    }

    /// The prefix context facet lexicals were written in
    pub fn ns_context(&self) -> Option<&NamespaceContext> {
        self.restriction.as_ref().map(|r| &r.ns_context)
    }

    /// The resolved restriction base, falling back to a built-in
    /// lookup when the base QName is in the XSD namespace
    pub fn resolved_base(&self) -> Option<TypeRef> {
        let desc = self.restriction.as_ref()?;
        if let Some(base) = desc.base.get() {
            return Some(base.clone());
        }
        builtins::get_builtin_qname(&desc.base_name).map(TypeRef::Builtin)
    }

    /// The resolved list item type, with the same built-in fallback
    pub fn resolved_item(&self) -> Option<TypeRef> {
        let desc = self.list.as_ref()?;
        if let Some(item) = desc.item.get() {
            return Some(item.clone());
        }
        builtins::get_builtin_qname(&desc.item_name).map(TypeRef::Builtin)
    }

    /// The resolved union members, with the same built-in fallback
    pub fn resolved_members(&self) -> Option<Vec<TypeRef>> {
        let desc = self.union.as_ref()?;
        if let Some(members) = desc.members.get() {
            return Some(members.clone());
        }
        let fallback: Vec<TypeRef> = desc
            .member_names
            .iter()
            .filter_map(|n| builtins::get_builtin_qname(n).map(TypeRef::Builtin))
            .collect();
        if fallback.is_empty() {
            None
        } else {
            Some(fallback)
        }
    }

    /// Whitespace policy: an explicit whiteSpace facet wins, otherwise
    /// the base's policy; list and union values always collapse.
    pub fn white_space(&self) -> WhiteSpace {
        match self.variety {
            Variety::List | Variety::Union => WhiteSpace::Collapse,
            Variety::Atomic => {
                for facet in self.facets() {
                    if let Facet::WhiteSpace(ws) = facet {
                        return *ws;
                    }
                }
                self.resolved_base()
                    .map(|b| b.white_space())
                    .unwrap_or(WhiteSpace::Preserve)
            }
        }
    }

    // =========================================================================
    // Cache-backed queries
    // =========================================================================

    /// Exactly-once computation of one cache slot. A thread that finds
    /// the slot already being computed waits on the condvar instead of
    /// starting a second computation. The compute closure runs without
    /// the lock held, so walks may recurse through other types.
    fn cached<T: Clone>(
        &self,
        slot: impl Fn(&mut CacheBlock) -> &mut CacheSlot<T>,
        compute: impl FnOnce() -> T,
    ) -> T {
        let mut guard = self.caches.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            match slot(&mut guard) {
                CacheSlot::Ready(v) => return v.clone(),
                CacheSlot::Computing => {
                    guard = self
                        .cache_ready
                        .wait(guard)
                        .unwrap_or_else(PoisonError::into_inner);
                }
                CacheSlot::Empty => {
                    *slot(&mut guard) = CacheSlot::Computing;
                    break;
                }
            }
        }
        drop(guard);
        let value = compute();
        let mut guard = self.caches.lock().unwrap_or_else(PoisonError::into_inner);
        *slot(&mut guard) = CacheSlot::Ready(value.clone());
        drop(guard);
        self.cache_ready.notify_all();
        value
    }

    /// The primitive this type reduces to, or None for unresolvable or
    /// cyclic graphs and mixed-primitive unions
    pub fn primitive_type(&self) -> Option<&'static BuiltinType> {
        self.cached(
            |c| &mut c.primitive,
            || self.primitive_walk(&mut HashSet::new()),
        )
    }

    pub(crate) fn primitive_walk(
        &self,
        visiting: &mut HashSet<QName>,
    ) -> Option<&'static BuiltinType> {
        if !visiting.insert(self.name.clone()) {
            return None;
        }
        let result = match self.variety {
            Variety::Atomic => self
                .resolved_base()
                .and_then(|b| b.primitive_walk(visiting)),
            Variety::List => self
                .resolved_item()
                .and_then(|i| i.primitive_walk(visiting)),
            Variety::Union => {
                let members = self.resolved_members()?;
                let mut common: Option<&'static BuiltinType> = None;
                for m in &members {
                    let p = m.primitive_walk(visiting)?;
                    match common {
                        None => common = Some(p),
                        Some(c) if c.name == p.name => {}
                        Some(_) => return None,
                    }
                }
                common
            }
        };
        visiting.remove(&self.name);
        result
    }

    /// Fundamental facets, inherited from the primitive
    pub fn fundamental_facets(&self) -> Option<FundamentalFacets> {
        self.cached(
            |c| &mut c.fundamental,
            || self.primitive_type().and_then(|p| p.fundamental_facets()),
        )
    }

    /// True when this type or any base in its chain is QName or NOTATION
    pub fn is_qname_or_notation(&self) -> bool {
        self.cached(
            |c| &mut c.qname_or_notation,
            || self.qname_or_notation_walk(&mut HashSet::new()),
        )
    }

    pub(crate) fn qname_or_notation_walk(&self, visiting: &mut HashSet<QName>) -> bool {
        if !visiting.insert(self.name.clone()) {
            return false;
        }
        let result = match self.variety {
            Variety::Atomic => self
                .resolved_base()
                .map(|b| b.qname_or_notation_walk(visiting))
                .unwrap_or(false),
            Variety::List | Variety::Union => false,
        };
        visiting.remove(&self.name);
        result
    }

    /// Whether value-space identity comparison is well-defined on this
    /// type: atomics always are, a list is iff its item is, a union is
    /// iff at least one member is. Cycles resolve to false and the
    /// outcome is cached.
    pub fn identity_normalizable(&self) -> bool {
        self.cached(
            |c| &mut c.identity,
            || self.identity_walk(&mut HashSet::new()),
        )
    }

    pub(crate) fn identity_walk(&self, visiting: &mut HashSet<QName>) -> bool {
        if !visiting.insert(self.name.clone()) {
            return false;
        }
        let result = match self.variety {
            Variety::Atomic => true,
            Variety::List => self
                .resolved_item()
                .map(|i| i.identity_walk(visiting))
                .unwrap_or(false),
            Variety::Union => match self.resolved_members() {
                Some(members) => members.iter().any(|m| m.identity_walk(visiting)),
                None => false,
            },
        };
        visiting.remove(&self.name);
        result
    }

    /// The item type identity constraints should compare with, for
    /// list-varietied types
    pub fn identity_list_item_type(&self) -> Option<TypeRef> {
        if self.variety != Variety::List {
            return None;
        }
        self.resolved_item()
    }

    /// The member types identity constraints should try, for
    /// union-varietied types
    pub fn identity_member_types(&self) -> Option<Vec<TypeRef>> {
        if self.variety != Variety::Union {
            return None;
        }
        self.resolved_members()
    }

    /// True once the identity cache holds a result and no slot is mid-
    /// computation. Used to observe the exactly-once guarantee.
    pub fn identity_cache_is_ready(&self) -> bool {
        let mut guard = self.caches.lock().unwrap_or_else(PoisonError::into_inner);
        matches!(&mut guard.identity, CacheSlot::Ready(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::builtins::get_builtin;
    use std::sync::Arc;

    fn builtin_ref(name: &str) -> TypeRef {
        TypeRef::Builtin(get_builtin(name).unwrap())
    }

    #[test]
    fn test_atomic_primitive_via_builtin_base() {
        let t = XsdSimpleType::atomic(
            QName::local("myInt"),
            QName::xsd("int"),
            vec![],
            NamespaceContext::new(),
        );
        assert_eq!(t.primitive_type().unwrap().name, "decimal");
        assert_eq!(t.fundamental_facets().unwrap().numeric, true);
    }

    #[test]
    fn test_chained_user_types() {
        let parent = Arc::new(XsdSimpleType::atomic(
            QName::local("parent"),
            QName::xsd("token"),
            vec![],
            NamespaceContext::new(),
        ));
        let child = XsdSimpleType::atomic(
            QName::local("child"),
            QName::local("parent"),
            vec![],
            NamespaceContext::new(),
        );
        child.resolve_base(TypeRef::Simple(parent)).unwrap();
        child.seal();
        assert_eq!(child.primitive_type().unwrap().name, "string");
        assert_eq!(child.white_space(), WhiteSpace::Collapse);
    }

    #[test]
    fn test_list_primitive() {
        let t = XsdSimpleType::list(QName::local("ints"), QName::xsd("integer"));
        assert_eq!(t.primitive_type().unwrap().name, "decimal");
        assert!(t.identity_normalizable());
        assert_eq!(t.white_space(), WhiteSpace::Collapse);
    }

    #[test]
    fn test_union_common_primitive() {
        let t = XsdSimpleType::union(
            QName::local("nums"),
            vec![QName::xsd("int"), QName::xsd("integer")],
        );
        assert_eq!(t.primitive_type().unwrap().name, "decimal");

        let mixed = XsdSimpleType::union(
            QName::local("mixed"),
            vec![QName::xsd("int"), QName::xsd("string")],
        );
        assert!(mixed.primitive_type().is_none());
    }

    #[test]
    fn test_self_referential_union() {
        let a = Arc::new(XsdSimpleType::union(
            QName::local("A"),
            vec![QName::local("A")],
        ));
        a.resolve_members(vec![TypeRef::Simple(a.clone())]).unwrap();
        a.seal();
        assert!(!a.identity_normalizable());
        // second call answers from the cache
        assert!(!a.identity_normalizable());
        assert!(a.identity_cache_is_ready());
        assert!(a.primitive_type().is_none());
    }

    #[test]
    fn test_seal_blocks_resolution() {
        let t = XsdSimpleType::list(QName::local("ints"), QName::xsd("integer"));
        t.seal();
        assert!(t.resolve_item(builtin_ref("integer")).is_err());
    }

    #[test]
    fn test_qname_lineage_through_user_type() {
        let t = XsdSimpleType::atomic(
            QName::local("myQName"),
            QName::xsd("QName"),
            vec![],
            NamespaceContext::new(),
        );
        assert!(t.is_qname_or_notation());
        let s = XsdSimpleType::atomic(
            QName::local("myStr"),
            QName::xsd("string"),
            vec![],
            NamespaceContext::new(),
        );
        assert!(!s.is_qname_or_notation());
    }
}
