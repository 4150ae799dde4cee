//! The per-method association map binding IR entities to the nodes
//! produced for them.
//!
//! The AST pass populates the map; the CFG and PDG passes and the
//! containment sweep read it. Keys are id handles, so equality is the
//! allocation identity of the IR entity, never structural equality.
//! The order of the nodes recorded under a key is meaningful: several
//! rules require a statement's primary node at index 0.

use std::collections::BTreeMap;

use crate::{
    cpg::NodeId,
    jimple::{LocalId, StmtId, ValueId},
};

/// An identity key for an IR entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, derive_more::From)]
pub enum AssocKey {
    /// A statement.
    Stmt(StmtId),
    /// A value.
    Value(ValueId),
    /// A local variable.
    Local(LocalId),
}

/// Maps IR entities to the ordered list of nodes produced for them.
#[derive(Debug, Default)]
pub struct AssociationMap {
    inner: BTreeMap<AssocKey, Vec<NodeId>>,
}

impl AssociationMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends nodes to the entry of a key, creating the entry if absent.
    pub fn append<K, I>(&mut self, key: K, nodes: I)
    where
        K: Into<AssocKey>,
        I: IntoIterator<Item = NodeId>,
    {
        self.inner.entry(key.into()).or_default().extend(nodes);
    }

    /// Inserts nodes at a position within the entry of a key.
    ///
    /// If no entry exists yet, this is equivalent to [`append`](Self::append);
    /// a position past the end appends.
    pub fn insert_at<K, I>(&mut self, key: K, nodes: I, at: usize)
    where
        K: Into<AssocKey>,
        I: IntoIterator<Item = NodeId>,
    {
        let entry = self.inner.entry(key.into()).or_default();
        let at = at.min(entry.len());
        entry.splice(at..at, nodes);
    }

    /// The nodes recorded for a key; empty if absent.
    #[must_use]
    pub fn get<K: Into<AssocKey>>(&self, key: K) -> &[NodeId] {
        self.inner
            .get(&key.into())
            .map_or(&[], Vec::as_slice)
    }

    /// Iterates all entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (AssocKey, &[NodeId])> {
        self.inner.iter().map(|(key, nodes)| (*key, nodes.as_slice()))
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.inner.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u32) -> NodeId {
        NodeId::from(id)
    }

    #[test]
    fn append_concatenates() {
        let mut map = AssociationMap::new();
        let key = StmtId::from(0);
        map.append(key, [node(1), node(2)]);
        map.append(key, [node(3)]);
        assert_eq!(map.get(key), &[node(1), node(2), node(3)]);
    }

    #[test]
    fn insert_places_primary_node_first() {
        let mut map = AssociationMap::new();
        let key = StmtId::from(4);
        map.append(key, [node(7), node(8)]);
        map.insert_at(key, [node(5)], 0);
        assert_eq!(map.get(key), &[node(5), node(7), node(8)]);
    }

    #[test]
    fn insert_into_absent_entry_appends() {
        let mut map = AssociationMap::new();
        let key = ValueId::from(2);
        map.insert_at(key, [node(9)], 0);
        assert_eq!(map.get(key), &[node(9)]);
    }

    #[test]
    fn keys_are_distinct_per_entity_kind() {
        let mut map = AssociationMap::new();
        map.append(StmtId::from(1), [node(1)]);
        map.append(ValueId::from(1), [node(2)]);
        map.append(LocalId::from(1), [node(3)]);
        assert_eq!(map.get(StmtId::from(1)), &[node(1)]);
        assert_eq!(map.get(ValueId::from(1)), &[node(2)]);
        assert_eq!(map.get(LocalId::from(1)), &[node(3)]);
        assert_eq!(map.iter().count(), 3);
    }

    #[test]
    fn get_missing_is_empty() {
        let map = AssociationMap::new();
        assert!(map.get(StmtId::from(9)).is_empty());
    }

    #[test]
    fn clear_drops_everything() {
        let mut map = AssociationMap::new();
        map.append(StmtId::from(0), [node(1)]);
        map.clear();
        assert!(map.get(StmtId::from(0)).is_empty());
        assert_eq!(map.iter().count(), 0);
    }
}
