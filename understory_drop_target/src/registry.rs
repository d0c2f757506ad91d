// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bookkeeping of visual nodes that currently take part in drag and drop.
//!
//! The rendering layer registers a node when it mounts and unregisters it when
//! it unmounts. Both calls are idempotent. Geometry and ancestry are supplied
//! as callbacks so they are always read fresh at query time; the registry never
//! caches a rectangle.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;
use core::hash::Hash;

use hashbrown::HashMap;
use kurbo::Rect;

use crate::types::{Ancestry, DropPositions, NodeKind, PayloadKinds};

/// Returns a node's current bounds in the shared pointer coordinate space.
pub type BoundsFn = Box<dyn Fn() -> Rect>;

/// Returns a node's current ancestor chain, ordered root → parent.
pub type AncestryFn<K> = Box<dyn Fn() -> Ancestry<K>>;

/// A visual node's participation in drag and drop.
pub struct Registration<K, C> {
    /// Node identifier, shared with the component tree.
    pub id: K,
    /// Container tree the node belongs to.
    pub container: C,
    /// Whether the node may hold children.
    pub kind: NodeKind,
    /// Payload kinds this node accepts as a drop target.
    pub accepts: PayloadKinds,
    /// Positions this node allows relative to itself.
    pub positions: DropPositions,
    bounds: BoundsFn,
    ancestry: AncestryFn<K>,
}

impl<K: fmt::Debug, C: fmt::Debug> fmt::Debug for Registration<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("container", &self.container)
            .field("kind", &self.kind)
            .field("accepts", &self.accepts)
            .field("positions", &self.positions)
            .finish_non_exhaustive()
    }
}

impl<K, C> Registration<K, C> {
    /// Describe a node with default acceptance (all payload kinds) and the
    /// default positions for `kind`.
    pub fn new(
        id: K,
        container: C,
        kind: NodeKind,
        bounds: impl Fn() -> Rect + 'static,
        ancestry: impl Fn() -> Ancestry<K> + 'static,
    ) -> Self {
        Self {
            id,
            container,
            kind,
            accepts: PayloadKinds::default(),
            positions: DropPositions::for_kind(kind),
            bounds: Box::new(bounds),
            ancestry: Box::new(ancestry),
        }
    }

    /// Restrict the accepted payload kinds.
    pub fn with_accepts(mut self, accepts: PayloadKinds) -> Self {
        self.accepts = accepts;
        self
    }

    /// Restrict the allowed drop positions.
    pub fn with_positions(mut self, positions: DropPositions) -> Self {
        self.positions = positions;
        self
    }

    /// Current bounds, queried from the provider.
    pub fn bounds(&self) -> Rect {
        (self.bounds)()
    }

    /// Current ancestor chain, queried from the provider.
    pub fn ancestry(&self) -> Ancestry<K> {
        (self.ancestry)()
    }
}

struct Entry<K, C> {
    seq: u64,
    registration: Registration<K, C>,
}

/// The set of currently registered drop targets, keyed by node id.
///
/// Registration order is remembered; later registrations are treated as
/// topmost in paint order when resolving ties.
pub struct TargetRegistry<K, C> {
    entries: HashMap<K, Entry<K, C>>,
    next_seq: u64,
}

impl<K: fmt::Debug, C> fmt::Debug for TargetRegistry<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetRegistry")
            .field("len", &self.entries.len())
            .field("next_seq", &self.next_seq)
            .finish_non_exhaustive()
    }
}

impl<K, C> Default for TargetRegistry<K, C> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            next_seq: 0,
        }
    }
}

impl<K: Copy + Eq + Hash, C: PartialEq> TargetRegistry<K, C> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the active set.
    ///
    /// Returns `false` and leaves the existing registration untouched if the
    /// id is already present.
    pub fn register(&mut self, registration: Registration<K, C>) -> bool {
        if self.entries.contains_key(&registration.id) {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries
            .insert(registration.id, Entry { seq, registration });
        true
    }

    /// Remove a node from the active set. Returns `false` if it was absent.
    pub fn unregister(&mut self, id: &K) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Returns `true` if `id` is registered.
    pub fn contains(&self, id: &K) -> bool {
        self.entries.contains_key(id)
    }

    /// Look up a registration.
    pub fn get(&self, id: &K) -> Option<&Registration<K, C>> {
        self.entries.get(id).map(|e| &e.registration)
    }

    /// All registrations in `scope`, oldest registration first.
    pub fn all(&self, scope: &C) -> Vec<&Registration<K, C>> {
        let mut out: Vec<&Entry<K, C>> = self
            .entries
            .values()
            .filter(|e| e.registration.container == *scope)
            .collect();
        out.sort_by_key(|e| e.seq);
        out.into_iter().map(|e| &e.registration).collect()
    }

    /// Number of registered nodes across all scopes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Unregister every node in `scope` (for example when a canvas unmounts).
    pub fn unregister_scope(&mut self, scope: &C) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.registration.container != *scope);
        before - self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn leaf(id: u32, scope: u32) -> Registration<u32, u32> {
        Registration::new(
            id,
            scope,
            NodeKind::Leaf,
            || Rect::new(0.0, 0.0, 10.0, 10.0),
            || smallvec![],
        )
    }

    #[test]
    fn register_is_idempotent() {
        let mut reg = TargetRegistry::new();
        assert!(reg.register(leaf(1, 0)));
        assert!(!reg.register(leaf(1, 0).with_positions(DropPositions::INSIDE)));
        assert_eq!(reg.len(), 1);
        // The first registration wins.
        assert_eq!(
            reg.get(&1).map(|r| r.positions),
            Some(DropPositions::BEFORE | DropPositions::AFTER)
        );
    }

    #[test]
    fn unregister_absent_is_noop() {
        let mut reg = TargetRegistry::new();
        reg.register(leaf(1, 0));
        assert!(reg.unregister(&1));
        assert!(!reg.unregister(&1));
        assert!(reg.is_empty());
    }

    #[test]
    fn all_is_scoped_and_in_registration_order() {
        let mut reg = TargetRegistry::new();
        reg.register(leaf(5, 0));
        reg.register(leaf(2, 1));
        reg.register(leaf(9, 0));
        reg.register(leaf(1, 0));
        let ids: Vec<u32> = reg.all(&0).iter().map(|r| r.id).collect();
        assert_eq!(ids, [5, 9, 1]);
        let ids: Vec<u32> = reg.all(&1).iter().map(|r| r.id).collect();
        assert_eq!(ids, [2]);
    }

    #[test]
    fn reregistration_counts_as_newest() {
        let mut reg = TargetRegistry::new();
        reg.register(leaf(1, 0));
        reg.register(leaf(2, 0));
        reg.unregister(&1);
        reg.register(leaf(1, 0));
        let ids: Vec<u32> = reg.all(&0).iter().map(|r| r.id).collect();
        assert_eq!(ids, [2, 1]);
    }

    #[test]
    fn unregister_scope_only_touches_scope() {
        let mut reg = TargetRegistry::new();
        reg.register(leaf(1, 0));
        reg.register(leaf(2, 1));
        reg.register(leaf(3, 0));
        assert_eq!(reg.unregister_scope(&0), 2);
        assert!(reg.contains(&2));
        assert_eq!(reg.len(), 1);
    }
}
