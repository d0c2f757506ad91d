// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The storage seam between the mutator and whatever holds the component trees.

use alloc::vec::Vec;

use understory_drop_target::{Ancestry, Missing};

use crate::forest::Forest;
use crate::types::{ContainerId, NodeId, NodeView, Placement, TreeError};

/// Persistent storage for container trees.
///
/// [`HierarchyMutator`](crate::HierarchyMutator) only talks to the trees
/// through this trait. Each `apply_*` primitive must either complete or return
/// an error without side effects; the mutator composes them and uses
/// [`snapshot`](Self::snapshot)/[`restore`](Self::restore) to roll back a
/// composite operation that fails part way.
pub trait TreeStore {
    /// Component content carried by each node.
    type Content;
    /// A saved state that [`restore`](Self::restore) can return to.
    type Snapshot;

    /// Returns `true` if `container` exists.
    fn has_container(&self, container: ContainerId) -> bool;

    /// View of a live node, or `None` if the id is stale.
    fn get_node(&self, id: NodeId) -> Option<NodeView<'_, Self::Content>>;

    /// Ordered children of `parent` (or the roots when `None`).
    ///
    /// `None` if the container or parent does not exist.
    fn get_children(&self, container: ContainerId, parent: Option<NodeId>) -> Option<Vec<NodeId>>;

    /// Ancestors of a live node ordered root → parent.
    fn get_ancestors(&self, id: NodeId) -> Option<Ancestry<NodeId>>;

    /// Insert new content under `parent` at `index`, or at the end.
    fn apply_add(
        &mut self,
        container: ContainerId,
        parent: Option<NodeId>,
        content: Self::Content,
        index: Option<usize>,
    ) -> Result<NodeId, TreeError>;

    /// Re-parent a node within its container.
    fn apply_move(
        &mut self,
        id: NodeId,
        new_parent: Option<NodeId>,
        index: Option<usize>,
    ) -> Result<(), TreeError>;

    /// Place a node before or after a sibling.
    fn apply_reorder(
        &mut self,
        id: NodeId,
        reference: NodeId,
        placement: Placement,
    ) -> Result<(), TreeError>;

    /// Remove a node and its subtree.
    fn apply_remove(&mut self, id: NodeId) -> Result<(), TreeError>;

    /// Capture the current state.
    fn snapshot(&self) -> Self::Snapshot;

    /// Return to a state captured by [`snapshot`](Self::snapshot).
    fn restore(&mut self, snapshot: Self::Snapshot);
}

impl<T: Clone> TreeStore for Forest<T> {
    type Content = T;
    type Snapshot = Self;

    fn has_container(&self, container: ContainerId) -> bool {
        Self::has_container(self, container)
    }

    fn get_node(&self, id: NodeId) -> Option<NodeView<'_, T>> {
        Some(NodeView {
            id,
            container: self.container_of(id)?,
            parent: self.parent_of(id),
            content: self.get(id)?,
        })
    }

    fn get_children(&self, container: ContainerId, parent: Option<NodeId>) -> Option<Vec<NodeId>> {
        self.siblings(container, parent).map(<[NodeId]>::to_vec)
    }

    fn get_ancestors(&self, id: NodeId) -> Option<Ancestry<NodeId>> {
        self.ancestors(id)
    }

    fn apply_add(
        &mut self,
        container: ContainerId,
        parent: Option<NodeId>,
        content: T,
        index: Option<usize>,
    ) -> Result<NodeId, TreeError> {
        self.insert_at(container, parent, index, content)
    }

    fn apply_move(
        &mut self,
        id: NodeId,
        new_parent: Option<NodeId>,
        index: Option<usize>,
    ) -> Result<(), TreeError> {
        self.reparent(id, new_parent, index)
    }

    fn apply_reorder(
        &mut self,
        id: NodeId,
        reference: NodeId,
        placement: Placement,
    ) -> Result<(), TreeError> {
        self.reposition(id, reference, placement)
    }

    fn apply_remove(&mut self, id: NodeId) -> Result<(), TreeError> {
        if self.remove(id) {
            Ok(())
        } else {
            Err(TreeError::NotFound(Missing::Node(id)))
        }
    }

    fn snapshot(&self) -> Self {
        self.clone()
    }

    fn restore(&mut self, snapshot: Self) {
        *self = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_restore_round_trips() {
        let mut f: Forest<u8> = Forest::new();
        let c = f.add_container();
        let a = f.insert(c, None, 1).unwrap();
        let saved = TreeStore::snapshot(&f);
        f.apply_add(c, Some(a), 2, None).unwrap();
        f.apply_remove(a).unwrap();
        TreeStore::restore(&mut f, saved.clone());
        assert!(f == saved);
        assert_eq!(f.get_children(c, None), Some(alloc::vec![a]));
    }

    #[test]
    fn node_view_reports_placement() {
        let mut f: Forest<&str> = Forest::new();
        let c = f.add_container();
        let a = f.insert(c, None, "a").unwrap();
        let b = f.insert(c, Some(a), "b").unwrap();
        let view = f.get_node(b).unwrap();
        assert_eq!((view.id, view.container, view.parent), (b, c, Some(a)));
        assert_eq!(*view.content, "b");
        assert!(f.get_node(NodeId::new(99, 1)).is_none());
        assert_eq!(f.get_children(c, Some(b)), Some(alloc::vec![]));
        let stale = NodeId::new(99, 1);
        assert_eq!(
            f.apply_remove(stale),
            Err(TreeError::NotFound(Missing::Node(stale)))
        );
    }
}
