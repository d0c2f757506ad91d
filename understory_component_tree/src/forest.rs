// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core forest implementation: containers, node slots, ordering, queries.

use alloc::{vec, vec::Vec};
use core::fmt;

use hashbrown::HashMap;
use understory_drop_target::{Ancestry, Invalid, Missing};

use crate::types::{ContainerId, NodeId, Placement, TreeError};

/// A set of independent container trees sharing one id space.
///
/// Each container owns a flat set of nodes. A node's `parent` is `None` at the
/// container root, and every parent (or the root) keeps a total sibling order
/// with no duplicates. The parent relation within a container is acyclic and
/// every node belongs to exactly one container.
///
/// Structural edits here are individually validated and never panic on bad
/// ids. Composite, all-or-nothing edits live in
/// [`HierarchyMutator`](crate::HierarchyMutator).
///
/// ## Example
///
/// ```rust
/// use understory_component_tree::Forest;
///
/// let mut forest = Forest::new();
/// let canvas = forest.add_container();
/// let column = forest.insert(canvas, None, "column").unwrap();
/// let a = forest.insert(canvas, Some(column), "a").unwrap();
/// let b = forest.insert(canvas, Some(column), "b").unwrap();
///
/// assert_eq!(forest.children_of(column), &[a, b]);
/// assert_eq!(forest.parent_of(b), Some(column));
/// assert_eq!(forest.get(a), Some(&"a"));
/// ```
#[derive(Clone, PartialEq)]
pub struct Forest<T> {
    /// slots
    nodes: Vec<Option<Node<T>>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    /// root sibling order per container
    containers: HashMap<ContainerId, Vec<NodeId>>,
    next_container: u32,
}

impl<T> fmt::Debug for Forest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("Forest")
            .field("containers", &self.containers.len())
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .finish_non_exhaustive()
    }
}

impl<T> Default for Forest<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Node<T> {
    generation: u32,
    container: ContainerId,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    content: T,
}

impl<T> Forest<T> {
    /// Create an empty forest with no containers.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            containers: HashMap::new(),
            next_container: 0,
        }
    }

    /// Create a new, empty container tree.
    pub fn add_container(&mut self) -> ContainerId {
        let id = ContainerId(self.next_container);
        self.next_container += 1;
        self.containers.insert(id, Vec::new());
        id
    }

    /// Remove a container and every node in it. Returns `false` if absent.
    pub fn remove_container(&mut self, container: ContainerId) -> bool {
        let Some(roots) = self.containers.get(&container).cloned() else {
            return false;
        };
        for root in roots {
            self.remove(root);
        }
        self.containers.remove(&container);
        true
    }

    /// Returns `true` if `container` exists.
    pub fn has_container(&self, container: ContainerId) -> bool {
        self.containers.contains_key(&container)
    }

    /// All container ids, in creation order.
    pub fn containers(&self) -> Vec<ContainerId> {
        let mut out: Vec<ContainerId> = self.containers.keys().copied().collect();
        out.sort_unstable();
        out
    }

    /// Number of live nodes across all containers.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Returns `true` if no container holds any node.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a new node under `parent` (or at the root of `container`).
    pub fn insert(
        &mut self,
        container: ContainerId,
        parent: Option<NodeId>,
        content: T,
    ) -> Result<NodeId, TreeError> {
        self.insert_at(container, parent, None, content)
    }

    /// Insert a new node under `parent` at `index` in its sibling order, or at
    /// the end if `index` is `None`.
    pub fn insert_at(
        &mut self,
        container: ContainerId,
        parent: Option<NodeId>,
        index: Option<usize>,
        content: T,
    ) -> Result<NodeId, TreeError> {
        let len = self.checked_siblings(container, parent)?.len();
        if index.is_some_and(|i| i > len) {
            return Err(Invalid::IndexOutOfRange.into());
        }

        let node = Node {
            generation: 0,
            container,
            parent,
            children: Vec::new(),
            content,
        };
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node { generation, ..node });
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node { generation, ..node }));
            self.generations.push(generation);
            (self.nodes.len() - 1, generation)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "NodeId uses 32-bit indices by design."
        )]
        let id = NodeId::new(idx as u32, generation);
        self.attach(id, container, parent, index);
        Ok(id)
    }

    /// Remove a node and its whole subtree.
    ///
    /// Returns `false` if `id` is stale. Ids of removed nodes become stale.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        self.detach(id);
        for n in self.subtree(id) {
            self.nodes[n.idx()] = None;
            self.free_list.push(n.idx());
        }
        true
    }

    /// Move `id` under `new_parent` in its own container, at `index` of the
    /// new sibling order or at the end.
    ///
    /// Rejects moves under the node itself or one of its descendants.
    pub fn reparent(
        &mut self,
        id: NodeId,
        new_parent: Option<NodeId>,
        index: Option<usize>,
    ) -> Result<(), TreeError> {
        let container = self.container_of(id).ok_or(Missing::Node(id))?;
        if new_parent == Some(id) {
            return Err(TreeError::SelfDrop { node: id });
        }
        if let Some(p) = new_parent {
            if self.container_of(p) != Some(container) {
                return Err(TreeError::NotFound(Missing::Parent(p)));
            }
            if self.is_descendant_or_self(p, id) {
                return Err(TreeError::CircularReference { node: id, parent: p });
            }
        }
        // The index is measured against the sibling order without `id` in it.
        let mut len = self.checked_siblings(container, new_parent)?.len();
        if self.parent_of(id) == new_parent {
            len -= 1;
        }
        if index.is_some_and(|i| i > len) {
            return Err(Invalid::IndexOutOfRange.into());
        }

        self.detach(id);
        self.attach(id, container, new_parent, index);
        Ok(())
    }

    /// Move `id` directly before or after `reference` in their shared sibling order.
    pub fn reposition(
        &mut self,
        id: NodeId,
        reference: NodeId,
        placement: Placement,
    ) -> Result<(), TreeError> {
        if id == reference {
            return Err(TreeError::SelfDrop { node: id });
        }
        let container = self.container_of(id).ok_or(Missing::Node(id))?;
        let parent = self.parent_of(id);
        if self.container_of(reference) != Some(container) || self.parent_of(reference) != parent
        {
            return Err(TreeError::NotFound(Missing::Reference(reference)));
        }
        let Some(siblings) = self.sibling_list_mut(container, parent) else {
            return Err(TreeError::NotFound(Missing::Container(container)));
        };
        siblings.retain(|s| *s != id);
        // `reference` shares the parent, so it is still in the list.
        let at = siblings.iter().position(|s| *s == reference).unwrap_or(0);
        let at = match placement {
            Placement::Before => at,
            Placement::After => at + 1,
        };
        siblings.insert(at, id);
        Ok(())
    }

    /// Returns true if `id` refers to a live node.
    ///
    /// A `NodeId` is considered live if its slot exists and its generation matches
    /// the current generation stored in that slot.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node_opt(id).is_some()
    }

    /// The content of a live node.
    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.node_opt(id).map(|n| &n.content)
    }

    /// The container of a live node.
    pub fn container_of(&self, id: NodeId) -> Option<ContainerId> {
        self.node_opt(id).map(|n| n.container)
    }

    /// Returns the parent of a node if live, or `None` for roots or stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id).and_then(|n| n.parent)
    }

    /// Get the children of a node, or empty slice if node is stale.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.node_opt(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Top-level nodes of a container, or empty slice if it does not exist.
    pub fn roots(&self, container: ContainerId) -> &[NodeId] {
        self.containers
            .get(&container)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Sibling order under `parent` in `container`.
    ///
    /// Returns `None` if the container does not exist, or if `parent` is not
    /// a live node of that container.
    pub fn siblings(&self, container: ContainerId, parent: Option<NodeId>) -> Option<&[NodeId]> {
        self.checked_siblings(container, parent).ok()
    }

    /// Position of a live node within its sibling order.
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        let n = self.node_opt(id)?;
        self.siblings(n.container, n.parent)?
            .iter()
            .position(|s| *s == id)
    }

    /// Ancestors of a live node ordered root → parent, excluding the node.
    pub fn ancestors(&self, id: NodeId) -> Option<Ancestry<NodeId>> {
        let mut out = Ancestry::new();
        let mut cur = self.node_opt(id)?.parent;
        while let Some(p) = cur {
            out.push(p);
            cur = self.parent_of(p);
        }
        out.reverse();
        Some(out)
    }

    /// Returns `true` if `node` is `ancestor` or lies in its subtree.
    pub fn is_descendant_or_self(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(n) = cur {
            if n == ancestor {
                return true;
            }
            cur = self.parent_of(n);
        }
        false
    }

    /// The subtree rooted at `id` in pre-order (the node first), or empty if stale.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        if !self.is_alive(id) {
            return Vec::new();
        }
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            out.push(n);
            // Reversed so children come out in sibling order.
            stack.extend(self.children_of(n).iter().rev());
        }
        out
    }

    /// Every node of `container` in pre-order, paired with its depth (roots are 0).
    pub fn depth_first(&self, container: ContainerId) -> Vec<(usize, NodeId)> {
        let mut out = Vec::new();
        let mut stack: Vec<(usize, NodeId)> =
            self.roots(container).iter().rev().map(|r| (0, *r)).collect();
        while let Some((depth, n)) = stack.pop() {
            out.push((depth, n));
            stack.extend(self.children_of(n).iter().rev().map(|c| (depth + 1, *c)));
        }
        out
    }

    // --- internals ---

    fn checked_siblings(
        &self,
        container: ContainerId,
        parent: Option<NodeId>,
    ) -> Result<&[NodeId], TreeError> {
        let roots = self
            .containers
            .get(&container)
            .ok_or(Missing::Container(container))?;
        match parent {
            None => Ok(roots),
            Some(p) => match self.node_opt(p) {
                Some(n) if n.container == container => Ok(&n.children),
                _ => Err(TreeError::NotFound(Missing::Parent(p))),
            },
        }
    }

    fn node_opt(&self, id: NodeId) -> Option<&Node<T>> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node<T>> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn sibling_list_mut(
        &mut self,
        container: ContainerId,
        parent: Option<NodeId>,
    ) -> Option<&mut Vec<NodeId>> {
        match parent {
            Some(p) => self.node_opt_mut(p).map(|n| &mut n.children),
            None => self.containers.get_mut(&container),
        }
    }

    /// Link a live, detached node into a validated sibling order.
    fn attach(
        &mut self,
        id: NodeId,
        container: ContainerId,
        parent: Option<NodeId>,
        index: Option<usize>,
    ) {
        if let Some(siblings) = self.sibling_list_mut(container, parent) {
            match index {
                Some(i) if i <= siblings.len() => siblings.insert(i, id),
                _ => siblings.push(id),
            }
        }
        if let Some(n) = self.node_opt_mut(id) {
            n.container = container;
            n.parent = parent;
        }
    }

    /// Unlink a live node from its sibling order, keeping its subtree intact.
    fn detach(&mut self, id: NodeId) {
        let Some((container, parent)) = self.node_opt(id).map(|n| (n.container, n.parent)) else {
            return;
        };
        if let Some(siblings) = self.sibling_list_mut(container, parent) {
            siblings.retain(|s| *s != id);
        }
        if let Some(n) = self.node_opt_mut(id) {
            n.parent = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column() -> (Forest<&'static str>, ContainerId, NodeId, [NodeId; 3]) {
        let mut f = Forest::new();
        let c = f.add_container();
        let col = f.insert(c, None, "column").unwrap();
        let x = f.insert(c, Some(col), "x").unwrap();
        let y = f.insert(c, Some(col), "y").unwrap();
        let z = f.insert(c, Some(col), "z").unwrap();
        (f, c, col, [x, y, z])
    }

    #[test]
    fn insert_appends_and_insert_at_places() {
        let (mut f, c, col, [x, y, z]) = column();
        assert_eq!(f.children_of(col), &[x, y, z]);
        let w = f.insert_at(c, Some(col), Some(1), "w").unwrap();
        assert_eq!(f.children_of(col), &[x, w, y, z]);
        assert_eq!(f.index_of(w), Some(1));
        assert_eq!(
            f.insert_at(c, Some(col), Some(9), "v"),
            Err(Invalid::IndexOutOfRange.into())
        );
    }

    #[test]
    fn insert_rejects_unknown_parent_and_container() {
        let (mut f, c, col, _) = column();
        let other = f.add_container();
        assert_eq!(
            f.insert(other, Some(col), "q"),
            Err(TreeError::NotFound(Missing::Parent(col)))
        );
        f.remove_container(other);
        assert_eq!(
            f.insert(other, None, "q"),
            Err(TreeError::NotFound(Missing::Container(other)))
        );
        assert!(f.has_container(c));
    }

    #[test]
    fn liveness_insert_remove_reuse() {
        let (mut f, c, col, [x, ..]) = column();
        assert!(f.remove(x));
        assert!(!f.is_alive(x));
        assert!(!f.remove(x), "second remove is a no-op");
        let n = f.insert(c, Some(col), "n").unwrap();
        assert!(f.is_alive(n));
        assert!(!f.is_alive(x));
        if n.0 == x.0 {
            assert!(n.1 > x.1, "generation must increase on reuse");
        }
    }

    #[test]
    fn remove_takes_the_subtree() {
        let (mut f, c, col, [x, y, z]) = column();
        let deep = f.insert(c, Some(y), "deep").unwrap();
        assert!(f.remove(col));
        for id in [col, x, y, z, deep] {
            assert!(!f.is_alive(id));
        }
        assert!(f.roots(c).is_empty());
        assert!(f.is_empty());
    }

    #[test]
    fn reparent_rejects_cycles() {
        let (mut f, c, col, [x, ..]) = column();
        let deep = f.insert(c, Some(x), "deep").unwrap();
        let before = f.clone();
        assert_eq!(
            f.reparent(col, Some(deep), None),
            Err(TreeError::CircularReference {
                node: col,
                parent: deep
            })
        );
        assert_eq!(
            f.reparent(col, Some(col), None),
            Err(TreeError::SelfDrop { node: col })
        );
        assert!(f == before, "rejected reparent must not change the forest");
    }

    #[test]
    fn reparent_within_same_parent_moves_to_index() {
        let (mut f, _, col, [x, y, z]) = column();
        f.reparent(z, Some(col), Some(0)).unwrap();
        assert_eq!(f.children_of(col), &[z, x, y]);
        // Index counts siblings without the moved node.
        f.reparent(z, Some(col), Some(2)).unwrap();
        assert_eq!(f.children_of(col), &[x, y, z]);
        assert_eq!(
            f.reparent(z, Some(col), Some(3)),
            Err(Invalid::IndexOutOfRange.into())
        );
    }

    #[test]
    fn reparent_to_root_and_back() {
        let (mut f, c, col, [x, y, z]) = column();
        f.reparent(y, None, None).unwrap();
        assert_eq!(f.roots(c), &[col, y]);
        assert_eq!(f.parent_of(y), None);
        f.reparent(y, Some(col), Some(1)).unwrap();
        assert_eq!(f.children_of(col), &[x, y, z]);
    }

    #[test]
    fn reposition_before_and_after() {
        let (mut f, _, col, [x, y, z]) = column();
        f.reposition(z, x, Placement::Before).unwrap();
        assert_eq!(f.children_of(col), &[z, x, y]);
        f.reposition(z, y, Placement::After).unwrap();
        assert_eq!(f.children_of(col), &[x, y, z]);
    }

    #[test]
    fn reposition_requires_shared_parent() {
        let (mut f, c, col, [x, ..]) = column();
        let stray = f.insert(c, None, "stray").unwrap();
        assert_eq!(
            f.reposition(x, stray, Placement::Before),
            Err(TreeError::NotFound(Missing::Reference(stray)))
        );
        assert_eq!(f.roots(c), &[col, stray]);
    }

    #[test]
    fn ancestry_and_traversal() {
        let (mut f, c, col, [x, y, z]) = column();
        let deep = f.insert(c, Some(y), "deep").unwrap();
        let tail = f.insert(c, None, "tail").unwrap();
        assert_eq!(f.ancestors(deep).unwrap().as_slice(), &[col, y]);
        assert_eq!(f.ancestors(col).unwrap().as_slice(), &[] as &[NodeId]);
        assert!(f.is_descendant_or_self(deep, col));
        assert!(!f.is_descendant_or_self(col, deep));

        assert_eq!(f.subtree(y), [y, deep]);
        assert_eq!(
            f.depth_first(c),
            [(0, col), (1, x), (1, y), (2, deep), (1, z), (0, tail)]
        );
    }

    #[test]
    fn containers_are_independent() {
        let mut f = Forest::new();
        let a = f.add_container();
        let b = f.add_container();
        let na = f.insert(a, None, 1).unwrap();
        let nb = f.insert(b, None, 2).unwrap();
        assert_eq!(f.containers(), [a, b]);
        assert_eq!(f.container_of(na), Some(a));
        assert_eq!(f.container_of(nb), Some(b));
        assert_eq!(
            f.reparent(na, Some(nb), None),
            Err(TreeError::NotFound(Missing::Parent(nb)))
        );
        assert!(f.remove_container(a));
        assert!(!f.is_alive(na));
        assert!(f.is_alive(nb));
    }
}
