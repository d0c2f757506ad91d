// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! All-or-nothing structural edits over a [`TreeStore`].

use alloc::{boxed::Box, vec, vec::Vec};
use core::fmt;

use understory_drop_target::{
    DragPayload, DropPosition, DropResolution, DropTarget, Invalid, Missing, PayloadSource,
};

use crate::change::TreeChange;
use crate::store::TreeStore;
use crate::types::{ContainerId, NodeId, Placement, TreeError};

type Listener = (ChangeSubscription, Box<dyn FnMut(&TreeChange)>);

/// Handle returned by [`HierarchyMutator::subscribe`], used to unsubscribe.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChangeSubscription(u64);

/// Orchestrates add, move, reorder, and composite drops on a [`TreeStore`].
///
/// Every public operation validates its inputs before touching the store; a
/// rejected call leaves the store exactly as it was and emits nothing. A
/// committed call emits one [`TreeChange`] to every subscriber.
///
/// ## Example
///
/// ```rust
/// use understory_component_tree::{Forest, HierarchyMutator, TreeError};
/// use understory_drop_target::DropPosition;
///
/// let mut forest: Forest<&str> = Forest::new();
/// let canvas = forest.add_container();
/// let mut m = HierarchyMutator::new(forest);
///
/// let x = m.add_child(canvas, None, "x", None).unwrap();
/// let y = m.add_child(canvas, None, "y", None).unwrap();
/// let z = m.add_child(canvas, None, "z", None).unwrap();
///
/// m.reorder(canvas, None, z, x, DropPosition::Before).unwrap();
/// assert_eq!(m.store().roots(canvas), &[z, x, y]);
///
/// // A node cannot become its own parent.
/// assert_eq!(
///     m.move_node(canvas, x, Some(x), None),
///     Err(TreeError::SelfDrop { node: x })
/// );
/// ```
pub struct HierarchyMutator<S: TreeStore> {
    store: S,
    listeners: Vec<Listener>,
    next_subscription: u64,
}

impl<S: TreeStore + fmt::Debug> fmt::Debug for HierarchyMutator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HierarchyMutator")
            .field("store", &self.store)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Where a validated move lands.
#[derive(Copy, Clone, Debug)]
struct MovePlan {
    node: NodeId,
    from: ContainerId,
    to: ContainerId,
    parent: Option<NodeId>,
    slot: Slot,
}

/// Position within the destination sibling order.
#[derive(Copy, Clone, Debug)]
enum Slot {
    End,
    Index(usize),
    Beside(NodeId, Placement),
}

impl<S: TreeStore> HierarchyMutator<S> {
    /// Wrap a store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// The underlying store, for reads.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The underlying store, for edits outside this engine (for example an
    /// editor "delete" command). Such edits emit no [`TreeChange`].
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Unwrap the store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Register a listener called after every committed operation.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&TreeChange) + 'static,
    ) -> ChangeSubscription {
        let id = ChangeSubscription(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was already removed.
    pub fn unsubscribe(&mut self, subscription: ChangeSubscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(id, _)| *id != subscription);
        self.listeners.len() != before
    }

    /// Insert new content under `parent` (or the container root), appended
    /// unless `at` gives an index in the sibling order.
    pub fn add_child(
        &mut self,
        container: ContainerId,
        parent: Option<NodeId>,
        content: S::Content,
        at: Option<usize>,
    ) -> Result<NodeId, TreeError> {
        let result = self.check_parent(container, parent).and_then(|()| {
            self.store.apply_add(container, parent, content, at)
        });
        let node = self.settle(result)?;
        self.emit(TreeChange::Added {
            container,
            node,
            parent,
        });
        Ok(node)
    }

    /// Reorder `node` before or after `reference` under `parent`.
    ///
    /// Both must currently be children of `parent` in `container`.
    pub fn reorder(
        &mut self,
        container: ContainerId,
        parent: Option<NodeId>,
        node: NodeId,
        reference: NodeId,
        position: DropPosition,
    ) -> Result<(), TreeError> {
        let result = self.plan_reorder(container, parent, node, reference, position);
        let placement = self.settle(result)?;
        let result = self.store.apply_reorder(node, reference, placement);
        self.settle(result)?;
        self.emit(TreeChange::Reordered {
            container,
            parent,
            node,
        });
        Ok(())
    }
}

impl<S> HierarchyMutator<S>
where
    S: TreeStore,
    S::Content: Clone,
{
    /// Re-parent `node` of `container` under `new_parent`, appending it.
    ///
    /// When `destination` names another container the node's subtree is copied
    /// there as new identities and removed from `container`; the returned id is
    /// the new root of the copy. Otherwise the node keeps its id.
    pub fn move_node(
        &mut self,
        container: ContainerId,
        node: NodeId,
        new_parent: Option<NodeId>,
        destination: Option<ContainerId>,
    ) -> Result<NodeId, TreeError> {
        self.relocate(container, node, new_parent, destination, Slot::End)
    }

    /// Like [`move_node`](Self::move_node), placing the node at `index` of the
    /// destination sibling order (counted without the node itself).
    pub fn move_node_at(
        &mut self,
        container: ContainerId,
        node: NodeId,
        new_parent: Option<NodeId>,
        index: usize,
        destination: Option<ContainerId>,
    ) -> Result<NodeId, TreeError> {
        self.relocate(container, node, new_parent, destination, Slot::Index(index))
    }

    /// Apply a resolved drop.
    ///
    /// Definitions are instantiated with `instantiate` and inserted; instances
    /// are moved (or transferred across containers). `Before`/`After` place the
    /// result next to the target under the target's current parent.
    pub fn apply_drop<D>(
        &mut self,
        resolution: &DropResolution<NodeId, ContainerId>,
        payload: &DragPayload<NodeId, ContainerId, D>,
        instantiate: impl FnOnce(&D) -> S::Content,
    ) -> Result<NodeId, TreeError> {
        let container = resolution.container;
        if let (PayloadSource::Instance(node), DropTarget::Node(target)) =
            (&payload.source, resolution.target)
        {
            if *node == target {
                return self.settle(Err(TreeError::SelfDrop { node: target }));
            }
        }
        let result = self.plan_drop(resolution);
        let (parent, slot) = self.settle(result)?;

        match &payload.source {
            PayloadSource::Definition(definition) => {
                let result = self.check_parent(container, parent);
                self.settle(result)?;
                let content = instantiate(definition);
                let result = self.store_slot(container, parent, slot).and_then(|index| {
                    self.store.apply_add(container, parent, content, index)
                });
                let node = self.settle(result)?;
                self.emit(TreeChange::Added {
                    container,
                    node,
                    parent,
                });
                Ok(node)
            }
            PayloadSource::Instance(node) => {
                let node = *node;
                let from = match self.store.get_node(node) {
                    Some(view) => view.container,
                    None => return self.settle(Err(Missing::Node(node).into())),
                };
                self.relocate(from, node, parent, Some(container), slot)
            }
        }
    }

    fn relocate(
        &mut self,
        container: ContainerId,
        node: NodeId,
        new_parent: Option<NodeId>,
        destination: Option<ContainerId>,
        slot: Slot,
    ) -> Result<NodeId, TreeError> {
        let result = self.plan_move(container, node, new_parent, destination, slot);
        let plan = self.settle(result)?;

        let result = self.transact(|store| execute_move(store, plan));
        let (created, change) = self.settle(result)?;
        self.emit(change);
        Ok(created)
    }

    fn plan_move(
        &self,
        container: ContainerId,
        node: NodeId,
        new_parent: Option<NodeId>,
        destination: Option<ContainerId>,
        slot: Slot,
    ) -> Result<MovePlan, TreeError> {
        if new_parent == Some(node) {
            return Err(TreeError::SelfDrop { node });
        }
        self.check_member(container, node, Missing::Node(node))?;
        let to = destination.unwrap_or(container);
        self.check_parent(to, new_parent)?;

        if to == container {
            if let Some(p) = new_parent {
                // Walk the proposed parent's chain up to the root.
                let chain = self
                    .store
                    .get_ancestors(p)
                    .ok_or(Missing::Parent(p))?;
                if chain.contains(&node) {
                    return Err(TreeError::CircularReference { node, parent: p });
                }
            }
        }

        match slot {
            Slot::End => {}
            Slot::Index(index) => {
                let mut len = self.children(to, new_parent)?.len();
                if to == container && self.parent_in_store(node) == new_parent {
                    len -= 1;
                }
                if index > len {
                    return Err(Invalid::IndexOutOfRange.into());
                }
            }
            Slot::Beside(reference, _) => {
                if reference == node {
                    return Err(TreeError::SelfDrop { node });
                }
                if !self.children(to, new_parent)?.contains(&reference) {
                    return Err(Missing::Reference(reference).into());
                }
            }
        }

        Ok(MovePlan {
            node,
            from: container,
            to,
            parent: new_parent,
            slot,
        })
    }

    /// Work out the parent and slot a drop lands in.
    fn plan_drop(
        &self,
        resolution: &DropResolution<NodeId, ContainerId>,
    ) -> Result<(Option<NodeId>, Slot), TreeError> {
        let container = resolution.container;
        if !self.store.has_container(container) {
            return Err(Missing::Container(container).into());
        }
        let target = match resolution.target {
            DropTarget::Root => {
                return match resolution.position {
                    DropPosition::Inside => Ok((None, Slot::End)),
                    _ => Err(Invalid::RootHasNoSiblings.into()),
                };
            }
            DropTarget::Node(target) => target,
        };
        let Some(view) = self.store.get_node(target) else {
            return Err(TreeError::StaleTarget { target });
        };
        if view.container != container {
            return Err(Invalid::ContainerMismatch.into());
        }
        match resolution.position {
            DropPosition::Inside if resolution.is_container => Ok((Some(target), Slot::End)),
            DropPosition::Inside => Err(Invalid::NotAContainer.into()),
            DropPosition::Before => Ok((view.parent, Slot::Beside(target, Placement::Before))),
            DropPosition::After => Ok((view.parent, Slot::Beside(target, Placement::After))),
        }
    }
}

impl<S: TreeStore> HierarchyMutator<S> {
    fn plan_reorder(
        &self,
        container: ContainerId,
        parent: Option<NodeId>,
        node: NodeId,
        reference: NodeId,
        position: DropPosition,
    ) -> Result<Placement, TreeError> {
        let placement = Placement::try_from(position)?;
        if node == reference {
            return Err(TreeError::SelfDrop { node });
        }
        self.check_parent(container, parent)?;
        let siblings = self.children(container, parent)?;
        if !siblings.contains(&node) {
            return Err(Missing::Node(node).into());
        }
        if !siblings.contains(&reference) {
            return Err(Missing::Reference(reference).into());
        }
        Ok(placement)
    }

    /// `parent` must be `None` or a live node of `container`, which must exist.
    fn check_parent(
        &self,
        container: ContainerId,
        parent: Option<NodeId>,
    ) -> Result<(), TreeError> {
        if !self.store.has_container(container) {
            return Err(Missing::Container(container).into());
        }
        match parent {
            Some(p) => self.check_member(container, p, Missing::Parent(p)),
            None => Ok(()),
        }
    }

    fn check_member(
        &self,
        container: ContainerId,
        id: NodeId,
        missing: Missing<NodeId, ContainerId>,
    ) -> Result<(), TreeError> {
        match self.store.get_node(id) {
            None => Err(missing.into()),
            Some(view) if view.container != container => Err(Invalid::ContainerMismatch.into()),
            Some(_) => Ok(()),
        }
    }

    fn children(
        &self,
        container: ContainerId,
        parent: Option<NodeId>,
    ) -> Result<Vec<NodeId>, TreeError> {
        self.store
            .get_children(container, parent)
            .ok_or_else(|| match parent {
                Some(p) => Missing::Parent(p).into(),
                None => Missing::Container(container).into(),
            })
    }

    fn parent_in_store(&self, id: NodeId) -> Option<NodeId> {
        self.store.get_node(id).and_then(|view| view.parent)
    }

    /// Translate a slot into an insertion index for a node that is not yet in
    /// the sibling order.
    fn store_slot(
        &self,
        container: ContainerId,
        parent: Option<NodeId>,
        slot: Slot,
    ) -> Result<Option<usize>, TreeError> {
        match slot {
            Slot::End => Ok(None),
            Slot::Index(index) => Ok(Some(index)),
            Slot::Beside(reference, placement) => {
                let siblings = self.children(container, parent)?;
                let at = siblings
                    .iter()
                    .position(|s| *s == reference)
                    .ok_or(Missing::Reference(reference))?;
                Ok(Some(match placement {
                    Placement::Before => at,
                    Placement::After => at + 1,
                }))
            }
        }
    }

    /// Run `f` against the store, restoring the prior state if it fails.
    fn transact<R>(
        &mut self,
        f: impl FnOnce(&mut S) -> Result<R, TreeError>,
    ) -> Result<R, TreeError> {
        let snapshot = self.store.snapshot();
        let result = f(&mut self.store);
        if result.is_err() {
            self.store.restore(snapshot);
        }
        result
    }

    /// Log a rejection before handing the result back.
    fn settle<R>(&self, result: Result<R, TreeError>) -> Result<R, TreeError> {
        #[cfg(feature = "tracing")]
        if let Err(err) = &result {
            tracing::warn!(message = "tree mutation rejected", error = %err);
        }
        result
    }

    fn emit(&mut self, change: TreeChange) {
        #[cfg(feature = "tracing")]
        tracing::debug!(message = "tree change committed", change = ?change);
        for (_, listener) in &mut self.listeners {
            listener(&change);
        }
    }
}

/// Carry out a validated move. Runs inside a transaction.
fn execute_move<S>(store: &mut S, plan: MovePlan) -> Result<(NodeId, TreeChange), TreeError>
where
    S: TreeStore,
    S::Content: Clone,
{
    let MovePlan {
        node,
        from,
        to,
        parent,
        slot,
    } = plan;

    if from == to {
        match slot {
            Slot::End => store.apply_move(node, parent, None)?,
            Slot::Index(index) => store.apply_move(node, parent, Some(index))?,
            Slot::Beside(reference, placement) => {
                // Move first, then order against the final parent.
                store.apply_move(node, parent, None)?;
                store.apply_reorder(node, reference, placement)?;
            }
        }
        return Ok((
            node,
            TreeChange::Moved {
                container: to,
                node,
                parent,
            },
        ));
    }

    let index = match slot {
        Slot::End => None,
        Slot::Index(index) => Some(index),
        Slot::Beside(reference, placement) => {
            let siblings = store
                .get_children(to, parent)
                .ok_or(Missing::Container(to))?;
            let at = siblings
                .iter()
                .position(|s| *s == reference)
                .ok_or(Missing::Reference(reference))?;
            Some(match placement {
                Placement::Before => at,
                Placement::After => at + 1,
            })
        }
    };
    let created_subtree = copy_subtree(store, from, node, to, parent, index)?;
    let created = created_subtree.first().copied().ok_or(Missing::Node(node))?;
    store.apply_remove(node)?;
    Ok((
        created,
        TreeChange::Transferred {
            from,
            to,
            removed: node,
            created,
            parent,
            created_subtree,
        },
    ))
}

/// Copy the subtree at `root` into `to` under `parent`, preserving shape and
/// sibling order. Returns the new ids in pre-order.
fn copy_subtree<S>(
    store: &mut S,
    from: ContainerId,
    root: NodeId,
    to: ContainerId,
    parent: Option<NodeId>,
    index: Option<usize>,
) -> Result<Vec<NodeId>, TreeError>
where
    S: TreeStore,
    S::Content: Clone,
{
    let mut created = Vec::new();
    let mut stack = vec![(root, parent, index)];
    while let Some((source, new_parent, at)) = stack.pop() {
        let content = store
            .get_node(source)
            .map(|view| view.content.clone())
            .ok_or(Missing::Node(source))?;
        let copy = store.apply_add(to, new_parent, content, at)?;
        created.push(copy);
        let children = store
            .get_children(from, Some(source))
            .ok_or(Missing::Node(source))?;
        stack.extend(children.into_iter().rev().map(|c| (c, Some(copy), None)));
    }
    Ok(created)
}
