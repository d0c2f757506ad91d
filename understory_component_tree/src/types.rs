// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the component forest: identifiers, placements, and views.

use understory_drop_target::{DropError, DropPosition, Invalid};

/// Identifier for a node in the forest (generational).
///
/// Ids are unique across all containers of one [`Forest`](crate::Forest).
/// Removing a node bumps its slot's generation, so stale ids are detected
/// rather than silently aliasing a newer node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Identifier for a container tree (for example one canvas widget).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ContainerId(pub(crate) u32);

/// Errors raised by the forest and the mutator.
pub type TreeError = DropError<NodeId, ContainerId>;

/// Sibling placement relative to a reference node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Placement {
    /// Immediately before the reference.
    Before,
    /// Immediately after the reference.
    After,
}

impl TryFrom<DropPosition> for Placement {
    type Error = TreeError;

    fn try_from(position: DropPosition) -> Result<Self, Self::Error> {
        match position {
            DropPosition::Before => Ok(Self::Before),
            DropPosition::After => Ok(Self::After),
            DropPosition::Inside => Err(Invalid::NotASiblingPosition.into()),
        }
    }
}

/// Borrowed view of one live node.
#[derive(Debug)]
pub struct NodeView<'a, T> {
    /// The node's id.
    pub id: NodeId,
    /// The container the node belongs to.
    pub container: ContainerId,
    /// The parent, or `None` at the container root.
    pub parent: Option<NodeId>,
    /// The node's component content.
    pub content: &'a T,
}

impl<T> Clone for NodeView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NodeView<'_, T> {}
