// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change notifications emitted after a committed mutation.

use alloc::vec::Vec;

use crate::types::{ContainerId, NodeId};

/// One committed structural change.
///
/// Exactly one change is emitted per successful mutator call and none for a
/// rejected one, so observers can re-render without diffing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeChange {
    /// A new node was created from a palette definition.
    Added {
        /// Where it was added.
        container: ContainerId,
        /// The new node.
        node: NodeId,
        /// Its parent, `None` at the container root.
        parent: Option<NodeId>,
    },
    /// A node changed parent or position inside its own container.
    Moved {
        /// The container the node lives in.
        container: ContainerId,
        /// The moved node (identity preserved).
        node: NodeId,
        /// Its new parent.
        parent: Option<NodeId>,
    },
    /// A subtree was copied into another container and removed from its source.
    Transferred {
        /// Source container.
        from: ContainerId,
        /// Destination container.
        to: ContainerId,
        /// Root of the removed source subtree.
        removed: NodeId,
        /// Root of the newly created copy.
        created: NodeId,
        /// Parent of the copy in `to`.
        parent: Option<NodeId>,
        /// Every id created for the copy, in pre-order, root first.
        created_subtree: Vec<NodeId>,
    },
    /// A node moved before or after a sibling under the same parent.
    Reordered {
        /// The container.
        container: ContainerId,
        /// The shared parent.
        parent: Option<NodeId>,
        /// The node that moved.
        node: NodeId,
    },
}

impl TreeChange {
    /// Containers touched by this change.
    pub fn containers(&self) -> impl Iterator<Item = ContainerId> + '_ {
        let (a, b) = match self {
            Self::Added { container, .. }
            | Self::Moved { container, .. }
            | Self::Reordered { container, .. } => (*container, None),
            Self::Transferred { from, to, .. } => (*from, Some(*to)),
        };
        core::iter::once(a).chain(b)
    }
}
