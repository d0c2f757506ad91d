// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error taxonomy for rejected drops and tree mutations.

use core::fmt;

/// Why a request was malformed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Invalid {
    /// A drop or target update arrived while no drag is active.
    NotDragging,
    /// No resolution exists for the drop (for example the pointer left every scope).
    NoResolution,
    /// `Inside` was requested on a target that cannot hold children.
    NotAContainer,
    /// `Before`/`After` was requested on a container root, which has no siblings.
    RootHasNoSiblings,
    /// An insertion index lies past the end of the sibling order.
    IndexOutOfRange,
    /// A node was addressed through a container it does not belong to.
    ContainerMismatch,
    /// A reorder was requested with a position other than `Before`/`After`.
    NotASiblingPosition,
}

impl fmt::Display for Invalid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotDragging => "no drag is active",
            Self::NoResolution => "no drop target is resolved",
            Self::NotAContainer => "target cannot hold children",
            Self::RootHasNoSiblings => "container root has no siblings",
            Self::IndexOutOfRange => "insertion index is out of range",
            Self::ContainerMismatch => "node does not belong to the given container",
            Self::NotASiblingPosition => "reorder needs a before/after position",
        };
        f.write_str(s)
    }
}

/// The entity a [`DropError::NotFound`] refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Missing<K, C> {
    /// The node being added, moved, or reordered.
    Node(K),
    /// The requested parent.
    Parent(K),
    /// The sibling a reorder is relative to.
    Reference(K),
    /// The container tree.
    Container(C),
}

/// Why a drop or tree mutation was rejected.
///
/// A rejected operation never leaves a partial change behind.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub enum DropError<K, C> {
    /// Missing or malformed payload, target, or argument.
    Validation(Invalid),
    /// A node was dropped onto itself.
    SelfDrop {
        /// The dragged node.
        node: K,
    },
    /// The requested parent is the node itself or one of its descendants.
    CircularReference {
        /// The node being moved.
        node: K,
        /// The rejected parent.
        parent: K,
    },
    /// A referenced node, parent, or container no longer exists.
    NotFound(Missing<K, C>),
    /// The resolved target vanished between hover and drop.
    StaleTarget {
        /// The vanished target.
        target: K,
    },
}

impl<K: fmt::Debug, C: fmt::Debug> fmt::Debug for DropError<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(why) => write!(f, "ValidationError({why:?})"),
            Self::SelfDrop { node } => write!(f, "SelfDropError {{ node: {node:?} }}"),
            Self::CircularReference { node, parent } => write!(
                f,
                "CircularReferenceError {{ node: {node:?}, parent: {parent:?} }}"
            ),
            Self::NotFound(missing) => write!(f, "NotFoundError({missing:?})"),
            Self::StaleTarget { target } => {
                write!(f, "StaleTargetError {{ target: {target:?} }}")
            }
        }
    }
}

impl<K: fmt::Debug, C: fmt::Debug> fmt::Display for DropError<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(why) => write!(f, "invalid drop: {why}"),
            Self::SelfDrop { node } => write!(f, "node {node:?} cannot be dropped onto itself"),
            Self::CircularReference { node, parent } => write!(
                f,
                "moving {node:?} under {parent:?} would make it its own ancestor"
            ),
            Self::NotFound(Missing::Node(k)) => write!(f, "node {k:?} does not exist"),
            Self::NotFound(Missing::Parent(k)) => write!(f, "parent {k:?} does not exist"),
            Self::NotFound(Missing::Reference(k)) => {
                write!(f, "reference node {k:?} is not a sibling under the given parent")
            }
            Self::NotFound(Missing::Container(c)) => {
                write!(f, "container {c:?} does not exist")
            }
            Self::StaleTarget { target } => {
                write!(f, "drop target {target:?} vanished before the drop")
            }
        }
    }
}

impl<K: fmt::Debug, C: fmt::Debug> core::error::Error for DropError<K, C> {}

impl<K, C> From<Invalid> for DropError<K, C> {
    fn from(why: Invalid) -> Self {
        Self::Validation(why)
    }
}

impl<K, C> From<Missing<K, C>> for DropError<K, C> {
    fn from(missing: Missing<K, C>) -> Self {
        Self::NotFound(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn display_names_the_offender() {
        let e: DropError<u32, u32> = DropError::CircularReference { node: 1, parent: 4 };
        assert_eq!(
            format!("{e}"),
            "moving 1 under 4 would make it its own ancestor"
        );
        let e: DropError<u32, u32> = DropError::NotFound(Missing::Container(9));
        assert_eq!(format!("{e}"), "container 9 does not exist");
        assert_eq!(format!("{e:?}"), "NotFoundError(Container(9))");
    }

    #[test]
    fn invalid_converts() {
        let e: DropError<u32, u32> = Invalid::NotDragging.into();
        assert_eq!(e, DropError::Validation(Invalid::NotDragging));
    }
}
