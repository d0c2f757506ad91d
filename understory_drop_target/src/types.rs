// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared vocabulary: payloads, positions, node kinds, and resolutions.

use alloc::string::String;
use hashbrown::HashMap;
use smallvec::SmallVec;

/// Where a drop lands relative to a candidate node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DropPosition {
    /// Insert as the previous sibling of the candidate.
    Before,
    /// Insert as the next sibling of the candidate.
    After,
    /// Insert as the last child of the candidate.
    Inside,
}

impl DropPosition {
    /// The single-member [`DropPositions`] set for this position.
    pub const fn flag(self) -> DropPositions {
        match self {
            Self::Before => DropPositions::BEFORE,
            Self::After => DropPositions::AFTER,
            Self::Inside => DropPositions::INSIDE,
        }
    }
}

bitflags::bitflags! {
    /// Set of drop positions a target allows.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct DropPositions: u8 {
        /// Dropping before the target is allowed.
        const BEFORE = 0b0000_0001;
        /// Dropping after the target is allowed.
        const AFTER  = 0b0000_0010;
        /// Dropping inside the target is allowed.
        const INSIDE = 0b0000_0100;
    }
}

impl DropPositions {
    /// Returns `true` if `position` is a member of this set.
    pub const fn allows(self, position: DropPosition) -> bool {
        self.contains(position.flag())
    }

    /// Returns the only member if this set has exactly one.
    pub fn single(self) -> Option<DropPosition> {
        if self == Self::BEFORE {
            Some(DropPosition::Before)
        } else if self == Self::AFTER {
            Some(DropPosition::After)
        } else if self == Self::INSIDE {
            Some(DropPosition::Inside)
        } else {
            None
        }
    }

    /// Default positions for a node kind: containers allow all three, leaves only siblings.
    pub const fn for_kind(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Container => Self::all(),
            NodeKind::Leaf => Self::BEFORE.union(Self::AFTER),
        }
    }
}

bitflags::bitflags! {
    /// Set of payload kinds a target accepts.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PayloadKinds: u8 {
        /// Not-yet-instantiated component definitions (palette drags).
        const DEFINITION = 0b0000_0001;
        /// Existing nodes being relocated.
        const INSTANCE   = 0b0000_0010;
    }
}

impl Default for PayloadKinds {
    fn default() -> Self {
        Self::all()
    }
}

/// Kind of a visual node participating in drag and drop.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// May hold children and accept `Inside` drops.
    Container,
    /// Holds no children; typically only `Before`/`After`.
    Leaf,
}

/// Where a drag started.
///
/// Palette drags never count as cross-container, whatever container they are
/// dropped into.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PayloadOrigin<C> {
    /// The component palette.
    Palette,
    /// A container tree in the layout.
    Container(C),
}

/// What is being dragged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PayloadSource<K, D> {
    /// A component definition to instantiate on drop.
    Definition(D),
    /// An existing node to relocate on drop.
    Instance(K),
}

/// Free-form key/value annotations carried by a payload.
pub type Metadata = HashMap<String, String>;

/// Ancestor chain of a node, ordered root → parent (the node itself excluded).
pub type Ancestry<K> = SmallVec<[K; 8]>;

/// Data describing the active drag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DragPayload<K, C, D> {
    /// The definition or node being dragged.
    pub source: PayloadSource<K, D>,
    /// Where the drag started.
    pub origin: PayloadOrigin<C>,
    /// Annotations supplied by the drag source.
    pub metadata: Metadata,
}

impl<K, C, D> DragPayload<K, C, D> {
    /// A palette drag of a component definition.
    pub fn definition(definition: D) -> Self {
        Self {
            source: PayloadSource::Definition(definition),
            origin: PayloadOrigin::Palette,
            metadata: Metadata::new(),
        }
    }

    /// A drag of an existing node out of `container`.
    pub fn instance(node: K, container: C) -> Self {
        Self {
            source: PayloadSource::Instance(node),
            origin: PayloadOrigin::Container(container),
            metadata: Metadata::new(),
        }
    }

    /// Override the origin (for example a definition dragged out of a container's toolbox).
    pub fn with_origin(mut self, origin: PayloadOrigin<C>) -> Self {
        self.origin = origin;
        self
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The payload kind as a single-member [`PayloadKinds`] set.
    pub fn kind(&self) -> PayloadKinds {
        match self.source {
            PayloadSource::Definition(_) => PayloadKinds::DEFINITION,
            PayloadSource::Instance(_) => PayloadKinds::INSTANCE,
        }
    }

    /// The dragged node, for instance payloads.
    pub fn instance_id(&self) -> Option<&K> {
        match &self.source {
            PayloadSource::Instance(k) => Some(k),
            PayloadSource::Definition(_) => None,
        }
    }
}

impl<K, C: PartialEq, D> DragPayload<K, C, D> {
    /// Returns `true` if dropping into `container` leaves the origin's tree.
    pub fn is_cross_container(&self, container: &C) -> bool {
        match &self.origin {
            PayloadOrigin::Palette => false,
            PayloadOrigin::Container(c) => c != container,
        }
    }
}

/// The node a resolution points at.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DropTarget<K> {
    /// The implicit root of the scope container.
    Root,
    /// A registered node.
    Node(K),
}

impl<K: Copy> DropTarget<K> {
    /// The node id, or `None` for the container root.
    pub fn node(&self) -> Option<K> {
        match self {
            Self::Root => None,
            Self::Node(k) => Some(*k),
        }
    }
}

/// The current best answer to "what would happen if the user dropped now".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropResolution<K, C> {
    /// The resolved target.
    pub target: DropTarget<K>,
    /// The container tree the target belongs to.
    pub container: C,
    /// Where relative to the target the drop would land.
    pub position: DropPosition,
    /// Whether the target can hold children.
    pub is_container: bool,
    /// The target's parent as seen by the rendering layer; `None` for roots.
    pub parent: Option<K>,
    /// Whether the drop would be accepted.
    pub can_drop: bool,
}

impl<K: PartialEq, C: PartialEq> DropResolution<K, C> {
    /// Returns `true` if both resolutions name the same target and position.
    ///
    /// Only these fields drive indicator updates; `can_drop` and `parent`
    /// changes on the same target are not reported as a new resolution.
    pub fn same_target(&self, other: &Self) -> bool {
        self.target == other.target
            && self.container == other.container
            && self.position == other.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_position_detection() {
        assert_eq!(DropPositions::INSIDE.single(), Some(DropPosition::Inside));
        assert_eq!(DropPositions::BEFORE.single(), Some(DropPosition::Before));
        assert_eq!((DropPositions::BEFORE | DropPositions::AFTER).single(), None);
        assert_eq!(DropPositions::empty().single(), None);
    }

    #[test]
    fn kind_defaults() {
        assert_eq!(
            DropPositions::for_kind(NodeKind::Leaf),
            DropPositions::BEFORE | DropPositions::AFTER
        );
        assert!(DropPositions::for_kind(NodeKind::Container).allows(DropPosition::Inside));
    }

    #[test]
    fn palette_is_never_cross_container() {
        let p: DragPayload<u32, u32, &str> = DragPayload::definition("button");
        assert!(!p.is_cross_container(&7));
        assert_eq!(p.kind(), PayloadKinds::DEFINITION);
        assert_eq!(p.instance_id(), None);

        let i: DragPayload<u32, u32, &str> = DragPayload::instance(3, 1);
        assert!(!i.is_cross_container(&1));
        assert!(i.is_cross_container(&2));
        assert_eq!(i.instance_id(), Some(&3));
    }

    #[test]
    fn same_target_ignores_can_drop() {
        let a = DropResolution {
            target: DropTarget::Node(1_u32),
            container: 0_u32,
            position: DropPosition::Before,
            is_container: false,
            parent: None,
            can_drop: true,
        };
        let b = DropResolution {
            can_drop: false,
            ..a.clone()
        };
        assert!(a.same_target(&b));
        let c = DropResolution {
            position: DropPosition::After,
            ..a.clone()
        };
        assert!(!a.same_target(&c));
    }
}
