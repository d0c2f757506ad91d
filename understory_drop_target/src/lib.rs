// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_drop_target --heading-base-level=0

//! Understory Drop Target: where would a drop land right now?
//!
//! ## Overview
//!
//! This crate answers the spatial half of drag and drop for visual editors.
//! Given a pointer position, it hit-tests the visual nodes that are currently
//! mounted, ranks them from most to least specific, and classifies the winner
//! as a drop `Before`, `After`, or `Inside` it.
//!
//! It does not mutate any tree and does not track the drag itself; see
//! `understory_component_tree` for applying drops and `understory_drag_session`
//! for the session state machine.
//!
//! ## Pieces
//!
//! - [`TargetRegistry`](registry::TargetRegistry): nodes register on mount and
//!   unregister on unmount, supplying bounds and ancestry as callbacks so the
//!   registry never holds stale geometry.
//! - [`SpatialResolver`](resolver::SpatialResolver): linear point-in-rect scan
//!   over one scope, ranked by container depth then registration recency.
//! - [`classify`](classify::classify): the before/after/inside decision for one
//!   candidate, driven by [`ClassifyConfig`](classify::ClassifyConfig).
//! - [`types`]: payloads, positions, and [`DropResolution`](types::DropResolution).
//! - [`error`]: the error taxonomy shared with the mutation and session crates.
//!
//! ## Example
//!
//! ```rust
//! use kurbo::{Point, Rect};
//! use smallvec::smallvec;
//! use understory_drop_target::registry::{Registration, TargetRegistry};
//! use understory_drop_target::resolver::SpatialResolver;
//! use understory_drop_target::types::{DragPayload, DropPosition, DropTarget, NodeKind};
//!
//! let mut registry: TargetRegistry<u32, u32> = TargetRegistry::new();
//! // A column container in scope 0, holding one leaf.
//! registry.register(Registration::new(
//!     1,
//!     0,
//!     NodeKind::Container,
//!     || Rect::new(0.0, 0.0, 200.0, 400.0),
//!     || smallvec![],
//! ));
//! registry.register(Registration::new(
//!     2,
//!     0,
//!     NodeKind::Leaf,
//!     || Rect::new(10.0, 10.0, 190.0, 50.0),
//!     || smallvec![1],
//! ));
//!
//! let payload: DragPayload<u32, u32, &str> = DragPayload::definition("button");
//! let resolver = SpatialResolver::default();
//!
//! // Lower half of the leaf: after it.
//! let r = resolver.resolve(&registry, Point::new(20.0, 45.0), &0, &payload);
//! assert_eq!((r.target, r.position), (DropTarget::Node(2), DropPosition::After));
//!
//! // Middle of the container: inside it.
//! let r = resolver.resolve(&registry, Point::new(20.0, 200.0), &0, &payload);
//! assert_eq!((r.target, r.position), (DropTarget::Node(1), DropPosition::Inside));
//!
//! // Nowhere: the scope root.
//! let r = resolver.resolve(&registry, Point::new(900.0, 900.0), &0, &payload);
//! assert_eq!((r.target, r.position), (DropTarget::Root, DropPosition::Inside));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod classify;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod types;

pub use error::{DropError, Invalid, Missing};
pub use registry::{Registration, TargetRegistry};
pub use resolver::{Candidate, ResolverConfig, SpatialResolver, TieBreakPolicy};
pub use types::{
    Ancestry, DragPayload, DropPosition, DropPositions, DropResolution, DropTarget, Metadata,
    NodeKind, PayloadKinds, PayloadOrigin, PayloadSource,
};
