// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_component_tree --heading-base-level=0

//! Understory Component Tree: the component hierarchy behind a visual editor.
//!
//! ## Overview
//!
//! An editor canvas holds one or more independent container trees. Each tree
//! is a flat set of nodes with an optional parent and a total sibling order.
//! This crate stores those trees and applies drops to them without ever
//! producing a cycle, a duplicate sibling, or a node in two containers.
//!
//! - [`Forest`]: generational node storage across containers, with ordered
//!   children, ancestry, and depth-first walks.
//! - [`TreeStore`]: the storage seam. `Forest` implements it; an application
//!   with its own document model can implement it instead.
//! - [`HierarchyMutator`]: validated `add_child`, `move_node`, `reorder`, and
//!   composite [`apply_drop`](HierarchyMutator::apply_drop). A rejected call
//!   changes nothing; a committed call emits one [`TreeChange`].
//!
//! Moving a node into a different container copies its subtree into the
//! destination as new identities and removes the original, so a node is never
//! aliased across trees.
//!
//! ## Example
//!
//! ```rust
//! use understory_component_tree::{Forest, HierarchyMutator};
//! use understory_drop_target::{DragPayload, DropPosition, DropResolution, DropTarget};
//!
//! let mut forest: Forest<String> = Forest::new();
//! let left = forest.add_container();
//! let right = forest.add_container();
//! let mut m = HierarchyMutator::new(forest);
//!
//! // A palette drop into the empty left canvas.
//! let payload = DragPayload::definition("card");
//! let drop = DropResolution {
//!     target: DropTarget::Root,
//!     container: left,
//!     position: DropPosition::Inside,
//!     is_container: true,
//!     parent: None,
//!     can_drop: true,
//! };
//! let card = m.apply_drop(&drop, &payload, |name| name.to_string()).unwrap();
//! assert_eq!(m.store().roots(left), &[card]);
//!
//! // Dragging it over to the right canvas creates a new identity there.
//! let moved = m.move_node(left, card, None, Some(right)).unwrap();
//! assert!(m.store().roots(left).is_empty());
//! assert_eq!(m.store().get(moved).map(String::as_str), Some("card"));
//! ```
//!
//! This crate is `no_std` and uses `alloc`. Enable the `tracing` feature (on by
//! default) to log committed and rejected mutations.

#![no_std]

extern crate alloc;

mod change;
mod forest;
mod mutator;
mod store;
mod types;

pub use change::TreeChange;
pub use forest::Forest;
pub use mutator::{ChangeSubscription, HierarchyMutator};
pub use store::TreeStore;
pub use types::{ContainerId, NodeId, NodeView, Placement, TreeError};
