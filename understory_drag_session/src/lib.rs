// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_drag_session --heading-base-level=0

//! Understory Drag Session: one drag at a time, from pick-up to drop.
//!
//! ## Overview
//!
//! - [`DragSession`]: the `Idle`/`Dragging` state machine. It holds the
//!   payload and the current [`DropResolution`](understory_drop_target::DropResolution),
//!   reports only real changes, and drives an [`IndicatorPresenter`].
//! - [`DragDropContext`]: the object an editor session owns. It wires a
//!   [`TargetRegistry`](understory_drop_target::TargetRegistry) and
//!   [`SpatialResolver`](understory_drop_target::SpatialResolver) to the session
//!   and a [`HierarchyMutator`](understory_component_tree::HierarchyMutator),
//!   and exposes the pointer events a UI toolkit delivers.
//!
//! There is no global drag state: create a context when an editor opens and
//! drop it when the editor closes.
//!
//! ## Example
//!
//! ```rust
//! use kurbo::{Point, Rect};
//! use smallvec::smallvec;
//! use understory_component_tree::Forest;
//! use understory_drag_session::{DragDropContext, NoIndicator};
//! use understory_drop_target::{DragPayload, NodeKind, Registration};
//!
//! let mut forest: Forest<String> = Forest::new();
//! let canvas = forest.add_container();
//! let column = forest.insert(canvas, None, "column".into()).unwrap();
//!
//! let mut cx: DragDropContext<Forest<String>, &str> =
//!     DragDropContext::new(forest, NoIndicator, |d: &&str| d.to_string());
//! cx.register_node(Registration::new(
//!     column,
//!     canvas,
//!     NodeKind::Container,
//!     || Rect::new(0.0, 0.0, 300.0, 400.0),
//!     || smallvec![],
//! ));
//!
//! cx.start_drag(DragPayload::definition("button"));
//! cx.pointer_move(Point::new(150.0, 200.0), canvas);
//! let outcome = cx.pointer_up(Point::new(150.0, 200.0), canvas).unwrap();
//!
//! assert_eq!(cx.store().children_of(column), &[outcome.node]);
//! assert!(!cx.session().is_dragging());
//! ```
//!
//! This crate is `no_std` and uses `alloc`. With the `tracing` feature (on by
//! default) session transitions and rejected drops are logged.

#![no_std]

extern crate alloc;

mod context;
mod session;

pub use context::{DragDropContext, DropOutcome};
pub use session::{
    DragSession, EndReason, IndicatorPresenter, NoIndicator, Phase, SessionEvent,
    SessionSubscription,
};
