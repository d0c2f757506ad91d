// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A palette and two canvases: drop, reorder, and drag across trees.
//!
//! This example shows how to combine:
//! - `understory_drop_target` for registering mounted nodes and resolving drops,
//! - `understory_component_tree` for the component forest and its mutator,
//! - `understory_drag_session` for the session state machine and pointer events.
//!
//! Run:
//! - `cargo run -p understory_demos --example palette_drop`

use kurbo::{Point, Rect};
use understory_component_tree::{ContainerId, Forest, NodeId};
use understory_drag_session::{DragDropContext, IndicatorPresenter};
use understory_drop_target::{DragPayload, DropResolution, DropTarget, NodeKind, Registration};

/// Prints indicator changes instead of painting them.
#[derive(Debug, Default)]
struct ConsoleIndicator;

impl IndicatorPresenter<NodeId, ContainerId> for ConsoleIndicator {
    fn show(&mut self, r: &DropResolution<NodeId, ContainerId>) {
        let mark = if r.can_drop { "" } else { " (blocked)" };
        match r.target {
            DropTarget::Root => println!("  indicator: canvas root, {:?}{mark}", r.position),
            DropTarget::Node(id) => println!("  indicator: {id:?}, {:?}{mark}", r.position),
        }
    }

    fn clear(&mut self) {
        println!("  indicator: cleared");
    }
}

type Editor = DragDropContext<Forest<String>, &'static str, ConsoleIndicator>;

/// Lay out each container's rows top to bottom and register them.
///
/// Real editors register on mount with live bounds callbacks; this demo
/// re-registers after every change instead.
fn mount(cx: &mut Editor, canvas: ContainerId, origin_x: f64) {
    let walk = cx.store().depth_first(canvas);
    for (row, (depth, id)) in walk.into_iter().enumerate() {
        let is_column = cx
            .store()
            .get(id)
            .is_some_and(|name| name.starts_with("column"));
        let kind = if is_column {
            NodeKind::Container
        } else {
            NodeKind::Leaf
        };
        let ancestry = cx.store().ancestors(id).unwrap_or_default();
        let indent = 20.0 * f64::from(u8::try_from(depth).unwrap_or(u8::MAX));
        let top = 40.0 * f64::from(u16::try_from(row).unwrap_or(u16::MAX));
        // Columns span the rows of their subtree; leaves are one row tall.
        let rows = cx.store().subtree(id).len();
        let height = 40.0 * f64::from(u16::try_from(rows).unwrap_or(u16::MAX)) - 4.0;
        let bounds = Rect::new(origin_x + indent, top, origin_x + 300.0, top + height);

        cx.unregister_node(id);
        cx.register_node(Registration::new(
            id,
            canvas,
            kind,
            move || bounds,
            move || ancestry.clone(),
        ));
    }
}

fn print_canvas(cx: &Editor, canvas: ContainerId, title: &str) {
    println!("{title}:");
    for (depth, id) in cx.store().depth_first(canvas) {
        let name = cx.store().get(id).map_or("?", String::as_str);
        println!("  {}{name}", "  ".repeat(depth));
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .init();

    let mut forest: Forest<String> = Forest::new();
    let left = forest.add_container();
    let right = forest.add_container();
    let mut cx: Editor =
        DragDropContext::new(forest, ConsoleIndicator, |d: &&str| (*d).to_string());

    // Palette drop onto the empty left canvas.
    println!("drag `column` from the palette onto the left canvas");
    cx.start_drag(DragPayload::definition("column"));
    cx.pointer_move(Point::new(50.0, 50.0), left);
    let column = cx
        .pointer_up(Point::new(50.0, 50.0), left)
        .expect("empty canvas accepts a drop at its root")
        .node;

    for name in ["title", "body", "footer"] {
        cx.mutator_mut()
            .add_child(left, Some(column), name.to_string(), None)
            .expect("column exists");
    }
    mount(&mut cx, left, 0.0);
    print_canvas(&cx, left, "left");

    // Rows sit at y = 40, 80, 120 under the column at y = 0.
    let footer = cx.store().children_of(column)[2];
    println!("drag `footer` above `title`");
    cx.start_drag(DragPayload::instance(footer, left));
    cx.pointer_move(Point::new(100.0, 45.0), left);
    match cx.pointer_up(Point::new(100.0, 45.0), left) {
        Ok(outcome) => println!("  moved {:?}", outcome.node),
        Err(err) => println!("  rejected: {err}"),
    }
    mount(&mut cx, left, 0.0);
    print_canvas(&cx, left, "left");

    println!("drag the column onto one of its own rows");
    cx.start_drag(DragPayload::instance(column, left));
    cx.pointer_move(Point::new(100.0, 90.0), left);
    if let Err(err) = cx.pointer_up(Point::new(100.0, 90.0), left) {
        println!("  rejected: {err}");
    }

    println!("drag the column onto the right canvas");
    let unmounted = cx.store().subtree(column);
    cx.start_drag(DragPayload::instance(column, left));
    cx.pointer_move(Point::new(400.0, 50.0), right);
    if let Ok(outcome) = cx.pointer_up(Point::new(400.0, 50.0), right) {
        println!("  created {:?}", outcome.node);
    }
    for id in unmounted {
        cx.unregister_node(id);
    }
    mount(&mut cx, right, 340.0);
    print_canvas(&cx, left, "left");
    print_canvas(&cx, right, "right");

    println!("start a drag, then the window loses focus");
    cx.start_drag(DragPayload::definition("button"));
    cx.pointer_move(Point::new(400.0, 10.0), right);
    cx.focus_lost();
    println!("  dragging: {}", cx.session().is_dragging());
}
