// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end drags through an editor context: palette, reorder, transfer, and
//! the safety nets that end a drag without touching the tree.

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::{Point, Rect};
use smallvec::smallvec;
use understory_component_tree::{ContainerId, Forest, NodeId, TreeChange, TreeError};
use understory_drag_session::{DragDropContext, EndReason, IndicatorPresenter, SessionEvent};
use understory_drop_target::{
    Ancestry, DragPayload, DropPosition, DropResolution, DropTarget, NodeKind, Registration,
};

#[derive(Debug, Default)]
struct Overlay {
    log: Vec<String>,
}

impl IndicatorPresenter<NodeId, ContainerId> for Overlay {
    fn show(&mut self, r: &DropResolution<NodeId, ContainerId>) {
        let target = match r.target {
            DropTarget::Root => "root".to_string(),
            DropTarget::Node(id) => format!("{id:?}"),
        };
        self.log.push(format!("show {target} {:?}", r.position));
    }

    fn clear(&mut self) {
        self.log.push("clear".to_string());
    }
}

type Editor = DragDropContext<Forest<String>, &'static str, Overlay>;

/// Two side-by-side canvases. The left one holds a column with three rows.
struct Scene {
    cx: Editor,
    left: ContainerId,
    right: ContainerId,
    column: NodeId,
    rows: [NodeId; 3],
}

const COLUMN: Rect = Rect::new(0.0, 0.0, 300.0, 400.0);

fn row_rect(i: usize) -> Rect {
    let top = 100.0 + 60.0 * f64::from(u8::try_from(i).unwrap());
    Rect::new(20.0, top, 280.0, top + 50.0)
}

fn scene() -> Scene {
    let mut forest: Forest<String> = Forest::new();
    let left = forest.add_container();
    let right = forest.add_container();
    let column = forest.insert(left, None, "column".into()).unwrap();
    let rows = ["a", "b", "c"].map(|name| forest.insert(left, Some(column), name.into()).unwrap());

    let mut cx: Editor =
        DragDropContext::new(forest, Overlay::default(), |d: &&str| d.to_string());
    cx.register_node(Registration::new(
        column,
        left,
        NodeKind::Container,
        || COLUMN,
        || smallvec![],
    ));
    for (i, row) in rows.iter().enumerate() {
        cx.register_node(Registration::new(
            *row,
            left,
            NodeKind::Leaf,
            move || row_rect(i),
            move || -> Ancestry<NodeId> { smallvec![column] },
        ));
    }
    Scene {
        cx,
        left,
        right,
        column,
        rows,
    }
}

#[test]
fn palette_drop_between_rows() {
    let Scene {
        mut cx,
        left,
        column,
        rows: [a, b, c],
        ..
    } = scene();

    cx.start_drag(DragPayload::definition("button"));
    // Lower half of row `a`.
    let r = cx.pointer_move(Point::new(50.0, 140.0), left).cloned().unwrap();
    assert_eq!(r.target, DropTarget::Node(a));
    assert_eq!(r.position, DropPosition::After);
    assert_eq!(r.parent, Some(column));

    let outcome = cx.pointer_up(Point::new(50.0, 140.0), left).unwrap();
    let new = outcome.node;
    assert_eq!(cx.store().children_of(column), &[a, new, b, c]);
    assert_eq!(cx.store().get(new).map(String::as_str), Some("button"));
    assert_eq!(
        cx.session().presenter().log,
        [format!("show {a:?} After"), "clear".to_string()]
    );
}

#[test]
fn instance_reorder_within_column() {
    let Scene {
        mut cx,
        left,
        column,
        rows: [a, b, c],
        ..
    } = scene();

    cx.start_drag(DragPayload::instance(c, left));
    // Upper half of row `a`.
    cx.pointer_move(Point::new(50.0, 110.0), left);
    let outcome = cx.pointer_up(Point::new(50.0, 110.0), left).unwrap();

    assert_eq!(outcome.node, c, "same-container moves keep identity");
    assert_eq!(cx.store().children_of(column), &[c, a, b]);
}

#[test]
fn release_point_wins_over_last_hover() {
    let Scene {
        mut cx,
        left,
        column,
        rows: [a, b, c],
        ..
    } = scene();

    cx.start_drag(DragPayload::definition("button"));
    cx.pointer_move(Point::new(50.0, 110.0), left);
    // The pointer jumped to the end of row `c` without another move event.
    let outcome = cx.pointer_up(Point::new(50.0, 245.0), left).unwrap();
    assert_eq!(outcome.resolution.target, DropTarget::Node(c));
    assert_eq!(cx.store().children_of(column), &[a, b, c, outcome.node]);
}

#[test]
fn cross_canvas_drag_transfers_a_copy() {
    let Scene {
        mut cx,
        left,
        right,
        column,
        rows: [a, b, c],
    } = scene();
    let changes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&changes);
    cx.mutator_mut()
        .subscribe(move |change| sink.borrow_mut().push(change.clone()));

    cx.start_drag(DragPayload::instance(b, left));
    // Nothing is registered on the right canvas: the drop lands on its root.
    let r = cx.pointer_move(Point::new(10.0, 10.0), right).cloned().unwrap();
    assert_eq!((r.target, r.position), (DropTarget::Root, DropPosition::Inside));
    let outcome = cx.pointer_up(Point::new(10.0, 10.0), right).unwrap();

    let store = cx.store();
    assert!(!store.is_alive(b));
    assert_eq!(store.children_of(column), &[a, c]);
    assert_eq!(store.roots(right), &[outcome.node]);
    assert_eq!(store.get(outcome.node).map(String::as_str), Some("b"));
    assert!(matches!(
        changes.borrow().as_slice(),
        [TreeChange::Transferred { from, to, removed, .. }]
            if *from == left && *to == right && *removed == b
    ));
}

#[test]
fn dropping_a_node_on_itself_is_rejected() {
    let Scene {
        mut cx,
        left,
        rows: [a, b, c],
        column,
        ..
    } = scene();
    let before = cx.store().clone();

    cx.start_drag(DragPayload::instance(b, left));
    let r = cx.pointer_move(Point::new(50.0, 170.0), left).cloned().unwrap();
    assert_eq!(r.target, DropTarget::Node(b));
    assert!(!r.can_drop);

    assert_eq!(
        cx.pointer_up(Point::new(50.0, 170.0), left),
        Err(TreeError::SelfDrop { node: b })
    );
    assert!(*cx.store() == before, "tree must be unchanged");
    assert_eq!(cx.store().children_of(column), &[a, b, c]);
    assert!(!cx.session().is_dragging());
    assert_eq!(cx.session().presenter().log.last().map(String::as_str), Some("clear"));
}

#[test]
fn dragging_a_container_into_itself_is_flagged() {
    let Scene {
        mut cx,
        left,
        column,
        rows: [a, ..],
        ..
    } = scene();

    cx.start_drag(DragPayload::instance(column, left));
    let r = cx.pointer_move(Point::new(50.0, 110.0), left).cloned().unwrap();
    assert_eq!(r.target, DropTarget::Node(a));
    assert!(!r.can_drop, "row `a` lives inside the dragged column");
    assert_eq!(
        cx.pointer_up(Point::new(50.0, 110.0), left),
        Err(TreeError::SelfDrop { node: column })
    );
}

#[test]
fn safety_nets_end_the_drag_without_mutation() {
    let Scene { mut cx, left, .. } = scene();
    let ended = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&ended);
    cx.session_mut().subscribe(move |event| {
        if let SessionEvent::Ended(reason) = event {
            sink.borrow_mut().push(*reason);
        }
    });
    let before = cx.store().clone();

    for lose in [
        Editor::pointer_capture_lost,
        Editor::focus_lost,
        Editor::visibility_lost,
        Editor::cancel,
    ] {
        cx.start_drag(DragPayload::definition("button"));
        cx.pointer_move(Point::new(50.0, 110.0), left);
        assert!(lose(&mut cx));
        assert!(!lose(&mut cx), "second force-end is a no-op");
    }

    assert!(*cx.store() == before);
    assert_eq!(
        *ended.borrow(),
        [
            EndReason::PointerCaptureLost,
            EndReason::FocusLost,
            EndReason::VisibilityLost,
            EndReason::Cancelled,
        ]
    );
}

#[test]
fn unregistered_nodes_stop_being_targets() {
    let Scene {
        mut cx,
        left,
        column,
        rows: [a, ..],
        ..
    } = scene();
    assert!(cx.unregister_node(a));
    assert!(!cx.unregister_node(a));

    cx.start_drag(DragPayload::definition("button"));
    let r = cx.pointer_move(Point::new(50.0, 110.0), left).cloned().unwrap();
    assert_eq!(r.target, DropTarget::Node(column));
}

#[cfg(feature = "tracing")]
mod logging {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    struct CountWarnings(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for CountWarnings {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn rejected_drops_are_logged() {
        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber =
            tracing_subscriber::registry().with(CountWarnings(Arc::clone(&warnings)));

        tracing::subscriber::with_default(subscriber, || {
            let Scene {
                mut cx,
                left,
                rows: [_, b, _],
                ..
            } = scene();
            cx.start_drag(DragPayload::instance(b, left));
            assert!(cx.pointer_up(Point::new(50.0, 170.0), left).is_err());
        });

        assert!(warnings.load(Ordering::SeqCst) >= 1);
    }
}
