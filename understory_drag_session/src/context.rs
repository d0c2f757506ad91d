// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The editor-owned context that turns pointer events into drops.

use alloc::boxed::Box;
use core::fmt;

use kurbo::Point;
use understory_component_tree::{ContainerId, HierarchyMutator, NodeId, TreeError, TreeStore};
use understory_drop_target::{
    DragPayload, DropResolution, DropTarget, Invalid, Registration, ResolverConfig,
    SpatialResolver, TargetRegistry,
};

use crate::session::{DragSession, EndReason, IndicatorPresenter, NoIndicator};

/// A drop that the tree accepted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropOutcome {
    /// The node that now sits where the drop landed: the new node for
    /// palette drops and cross-container moves, the moved node otherwise.
    pub node: NodeId,
    /// The resolution that was applied (recomputed at the release point).
    pub resolution: DropResolution<NodeId, ContainerId>,
}

/// Everything one editor session needs for drag and drop.
///
/// The context owns the target registry, the resolver, the single
/// [`DragSession`], and the [`HierarchyMutator`] over the editor's tree store.
/// Create one per editor session and hand it to the rendering layer (which
/// registers nodes), the drag sources (which start drags), and the pointer
/// event source.
///
/// Pointer-up always ends the drag, whether the drop was applied or rejected.
/// Losing pointer capture, focus, or visibility ends it without touching the
/// tree.
pub struct DragDropContext<S: TreeStore, D, P = NoIndicator> {
    registry: TargetRegistry<NodeId, ContainerId>,
    resolver: SpatialResolver,
    session: DragSession<NodeId, ContainerId, D, P>,
    mutator: HierarchyMutator<S>,
    instantiate: Box<dyn FnMut(&D) -> S::Content>,
}

impl<S, D, P> fmt::Debug for DragDropContext<S, D, P>
where
    S: TreeStore + fmt::Debug,
    P: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragDropContext")
            .field("registry", &self.registry)
            .field("resolver", &self.resolver)
            .field("session", &self.session)
            .field("mutator", &self.mutator)
            .finish_non_exhaustive()
    }
}

impl<S, D, P> DragDropContext<S, D, P>
where
    S: TreeStore,
    S::Content: Clone,
    P: IndicatorPresenter<NodeId, ContainerId>,
{
    /// Create a context over `store`.
    ///
    /// `instantiate` turns a dragged component definition into node content
    /// when a palette drag is dropped.
    pub fn new(
        store: S,
        presenter: P,
        instantiate: impl FnMut(&D) -> S::Content + 'static,
    ) -> Self {
        Self {
            registry: TargetRegistry::new(),
            resolver: SpatialResolver::default(),
            session: DragSession::new(presenter),
            mutator: HierarchyMutator::new(store),
            instantiate: Box::new(instantiate),
        }
    }

    /// Replace the resolver configuration.
    pub fn with_resolver_config(mut self, config: ResolverConfig) -> Self {
        self.resolver.set_config(config);
        self
    }

    /// Register a mounted visual node. Returns `false` if it was already registered.
    pub fn register_node(&mut self, registration: Registration<NodeId, ContainerId>) -> bool {
        self.registry.register(registration)
    }

    /// Unregister an unmounted visual node. Returns `false` if it was absent.
    pub fn unregister_node(&mut self, id: NodeId) -> bool {
        self.registry.unregister(&id)
    }

    /// The target registry.
    pub fn registry(&self) -> &TargetRegistry<NodeId, ContainerId> {
        &self.registry
    }

    /// The resolver.
    pub fn resolver(&self) -> &SpatialResolver {
        &self.resolver
    }

    /// The drag session.
    pub fn session(&self) -> &DragSession<NodeId, ContainerId, D, P> {
        &self.session
    }

    /// The drag session, mutably (to subscribe or reach the presenter).
    pub fn session_mut(&mut self) -> &mut DragSession<NodeId, ContainerId, D, P> {
        &mut self.session
    }

    /// The mutator.
    pub fn mutator(&self) -> &HierarchyMutator<S> {
        &self.mutator
    }

    /// The mutator, mutably (to subscribe to tree changes).
    pub fn mutator_mut(&mut self) -> &mut HierarchyMutator<S> {
        &mut self.mutator
    }

    /// The tree store.
    pub fn store(&self) -> &S {
        self.mutator.store()
    }

    /// Tear the context down and keep the store.
    pub fn into_store(self) -> S {
        self.mutator.into_store()
    }

    /// A drag source picked something up.
    pub fn start_drag(&mut self, payload: DragPayload<NodeId, ContainerId, D>) {
        self.session.start_drag(payload);
    }

    /// The pointer moved over `scope`.
    ///
    /// Recomputes the resolution and stores it in the session. Ignored while
    /// idle.
    pub fn pointer_move(
        &mut self,
        point: Point,
        scope: ContainerId,
    ) -> Option<&DropResolution<NodeId, ContainerId>> {
        let resolution = self.resolve_at(point, scope)?;
        // Only fails when idle, which `resolve_at` already ruled out.
        let _ = self.session.update_target(resolution);
        self.session.current_target()
    }

    /// The pointer was released over `scope`.
    ///
    /// The drop is resolved again at the release point so the applied
    /// resolution is never stale, then handed to the mutator. The session is
    /// idle afterwards in every case.
    pub fn pointer_up(
        &mut self,
        point: Point,
        scope: ContainerId,
    ) -> Result<DropOutcome, TreeError> {
        let Some(resolution) = self.resolve_at(point, scope) else {
            return Err(Invalid::NotDragging.into());
        };
        let _ = self.session.update_target(resolution.clone());

        let result = match self.session.payload() {
            Some(payload) => {
                let instantiate = &mut self.instantiate;
                self.mutator
                    .apply_drop(&resolution, payload, |definition| instantiate(definition))
            }
            None => Err(Invalid::NotDragging.into()),
        };

        match result {
            Ok(node) => {
                self.session.end_drag(EndReason::Dropped);
                Ok(DropOutcome { node, resolution })
            }
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    message = "drop rejected",
                    error = %err,
                    target = ?resolution.target,
                    container = ?resolution.container,
                );
                self.session.end_drag(EndReason::Rejected);
                Err(err)
            }
        }
    }

    /// Explicit cancel (for example Escape). Returns `true` if a drag ended.
    pub fn cancel(&mut self) -> bool {
        self.force_end(EndReason::Cancelled)
    }

    /// The pointer capture was lost mid-drag.
    pub fn pointer_capture_lost(&mut self) -> bool {
        self.force_end(EndReason::PointerCaptureLost)
    }

    /// The application lost focus.
    pub fn focus_lost(&mut self) -> bool {
        self.force_end(EndReason::FocusLost)
    }

    /// The editor surface was hidden.
    pub fn visibility_lost(&mut self) -> bool {
        self.force_end(EndReason::VisibilityLost)
    }

    fn force_end(&mut self, reason: EndReason) -> bool {
        self.session.end_drag(reason).is_some()
    }

    /// Resolve the active payload at `point`, or `None` while idle.
    fn resolve_at(
        &self,
        point: Point,
        scope: ContainerId,
    ) -> Option<DropResolution<NodeId, ContainerId>> {
        let payload = self.session.payload()?;
        let mut resolution = self.resolver.resolve(&self.registry, point, &scope, payload);
        if !self.store().has_container(scope) {
            resolution.can_drop = false;
        } else if let DropTarget::Node(target) = resolution.target {
            // The registry can briefly outlive a deleted node.
            if self.store().get_node(target).is_none() {
                resolution.can_drop = false;
            }
        }
        Some(resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::{String, ToString};
    use kurbo::Rect;
    use smallvec::smallvec;
    use understory_component_tree::Forest;
    use understory_drop_target::{DropPosition, NodeKind};

    type Context = DragDropContext<Forest<String>, &'static str>;

    fn context() -> (Context, ContainerId) {
        let mut forest: Forest<String> = Forest::new();
        let canvas = forest.add_container();
        let cx: Context =
            DragDropContext::new(forest, NoIndicator, |d: &&str| (*d).to_string());
        (cx, canvas)
    }

    #[test]
    fn idle_pointer_events_are_ignored() {
        let (mut cx, canvas) = context();
        assert!(cx.pointer_move(Point::new(1.0, 1.0), canvas).is_none());
        assert_eq!(
            cx.pointer_up(Point::new(1.0, 1.0), canvas),
            Err(Invalid::NotDragging.into())
        );
        assert!(!cx.cancel());
    }

    #[test]
    fn palette_drop_on_empty_canvas_lands_at_root() {
        let (mut cx, canvas) = context();
        cx.start_drag(DragPayload::definition("label"));
        let r = cx.pointer_move(Point::new(5.0, 5.0), canvas).cloned().unwrap();
        assert_eq!((r.target, r.position), (DropTarget::Root, DropPosition::Inside));

        let outcome = cx.pointer_up(Point::new(5.0, 5.0), canvas).unwrap();
        assert_eq!(cx.store().roots(canvas), &[outcome.node]);
        assert!(!cx.session().is_dragging());
    }

    #[test]
    fn focus_loss_ends_without_mutation() {
        let (mut cx, canvas) = context();
        cx.start_drag(DragPayload::definition("label"));
        cx.pointer_move(Point::new(5.0, 5.0), canvas);
        assert!(cx.focus_lost());
        assert!(!cx.session().is_dragging());
        assert!(cx.store().is_empty());
        assert!(!cx.visibility_lost(), "already idle");
    }

    #[test]
    fn unknown_scope_cannot_drop() {
        let (mut cx, _) = context();
        let mut other = Forest::<String>::new();
        other.add_container();
        let ghost = other.add_container();
        cx.start_drag(DragPayload::definition("label"));
        let r = cx.pointer_move(Point::new(5.0, 5.0), ghost).cloned().unwrap();
        assert!(!r.can_drop);
        assert!(matches!(
            cx.pointer_up(Point::new(5.0, 5.0), ghost),
            Err(TreeError::NotFound(_))
        ));
        assert!(!cx.session().is_dragging());
    }

    #[test]
    fn registered_target_that_was_deleted_is_stale() {
        let (mut cx, canvas) = context();
        let column = cx
            .mutator_mut()
            .add_child(canvas, None, "column".to_string(), None)
            .unwrap();
        cx.register_node(Registration::new(
            column,
            canvas,
            NodeKind::Container,
            || Rect::new(0.0, 0.0, 100.0, 100.0),
            || smallvec![],
        ));
        cx.start_drag(DragPayload::definition("label"));
        assert!(
            cx.pointer_move(Point::new(50.0, 50.0), canvas)
                .is_some_and(|r| r.can_drop)
        );

        // Deleted between hover and release; the view has not unmounted yet.
        cx.mutator_mut().store_mut().remove(column);
        assert_eq!(
            cx.pointer_up(Point::new(50.0, 50.0), canvas),
            Err(TreeError::StaleTarget { target: column })
        );
        assert!(cx.store().is_empty());
    }
}
