// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drag session state machine and its indicator seam.

use alloc::{boxed::Box, vec::Vec};
use core::fmt;

use understory_drop_target::{DragPayload, DropError, DropResolution, Invalid};

/// Whether a drag is in progress.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No drag is active.
    Idle,
    /// A payload is being dragged.
    Dragging,
}

/// Why a drag ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EndReason {
    /// The payload was dropped and the tree accepted it.
    Dropped,
    /// The payload was dropped and the tree rejected it.
    Rejected,
    /// The user cancelled (for example with Escape).
    Cancelled,
    /// A new drag started while this one was active.
    Replaced,
    /// The pointer capture was lost.
    PointerCaptureLost,
    /// The application lost focus.
    FocusLost,
    /// The editor surface was hidden.
    VisibilityLost,
}

/// A transition reported to [`DragSession::subscribe`] listeners.
#[derive(Debug)]
pub enum SessionEvent<'a, K, C, D> {
    /// A drag started with this payload.
    Started(&'a DragPayload<K, C, D>),
    /// The resolved target changed; `None` when the target was cleared.
    TargetChanged(Option<&'a DropResolution<K, C>>),
    /// The drag ended and the session is idle again.
    Ended(EndReason),
}

/// Renders and clears the drop affordance for the current resolution.
///
/// [`DragSession`] calls [`show`](Self::show) once per resolution change and
/// [`clear`](Self::clear) once when the target is cleared or the drag ends.
pub trait IndicatorPresenter<K, C> {
    /// Show an indicator for `resolution` (its target and position).
    fn show(&mut self, resolution: &DropResolution<K, C>);
    /// Remove any indicator.
    fn clear(&mut self);
}

/// A presenter that draws nothing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct NoIndicator;

impl<K, C> IndicatorPresenter<K, C> for NoIndicator {
    fn show(&mut self, _resolution: &DropResolution<K, C>) {}
    fn clear(&mut self) {}
}

/// Handle returned by [`DragSession::subscribe`], used to unsubscribe.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionSubscription(u64);

type Listener<K, C, D> = (
    SessionSubscription,
    Box<dyn FnMut(&SessionEvent<'_, K, C, D>)>,
);

enum State<K, C, D> {
    Idle,
    Dragging {
        payload: DragPayload<K, C, D>,
        target: Option<DropResolution<K, C>>,
    },
}

/// Tracks the single active drag.
///
/// Exactly one payload can be in flight. Starting a drag while another is
/// active ends the old one first with [`EndReason::Replaced`]. The stored
/// resolution only changes when the target or position changes, which keeps
/// presenters and listeners from flickering on every pointer move.
///
/// ## Example
///
/// ```rust
/// use understory_drag_session::{DragSession, EndReason, NoIndicator, Phase};
/// use understory_drop_target::{DragPayload, DropPosition, DropResolution, DropTarget};
///
/// let mut session: DragSession<u32, u32, &str> = DragSession::new(NoIndicator);
/// session.start_drag(DragPayload::definition("button"));
/// assert_eq!(session.phase(), Phase::Dragging);
///
/// let over_root = DropResolution {
///     target: DropTarget::Root,
///     container: 0,
///     position: DropPosition::Inside,
///     is_container: true,
///     parent: None,
///     can_drop: true,
/// };
/// assert_eq!(session.update_target(over_root.clone()), Ok(true));
/// // Same target and position: nothing to report.
/// assert_eq!(session.update_target(over_root), Ok(false));
///
/// assert!(session.end_drag(EndReason::Cancelled).is_some());
/// assert_eq!(session.phase(), Phase::Idle);
/// ```
pub struct DragSession<K, C, D, P = NoIndicator> {
    state: State<K, C, D>,
    presenter: P,
    listeners: Vec<Listener<K, C, D>>,
    next_subscription: u64,
}

impl<K, C, D, P: fmt::Debug> fmt::Debug for DragSession<K, C, D, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (phase, has_target) = match &self.state {
            State::Idle => (Phase::Idle, false),
            State::Dragging { target, .. } => (Phase::Dragging, target.is_some()),
        };
        f.debug_struct("DragSession")
            .field("phase", &phase)
            .field("has_target", &has_target)
            .field("presenter", &self.presenter)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<K, C, D, P> DragSession<K, C, D, P>
where
    K: Copy + PartialEq + fmt::Debug,
    C: Copy + PartialEq + fmt::Debug,
    P: IndicatorPresenter<K, C>,
{
    /// Create an idle session drawing through `presenter`.
    pub fn new(presenter: P) -> Self {
        Self {
            state: State::Idle,
            presenter,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// The current phase.
    pub fn phase(&self) -> Phase {
        match self.state {
            State::Idle => Phase::Idle,
            State::Dragging { .. } => Phase::Dragging,
        }
    }

    /// Returns `true` while a drag is active.
    pub fn is_dragging(&self) -> bool {
        self.phase() == Phase::Dragging
    }

    /// The payload being dragged.
    pub fn payload(&self) -> Option<&DragPayload<K, C, D>> {
        match &self.state {
            State::Dragging { payload, .. } => Some(payload),
            State::Idle => None,
        }
    }

    /// The resolution currently in effect.
    pub fn current_target(&self) -> Option<&DropResolution<K, C>> {
        match &self.state {
            State::Dragging { target, .. } => target.as_ref(),
            State::Idle => None,
        }
    }

    /// The indicator presenter.
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// The indicator presenter, mutably.
    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Register a listener for session transitions.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&SessionEvent<'_, K, C, D>) + 'static,
    ) -> SessionSubscription {
        let id = SessionSubscription(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was already removed.
    pub fn unsubscribe(&mut self, subscription: SessionSubscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(id, _)| *id != subscription);
        self.listeners.len() != before
    }

    /// Begin dragging `payload`, ending any active drag first.
    pub fn start_drag(&mut self, payload: DragPayload<K, C, D>) {
        if self.is_dragging() {
            self.end_drag(EndReason::Replaced);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "drag started",
            kind = ?payload.kind(),
            origin = ?payload.origin,
        );
        self.state = State::Dragging {
            payload,
            target: None,
        };
        if let State::Dragging { payload, .. } = &self.state {
            notify(&mut self.listeners, &SessionEvent::Started(payload));
        }
    }

    /// Store a new resolution.
    ///
    /// Returns `Ok(true)` if it replaced the previous one, and `Ok(false)` if
    /// it names the same target and position (nothing is updated or reported).
    /// Fails with [`Invalid::NotDragging`] while idle.
    pub fn update_target(
        &mut self,
        resolution: DropResolution<K, C>,
    ) -> Result<bool, DropError<K, C>> {
        let State::Dragging { target, .. } = &mut self.state else {
            return Err(Invalid::NotDragging.into());
        };
        if target.as_ref().is_some_and(|t| t.same_target(&resolution)) {
            return Ok(false);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "drop target changed",
            target = ?resolution.target,
            container = ?resolution.container,
            position = ?resolution.position,
            can_drop = resolution.can_drop,
        );
        self.presenter.show(&resolution);
        let current: &DropResolution<K, C> = target.insert(resolution);
        notify(&mut self.listeners, &SessionEvent::TargetChanged(Some(current)));
        Ok(true)
    }

    /// Forget the current resolution while keeping the drag alive.
    ///
    /// Returns `true` if there was one to clear.
    pub fn clear_target(&mut self) -> bool {
        let State::Dragging { target, .. } = &mut self.state else {
            return false;
        };
        if target.take().is_none() {
            return false;
        }
        self.presenter.clear();
        notify(&mut self.listeners, &SessionEvent::TargetChanged(None));
        true
    }

    /// End the active drag and return its payload.
    ///
    /// Idle sessions are left untouched and return `None`. Never touches any
    /// tree; applying the drop is the caller's job.
    pub fn end_drag(&mut self, reason: EndReason) -> Option<DragPayload<K, C, D>> {
        let State::Dragging { payload, .. } = core::mem::replace(&mut self.state, State::Idle)
        else {
            return None;
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(message = "drag ended", reason = ?reason);
        self.presenter.clear();
        notify(&mut self.listeners, &SessionEvent::Ended(reason));
        Some(payload)
    }
}

fn notify<K, C, D>(listeners: &mut [Listener<K, C, D>], event: &SessionEvent<'_, K, C, D>) {
    for (_, listener) in listeners {
        listener(event);
    }
}
