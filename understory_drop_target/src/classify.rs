// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Before/after/inside classification of a pointer over one candidate.
//!
//! ## Rules
//!
//! Applied in order:
//!
//! 1. A candidate that allows exactly one position always gets it.
//! 2. Cross-container drags onto a container that allows `Inside` get `Inside`.
//! 3. Over a container that allows `Inside`, a pointer whose vertical fraction
//!    lies strictly inside `(container_edge, 1 - container_edge)` gets `Inside`.
//! 4. Otherwise the fraction is compared to `sibling_split`: below is `Before`,
//!    at or above is `After`. If that side is not allowed, the other sibling
//!    side is used.
//!
//! Container roots are registered with `Inside` only, so rule 1 covers them.
//!
//! ## Example
//!
//! ```
//! use kurbo::{Point, Rect};
//! use understory_drop_target::classify::{ClassifyConfig, Subject, classify};
//! use understory_drop_target::types::{DropPosition, DropPositions};
//!
//! let subject = Subject {
//!     bounds: Some(Rect::new(0.0, 0.0, 200.0, 100.0)),
//!     is_container: true,
//!     positions: DropPositions::all(),
//!     cross_container: false,
//! };
//! let config = ClassifyConfig::default();
//! assert_eq!(classify(&subject, Point::new(5.0, 10.0), &config), Some(DropPosition::Before));
//! assert_eq!(classify(&subject, Point::new(5.0, 50.0), &config), Some(DropPosition::Inside));
//! assert_eq!(classify(&subject, Point::new(5.0, 90.0), &config), Some(DropPosition::After));
//! ```

use kurbo::{Point, Rect};

use crate::types::{DropPosition, DropPositions};

/// Thresholds used by [`classify`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClassifyConfig {
    /// Edge-zone fraction for container targets. The band between this value
    /// and its complement classifies as `Inside`.
    pub container_edge: f64,
    /// Split point for sibling placement; fractions below it are `Before`.
    pub sibling_split: f64,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            container_edge: 0.25,
            sibling_split: 0.5,
        }
    }
}

impl ClassifyConfig {
    /// Set the container edge zone. Values are clamped to `0.0..=0.5`.
    pub fn with_container_edge(mut self, edge: f64) -> Self {
        self.container_edge = edge.clamp(0.0, 0.5);
        self
    }

    /// Set the sibling split point. Values are clamped to `0.0..=1.0`.
    pub fn with_sibling_split(mut self, split: f64) -> Self {
        self.sibling_split = split.clamp(0.0, 1.0);
        self
    }
}

/// The candidate facts classification depends on.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Subject {
    /// Candidate bounds; `None` for a container root with no geometry.
    pub bounds: Option<Rect>,
    /// Whether the candidate can hold children.
    pub is_container: bool,
    /// Positions the candidate allows.
    pub positions: DropPositions,
    /// Whether the drag leaves its origin container.
    pub cross_container: bool,
}

/// Vertical position of `point` as a fraction of `rect`'s height, clamped to `0.0..=1.0`.
///
/// Degenerate rectangles report the midpoint.
pub fn vertical_fraction(rect: Rect, point: Point) -> f64 {
    let h = rect.height();
    if h <= 0.0 || !h.is_finite() {
        return 0.5;
    }
    ((point.y - rect.y0) / h).clamp(0.0, 1.0)
}

/// Decide where a drop over `subject` at `point` would land.
///
/// Returns `None` only when `subject` allows no positions at all.
pub fn classify(subject: &Subject, point: Point, config: &ClassifyConfig) -> Option<DropPosition> {
    let positions = subject.positions;
    if let Some(only) = positions.single() {
        return Some(only);
    }
    let inside_ok = subject.is_container && positions.allows(DropPosition::Inside);
    if subject.cross_container && inside_ok {
        return Some(DropPosition::Inside);
    }

    let fraction = subject
        .bounds
        .map(|r| vertical_fraction(r, point))
        .unwrap_or(0.5);

    if inside_ok {
        let edge = config.container_edge;
        if fraction > edge && fraction < 1.0 - edge {
            return Some(DropPosition::Inside);
        }
    }

    let (preferred, other) = if fraction < config.sibling_split {
        (DropPosition::Before, DropPosition::After)
    } else {
        (DropPosition::After, DropPosition::Before)
    };
    if positions.allows(preferred) {
        Some(preferred)
    } else if positions.allows(other) {
        Some(other)
    } else if positions.allows(DropPosition::Inside) {
        Some(DropPosition::Inside)
    } else {
        None
    }
}
