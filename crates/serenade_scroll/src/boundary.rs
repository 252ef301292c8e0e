//! Trigger boundary expressions
//!
//! A boundary resolves to a scroll offset. The common form pairs an edge of
//! the trigger element with an edge of the viewport: `"top 70%"` means "the
//! scroll offset at which the element's top reaches 70% of the viewport
//! height", i.e. `element.top - 0.7 * viewport.height`.
//!
//! | text            | meaning                                           |
//! |-----------------|---------------------------------------------------|
//! | `"top top"`     | element top meets viewport top                    |
//! | `"bottom top"`  | element bottom meets viewport top                 |
//! | `"top 70%"`     | element top meets 70% down the viewport           |
//! | `"center 100px"`| element centre meets 100px below viewport top     |
//! | `"+=2000"`      | 2000px after the resolved start (end only)        |
//! | `"1200"`        | absolute scroll offset                            |

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serenade_core::{ElementId, LayoutSource, Result, SerenadeError};

/// A point along an element or the viewport
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Edge {
    Top,
    Center,
    Bottom,
    /// Percentage of the extent from its top
    Percent(f32),
    /// Pixels from the top
    Pixels(f32),
}

impl Edge {
    /// Distance of this edge from the top of something `extent` tall
    pub fn offset(self, extent: f32) -> f32 {
        match self {
            Edge::Top => 0.0,
            Edge::Center => extent * 0.5,
            Edge::Bottom => extent,
            Edge::Percent(percent) => extent * percent / 100.0,
            Edge::Pixels(px) => px,
        }
    }
}

impl FromStr for Edge {
    type Err = SerenadeError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || SerenadeError::InvalidBoundary(format!("bad edge `{s}`"));
        let s = s.trim();
        match s {
            "top" => Ok(Edge::Top),
            "center" => Ok(Edge::Center),
            "bottom" => Ok(Edge::Bottom),
            _ => {
                if let Some(n) = s.strip_suffix('%') {
                    n.trim().parse().map(Edge::Percent).map_err(|_| invalid())
                } else {
                    let n = s.strip_suffix("px").unwrap_or(s);
                    n.trim().parse().map(Edge::Pixels).map_err(|_| invalid())
                }
            }
        }
    }
}

/// Measures a distance against live layout
pub type MeasureFn = dyn Fn(&dyn LayoutSource) -> Option<f32>;

/// A scroll distance, fixed or re-measured on every resolve
#[derive(Clone)]
pub enum Extent {
    Pixels(f32),
    Measured(Rc<MeasureFn>),
}

impl Extent {
    pub fn measured<F>(measure: F) -> Self
    where
        F: Fn(&dyn LayoutSource) -> Option<f32> + 'static,
    {
        Extent::Measured(Rc::new(measure))
    }

    pub fn resolve(&self, layout: &dyn LayoutSource) -> Option<f32> {
        match self {
            Extent::Pixels(px) => Some(*px),
            Extent::Measured(measure) => measure(layout),
        }
    }
}

impl fmt::Debug for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extent::Pixels(px) => f.debug_tuple("Pixels").field(px).finish(),
            Extent::Measured(_) => f.write_str("Measured(..)"),
        }
    }
}

/// An expression resolving to a scroll offset
#[derive(Clone, Debug)]
pub enum BoundaryExpr {
    /// Offset at which `element` edge of the target meets `viewport` edge
    Anchor { element: Edge, viewport: Edge },
    /// A distance past the resolved start; as a start, past the document top
    AfterStart(Extent),
    /// Absolute scroll offset
    Absolute(f32),
}

impl BoundaryExpr {
    pub const fn anchor(element: Edge, viewport: Edge) -> Self {
        BoundaryExpr::Anchor { element, viewport }
    }

    /// Resolve as a start boundary
    ///
    /// Returns `None` when the target cannot be measured.
    pub fn resolve_start(&self, target: ElementId, layout: &dyn LayoutSource) -> Option<f32> {
        self.resolve(target, layout, 0.0)
    }

    /// Resolve as an end boundary, given the resolved start
    pub fn resolve_end(
        &self,
        target: ElementId,
        layout: &dyn LayoutSource,
        start: f32,
    ) -> Option<f32> {
        self.resolve(target, layout, start)
    }

    fn resolve(&self, target: ElementId, layout: &dyn LayoutSource, base: f32) -> Option<f32> {
        let offset = match self {
            BoundaryExpr::Anchor { element, viewport } => {
                let bounds = layout.bounds(target)?;
                let viewport_height = layout.viewport().height;
                bounds.top() + element.offset(bounds.height()) - viewport.offset(viewport_height)
            }
            BoundaryExpr::AfterStart(extent) => base + extent.resolve(layout)?,
            BoundaryExpr::Absolute(offset) => *offset,
        };
        offset.is_finite().then_some(offset)
    }
}

impl FromStr for BoundaryExpr {
    type Err = SerenadeError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let invalid = || SerenadeError::InvalidBoundary(format!("bad boundary `{s}`"));

        if let Some(rest) = trimmed.strip_prefix("+=") {
            let px = rest.trim().strip_suffix("px").unwrap_or(rest.trim());
            return px
                .trim()
                .parse()
                .map(|px| BoundaryExpr::AfterStart(Extent::Pixels(px)))
                .map_err(|_| invalid());
        }

        let mut parts = trimmed.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(element), Some(viewport), None) => Ok(BoundaryExpr::Anchor {
                element: element.parse()?,
                viewport: viewport.parse()?,
            }),
            (Some(offset), None, None) => {
                offset.parse().map(BoundaryExpr::Absolute).map_err(|_| invalid())
            }
            _ => Err(invalid()),
        }
    }
}
