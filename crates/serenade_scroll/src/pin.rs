//! Pinned horizontal scrolling
//!
//! While a section is pinned, vertical scroll distance drives a horizontal
//! translation of its track:
//!
//! ```text
//! distance    = track_width - viewport_width
//! translation = -distance * progress
//! ```
//!
//! The trigger spans exactly `distance` pixels of vertical scroll starting
//! when the section's top reaches the viewport top. Narrow viewports keep
//! native scrolling: below the configured width the controller never starts.

use std::cell::Cell;
use std::rc::Rc;

use serenade_core::{ElementId, LayoutSource, Property, Result, SerenadeError, StyleSink, Value};

use crate::boundary::{BoundaryExpr, Edge, Extent};
use crate::trigger::{TriggerId, TriggerRegistry, TriggerSpec};

/// Track translation derived from progress
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PinState {
    pub track_width: f32,
    pub viewport_width: f32,
    pub translation: f32,
}

impl PinState {
    pub fn compute(track_width: f32, viewport_width: f32, progress: f32) -> Self {
        let distance = (track_width - viewport_width).max(0.0);
        let progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        let translation = (-distance * progress).clamp(-distance, 0.0);
        Self {
            track_width,
            viewport_width,
            translation,
        }
    }

    /// Vertical scroll needed to move the track end to end
    pub fn required_distance(&self) -> f32 {
        (self.track_width - self.viewport_width).max(0.0)
    }
}

/// Elements and policy for a pinned section
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinSetup {
    /// Section held in place while pinned
    pub section: ElementId,
    /// Wide track translated inside the section
    pub track: ElementId,
    /// Pinning only happens on viewports strictly wider than this
    pub min_viewport_width: f32,
}

/// A running pin: one pinned trigger plus the track translation it drives
#[derive(Debug)]
pub struct PinController {
    setup: PinSetup,
    trigger: TriggerId,
    /// Latest progress delivered by the trigger
    progress: Rc<Cell<f32>>,
    state: PinState,
    /// Track `X` before the first write
    original: Option<Option<Value>>,
    last_written: Option<f32>,
    disposed: bool,
}

impl PinController {
    /// Register the pinned trigger for `setup`
    ///
    /// Returns `None` on narrow viewports, when the track fits the viewport,
    /// or when the track cannot be measured yet.
    pub fn start(
        registry: &mut TriggerRegistry,
        layout: &dyn LayoutSource,
        setup: PinSetup,
    ) -> Option<Self> {
        let viewport_width = layout.viewport().width;
        if viewport_width <= setup.min_viewport_width {
            tracing::debug!(
                viewport_width,
                threshold = setup.min_viewport_width,
                "viewport too narrow, keeping native scroll"
            );
            return None;
        }

        let Some(track_width) = layout.scroll_width(setup.track) else {
            tracing::warn!(track = ?setup.track, "pin track not measurable");
            return None;
        };
        let state = PinState::compute(track_width, viewport_width, 0.0);
        if state.required_distance() <= 0.0 {
            tracing::debug!(track_width, viewport_width, "track fits the viewport, nothing to pin");
            return None;
        }

        let track = setup.track;
        let spec = TriggerSpec::new(setup.section)
            .start(BoundaryExpr::anchor(Edge::Top, Edge::Top))
            .end(BoundaryExpr::AfterStart(Extent::measured(move |layout| {
                let width = layout.scroll_width(track)?;
                Some((width - layout.viewport().width).max(0.0))
            })))
            .pinned();

        let progress = Rc::new(Cell::new(0.0));
        let sink = progress.clone();
        let trigger = registry.register(spec, move |p| sink.set(p));

        tracing::debug!(
            trigger = ?trigger,
            distance = state.required_distance(),
            "pin controller started"
        );
        Some(Self {
            setup,
            trigger,
            progress,
            state,
            original: None,
            last_written: None,
            disposed: false,
        })
    }

    pub fn setup(&self) -> PinSetup {
        self.setup
    }

    pub fn trigger(&self) -> TriggerId {
        self.trigger
    }

    /// Progress most recently delivered by the pinned trigger
    pub fn trigger_progress(&self) -> f32 {
        self.progress.get()
    }

    pub fn state(&self) -> PinState {
        self.state
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Re-measure the track after its content changed
    ///
    /// Lazy-loaded images change the track's intrinsic width; without this
    /// the pin over- or undershoots. Returns `Ok(false)` once disposed, and
    /// an error if the track has left the layout.
    pub fn refresh(
        &mut self,
        registry: &mut TriggerRegistry,
        layout: &dyn LayoutSource,
    ) -> Result<bool> {
        if self.disposed {
            return Ok(false);
        }
        let track_width = layout
            .scroll_width(self.setup.track)
            .ok_or(SerenadeError::ElementNotMounted(self.setup.track))?;
        let progress = self.progress.get();
        self.state = PinState::compute(track_width, layout.viewport().width, progress);
        registry.refresh(self.trigger, layout);
        tracing::debug!(
            track_width,
            distance = self.state.required_distance(),
            "pin track re-measured"
        );
        Ok(true)
    }

    /// Translate the track to `progress`
    pub fn apply<S>(&mut self, progress: f32, sink: &mut S) -> PinState
    where
        S: StyleSink + ?Sized,
    {
        if self.disposed {
            return self.state;
        }
        self.state = PinState::compute(self.state.track_width, self.state.viewport_width, progress);

        let track = self.setup.track;
        if self.original.is_none() {
            self.original = Some(sink.read(track, Property::X));
        }
        if self.last_written != Some(self.state.translation) {
            sink.write(track, Property::X, Value::Number(self.state.translation));
            self.last_written = Some(self.state.translation);
        }
        self.state
    }

    /// Unregister the trigger and restore the track
    ///
    /// Returns false if already disposed.
    pub fn dispose<S>(&mut self, registry: &mut TriggerRegistry, sink: &mut S) -> bool
    where
        S: StyleSink + ?Sized,
    {
        if self.disposed {
            return false;
        }
        self.disposed = true;
        registry.unregister(self.trigger, sink);

        match self.original.take() {
            Some(Some(value)) => sink.write(self.setup.track, Property::X, value),
            Some(None) => sink.clear(self.setup.track, Property::X),
            None => {}
        }
        tracing::debug!(trigger = ?self.trigger, "pin controller disposed");
        true
    }
}
