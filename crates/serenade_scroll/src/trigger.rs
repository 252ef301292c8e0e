//! Scroll-trigger registry
//!
//! Maps scroll position to per-region progress. Each registration names a
//! target element and two boundaries; on every update the registry computes
//!
//! ```text
//! progress = clamp((scroll - start) / (end - start), 0, 1)
//! ```
//!
//! and calls the registration's callback when progress moved by more than
//! [`PROGRESS_EPSILON`] (or landed exactly on 0 or 1).
//!
//! Boundaries are resolved lazily against live layout and cached until
//! [`TriggerRegistry::invalidate`]. A target that cannot be measured yet
//! stays unresolved and is retried on the next update; it never produces
//! progress from stale or guessed layout.

use serenade_core::{Document, ElementId, LayoutSource, PinLock, StyleSink};
use slotmap::{new_key_type, SlotMap};

use crate::boundary::{BoundaryExpr, Edge};

new_key_type! {
    /// Handle to a registered trigger
    pub struct TriggerId;
}

/// Progress changes smaller than this are not delivered
pub const PROGRESS_EPSILON: f32 = 1e-4;

/// Progress callback
pub type ProgressCallback = Box<dyn FnMut(f32)>;

/// What a trigger watches
#[derive(Clone, Debug)]
pub struct TriggerSpec {
    pub target: ElementId,
    pub start: BoundaryExpr,
    pub end: BoundaryExpr,
    /// Lock the target in place while progress runs from 0 to 1
    pub pin: bool,
}

impl TriggerSpec {
    /// A trigger over the target's pass through the viewport
    /// (`"top bottom"` → `"bottom top"`)
    pub fn new(target: ElementId) -> Self {
        Self {
            target,
            start: BoundaryExpr::anchor(Edge::Top, Edge::Bottom),
            end: BoundaryExpr::anchor(Edge::Bottom, Edge::Top),
            pin: false,
        }
    }

    pub fn start(mut self, start: BoundaryExpr) -> Self {
        self.start = start;
        self
    }

    pub fn end(mut self, end: BoundaryExpr) -> Self {
        self.end = end;
        self
    }

    pub fn pinned(mut self) -> Self {
        self.pin = true;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Resolved {
    start: f32,
    end: f32,
    /// Viewport offset the target is held at while pinned
    pin_top: f32,
}

struct Registration {
    spec: TriggerSpec,
    callback: ProgressCallback,
    resolved: Option<Resolved>,
    /// Last delivered progress; `None` re-arms delivery
    delivered: Option<f32>,
    progress: f32,
    lock: PinLock,
}

/// Registry of scroll triggers
#[derive(Default)]
pub struct TriggerRegistry {
    registrations: SlotMap<TriggerId, Registration>,
}

impl TriggerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a trigger; the callback receives progress in `[0, 1]`
    pub fn register<F>(&mut self, spec: TriggerSpec, callback: F) -> TriggerId
    where
        F: FnMut(f32) + 'static,
    {
        let id = self.registrations.insert(Registration {
            spec,
            callback: Box::new(callback),
            resolved: None,
            delivered: None,
            progress: 0.0,
            lock: PinLock::None,
        });
        tracing::debug!(trigger = ?id, "trigger registered");
        id
    }

    /// Remove a trigger and release its pin lock
    ///
    /// Returns false if the trigger was already removed.
    pub fn unregister<S>(&mut self, id: TriggerId, sink: &mut S) -> bool
    where
        S: StyleSink + ?Sized,
    {
        match self.registrations.remove(id) {
            Some(registration) => {
                if registration.spec.pin && registration.lock != PinLock::None {
                    sink.set_pin(registration.spec.target, PinLock::None);
                }
                tracing::debug!(trigger = ?id, "trigger unregistered");
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: TriggerId) -> bool {
        self.registrations.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Last computed progress of a trigger
    pub fn progress(&self, id: TriggerId) -> Option<f32> {
        self.registrations.get(id).map(|r| r.progress)
    }

    /// Resolved `(start, end)` scroll offsets, if measured
    pub fn bounds(&self, id: TriggerId) -> Option<(f32, f32)> {
        self.registrations
            .get(id)
            .and_then(|r| r.resolved)
            .map(|r| (r.start, r.end))
    }

    /// Recompute every boundary against current layout
    ///
    /// Called on resize and layout changes. Callbacks are re-armed so the
    /// next update delivers progress even if it did not change.
    pub fn invalidate(&mut self, layout: &dyn LayoutSource) {
        let mut unresolved = 0;
        for (id, registration) in &mut self.registrations {
            registration.resolved = resolve(id, &registration.spec, layout);
            registration.delivered = None;
            if registration.resolved.is_none() {
                unresolved += 1;
            }
        }
        if unresolved > 0 {
            tracing::warn!(unresolved, "trigger targets not measurable, will retry");
        }
        tracing::debug!(count = self.registrations.len(), "trigger boundaries invalidated");
    }

    /// Recompute the boundaries of one trigger
    pub fn refresh(&mut self, id: TriggerId, layout: &dyn LayoutSource) -> bool {
        match self.registrations.get_mut(id) {
            Some(registration) => {
                registration.resolved = resolve(id, &registration.spec, layout);
                registration.delivered = None;
                registration.resolved.is_some()
            }
            None => false,
        }
    }

    /// Compute progress at `scroll` and deliver changes
    ///
    /// Returns the number of callbacks invoked.
    pub fn update<D>(&mut self, scroll: f32, doc: &mut D) -> usize
    where
        D: Document,
    {
        let mut invoked = 0;
        for (id, registration) in &mut self.registrations {
            if registration.resolved.is_none() {
                registration.resolved = resolve(id, &registration.spec, &*doc);
            }
            let Some(resolved) = registration.resolved else {
                continue;
            };

            let progress = progress_at(scroll, resolved.start, resolved.end);
            registration.progress = progress;

            if registration.spec.pin {
                let lock = pin_lock_at(scroll, &resolved);
                if lock != registration.lock {
                    registration.lock = lock;
                    doc.set_pin(registration.spec.target, lock);
                }
            }

            if should_deliver(registration.delivered, progress) {
                registration.delivered = Some(progress);
                (registration.callback)(progress);
                invoked += 1;
            }
        }

        if invoked > 0 {
            tracing::trace!(scroll, invoked, "triggers updated");
        }
        invoked
    }
}

fn resolve(id: TriggerId, spec: &TriggerSpec, layout: &dyn LayoutSource) -> Option<Resolved> {
    let start = spec.start.resolve_start(spec.target, layout);
    let end = start.and_then(|start| spec.end.resolve_end(spec.target, layout, start));
    let (Some(start), Some(end)) = (start, end) else {
        tracing::trace!(trigger = ?id, target = ?spec.target, "trigger target not measurable");
        return None;
    };

    // An end before the start collapses to a zero-length span
    let end = end.max(start);
    let pin_top = layout
        .bounds(spec.target)
        .map_or(0.0, |bounds| bounds.top() - start);

    tracing::debug!(trigger = ?id, start, end, "resolved trigger boundaries");
    Some(Resolved {
        start,
        end,
        pin_top,
    })
}

/// Normalized position of `scroll` between `start` and `end`
pub fn progress_at(scroll: f32, start: f32, end: f32) -> f32 {
    let span = end - start;
    if span <= 0.0 {
        return if scroll >= start { 1.0 } else { 0.0 };
    }
    ((scroll - start) / span).clamp(0.0, 1.0)
}

fn pin_lock_at(scroll: f32, resolved: &Resolved) -> PinLock {
    if scroll >= resolved.end && scroll > resolved.start {
        PinLock::Released {
            offset: resolved.end - resolved.start,
        }
    } else if scroll > resolved.start {
        PinLock::Fixed {
            top: resolved.pin_top,
        }
    } else {
        PinLock::None
    }
}

fn should_deliver(delivered: Option<f32>, progress: f32) -> bool {
    match delivered {
        None => true,
        Some(last) if last == progress => false,
        Some(_) if progress == 0.0 || progress == 1.0 => true,
        Some(last) => (progress - last).abs() > PROGRESS_EPSILON,
    }
}
