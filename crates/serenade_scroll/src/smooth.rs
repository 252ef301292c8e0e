//! Smooth-scroll emulation
//!
//! Wheel input does not move the page directly. Each wheel event moves a
//! *target* position, and every frame the *smoothed* position eases from
//! where it was towards that target over a fixed duration. A new wheel event
//! mid-animation retargets from the current smoothed position, so fast
//! flicks blend into one continuous glide.
//!
//! Touch scrolling bypasses smoothing by default: touch deltas move both
//! positions at once. Native scroll (keyboard, scrollbar drag, anchor jumps)
//! always snaps.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Deserialize;
use serenade_animation::Easing;
use serenade_core::{FrameLoop, FrameTime, Point, SchedulerHandle};

// ============================================================================
// Configuration
// ============================================================================

/// Axis that wheel input scrolls
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollAxis {
    #[default]
    Vertical,
    Horizontal,
}

/// Configuration for smooth scrolling
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SmoothScrollConfig {
    /// Seconds for the smoothed position to reach a new target (default: 1.5)
    pub duration_secs: f32,
    /// Curve the smoothed position follows (default: `expo.smooth`)
    pub easing: Easing,
    /// Scale applied to wheel deltas (default: 0.8)
    pub wheel_multiplier: f32,
    /// Scale applied to touch deltas (default: 2.0)
    pub touch_multiplier: f32,
    /// Smooth touch input like wheel input (default: false)
    pub smooth_touch: bool,
    /// Which wheel delta component scrolls the page (default: vertical)
    pub direction: ScrollAxis,
}

impl Default for SmoothScrollConfig {
    fn default() -> Self {
        Self {
            duration_secs: 1.5,
            easing: Easing::ExpoSmooth,
            wheel_multiplier: 0.8,
            touch_multiplier: 2.0,
            smooth_touch: false,
            direction: ScrollAxis::Vertical,
        }
    }
}

impl SmoothScrollConfig {
    /// Snap to every input; wheel deltas still pass through the multiplier
    pub fn immediate() -> Self {
        Self {
            duration_secs: 0.0,
            ..Default::default()
        }
    }
}

// ============================================================================
// Virtual Scroll State
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    #[default]
    Down,
}

/// Scroll position as seen by the rest of the runtime
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VirtualScrollState {
    /// Where input has asked the page to be
    pub raw_position: f32,
    /// Where the page is drawn this frame
    pub smoothed_position: f32,
    /// Smoothed movement in pixels per second
    pub velocity: f32,
    pub direction: ScrollDirection,
}

#[derive(Clone, Copy, Debug)]
struct ScrollTween {
    from: f32,
    to: f32,
    elapsed: f32,
    duration: f32,
}

// ============================================================================
// Emulator
// ============================================================================

/// Smooth-scroll emulator
///
/// Owns the only [`VirtualScrollState`]. It can be ticked by hand with
/// [`SmoothScroll::tick`] or driven by a scheduler with [`SmoothScroll::start`].
pub struct SmoothScroll {
    config: SmoothScrollConfig,
    state: VirtualScrollState,
    /// Largest reachable position (document height minus viewport height)
    limit: f32,
    tween: Option<ScrollTween>,
    /// Smoothed position at the end of the previous tick
    last_position: f32,
    frame_loop: Option<FrameLoop>,
}

impl SmoothScroll {
    pub fn new(config: SmoothScrollConfig) -> Self {
        Self {
            config,
            state: VirtualScrollState::default(),
            limit: 0.0,
            tween: None,
            last_position: 0.0,
            frame_loop: None,
        }
    }

    pub fn config(&self) -> &SmoothScrollConfig {
        &self.config
    }

    pub fn state(&self) -> VirtualScrollState {
        self.state
    }

    /// Position other subsystems should treat as the scroll offset
    pub fn position(&self) -> f32 {
        self.state.smoothed_position
    }

    pub fn limit(&self) -> f32 {
        self.limit
    }

    /// True while the smoothed position is still catching up
    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    /// Set the scrollable extent; positions beyond it are pulled back
    pub fn set_limit(&mut self, limit: f32) {
        let limit = if limit.is_finite() { limit.max(0.0) } else { 0.0 };
        self.limit = limit;
        self.state.raw_position = self.state.raw_position.min(limit);
        self.state.smoothed_position = self.state.smoothed_position.min(limit);
        if let Some(tween) = &mut self.tween {
            tween.to = tween.to.min(limit);
        }
    }

    fn clamp(&self, position: f32) -> f32 {
        position.clamp(0.0, self.limit)
    }

    /// Feed a wheel event
    pub fn wheel(&mut self, delta: Point) {
        let delta = match self.config.direction {
            ScrollAxis::Vertical => delta.y,
            ScrollAxis::Horizontal => delta.x,
        };
        if delta == 0.0 || !delta.is_finite() {
            return;
        }
        let target = self.clamp(self.state.raw_position + delta * self.config.wheel_multiplier);
        self.retarget(target);
    }

    /// Feed a touch-move delta
    pub fn touch(&mut self, delta: f32) {
        if delta == 0.0 || !delta.is_finite() {
            return;
        }
        let target = self.clamp(self.state.raw_position + delta * self.config.touch_multiplier);
        if self.config.smooth_touch {
            self.retarget(target);
        } else {
            self.snap(target);
        }
    }

    /// Feed a native scroll position (keyboard, scrollbar, anchor jump)
    pub fn native_scroll(&mut self, position: f32) {
        if !position.is_finite() {
            return;
        }
        let position = self.clamp(position);
        self.snap(position);
    }

    fn retarget(&mut self, target: f32) {
        self.state.raw_position = target;
        if self.config.duration_secs <= 0.0 {
            self.snap(target);
            return;
        }
        self.tween = Some(ScrollTween {
            from: self.state.smoothed_position,
            to: target,
            elapsed: 0.0,
            duration: self.config.duration_secs,
        });
    }

    fn snap(&mut self, position: f32) {
        self.tween = None;
        self.state.raw_position = position;
        self.state.smoothed_position = position;
    }

    /// Advance the smoothed position by one frame
    pub fn tick(&mut self, time: FrameTime) -> VirtualScrollState {
        let dt = time.delta_secs();

        if let Some(tween) = &mut self.tween {
            tween.elapsed += dt;
            let t = if tween.duration > 0.0 {
                (tween.elapsed / tween.duration).min(1.0)
            } else {
                1.0
            };
            if t >= 1.0 {
                self.state.smoothed_position = tween.to;
                self.tween = None;
            } else {
                let eased = self.config.easing.apply(t);
                self.state.smoothed_position = tween.from + (tween.to - tween.from) * eased;
            }
        }

        let moved = self.state.smoothed_position - self.last_position;
        self.state.velocity = if dt > 0.0 { moved / dt } else { 0.0 };
        if moved > 0.0 {
            self.state.direction = ScrollDirection::Down;
        } else if moved < 0.0 {
            self.state.direction = ScrollDirection::Up;
        }
        self.last_position = self.state.smoothed_position;

        tracing::trace!(
            raw = self.state.raw_position,
            smoothed = self.state.smoothed_position,
            velocity = self.state.velocity,
            "smooth scroll tick"
        );
        self.state
    }

    /// Tick `this` on every frame until [`SmoothScroll::stop`]
    ///
    /// Starting an already running emulator restarts its loop.
    pub fn start(this: &Rc<RefCell<Self>>, handle: &SchedulerHandle) {
        let weak = Rc::downgrade(this);
        let frame_loop = FrameLoop::start(handle, move |time| {
            if let Some(scroll) = weak.upgrade() {
                scroll.borrow_mut().tick(time);
            }
        });
        // The old loop (if any) is dropped here, which stops it
        this.borrow_mut().frame_loop = Some(frame_loop);
        tracing::debug!("smooth scroll started");
    }

    /// Stop ticking and cancel the pending frame
    ///
    /// Returns false if the emulator was not running.
    pub fn stop(&mut self) -> bool {
        match self.frame_loop.take() {
            Some(frame_loop) => {
                frame_loop.stop();
                tracing::debug!("smooth scroll stopped");
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.frame_loop.as_ref().is_some_and(FrameLoop::is_running)
    }
}

impl Default for SmoothScroll {
    fn default() -> Self {
        Self::new(SmoothScrollConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serenade_core::FrameScheduler;

    fn frame(delta_ms: f64) -> FrameTime {
        FrameTime::new(0.0, delta_ms, 1)
    }

    fn scroller(config: SmoothScrollConfig) -> SmoothScroll {
        let mut scroll = SmoothScroll::new(config);
        scroll.set_limit(5000.0);
        scroll
    }

    #[test]
    fn test_wheel_eases_to_target() {
        let mut scroll = scroller(SmoothScrollConfig::default());
        scroll.wheel(Point::new(0.0, 500.0));

        assert_eq!(scroll.state().raw_position, 400.0);
        assert_eq!(scroll.position(), 0.0);

        let state = scroll.tick(frame(100.0));
        assert!(state.smoothed_position > 0.0 && state.smoothed_position < 400.0);
        assert_eq!(state.direction, ScrollDirection::Down);
        assert!(state.velocity > 0.0);

        for _ in 0..20 {
            scroll.tick(frame(100.0));
        }
        assert_eq!(scroll.position(), 400.0);
        assert!(!scroll.is_animating());
    }

    #[test]
    fn test_wheel_retargets_from_current_position() {
        let mut scroll = scroller(SmoothScrollConfig::default());
        scroll.wheel(Point::new(0.0, 500.0));
        scroll.tick(frame(200.0));
        let midway = scroll.position();

        scroll.wheel(Point::new(0.0, -250.0));
        assert_eq!(scroll.state().raw_position, 200.0);
        scroll.tick(frame(0.0));
        assert!((scroll.position() - midway).abs() < 1.0);
    }

    #[test]
    fn test_horizontal_delta_ignored_when_vertical() {
        let mut scroll = scroller(SmoothScrollConfig::default());
        scroll.wheel(Point::new(300.0, 0.0));
        assert_eq!(scroll.state().raw_position, 0.0);
        assert!(!scroll.is_animating());
    }

    #[test]
    fn test_touch_bypasses_smoothing() {
        let mut scroll = scroller(SmoothScrollConfig::default());
        scroll.touch(100.0);
        assert_eq!(scroll.position(), 200.0);
        assert_eq!(scroll.state().raw_position, 200.0);
        assert!(!scroll.is_animating());
    }

    #[test]
    fn test_smooth_touch_animates() {
        let config = SmoothScrollConfig {
            smooth_touch: true,
            ..Default::default()
        };
        let mut scroll = scroller(config);
        scroll.touch(100.0);
        assert_eq!(scroll.position(), 0.0);
        assert!(scroll.is_animating());
    }

    #[test]
    fn test_native_scroll_snaps_and_clamps() {
        let mut scroll = scroller(SmoothScrollConfig::default());
        scroll.wheel(Point::new(0.0, 1000.0));
        scroll.native_scroll(9000.0);
        assert_eq!(scroll.position(), 5000.0);
        assert!(!scroll.is_animating());

        scroll.tick(frame(16.0));
        scroll.native_scroll(-20.0);
        let state = scroll.tick(frame(16.0));
        assert_eq!(state.smoothed_position, 0.0);
        assert_eq!(state.direction, ScrollDirection::Up);
    }

    #[test]
    fn test_set_limit_pulls_positions_back() {
        let mut scroll = scroller(SmoothScrollConfig::immediate());
        scroll.wheel(Point::new(0.0, 4000.0));
        assert_eq!(scroll.position(), 3200.0);

        scroll.set_limit(1000.0);
        assert_eq!(scroll.position(), 1000.0);
        assert_eq!(scroll.state().raw_position, 1000.0);
    }

    #[test]
    fn test_start_and_stop_with_scheduler() {
        let scheduler = FrameScheduler::new();
        let scroll = Rc::new(RefCell::new(scroller(SmoothScrollConfig::default())));

        SmoothScroll::start(&scroll, &scheduler.handle());
        assert!(scroll.borrow().is_running());
        scroll.borrow_mut().wheel(Point::new(0.0, 500.0));

        for i in 0..200 {
            scheduler.run_frame(i as f64 * 16.0);
        }
        assert_eq!(scroll.borrow().position(), 400.0);

        assert!(scroll.borrow_mut().stop());
        assert!(!scroll.borrow_mut().stop());
        assert_eq!(scheduler.pending_count(), 0);

        // No ticks after stop
        scroll.borrow_mut().wheel(Point::new(0.0, 500.0));
        for i in 200..300 {
            scheduler.run_frame(i as f64 * 16.0);
        }
        assert_eq!(scroll.borrow().position(), 400.0);
    }
}
