//! Scrub smoothing
//!
//! A scrubbed timeline can follow its trigger exactly, or lag behind it so
//! fast scrolling settles softly. [`ScrubFollower`] decides which progress
//! value is fed to the timeline each frame; the timeline itself stays a pure
//! function of that value.

use serenade_animation::Easing;

/// How a scrubbed timeline follows its trigger
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Scrub {
    /// Timeline progress equals trigger progress
    #[default]
    Immediate,
    /// Timeline progress catches up over this many seconds
    Lag(f32),
}

impl Scrub {
    /// `0` (or less) means immediate
    pub fn from_secs(secs: f32) -> Self {
        if secs > 0.0 && secs.is_finite() {
            Scrub::Lag(secs)
        } else {
            Scrub::Immediate
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct CatchUp {
    from: f32,
    elapsed: f32,
    duration: f32,
}

/// Progress that chases a target with an ease-out curve
///
/// Retargeting mid-flight restarts the catch-up from the current value, so
/// the output never jumps.
#[derive(Clone, Debug)]
pub struct ScrubFollower {
    mode: Scrub,
    value: f32,
    target: f32,
    catch_up: Option<CatchUp>,
}

impl ScrubFollower {
    const EASING: Easing = Easing::Power3Out;

    pub fn new(mode: Scrub) -> Self {
        Self {
            mode,
            value: 0.0,
            target: 0.0,
            catch_up: None,
        }
    }

    pub fn mode(&self) -> Scrub {
        self.mode
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_settled(&self) -> bool {
        self.catch_up.is_none()
    }

    /// Set the progress to chase
    pub fn set_target(&mut self, target: f32) {
        if target.is_nan() {
            return;
        }
        let target = target.clamp(0.0, 1.0);
        if target == self.target && (self.catch_up.is_some() || self.value == target) {
            return;
        }
        self.target = target;

        match self.mode {
            Scrub::Immediate => self.snap(target),
            Scrub::Lag(duration) => {
                self.catch_up = Some(CatchUp {
                    from: self.value,
                    elapsed: 0.0,
                    duration,
                });
            }
        }
    }

    /// Jump straight to `target`
    pub fn snap(&mut self, target: f32) {
        if target.is_nan() {
            return;
        }
        let target = target.clamp(0.0, 1.0);
        self.target = target;
        self.value = target;
        self.catch_up = None;
    }

    /// Advance the catch-up and return the current value
    pub fn tick(&mut self, delta_ms: f32) -> f32 {
        if let Some(catch_up) = &mut self.catch_up {
            catch_up.elapsed += delta_ms.max(0.0) / 1000.0;
            let t = catch_up.elapsed / catch_up.duration;
            if t >= 1.0 {
                self.value = self.target;
                self.catch_up = None;
            } else {
                let eased = Self::EASING.apply(t);
                self.value = catch_up.from + (self.target - catch_up.from) * eased;
            }
        }
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_secs() {
        assert_eq!(Scrub::from_secs(0.0), Scrub::Immediate);
        assert_eq!(Scrub::from_secs(1.0), Scrub::Lag(1.0));
        assert_eq!(Scrub::from_secs(f32::INFINITY), Scrub::Immediate);
    }

    #[test]
    fn test_immediate_follows_exactly() {
        let mut follower = ScrubFollower::new(Scrub::Immediate);
        follower.set_target(0.4);
        assert_eq!(follower.value(), 0.4);
        assert_eq!(follower.tick(16.0), 0.4);
        follower.set_target(7.0);
        assert_eq!(follower.value(), 1.0);
    }

    #[test]
    fn test_lag_catches_up_and_settles_exactly() {
        let mut follower = ScrubFollower::new(Scrub::Lag(1.0));
        follower.set_target(0.5);
        assert_eq!(follower.value(), 0.0);

        let early = follower.tick(100.0);
        assert!(early > 0.0 && early < 0.5);
        assert!(!follower.is_settled());

        for _ in 0..20 {
            follower.tick(100.0);
        }
        assert_eq!(follower.value(), 0.5);
        assert!(follower.is_settled());
    }

    #[test]
    fn test_retarget_is_continuous() {
        let mut follower = ScrubFollower::new(Scrub::Lag(1.0));
        follower.set_target(1.0);
        let before = follower.tick(300.0);

        follower.set_target(0.0);
        let after = follower.tick(0.0);
        assert_eq!(before, after);
        follower.tick(2000.0);
        assert_eq!(follower.value(), 0.0);
    }

    #[test]
    fn test_same_target_does_not_restart() {
        let mut follower = ScrubFollower::new(Scrub::Lag(1.0));
        follower.set_target(1.0);
        follower.tick(500.0);
        follower.set_target(1.0);
        follower.tick(600.0);
        assert!(follower.is_settled());
        assert_eq!(follower.value(), 1.0);
    }
}
