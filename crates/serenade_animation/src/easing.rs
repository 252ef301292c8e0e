//! Easing functions
//!
//! Map normalized progress `t ∈ [0, 1]` to an interpolation factor. Names
//! follow the `family.direction` convention (`"power2.out"`, `"sine.inOut"`),
//! which is also how they are spelled in configuration files.

use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use serenade_core::SerenadeError;

/// Easing function used to map normalized animation progress
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Easing {
    /// No easing (`"none"`)
    #[default]
    Linear,
    /// Quadratic
    Power1In,
    Power1Out,
    Power1InOut,
    /// Cubic
    Power2In,
    Power2Out,
    Power2InOut,
    /// Quartic
    Power3In,
    Power3Out,
    Power3InOut,
    SineIn,
    SineOut,
    SineInOut,
    /// `min(1, 1.001 - 2^(-10t))`, the smooth-scroll curve
    ExpoSmooth,
}

impl Easing {
    /// Apply this easing function to normalized progress `t`
    ///
    /// `t` is clamped to `[0, 1]` first. Both endpoints map exactly onto
    /// themselves for every curve.
    pub fn apply(self, t: f32) -> f32 {
        if t.is_nan() || t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match self {
            Self::Linear => t,
            Self::Power1In => power_in(t, 2),
            Self::Power1Out => power_out(t, 2),
            Self::Power1InOut => power_in_out(t, 2),
            Self::Power2In => power_in(t, 3),
            Self::Power2Out => power_out(t, 3),
            Self::Power2InOut => power_in_out(t, 3),
            Self::Power3In => power_in(t, 4),
            Self::Power3Out => power_out(t, 4),
            Self::Power3InOut => power_in_out(t, 4),
            Self::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Self::SineOut => (t * PI / 2.0).sin(),
            Self::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
            Self::ExpoSmooth => (1.001 - 2f32.powf(-10.0 * t)).min(1.0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "none",
            Self::Power1In => "power1.in",
            Self::Power1Out => "power1.out",
            Self::Power1InOut => "power1.inOut",
            Self::Power2In => "power2.in",
            Self::Power2Out => "power2.out",
            Self::Power2InOut => "power2.inOut",
            Self::Power3In => "power3.in",
            Self::Power3Out => "power3.out",
            Self::Power3InOut => "power3.inOut",
            Self::SineIn => "sine.in",
            Self::SineOut => "sine.out",
            Self::SineInOut => "sine.inOut",
            Self::ExpoSmooth => "expo.smooth",
        }
    }
}

fn power_in(t: f32, exp: i32) -> f32 {
    t.powi(exp)
}

fn power_out(t: f32, exp: i32) -> f32 {
    1.0 - (1.0 - t).powi(exp)
}

fn power_in_out(t: f32, exp: i32) -> f32 {
    if t < 0.5 {
        2f32.powi(exp - 1) * t.powi(exp)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(exp) / 2.0
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Easing {
    type Err = SerenadeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let (family, direction) = match normalized.split_once('.') {
            Some((family, direction)) => (family, direction),
            // A bare family name eases out
            None => (normalized.as_str(), "out"),
        };

        let easing = match (family, direction) {
            ("none" | "linear", _) => Self::Linear,
            ("power0", _) => Self::Linear,
            ("power1" | "quad", "in") => Self::Power1In,
            ("power1" | "quad", "out") => Self::Power1Out,
            ("power1" | "quad", "inout") => Self::Power1InOut,
            ("power2" | "cubic", "in") => Self::Power2In,
            ("power2" | "cubic", "out") => Self::Power2Out,
            ("power2" | "cubic", "inout") => Self::Power2InOut,
            ("power3" | "quart", "in") => Self::Power3In,
            ("power3" | "quart", "out") => Self::Power3Out,
            ("power3" | "quart", "inout") => Self::Power3InOut,
            ("sine", "in") => Self::SineIn,
            ("sine", "out") => Self::SineOut,
            ("sine", "inout") => Self::SineInOut,
            ("expo", "smooth") => Self::ExpoSmooth,
            _ => return Err(SerenadeError::InvalidEasing(s.to_string())),
        };
        Ok(easing)
    }
}

impl<'de> Deserialize<'de> for Easing {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 13] = [
        Easing::Linear,
        Easing::Power1In,
        Easing::Power1Out,
        Easing::Power1InOut,
        Easing::Power2In,
        Easing::Power2Out,
        Easing::Power2InOut,
        Easing::Power3In,
        Easing::Power3Out,
        Easing::Power3InOut,
        Easing::SineIn,
        Easing::SineOut,
        Easing::SineInOut,
    ];

    #[test]
    fn test_endpoints_are_exact() {
        for easing in ALL.iter().copied().chain([Easing::ExpoSmooth]) {
            assert_eq!(easing.apply(0.0), 0.0, "{easing} at 0");
            assert_eq!(easing.apply(1.0), 1.0, "{easing} at 1");
            assert_eq!(easing.apply(-0.5), 0.0, "{easing} below 0");
        }
    }

    #[test]
    fn test_monotonic() {
        for easing in ALL.iter().copied().chain([Easing::ExpoSmooth]) {
            let mut prev = easing.apply(0.0);
            for i in 1..=100 {
                let v = easing.apply(i as f32 / 100.0);
                assert!(v + 1e-6 >= prev, "{easing} decreased at step {i}");
                prev = v;
            }
        }
    }

    #[test]
    fn test_in_out_midpoint() {
        for easing in [
            Easing::Power1InOut,
            Easing::Power2InOut,
            Easing::Power3InOut,
            Easing::SineInOut,
        ] {
            assert!((easing.apply(0.5) - 0.5).abs() < 1e-5, "{easing}");
        }
    }

    #[test]
    fn test_clamps_input() {
        assert_eq!(Easing::Power2Out.apply(-1.0), 0.0);
        assert_eq!(Easing::Power2Out.apply(2.0), 1.0);
    }

    #[test]
    fn test_expo_smooth_saturates() {
        assert_eq!(Easing::ExpoSmooth.apply(1.0), 1.0);
        assert!(Easing::ExpoSmooth.apply(0.5) > 0.95);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("none".parse::<Easing>().unwrap(), Easing::Linear);
        assert_eq!("power2.out".parse::<Easing>().unwrap(), Easing::Power2Out);
        assert_eq!("power1.inOut".parse::<Easing>().unwrap(), Easing::Power1InOut);
        assert_eq!("sine.inOut".parse::<Easing>().unwrap(), Easing::SineInOut);
        assert_eq!("power3".parse::<Easing>().unwrap(), Easing::Power3Out);
        assert_eq!("expo.smooth".parse::<Easing>().unwrap(), Easing::ExpoSmooth);
        assert!("bounce.out".parse::<Easing>().is_err());
    }

    #[test]
    fn test_name_round_trips() {
        for easing in ALL {
            assert_eq!(easing.name().parse::<Easing>().unwrap(), easing);
        }
    }
}
