//! Page configuration
//!
//! Every section's timing and policy lives here, with defaults matching the
//! shipped page. Configuration can be loaded from TOML; missing tables and
//! keys fall back to their defaults.
//!
//! ```toml
//! [smooth_scroll]
//! duration_secs = 1.2
//! easing = "power3.out"
//!
//! [gallery]
//! pin_min_viewport_width = 1024
//!
//! [reveal]
//! start = "top 80%"
//! ```

use anyhow::{ensure, Context};
use serde::Deserialize;
use serenade_animation::Easing;
use serenade_core::{Result, SerenadeError};
use serenade_scroll::{BoundaryExpr, SmoothScrollConfig};

/// Top-level configuration for a page
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub smooth_scroll: SmoothScrollConfig,
    pub hero: HeroConfig,
    pub gallery: GalleryConfig,
    pub reveal: RevealConfig,
    pub floating: FloatingConfig,
    pub spotlight: SpotlightConfig,
}

impl PageConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        parse(text).map_err(|err| SerenadeError::Config(format!("{err:#}")))
    }

    /// Check cross-field constraints serde cannot express
    pub fn validate(&self) -> Result<()> {
        validate(self).map_err(|err| SerenadeError::Config(format!("{err:#}")))
    }
}

fn parse(text: &str) -> anyhow::Result<PageConfig> {
    let config: PageConfig = toml::from_str(text).context("malformed page configuration")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &PageConfig) -> anyhow::Result<()> {
    ensure!(
        config.smooth_scroll.duration_secs >= 0.0,
        "smooth_scroll.duration_secs must not be negative"
    );
    ensure!(
        config.gallery.pin_min_viewport_width >= 0.0,
        "gallery.pin_min_viewport_width must not be negative"
    );
    config
        .reveal
        .start
        .parse::<BoundaryExpr>()
        .context("reveal.start")?;
    config
        .reveal
        .end
        .parse::<BoundaryExpr>()
        .context("reveal.end")?;
    for (name, [low, high]) in [
        ("floating.drift_secs", config.floating.drift_secs),
        ("floating.pulse_secs", config.floating.pulse_secs),
        ("floating.scale", config.floating.scale),
        ("floating.opacity", config.floating.opacity),
    ] {
        ensure!(low <= high, "{name}: lower bound {low} exceeds upper bound {high}");
    }
    Ok(())
}

/// Entrance, heartbeat and parallax of the hero banner
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct HeroConfig {
    /// Delay before the title starts moving (default: 0.2)
    pub delay_secs: f32,
    /// Title entrance duration (default: 2.5)
    pub title_secs: f32,
    /// Subtitle entrance duration (default: 2.0)
    pub subtitle_secs: f32,
    /// How long before the title finishes the subtitle starts (default: 1.5)
    pub subtitle_overlap_secs: f32,
    /// Entrance easing (default: `power2.out`)
    pub entrance_easing: Easing,
    /// Half a heartbeat cycle (default: 0.8)
    pub heartbeat_secs: f32,
    /// Heartbeat easing (default: `power1.inOut`)
    pub heartbeat_easing: Easing,
    /// Heartbeat peak scale (default: 1.05)
    pub heartbeat_scale: f32,
    /// Heartbeat peak glow radius in pixels (default: 30)
    pub heartbeat_glow: f32,
    /// Parallax travel as a percentage of the banner height (default: 30)
    pub parallax_percent: f32,
    /// Banner opacity once scrolled past (default: 0.5)
    pub parallax_opacity: f32,
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            delay_secs: 0.2,
            title_secs: 2.5,
            subtitle_secs: 2.0,
            subtitle_overlap_secs: 1.5,
            entrance_easing: Easing::Power2Out,
            heartbeat_secs: 0.8,
            heartbeat_easing: Easing::Power1InOut,
            heartbeat_scale: 1.05,
            heartbeat_glow: 30.0,
            parallax_percent: 30.0,
            parallax_opacity: 0.5,
        }
    }
}

/// Pinned horizontal gallery
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Pin only on viewports strictly wider than this (default: 768)
    pub pin_min_viewport_width: f32,
    /// Seconds the track lags behind the scroll (default: 1.0, 0 = immediate)
    pub scrub_lag_secs: f32,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            pin_min_viewport_width: 768.0,
            scrub_lag_secs: 1.0,
        }
    }
}

/// Scroll-scrubbed reveal sections
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Boundary where the reveal begins (default: `"top 70%"`)
    pub start: String,
    /// Boundary where the reveal completes (default: `"bottom bottom"`)
    pub end: String,
    /// Seconds the reveal lags behind the scroll (default: 1.0)
    pub scrub_lag_secs: f32,
    /// Horizontal slide distance in pixels (default: 50)
    pub slide: f32,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            start: "top 70%".to_string(),
            end: "bottom bottom".to_string(),
            scrub_lag_secs: 1.0,
            slide: 50.0,
        }
    }
}

/// Decorative drifting background particles
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FloatingConfig {
    /// Number of particles the section expects (default: 20)
    pub count: usize,
    /// Seed for placement and motion (default: fixed)
    pub seed: u64,
    /// Initial scale range (default: 0.8 to 2.3)
    pub scale: [f32; 2],
    /// Faded-in opacity range (default: 0.03 to 0.08)
    pub opacity: [f32; 2],
    /// Fade-in duration (default: 2.0)
    pub fade_secs: f32,
    /// Longest fade-in delay (default: 2.0)
    pub max_fade_delay_secs: f32,
    /// Vertical drift range in pixels (default: 100 to 300)
    pub drift_y: [f32; 2],
    /// Horizontal drift range in pixels (default: -50 to 50)
    pub drift_x: [f32; 2],
    /// Rotation drift range in degrees (default: 45 to 135)
    pub drift_rotation: [f32; 2],
    /// Half a drift cycle (default: 15 to 30)
    pub drift_secs: [f32; 2],
    /// Extra scale at the top of a pulse (default: 0.3)
    pub pulse_scale: f32,
    /// Half a pulse cycle (default: 1 to 2)
    pub pulse_secs: [f32; 2],
}

impl Default for FloatingConfig {
    fn default() -> Self {
        Self {
            count: 20,
            seed: 0x5EED_F10A_7000_0014,
            scale: [0.8, 2.3],
            opacity: [0.03, 0.08],
            fade_secs: 2.0,
            max_fade_delay_secs: 2.0,
            drift_y: [100.0, 300.0],
            drift_x: [-50.0, 50.0],
            drift_rotation: [45.0, 135.0],
            drift_secs: [15.0, 30.0],
            pulse_scale: 0.3,
            pulse_secs: [1.0, 2.0],
        }
    }
}

/// Pointer-tracked radial highlights
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpotlightConfig {
    /// Radius of the wide, dim gradient (default: 800)
    pub outer_radius: f32,
    /// Radius of the tight, bright gradient (default: 400)
    pub inner_radius: f32,
}

impl Default for SpotlightConfig {
    fn default() -> Self {
        Self {
            outer_radius: 800.0,
            inner_radius: 400.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serenade_scroll::ScrollAxis;

    #[test]
    fn test_defaults_match_shipped_page() {
        let config = PageConfig::default();
        assert_eq!(config.smooth_scroll.duration_secs, 1.5);
        assert_eq!(config.smooth_scroll.easing, Easing::ExpoSmooth);
        assert_eq!(config.smooth_scroll.wheel_multiplier, 0.8);
        assert_eq!(config.smooth_scroll.touch_multiplier, 2.0);
        assert!(!config.smooth_scroll.smooth_touch);
        assert_eq!(config.gallery.pin_min_viewport_width, 768.0);
        assert_eq!(config.reveal.start, "top 70%");
        assert_eq!(config.floating.count, 20);
        assert_eq!(config.spotlight.outer_radius, 800.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(PageConfig::from_toml_str("").unwrap(), PageConfig::default());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = PageConfig::from_toml_str(
            r#"
            [smooth_scroll]
            duration_secs = 1.2
            easing = "power3.out"
            direction = "horizontal"

            [gallery]
            pin_min_viewport_width = 1024.0

            [floating]
            count = 5
            drift_secs = [10.0, 12.0]
            "#,
        )
        .unwrap();

        assert_eq!(config.smooth_scroll.duration_secs, 1.2);
        assert_eq!(config.smooth_scroll.easing, Easing::Power3Out);
        assert_eq!(config.smooth_scroll.direction, ScrollAxis::Horizontal);
        assert_eq!(config.smooth_scroll.wheel_multiplier, 0.8);
        assert_eq!(config.gallery.pin_min_viewport_width, 1024.0);
        assert_eq!(config.gallery.scrub_lag_secs, 1.0);
        assert_eq!(config.floating.count, 5);
        assert_eq!(config.floating.drift_secs, [10.0, 12.0]);
    }

    #[test]
    fn test_bad_values_are_config_errors() {
        for text in [
            "[smooth_scroll]\neasing = \"bounce.out\"",
            "[reveal]\nstart = \"top\"",
            "[floating]\nscale = [3.0, 1.0]",
            "[smooth_scroll]\nduration_secs = -1.0",
            "not toml at all",
        ] {
            let err = PageConfig::from_toml_str(text).unwrap_err();
            assert!(matches!(err, SerenadeError::Config(_)), "{text}: {err}");
        }
    }
}
