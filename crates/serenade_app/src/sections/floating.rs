//! Decorative floating background
//!
//! Every particle gets a seeded random placement, fades in after a random
//! delay, then drifts and pulses forever. The same seed always produces the
//! same page.

use serenade_animation::{AnimationScope, Easing, Playback, PropertySet, Span, Timeline};
use serenade_core::{Document, ElementId, Property, Result, Value};

use crate::config::FloatingConfig;
use crate::section::{Section, SectionContext};

/// SplitMix64
#[derive(Clone, Debug)]
struct Rng64 {
    state: u64,
}

impl Rng64 {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`
    fn next_f32_01(&mut self) -> f32 {
        // 24 bits of precision, exact in an f32
        let v = self.next_u64() >> 40;
        (v as f32) * (1.0 / ((1u32 << 24) as f32))
    }

    fn range(&mut self, [low, high]: [f32; 2]) -> f32 {
        low + (high - low) * self.next_f32_01()
    }
}

/// Where a particle starts and how it moves
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticlePlan {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub rotation: f32,
    pub opacity: f32,
    pub fade_delay: f32,
    pub drift: (f32, f32, f32),
    pub drift_secs: f32,
    pub pulse_secs: f32,
}

impl ParticlePlan {
    fn roll(rng: &mut Rng64, config: &FloatingConfig, width: f32, height: f32) -> Self {
        Self {
            x: rng.range([0.0, width]),
            y: rng.range([0.0, height]),
            scale: rng.range(config.scale),
            rotation: rng.range([0.0, 360.0]),
            opacity: rng.range(config.opacity),
            fade_delay: rng.range([0.0, config.max_fade_delay_secs]),
            drift: (
                rng.range(config.drift_x),
                rng.range(config.drift_y),
                rng.range(config.drift_rotation),
            ),
            drift_secs: rng.range(config.drift_secs),
            pulse_secs: rng.range(config.pulse_secs),
        }
    }
}

pub struct FloatingSection {
    particles: Vec<ElementId>,
    plans: Vec<ParticlePlan>,
    scope: AnimationScope,
}

impl FloatingSection {
    pub fn new(particles: Vec<ElementId>) -> Self {
        Self {
            particles,
            plans: Vec::new(),
            scope: AnimationScope::new("floating"),
        }
    }

    /// Plans rolled at mount, one per animated particle
    pub fn plans(&self) -> &[ParticlePlan] {
        &self.plans
    }

    fn animate(
        &mut self,
        particle: ElementId,
        plan: &ParticlePlan,
        config: &FloatingConfig,
    ) -> Result<()> {
        let mut fade = Timeline::autonomous(Playback::once());
        fade.to(
            particle,
            PropertySet::new().with(Property::Opacity, 0.0),
            PropertySet::new().with(Property::Opacity, plan.opacity),
            Span::new(config.fade_secs)
                .ease(Easing::Power1Out)
                .delay(plan.fade_delay),
        )?;

        let (dx, dy, dr) = plan.drift;
        let mut drift = Timeline::autonomous(Playback::yoyo_forever());
        drift.to(
            particle,
            PropertySet::new()
                .with(Property::X, plan.x)
                .with(Property::Y, plan.y)
                .with(Property::Rotation, plan.rotation),
            PropertySet::new()
                .with(Property::X, plan.x + dx)
                .with(Property::Y, plan.y + dy)
                .with(Property::Rotation, plan.rotation + dr),
            Span::new(plan.drift_secs).ease(Easing::SineInOut),
        )?;

        let mut pulse = Timeline::autonomous(Playback::yoyo_forever());
        pulse.to(
            particle,
            PropertySet::new().with(Property::Scale, plan.scale),
            PropertySet::new().with(Property::Scale, plan.scale + config.pulse_scale),
            Span::new(plan.pulse_secs).ease(Easing::Power1InOut),
        )?;

        for timeline in [fade, drift, pulse] {
            let id = self.scope.add(timeline);
            self.scope.play(id);
        }
        Ok(())
    }
}

impl<D: Document> Section<D> for FloatingSection {
    fn name(&self) -> &str {
        "floating"
    }

    fn mount(&mut self, cx: &mut SectionContext<'_, D>) -> Result<()> {
        let config = cx.config.floating;
        let viewport = cx.doc.viewport();
        if self.particles.len() != config.count {
            tracing::debug!(
                particles = self.particles.len(),
                expected = config.count,
                "floating particle count differs from configuration"
            );
        }

        let mut rng = Rng64::new(config.seed);
        let particles = self.particles.clone();
        for particle in particles.into_iter().take(config.count) {
            let plan = ParticlePlan::roll(&mut rng, &config, viewport.width, viewport.height);

            let doc = &mut *cx.doc;
            self.scope.set(particle, Property::X, Value::Number(plan.x), doc);
            self.scope.set(particle, Property::Y, Value::Number(plan.y), doc);
            self.scope.set(particle, Property::Scale, Value::Number(plan.scale), doc);
            self.scope.set(particle, Property::Rotation, Value::Number(plan.rotation), doc);
            self.scope.set(particle, Property::Opacity, Value::Number(0.0), doc);

            self.animate(particle, &plan, &config)?;
            self.plans.push(plan);
        }
        tracing::debug!(particles = self.plans.len(), "floating background started");
        Ok(())
    }

    fn frame(&mut self, cx: &mut SectionContext<'_, D>) {
        self.scope.tick(cx.delta_ms(), &mut *cx.doc);
    }

    fn unmount(&mut self, cx: &mut SectionContext<'_, D>) {
        self.scope.revert(&mut *cx.doc);
        self.plans.clear();
    }
}
