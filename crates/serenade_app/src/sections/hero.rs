//! Hero banner: entrance, heartbeat and scroll parallax

use std::cell::Cell;
use std::rc::Rc;

use serenade_animation::{
    AnimationScope, Easing, Playback, Position, PropertySet, Span, Timeline, TimelineId,
};
use serenade_core::{Color, Document, ElementId, Property, Result};
use serenade_scroll::{BoundaryExpr, Edge, TriggerId, TriggerSpec};

use crate::section::{Section, SectionContext};

/// Darker gold the title pulses towards
const HEARTBEAT_COLOR: u32 = 0xB08D26;

#[derive(Clone, Copy, Debug)]
pub struct HeroElements {
    pub container: ElementId,
    pub title: ElementId,
    pub subtitle: ElementId,
}

pub struct HeroSection {
    elements: HeroElements,
    scope: AnimationScope,
    parallax: Option<TimelineId>,
    trigger: Option<TriggerId>,
    progress: Rc<Cell<f32>>,
    applied: Option<f32>,
}

impl HeroSection {
    pub fn new(elements: HeroElements) -> Self {
        Self {
            elements,
            scope: AnimationScope::new("hero"),
            parallax: None,
            trigger: None,
            progress: Rc::new(Cell::new(0.0)),
            applied: None,
        }
    }

    pub fn elements(&self) -> HeroElements {
        self.elements
    }

    /// Parallax progress delivered by the scroll trigger
    pub fn parallax_progress(&self) -> f32 {
        self.progress.get()
    }
}

impl<D: Document> Section<D> for HeroSection {
    fn name(&self) -> &str {
        "hero"
    }

    fn mount(&mut self, cx: &mut SectionContext<'_, D>) -> Result<()> {
        let config = cx.config.hero;
        let HeroElements {
            container,
            title,
            subtitle,
        } = self.elements;

        let mut entrance = Timeline::autonomous(Playback::once());
        entrance
            .to(
                title,
                PropertySet::new()
                    .with(Property::Y, 80.0)
                    .with(Property::Opacity, 0.0)
                    .with(Property::Scale, 0.95)
                    .with(Property::Blur, 10.0),
                PropertySet::new()
                    .with(Property::Y, 0.0)
                    .with(Property::Opacity, 1.0)
                    .with(Property::Scale, 1.0)
                    .with(Property::Blur, 0.0),
                Span::new(config.title_secs)
                    .ease(config.entrance_easing)
                    .delay(config.delay_secs),
            )?
            .to(
                subtitle,
                PropertySet::new()
                    .with(Property::Y, 20.0)
                    .with(Property::Opacity, 0.0),
                PropertySet::new()
                    .with(Property::Y, 0.0)
                    .with(Property::Opacity, 1.0),
                Span::new(config.subtitle_secs)
                    .ease(config.entrance_easing)
                    .at(Position::Offset(-config.subtitle_overlap_secs)),
            )?;

        // Pulses from whatever colour the stylesheet gave the title
        let base_color = cx
            .doc
            .read(title, Property::Color)
            .and_then(|value| value.as_color())
            .unwrap_or(Color::WHITE);
        let mut heartbeat = Timeline::autonomous(Playback::yoyo_forever());
        heartbeat.to(
            title,
            PropertySet::new()
                .with(Property::Scale, 1.0)
                .with_color(Property::Color, base_color)
                .with(Property::GlowRadius, 0.0),
            PropertySet::new()
                .with(Property::Scale, config.heartbeat_scale)
                .with_color(Property::Color, Color::from_hex(HEARTBEAT_COLOR))
                .with(Property::GlowRadius, config.heartbeat_glow),
            Span::new(config.heartbeat_secs).ease(config.heartbeat_easing),
        )?;

        let mut parallax = Timeline::scrubbed();
        parallax.to(
            container,
            PropertySet::new()
                .with(Property::YPercent, 0.0)
                .with(Property::Opacity, 1.0),
            PropertySet::new()
                .with(Property::YPercent, config.parallax_percent)
                .with(Property::Opacity, config.parallax_opacity),
            Span::new(1.0).ease(Easing::Linear),
        )?;

        let entrance = self.scope.add(entrance);
        let heartbeat = self.scope.add(heartbeat);
        self.scope.play(entrance);
        self.scope.play(heartbeat);
        self.parallax = Some(self.scope.add(parallax));

        let spec = TriggerSpec::new(container)
            .start(BoundaryExpr::anchor(Edge::Top, Edge::Top))
            .end(BoundaryExpr::anchor(Edge::Bottom, Edge::Top));
        let sink = self.progress.clone();
        self.trigger = Some(cx.registry.register(spec, move |p| sink.set(p)));
        Ok(())
    }

    fn frame(&mut self, cx: &mut SectionContext<'_, D>) {
        self.scope.tick(cx.delta_ms(), &mut *cx.doc);

        let Some(parallax) = self.parallax else {
            return;
        };
        let progress = self.progress.get();
        if self.applied != Some(progress) {
            self.scope.set_progress(parallax, progress, &mut *cx.doc);
            self.applied = Some(progress);
        }
    }

    fn unmount(&mut self, cx: &mut SectionContext<'_, D>) {
        if let Some(trigger) = self.trigger.take() {
            cx.registry.unregister(trigger, &mut *cx.doc);
        }
        self.parallax = None;
        self.applied = None;
        self.scope.revert(&mut *cx.doc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageConfig;
    use crate::page::Page;
    use serenade_core::{FrameTime, HeadlessDocument, Rect, Size};

    fn hero_page() -> (Page<HeadlessDocument>, HeroElements) {
        let mut doc = HeadlessDocument::new(Size::new(1280.0, 800.0));
        let elements = HeroElements {
            container: doc.insert("hero", Rect::new(0.0, 0.0, 1280.0, 800.0)),
            title: doc.insert("title", Rect::new(100.0, 300.0, 1080.0, 150.0)),
            subtitle: doc.insert("subtitle", Rect::new(100.0, 500.0, 1080.0, 40.0)),
        };
        doc.insert("rest", Rect::new(0.0, 800.0, 1280.0, 3000.0));
        let mut config = PageConfig::default();
        config.smooth_scroll.duration_secs = 0.0;
        (Page::new(doc, config), elements)
    }

    fn run(page: &Page<HeadlessDocument>, frames: u64, step_ms: f64) {
        for frame in 1..=frames {
            page.frame(FrameTime::new(frame as f64 * step_ms, step_ms, frame));
        }
    }

    #[test]
    fn test_entrance_starts_hidden_and_settles() {
        let (page, elements) = hero_page();
        page.mount(HeroSection::new(elements)).unwrap();

        page.frame(FrameTime::new(0.0, 0.0, 1));
        page.with_document(|doc| {
            assert_eq!(doc.number(elements.title, Property::Y), 80.0);
            assert_eq!(doc.number(elements.title, Property::Blur), 10.0);
            assert_eq!(doc.number(elements.subtitle, Property::Opacity), 0.0);
        });

        // Entrance lasts 0.2 + 2.5 - 1.5 + 2.0 = 3.2 seconds
        run(&page, 40, 100.0);
        page.with_document(|doc| {
            assert_eq!(doc.number(elements.title, Property::Y), 0.0);
            assert_eq!(doc.number(elements.title, Property::Opacity), 1.0);
            assert_eq!(doc.number(elements.subtitle, Property::Y), 0.0);
        });
    }

    #[test]
    fn test_heartbeat_keeps_running() {
        let (page, elements) = hero_page();
        page.mount(HeroSection::new(elements)).unwrap();

        // Half a heartbeat in, the title is at its peak
        run(&page, 8, 100.0);
        let peak = page.with_document(|doc| doc.number(elements.title, Property::GlowRadius));
        assert!((peak - 30.0).abs() < 1e-3);

        // A full cycle later it is back to rest
        run(&page, 8, 100.0);
        let rest = page.with_document(|doc| doc.number(elements.title, Property::GlowRadius));
        assert!(rest.abs() < 1e-3);
    }

    #[test]
    fn test_parallax_follows_scroll() {
        let (page, elements) = hero_page();
        page.mount(HeroSection::new(elements)).unwrap();

        page.native_scroll(400.0);
        page.frame(FrameTime::new(16.0, 16.0, 1));
        page.with_document(|doc| {
            assert_eq!(doc.number(elements.container, Property::YPercent), 15.0);
            assert_eq!(doc.number(elements.container, Property::Opacity), 0.75);
        });
    }

    #[test]
    fn test_unmount_restores_hero() {
        let (page, elements) = hero_page();
        let id = page.mount(HeroSection::new(elements)).unwrap();
        run(&page, 5, 100.0);

        assert!(page.unmount(id));
        assert!(!page.unmount(id));
        assert_eq!(page.trigger_count(), 0);
        page.with_document(|doc| {
            assert_eq!(doc.style(elements.title, Property::Y), None);
            assert_eq!(doc.style(elements.container, Property::YPercent), None);
        });
    }
}
