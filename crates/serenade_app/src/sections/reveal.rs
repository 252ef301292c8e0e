//! Scroll-scrubbed reveal of a text/media section
//!
//! Two layouts are supported:
//!
//! - **Split**: text content slides in from the left while the media slides
//!   in from the right at the same time
//! - **Single**: the media rises and scales up on its own
//!
//! Both are scrubbed between the configured boundaries (by default
//! `"top 70%"` → `"bottom bottom"`), so scrolling back hides them again.

use std::cell::Cell;
use std::rc::Rc;

use serenade_animation::{AnimationScope, Easing, Position, PropertySet, Span, Timeline, TimelineId};
use serenade_core::{Document, ElementId, Property, Result};
use serenade_scroll::{BoundaryExpr, Scrub, ScrubFollower, TriggerId, TriggerSpec};

use crate::section::{Section, SectionContext};

/// Which elements a reveal animates
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RevealLayout {
    Split { content: ElementId, media: ElementId },
    Single { media: ElementId },
}

impl RevealLayout {
    pub fn media(&self) -> ElementId {
        match *self {
            RevealLayout::Split { media, .. } | RevealLayout::Single { media } => media,
        }
    }
}

pub struct RevealSection {
    name: String,
    section: ElementId,
    layout: RevealLayout,
    scope: AnimationScope,
    timeline: Option<TimelineId>,
    trigger: Option<TriggerId>,
    progress: Rc<Cell<f32>>,
    follower: ScrubFollower,
    applied: Option<f32>,
}

impl RevealSection {
    pub fn new(name: impl Into<String>, section: ElementId, layout: RevealLayout) -> Self {
        let name = name.into();
        Self {
            scope: AnimationScope::new(name.clone()),
            name,
            section,
            layout,
            timeline: None,
            trigger: None,
            progress: Rc::new(Cell::new(0.0)),
            follower: ScrubFollower::new(Scrub::Immediate),
            applied: None,
        }
    }

    pub fn split(
        name: impl Into<String>,
        section: ElementId,
        content: ElementId,
        media: ElementId,
    ) -> Self {
        Self::new(name, section, RevealLayout::Split { content, media })
    }

    pub fn single(name: impl Into<String>, section: ElementId, media: ElementId) -> Self {
        Self::new(name, section, RevealLayout::Single { media })
    }

    pub fn layout(&self) -> RevealLayout {
        self.layout
    }

    /// Progress currently shown, after scrub smoothing
    pub fn shown_progress(&self) -> f32 {
        self.follower.value()
    }

    fn build_timeline(&self, slide: f32) -> Result<Timeline> {
        let mut timeline = Timeline::scrubbed();
        match self.layout {
            RevealLayout::Split { content, media } => {
                timeline
                    .to(
                        content,
                        PropertySet::new()
                            .with(Property::X, -slide)
                            .with(Property::Opacity, 0.0),
                        PropertySet::new()
                            .with(Property::X, 0.0)
                            .with(Property::Opacity, 1.0),
                        Span::new(1.0).ease(Easing::Power1Out),
                    )?
                    .to(
                        media,
                        PropertySet::new()
                            .with(Property::X, slide)
                            .with(Property::Opacity, 0.0)
                            .with(Property::Scale, 0.9),
                        PropertySet::new()
                            .with(Property::X, 0.0)
                            .with(Property::Opacity, 1.0)
                            .with(Property::Scale, 1.0),
                        Span::new(1.0)
                            .ease(Easing::Power1Out)
                            .at(Position::WithPrevious),
                    )?;
            }
            RevealLayout::Single { media } => {
                timeline.to(
                    media,
                    PropertySet::new()
                        .with(Property::Scale, 0.9)
                        .with(Property::Opacity, 0.0)
                        .with(Property::Y, slide),
                    PropertySet::new()
                        .with(Property::Scale, 1.0)
                        .with(Property::Opacity, 1.0)
                        .with(Property::Y, 0.0),
                    Span::new(1.5).ease(Easing::Power3Out),
                )?;
            }
        }
        Ok(timeline)
    }
}

impl<D: Document> Section<D> for RevealSection {
    fn name(&self) -> &str {
        &self.name
    }

    fn mount(&mut self, cx: &mut SectionContext<'_, D>) -> Result<()> {
        let config = &cx.config.reveal;
        let start: BoundaryExpr = config.start.parse()?;
        let end: BoundaryExpr = config.end.parse()?;
        self.follower = ScrubFollower::new(Scrub::from_secs(config.scrub_lag_secs));

        let timeline = self.build_timeline(config.slide)?;
        let timeline = self.scope.add(timeline);
        // Hidden until the trigger says otherwise
        self.scope.set_progress(timeline, 0.0, &mut *cx.doc);
        self.applied = Some(0.0);
        self.timeline = Some(timeline);

        let spec = TriggerSpec::new(self.section).start(start).end(end);
        let sink = self.progress.clone();
        self.trigger = Some(cx.registry.register(spec, move |p| sink.set(p)));
        Ok(())
    }

    fn frame(&mut self, cx: &mut SectionContext<'_, D>) {
        let Some(timeline) = self.timeline else {
            return;
        };
        self.follower.set_target(self.progress.get());
        let progress = self.follower.tick(cx.delta_ms());
        if self.applied != Some(progress) {
            self.scope.set_progress(timeline, progress, &mut *cx.doc);
            self.applied = Some(progress);
        }
    }

    fn unmount(&mut self, cx: &mut SectionContext<'_, D>) {
        if let Some(trigger) = self.trigger.take() {
            cx.registry.unregister(trigger, &mut *cx.doc);
        }
        self.timeline = None;
        self.applied = None;
        self.scope.revert(&mut *cx.doc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageConfig;
    use crate::page::Page;
    use serenade_core::{FrameTime, HeadlessDocument, Rect, SerenadeError, Size};

    struct Fixture {
        page: Page<HeadlessDocument>,
        section: ElementId,
        content: ElementId,
        media: ElementId,
    }

    fn fixture(config: PageConfig) -> Fixture {
        let mut doc = HeadlessDocument::new(Size::new(1280.0, 1000.0));
        let section = doc.insert("banzone", Rect::new(0.0, 800.0, 1280.0, 600.0));
        let content = doc.insert("copy", Rect::new(0.0, 800.0, 640.0, 600.0));
        let media = doc.insert("photo", Rect::new(640.0, 800.0, 640.0, 600.0));
        doc.insert("footer", Rect::new(0.0, 1400.0, 1280.0, 2000.0));
        Fixture {
            page: Page::new(doc, config),
            section,
            content,
            media,
        }
    }

    fn immediate() -> PageConfig {
        let mut config = PageConfig::default();
        config.smooth_scroll.duration_secs = 0.0;
        config.reveal.scrub_lag_secs = 0.0;
        config
    }

    #[test]
    fn test_split_reveal_is_hidden_on_mount() {
        let Fixture {
            page,
            section,
            content,
            media,
        } = fixture(immediate());
        page.mount(RevealSection::split("banzone", section, content, media))
            .unwrap();

        page.with_document(|doc| {
            assert_eq!(doc.number(content, Property::X), -50.0);
            assert_eq!(doc.number(content, Property::Opacity), 0.0);
            assert_eq!(doc.number(media, Property::X), 50.0);
            assert_eq!(doc.number(media, Property::Scale), 0.9);
        });
    }

    #[test]
    fn test_split_reveal_tracks_scroll_both_ways() {
        let Fixture {
            page,
            section,
            content,
            media,
        } = fixture(immediate());
        page.mount(RevealSection::split("banzone", section, content, media))
            .unwrap();

        // "top 70%" resolves to 800 - 700 = 100, "bottom bottom" to 1400 - 1000 = 400
        page.native_scroll(400.0);
        page.frame(FrameTime::new(16.0, 16.0, 1));
        page.with_document(|doc| {
            assert_eq!(doc.number(content, Property::X), 0.0);
            assert_eq!(doc.number(media, Property::Opacity), 1.0);
        });

        page.native_scroll(100.0);
        page.frame(FrameTime::new(32.0, 16.0, 2));
        page.with_document(|doc| {
            assert_eq!(doc.number(content, Property::Opacity), 0.0);
            assert_eq!(doc.number(media, Property::X), 50.0);
        });
    }

    #[test]
    fn test_single_reveal_rises() {
        let Fixture {
            page,
            section,
            media,
            ..
        } = fixture(immediate());
        page.mount(RevealSection::single("video", section, media))
            .unwrap();
        page.with_document(|doc| assert_eq!(doc.number(media, Property::Y), 50.0));

        page.native_scroll(1000.0);
        page.frame(FrameTime::new(16.0, 16.0, 1));
        page.with_document(|doc| {
            assert_eq!(doc.number(media, Property::Y), 0.0);
            assert_eq!(doc.number(media, Property::Scale), 1.0);
        });
    }

    #[test]
    fn test_bad_boundary_leaves_section_static() {
        let mut config = immediate();
        config.reveal.start = "middle".to_string();
        let Fixture {
            page,
            section,
            media,
            ..
        } = fixture(config);

        let err = page
            .mount(RevealSection::single("video", section, media))
            .unwrap_err();
        assert!(matches!(err, SerenadeError::InvalidBoundary(_)));
        assert_eq!(page.section_count(), 0);
        assert_eq!(page.trigger_count(), 0);
        page.with_document(|doc| assert_eq!(doc.style(media, Property::Y), None));
    }

    #[test]
    fn test_media_failure_shows_fallback() {
        let Fixture {
            page,
            section,
            media,
            ..
        } = fixture(immediate());
        page.mount(RevealSection::single("video", section, media))
            .unwrap();

        page.media_failed(media, "404");
        page.frame(FrameTime::new(16.0, 16.0, 1));
        page.with_document(|doc| assert!(doc.shows_fallback(media)));
        assert_eq!(page.section_count(), 1);
    }
}
