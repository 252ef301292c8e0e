//! Pinned horizontal gallery
//!
//! On wide viewports the gallery section is pinned and vertical scrolling
//! moves its track sideways. Narrow viewports keep native scrolling. A resize
//! across the threshold starts or disposes the pin.

use serenade_core::{Document, ElementId, Result};
use serenade_scroll::{PinController, PinSetup, PinState, Scrub, ScrubFollower};

use crate::section::{Section, SectionContext};

#[derive(Clone, Copy, Debug)]
pub struct GalleryElements {
    pub section: ElementId,
    pub track: ElementId,
}

pub struct GallerySection {
    elements: GalleryElements,
    pin: Option<PinController>,
    follower: ScrubFollower,
}

impl GallerySection {
    pub fn new(elements: GalleryElements) -> Self {
        Self {
            elements,
            pin: None,
            follower: ScrubFollower::new(Scrub::Immediate),
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.pin.is_some()
    }

    pub fn pin_state(&self) -> Option<PinState> {
        self.pin.as_ref().map(PinController::state)
    }

    fn start_pin<D: Document>(&mut self, cx: &mut SectionContext<'_, D>) {
        let config = cx.config.gallery;
        let setup = PinSetup {
            section: self.elements.section,
            track: self.elements.track,
            min_viewport_width: config.pin_min_viewport_width,
        };
        self.follower = ScrubFollower::new(Scrub::from_secs(config.scrub_lag_secs));
        self.pin = PinController::start(cx.registry, &*cx.doc, setup);
    }

    fn stop_pin<D: Document>(&mut self, cx: &mut SectionContext<'_, D>) {
        if let Some(mut pin) = self.pin.take() {
            pin.dispose(cx.registry, &mut *cx.doc);
        }
        self.follower.snap(0.0);
    }
}

impl<D: Document> Section<D> for GallerySection {
    fn name(&self) -> &str {
        "gallery"
    }

    fn mount(&mut self, cx: &mut SectionContext<'_, D>) -> Result<()> {
        self.start_pin(cx);
        Ok(())
    }

    fn frame(&mut self, cx: &mut SectionContext<'_, D>) {
        let Some(pin) = &mut self.pin else {
            return;
        };
        self.follower.set_target(pin.trigger_progress());
        let progress = self.follower.tick(cx.delta_ms());
        pin.apply(progress, &mut *cx.doc);
    }

    fn on_layout_settled(&mut self, cx: &mut SectionContext<'_, D>) {
        let wide = cx.doc.viewport().width > cx.config.gallery.pin_min_viewport_width;
        match (self.pin.as_mut(), wide) {
            (Some(pin), true) => {
                if let Err(err) = pin.refresh(cx.registry, &*cx.doc) {
                    tracing::warn!(%err, "gallery track not measurable, keeping pin distance");
                }
            }
            (Some(_), false) => {
                tracing::debug!("viewport narrowed, releasing gallery pin");
                self.stop_pin(cx);
            }
            (None, true) => self.start_pin(cx),
            (None, false) => {}
        }
    }

    fn unmount(&mut self, cx: &mut SectionContext<'_, D>) {
        self.stop_pin(cx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageConfig;
    use crate::page::Page;
    use serenade_core::{FrameTime, HeadlessDocument, PinLock, Property, Rect, Size};

    fn gallery_page(viewport_width: f32) -> (Page<HeadlessDocument>, GalleryElements) {
        gallery_page_with_lag(viewport_width, 0.0)
    }

    fn gallery_page_with_lag(
        viewport_width: f32,
        scrub_lag_secs: f32,
    ) -> (Page<HeadlessDocument>, GalleryElements) {
        let mut doc = HeadlessDocument::new(Size::new(viewport_width, 800.0));
        let section = doc.insert("gallery", Rect::new(0.0, 1000.0, viewport_width, 800.0));
        let track = doc.insert("track", Rect::new(0.0, 1000.0, viewport_width, 800.0));
        doc.set_scroll_width(track, 3000.0);
        doc.insert("footer", Rect::new(0.0, 1800.0, viewport_width, 4000.0));

        let mut config = PageConfig::default();
        config.smooth_scroll.duration_secs = 0.0;
        config.gallery.scrub_lag_secs = scrub_lag_secs;
        (Page::new(doc, config), GalleryElements { section, track })
    }

    #[test]
    fn test_pinned_track_follows_scroll() {
        let (page, elements) = gallery_page(1000.0);
        page.mount(GallerySection::new(elements)).unwrap();
        assert_eq!(page.trigger_count(), 1);

        page.native_scroll(2000.0);
        page.frame(FrameTime::new(16.0, 16.0, 1));
        page.with_document(|doc| {
            assert_eq!(doc.number(elements.track, Property::X), -1000.0);
            assert!(doc.pin(elements.section).is_fixed());
        });

        page.native_scroll(5000.0);
        page.frame(FrameTime::new(32.0, 16.0, 2));
        page.with_document(|doc| {
            assert_eq!(doc.number(elements.track, Property::X), -2000.0);
            assert!(matches!(doc.pin(elements.section), PinLock::Released { .. }));
        });
    }

    #[test]
    fn test_narrow_viewport_scrolls_natively() {
        let (page, elements) = gallery_page(768.0);
        page.mount(GallerySection::new(elements)).unwrap();
        assert_eq!(page.trigger_count(), 0);

        page.native_scroll(2000.0);
        page.frame(FrameTime::new(16.0, 16.0, 1));
        page.with_document(|doc| {
            assert_eq!(doc.style(elements.track, Property::X), None);
            assert_eq!(doc.pin(elements.section), PinLock::None);
        });
    }

    #[test]
    fn test_resize_across_threshold() {
        let (page, elements) = gallery_page(1000.0);
        page.mount(GallerySection::new(elements)).unwrap();
        page.native_scroll(2000.0);
        page.frame(FrameTime::new(16.0, 16.0, 1));

        page.with_document_mut(|doc| doc.set_viewport(Size::new(600.0, 800.0)));
        page.resize(Size::new(600.0, 800.0));
        assert_eq!(page.trigger_count(), 0);
        page.with_document(|doc| {
            assert_eq!(doc.style(elements.track, Property::X), None);
            assert_eq!(doc.pin(elements.section), PinLock::None);
        });

        page.with_document_mut(|doc| doc.set_viewport(Size::new(1000.0, 800.0)));
        page.resize(Size::new(1000.0, 800.0));
        assert_eq!(page.trigger_count(), 1);
    }

    #[test]
    fn test_lag_scrub_eases_into_place() {
        let (page, elements) = gallery_page_with_lag(1000.0, 1.0);
        page.mount(GallerySection::new(elements)).unwrap();

        page.native_scroll(2000.0);
        page.frame(FrameTime::new(100.0, 100.0, 1));
        let early = page.with_document(|doc| doc.number(elements.track, Property::X));
        assert!(early < 0.0 && early > -1000.0);

        for frame in 2..=20 {
            page.frame(FrameTime::new(frame as f64 * 100.0, 100.0, frame));
        }
        let settled = page.with_document(|doc| doc.number(elements.track, Property::X));
        assert_eq!(settled, -1000.0);
    }
}
