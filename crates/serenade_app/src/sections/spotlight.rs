//! Pointer-tracked spotlight
//!
//! Two radial gradients follow the pointer: a wide, dim red one and a tight
//! gold one. The host draws the gradients; this section only moves their
//! centres.

use serenade_animation::AnimationScope;
use serenade_core::{Color, Document, ElementId, Point, Property, Result, Value};

use crate::section::{Section, SectionContext};

/// One gradient overlay
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpotlightLayer {
    pub element: ElementId,
    pub radius: f32,
    pub color: Color,
}

pub struct SpotlightSection {
    outer: ElementId,
    inner: ElementId,
    layers: Vec<SpotlightLayer>,
    scope: AnimationScope,
}

impl SpotlightSection {
    pub fn new(outer: ElementId, inner: ElementId) -> Self {
        Self {
            outer,
            inner,
            layers: Vec::new(),
            scope: AnimationScope::new("spotlight"),
        }
    }

    /// Gradients to draw, available once mounted
    pub fn layers(&self) -> &[SpotlightLayer] {
        &self.layers
    }

    fn move_to<D: Document>(&mut self, position: Point, doc: &mut D) {
        for element in [self.outer, self.inner] {
            self.scope
                .set(element, Property::SpotlightX, Value::Number(position.x), doc);
            self.scope
                .set(element, Property::SpotlightY, Value::Number(position.y), doc);
        }
    }
}

impl<D: Document> Section<D> for SpotlightSection {
    fn name(&self) -> &str {
        "spotlight"
    }

    fn mount(&mut self, cx: &mut SectionContext<'_, D>) -> Result<()> {
        let config = cx.config.spotlight;
        self.layers = vec![
            SpotlightLayer {
                element: self.outer,
                radius: config.outer_radius,
                color: Color::rgba(100.0 / 255.0, 20.0 / 255.0, 20.0 / 255.0, 0.08),
            },
            SpotlightLayer {
                element: self.inner,
                radius: config.inner_radius,
                color: Color::rgba(212.0 / 255.0, 175.0 / 255.0, 55.0 / 255.0, 0.1),
            },
        ];
        self.move_to(cx.pointer.unwrap_or(Point::ZERO), &mut *cx.doc);
        Ok(())
    }

    fn frame(&mut self, cx: &mut SectionContext<'_, D>) {
        if !cx.pointer_moved {
            return;
        }
        if let Some(position) = cx.pointer {
            self.move_to(position, &mut *cx.doc);
        }
    }

    fn unmount(&mut self, cx: &mut SectionContext<'_, D>) {
        self.scope.revert(&mut *cx.doc);
        self.layers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageConfig;
    use crate::page::Page;
    use serenade_core::{FrameTime, HeadlessDocument, Rect, Size};

    #[test]
    fn test_gradients_follow_pointer() {
        let mut doc = HeadlessDocument::new(Size::new(1280.0, 800.0));
        let outer = doc.insert("spotlight-outer", Rect::new(0.0, 0.0, 1280.0, 800.0));
        let inner = doc.insert("spotlight-inner", Rect::new(0.0, 0.0, 1280.0, 800.0));
        let page = Page::new(doc, PageConfig::default());
        let id = page.mount(SpotlightSection::new(outer, inner)).unwrap();

        page.with_document(|doc| assert_eq!(doc.number(outer, Property::SpotlightX), 0.0));

        page.pointer_move(Point::new(320.0, 240.0));
        page.frame(FrameTime::new(16.0, 16.0, 1));
        page.with_document(|doc| {
            for element in [outer, inner] {
                assert_eq!(doc.number(element, Property::SpotlightX), 320.0);
                assert_eq!(doc.number(element, Property::SpotlightY), 240.0);
            }
        });

        // No movement, no writes
        let writes = page.with_document(HeadlessDocument::write_count);
        page.frame(FrameTime::new(32.0, 16.0, 2));
        assert_eq!(page.with_document(HeadlessDocument::write_count), writes);

        page.unmount(id);
        page.with_document(|doc| assert_eq!(doc.style(outer, Property::SpotlightX), None));
    }
}
