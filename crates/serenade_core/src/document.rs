//! The layout/style boundary to the host page
//!
//! The runtime never owns a render tree. It reads measured bounds through
//! [`LayoutSource`] and writes visual output through [`StyleSink`]; the host
//! (a browser binding, a native UI, or [`HeadlessDocument`] in tests)
//! implements both.

use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::element::{ElementId, PinLock, Property, Value};
use crate::geometry::{Rect, Size};

/// Read-only access to live layout
pub trait LayoutSource {
    /// Current viewport size
    fn viewport(&self) -> Size;

    /// Element bounds in document coordinates, `None` when not mounted
    fn bounds(&self, id: ElementId) -> Option<Rect>;

    /// Intrinsic content width of a scrollable track, `None` when not mounted
    fn scroll_width(&self, id: ElementId) -> Option<f32>;

    /// Height of the whole scrollable document
    fn document_height(&self) -> f32;
}

/// Write access to element styles
pub trait StyleSink {
    /// Currently applied value, `None` if the property was never set
    fn read(&self, id: ElementId, prop: Property) -> Option<Value>;

    fn write(&mut self, id: ElementId, prop: Property, value: Value);

    /// Remove an inline property so the element falls back to its stylesheet value
    fn clear(&mut self, id: ElementId, prop: Property);

    fn set_pin(&mut self, id: ElementId, lock: PinLock);

    /// Switch a media element to its fallback presentation
    fn show_fallback(&mut self, id: ElementId, reason: &str);
}

/// A host page that can be both measured and styled
pub trait Document: LayoutSource + StyleSink {}

impl<T: LayoutSource + StyleSink + ?Sized> Document for T {}

/// Load state of an image or video element
#[derive(Clone, Debug, Default, PartialEq)]
pub enum MediaStatus {
    /// Not a media element, or not reported yet
    #[default]
    Unknown,
    Loaded,
    /// Failed to load; the element shows its fallback presentation
    Failed(String),
}

#[derive(Clone, Debug, Default)]
struct ElementNode {
    name: String,
    bounds: Option<Rect>,
    scroll_width: Option<f32>,
    styles: FxHashMap<Property, Value>,
    pin: PinLock,
    media: MediaStatus,
}

/// In-memory document used to drive the runtime without a browser
///
/// Elements carry explicit bounds (set by the caller, standing in for a
/// layout pass), a style map that records everything the runtime writes,
/// and a pin lock.
#[derive(Debug, Default)]
pub struct HeadlessDocument {
    viewport: Size,
    elements: SlotMap<ElementId, ElementNode>,
    writes: u64,
}

impl HeadlessDocument {
    pub fn new(viewport: Size) -> Self {
        Self {
            viewport,
            elements: SlotMap::with_key(),
            writes: 0,
        }
    }

    /// Insert a laid-out element
    pub fn insert(&mut self, name: impl Into<String>, bounds: Rect) -> ElementId {
        self.elements.insert(ElementNode {
            name: name.into(),
            bounds: Some(bounds),
            ..Default::default()
        })
    }

    /// Insert an element that has no layout yet
    pub fn insert_unmounted(&mut self, name: impl Into<String>) -> ElementId {
        self.elements.insert(ElementNode {
            name: name.into(),
            ..Default::default()
        })
    }

    pub fn remove(&mut self, id: ElementId) -> bool {
        self.elements.remove(id).is_some()
    }

    /// Find an element by name
    pub fn find(&self, name: &str) -> Option<ElementId> {
        self.elements
            .iter()
            .find(|(_, node)| node.name == name)
            .map(|(id, _)| id)
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    pub fn set_bounds(&mut self, id: ElementId, bounds: Option<Rect>) {
        if let Some(node) = self.elements.get_mut(id) {
            node.bounds = bounds;
        }
    }

    pub fn set_scroll_width(&mut self, id: ElementId, width: f32) {
        if let Some(node) = self.elements.get_mut(id) {
            node.scroll_width = Some(width);
        }
    }

    /// Applied value of a property, if any
    pub fn style(&self, id: ElementId, prop: Property) -> Option<Value> {
        self.elements
            .get(id)
            .and_then(|node| node.styles.get(&prop).copied())
    }

    /// Applied numeric value, falling back to the property's initial value
    pub fn number(&self, id: ElementId, prop: Property) -> f32 {
        self.style(id, prop)
            .and_then(|v| v.as_number())
            .or_else(|| prop.initial().as_number())
            .unwrap_or(0.0)
    }

    /// Number of inline properties currently set on an element
    pub fn style_count(&self, id: ElementId) -> usize {
        self.elements.get(id).map_or(0, |node| node.styles.len())
    }

    pub fn pin(&self, id: ElementId) -> PinLock {
        self.elements.get(id).map(|node| node.pin).unwrap_or_default()
    }

    /// Total style writes performed, used to check for redundant output
    pub fn write_count(&self) -> u64 {
        self.writes
    }

    pub fn set_media_loaded(&mut self, id: ElementId) {
        if let Some(node) = self.elements.get_mut(id) {
            node.media = MediaStatus::Loaded;
        }
    }

    /// Record a media failure; the element switches to its fallback presentation
    pub fn set_media_failed(&mut self, id: ElementId, reason: impl Into<String>) {
        if let Some(node) = self.elements.get_mut(id) {
            let reason = reason.into();
            tracing::warn!(element = %node.name, %reason, "media failed to load, showing fallback");
            node.media = MediaStatus::Failed(reason);
        }
    }

    pub fn media_status(&self, id: ElementId) -> MediaStatus {
        self.elements
            .get(id)
            .map(|node| node.media.clone())
            .unwrap_or_default()
    }

    pub fn shows_fallback(&self, id: ElementId) -> bool {
        matches!(self.media_status(id), MediaStatus::Failed(_))
    }
}

impl LayoutSource for HeadlessDocument {
    fn viewport(&self) -> Size {
        self.viewport
    }

    fn bounds(&self, id: ElementId) -> Option<Rect> {
        self.elements.get(id).and_then(|node| node.bounds)
    }

    fn scroll_width(&self, id: ElementId) -> Option<f32> {
        let node = self.elements.get(id)?;
        node.bounds?;
        node.scroll_width
            .or_else(|| node.bounds.map(|rect| rect.width()))
    }

    /// Bottom of the lowest element
    fn document_height(&self) -> f32 {
        self.elements
            .values()
            .filter_map(|node| node.bounds)
            .map(|rect| rect.bottom())
            .fold(0.0, f32::max)
    }
}

impl StyleSink for HeadlessDocument {
    fn read(&self, id: ElementId, prop: Property) -> Option<Value> {
        self.style(id, prop)
    }

    fn write(&mut self, id: ElementId, prop: Property, value: Value) {
        match self.elements.get_mut(id) {
            Some(node) => {
                node.styles.insert(prop, value);
                self.writes += 1;
            }
            None => tracing::trace!(?id, ?prop, "dropping style write to removed element"),
        }
    }

    fn clear(&mut self, id: ElementId, prop: Property) {
        if let Some(node) = self.elements.get_mut(id) {
            node.styles.remove(&prop);
        }
    }

    fn set_pin(&mut self, id: ElementId, lock: PinLock) {
        if let Some(node) = self.elements.get_mut(id) {
            node.pin = lock;
        }
    }

    fn show_fallback(&mut self, id: ElementId, reason: &str) {
        self.set_media_failed(id, reason);
    }
}
