//! Section controllers
//!
//! A section owns the timelines and triggers for one part of the page. The
//! page calls its hooks in a fixed order and hands it a [`SectionContext`]
//! with everything it may touch for the duration of the call.
//!
//! Lifecycle:
//!
//! 1. `mount` once, creating timelines and registering triggers
//! 2. `frame` every frame, after triggers have delivered progress
//! 3. `on_layout_settled` after resize or content changes, to re-measure
//! 4. `unmount` once, synchronously reverting everything `mount` created

use std::rc::Weak;

use serenade_core::{Document, FrameTime, Point, Result};
use serenade_scroll::{TriggerRegistry, VirtualScrollState};
use slotmap::new_key_type;

use crate::config::PageConfig;
use crate::page::PageShared;

new_key_type! {
    /// Handle to a mounted section
    pub struct SectionId;
}

/// Everything a section may read or write during one hook
pub struct SectionContext<'a, D: Document> {
    pub doc: &'a mut D,
    pub registry: &'a mut TriggerRegistry,
    pub config: &'a PageConfig,
    /// Scroll state after this frame's smoothing step
    pub scroll: VirtualScrollState,
    pub time: FrameTime,
    /// Latest pointer position in viewport coordinates, if any
    pub pointer: Option<Point>,
    /// True when the pointer moved since the previous frame
    pub pointer_moved: bool,
}

impl<D: Document> SectionContext<'_, D> {
    /// Milliseconds since the previous frame
    pub fn delta_ms(&self) -> f32 {
        self.time.delta_ms as f32
    }
}

/// A page section with a mount/unmount lifecycle
pub trait Section<D: Document> {
    fn name(&self) -> &str;

    /// Create timelines and register triggers
    ///
    /// On error the page unmounts the section immediately, so `unmount`
    /// must cope with a partial mount.
    fn mount(&mut self, cx: &mut SectionContext<'_, D>) -> Result<()>;

    /// Advance timelines and write output for this frame
    fn frame(&mut self, _cx: &mut SectionContext<'_, D>) {}

    /// Re-measure after layout changed
    fn on_layout_settled(&mut self, _cx: &mut SectionContext<'_, D>) {}

    /// Revert every animated property and unregister every trigger
    ///
    /// Must be safe to call more than once.
    fn unmount(&mut self, cx: &mut SectionContext<'_, D>);
}

/// Unmounts its section when dropped
///
/// Returned by [`Page::mount_scoped`](crate::Page::mount_scoped).
pub struct MountGuard<D: Document + 'static> {
    pub(crate) page: Weak<PageShared<D>>,
    pub(crate) id: SectionId,
    pub(crate) released: bool,
}

impl<D: Document + 'static> MountGuard<D> {
    pub fn id(&self) -> SectionId {
        self.id
    }

    /// Unmount now instead of on drop
    ///
    /// Returns false if the section was already gone.
    pub fn release(mut self) -> bool {
        self.unmount()
    }

    fn unmount(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.released = true;
        match self.page.upgrade() {
            Some(page) => page.unmount_or_defer(self.id),
            None => false,
        }
    }
}

impl<D: Document + 'static> Drop for MountGuard<D> {
    fn drop(&mut self) {
        self.unmount();
    }
}
