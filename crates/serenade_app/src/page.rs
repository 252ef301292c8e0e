//! Page controller
//!
//! The page owns the document, the smooth-scroll emulator, the trigger
//! registry and every mounted section. Each frame runs the same pipeline:
//!
//! ```text
//! scroll input → smooth → resolve triggers → section timelines → style output
//! ```
//!
//! The page can be driven by an injected scheduler ([`Page::start`]) or by
//! hand ([`Page::frame`]). Nothing here is global; two pages never share
//! state.

use std::cell::RefCell;
use std::rc::Rc;

use serenade_core::{
    Document, ElementId, FrameLoop, FrameTime, Point, Result, SchedulerHandle, SerenadeError,
    Size,
};
use serenade_scroll::{SmoothScroll, TriggerRegistry, VirtualScrollState};
use slotmap::SlotMap;

use crate::config::PageConfig;
use crate::section::{MountGuard, Section, SectionContext, SectionId};

type BoxedSection<D> = Box<dyn Section<D>>;

pub(crate) struct PageState<D: Document> {
    doc: D,
    config: PageConfig,
    scroll: SmoothScroll,
    registry: TriggerRegistry,
    sections: SlotMap<SectionId, BoxedSection<D>>,
    /// Mount order; sections run their hooks in this order
    order: Vec<SectionId>,
    scroll_state: VirtualScrollState,
    time: FrameTime,
    viewport: Size,
    pointer: Option<Point>,
    pointer_moved: bool,
}

impl<D: Document> PageState<D> {
    fn new(doc: D, config: PageConfig) -> Self {
        let viewport = doc.viewport();
        let mut scroll = SmoothScroll::new(config.smooth_scroll);
        scroll.set_limit(doc.document_height() - viewport.height);
        Self {
            doc,
            config,
            scroll,
            registry: TriggerRegistry::new(),
            sections: SlotMap::with_key(),
            order: Vec::new(),
            scroll_state: VirtualScrollState::default(),
            time: FrameTime::default(),
            viewport,
            pointer: None,
            pointer_moved: false,
        }
    }

    /// Borrow the section list and a context over everything else
    fn split(
        &mut self,
    ) -> (
        &mut SlotMap<SectionId, BoxedSection<D>>,
        &[SectionId],
        SectionContext<'_, D>,
    ) {
        let cx = SectionContext {
            doc: &mut self.doc,
            registry: &mut self.registry,
            config: &self.config,
            scroll: self.scroll_state,
            time: self.time,
            pointer: self.pointer,
            pointer_moved: self.pointer_moved,
        };
        (&mut self.sections, self.order.as_slice(), cx)
    }

    fn frame(&mut self, time: FrameTime) {
        self.time = time;

        // smooth, then resolve triggers against the new position
        self.scroll_state = self.scroll.tick(time);
        self.registry
            .update(self.scroll_state.smoothed_position, &mut self.doc);

        // timelines and output
        let (sections, order, mut cx) = self.split();
        for id in order {
            if let Some(section) = sections.get_mut(*id) {
                section.frame(&mut cx);
            }
        }
        self.pointer_moved = false;
    }

    fn mount(&mut self, mut section: BoxedSection<D>) -> Result<SectionId> {
        let (sections, _, mut cx) = self.split();
        if let Err(err) = section.mount(&mut cx) {
            tracing::warn!(section = section.name(), %err, "section failed to mount, left static");
            section.unmount(&mut cx);
            return Err(err);
        }
        let name = section.name().to_string();
        let id = sections.insert(section);
        self.order.push(id);
        tracing::debug!(section = %name, id = ?id, "section mounted");
        Ok(id)
    }

    fn unmount(&mut self, id: SectionId) -> bool {
        let (sections, _, mut cx) = self.split();
        let Some(mut section) = sections.remove(id) else {
            return false;
        };
        section.unmount(&mut cx);
        self.order.retain(|other| *other != id);
        tracing::debug!(section = section.name(), id = ?id, "section unmounted");
        true
    }

    fn unmount_all(&mut self) {
        for id in std::mem::take(&mut self.order).into_iter().rev() {
            let (sections, _, mut cx) = self.split();
            if let Some(mut section) = sections.remove(id) {
                section.unmount(&mut cx);
            }
        }
    }

    /// Re-measure everything derived from layout
    fn relayout(&mut self) {
        self.viewport = self.doc.viewport();
        self.scroll
            .set_limit(self.doc.document_height() - self.viewport.height);
        self.registry.invalidate(&self.doc);

        let (sections, order, mut cx) = self.split();
        for id in order {
            if let Some(section) = sections.get_mut(*id) {
                section.on_layout_settled(&mut cx);
            }
        }
    }
}

/// State shared between the page, its frame loop and mount guards
pub(crate) struct PageShared<D: Document> {
    state: RefCell<PageState<D>>,
    /// Unmounts requested while the state was borrowed
    deferred: RefCell<Vec<SectionId>>,
}

impl<D: Document> PageShared<D> {
    pub(crate) fn unmount_or_defer(&self, id: SectionId) -> bool {
        let unmounted = match self.state.try_borrow_mut() {
            Ok(mut state) => state.unmount(id),
            Err(_) => {
                tracing::debug!(id = ?id, "page busy, deferring unmount");
                self.deferred.borrow_mut().push(id);
                return true;
            }
        };
        // Guards dropped by the section's own teardown
        self.flush_deferred();
        unmounted
    }

    fn mount(&self, section: BoxedSection<D>) -> Result<SectionId> {
        let mounted = self.state.borrow_mut().mount(section);
        self.flush_deferred();
        mounted
    }

    fn frame(&self, time: FrameTime) {
        match self.state.try_borrow_mut() {
            Ok(mut state) => state.frame(time),
            Err(_) => {
                tracing::warn!(frame = time.frame, "page re-entered during a frame, skipping")
            }
        }
        self.flush_deferred();
    }

    /// Unmount everything queued while the state was borrowed
    ///
    /// Unmounting can drop further guards, so this runs until the queue
    /// stays empty.
    fn flush_deferred(&self) {
        loop {
            let pending = std::mem::take(&mut *self.deferred.borrow_mut());
            if pending.is_empty() {
                return;
            }
            let Ok(mut state) = self.state.try_borrow_mut() else {
                self.deferred.borrow_mut().extend(pending);
                return;
            };
            for id in pending {
                state.unmount(id);
            }
        }
    }
}

/// A scroll-animated page
pub struct Page<D: Document + 'static> {
    shared: Rc<PageShared<D>>,
    frame_loop: Option<FrameLoop>,
}

impl<D: Document + 'static> Page<D> {
    pub fn new(doc: D, config: PageConfig) -> Self {
        Self {
            shared: Rc::new(PageShared {
                state: RefCell::new(PageState::new(doc, config)),
                deferred: RefCell::new(Vec::new()),
            }),
            frame_loop: None,
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Run the frame pipeline on every frame of `handle`'s scheduler
    pub fn start(&mut self, handle: &SchedulerHandle) {
        let weak = Rc::downgrade(&self.shared);
        self.frame_loop = Some(FrameLoop::start(handle, move |time| {
            if let Some(shared) = weak.upgrade() {
                shared.frame(time);
            }
        }));
        tracing::debug!("page started");
    }

    /// Stop the frame loop and cancel its pending frame
    ///
    /// Returns false if the page was not running.
    pub fn stop(&mut self) -> bool {
        match self.frame_loop.take() {
            Some(frame_loop) => {
                frame_loop.stop();
                tracing::debug!("page stopped");
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.frame_loop.as_ref().is_some_and(FrameLoop::is_running)
    }

    /// Run one frame of the pipeline by hand
    pub fn frame(&self, time: FrameTime) {
        self.shared.frame(time);
    }

    // ========================================================================
    // Sections
    // ========================================================================

    /// Mount a section
    ///
    /// A section that fails to mount is unmounted again and the error is
    /// returned; the rest of the page keeps running.
    pub fn mount<S>(&self, section: S) -> Result<SectionId>
    where
        S: Section<D> + 'static,
    {
        self.shared.mount(Box::new(section))
    }

    /// Mount a section that unmounts when the returned guard is dropped
    pub fn mount_scoped<S>(&self, section: S) -> Result<MountGuard<D>>
    where
        S: Section<D> + 'static,
    {
        let id = self.mount(section)?;
        Ok(MountGuard {
            page: Rc::downgrade(&self.shared),
            id,
            released: false,
        })
    }

    /// Unmount a section, reverting its animations and triggers
    ///
    /// Returns false if the section is not mounted.
    pub fn unmount(&self, id: SectionId) -> bool {
        self.shared.unmount_or_defer(id)
    }

    pub fn section_count(&self) -> usize {
        self.shared.state.borrow().sections.len()
    }

    pub fn is_mounted(&self, id: SectionId) -> bool {
        self.shared.state.borrow().sections.contains_key(id)
    }

    pub fn trigger_count(&self) -> usize {
        self.shared.state.borrow().registry.len()
    }

    // ========================================================================
    // Input
    // ========================================================================

    pub fn wheel(&self, delta: Point) {
        self.shared.state.borrow_mut().scroll.wheel(delta);
    }

    pub fn touch(&self, delta: f32) {
        self.shared.state.borrow_mut().scroll.touch(delta);
    }

    pub fn native_scroll(&self, position: f32) {
        self.shared.state.borrow_mut().scroll.native_scroll(position);
    }

    /// React to a viewport resize
    ///
    /// The document is the source of truth for the viewport: the host must
    /// apply the new size to it (see [`Page::with_document_mut`]) before
    /// calling this. A `viewport` that disagrees with the document is logged
    /// and the document's size wins. Repeated events with an unchanged size
    /// are ignored.
    pub fn resize(&self, viewport: Size) {
        let mut state = self.shared.state.borrow_mut();
        let measured = state.doc.viewport();
        if measured != viewport {
            tracing::warn!(
                reported_width = viewport.width,
                reported_height = viewport.height,
                width = measured.width,
                height = measured.height,
                "resize does not match the document viewport"
            );
        }
        if measured == state.viewport {
            return;
        }
        tracing::debug!(width = measured.width, height = measured.height, "viewport resized");
        state.relayout();
    }

    /// React to content changing size (fonts, lazy images)
    pub fn layout_settled(&self) {
        tracing::debug!("layout settled");
        self.shared.state.borrow_mut().relayout();
    }

    pub fn pointer_move(&self, position: Point) {
        let mut state = self.shared.state.borrow_mut();
        if state.pointer != Some(position) {
            state.pointer = Some(position);
            state.pointer_moved = true;
        }
    }

    /// Switch a failed image or video to its fallback presentation
    pub fn media_failed(&self, element: ElementId, reason: impl Into<String>) {
        let reason = reason.into();
        let mut state = self.shared.state.borrow_mut();
        state.doc.show_fallback(element, &reason);
        let err = SerenadeError::MediaLoad { element, reason };
        tracing::debug!(%err, "media fallback shown");
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    pub fn scroll_state(&self) -> VirtualScrollState {
        self.shared.state.borrow().scroll_state
    }

    pub fn config(&self) -> PageConfig {
        self.shared.state.borrow().config.clone()
    }

    pub fn with_document<R>(&self, f: impl FnOnce(&D) -> R) -> R {
        f(&self.shared.state.borrow().doc)
    }

    /// Mutate the document, e.g. to apply a host layout pass
    ///
    /// Call [`Page::layout_settled`] afterwards if bounds changed.
    pub fn with_document_mut<R>(&self, f: impl FnOnce(&mut D) -> R) -> R {
        f(&mut self.shared.state.borrow_mut().doc)
    }
}

impl<D: Document + 'static> Drop for Page<D> {
    fn drop(&mut self) {
        self.stop();
        if let Ok(mut state) = self.shared.state.try_borrow_mut() {
            state.unmount_all();
        }
        self.shared.flush_deferred();
    }
}
