//! Serenade Page Runtime
//!
//! Ties the scrolling and animation crates together into a page: one
//! smooth-scroll emulator, one trigger registry and a set of mounted
//! sections, advanced together once per frame.
//!
//! # Example
//!
//! ```ignore
//! use serenade_app::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let config = PageConfig::from_toml_str(include_str!("page.toml"))?;
//!     let scheduler = FrameScheduler::new();
//!
//!     let mut doc = HeadlessDocument::new(Size::new(1280.0, 800.0));
//!     let section = doc.insert("gallery", Rect::new(0.0, 800.0, 1280.0, 800.0));
//!     let track = doc.insert("track", Rect::new(0.0, 800.0, 1280.0, 800.0));
//!     doc.set_scroll_width(track, 4200.0);
//!
//!     let mut page = Page::new(doc, config);
//!     let _gallery = page.mount_scoped(GallerySection::new(GalleryElements { section, track }))?;
//!     page.start(&scheduler.handle());
//!
//!     page.wheel(Point::new(0.0, 120.0));
//!     scheduler.run_frame(16.0);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod page;
pub mod section;
pub mod sections;


pub use config::{
    FloatingConfig, GalleryConfig, HeroConfig, PageConfig, RevealConfig, SpotlightConfig,
};
pub use page::Page;
pub use section::{MountGuard, Section, SectionContext, SectionId};

pub use serenade_core::{Result, SerenadeError};

/// Prelude module - import everything commonly needed
pub mod prelude {
    pub use crate::config::PageConfig;
    pub use crate::page::Page;
    pub use crate::section::{MountGuard, Section, SectionContext, SectionId};
    pub use crate::sections::*;

    // Core types
    pub use serenade_core::{
        Color, Document, ElementId, FrameScheduler, FrameTime, HeadlessDocument, Point, Property,
        Rect, Result, SchedulerHandle, SerenadeError, Size,
    };

    // Animation and scrolling
    pub use serenade_animation::{Easing, Playback, PropertySet, Span, Timeline};
    pub use serenade_scroll::{BoundaryExpr, SmoothScrollConfig, TriggerSpec};
}
