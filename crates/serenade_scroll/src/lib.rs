//! Serenade Scrolling
//!
//! Everything between native scroll input and animation progress.
//!
//! # Features
//!
//! - **Smooth scroll**: wheel input replayed through an eased virtual scroll position
//! - **Boundaries**: `"top 70%"`-style expressions resolved against live layout
//! - **Trigger registry**: scroll position mapped to per-region progress, with pinning
//! - **Scrub follower**: progress that catches up to the scroll over a short lag
//! - **Pin controller**: vertical scroll converted into horizontal track translation
//!
//! Data flows one way: input → [`SmoothScroll`] → [`TriggerRegistry`] → progress
//! callbacks. Nothing here reads styles back from the page.

pub mod boundary;
pub mod pin;
pub mod scrub;
pub mod smooth;
pub mod trigger;

pub use boundary::{BoundaryExpr, Edge, Extent};
pub use pin::{PinController, PinSetup, PinState};
pub use scrub::{Scrub, ScrubFollower};
pub use smooth::{ScrollAxis, ScrollDirection, SmoothScroll, SmoothScrollConfig, VirtualScrollState};
pub use trigger::{TriggerId, TriggerRegistry, TriggerSpec};
