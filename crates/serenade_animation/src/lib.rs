//! Serenade Animation System
//!
//! Easing functions, property interpolation and timeline orchestration.
//!
//! # Features
//!
//! - **Easing**: the power/sine family plus the exponential curve used for smooth scrolling
//! - **Timelines**: explicit segment lists with sequential, simultaneous and offset placement
//! - **Two lifecycles**: autonomous (clock-driven, repeat + yoyo) or scrubbed (pure function of progress)
//! - **Scopes**: every value written is snapshotted so a section can revert cleanly on unmount

pub mod easing;
pub mod scope;
pub mod timeline;
pub mod values;

pub use easing::Easing;
pub use scope::{AnimationScope, TimelineId};
pub use timeline::{Playback, Position, Repeat, Sample, Segment, Span, Timeline, TimelineMode};
pub use values::{Interpolate, PropertySet};
