//! Serenade Core Runtime
//!
//! Foundational primitives shared by the animation, scroll and page crates:
//!
//! - **Geometry**: points, sizes and rectangles in document coordinates
//! - **Element model**: element handles, animatable properties and values
//! - **Document traits**: the layout/style boundary to the host page
//! - **Frame scheduler**: an injectable, cancellable per-frame callback queue
//!
//! # Example
//!
//! ```rust
//! use serenade_core::scheduler::FrameScheduler;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let scheduler = FrameScheduler::new();
//! let handle = scheduler.handle();
//!
//! let ran = Rc::new(Cell::new(false));
//! let flag = ran.clone();
//! handle.request_frame(move |_time| flag.set(true));
//!
//! scheduler.run_frame(16.0);
//! assert!(ran.get());
//! ```

pub mod document;
pub mod element;
pub mod error;
pub mod geometry;
pub mod scheduler;

pub use document::{Document, HeadlessDocument, LayoutSource, MediaStatus, StyleSink};
pub use element::{Color, ElementId, PinLock, Property, Value};
pub use error::{Result, SerenadeError};
pub use geometry::{Point, Rect, Size};
pub use scheduler::{FrameCallback, FrameLoop, FrameRequestId, FrameScheduler, FrameTime, SchedulerHandle};
