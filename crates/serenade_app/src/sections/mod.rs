//! Section controllers for the greeting page
//!
//! Each section takes the element handles it animates and builds its
//! timelines and triggers when mounted.

pub mod floating;
pub mod gallery;
pub mod hero;
pub mod reveal;
pub mod spotlight;

pub use floating::{FloatingSection, ParticlePlan};
pub use gallery::{GalleryElements, GallerySection};
pub use hero::{HeroElements, HeroSection};
pub use reveal::{RevealLayout, RevealSection};
pub use spotlight::{SpotlightLayer, SpotlightSection};
