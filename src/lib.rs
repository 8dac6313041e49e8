//! The gesture-to-motion core of an etch-a-sketch toy.
//!
//! Two rotary knobs step a cursor horizontally and vertically, leaving a trail of segments behind
//! it. Shaking the board fades the trail. Everything that touches a screen is reached through
//! [`layout::LayoutProvider`] and [`render::RenderPort`], so the core runs headless.

pub(crate) mod util;

pub mod clock;
pub mod config;
pub mod engine;
pub mod geom;
pub mod gesture;
pub mod layout;
pub mod render;

mod sketch;
pub use sketch::*;
