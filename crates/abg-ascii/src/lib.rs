//! ASCII conversion engine for ascii-bg.
//!
//! Turns sampled pixel regions into colored character cells.

pub mod color_map;
pub mod compositor;
pub mod luminance;

pub use color_map::ColorResolver;
pub use compositor::{Compositor, convert};
