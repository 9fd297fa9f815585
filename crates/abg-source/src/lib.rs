//! Image preprocessing for ascii-bg: decoding and per-cell sampling.

pub mod image;
pub mod sample;

pub use sample::{SampleGrid, adjust_luminance, preprocess};
