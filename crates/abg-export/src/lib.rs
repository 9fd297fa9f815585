//! Renderers for ascii-bg frames: ANSI terminal text, JSON documents and
//! raster images.

pub mod ansi;
pub mod font;
pub mod json;
pub mod output;
pub mod rasterizer;

pub use ansi::{to_ansi_string, write_ansi};
pub use json::{from_json, to_json};
pub use output::{ImageOptions, OutputFormat, write_output};
pub use rasterizer::{CellGeometry, Rasterizer};
