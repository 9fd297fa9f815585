//! Configuration, types, and shared structures for ascii-bg.
//!
//! This crate contains the density table, color helpers, grid and frame
//! types, dimension resolution, configuration and error taxonomy shared
//! across the workspace.

pub mod charset;
pub mod color;
pub mod config;
pub mod dims;
pub mod error;
pub mod frame;

pub use charset::{Charset, CharsetPreset};
pub use config::{ColorMode, ConvertConfig, ResolvedConfig};
pub use error::{CoreError, Result};
pub use frame::{AsciiCell, AsciiFrame, FrameBuffer, GridDimensions, Sample};
