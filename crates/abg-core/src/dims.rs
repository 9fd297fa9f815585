use crate::error::{CoreError, Result};
use crate::frame::{GridDimensions, MAX_FRAME_CELLS};

/// Vertical correction applied to row counts. Terminal cells are roughly
/// twice as tall as they are wide.
pub const CHAR_ASPECT_CORRECTION: f32 = 0.5;

/// Resolution presets, in pixels.
pub const RESOLUTION_PRESETS: &[(&str, (u32, u32))] = &[
    ("8k", (7680, 4320)),
    ("4k", (3840, 2160)),
    ("1440p", (2560, 1440)),
    ("1080p", (1920, 1080)),
    ("720p", (1280, 720)),
    ("480p", (854, 480)),
];

/// Parse a preset name (`4k`, `1080p`, ...) or `WIDTHxHEIGHT`.
///
/// # Errors
/// Returns [`CoreError::InvalidDimensions`] on malformed or non-positive input.
///
/// # Example
/// ```
/// use abg_core::dims::parse_resolution;
/// assert_eq!(parse_resolution("4K").unwrap(), (3840, 2160));
/// assert_eq!(parse_resolution("120x40").unwrap(), (120, 40));
/// assert!(parse_resolution("120x0").is_err());
/// ```
pub fn parse_resolution(input: &str) -> Result<(u32, u32)> {
    let lower = input.trim().to_ascii_lowercase();
    if let Some(&(_, dims)) = RESOLUTION_PRESETS.iter().find(|(name, _)| *name == lower) {
        return Ok(dims);
    }

    let malformed = || {
        CoreError::InvalidDimensions(format!(
            "'{input}' : utilisez un preset (8k, 4k, 1440p, 1080p, 720p, 480p) ou LARGEURxHAUTEUR"
        ))
    };
    let (w, h) = lower.split_once('x').ok_or_else(malformed)?;
    let w: u32 = w.trim().parse().map_err(|_| malformed())?;
    let h: u32 = h.trim().parse().map_err(|_| malformed())?;
    if w == 0 || h == 0 {
        return Err(CoreError::InvalidDimensions(format!(
            "'{input}' : largeur et hauteur doivent être positives"
        )));
    }
    Ok((w, h))
}

/// The single sizing rule that wins the precedence chain
/// (resolution > output resolution > scale > source).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DimsSpec {
    /// Explicit character grid.
    Characters {
        /// Columns.
        cols: u32,
        /// Rows, before aspect correction.
        rows: u32,
    },
    /// Pixel target of the rendered image; divided by the font cell size.
    OutputPixels {
        /// Target width in pixels.
        width: u32,
        /// Target height in pixels.
        height: u32,
    },
    /// Fraction of the source pixel size, in (0, 1].
    Scale(f32),
    /// One cell per source pixel.
    Source,
}

/// Everything besides the [`DimsSpec`] needed to turn it into a grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellLayout {
    /// Font size in pixels; one cell is `font_size` wide before aspect correction.
    pub font_size: u32,
    /// Row multiplier, `None` when aspect correction is disabled.
    pub aspect: Option<f32>,
    /// Cells taken by padding + border on each side.
    pub decoration: u32,
}

impl DimsSpec {
    /// Resolve to the content grid for a source of `source_w × source_h` pixels.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidDimensions`] if the grid ends up with zero
    /// rows or columns, or if the decorated frame would be too large.
    ///
    /// # Example
    /// ```
    /// use abg_core::dims::{CellLayout, DimsSpec};
    /// let layout = CellLayout { font_size: 10, aspect: None, decoration: 0 };
    /// let spec = DimsSpec::OutputPixels { width: 3840, height: 2160 };
    /// let grid = spec.resolve(640, 480, layout).unwrap();
    /// assert_eq!((grid.cols, grid.rows), (384, 216));
    /// ```
    pub fn resolve(self, source_w: u32, source_h: u32, layout: CellLayout) -> Result<GridDimensions> {
        let (cols, rows) = match self {
            Self::Characters { cols, rows } => (cols, rows),
            Self::OutputPixels { width, height } => {
                let font = layout.font_size.max(1);
                (width / font, height / font)
            }
            Self::Scale(s) => (
                (source_w as f32 * s).round() as u32,
                (source_h as f32 * s).round() as u32,
            ),
            Self::Source => (source_w, source_h),
        };

        let rows = match layout.aspect {
            Some(factor) => (rows as f32 * factor).floor() as u32,
            None => rows,
        };

        // Pixel targets are fixed: decoration has to fit inside them.
        let (cols, rows) = if matches!(self, Self::OutputPixels { .. }) {
            let margin = 2 * layout.decoration;
            (cols.saturating_sub(margin), rows.saturating_sub(margin))
        } else {
            (cols, rows)
        };

        if cols == 0 || rows == 0 {
            return Err(CoreError::InvalidDimensions(format!(
                "la grille résolue est vide ({cols}×{rows}) pour une source {source_w}×{source_h} ({self:?})"
            )));
        }
        let grid = GridDimensions { cols, rows };
        if grid.decorated(layout.decoration).is_none() {
            return Err(CoreError::InvalidDimensions(format!(
                "grille {cols}×{rows} trop grande (décoration {} par côté, max {MAX_FRAME_CELLS} cellules)",
                layout.decoration
            )));
        }
        log::debug!("Grille résolue : {cols}×{rows} ({self:?})");
        Ok(grid)
    }
}
