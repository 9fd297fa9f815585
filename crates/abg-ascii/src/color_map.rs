use abg_core::color::{Rgb, WHITE, hsv_to_rgb, lerp_rgb};
use abg_core::config::{ColorMode, Direction};
use abg_core::frame::{GridDimensions, Sample};

/// Per-cell color selection for one [`ColorMode`].
///
/// # Example
/// ```
/// use abg_ascii::color_map::ColorResolver;
/// use abg_core::config::ColorMode;
/// use abg_core::frame::{GridDimensions, Sample};
///
/// let resolver = ColorResolver::new(ColorMode::Source, None);
/// let dims = GridDimensions { cols: 4, rows: 4 };
/// let sample = Sample { luminance: 0.3, color: (200, 50, 50) };
/// assert_eq!(resolver.resolve(1, 2, dims, &sample), ((200, 50, 50), None));
/// ```
#[derive(Clone, Debug)]
pub struct ColorResolver {
    mode: ColorMode,
    background: Option<Rgb>,
}

impl ColorResolver {
    /// `background` is applied to every cell of non-solid modes.
    #[must_use]
    pub fn new(mode: ColorMode, background: Option<Rgb>) -> Self {
        Self { mode, background }
    }

    /// Foreground and background of cell (col, row) in a `dims` grid.
    #[must_use]
    pub fn resolve(&self, col: u32, row: u32, dims: GridDimensions, sample: &Sample) -> (Rgb, Option<Rgb>) {
        match &self.mode {
            ColorMode::BlackWhite => (WHITE, self.background),
            ColorMode::Source => (sample.color, self.background),
            ColorMode::Rainbow { direction } => {
                let hue = rainbow_hue(*direction, col, row, dims);
                (hsv_to_rgb(hue, 1.0, 1.0), self.background)
            }
            ColorMode::Gradient { stops, direction } => {
                let t = gradient_position(*direction, col, row, dims);
                (gradient_at(stops, t), self.background)
            }
            ColorMode::Solid { text, background } => (*text, Some(*background)),
        }
    }

    /// Colors for padding and border cells.
    #[must_use]
    pub fn decoration_colors(&self) -> (Rgb, Option<Rgb>) {
        match &self.mode {
            ColorMode::Solid { text, background } => (*text, Some(*background)),
            _ => (WHITE, self.background),
        }
    }
}

/// Hue in [0, 1) for a rainbow cell. Cycles once across the chosen axis.
#[must_use]
pub fn rainbow_hue(direction: Direction, col: u32, row: u32, dims: GridDimensions) -> f32 {
    let (num, den) = match direction {
        Direction::Horizontal => (col, dims.cols),
        Direction::Vertical => (row, dims.rows),
        Direction::Diagonal => (col + row, dims.cols + dims.rows),
    };
    (num as f32 / den.max(1) as f32).rem_euclid(1.0)
}

/// Position in [0, 1] of a gradient cell: first column/row is 0, last is 1.
#[must_use]
pub fn gradient_position(direction: Direction, col: u32, row: u32, dims: GridDimensions) -> f32 {
    let (num, den) = match direction {
        Direction::Horizontal => (col, dims.cols.saturating_sub(1)),
        Direction::Vertical => (row, dims.rows.saturating_sub(1)),
        Direction::Diagonal => (col + row, (dims.cols + dims.rows).saturating_sub(2)),
    };
    if den == 0 {
        0.0
    } else {
        (num as f32 / den as f32).clamp(0.0, 1.0)
    }
}

/// Piecewise-linear interpolation across `stops` at `t` ∈ [0, 1].
///
/// Exact at the stops themselves. An empty slice yields white.
///
/// # Example
/// ```
/// use abg_ascii::color_map::gradient_at;
/// let stops = [(0, 0, 0), (200, 100, 0)];
/// assert_eq!(gradient_at(&stops, 0.0), (0, 0, 0));
/// assert_eq!(gradient_at(&stops, 0.5), (100, 50, 0));
/// assert_eq!(gradient_at(&stops, 1.0), (200, 100, 0));
/// ```
#[must_use]
pub fn gradient_at(stops: &[Rgb], t: f32) -> Rgb {
    match stops {
        [] => WHITE,
        [only] => *only,
        _ => {
            let segments = (stops.len() - 1) as f32;
            let scaled = t.clamp(0.0, 1.0) * segments;
            let idx = (scaled.floor() as usize).min(stops.len() - 2);
            lerp_rgb(stops[idx], stops[idx + 1], scaled - idx as f32)
        }
    }
}
