use abg_core::color::luma;
use abg_core::config::Effects;
use abg_core::error::{CoreError, Result};
use abg_core::frame::{FrameBuffer, GridDimensions, Sample};

/// Row-major samples, exactly `dims.cols × dims.rows` of them.
#[derive(Clone, Debug)]
pub struct SampleGrid {
    /// Grid size.
    pub dims: GridDimensions,
    /// One sample per cell, row-major.
    pub samples: Vec<Sample>,
}

impl SampleGrid {
    /// Sample of cell (col, row).
    #[inline]
    #[must_use]
    pub fn get(&self, col: u32, row: u32) -> &Sample {
        &self.samples[row as usize * self.dims.cols as usize + col as usize]
    }
}

/// Apply brightness then contrast to a luminance value.
///
/// Brightness: additive offset of `brightness / 100`. Contrast: multiply
/// around 0.5 by `1 + contrast / 100`. Each step clamps to [0.0, 1.0].
///
/// # Example
/// ```
/// use abg_source::sample::adjust_luminance;
/// assert_eq!(adjust_luminance(0.5, 0, 0), 0.5);
/// assert_eq!(adjust_luminance(0.9, 50, 0), 1.0);
/// assert!((adjust_luminance(0.75, 0, 100) - 1.0).abs() < 1e-6);
/// ```
#[inline]
#[must_use]
pub fn adjust_luminance(lum: f32, brightness: i32, contrast: i32) -> f32 {
    let lum = (lum + brightness as f32 / 100.0).clamp(0.0, 1.0);
    let factor = 1.0 + contrast as f32 / 100.0;
    ((lum - 0.5) * factor + 0.5).clamp(0.0, 1.0)
}

/// Bounds `[start, end)` of region `index` out of `parts` over `len` pixels.
///
/// Sizes differ by at most one pixel. When `parts > len` a region would be
/// empty; it then covers the single nearest pixel.
#[inline]
fn region(index: u32, parts: u32, len: u32) -> (u32, u32) {
    let start = (u64::from(index) * u64::from(len) / u64::from(parts)) as u32;
    let end = (u64::from(index + 1) * u64::from(len) / u64::from(parts)) as u32;
    let start = start.min(len.saturating_sub(1));
    (start, end.max(start + 1))
}

/// Downsample `frame` into one [`Sample`] per grid cell.
///
/// Luminance is the mean BT.601 luma of the region, then passed through
/// [`adjust_luminance`]. The mean color is never adjusted.
///
/// # Errors
/// Returns [`CoreError::InvalidDimensions`] for an empty grid or an empty
/// source image.
///
/// # Example
/// ```
/// use abg_core::config::Effects;
/// use abg_core::frame::{FrameBuffer, GridDimensions};
/// use abg_source::sample::preprocess;
///
/// let frame = FrameBuffer::filled(8, 8, (255, 255, 255));
/// let dims = GridDimensions { cols: 4, rows: 2 };
/// let grid = preprocess(&frame, &Effects::default(), dims).unwrap();
/// assert_eq!(grid.samples.len(), 8);
/// assert_eq!(grid.get(3, 1).color, (255, 255, 255));
/// ```
pub fn preprocess(frame: &FrameBuffer, effects: &Effects, dims: GridDimensions) -> Result<SampleGrid> {
    if dims.cols == 0 || dims.rows == 0 {
        return Err(CoreError::InvalidDimensions(format!(
            "grille vide {}×{}",
            dims.cols, dims.rows
        )));
    }
    if frame.width == 0 || frame.height == 0 {
        return Err(CoreError::InvalidDimensions(format!(
            "image source vide {}×{}",
            frame.width, frame.height
        )));
    }

    let x_bounds: Vec<(u32, u32)> = (0..dims.cols)
        .map(|c| region(c, dims.cols, frame.width))
        .collect();

    let mut samples = Vec::with_capacity(dims.cell_count());
    for row in 0..dims.rows {
        let (y0, y1) = region(row, dims.rows, frame.height);
        for &(x0, x1) in &x_bounds {
            let mut lum_sum = 0.0f64;
            let mut rgb_sum = [0u64; 3];
            for y in y0..y1 {
                for x in x0..x1 {
                    let (r, g, b, _) = frame.pixel(x, y);
                    lum_sum += f64::from(luma(r, g, b));
                    rgb_sum[0] += u64::from(r);
                    rgb_sum[1] += u64::from(g);
                    rgb_sum[2] += u64::from(b);
                }
            }
            let count = u64::from(x1 - x0) * u64::from(y1 - y0);
            let mean = |sum: u64| ((sum as f64 / count as f64).round()) as u8;
            let luminance = (lum_sum / count as f64) as f32;
            samples.push(Sample {
                luminance: adjust_luminance(luminance, effects.brightness, effects.contrast),
                color: (mean(rgb_sum[0]), mean(rgb_sum[1]), mean(rgb_sum[2])),
            });
        }
    }

    log::debug!(
        "Échantillonnage {}×{} px → {}×{} cellules",
        frame.width,
        frame.height,
        dims.cols,
        dims.rows
    );
    Ok(SampleGrid { dims, samples })
}
