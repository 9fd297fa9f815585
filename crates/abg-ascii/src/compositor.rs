use abg_core::charset::Charset;
use abg_core::config::{ConvertConfig, Decoration, Effects, ResolvedConfig};
use abg_core::dims::{CellLayout, DimsSpec};
use abg_core::error::Result;
use abg_core::frame::{AsciiCell, AsciiFrame, FrameBuffer, GridDimensions};
use abg_source::sample::{SampleGrid, preprocess};

use crate::color_map::ColorResolver;
use crate::luminance::glyph_for_luminance;

/// Compositor orchestre la conversion pixel→ASCII : dimensions, échantillonnage,
/// choix du glyphe, couleur, puis décoration.
///
/// Built from an already validated [`ResolvedConfig`], so it cannot fail on
/// configuration; only the source image can still be rejected.
///
/// # Example
/// ```
/// use abg_ascii::compositor::Compositor;
/// use abg_core::config::ConvertConfig;
/// use abg_core::frame::FrameBuffer;
///
/// let config = ConvertConfig { resolution: Some("8x4".into()), ..Default::default() }
///     .resolve()
///     .unwrap();
/// let compositor = Compositor::new(&config);
/// let frame = compositor.convert(&FrameBuffer::filled(16, 16, (0, 0, 0))).unwrap();
/// assert_eq!((frame.width, frame.height), (8, 2));
/// ```
#[derive(Clone, Debug)]
pub struct Compositor {
    charset: Charset,
    resolver: ColorResolver,
    effects: Effects,
    decoration: Decoration,
    dims: DimsSpec,
    layout: CellLayout,
}

impl Compositor {
    /// Prepare the density ramp (inverted if requested) and the color resolver.
    #[must_use]
    pub fn new(config: &ResolvedConfig) -> Self {
        let charset = if config.effects.invert {
            config.charset.inverted()
        } else {
            config.charset.clone()
        };
        Self {
            charset,
            resolver: ColorResolver::new(config.color.clone(), config.background),
            effects: config.effects,
            decoration: config.decoration,
            dims: config.dims,
            layout: config.cell_layout(),
        }
    }

    /// Content grid for a source image. Resolved once per conversion.
    ///
    /// # Errors
    /// Returns `InvalidDimensions` if the grid is empty.
    pub fn grid_for(&self, image: &FrameBuffer) -> Result<GridDimensions> {
        self.dims.resolve(image.width, image.height, self.layout)
    }

    /// Convert a decoded image into a finished frame.
    ///
    /// # Errors
    /// Propagates dimension and sampling errors unchanged.
    pub fn convert(&self, image: &FrameBuffer) -> Result<AsciiFrame> {
        let grid = self.grid_for(image)?;
        let samples = preprocess(image, &self.effects, grid)?;
        let frame = self.compose(&samples);
        log::info!(
            "Conversion terminée : {}×{} caractères ({}×{} de contenu)",
            frame.width,
            frame.height,
            grid.cols,
            grid.rows
        );
        Ok(frame)
    }

    /// Turn samples into cells and wrap them in padding and border.
    #[must_use]
    pub fn compose(&self, samples: &SampleGrid) -> AsciiFrame {
        let dims = samples.dims;
        let border = self.decoration.border_width();
        let mut frame = AsciiFrame::new(dims, self.decoration.padding, border);

        let (deco_fg, deco_bg) = self.resolver.decoration_colors();
        let blank = AsciiCell {
            ch: ' ',
            fg: deco_fg,
            bg: deco_bg,
        };
        frame.cells.fill(blank);

        if border > 0 {
            let ring = AsciiCell {
                ch: self.decoration.border_char,
                ..blank
            };
            let (w, h) = (frame.width, frame.height);
            for x in 0..w {
                frame.set(x, 0, ring);
                frame.set(x, h - 1, ring);
            }
            for y in 0..h {
                frame.set(0, y, ring);
                frame.set(w - 1, y, ring);
            }
        }

        let offset = frame.content_offset();
        for row in 0..dims.rows {
            for col in 0..dims.cols {
                let sample = samples.get(col, row);
                let (fg, bg) = self.resolver.resolve(col, row, dims, sample);
                frame.set(
                    offset + col,
                    offset + row,
                    AsciiCell {
                        ch: glyph_for_luminance(&self.charset, sample.luminance),
                        fg,
                        bg,
                    },
                );
            }
        }
        frame
    }
}

/// Validate `config`, then convert `image`.
///
/// Configuration errors surface before any pixel is read.
///
/// # Errors
/// `Config` / `InvalidDimensions` from validation, then any preprocessing error.
pub fn convert(image: &FrameBuffer, config: &ConvertConfig) -> Result<AsciiFrame> {
    let resolved = config.resolve()?;
    Compositor::new(&resolved).convert(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use abg_core::config::{BorderMode, ColorModeKind};
    use abg_core::error::CoreError;

    fn checker(width: u32, height: u32) -> FrameBuffer {
        let mut fb = FrameBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let v = if (x + y) % 2 == 0 { 255 } else { 0 };
                fb.put_pixel(x, y, (v, (x * 7 % 256) as u8, (y * 13 % 256) as u8));
            }
        }
        fb
    }

    #[test]
    fn custom_charset_black_and_white_extremes() {
        let config = ConvertConfig {
            custom_charset: Some(" .!@#".into()),
            resolution: Some("6x6".into()),
            ..Default::default()
        };
        let black = convert(&FrameBuffer::filled(12, 12, (0, 0, 0)), &config).unwrap();
        assert!(black.cells.iter().all(|c| c.ch == '#'));
        let white = convert(&FrameBuffer::filled(12, 12, (255, 255, 255)), &config).unwrap();
        assert!(white.cells.iter().all(|c| c.ch == ' '));
    }

    #[test]
    fn invert_swaps_extremes() {
        let config = ConvertConfig {
            custom_charset: Some(" .!@#".into()),
            resolution: Some("4x4".into()),
            invert: true,
            ..Default::default()
        };
        let black = convert(&FrameBuffer::filled(8, 8, (0, 0, 0)), &config).unwrap();
        assert!(black.cells.iter().all(|c| c.ch == ' '));
        let white = convert(&FrameBuffer::filled(8, 8, (255, 255, 255)), &config).unwrap();
        assert!(white.cells.iter().all(|c| c.ch == '#'));
    }

    #[test]
    fn padding_and_border_size() {
        let config = ConvertConfig {
            resolution: Some("10x5".into()),
            aspect_correct: false,
            padding: 2,
            border: BorderMode::Simple,
            ..Default::default()
        };
        let frame = convert(&checker(40, 20), &config).unwrap();
        assert_eq!((frame.width, frame.height), (16, 11));
        assert_eq!(frame.content, GridDimensions { cols: 10, rows: 5 });

        for x in 0..frame.width {
            assert_eq!(frame.get(x, 0).ch, '#');
            assert_eq!(frame.get(x, 10).ch, '#');
        }
        for y in 0..frame.height {
            assert_eq!(frame.get(0, y).ch, '#');
            assert_eq!(frame.get(15, y).ch, '#');
        }
        // Padding ring is blank.
        for x in 1..15 {
            assert_eq!(frame.get(x, 1).ch, ' ');
            assert_eq!(frame.get(x, 2).ch, ' ');
        }
        assert_eq!(frame.get(1, 5).ch, ' ');
        assert_eq!(frame.get(2, 5).ch, ' ');
    }

    #[test]
    fn custom_border_char_without_padding() {
        let config = ConvertConfig {
            resolution: Some("3x3".into()),
            aspect_correct: false,
            border: BorderMode::Simple,
            border_char: '*',
            custom_charset: Some("ab".into()),
            ..Default::default()
        };
        let frame = convert(&FrameBuffer::filled(3, 3, (0, 0, 0)), &config).unwrap();
        assert_eq!(frame.to_plain_text(), "*****\n*bbb*\n*bbb*\n*bbb*\n*****");
    }

    #[test]
    fn solid_mode_uniform_colors() {
        let config = ConvertConfig {
            resolution: Some("20x10".into()),
            color_mode: ColorModeKind::Solid,
            text_color: "#00ff00".into(),
            bg_color: "#101010".into(),
            border: BorderMode::Simple,
            padding: 1,
            ..Default::default()
        };
        let frame = convert(&checker(50, 30), &config).unwrap();
        assert!(
            frame
                .cells
                .iter()
                .all(|c| c.fg == (0, 255, 0) && c.bg == Some((16, 16, 16)))
        );
    }

    #[test]
    fn source_mode_keeps_region_colors() {
        let mut fb = FrameBuffer::new(4, 2);
        for y in 0..2 {
            for x in 0..4 {
                let color = if x < 2 { (200, 10, 10) } else { (10, 10, 200) };
                fb.put_pixel(x, y, color);
            }
        }
        let config = ConvertConfig {
            resolution: Some("2x1".into()),
            aspect_correct: false,
            color_mode: ColorModeKind::Source,
            brightness: 80,
            ..Default::default()
        };
        let frame = convert(&fb, &config).unwrap();
        assert_eq!(frame.get(0, 0).fg, (200, 10, 10));
        assert_eq!(frame.get(1, 0).fg, (10, 10, 200));
        assert_eq!(frame.get(0, 0).bg, None);
    }

    #[test]
    fn aspect_correction_halves_rows() {
        let config = ConvertConfig {
            resolution: Some("40x20".into()),
            ..Default::default()
        };
        let frame = convert(&checker(80, 80), &config).unwrap();
        assert_eq!(frame.content, GridDimensions { cols: 40, rows: 10 });

        let config = ConvertConfig {
            resolution: Some("40x20".into()),
            aspect_factor: 0.25,
            ..Default::default()
        };
        let frame = convert(&checker(80, 80), &config).unwrap();
        assert_eq!(frame.content, GridDimensions { cols: 40, rows: 5 });
    }

    #[test]
    fn default_dims_follow_source() {
        let frame = convert(&checker(30, 20), &ConvertConfig::default()).unwrap();
        assert_eq!(frame.content, GridDimensions { cols: 30, rows: 10 });
    }

    #[test]
    fn output_resolution_fits_decoration() {
        let config = ConvertConfig {
            output_resolution: Some("400x200".into()),
            font_size: 10,
            padding: 1,
            border: BorderMode::Simple,
            ..Default::default()
        };
        let frame = convert(&checker(64, 64), &config).unwrap();
        assert_eq!((frame.width, frame.height), (40, 10));
        assert_eq!(frame.content, GridDimensions { cols: 36, rows: 6 });
    }

    #[test]
    fn config_errors_fail_before_pixels() {
        let config = ConvertConfig {
            color_mode: ColorModeKind::Gradient,
            gradient: vec!["red".into()],
            ..Default::default()
        };
        // Image vide : l'erreur de config doit sortir en premier.
        let err = convert(&FrameBuffer::new(0, 0), &config).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn degenerate_grid_is_dimension_error() {
        let err = convert(&FrameBuffer::filled(10, 1, (9, 9, 9)), &ConvertConfig::default()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDimensions(_)));
    }

    #[test]
    fn oversized_resolution_is_dimension_error() {
        let config = ConvertConfig {
            resolution: Some("4294967295x2".into()),
            border: BorderMode::Simple,
            ..Default::default()
        };
        let err = convert(&FrameBuffer::filled(4, 4, (9, 9, 9)), &config).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDimensions(_)));
    }

    #[test]
    fn gradient_frame_spans_stops() {
        let config = ConvertConfig {
            resolution: Some("10x4".into()),
            aspect_correct: false,
            color_mode: ColorModeKind::Gradient,
            gradient: vec!["black".into(), "white".into()],
            ..Default::default()
        };
        let frame = convert(&checker(20, 8), &config).unwrap();
        for y in 0..4 {
            assert_eq!(frame.get(0, y).fg, (0, 0, 0));
            assert_eq!(frame.get(9, y).fg, (255, 255, 255));
        }
    }
}
