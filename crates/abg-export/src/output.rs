use std::path::Path;
use std::str::FromStr;

use abg_core::color::Rgb;
use abg_core::config::ResolvedConfig;
use abg_core::dims::DimsSpec;
use abg_core::error::{CoreError, Result};
use abg_core::frame::{AsciiFrame, FrameBuffer};

use crate::font::load_font;
use crate::rasterizer::{CellGeometry, Rasterizer};

/// Raster container written by the image renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageKind {
    /// PNG.
    Png,
    /// JPEG.
    Jpeg,
    /// BMP.
    Bmp,
}

impl ImageKind {
    fn format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Bmp => image::ImageFormat::Bmp,
        }
    }
}

/// Destination format of an output file.
///
/// # Example
/// ```
/// use abg_export::output::{ImageKind, OutputFormat};
/// use std::path::Path;
///
/// assert_eq!(OutputFormat::from_path(Path::new("wall.JPG")).unwrap(), OutputFormat::Image(ImageKind::Jpeg));
/// assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
/// assert!(OutputFormat::from_path(Path::new("art.docx")).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Characters only.
    Text,
    /// Characters with truecolor escapes.
    Ansi,
    /// Structured document.
    Json,
    /// Rendered raster image.
    Image(ImageKind),
}

impl OutputFormat {
    /// Format implied by the file extension.
    ///
    /// # Errors
    /// Returns [`CoreError::Render`] for a missing or unknown extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| CoreError::Render(format!("{} : extension absente, précisez --format", path.display())))?;
        ext.parse()
    }
}

impl FromStr for OutputFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(Self::Text),
            "ans" | "ansi" => Ok(Self::Ansi),
            "json" => Ok(Self::Json),
            "png" => Ok(Self::Image(ImageKind::Png)),
            "jpg" | "jpeg" => Ok(Self::Image(ImageKind::Jpeg)),
            "bmp" => Ok(Self::Image(ImageKind::Bmp)),
            other => Err(CoreError::Render(format!(
                "format de sortie inconnu : '{other}' (txt, ans, json, png, jpg, bmp)"
            ))),
        }
    }
}

/// Settings of the image renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageOptions {
    /// Font family name or path.
    pub font_family: String,
    /// Font size in pixels.
    pub font_size: u32,
    /// Cell geometry.
    pub cell: CellGeometry,
    /// Color behind transparent cells and around a centered grid.
    pub canvas: Rgb,
    /// Exact output size, when the grid was sized from a pixel target.
    pub target: Option<(u32, u32)>,
}

impl ImageOptions {
    /// Options matching a resolved configuration.
    ///
    /// A pixel target fixes the cell to `font_size × font_size / aspect` so
    /// the grid fills it; otherwise the cell follows the font metrics.
    #[must_use]
    pub fn from_config(config: &ResolvedConfig) -> Self {
        let (cell, target) = match config.dims {
            DimsSpec::OutputPixels { width, height } => {
                let font = config.font_size.max(1);
                let cell_height = match config.effects.aspect {
                    Some(factor) => ((font as f32 / factor).round() as u32).max(1),
                    None => font,
                };
                (
                    CellGeometry::Fixed {
                        width: font,
                        height: cell_height,
                    },
                    Some((width, height)),
                )
            }
            _ => (CellGeometry::FontMetrics, None),
        };
        Self {
            font_family: config.font_family.clone(),
            font_size: config.font_size,
            cell,
            canvas: config.canvas,
            target,
        }
    }
}

/// Rasterise `frame` with the configured font.
///
/// # Errors
/// Returns [`CoreError::Render`] if the font can't be found or parsed.
pub fn render_image(frame: &AsciiFrame, options: &ImageOptions) -> Result<FrameBuffer> {
    let font = load_font(&options.font_family)?;
    let rasterizer = Rasterizer::for_frame(&font, options.font_size as f32, options.cell, frame)?;
    let fb = match options.target {
        Some((w, h)) => rasterizer.render_to_size(frame, options.canvas, w, h),
        None => rasterizer.render(frame, options.canvas),
    };
    log::info!("Image rendue : {}×{} px", fb.width, fb.height);
    Ok(fb)
}

/// Encode a pixel buffer. Alpha is dropped: every output is opaque.
///
/// # Errors
/// Returns [`CoreError::Render`] on encoding or I/O failure.
pub fn save_image(fb: &FrameBuffer, path: &Path, kind: ImageKind) -> Result<()> {
    let rgba = image::RgbaImage::from_raw(fb.width, fb.height, fb.data.clone())
        .ok_or_else(|| CoreError::Render(format!("buffer {}×{} incohérent", fb.width, fb.height)))?;
    image::DynamicImage::ImageRgba8(rgba)
        .to_rgb8()
        .save_with_format(path, kind.format())
        .map_err(|e| CoreError::Render(format!("écriture de {} : {e}", path.display())))
}

/// Write `frame` to `path` in `format`.
///
/// # Errors
/// Returns [`CoreError::Render`] on any rendering or I/O failure.
pub fn write_output(frame: &AsciiFrame, path: &Path, format: OutputFormat, options: &ImageOptions) -> Result<()> {
    let io_err = |e: std::io::Error| CoreError::Render(format!("écriture de {} : {e}", path.display()));
    match format {
        OutputFormat::Text => {
            let mut text = frame.to_plain_text();
            text.push('\n');
            std::fs::write(path, text).map_err(io_err)?;
        }
        OutputFormat::Ansi => {
            std::fs::write(path, crate::ansi::to_ansi_string(frame)).map_err(io_err)?;
        }
        OutputFormat::Json => {
            std::fs::write(path, crate::json::to_json(frame)?).map_err(io_err)?;
        }
        OutputFormat::Image(kind) => {
            let fb = render_image(frame, options)?;
            save_image(&fb, path, kind)?;
        }
    }
    log::info!("Sortie écrite : {} ({format:?})", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use abg_core::config::ConvertConfig;
    use abg_core::frame::{AsciiCell, GridDimensions};

    fn sample_frame() -> AsciiFrame {
        let mut frame = AsciiFrame::new(GridDimensions { cols: 3, rows: 2 }, 0, 0);
        frame.set(
            1,
            1,
            AsciiCell {
                ch: '@',
                fg: (255, 0, 0),
                bg: None,
            },
        );
        frame
    }

    fn options() -> ImageOptions {
        ImageOptions::from_config(&ConvertConfig::default().resolve().unwrap())
    }

    #[test]
    fn format_from_extension() {
        let cases = [
            ("a.txt", OutputFormat::Text),
            ("a.ans", OutputFormat::Ansi),
            ("a.json", OutputFormat::Json),
            ("a.png", OutputFormat::Image(ImageKind::Png)),
            ("a.jpeg", OutputFormat::Image(ImageKind::Jpeg)),
            ("a.bmp", OutputFormat::Image(ImageKind::Bmp)),
        ];
        for (name, expected) in cases {
            assert_eq!(OutputFormat::from_path(Path::new(name)).unwrap(), expected);
        }
        assert!(matches!(
            OutputFormat::from_path(Path::new("noext")),
            Err(CoreError::Render(_))
        ));
    }

    #[test]
    fn text_ansi_and_json_files() {
        let dir = tempfile::tempdir().unwrap();
        let frame = sample_frame();

        let txt = dir.path().join("out.txt");
        write_output(&frame, &txt, OutputFormat::Text, &options()).unwrap();
        assert_eq!(std::fs::read_to_string(&txt).unwrap(), "   \n @ \n");

        let ans = dir.path().join("out.ans");
        write_output(&frame, &ans, OutputFormat::Ansi, &options()).unwrap();
        assert!(std::fs::read_to_string(&ans).unwrap().contains("\x1b[38;2;255;0;0m@"));

        let json = dir.path().join("out.json");
        write_output(&frame, &json, OutputFormat::Json, &options()).unwrap();
        let back = crate::json::from_json(&std::fs::read_to_string(&json).unwrap()).unwrap();
        assert_eq!(back, frame);
    }

    #[test]
    fn save_image_roundtrips_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let mut fb = FrameBuffer::filled(8, 4, (10, 200, 30));
        fb.put_pixel(7, 3, (255, 255, 255));

        let png = dir.path().join("out.png");
        save_image(&fb, &png, ImageKind::Png).unwrap();
        let decoded = image::open(&png).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (8, 4));
        assert_eq!(decoded.get_pixel(0, 0).0, [10, 200, 30]);
        assert_eq!(decoded.get_pixel(7, 3).0, [255, 255, 255]);

        let jpg = dir.path().join("out.jpg");
        save_image(&fb, &jpg, ImageKind::Jpeg).unwrap();
        assert_eq!(image::open(&jpg).unwrap().width(), 8);
    }

    #[test]
    fn unreadable_font_is_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let font = dir.path().join("broken.ttf");
        std::fs::write(&font, b"garbage").unwrap();
        let opts = ImageOptions {
            font_family: font.to_string_lossy().into_owned(),
            ..options()
        };
        let err = write_output(&sample_frame(), &dir.path().join("x.png"), OutputFormat::Image(ImageKind::Png), &opts);
        assert!(matches!(err, Err(CoreError::Render(_))));
    }

    #[test]
    fn pixel_target_fixes_cell_and_canvas() {
        let config = ConvertConfig {
            output_resolution: Some("1920x1080".into()),
            font_size: 12,
            ..Default::default()
        }
        .resolve()
        .unwrap();
        let opts = ImageOptions::from_config(&config);
        assert_eq!(opts.cell, CellGeometry::Fixed { width: 12, height: 24 });
        assert_eq!(opts.target, Some((1920, 1080)));

        let config = ConvertConfig {
            output_resolution: Some("1920x1080".into()),
            font_size: 12,
            aspect_correct: false,
            ..Default::default()
        }
        .resolve()
        .unwrap();
        assert_eq!(
            ImageOptions::from_config(&config).cell,
            CellGeometry::Fixed { width: 12, height: 12 }
        );
        assert_eq!(options().cell, CellGeometry::FontMetrics);
    }
}
