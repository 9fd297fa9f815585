use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::charset::{Charset, CharsetPreset};
use crate::color::{Rgb, parse_color};
use crate::dims::{CHAR_ASPECT_CORRECTION, CellLayout, DimsSpec, parse_resolution};
use crate::error::CoreError;

/// Bornes des options numériques.
pub const BRIGHTNESS_RANGE: std::ops::RangeInclusive<i32> = -100..=100;
/// Contrast bounds.
pub const CONTRAST_RANGE: std::ops::RangeInclusive<i32> = -100..=100;
/// Padding bounds, in cells.
pub const PADDING_RANGE: std::ops::RangeInclusive<u32> = 0..=10;
/// Font size bounds, in pixels.
pub const FONT_SIZE_RANGE: std::ops::RangeInclusive<u32> = 4..=72;

/// Configuration complète de la conversion.
///
/// Sérialisable en TOML. Chaque champ a une valeur par défaut saine.
/// Validated once by [`ConvertConfig::resolve`].
///
/// # Example
/// ```
/// use abg_core::config::ConvertConfig;
/// let config = ConvertConfig::default();
/// assert!(config.aspect_correct);
/// assert!(config.resolve().is_ok());
/// ```
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ConvertConfig {
    // === Dimensions ===
    /// Character grid: preset (`4k`, `1080p`) or `COLSxROWS`.
    pub resolution: Option<String>,
    /// Pixel target of the rendered image: preset or `WxH`.
    pub output_resolution: Option<String>,
    /// Fraction of the source pixel size, in (0, 1].
    pub scale: Option<f32>,

    // === Charset ===
    /// Preset used when no custom charset is given.
    pub charset: CharsetPreset,
    /// Ramp du plus clair au plus dense. Remplace le preset.
    pub custom_charset: Option<String>,

    // === Effets ===
    /// Brightness offset [-100, 100]. 0 = neutre.
    pub brightness: i32,
    /// Contraste [-100, 100]. 0 = neutre.
    pub contrast: i32,
    /// Inverser la densité (pour fond clair).
    pub invert: bool,
    /// Correction aspect ratio des cellules terminal.
    pub aspect_correct: bool,
    /// Row multiplier used by aspect correction, in (0, 1].
    pub aspect_factor: f32,

    // === Couleur ===
    /// Color mode.
    pub color_mode: ColorModeKind,
    /// Text color for `solid` mode.
    pub text_color: String,
    /// Background color for `solid` mode, and canvas color for image output.
    pub bg_color: String,
    /// Per-cell background forced on non-solid modes.
    pub background: Option<String>,
    /// Gradient stops, in order.
    pub gradient: Vec<String>,
    /// Direction for gradient and rainbow modes.
    pub direction: Direction,

    // === Décoration ===
    /// Border style.
    pub border: BorderMode,
    /// Border glyph.
    pub border_char: char,
    /// Blank cells around the content [0, 10].
    pub padding: u32,

    // === Rendu image ===
    /// Font size in pixels [4, 72].
    pub font_size: u32,
    /// Font family name or path to a TTF/OTF file.
    pub font_family: String,
}

/// Color mode selector, as written in config files and on the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorModeKind {
    /// White glyphs, no background.
    #[default]
    BlackWhite,
    /// Mean color of the source region.
    Source,
    /// Hue cycling with position.
    Rainbow,
    /// Interpolated user stops.
    Gradient,
    /// Fixed text and background colors.
    Solid,
}

impl FromStr for ColorModeKind {
    type Err = CoreError;

    fn from_str(s: &str) -> std::result::Result<Self, CoreError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "black-white" | "bw" => Ok(Self::BlackWhite),
            "source" => Ok(Self::Source),
            "rainbow" => Ok(Self::Rainbow),
            "gradient" => Ok(Self::Gradient),
            "solid" => Ok(Self::Solid),
            _ => Err(CoreError::Config(format!(
                "mode couleur inconnu '{s}' (black-white, source, rainbow, gradient, solid)"
            ))),
        }
    }
}

/// Axis along which gradients and rainbows progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Left to right.
    #[default]
    Horizontal,
    /// Top to bottom.
    Vertical,
    /// Top-left to bottom-right.
    Diagonal,
}

impl FromStr for Direction {
    type Err = CoreError;

    fn from_str(s: &str) -> std::result::Result<Self, CoreError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizontal" => Ok(Self::Horizontal),
            "vertical" => Ok(Self::Vertical),
            "diagonal" => Ok(Self::Diagonal),
            _ => Err(CoreError::Config(format!(
                "direction inconnue '{s}' (horizontal, vertical, diagonal)"
            ))),
        }
    }
}

/// Border style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderMode {
    /// No border.
    #[default]
    None,
    /// One-cell ring of the border character.
    Simple,
}

impl FromStr for BorderMode {
    type Err = CoreError;

    fn from_str(s: &str) -> std::result::Result<Self, CoreError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "simple" => Ok(Self::Simple),
            _ => Err(CoreError::Config(format!("bordure inconnue '{s}' (none, simple)"))),
        }
    }
}

/// Resolved color mode with its parameters.
///
/// # Example
/// ```
/// use abg_core::config::{ColorMode, ConvertConfig, ColorModeKind};
/// let config = ConvertConfig { color_mode: ColorModeKind::Solid, ..Default::default() };
/// let resolved = config.resolve().unwrap();
/// assert!(matches!(resolved.color, ColorMode::Solid { text: (255, 255, 255), background: (0, 0, 0) }));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum ColorMode {
    /// White glyphs.
    BlackWhite,
    /// Sample mean color.
    Source,
    /// Full-saturation hue from position.
    Rainbow {
        /// Progression axis.
        direction: Direction,
    },
    /// Piecewise-linear interpolation across `stops` (at least two).
    Gradient {
        /// Color stops, in order.
        stops: Vec<Rgb>,
        /// Progression axis.
        direction: Direction,
    },
    /// Fixed colors for every cell.
    Solid {
        /// Glyph color.
        text: Rgb,
        /// Cell background.
        background: Rgb,
    },
}

/// Luminance effects and aspect correction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Effects {
    /// Brightness offset [-100, 100].
    pub brightness: i32,
    /// Contrast [-100, 100].
    pub contrast: i32,
    /// Density inversion.
    pub invert: bool,
    /// Row multiplier, `None` when aspect correction is off.
    pub aspect: Option<f32>,
}

impl Default for Effects {
    fn default() -> Self {
        Self {
            brightness: 0,
            contrast: 0,
            invert: false,
            aspect: Some(CHAR_ASPECT_CORRECTION),
        }
    }
}

/// Padding and border around the content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decoration {
    /// Border style.
    pub border: BorderMode,
    /// Border glyph.
    pub border_char: char,
    /// Blank cells on each side, inside the border.
    pub padding: u32,
}

impl Decoration {
    /// Border ring thickness.
    #[must_use]
    pub fn border_width(self) -> u32 {
        match self.border {
            BorderMode::None => 0,
            BorderMode::Simple => 1,
        }
    }

    /// Cells added on each side of the content.
    #[must_use]
    pub fn cells_per_side(self) -> u32 {
        self.padding + self.border_width()
    }
}

impl Default for Decoration {
    fn default() -> Self {
        Self {
            border: BorderMode::None,
            border_char: '#',
            padding: 0,
        }
    }
}

/// Validated configuration. Built only through [`ConvertConfig::resolve`].
#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    /// Winning sizing rule.
    pub dims: DimsSpec,
    /// Density ramp, lightest first (not yet inverted).
    pub charset: Charset,
    /// Luminance effects.
    pub effects: Effects,
    /// Color mode.
    pub color: ColorMode,
    /// Per-cell background for non-solid modes.
    pub background: Option<Rgb>,
    /// Canvas color for image output.
    pub canvas: Rgb,
    /// Padding and border.
    pub decoration: Decoration,
    /// Font size in pixels.
    pub font_size: u32,
    /// Font family or path.
    pub font_family: String,
}

impl ResolvedConfig {
    /// Layout handed to [`DimsSpec::resolve`].
    #[must_use]
    pub fn cell_layout(&self) -> CellLayout {
        CellLayout {
            font_size: self.font_size,
            aspect: self.effects.aspect,
            decoration: self.decoration.cells_per_side(),
        }
    }
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            resolution: None,
            output_resolution: None,
            scale: None,
            charset: CharsetPreset::Extended,
            custom_charset: None,
            brightness: 0,
            contrast: 0,
            invert: false,
            aspect_correct: true,
            aspect_factor: CHAR_ASPECT_CORRECTION,
            color_mode: ColorModeKind::BlackWhite,
            text_color: "white".into(),
            bg_color: "black".into(),
            background: None,
            gradient: vec!["#ff0000".into(), "#0000ff".into()],
            direction: Direction::Horizontal,
            border: BorderMode::None,
            border_char: '#',
            padding: 0,
            font_size: 10,
            font_family: "DejaVuSansMono".into(),
        }
    }
}

fn check_range<T>(name: &str, value: T, range: &std::ops::RangeInclusive<T>) -> crate::Result<()>
where
    T: PartialOrd + std::fmt::Display,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(CoreError::Config(format!(
            "{name} = {value} hors limites [{}, {}]",
            range.start(),
            range.end()
        )))
    }
}

impl ConvertConfig {
    /// Validate every option and pick the winning dimension rule.
    ///
    /// Runs before any pixel is touched.
    ///
    /// # Errors
    /// [`CoreError::Config`] for out-of-range values, bad colors, short
    /// charsets or gradients; [`CoreError::InvalidDimensions`] for malformed
    /// resolution strings.
    pub fn resolve(&self) -> crate::Result<ResolvedConfig> {
        check_range("brightness", self.brightness, &BRIGHTNESS_RANGE)?;
        check_range("contrast", self.contrast, &CONTRAST_RANGE)?;
        check_range("padding", self.padding, &PADDING_RANGE)?;
        check_range("font_size", self.font_size, &FONT_SIZE_RANGE)?;
        if !(self.aspect_factor > 0.0 && self.aspect_factor <= 1.0) {
            return Err(CoreError::Config(format!(
                "aspect_factor = {} hors limites ]0, 1]",
                self.aspect_factor
            )));
        }

        let dims = self.resolve_dims()?;

        let charset = match self.custom_charset.as_deref() {
            Some(custom) => Charset::custom(custom)?,
            None => Charset::from_preset(self.charset),
        };

        let color = match self.color_mode {
            ColorModeKind::BlackWhite => ColorMode::BlackWhite,
            ColorModeKind::Source => ColorMode::Source,
            ColorModeKind::Rainbow => ColorMode::Rainbow {
                direction: self.direction,
            },
            ColorModeKind::Gradient => {
                if self.gradient.len() < 2 {
                    return Err(CoreError::Config(format!(
                        "le dégradé demande au moins 2 couleurs (reçu {})",
                        self.gradient.len()
                    )));
                }
                let stops = self
                    .gradient
                    .iter()
                    .map(|s| parse_color(s))
                    .collect::<crate::Result<Vec<_>>>()?;
                ColorMode::Gradient {
                    stops,
                    direction: self.direction,
                }
            }
            ColorModeKind::Solid => ColorMode::Solid {
                text: parse_color(&self.text_color)?,
                background: parse_color(&self.bg_color)?,
            },
        };

        let background = self.background.as_deref().map(parse_color).transpose()?;
        let canvas = parse_color(&self.bg_color)?;

        Ok(ResolvedConfig {
            dims,
            charset,
            effects: Effects {
                brightness: self.brightness,
                contrast: self.contrast,
                invert: self.invert,
                aspect: self.aspect_correct.then_some(self.aspect_factor),
            },
            color,
            background,
            canvas,
            decoration: Decoration {
                border: self.border,
                border_char: self.border_char,
                padding: self.padding,
            },
            font_size: self.font_size,
            font_family: self.font_family.clone(),
        })
    }

    fn resolve_dims(&self) -> crate::Result<DimsSpec> {
        if let Some(res) = self.resolution.as_deref() {
            if self.output_resolution.is_some() || self.scale.is_some() {
                log::warn!("--resolution prioritaire : --output-resolution / --scale ignorés");
            }
            let (cols, rows) = parse_resolution(res)?;
            return Ok(DimsSpec::Characters { cols, rows });
        }
        if let Some(res) = self.output_resolution.as_deref() {
            if self.scale.is_some() {
                log::warn!("--output-resolution prioritaire : --scale ignoré");
            }
            let (width, height) = parse_resolution(res)?;
            return Ok(DimsSpec::OutputPixels { width, height });
        }
        if let Some(scale) = self.scale {
            if !(scale > 0.0 && scale <= 1.0) {
                return Err(CoreError::Config(format!("scale = {scale} hors limites ]0, 1]")));
            }
            return Ok(DimsSpec::Scale(scale));
        }
        Ok(DimsSpec::Source)
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    convert: Option<ConvertSection>,
    color: Option<ColorSection>,
    render: Option<RenderSection>,
}

/// Dimensions, charset and effects.
#[derive(Deserialize)]
struct ConvertSection {
    resolution: Option<String>,
    output_resolution: Option<String>,
    scale: Option<f32>,
    charset: Option<CharsetPreset>,
    custom_charset: Option<String>,
    brightness: Option<i32>,
    contrast: Option<i32>,
    invert: Option<bool>,
    aspect_correct: Option<bool>,
    aspect_factor: Option<f32>,
}

#[derive(Deserialize)]
struct ColorSection {
    mode: Option<ColorModeKind>,
    text_color: Option<String>,
    bg_color: Option<String>,
    background: Option<String>,
    gradient: Option<Vec<String>>,
    direction: Option<Direction>,
}

/// Decoration and image output.
#[derive(Deserialize)]
struct RenderSection {
    border: Option<BorderMode>,
    border_char: Option<char>,
    padding: Option<u32>,
    font_size: Option<u32>,
    font_family: Option<String>,
}

/// Parse TOML and merge it over the defaults. Unknown sections are ignored;
/// every key is optional.
///
/// # Errors
/// Returns an error if the content is not valid TOML for this schema.
///
/// # Example
/// ```
/// use abg_core::config::{parse_config, ColorModeKind};
/// let config = parse_config("[color]\nmode = \"rainbow\"\n").unwrap();
/// assert_eq!(config.color_mode, ColorModeKind::Rainbow);
/// assert_eq!(config.padding, 0);
/// ```
pub fn parse_config(content: &str) -> Result<ConvertConfig> {
    let file: ConfigFile = toml::from_str(content).context("Erreur de parsing TOML")?;
    let mut config = ConvertConfig::default();

    if let Some(c) = file.convert {
        if c.resolution.is_some() {
            config.resolution = c.resolution;
        }
        if c.output_resolution.is_some() {
            config.output_resolution = c.output_resolution;
        }
        if c.scale.is_some() {
            config.scale = c.scale;
        }
        if let Some(v) = c.charset {
            config.charset = v;
        }
        if c.custom_charset.is_some() {
            config.custom_charset = c.custom_charset;
        }
        if let Some(v) = c.brightness {
            config.brightness = v;
        }
        if let Some(v) = c.contrast {
            config.contrast = v;
        }
        if let Some(v) = c.invert {
            config.invert = v;
        }
        if let Some(v) = c.aspect_correct {
            config.aspect_correct = v;
        }
        if let Some(v) = c.aspect_factor {
            config.aspect_factor = v;
        }
    }

    if let Some(c) = file.color {
        if let Some(v) = c.mode {
            config.color_mode = v;
        }
        if let Some(v) = c.text_color {
            config.text_color = v;
        }
        if let Some(v) = c.bg_color {
            config.bg_color = v;
        }
        if c.background.is_some() {
            config.background = c.background;
        }
        if let Some(v) = c.gradient {
            config.gradient = v;
        }
        if let Some(v) = c.direction {
            config.direction = v;
        }
    }

    if let Some(r) = file.render {
        if let Some(v) = r.border {
            config.border = v;
        }
        if let Some(v) = r.border_char {
            config.border_char = v;
        }
        if let Some(v) = r.padding {
            config.padding = v;
        }
        if let Some(v) = r.font_size {
            config.font_size = v;
        }
        if let Some(v) = r.font_family {
            config.font_family = v;
        }
    }

    Ok(config)
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<ConvertConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Configuration invalide dans {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve_to_source_dims() {
        let resolved = ConvertConfig::default().resolve().unwrap();
        assert_eq!(resolved.dims, DimsSpec::Source);
        assert_eq!(resolved.effects.aspect, Some(CHAR_ASPECT_CORRECTION));
        assert_eq!(resolved.color, ColorMode::BlackWhite);
        assert_eq!(resolved.background, None);
        assert_eq!(resolved.canvas, (0, 0, 0));
    }

    #[test]
    fn resolution_wins_over_everything() {
        let config = ConvertConfig {
            resolution: Some("80x24".into()),
            output_resolution: Some("4k".into()),
            scale: Some(0.5),
            ..Default::default()
        };
        assert_eq!(
            config.resolve().unwrap().dims,
            DimsSpec::Characters { cols: 80, rows: 24 }
        );
    }

    #[test]
    fn output_resolution_wins_over_scale() {
        let config = ConvertConfig {
            output_resolution: Some("1080p".into()),
            scale: Some(0.5),
            ..Default::default()
        };
        assert_eq!(
            config.resolve().unwrap().dims,
            DimsSpec::OutputPixels { width: 1920, height: 1080 }
        );
    }

    #[test]
    fn out_of_range_values_rejected() {
        let cases = [
            ConvertConfig { brightness: 101, ..Default::default() },
            ConvertConfig { contrast: -101, ..Default::default() },
            ConvertConfig { padding: 11, ..Default::default() },
            ConvertConfig { font_size: 3, ..Default::default() },
            ConvertConfig { font_size: 73, ..Default::default() },
            ConvertConfig { scale: Some(0.0), ..Default::default() },
            ConvertConfig { scale: Some(1.5), ..Default::default() },
            ConvertConfig { aspect_factor: 0.0, ..Default::default() },
        ];
        for config in cases {
            assert!(matches!(config.resolve(), Err(CoreError::Config(_))), "{config:?}");
        }
    }

    #[test]
    fn malformed_resolution_is_dimension_error() {
        let config = ConvertConfig {
            resolution: Some("wide".into()),
            ..Default::default()
        };
        assert!(matches!(config.resolve(), Err(CoreError::InvalidDimensions(_))));
    }

    #[test]
    fn gradient_needs_two_stops() {
        let config = ConvertConfig {
            color_mode: ColorModeKind::Gradient,
            gradient: vec!["red".into()],
            ..Default::default()
        };
        assert!(matches!(config.resolve(), Err(CoreError::Config(_))));

        let config = ConvertConfig {
            color_mode: ColorModeKind::Gradient,
            gradient: vec!["red".into(), "#00ff00".into(), "blue".into()],
            direction: Direction::Diagonal,
            ..Default::default()
        };
        assert_eq!(
            config.resolve().unwrap().color,
            ColorMode::Gradient {
                stops: vec![(255, 0, 0), (0, 255, 0), (0, 0, 255)],
                direction: Direction::Diagonal,
            }
        );
    }

    #[test]
    fn bad_custom_charset_rejected() {
        let config = ConvertConfig {
            custom_charset: Some("@".into()),
            ..Default::default()
        };
        assert!(matches!(config.resolve(), Err(CoreError::Config(_))));
    }

    #[test]
    fn aspect_disabled_yields_none() {
        let config = ConvertConfig {
            aspect_correct: false,
            ..Default::default()
        };
        assert_eq!(config.resolve().unwrap().effects.aspect, None);
    }

    #[test]
    fn toml_sections_merge_over_defaults() {
        let toml = r##"
[convert]
output_resolution = "4k"
charset = "block"
brightness = 20
invert = true

[color]
mode = "gradient"
gradient = ["#000000", "white"]
direction = "vertical"

[render]
border = "simple"
border_char = "*"
padding = 2
font_size = 12
"##;
        let config = parse_config(toml).unwrap();
        assert_eq!(config.output_resolution.as_deref(), Some("4k"));
        assert_eq!(config.charset, CharsetPreset::Block);
        assert_eq!(config.brightness, 20);
        assert!(config.invert);
        assert!(config.aspect_correct);
        assert_eq!(config.color_mode, ColorModeKind::Gradient);
        assert_eq!(config.direction, Direction::Vertical);
        assert_eq!(config.border, BorderMode::Simple);
        assert_eq!(config.border_char, '*');
        assert_eq!(config.padding, 2);
        assert_eq!(config.font_size, 12);
        assert_eq!(config.font_family, "DejaVuSansMono");

        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.decoration.cells_per_side(), 3);
    }

    #[test]
    fn empty_toml_is_default() {
        let config = parse_config("").unwrap();
        assert_eq!(config.color_mode, ColorModeKind::BlackWhite);
        assert_eq!(config.border_char, '#');
    }

    #[test]
    fn load_config_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ascii-bg.toml");
        std::fs::write(&path, "[convert]\nscale = 0.5\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.scale, Some(0.5));
        assert!(load_config(&dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn mode_names_parse() {
        assert_eq!("Black-White".parse::<ColorModeKind>().unwrap(), ColorModeKind::BlackWhite);
        assert_eq!("solid".parse::<ColorModeKind>().unwrap(), ColorModeKind::Solid);
        assert!("sepia".parse::<ColorModeKind>().is_err());
        assert_eq!("diagonal".parse::<Direction>().unwrap(), Direction::Diagonal);
        assert_eq!("SIMPLE".parse::<BorderMode>().unwrap(), BorderMode::Simple);
    }
}
