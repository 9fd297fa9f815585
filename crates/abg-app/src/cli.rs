use std::path::PathBuf;

use abg_core::charset::CharsetPreset;
use abg_core::config::{BorderMode, ColorModeKind, ConvertConfig, Direction};
use abg_export::OutputFormat;
use clap::Parser;

/// ascii-bg: Image to ASCII art for terminals and wallpapers.
///
/// Flags override the values read from `--config`.
#[derive(Parser, Debug)]
#[command(name = "ascii-bg", version, about, long_about = None)]
pub struct Cli {
    /// Image source (PNG, JPEG, BMP, GIF).
    pub image: PathBuf,

    /// Grille de caractères : preset (4k, 1080p, 720p…) ou COLSxROWS.
    #[arg(short, long)]
    pub resolution: Option<String>,

    /// Taille de l'image rendue en pixels : preset ou WxH. La grille en découle via --font-size.
    #[arg(long)]
    pub output_resolution: Option<String>,

    /// Fraction de la taille source, dans ]0, 1].
    #[arg(long)]
    pub scale: Option<f32>,

    /// Preset de caractères : simple, extended, block, minimal.
    #[arg(long)]
    pub charset: Option<CharsetPreset>,

    /// Ramp personnalisée, du plus clair au plus dense (remplace --charset).
    #[arg(long)]
    pub custom_charset: Option<String>,

    /// Mode couleur : black-white (bw), source, rainbow, gradient, solid.
    #[arg(long)]
    pub color_mode: Option<ColorModeKind>,

    /// Couleur du texte en mode solid (nom ou #RRGGBB).
    #[arg(long)]
    pub text_color: Option<String>,

    /// Fond en mode solid, et couleur de toile pour l'export image.
    #[arg(long)]
    pub bg_color: Option<String>,

    /// Fond imposé à chaque cellule des modes non solid.
    #[arg(long)]
    pub background: Option<String>,

    /// Couleurs du dégradé, séparées par des virgules.
    #[arg(long, value_delimiter = ',')]
    pub gradient: Option<Vec<String>>,

    /// Direction du dégradé / arc-en-ciel : horizontal, vertical, diagonal.
    #[arg(long)]
    pub gradient_direction: Option<Direction>,

    /// Luminosité [-100, 100].
    #[arg(long, allow_negative_numbers = true)]
    pub brightness: Option<i32>,

    /// Contraste [-100, 100].
    #[arg(long, allow_negative_numbers = true)]
    pub contrast: Option<i32>,

    /// Inverser la densité (pour fond clair).
    #[arg(long, default_value_t = false)]
    pub invert: bool,

    /// Désactiver la correction d'aspect des cellules terminal.
    #[arg(long, default_value_t = false)]
    pub no_aspect_correct: bool,

    /// Facteur de correction d'aspect, dans ]0, 1].
    #[arg(long)]
    pub aspect_factor: Option<f32>,

    /// Bordure : none, simple.
    #[arg(long)]
    pub border: Option<BorderMode>,

    /// Caractère de bordure.
    #[arg(long)]
    pub border_char: Option<char>,

    /// Cellules vides autour du contenu [0, 10].
    #[arg(long)]
    pub padding: Option<u32>,

    /// Taille de police en pixels [4, 72].
    #[arg(long)]
    pub font_size: Option<u32>,

    /// Famille de police ou chemin vers un fichier TTF/OTF.
    #[arg(long)]
    pub font_family: Option<String>,

    /// Fichier de sortie (.txt, .ans, .json, .png, .jpg, .bmp).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Format de sortie, quand l'extension ne suffit pas.
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Terminal sans couleurs.
    #[arg(long, default_value_t = false)]
    pub plain: bool,

    /// Afficher aussi dans le terminal quand --output est donné.
    #[arg(long, default_value_t = false)]
    pub terminal: bool,

    /// Fichier de configuration TOML.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Overlay every flag given on the command line onto `config`.
    pub fn apply(&self, config: &mut ConvertConfig) {
        if self.resolution.is_some() {
            config.resolution.clone_from(&self.resolution);
        }
        if self.output_resolution.is_some() {
            config.output_resolution.clone_from(&self.output_resolution);
        }
        if self.scale.is_some() {
            config.scale = self.scale;
        }
        if let Some(v) = self.charset {
            config.charset = v;
        }
        if self.custom_charset.is_some() {
            config.custom_charset.clone_from(&self.custom_charset);
        }
        if let Some(v) = self.color_mode {
            config.color_mode = v;
        }
        if let Some(v) = &self.text_color {
            config.text_color.clone_from(v);
        }
        if let Some(v) = &self.bg_color {
            config.bg_color.clone_from(v);
        }
        if self.background.is_some() {
            config.background.clone_from(&self.background);
        }
        if let Some(v) = &self.gradient {
            config.gradient.clone_from(v);
        }
        if let Some(v) = self.gradient_direction {
            config.direction = v;
        }
        if let Some(v) = self.brightness {
            config.brightness = v;
        }
        if let Some(v) = self.contrast {
            config.contrast = v;
        }
        if self.invert {
            config.invert = true;
        }
        if self.no_aspect_correct {
            config.aspect_correct = false;
        }
        if let Some(v) = self.aspect_factor {
            config.aspect_factor = v;
        }
        if let Some(v) = self.border {
            config.border = v;
        }
        if let Some(v) = self.border_char {
            config.border_char = v;
        }
        if let Some(v) = self.padding {
            config.padding = v;
        }
        if let Some(v) = self.font_size {
            config.font_size = v;
        }
        if let Some(v) = &self.font_family {
            config.font_family.clone_from(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["ascii-bg"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn image_is_required() {
        assert!(Cli::try_parse_from(["ascii-bg"]).is_err());
        let cli = parse(&["photo.jpg"]);
        assert_eq!(cli.image, PathBuf::from("photo.jpg"));
        assert_eq!(cli.log_level, "warn");
        assert!(cli.output.is_none());
    }

    #[test]
    fn flags_override_config() {
        let cli = parse(&[
            "photo.jpg",
            "-r",
            "4k",
            "--charset",
            "block",
            "--color-mode",
            "gradient",
            "--gradient",
            "red,#00ff00,blue",
            "--gradient-direction",
            "diagonal",
            "--brightness",
            "-20",
            "--contrast=15",
            "--invert",
            "--no-aspect-correct",
            "--border",
            "simple",
            "--border-char",
            "*",
            "--padding",
            "2",
        ]);
        let mut config = ConvertConfig {
            padding: 5,
            text_color: "red".into(),
            ..Default::default()
        };
        cli.apply(&mut config);

        assert_eq!(config.resolution.as_deref(), Some("4k"));
        assert_eq!(config.charset, CharsetPreset::Block);
        assert_eq!(config.color_mode, ColorModeKind::Gradient);
        assert_eq!(config.gradient, ["red", "#00ff00", "blue"]);
        assert_eq!(config.direction, Direction::Diagonal);
        assert_eq!(config.brightness, -20);
        assert_eq!(config.contrast, 15);
        assert!(config.invert);
        assert!(!config.aspect_correct);
        assert_eq!(config.border, BorderMode::Simple);
        assert_eq!(config.border_char, '*');
        assert_eq!(config.padding, 2);
        // Absent flags leave file values alone.
        assert_eq!(config.text_color, "red");
        assert!(config.resolve().is_ok());
    }

    #[test]
    fn enum_flags_are_validated() {
        assert!(Cli::try_parse_from(["ascii-bg", "a.png", "--color-mode", "sepia"]).is_err());
        assert!(Cli::try_parse_from(["ascii-bg", "a.png", "--charset", "huge"]).is_err());
        let cli = parse(&["a.png", "--color-mode", "bw", "--format", "json", "-o", "out.dat"]);
        assert_eq!(cli.color_mode, Some(ColorModeKind::BlackWhite));
        assert_eq!(cli.format, Some(OutputFormat::Json));
    }
}
