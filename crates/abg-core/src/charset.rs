use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// 10 caractères: compact, bon contraste.
pub const CHARSET_SIMPLE: &str = " .:-=+*#%@";

/// 70 caractères: Paul Bourke extended, bon équilibre.
pub const CHARSET_EXTENDED: &str =
    " .'`^\",:;Il!i><~+_-?][}{1)(|\\/tfjrxnuvczXYUJCLQ0OZmwqpdbkhao*#MW&8%B@$";

/// Blocs Unicode: pseudo-pixels.
pub const CHARSET_BLOCK: &str = " ░▒▓█";

/// Minimal: haut contraste.
pub const CHARSET_MINIMAL: &str = " .#@";

/// Built-in charset presets.
///
/// # Example
/// ```
/// use abg_core::charset::CharsetPreset;
/// let preset: CharsetPreset = "Block".parse().unwrap();
/// assert_eq!(preset, CharsetPreset::Block);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CharsetPreset {
    /// [`CHARSET_SIMPLE`].
    Simple,
    /// [`CHARSET_EXTENDED`].
    #[default]
    Extended,
    /// [`CHARSET_BLOCK`].
    Block,
    /// [`CHARSET_MINIMAL`].
    Minimal,
}

impl CharsetPreset {
    /// Every preset, in display order.
    pub const ALL: [Self; 4] = [Self::Simple, Self::Extended, Self::Block, Self::Minimal];

    /// Character sequence of the preset, lightest first.
    #[must_use]
    pub fn chars(self) -> &'static str {
        match self {
            Self::Simple => CHARSET_SIMPLE,
            Self::Extended => CHARSET_EXTENDED,
            Self::Block => CHARSET_BLOCK,
            Self::Minimal => CHARSET_MINIMAL,
        }
    }

    /// Lowercase preset name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Extended => "extended",
            Self::Block => "block",
            Self::Minimal => "minimal",
        }
    }
}

impl FromStr for CharsetPreset {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.name() == lower)
            .ok_or_else(|| {
                CoreError::Config(format!(
                    "charset inconnu '{s}' (disponibles : simple, extended, block, minimal)"
                ))
            })
    }
}

/// Ordered density ramp: index 0 is the lightest glyph, the last is the densest.
///
/// Immutable once built. Always holds at least two distinct characters.
///
/// # Example
/// ```
/// use abg_core::charset::Charset;
/// let cs = Charset::custom(" .:#@").unwrap();
/// assert_eq!(cs.char_for_density(0.0), ' ');
/// assert_eq!(cs.char_for_density(1.0), '@');
/// assert_eq!(cs.char_for_density(0.5), ':');
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Charset {
    chars: Vec<char>,
    text: String,
}

impl Charset {
    /// Build the ramp of a built-in preset.
    #[must_use]
    pub fn from_preset(preset: CharsetPreset) -> Self {
        Self {
            chars: preset.chars().chars().collect(),
            text: preset.chars().to_owned(),
        }
    }

    /// Build a ramp from a user string, ordered exactly as given.
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] if the string has fewer than two
    /// characters or repeats one.
    pub fn custom(sequence: &str) -> Result<Self> {
        let chars: Vec<char> = sequence.chars().collect();
        if chars.len() < 2 {
            return Err(CoreError::Config(format!(
                "le charset doit contenir au moins 2 caractères (reçu {})",
                chars.len()
            )));
        }
        for (i, ch) in chars.iter().enumerate() {
            if chars[..i].contains(ch) {
                return Err(CoreError::Config(format!(
                    "caractère '{ch}' répété dans le charset"
                )));
            }
        }
        Ok(Self {
            chars,
            text: sequence.to_owned(),
        })
    }

    /// Same characters, densest first.
    #[must_use]
    pub fn inverted(&self) -> Self {
        Self {
            chars: self.chars.iter().rev().copied().collect(),
            text: self.text.chars().rev().collect(),
        }
    }

    /// Map a density level in [0, 1] to a glyph.
    ///
    /// `index = round(level * (N - 1))`, clamped. Out-of-range levels saturate;
    /// NaN maps to the first glyph.
    #[inline]
    #[must_use]
    pub fn char_for_density(&self, level: f32) -> char {
        self.chars[self.index_for_density(level)]
    }

    /// Index selected by [`Self::char_for_density`].
    #[inline]
    #[must_use]
    pub fn index_for_density(&self, level: f32) -> usize {
        let last = self.chars.len() - 1;
        if level.is_nan() {
            return 0;
        }
        let idx = (level.clamp(0.0, 1.0) * last as f32).round() as usize;
        idx.min(last)
    }

    /// Number of glyphs in the ramp.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Never true for a constructed ramp.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Glyphs, lightest first.
    #[must_use]
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Ramp as a string, lightest first.
    ///
    /// # Example
    /// ```
    /// use abg_core::charset::Charset;
    /// assert_eq!(Charset::custom("ab").unwrap().inverted().as_str(), "ba");
    /// ```
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
