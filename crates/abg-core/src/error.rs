use thiserror::Error;

/// Errors shared by every stage of the conversion pipeline.
///
/// Each variant is terminal for the conversion that raised it; no stage
/// produces a partial frame.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Source image is missing, unreadable or cannot be decoded.
    #[error("Impossible de charger l'image {path} : {reason}")]
    ImageLoad {
        /// Path (or label) of the source.
        path: String,
        /// Decoder or I/O message.
        reason: String,
    },

    /// Malformed resolution string, or a grid that resolves to zero rows/cols.
    #[error("Dimensions invalides : {0}")]
    InvalidDimensions(String),

    /// Invalid configuration value, rejected before any pixel work.
    #[error("Configuration invalide : {0}")]
    Config(String),

    /// Output could not be produced (unknown format, unwritable path, font).
    #[error("Erreur de rendu : {0}")]
    Render(String),
}

/// Result alias used throughout the library crates.
pub type Result<T> = std::result::Result<T, CoreError>;
