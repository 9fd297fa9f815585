use abg_core::color::{parse_color, to_hex};
use abg_core::error::{CoreError, Result};
use abg_core::frame::{AsciiCell, AsciiFrame, GridDimensions};
use serde::{Deserialize, Serialize};

/// Format version written to every document.
pub const FORMAT_VERSION: u32 = 1;

/// Frame size, in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Size {
    /// Columns.
    pub width: u32,
    /// Rows.
    pub height: u32,
}

/// Content grid size, in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContentSize {
    /// Columns.
    pub cols: u32,
    /// Rows.
    pub rows: u32,
}

/// One cell: glyph plus `#rrggbb` colors.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct CellDocument {
    /// Glyph.
    pub ch: char,
    /// Foreground color.
    pub fg: String,
    /// Background color, `null` when transparent.
    pub bg: Option<String>,
}

/// JSON layout of an [`AsciiFrame`], meant for machine consumers.
///
/// `lines` repeats the glyphs row by row so a reader can take in the
/// picture without walking `cells`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct FrameDocument {
    /// [`FORMAT_VERSION`].
    pub version: u32,
    /// Full frame size, decoration included.
    pub dimensions: Size,
    /// Converted area size.
    pub content: ContentSize,
    /// Border thickness in cells.
    pub border: u32,
    /// Padding in cells.
    pub padding: u32,
    /// Rows as plain strings.
    pub lines: Vec<String>,
    /// Rows of cells.
    pub cells: Vec<Vec<CellDocument>>,
}

impl FrameDocument {
    /// Snapshot a frame.
    #[must_use]
    pub fn from_frame(frame: &AsciiFrame) -> Self {
        Self {
            version: FORMAT_VERSION,
            dimensions: Size {
                width: frame.width,
                height: frame.height,
            },
            content: ContentSize {
                cols: frame.content.cols,
                rows: frame.content.rows,
            },
            border: frame.border,
            padding: frame.padding,
            lines: frame
                .rows()
                .map(|row| row.iter().map(|c| c.ch).collect())
                .collect(),
            cells: frame
                .rows()
                .map(|row| {
                    row.iter()
                        .map(|c| CellDocument {
                            ch: c.ch,
                            fg: to_hex(c.fg),
                            bg: c.bg.map(to_hex),
                        })
                        .collect()
                })
                .collect(),
        }
    }

    /// Rebuild the frame, checking that every size agrees.
    ///
    /// # Errors
    /// Returns [`CoreError::Render`] on inconsistent sizes or bad colors.
    pub fn into_frame(self) -> Result<AsciiFrame> {
        // Les tailles réelles d'abord : rien n'est alloué d'après les champs annoncés.
        if self.cells.len() != self.dimensions.height as usize {
            return Err(CoreError::Render(format!(
                "{} rangées pour une hauteur de {}",
                self.cells.len(),
                self.dimensions.height
            )));
        }
        if let Some((y, row)) = self
            .cells
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != self.dimensions.width as usize)
        {
            return Err(CoreError::Render(format!(
                "rangée {y} : {} cellules pour une largeur de {}",
                row.len(),
                self.dimensions.width
            )));
        }

        let content = GridDimensions {
            cols: self.content.cols,
            rows: self.content.rows,
        };
        let expected = self
            .padding
            .checked_add(self.border)
            .and_then(|per_side| content.decorated(per_side))
            .ok_or_else(|| {
                CoreError::Render(format!(
                    "contenu {}×{} avec padding {} et bordure {} hors limites",
                    content.cols, content.rows, self.padding, self.border
                ))
            })?;
        if expected != (self.dimensions.width, self.dimensions.height) {
            return Err(CoreError::Render(format!(
                "dimensions incohérentes : {}×{} annoncé, {}×{} attendu",
                self.dimensions.width, self.dimensions.height, expected.0, expected.1
            )));
        }

        let bad_color = |e: CoreError| CoreError::Render(format!("couleur de cellule invalide : {e}"));
        let mut cells = Vec::with_capacity(expected.0 as usize * expected.1 as usize);
        for row in self.cells {
            for cell in row {
                cells.push(AsciiCell {
                    ch: cell.ch,
                    fg: parse_color(&cell.fg).map_err(bad_color)?,
                    bg: cell.bg.as_deref().map(parse_color).transpose().map_err(bad_color)?,
                });
            }
        }

        Ok(AsciiFrame {
            cells,
            width: expected.0,
            height: expected.1,
            content,
            border: self.border,
            padding: self.padding,
        })
    }
}

/// Serialize a frame as pretty-printed JSON.
///
/// # Errors
/// Returns [`CoreError::Render`] if serialization fails.
pub fn to_json(frame: &AsciiFrame) -> Result<String> {
    serde_json::to_string_pretty(&FrameDocument::from_frame(frame))
        .map_err(|e| CoreError::Render(format!("sérialisation JSON : {e}")))
}

/// Parse a document produced by [`to_json`].
///
/// # Errors
/// Returns [`CoreError::Render`] on malformed JSON or inconsistent content.
///
/// # Example
/// ```
/// use abg_core::frame::{AsciiCell, AsciiFrame, GridDimensions};
/// use abg_export::json::{from_json, to_json};
///
/// let mut frame = AsciiFrame::new(GridDimensions { cols: 2, rows: 1 }, 0, 0);
/// frame.set(1, 0, AsciiCell { ch: '%', fg: (1, 2, 3), bg: Some((4, 5, 6)) });
/// let back = from_json(&to_json(&frame).unwrap()).unwrap();
/// assert_eq!(back, frame);
/// ```
pub fn from_json(input: &str) -> Result<AsciiFrame> {
    let doc: FrameDocument =
        serde_json::from_str(input).map_err(|e| CoreError::Render(format!("JSON invalide : {e}")))?;
    doc.into_frame()
}
