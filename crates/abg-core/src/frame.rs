use crate::color::{Rgb, luma};

/// Buffer de pixels décodés.
///
/// Stocke les pixels en RGBA row-major, 4 bytes par pixel.
///
/// # Example
/// ```
/// use abg_core::frame::FrameBuffer;
/// let fb = FrameBuffer::new(10, 10);
/// assert_eq!(fb.data.len(), 400);
/// ```
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    /// Pixels RGBA, row-major, 4 bytes par pixel.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameBuffer {
    /// Crée un buffer noir transparent aux dimensions données.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0u8; width as usize * height as usize * 4],
            width,
            height,
        }
    }

    /// Crée un buffer opaque rempli d'une seule couleur.
    ///
    /// # Example
    /// ```
    /// use abg_core::frame::FrameBuffer;
    /// let fb = FrameBuffer::filled(2, 3, (10, 20, 30));
    /// assert_eq!(fb.pixel(1, 2), (10, 20, 30, 255));
    /// ```
    #[must_use]
    pub fn filled(width: u32, height: u32, rgb: Rgb) -> Self {
        let mut fb = Self::new(width, height);
        for px in fb.data.chunks_exact_mut(4) {
            px.copy_from_slice(&[rgb.0, rgb.1, rgb.2, 255]);
        }
        fb
    }

    /// Accès au pixel (x, y) → (r, g, b, a).
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> (u8, u8, u8, u8) {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        if idx + 3 >= self.data.len() {
            return (0, 0, 0, 0);
        }
        (
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        )
    }

    /// Écrit le pixel (x, y), alpha opaque. Hors limites = no-op.
    #[inline(always)]
    pub fn put_pixel(&mut self, x: u32, y: u32, rgb: Rgb) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        self.data[idx..idx + 4].copy_from_slice(&[rgb.0, rgb.1, rgb.2, 255]);
    }

    /// Luminance perceptuelle [0.0, 1.0] du pixel (x, y).
    #[inline(always)]
    #[must_use]
    pub fn luminance(&self, x: u32, y: u32) -> f32 {
        let (r, g, b, _) = self.pixel(x, y);
        luma(r, g, b)
    }
}

/// Aggregate of one source region: mean luminance and mean color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    /// Mean luminance in [0.0, 1.0], after brightness/contrast.
    pub luminance: f32,
    /// Mean source color, untouched by brightness/contrast.
    pub color: Rgb,
}

/// Character grid size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridDimensions {
    /// Number of columns.
    pub cols: u32,
    /// Number of rows.
    pub rows: u32,
}

/// Largest frame accepted, in cells, decoration included.
pub const MAX_FRAME_CELLS: u64 = 1 << 28;

impl GridDimensions {
    /// Number of cells.
    #[must_use]
    pub fn cell_count(self) -> usize {
        self.cols as usize * self.rows as usize
    }

    /// Frame size once `per_side` decoration cells surround the grid.
    ///
    /// `None` if a side overflows `u32` or the frame exceeds [`MAX_FRAME_CELLS`].
    ///
    /// # Example
    /// ```
    /// use abg_core::frame::GridDimensions;
    /// let grid = GridDimensions { cols: 10, rows: 5 };
    /// assert_eq!(grid.decorated(3), Some((16, 11)));
    /// assert_eq!(GridDimensions { cols: u32::MAX, rows: 1 }.decorated(1), None);
    /// ```
    #[must_use]
    pub fn decorated(self, per_side: u32) -> Option<(u32, u32)> {
        let margin = per_side.checked_mul(2)?;
        let width = self.cols.checked_add(margin)?;
        let height = self.rows.checked_add(margin)?;
        (u64::from(width) * u64::from(height) <= MAX_FRAME_CELLS).then_some((width, height))
    }
}

/// Single cell of an [`AsciiFrame`].
///
/// # Example
/// ```
/// use abg_core::frame::AsciiCell;
/// let cell = AsciiCell::default();
/// assert_eq!(cell.ch, ' ');
/// assert_eq!(cell.bg, None);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AsciiCell {
    /// Caractère à afficher.
    pub ch: char,
    /// Couleur foreground (RGB).
    pub fg: Rgb,
    /// Couleur background. `None` = transparent / fond par défaut.
    pub bg: Option<Rgb>,
}

impl Default for AsciiCell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: crate::color::WHITE,
            bg: None,
        }
    }
}

/// Finished character grid with its decoration metadata.
///
/// `width`/`height` include padding and border; `content` is the size of the
/// converted image area inside them.
///
/// # Example
/// ```
/// use abg_core::frame::{AsciiCell, AsciiFrame, GridDimensions};
/// let content = GridDimensions { cols: 3, rows: 2 };
/// let mut frame = AsciiFrame::new(content, 1, 1);
/// assert_eq!((frame.width, frame.height), (7, 6));
/// frame.set(0, 0, AsciiCell { ch: '#', ..AsciiCell::default() });
/// assert_eq!(frame.get(0, 0).ch, '#');
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AsciiFrame {
    /// Flat array of cells, row-major.
    pub cells: Vec<AsciiCell>,
    /// Total width in characters.
    pub width: u32,
    /// Total height in characters.
    pub height: u32,
    /// Size of the converted area.
    pub content: GridDimensions,
    /// Border ring thickness in cells (0 or 1).
    pub border: u32,
    /// Blank cells between content and border, on each side.
    pub padding: u32,
}

impl AsciiFrame {
    /// Allocate a blank frame large enough for `content` plus decoration.
    ///
    /// # Panics
    /// Panics on `u32` overflow; sizes coming from [`GridDimensions::decorated`]
    /// never overflow.
    #[must_use]
    pub fn new(content: GridDimensions, padding: u32, border: u32) -> Self {
        let margin = 2 * (padding + border);
        let width = content.cols + margin;
        let height = content.rows + margin;
        Self {
            cells: vec![AsciiCell::default(); width as usize * height as usize],
            width,
            height,
            content,
            border,
            padding,
        }
    }

    /// Offset of the content area from the top-left corner.
    #[must_use]
    pub fn content_offset(&self) -> u32 {
        self.padding + self.border
    }

    /// Set a cell at position (x, y).
    #[inline(always)]
    pub fn set(&mut self, x: u32, y: u32, cell: AsciiCell) {
        let idx = y as usize * self.width as usize + x as usize;
        self.cells[idx] = cell;
    }

    /// Get a cell reference at position (x, y).
    #[inline(always)]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> &AsciiCell {
        &self.cells[y as usize * self.width as usize + x as usize]
    }

    /// Rows of cells, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[AsciiCell]> {
        self.cells.chunks(self.width.max(1) as usize)
    }

    /// Characters only, one line per row, joined with `\n`.
    ///
    /// # Example
    /// ```
    /// use abg_core::frame::{AsciiCell, AsciiFrame, GridDimensions};
    /// let mut frame = AsciiFrame::new(GridDimensions { cols: 2, rows: 2 }, 0, 0);
    /// frame.set(1, 1, AsciiCell { ch: '@', ..AsciiCell::default() });
    /// assert_eq!(frame.to_plain_text(), "  \n @");
    /// ```
    #[must_use]
    pub fn to_plain_text(&self) -> String {
        self.rows()
            .map(|row| row.iter().map(|c| c.ch).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
