use ab_glyph::{Font, FontRef, PxScale, point};
use abg_core::color::Rgb;
use abg_core::error::{CoreError, Result};
use abg_core::frame::{AsciiFrame, FrameBuffer};
use rayon::prelude::*;
use std::collections::HashMap;

/// How big one character cell is, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellGeometry {
    /// Advance of 'M' × line height, at `font_size`.
    FontMetrics,
    /// Imposed cell; the glyph scale shrinks until it fits.
    Fixed {
        /// Cell width in pixels.
        width: u32,
        /// Cell height in pixels.
        height: u32,
    },
}

/// Convertit une AsciiFrame en pixels RGBA.
/// Les glyphes sont rasterisés une seule fois puis réutilisés (cache alpha par caractère).
pub struct Rasterizer {
    char_width: u32,
    char_height: u32,
    /// Maps a char to its 1D alpha buffer (size = char_width * char_height)
    glyph_cache: HashMap<char, Vec<u8>>,
    /// Fallback for glyphs missing from the font (all zeros).
    empty_glyph: Vec<u8>,
}

impl Rasterizer {
    /// Rasterise `chars` avec la police fournie.
    ///
    /// Characters the font does not cover render as blank cells.
    ///
    /// # Errors
    /// Returns [`CoreError::Render`] if the font data is invalid.
    pub fn new(
        font_data: &[u8],
        font_size: f32,
        geometry: CellGeometry,
        chars: impl IntoIterator<Item = char>,
    ) -> Result<Self> {
        let font = FontRef::try_from_slice(font_data)
            .map_err(|e| CoreError::Render(format!("police invalide : {e}")))?;

        let units = font.height_unscaled();
        let line_ratio = (font.ascent_unscaled() - font.descent_unscaled() + font.line_gap_unscaled()) / units;
        let m_advance = font.h_advance_unscaled(font.glyph_id('M')) / units;
        // Police sans 'M' : largeur monospace usuelle.
        let advance_ratio = if m_advance > 0.0 { m_advance } else { 0.6 };

        let (char_width, char_height, scale_px) = match geometry {
            CellGeometry::FontMetrics => (
                (advance_ratio * font_size).ceil() as u32,
                (line_ratio * font_size).ceil() as u32,
                font_size,
            ),
            CellGeometry::Fixed { width, height } => {
                let fit = (height as f32 / line_ratio).min(width as f32 / advance_ratio);
                (width, height, fit)
            }
        };
        let char_width = char_width.max(1);
        let char_height = char_height.max(1);

        let mut rasterizer = Self {
            char_width,
            char_height,
            glyph_cache: HashMap::new(),
            empty_glyph: vec![0u8; (char_width * char_height) as usize],
        };

        let scale = PxScale::from(scale_px);
        // Glyph centered in the cell: horizontally on its advance, vertically on the line box.
        let x_off = ((char_width as f32 - advance_ratio * scale_px) / 2.0).max(0.0);
        let y_off = ((char_height as f32 - line_ratio * scale_px) / 2.0).max(0.0);
        let baseline = y_off + font.ascent_unscaled() * scale_px / units;

        for ch in chars {
            if !rasterizer.glyph_cache.contains_key(&ch) {
                rasterizer.cache_glyph(&font, scale, ch, x_off, baseline);
            }
        }
        log::debug!(
            "Rasterizer : cellule {char_width}×{char_height} px, échelle {scale_px:.1}, {} glyphes",
            rasterizer.glyph_cache.len()
        );

        Ok(rasterizer)
    }

    /// Rasterizer for every glyph appearing in `frame`.
    ///
    /// # Errors
    /// Returns [`CoreError::Render`] if the font data is invalid.
    pub fn for_frame(font_data: &[u8], font_size: f32, geometry: CellGeometry, frame: &AsciiFrame) -> Result<Self> {
        Self::new(font_data, font_size, geometry, frame.cells.iter().map(|c| c.ch))
    }

    fn cache_glyph(&mut self, font: &FontRef, scale: PxScale, ch: char, x_off: f32, baseline: f32) {
        // glyph_id 0 = .notdef : on laisse la cellule vide plutôt qu'un carré.
        let gid = font.glyph_id(ch);
        if gid.0 == 0 {
            if !ch.is_whitespace() {
                log::warn!("Glyphe absent de la police : {ch:?}");
            }
            return;
        }

        let mut buffer = vec![0u8; (self.char_width * self.char_height) as usize];
        let glyph = gid.with_scale_and_position(scale, point(x_off, baseline));

        if let Some(outline) = font.outline_glyph(glyph) {
            let bounds = outline.px_bounds();
            #[allow(clippy::cast_possible_wrap)]
            outline.draw(|x, y, v| {
                let px = x as i32 + bounds.min.x as i32;
                let py = y as i32 + bounds.min.y as i32;
                if px >= 0 && py >= 0 && (px as u32) < self.char_width && (py as u32) < self.char_height {
                    let idx = (py as u32 * self.char_width + px as u32) as usize;
                    buffer[idx] = buffer[idx].max((v * 255.0).round() as u8);
                }
            });
        }
        self.glyph_cache.insert(ch, buffer);
    }

    /// Calcule les dimensions du FrameBuffer pour une frame donnée.
    #[must_use]
    pub fn target_dimensions(&self, frame: &AsciiFrame) -> (u32, u32) {
        (frame.width * self.char_width, frame.height * self.char_height)
    }

    /// Rendu de la frame, une bande de pixels par rangée de cellules. Parallélisé.
    ///
    /// Cells without a background are drawn over `canvas`.
    #[must_use]
    pub fn render(&self, frame: &AsciiFrame, canvas: Rgb) -> FrameBuffer {
        let (width, height) = self.target_dimensions(frame);
        let mut fb = FrameBuffer::new(width, height);
        if width == 0 || height == 0 {
            return fb;
        }

        let empty_glyph = &self.empty_glyph;
        let stride = (width * 4) as usize;
        let band_size = stride * self.char_height as usize;
        let cw = self.char_width as usize;

        fb.data
            .par_chunks_exact_mut(band_size)
            .zip(frame.rows().collect::<Vec<_>>())
            .for_each(|(band, row)| {
                for (gx, cell) in row.iter().enumerate() {
                    let alpha_map = self.glyph_cache.get(&cell.ch).unwrap_or(empty_glyph);
                    let bg = cell.bg.unwrap_or(canvas);
                    let cx_start = gx * cw;

                    for cy in 0..(self.char_height as usize) {
                        let fb_y_offset = cy * stride;
                        for cx in 0..cw {
                            let alpha_f = f32::from(alpha_map[cy * cw + cx]) / 255.0;
                            let blend = |f: u8, b: u8| (f32::from(f) * alpha_f + f32::from(b) * (1.0 - alpha_f)).round() as u8;

                            let px_idx = fb_y_offset + (cx_start + cx) * 4;
                            band[px_idx] = blend(cell.fg.0, bg.0);
                            band[px_idx + 1] = blend(cell.fg.1, bg.1);
                            band[px_idx + 2] = blend(cell.fg.2, bg.2);
                            band[px_idx + 3] = 255;
                        }
                    }
                }
            });
        fb
    }

    /// Render onto a `width × height` canvas, grid centered, overflow cropped.
    #[must_use]
    pub fn render_to_size(&self, frame: &AsciiFrame, canvas: Rgb, width: u32, height: u32) -> FrameBuffer {
        let rendered = self.render(frame, canvas);
        let mut target = FrameBuffer::filled(width, height, canvas);
        place_centered(&rendered, &mut target);
        target
    }

    #[cfg(test)]
    fn from_glyphs(char_width: u32, char_height: u32, glyph_cache: HashMap<char, Vec<u8>>) -> Self {
        Self {
            char_width,
            char_height,
            glyph_cache,
            empty_glyph: vec![0u8; (char_width * char_height) as usize],
        }
    }
}

/// Copy `src` into the middle of `dst`. Parts falling outside `dst` are dropped.
pub fn place_centered(src: &FrameBuffer, dst: &mut FrameBuffer) {
    let off_x = (i64::from(dst.width) - i64::from(src.width)) / 2;
    let off_y = (i64::from(dst.height) - i64::from(src.height)) / 2;

    for sy in 0..src.height {
        let dy = i64::from(sy) + off_y;
        if dy < 0 || dy >= i64::from(dst.height) {
            continue;
        }
        // Intersection horizontale de la rangée.
        let sx_start = (-off_x).max(0);
        let sx_end = i64::from(src.width).min(i64::from(dst.width) - off_x);
        if sx_start >= sx_end {
            continue;
        }
        let src_row = sy as usize * src.width as usize;
        let dst_row = dy as usize * dst.width as usize;
        let s = (src_row + sx_start as usize) * 4;
        let e = (src_row + sx_end as usize) * 4;
        let d = (dst_row + (sx_start + off_x) as usize) * 4;
        dst.data[d..d + (e - s)].copy_from_slice(&src.data[s..e]);
    }
}
