use std::io::{self, Write};

use abg_core::color::Rgb;
use abg_core::frame::AsciiFrame;
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};

#[inline]
fn term_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.0,
        g: rgb.1,
        b: rgb.2,
    }
}

/// Écrit une frame en texte ANSI truecolor, une ligne par rangée.
///
/// Escapes are only emitted when the style changes; a background escape is
/// written only for cells that have one. Every line ends with a reset.
///
/// # Errors
/// Propagates I/O errors from `out`.
pub fn write_ansi<W: Write>(frame: &AsciiFrame, out: &mut W) -> io::Result<()> {
    for row in frame.rows() {
        let mut current: Option<(Rgb, Option<Rgb>)> = None;
        for cell in row {
            let style = (cell.fg, cell.bg);
            if current != Some(style) {
                // Un fond actif doit être effacé avant une cellule transparente.
                if current.is_some_and(|(_, bg)| bg.is_some()) && cell.bg.is_none() {
                    queue!(out, ResetColor)?;
                }
                queue!(out, SetForegroundColor(term_color(cell.fg)))?;
                if let Some(bg) = cell.bg {
                    queue!(out, SetBackgroundColor(term_color(bg)))?;
                }
                current = Some(style);
            }
            queue!(out, Print(cell.ch))?;
        }
        queue!(out, ResetColor, Print('\n'))?;
    }
    out.flush()
}

/// [`write_ansi`] into a `String`.
///
/// # Example
/// ```
/// use abg_core::frame::{AsciiCell, AsciiFrame, GridDimensions};
/// use abg_export::ansi::to_ansi_string;
///
/// let mut frame = AsciiFrame::new(GridDimensions { cols: 1, rows: 1 }, 0, 0);
/// frame.set(0, 0, AsciiCell { ch: '@', fg: (255, 0, 0), bg: None });
/// let text = to_ansi_string(&frame);
/// assert!(text.contains("\x1b[38;2;255;0;0m@"));
/// ```
#[must_use]
pub fn to_ansi_string(frame: &AsciiFrame) -> String {
    let mut buf = Vec::new();
    // Vec<u8> n'échoue jamais en écriture.
    if let Err(e) = write_ansi(frame, &mut buf) {
        log::error!("Écriture ANSI en mémoire impossible : {e}");
    }
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use abg_core::frame::{AsciiCell, GridDimensions};

    fn frame(cells: &[AsciiCell], cols: u32, rows: u32) -> AsciiFrame {
        let mut f = AsciiFrame::new(GridDimensions { cols, rows }, 0, 0);
        f.cells.copy_from_slice(cells);
        f
    }

    #[test]
    fn one_line_per_row() {
        let cell = AsciiCell::default();
        let text = to_ansi_string(&frame(&[cell; 6], 3, 2));
        assert_eq!(text.matches('\n').count(), 2);
        assert_eq!(text.matches("\x1b[0m").count(), 2);
    }

    #[test]
    fn background_escape_only_when_present() {
        let plain = AsciiCell {
            ch: 'a',
            fg: (1, 2, 3),
            bg: None,
        };
        let text = to_ansi_string(&frame(&[plain], 1, 1));
        assert!(text.contains("\x1b[38;2;1;2;3m"));
        assert!(!text.contains("48;2"));

        let filled = AsciiCell {
            bg: Some((9, 8, 7)),
            ..plain
        };
        let text = to_ansi_string(&frame(&[filled], 1, 1));
        assert!(text.contains("\x1b[48;2;9;8;7m"));
    }

    #[test]
    fn runs_share_escapes() {
        let red = AsciiCell {
            ch: '#',
            fg: (255, 0, 0),
            bg: None,
        };
        let text = to_ansi_string(&frame(&[red; 4], 4, 1));
        assert_eq!(text.matches("38;2;255;0;0").count(), 1);
        assert!(text.contains("####"));
    }

    #[test]
    fn transparent_after_filled_resets() {
        let filled = AsciiCell {
            ch: 'x',
            fg: (0, 0, 0),
            bg: Some((255, 255, 255)),
        };
        let plain = AsciiCell { bg: None, ..filled };
        let text = to_ansi_string(&frame(&[filled, plain], 2, 1));
        let bg_pos = text.find("48;2").unwrap();
        let reset_pos = text[bg_pos..].find("\x1b[0m").unwrap() + bg_pos;
        let second_x = text.rfind('x').unwrap();
        assert!(reset_pos < second_x);
    }
}
