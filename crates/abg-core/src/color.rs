use crate::error::{CoreError, Result};

/// 8-bit RGB triple.
pub type Rgb = (u8, u8, u8);

/// White, the default glyph color.
pub const WHITE: Rgb = (255, 255, 255);

/// Black, the default canvas color.
pub const BLACK: Rgb = (0, 0, 0);

const NAMED_COLORS: &[(&str, Rgb)] = &[
    ("black", (0, 0, 0)),
    ("white", (255, 255, 255)),
    ("red", (255, 0, 0)),
    ("green", (0, 255, 0)),
    ("blue", (0, 0, 255)),
    ("yellow", (255, 255, 0)),
    ("cyan", (0, 255, 255)),
    ("magenta", (255, 0, 255)),
    ("gray", (128, 128, 128)),
    ("grey", (128, 128, 128)),
];

/// Convertit RGB [0,255] → HSV. H ∈ [0.0, 1.0), S ∈ [0.0, 1.0], V ∈ [0.0, 1.0].
///
/// # Example
/// ```
/// use abg_core::color::rgb_to_hsv;
/// let (h, s, v) = rgb_to_hsv(255, 0, 0);
/// assert!((h - 0.0).abs() < 0.01);
/// assert!((s - 1.0).abs() < 0.01);
/// assert!((v - 1.0).abs() < 0.01);
/// ```
#[must_use]
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let r = f32::from(r) / 255.0;
    let g = f32::from(g) / 255.0;
    let b = f32::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let v = max;
    let s = if max == 0.0 { 0.0 } else { delta / max };
    let h = if delta == 0.0 {
        0.0
    } else if (max - r).abs() < f32::EPSILON {
        (((g - b) / delta) % 6.0) / 6.0
    } else if (max - g).abs() < f32::EPSILON {
        ((b - r) / delta + 2.0) / 6.0
    } else {
        ((r - g) / delta + 4.0) / 6.0
    };
    let h = if h < 0.0 { h + 1.0 } else { h };

    (h, s, v)
}

/// Convertit HSV → RGB [0,255]. H est replié dans [0.0, 1.0).
///
/// # Example
/// ```
/// use abg_core::color::hsv_to_rgb;
/// assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), (255, 0, 0));
/// assert_eq!(hsv_to_rgb(1.0, 1.0, 1.0), (255, 0, 0));
/// ```
#[must_use]
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb {
    let h = h.rem_euclid(1.0) * 6.0;
    let i = h.floor() as u32;
    let f = h - i as f32;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match i % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    (
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
    )
}

/// Linear blend `a → b` at `t` ∈ [0, 1]. Exact at both ends.
#[must_use]
pub fn lerp_rgb(a: Rgb, b: Rgb, t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| -> u8 {
        let x = f32::from(x);
        let y = f32::from(y);
        (x + (y - x) * t).round().clamp(0.0, 255.0) as u8
    };
    (mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Luma BT.601 normalisée [0.0, 1.0].
///
/// # Example
/// ```
/// use abg_core::color::luma;
/// assert_eq!(luma(0, 0, 0), 0.0);
/// assert!((luma(255, 255, 255) - 1.0).abs() < 1e-6);
/// assert!(luma(0, 255, 0) > luma(255, 0, 0));
/// ```
#[inline(always)]
#[must_use]
pub fn luma(r: u8, g: u8, b: u8) -> f32 {
    (0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b)) / 255.0
}

/// Parse `#RRGGBB`, `RRGGBB` or a basic color name.
///
/// # Errors
/// Returns [`CoreError::Config`] for anything else.
///
/// # Example
/// ```
/// use abg_core::color::parse_color;
/// assert_eq!(parse_color("#ff8000").unwrap(), (255, 128, 0));
/// assert_eq!(parse_color("Cyan").unwrap(), (0, 255, 255));
/// assert!(parse_color("#ff80").is_err());
/// ```
pub fn parse_color(input: &str) -> Result<Rgb> {
    let s = input.trim();
    let lower = s.to_ascii_lowercase();
    if let Some(&(_, rgb)) = NAMED_COLORS.iter().find(|(name, _)| *name == lower) {
        return Ok(rgb);
    }

    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CoreError::Config(format!(
            "couleur inconnue '{input}' (format #RRGGBB ou nom : black, white, red, green, blue, yellow, cyan, magenta, gray)"
        )));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .map_err(|e| CoreError::Config(format!("couleur '{input}' : {e}")))
    };
    Ok((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Format as lowercase `#rrggbb`.
#[must_use]
pub fn to_hex(rgb: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb.0, rgb.1, rgb.2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_hsv_roundtrip() {
        for r in (0..=255).step_by(51) {
            for g in (0..=255).step_by(51) {
                for b in (0..=255).step_by(51) {
                    let (r, g, b) = (r as u8, g as u8, b as u8);
                    let (h, s, v) = rgb_to_hsv(r, g, b);
                    let (r2, g2, b2) = hsv_to_rgb(h, s, v);
                    assert!((i16::from(r) - i16::from(r2)).abs() <= 1, "R {r} vs {r2}");
                    assert!((i16::from(g) - i16::from(g2)).abs() <= 1, "G {g} vs {g2}");
                    assert!((i16::from(b) - i16::from(b2)).abs() <= 1, "B {b} vs {b2}");
                }
            }
        }
    }

    #[test]
    fn lerp_is_exact_at_ends() {
        let a = (10, 200, 30);
        let b = (250, 0, 90);
        assert_eq!(lerp_rgb(a, b, 0.0), a);
        assert_eq!(lerp_rgb(a, b, 1.0), b);
        assert_eq!(lerp_rgb((0, 0, 0), (200, 100, 50), 0.5), (100, 50, 25));
    }

    #[test]
    fn hex_roundtrip() {
        assert_eq!(to_hex((255, 0, 171)), "#ff00ab");
        assert_eq!(parse_color(&to_hex((1, 2, 3))).unwrap(), (1, 2, 3));
        assert_eq!(parse_color("00FF00").unwrap(), (0, 255, 0));
    }

    #[test]
    fn parse_rejects_garbage() {
        for bad in ["", "#", "#12345g", "orange", "#1234567"] {
            assert!(matches!(parse_color(bad), Err(CoreError::Config(_))), "{bad}");
        }
    }
}
