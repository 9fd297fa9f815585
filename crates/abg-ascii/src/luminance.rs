use abg_core::charset::Charset;

/// Pick the glyph for a cell luminance.
///
/// Dark regions take the dense end of the ramp: the density level fed to
/// the charset is `1 - luminance`. Pass an already inverted charset to flip
/// that relation.
///
/// # Example
/// ```
/// use abg_core::charset::Charset;
/// use abg_ascii::luminance::glyph_for_luminance;
///
/// let cs = Charset::custom(" .:#@").unwrap();
/// assert_eq!(glyph_for_luminance(&cs, 0.0), '@');
/// assert_eq!(glyph_for_luminance(&cs, 1.0), ' ');
/// ```
#[inline]
#[must_use]
pub fn glyph_for_luminance(charset: &Charset, luminance: f32) -> char {
    charset.char_for_density(1.0 - luminance)
}
