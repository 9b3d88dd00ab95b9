//! Bitmap text for chart labels, drawn with the 8x8 glyphs of `font8x8`
//!
//! Coordinates are signed so labels may start off-canvas; pixels outside
//! the image are clipped.

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgb, RgbImage};

/// Glyph edge length in pixels at scale 1
pub const GLYPH_SIZE: u32 = 8;

/// Rendered width of `text` at `scale`
pub fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH_SIZE * scale
}

/// `text` shortened to fit `max_width` pixels, ending in ".." when cut
pub fn fit(text: &str, max_width: u32, scale: u32) -> String {
    let capacity = (max_width / (GLYPH_SIZE * scale.max(1))) as usize;
    if text.chars().count() <= capacity {
        return text.to_string();
    }
    if capacity <= 2 {
        return text.chars().take(capacity).collect();
    }
    let mut cut: String = text.chars().take(capacity - 2).collect();
    cut.push_str("..");
    cut
}

/// Draw `text` left to right with its top-left corner at (`x`, `y`)
pub fn draw_text(canvas: &mut RgbImage, x: i64, y: i64, text: &str, scale: u32, colour: Rgb<u8>) {
    let step = i64::from(GLYPH_SIZE * scale);
    let scale = i64::from(scale);
    for (index, c) in text.chars().enumerate() {
        let origin = x + index as i64 * step;
        for_each_set_bit(c, |col, row| {
            fill_block(canvas, origin + col * scale, y + row * scale, scale, colour);
        });
    }
}

/// Draw `text` turned a quarter counter-clockwise so it reads bottom to top
///
/// (`x`, `y`) is the bottom-left corner of the rotated text block.
pub fn draw_text_vertical(
    canvas: &mut RgbImage,
    x: i64,
    y: i64,
    text: &str,
    scale: u32,
    colour: Rgb<u8>,
) {
    let glyph = i64::from(GLYPH_SIZE);
    let scale = i64::from(scale);
    for (index, c) in text.chars().enumerate() {
        let offset = index as i64 * glyph;
        for_each_set_bit(c, |col, row| {
            let px = x + row * scale;
            let py = y - (offset + col + 1) * scale;
            fill_block(canvas, px, py, scale, colour);
        });
    }
}

/// Bitmap for `c`, falling back to `?` for characters the font lacks
fn glyph(c: char) -> [u8; 8] {
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

// Each byte is one row, top first; bit 0 is the leftmost pixel
fn for_each_set_bit(c: char, mut f: impl FnMut(i64, i64)) {
    for (row, bits) in glyph(c).iter().enumerate() {
        for col in 0..GLYPH_SIZE {
            if bits & (1 << col) != 0 {
                f(i64::from(col), row as i64);
            }
        }
    }
}

fn fill_block(canvas: &mut RgbImage, x: i64, y: i64, size: i64, colour: Rgb<u8>) {
    let (width, height) = (i64::from(canvas.width()), i64::from(canvas.height()));
    for py in y.max(0)..(y + size).min(height) {
        for px in x.max(0)..(x + size).min(width) {
            canvas.put_pixel(px as u32, py as u32, colour);
        }
    }
}
