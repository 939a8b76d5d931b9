//! Procedural text labels
//!
//! Rasterizes short strings into an RGBA image with the `font8x8` bitmap
//! font, so floating set-pieces can carry captions without any font file.
//! Characters outside basic ASCII render as `?`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use font8x8::legacy::BASIC_LEGACY;
use image::{Rgba, RgbaImage};

use crate::config::Color;

/// Glyph cell size; the glyphs carry their own spacing column.
const GLYPH_SIZE: u32 = 8;
const MAX_GLYPH_SCALE: u32 = 3;
const MARGIN: u32 = 8;

static NEXT_LABEL_ID: AtomicU64 = AtomicU64::new(1);

/// Rows top to bottom; bit 0 is the leftmost column.
fn glyph(c: char) -> [u8; 8] {
    let index = c as usize;
    if index < BASIC_LEGACY.len() {
        BASIC_LEGACY[index]
    } else {
        BASIC_LEGACY[b'?' as usize]
    }
}

/// A rasterized caption, shared between the scene and the renderer.
#[derive(Debug, Clone)]
pub struct LabelTexture {
    id: u64,
    pub text: String,
    pub image: Arc<RgbaImage>,
}

impl LabelTexture {
    #[must_use]
    pub fn new(text: &str, color: Color, width: u32, height: u32) -> Self {
        Self {
            id: NEXT_LABEL_ID.fetch_add(1, Ordering::Relaxed),
            text: text.to_string(),
            image: Arc::new(rasterize_label(text, color, width, height)),
        }
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Draws `text` centred on a transparent `width × height` canvas.
///
/// The glyph scale is the largest integer (up to 3) that still fits the
/// whole string inside the margins; it never drops below 1, so very long
/// strings are clipped at the edges instead.
#[must_use]
pub fn rasterize_label(text: &str, color: Color, width: u32, height: u32) -> RgbaImage {
    let mut canvas = RgbaImage::new(width, height);
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return canvas;
    }

    let run = chars.len() as u32 * GLYPH_SIZE;
    let fit_x = width.saturating_sub(MARGIN * 2) / run;
    let fit_y = height.saturating_sub(MARGIN * 2) / GLYPH_SIZE;
    let scale = fit_x.min(fit_y).clamp(1, MAX_GLYPH_SCALE);

    let ink = Rgba([
        (color.r * 255.0).round() as u8,
        (color.g * 255.0).round() as u8,
        (color.b * 255.0).round() as u8,
        255,
    ]);

    let origin_x = (i64::from(width) - i64::from(run * scale)) / 2;
    let origin_y = (i64::from(height) - i64::from(GLYPH_SIZE * scale)) / 2;

    for (index, c) in chars.iter().enumerate() {
        let rows = glyph(*c);
        let glyph_x = origin_x + i64::from(index as u32 * GLYPH_SIZE * scale);

        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_SIZE {
                if bits & (1 << col) == 0 {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        let x = glyph_x + i64::from(col * scale + dx);
                        let y = origin_y + i64::from(row as u32 * scale + dy);
                        if (0..i64::from(width)).contains(&x) && (0..i64::from(height)).contains(&y) {
                            canvas.put_pixel(x as u32, y as u32, ink);
                        }
                    }
                }
            }
        }
    }

    canvas
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_leaves_canvas_transparent() {
        let img = rasterize_label("   ", Color::WHITE, 64, 16);
        assert!(img.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn ink_is_centred() {
        let img = rasterize_label("I", Color::WHITE, 64, 32);
        let inked: Vec<u32> = img
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0[3] == 255)
            .map(|(x, _, _)| x)
            .collect();
        assert!(!inked.is_empty());
        let min = *inked.iter().min().unwrap();
        let max = *inked.iter().max().unwrap();
        // 'I' sits one column left of its cell: scale 2, so up to 4 px off
        assert!((i64::from(min) - (63 - i64::from(max))).abs() <= 4);
    }

    #[test]
    fn non_ascii_falls_back_to_question_mark() {
        let fallback = rasterize_label("é", Color::WHITE, 64, 32);
        let question = rasterize_label("?", Color::WHITE, 64, 32);
        assert_eq!(fallback.as_raw(), question.as_raw());
        assert!(fallback.pixels().any(|p| p.0[3] == 255));
    }

    #[test]
    fn glyph_bits_read_left_to_right() {
        // 40x24 gives scale 1 and a cell starting at x = 16. 'L' fills
        // columns 0..=6 on its foot row and never column 7.
        let img = rasterize_label("L", Color::WHITE, 40, 24);
        let xs: Vec<u32> = img
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0[3] == 255)
            .map(|(x, _, _)| x)
            .collect();
        assert_eq!(xs.iter().min(), Some(&16));
        assert_eq!(xs.iter().max(), Some(&22));
    }
}
