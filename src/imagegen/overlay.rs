//! Burns a title and date into generated images.
//!
//! Text is drawn with the 8x8 bitmap glyphs from `font8x8` so no font file
//! has to ship alongside the binary.

use font8x8::{BASIC_FONTS, LATIN_FONTS, UnicodeFonts};
use image::{DynamicImage, Rgba, RgbaImage};

/// Overlay fill colour.
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Each glyph pixel becomes a `GLYPH_SCALE` x `GLYPH_SCALE` block.
pub const GLYPH_SCALE: u32 = 2;

/// Horizontal and vertical inset of the title.
pub const MARGIN: i64 = 10;

const GLYPH_SIZE: i64 = 8;

/// Where the date goes relative to the title.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DatePlacement {
    /// 30px above the bottom edge
    BottomLeft,
    /// Fixed 40px from the top, under the title
    BelowTitle,
}

impl DatePlacement {
    fn origin(self, height: u32) -> (i64, i64) {
        match self {
            Self::BottomLeft => (MARGIN, i64::from(height) - 30),
            Self::BelowTitle => (MARGIN, 40),
        }
    }
}

/// Today's date as `YYYY-MM-DD` in local time.
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

fn glyph(c: char) -> [u8; 8] {
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

/// Draws `text` with its top-left corner at (`x`, `y`). Pixels outside the
/// image are skipped, so text may run off any edge.
pub fn draw_text(image: &mut RgbaImage, x: i64, y: i64, text: &str, scale: u32, color: Rgba<u8>) {
    let scale = i64::from(scale.max(1));
    let (width, height) = (i64::from(image.width()), i64::from(image.height()));

    for (index, c) in text.chars().enumerate() {
        let Ok(index) = i64::try_from(index) else {
            break;
        };
        let left = x + index * GLYPH_SIZE * scale;
        if left >= width {
            break;
        }
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_SIZE {
                if bits & (1u8 << col) == 0 {
                    continue;
                }
                let row = row as i64;
                for dy in 0..scale {
                    for dx in 0..scale {
                        let px = left + col * scale + dx;
                        let py = y + row * scale + dy;
                        if (0..width).contains(&px) && (0..height).contains(&py) {
                            image.put_pixel(px as u32, py as u32, color);
                        }
                    }
                }
            }
        }
    }
}

/// Stamps `title` in the top-left corner and `date` at `placement`, in white.
pub fn stamp(
    image: DynamicImage,
    title: &str,
    date: &str,
    placement: DatePlacement,
) -> DynamicImage {
    let mut canvas = image.into_rgba8();
    draw_text(&mut canvas, MARGIN, MARGIN, title, GLYPH_SCALE, WHITE);
    let (x, y) = placement.origin(canvas.height());
    draw_text(&mut canvas, x, y, date, GLYPH_SCALE, WHITE);
    DynamicImage::ImageRgba8(canvas)
}
