//! Built-in 5x7 bitmap font, so overlays need no font file on disk.
//!
//! Letters render uppercase. Characters without a glyph render as `?`.

use image::Rgb;
use imageproc::drawing::Canvas;

pub const GLYPH_WIDTH: u32 = 5;
pub const GLYPH_HEIGHT: u32 = 7;
/// Horizontal advance per character, in unscaled pixels.
const ADVANCE: u32 = GLYPH_WIDTH + 1;

/// Rows top to bottom, bit 4 is the leftmost column.
fn glyph(c: char) -> [u8; 7] {
    match c.to_ascii_uppercase() {
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ' ' => [0x00; 7],
        _ => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04],
    }
}

/// Rendered width of `text` at `scale`, excluding trailing spacing.
pub fn text_width(text: &str, scale: u32) -> u32 {
    let n = text.chars().count() as u32;
    if n == 0 {
        0
    } else {
        (n * ADVANCE - 1) * scale
    }
}

/// Draw `text` with its baseline-left corner at `(x, baseline)`.
///
/// Glyphs occupy the `GLYPH_HEIGHT * scale` rows above the baseline. Pixels
/// falling outside the canvas are skipped.
pub fn draw_text<C>(canvas: &mut C, text: &str, x: i32, baseline: i32, scale: u32, color: Rgb<u8>)
where
    C: Canvas<Pixel = Rgb<u8>>,
{
    let (width, height) = canvas.dimensions();
    let scale = scale.max(1) as i32;
    let top = baseline - GLYPH_HEIGHT as i32 * scale;

    for (i, c) in text.chars().enumerate() {
        let origin_x = x + i as i32 * ADVANCE as i32 * scale;
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_WIDTH as i32 {
                if (bits >> (GLYPH_WIDTH as i32 - 1 - col)) & 1 == 0 {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        let px = origin_x + col * scale + dx;
                        let py = top + row as i32 * scale + dy;
                        if px >= 0 && py >= 0 && (px as u32) < width && (py as u32) < height {
                            canvas.draw_pixel(px as u32, py as u32, color);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    const RED: Rgb<u8> = Rgb([255, 0, 0]);

    fn lit(img: &RgbImage) -> Vec<(u32, u32)> {
        img.enumerate_pixels()
            .filter(|(_, _, p)| p.0 != [0, 0, 0])
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn test_text_sits_above_baseline() {
        let mut img = RgbImage::new(60, 40);
        draw_text(&mut img, "HI", 5, 30, 2, RED);
        let pixels = lit(&img);
        assert!(!pixels.is_empty());
        assert!(pixels.iter().all(|&(_, y)| (16..30).contains(&y)));
        assert!(pixels.iter().all(|&(x, _)| x >= 5 && x < 5 + text_width("HI", 2)));
    }

    #[test]
    fn test_lowercase_renders_like_uppercase() {
        let mut lower = RgbImage::new(40, 20);
        let mut upper = RgbImage::new(40, 20);
        draw_text(&mut lower, "sad", 1, 10, 1, RED);
        draw_text(&mut upper, "SAD", 1, 10, 1, RED);
        assert_eq!(lower, upper);
    }

    #[test]
    fn test_off_canvas_text_is_clipped_without_panic() {
        let mut img = RgbImage::new(20, 20);
        draw_text(&mut img, "ANGRY", -10, 3, 3, RED);
        draw_text(&mut img, "FEAR", 15, 100, 3, RED);
        draw_text(&mut img, "SAD", 5, -50, 3, RED);
        // only the rows between 0 and baseline 3 may be lit
        assert!(lit(&img).iter().all(|&(_, y)| y < 3));
    }

    #[test]
    fn test_space_draws_nothing() {
        let mut img = RgbImage::new(20, 20);
        draw_text(&mut img, "   ", 0, 10, 1, RED);
        assert!(lit(&img).is_empty());
    }

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("", 3), 0);
        assert_eq!(text_width("A", 1), 5);
        assert_eq!(text_width("AB", 2), 22);
    }

    #[test]
    fn test_every_label_char_has_a_glyph() {
        let fallback = glyph('~');
        for label in crate::shared::constants::EMOTION_LABELS {
            for c in label.chars() {
                assert_ne!(glyph(c), fallback, "missing glyph for {c:?}");
            }
        }
        for c in "FPS: 0123456789-".chars() {
            assert_ne!(glyph(c), fallback, "missing glyph for {c:?}");
        }
    }
}
