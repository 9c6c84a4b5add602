use image::{Rgba, RgbaImage};

use crate::comparison::ComparisonSession;
use crate::frame::{CapturedImage, FrameError};

/// Pixel scale for burned-in labels.
const LABEL_SCALE: u32 = 3;

/// Label inset from the panel's top-left corner.
const LABEL_MARGIN: u32 = 20;

/// Combine a comparison session into one side-by-side PNG, before on the
/// left, with the dates burned in as labels.
pub fn compose_side_by_side(session: &ComparisonSession) -> Result<CapturedImage, FrameError> {
    let before = session.before_image.to_rgba()?;
    let after = session.after_image.to_rgba()?;

    let width = before.width() + after.width();
    let height = before.height().max(after.height());
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]));

    image::imageops::replace(&mut canvas, &before, 0, 0);
    image::imageops::replace(&mut canvas, &after, before.width() as i64, 0);

    draw_label(
        &mut canvas,
        LABEL_MARGIN,
        LABEL_MARGIN,
        &format!("BEFORE: {}", session.before_date),
    );
    draw_label(
        &mut canvas,
        before.width() + LABEL_MARGIN,
        LABEL_MARGIN,
        &format!("AFTER: {}", session.after_date),
    );

    CapturedImage::from_rgba(width, height, canvas.as_raw())
}

/// White text with a 1px black outline, like stroked canvas text.
pub fn draw_label(img: &mut RgbaImage, x: u32, y: u32, text: &str) {
    let text = text.to_ascii_uppercase();
    for dy in -1..=1i64 {
        for dx in -1..=1i64 {
            if dx != 0 || dy != 0 {
                draw_text(img, x as i64 + dx, y as i64 + dy, &text, Rgba([0, 0, 0, 255]));
            }
        }
    }
    draw_text(img, x as i64, y as i64, &text, Rgba([255, 255, 255, 255]));
}

fn draw_text(img: &mut RgbaImage, x: i64, y: i64, text: &str, color: Rgba<u8>) {
    let mut pen_x = x;
    for ch in text.chars() {
        if let Some(rows) = glyph(ch) {
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..5u32 {
                    if bits >> (4 - col) & 1 == 1 {
                        fill_cell(
                            img,
                            pen_x + (col * LABEL_SCALE) as i64,
                            y + (row as u32 * LABEL_SCALE) as i64,
                            color,
                        );
                    }
                }
            }
        }
        pen_x += (6 * LABEL_SCALE) as i64;
    }
}

fn fill_cell(img: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    for dy in 0..LABEL_SCALE as i64 {
        for dx in 0..LABEL_SCALE as i64 {
            let (px, py) = (x + dx, y + dy);
            if px >= 0 && py >= 0 && (px as u32) < img.width() && (py as u32) < img.height() {
                img.put_pixel(px as u32, py as u32, color);
            }
        }
    }
}

/// 5x7 glyphs, one row per byte, bit 4 leftmost. Uppercase letters, digits,
/// and the punctuation date labels need.
fn glyph(ch: char) -> Option<[u8; 7]> {
    let rows = match ch {
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
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C],
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
        '-' => [0x00, 0x00, 0x00, 0x0E, 0x00, 0x00, 0x00],
        ':' => [0x00, 0x04, 0x04, 0x00, 0x04, 0x04, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ' ' => [0x00; 7],
        _ => return None,
    };
    Some(rows)
}

#[cfg(test)]
mod tests {
    use foundation::time::IsoDate;
    use image::{Rgba, RgbaImage};

    use super::{compose_side_by_side, draw_label};
    use crate::comparison::ComparisonSession;
    use crate::frame::CapturedImage;

    fn solid_image(width: u32, height: u32, value: u8) -> CapturedImage {
        let rgba: Vec<u8> = (0..width * height)
            .flat_map(|_| [value, value, value, 255])
            .collect();
        CapturedImage::from_rgba(width, height, &rgba).unwrap()
    }

    fn session() -> ComparisonSession {
        ComparisonSession {
            before_image: solid_image(200, 100, 40),
            after_image: solid_image(200, 100, 90),
            before_date: IsoDate::parse("2024-01-01").unwrap(),
            after_date: IsoDate::parse("2024-02-01").unwrap(),
        }
    }

    #[test]
    fn combined_image_is_side_by_side() {
        let combined = compose_side_by_side(&session()).unwrap();
        assert_eq!(combined.width(), 400);
        assert_eq!(combined.height(), 100);

        let rgba = combined.to_rgba().unwrap();
        // Away from the labels, the halves keep their own tones.
        assert_eq!(rgba.get_pixel(100, 90).0[0], 40);
        assert_eq!(rgba.get_pixel(300, 90).0[0], 90);
    }

    #[test]
    fn labels_are_burned_into_both_halves() {
        let combined = compose_side_by_side(&session()).unwrap();
        let rgba = combined.to_rgba().unwrap();

        let has_white = |x0: u32, x1: u32| {
            (x0..x1).any(|x| (20..50).any(|y| rgba.get_pixel(x, y).0 == [255, 255, 255, 255]))
        };
        assert!(has_white(0, 200), "left label missing");
        assert!(has_white(200, 400), "right label missing");
    }

    #[test]
    fn draw_label_clips_at_the_border() {
        let mut img = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]));
        // Mostly off-canvas; must not panic.
        draw_label(&mut img, 8, 8, "2024");
    }
}
