// ============================================================================
// CANVAS PRIMITIVES — solid fills, coverage blending, image placement
// ============================================================================

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

/// Fill an axis-aligned rectangle with an opaque color, clipped to the canvas.
pub fn fill_rect(canvas: &mut RgbaImage, x: i64, y: i64, w: u32, h: u32, color: Rgba<u8>) {
    let cw = canvas.width() as i64;
    let ch = canvas.height() as i64;
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + w as i64).min(cw);
    let y1 = (y + h as i64).min(ch);
    for py in y0..y1 {
        for px in x0..x1 {
            canvas.put_pixel(px as u32, py as u32, color);
        }
    }
}

/// Source-over blend of `color` at `coverage` (0.0–1.0) onto one pixel.
/// Out-of-bounds coordinates are ignored.
pub fn blend_pixel(canvas: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>, coverage: f32) {
    if x < 0 || y < 0 || x as u32 >= canvas.width() || y as u32 >= canvas.height() {
        return;
    }
    let a = (color[3] as f32 / 255.0) * coverage.clamp(0.0, 1.0);
    if a <= 0.0 {
        return;
    }
    let dst = canvas.get_pixel_mut(x as u32, y as u32);
    for c in 0..3 {
        let v = color[c] as f32 * a + dst[c] as f32 * (1.0 - a);
        dst[c] = v.round().min(255.0) as u8;
    }
    let out_a = 255.0 * a + dst[3] as f32 * (1.0 - a);
    dst[3] = out_a.round().min(255.0) as u8;
}

/// Scale `src` to exactly `w`×`h` and alpha-composite it at `(x, y)`,
/// clipped to the canvas.
pub fn draw_scaled(canvas: &mut RgbaImage, src: &RgbaImage, x: i64, y: i64, w: u32, h: u32) {
    if w == 0 || h == 0 {
        return;
    }
    let scaled = if src.width() == w && src.height() == h {
        src.clone()
    } else {
        imageops::resize(src, w, h, FilterType::Lanczos3)
    };
    for (sx, sy, p) in scaled.enumerate_pixels() {
        let cx = x + sx as i64;
        let cy = y + sy as i64;
        if cx < 0 || cy < 0 || cx >= canvas.width() as i64 || cy >= canvas.height() as i64 {
            continue;
        }
        match p[3] {
            255 => canvas.put_pixel(cx as u32, cy as u32, *p),
            0 => {}
            _ => blend_pixel(canvas, cx as i32, cy as i32, *p, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_rect_clips_to_canvas() {
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        fill_rect(&mut img, -2, 2, 10, 10, Rgba([9, 9, 9, 255]));
        assert_eq!(img.get_pixel(0, 1), &Rgba([0, 0, 0, 255]));
        assert_eq!(img.get_pixel(0, 2), &Rgba([9, 9, 9, 255]));
        assert_eq!(img.get_pixel(3, 3), &Rgba([9, 9, 9, 255]));
    }

    #[test]
    fn half_coverage_blends_halfway() {
        let mut img = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255]));
        blend_pixel(&mut img, 0, 0, Rgba([0, 0, 0, 255]), 0.5);
        let p = img.get_pixel(0, 0);
        assert!((127..=128).contains(&p[0]));
        assert_eq!(p[3], 255);
        // Outside the canvas: silently ignored
        blend_pixel(&mut img, 5, -1, Rgba([0, 0, 0, 255]), 1.0);
    }

    #[test]
    fn draw_scaled_places_resized_image() {
        let mut canvas = RgbaImage::from_pixel(20, 10, Rgba([255, 255, 255, 255]));
        let src = RgbaImage::from_pixel(4, 2, Rgba([200, 0, 0, 255]));
        draw_scaled(&mut canvas, &src, 5, 2, 8, 4);
        assert_eq!(canvas.get_pixel(8, 4), &Rgba([200, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(4, 4), &Rgba([255, 255, 255, 255]));
        assert_eq!(canvas.get_pixel(13, 4), &Rgba([255, 255, 255, 255]));
    }
}
