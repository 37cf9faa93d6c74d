use ab_glyph::{point, Font, FontArc, GlyphId, ScaleFont};
use image::{Rgba, RgbaImage};
use std::path::Path;

use super::canvas_ops::{blend_pixel, fill_rect};

/// Font weight of a text role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Weight {
    Regular,
    Bold,
}

/// Size + weight of one text role. The same value is handed to the
/// measuring pass and the drawing pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub weight: Weight,
}

impl TextStyle {
    pub const fn regular(size: f32) -> Self {
        Self { size, weight: Weight::Regular }
    }

    pub const fn bold(size: f32) -> Self {
        Self { size, weight: Weight::Bold }
    }
}

/// Measures and draws single lines of text.
///
/// `draw` positions text the way a 2D canvas with `textAlign = center` and an
/// alphabetic baseline does: `center_x` is the horizontal midpoint of the
/// line, `baseline_y` the baseline.
pub trait Typeface {
    /// Advance width of `text` in pixels.
    fn measure(&self, text: &str, style: TextStyle) -> f32;

    fn draw(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        style: TextStyle,
        center_x: f32,
        baseline_y: f32,
        color: Rgba<u8>,
    );

    /// Whether every visible char of `text` has a glyph in this face.
    fn supports(&self, _text: &str) -> bool {
        true
    }
}

/// Variation selectors and joiners shape emoji sequences; they never get a
/// glyph or an advance of their own.
fn is_invisible_modifier(ch: char) -> bool {
    matches!(ch, '\u{200D}' | '\u{FE00}'..='\u{FE0F}')
}

#[derive(Debug)]
pub enum FontError {
    Io(std::io::Error),
    Invalid(String),
    NotFound(String),
}

impl std::fmt::Display for FontError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FontError::Io(e) => write!(f, "I/O error: {}", e),
            FontError::Invalid(e) => write!(f, "Invalid font data: {}", e),
            FontError::NotFound(family) => write!(f, "Font family '{}' not found", family),
        }
    }
}

impl std::error::Error for FontError {}

impl From<std::io::Error> for FontError {
    fn from(e: std::io::Error) -> Self {
        FontError::Io(e)
    }
}

// ============================================================================
// OUTLINE FONTS (ab_glyph)
// ============================================================================

/// Lay out a single line left-aligned at x = 0.
/// Returns `(glyph ids with x offsets, total advance width)`.
pub fn layout_line(font: &FontArc, text: &str, font_size: f32) -> (Vec<(GlyphId, f32)>, f32) {
    let scaled = font.as_scaled(font_size);
    let mut glyphs = Vec::with_capacity(text.len());
    let mut cursor_x = 0.0f32;
    let mut last_glyph: Option<GlyphId> = None;

    for ch in text.chars().filter(|&ch| !is_invisible_modifier(ch)) {
        let glyph_id = font.glyph_id(ch);
        if let Some(prev) = last_glyph {
            cursor_x += scaled.kern(prev, glyph_id);
        }
        glyphs.push((glyph_id, cursor_x));
        cursor_x += scaled.h_advance(glyph_id);
        last_glyph = Some(glyph_id);
    }

    (glyphs, cursor_x)
}

/// Outline-font typeface with an optional dedicated bold face.
///
/// Without a bold face, bold text is synthesized by smearing coverage one
/// pixel to the right.
#[derive(Clone)]
pub struct GlyphFace {
    regular: FontArc,
    bold: Option<FontArc>,
}

impl GlyphFace {
    pub fn new(regular: FontArc, bold: Option<FontArc>) -> Self {
        Self { regular, bold }
    }

    /// Load regular (400) and bold (700) variants of a system font family.
    pub fn system(family: &str) -> Result<Self, FontError> {
        let regular = load_system_font(family, 400, false)
            .ok_or_else(|| FontError::NotFound(family.to_string()))?;
        let bold = load_system_font(family, 700, false);
        Ok(Self::new(regular, bold))
    }

    /// Load a TTF/OTF file. Bold text is synthesized.
    pub fn from_file(path: &Path) -> Result<Self, FontError> {
        let bytes = std::fs::read(path)?;
        let font = FontArc::try_from_vec(bytes).map_err(|e| FontError::Invalid(e.to_string()))?;
        Ok(Self::new(font, None))
    }

    /// Try a handful of common sans-serif families.
    pub fn default_system() -> Result<Self, FontError> {
        for family in DEFAULT_FAMILIES {
            if let Ok(face) = Self::system(family) {
                return Ok(face);
            }
        }
        Err(FontError::NotFound(DEFAULT_FAMILIES.join(", ")))
    }

    fn font_for(&self, weight: Weight) -> (&FontArc, bool) {
        match (weight, &self.bold) {
            (Weight::Regular, _) => (&self.regular, false),
            (Weight::Bold, Some(bold)) => (bold, false),
            (Weight::Bold, None) => (&self.regular, true),
        }
    }
}

#[cfg(target_os = "linux")]
const DEFAULT_FAMILIES: &[&str] = &["Arial", "Liberation Sans", "DejaVu Sans", "Noto Sans"];
#[cfg(not(target_os = "linux"))]
const DEFAULT_FAMILIES: &[&str] = &["Arial", "Helvetica", "Segoe UI"];

impl Typeface for GlyphFace {
    fn measure(&self, text: &str, style: TextStyle) -> f32 {
        let (font, _) = self.font_for(style.weight);
        layout_line(font, text, style.size).1
    }

    fn supports(&self, text: &str) -> bool {
        text.chars()
            .filter(|&ch| !ch.is_whitespace() && !is_invisible_modifier(ch))
            .all(|ch| self.regular.glyph_id(ch).0 != 0)
    }

    fn draw(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        style: TextStyle,
        center_x: f32,
        baseline_y: f32,
        color: Rgba<u8>,
    ) {
        let (font, synth_bold) = self.font_for(style.weight);
        let (glyphs, width) = layout_line(font, text, style.size);
        let origin_x = center_x - width * 0.5;

        let outlined: Vec<_> = glyphs
            .into_iter()
            .filter_map(|(id, gx)| {
                let glyph = id.with_scale_and_position(style.size, point(origin_x + gx, baseline_y));
                font.outline_glyph(glyph)
            })
            .collect();
        if outlined.is_empty() {
            return;
        }

        // Union of glyph pixel bounds, one extra column for the bold smear
        let mut min_x = i32::MAX;
        let mut min_y = i32::MAX;
        let mut max_x = i32::MIN;
        let mut max_y = i32::MIN;
        for g in &outlined {
            let b = g.px_bounds();
            min_x = min_x.min(b.min.x.floor() as i32);
            min_y = min_y.min(b.min.y.floor() as i32);
            max_x = max_x.max(b.max.x.ceil() as i32);
            max_y = max_y.max(b.max.y.ceil() as i32);
        }
        if synth_bold {
            max_x += 1;
        }
        let buf_w = (max_x - min_x).max(0) as usize;
        let buf_h = (max_y - min_y).max(0) as usize;
        if buf_w == 0 || buf_h == 0 {
            return;
        }

        // Coverage is max-combined so overlapping glyph edges don't darken
        let mut coverage = vec![0.0f32; buf_w * buf_h];
        for g in &outlined {
            let b = g.px_bounds();
            let gx0 = b.min.x.floor() as i32 - min_x;
            let gy0 = b.min.y.floor() as i32 - min_y;
            g.draw(|px, py, cov| {
                let ix = gx0 + px as i32;
                let iy = gy0 + py as i32;
                if ix < 0 || iy < 0 || ix as usize >= buf_w || iy as usize >= buf_h {
                    return;
                }
                let idx = iy as usize * buf_w + ix as usize;
                coverage[idx] = coverage[idx].max(cov);
                if synth_bold && (ix as usize + 1) < buf_w {
                    coverage[idx + 1] = coverage[idx + 1].max(cov);
                }
            });
        }

        for iy in 0..buf_h {
            for ix in 0..buf_w {
                let cov = coverage[iy * buf_w + ix];
                if cov > 0.001 {
                    blend_pixel(canvas, min_x + ix as i32, min_y + iy as i32, color, cov);
                }
            }
        }
    }
}

/// Load a font by family name, weight, and style from the system.
/// `weight` is a CSS-style weight value (100=Thin, 400=Regular, 700=Bold, etc.)
/// Returns None if the font cannot be found.
pub fn load_system_font(family: &str, weight: u16, italic: bool) -> Option<FontArc> {
    use font_kit::family_name::FamilyName;
    use font_kit::properties::{Properties, Style, Weight};
    use font_kit::source::SystemSource;

    let mut props = Properties::new();
    props.weight = Weight(weight as f32);
    if italic {
        props.style = Style::Italic;
    }

    let source = SystemSource::new();
    let handle = source
        .select_best_match(&[FamilyName::Title(family.to_string())], &props)
        .ok()?;

    let font_data = handle.load().ok()?;
    let bytes: Vec<u8> = (*font_data.copy_font_data()?).clone();
    FontArc::try_from_vec(bytes).ok()
}

// ============================================================================
// FIXED-ADVANCE FACE
// ============================================================================

/// Deterministic face: every char advances `size * advance` pixels and
/// non-whitespace chars paint as solid boxes. Used when no outline font is
/// available, and for pixel-exact tests.
#[derive(Clone, Copy, Debug)]
pub struct FixedAdvanceFace {
    pub advance: f32,
}

impl Default for FixedAdvanceFace {
    fn default() -> Self {
        Self { advance: 0.5 }
    }
}

impl FixedAdvanceFace {
    fn char_advance(&self, style: TextStyle) -> f32 {
        match style.weight {
            Weight::Regular => style.size * self.advance,
            Weight::Bold => style.size * self.advance * 1.1,
        }
    }
}

impl Typeface for FixedAdvanceFace {
    fn measure(&self, text: &str, style: TextStyle) -> f32 {
        text.chars().count() as f32 * self.char_advance(style)
    }

    fn draw(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        style: TextStyle,
        center_x: f32,
        baseline_y: f32,
        color: Rgba<u8>,
    ) {
        let adv = self.char_advance(style);
        let origin_x = center_x - self.measure(text, style) * 0.5;
        let box_w = (adv * 0.8).round().max(1.0) as u32;
        let box_h = (style.size * 0.7).round().max(1.0) as u32;
        let top = (baseline_y - box_h as f32).round() as i64;

        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let x = (origin_x + i as f32 * adv + adv * 0.1).round() as i64;
            fill_rect(canvas, x, top, box_w, box_h, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_face_measures_by_char_count() {
        let face = FixedAdvanceFace::default();
        assert_eq!(face.measure("abcd", TextStyle::regular(20.0)), 40.0);
        assert_eq!(face.measure("", TextStyle::regular(20.0)), 0.0);
        // Multi-byte chars count once
        assert_eq!(face.measure("é✉", TextStyle::regular(10.0)), 10.0);
        assert!(face.measure("abcd", TextStyle::bold(20.0)) > 40.0);
    }

    #[test]
    fn fixed_face_draws_centered_boxes_above_baseline() {
        let face = FixedAdvanceFace::default();
        let mut img = RgbaImage::from_pixel(100, 40, Rgba([255, 255, 255, 255]));
        let ink = Rgba([0, 0, 0, 255]);
        face.draw(&mut img, "ab", TextStyle::regular(20.0), 50.0, 30.0, ink);

        // Line spans x = 40..60; first box starts at 41, boxes are 8 wide
        assert_eq!(img.get_pixel(42, 25), &ink);
        assert_eq!(img.get_pixel(52, 25), &ink);
        // Nothing below the baseline or outside the line
        assert_eq!(img.get_pixel(42, 31), &Rgba([255, 255, 255, 255]));
        assert_eq!(img.get_pixel(30, 25), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn modifiers_are_not_glyphs() {
        assert!(is_invisible_modifier('\u{FE0F}'));
        assert!(is_invisible_modifier('\u{200D}'));
        assert!(!is_invisible_modifier('✉'));
    }

    /// Horizontal extent of every pixel that differs from `bg`.
    fn ink_span(img: &RgbaImage, bg: Rgba<u8>) -> Option<(u32, u32)> {
        let cols: Vec<u32> = (0..img.width())
            .filter(|&x| (0..img.height()).any(|y| img.get_pixel(x, y) != &bg))
            .collect();
        Some((*cols.first()?, *cols.last()?))
    }

    #[test]
    fn system_face_draws_what_it_measures() {
        // Hosts without any of the default families have nothing to check
        let Ok(face) = GlyphFace::default_system() else { return };
        let white = Rgba([255, 255, 255, 255]);
        let ink = Rgba([0, 0, 0, 255]);

        for style in [TextStyle::regular(20.0), TextStyle::bold(36.0)] {
            let text = "HOME MAKEOVER";
            let width = face.measure(text, style);
            assert!(width > 0.0);

            let mut img = RgbaImage::from_pixel(600, 80, white);
            face.draw(&mut img, text, style, 300.0, 60.0, ink);
            let (left, right) = ink_span(&img, white).expect("no ink drawn");

            // Ink sits inside the measured advance, short of it only by the
            // outer side bearings of 'H' and 'R'
            let ink_w = (right - left + 1) as f32;
            assert!(ink_w <= width + 2.0, "ink {} wider than measured {}", ink_w, width);
            assert!(ink_w >= width - style.size * 0.4, "ink {} far narrower than {}", ink_w, width);
            assert!(left as f32 >= 300.0 - width * 0.5 - 2.0);
            assert!(right as f32 <= 300.0 + width * 0.5 + 2.0);
        }
    }

    #[test]
    fn system_face_reports_missing_glyphs() {
        let Ok(face) = GlyphFace::default_system() else { return };
        assert!(face.supports("Tel: 555-0100"));
        assert!(!face.supports("\u{10FFFD}"));
        // Trailing variation selector doesn't count against the icon
        assert_eq!(face.supports("A\u{FE0F}"), face.supports("A"));
    }

    #[test]
    fn fixed_face_skips_whitespace() {
        let face = FixedAdvanceFace::default();
        let mut img = RgbaImage::from_pixel(60, 20, Rgba([255, 255, 255, 255]));
        face.draw(&mut img, "a a", TextStyle::regular(10.0), 30.0, 15.0, Rgba([0, 0, 0, 255]));
        // Middle char cell (x = 27.5..32.5) stays blank
        assert_eq!(img.get_pixel(30, 12), &Rgba([255, 255, 255, 255]));
    }
}
