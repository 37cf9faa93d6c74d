// ============================================================================
// COMPOSITE RENDERER — draws the before/after post
// ============================================================================
//
// `Renderer::render` runs in two passes over the same Typeface:
//   1. layout:  CompositeLayout::compute measures and wraps all text
//   2. paint:   the wrapped lines and rects are drawn as-is
// Nothing is re-measured while painting, so the block heights always agree
// with what ends up on the canvas.

use image::{Rgba, RgbaImage};

use super::canvas_ops::{draw_scaled, fill_rect};
use super::color::{TEXT_DARK, WHITE};
use super::layout::{CanvasTooLarge, CompositeLayout, LayoutContent, MAX_CANVAS_DIM, RenderStyle, TextLine};
use super::text::{TextStyle, Typeface};

/// Which of the two photo slots an image belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageSlot {
    Before,
    After,
}

impl ImageSlot {
    pub fn name(&self) -> &'static str {
        match self {
            ImageSlot::Before => "before",
            ImageSlot::After => "after",
        }
    }
}

/// An icon + text pair drawn as one line beneath the CTA.
///
/// `plain_icon` is the text-only prefix used when the typeface has no glyph
/// for `icon`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContactEntry {
    pub icon: String,
    pub plain_icon: String,
    pub text: String,
}

impl ContactEntry {
    pub fn line(&self) -> String {
        join_icon(&self.icon, &self.text)
    }

    pub fn plain_line(&self) -> String {
        join_icon(&self.plain_icon, &self.text)
    }
}

fn join_icon(icon: &str, text: &str) -> String {
    if icon.is_empty() {
        text.to_string()
    } else {
        format!("{} {}", icon, text)
    }
}

/// Everything one render needs. Built fresh per render from the session.
#[derive(Clone, Debug)]
pub struct RenderInput {
    pub before: Option<RgbaImage>,
    pub after: Option<RgbaImage>,
    pub brand_color: Rgba<u8>,
    pub description: String,
    pub cta_label: String,
    pub contacts: Vec<ContactEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    MissingImage(ImageSlot),
    /// Composite dimensions that would exceed the canvas limit.
    CanvasTooLarge(u64, u64),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::MissingImage(slot) => write!(
                f,
                "Please upload both before and after images! (missing: {})",
                slot.name()
            ),
            RenderError::CanvasTooLarge(w, h) => write!(
                f,
                "Composite size {}x{} exceeds maximum allowed {}x{}",
                w, h, MAX_CANVAS_DIM, MAX_CANVAS_DIM
            ),
        }
    }
}

impl std::error::Error for RenderError {}

impl From<CanvasTooLarge> for RenderError {
    fn from(e: CanvasTooLarge) -> Self {
        RenderError::CanvasTooLarge(e.width, e.height)
    }
}

/// Composite renderer. Owns the typeface so layout and paint can't disagree
/// on font metrics.
pub struct Renderer<T: Typeface> {
    face: T,
    style: RenderStyle,
}

impl<T: Typeface> Renderer<T> {
    pub fn new(face: T, style: RenderStyle) -> Self {
        Self { face, style }
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    pub fn face(&self) -> &T {
        &self.face
    }

    /// Compute the layout for `input` without drawing anything.
    ///
    /// Contact icons fall back to their text prefixes, all together, when the
    /// face can't draw every icon.
    pub fn layout(&self, input: &RenderInput) -> Result<CompositeLayout, RenderError> {
        let (before, after) = require_images(input)?;
        let plain = !input.contacts.iter().all(|c| self.face.supports(&c.icon));
        let contacts: Vec<String> = input
            .contacts
            .iter()
            .map(|c| if plain { c.plain_line() } else { c.line() })
            .collect();
        let content = LayoutContent {
            before_size: before.dimensions(),
            after_size: after.dimensions(),
            description: &input.description,
            cta_label: &input.cta_label,
            contacts: &contacts,
        };
        CompositeLayout::compute(&content, &self.style, &self.face).map_err(RenderError::from)
    }

    /// Render the composite. Fails before any canvas is allocated when an
    /// image slot is empty or the composite would be too large.
    pub fn render(&self, input: &RenderInput) -> Result<RgbaImage, RenderError> {
        let (before, after) = require_images(input)?;
        let layout = self.layout(input)?;
        let style = &self.style;

        let mut canvas = RgbaImage::from_pixel(layout.width, layout.height, WHITE);

        // Header band + title
        fill_rect(&mut canvas, 0, 0, layout.width, style.header_height, input.brand_color);
        self.draw_line(&mut canvas, &layout.title, style.title, WHITE);

        // Labels, then the two photos
        self.draw_line(&mut canvas, &layout.before_label, style.label, TEXT_DARK);
        self.draw_line(&mut canvas, &layout.after_label, style.label, TEXT_DARK);
        let (b, a) = (layout.before, layout.after);
        draw_scaled(&mut canvas, before, b.x as i64, b.y as i64, b.w, b.h);
        draw_scaled(&mut canvas, after, a.x as i64, a.y as i64, a.w, a.h);

        for line in &layout.description {
            self.draw_line(&mut canvas, line, style.description, TEXT_DARK);
        }

        if let (Some(button), Some(label)) = (layout.cta_button, &layout.cta_label) {
            fill_rect(
                &mut canvas,
                button.x as i64,
                button.y as i64,
                button.w,
                button.h,
                input.brand_color,
            );
            self.draw_line(&mut canvas, label, style.cta_text, WHITE);
        }

        for line in &layout.contacts {
            self.draw_line(&mut canvas, line, style.contact, TEXT_DARK);
        }

        crate::log_info!(
            "Rendered {}x{} composite ({} description lines, cta: {}, {} contacts)",
            layout.width,
            layout.height,
            layout.description.len(),
            layout.cta_button.is_some(),
            layout.contacts.len()
        );
        Ok(canvas)
    }

    fn draw_line(&self, canvas: &mut RgbaImage, line: &TextLine, style: TextStyle, color: Rgba<u8>) {
        self.face.draw(canvas, &line.text, style, line.center_x, line.baseline as f32, color);
    }
}

fn require_images(input: &RenderInput) -> Result<(&RgbaImage, &RgbaImage), RenderError> {
    let before = input.before.as_ref().ok_or(RenderError::MissingImage(ImageSlot::Before))?;
    let after = input.after.as_ref().ok_or(RenderError::MissingImage(ImageSlot::After))?;
    Ok((before, after))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::text::FixedAdvanceFace;

    const BRAND: Rgba<u8> = Rgba([0x25, 0x63, 0xeb, 255]);
    const RED: Rgba<u8> = Rgba([220, 20, 20, 255]);
    const GREEN: Rgba<u8> = Rgba([20, 200, 20, 255]);

    fn input() -> RenderInput {
        RenderInput {
            before: Some(RgbaImage::from_pixel(200, 100, RED)),
            after: Some(RgbaImage::from_pixel(100, 100, GREEN)),
            brand_color: BRAND,
            description: String::new(),
            cta_label: String::new(),
            contacts: Vec::new(),
        }
    }

    fn renderer() -> Renderer<FixedAdvanceFace> {
        Renderer::new(FixedAdvanceFace::default(), RenderStyle::default())
    }

    #[test]
    fn missing_before_image_is_reported() {
        let mut i = input();
        i.before = None;
        assert_eq!(renderer().render(&i), Err(RenderError::MissingImage(ImageSlot::Before)));
    }

    #[test]
    fn missing_after_image_is_reported() {
        let mut i = input();
        i.after = None;
        i.description = "ignored".into();
        assert_eq!(renderer().render(&i), Err(RenderError::MissingImage(ImageSlot::After)));
        assert!(renderer().layout(&i).is_err());
    }

    #[test]
    fn bare_render_has_header_and_photos() {
        let canvas = renderer().render(&input()).unwrap();
        assert_eq!(canvas.dimensions(), (1610, 730));

        // Header band corner (away from the title) carries the brand color
        assert_eq!(canvas.get_pixel(2, 2), &BRAND);
        assert_eq!(canvas.get_pixel(1607, 77), &BRAND);
        // Photos: before spans x 40..1040, after 1070..1570, y 150..650
        assert_eq!(canvas.get_pixel(540, 400), &RED);
        assert_eq!(canvas.get_pixel(1320, 400), &GREEN);
        // Image gap and margins stay white
        assert_eq!(canvas.get_pixel(1055, 400), &WHITE);
        assert_eq!(canvas.get_pixel(20, 400), &WHITE);
        assert_eq!(canvas.get_pixel(800, 700), &WHITE);
    }

    #[test]
    fn cta_button_is_drawn_in_brand_color() {
        let mut i = input();
        i.cta_label = "Call now".into();
        let r = renderer();
        let layout = r.layout(&i).unwrap();
        let canvas = r.render(&i).unwrap();
        let button = layout.cta_button.unwrap();

        // Left edge of the button, clear of the centered label
        assert_eq!(canvas.get_pixel(button.x + 3, button.y + 3), &BRAND);
        assert_eq!(canvas.get_pixel(button.x + 3, button.y + button.h - 1), &BRAND);
        assert_eq!(canvas.get_pixel(button.x - 2, button.y + 3), &WHITE);
        // Label ink is white inside the button
        let label = layout.cta_label.unwrap();
        assert_eq!(label.text, "CALL NOW");
        assert_eq!(canvas.get_pixel(label.center_x as u32 - 45, label.baseline - 5), &WHITE);
    }

    #[test]
    fn description_lines_drawn_match_layout() {
        let mut i = input();
        i.description = "sanded stained and sealed ".repeat(40);
        let r = renderer();
        let layout = r.layout(&i).unwrap();
        let canvas = r.render(&i).unwrap();
        assert!(layout.description.len() > 1);
        assert_eq!(
            canvas.height(),
            80 + 500 + r.style().text_block_height(layout.description.len()) + 150
        );

        // Every laid-out line left ink just above its baseline
        for line in &layout.description {
            let y = line.baseline - 3;
            let inked = (0..canvas.width()).any(|x| canvas.get_pixel(x, y) == &TEXT_DARK);
            assert!(inked, "no ink for line at baseline {}", line.baseline);
        }
    }

    #[test]
    fn contacts_render_below_cta() {
        let mut i = input();
        i.cta_label = "Get a quote".into();
        i.contacts = vec![
            contact("Tel:", "555-0100"),
            contact("Web:", "example.com"),
        ];
        let r = renderer();
        let layout = r.layout(&i).unwrap();
        let canvas = r.render(&i).unwrap();
        assert_eq!(layout.contacts[0].text, "Tel: 555-0100");
        let button = layout.cta_button.unwrap();
        for line in &layout.contacts {
            assert!(line.baseline > button.y + button.h);
            let y = line.baseline - 3;
            assert!((0..canvas.width()).any(|x| canvas.get_pixel(x, y) == &TEXT_DARK));
        }
    }

    #[test]
    fn transparent_photo_pixels_show_white_canvas() {
        let mut i = input();
        i.before = Some(RgbaImage::from_pixel(100, 100, Rgba([0, 0, 0, 0])));
        let canvas = renderer().render(&i).unwrap();
        assert_eq!(canvas.get_pixel(290, 400), &WHITE);
    }

    #[test]
    fn contact_line_without_icon_is_plain_text() {
        let c = ContactEntry { icon: String::new(), plain_icon: String::new(), text: "hi@example.com".into() };
        assert_eq!(c.line(), "hi@example.com");
    }

    fn contact(icon: &str, text: &str) -> ContactEntry {
        ContactEntry { icon: icon.into(), plain_icon: icon.into(), text: text.into() }
    }

    /// Block face that only has glyphs for ASCII.
    struct AsciiOnly(FixedAdvanceFace);

    impl Typeface for AsciiOnly {
        fn measure(&self, text: &str, style: TextStyle) -> f32 {
            self.0.measure(text, style)
        }

        fn draw(&self, canvas: &mut RgbaImage, text: &str, style: TextStyle, cx: f32, by: f32, color: Rgba<u8>) {
            self.0.draw(canvas, text, style, cx, by, color)
        }

        fn supports(&self, text: &str) -> bool {
            text.is_ascii()
        }
    }

    #[test]
    fn emoji_icons_fall_back_when_face_lacks_them() {
        let mut i = input();
        i.contacts = vec![
            ContactEntry { icon: "📞".into(), plain_icon: "Tel:".into(), text: "555-0100".into() },
            ContactEntry { icon: "🌐".into(), plain_icon: "Web:".into(), text: "example.com".into() },
        ];
        let plain = Renderer::new(AsciiOnly(FixedAdvanceFace::default()), RenderStyle::default());
        let lines: Vec<String> = plain.layout(&i).unwrap().contacts.into_iter().map(|l| l.text).collect();
        assert_eq!(lines, vec!["Tel: 555-0100", "Web: example.com"]);

        let emoji: Vec<String> = renderer().layout(&i).unwrap().contacts.into_iter().map(|l| l.text).collect();
        assert_eq!(emoji, vec!["📞 555-0100", "🌐 example.com"]);
    }

    #[test]
    fn oversized_composite_is_refused_before_allocation() {
        let mut i = input();
        i.before = Some(RgbaImage::from_pixel(32_768, 1, RED));
        assert_eq!(renderer().render(&i), Err(RenderError::CanvasTooLarge(16_384_610, 730)));
        assert!(renderer().layout(&i).is_err());

        // Missing slots are still reported first
        i.after = None;
        assert_eq!(renderer().render(&i), Err(RenderError::MissingImage(ImageSlot::After)));
    }
}
