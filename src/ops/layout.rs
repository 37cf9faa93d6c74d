// ============================================================================
// COMPOSITE LAYOUT — image scaling, word wrap, vertical block stacking
// ============================================================================
//
// Everything here is pure geometry: given image dimensions, the optional text
// content and a Typeface to measure with, compute where every element goes.
// Nothing is drawn; see `compose` for the paint pass.

use super::text::{TextStyle, Typeface};

/// Fixed title drawn in the header band.
pub const TITLE: &str = "BEFORE & AFTER";
pub const BEFORE_LABEL: &str = "BEFORE";
pub const AFTER_LABEL: &str = "AFTER";

/// Maximum composite size in pixels (per axis).
pub const MAX_CANVAS_DIM: u32 = 32_768;

/// Layout and typography constants for the composite.
///
/// CTA and contact sizes/spacing are style knobs rather than fixed values;
/// the defaults match the most common rendition (24 px CTA, 22 px contacts,
/// 40 px spacing).
#[derive(Clone, Debug, PartialEq)]
pub struct RenderStyle {
    pub header_height: u32,
    pub target_height: u32,
    pub padding: u32,
    pub image_gap: u32,
    /// Distance from the label baseline to the top of the images.
    pub label_gap: u32,
    /// Distance from the bottom of the images to the first section.
    pub section_gap: u32,
    pub bottom_margin: u32,

    pub title: TextStyle,
    /// Title baseline, measured from the top of the canvas.
    pub title_baseline: u32,
    pub label: TextStyle,

    pub description: TextStyle,
    pub line_height: u32,
    /// Space from the last description baseline to the next section.
    pub text_gap: u32,

    pub cta_width: u32,
    pub cta_height: u32,
    pub cta_text: TextStyle,
    /// Label baseline, measured from the top of the button.
    pub cta_baseline: u32,
    pub cta_gap: u32,

    pub contact: TextStyle,
    pub contact_spacing: u32,
    pub contact_tail: u32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            header_height: 80,
            target_height: 500,
            padding: 40,
            image_gap: 30,
            label_gap: 30,
            section_gap: 30,
            bottom_margin: 50,
            title: TextStyle::bold(36.0),
            title_baseline: 50,
            label: TextStyle::bold(24.0),
            description: TextStyle::regular(20.0),
            line_height: 30,
            text_gap: 40,
            cta_width: 300,
            cta_height: 60,
            cta_text: TextStyle::bold(24.0),
            cta_baseline: 38,
            cta_gap: 20,
            contact: TextStyle::regular(22.0),
            contact_spacing: 40,
            contact_tail: 30,
        }
    }
}

impl RenderStyle {
    /// Vertical space not owned by the header, the image row or an optional
    /// section: the label band above the images, the gap below them and the
    /// bottom margin.
    pub fn footer_height(&self) -> u32 {
        self.padding
            .saturating_add(self.label_gap)
            .saturating_add(self.section_gap)
            .saturating_add(self.bottom_margin)
    }

    /// Height of the description block for `lines` wrapped lines.
    pub fn text_block_height(&self, lines: usize) -> u32 {
        if lines == 0 {
            return 0;
        }
        u32::try_from(lines)
            .unwrap_or(u32::MAX)
            .saturating_mul(self.line_height)
            .saturating_add(self.text_gap.saturating_sub(self.line_height))
    }

    pub fn cta_block_height(&self, present: bool) -> u32 {
        if present { self.cta_height.saturating_add(self.cta_gap) } else { 0 }
    }

    pub fn contact_block_height(&self, entries: usize) -> u32 {
        if entries == 0 {
            return 0;
        }
        u32::try_from(entries)
            .unwrap_or(u32::MAX)
            .saturating_mul(self.contact_spacing)
            .saturating_add(self.contact_tail)
    }
}

/// Width of an image scaled to `target_height`, keeping its aspect ratio.
pub fn scaled_width(src_w: u32, src_h: u32, target_height: u32) -> u32 {
    if src_h == 0 {
        return 0;
    }
    (src_w as f64 / src_h as f64 * target_height as f64).round() as u32
}

/// Greedy word wrap.
///
/// A word is appended to the current line unless the result would be wider
/// than `max_width` and the line already holds a word; then the line is
/// flushed and the word starts the next one. A word wider than `max_width`
/// on its own is never split: it sits alone on a line and overflows.
///
/// Words are separated by any whitespace; the output lines join words with a
/// single space. Empty or all-whitespace input yields no lines.
pub fn wrap_words<F>(text: &str, max_width: f32, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f32,
{
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }
        let candidate = format!("{line} {word}");
        if measure(&candidate) > max_width {
            lines.push(std::mem::replace(&mut line, word.to_string()));
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// The composite would exceed [`MAX_CANVAS_DIM`] on at least one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanvasTooLarge {
    pub width: u64,
    pub height: u64,
}

/// Sum of pixel extents, widened so no combination of inputs can wrap.
fn extent(parts: &[u32]) -> u64 {
    parts.iter().map(|&p| u64::from(p)).sum()
}

/// One horizontal span on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn center_x(&self) -> f32 {
        self.x as f32 + self.w as f32 * 0.5
    }
}

/// A line of text anchored at its horizontal center and baseline.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub center_x: f32,
    pub baseline: u32,
}

/// Complete geometry of one composite.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeLayout {
    pub width: u32,
    pub height: u32,
    pub title: TextLine,
    pub before_label: TextLine,
    pub after_label: TextLine,
    pub before: Rect,
    pub after: Rect,
    pub description: Vec<TextLine>,
    pub cta_button: Option<Rect>,
    pub cta_label: Option<TextLine>,
    pub contacts: Vec<TextLine>,
}

/// What the layout needs from the render input, minus the pixels.
#[derive(Clone, Debug, Default)]
pub struct LayoutContent<'a> {
    pub before_size: (u32, u32),
    pub after_size: (u32, u32),
    pub description: &'a str,
    pub cta_label: &'a str,
    /// Already formatted `icon text` lines.
    pub contacts: &'a [String],
}

impl CompositeLayout {
    /// Compute the full layout. Description lines are wrapped with `face` and
    /// `style.description` before any height depending on them is derived, so
    /// the block height always matches the lines that get drawn.
    ///
    /// Both canvas dimensions are checked against [`MAX_CANVAS_DIM`] before
    /// anything is wrapped or placed.
    pub fn compute(
        content: &LayoutContent<'_>,
        style: &RenderStyle,
        face: &dyn Typeface,
    ) -> Result<Self, CanvasTooLarge> {
        let (bw, bh) = content.before_size;
        let (aw, ah) = content.after_size;
        let before_w = scaled_width(bw, bh, style.target_height);
        let after_w = scaled_width(aw, ah, style.target_height);

        let wide = extent(&[before_w, after_w, style.image_gap, style.padding, style.padding]);
        let bare = extent(&[style.header_height, style.target_height, style.footer_height()]);
        if wide > u64::from(MAX_CANVAS_DIM) || bare > u64::from(MAX_CANVAS_DIM) {
            return Err(CanvasTooLarge { width: wide, height: bare });
        }
        // Every sum below is bounded by the checked extents
        let width = wide as u32;
        let center = width as f32 * 0.5;

        let max_line = width.saturating_sub(style.padding * 2) as f32;
        let wrapped = wrap_words(content.description.trim(), max_line, |s| {
            face.measure(s, style.description)
        });

        let cta = content.cta_label.trim();
        let has_cta = !cta.is_empty();

        let tall = bare
            + extent(&[
                style.text_block_height(wrapped.len()),
                style.cta_block_height(has_cta),
                style.contact_block_height(content.contacts.len()),
            ]);
        if tall > u64::from(MAX_CANVAS_DIM) {
            return Err(CanvasTooLarge { width: wide, height: tall });
        }
        let height = tall as u32;

        let label_baseline = style.header_height + style.padding;
        let images_top = label_baseline + style.label_gap;
        let before = Rect { x: style.padding, y: images_top, w: before_w, h: style.target_height };
        let after = Rect {
            x: style.padding + before_w + style.image_gap,
            y: images_top,
            w: after_w,
            h: style.target_height,
        };

        let mut cursor = images_top + style.target_height + style.section_gap;

        let description: Vec<TextLine> = wrapped
            .into_iter()
            .enumerate()
            .map(|(i, text)| TextLine {
                text,
                center_x: center,
                baseline: cursor + i as u32 * style.line_height,
            })
            .collect();
        cursor += style.text_block_height(description.len());

        let (cta_button, cta_label) = if has_cta {
            let button = Rect {
                x: width.saturating_sub(style.cta_width) / 2,
                y: cursor,
                w: style.cta_width,
                h: style.cta_height,
            };
            let label = TextLine {
                text: cta.to_uppercase(),
                center_x: center,
                baseline: cursor + style.cta_baseline,
            };
            cursor += style.cta_block_height(true);
            (Some(button), Some(label))
        } else {
            (None, None)
        };

        let contacts = content
            .contacts
            .iter()
            .enumerate()
            .map(|(i, text)| TextLine {
                text: text.clone(),
                center_x: center,
                baseline: cursor + i as u32 * style.contact_spacing,
            })
            .collect();

        Ok(Self {
            width,
            height,
            title: TextLine { text: TITLE.to_string(), center_x: center, baseline: style.title_baseline },
            before_label: TextLine {
                text: BEFORE_LABEL.to_string(),
                center_x: before.center_x(),
                baseline: label_baseline,
            },
            after_label: TextLine {
                text: AFTER_LABEL.to_string(),
                center_x: after.center_x(),
                baseline: label_baseline,
            },
            before,
            after,
            description,
            cta_button,
            cta_label,
            contacts,
        })
    }
}
