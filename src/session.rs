use image::{Rgba, RgbaImage};

use crate::ops::color::{DEFAULT_BRAND_COLOR, parse_hex_color};
use crate::ops::compose::{ContactEntry, ImageSlot, RenderInput};
use crate::profile::Profile;

/// The three contact channels, in the order they appear on the composite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContactKind {
    Phone,
    Email,
    Website,
}

impl ContactKind {
    pub const ALL: [ContactKind; 3] = [ContactKind::Phone, ContactKind::Email, ContactKind::Website];

    /// Emoji icon shown in front of the value.
    pub fn icon(&self) -> &'static str {
        match self {
            ContactKind::Phone => "📞",
            ContactKind::Email => "✉️",
            ContactKind::Website => "🌐",
        }
    }

    /// Text prefix for fonts without emoji coverage.
    pub fn plain_icon(&self) -> &'static str {
        match self {
            ContactKind::Phone => "Tel:",
            ContactKind::Email => "Email:",
            ContactKind::Website => "Web:",
        }
    }
}

/// One contact channel: whether it's switched on and what was typed in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactField {
    pub selected: bool,
    pub value: String,
}

/// Phone / email / website fields as the user filled them in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactSelection {
    pub phone: ContactField,
    pub email: ContactField,
    pub website: ContactField,
    /// Use `Tel:`/`Email:`/`Web:` instead of emoji icons.
    pub plain_icons: bool,
}

impl ContactSelection {
    pub fn field(&self, kind: ContactKind) -> &ContactField {
        match kind {
            ContactKind::Phone => &self.phone,
            ContactKind::Email => &self.email,
            ContactKind::Website => &self.website,
        }
    }

    pub fn field_mut(&mut self, kind: ContactKind) -> &mut ContactField {
        match kind {
            ContactKind::Phone => &mut self.phone,
            ContactKind::Email => &mut self.email,
            ContactKind::Website => &mut self.website,
        }
    }

    /// Set a channel's value; a non-empty value also selects it.
    pub fn set(&mut self, kind: ContactKind, value: &str) {
        let field = self.field_mut(kind);
        field.value = value.trim().to_string();
        field.selected = !field.value.is_empty();
    }

    /// Deselecting a channel clears its value.
    pub fn deselect(&mut self, kind: ContactKind) {
        *self.field_mut(kind) = ContactField::default();
    }

    /// Selected, non-empty channels in phone → email → website order.
    pub fn entries(&self) -> Vec<ContactEntry> {
        ContactKind::ALL
            .iter()
            .filter_map(|&kind| {
                let field = self.field(kind);
                let text = field.value.trim();
                if !field.selected || text.is_empty() {
                    return None;
                }
                let icon = if self.plain_icons { kind.plain_icon() } else { kind.icon() };
                Some(ContactEntry {
                    icon: icon.to_string(),
                    plain_icon: kind.plain_icon().to_string(),
                    text: text.to_string(),
                })
            })
            .collect()
    }

    /// Fill every empty channel from the profile.
    pub fn prefill_from(&mut self, profile: &Profile) {
        for (kind, value) in [
            (ContactKind::Phone, &profile.phone),
            (ContactKind::Email, &profile.email),
            (ContactKind::Website, &profile.website),
        ] {
            if self.field(kind).value.is_empty() && !value.trim().is_empty() {
                self.set(kind, value);
            }
        }
    }
}

/// State of one composition: the two photo slots and the form fields.
///
/// Each image slot is written only through [`Session::set_image`].
#[derive(Clone, Debug)]
pub struct Session {
    before: Option<RgbaImage>,
    after: Option<RgbaImage>,
    pub brand_color: Rgba<u8>,
    pub description: String,
    pub cta_label: String,
    pub contacts: ContactSelection,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            before: None,
            after: None,
            brand_color: parse_hex_color(DEFAULT_BRAND_COLOR).unwrap_or(Rgba([0x25, 0x63, 0xeb, 255])),
            description: String::new(),
            cta_label: String::new(),
            contacts: ContactSelection::default(),
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_image(&mut self, slot: ImageSlot, image: RgbaImage) {
        match slot {
            ImageSlot::Before => self.before = Some(image),
            ImageSlot::After => self.after = Some(image),
        }
    }

    pub fn image(&self, slot: ImageSlot) -> Option<&RgbaImage> {
        match slot {
            ImageSlot::Before => self.before.as_ref(),
            ImageSlot::After => self.after.as_ref(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.before.is_some() && self.after.is_some()
    }

    /// Pre-populate contacts and the CTA label from a saved profile,
    /// leaving anything already filled in untouched.
    pub fn apply_profile(&mut self, profile: &Profile) {
        self.contacts.prefill_from(profile);
        if self.cta_label.trim().is_empty() {
            self.cta_label = profile.cta.trim().to_string();
        }
    }

    /// Snapshot the session into a render input with trimmed text fields.
    pub fn render_input(&self) -> RenderInput {
        RenderInput {
            before: self.before.clone(),
            after: self.after.clone(),
            brand_color: self.brand_color,
            description: self.description.trim().to_string(),
            cta_label: self.cta_label.trim().to_string(),
            contacts: self.contacts.entries(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_keep_fixed_order_and_skip_unselected() {
        let mut c = ContactSelection::default();
        c.set(ContactKind::Website, "example.com");
        c.set(ContactKind::Phone, " 555-0100 ");
        c.email = ContactField { selected: false, value: "hi@example.com".into() };

        let entries = c.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0],
            ContactEntry { icon: "📞".into(), plain_icon: "Tel:".into(), text: "555-0100".into() }
        );
        assert_eq!(entries[1].plain_line(), "Web: example.com");
        assert_eq!(entries[1].text, "example.com");
    }

    #[test]
    fn selected_but_blank_channel_is_dropped() {
        let mut c = ContactSelection::default();
        c.phone = ContactField { selected: true, value: "   ".into() };
        assert!(c.entries().is_empty());
    }

    #[test]
    fn deselect_clears_value() {
        let mut c = ContactSelection::default();
        c.set(ContactKind::Email, "hi@example.com");
        c.deselect(ContactKind::Email);
        assert_eq!(c.email, ContactField::default());
    }

    #[test]
    fn plain_icons_replace_emoji() {
        let mut c = ContactSelection { plain_icons: true, ..Default::default() };
        c.set(ContactKind::Email, "hi@example.com");
        assert_eq!(c.entries()[0].line(), "Email: hi@example.com");
    }

    #[test]
    fn profile_fills_only_empty_fields() {
        let profile = Profile {
            phone: "555-0100".into(),
            email: "owner@example.com".into(),
            cta: "Call us".into(),
            ..Default::default()
        };
        let mut s = Session::new();
        s.contacts.set(ContactKind::Email, "me@example.com");
        s.apply_profile(&profile);

        assert_eq!(s.contacts.phone.value, "555-0100");
        assert_eq!(s.contacts.email.value, "me@example.com");
        assert!(!s.contacts.website.selected);
        assert_eq!(s.cta_label, "Call us");

        s.cta_label = "Book now".into();
        s.apply_profile(&profile);
        assert_eq!(s.cta_label, "Book now");
    }

    #[test]
    fn render_input_needs_both_slots() {
        let mut s = Session::new();
        assert!(!s.is_ready());
        s.set_image(ImageSlot::Before, RgbaImage::new(2, 2));
        assert!(s.render_input().after.is_none());
        s.set_image(ImageSlot::After, RgbaImage::new(3, 3));
        assert!(s.is_ready());
        assert_eq!(s.image(ImageSlot::After).map(|i| i.width()), Some(3));
    }

    #[test]
    fn render_input_trims_text() {
        let mut s = Session::new();
        s.description = "  Fresh coat of paint \n".into();
        s.cta_label = " call ".into();
        let input = s.render_input();
        assert_eq!(input.description, "Fresh coat of paint");
        assert_eq!(input.cta_label, "call");
        assert_eq!(input.brand_color, Rgba([0x25, 0x63, 0xeb, 255]));
    }
}
