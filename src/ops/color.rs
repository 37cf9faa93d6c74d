use image::Rgba;

/// Brand color used when none is given.
pub const DEFAULT_BRAND_COLOR: &str = "#2563eb";

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
/// Body text color for labels, description and contacts.
pub const TEXT_DARK: Rgba<u8> = Rgba([0x33, 0x33, 0x33, 255]);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    Invalid(String),
}

impl std::fmt::Display for ColorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorError::Invalid(s) => {
                write!(f, "Invalid color '{}': expected #rrggbb or #rgb", s)
            }
        }
    }
}

impl std::error::Error for ColorError {}

/// Parse `#rrggbb`, `rrggbb` or `#rgb` (case-insensitive) into an opaque color.
pub fn parse_hex_color(s: &str) -> Result<Rgba<u8>, ColorError> {
    let invalid = || ColorError::Invalid(s.to_string());
    let hex = s.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).map_err(|_| invalid())?;
            let g = u8::from_str_radix(&hex[2..4], 16).map_err(|_| invalid())?;
            let b = u8::from_str_radix(&hex[4..6], 16).map_err(|_| invalid())?;
            Ok(Rgba([r, g, b, 255]))
        }
        3 => {
            // #abc expands to #aabbcc
            let mut out = [0u8; 4];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16).ok_or_else(invalid)? as u8;
                out[i] = v * 16 + v;
            }
            out[3] = 255;
            Ok(Rgba(out))
        }
        _ => Err(invalid()),
    }
}

/// Format an opaque color back to `#rrggbb`.
pub fn to_hex(c: Rgba<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", c[0], c[1], c[2])
}
