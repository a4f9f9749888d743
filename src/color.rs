/// Hex colour handling for furniture fills
///
/// Items store their colour as a `#RRGGBB` string so layout files stay
/// human-readable. This module converts that string into the colour types
/// used by the canvas (iced) and by the share renderer (image).

use crate::error::{PlannerError, Result};

/// An opaque sRGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Parse `#RRGGBB` (leading `#` optional, case-insensitive)
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(PlannerError::InvalidColor(hex.to_string()));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| PlannerError::InvalidColor(hex.to_string()))
        };

        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Canonical `#RRGGBB` form (uppercase)
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    pub fn to_iced(self, alpha: f32) -> iced::Color {
        iced::Color::from_rgba8(self.r, self.g, self.b, alpha.clamp(0.0, 1.0))
    }

    pub fn to_rgba(self, alpha: f32) -> image::Rgba<u8> {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        image::Rgba([self.r, self.g, self.b, a])
    }
}

/// Normalise a user-entered colour, rejecting anything that is not `#RRGGBB`
pub fn normalize_hex(hex: &str) -> Result<String> {
    Rgb::from_hex(hex).map(Rgb::to_hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_color() {
        let c = Rgb::from_hex("#6496FF").unwrap();
        assert_eq!(c, Rgb { r: 0x64, g: 0x96, b: 0xFF });
    }

    #[test]
    fn test_normalize_lowercase_without_hash() {
        assert_eq!(normalize_hex("a0b1c2").unwrap(), "#A0B1C2");
    }

    #[test]
    fn test_reject_bad_colors() {
        for bad in ["", "#123", "#GGGGGG", "#1234567", "blue"] {
            assert!(Rgb::from_hex(bad).is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_rgba_alpha_is_clamped() {
        let c = Rgb { r: 1, g: 2, b: 3 };
        assert_eq!(c.to_rgba(2.0), image::Rgba([1, 2, 3, 255]));
        assert_eq!(c.to_rgba(0.0), image::Rgba([1, 2, 3, 0]));
    }
}
