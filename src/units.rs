/// Real-world unit conversion
///
/// Furniture sizes are stored in inches and positions in image pixels.
/// `pixels_per_inch` links the two once the scale has been calibrated.
/// Callers must hold a calibrated scale before converting; an unset
/// scale is represented as `Option<f32>` upstream and never reaches here.

use crate::error::{PlannerError, Result};

const INCHES_PER_FOOT: f32 = 12.0;

/// Convert a real-world length to image pixels
pub fn inches_to_pixels(inches: f32, pixels_per_inch: f32) -> f32 {
    inches * pixels_per_inch
}

/// Convert an image-pixel length to inches
pub fn pixels_to_inches(pixels: f32, pixels_per_inch: f32) -> f32 {
    pixels / pixels_per_inch
}

/// Parse a user-entered length into inches
///
/// Accepted forms:
/// - `120`     bare number, inches
/// - `66"`     inches with explicit mark
/// - `10'`     feet
/// - `5'6"`    feet and inches (the trailing `"` is optional, spaces allowed)
/// - `7.5'`    fractional feet
///
/// The result must be strictly positive.
pub fn parse_length(input: &str) -> Result<f32> {
    let invalid = || PlannerError::InvalidLength(input.trim().to_string());
    let s = input.trim();

    let inches = if let Some((feet, rest)) = s.split_once('\'') {
        let feet = parse_component(feet).ok_or_else(invalid)?;
        let rest = rest.trim();
        let rest = rest.strip_suffix('"').unwrap_or(rest);
        let extra = if rest.trim().is_empty() {
            0.0
        } else {
            parse_component(rest).ok_or_else(invalid)?
        };
        feet * INCHES_PER_FOOT + extra
    } else if let Some(inches) = s.strip_suffix('"') {
        parse_component(inches).ok_or_else(invalid)?
    } else {
        parse_component(s).ok_or_else(invalid)?
    };

    if inches > 0.0 && inches.is_finite() {
        Ok(inches)
    } else {
        Err(invalid())
    }
}

/// One numeric piece of a length: finite and non-negative
fn parse_component(s: &str) -> Option<f32> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let value: f32 = s.parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Format inches as feet and inches, e.g. `7' 0"` or `5' 6.5"`
pub fn format_feet_inches(inches: f32) -> String {
    // Work in tenths of an inch so 11.96" does not print as 12.0"
    let tenths = (inches.max(0.0) * 10.0).round() as i64;
    let feet = tenths / 120;
    let rem = tenths % 120;

    if rem % 10 == 0 {
        format!("{}' {}\"", feet, rem / 10)
    } else {
        format!("{}' {:.1}\"", feet, rem as f32 / 10.0)
    }
}
