/// Two-click scale calibration
///
/// ```text
/// Idle --start--> AwaitingFirstPoint --click--> AwaitingSecondPoint
///      --click--> AwaitingConfirmation --confirm(length)--> Calibrated
/// ```
///
/// `start` may be called from any phase and always discards the current
/// scale. Confirmation turns the line length (image pixels) and the typed
/// real-world length into `pixels_per_inch`.

use iced::Point;

use crate::error::{PlannerError, Result};
use crate::units::parse_length;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    AwaitingFirstPoint,
    AwaitingSecondPoint,
    AwaitingConfirmation,
    Calibrated,
}

#[derive(Debug, Clone, Default)]
pub struct Calibration {
    phase: Phase,
    /// At most two points, image space
    points: Vec<Point>,
    /// Distance between the two points, image pixels
    pixel_length: f32,
    /// Real-world length as typed by the user
    pub input: String,
    pixels_per_inch: Option<f32>,
}

impl Calibration {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn pixel_length(&self) -> f32 {
        self.pixel_length
    }

    pub fn pixels_per_inch(&self) -> Option<f32> {
        self.pixels_per_inch
    }

    /// Clicks on the plan are scale points rather than selection
    pub fn is_capturing(&self) -> bool {
        matches!(self.phase, Phase::AwaitingFirstPoint | Phase::AwaitingSecondPoint)
    }

    /// Enter calibration mode, discarding any previous line and scale
    pub fn start(&mut self) {
        self.phase = Phase::AwaitingFirstPoint;
        self.points.clear();
        self.pixel_length = 0.0;
        self.input.clear();
        self.pixels_per_inch = None;
    }

    /// Forget everything (new image loaded)
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Record a click in image space; ignored unless capturing
    pub fn register_point(&mut self, point: Point) {
        if !self.is_capturing() {
            return;
        }

        if self.points.len() >= 2 {
            self.points.clear();
            self.pixel_length = 0.0;
            self.phase = Phase::AwaitingFirstPoint;
            return;
        }

        self.points.push(point);
        match self.points.as_slice() {
            [_] => self.phase = Phase::AwaitingSecondPoint,
            [a, b] => {
                self.pixel_length = a.distance(*b);
                self.phase = Phase::AwaitingConfirmation;
            }
            _ => {}
        }
    }

    /// Turn the typed length into a scale
    ///
    /// An unparsable length is rejected without touching the state. A
    /// degenerate line or a missing image identity is rejected and clears
    /// the points so the user starts over.
    pub fn confirm(&mut self, image_id: Option<&str>) -> Result<f32> {
        let inches = parse_length(&self.input)?;

        if self.pixel_length <= 0.0 || self.points.len() < 2 {
            self.clear_points();
            return Err(PlannerError::MissingScaleLine);
        }
        if image_id.is_none() {
            self.clear_points();
            return Err(PlannerError::MissingImage);
        }

        let ppi = self.pixel_length / inches;
        self.pixels_per_inch = Some(ppi);
        self.phase = Phase::Calibrated;
        self.input.clear();
        Ok(ppi)
    }

    /// Adopt a scale that did not come from drawing a line (saved or imported)
    pub fn apply_scale(&mut self, pixels_per_inch: f32) {
        self.points.clear();
        self.pixel_length = 0.0;
        self.input.clear();
        self.pixels_per_inch = Some(pixels_per_inch);
        self.phase = Phase::Calibrated;
    }

    fn clear_points(&mut self) {
        self.points.clear();
        self.pixel_length = 0.0;
        self.phase = if self.pixels_per_inch.is_some() {
            Phase::Calibrated
        } else {
            Phase::Idle
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calibrated_line(length: f32) -> Calibration {
        let mut c = Calibration::default();
        c.start();
        c.register_point(Point::new(10.0, 10.0));
        c.register_point(Point::new(10.0 + length, 10.0));
        c
    }

    #[test]
    fn test_start_twice_is_clean() {
        let mut c = calibrated_line(240.0);
        c.input = "10'".into();
        c.confirm(Some("img")).unwrap();

        c.start();
        c.start();
        assert!(c.points().is_empty());
        assert_eq!(c.pixels_per_inch(), None);
        assert_eq!(c.phase(), Phase::AwaitingFirstPoint);
    }

    #[test]
    fn test_two_clicks_then_confirm() {
        let mut c = calibrated_line(240.0);
        assert_eq!(c.phase(), Phase::AwaitingConfirmation);
        assert!(!c.is_capturing());
        assert!((c.pixel_length() - 240.0).abs() < 1e-4);

        c.input = "10'".into();
        let ppi = c.confirm(Some("img")).unwrap();
        assert!((ppi - 2.0).abs() < 1e-6);
        assert_eq!(c.phase(), Phase::Calibrated);
        assert!(c.input.is_empty());
    }

    #[test]
    fn test_invalid_length_changes_nothing() {
        let mut c = calibrated_line(100.0);
        c.input = "abc".into();
        assert!(matches!(c.confirm(Some("img")), Err(PlannerError::InvalidLength(_))));
        assert_eq!(c.points().len(), 2);
        assert_eq!(c.phase(), Phase::AwaitingConfirmation);
        assert_eq!(c.input, "abc");
    }

    #[test]
    fn test_zero_length_line_is_reset() {
        let mut c = calibrated_line(0.0);
        c.input = "12".into();
        assert!(matches!(c.confirm(Some("img")), Err(PlannerError::MissingScaleLine)));
        assert!(c.points().is_empty());
        assert_eq!(c.pixels_per_inch(), None);
    }

    #[test]
    fn test_missing_identity_is_reset() {
        let mut c = calibrated_line(50.0);
        c.input = "12".into();
        assert!(matches!(c.confirm(None), Err(PlannerError::MissingImage)));
        assert!(c.points().is_empty());
    }

    #[test]
    fn test_clicks_ignored_when_idle() {
        let mut c = Calibration::default();
        c.register_point(Point::new(1.0, 1.0));
        assert!(c.points().is_empty());
        assert_eq!(c.phase(), Phase::Idle);
    }

    #[test]
    fn test_apply_saved_scale() {
        let mut c = Calibration::default();
        c.apply_scale(5.0);
        assert_eq!(c.pixels_per_inch(), Some(5.0));
        assert_eq!(c.phase(), Phase::Calibrated);
    }
}
