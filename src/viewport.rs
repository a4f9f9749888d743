/// Image space <-> stage space mapping
///
/// Image space is fixed to the floor plan's pixel grid (origin top-left).
/// Stage space is the canvas widget: the image is "contain"-fit and
/// centred at zoom 1, zoom scales that fit uniformly, and pan is an
/// additive translation on top.
///
/// ```text
/// display_scale = min(stage_w / image_w, stage_h / image_h) * zoom
/// offset        = (stage - image * display_scale) / 2
/// stage         = image * display_scale + offset + pan
/// ```
///
/// A `Viewport` is cheap and never authoritative: it is rebuilt from the
/// stage bounds, the image size and the user's zoom/pan whenever needed.

use iced::{Point, Size, Vector};

use crate::config::{CALIBRATION_TOLERANCE_PX, MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub stage: Size,
    /// Intrinsic image size, None when no floor plan is loaded
    pub image: Option<Size>,
    pub zoom: f32,
    pub pan: Vector,
}

impl Viewport {
    pub fn new(stage: Size, image: Option<Size>, zoom: f32, pan: Vector) -> Self {
        Self { stage, image, zoom, pan }
    }

    /// Fit-to-stage factor before zoom; 1.0 without an image
    pub fn fit_scale(&self) -> f32 {
        match self.image {
            Some(image) if image.width > 0.0 && image.height > 0.0 => {
                (self.stage.width / image.width).min(self.stage.height / image.height)
            }
            _ => 1.0,
        }
    }

    /// Stage pixels per image pixel
    pub fn display_scale(&self) -> f32 {
        match self.image {
            Some(_) => self.fit_scale() * self.zoom,
            None => 1.0,
        }
    }

    /// Centring offset of the scaled image inside the stage
    pub fn offset(&self) -> Vector {
        match self.image {
            Some(image) => {
                let scale = self.display_scale();
                Vector::new(
                    (self.stage.width - image.width * scale) / 2.0,
                    (self.stage.height - image.height * scale) / 2.0,
                )
            }
            None => Vector::new(0.0, 0.0),
        }
    }

    pub fn image_to_stage(&self, p: Point) -> Point {
        let scale = self.display_scale();
        let offset = self.offset();
        Point::new(
            p.x * scale + offset.x + self.pan.x,
            p.y * scale + offset.y + self.pan.y,
        )
    }

    pub fn stage_to_image(&self, p: Point) -> Point {
        let scale = self.display_scale();
        let offset = self.offset();
        Point::new(
            (p.x - self.pan.x - offset.x) / scale,
            (p.y - self.pan.y - offset.y) / scale,
        )
    }

    /// Length in image pixels -> stage pixels
    pub fn to_stage_length(&self, image_len: f32) -> f32 {
        image_len * self.display_scale()
    }

    /// Length in stage pixels -> image pixels
    pub fn to_image_length(&self, stage_len: f32) -> f32 {
        stage_len / self.display_scale()
    }

    /// Stage rectangle covered by the image, if any
    pub fn image_bounds(&self) -> Option<iced::Rectangle> {
        let image = self.image?;
        let top_left = self.image_to_stage(Point::ORIGIN);
        let scale = self.display_scale();
        Some(iced::Rectangle::new(
            top_left,
            Size::new(image.width * scale, image.height * scale),
        ))
    }

    /// Map a stage click onto the image for scale calibration
    ///
    /// Points within one display pixel of the image edge are clamped onto
    /// it; anything further out (or any click without an image) is ignored.
    pub fn calibration_point(&self, stage_point: Point) -> Option<Point> {
        let image = self.image?;
        let p = self.stage_to_image(stage_point);
        let tolerance = CALIBRATION_TOLERANCE_PX / self.display_scale();

        let inside = p.x >= -tolerance
            && p.y >= -tolerance
            && p.x <= image.width + tolerance
            && p.y <= image.height + tolerance;

        inside.then(|| Point::new(p.x.clamp(0.0, image.width), p.y.clamp(0.0, image.height)))
    }

    /// Zoom by wheel ticks keeping the image point under `pointer` fixed
    ///
    /// Returns the new (zoom, pan). Zoom is bounded to [MIN_ZOOM, MAX_ZOOM].
    pub fn zoom_at(&self, pointer: Point, ticks: f32) -> (f32, Vector) {
        let new_zoom = (self.zoom * ZOOM_STEP.powf(ticks)).clamp(MIN_ZOOM, MAX_ZOOM);
        if self.image.is_none() {
            return (new_zoom, self.pan);
        }

        // Image point under the pointer with the old zoom and pan
        let anchor = self.stage_to_image(pointer);

        let zoomed = Viewport { zoom: new_zoom, pan: Vector::new(0.0, 0.0), ..*self };
        let scale = zoomed.display_scale();
        let offset = zoomed.offset();
        let pan = Vector::new(
            pointer.x - anchor.x * scale - offset.x,
            pointer.y - anchor.y * scale - offset.y,
        );

        (new_zoom, pan)
    }
}
