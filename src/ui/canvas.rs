use cgmath::{Basis2, Deg, Rotation, Rotation2, Vector2};
use iced::alignment;
use iced::mouse::{self, Cursor};
use iced::widget::canvas::{self, Frame, LineCap, LineDash, Path, Program, Stroke};
use iced::{Color, Pixels, Point, Rectangle, Renderer, Size, Theme, Vector};

use crate::color::Rgb;
use crate::config::{MIN_ITEM_STAGE_SIZE, PAN_THRESHOLD_PX};
use crate::state::data::normalize_rotation;
use crate::state::editor::{Editor, StageBox};
use crate::units::format_feet_inches;
use crate::Message;

/// Side of a square resize handle, stage pixels
const HANDLE_SIZE: f32 = 8.0;

/// Distance of the rotate handle above an item's top edge
const ROTATE_HANDLE_OFFSET: f32 = 24.0;

/// Pointer distance that still counts as hitting a handle
const HANDLE_HIT_RADIUS: f32 = 7.0;

/// Wheel pixels per zoom tick for trackpads
const PIXELS_PER_TICK: f32 = 40.0;

const SELECTION: Color = Color::from_rgb(0.0, 0.6, 1.0);
const SCALE_LINE: Color = Color::from_rgb(1.0, 0.0, 0.0);
const SCALE_DASH: [f32; 2] = [10.0, 5.0];

/// Gestures the canvas reports, all in stage coordinates
#[derive(Debug, Clone)]
pub enum CanvasEvent {
    /// Left click on empty stage or on the plan itself
    Clicked(Point),
    Select(String),
    Pan(Vector),
    Zoom { pointer: Point, ticks: f32 },
    DragEnded { id: String, center: Point },
    TransformEnded { id: String, gesture: StageBox },
}

/// Renders the floor plan and furniture, turns mouse input into `CanvasEvent`s
pub struct FloorPlanCanvas<'a> {
    pub editor: &'a Editor,
}

impl<'a> FloorPlanCanvas<'a> {
    /// Stage box for an item, substituting the live preview of the gesture in progress
    fn box_for(&self, state: &Interaction, id: &str) -> Option<StageBox> {
        match state {
            Interaction::Moving { id: active, preview, .. }
            | Interaction::Resizing { id: active, preview, .. }
            | Interaction::Rotating { id: active, preview } if active == id => Some(*preview),
            _ => self.editor.item(id).and_then(|item| self.editor.stage_box(item)),
        }
    }

    /// Topmost item under the pointer
    fn item_at(&self, p: Point) -> Option<(String, StageBox)> {
        self.editor.furniture().iter().rev().find_map(|item| {
            let b = self.editor.stage_box(item)?;
            contains(&b, p).then(|| (item.id.clone(), b))
        })
    }

    /// Handle of the selected item under the pointer
    fn handle_at(&self, p: Point) -> Option<(String, StageBox, Handle)> {
        let item = self.editor.selected()?;
        let b = self.editor.stage_box(item)?;

        if rotate_handle_position(&b).distance(p) <= HANDLE_HIT_RADIUS {
            return Some((item.id.clone(), b, Handle::Rotate));
        }
        Corner::ALL
            .into_iter()
            .find(|&corner| corner_position(&b, corner).distance(p) <= HANDLE_HIT_RADIUS)
            .map(|corner| (item.id.clone(), b, Handle::Resize(corner)))
    }
}

impl<'a> Program<Message> for FloorPlanCanvas<'a> {
    type State = Interaction;

    fn draw(
        &self,
        state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        let viewport = self.editor.viewport();

        frame.fill_rectangle(Point::ORIGIN, bounds.size(), Color::from_rgb8(0x2B, 0x2D, 0x31));

        if let (Some(plan), Some(image_bounds)) = (self.editor.plan(), viewport.image_bounds()) {
            frame.draw_image(image_bounds, canvas::Image::new(plan.handle.clone()));
        }

        for item in self.editor.furniture() {
            let Some(b) = self.box_for(state, &item.id) else {
                continue;
            };
            let fill = Rgb::from_hex(&item.color)
                .map(|c| c.to_iced(item.opacity))
                .unwrap_or(Color::from_rgba(0.39, 0.59, 1.0, item.opacity));
            let selected = self.editor.selected_id() == Some(item.id.as_str());

            frame.with_save(|frame| {
                frame.translate(Vector::new(b.center.x, b.center.y));
                frame.rotate(b.rotation.to_radians());
                let top_left = Point::new(-b.width / 2.0, -b.height / 2.0);
                let size = Size::new(b.width, b.height);
                frame.fill_rectangle(top_left, size, fill);
                frame.stroke(
                    &Path::rectangle(top_left, size),
                    Stroke::default()
                        .with_color(if selected { SELECTION } else { Color::BLACK })
                        .with_width(if selected { 2.0 } else { 1.0 }),
                );
            });

            // Text ignores frame rotation, so labels are drawn upright at the centre
            if b.width.min(b.height) > 24.0 {
                frame.fill_text(canvas::Text {
                    content: format!(
                        "{}\n{} × {}",
                        item.name,
                        format_feet_inches(item.width),
                        format_feet_inches(item.height)
                    ),
                    position: b.center,
                    color: Color::BLACK,
                    size: Pixels(12.0),
                    horizontal_alignment: alignment::Horizontal::Center,
                    vertical_alignment: alignment::Vertical::Center,
                    ..canvas::Text::default()
                });
            }

            if selected {
                draw_handles(&mut frame, &b);
            }
        }

        // Scale line while it is being drawn or awaiting its length
        let points = self.editor.calibration.points();
        if !points.is_empty() {
            let stage: Vec<Point> = points.iter().map(|p| viewport.image_to_stage(*p)).collect();
            if let [a, b] = stage.as_slice() {
                let line = Path::line(*a, *b);
                frame.stroke(
                    &line,
                    Stroke {
                        line_dash: LineDash { segments: &SCALE_DASH, offset: 0 },
                        ..Stroke::default()
                            .with_color(SCALE_LINE)
                            .with_width(3.0)
                            .with_line_cap(LineCap::Round)
                    },
                );
            }
            for p in &stage {
                frame.fill(&Path::circle(*p, 4.0), SCALE_LINE);
            }
        }

        vec![frame.into_geometry()]
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        let stage = bounds.size();
        let emit = |event: CanvasEvent| {
            (canvas::event::Status::Captured, Some(Message::Canvas(event, stage)))
        };
        let captured = (canvas::event::Status::Captured, None);

        match event {
            // Mouse wheel for zooming around the pointer
            canvas::Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                let Some(pointer) = cursor.position_in(bounds) else {
                    return (canvas::event::Status::Ignored, None);
                };
                let ticks = match delta {
                    mouse::ScrollDelta::Lines { y, .. } => y,
                    mouse::ScrollDelta::Pixels { y, .. } => y / PIXELS_PER_TICK,
                };
                return emit(CanvasEvent::Zoom { pointer, ticks });
            }

            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let Some(pos) = cursor.position_in(bounds) else {
                    return (canvas::event::Status::Ignored, None);
                };

                // Furniture is inert while the scale line is being drawn
                if !self.editor.calibration.is_capturing() {
                    if let Some((id, b, handle)) = self.handle_at(pos) {
                        *state = match handle {
                            Handle::Rotate => Interaction::Rotating { id, preview: b },
                            Handle::Resize(corner) => Interaction::Resizing { id, corner, preview: b },
                        };
                        return captured;
                    }
                    if let Some((id, b)) = self.item_at(pos) {
                        *state = Interaction::Moving {
                            id: id.clone(),
                            grab: b.center - pos,
                            preview: b,
                        };
                        return emit(CanvasEvent::Select(id));
                    }
                }

                *state = Interaction::Pressing { origin: pos, last: pos, panning: false };
                return captured;
            }

            canvas::Event::Mouse(mouse::Event::ButtonPressed(
                mouse::Button::Right | mouse::Button::Middle,
            )) => {
                if let Some(pos) = cursor.position_in(bounds) {
                    *state = Interaction::Panning { last: pos };
                    return captured;
                }
            }

            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                // Positions outside the canvas still drive an active gesture
                let Some(pos) = cursor.position().map(|p| p - Vector::new(bounds.x, bounds.y)) else {
                    return (canvas::event::Status::Ignored, None);
                };

                match state {
                    Interaction::Pressing { origin, last, panning } => {
                        if !*panning && origin.distance(pos) > PAN_THRESHOLD_PX {
                            *panning = true;
                        }
                        if *panning {
                            let delta = pos - *last;
                            *last = pos;
                            return emit(CanvasEvent::Pan(delta));
                        }
                        return captured;
                    }
                    Interaction::Panning { last } => {
                        let delta = pos - *last;
                        *last = pos;
                        return emit(CanvasEvent::Pan(delta));
                    }
                    Interaction::Moving { grab, preview, .. } => {
                        preview.center = pos + *grab;
                        return captured;
                    }
                    Interaction::Resizing { corner, preview, .. } => {
                        *preview = resize(preview, *corner, pos);
                        return captured;
                    }
                    Interaction::Rotating { preview, .. } => {
                        preview.rotation = rotation_towards(preview, pos);
                        return captured;
                    }
                    Interaction::Idle => {}
                }
            }

            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                let finished = std::mem::take(state);
                match finished {
                    Interaction::Pressing { origin, panning: false, .. } => {
                        return emit(CanvasEvent::Clicked(origin));
                    }
                    Interaction::Moving { id, preview, .. } => {
                        return emit(CanvasEvent::DragEnded { id, center: preview.center });
                    }
                    Interaction::Resizing { id, preview, .. } | Interaction::Rotating { id, preview } => {
                        return emit(CanvasEvent::TransformEnded { id, gesture: preview });
                    }
                    Interaction::Idle => {}
                    _ => return captured,
                }
            }

            canvas::Event::Mouse(mouse::Event::ButtonReleased(
                mouse::Button::Right | mouse::Button::Middle,
            )) => {
                if matches!(state, Interaction::Panning { .. }) {
                    *state = Interaction::Idle;
                    return captured;
                }
            }

            _ => {}
        }

        (canvas::event::Status::Ignored, None)
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> mouse::Interaction {
        match state {
            Interaction::Moving { .. } | Interaction::Panning { .. } => return mouse::Interaction::Grabbing,
            Interaction::Pressing { panning: true, .. } => return mouse::Interaction::Grabbing,
            Interaction::Resizing { .. } | Interaction::Rotating { .. } => {
                return mouse::Interaction::Crosshair
            }
            _ => {}
        }

        let Some(pos) = cursor.position_in(bounds) else {
            return mouse::Interaction::default();
        };
        if self.editor.calibration.is_capturing() {
            mouse::Interaction::Crosshair
        } else if self.handle_at(pos).is_some() {
            mouse::Interaction::Crosshair
        } else if self.item_at(pos).is_some() {
            mouse::Interaction::Grab
        } else {
            mouse::Interaction::default()
        }
    }
}

/// Gesture in progress on the canvas
#[derive(Debug, Clone, Default)]
pub enum Interaction {
    #[default]
    Idle,
    /// Left press on the background: a click, or a pan once the pointer travels
    Pressing { origin: Point, last: Point, panning: bool },
    /// Right/middle drag
    Panning { last: Point },
    Moving { id: String, grab: Vector, preview: StageBox },
    Resizing { id: String, corner: Corner, preview: StageBox },
    Rotating { id: String, preview: StageBox },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Handle {
    Resize(Corner),
    Rotate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    const ALL: [Corner; 4] = [Corner::TopLeft, Corner::TopRight, Corner::BottomRight, Corner::BottomLeft];

    /// Direction of this corner from the centre, item-local
    fn signs(self) -> (f32, f32) {
        match self {
            Corner::TopLeft => (-1.0, -1.0),
            Corner::TopRight => (1.0, -1.0),
            Corner::BottomRight => (1.0, 1.0),
            Corner::BottomLeft => (-1.0, 1.0),
        }
    }
}

fn draw_handles(frame: &mut Frame, b: &StageBox) {
    let top = to_stage(b, Vector2::new(0.0, -b.height / 2.0));
    let knob = rotate_handle_position(b);
    frame.stroke(&Path::line(top, knob), Stroke::default().with_color(SELECTION).with_width(1.0));
    frame.fill(&Path::circle(knob, HANDLE_SIZE / 2.0 + 1.0), SELECTION);

    for corner in Corner::ALL {
        let p = corner_position(b, corner);
        let top_left = Point::new(p.x - HANDLE_SIZE / 2.0, p.y - HANDLE_SIZE / 2.0);
        let size = Size::new(HANDLE_SIZE, HANDLE_SIZE);
        frame.fill_rectangle(top_left, size, Color::WHITE);
        frame.stroke(&Path::rectangle(top_left, size), Stroke::default().with_color(SELECTION));
    }
}

// ========== Item-local geometry ==========
//
// Local coordinates have the item centre at the origin and its axes
// aligned with the item's width and height.

fn to_local(b: &StageBox, p: Point) -> Vector2<f32> {
    let rot: Basis2<f32> = Rotation2::from_angle(Deg(-b.rotation));
    rot.rotate_vector(Vector2::new(p.x - b.center.x, p.y - b.center.y))
}

fn to_stage(b: &StageBox, v: Vector2<f32>) -> Point {
    let rot: Basis2<f32> = Rotation2::from_angle(Deg(b.rotation));
    let v = rot.rotate_vector(v);
    Point::new(b.center.x + v.x, b.center.y + v.y)
}

fn contains(b: &StageBox, p: Point) -> bool {
    let local = to_local(b, p);
    local.x.abs() <= b.width / 2.0 && local.y.abs() <= b.height / 2.0
}

fn corner_position(b: &StageBox, corner: Corner) -> Point {
    let (sx, sy) = corner.signs();
    to_stage(b, Vector2::new(sx * b.width / 2.0, sy * b.height / 2.0))
}

fn rotate_handle_position(b: &StageBox) -> Point {
    to_stage(b, Vector2::new(0.0, -b.height / 2.0 - ROTATE_HANDLE_OFFSET))
}

/// Drag `corner` to `pointer`, keeping the opposite corner fixed
fn resize(b: &StageBox, corner: Corner, pointer: Point) -> StageBox {
    let (sx, sy) = corner.signs();
    let local = to_local(b, pointer);
    let anchor = Vector2::new(-sx * b.width / 2.0, -sy * b.height / 2.0);

    let width = ((local.x - anchor.x) * sx).max(MIN_ITEM_STAGE_SIZE);
    let height = ((local.y - anchor.y) * sy).max(MIN_ITEM_STAGE_SIZE);
    let center = to_stage(b, anchor + Vector2::new(sx * width / 2.0, sy * height / 2.0));

    StageBox { center, width, height, rotation: b.rotation }
}

/// Rotation that points the item's top edge at `pointer`
fn rotation_towards(b: &StageBox, pointer: Point) -> f32 {
    let dx = pointer.x - b.center.x;
    let dy = pointer.y - b.center.y;
    if dx == 0.0 && dy == 0.0 {
        return b.rotation;
    }
    normalize_rotation(dy.atan2(dx).to_degrees() + 90.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    fn sample(rotation: f32) -> StageBox {
        StageBox { center: Point::new(100.0, 100.0), width: 40.0, height: 20.0, rotation }
    }

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
    }

    #[test]
    fn test_contains_respects_rotation() {
        let flat = sample(0.0);
        assert!(contains(&flat, Point::new(118.0, 100.0)));
        assert!(!contains(&flat, Point::new(100.0, 115.0)));

        let upright = sample(90.0);
        assert!(!contains(&upright, Point::new(118.0, 100.0)));
        assert!(contains(&upright, Point::new(100.0, 115.0)));
    }

    #[test]
    fn test_corner_positions() {
        let b = sample(0.0);
        assert!(close(corner_position(&b, Corner::TopLeft), Point::new(80.0, 90.0)));
        assert!(close(corner_position(&b, Corner::BottomRight), Point::new(120.0, 110.0)));

        // Clockwise quarter turn moves the top-left corner to the top-right
        let turned = sample(90.0);
        assert!(close(corner_position(&turned, Corner::TopLeft), Point::new(110.0, 80.0)));
    }

    #[test]
    fn test_resize_keeps_opposite_corner() {
        for rotation in [0.0_f32, 30.0, 200.0] {
            let b = sample(rotation);
            let fixed = corner_position(&b, Corner::TopLeft);
            let target = to_stage(&b, Vector2::new(40.0, 25.0));
            let resized = resize(&b, Corner::BottomRight, target);

            assert!((resized.width - 60.0).abs() < EPS);
            assert!((resized.height - 35.0).abs() < EPS);
            assert!(close(corner_position(&resized, Corner::TopLeft), fixed));
        }
    }

    #[test]
    fn test_resize_has_minimum() {
        let b = sample(0.0);
        // Drag the bottom-right corner past the top-left one
        let resized = resize(&b, Corner::BottomRight, Point::new(0.0, 0.0));
        assert_eq!(resized.width, MIN_ITEM_STAGE_SIZE);
        assert_eq!(resized.height, MIN_ITEM_STAGE_SIZE);
    }

    #[test]
    fn test_rotation_towards_pointer() {
        let b = sample(0.0);
        assert!((rotation_towards(&b, Point::new(100.0, 50.0)) - 0.0).abs() < EPS);
        assert!((rotation_towards(&b, Point::new(150.0, 100.0)) - 90.0).abs() < EPS);
        assert!((rotation_towards(&b, Point::new(100.0, 150.0)) - 180.0).abs() < EPS);
        assert!((rotation_towards(&b, Point::new(50.0, 100.0)) - 270.0).abs() < EPS);
    }

    #[test]
    fn test_rotate_handle_above_top_edge() {
        let b = sample(0.0);
        assert!(close(rotate_handle_position(&b), Point::new(100.0, 90.0 - ROTATE_HANDLE_OFFSET)));
    }
}
