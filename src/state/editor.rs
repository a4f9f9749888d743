/// The single in-memory document and every action that mutates it
///
/// `Editor` owns the loaded floor plan, its calibration, the placed
/// furniture, the selection and the user's zoom/pan. The application
/// calls exactly one method per UI event; each method either applies its
/// whole change or returns an error and leaves the editor untouched.
///
/// Gestures arrive in stage space. Anything stored goes through the
/// inverse viewport transform first, so furniture is always kept as
/// image-pixel centres and inch sizes.

use iced::widget::image::Handle;
use iced::{Point, Size, Vector};
use std::sync::Arc;

use crate::config::{CLONE_OFFSET_PX, DEFAULT_STAGE_HEIGHT, DEFAULT_STAGE_WIDTH};
use crate::error::{PlannerError, Result};
use crate::units::{inches_to_pixels, pixels_to_inches};
use crate::viewport::Viewport;

use super::calibration::Calibration;
use super::data::{
    builtin_templates, normalize_rotation, FurnitureItem, FurnitureTemplate, ImageIdentity,
};
use super::edit::{CustomTemplateDraft, FurnitureEdit};
use super::layout::Layout;
use super::library::Library;

/// The loaded floor plan
#[derive(Debug, Clone)]
pub struct FloorPlan {
    pub filename: String,
    pub size: Size,
    pub bytes: Arc<Vec<u8>>,
    pub handle: Handle,
    /// Bumped on every load so late identity results can be matched
    pub generation: u64,
}

/// An item's rectangle as drawn on the stage
///
/// Also the payload of a finished resize/rotate gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageBox {
    pub center: Point,
    pub width: f32,
    pub height: f32,
    /// Clockwise degrees
    pub rotation: f32,
}

#[derive(Debug)]
pub struct Editor {
    library: Library,
    plan: Option<FloorPlan>,
    identity: ImageIdentity,
    pub calibration: Calibration,
    /// Scale saved for this image in an earlier session, awaiting the user's yes/no
    saved_scale_offer: Option<f32>,
    furniture: Vec<FurnitureItem>,
    selected: Option<String>,
    templates: Vec<FurnitureTemplate>,
    zoom: f32,
    pan: Vector,
    stage: Size,
    generation: u64,
}

impl Editor {
    pub fn new(library: Library) -> Self {
        let mut editor = Self {
            library,
            plan: None,
            identity: ImageIdentity::None,
            calibration: Calibration::default(),
            saved_scale_offer: None,
            furniture: Vec::new(),
            selected: None,
            templates: Vec::new(),
            zoom: 1.0,
            pan: Vector::new(0.0, 0.0),
            stage: Size::new(DEFAULT_STAGE_WIDTH, DEFAULT_STAGE_HEIGHT),
            generation: 0,
        };
        editor.reload_templates();
        editor
    }

    // ========== Read access ==========

    pub fn plan(&self) -> Option<&FloorPlan> {
        self.plan.as_ref()
    }

    pub fn identity(&self) -> &ImageIdentity {
        &self.identity
    }

    pub fn furniture(&self) -> &[FurnitureItem] {
        &self.furniture
    }

    pub fn item(&self, id: &str) -> Option<&FurnitureItem> {
        self.furniture.iter().find(|item| item.id == id)
    }

    pub fn selected(&self) -> Option<&FurnitureItem> {
        self.selected.as_deref().and_then(|id| self.item(id))
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn templates(&self) -> &[FurnitureTemplate] {
        &self.templates
    }

    pub fn pixels_per_inch(&self) -> Option<f32> {
        self.calibration.pixels_per_inch()
    }

    pub fn saved_scale_offer(&self) -> Option<f32> {
        self.saved_scale_offer
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Current mapping between image and stage, rebuilt on demand
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.stage, self.plan.as_ref().map(|p| p.size), self.zoom, self.pan)
    }

    /// Stage rectangle of an item; None until a scale is set
    pub fn stage_box(&self, item: &FurnitureItem) -> Option<StageBox> {
        let ppi = self.pixels_per_inch()?;
        let viewport = self.viewport();
        Some(StageBox {
            center: viewport.image_to_stage(Point::new(item.x, item.y)),
            width: viewport.to_stage_length(inches_to_pixels(item.width, ppi)),
            height: viewport.to_stage_length(inches_to_pixels(item.height, ppi)),
            rotation: item.rotation,
        })
    }

    // ========== Image lifecycle ==========

    /// Show a freshly decoded floor plan and reset the document
    ///
    /// Identity is `Pending` until `identity_resolved` arrives with the
    /// returned generation. Loads are not cancelled: if two uploads race,
    /// whichever decode lands last is the image on screen.
    pub fn load_image(&mut self, filename: String, bytes: Arc<Vec<u8>>, width: u32, height: u32, handle: Handle) -> u64 {
        self.generation += 1;
        self.plan = Some(FloorPlan {
            filename,
            size: Size::new(width as f32, height as f32),
            bytes,
            handle,
            generation: self.generation,
        });
        self.identity = ImageIdentity::Pending;
        self.calibration.reset();
        self.saved_scale_offer = None;
        self.furniture.clear();
        self.selected = None;
        self.reset_view();
        self.reload_templates();
        self.generation
    }

    /// Settle the identity of the image loaded as `generation`
    ///
    /// Returns a previously saved scale for this image, which is offered
    /// to the user rather than applied.
    pub fn identity_resolved(&mut self, generation: u64, identity: String) -> Option<f32> {
        if self.plan.as_ref().map(|p| p.generation) != Some(generation) {
            tracing::debug!(generation, "Ignoring identity for a superseded image");
            return None;
        }

        tracing::info!(identity = %identity, "🔑 Image identity resolved");
        self.saved_scale_offer = match self.library.scale_for_image(&identity) {
            Ok(scale) => scale,
            Err(e) => {
                tracing::warn!(error = %e, "⚠️  Could not look up saved scale");
                None
            }
        };
        self.identity = ImageIdentity::Resolved(identity);
        self.reload_templates();
        self.saved_scale_offer
    }

    pub fn accept_saved_scale(&mut self) -> Result<f32> {
        let scale = self.saved_scale_offer.take().ok_or(PlannerError::MissingScale)?;
        self.calibration.apply_scale(scale);
        tracing::info!(pixels_per_inch = scale, "♻️  Reused saved scale");
        Ok(scale)
    }

    pub fn dismiss_saved_scale(&mut self) {
        self.saved_scale_offer = None;
    }

    // ========== Calibration ==========

    pub fn start_calibration(&mut self) -> Result<()> {
        if self.plan.is_none() {
            return Err(PlannerError::MissingImage);
        }
        self.calibration.start();
        self.saved_scale_offer = None;
        self.selected = None;
        Ok(())
    }

    /// Confirm the typed length, persist the new scale for this image
    pub fn confirm_scale(&mut self) -> Result<f32> {
        let identity = self.identity.resolved().map(str::to_string);
        let ppi = self.calibration.confirm(identity.as_deref())?;

        if let Some(identity) = identity {
            if let Err(e) = self.library.save_scale(&identity, ppi) {
                tracing::warn!(error = %e, "⚠️  Scale set but could not be saved");
            }
        }
        tracing::info!(pixels_per_inch = ppi, "📏 Scale set");
        Ok(ppi)
    }

    /// Click on empty stage: scale point while calibrating, otherwise deselect
    pub fn stage_click(&mut self, stage_point: Point) {
        if self.calibration.is_capturing() {
            if let Some(point) = self.viewport().calibration_point(stage_point) {
                self.calibration.register_point(point);
            }
        } else {
            self.selected = None;
        }
    }

    // ========== Selection ==========

    pub fn select(&mut self, id: &str) {
        if self.calibration.is_capturing() {
            return;
        }
        if self.item(id).is_some() {
            self.selected = Some(id.to_string());
        }
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    // ========== Furniture ==========

    /// Place an item from a template at the image point under the stage centre
    pub fn add_furniture(&mut self, template_id: &str) -> Result<String> {
        if self.plan.is_none() {
            return Err(PlannerError::MissingImage);
        }
        if self.pixels_per_inch().is_none() {
            return Err(PlannerError::MissingScale);
        }
        let template = self
            .templates
            .iter()
            .find(|t| t.id == template_id)
            .ok_or_else(|| PlannerError::UnknownItem(template_id.to_string()))?;

        let centre = self
            .viewport()
            .stage_to_image(Point::new(self.stage.width / 2.0, self.stage.height / 2.0));
        let id = self.unique_id(&template.id);
        let item = template.instantiate(id.clone(), centre.x, centre.y);

        self.furniture.push(item);
        self.selected = Some(id.clone());
        Ok(id)
    }

    /// Commit a finished drag; only the centre moves
    pub fn drag_end(&mut self, id: &str, stage_center: Point) -> Result<()> {
        let image_center = self.viewport().stage_to_image(stage_center);
        let item = self.item_mut(id)?;
        item.x = image_center.x;
        item.y = image_center.y;
        Ok(())
    }

    /// Commit a finished resize/rotate
    ///
    /// Handle sizes are stage pixels: divide by the display scale for image
    /// pixels, then by pixels-per-inch for inches. Zoom is part of the
    /// display scale, so zooming alone never changes a stored size.
    pub fn transform_end(&mut self, id: &str, gesture: StageBox) -> Result<()> {
        let ppi = self.pixels_per_inch().ok_or(PlannerError::MissingScale)?;
        let viewport = self.viewport();

        let center = viewport.stage_to_image(gesture.center);
        let width = pixels_to_inches(viewport.to_image_length(gesture.width), ppi);
        let height = pixels_to_inches(viewport.to_image_length(gesture.height), ppi);
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(PlannerError::InvalidDimensions);
        }

        let item = self.item_mut(id)?;
        item.x = center.x;
        item.y = center.y;
        item.width = width;
        item.height = height;
        item.rotation = normalize_rotation(gesture.rotation);
        Ok(())
    }

    pub fn rotate_by(&mut self, id: &str, degrees: f32) -> Result<()> {
        let item = self.item_mut(id)?;
        item.rotation = normalize_rotation(item.rotation + degrees);
        Ok(())
    }

    /// Duplicate an item, shifted so both stay visible; selects the copy
    pub fn clone_item(&mut self, id: &str) -> Result<String> {
        let source = self
            .item(id)
            .cloned()
            .ok_or_else(|| PlannerError::UnknownItem(id.to_string()))?;

        let base = template_prefix(&source.id).to_string();
        let copy = FurnitureItem {
            id: self.unique_id(&base),
            x: source.x + CLONE_OFFSET_PX,
            y: source.y + CLONE_OFFSET_PX,
            ..source
        };
        let new_id = copy.id.clone();
        self.furniture.push(copy);
        self.selected = Some(new_id.clone());
        Ok(new_id)
    }

    pub fn delete_item(&mut self, id: &str) -> Result<()> {
        let before = self.furniture.len();
        self.furniture.retain(|item| item.id != id);
        if self.furniture.len() == before {
            return Err(PlannerError::UnknownItem(id.to_string()));
        }
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        Ok(())
    }

    pub fn edit_item(&mut self, id: &str, edit: &FurnitureEdit) -> Result<()> {
        let style = edit.validate()?;
        style.apply(self.item_mut(id)?);
        Ok(())
    }

    // ========== Templates ==========

    pub fn add_custom_template(&mut self, draft: &CustomTemplateDraft) -> Result<String> {
        let id = self.unique_id("custom");
        let template = draft.build(id.clone(), self.identity.resolved())?;
        self.library.save_custom_template(&template)?;
        self.templates.push(template);
        Ok(id)
    }

    pub fn delete_custom_template(&mut self, id: &str) -> Result<()> {
        let template = self
            .templates
            .iter()
            .find(|t| t.id == id && t.is_custom())
            .ok_or_else(|| PlannerError::UnknownItem(id.to_string()))?;
        self.library.delete_custom_template(&template.id)?;
        self.templates.retain(|t| t.id != id);
        Ok(())
    }

    /// Built-ins followed by the custom templates in scope for this image
    fn reload_templates(&mut self) {
        let image_id = self.identity.resolved();
        let custom = match self.library.custom_templates(image_id) {
            Ok(custom) => custom,
            Err(e) => {
                tracing::warn!(error = %e, "⚠️  Could not load custom templates");
                Vec::new()
            }
        };
        self.templates = builtin_templates()
            .into_iter()
            .chain(custom)
            .filter(|t| t.applies_to(image_id))
            .collect();
    }

    // ========== Layout files ==========

    pub fn export_layout(&self) -> Result<Layout> {
        let image_id = self.identity.resolved().ok_or(PlannerError::MissingImage)?;
        let ppi = self.pixels_per_inch().ok_or(PlannerError::MissingScale)?;
        Ok(Layout::new(image_id.to_string(), ppi, self.furniture.clone()))
    }

    /// Replace furniture and scale with a layout made for this same image
    pub fn import_layout(&mut self, layout: Layout) -> Result<()> {
        let current = self.identity.resolved().ok_or(PlannerError::MissingImage)?;
        if layout.image_id != current {
            return Err(PlannerError::ImageMismatch {
                expected: current.to_string(),
                found: layout.image_id,
            });
        }

        if let Err(e) = self.library.save_scale(current, layout.pixels_per_inch) {
            tracing::warn!(error = %e, "⚠️  Imported scale could not be saved");
        }
        self.calibration.apply_scale(layout.pixels_per_inch);
        self.saved_scale_offer = None;
        self.furniture = layout.furniture;
        self.selected = None;
        tracing::info!(items = self.furniture.len(), "📂 Layout imported");
        Ok(())
    }

    // ========== View ==========

    pub fn set_stage(&mut self, stage: Size) {
        if stage.width > 0.0 && stage.height > 0.0 {
            self.stage = stage;
        }
    }

    pub fn pan_by(&mut self, delta: Vector) {
        self.pan = self.pan + delta;
    }

    pub fn zoom_at(&mut self, pointer: Point, ticks: f32) {
        let (zoom, pan) = self.viewport().zoom_at(pointer, ticks);
        self.zoom = zoom;
        self.pan = pan;
    }

    pub fn reset_view(&mut self) {
        self.zoom = 1.0;
        self.pan = Vector::new(0.0, 0.0);
    }

    // ========== Helpers ==========

    fn item_mut(&mut self, id: &str) -> Result<&mut FurnitureItem> {
        self.furniture
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| PlannerError::UnknownItem(id.to_string()))
    }

    /// `<base>-<unix millis>`, with a counter if that is already taken
    fn unique_id(&self, base: &str) -> String {
        let stamp = chrono::Utc::now().timestamp_millis();
        let candidate = format!("{}-{}", base, stamp);
        let taken = |id: &str| {
            self.furniture.iter().any(|item| item.id == id)
                || self.templates.iter().any(|t| t.id == id)
        };
        if !taken(&candidate) {
            return candidate;
        }
        (2..)
            .map(|n| format!("{}-{}", candidate, n))
            .find(|id| !taken(id))
            .unwrap_or(candidate)
    }
}

/// Item id without its trailing numeric stamps: `bed-q-1700000000000-2` -> `bed-q`
fn template_prefix(id: &str) -> &str {
    let mut prefix = id;
    while let Some((head, tail)) = prefix.rsplit_once('-') {
        if tail.is_empty() || !tail.chars().all(|c| c.is_ascii_digit()) {
            break;
        }
        prefix = head;
    }
    if prefix.is_empty() {
        "item"
    } else {
        prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::identity::content_identity;

    const EPS: f32 = 1e-3;

    fn editor() -> Editor {
        Editor::new(Library::open_in_memory().unwrap())
    }

    fn handle() -> Handle {
        Handle::from_rgba(1, 1, vec![0, 0, 0, 255])
    }

    /// Load a 1600x900 plan into an 800x600 stage and settle its identity
    fn load(editor: &mut Editor, bytes: &[u8]) -> Option<f32> {
        editor.set_stage(Size::new(800.0, 600.0));
        let generation = editor.load_image("plan.png".into(), Arc::new(bytes.to_vec()), 1600, 900, handle());
        editor.identity_resolved(generation, content_identity("plan.png", bytes))
    }

    /// Draw a horizontal scale line of `pixels` image pixels and confirm `length`
    fn calibrate(editor: &mut Editor, pixels: f32, length: &str) -> f32 {
        editor.start_calibration().unwrap();
        let viewport = editor.viewport();
        editor.stage_click(viewport.image_to_stage(Point::new(100.0, 100.0)));
        editor.stage_click(viewport.image_to_stage(Point::new(100.0 + pixels, 100.0)));
        editor.calibration.input = length.to_string();
        editor.confirm_scale().unwrap()
    }

    #[test]
    fn test_scale_from_ten_feet() {
        let mut e = editor();
        load(&mut e, b"plan-a");
        let ppi = calibrate(&mut e, 240.0, "10'");
        assert!((ppi - 2.0).abs() < EPS);
    }

    #[test]
    fn test_saved_scale_offered_on_reupload() {
        let mut e = editor();
        assert_eq!(load(&mut e, b"plan-a bytes"), None);
        let ppi = calibrate(&mut e, 300.0, "5'");
        assert!((ppi - 5.0).abs() < EPS);

        // Another image in between
        assert_eq!(load(&mut e, b"plan-b bytes"), None);
        assert_eq!(e.pixels_per_inch(), None);

        // Same bytes again
        let offered = load(&mut e, b"plan-a bytes").unwrap();
        assert!((offered - 5.0).abs() < EPS);
        assert_eq!(e.pixels_per_inch(), None);
        e.accept_saved_scale().unwrap();
        assert!((e.pixels_per_inch().unwrap() - 5.0).abs() < EPS);
    }

    #[test]
    fn test_stale_identity_is_ignored() {
        let mut e = editor();
        let first = e.load_image("a.png".into(), Arc::new(vec![1]), 10, 10, handle());
        let second = e.load_image("b.png".into(), Arc::new(vec![2]), 10, 10, handle());
        e.identity_resolved(first, "stale|a.png".into());
        assert_eq!(e.identity(), &ImageIdentity::Pending);
        e.identity_resolved(second, "fresh|b.png".into());
        assert_eq!(e.identity().resolved(), Some("fresh|b.png"));
    }

    #[test]
    fn test_confirm_while_identity_pending_is_rejected() {
        let mut e = editor();
        e.set_stage(Size::new(800.0, 600.0));
        e.load_image("plan.png".into(), Arc::new(vec![1]), 1600, 900, handle());
        e.start_calibration().unwrap();
        e.stage_click(Point::new(100.0, 200.0));
        e.stage_click(Point::new(300.0, 200.0));
        e.calibration.input = "10".into();
        assert!(matches!(e.confirm_scale(), Err(PlannerError::MissingImage)));
        assert!(e.calibration.points().is_empty());
    }

    #[test]
    fn test_calibration_requires_image() {
        let mut e = editor();
        assert!(matches!(e.start_calibration(), Err(PlannerError::MissingImage)));
    }

    #[test]
    fn test_add_requires_scale() {
        let mut e = editor();
        load(&mut e, b"plan");
        assert!(matches!(e.add_furniture("couch-1"), Err(PlannerError::MissingScale)));
        assert!(e.furniture().is_empty());
    }

    #[test]
    fn test_add_places_at_stage_centre() {
        let mut e = editor();
        load(&mut e, b"plan");
        calibrate(&mut e, 240.0, "10'");
        let id = e.add_furniture("couch-1").unwrap();
        let item = e.item(&id).unwrap();
        assert!(id.starts_with("couch-1-"));
        // Stage centre maps to the image centre at zoom 1 without pan
        assert!((item.x - 800.0).abs() < EPS);
        assert!((item.y - 450.0).abs() < EPS);
        assert_eq!(item.width, 84.0);
        assert_eq!(e.selected_id(), Some(id.as_str()));
    }

    #[test]
    fn test_drag_end_inverts_viewport() {
        let mut e = editor();
        load(&mut e, b"plan");
        calibrate(&mut e, 240.0, "10'");
        e.zoom_at(Point::new(200.0, 150.0), 7.0);
        e.pan_by(Vector::new(-35.0, 12.0));
        let id = e.add_furniture("desk-1").unwrap();

        let target = Point::new(640.0, 320.0);
        let stage = e.viewport().image_to_stage(target);
        e.drag_end(&id, stage).unwrap();

        let item = e.item(&id).unwrap();
        assert!((item.x - target.x).abs() < EPS);
        assert!((item.y - target.y).abs() < EPS);
        assert_eq!((item.width, item.height), (48.0, 24.0));
    }

    #[test]
    fn test_resize_is_invariant_under_zoom() {
        let mut e = editor();
        load(&mut e, b"plan");
        calibrate(&mut e, 240.0, "10'");
        let id = e.add_furniture("couch-1").unwrap();

        for ticks in [5.0_f32, -12.0, 20.0] {
            e.zoom_at(Point::new(123.0, 456.0), ticks);
            e.pan_by(Vector::new(17.0, -9.0));
            // The handles report exactly what is drawn at this zoom
            let drawn = e.stage_box(e.item(&id).unwrap()).unwrap();
            e.transform_end(&id, drawn).unwrap();
            let item = e.item(&id).unwrap();
            assert!((item.width - 84.0).abs() < EPS, "width drifted to {}", item.width);
            assert!((item.height - 38.0).abs() < EPS, "height drifted to {}", item.height);
        }
    }

    #[test]
    fn test_resize_and_rotate_commit() {
        let mut e = editor();
        load(&mut e, b"plan");
        calibrate(&mut e, 240.0, "10'");
        e.zoom_at(Point::new(400.0, 300.0), 4.0);
        let id = e.add_furniture("desk-1").unwrap();

        let mut gesture = e.stage_box(e.item(&id).unwrap()).unwrap();
        gesture.width *= 1.5;
        gesture.rotation = -45.0;
        e.transform_end(&id, gesture).unwrap();

        let item = e.item(&id).unwrap();
        assert!((item.width - 72.0).abs() < EPS);
        assert!((item.height - 24.0).abs() < EPS);
        assert!((item.rotation - 315.0).abs() < EPS);
    }

    #[test]
    fn test_selection_rules() {
        let mut e = editor();
        load(&mut e, b"plan");
        calibrate(&mut e, 240.0, "10'");
        let a = e.add_furniture("couch-1").unwrap();
        let b = e.add_furniture("chair-1").unwrap();

        e.select(&a);
        assert_eq!(e.selected_id(), Some(a.as_str()));
        e.select(&b);
        assert_eq!(e.selected_id(), Some(b.as_str()));

        // Background click deselects
        e.stage_click(Point::new(5.0, 5.0));
        assert_eq!(e.selected_id(), None);

        // Furniture is not selectable while drawing a scale line
        e.start_calibration().unwrap();
        e.select(&a);
        assert_eq!(e.selected_id(), None);
    }

    #[test]
    fn test_clone_and_delete() {
        let mut e = editor();
        load(&mut e, b"plan");
        calibrate(&mut e, 240.0, "10'");
        let id = e.add_furniture("bed-q").unwrap();
        e.edit_item(&id, &FurnitureEdit {
            name: "Guest bed".into(),
            color: "#00ff00".into(),
            opacity: "0.3".into(),
        })
        .unwrap();

        let copy = e.clone_item(&id).unwrap();
        assert_ne!(copy, id);
        let (src, dup) = (e.item(&id).unwrap().clone(), e.item(&copy).unwrap().clone());
        assert_eq!(dup.name, "Guest bed");
        assert_eq!(dup.color, "#00FF00");
        assert!((dup.x - src.x - CLONE_OFFSET_PX).abs() < EPS);
        assert!((dup.y - src.y - CLONE_OFFSET_PX).abs() < EPS);
        assert_eq!(e.selected_id(), Some(copy.as_str()));

        e.delete_item(&copy).unwrap();
        assert_eq!(e.selected_id(), None);
        assert_eq!(e.furniture().len(), 1);
        assert!(matches!(e.delete_item(&copy), Err(PlannerError::UnknownItem(_))));
    }

    #[test]
    fn test_invalid_edit_leaves_item() {
        let mut e = editor();
        load(&mut e, b"plan");
        calibrate(&mut e, 240.0, "10'");
        let id = e.add_furniture("desk-1").unwrap();
        let before = e.item(&id).unwrap().clone();
        let bad = FurnitureEdit { name: "x".into(), color: "#zzzzzz".into(), opacity: "0.5".into() };
        assert!(e.edit_item(&id, &bad).is_err());
        assert_eq!(e.item(&id).unwrap(), &before);
    }

    #[test]
    fn test_template_prefix() {
        assert_eq!(template_prefix("bed-q-1700000000000"), "bed-q");
        assert_eq!(template_prefix("bed-q-1700000000000-2"), "bed-q");
        assert_eq!(template_prefix("custom-17"), "custom");
        assert_eq!(template_prefix("sofa"), "sofa");
    }

    #[test]
    fn test_rotate_by_wraps() {
        let mut e = editor();
        load(&mut e, b"plan");
        calibrate(&mut e, 240.0, "10'");
        let id = e.add_furniture("desk-1").unwrap();
        for _ in 0..5 {
            e.rotate_by(&id, 90.0).unwrap();
        }
        assert_eq!(e.item(&id).unwrap().rotation, 90.0);
    }

    #[test]
    fn test_import_guard() {
        let mut e = editor();
        load(&mut e, b"plan");
        calibrate(&mut e, 240.0, "10'");
        e.add_furniture("desk-1").unwrap();
        let before = e.furniture().to_vec();

        let foreign = Layout::new("other|plan.png".into(), 3.0, Vec::new());
        assert!(matches!(e.import_layout(foreign), Err(PlannerError::ImageMismatch { .. })));
        assert_eq!(e.furniture(), before.as_slice());
        assert!((e.pixels_per_inch().unwrap() - 2.0).abs() < EPS);
    }

    #[test]
    fn test_export_then_import_same_image() {
        let mut e = editor();
        load(&mut e, b"plan");
        calibrate(&mut e, 240.0, "10'");
        e.add_furniture("desk-1").unwrap();
        let json = e.export_layout().unwrap().to_json().unwrap();

        // Reload wipes the document, import restores it
        load(&mut e, b"plan");
        assert!(e.furniture().is_empty());
        e.import_layout(Layout::from_json(&json).unwrap()).unwrap();
        assert_eq!(e.furniture().len(), 1);
        assert!((e.pixels_per_inch().unwrap() - 2.0).abs() < EPS);
    }

    #[test]
    fn test_custom_templates_follow_image_scope() {
        let mut e = editor();
        load(&mut e, b"plan-a");
        let builtins = e.templates().len();

        let draft = CustomTemplateDraft {
            name: "Piano".into(),
            width: "58".into(),
            height: "5'".into(),
            per_image: true,
            ..Default::default()
        };
        let id = e.add_custom_template(&draft).unwrap();
        assert_eq!(e.templates().len(), builtins + 1);

        load(&mut e, b"plan-b");
        assert_eq!(e.templates().len(), builtins);

        load(&mut e, b"plan-a");
        assert!(e.templates().iter().any(|t| t.id == id));
        e.delete_custom_template(&id).unwrap();
        assert_eq!(e.templates().len(), builtins);
        assert!(e.delete_custom_template("couch-1").is_err());
    }
}
