use iced::keyboard::{self, key};
use iced::widget::{canvas, column, container, row, text, vertical_rule};
use iced::{Element, Length, Size, Subscription, Task, Theme};
use rfd::FileDialog;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod color;
mod config;
mod error;
mod share;
mod state;
mod ui;
mod units;
mod viewport;

use error::PlannerError;
use share::ShareOptions;
use state::edit::{CustomTemplateDraft, FurnitureEdit};
use state::editor::Editor;
use state::layout::Layout;
use state::library::Library;
use state::loader::{DecodedImage, ImageFile};
use ui::canvas::{CanvasEvent, FloorPlanCanvas};

/// Degrees applied by the "rotate" shortcut and button
const ROTATE_STEP: f32 = 90.0;

/// Main application state
struct FloorPlanner {
    /// The document: image, scale, furniture, selection, view
    editor: Editor,
    /// Item id and form contents while the edit dialog is open
    editing: Option<(String, FurnitureEdit)>,
    custom: CustomTemplateDraft,
    share: ShareOptions,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    // Image
    OpenImage,
    ImageRead(Result<ImageFile, String>),
    ImageDecoded(ImageFile, Result<DecodedImage, String>),
    IdentityResolved(u64, String),
    UseSavedScale,
    DismissSavedScale,

    // Calibration
    StartCalibration,
    ScaleInputChanged(String),
    ConfirmScale,

    // Furniture
    AddFurniture(String),
    Canvas(CanvasEvent, Size),
    RotateSelected,
    CloneSelected,
    DeleteSelected,
    Deselect,

    // Edit dialog
    OpenEditDialog,
    EditNameChanged(String),
    EditColorChanged(String),
    EditOpacityChanged(String),
    SaveEdit,
    CancelEdit,

    // Custom templates
    CustomNameChanged(String),
    CustomWidthChanged(String),
    CustomHeightChanged(String),
    CustomColorChanged(String),
    CustomPerImageToggled(bool),
    AddCustomTemplate,
    DeleteCustomTemplate(String),

    // Layout files
    ExportLayout,
    LayoutSaved(Result<PathBuf, String>),
    ImportLayout,
    LayoutRead(Result<String, String>),

    // Share
    ShareTitleChanged(String),
    ShareIncludeScale(bool),
    ShareIncludeFurniture(bool),
    ShareImage,
    ShareComplete(Result<PathBuf, String>),

    ResetView,
}

impl FloorPlanner {
    /// Create a new instance of the application
    fn new(library: Library) -> (Self, Task<Message>) {
        let editor = Editor::new(library);
        tracing::info!(templates = editor.templates().len(), "🏠 Floor plan arranger initialized");

        (
            FloorPlanner {
                editor,
                editing: None,
                custom: CustomTemplateDraft::default(),
                share: ShareOptions::default(),
                status: "Upload a floor plan image to begin.".to_string(),
            },
            Task::none(),
        )
    }

    /// Show the outcome of an action; errors are logged and surfaced, state is untouched
    fn report<T>(&mut self, result: error::Result<T>, success: impl FnOnce(T) -> String) {
        match result {
            Ok(value) => self.status = success(value),
            Err(e) => self.reject(e),
        }
    }

    fn reject(&mut self, e: PlannerError) {
        tracing::warn!(error = %e, "⚠️  Action rejected");
        self.status = format!("⚠️  {}", e);
    }

    fn fail(&mut self, message: String) {
        tracing::error!("❌ {}", message);
        self.status = format!("❌ {}", message);
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenImage => {
                // Show the native file picker dialog
                let file = FileDialog::new()
                    .set_title("Select Floor Plan Image")
                    .add_filter("Images", &["png", "jpg", "jpeg", "gif", "bmp", "webp"])
                    .pick_file();

                if let Some(path) = file {
                    self.status = format!("Loading {}...", path.display());
                    return Task::perform(state::loader::read_image_file(path), Message::ImageRead);
                }
            }
            Message::ImageRead(Ok(file)) => {
                let bytes = file.bytes.clone();
                return Task::perform(state::loader::decode_image(bytes), move |decoded| {
                    Message::ImageDecoded(file.clone(), decoded)
                });
            }
            Message::ImageRead(Err(e)) => self.fail(e),
            Message::ImageDecoded(file, Ok(decoded)) => {
                let generation = self.editor.load_image(
                    file.filename.clone(),
                    file.bytes.clone(),
                    decoded.width,
                    decoded.height,
                    decoded.handle,
                );
                self.editing = None;
                self.status = format!("Loaded {}. Draw a scale line to begin.", file.filename);
                tracing::info!(file = %file.filename, generation, "🖼️  Floor plan loaded");

                // Identity keys saved scales and templates, so it settles before any lookup
                return Task::perform(
                    state::identity::resolve_identity(file.filename, file.bytes),
                    move |identity| Message::IdentityResolved(generation, identity),
                );
            }
            Message::ImageDecoded(_, Err(e)) => self.fail(e),
            Message::IdentityResolved(generation, identity) => {
                if let Some(saved) = self.editor.identity_resolved(generation, identity) {
                    self.status = format!("This floor plan was calibrated before ({:.2} px/in). Reuse it?", saved);
                }
            }
            Message::UseSavedScale => {
                let result = self.editor.accept_saved_scale();
                self.report(result, |ppi| format!("Scale set: {:.2} pixels per inch", ppi));
            }
            Message::DismissSavedScale => self.editor.dismiss_saved_scale(),

            Message::StartCalibration => {
                let result = self.editor.start_calibration();
                self.report(result, |_| {
                    "Click the first point on the floor plan for your reference line.".to_string()
                });
            }
            Message::ScaleInputChanged(value) => self.editor.calibration.input = value,
            Message::ConfirmScale => {
                let result = self.editor.confirm_scale();
                self.report(result, |ppi| format!("Scale set: {:.2} pixels per inch", ppi));
            }

            Message::AddFurniture(template_id) => {
                let result = self.editor.add_furniture(&template_id);
                self.report(result, |_| "Item added. Drag to move, use the handles to resize or rotate.".to_string());
            }
            Message::Canvas(event, stage) => {
                self.editor.set_stage(stage);
                self.canvas_event(event);
            }
            Message::RotateSelected => {
                if let Some(id) = self.editor.selected_id().map(str::to_string) {
                    let result = self.editor.rotate_by(&id, ROTATE_STEP);
                    self.report(result, |_| "Item rotated.".to_string());
                }
            }
            Message::CloneSelected => {
                if let Some(id) = self.editor.selected_id().map(str::to_string) {
                    let result = self.editor.clone_item(&id);
                    self.report(result, |_| "Item cloned.".to_string());
                }
            }
            Message::DeleteSelected => {
                if let Some(id) = self.editor.selected_id().map(str::to_string) {
                    let result = self.editor.delete_item(&id);
                    self.report(result, |_| "Item deleted.".to_string());
                }
            }
            Message::Deselect => {
                self.editing = None;
                self.editor.deselect();
            }

            Message::OpenEditDialog => {
                if let Some(item) = self.editor.selected() {
                    self.editing = Some((item.id.clone(), FurnitureEdit::from_item(item)));
                }
            }
            Message::EditNameChanged(value) => {
                if let Some((_, edit)) = &mut self.editing {
                    edit.name = value;
                }
            }
            Message::EditColorChanged(value) => {
                if let Some((_, edit)) = &mut self.editing {
                    edit.color = value;
                }
            }
            Message::EditOpacityChanged(value) => {
                if let Some((_, edit)) = &mut self.editing {
                    edit.opacity = value;
                }
            }
            Message::SaveEdit => {
                if let Some((id, edit)) = self.editing.clone() {
                    match self.editor.edit_item(&id, &edit) {
                        Ok(()) => {
                            self.editing = None;
                            self.status = "Item updated.".to_string();
                        }
                        // Keep the dialog open so the user can fix the field
                        Err(e) => self.reject(e),
                    }
                }
            }
            Message::CancelEdit => self.editing = None,

            Message::CustomNameChanged(value) => self.custom.name = value,
            Message::CustomWidthChanged(value) => self.custom.width = value,
            Message::CustomHeightChanged(value) => self.custom.height = value,
            Message::CustomColorChanged(value) => self.custom.color = value,
            Message::CustomPerImageToggled(value) => self.custom.per_image = value,
            Message::AddCustomTemplate => {
                let result = self.editor.add_custom_template(&self.custom);
                let name = self.custom.name.clone();
                self.report(result, |_| format!("Saved custom item '{}'.", name));
            }
            Message::DeleteCustomTemplate(id) => {
                let result = self.editor.delete_custom_template(&id);
                self.report(result, |_| "Custom item removed.".to_string());
            }

            Message::ExportLayout => {
                let json = match self.editor.export_layout().and_then(|layout| layout.to_json()) {
                    Ok(json) => json,
                    Err(e) => {
                        self.reject(e);
                        return Task::none();
                    }
                };
                let path = FileDialog::new()
                    .set_title("Export Layout")
                    .add_filter("Floor plan layout", &["floorplan", "json"])
                    .set_file_name("layout.floorplan")
                    .save_file();
                if let Some(path) = path {
                    return Task::perform(write_text(path, json), Message::LayoutSaved);
                }
            }
            Message::LayoutSaved(Ok(path)) => {
                tracing::info!(path = %path.display(), "💾 Layout exported");
                self.status = format!("Layout saved to {}", path.display());
            }
            Message::LayoutSaved(Err(e)) => self.fail(e),
            Message::ImportLayout => {
                let path = FileDialog::new()
                    .set_title("Import Layout")
                    .add_filter("Floor plan layout", &["floorplan", "json"])
                    .pick_file();
                if let Some(path) = path {
                    return Task::perform(read_text(path), Message::LayoutRead);
                }
            }
            Message::LayoutRead(Ok(json)) => {
                let result = Layout::from_json(&json).and_then(|layout| self.editor.import_layout(layout));
                let count = self.editor.furniture().len();
                self.report(result, |_| format!("Layout imported: {} items.", count));
            }
            Message::LayoutRead(Err(e)) => self.fail(e),

            Message::ShareTitleChanged(value) => self.share.title = value,
            Message::ShareIncludeScale(value) => self.share.include_scale = value,
            Message::ShareIncludeFurniture(value) => self.share.include_furniture = value,
            Message::ShareImage => {
                let (Some(plan), Some(ppi)) = (self.editor.plan(), self.editor.pixels_per_inch()) else {
                    self.reject(PlannerError::MissingScale);
                    return Task::none();
                };
                let path = FileDialog::new()
                    .set_title("Save Floor Plan as Image")
                    .add_filter("PNG image", &["png"])
                    .set_file_name(share::default_filename(&self.share.title))
                    .save_file();
                if let Some(path) = path {
                    self.status = "Generating image...".to_string();
                    return Task::perform(
                        share::export_png(
                            plan.bytes.clone(),
                            self.editor.furniture().to_vec(),
                            ppi,
                            self.share.clone(),
                            path,
                        ),
                        Message::ShareComplete,
                    );
                }
            }
            Message::ShareComplete(Ok(path)) => {
                self.status = format!("Image saved to {}", path.display());
            }
            Message::ShareComplete(Err(e)) => self.fail(format!("Failed to save layout as image: {}", e)),

            Message::ResetView => self.editor.reset_view(),
        }

        Task::none()
    }

    fn canvas_event(&mut self, event: CanvasEvent) {
        match event {
            CanvasEvent::Clicked(point) => self.editor.stage_click(point),
            CanvasEvent::Select(id) => self.editor.select(&id),
            CanvasEvent::Pan(delta) => self.editor.pan_by(delta),
            CanvasEvent::Zoom { pointer, ticks } => self.editor.zoom_at(pointer, ticks),
            CanvasEvent::DragEnded { id, center } => {
                if let Err(e) = self.editor.drag_end(&id, center) {
                    self.reject(e);
                }
            }
            CanvasEvent::TransformEnded { id, gesture } => {
                if let Err(e) = self.editor.transform_end(&id, gesture) {
                    self.reject(e);
                }
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let stage = canvas(FloorPlanCanvas { editor: &self.editor })
            .width(Length::Fill)
            .height(Length::Fill);

        let body = row![
            ui::toolbar::view(&self.editor, &self.custom, &self.share),
            vertical_rule(1),
            stage,
        ];

        let content: Element<Message> = column![
            body.height(Length::Fill),
            container(text(&self.status).size(14)).padding(6),
        ]
        .into();

        match &self.editing {
            Some((id, edit)) => {
                let title = self.editor.item(id).map(|item| item.name.as_str()).unwrap_or("");
                ui::edit_dialog::overlay(content, title, edit)
            }
            None => content,
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        keyboard::on_key_press(|key, modifiers| match key.as_ref() {
            keyboard::Key::Named(key::Named::Delete | key::Named::Backspace) => {
                Some(Message::DeleteSelected)
            }
            keyboard::Key::Named(key::Named::Escape) => Some(Message::Deselect),
            keyboard::Key::Character("d") if modifiers.command() => Some(Message::CloneSelected),
            keyboard::Key::Character("r") => Some(Message::RotateSelected),
            _ => None,
        })
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // A broken data directory should not stop the app; fall back to a session-only catalog
    let library = match Library::new() {
        Ok(library) => library,
        Err(e) => {
            tracing::warn!(error = %e, "⚠️  Catalog unavailable, saved scales will not persist");
            Library::open_in_memory()?
        }
    };

    iced::application(
        "Floor Plan Furniture Arranger",
        FloorPlanner::update,
        FloorPlanner::view,
    )
    .subscription(FloorPlanner::subscription)
    .theme(FloorPlanner::theme)
    .centered()
    .run_with(move || FloorPlanner::new(library))?;

    Ok(())
}

async fn write_text(path: PathBuf, contents: String) -> Result<PathBuf, String> {
    tokio::fs::write(&path, contents)
        .await
        .map(|_| path.clone())
        .map_err(|e| format!("Failed to write {}: {}", path.display(), e))
}

async fn read_text(path: PathBuf) -> Result<String, String> {
    tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))
}
