/// User interface module
///
/// - Floor plan canvas with furniture gestures (canvas.rs)
/// - Side panel with every tool (toolbar.rs)
/// - Item edit dialog (edit_dialog.rs)

pub mod canvas;
pub mod edit_dialog;
pub mod toolbar;
