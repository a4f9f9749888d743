/// State management module
///
/// This module handles all application state, including:
/// - The document and its actions (editor.rs)
/// - Scale calibration flow (calibration.rs)
/// - Shared data structures (data.rs)
/// - Form validation for items and templates (edit.rs)
/// - Image identity hashing (identity.rs)
/// - Layout file format (layout.rs)
/// - Catalog of saved scales and custom templates (library.rs)
/// - Floor plan reading and decoding (loader.rs)

pub mod calibration;
pub mod data;
pub mod edit;
pub mod editor;
pub mod identity;
pub mod layout;
pub mod library;
pub mod loader;
