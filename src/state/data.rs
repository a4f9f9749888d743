/// Shared data structures for the application state
///
/// These structs represent the data model that flows between the
/// catalog, the layout files and the UI layer.

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_ITEM_COLOR, DEFAULT_ITEM_OPACITY};

/// A piece of furniture placed on the floor plan
///
/// Size is real-world inches, position is the centre in image pixels.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FurnitureItem {
    pub id: String,
    pub name: String,
    /// Width in inches
    pub width: f32,
    /// Height (depth) in inches
    pub height: f32,
    /// Centre x in image pixels
    pub x: f32,
    /// Centre y in image pixels
    pub y: f32,
    /// Clockwise degrees, [0, 360)
    pub rotation: f32,
    /// Older layout files predate colour and opacity
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
}

fn default_color() -> String {
    DEFAULT_ITEM_COLOR.to_string()
}

fn default_opacity() -> f32 {
    DEFAULT_ITEM_OPACITY
}

/// Normalise an angle into [0, 360)
pub fn normalize_rotation(degrees: f32) -> f32 {
    let r = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if r >= 360.0 {
        0.0
    } else {
        r
    }
}

/// Where a custom template is offered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateScope {
    /// Offered for every floor plan
    Global,
    /// Offered only while the image with this identity is loaded
    PerImage(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateKind {
    /// Built into the application
    Default,
    /// Created by the user and stored in the catalog
    Custom { scope: TemplateScope },
}

/// A reusable furniture definition
#[derive(Debug, Clone, PartialEq)]
pub struct FurnitureTemplate {
    pub id: String,
    pub name: String,
    pub width: f32,
    pub height: f32,
    pub color: String,
    pub opacity: f32,
    pub kind: TemplateKind,
}

impl FurnitureTemplate {
    fn builtin(id: &str, name: &str, width: f32, height: f32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            width,
            height,
            color: default_color(),
            opacity: default_opacity(),
            kind: TemplateKind::Default,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self.kind, TemplateKind::Custom { .. })
    }

    /// Whether this template should be offered for the given image
    pub fn applies_to(&self, image_id: Option<&str>) -> bool {
        match &self.kind {
            TemplateKind::Default => true,
            TemplateKind::Custom { scope: TemplateScope::Global } => true,
            TemplateKind::Custom { scope: TemplateScope::PerImage(owner) } => {
                image_id == Some(owner.as_str())
            }
        }
    }

    /// Place a new item from this template
    pub fn instantiate(&self, id: String, x: f32, y: f32) -> FurnitureItem {
        FurnitureItem {
            id,
            name: self.name.clone(),
            width: self.width,
            height: self.height,
            x,
            y,
            rotation: 0.0,
            color: self.color.clone(),
            opacity: self.opacity,
        }
    }
}

/// Built-in templates, sizes in inches
pub fn builtin_templates() -> Vec<FurnitureTemplate> {
    vec![
        FurnitureTemplate::builtin("couch-1", "Sofa (3-seat)", 84.0, 38.0),
        FurnitureTemplate::builtin("couch-2", "Loveseat", 60.0, 38.0),
        FurnitureTemplate::builtin("chair-1", "Armchair", 35.0, 35.0),
        FurnitureTemplate::builtin("bed-q", "Bed (Queen)", 60.0, 80.0),
        FurnitureTemplate::builtin("bed-k", "Bed (King)", 76.0, 80.0),
        FurnitureTemplate::builtin("desk-1", "Desk", 48.0, 24.0),
        FurnitureTemplate::builtin("table-dr", "Dining Table (6)", 60.0, 36.0),
    ]
}

/// Identity of the loaded floor plan
///
/// Hashing runs in the background, so a freshly opened image is `Pending`
/// until the digest settles. Nothing keyed by identity may run before then.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageIdentity {
    #[default]
    None,
    Pending,
    Resolved(String),
}

impl ImageIdentity {
    pub fn resolved(&self) -> Option<&str> {
        match self {
            ImageIdentity::Resolved(id) => Some(id),
            _ => None,
        }
    }
}
