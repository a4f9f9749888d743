/// Layout files (`*.json` / `*.floorplan`)
///
/// ```json
/// { "version": 1, "imageId": "<sha256>|<filename>", "pixelsPerInch": 2.0,
///   "furniture": [ { "id": "...", "name": "...", "width": 84, ... } ] }
/// ```
///
/// Parsing checks structure and value ranges. Whether the layout belongs
/// to the loaded image is the editor's call, see `Editor::import_layout`.

use serde::{Deserialize, Serialize};

use crate::color::normalize_hex;
use crate::config::LAYOUT_VERSION;
use crate::error::{PlannerError, Result};

use super::data::FurnitureItem;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub version: u32,
    pub image_id: String,
    pub pixels_per_inch: f32,
    pub furniture: Vec<FurnitureItem>,
}

impl Layout {
    pub fn new(image_id: String, pixels_per_inch: f32, furniture: Vec<FurnitureItem>) -> Self {
        Self {
            version: LAYOUT_VERSION,
            image_id,
            pixels_per_inch,
            furniture,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate a layout document
    pub fn from_json(json: &str) -> Result<Self> {
        let layout: Layout = serde_json::from_str(json)?;
        layout.validate()?;
        Ok(layout)
    }

    fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(PlannerError::InvalidLayout(msg));

        if self.version == 0 || self.version > LAYOUT_VERSION {
            return invalid(format!("unsupported version {}", self.version));
        }
        if self.image_id.trim().is_empty() {
            return invalid("missing imageId".to_string());
        }
        if !(self.pixels_per_inch.is_finite() && self.pixels_per_inch > 0.0) {
            return invalid(format!("pixelsPerInch must be positive, got {}", self.pixels_per_inch));
        }

        let mut seen = std::collections::HashSet::new();
        for item in &self.furniture {
            if !seen.insert(item.id.as_str()) {
                return invalid(format!("duplicate item id '{}'", item.id));
            }
            let positive = |v: f32| v.is_finite() && v > 0.0;
            if !positive(item.width) || !positive(item.height) {
                return invalid(format!("item '{}' has a non-positive size", item.id));
            }
            if !(item.x.is_finite() && item.y.is_finite() && item.rotation.is_finite()) {
                return invalid(format!("item '{}' has a non-finite position", item.id));
            }
            if !(0.0..=1.0).contains(&item.opacity) {
                return invalid(format!("item '{}' opacity out of range", item.id));
            }
            if normalize_hex(&item.color).is_err() {
                return invalid(format!("item '{}' has colour '{}'", item.id, item.color));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r##"{
        "version": 1,
        "imageId": "abc123|plan.png",
        "pixelsPerInch": 2.5,
        "furniture": [
            { "id": "couch-1-1", "name": "Sofa (3-seat)", "width": 84, "height": 38,
              "x": 100.5, "y": 200, "rotation": 90, "color": "#112233", "opacity": 0.4 },
            { "id": "desk-1-2", "name": "Desk", "width": 48, "height": 24,
              "x": 10, "y": 20, "rotation": 0 }
        ]
    }"##;

    #[test]
    fn test_parse_document() {
        let layout = Layout::from_json(DOC).unwrap();
        assert_eq!(layout.image_id, "abc123|plan.png");
        assert_eq!(layout.pixels_per_inch, 2.5);
        assert_eq!(layout.furniture.len(), 2);
        assert_eq!(layout.furniture[0].rotation, 90.0);
        // Older entries get default presentation
        assert_eq!(layout.furniture[1].color, "#6496FF");
        assert_eq!(layout.furniture[1].opacity, 0.7);
    }

    #[test]
    fn test_export_uses_camel_case() {
        let layout = Layout::from_json(DOC).unwrap();
        let value: serde_json::Value = serde_json::from_str(&layout.to_json().unwrap()).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["imageId"], "abc123|plan.png");
        assert_eq!(value["pixelsPerInch"], 2.5);
        assert_eq!(value["furniture"][0]["name"], "Sofa (3-seat)");
    }

    #[test]
    fn test_missing_required_field() {
        let json = r#"{ "version": 1, "imageId": "x", "furniture": [] }"#;
        assert!(matches!(Layout::from_json(json), Err(PlannerError::MalformedLayout(_))));

        let json = r#"{ "version": 1, "imageId": "x", "pixelsPerInch": 1,
                        "furniture": [ { "id": "a", "name": "n", "height": 1, "x": 0, "y": 0, "rotation": 0 } ] }"#;
        assert!(matches!(Layout::from_json(json), Err(PlannerError::MalformedLayout(_))));
    }

    #[test]
    fn test_mistyped_field() {
        let json = r#"{ "version": 1, "imageId": "x", "pixelsPerInch": "two", "furniture": [] }"#;
        assert!(matches!(Layout::from_json(json), Err(PlannerError::MalformedLayout(_))));
    }

    #[test]
    fn test_invalid_values() {
        let json = r#"{ "version": 1, "imageId": "x", "pixelsPerInch": 0, "furniture": [] }"#;
        assert!(matches!(Layout::from_json(json), Err(PlannerError::InvalidLayout(_))));

        let json = r#"{ "version": 7, "imageId": "x", "pixelsPerInch": 1, "furniture": [] }"#;
        assert!(matches!(Layout::from_json(json), Err(PlannerError::InvalidLayout(_))));

        let json = r#"{ "version": 1, "imageId": "x", "pixelsPerInch": 1,
                        "furniture": [ { "id": "a", "name": "n", "width": 0, "height": 1,
                                         "x": 0, "y": 0, "rotation": 0 } ] }"#;
        assert!(matches!(Layout::from_json(json), Err(PlannerError::InvalidLayout(_))));
    }
}
