/// User-entered edits for items and templates
///
/// Forms hold raw strings; these structs validate them into values the
/// editor can apply. A failed validation never touches the target.

use crate::color::normalize_hex;
use crate::error::{PlannerError, Result};
use crate::units::parse_length;

use super::data::{FurnitureItem, FurnitureTemplate, TemplateKind, TemplateScope};

/// Presentation changes for a placed item
#[derive(Debug, Clone, PartialEq)]
pub struct FurnitureEdit {
    pub name: String,
    pub color: String,
    pub opacity: String,
}

/// Validated form of `FurnitureEdit`
#[derive(Debug, Clone, PartialEq)]
pub struct ItemStyle {
    pub name: String,
    pub color: String,
    pub opacity: f32,
}

impl FurnitureEdit {
    /// Prefill the form from an existing item
    pub fn from_item(item: &FurnitureItem) -> Self {
        Self {
            name: item.name.clone(),
            color: item.color.clone(),
            opacity: format!("{:.2}", item.opacity),
        }
    }

    pub fn validate(&self) -> Result<ItemStyle> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(PlannerError::EmptyName);
        }

        let color = normalize_hex(&self.color)?;

        let opacity: f32 = self
            .opacity
            .trim()
            .parse()
            .map_err(|_| PlannerError::InvalidOpacity)?;
        if !(0.0..=1.0).contains(&opacity) {
            return Err(PlannerError::InvalidOpacity);
        }

        Ok(ItemStyle { name: name.to_string(), color, opacity })
    }
}

impl ItemStyle {
    pub fn apply(self, item: &mut FurnitureItem) {
        item.name = self.name;
        item.color = self.color;
        item.opacity = self.opacity;
    }
}

/// The "add custom item" form
#[derive(Debug, Clone, PartialEq)]
pub struct CustomTemplateDraft {
    pub name: String,
    pub width: String,
    pub height: String,
    pub color: String,
    /// Offer only for the current image
    pub per_image: bool,
}

impl Default for CustomTemplateDraft {
    fn default() -> Self {
        Self {
            name: "Custom Item".to_string(),
            width: String::new(),
            height: String::new(),
            color: crate::config::DEFAULT_ITEM_COLOR.to_string(),
            per_image: false,
        }
    }
}

impl CustomTemplateDraft {
    /// Build a template; `image_id` is required for per-image scope
    pub fn build(&self, id: String, image_id: Option<&str>) -> Result<FurnitureTemplate> {
        let width = parse_length(&self.width).map_err(|_| PlannerError::InvalidDimensions)?;
        let height = parse_length(&self.height).map_err(|_| PlannerError::InvalidDimensions)?;
        let color = normalize_hex(&self.color)?;

        let name = match self.name.trim() {
            "" => "Custom Item".to_string(),
            name => name.to_string(),
        };

        let scope = if self.per_image {
            TemplateScope::PerImage(image_id.ok_or(PlannerError::MissingImage)?.to_string())
        } else {
            TemplateScope::Global
        };

        Ok(FurnitureTemplate {
            id,
            name,
            width,
            height,
            color,
            opacity: crate::config::DEFAULT_ITEM_OPACITY,
            kind: TemplateKind::Custom { scope },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(name: &str, color: &str, opacity: &str) -> FurnitureEdit {
        FurnitureEdit {
            name: name.to_string(),
            color: color.to_string(),
            opacity: opacity.to_string(),
        }
    }

    #[test]
    fn test_valid_edit() {
        let style = edit("  Reading chair ", "#ff0000", "0.5").validate().unwrap();
        assert_eq!(style.name, "Reading chair");
        assert_eq!(style.color, "#FF0000");
        assert_eq!(style.opacity, 0.5);
    }

    #[test]
    fn test_invalid_edits() {
        assert!(matches!(edit(" ", "#FF0000", "0.5").validate(), Err(PlannerError::EmptyName)));
        assert!(matches!(edit("a", "red", "0.5").validate(), Err(PlannerError::InvalidColor(_))));
        assert!(matches!(edit("a", "#FF0000", "1.5").validate(), Err(PlannerError::InvalidOpacity)));
        assert!(matches!(edit("a", "#FF0000", "x").validate(), Err(PlannerError::InvalidOpacity)));
    }

    #[test]
    fn test_custom_template_feet_and_scope() {
        let draft = CustomTemplateDraft {
            name: "Piano".to_string(),
            width: "5'".to_string(),
            height: "58".to_string(),
            per_image: true,
            ..Default::default()
        };
        let template = draft.build("custom-1".into(), Some("hash|plan.png")).unwrap();
        assert_eq!(template.width, 60.0);
        assert_eq!(template.height, 58.0);
        assert_eq!(
            template.kind,
            TemplateKind::Custom { scope: TemplateScope::PerImage("hash|plan.png".into()) }
        );

        assert!(matches!(draft.build("custom-2".into(), None), Err(PlannerError::MissingImage)));
    }

    #[test]
    fn test_custom_template_rejects_bad_size() {
        let draft = CustomTemplateDraft {
            width: "-3".to_string(),
            height: "10".to_string(),
            ..Default::default()
        };
        assert!(matches!(draft.build("c".into(), None), Err(PlannerError::InvalidDimensions)));
    }
}
