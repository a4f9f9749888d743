/// Side panel: upload, scale, templates, selection, layout files, share
use iced::widget::{
    button, checkbox, column, horizontal_rule, row, scrollable, text, text_input, toggler, Column,
};
use iced::{Element, Length};
use iced_aw::Wrap;

use crate::share::ShareOptions;
use crate::state::calibration::Phase;
use crate::state::data::{FurnitureTemplate, ImageIdentity};
use crate::state::edit::CustomTemplateDraft;
use crate::state::editor::Editor;
use crate::units::format_feet_inches;
use crate::Message;

const PANEL_WIDTH: f32 = 300.0;

pub fn view<'a>(
    editor: &'a Editor,
    custom: &'a CustomTemplateDraft,
    share: &'a ShareOptions,
) -> Element<'a, Message> {
    let has_scale = editor.pixels_per_inch().is_some();

    let content = column![
        upload_section(editor),
        horizontal_rule(1),
        scale_section(editor),
        horizontal_rule(1),
        furniture_section(editor, custom, has_scale),
        horizontal_rule(1),
        selection_section(editor),
        horizontal_rule(1),
        file_section(editor, share, has_scale),
    ]
    .spacing(14)
    .padding(12);

    scrollable(content).width(Length::Fixed(PANEL_WIDTH)).into()
}

fn heading(label: &str) -> iced::widget::Text<'_> {
    text(label).size(18)
}

fn upload_section(editor: &Editor) -> Element<'_, Message> {
    let status = match (editor.plan(), editor.identity()) {
        (None, _) => "No floor plan loaded".to_string(),
        (Some(plan), ImageIdentity::Pending) => format!("{} (identifying...)", plan.filename),
        (Some(plan), _) => format!(
            "{} ({}×{} px)",
            plan.filename, plan.size.width as u32, plan.size.height as u32
        ),
    };

    column![
        heading("1. Floor Plan"),
        button("Upload Image").on_press(Message::OpenImage).padding(8),
        text(status).size(13),
    ]
    .spacing(8)
    .into()
}

fn scale_section(editor: &Editor) -> Element<'_, Message> {
    let calibration = &editor.calibration;
    let capturing = calibration.is_capturing();

    let draw_label = match calibration.phase() {
        Phase::AwaitingFirstPoint => "Click the first point...",
        Phase::AwaitingSecondPoint => "Now click the second point...",
        _ => "Draw Scale Line",
    };
    let draw = button(draw_label)
        .on_press_maybe((editor.plan().is_some() && !capturing).then_some(Message::StartCalibration))
        .padding(8);

    let mut section: Column<Message> = column![heading("2. Scale"), draw].spacing(8);

    if let Some(saved) = editor.saved_scale_offer() {
        section = section.push(text(format!("Saved scale for this image: {:.2} px/in", saved)).size(13));
        section = section.push(
            row![
                button("Use it").on_press(Message::UseSavedScale),
                button("Ignore").on_press(Message::DismissSavedScale),
            ]
            .spacing(8),
        );
    }

    if calibration.phase() == Phase::AwaitingConfirmation {
        section = section.push(text(format!("Line: {:.1} px. Real length?", calibration.pixel_length())).size(13));
        section = section.push(
            row![
                text_input("e.g. 10' or 5'6\" or 66", &calibration.input)
                    .on_input(Message::ScaleInputChanged)
                    .on_submit(Message::ConfirmScale),
                button("Set").on_press(Message::ConfirmScale),
            ]
            .spacing(8),
        );
    }

    if let Some(ppi) = editor.pixels_per_inch() {
        section = section.push(text(format!("Scale: 1 inch ≈ {:.2} pixels", ppi)).size(13));
    }

    section.into()
}

fn template_button(template: &FurnitureTemplate, enabled: bool) -> Element<'_, Message> {
    let label = format!(
        "{}\n{} × {}",
        template.name,
        format_feet_inches(template.width),
        format_feet_inches(template.height)
    );
    let add = button(text(label).size(12))
        .on_press_maybe(enabled.then(|| Message::AddFurniture(template.id.clone())))
        .padding(6);

    if template.is_custom() {
        column![
            add,
            button(text("remove").size(11))
                .on_press(Message::DeleteCustomTemplate(template.id.clone()))
                .style(button::text),
        ]
        .into()
    } else {
        add.into()
    }
}

fn furniture_section<'a>(
    editor: &'a Editor,
    custom: &'a CustomTemplateDraft,
    has_scale: bool,
) -> Element<'a, Message> {
    let templates: Vec<Element<Message>> = editor
        .templates()
        .iter()
        .map(|t| template_button(t, has_scale))
        .collect();

    let scope_available = editor.identity().resolved().is_some();

    column![
        heading("3. Furniture"),
        Wrap::with_elements(templates).spacing(6.0).line_spacing(6.0),
        text("Custom item").size(14),
        text_input("Name", &custom.name).on_input(Message::CustomNameChanged),
        row![
            text_input("Width", &custom.width).on_input(Message::CustomWidthChanged),
            text("×"),
            text_input("Depth", &custom.height).on_input(Message::CustomHeightChanged),
        ]
        .spacing(6),
        text_input("Colour #RRGGBB", &custom.color).on_input(Message::CustomColorChanged),
        toggler(custom.per_image && scope_available)
            .label("Only for this floor plan")
            .on_toggle_maybe(scope_available.then_some(Message::CustomPerImageToggled)),
        button("Save Custom Item").on_press(Message::AddCustomTemplate),
    ]
    .spacing(8)
    .into()
}

fn selection_section(editor: &Editor) -> Element<'_, Message> {
    let Some(item) = editor.selected() else {
        return column![heading("4. Selection"), text("Click an item to select it").size(13)]
            .spacing(8)
            .into();
    };

    column![
        heading("4. Selection"),
        text(format!(
            "{}: {} × {}, {:.0}°",
            item.name,
            format_feet_inches(item.width),
            format_feet_inches(item.height),
            item.rotation
        ))
        .size(13),
        row![
            button("Edit").on_press(Message::OpenEditDialog),
            button("Rotate 90°").on_press(Message::RotateSelected),
            button("Clone").on_press(Message::CloneSelected),
            button("Delete").on_press(Message::DeleteSelected).style(button::danger),
        ]
        .spacing(6),
    ]
    .spacing(8)
    .into()
}

fn file_section<'a>(
    editor: &'a Editor,
    share: &'a ShareOptions,
    has_scale: bool,
) -> Element<'a, Message> {
    let can_export = has_scale && editor.identity().resolved().is_some();

    column![
        heading("5. Layout"),
        row![
            button("Export").on_press_maybe(can_export.then_some(Message::ExportLayout)),
            button("Import").on_press_maybe(editor.plan().is_some().then_some(Message::ImportLayout)),
            button("Reset View").on_press(Message::ResetView),
        ]
        .spacing(8),
        text(format!("Zoom: {:.0}%", editor.zoom() * 100.0)).size(13),
        text("Share as image").size(14),
        text_input("Title", &share.title).on_input(Message::ShareTitleChanged),
        checkbox("Include scale bar", share.include_scale).on_toggle(Message::ShareIncludeScale),
        checkbox("Include furniture", share.include_furniture).on_toggle(Message::ShareIncludeFurniture),
        button("Save as PNG").on_press_maybe(has_scale.then_some(Message::ShareImage)),
    ]
    .spacing(8)
    .into()
}
