/// Modal form for an item's name, colour and opacity
use iced::widget::{button, center, column, container, mouse_area, opaque, row, stack, text, text_input};
use iced::{Color, Element, Length};

use crate::color::Rgb;
use crate::state::edit::FurnitureEdit;
use crate::Message;

const DIALOG_WIDTH: f32 = 320.0;

/// Lay the dialog over `base`; clicking the backdrop cancels
pub fn overlay<'a>(base: Element<'a, Message>, title: &'a str, edit: &'a FurnitureEdit) -> Element<'a, Message> {
    let swatch_color = Rgb::from_hex(&edit.color)
        .map(|c| c.to_iced(1.0))
        .unwrap_or(Color::TRANSPARENT);
    let swatch = container(text(""))
        .width(Length::Fixed(24.0))
        .height(Length::Fixed(24.0))
        .style(move |_theme| container::Style {
            background: Some(swatch_color.into()),
            ..container::Style::default()
        });

    let form = container(
        column![
            text(format!("Edit Item: {}", title)).size(20),
            text("Name").size(13),
            text_input("Name", &edit.name)
                .on_input(Message::EditNameChanged)
                .on_submit(Message::SaveEdit),
            text("Colour").size(13),
            row![
                text_input("#RRGGBB", &edit.color)
                    .on_input(Message::EditColorChanged)
                    .on_submit(Message::SaveEdit),
                swatch,
            ]
            .spacing(8),
            text("Opacity (0.0 - 1.0)").size(13),
            text_input("0.7", &edit.opacity)
                .on_input(Message::EditOpacityChanged)
                .on_submit(Message::SaveEdit),
            row![
                button("Save Changes").on_press(Message::SaveEdit),
                button("Cancel").on_press(Message::CancelEdit).style(button::secondary),
            ]
            .spacing(8),
        ]
        .spacing(8),
    )
    .width(Length::Fixed(DIALOG_WIDTH))
    .padding(16)
    .style(container::rounded_box);

    stack![
        base,
        opaque(
            mouse_area(center(opaque(form)).style(|_theme| container::Style {
                background: Some(Color { a: 0.6, ..Color::BLACK }.into()),
                ..container::Style::default()
            }))
            .on_press(Message::CancelEdit)
        )
    ]
    .into()
}
