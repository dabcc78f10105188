use std::path::Path;

use iced::widget::{button, column, container, row, text, Space};
use iced::{Color, Element, Length, Theme};

use crate::app::{scaled, Message};
use crate::theme::muted_color;

const CORNER_RADIUS: f32 = 10.0;

/// A labelled path with a "Change" button, e.g. the input image.
pub fn file_row<'a>(
    fs: f32,
    label: &str,
    path: Option<&Path>,
    on_browse: Message,
    theme: &Theme,
) -> Element<'a, Message> {
    let muted = muted_color(theme);
    let border = Color {
        a: 0.12,
        ..theme.palette().text
    };

    let display_text: Element<'a, Message> = match path.and_then(|p| p.file_name()) {
        Some(name) => text(name.to_string_lossy().to_string())
            .size(scaled(15.0, fs))
            .into(),
        None => text("No file selected")
            .size(scaled(15.0, fs))
            .color(muted)
            .into(),
    };

    let label_text = text(label.to_uppercase())
        .size(scaled(11.0, fs))
        .color(muted);

    let info = column![label_text, Space::new().height(2), display_text].width(Length::Fill);
    let browse = button(text("Change").size(scaled(13.0, fs)))
        .on_press(on_browse)
        .padding([6, 14])
        .style(button::secondary);

    container(row![info, browse].spacing(8).align_y(iced::Alignment::Center))
        .padding([12, 14])
        .width(Length::Fill)
        .style(move |_theme: &Theme| container::Style {
            border: iced::border::Border {
                color: border,
                width: 1.0,
                radius: CORNER_RADIUS.into(),
            },
            ..container::Style::default()
        })
        .into()
}
