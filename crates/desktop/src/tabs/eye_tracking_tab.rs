use std::path::Path;

use iced::widget::{button, column, image as image_view, progress_bar, row, slider, text, Space};
use iced::{Element, Length, Theme};

use crate::app::{scaled, Message, ProcessingState};
use crate::settings::Settings;
use crate::theme::muted_color;
use crate::widgets::file_row::file_row;

pub fn view<'a>(
    settings: &Settings,
    input_path: Option<&Path>,
    output_path: Option<&Path>,
    processing: &ProcessingState,
    theme: &Theme,
) -> Element<'a, Message> {
    let fs = settings.font_scale;
    let muted = muted_color(theme);

    let mut col = column![
        file_row(fs, "Image", input_path, Message::SelectInput, theme),
        Space::new().height(10),
        file_row(fs, "Saves to", output_path, Message::SelectOutput, theme),
        Space::new().height(16),
        labelled_slider(
            fs,
            "Highlight opacity",
            format!("{}%", settings.opacity),
            slider(0..=100, settings.opacity, Message::OpacityChanged).into(),
        ),
        labelled_slider(
            fs,
            "Face neighbors",
            settings.face_min_neighbors.to_string(),
            slider(0..=12, settings.face_min_neighbors, Message::FaceNeighborsChanged).into(),
        ),
        labelled_slider(
            fs,
            "Eye neighbors",
            settings.eye_min_neighbors.to_string(),
            slider(0..=12, settings.eye_min_neighbors, Message::EyeNeighborsChanged).into(),
        ),
        Space::new().height(16),
    ]
    .spacing(6);

    col = match processing {
        ProcessingState::Idle => col.push(run_button(fs, input_path.is_some())),
        ProcessingState::Preparing => col.push(busy(fs, "Loading cascades\u{2026}".into(), None)),
        ProcessingState::Downloading(downloaded, total) => {
            let pct = if *total > 0 {
                *downloaded as f32 / *total as f32 * 100.0
            } else {
                0.0
            };
            col.push(busy(
                fs,
                format!("Downloading cascades {pct:.0}%"),
                Some(pct),
            ))
        }
        ProcessingState::Annotating => col.push(busy(fs, "Finding eyes\u{2026}".into(), None)),
        ProcessingState::Complete(path, preview) => {
            let col = col
                .push(run_button(fs, input_path.is_some()))
                .push(Space::new().height(12))
                .push(
                    text(format!("Saved to {}", path.display()))
                        .size(scaled(12.0, fs))
                        .color(muted),
                );
            match preview {
                Some(handle) => col.push(
                    image_view(handle.clone())
                        .width(Length::Fill)
                        .height(Length::Fixed(320.0)),
                ),
                None => col,
            }
        }
        ProcessingState::Error(e) => col
            .push(run_button(fs, input_path.is_some()))
            .push(Space::new().height(8))
            .push(
                text(format!("Something went wrong: {e}"))
                    .size(scaled(13.0, fs))
                    .color(theme.palette().danger),
            ),
    };

    col.into()
}

fn labelled_slider<'a>(
    fs: f32,
    label: &'a str,
    value: String,
    control: Element<'a, Message>,
) -> Element<'a, Message> {
    row![
        text(label).size(scaled(13.0, fs)).width(Length::Fixed(150.0)),
        control,
        text(value).size(scaled(13.0, fs)).width(Length::Fixed(48.0)),
    ]
    .spacing(12)
    .align_y(iced::Alignment::Center)
    .into()
}

fn run_button<'a>(fs: f32, enabled: bool) -> Element<'a, Message> {
    button(text("Highlight Eyes").size(scaled(15.0, fs)))
        .on_press_maybe(enabled.then_some(Message::RunAnnotate))
        .padding([12, 24])
        .width(Length::Fill)
        .into()
}

fn busy<'a>(fs: f32, status: String, pct: Option<f32>) -> Element<'a, Message> {
    let mut col = column![text(status).size(scaled(13.0, fs))].spacing(8);
    if let Some(pct) = pct {
        col = col.push(progress_bar(0.0..=100.0, pct));
    }
    col.push(
        button(text("Cancel").size(scaled(13.0, fs)))
            .on_press(Message::CancelAnnotate)
            .padding([8, 16])
            .style(button::secondary),
    )
    .into()
}
