use iced::widget::{button, canvas, column, row, text, Space};
use iced::{Element, Length};

use eyepong_core::pong::domain::game_state::{COURT_HEIGHT, COURT_WIDTH};
use eyepong_core::pong::infrastructure::display_list::DisplayList;

use crate::app::{scaled, Message};
use crate::widgets::court_canvas::CourtCanvas;

pub fn view(fs: f32, display: &DisplayList) -> Element<'_, Message> {
    let court = canvas(CourtCanvas::new(display))
        .width(Length::Fixed(COURT_WIDTH))
        .height(Length::Fixed(COURT_HEIGHT));

    let controls = row![
        text("Move with the mouse or \u{2190} \u{2192}. Space pauses.")
            .size(scaled(13.0, fs))
            .width(Length::Fill),
        button(text("New game").size(scaled(13.0, fs)))
            .on_press(Message::NewGame)
            .padding([8, 16]),
    ]
    .spacing(12)
    .align_y(iced::Alignment::Center)
    .width(Length::Fixed(COURT_WIDTH));

    column![court, Space::new().height(12), controls]
        .align_x(iced::Alignment::Center)
        .width(Length::Fill)
        .into()
}
