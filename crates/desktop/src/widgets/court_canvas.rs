use iced::widget::canvas::{self, Frame, Path};
use iced::{mouse, Color, Event, Pixels, Point, Rectangle, Renderer, Size, Theme};

use eyepong_core::pong::domain::game_state::COURT_WIDTH;
use eyepong_core::pong::domain::input::InputEvent;
use eyepong_core::pong::infrastructure::display_list::{DisplayList, DrawCommand};
use eyepong_core::shared::color::Rgba;

use crate::app::Message;

/// Ascent of the default font relative to its size; turns the game's
/// baseline text anchor into iced's top-left one.
const TEXT_ASCENT: f32 = 0.8;

/// Replays the game's recorded draw commands and reports pointer moves in
/// court coordinates.
pub struct CourtCanvas<'a> {
    display: &'a DisplayList,
}

impl<'a> CourtCanvas<'a> {
    pub fn new(display: &'a DisplayList) -> Self {
        Self { display }
    }
}

impl canvas::Program<Message> for CourtCanvas<'_> {
    type State = ();

    fn update(
        &self,
        _state: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        let Event::Mouse(mouse::Event::CursorMoved { .. }) = event else {
            return None;
        };
        let position = cursor.position_in(bounds)?;
        let x = to_court_x(position.x, bounds.width);
        Some(canvas::Action::publish(Message::PongInput(
            InputEvent::PointerMoved { x },
        )))
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.scale(bounds.width / COURT_WIDTH);
        for command in self.display.commands() {
            replay(&mut frame, command);
        }
        vec![frame.into_geometry()]
    }
}

fn replay(frame: &mut Frame, command: &DrawCommand) {
    match command {
        DrawCommand::Rect {
            x,
            y,
            width,
            height,
            color,
        } => frame.fill_rectangle(Point::new(*x, *y), Size::new(*width, *height), to_color(*color)),
        DrawCommand::Circle {
            cx,
            cy,
            radius,
            color,
        } => frame.fill(&Path::circle(Point::new(*cx, *cy), *radius), to_color(*color)),
        DrawCommand::Text {
            content,
            x,
            y,
            size,
            color,
        } => frame.fill_text(canvas::Text {
            content: content.clone(),
            position: Point::new(*x, *y - size * TEXT_ASCENT),
            color: to_color(*color),
            size: Pixels(*size),
            ..canvas::Text::default()
        }),
    }
}

fn to_color(rgba: Rgba) -> Color {
    Color::from_rgba8(rgba.color.r, rgba.color.g, rgba.color.b, rgba.alpha)
}

/// Maps a widget-local x to court pixels.
pub fn to_court_x(local_x: f32, widget_width: f32) -> f32 {
    if widget_width <= 0.0 {
        return local_x;
    }
    local_x * COURT_WIDTH / widget_width
}
