use crate::shared::color::{Color, Rgba};

use super::game_state::{GameState, Phase, Side};

/// Drawing primitives the game needs from a host canvas.
///
/// Coordinates are court pixels with the origin at the top left. Text is
/// positioned by its left end on the baseline.
pub trait DrawSurface {
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba);
    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba);
    fn fill_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Rgba);
}

pub const BACKGROUND: Color = Color::rgb(0xf8, 0xfa, 0xfc);
pub const NET: Color = Color::rgb(0xcb, 0xd5, 0xf5);
pub const PLAYER: Color = Color::rgb(0x1d, 0x4e, 0xd8);
pub const OPPONENT: Color = Color::rgb(0x0e, 0xa5, 0xe9);
pub const BALL: Color = Color::rgb(0x11, 0x18, 0x27);
pub const SCORE_TEXT: Color = Color::rgb(0x0f, 0x17, 0x2a);
pub const SCRIM: Rgba = Rgba::translucent(Color::rgb(15, 23, 42), 0.75);
pub const BANNER_TEXT: Color = Color::rgb(0xf8, 0xfa, 0xfc);

const NET_SPACING: f32 = 18.0;

/// Paints one complete frame of the game.
pub fn draw(state: &GameState, surface: &mut impl DrawSurface) {
    let (w, h) = (state.width, state.height);
    surface.fill_rect(0.0, 0.0, w, h, Rgba::opaque(BACKGROUND));

    let mut y = 0.0;
    while y < h {
        surface.fill_rect(w / 2.0 - 2.0, y, 4.0, 10.0, Rgba::opaque(NET));
        y += NET_SPACING;
    }

    for (paddle, color) in [(&state.player, PLAYER), (&state.opponent, OPPONENT)] {
        surface.fill_rect(
            paddle.x,
            paddle.y,
            paddle.width,
            paddle.height,
            Rgba::opaque(color),
        );
    }
    surface.fill_circle(
        state.ball.x,
        state.ball.y,
        state.ball.radius,
        Rgba::opaque(BALL),
    );

    let score_y = h / 2.0 + 40.0;
    let score_color = Rgba::opaque(SCORE_TEXT);
    surface.fill_text(
        &format!("You {}", state.score.player),
        24.0,
        score_y,
        20.0,
        score_color,
    );
    surface.fill_text(
        &format!("CPU {}", state.score.opponent),
        w - 110.0,
        score_y,
        20.0,
        score_color,
    );

    let banner = Rgba::opaque(BANNER_TEXT);
    match state.phase {
        Phase::Running => {}
        Phase::Paused => {
            surface.fill_rect(0.0, 0.0, w, h, SCRIM);
            surface.fill_text("Paused", w / 2.0 - 52.0, h / 2.0, 28.0, banner);
        }
        Phase::GameOver(winner) => {
            let headline = match winner {
                Side::Player => "You win!",
                Side::Opponent => "CPU wins!",
            };
            surface.fill_rect(0.0, 0.0, w, h, SCRIM);
            surface.fill_text(headline, w / 2.0 - 60.0, h / 2.0 - 8.0, 24.0, banner);
            surface.fill_text(
                "Reload the page to play again",
                w / 2.0 - 112.0,
                h / 2.0 + 20.0,
                16.0,
                banner,
            );
        }
    }
}
