use rand::Rng;

pub const COURT_WIDTH: f32 = 720.0;
pub const COURT_HEIGHT: f32 = 420.0;
pub const WIN_SCORE: u32 = 5;

/// Speed on each axis right after a serve.
pub const SERVE_SPEED: f32 = 4.0;
/// Horizontal speed of a return struck at the very tip of the player paddle.
pub const RETURN_SPEED: f32 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Paddle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
}

impl Paddle {
    pub fn centered(court_width: f32, y: f32, width: f32, height: f32, speed: f32) -> Self {
        Self {
            x: court_width / 2.0 - width / 2.0,
            y,
            width,
            height,
            speed,
        }
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Whether `x` lies strictly between the paddle's ends.
    pub fn spans(&self, x: f32) -> bool {
        x > self.x && x < self.x + self.width
    }

    /// Moves the paddle to `x`, kept inside `[0, court_width - width]`.
    pub fn move_to(&mut self, x: f32, court_width: f32) {
        self.x = x.clamp(0.0, (court_width - self.width).max(0.0));
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ball {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub vx: f32,
    pub vy: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Player,
    Opponent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Score {
    pub player: u32,
    pub opponent: u32,
    pub target: u32,
}

impl Score {
    pub fn winner(&self) -> Option<Side> {
        if self.player >= self.target {
            Some(Side::Player)
        } else if self.opponent >= self.target {
            Some(Side::Opponent)
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Running,
    Paused,
    GameOver(Side),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeldKeys {
    pub left: bool,
    pub right: bool,
}

/// Everything the game loop reads and writes between ticks.
///
/// Input handlers only record intent (`keys`, `pending_pointer`); the next
/// [`update`](GameState::update) applies it.
#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    pub width: f32,
    pub height: f32,
    pub player: Paddle,
    pub opponent: Paddle,
    pub ball: Ball,
    pub score: Score,
    pub phase: Phase,
    pub keys: HeldKeys,
    pub pending_pointer: Option<f32>,
}

impl GameState {
    /// A fresh game with the ball served toward the player.
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::with_court(COURT_WIDTH, COURT_HEIGHT, rng)
    }

    pub fn with_court<R: Rng + ?Sized>(width: f32, height: f32, rng: &mut R) -> Self {
        let mut state = Self {
            width,
            height,
            player: Paddle::centered(width, height - 18.0, 100.0, 10.0, 8.0),
            opponent: Paddle::centered(width, 8.0, 80.0, 10.0, 5.0),
            ball: Ball {
                x: width / 2.0,
                y: height / 2.0,
                radius: 8.0,
                vx: SERVE_SPEED,
                vy: SERVE_SPEED,
            },
            score: Score {
                player: 0,
                opponent: 0,
                target: WIN_SCORE,
            },
            phase: Phase::Running,
            keys: HeldKeys::default(),
            pending_pointer: None,
        };
        state.serve(Side::Player, rng);
        state
    }

    /// Puts the ball back at the center moving toward `toward` with a
    /// random horizontal direction.
    pub fn serve<R: Rng + ?Sized>(&mut self, toward: Side, rng: &mut R) {
        self.ball.x = self.width / 2.0;
        self.ball.y = self.height / 2.0;
        self.ball.vx = if rng.gen_bool(0.5) {
            SERVE_SPEED
        } else {
            -SERVE_SPEED
        };
        self.ball.vy = match toward {
            Side::Player => SERVE_SPEED,
            Side::Opponent => -SERVE_SPEED,
        };
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::GameOver(_))
    }
}
