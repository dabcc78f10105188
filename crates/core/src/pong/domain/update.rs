use rand::Rng;

use super::game_state::{GameState, Phase, Side, RETURN_SPEED};

impl GameState {
    /// Advances the game by one tick. Does nothing unless running.
    pub fn update<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.phase != Phase::Running {
            return;
        }

        self.apply_player_input();
        self.advance_ball();
        self.resolve_opponent_band(rng);
        self.resolve_player_band(rng);
        self.track_ball();

        if let Some(winner) = self.score.winner() {
            log::debug!(
                "Game over: {winner:?} wins {}-{}",
                self.score.player,
                self.score.opponent
            );
            self.phase = Phase::GameOver(winner);
        }
    }

    fn apply_player_input(&mut self) {
        let width = self.width;
        if let Some(x) = self.pending_pointer.take() {
            let half = self.player.width / 2.0;
            self.player.move_to(x - half, width);
        }
        if self.keys.left {
            let x = self.player.x - self.player.speed;
            self.player.move_to(x, width);
        }
        if self.keys.right {
            let x = self.player.x + self.player.speed;
            self.player.move_to(x, width);
        }
    }

    fn advance_ball(&mut self) {
        let ball = &mut self.ball;
        ball.x += ball.vx;
        ball.y += ball.vy;

        let hits_left = ball.x - ball.radius <= 0.0 && ball.vx < 0.0;
        let hits_right = ball.x + ball.radius >= self.width && ball.vx > 0.0;
        if hits_left || hits_right {
            ball.vx = -ball.vx;
        }
    }

    fn resolve_opponent_band<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.ball.y - self.ball.radius > self.opponent.bottom() {
            return;
        }
        if self.opponent.spans(self.ball.x) {
            self.ball.vy = -self.ball.vy;
            self.ball.y = self.opponent.bottom() + self.ball.radius;
        } else {
            self.score.player += 1;
            self.serve(Side::Opponent, rng);
        }
    }

    fn resolve_player_band<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.ball.y + self.ball.radius < self.player.y {
            return;
        }
        if self.player.spans(self.ball.x) {
            let offset = (self.ball.x - self.player.center_x()) / (self.player.width / 2.0);
            self.ball.vy = -self.ball.vy;
            self.ball.vx = RETURN_SPEED * offset;
            self.ball.y = self.player.y - self.ball.radius;
        } else {
            self.score.opponent += 1;
            self.serve(Side::Player, rng);
        }
    }

    /// The opponent follows the ball only while it is in the opponent's half.
    fn track_ball(&mut self) {
        if self.ball.y >= self.height / 2.0 {
            return;
        }
        let target = self.ball.x - self.opponent.width / 2.0;
        let speed = self.opponent.speed;
        let step = (target - self.opponent.x).clamp(-speed, speed);
        let x = self.opponent.x + step;
        self.opponent.move_to(x, self.width);
    }
}
