use super::game_state::{GameState, Phase};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Space,
    Other,
}

/// Discrete events delivered by the host between ticks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// Pointer x in court coordinates.
    PointerMoved { x: f32 },
    KeyDown(Key),
    KeyUp(Key),
}

impl GameState {
    /// Records an input event for the next tick.
    ///
    /// Space toggles pause right away. Everything is ignored once the game
    /// is over, and pointer moves are dropped while paused.
    pub fn handle_input(&mut self, event: InputEvent) {
        if self.is_over() {
            return;
        }
        match event {
            InputEvent::PointerMoved { x } => {
                if self.phase == Phase::Running && x.is_finite() {
                    self.pending_pointer = Some(x);
                }
            }
            InputEvent::KeyDown(Key::ArrowLeft) => self.keys.left = true,
            InputEvent::KeyDown(Key::ArrowRight) => self.keys.right = true,
            InputEvent::KeyDown(Key::Space) => self.toggle_pause(),
            InputEvent::KeyUp(Key::ArrowLeft) => self.keys.left = false,
            InputEvent::KeyUp(Key::ArrowRight) => self.keys.right = false,
            InputEvent::KeyDown(Key::Other) | InputEvent::KeyUp(Key::Space | Key::Other) => {}
        }
    }

    fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            Phase::Running => {
                self.pending_pointer = None;
                Phase::Paused
            }
            Phase::Paused => Phase::Running,
            over @ Phase::GameOver(_) => over,
        };
    }
}
