pub mod draw;
pub mod game_state;
pub mod input;
pub mod update;
