use rand::rngs::StdRng;
use rand::SeedableRng;

use eyepong_core::pong::domain::draw::draw;
use eyepong_core::pong::domain::game_state::{GameState, Phase, Side, WIN_SCORE};
use eyepong_core::pong::domain::input::{InputEvent, Key};
use eyepong_core::pong::infrastructure::display_list::DisplayList;

const MAX_TICKS: usize = 10_000;

/// Ticks until the game ends, redrawing after each update like a host.
fn play_out(state: &mut GameState, rng: &mut StdRng, display: &mut DisplayList) -> usize {
    for tick in 0..MAX_TICKS {
        state.update(rng);
        display.clear();
        draw(state, display);
        if state.is_over() {
            return tick;
        }
    }
    panic!("game did not finish within {MAX_TICKS} ticks");
}

#[test]
fn test_player_parked_in_corner_loses_every_point() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut state = GameState::new(&mut rng);
    let mut display = DisplayList::new();
    state.handle_input(InputEvent::KeyDown(Key::ArrowLeft));

    play_out(&mut state, &mut rng, &mut display);

    assert_eq!(state.phase, Phase::GameOver(Side::Opponent));
    assert_eq!(state.score.opponent, WIN_SCORE);
    assert_eq!(state.score.player, 0);
    assert_eq!(state.player.x, 0.0);

    let texts: Vec<&str> = display.texts().collect();
    assert!(texts.contains(&"CPU wins!"));
    assert!(texts.contains(&"Reload the page to play again"));
    assert!(texts.contains(&"CPU 5"));
}

#[test]
fn test_finished_game_is_frozen() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut state = GameState::new(&mut rng);
    let mut display = DisplayList::new();
    state.handle_input(InputEvent::KeyDown(Key::ArrowRight));
    play_out(&mut state, &mut rng, &mut display);

    let finished = state.clone();
    state.handle_input(InputEvent::KeyDown(Key::Space));
    state.handle_input(InputEvent::PointerMoved { x: 100.0 });
    state.handle_input(InputEvent::KeyUp(Key::ArrowRight));
    for _ in 0..100 {
        state.update(&mut rng);
    }
    assert_eq!(state, finished);
}

#[test]
fn test_pause_holds_everything_until_resumed() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut state = GameState::new(&mut rng);
    for _ in 0..10 {
        state.update(&mut rng);
    }

    state.handle_input(InputEvent::KeyDown(Key::Space));
    state.handle_input(InputEvent::KeyUp(Key::Space));
    let paused = state.clone();
    state.handle_input(InputEvent::KeyDown(Key::ArrowLeft));
    for _ in 0..50 {
        state.update(&mut rng);
    }
    assert_eq!(state.ball, paused.ball);
    assert_eq!(state.player, paused.player);
    assert_eq!(state.opponent, paused.opponent);

    state.handle_input(InputEvent::KeyDown(Key::Space));
    assert_eq!(state.phase, Phase::Running);
    let before = state.ball;
    state.update(&mut rng);
    assert_ne!(state.ball, before);
}
