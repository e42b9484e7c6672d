//! Integration tests for engine-versus-engine play.

use std::time::Duration;

use miluva_core::{Color, Position};
use miluva_engine::{EngineConfig, GameResult, GameState, Searcher, TimeFormat, classify, play_game, play_pair};

fn shallow() -> Searcher {
    Searcher::new(EngineConfig {
        hash_mb: 1,
        max_depth: 3,
        ..EngineConfig::default()
    })
}

const FAST: TimeFormat = TimeFormat::Fixed(Duration::from_secs(5));

#[test]
fn white_delivers_mate_in_one() {
    let start: Position = "6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1".parse().unwrap();
    let record = play_game(&mut shallow(), &mut shallow(), FAST, &start);
    assert_eq!(record.result, GameResult::WhiteWin);
    assert_eq!(record.state, GameState::Checkmate { winner: Color::White });
    assert_eq!(record.moves.len(), 1);
    assert_eq!(record.moves[0].to_uci(), "a1a8");
}

#[test]
fn bare_kings_end_in_a_draw() {
    let start: Position = "4k3/8/8/8/8/8/8/4K3 w - - 90 80".parse().unwrap();
    let record = play_game(&mut shallow(), &mut shallow(), FAST, &start);
    assert_eq!(record.result, GameResult::Draw);
    assert!(matches!(
        record.state,
        GameState::FiftyMoveRule | GameState::ThreefoldRepetition
    ));
    assert!(record.moves.len() <= 10);
}

#[test]
fn recorded_moves_replay_to_final_state() {
    let start: Position = "4k3/8/8/8/8/8/4P3/4K3 w - - 90 80".parse().unwrap();
    let record = play_game(&mut shallow(), &mut shallow(), FAST, &start);

    let mut pos = start.clone();
    for mv in &record.moves {
        pos.make_move(*mv);
    }
    assert_eq!(classify(&pos, None), record.state);
}

#[test]
fn pair_plays_both_colors() {
    let start: Position = "6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1".parse().unwrap();
    let score = play_pair(&mut shallow(), &mut shallow(), FAST, &start);
    assert_eq!(score.games(), 2);
    // White mates at once in both games, so each engine wins once.
    assert_eq!(score.wins, 1);
    assert_eq!(score.losses, 1);
}
