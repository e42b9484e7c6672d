//! Game-level rules: classify positions, run the clock and play engine
//! matches.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use miluva_core::{Color, Move, Position, generate_legal};
use tracing::{debug, info, warn};

use crate::search::{SearchOutcome, Searcher};
use crate::time::{TimeFormat, TimeManager};

/// Games still running after this many plies are adjudicated drawn.
pub const MAX_GAME_PLIES: usize = 600;

/// Final score of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameResult {
    WhiteWin,
    Draw,
    BlackWin,
}

impl GameResult {
    pub fn win_for(color: Color) -> Self {
        match color {
            Color::White => GameResult::WhiteWin,
            Color::Black => GameResult::BlackWin,
        }
    }
}

impl std::fmt::Display for GameResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            GameResult::WhiteWin => "1-0",
            GameResult::Draw => "1/2-1/2",
            GameResult::BlackWin => "0-1",
        })
    }
}

/// Where a game stands after the last move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Ongoing,
    Checkmate { winner: Color },
    Stalemate,
    FiftyMoveRule,
    ThreefoldRepetition,
    TimeForfeit { winner: Color },
}

impl GameState {
    /// `None` while the game is still running.
    pub fn result(self) -> Option<GameResult> {
        match self {
            GameState::Ongoing => None,
            GameState::Checkmate { winner } | GameState::TimeForfeit { winner } => Some(GameResult::win_for(winner)),
            GameState::Stalemate | GameState::FiftyMoveRule | GameState::ThreefoldRepetition => Some(GameResult::Draw),
        }
    }

    pub fn is_over(self) -> bool {
        self != GameState::Ongoing
    }
}

/// Remaining time for both sides under a [`TimeFormat`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clock {
    format: TimeFormat,
    remaining: [Duration; Color::COUNT],
    flagged: Option<Color>,
}

impl Clock {
    pub fn new(format: TimeFormat) -> Self {
        let start = match format {
            TimeFormat::Fixed(budget) => budget,
            TimeFormat::Clock { base, .. } => base,
        };
        Self {
            format,
            remaining: [start; Color::COUNT],
            flagged: None,
        }
    }

    pub fn format(&self) -> TimeFormat {
        self.format
    }

    pub fn remaining(&self, color: Color) -> Duration {
        self.remaining[color.index()]
    }

    /// Charge `elapsed` to `color` after it moved.
    ///
    /// A side that overran its bank flags and its clock reads zero. A
    /// fixed per-move budget is never charged and never flags.
    pub fn charge(&mut self, color: Color, elapsed: Duration) {
        let TimeFormat::Clock { increment, .. } = self.format else {
            return;
        };
        let slot = &mut self.remaining[color.index()];
        if elapsed > *slot {
            *slot = Duration::ZERO;
            self.flagged.get_or_insert(color);
        } else {
            *slot = *slot - elapsed + increment;
        }
    }

    pub fn has_time_left(&self, color: Color) -> bool {
        self.flagged != Some(color)
    }

    /// The first side that ran out of time, if any.
    pub fn flagged(&self) -> Option<Color> {
        self.flagged
    }
}

/// Classify `pos` as reached in a game.
///
/// A flag fall outranks anything on the board. Repetition is a draw on the
/// third occurrence and the fifty-move rule after 100 reversible plies.
pub fn classify(pos: &Position, clock: Option<&Clock>) -> GameState {
    if let Some(loser) = clock.and_then(Clock::flagged) {
        return GameState::TimeForfeit { winner: !loser };
    }

    if generate_legal(pos).is_empty() {
        return if pos.in_check() {
            GameState::Checkmate { winner: !pos.side_to_move() }
        } else {
            GameState::Stalemate
        };
    }

    if pos.halfmove_clock() >= 100 {
        return GameState::FiftyMoveRule;
    }
    if pos.repetition_count() >= 2 {
        return GameState::ThreefoldRepetition;
    }
    GameState::Ongoing
}

/// A finished game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    pub result: GameResult,
    pub state: GameState,
    pub moves: Vec<Move>,
}

/// Play one game from `start` with `white` and `black` moving in turn.
///
/// Each side searches under `format` with its own configuration. The moves
/// played so far are passed along for book lookups, which only succeed
/// when `start` is the standard initial position.
pub fn play_game(white: &mut Searcher, black: &mut Searcher, format: TimeFormat, start: &Position) -> GameRecord {
    let mut pos = start.clone();
    let mut clock = Clock::new(format);
    let mut moves = Vec::new();

    let state = loop {
        let state = classify(&pos, Some(&clock));
        if state.is_over() {
            break state;
        }
        if moves.len() >= MAX_GAME_PLIES {
            warn!(plies = moves.len(), "game adjudicated drawn at ply cap");
            break GameState::Ongoing;
        }

        let side = pos.side_to_move();
        let searcher = match side {
            Color::White => &mut *white,
            Color::Black => &mut *black,
        };
        let overhead = searcher.config().move_overhead;
        let max_depth = searcher.config().max_depth;
        let time = TimeManager::for_format(
            format,
            clock.remaining(side),
            &pos,
            overhead,
            Arc::new(AtomicBool::new(false)),
        );

        let started = Instant::now();
        let outcome = searcher.search(&pos, &time, max_depth, &moves, |_| {});
        clock.charge(side, started.elapsed());

        let SearchOutcome::BestMove(result) = outcome else {
            // classify saw legal moves, so the search cannot be terminal
            break classify(&pos, Some(&clock));
        };
        debug!(ply = moves.len(), mv = %result.best_move, score = result.score, "move played");
        pos.make_move(result.best_move);
        moves.push(result.best_move);
    };

    let result = state.result().unwrap_or(GameResult::Draw);
    info!(%result, ?state, plies = moves.len(), "game finished");
    GameRecord { result, state, moves }
}

/// Tally of a match from the first engine's point of view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchScore {
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
}

impl MatchScore {
    fn record(&mut self, result: GameResult, first_is_white: bool) {
        match (result, first_is_white) {
            (GameResult::Draw, _) => self.draws += 1,
            (GameResult::WhiteWin, true) | (GameResult::BlackWin, false) => self.wins += 1,
            _ => self.losses += 1,
        }
    }

    pub fn games(&self) -> u32 {
        self.wins + self.draws + self.losses
    }
}

/// Play `first` against `second` twice from `start`, once with each color.
pub fn play_pair(first: &mut Searcher, second: &mut Searcher, format: TimeFormat, start: &Position) -> MatchScore {
    let mut score = MatchScore::default();
    first.clear();
    second.clear();
    score.record(play_game(first, second, format, start).result, true);
    first.clear();
    second.clear();
    score.record(play_game(second, first, format, start).result, false);
    score
}
