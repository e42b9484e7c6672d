//! Iterative-deepening root search.

pub mod heuristics;
pub mod negamax;
pub mod ordering;
pub mod quiescence;
pub mod tt;

use std::time::Duration;

use miluva_core::{Move, Position, generate_legal};
use tracing::{debug, info};

use crate::book::{NoBook, OpeningBook};
use crate::config::{ConfigError, EngineConfig};
use crate::eval::{ClassicEvaluator, Evaluator};
use crate::time::TimeManager;
use heuristics::{CounterMoveTable, HistoryTable, KillerTable};
use negamax::{INF, MATE_SCORE, MATE_THRESHOLD, PvTable, SearchContext, negamax};
use tt::TranspositionTable;

/// Once an aspiration window has doubled past this, the full window is used.
const ASPIRATION_CAP: i32 = 1_000;

/// Why the side to move has no move to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Checkmate,
    Stalemate,
}

/// What a root search produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    BestMove(SearchResult),
    Terminal(Terminal),
}

impl SearchOutcome {
    pub fn best_move(&self) -> Option<Move> {
        match self {
            SearchOutcome::BestMove(result) => Some(result.best_move),
            SearchOutcome::Terminal(_) => None,
        }
    }
}

/// Result of the last completed iteration (or the book / fallback move).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Move,
    pub pv: Vec<Move>,
    /// Centipawns from the side to move's point of view.
    pub score: i32,
    /// Depth of the last completed iteration, 0 for book and fallback moves.
    pub depth: u8,
    pub nodes: u64,
    pub elapsed: Duration,
    pub from_book: bool,
}

impl SearchResult {
    /// The expected reply, second move of the PV.
    pub fn ponder_move(&self) -> Option<Move> {
        self.pv.get(1).copied()
    }
}

/// Progress report after each completed iteration.
#[derive(Debug, Clone, Copy)]
pub struct IterationInfo<'a> {
    pub depth: u8,
    pub seldepth: usize,
    pub score: i32,
    pub nodes: u64,
    pub elapsed: Duration,
    pub hashfull: usize,
    pub pv: &'a [Move],
}

/// Mate distance in moves for a mate score, positive when the side to move
/// mates.
pub fn mate_in(score: i32) -> Option<i32> {
    if score >= MATE_THRESHOLD {
        Some((MATE_SCORE - score + 1) / 2)
    } else if score <= -MATE_THRESHOLD {
        Some(-(MATE_SCORE + score + 1) / 2)
    } else {
        None
    }
}

/// Tracks best-move stability across iterations to scale the soft limit.
struct StabilityTracker {
    last_move: Move,
    last_score: i32,
    stable_streak: u32,
}

impl StabilityTracker {
    fn new() -> Self {
        Self {
            last_move: Move::NULL,
            last_score: 0,
            stable_streak: 0,
        }
    }

    /// Soft-limit scale in percent for the next iteration.
    ///
    /// A drop of more than 100 cp gives 250, more than 50 cp gives 180 and
    /// three stable iterations in a row give 60.
    fn update(&mut self, best_move: Move, score: i32) -> u32 {
        let scale = if self.last_move.is_null() {
            100
        } else {
            let drop = self.last_score - score;
            if drop > 100 {
                self.stable_streak = 0;
                250
            } else if drop > 50 {
                self.stable_streak = 0;
                180
            } else if best_move == self.last_move {
                self.stable_streak += 1;
                if self.stable_streak >= 3 { 60 } else { 100 }
            } else {
                self.stable_streak = 0;
                100
            }
        };
        self.last_move = best_move;
        self.last_score = score;
        scale
    }
}

/// Single-threaded searcher owning its table, heuristics, evaluator and book.
pub struct Searcher {
    tt: TranspositionTable,
    killers: KillerTable,
    counter_moves: CounterMoveTable,
    history: HistoryTable,
    evaluator: Box<dyn Evaluator>,
    book: Box<dyn OpeningBook>,
    config: EngineConfig,
}

impl Searcher {
    /// A searcher with the classic evaluator and no book.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            tt: TranspositionTable::new(config.hash_mb),
            killers: KillerTable::new(),
            counter_moves: CounterMoveTable::new(),
            history: HistoryTable::new(),
            evaluator: Box::new(ClassicEvaluator),
            book: Box::new(NoBook),
            config,
        }
    }

    pub fn with_evaluator(mut self, evaluator: impl Evaluator + 'static) -> Self {
        self.evaluator = Box::new(evaluator);
        self
    }

    pub fn with_book(mut self, book: impl OpeningBook + 'static) -> Self {
        self.book = Box::new(book);
        self
    }

    pub fn set_book(&mut self, book: impl OpeningBook + 'static) {
        self.book = Box::new(book);
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replace the configuration, reallocating the table if its size changed.
    pub fn set_config(&mut self, config: EngineConfig) -> Result<(), ConfigError> {
        config.validate()?;
        if config.hash_mb != self.config.hash_mb {
            self.tt = TranspositionTable::new(config.hash_mb);
        }
        self.config = config;
        Ok(())
    }

    /// Forget everything learned so far.
    pub fn clear(&mut self) {
        self.tt.clear();
        self.killers.clear();
        self.counter_moves.clear();
        self.history.clear();
    }

    /// Choose a move for `position`.
    ///
    /// `game_moves` is the move list that led to `position`. The book is
    /// only consulted when it replays from the standard start to
    /// `position`. `on_iter` is called after every completed iteration.
    pub fn search<F>(
        &mut self,
        position: &Position,
        time: &TimeManager,
        max_depth: u8,
        game_moves: &[Move],
        mut on_iter: F,
    ) -> SearchOutcome
    where
        F: FnMut(&IterationInfo<'_>),
    {
        let legal = generate_legal(position);
        let Some(&first_legal) = legal.first() else {
            let terminal = if position.in_check() { Terminal::Checkmate } else { Terminal::Stalemate };
            info!(?terminal, "no legal moves at root");
            return SearchOutcome::Terminal(terminal);
        };

        // replay only for a trusted hit
        if let Some(hit) = self.book.lookup(game_moves)
            && hit.count >= self.config.book_min_count
            && replays_to(position, game_moves)
            && let Ok(mv) = position.parse_move(&hit.mv)
        {
            debug!(mv = %mv, count = hit.count, "book move");
            return SearchOutcome::BestMove(SearchResult {
                best_move: mv,
                pv: vec![mv],
                score: 0,
                depth: 0,
                nodes: 0,
                elapsed: time.elapsed(),
                from_book: true,
            });
        }

        self.clear();
        self.tt.set_age(position.ply());

        let mut pos = position.clone();
        let max_depth = max_depth.min(self.config.max_depth).max(1);
        let window = self.config.aspiration_window;

        let mut ctx = SearchContext {
            nodes: 0,
            seldepth: 0,
            tt: &mut self.tt,
            pv: PvTable::new(),
            killers: &mut self.killers,
            counter_moves: &mut self.counter_moves,
            history: &mut self.history,
            time,
            evaluator: self.evaluator.as_ref(),
            root_history: pos.history_len(),
            stopped: false,
        };

        let mut completed: Option<(Vec<Move>, i32, u8)> = None;
        let mut prev_score = 0;
        let mut stability = StabilityTracker::new();

        for depth in 1..=max_depth {
            if depth > 1 && time.should_stop_iterating() {
                break;
            }

            ctx.seldepth = 0;
            let score = aspiration(&mut pos, depth as i32, prev_score, window, &mut ctx);
            if ctx.stopped {
                debug!(depth, "iteration aborted");
                break;
            }

            let pv = ctx.pv.root_pv().to_vec();
            let Some(&best) = pv.first() else {
                break;
            };
            prev_score = score;

            on_iter(&IterationInfo {
                depth,
                seldepth: ctx.seldepth,
                score,
                nodes: ctx.nodes,
                elapsed: time.elapsed(),
                hashfull: ctx.tt.hashfull(),
                pv: &pv,
            });

            time.set_soft_scale(stability.update(best, score));
            completed = Some((pv, score, depth));

            if score.abs() >= MATE_THRESHOLD {
                break;
            }
        }

        let (pv, score, depth) = completed.unwrap_or_else(|| (vec![first_legal], 0, 0));
        let result = SearchResult {
            best_move: pv[0],
            pv,
            score,
            depth,
            nodes: ctx.nodes,
            elapsed: time.elapsed(),
            from_book: false,
        };
        info!(
            depth = result.depth,
            score = result.score,
            nodes = result.nodes,
            elapsed_ms = result.elapsed.as_millis() as u64,
            best = %result.best_move,
            "search complete"
        );
        SearchOutcome::BestMove(result)
    }
}

/// Whether `moves` played from the standard start reach `position`.
fn replays_to(position: &Position, moves: &[Move]) -> bool {
    let mut pos = Position::startpos();
    for &mv in moves {
        if !generate_legal(&pos).contains(&mv) {
            return false;
        }
        pos.make_move(mv);
    }
    pos.key() == position.key()
}

/// Search the root with a window around `prev_score`, widening on failure.
fn aspiration(pos: &mut Position, depth: i32, prev_score: i32, window: i32, ctx: &mut SearchContext<'_>) -> i32 {
    let ext_budget = 2 + depth / 2;
    if depth == 1 {
        return negamax(pos, 0, -INF, INF, depth, ext_budget, Move::NULL, ctx);
    }

    let mut delta = window;
    let mut alpha = (prev_score - delta).max(-INF);
    let mut beta = (prev_score + delta).min(INF);
    loop {
        let score = negamax(pos, 0, alpha, beta, depth, ext_budget, Move::NULL, ctx);
        if ctx.stopped || (score > alpha && score < beta) {
            return score;
        }
        // a failed window is not a result; abandon the iteration
        if !ctx.time.has_time_left() {
            ctx.stopped = true;
            return score;
        }
        debug!(depth, score, alpha, beta, "aspiration re-search");
        delta *= 2;
        if delta > ASPIRATION_CAP {
            alpha = -INF;
            beta = INF;
        } else {
            alpha = (prev_score - delta).max(-INF);
            beta = (prev_score + delta).min(INF);
        }
    }
}

impl std::fmt::Debug for Searcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Searcher")
            .field("tt", &self.tt)
            .field("config", &self.config)
            .finish()
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
