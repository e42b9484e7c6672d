//! Search, evaluation and game play for miluva.

pub mod book;
pub mod config;
pub mod eval;
pub mod game;
pub mod search;
pub mod time;

pub use book::{BookHit, MemoryBook, NoBook, OpeningBook};
pub use config::{ConfigError, EngineConfig};
pub use eval::{ClassicEvaluator, Evaluator};
pub use game::{Clock, GameRecord, GameResult, GameState, MatchScore, classify, play_game, play_pair};
pub use search::negamax::{INF, MATE_SCORE, MATE_THRESHOLD, MAX_PLY};
pub use search::{IterationInfo, SearchOutcome, SearchResult, Searcher, Terminal, mate_in};
pub use time::{GoLimits, TimeFormat, TimeManager, compute_limits};
