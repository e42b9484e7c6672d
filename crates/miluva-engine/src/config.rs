//! Engine tuning knobs shared by the search, the book and the UCI layer.

use std::time::Duration;

use thiserror::Error;

/// Smallest transposition table accepted, in megabytes.
pub const MIN_HASH_MB: usize = 1;

/// Largest transposition table accepted, in megabytes.
pub const MAX_HASH_MB: usize = 4096;

/// Deepest iteration the root loop may request.
pub const MAX_DEPTH: u8 = 100;

/// A rejected configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("hash size {mb} MB outside {MIN_HASH_MB}..={MAX_HASH_MB}")]
    HashSize { mb: usize },

    #[error("max depth {depth} outside 1..={MAX_DEPTH}")]
    Depth { depth: u8 },

    #[error("aspiration window must be positive, got {window}")]
    AspirationWindow { window: i32 },

    #[error("move overhead {ms} ms exceeds 5000 ms")]
    MoveOverhead { ms: u128 },
}

/// Settings for one [`Searcher`](crate::Searcher).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Transposition table size in megabytes.
    pub hash_mb: usize,
    /// Upper bound on iterative-deepening depth.
    pub max_depth: u8,
    /// Half-width of the first aspiration window, in centipawns.
    pub aspiration_window: i32,
    /// Book hits seen fewer times than this are ignored.
    pub book_min_count: u32,
    /// Time held back from every clock-based budget.
    pub move_overhead: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hash_mb: 16,
            max_depth: 64,
            aspiration_window: 35,
            book_min_count: 3,
            move_overhead: Duration::from_millis(10),
        }
    }
}

impl EngineConfig {
    /// Reject values the search cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_HASH_MB..=MAX_HASH_MB).contains(&self.hash_mb) {
            return Err(ConfigError::HashSize { mb: self.hash_mb });
        }
        if self.max_depth == 0 || self.max_depth > MAX_DEPTH {
            return Err(ConfigError::Depth { depth: self.max_depth });
        }
        if self.aspiration_window <= 0 {
            return Err(ConfigError::AspirationWindow { window: self.aspiration_window });
        }
        if self.move_overhead > Duration::from_secs(5) {
            return Err(ConfigError::MoveOverhead { ms: self.move_overhead.as_millis() });
        }
        Ok(())
    }
}
