//! UCI protocol errors.

use miluva_core::{FenError, MoveParseError};
use miluva_engine::ConfigError;
use miluva_engine::book::BookError;

/// Errors that can occur during UCI protocol handling.
#[derive(Debug, thiserror::Error)]
pub enum UciError {
    /// The `position` command is missing `startpos` or `fen` keyword.
    #[error("malformed position command: missing startpos or fen keyword")]
    MalformedPosition,

    /// Failed to parse a FEN string.
    #[error("invalid FEN {fen:?}: {source}")]
    InvalidFen {
        fen: String,
        #[source]
        source: FenError,
    },

    /// A move in the `position` command is not legal in its position.
    #[error("invalid move {uci_move}: {source}")]
    InvalidMove {
        uci_move: String,
        #[source]
        source: MoveParseError,
    },

    /// A `go` parameter has no value after it.
    #[error("missing value for go parameter {param}")]
    MissingGoValue { param: String },

    /// A `go` parameter value is not a number.
    #[error("invalid value for go parameter {param}: {value}")]
    InvalidGoValue { param: String, value: String },

    /// `setoption` without a `name`.
    #[error("malformed setoption command")]
    MalformedSetOption,

    #[error("unknown option {name}")]
    UnknownOption { name: String },

    #[error("invalid value for option {name}: {value:?}")]
    InvalidOptionValue { name: String, value: String },

    #[error("invalid perft depth: {value:?}")]
    InvalidPerftDepth { value: String },

    /// An option value the engine configuration rejects.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The book file has a line that does not replay.
    #[error(transparent)]
    Book(#[from] BookError),

    /// An I/O error occurred while reading from stdin.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}
