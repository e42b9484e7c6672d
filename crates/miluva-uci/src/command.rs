//! UCI command parsing.

use std::path::PathBuf;
use std::time::Duration;

use miluva_core::{Move, Position};
use miluva_engine::GoLimits;

use crate::error::UciError;

/// Parameters for the `go` command.
///
/// All fields are optional; a bare `go` searches until `stop`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoParams {
    /// Clock, node and movetime limits.
    pub limits: GoLimits,
    /// Search to this depth only.
    pub depth: Option<u8>,
}

/// Position set up by a `position` command.
#[derive(Debug, Clone)]
pub struct PositionInfo {
    /// Position after all moves were applied.
    pub position: Position,
    /// The moves that followed the base position.
    pub moves: Vec<Move>,
}

/// An option change requested by `setoption`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciOption {
    Hash(usize),
    MoveOverhead(Duration),
    MaxDepth(u8),
    BookMinCount(u32),
    /// Load an opening book from a file of coordinate move lines.
    BookFile(PathBuf),
}

/// A parsed UCI command.
#[derive(Debug)]
pub enum Command {
    /// `uci` -- identify the engine.
    Uci,
    /// `isready` -- synchronization ping.
    IsReady,
    /// `ucinewgame` -- reset engine state.
    UciNewGame,
    /// `position` -- set up a board position with optional moves applied.
    Position(PositionInfo),
    /// `go` -- start searching with given parameters.
    Go(GoParams),
    /// `setoption name <id> [value <x>]`.
    SetOption(UciOption),
    /// `stop` -- halt the current search.
    Stop,
    /// `quit` -- exit the engine.
    Quit,
    /// `d` -- print the current position.
    Display,
    /// `perft <depth>` -- count leaf nodes per root move.
    Perft(usize),
    /// Unrecognized command (silently ignored per UCI spec).
    Unknown(String),
}

/// Parse a single line of UCI input into a [`Command`].
pub fn parse_command(line: &str) -> Result<Command, UciError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return Ok(Command::Unknown(String::new()));
    }

    match tokens[0] {
        "uci" => Ok(Command::Uci),
        "isready" => Ok(Command::IsReady),
        "ucinewgame" => Ok(Command::UciNewGame),
        "stop" => Ok(Command::Stop),
        "quit" => Ok(Command::Quit),
        "d" => Ok(Command::Display),
        "perft" => parse_perft(&tokens[1..]),
        "position" => parse_position(&tokens[1..]),
        "go" => parse_go(&tokens[1..]),
        "setoption" => parse_setoption(&tokens[1..]),
        _ => Ok(Command::Unknown(tokens[0].to_string())),
    }
}

/// Parse the `position` command arguments.
///
/// Supports:
/// - `position startpos [moves e2e4 d7d5 ...]`
/// - `position fen <fen-string> [moves e2e4 d7d5 ...]`
fn parse_position(tokens: &[&str]) -> Result<Command, UciError> {
    let Some(&keyword) = tokens.first() else {
        return Err(UciError::MalformedPosition);
    };

    let (mut position, rest) = match keyword {
        "startpos" => (Position::startpos(), &tokens[1..]),
        "fen" => {
            let end = tokens.iter().position(|&t| t == "moves").unwrap_or(tokens.len());
            let fen = tokens[1..end].join(" ");
            let position = fen
                .parse::<Position>()
                .map_err(|source| UciError::InvalidFen { fen: fen.clone(), source })?;
            (position, &tokens[end..])
        }
        _ => return Err(UciError::MalformedPosition),
    };

    let mut moves = Vec::new();
    if rest.first() == Some(&"moves") {
        for text in &rest[1..] {
            let mv = position.parse_move(text).map_err(|source| UciError::InvalidMove {
                uci_move: text.to_string(),
                source,
            })?;
            position.make_move(mv);
            moves.push(mv);
        }
    }

    Ok(Command::Position(PositionInfo { position, moves }))
}

/// Parse the `go` command arguments.
///
/// Supports: wtime, btime, winc, binc, movestogo, depth, movetime,
/// nodes, infinite. Unknown tokens are silently skipped.
fn parse_go(tokens: &[&str]) -> Result<Command, UciError> {
    let mut params = GoParams::default();
    let limits = &mut params.limits;

    let mut i = 0;
    while i < tokens.len() {
        let value = tokens.get(i + 1);
        match tokens[i] {
            "wtime" => limits.wtime = Some(parse_millis(value, "wtime")?),
            "btime" => limits.btime = Some(parse_millis(value, "btime")?),
            "winc" => limits.winc = Some(parse_millis(value, "winc")?),
            "binc" => limits.binc = Some(parse_millis(value, "binc")?),
            "movestogo" => limits.movestogo = Some(parse_int(value, "movestogo")?),
            "movetime" => limits.movetime = Some(parse_millis(value, "movetime")?),
            "nodes" => limits.nodes = Some(parse_int(value, "nodes")?),
            "depth" => params.depth = Some(parse_int(value, "depth")?),
            "infinite" => {
                limits.infinite = true;
                i += 1;
                continue;
            }
            // Unknown token -- skip per UCI convention
            _ => {
                i += 1;
                continue;
            }
        }
        i += 2;
    }

    Ok(Command::Go(params))
}

/// Parse a millisecond value from a token. GUIs may send negative clock
/// values when a side is in time trouble; those clamp to zero.
fn parse_millis(token: Option<&&str>, param: &str) -> Result<Duration, UciError> {
    let ms: i64 = parse_int(token, param)?;
    Ok(Duration::from_millis(ms.max(0) as u64))
}

/// Parse an integer value from a token.
fn parse_int<T: std::str::FromStr>(token: Option<&&str>, param: &str) -> Result<T, UciError> {
    let value = token.ok_or_else(|| UciError::MissingGoValue {
        param: param.to_string(),
    })?;
    value.parse().map_err(|_| UciError::InvalidGoValue {
        param: param.to_string(),
        value: value.to_string(),
    })
}

/// Parse `setoption name <id> [value <x>]`. Option names are
/// case-insensitive and may contain spaces.
fn parse_setoption(tokens: &[&str]) -> Result<Command, UciError> {
    if tokens.first() != Some(&"name") {
        return Err(UciError::MalformedSetOption);
    }
    let value_at = tokens.iter().position(|&t| t == "value").unwrap_or(tokens.len());
    let name = tokens[1..value_at].join(" ");
    let value = tokens.get(value_at + 1..).map(|rest| rest.join(" ")).unwrap_or_default();
    if name.is_empty() {
        return Err(UciError::MalformedSetOption);
    }

    let invalid = || UciError::InvalidOptionValue {
        name: name.clone(),
        value: value.clone(),
    };
    let option = match name.to_ascii_lowercase().as_str() {
        "hash" => UciOption::Hash(value.parse().map_err(|_| invalid())?),
        "moveoverhead" => UciOption::MoveOverhead(Duration::from_millis(value.parse().map_err(|_| invalid())?)),
        "maxdepth" => UciOption::MaxDepth(value.parse().map_err(|_| invalid())?),
        "bookmincount" => UciOption::BookMinCount(value.parse().map_err(|_| invalid())?),
        "bookfile" if !value.is_empty() => UciOption::BookFile(PathBuf::from(&value)),
        "bookfile" => return Err(invalid()),
        _ => return Err(UciError::UnknownOption { name }),
    };
    Ok(Command::SetOption(option))
}

fn parse_perft(tokens: &[&str]) -> Result<Command, UciError> {
    let text = tokens.first().copied().unwrap_or_default();
    text.parse()
        .map(Command::Perft)
        .map_err(|_| UciError::InvalidPerftDepth { value: text.to_string() })
}
