//! Event-driven UCI engine with a single background search thread.

use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};

use tracing::{debug, info, warn};

use miluva_core::{Move, Position, divide};
use miluva_engine::{
    EngineConfig, IterationInfo, MemoryBook, SearchOutcome, Searcher, TimeManager, mate_in,
};

use crate::command::{Command, GoParams, PositionInfo, UciOption, parse_command};
use crate::error::UciError;

/// Stack size for the search thread; the recursion keeps a move list per ply.
const SEARCH_STACK_BYTES: usize = 64 * 1024 * 1024;

/// Internal engine state.
enum EngineState {
    Idle,
    Searching,
}

/// Events processed by the main engine loop.
enum EngineEvent {
    UciCommand(Result<Command, UciError>),
    SearchDone(SearchDone),
    InputClosed,
}

/// Payload returned by the search thread when it finishes.
struct SearchDone {
    outcome: SearchOutcome,
    searcher: Searcher,
}

/// The UCI engine, holding the current position and the searcher.
///
/// Runs an event-driven loop on the main thread, dispatching searches
/// to a worker thread and processing UCI commands concurrently.
pub struct UciEngine {
    position: Position,
    /// Moves since the base position of the last `position` command.
    moves: Vec<Move>,
    /// `None` while the search thread owns it.
    searcher: Option<Searcher>,
    state: EngineState,
    stop_flag: Arc<AtomicBool>,
    config: EngineConfig,
    pending_clear: bool,
    pending_book: Option<MemoryBook>,
}

impl UciEngine {
    /// Create a new engine with the starting position.
    pub fn new() -> Self {
        let config = EngineConfig::default();
        Self {
            position: Position::startpos(),
            moves: Vec::new(),
            searcher: Some(Searcher::new(config.clone())),
            state: EngineState::Idle,
            stop_flag: Arc::new(AtomicBool::new(false)),
            config,
            pending_clear: false,
            pending_book: None,
        }
    }

    /// Run the UCI event loop, reading from stdin until `quit` or input closes.
    pub fn run(mut self) -> Result<(), UciError> {
        let (tx, rx) = mpsc::channel::<EngineEvent>();

        let stdin_tx = tx.clone();
        std::thread::Builder::new().name("stdin".into()).spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                debug!(cmd = %trimmed, "received UCI command");
                if stdin_tx.send(EngineEvent::UciCommand(parse_command(trimmed))).is_err() {
                    return;
                }
            }
            let _ = stdin_tx.send(EngineEvent::InputClosed);
        })?;

        for event in &rx {
            match event {
                EngineEvent::UciCommand(Ok(cmd)) => match cmd {
                    Command::Uci => self.handle_uci(),
                    Command::IsReady => println!("readyok"),
                    Command::UciNewGame => self.handle_ucinewgame(),
                    Command::Position(info) => self.handle_position(info),
                    Command::Go(params) => self.handle_go(params, &tx)?,
                    Command::SetOption(option) => {
                        if let Err(e) = self.handle_setoption(option) {
                            warn!(error = %e, "setoption rejected");
                        }
                    }
                    Command::Stop => self.handle_stop(),
                    Command::Display => self.handle_display(),
                    Command::Perft(depth) => self.handle_perft(depth),
                    Command::Quit => {
                        if matches!(self.state, EngineState::Searching) {
                            self.handle_stop();
                            for ev in &rx {
                                if let EngineEvent::SearchDone(done) = ev {
                                    self.finish_search(done);
                                    break;
                                }
                            }
                        }
                        break;
                    }
                    Command::Unknown(_) => {}
                },
                EngineEvent::UciCommand(Err(e)) => {
                    warn!(error = %e, "UCI parse error");
                }
                EngineEvent::SearchDone(done) => self.finish_search(done),
                EngineEvent::InputClosed => break,
            }
        }

        info!("miluva shutting down");
        Ok(())
    }

    fn handle_uci(&self) {
        let defaults = EngineConfig::default();
        println!("id name miluva {}", env!("CARGO_PKG_VERSION"));
        println!("id author the miluva developers");
        println!(
            "option name Hash type spin default {} min {} max {}",
            defaults.hash_mb,
            miluva_engine::config::MIN_HASH_MB,
            miluva_engine::config::MAX_HASH_MB
        );
        println!(
            "option name MoveOverhead type spin default {} min 0 max 5000",
            defaults.move_overhead.as_millis()
        );
        println!(
            "option name MaxDepth type spin default {} min 1 max {}",
            defaults.max_depth,
            miluva_engine::config::MAX_DEPTH
        );
        println!("option name BookMinCount type spin default {} min 1 max 1000000", defaults.book_min_count);
        println!("option name BookFile type string default <empty>");
        println!("uciok");
    }

    fn handle_ucinewgame(&mut self) {
        self.position = Position::startpos();
        self.moves.clear();
        match self.searcher.as_mut() {
            Some(searcher) => searcher.clear(),
            None => self.pending_clear = true,
        }
    }

    fn handle_position(&mut self, info: PositionInfo) {
        self.position = info.position;
        self.moves = info.moves;
    }

    /// Apply an option. Changes made during a search take effect when the
    /// searcher comes back.
    fn handle_setoption(&mut self, option: UciOption) -> Result<(), UciError> {
        let mut config = self.config.clone();
        match option {
            UciOption::Hash(mb) => config.hash_mb = mb,
            UciOption::MoveOverhead(overhead) => config.move_overhead = overhead,
            UciOption::MaxDepth(depth) => config.max_depth = depth,
            UciOption::BookMinCount(count) => config.book_min_count = count,
            UciOption::BookFile(path) => {
                let book = MemoryBook::from_lines(&std::fs::read_to_string(&path)?)?;
                info!(path = %path.display(), positions = book.len(), "book loaded");
                match self.searcher.as_mut() {
                    Some(searcher) => searcher.set_book(book),
                    None => self.pending_book = Some(book),
                }
                return Ok(());
            }
        }
        config.validate()?;
        debug!(?config, "configuration updated");
        if let Some(searcher) = self.searcher.as_mut() {
            searcher.set_config(config.clone())?;
        }
        self.config = config;
        Ok(())
    }

    fn handle_go(&mut self, params: GoParams, tx: &mpsc::Sender<EngineEvent>) -> Result<(), UciError> {
        if !matches!(self.state, EngineState::Idle) {
            warn!("go received while not idle, ignoring");
            return Ok(());
        }
        let Some(mut searcher) = self.searcher.take() else {
            warn!("searcher unavailable, ignoring go");
            return Ok(());
        };

        self.stop_flag = Arc::new(AtomicBool::new(false));
        let time = TimeManager::from_go(
            &params.limits,
            &self.position,
            self.config.move_overhead,
            Arc::clone(&self.stop_flag),
        );
        let max_depth = params.depth.unwrap_or(self.config.max_depth);
        debug!(?time, max_depth, "starting search");

        let position = self.position.clone();
        let moves = self.moves.clone();
        let tx = tx.clone();

        std::thread::Builder::new()
            .name("search".into())
            .stack_size(SEARCH_STACK_BYTES)
            .spawn(move || {
                let outcome = searcher.search(&position, &time, max_depth, &moves, |info| {
                    println!("{}", format_info(info));
                });
                let _ = tx.send(EngineEvent::SearchDone(SearchDone { outcome, searcher }));
            })?;

        self.state = EngineState::Searching;
        Ok(())
    }

    fn handle_stop(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    fn handle_display(&self) {
        println!("{}", self.position.pretty());
        println!("Fen: {}", self.position.to_fen());
        println!("Key: {:016x}", self.position.key());
    }

    fn handle_perft(&self, depth: usize) {
        if !matches!(self.state, EngineState::Idle) {
            warn!("perft received while searching, ignoring");
            return;
        }
        let mut position = self.position.clone();
        let mut total = 0;
        for (mv, nodes) in divide(&mut position, depth) {
            println!("{mv}: {nodes}");
            total += nodes;
        }
        println!();
        println!("Nodes searched: {total}");
    }

    fn finish_search(&mut self, done: SearchDone) {
        let mut searcher = done.searcher;

        if let Err(e) = searcher.set_config(self.config.clone()) {
            warn!(error = %e, "pending configuration rejected");
        }
        if let Some(book) = self.pending_book.take() {
            searcher.set_book(book);
        }
        if std::mem::take(&mut self.pending_clear) {
            searcher.clear();
        }
        self.searcher = Some(searcher);
        self.state = EngineState::Idle;

        println!("{}", format_bestmove(&done.outcome));
    }
}

impl Default for UciEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// `cp <n>` or `mate <moves>` for a side-relative score.
fn format_score(score: i32) -> String {
    match mate_in(score) {
        Some(moves) => format!("mate {moves}"),
        None => format!("cp {score}"),
    }
}

/// One `info` line for a completed iteration.
fn format_info(info: &IterationInfo<'_>) -> String {
    let elapsed_ms = info.elapsed.as_millis().max(1);
    let nps = u128::from(info.nodes) * 1000 / elapsed_ms;
    let pv: Vec<String> = info.pv.iter().map(|mv| mv.to_uci()).collect();
    format!(
        "info depth {} seldepth {} score {} nodes {} nps {} hashfull {} time {} pv {}",
        info.depth,
        info.seldepth,
        format_score(info.score),
        info.nodes,
        nps,
        info.hashfull,
        elapsed_ms,
        pv.join(" ")
    )
}

/// The `bestmove` line, `0000` when the side to move has no move.
fn format_bestmove(outcome: &SearchOutcome) -> String {
    match outcome {
        SearchOutcome::BestMove(result) => match result.ponder_move() {
            Some(ponder) => format!("bestmove {} ponder {}", result.best_move, ponder),
            None => format!("bestmove {}", result.best_move),
        },
        SearchOutcome::Terminal(_) => "bestmove 0000".to_string(),
    }
}
