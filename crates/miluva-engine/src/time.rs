//! Time management: turn clock parameters into search deadlines and decide
//! when the search has to stop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::{Duration, Instant};

use miluva_core::{Color, Position};

use crate::eval::phase::game_phase;

/// The clock is read once per this many nodes.
pub const CHECK_INTERVAL: u64 = 1024;

/// How a game is timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    /// A fixed budget for every move.
    Fixed(Duration),
    /// A bank of time per side, topped up by `increment` after each move.
    Clock { base: Duration, increment: Duration },
}

/// Soft and hard limits for one move from a clock balance.
///
/// Without `moves_to_go` the horizon is estimated from `phase`
/// (`0` = bare kings, `24` = full material):
///
/// | Condition | base | scale | phase 24 | phase 0 |
/// |-----------|------|-------|----------|---------|
/// | increment | 15   | 20    | 35       | 15      |
/// | no inc    | 18   | 22    | 40       | 18      |
///
/// The hard limit is capped at 25% (12% without increment) of the usable
/// time and at 3.0x (2.5x) the soft limit, and the soft limit never exceeds
/// the hard one. `overhead` is held back first.
pub fn compute_limits(
    remaining: Duration,
    increment: Duration,
    moves_to_go: Option<u32>,
    phase: i32,
    overhead: Duration,
) -> (Duration, Duration) {
    let remaining_ms = remaining.as_millis() as f64;
    let overhead_ms = overhead.as_millis() as f64;
    if remaining_ms <= overhead_ms {
        let one_ms = Duration::from_millis(1);
        return (one_ms, one_ms);
    }

    let usable = (remaining_ms - overhead_ms).max(1.0);
    let inc_ms = increment.as_millis() as f64;
    let has_increment = inc_ms > 0.0;

    let horizon = match moves_to_go {
        Some(n) => n.max(1) as f64,
        None => {
            let (base, scale) = if has_increment { (15, 20) } else { (18, 22) };
            (base + scale * phase.clamp(0, 24) / 24) as f64
        }
    };

    let mut soft = usable / horizon;
    if has_increment {
        soft += inc_ms * 0.75;
    }

    let (cap_pct, ratio) = if has_increment { (0.25, 3.0) } else { (0.12, 2.5) };
    let hard = (usable * cap_pct).min(soft * ratio).max(1.0);
    let soft = soft.min(hard).max(1.0);

    (Duration::from_millis(soft as u64), Duration::from_millis(hard as u64))
}

/// Limits requested for one search, as carried by a UCI `go`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoLimits {
    pub wtime: Option<Duration>,
    pub btime: Option<Duration>,
    pub winc: Option<Duration>,
    pub binc: Option<Duration>,
    pub movestogo: Option<u32>,
    pub movetime: Option<Duration>,
    pub nodes: Option<u64>,
    pub infinite: bool,
}

/// Deadlines plus the shared stop flag for one search.
pub struct TimeManager {
    start: Instant,
    soft: Option<Duration>,
    hard: Option<Duration>,
    max_nodes: Option<u64>,
    stop: Arc<AtomicBool>,
    /// Soft-limit multiplier in percent.
    soft_scale: AtomicU32,
}

impl TimeManager {
    fn with_limits(stop: Arc<AtomicBool>, soft: Option<Duration>, hard: Option<Duration>) -> Self {
        Self {
            start: Instant::now(),
            soft,
            hard,
            max_nodes: None,
            stop,
            soft_scale: AtomicU32::new(100),
        }
    }

    /// No deadline; only the stop flag ends the search.
    pub fn infinite(stop: Arc<AtomicBool>) -> Self {
        Self::with_limits(stop, None, None)
    }

    /// Spend exactly `budget` on the move.
    pub fn fixed(budget: Duration, stop: Arc<AtomicBool>) -> Self {
        Self::with_limits(stop, Some(budget), Some(budget))
    }

    /// Budget from a clock balance via [`compute_limits`].
    pub fn from_clock(
        remaining: Duration,
        increment: Duration,
        moves_to_go: Option<u32>,
        phase: i32,
        overhead: Duration,
        stop: Arc<AtomicBool>,
    ) -> Self {
        let (soft, hard) = compute_limits(remaining, increment, moves_to_go, phase, overhead);
        Self::with_limits(stop, Some(soft), Some(hard))
    }

    /// Budget for `pos` under a game [`TimeFormat`] with `remaining` on the
    /// mover's clock.
    pub fn for_format(
        format: TimeFormat,
        remaining: Duration,
        pos: &Position,
        overhead: Duration,
        stop: Arc<AtomicBool>,
    ) -> Self {
        match format {
            TimeFormat::Fixed(budget) => Self::fixed(budget, stop),
            TimeFormat::Clock { increment, .. } => {
                Self::from_clock(remaining, increment, None, game_phase(pos), overhead, stop)
            }
        }
    }

    /// Budget from UCI `go` parameters.
    ///
    /// `infinite` wins, then `movetime`, then the mover's clock. A bare
    /// `go` or `go depth N` has no deadline.
    pub fn from_go(limits: &GoLimits, pos: &Position, overhead: Duration, stop: Arc<AtomicBool>) -> Self {
        let (remaining, increment) = match pos.side_to_move() {
            Color::White => (limits.wtime, limits.winc),
            Color::Black => (limits.btime, limits.binc),
        };

        let mut manager = if limits.infinite {
            Self::infinite(stop)
        } else if let Some(movetime) = limits.movetime {
            Self::fixed(movetime, stop)
        } else if let Some(remaining) = remaining {
            Self::from_clock(
                remaining,
                increment.unwrap_or(Duration::ZERO),
                limits.movestogo,
                game_phase(pos),
                overhead,
                stop,
            )
        } else {
            Self::infinite(stop)
        };
        manager.max_nodes = limits.nodes;
        manager
    }

    /// Stop after `nodes` nodes regardless of time.
    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.max_nodes = Some(nodes);
        self
    }

    /// Abort check for the search hot path.
    ///
    /// The flag is read every call, the clock only every
    /// [`CHECK_INTERVAL`] nodes. An expired deadline latches the flag so
    /// later calls return immediately.
    pub fn should_stop(&self, nodes: u64) -> bool {
        if self.stop.load(Ordering::Relaxed) {
            return true;
        }
        if nodes % CHECK_INTERVAL != 0 {
            return false;
        }
        let over_nodes = self.max_nodes.is_some_and(|max| nodes >= max);
        let over_time = self.hard.is_some_and(|hard| self.elapsed() >= hard);
        if over_nodes || over_time {
            self.stop.store(true, Ordering::Relaxed);
            return true;
        }
        false
    }

    /// Whether another iteration should start. Uses the scaled soft limit.
    pub fn should_stop_iterating(&self) -> bool {
        if self.stop.load(Ordering::Relaxed) {
            return true;
        }
        match self.soft {
            Some(soft) => {
                let scale = self.soft_scale.load(Ordering::Relaxed);
                let scaled = soft * scale / 100;
                self.elapsed() >= scaled.min(self.hard.unwrap_or(scaled))
            }
            None => false,
        }
    }

    /// Neither stopped nor past the hard deadline.
    pub fn has_time_left(&self) -> bool {
        !self.stop.load(Ordering::Relaxed) && self.hard.is_none_or(|hard| self.elapsed() < hard)
    }

    /// Rescale the soft limit, in percent of its original value.
    pub fn set_soft_scale(&self, percent: u32) {
        self.soft_scale.store(percent, Ordering::Relaxed);
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    pub fn stop_flag(&self) -> &Arc<AtomicBool> {
        &self.stop
    }

    pub fn soft_limit(&self) -> Option<Duration> {
        self.soft
    }

    pub fn hard_limit(&self) -> Option<Duration> {
        self.hard
    }
}

impl std::fmt::Debug for TimeManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeManager")
            .field("soft", &self.soft)
            .field("hard", &self.hard)
            .field("max_nodes", &self.max_nodes)
            .field("stopped", &self.is_stopped())
            .finish()
    }
}
