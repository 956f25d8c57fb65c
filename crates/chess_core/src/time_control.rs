//! Search limits and an optional per-move deadline.
//!
//! The baseline search is purely depth bound. A move time turns it into
//! iterative deepening that can stop between node expansions and fall back to
//! the best move of the last finished iteration.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Limits for one `best_move` call.
#[derive(Debug, Clone)]
pub struct SearchLimits {
    /// Search depth in plies, at least 1
    pub depth: u8,
    /// Maximum time allowed for this move (None = no deadline)
    pub move_time: Option<Duration>,
    /// Prune with alpha-beta. Does not change the chosen move for a
    /// deterministic evaluator, only how many nodes are visited.
    pub alpha_beta: bool,
    /// Stop flag and clock, shared with whoever may want to cancel the search
    pub time_control: TimeControl,
}

impl SearchLimits {
    /// Create limits with only depth constraint (no time limit).
    pub fn depth(depth: u8) -> Self {
        Self {
            depth,
            move_time: None,
            alpha_beta: false,
            time_control: TimeControl::new(None),
        }
    }

    /// Create limits with both depth and time constraints.
    pub fn depth_and_time(depth: u8, move_time: Duration) -> Self {
        Self {
            depth,
            move_time: Some(move_time),
            alpha_beta: false,
            time_control: TimeControl::new(Some(move_time)),
        }
    }

    pub fn with_alpha_beta(mut self, alpha_beta: bool) -> Self {
        self.alpha_beta = alpha_beta;
        self
    }

    /// Check if search should stop due to time limit.
    #[inline]
    pub fn should_stop(&self) -> bool {
        self.time_control.is_stopped()
    }

    /// Start the time control clock. Call this when search begins.
    pub fn start(&self) {
        self.time_control.start();
    }
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self::depth(2)
    }
}

const NOT_STARTED: u64 = u64::MAX;

/// Cheaply cloneable stop flag plus clock.
///
/// Clones share state, so a clone handed to another thread can `stop()` a
/// running search.
#[derive(Debug, Clone)]
pub struct TimeControl {
    /// Shared stop flag
    stopped: Arc<AtomicBool>,
    /// Reference point for `started_at`
    origin: Instant,
    /// Nanoseconds after `origin` at which the search started
    started_at: Arc<AtomicU64>,
    /// Time limit for this search (None = infinite)
    time_limit: Option<Duration>,
    /// How often to check the clock (in nodes). Checking every node is wasteful.
    check_interval: u64,
}

impl TimeControl {
    pub fn new(time_limit: Option<Duration>) -> Self {
        Self {
            stopped: Arc::new(AtomicBool::new(false)),
            origin: Instant::now(),
            started_at: Arc::new(AtomicU64::new(NOT_STARTED)),
            time_limit,
            check_interval: 256,
        }
    }

    /// Start the clock. Should be called when search begins.
    pub fn start(&self) {
        let offset = u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(NOT_STARTED - 1);
        self.started_at.store(offset, Ordering::SeqCst);
        self.stopped.store(false, Ordering::SeqCst);
    }

    /// Force stop the search immediately.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }

    /// Check time and update stopped flag if time expired.
    pub fn check_time(&self) -> bool {
        if self.is_stopped() {
            return true;
        }
        match (self.time_limit, self.elapsed()) {
            (Some(limit), Some(elapsed)) if elapsed >= limit => {
                self.stop();
                true
            }
            _ => false,
        }
    }

    /// Returns true every `check_interval` nodes.
    #[inline]
    pub fn should_check_time(&self, nodes: u64) -> bool {
        nodes % self.check_interval == 0
    }

    /// Time since `start`, or None if the clock never started.
    pub fn elapsed(&self) -> Option<Duration> {
        let started = self.started_at.load(Ordering::SeqCst);
        if started == NOT_STARTED {
            return None;
        }
        let now = self.origin.elapsed();
        Some(now.saturating_sub(Duration::from_nanos(started)))
    }

    /// Get remaining time (None if no limit or not started).
    pub fn remaining(&self) -> Option<Duration> {
        let limit = self.time_limit?;
        Some(limit.saturating_sub(self.elapsed()?))
    }
}

impl Default for TimeControl {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
#[path = "time_control_tests.rs"]
mod time_control_tests;
