//! Fixed-depth minimax over a [`RulesEngine`].
//!
//! Scores inside the search are seen from the *maximizer*, the side to move at
//! the root. Evaluator output (White's point of view) is flipped when Black is
//! the maximizer, and a checkmate is worth `MATE_SCORE` to the side that
//! delivered it, less one point per ply from the root so faster mates win.

use std::ops::{Deref, DerefMut};

use thiserror::Error;
use tracing::{debug, trace};

use crate::eval::{EvalError, Evaluator};
use crate::rules::{RulesEngine, RulesError};
use crate::time_control::{SearchLimits, TimeControl};
use crate::types::{Color, Move, Terminal};

/// Value of a checkmate for the side that delivered it. Far outside the range
/// any evaluator is expected to produce.
pub const MATE_SCORE: f64 = 1_000_000.0;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search depth must be at least 1")]
    ZeroDepth,
    #[error("evaluator failed: {0}")]
    Evaluator(#[from] EvalError),
    #[error("rules engine rejected one of its own legal moves: {0}")]
    Rules(#[from] RulesError),
}

/// Result of a search operation
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// The best move found (None if no legal moves)
    pub best_move: Option<Move>,
    /// Minimax value of `best_move` for the side to move
    pub score: f64,
    /// Depth of the last completed iteration
    pub depth: u8,
    /// Number of nodes searched
    pub nodes: u64,
    /// Whether search was stopped early due to time limit
    pub stopped: bool,
}

/// A move played on a borrowed position, taken back when dropped.
struct Played<'a, R: RulesEngine + ?Sized> {
    position: &'a mut R,
}

impl<'a, R: RulesEngine + ?Sized> Played<'a, R> {
    fn new(position: &'a mut R, mv: Move) -> Result<Self, RulesError> {
        position.push(mv)?;
        Ok(Self { position })
    }
}

impl<R: RulesEngine + ?Sized> Deref for Played<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        self.position
    }
}

impl<R: RulesEngine + ?Sized> DerefMut for Played<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        self.position
    }
}

impl<R: RulesEngine + ?Sized> Drop for Played<'_, R> {
    fn drop(&mut self) {
        self.position.pop();
    }
}

/// Moves a mate score towards zero by `ply`; other scores pass through.
pub fn mate_at_ply(score: f64, ply: u32) -> f64 {
    if score >= MATE_SCORE {
        score - f64::from(ply)
    } else if score <= -MATE_SCORE {
        score + f64::from(ply)
    } else {
        score
    }
}

/// Maps a White-relative evaluator score to the maximizer's point of view.
pub fn orient(score: f64, maximizer: Color) -> f64 {
    match maximizer {
        Color::White => score,
        Color::Black => -score,
    }
}

/// Value of a terminal node for `maximizer`, given who is to move in it,
/// before any distance adjustment.
pub fn terminal_score(terminal: Terminal, side_to_move: Color, maximizer: Color) -> f64 {
    match terminal {
        // the side to move is the one that got mated
        Terminal::Checkmate if side_to_move == maximizer => -MATE_SCORE,
        Terminal::Checkmate => MATE_SCORE,
        _ => 0.0,
    }
}

/// Minimax search engine.
#[derive(Debug, Default)]
pub struct SearchEngine {
    /// Node counter of the last search
    nodes: u64,
}

impl SearchEngine {
    pub fn new() -> Self {
        Self { nodes: 0 }
    }

    /// Nodes visited by the last call.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Picks a move for the side to move in `position`.
    ///
    /// Returns `best_move: None` exactly when there is no legal move. The
    /// position is unchanged when this returns, whether it succeeds or not.
    pub fn best_move<R, E>(
        &mut self,
        position: &mut R,
        limits: &SearchLimits,
        evaluator: &mut E,
    ) -> Result<SearchResult, SearchError>
    where
        R: RulesEngine + ?Sized,
        E: Evaluator<R> + ?Sized,
    {
        if limits.depth == 0 {
            return Err(SearchError::ZeroDepth);
        }
        self.nodes = 0;
        limits.start();

        let maximizer = position.side_to_move();
        let moves = position.legal_moves();
        if moves.is_empty() {
            let score = position
                .terminal()
                .map_or(0.0, |t| terminal_score(t, maximizer, maximizer));
            return Ok(SearchResult {
                best_move: None,
                score,
                depth: 0,
                nodes: 1,
                stopped: false,
            });
        }

        let mut searcher = Searcher {
            evaluator,
            maximizer,
            alpha_beta: limits.alpha_beta,
            time_control: &limits.time_control,
            nodes: 0,
        };

        let (best, depth, stopped) = if limits.move_time.is_some() {
            let mut completed = None;
            let mut reached = 0;
            let mut stopped = false;
            for depth in 1..=limits.depth {
                let round = searcher.search_root(position, &moves, depth)?;
                if round.stopped {
                    stopped = true;
                    if completed.is_none() {
                        completed = round.best;
                    }
                    break;
                }
                completed = round.best;
                reached = depth;
            }
            (completed, reached, stopped)
        } else {
            let round = searcher.search_root(position, &moves, limits.depth)?;
            (round.best, limits.depth, round.stopped)
        };
        self.nodes = searcher.nodes;

        // stopped before a single root move finished: any legal move beats none
        let (best_move, score) = best.unwrap_or((moves[0], 0.0));
        debug!(
            nodes = self.nodes,
            depth,
            score,
            stopped,
            "search finished"
        );

        Ok(SearchResult {
            best_move: Some(best_move),
            score,
            depth,
            nodes: self.nodes,
            stopped,
        })
    }

    /// Plain minimax value of `position` searched `depth` plies deep, for
    /// `maximizer`. Depth 0 is the evaluator score or the terminal value.
    pub fn minimax_value<R, E>(
        &mut self,
        position: &mut R,
        depth: u8,
        maximizer: Color,
        evaluator: &mut E,
    ) -> Result<f64, SearchError>
    where
        R: RulesEngine + ?Sized,
        E: Evaluator<R> + ?Sized,
    {
        let time_control = TimeControl::default();
        let mut searcher = Searcher {
            evaluator,
            maximizer,
            alpha_beta: false,
            time_control: &time_control,
            nodes: 0,
        };
        let value = searcher.minimax(position, depth, 0, f64::NEG_INFINITY, f64::INFINITY)?;
        self.nodes = searcher.nodes;
        // without a deadline nothing can stop the search
        Ok(value.unwrap_or(0.0))
    }
}

struct RootOutcome {
    best: Option<(Move, f64)>,
    stopped: bool,
}

struct Searcher<'a, E: ?Sized> {
    evaluator: &'a mut E,
    maximizer: Color,
    alpha_beta: bool,
    time_control: &'a TimeControl,
    nodes: u64,
}

impl<E: ?Sized> Searcher<'_, E> {
    fn out_of_time(&self) -> bool {
        self.time_control.should_check_time(self.nodes) && self.time_control.check_time()
    }

    /// Scores every root move and keeps the first one with the highest value.
    fn search_root<R>(
        &mut self,
        position: &mut R,
        moves: &[Move],
        depth: u8,
    ) -> Result<RootOutcome, SearchError>
    where
        R: RulesEngine + ?Sized,
        E: Evaluator<R>,
    {
        let mut best: Option<(Move, f64)> = None;
        let mut alpha = f64::NEG_INFINITY;

        for &mv in moves {
            if self.time_control.check_time() {
                return Ok(RootOutcome { best, stopped: true });
            }

            let score = {
                let mut child = Played::new(position, mv)?;
                self.minimax(&mut *child, depth - 1, 1, alpha, f64::INFINITY)?
            };
            let Some(score) = score else {
                return Ok(RootOutcome { best, stopped: true });
            };
            trace!(%mv, score, depth, "root move");

            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((mv, score));
            }
            if self.alpha_beta {
                alpha = alpha.max(score);
            }
        }
        Ok(RootOutcome {
            best,
            stopped: false,
        })
    }

    /// Value of `position` for the maximizer, or None if the deadline passed.
    fn minimax<R>(
        &mut self,
        position: &mut R,
        depth: u8,
        ply: u32,
        mut alpha: f64,
        mut beta: f64,
    ) -> Result<Option<f64>, SearchError>
    where
        R: RulesEngine + ?Sized,
        E: Evaluator<R>,
    {
        self.nodes += 1;
        if self.out_of_time() {
            return Ok(None);
        }

        if let Some(terminal) = position.terminal() {
            let side = position.side_to_move();
            let score = terminal_score(terminal, side, self.maximizer);
            return Ok(Some(mate_at_ply(score, ply)));
        }
        if depth == 0 {
            let score = self.evaluator.score(&*position)?;
            return Ok(Some(orient(score, self.maximizer)));
        }

        let maximizing = position.side_to_move() == self.maximizer;
        let mut moves = position.legal_moves();
        if self.alpha_beta {
            // captures first; stable, so the rules engine order breaks ties
            moves.sort_by_key(|&mv| !position.is_capture(mv));
        }

        let mut best = if maximizing {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
        for mv in moves {
            let score = {
                let mut child = Played::new(position, mv)?;
                self.minimax(&mut *child, depth - 1, ply + 1, alpha, beta)?
            };
            let Some(score) = score else {
                return Ok(None);
            };

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(best);
            } else {
                best = best.min(score);
                beta = beta.min(best);
            }
            if self.alpha_beta && alpha >= beta {
                break;
            }
        }
        Ok(Some(best))
    }
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod search_tests;
