//! Match runner for AI-vs-AI games

use chess_core::{GameResult, Terminal};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::orchestrator::{GameOrchestrator, SessionError, TurnState};

/// Configuration for a match
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Number of games to play
    pub num_games: u32,
    /// Plies per game before declaring a draw
    pub max_plies: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            num_games: 10,
            max_plies: 200,
        }
    }
}

/// Tally of a match, by color
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub white_wins: u32,
    pub black_wins: u32,
    pub draws: u32,
}

impl MatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: GameResult) {
        match result {
            GameResult::WhiteWins => self.white_wins += 1,
            GameResult::BlackWins => self.black_wins += 1,
            GameResult::Draw => self.draws += 1,
        }
    }

    pub fn total_games(&self) -> u32 {
        self.white_wins + self.black_wins + self.draws
    }

    /// White's score (1 for win, 0.5 for draw, 0 for loss)
    pub fn white_score(&self) -> f64 {
        let total = self.total_games() as f64;
        if total == 0.0 {
            return 0.5;
        }
        (self.white_wins as f64 + 0.5 * self.draws as f64) / total
    }
}

/// How one game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSummary {
    pub result: GameResult,
    pub plies: u32,
    /// None when the ply cap ended the game
    pub terminal: Option<Terminal>,
}

/// Plays AI-vs-AI games through a session
pub struct MatchRunner {
    config: MatchConfig,
}

impl MatchRunner {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    /// Plays `num_games` games from the session's starting position.
    ///
    /// Both sides must be AI players.
    pub fn run_match(&self, session: &mut GameOrchestrator) -> Result<MatchResult, SessionError> {
        let players = session.players();
        if let Some(side) = players.human_side() {
            return Err(SessionError::HumanPlayer(side));
        }

        let mut result = MatchResult::new();
        for game_num in 0..self.config.num_games {
            session.reset();
            let summary = self.play_game(session)?;
            result.record(summary.result);

            let ending = summary
                .terminal
                .map_or_else(|| "ply limit".to_string(), |t| t.to_string());
            info!(
                game = game_num + 1,
                of = self.config.num_games,
                result = %summary.result,
                plies = summary.plies,
                %ending,
                white_wins = result.white_wins,
                black_wins = result.black_wins,
                draws = result.draws,
                "game finished"
            );
        }

        Ok(result)
    }

    /// Plays the session to the end or to the ply cap.
    pub fn play_game(&self, session: &mut GameOrchestrator) -> Result<GameSummary, SessionError> {
        let mut plies = 0;
        while plies < self.config.max_plies {
            if let TurnState::GameOver(result) = session.state() {
                return Ok(GameSummary {
                    result,
                    plies,
                    terminal: session.query_status().terminal,
                });
            }
            if session.step_ai_turn()?.played.is_some() {
                plies += 1;
            }
        }

        // Ply cap reached, unless the last move ended the game
        let status = session.query_status();
        Ok(GameSummary {
            result: status.result.unwrap_or(GameResult::Draw),
            plies,
            terminal: status.terminal,
        })
    }
}

#[cfg(test)]
#[path = "match_runner_tests.rs"]
mod match_runner_tests;
