//! Turn state machine for one game.
//!
//! The orchestrator owns the position and decides who moves next. Human sides
//! feed moves through [`GameOrchestrator::request_move`]; AI sides are advanced
//! one move at a time with [`GameOrchestrator::step_ai_turn`]. Every call
//! returns with the position in a consistent post-move state.

use std::fmt;
use std::time::Duration;

use chess_core::{
    Color, Evaluator, GameResult, Move, Piece, Position, RulesEngine, RulesError, SearchEngine,
    SearchError, SearchLimits, SearchResult, Square, Terminal, color_name,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use random_engine::RandomEvaluator;
use thiserror::Error;
use tracing::{debug, info};

use crate::player::{PlayerAssignment, PlayerType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    AwaitingInput(Color),
    Searching(Color),
    GameOver(GameResult),
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnState::AwaitingInput(side) => write!(f, "{} to move", color_name(*side)),
            TurnState::Searching(side) => write!(f, "{} is thinking", color_name(*side)),
            TurnState::GameOver(result) => write!(f, "game over ({result})"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid move: {0}")]
    InvalidMove(#[from] RulesError),
    #[error("{player} player cannot do that now ({state})")]
    WrongTurn { state: TurnState, player: PlayerType },
    #[error("{0:?} is played by a human, self-play needs two AI players")]
    HumanPlayer(Color),
    #[error("search failed: {0}")]
    Search(#[from] SearchError),
}

/// How SEARCH_AI sides search. Owned by the orchestrator for the whole game.
pub struct SearchConfig {
    /// Depth in plies, at least 1
    pub depth: u8,
    pub alpha_beta: bool,
    /// Per-move deadline (None = fixed depth only)
    pub move_time: Option<Duration>,
    pub evaluator: Box<dyn Evaluator<Position> + Send>,
}

impl fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchConfig")
            .field("depth", &self.depth)
            .field("alpha_beta", &self.alpha_beta)
            .field("move_time", &self.move_time)
            .field("evaluator", &self.evaluator.name())
            .finish()
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::new(2, Box::new(RandomEvaluator::new()))
    }
}

impl SearchConfig {
    pub fn new(depth: u8, evaluator: Box<dyn Evaluator<Position> + Send>) -> Self {
        Self {
            depth,
            alpha_beta: false,
            move_time: None,
            evaluator,
        }
    }

    pub fn with_alpha_beta(mut self, alpha_beta: bool) -> Self {
        self.alpha_beta = alpha_beta;
        self
    }

    pub fn with_move_time(mut self, move_time: Option<Duration>) -> Self {
        self.move_time = move_time;
        self
    }

    /// Fresh limits for one move (resets the clock).
    fn limits(&self) -> SearchLimits {
        let limits = match self.move_time {
            Some(time) => SearchLimits::depth_and_time(self.depth, time),
            None => SearchLimits::depth(self.depth),
        };
        limits.with_alpha_beta(self.alpha_beta)
    }
}

/// Snapshot for a presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub side_to_move: Color,
    pub player_type: PlayerType,
    pub in_check: bool,
    pub is_game_over: bool,
    pub result: Option<GameResult>,
    pub terminal: Option<Terminal>,
    pub state: TurnState,
}

/// What a successful `request_move` or `step_ai_turn` did.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// The move played, None if the game was already over
    pub played: Option<Move>,
    /// `played` in square-pair notation
    pub notation: Option<String>,
    pub state: TurnState,
    /// Search statistics for AI moves
    pub search: Option<SearchResult>,
}

pub struct GameOrchestrator {
    position: Position,
    /// Position `reset` returns to
    initial: Position,
    players: PlayerAssignment,
    search: SearchConfig,
    /// Move picker for random players
    rng: StdRng,
    engine: SearchEngine,
    state: TurnState,
    history: Vec<String>,
}

impl fmt::Debug for GameOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameOrchestrator")
            .field("fen", &self.position.fen())
            .field("players", &self.players)
            .field("search", &self.search)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Default for GameOrchestrator {
    fn default() -> Self {
        Self::build(PlayerAssignment::default(), SearchConfig::default())
    }
}

impl GameOrchestrator {
    /// A game from the standard start position.
    pub fn new(players: PlayerAssignment, search: SearchConfig) -> Result<Self, SessionError> {
        check_depth(&search)?;
        Ok(Self::build(players, search))
    }

    fn build(players: PlayerAssignment, search: SearchConfig) -> Self {
        let position = Position::startpos();
        let mut session = Self {
            initial: position.clone(),
            position,
            players,
            search,
            rng: StdRng::from_entropy(),
            engine: SearchEngine::new(),
            state: TurnState::AwaitingInput(Color::White),
            history: Vec::new(),
        };
        session.refresh_state();
        session
    }

    /// Makes random players reproducible.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Replaces player types and search settings; the game itself continues.
    pub fn configure(
        &mut self,
        players: PlayerAssignment,
        search: SearchConfig,
    ) -> Result<(), SessionError> {
        check_depth(&search)?;
        info!(white = %players.white, black = %players.black, ?search, "configured session");
        self.players = players;
        self.search = search;
        self.refresh_state();
        Ok(())
    }

    /// Starts over from `position`, which `reset` will return to from now on.
    pub fn load_position(&mut self, position: Position) {
        self.initial = position.clone();
        self.position = position;
        self.history.clear();
        self.refresh_state();
    }

    /// Back to the starting position, keeping players and search settings.
    pub fn reset(&mut self) {
        self.position = self.initial.clone();
        self.history.clear();
        self.refresh_state();
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn players(&self) -> PlayerAssignment {
        self.players
    }

    pub fn search_config(&self) -> &SearchConfig {
        &self.search
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn fen(&self) -> String {
        self.position.fen()
    }

    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        self.position.piece_at(sq)
    }

    pub fn legal_destinations(&self, from: Square) -> Vec<Square> {
        if matches!(self.state, TurnState::GameOver(_)) {
            return Vec::new();
        }
        self.position.legal_destinations(from)
    }

    /// Moves played so far, in square-pair notation.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Whether the side to move is an AI and the game is still on.
    pub fn is_ai_turn(&self) -> bool {
        match self.state {
            TurnState::AwaitingInput(side) | TurnState::Searching(side) => {
                self.players.get(side).is_ai()
            }
            TurnState::GameOver(_) => false,
        }
    }

    pub fn query_status(&self) -> Status {
        let side_to_move = self.position.side_to_move();
        let result = match self.state {
            TurnState::GameOver(result) => Some(result),
            _ => None,
        };
        Status {
            side_to_move,
            player_type: self.players.get(side_to_move),
            in_check: self.position.in_check(),
            is_game_over: result.is_some(),
            result,
            terminal: self.position.terminal(),
            state: self.state,
        }
    }

    /// Plays a human move given in square-pair notation (`e2e4`, `e7e8q`).
    pub fn request_move_notation(&mut self, text: &str) -> Result<TurnOutcome, SessionError> {
        self.expect_human_turn()?;
        let mv = self.position.parse_move(text)?;
        self.request_move(mv)
    }

    /// Plays a human move. Nothing changes if the move is rejected.
    pub fn request_move(&mut self, mv: Move) -> Result<TurnOutcome, SessionError> {
        let side = self.expect_human_turn()?;
        let notation = self.play(mv)?;
        info!(side = color_name(side), mv = %notation, "human move");
        Ok(TurnOutcome {
            played: Some(mv),
            notation: Some(notation),
            state: self.state,
            search: None,
        })
    }

    /// Lets the AI whose turn it is pick and play one move.
    ///
    /// Once the game is over this is a no-op reporting no move.
    pub fn step_ai_turn(&mut self) -> Result<TurnOutcome, SessionError> {
        let side = match self.state {
            TurnState::GameOver(_) => {
                return Ok(TurnOutcome {
                    played: None,
                    notation: None,
                    state: self.state,
                    search: None,
                });
            }
            TurnState::AwaitingInput(side) | TurnState::Searching(side) => side,
        };
        let player = self.players.get(side);
        if !player.is_ai() {
            return Err(SessionError::WrongTurn {
                state: self.state,
                player,
            });
        }

        self.state = TurnState::Searching(side);
        let (best_move, search) = match player {
            // uniform over the legal moves, mates included
            PlayerType::RandomAi => {
                let moves = self.position.legal_moves();
                (moves.choose(&mut self.rng).copied(), None)
            }
            _ => {
                let limits = self.search.limits();
                let searched = self.engine.best_move(
                    &mut self.position,
                    &limits,
                    &mut *self.search.evaluator,
                );
                let result = match searched {
                    Ok(result) => result,
                    Err(e) => {
                        self.state = TurnState::AwaitingInput(side);
                        return Err(e.into());
                    }
                };
                debug!(
                    side = color_name(side),
                    %player,
                    nodes = result.nodes,
                    depth = result.depth,
                    score = result.score,
                    stopped = result.stopped,
                    "search result"
                );
                (result.best_move, Some(result))
            }
        };

        let Some(mv) = best_move else {
            // nothing to play: the terminal query settles the game
            self.refresh_state();
            return Ok(TurnOutcome {
                played: None,
                notation: None,
                state: self.state,
                search,
            });
        };

        let notation = match self.play(mv) {
            Ok(notation) => notation,
            Err(SessionError::InvalidMove(e)) => {
                self.state = TurnState::AwaitingInput(side);
                return Err(SearchError::Rules(e).into());
            }
            Err(e) => return Err(e),
        };
        info!(
            side = color_name(side),
            %player,
            mv = %notation,
            score = search.as_ref().map(|result| result.score),
            "ai move"
        );
        Ok(TurnOutcome {
            played: Some(mv),
            notation: Some(notation),
            state: self.state,
            search,
        })
    }

    fn expect_human_turn(&self) -> Result<Color, SessionError> {
        match self.state {
            TurnState::AwaitingInput(side) if self.players.get(side) == PlayerType::Human => {
                Ok(side)
            }
            state => Err(SessionError::WrongTurn {
                state,
                player: self.players.get(self.position.side_to_move()),
            }),
        }
    }

    /// Applies `mv`, records it and advances the state.
    fn play(&mut self, mv: Move) -> Result<String, SessionError> {
        let notation = if self.position.legal_moves().contains(&mv) {
            self.position.format_move(mv)
        } else {
            mv.to_string()
        };
        self.position.push(mv)?;
        self.history.push(notation.clone());
        self.refresh_state();
        if let TurnState::GameOver(result) = self.state {
            info!(%result, moves = self.history.len(), "game over");
        }
        Ok(notation)
    }

    fn refresh_state(&mut self) {
        let side = self.position.side_to_move();
        self.state = match self.position.terminal() {
            Some(terminal) => TurnState::GameOver(terminal.result(side)),
            None => TurnState::AwaitingInput(side),
        };
    }
}

fn check_depth(search: &SearchConfig) -> Result<(), SessionError> {
    if search.depth == 0 {
        return Err(SearchError::ZeroDepth.into());
    }
    Ok(())
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod orchestrator_tests;
