//! `cozy-chess` backed position with an undo stack and repetition history.

use cozy_chess::{BitBoard, Board};

use crate::rules::{RulesEngine, RulesError};
use crate::types::*;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Clone, Debug)]
struct Undo {
    board: Board,
    mv: Move,
}

#[derive(Clone, Debug)]
pub struct Position {
    board: Board,
    undo: Vec<Undo>,
    /// Hash of every position reached so far, current one last.
    history: Vec<u64>,
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl Position {
    pub fn startpos() -> Self {
        Self::from_board(Board::default())
    }

    pub fn from_fen(fen: &str) -> Result<Self, RulesError> {
        let board = Board::from_fen(fen.trim(), false).map_err(|e| RulesError::InvalidFen {
            fen: fen.to_string(),
            reason: format!("{e:?}"),
        })?;
        Ok(Self::from_board(board))
    }

    fn from_board(board: Board) -> Self {
        let history = vec![board.hash()];
        Self {
            board,
            undo: Vec::new(),
            history,
        }
    }

    /// Underlying board, for read-only inspection (encoding, display).
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn fen(&self) -> String {
        self.board.to_string()
    }

    pub fn hash(&self) -> u64 {
        self.board.hash()
    }

    /// Number of moves played since this position was set up.
    pub fn ply(&self) -> usize {
        self.undo.len()
    }

    pub fn halfmove_clock(&self) -> u8 {
        self.board.halfmove_clock()
    }

    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        Some((self.board.color_on(sq)?, self.board.piece_on(sq)?))
    }

    /// Destination squares of the legal moves starting on `from`.
    pub fn legal_destinations(&self, from: Square) -> Vec<Square> {
        let mut destinations = Vec::new();
        for mv in self.legal_moves().into_iter().filter(|mv| mv.from == from) {
            let to = self.display_move(mv).to;
            // promotions to different pieces share a destination
            if !destinations.contains(&to) {
                destinations.push(to);
            }
        }
        destinations
    }

    pub fn is_insufficient_material(&self) -> bool {
        insufficient_material(&self.board)
    }

    pub fn is_fifty_move_draw(&self) -> bool {
        self.board.halfmove_clock() >= 100
    }

    pub fn is_threefold_repetition(&self) -> bool {
        let current = self.board.hash();
        self.history.iter().filter(|&&h| h == current).count() >= 3
    }

    /// `cozy-chess` encodes castling as "king takes own rook"; notation uses
    /// the king's destination square instead.
    fn display_move(&self, mv: Move) -> Move {
        let side = self.board.side_to_move();
        let is_castle = self.board.piece_on(mv.from) == Some(Piece::King)
            && self.board.color_on(mv.to) == Some(side);
        if !is_castle {
            return mv;
        }
        let file = if (mv.to.file() as usize) > (mv.from.file() as usize) {
            File::G
        } else {
            File::C
        };
        Move {
            from: mv.from,
            to: Square::new(file, mv.from.rank()),
            promotion: None,
        }
    }
}

impl RulesEngine for Position {
    fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);
        self.board.generate_moves(|piece_moves| {
            moves.extend(piece_moves);
            false
        });
        moves
    }

    fn push(&mut self, mv: Move) -> Result<(), RulesError> {
        if !self.board.is_legal(mv) {
            return Err(RulesError::IllegalMove(mv.to_string()));
        }
        let previous = self.board.clone();
        self.board.play_unchecked(mv);
        self.undo.push(Undo { board: previous, mv });
        self.history.push(self.board.hash());
        Ok(())
    }

    fn pop(&mut self) -> Option<Move> {
        let Undo { board, mv } = self.undo.pop()?;
        self.board = board;
        self.history.pop();
        Some(mv)
    }

    fn in_check(&self) -> bool {
        !self.board.checkers().is_empty()
    }

    fn terminal(&self) -> Option<Terminal> {
        let has_moves = self.board.generate_moves(|_| true);
        if !has_moves {
            return Some(if self.in_check() {
                Terminal::Checkmate
            } else {
                Terminal::Stalemate
            });
        }
        if self.is_insufficient_material() {
            return Some(Terminal::InsufficientMaterial);
        }
        if self.is_fifty_move_draw() {
            return Some(Terminal::FiftyMoveRule);
        }
        if self.is_threefold_repetition() {
            return Some(Terminal::ThreefoldRepetition);
        }
        None
    }

    fn parse_move(&self, text: &str) -> Result<Move, RulesError> {
        let text = text.trim().to_ascii_lowercase();
        let well_formed = matches!(text.len(), 4 | 5)
            && text.get(0..2).is_some_and(|s| s.parse::<Square>().is_ok())
            && text.get(2..4).is_some_and(|s| s.parse::<Square>().is_ok())
            && text
                .get(4..)
                .is_some_and(|p| p.is_empty() || matches!(p, "q" | "r" | "b" | "n"));
        if !well_formed {
            return Err(RulesError::BadNotation(text));
        }

        let legal = self.legal_moves();
        let find = |wanted: &str| {
            legal
                .iter()
                .copied()
                .find(|&mv| self.format_move(mv) == wanted)
        };
        find(&text)
            // a bare square pair on a promotion means a queen
            .or_else(|| (text.len() == 4).then(|| find(&format!("{text}q"))).flatten())
            .ok_or_else(|| RulesError::IllegalMove(text.clone()))
    }

    fn format_move(&self, mv: Move) -> String {
        self.display_move(mv).to_string()
    }

    fn is_capture(&self, mv: Move) -> bool {
        self.board.color_on(mv.to) == Some(!self.board.side_to_move())
    }
}

/// Neither side can ever deliver mate: bare kings, a single minor piece, or
/// only bishops that all stand on the same square colour.
fn insufficient_material(board: &Board) -> bool {
    let heavy = board.pieces(Piece::Pawn) | board.pieces(Piece::Rook) | board.pieces(Piece::Queen);
    if !heavy.is_empty() {
        return false;
    }
    let knights = board.pieces(Piece::Knight);
    let bishops = board.pieces(Piece::Bishop);
    if knights.len() + bishops.len() <= 1 {
        return true;
    }
    if !knights.is_empty() {
        return false;
    }
    same_square_colour(bishops)
}

fn same_square_colour(squares: BitBoard) -> bool {
    let mut shades = squares
        .into_iter()
        .map(|sq| (sq.file() as usize + sq.rank() as usize) % 2);
    match shades.next() {
        Some(first) => shades.all(|shade| shade == first),
        None => true,
    }
}

#[cfg(test)]
#[path = "board_tests.rs"]
mod board_tests;
