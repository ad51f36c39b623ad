//! Rules engine backed by the `chess` crate.

use std::str::FromStr;

use chess::{Board, BoardStatus, ChessMove, Color, MoveGen, Piece, Rank, Square};
use hintboard_core::san::to_san;

use super::{MoveRecord, RulesEngine};
use crate::error::EngineError;

#[derive(Debug, Clone, Default)]
pub struct ChessRules {
    board: Board,
    history: Vec<MoveRecord>,
}

impl ChessRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fen(fen: &str) -> Result<Self, EngineError> {
        let mut rules = Self::new();
        rules.load(fen)?;
        Ok(rules)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    fn find_legal(&self, from: Square, to: Square, promotion: Option<Piece>) -> Option<ChessMove> {
        let last_rank = match self.board.side_to_move() {
            Color::White => Rank::Eighth,
            Color::Black => Rank::First,
        };
        let promotes =
            self.board.piece_on(from) == Some(Piece::Pawn) && to.get_rank() == last_rank;
        let promotion = if promotes {
            Some(promotion.unwrap_or(Piece::Queen))
        } else {
            None
        };

        let candidate = ChessMove::new(from, to, promotion);
        MoveGen::new_legal(&self.board).find(|m| *m == candidate)
    }
}

/// Neither side can mate: bare kings, a single minor piece, or bishops that
/// all stand on squares of one colour.
fn insufficient_material(board: &Board) -> bool {
    let heavy =
        board.pieces(Piece::Pawn) | board.pieces(Piece::Rook) | *board.pieces(Piece::Queen);
    if heavy.popcnt() > 0 {
        return false;
    }
    let knights = board.pieces(Piece::Knight).popcnt();
    let bishops = *board.pieces(Piece::Bishop);
    if knights + bishops.popcnt() <= 1 {
        return true;
    }
    if knights > 0 {
        return false;
    }
    let shade = |sq: Square| (sq.get_file().to_index() + sq.get_rank().to_index()) % 2;
    let mut shades = bishops.map(shade);
    match shades.next() {
        Some(first) => shades.all(|s| s == first),
        None => true,
    }
}

impl RulesEngine for ChessRules {
    fn current_turn(&self) -> Color {
        self.board.side_to_move()
    }

    fn is_game_over(&self) -> bool {
        self.board.status() != BoardStatus::Ongoing || insufficient_material(&self.board)
    }

    fn apply_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<Piece>,
    ) -> Option<MoveRecord> {
        let m = self.find_legal(from, to, promotion)?;
        let piece = self.board.piece_on(from)?;

        // A pawn changing file onto an empty square is an en passant capture
        let captured = match self.board.piece_on(to) {
            Some(p) => Some(p),
            None if piece == Piece::Pawn && from.get_file() != to.get_file() => Some(Piece::Pawn),
            None => None,
        };

        let record = MoveRecord {
            color: self.board.side_to_move(),
            from,
            to,
            piece,
            captured,
            promotion: m.get_promotion(),
            san: to_san(&self.board, m),
        };

        self.board = self.board.make_move_new(m);
        self.history.push(record.clone());
        Some(record)
    }

    fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    fn position_string(&self) -> String {
        self.board.to_string()
    }

    fn legal_moves(&self) -> Vec<ChessMove> {
        MoveGen::new_legal(&self.board).collect()
    }

    fn load(&mut self, fen: &str) -> Result<(), EngineError> {
        let board =
            Board::from_str(fen).map_err(|_| EngineError::Position(fen.to_string()))?;
        self.board = board;
        self.history.clear();
        Ok(())
    }

    fn reset(&mut self) {
        self.board = Board::default();
        self.history.clear();
    }
}
