//! Collaborator interfaces: rules engine, board display and search engine.
//!
//! The session only talks to these traits. Concrete implementations live in
//! the submodules.

pub mod display;
pub mod rules;
pub mod uci;

pub use display::TextBoard;
pub use rules::ChessRules;
pub use uci::UciEngine;

use chess::{ChessMove, Color, Piece, Square};
use hintboard_core::codec::PackedMove;

use crate::error::{DisplayError, EngineError};

/// Static evaluation of the current position, white's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub score: i32,
}

/// One entry of a top-moves list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredMove {
    pub mv: PackedMove,
    pub score: i32,
}

/// Move search. Calls block until the engine answers.
pub trait SearchEngine {
    fn set_position(&mut self, fen: &str) -> Result<(), EngineError>;

    fn set_thinking_budget(&mut self, seconds: u32);

    fn best_move(&mut self) -> Result<PackedMove, EngineError>;

    fn evaluate(&mut self) -> Result<Evaluation, EngineError>;

    /// Best `n` moves, strongest first.
    fn top_moves(&mut self, n: usize) -> Result<Vec<ScoredMove>, EngineError>;
}

/// A move that was applied to the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub color: Color,
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub promotion: Option<Piece>,
    pub san: String,
}

/// Chess rules and game state.
pub trait RulesEngine {
    fn current_turn(&self) -> Color;

    fn is_game_over(&self) -> bool;

    /// Apply a move if it is legal. Pawns reaching the last rank promote to
    /// `promotion`, or a queen when none is given.
    fn apply_move(&mut self, from: Square, to: Square, promotion: Option<Piece>)
        -> Option<MoveRecord>;

    fn history(&self) -> &[MoveRecord];

    /// FEN of the current position.
    fn position_string(&self) -> String;

    fn legal_moves(&self) -> Vec<ChessMove>;

    /// Replace the game with the position in `fen`. History is cleared.
    fn load(&mut self, fen: &str) -> Result<(), EngineError>;

    fn reset(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    Source,
    Destination,
}

/// Board view.
pub trait BoardDisplay {
    fn set_position(&mut self, fen: &str);

    fn resize(&mut self);

    /// Fails when the view has no element for `square`.
    fn mark(&mut self, square: Square, mark: Mark) -> Result<(), DisplayError>;

    fn clear_marks(&mut self);
}
