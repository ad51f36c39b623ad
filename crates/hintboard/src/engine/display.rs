//! Plain-text board view for terminals.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::str::FromStr;

use chess::{Board, Color, File, Rank, Square};
use tracing::{debug, warn};

use super::{BoardDisplay, Mark};
use crate::error::DisplayError;

/// Renders the position as an 8x8 grid. Source squares are drawn as `[x]`,
/// destination squares as `(x)`.
///
/// Until the first position arrives there is no grid, so every square is
/// unknown to the view.
#[derive(Debug, Default)]
pub struct TextBoard {
    board: Option<Board>,
    marks: HashMap<Square, Mark>,
    flipped: bool,
}

impl TextBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw from black's side.
    pub fn flip(&mut self) {
        self.flipped = !self.flipped;
    }

    pub fn mark_at(&self, square: Square) -> Option<Mark> {
        self.marks.get(&square).copied()
    }

    /// Marked squares with their kind, sorted by square.
    pub fn marks(&self) -> Vec<(Square, Mark)> {
        let mut marks: Vec<(Square, Mark)> = self.marks.iter().map(|(s, m)| (*s, *m)).collect();
        marks.sort_by_key(|(s, _)| s.to_index());
        marks
    }

    pub fn render(&self) -> String {
        let Some(board) = &self.board else {
            return String::from("(no position)\n");
        };

        let ranks: Vec<usize> = if self.flipped {
            (0..8).collect()
        } else {
            (0..8).rev().collect()
        };
        let files: Vec<usize> = if self.flipped {
            (0..8).rev().collect()
        } else {
            (0..8).collect()
        };

        let mut out = String::new();
        for &rank in &ranks {
            let _ = write!(out, "{} ", rank + 1);
            for &file in &files {
                let square = Square::make_square(Rank::from_index(rank), File::from_index(file));
                let glyph = match (board.piece_on(square), board.color_on(square)) {
                    (Some(piece), Some(color)) => piece
                        .to_string(color)
                        .chars()
                        .next()
                        .unwrap_or('?'),
                    _ => '.',
                };
                let cell = match self.marks.get(&square) {
                    Some(Mark::Source) => format!("[{glyph}]"),
                    Some(Mark::Destination) => format!("({glyph})"),
                    None => format!(" {glyph} "),
                };
                out.push_str(&cell);
            }
            out.push('\n');
        }
        out.push_str("  ");
        for &file in &files {
            let _ = write!(out, " {} ", (b'a' + file as u8) as char);
        }
        out.push('\n');

        if board.side_to_move() == Color::White {
            out.push_str("White to move\n");
        } else {
            out.push_str("Black to move\n");
        }
        out
    }
}

impl BoardDisplay for TextBoard {
    fn set_position(&mut self, fen: &str) {
        match Board::from_str(fen) {
            Ok(board) => self.board = Some(board),
            Err(_) => warn!(fen, "Display ignored unparseable position"),
        }
    }

    fn resize(&mut self) {
        // Fixed-width grid, nothing to lay out again
        debug!(flipped = self.flipped, "Text board resize");
    }

    fn mark(&mut self, square: Square, mark: Mark) -> Result<(), DisplayError> {
        if self.board.is_none() {
            return Err(DisplayError::UnknownSquare(square));
        }
        self.marks.insert(square, mark);
        Ok(())
    }

    fn clear_marks(&mut self) {
        self.marks.clear();
    }
}
