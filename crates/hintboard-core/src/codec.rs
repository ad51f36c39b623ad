//! Packed move codec for the search engine's integer move format.
//!
//! Bit layout, low bit first:
//!
//! ```text
//! bits  0..=6   source square index
//! bits  7..=13  destination square index
//! bits 14..=17  captured piece code
//! bit  18       en passant capture
//! bit  19       pawn double push
//! bits 20..=23  promoted piece code
//! bit  24       castling
//! ```
//!
//! Square indices run rank by rank from a8 = 0 to h1 = 63. This is the only
//! layout accepted here; 10x12 mailbox indices (a1 = 21) are rejected as out
//! of range.

use std::fmt;

use chess::{Board, ChessMove, Color, File, Piece, Rank, Square, ALL_PIECES};
use thiserror::Error;

const SQUARE_MASK: u32 = 0x7F;
const TO_SHIFT: u32 = 7;
const CAPTURED_SHIFT: u32 = 14;
const PROMOTED_SHIFT: u32 = 20;
const PIECE_MASK: u32 = 0xF;

pub const FLAG_EN_PASSANT: u32 = 0x4_0000;
pub const FLAG_PAWN_START: u32 = 0x8_0000;
pub const FLAG_CASTLE: u32 = 0x100_0000;

/// Highest valid square index.
pub const MAX_SQUARE_INDEX: u32 = 63;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("square index {0} is outside 0..=63")]
    OutOfRange(u32),

    #[error("unknown piece code {0}")]
    PieceCode(u32),
}

/// A move as produced by the search engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PackedMove(pub u32);

impl PackedMove {
    /// The engine's "no move" value.
    pub const NONE: PackedMove = PackedMove(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    pub fn from_index(self) -> u32 {
        self.0 & SQUARE_MASK
    }

    pub fn to_index(self) -> u32 {
        (self.0 >> TO_SHIFT) & SQUARE_MASK
    }

    pub fn captured_code(self) -> u32 {
        (self.0 >> CAPTURED_SHIFT) & PIECE_MASK
    }

    pub fn promoted_code(self) -> u32 {
        (self.0 >> PROMOTED_SHIFT) & PIECE_MASK
    }

    pub fn is_en_passant(self) -> bool {
        self.0 & FLAG_EN_PASSANT != 0
    }

    pub fn is_pawn_start(self) -> bool {
        self.0 & FLAG_PAWN_START != 0
    }

    pub fn is_castle(self) -> bool {
        self.0 & FLAG_CASTLE != 0
    }

    /// Captured piece, if any.
    pub fn captured(self) -> Result<Option<(Color, Piece)>, DecodeError> {
        piece_from_code(self.captured_code())
    }

    /// Promotion piece, if any.
    pub fn promoted(self) -> Result<Option<(Color, Piece)>, DecodeError> {
        piece_from_code(self.promoted_code())
    }

    pub fn with_captured(self, color: Color, piece: Piece) -> Self {
        let cleared = self.0 & !(PIECE_MASK << CAPTURED_SHIFT);
        PackedMove(cleared | (piece_code(color, piece) << CAPTURED_SHIFT))
    }

    pub fn with_promotion(self, color: Color, piece: Piece) -> Self {
        let cleared = self.0 & !(PIECE_MASK << PROMOTED_SHIFT);
        PackedMove(cleared | (piece_code(color, piece) << PROMOTED_SHIFT))
    }

    pub fn with_flags(self, flags: u32) -> Self {
        PackedMove(self.0 | (flags & (FLAG_EN_PASSANT | FLAG_PAWN_START | FLAG_CASTLE)))
    }

    pub fn decode(self) -> Result<DecodedMove, DecodeError> {
        decode(self)
    }
}

impl From<u32> for PackedMove {
    fn from(value: u32) -> Self {
        PackedMove(value)
    }
}

/// Source and destination squares of a packed move, plus the promotion piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodedMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Piece>,
}

impl fmt::Display for DecodedMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(piece) = self.promotion {
            write!(f, "{}", piece.to_string(Color::Black))?;
        }
        Ok(())
    }
}

/// Map a square index (a8 = 0, h1 = 63) to a board square.
pub fn index_to_square(index: u32) -> Result<Square, DecodeError> {
    if index > MAX_SQUARE_INDEX {
        return Err(DecodeError::OutOfRange(index));
    }
    let file = (index % 8) as usize;
    let rank = 7 - (index / 8) as usize;
    Ok(Square::make_square(Rank::from_index(rank), File::from_index(file)))
}

/// Inverse of [`index_to_square`].
pub fn square_to_index(square: Square) -> u32 {
    let file = square.get_file().to_index() as u32;
    let rank = square.get_rank().to_index() as u32;
    (7 - rank) * 8 + file
}

/// Decode the source and destination of a packed move.
///
/// Both indices are checked before anything is returned, so an error never
/// comes with half a move.
pub fn decode(mv: PackedMove) -> Result<DecodedMove, DecodeError> {
    let from = index_to_square(mv.from_index())?;
    let to = index_to_square(mv.to_index())?;
    // An unknown promotion code is dropped rather than failing the move
    let promotion = mv.promoted().ok().flatten().map(|(_, piece)| piece);
    Ok(DecodedMove { from, to, promotion })
}

/// Pack a plain source/destination pair with no captured or promoted piece.
pub fn encode(from: Square, to: Square) -> PackedMove {
    PackedMove(square_to_index(from) | (square_to_index(to) << TO_SHIFT))
}

/// Pack a legal move on `board`, filling in capture, promotion and flags.
pub fn pack(board: &Board, m: ChessMove) -> PackedMove {
    let (from, to) = (m.get_source(), m.get_dest());
    let side = board.side_to_move();
    let mut packed = encode(from, to);

    match board.piece_on(from) {
        Some(Piece::Pawn) => {
            if let Some(captured) = board.piece_on(to) {
                packed = packed.with_captured(!side, captured);
            } else if from.get_file() != to.get_file() {
                packed = packed
                    .with_captured(!side, Piece::Pawn)
                    .with_flags(FLAG_EN_PASSANT);
            }
            let distance = from.get_rank().to_index().abs_diff(to.get_rank().to_index());
            if distance == 2 {
                packed = packed.with_flags(FLAG_PAWN_START);
            }
            if let Some(promotion) = m.get_promotion() {
                packed = packed.with_promotion(side, promotion);
            }
        }
        Some(Piece::King) if from.get_file().to_index().abs_diff(to.get_file().to_index()) == 2 => {
            packed = packed.with_flags(FLAG_CASTLE);
        }
        _ => {
            if let Some(captured) = board.piece_on(to) {
                packed = packed.with_captured(!side, captured);
            }
        }
    }

    packed
}

/// Piece code: 0 empty, 1..=6 white P N B R Q K, 7..=12 black.
pub fn piece_code(color: Color, piece: Piece) -> u32 {
    let base = piece.to_index() as u32 + 1;
    match color {
        Color::White => base,
        Color::Black => base + 6,
    }
}

pub fn piece_from_code(code: u32) -> Result<Option<(Color, Piece)>, DecodeError> {
    match code {
        0 => Ok(None),
        1..=6 => Ok(Some((Color::White, ALL_PIECES[(code - 1) as usize]))),
        7..=12 => Ok(Some((Color::Black, ALL_PIECES[(code - 7) as usize]))),
        _ => Err(DecodeError::PieceCode(code)),
    }
}
