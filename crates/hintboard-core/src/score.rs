//! Evaluation display: centipawn scores to short human-readable strings.

use std::fmt;

/// A side is "better" once the score passes half a pawn.
pub const ADVANTAGE_THRESHOLD_CP: i32 = 50;

// Material values, in pawns
pub const PAWN_VALUE: i32 = 1;
pub const KNIGHT_VALUE: i32 = 3;
pub const BISHOP_VALUE: i32 = 3;
pub const ROOK_VALUE: i32 = 5;
pub const QUEEN_VALUE: i32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advantage {
    /// White
    FirstSide,
    /// Black
    SecondSide,
    Even,
}

impl Advantage {
    pub fn label(self) -> &'static str {
        match self {
            Advantage::FirstSide => "White is better",
            Advantage::SecondSide => "Black is better",
            Advantage::Even => "Even",
        }
    }
}

impl fmt::Display for Advantage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn classify(cp: i32) -> Advantage {
    if cp > ADVANTAGE_THRESHOLD_CP {
        Advantage::FirstSide
    } else if cp < -ADVANTAGE_THRESHOLD_CP {
        Advantage::SecondSide
    } else {
        Advantage::Even
    }
}

/// Format a centipawn score as pawns with one decimal.
///
/// Non-zero scores always carry a sign (`+1.5`, `-2.2`); zero is `0.0`.
/// Tenths are rounded half away from zero.
pub fn format_score(cp: i32) -> String {
    if cp == 0 {
        return "0.0".to_string();
    }
    let tenths = (cp.unsigned_abs() + 5) / 10;
    let sign = if cp > 0 { '+' } else { '-' };
    format!("{sign}{}.{}", tenths / 10, tenths % 10)
}

/// `Evaluation: +1.5 (White is better)`
pub fn describe(cp: i32) -> String {
    format!("Evaluation: {} ({})", format_score(cp), classify(cp))
}

/// One line of a top-moves list, `rank` counting from 1: `1. e2e4 (+0.3)`.
pub fn format_top_move(rank: usize, mv: impl fmt::Display, cp: i32) -> String {
    format!("{rank}. {mv} ({})", format_score(cp))
}

/// Material difference (white minus black) from the placement field of a FEN.
pub fn material_balance(fen: &str) -> i32 {
    let placement = fen.split_whitespace().next().unwrap_or("");
    placement
        .chars()
        .map(|c| {
            let value = match c.to_ascii_lowercase() {
                'p' => PAWN_VALUE,
                'n' => KNIGHT_VALUE,
                'b' => BISHOP_VALUE,
                'r' => ROOK_VALUE,
                'q' => QUEEN_VALUE,
                _ => 0,
            };
            if c.is_ascii_uppercase() {
                value
            } else {
                -value
            }
        })
        .sum()
}

pub fn describe_material(balance: i32) -> String {
    match balance {
        0 => "Material is even".to_string(),
        b if b > 0 => format!("White is ahead by {b} points"),
        b => format!("Black is ahead by {} points", -b),
    }
}
