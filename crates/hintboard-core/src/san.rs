//! SAN output for `chess` crate moves, plus move-list transcripts.

use chess::{Board, ChessMove};
use shakmaty::{fen::Fen, san::San, uci::UciMove, CastlingMode, Chess, Position};

/// Render a legal move in standard algebraic notation, with `+`/`#` suffix.
///
/// Falls back to the UCI form when the position or move does not convert.
pub fn to_san(board: &Board, m: ChessMove) -> String {
    san_plus(board, m).unwrap_or_else(|| m.to_string())
}

fn san_plus(board: &Board, m: ChessMove) -> Option<String> {
    let fen: Fen = board.to_string().parse().ok()?;
    let mut pos = fen.into_position::<Chess>(CastlingMode::Standard).ok()?;
    let uci: UciMove = m.to_string().parse().ok()?;
    let legal_move = uci.to_move(&pos).ok()?;

    let mut san = San::from_move(&pos, legal_move).to_string();
    pos.play_unchecked(legal_move);
    if pos.is_checkmate() {
        san.push('#');
    } else if pos.is_check() {
        san.push('+');
    }
    Some(san)
}

/// Numbered movetext: `1. e4 e5 2. Nf3`.
pub fn transcript<S: AsRef<str>>(moves: &[S]) -> String {
    let mut out = String::new();
    for (i, san) in moves.iter().enumerate() {
        if i % 2 == 0 {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&format!("{}. {}", i / 2 + 1, san.as_ref()));
        } else {
            out.push(' ');
            out.push_str(san.as_ref());
        }
    }
    out
}
