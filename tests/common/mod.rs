#![allow(dead_code)]

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use chess::{Board, MoveGen, Square};
use hintboard::engine::{ChessRules, Evaluation, ScoredMove, SearchEngine, TextBoard};
use hintboard::error::EngineError;
use hintboard::session::{Session, SessionBuilder};
use hintboard_core::codec::{encode, pack, PackedMove};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// The start position as the rules engine prints it.
pub fn start_fen() -> String {
    Board::default().to_string()
}

/// Bare kings.
pub const BARE_KINGS_FEN: &str = "8/8/8/4k3/8/8/8/4K3 w - - 0 1";

/// Scholar's mate, white to play Qxf7#.
pub const MATE_IN_ONE_FEN: &str =
    "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4";

/// Search engine that answers with whatever the test scripted.
#[derive(Debug, Default)]
pub struct ScriptedSearch {
    pub best: PackedMove,
    pub score: i32,
    pub top: Vec<ScoredMove>,
    pub fail: bool,
    /// `set_position` fails
    pub reject_positions: bool,
    pub searches: usize,
    pub positions: Vec<String>,
    pub budget: Option<u32>,
}

impl ScriptedSearch {
    pub fn playing(from: Square, to: Square, score: i32) -> Self {
        Self {
            best: encode(from, to),
            score,
            ..Self::default()
        }
    }

    pub fn raw(best: u32) -> Self {
        Self {
            best: PackedMove(best),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), EngineError> {
        if self.fail {
            return Err(EngineError::Protocol("scripted failure".into()));
        }
        Ok(())
    }
}

impl SearchEngine for ScriptedSearch {
    fn set_position(&mut self, fen: &str) -> Result<(), EngineError> {
        if self.reject_positions {
            return Err(EngineError::Position(fen.to_string()));
        }
        self.positions.push(fen.to_string());
        Ok(())
    }

    fn set_thinking_budget(&mut self, seconds: u32) {
        self.budget = Some(seconds);
    }

    fn best_move(&mut self) -> Result<PackedMove, EngineError> {
        self.check()?;
        self.searches += 1;
        Ok(self.best)
    }

    fn evaluate(&mut self) -> Result<Evaluation, EngineError> {
        self.check()?;
        Ok(Evaluation { score: self.score })
    }

    fn top_moves(&mut self, n: usize) -> Result<Vec<ScoredMove>, EngineError> {
        self.check()?;
        Ok(self.top.iter().take(n).copied().collect())
    }
}

/// Plays the first legal move the move generator yields.
#[derive(Debug, Default)]
pub struct FirstLegalSearch {
    board: Board,
}

impl SearchEngine for FirstLegalSearch {
    fn set_position(&mut self, fen: &str) -> Result<(), EngineError> {
        self.board = Board::from_str(fen).map_err(|_| EngineError::Position(fen.to_string()))?;
        Ok(())
    }

    fn set_thinking_budget(&mut self, _seconds: u32) {}

    fn best_move(&mut self) -> Result<PackedMove, EngineError> {
        Ok(MoveGen::new_legal(&self.board)
            .next()
            .map(|m| pack(&self.board, m))
            .unwrap_or(PackedMove::NONE))
    }

    fn evaluate(&mut self) -> Result<Evaluation, EngineError> {
        Ok(Evaluation { score: 0 })
    }

    fn top_moves(&mut self, n: usize) -> Result<Vec<ScoredMove>, EngineError> {
        Ok(MoveGen::new_legal(&self.board)
            .take(n)
            .map(|m| ScoredMove { mv: pack(&self.board, m), score: 0 })
            .collect())
    }
}

pub fn session<S: SearchEngine>(search: S) -> Session<ChessRules, TextBoard, S> {
    session_at(START_FEN, search)
}

pub fn session_at<S: SearchEngine>(fen: &str, search: S) -> Session<ChessRules, TextBoard, S> {
    SessionBuilder::new()
        .rules(ChessRules::from_fen(fen).expect("valid FEN"))
        .display(TextBoard::new())
        .search(search)
        .seed(42)
        .build()
        .expect("session builds")
}

/// Generate a unique suffix based on timestamp + a counter to avoid collisions.
pub fn unique_suffix() -> String {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}-{}", ts % 1_000_000_000, COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// Fresh directory under the system temp dir.
pub fn temp_dir(prefix: &str) -> PathBuf {
    std::env::temp_dir().join(format!("hintboard-{prefix}-{}", unique_suffix()))
}
