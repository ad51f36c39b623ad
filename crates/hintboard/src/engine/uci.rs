//! Search engine wrapper speaking UCI over a child process's stdin/stdout.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::str::FromStr;

use chess::{Board, ChessMove, Color, File, MoveGen, Piece, Rank, Square};
use hintboard_core::codec::{pack, PackedMove};
use tracing::debug;

use super::{Evaluation, ScoredMove, SearchEngine};
use crate::error::EngineError;

/// Centipawn stand-in for a forced mate, reduced by the distance to mate.
pub const MATE_SCORE: i32 = 30_000;

/// A single PV line from a search
#[derive(Debug, Clone, Default)]
pub struct PvLine {
    /// Principal variation moves
    pub pv: Vec<String>,
    /// Centipawn score, side to move
    pub cp: Option<i32>,
    /// Mate in N
    pub mate: Option<i32>,
}

impl PvLine {
    /// Score from the side to move's point of view, mates folded into centipawns.
    pub fn score(&self) -> Option<i32> {
        match (self.cp, self.mate) {
            (_, Some(n)) if n > 0 => Some(MATE_SCORE - n),
            (_, Some(n)) => Some(-MATE_SCORE - n),
            (Some(cp), None) => Some(cp),
            (None, None) => None,
        }
    }
}

/// Outcome of the last `go`, reused while the position stays the same.
#[derive(Debug, Clone)]
struct SearchResult {
    multipv: usize,
    lines: Vec<PvLine>,
    best: String,
}

/// External UCI engine process
pub struct UciEngine {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    board: Board,
    fen: String,
    movetime_ms: u64,
    last: Option<SearchResult>,
}

impl UciEngine {
    /// Spawn the engine and run the UCI handshake
    pub fn new(path: &str) -> Result<Self, EngineError> {
        Self::from_command(Command::new(path))
    }

    /// Spawn a prepared command (engine binary plus arguments) and run the
    /// UCI handshake
    pub fn from_command(mut command: Command) -> Result<Self, EngineError> {
        let program = command.get_program().to_string_lossy().into_owned();
        let mut process = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| EngineError::Spawn(format!("{program}: {e}")))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| EngineError::Spawn("engine stdin unavailable".into()))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| EngineError::Spawn("engine stdout unavailable".into()))?;

        let board = Board::default();
        let mut engine = Self {
            process,
            stdin,
            stdout: BufReader::new(stdout),
            fen: board.to_string(),
            board,
            movetime_ms: 3_000,
            last: None,
        };

        engine.send("uci")?;
        engine.wait_for("uciok")?;
        engine.send("isready")?;
        engine.wait_for("readyok")?;

        Ok(engine)
    }

    fn send(&mut self, cmd: &str) -> Result<(), EngineError> {
        debug!(cmd, "UCI <");
        writeln!(self.stdin, "{cmd}")?;
        self.stdin.flush()?;
        Ok(())
    }

    fn read_line(&mut self, line: &mut String) -> Result<(), EngineError> {
        line.clear();
        if self.stdout.read_line(line)? == 0 {
            return Err(EngineError::Protocol("engine closed its output".into()));
        }
        debug!(line = line.trim(), "UCI >");
        Ok(())
    }

    fn wait_for(&mut self, expected: &str) -> Result<(), EngineError> {
        let mut line = String::new();
        loop {
            self.read_line(&mut line)?;
            if line.trim() == expected {
                return Ok(());
            }
        }
    }

    /// Search the current position with at least `multipv` lines. A result
    /// for the same position with as many lines is answered without a new `go`.
    fn search(&mut self, multipv: usize) -> Result<SearchResult, EngineError> {
        let multipv = multipv.max(1);
        if let Some(last) = self.last.as_ref().filter(|r| r.multipv >= multipv) {
            debug!(multipv, "Reusing last search");
            return Ok(last.clone());
        }
        self.send(&format!("setoption name MultiPV value {multipv}"))?;
        self.send(&format!("position fen {}", self.fen))?;
        self.send(&format!("go movetime {}", self.movetime_ms))?;

        let mut lines = vec![PvLine::default(); multipv];
        let mut line = String::new();
        let best = loop {
            self.read_line(&mut line)?;
            let trimmed = line.trim();

            if trimmed.starts_with("info") && trimmed.contains(" pv ") {
                let idx = parse_multipv_index(trimmed).unwrap_or(1).max(1) as usize - 1;
                if let Some(entry) = lines.get_mut(idx) {
                    entry.cp = parse_cp(trimmed);
                    entry.mate = parse_mate(trimmed);
                    entry.pv = parse_pv(trimmed);
                }
            } else if let Some(rest) = trimmed.strip_prefix("bestmove") {
                break rest.split_whitespace().next().unwrap_or("").to_string();
            }
        };

        if multipv > 1 {
            self.send("setoption name MultiPV value 1")?;
        }

        lines.retain(|l| !l.pv.is_empty());
        let result = SearchResult { multipv, lines, best };
        self.last = Some(result.clone());
        Ok(result)
    }

    /// Score from white's point of view
    fn white_score(&self, line: &PvLine) -> Option<i32> {
        let score = line.score()?;
        Some(match self.board.side_to_move() {
            Color::White => score,
            Color::Black => -score,
        })
    }

    /// Pack a UCI move string, validating it against the current position
    fn pack_uci(&self, uci: &str) -> Option<PackedMove> {
        let m = parse_uci_move(uci)?;
        MoveGen::new_legal(&self.board)
            .any(|legal| legal == m)
            .then(|| pack(&self.board, m))
    }

    /// Send quit and wait for the process to exit
    pub fn quit(&mut self) {
        let _ = self.send("quit");
        let _ = self.process.wait();
    }
}

impl SearchEngine for UciEngine {
    fn set_position(&mut self, fen: &str) -> Result<(), EngineError> {
        let board =
            Board::from_str(fen).map_err(|_| EngineError::Position(fen.to_string()))?;
        if fen != self.fen {
            self.last = None;
        }
        self.board = board;
        self.fen = fen.to_string();
        Ok(())
    }

    fn set_thinking_budget(&mut self, seconds: u32) {
        let movetime_ms = u64::from(seconds.max(1)) * 1_000;
        if movetime_ms != self.movetime_ms {
            self.last = None;
        }
        self.movetime_ms = movetime_ms;
    }

    fn best_move(&mut self) -> Result<PackedMove, EngineError> {
        let best = self.search(1)?.best;
        if best == "(none)" || best.is_empty() {
            return Ok(PackedMove::NONE);
        }
        self.pack_uci(&best)
            .ok_or_else(|| EngineError::Protocol(format!("unusable bestmove '{best}'")))
    }

    fn evaluate(&mut self) -> Result<Evaluation, EngineError> {
        let lines = self.search(1)?.lines;
        let score = lines
            .first()
            .and_then(|l| self.white_score(l))
            .ok_or_else(|| EngineError::Protocol("search returned no score".into()))?;
        Ok(Evaluation { score })
    }

    fn top_moves(&mut self, n: usize) -> Result<Vec<ScoredMove>, EngineError> {
        let lines = self.search(n)?.lines;
        Ok(lines
            .iter()
            .take(n)
            .filter_map(|l| {
                let mv = self.pack_uci(l.pv.first()?)?;
                let score = self.white_score(l)?;
                Some(ScoredMove { mv, score })
            })
            .collect())
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        let _ = self.process.kill();
    }
}

/// Parse a UCI move string (`e2e4`, `e7e8q`)
pub fn parse_uci_move(uci: &str) -> Option<ChessMove> {
    let bytes = uci.as_bytes();
    if bytes.len() < 4 {
        return None;
    }

    let square = |file: u8, rank: u8| -> Option<Square> {
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return None;
        }
        Some(Square::make_square(
            Rank::from_index((rank - b'1') as usize),
            File::from_index((file - b'a') as usize),
        ))
    };

    let from = square(bytes[0], bytes[1])?;
    let to = square(bytes[2], bytes[3])?;

    let promotion = match bytes.get(4).copied() {
        Some(b'q' | b'Q') => Some(Piece::Queen),
        Some(b'r' | b'R') => Some(Piece::Rook),
        Some(b'b' | b'B') => Some(Piece::Bishop),
        Some(b'n' | b'N') => Some(Piece::Knight),
        _ => None,
    };

    Some(ChessMove::new(from, to, promotion))
}

/// Parse centipawn score from info line
fn parse_cp(line: &str) -> Option<i32> {
    value_after(line, "cp")
}

/// Parse mate score from info line
fn parse_mate(line: &str) -> Option<i32> {
    value_after(line, "mate")
}

/// Parse multipv index from info line
fn parse_multipv_index(line: &str) -> Option<u32> {
    value_after(line, "multipv")
}

fn value_after<T: FromStr>(line: &str, key: &str) -> Option<T> {
    let mut parts = line.split_whitespace();
    parts.by_ref().find(|p| *p == key)?;
    parts.next()?.parse().ok()
}

/// Parse PV moves from info line
fn parse_pv(line: &str) -> Vec<String> {
    line.split_whitespace()
        .skip_while(|p| *p != "pv")
        .skip(1)
        .take_while(|p| !p.starts_with("bmc") && *p != "string")
        .map(str::to_string)
        .collect()
}
