use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A saved game. Field names match the browser store's JSON so existing
/// saves stay readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub fen: String,
    pub pgn: String, // movetext, "1. e4 e5 2. Nf3"
    pub timestamp: DateTime<Utc>,
}

impl GameRecord {
    pub fn new(fen: impl Into<String>, pgn: impl Into<String>) -> Self {
        Self {
            fen: fen.into(),
            pgn: pgn.into(),
            timestamp: Utc::now(),
        }
    }

    /// List label for the record stored at `index`: `Game 1 - 10/15/2026 9:05`.
    pub fn label(&self, index: usize) -> String {
        format!(
            "Game {} - {}",
            index + 1,
            self.timestamp.format("%-m/%-d/%Y %-H:%M")
        )
    }
}
