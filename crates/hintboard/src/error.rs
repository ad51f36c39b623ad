//! Error types

use chess::Square;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to spawn engine: {0}")]
    Spawn(String),

    #[error("Engine I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Engine protocol error: {0}")]
    Protocol(String),

    #[error("Invalid position: {0}")]
    Position(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DisplayError {
    #[error("Square {0} is not on the display")]
    UnknownSquare(Square),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No saved game at index {index} ({len} saved)")]
    NotFound { index: usize, len: usize },

    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed saved games: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
