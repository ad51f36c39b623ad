//! Configuration from environment variables

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::store::DEFAULT_KEY;

#[derive(Clone, Debug)]
pub struct HintConfig {
    /// Path to the UCI engine binary
    pub engine_path: String,

    /// Search time per request, in seconds
    pub thinking_seconds: u32,

    /// Entries in the top-moves list
    pub top_moves: usize,

    /// Directory holding saved games
    pub save_dir: PathBuf,

    /// Storage key for the saved games list
    pub storage_key: String,

    /// Positions kept in the search result cache
    pub cache_capacity: usize,

    /// Pause between auto-play moves
    pub auto_play_delay: Duration,
}

impl Default for HintConfig {
    fn default() -> Self {
        Self {
            engine_path: "stockfish".to_string(),
            thinking_seconds: 3,
            top_moves: 3,
            save_dir: PathBuf::from("data"),
            storage_key: DEFAULT_KEY.to_string(),
            cache_capacity: 64,
            auto_play_delay: Duration::from_millis(1000),
        }
    }
}

impl HintConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            engine_path: env::var("ENGINE_PATH").unwrap_or(defaults.engine_path),
            thinking_seconds: parsed("THINKING_SECONDS").unwrap_or(defaults.thinking_seconds),
            top_moves: parsed("TOP_MOVES").unwrap_or(defaults.top_moves),
            save_dir: env::var("SAVE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.save_dir),
            storage_key: env::var("STORAGE_KEY").unwrap_or(defaults.storage_key),
            cache_capacity: parsed("POSITION_CACHE_CAPACITY").unwrap_or(defaults.cache_capacity),
            auto_play_delay: parsed("AUTO_PLAY_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.auto_play_delay),
        }
    }
}

fn parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
