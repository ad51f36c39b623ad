//! Session: the rules engine, board display and search engine for one game,
//! passed in explicitly, plus the command handlers a UI calls.

use std::thread;
use std::time::Duration;

use chess::{Piece, Square};
use hintboard_core::codec::{decode, DecodedMove, PackedMove};
use hintboard_core::record::GameRecord;
use hintboard_core::san::transcript;
use hintboard_core::score::{describe, describe_material, format_top_move, material_balance};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

use crate::cache::{CachedAnalysis, PositionCache};
use crate::config::HintConfig;
use crate::engine::{BoardDisplay, MoveRecord, RulesEngine, SearchEngine};
use crate::error::{EngineError, SessionError};
use crate::highlight::HighlightController;
use crate::store::{FileStorage, GameRecordStore};

/// Progress signals around a blocking search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Thinking,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionSource {
    Engine,
    Cache,
    /// The engine gave nothing usable; a random legal move stands in.
    RandomFallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub from: Square,
    pub to: Square,
    pub source: SuggestionSource,
    pub evaluation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hint {
    Suggested(Suggestion),
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub best: Option<DecodedMove>,
    pub score: i32,
    /// `Evaluation: +0.3 (Even)`
    pub evaluation: String,
    /// `1. e2e4 (+0.3)` lines
    pub top_moves: Vec<String>,
}

pub struct SessionBuilder<R, D, S> {
    rules: Option<R>,
    display: Option<D>,
    search: Option<S>,
    store: Option<GameRecordStore>,
    thinking_seconds: u32,
    cache_capacity: usize,
    seed: Option<u64>,
}

impl<R, D, S> Default for SessionBuilder<R, D, S> {
    fn default() -> Self {
        let config = HintConfig::default();
        Self {
            rules: None,
            display: None,
            search: None,
            store: None,
            thinking_seconds: config.thinking_seconds,
            cache_capacity: config.cache_capacity,
            seed: None,
        }
    }
}

impl<R: RulesEngine, D: BoardDisplay, S: SearchEngine> SessionBuilder<R, D, S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Thinking budget, cache size and file-backed game store from `config`.
    pub fn with_config(config: &HintConfig) -> Self {
        Self {
            thinking_seconds: config.thinking_seconds,
            cache_capacity: config.cache_capacity,
            store: Some(GameRecordStore::new(
                FileStorage::new(&config.save_dir),
                config.storage_key.clone(),
            )),
            ..Self::default()
        }
    }

    pub fn rules(mut self, rules: R) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn display(mut self, display: D) -> Self {
        self.display = Some(display);
        self
    }

    pub fn search(mut self, search: S) -> Self {
        self.search = Some(search);
        self
    }

    pub fn store(mut self, store: GameRecordStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn thinking_seconds(mut self, seconds: u32) -> Self {
        self.thinking_seconds = seconds;
        self
    }

    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Seed for the random fallback move.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fails when any collaborator is missing; a partial session is never built.
    pub fn build(self) -> Result<Session<R, D, S>, SessionError> {
        let rules = self
            .rules
            .ok_or(SessionError::MissingCollaborator("rules engine"))?;
        let display = self
            .display
            .ok_or(SessionError::MissingCollaborator("board display"))?;
        let search = self
            .search
            .ok_or(SessionError::MissingCollaborator("search engine"))?;

        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut session = Session {
            rules,
            display,
            search,
            highlight: HighlightController::new(),
            cache: PositionCache::new(self.cache_capacity),
            store: self.store.unwrap_or_else(GameRecordStore::in_memory),
            thinking_seconds: self.thinking_seconds,
            rng,
        };
        session.sync_display();
        session.display.resize();
        info!(fen = %session.rules.position_string(), "Session ready");
        Ok(session)
    }
}

pub struct Session<R, D, S> {
    rules: R,
    display: D,
    search: S,
    highlight: HighlightController,
    cache: PositionCache,
    store: GameRecordStore,
    thinking_seconds: u32,
    rng: StdRng,
}

impl<R: RulesEngine, D: BoardDisplay, S: SearchEngine> Session<R, D, S> {
    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn search(&self) -> &S {
        &self.search
    }

    pub fn search_mut(&mut self) -> &mut S {
        &mut self.search
    }

    pub fn highlighted(&self) -> Option<(Square, Square)> {
        self.highlight.current()
    }

    pub fn cached_positions(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_highlights(&mut self) {
        self.highlight.clear(&mut self.display);
    }

    fn sync_display(&mut self) {
        let fen = self.rules.position_string();
        self.display.set_position(&fen);
    }

    /// Highlights and cached results belong to the old position.
    fn position_changed(&mut self) {
        self.highlight.clear(&mut self.display);
        self.cache.clear();
        self.sync_display();
    }

    /// Play a move, promoting to a queen when a pawn reaches the last rank.
    /// Returns `None` for illegal moves and once the game is over.
    pub fn try_move(&mut self, from: Square, to: Square) -> Option<MoveRecord> {
        self.try_move_with(from, to, None)
    }

    pub fn try_move_with(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<Piece>,
    ) -> Option<MoveRecord> {
        if self.rules.is_game_over() {
            return None;
        }
        let Some(record) = self.rules.apply_move(from, to, promotion) else {
            info!(%from, %to, "Illegal move rejected");
            return None;
        };
        info!(san = %record.san, "Move played");
        self.position_changed();
        Some(record)
    }

    /// Ask the engine for the best move and highlight it.
    ///
    /// `on_status` sees `Thinking` before the search starts and `Done` once
    /// the result is on the board.
    pub fn show_best_move(&mut self, mut on_status: impl FnMut(Status)) -> Hint {
        on_status(Status::Thinking);
        let hint = self.compute_hint();
        if let Hint::Suggested(s) = &hint {
            self.highlight.highlight(&mut self.display, s.from, s.to);
        }
        on_status(Status::Done);
        hint
    }

    fn compute_hint(&mut self) -> Hint {
        if self.rules.is_game_over() {
            info!("Game is over, no hint");
            return Hint::GameOver;
        }

        let fen = self.rules.position_string();
        if let Some(cached) = self.cache.get(&fen).copied() {
            if let Some(mv) = self.legal_decoded(cached.best_move) {
                return Hint::Suggested(Suggestion {
                    from: mv.from,
                    to: mv.to,
                    source: SuggestionSource::Cache,
                    evaluation: cached.score.map(describe),
                });
            }
        }

        let (best, score) = match self.search_best(&fen) {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "Search failed");
                return self.random_fallback();
            }
        };

        match self.legal_decoded(best) {
            Some(mv) => {
                // Only legal moves are cached
                self.cache.insert(&fen, CachedAnalysis { best_move: best, score });
                Hint::Suggested(Suggestion {
                    from: mv.from,
                    to: mv.to,
                    source: SuggestionSource::Engine,
                    evaluation: score.map(describe),
                })
            }
            None => self.random_fallback(),
        }
    }

    fn search_best(&mut self, fen: &str) -> Result<(PackedMove, Option<i32>), EngineError> {
        self.search.set_position(fen)?;
        self.search.set_thinking_budget(self.thinking_seconds);
        let best = self.search.best_move()?;
        let score = match self.search.evaluate() {
            Ok(eval) => Some(eval.score),
            Err(e) => {
                warn!(error = %e, "Evaluation failed");
                None
            }
        };
        Ok((best, score))
    }

    /// Decode an engine move and check it against the legal moves.
    fn legal_decoded(&self, mv: PackedMove) -> Option<DecodedMove> {
        if mv.is_null() {
            return None;
        }
        let decoded = match decode(mv) {
            Ok(d) => d,
            Err(e) => {
                warn!(raw = mv.0, error = %e, "Undecodable engine move");
                return None;
            }
        };
        let legal = self
            .rules
            .legal_moves()
            .iter()
            .any(|m| m.get_source() == decoded.from && m.get_dest() == decoded.to);
        if !legal {
            warn!(mv = %decoded, "Engine move is not legal in this position");
            return None;
        }
        Some(decoded)
    }

    fn random_fallback(&mut self) -> Hint {
        let moves = self.rules.legal_moves();
        if moves.is_empty() {
            return Hint::GameOver;
        }
        let m = moves[self.rng.random_range(0..moves.len())];
        let material = describe_material(material_balance(&self.rules.position_string()));
        warn!(mv = %m, "Falling back to a random legal move");
        Hint::Suggested(Suggestion {
            from: m.get_source(),
            to: m.get_dest(),
            source: SuggestionSource::RandomFallback,
            evaluation: Some(material),
        })
    }

    /// Best move (highlighted), evaluation and the top `top_n` moves.
    ///
    /// Top moves are asked for first; best move and evaluation follow on the
    /// same position and budget.
    pub fn analyze(&mut self, top_n: usize) -> Result<Analysis, SessionError> {
        let fen = self.rules.position_string();
        self.search.set_position(&fen)?;
        self.search.set_thinking_budget(self.thinking_seconds);

        let top = self.search.top_moves(top_n)?;
        let best = self.search.best_move()?;
        let best = self.legal_decoded(best);
        if let Some(mv) = best {
            self.highlight.highlight(&mut self.display, mv.from, mv.to);
        }

        let score = self.search.evaluate()?.score;
        let top_moves = top
            .iter()
            .enumerate()
            .filter_map(|(i, scored)| {
                let mv = decode(scored.mv).ok()?;
                Some(format_top_move(i + 1, mv, scored.score))
            })
            .collect();

        Ok(Analysis {
            best,
            score,
            evaluation: describe(score),
            top_moves,
        })
    }

    /// Play the engine's move. `None` when the game is over or the engine
    /// has no usable move.
    pub fn play_engine_move(&mut self) -> Result<Option<MoveRecord>, SessionError> {
        if self.rules.is_game_over() {
            return Ok(None);
        }
        let fen = self.rules.position_string();
        self.search.set_position(&fen)?;
        self.search.set_thinking_budget(self.thinking_seconds);
        let best = self.search.best_move()?;

        let Some(mv) = self.legal_decoded(best) else {
            warn!("No valid engine move");
            return Ok(None);
        };
        let Some(record) = self.try_move_with(mv.from, mv.to, mv.promotion) else {
            return Ok(None);
        };
        // The move just played stays marked on the new position
        self.highlight.highlight(&mut self.display, mv.from, mv.to);
        Ok(Some(record))
    }

    /// Let the engine play both sides, up to `max_moves` plies.
    pub fn auto_play(
        &mut self,
        max_moves: usize,
        delay: Duration,
    ) -> Result<Vec<MoveRecord>, SessionError> {
        let mut played = Vec::new();
        while played.len() < max_moves && !self.rules.is_game_over() {
            match self.play_engine_move()? {
                Some(record) => played.push(record),
                None => {
                    warn!("Auto-play stopped: engine made no move");
                    break;
                }
            }
            if !delay.is_zero() && played.len() < max_moves {
                thread::sleep(delay);
            }
        }
        info!(moves = played.len(), game_over = self.rules.is_game_over(), "Auto-play finished");
        Ok(played)
    }

    pub fn reset(&mut self) {
        self.rules.reset();
        self.position_changed();
        info!("New game");
    }

    /// `1. e4 e5 2. Nf3`
    pub fn move_history(&self) -> String {
        let sans: Vec<&str> = self.rules.history().iter().map(|r| r.san.as_str()).collect();
        transcript(&sans)
    }

    /// Save the current game; returns its index.
    pub fn save_game(&mut self) -> Result<usize, SessionError> {
        let record = GameRecord::new(self.rules.position_string(), self.move_history());
        Ok(self.store.save(record)?)
    }

    pub fn saved_games(&self) -> Vec<GameRecord> {
        self.store.list_all()
    }

    /// Restore a saved position into the rules engine, display and search engine.
    ///
    /// Rules engine, display, highlight and cache are already on the loaded
    /// position when the search engine is told about it.
    pub fn load_game(&mut self, index: usize) -> Result<GameRecord, SessionError> {
        let record = self.store.load(index)?;
        self.rules.load(&record.fen)?;
        self.position_changed();
        self.search.set_position(&record.fen)?;
        info!(index, fen = %record.fen, "Game loaded");
        Ok(record)
    }
}
