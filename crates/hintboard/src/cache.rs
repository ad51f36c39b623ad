//! Bounded cache of search results keyed by position.
//!
//! The session clears it whenever the position changes through a move,
//! reset or load. When full, the oldest entry is evicted.

use std::collections::{HashMap, VecDeque};

use hintboard_core::codec::PackedMove;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachedAnalysis {
    pub best_move: PackedMove,
    pub score: Option<i32>,
}

#[derive(Debug)]
pub struct PositionCache {
    capacity: usize,
    entries: HashMap<String, CachedAnalysis>,
    order: VecDeque<String>,
}

impl PositionCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub fn get(&self, fen: &str) -> Option<&CachedAnalysis> {
        self.entries.get(&normalize_fen(fen))
    }

    pub fn insert(&mut self, fen: &str, analysis: CachedAnalysis) {
        if self.capacity == 0 {
            return;
        }
        let key = normalize_fen(fen);
        if self.entries.insert(key.clone(), analysis).is_some() {
            return;
        }
        self.order.push_back(key);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Strips move counters from FEN, keeping only position + side + castling + ep.
pub fn normalize_fen(fen: &str) -> String {
    fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
}
