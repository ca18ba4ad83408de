//! Leaderboard and best score
//!
//! Persisted through a `KeyValueStore`, tracks the top 10 named scores.
//! A missing or corrupt store reads as an empty leaderboard.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, load_json, save_json};

/// Maximum number of leaderboard entries to keep
pub const MAX_ENTRIES: usize = 10;

/// Name used when the player submits a blank one
pub const DEFAULT_NAME: &str = "Pirate";

/// Longest name kept (in characters)
pub const MAX_NAME_CHARS: usize = 16;

const LEADERBOARD_KEY: &str = "poppies_leaderboard";
const BEST_SCORE_KEY: &str = "poppies_high_score";

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u64,
}

/// Leaderboard, best first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Check if a score would make it onto the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if self.entries.len() < MAX_ENTRIES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Insert a score, keep best-first order and the size cap
    ///
    /// Returns the rank achieved (1-indexed) or None if it fell off the end.
    /// Equal scores keep their arrival order.
    pub fn insert(&mut self, name: &str, score: u64) -> Option<usize> {
        let entry = LeaderboardEntry {
            name: clean_name(name),
            score,
        };

        let pos = self
            .entries
            .iter()
            .position(|e| score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_ENTRIES);

        (pos < MAX_ENTRIES).then_some(pos + 1)
    }

    /// Load from the store; anything unreadable becomes an empty board
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match load_json::<Vec<LeaderboardEntry>>(store, LEADERBOARD_KEY) {
            Ok(Some(mut entries)) => {
                entries.sort_by(|a, b| b.score.cmp(&a.score));
                entries.truncate(MAX_ENTRIES);
                log::info!("Loaded {} leaderboard entries", entries.len());
                Self { entries }
            }
            Ok(None) => {
                log::info!("No leaderboard found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("Leaderboard unreadable, starting fresh: {e}");
                Self::new()
            }
        }
    }

    /// Write to the store; failures are logged and otherwise ignored
    pub fn save(&self, store: &mut dyn KeyValueStore) {
        match save_json(store, LEADERBOARD_KEY, &self.entries) {
            Ok(()) => log::info!("Leaderboard saved ({} entries)", self.entries.len()),
            Err(e) => log::warn!("Failed to save leaderboard: {e}"),
        }
    }

    /// Load, insert, persist and return the updated leaderboard
    pub fn add(store: &mut dyn KeyValueStore, name: &str, score: u64) -> Self {
        let mut board = Self::load(store);
        board.insert(name, score);
        board.save(store);
        board
    }
}

/// Trim whitespace, fall back to the default name, cap the length
fn clean_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        trimmed.chars().take(MAX_NAME_CHARS).collect()
    }
}

/// Best score ever reached, 0 if nothing is stored
pub fn load_best_score(store: &dyn KeyValueStore) -> u64 {
    match load_json::<u64>(store, BEST_SCORE_KEY) {
        Ok(best) => best.unwrap_or(0),
        Err(e) => {
            log::warn!("Best score unreadable: {e}");
            0
        }
    }
}

/// Persist the best score if `score` beats the stored one
pub fn save_best_score(store: &mut dyn KeyValueStore, score: u64) {
    if score <= load_best_score(store) {
        return;
    }
    if let Err(e) = save_json(store, BEST_SCORE_KEY, &score) {
        log::warn!("Failed to save best score: {e}");
    }
}
