//! Stage ranking
//!
//! Keeps the deepest stages reached in stage mode, best first.

use serde::{Deserialize, Serialize};

/// Maximum number of runs to keep
pub const MAX_RANK_ENTRIES: usize = 5;

/// One finished stage run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankEntry {
    /// Stage reached (1-based)
    pub stage: u32,
    /// Unix timestamp (ms) supplied by the host
    pub timestamp: f64,
}

/// Stage ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<RankEntry>,
}

impl HighScores {
    /// Create an empty ranking
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a stage would make the ranking
    pub fn qualifies(&self, stage: u32) -> bool {
        if stage == 0 {
            return false;
        }
        if self.entries.len() < MAX_RANK_ENTRIES {
            return true;
        }
        self.entries.last().map(|e| stage > e.stage).unwrap_or(true)
    }

    /// Record a run. Returns the rank achieved (1-indexed) or None if it
    /// didn't qualify.
    pub fn add(&mut self, stage: u32, timestamp: f64) -> Option<usize> {
        if !self.qualifies(stage) {
            return None;
        }

        let entry = RankEntry { stage, timestamp };
        // Sorted descending; ties keep the older run first
        let rank = match self.entries.iter().position(|e| stage > e.stage) {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };
        self.entries.truncate(MAX_RANK_ENTRIES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deepest stage on record
    pub fn best_stage(&self) -> Option<u32> {
        self.entries.first().map(|e| e.stage)
    }

    /// Restore ordering and length after loading untrusted data
    pub(crate) fn normalize(&mut self) {
        self.entries.retain(|e| e.stage > 0);
        self.entries.sort_by(|a, b| b.stage.cmp(&a.stage));
        self.entries.truncate(MAX_RANK_ENTRIES);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_top_five_descending() {
        let mut scores = HighScores::new();
        for (i, stage) in [3, 7, 1, 9, 4, 6, 2].into_iter().enumerate() {
            scores.add(stage, i as f64);
        }
        let stages: Vec<u32> = scores.entries.iter().map(|e| e.stage).collect();
        assert_eq!(stages, vec![9, 7, 6, 4, 3]);
        assert_eq!(scores.best_stage(), Some(9));
    }

    #[test]
    fn test_rank_reporting() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add(4, 0.0), Some(1));
        assert_eq!(scores.add(6, 1.0), Some(1));
        assert_eq!(scores.add(4, 2.0), Some(3));
        assert_eq!(scores.add(0, 3.0), None);
    }

    #[test]
    fn test_full_board_rejects_shallow_runs() {
        let mut scores = HighScores::new();
        for stage in 5..10 {
            scores.add(stage, 0.0);
        }
        assert!(!scores.qualifies(5));
        assert_eq!(scores.add(2, 0.0), None);
        assert_eq!(scores.entries.len(), MAX_RANK_ENTRIES);
    }
}
