//! Ranking persistence seam
//!
//! Features:
//! - Versioned JSON envelope
//! - Host-provided raw storage behind [`RankingStore`]
//! - Corrupt or legacy data degrades to an empty ranking

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::highscores::{HighScores, RankEntry};

/// Current envelope version
pub const ENVELOPE_VERSION: u32 = 1;

/// Storage failure reported by a [`RankingStore`]
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Raw key-value storage provided by the host (local storage, a file, ...)
pub trait RankingStore {
    /// Stored text, or `None` if nothing was ever saved
    fn load_raw(&self) -> Result<Option<String>, StoreError>;
    fn save_raw(&mut self, data: &str) -> Result<(), StoreError>;
}

/// On-disk shape of the ranking
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: u32,
    entries: Vec<RankEntry>,
}

/// Decode a stored ranking, falling back to empty on anything unexpected
pub fn decode(raw: &str) -> HighScores {
    match serde_json::from_str::<Envelope>(raw) {
        Ok(envelope) if envelope.version == ENVELOPE_VERSION => {
            let mut scores = HighScores {
                entries: envelope.entries,
            };
            scores.normalize();
            scores
        }
        Ok(envelope) => {
            log::warn!("Unknown ranking version {}, starting fresh", envelope.version);
            HighScores::new()
        }
        Err(e) => {
            log::warn!("Discarding unreadable ranking: {}", e);
            HighScores::new()
        }
    }
}

pub fn encode(scores: &HighScores) -> Result<String, StoreError> {
    let envelope = Envelope {
        version: ENVELOPE_VERSION,
        entries: scores.entries.clone(),
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Load the ranking from `store`
pub fn load<S: RankingStore + ?Sized>(store: &S) -> HighScores {
    match store.load_raw() {
        Ok(Some(raw)) => {
            let scores = decode(&raw);
            log::info!("Loaded {} ranking entries", scores.entries.len());
            scores
        }
        Ok(None) => {
            log::info!("No ranking found, starting fresh");
            HighScores::new()
        }
        Err(e) => {
            log::warn!("Ranking store unavailable: {}", e);
            HighScores::new()
        }
    }
}

/// Record a finished stage run and persist the ranking.
///
/// Returns the updated ranking. A failed write is logged and the in-memory
/// ranking is still returned.
pub fn record_stage_run<S: RankingStore + ?Sized>(
    store: &mut S,
    stage: u32,
    timestamp: f64,
) -> Vec<RankEntry> {
    let mut scores = load(store);
    scores.add(stage, timestamp);

    let saved = encode(&scores).and_then(|raw| store.save_raw(&raw));
    match saved {
        Ok(()) => log::info!("Ranking saved ({} entries)", scores.entries.len()),
        Err(e) => log::warn!("Failed to save ranking: {}", e),
    }
    scores.entries
}

/// In-memory store, for hosts without storage and for tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub data: Option<String>,
}

impl RankingStore for MemoryStore {
    fn load_raw(&self) -> Result<Option<String>, StoreError> {
        Ok(self.data.clone())
    }

    fn save_raw(&mut self, data: &str) -> Result<(), StoreError> {
        self.data = Some(data.to_owned());
        Ok(())
    }
}
