//! High score record
//!
//! A single integer persisted under a fixed key, read at startup and written
//! whenever the running score beats it.

use crate::persistence::KeyValueStore;

/// Persisted best score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HighScore {
    pub value: u64,
}

impl HighScore {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "cyberops_highscore";

    /// Load from storage; missing or unparsable values count as zero
    pub fn load(store: &impl KeyValueStore) -> Self {
        let value = store
            .get(Self::STORAGE_KEY)
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .unwrap_or(0);
        log::info!("High score loaded: {}", value);
        Self { value }
    }

    /// Record a running score. Persists and returns true only when it beats
    /// the current record.
    pub fn record(&mut self, score: u64, store: &mut impl KeyValueStore) -> bool {
        if score <= self.value {
            return false;
        }
        self.value = score;
        if let Err(e) = store.set(Self::STORAGE_KEY, &score.to_string()) {
            log::warn!("Failed to persist high score: {}", e);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_load_defaults_to_zero() {
        let store = MemoryStore::new();
        assert_eq!(HighScore::load(&store).value, 0);

        let mut garbage = MemoryStore::new();
        garbage.set(HighScore::STORAGE_KEY, "lots").unwrap();
        assert_eq!(HighScore::load(&garbage).value, 0);
    }

    #[test]
    fn test_higher_score_is_persisted() {
        let mut store = MemoryStore::new();
        store.set(HighScore::STORAGE_KEY, "1500").unwrap();
        let mut high = HighScore::load(&store);

        assert!(high.record(2000, &mut store));
        assert_eq!(high.value, 2000);
        assert_eq!(store.get(HighScore::STORAGE_KEY).as_deref(), Some("2000"));
        assert_eq!(HighScore::load(&store).value, 2000);
    }

    #[test]
    fn test_lower_or_equal_score_leaves_record() {
        let mut store = MemoryStore::new();
        store.set(HighScore::STORAGE_KEY, "1500").unwrap();
        let mut high = HighScore::load(&store);

        assert!(!high.record(1500, &mut store));
        assert!(!high.record(900, &mut store));
        assert_eq!(store.get(HighScore::STORAGE_KEY).as_deref(), Some("1500"));
    }
}
