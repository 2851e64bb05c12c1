use starfall_core::store::{self, KeyValueStore, StoreError};

const DIFFICULTY_KEY: &str = "selected_difficulty";
const HIGH_SCORE_KEY: &str = "high_score";

/// Start-screen selections kept between sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefs {
    pub difficulty: String,
    pub high_score: u64,
}

impl Prefs {
    pub fn load<S: KeyValueStore + ?Sized>(kv: &mut S) -> Self {
        let mut difficulty: String = store::load_or_default(kv, DIFFICULTY_KEY);
        if difficulty.is_empty() {
            difficulty = "normal".to_string();
        }
        Self {
            difficulty,
            high_score: store::load_or_default(kv, HIGH_SCORE_KEY),
        }
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, kv: &mut S) -> Result<(), StoreError> {
        store::save(kv, DIFFICULTY_KEY, &self.difficulty)?;
        store::save(kv, HIGH_SCORE_KEY, &self.high_score)
    }
}

#[cfg(test)]
mod tests {
    use starfall_core::store::MemoryStore;

    use super::*;

    #[test]
    fn empty_store_selects_normal() {
        let mut kv = MemoryStore::new();
        let prefs = Prefs::load(&mut kv);
        assert_eq!(prefs.difficulty, "normal");
        assert_eq!(prefs.high_score, 0);
    }

    #[test]
    fn prefs_roundtrip() {
        let mut kv = MemoryStore::new();
        let prefs = Prefs {
            difficulty: "hard".into(),
            high_score: 4200,
        };
        prefs.save(&mut kv).unwrap();
        assert_eq!(Prefs::load(&mut kv), prefs);
    }

    #[test]
    fn corrupt_high_score_resets() {
        let mut kv = MemoryStore::new();
        kv.set(HIGH_SCORE_KEY, "\"lots\"".into()).unwrap();
        assert_eq!(Prefs::load(&mut kv).high_score, 0);
    }
}
