//! Cumulative statistics that outlive a run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use starfall_core::store::{self, KeyValueStore, StoreError};

use crate::session::SessionStats;

/// Lifetime totals across every finished run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileStats {
    pub total_kills: u64,
    pub total_play_time_ms: u64,
    pub games_played: u32,
    pub total_deaths: u32,
    pub total_damage_taken: u64,
    pub total_powerups: u64,
    pub max_score: u64,
    pub max_combo: u32,
    pub red_kills: u64,
    pub purple_kills: u64,
    pub yellow_kills: u64,
    pub rapid_kills: u64,
    pub three_way_kills: u64,
    pub reached_multiplier_10: bool,
    pub all_powerups_in_one_game: bool,
    /// Cleared runs per difficulty key.
    pub total_clears: BTreeMap<String, u32>,
    pub high_scores: BTreeMap<String, u64>,
    /// Highest wave reached per difficulty key.
    pub max_waves: BTreeMap<String, u32>,
}

impl ProfileStats {
    pub const STORE_KEY: &'static str = "profile_stats";

    pub fn load<S: KeyValueStore + ?Sized>(kv: &mut S) -> Self {
        store::load_or_default(kv, Self::STORE_KEY)
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, kv: &mut S) -> Result<(), StoreError> {
        store::save(kv, Self::STORE_KEY, self)
    }

    /// Fold a finished session into the totals.
    pub fn absorb(&mut self, session: &SessionStats, cleared: bool) {
        self.total_kills += u64::from(session.kills);
        self.total_play_time_ms += session.duration_ms;
        self.games_played += 1;
        if !cleared {
            self.total_deaths += 1;
        }
        self.total_damage_taken += session.damage_taken;
        self.total_powerups += u64::from(session.powerups_collected);
        self.max_score = self.max_score.max(session.score);
        self.max_combo = self.max_combo.max(session.max_combo);
        self.red_kills += u64::from(session.red_kills);
        self.purple_kills += u64::from(session.purple_kills);
        self.yellow_kills += u64::from(session.yellow_kills);
        self.rapid_kills += u64::from(session.rapid_kills);
        self.three_way_kills += u64::from(session.three_way_kills);
        self.reached_multiplier_10 |= session.reached_max_multiplier();
        self.all_powerups_in_one_game |= session.collected_every_powerup();

        let diff = session.difficulty.as_str();
        if cleared {
            *self.total_clears.entry(diff.to_string()).or_default() += 1;
        }
        let best = self.high_scores.entry(diff.to_string()).or_default();
        *best = (*best).max(session.score);
        let wave = self.max_waves.entry(diff.to_string()).or_default();
        *wave = (*wave).max(session.wave_reached);
    }

    pub fn play_time_seconds(&self) -> u64 {
        self.total_play_time_ms / 1000
    }

    pub fn clears(&self, difficulty: &str) -> u32 {
        self.total_clears.get(difficulty).copied().unwrap_or(0)
    }

    pub fn high_score(&self, difficulty: &str) -> u64 {
        self.high_scores.get(difficulty).copied().unwrap_or(0)
    }
}

/// Best wave and score for one difficulty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyRecord {
    pub max_wave: u32,
    pub high_score: u64,
}

/// Per-difficulty records keyed by tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DifficultyRecords(BTreeMap<String, DifficultyRecord>);

impl Default for DifficultyRecords {
    fn default() -> Self {
        Self(
            ["easy", "normal", "hard"]
                .into_iter()
                .map(|k| (k.to_string(), DifficultyRecord::default()))
                .collect(),
        )
    }
}

impl DifficultyRecords {
    pub const STORE_KEY: &'static str = "difficulty_records";

    pub fn load<S: KeyValueStore + ?Sized>(kv: &mut S) -> Self {
        store::load_or_default(kv, Self::STORE_KEY)
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, kv: &mut S) -> Result<(), StoreError> {
        store::save(kv, Self::STORE_KEY, self)
    }

    pub fn get(&self, difficulty: &str) -> DifficultyRecord {
        self.0.get(difficulty).copied().unwrap_or_default()
    }

    /// Raise the record for `difficulty`. Returns whether anything improved.
    pub fn update(&mut self, difficulty: &str, wave: u32, score: u64) -> bool {
        let record = self.0.entry(difficulty.to_string()).or_default();
        let mut updated = false;
        if wave > record.max_wave {
            record.max_wave = wave;
            updated = true;
        }
        if score > record.high_score {
            record.high_score = score;
            updated = true;
        }
        updated
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DifficultyRecord)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use starfall_core::store::MemoryStore;

    use super::*;

    fn session(difficulty: &str, score: u64, wave: u32, kills: u32) -> SessionStats {
        SessionStats {
            score,
            wave_reached: wave,
            kills,
            duration_ms: 61_500,
            ..SessionStats::new(difficulty, "fighter")
        }
    }

    #[test]
    fn absorb_accumulates_totals() {
        let mut p = ProfileStats::default();
        p.absorb(&session("hard", 700, 4, 30), false);
        p.absorb(&session("hard", 300, 6, 12), true);
        assert_eq!(p.total_kills, 42);
        assert_eq!(p.games_played, 2);
        assert_eq!(p.total_deaths, 1);
        assert_eq!(p.clears("hard"), 1);
        assert_eq!(p.clears("easy"), 0);
        assert_eq!(p.high_score("hard"), 700);
        assert_eq!(p.max_waves.get("hard"), Some(&6));
        assert_eq!(p.max_score, 700);
        assert_eq!(p.play_time_seconds(), 123);
    }

    #[test]
    fn records_only_move_upward() {
        let mut r = DifficultyRecords::default();
        assert!(r.update("normal", 4, 900));
        assert!(!r.update("normal", 3, 500));
        assert!(r.update("normal", 3, 1200));
        assert_eq!(
            r.get("normal"),
            DifficultyRecord {
                max_wave: 4,
                high_score: 1200
            }
        );
        assert_eq!(r.get("hard"), DifficultyRecord::default());
    }

    #[test]
    fn default_records_list_every_tier() {
        let records = DifficultyRecords::default();
        let keys: Vec<&str> = records.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["easy", "hard", "normal"]);
    }

    #[test]
    fn profile_roundtrips_through_store() {
        let mut kv = MemoryStore::new();
        let mut p = ProfileStats::default();
        p.absorb(&session("easy", 150, 2, 9), false);
        p.save(&mut kv).unwrap();
        assert_eq!(ProfileStats::load(&mut kv), p);

        let mut r = DifficultyRecords::default();
        r.update("easy", 1, 150);
        r.save(&mut kv).unwrap();
        assert_eq!(DifficultyRecords::load(&mut kv), r);
    }

    #[test]
    fn partial_profile_defaults_missing_fields() {
        let mut kv = MemoryStore::new();
        kv.set(ProfileStats::STORE_KEY, r#"{"total_kills":12,"high_scores":{"hard":40}}"#.into())
            .unwrap();
        let p = ProfileStats::load(&mut kv);
        assert_eq!(p.total_kills, 12);
        assert_eq!(p.high_score("hard"), 40);
        assert_eq!(p.games_played, 0);
    }

    #[test]
    fn corrupt_records_reset_to_defaults() {
        let mut kv = MemoryStore::new();
        kv.set(DifficultyRecords::STORE_KEY, "[1,2".into()).unwrap();
        assert_eq!(DifficultyRecords::load(&mut kv), DifficultyRecords::default());
        assert!(kv.get(DifficultyRecords::STORE_KEY).is_none());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn record_is_running_maximum(runs in prop::collection::vec((0u32..30, 0u64..10_000), 1..20)) {
                let mut r = DifficultyRecords::default();
                for (wave, score) in &runs {
                    r.update("hard", *wave, *score);
                }
                let rec = r.get("hard");
                prop_assert_eq!(rec.max_wave, runs.iter().map(|(w, _)| *w).max().unwrap_or(0));
                prop_assert_eq!(rec.high_score, runs.iter().map(|(_, s)| *s).max().unwrap_or(0));
            }
        }
    }
}
