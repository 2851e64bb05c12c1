use starfall_core::events::{EnemyTag, FireMode, PowerUpKind, ProgressionRecorder};
use starfall_core::store::{KeyValueStore, StoreError};

use crate::achievements::{AchievementBook, AchievementProgress, MilestoneCatalog, ProgressView};
use crate::profile::{DifficultyRecords, ProfileStats};
use crate::session::SessionStats;

/// Recorder that tracks the live session and folds it into the persistent
/// profile when the run ends.
///
/// Nothing is written during play; call [`StatsRecorder::save`] after a run.
#[derive(Debug, Clone, Default)]
pub struct StatsRecorder {
    catalog: MilestoneCatalog,
    profile: ProfileStats,
    records: DifficultyRecords,
    book: AchievementBook,
    session: SessionStats,
    last_run: Option<SessionStats>,
    new_unlocks: Vec<String>,
}

impl StatsRecorder {
    pub fn new(catalog: MilestoneCatalog) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    /// Restore profile, records and unlocks from the store.
    pub fn load<S: KeyValueStore + ?Sized>(kv: &mut S, catalog: MilestoneCatalog) -> Self {
        Self {
            catalog,
            profile: ProfileStats::load(kv),
            records: DifficultyRecords::load(kv),
            book: AchievementBook::load(kv),
            ..Self::default()
        }
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, kv: &mut S) -> Result<(), StoreError> {
        self.profile.save(kv)?;
        self.records.save(kv)?;
        self.book.save(kv)
    }

    pub fn session(&self) -> &SessionStats {
        &self.session
    }

    /// Stats of the most recently finished run.
    pub fn last_run(&self) -> Option<&SessionStats> {
        self.last_run.as_ref()
    }

    pub fn profile(&self) -> &ProfileStats {
        &self.profile
    }

    pub fn records(&self) -> &DifficultyRecords {
        &self.records
    }

    pub fn book(&self) -> &AchievementBook {
        &self.book
    }

    pub fn catalog(&self) -> &MilestoneCatalog {
        &self.catalog
    }

    pub fn progress(&self) -> AchievementProgress {
        self.book.progress(&self.catalog.milestones)
    }

    /// Achievements unlocked since the last call.
    pub fn take_new_unlocks(&mut self) -> Vec<String> {
        std::mem::take(&mut self.new_unlocks)
    }

    /// Evaluate the catalog against the current profile.
    pub fn check_achievements(&mut self) -> Vec<String> {
        let view = ProgressView {
            profile: &self.profile,
            records: &self.records,
        };
        let fresh = self.book.check(&self.catalog.milestones, &view);
        for id in &fresh {
            let title = self.catalog.get(id).map_or(id.as_str(), |m| m.name.as_str());
            tracing::info!(id = %id, title, "Achievement unlocked");
        }
        self.new_unlocks.extend(fresh.iter().cloned());
        fresh
    }
}

impl ProgressionRecorder for StatsRecorder {
    fn on_shot_fired(&mut self) {
        self.session.shots_fired += 1;
    }

    fn on_kill(&mut self, enemy: EnemyTag, fire_mode: FireMode) {
        self.session.record_kill(enemy, fire_mode);
    }

    fn on_powerup_collected(&mut self, kind: PowerUpKind) {
        self.session.record_powerup(kind);
    }

    fn on_combo(&mut self, count: u32) {
        self.session.record_combo(count);
    }

    fn on_damage(&mut self, amount: u32, player_damage: bool) {
        self.session.record_damage(amount, player_damage);
    }

    fn on_hp_sample(&mut self, hp: i32) {
        self.session.record_hp(hp);
    }

    fn on_score(&mut self, score: u64) {
        self.session.score = score;
    }

    fn on_wave_reached(&mut self, wave: u32) {
        self.session.record_wave(wave);
    }

    fn on_run_start(&mut self, difficulty: &str, character: &str) {
        self.session = SessionStats::new(difficulty, character);
    }

    fn on_run_end(&mut self, cleared: bool, final_wave: u32, final_score: u64, duration_ms: u64) {
        let mut session = std::mem::take(&mut self.session);
        session.score = final_score;
        session.wave_reached = final_wave;
        session.duration_ms = duration_ms;

        self.profile.absorb(&session, cleared);
        // A lost run has not finished the wave it died on.
        let recorded_wave = if cleared {
            final_wave
        } else {
            final_wave.saturating_sub(1)
        };
        self.records.update(&session.difficulty, recorded_wave, final_score);

        tracing::info!(
            difficulty = %session.difficulty,
            cleared,
            wave = final_wave,
            score = final_score,
            accuracy = session.accuracy(),
            "Run recorded"
        );
        self.last_run = Some(session);
        self.check_achievements();
    }
}
