//! Wave progression: per-wave configuration, the preparing/spawning/fighting/
//! completed state machine and the spawn pacing policy.

use serde::{Deserialize, Serialize};

use crate::boss::BossConfig;
use crate::config::SpawnConfig;
use crate::difficulty::Difficulty;
use crate::enemy::EnemyKind;

/// Every fifth wave is a boss wave.
pub const BOSS_WAVE_INTERVAL: u32 = 5;
/// Preparation frames before a wave starts spawning.
pub const WAVE_START_DELAY: u32 = 120;
/// Preparation frames set when advancing to the next wave.
pub const NEXT_WAVE_DELAY: u32 = 180;

pub fn is_boss_wave(wave: u32) -> bool {
    wave % BOSS_WAVE_INTERVAL == 0
}

/// Enemy kinds that may appear in a regular wave.
pub fn enemy_pool(wave: u32) -> &'static [EnemyKind] {
    use EnemyKind::*;
    match wave {
        0..=2 => &[Red],
        3..=4 => &[Red, Purple],
        5..=7 => &[Red, Purple, Yellow],
        _ => &[Red, Purple, Yellow, Elite],
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WaveKind {
    Normal { pool: &'static [EnemyKind] },
    Boss(BossConfig),
}

/// Static description of one wave before difficulty scaling.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveConfig {
    pub kind: WaveKind,
    pub enemy_count: u32,
    /// Frames between timed spawn batches.
    pub spawn_rate: u32,
}

pub fn wave_config(wave: u32) -> WaveConfig {
    if is_boss_wave(wave) {
        return WaveConfig {
            kind: WaveKind::Boss(BossConfig::for_wave(wave)),
            enemy_count: 1,
            spawn_rate: 60,
        };
    }
    WaveConfig {
        kind: WaveKind::Normal {
            pool: enemy_pool(wave),
        },
        enemy_count: 10 + wave.saturating_sub(1) * 3,
        spawn_rate: 60u32.saturating_sub(wave * 2).max(30),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WavePhase {
    #[default]
    Preparing,
    Spawning,
    Fighting,
    Completed,
}

/// What a director tick produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveTick {
    /// Nothing changed.
    Idle,
    /// The preparation countdown finished this frame.
    ReadyToSpawn,
}

/// Snapshot for HUD display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveProgress {
    pub wave: u32,
    pub killed: u32,
    pub total: u32,
    pub phase: WavePhase,
    pub is_boss_wave: bool,
}

/// Change to the last-enemy phase requested by [`WaveDirector::last_enemy_transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastEnemyChange {
    Enter,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveDirector {
    current_wave: u32,
    enemies_in_wave: u32,
    enemies_killed: u32,
    phase: WavePhase,
    wave_timer: u32,
    spawn_timer: u32,
    last_enemy_active: bool,
}

impl Default for WaveDirector {
    fn default() -> Self {
        Self {
            current_wave: 1,
            enemies_in_wave: 0,
            enemies_killed: 0,
            phase: WavePhase::Preparing,
            wave_timer: 0,
            spawn_timer: 0,
            last_enemy_active: false,
        }
    }
}

impl WaveDirector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_wave(&self) -> u32 {
        self.current_wave
    }

    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    pub fn wave_timer(&self) -> u32 {
        self.wave_timer
    }

    pub fn enemies_in_wave(&self) -> u32 {
        self.enemies_in_wave
    }

    pub fn enemies_killed(&self) -> u32 {
        self.enemies_killed
    }

    pub fn is_last_enemy_active(&self) -> bool {
        self.last_enemy_active
    }

    pub fn config(&self) -> WaveConfig {
        wave_config(self.current_wave)
    }

    /// Enter `Preparing` for the current wave. Boss waves always target one kill;
    /// regular waves scale by the difficulty's enemy-count multiplier.
    pub fn start_wave(&mut self, difficulty: &Difficulty) -> WaveConfig {
        self.prepare(difficulty, WAVE_START_DELAY)
    }

    /// Advance to the next wave and start it after the longer break.
    pub fn next_wave(&mut self, difficulty: &Difficulty) -> WaveConfig {
        self.current_wave += 1;
        self.prepare(difficulty, NEXT_WAVE_DELAY)
    }

    fn prepare(&mut self, difficulty: &Difficulty, delay: u32) -> WaveConfig {
        let config = self.config();
        self.enemies_killed = 0;
        self.phase = WavePhase::Preparing;
        self.wave_timer = delay;
        self.spawn_timer = 0;
        self.enemies_in_wave = match config.kind {
            WaveKind::Boss(_) => config.enemy_count,
            WaveKind::Normal { .. } => difficulty.adjust_enemy_count(config.enemy_count),
        };
        config
    }

    /// Count down the preparation timer.
    pub fn update(&mut self) -> WaveTick {
        if self.phase != WavePhase::Preparing {
            return WaveTick::Idle;
        }
        self.wave_timer = self.wave_timer.saturating_sub(1);
        if self.wave_timer == 0 {
            self.phase = WavePhase::Spawning;
            return WaveTick::ReadyToSpawn;
        }
        WaveTick::Idle
    }

    /// The boss is on the field; spawning is over for this wave.
    pub fn mark_fighting(&mut self) {
        if self.phase == WavePhase::Spawning {
            self.phase = WavePhase::Fighting;
        }
    }

    /// Record a kill. Enters `Completed` once the target is met.
    pub fn on_enemy_killed(&mut self) {
        if self.phase == WavePhase::Completed {
            return;
        }
        self.enemies_killed += 1;
        if self.enemies_killed >= self.enemies_in_wave {
            self.phase = WavePhase::Completed;
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, WavePhase::Spawning | WavePhase::Fighting)
    }

    /// Kills still needed to finish the wave.
    pub fn remaining_to_kill(&self) -> u32 {
        self.enemies_in_wave.saturating_sub(self.enemies_killed)
    }

    /// Enemies not yet spawned, given how many are alive.
    pub fn remaining_to_spawn(&self, active: u32) -> u32 {
        self.enemies_in_wave
            .saturating_sub(self.enemies_killed + active)
    }

    /// Decide the last-enemy phase for this frame.
    pub fn last_enemy_transition(&mut self, active: u32, spawn: &SpawnConfig) -> Option<LastEnemyChange> {
        if self.remaining_to_kill() <= spawn.last_enemy_threshold {
            if !self.last_enemy_active {
                self.last_enemy_active = true;
                return Some(LastEnemyChange::Enter);
            }
        } else if self.last_enemy_active {
            self.last_enemy_active = false;
            return Some(LastEnemyChange::Exit);
        }
        if self.remaining_to_spawn(active) == 0 && active == 0 && self.last_enemy_active {
            self.last_enemy_active = false;
            return Some(LastEnemyChange::Exit);
        }
        None
    }

    /// Force the last-enemy phase off. Returns whether it was active.
    pub fn exit_last_enemy(&mut self) -> bool {
        std::mem::take(&mut self.last_enemy_active)
    }

    /// How many enemies to spawn this frame given `active` live enemies.
    pub fn spawn_plan(&mut self, active: u32, spawn: &SpawnConfig) -> u32 {
        let remaining = self.remaining_to_spawn(active);
        if remaining == 0 {
            return 0;
        }
        let target_active = spawn.min_active_enemies.min(self.remaining_to_kill());
        let deficit = target_active.saturating_sub(active);
        if deficit > 0 {
            self.spawn_timer = 0;
            return deficit.max(1).min(remaining).min(spawn.max_simultaneous_spawn);
        }
        self.spawn_timer += 1;
        if self.spawn_timer > self.config().spawn_rate {
            self.spawn_timer = 0;
            return spawn.max_simultaneous_spawn.min(remaining);
        }
        0
    }

    /// Whether spawns this frame should arrive already buffed.
    pub fn spawns_buffed(&self, spawn: &SpawnConfig) -> bool {
        self.last_enemy_active || self.remaining_to_kill() <= spawn.last_enemy_threshold
    }

    pub fn progress(&self) -> WaveProgress {
        WaveProgress {
            wave: self.current_wave,
            killed: self.enemies_killed,
            total: self.enemies_in_wave,
            phase: self.phase,
            is_boss_wave: is_boss_wave(self.current_wave),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::DifficultyTier;

    fn started(tier: DifficultyTier) -> WaveDirector {
        let mut d = WaveDirector::new();
        d.start_wave(&Difficulty::new(tier));
        d
    }

    #[test]
    fn wave_targets() {
        assert_eq!(wave_config(1).enemy_count, 10);
        assert_eq!(wave_config(4).enemy_count, 19);
        assert_eq!(wave_config(5).enemy_count, 1);
        assert_eq!(wave_config(1).spawn_rate, 58);
        assert_eq!(wave_config(20).spawn_rate, 60);
        assert_eq!(wave_config(16).spawn_rate, 30);
        assert!(matches!(wave_config(10).kind, WaveKind::Boss(_)));
    }

    #[test]
    fn enemy_pools_by_wave() {
        assert_eq!(enemy_pool(2), &[EnemyKind::Red]);
        assert_eq!(enemy_pool(4).len(), 2);
        assert_eq!(enemy_pool(7).len(), 3);
        assert!(enemy_pool(8).contains(&EnemyKind::Elite));
    }

    #[test]
    fn hard_scales_normal_waves_only() {
        let d = started(DifficultyTier::Hard);
        assert_eq!(d.enemies_in_wave(), 13);

        let mut boss = WaveDirector {
            current_wave: 5,
            ..WaveDirector::new()
        };
        boss.start_wave(&Difficulty::new(DifficultyTier::Hard));
        assert_eq!(boss.enemies_in_wave(), 1);
    }

    #[test]
    fn preparing_counts_down_to_spawning() {
        let mut d = started(DifficultyTier::Normal);
        assert_eq!(d.phase(), WavePhase::Preparing);
        for _ in 0..119 {
            assert_eq!(d.update(), WaveTick::Idle);
        }
        assert_eq!(d.update(), WaveTick::ReadyToSpawn);
        assert_eq!(d.phase(), WavePhase::Spawning);
        assert_eq!(d.update(), WaveTick::Idle);
    }

    #[test]
    fn kills_complete_wave() {
        let mut d = started(DifficultyTier::Normal);
        while d.update() != WaveTick::ReadyToSpawn {}
        for _ in 0..9 {
            d.on_enemy_killed();
            assert_ne!(d.phase(), WavePhase::Completed);
        }
        d.on_enemy_killed();
        assert_eq!(d.phase(), WavePhase::Completed);
        assert_eq!(d.progress().killed, 10);
    }

    #[test]
    fn next_wave_resets_counters() {
        let mut d = started(DifficultyTier::Normal);
        for _ in 0..10 {
            d.on_enemy_killed();
        }
        d.next_wave(&Difficulty::default());
        let p = d.progress();
        assert_eq!(p.wave, 2);
        assert_eq!(p.killed, 0);
        assert_eq!(p.total, 13);
        assert_eq!(p.phase, WavePhase::Preparing);
        assert_eq!(d.wave_timer(), NEXT_WAVE_DELAY);
    }

    #[test]
    fn deficit_spawns_immediately() {
        let spawn = SpawnConfig::default();
        let mut d = started(DifficultyTier::Normal);
        while d.update() != WaveTick::ReadyToSpawn {}
        assert_eq!(d.spawn_plan(0, &spawn), 3);
        assert_eq!(d.spawn_plan(1, &spawn), 2);
        assert_eq!(d.spawn_plan(3, &spawn), 0);
    }

    #[test]
    fn timed_batch_after_spawn_rate() {
        let spawn = SpawnConfig::default();
        let mut d = started(DifficultyTier::Normal);
        while d.update() != WaveTick::ReadyToSpawn {}
        let rate = d.config().spawn_rate;
        for _ in 0..rate {
            assert_eq!(d.spawn_plan(3, &spawn), 0);
        }
        assert_eq!(d.spawn_plan(3, &spawn), 3);
    }

    #[test]
    fn never_spawns_past_target() {
        let spawn = SpawnConfig::default();
        let mut d = started(DifficultyTier::Normal);
        for _ in 0..8 {
            d.on_enemy_killed();
        }
        // two left to kill, one alive: one more to spawn at most
        assert_eq!(d.spawn_plan(1, &spawn), 1);
        assert_eq!(d.spawn_plan(2, &spawn), 0);
    }

    #[test]
    fn last_enemy_phase_enters_and_exits() {
        let spawn = SpawnConfig::default();
        let mut d = started(DifficultyTier::Normal);
        assert_eq!(d.last_enemy_transition(3, &spawn), None);
        for _ in 0..8 {
            d.on_enemy_killed();
        }
        assert_eq!(d.last_enemy_transition(2, &spawn), Some(LastEnemyChange::Enter));
        assert_eq!(d.last_enemy_transition(2, &spawn), None);
        assert!(d.spawns_buffed(&spawn));
        assert!(d.exit_last_enemy());
        assert!(!d.exit_last_enemy());
    }

    #[test]
    fn last_enemy_exits_on_fresh_wave() {
        let spawn = SpawnConfig::default();
        let mut d = started(DifficultyTier::Normal);
        for _ in 0..9 {
            d.on_enemy_killed();
        }
        assert_eq!(d.last_enemy_transition(1, &spawn), Some(LastEnemyChange::Enter));
        d.next_wave(&Difficulty::default());
        assert_eq!(d.last_enemy_transition(0, &spawn), Some(LastEnemyChange::Exit));
        assert!(!d.is_last_enemy_active());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn normal_wave_target(wave in 1u32..200) {
                prop_assume!(!is_boss_wave(wave));
                let mut d = WaveDirector { current_wave: wave, ..WaveDirector::new() };
                d.start_wave(&Difficulty::default());
                prop_assert_eq!(d.enemies_in_wave(), 10 + (wave - 1) * 3);
            }

            #[test]
            fn spawn_plan_respects_caps(active in 0u32..10, kills in 0u32..10) {
                let spawn = SpawnConfig::default();
                let mut d = WaveDirector::new();
                d.start_wave(&Difficulty::default());
                for _ in 0..kills {
                    d.on_enemy_killed();
                }
                let remaining = d.remaining_to_spawn(active);
                let planned = d.spawn_plan(active, &spawn);
                prop_assert!(planned <= spawn.max_simultaneous_spawn);
                prop_assert!(planned <= remaining);
            }
        }
    }
}
