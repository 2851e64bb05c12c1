use serde::{Deserialize, Serialize};

/// Enemy classification carried on kill events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyTag {
    Red,
    Purple,
    Yellow,
    Elite,
    Boss,
}

/// Player firing mode at the moment of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FireMode {
    #[default]
    Normal,
    Rapid,
    ThreeWay,
}

/// Collectible power-up kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    Rapid,
    ThreeWay,
    Shield,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [PowerUpKind::Rapid, PowerUpKind::ThreeWay, PowerUpKind::Shield];
}

/// Gameplay facts emitted by a simulation for progression tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ProgressEvent {
    /// One projectile left the player's ship.
    ShotFired,
    Kill {
        enemy: EnemyTag,
        fire_mode: FireMode,
    },
    PowerupCollected(PowerUpKind),
    /// Combo count after a kill.
    ComboReached(u32),
    /// `player_damage` is true when the player took the hit.
    Damage {
        amount: u32,
        player_damage: bool,
    },
    HpSample(i32),
    ScoreUpdate(u64),
    WaveReached(u32),
    RunStart {
        difficulty: String,
        character: String,
    },
    RunEnd {
        cleared: bool,
        final_wave: u32,
        final_score: u64,
        duration_ms: u64,
    },
}

/// Consumer of [`ProgressEvent`]s.
///
/// Every method has a no-op default, so recorders only override what they track.
pub trait ProgressionRecorder {
    fn on_shot_fired(&mut self) {}

    fn on_kill(&mut self, _enemy: EnemyTag, _fire_mode: FireMode) {}

    fn on_powerup_collected(&mut self, _kind: PowerUpKind) {}

    fn on_combo(&mut self, _count: u32) {}

    fn on_damage(&mut self, _amount: u32, _player_damage: bool) {}

    fn on_hp_sample(&mut self, _hp: i32) {}

    fn on_score(&mut self, _score: u64) {}

    fn on_wave_reached(&mut self, _wave: u32) {}

    fn on_run_start(&mut self, _difficulty: &str, _character: &str) {}

    fn on_run_end(&mut self, _cleared: bool, _final_wave: u32, _final_score: u64, _duration_ms: u64) {}

    /// Dispatch one event to the matching `on_*` method.
    fn record(&mut self, event: &ProgressEvent) {
        match event {
            ProgressEvent::ShotFired => self.on_shot_fired(),
            ProgressEvent::Kill { enemy, fire_mode } => self.on_kill(*enemy, *fire_mode),
            ProgressEvent::PowerupCollected(kind) => self.on_powerup_collected(*kind),
            ProgressEvent::ComboReached(n) => self.on_combo(*n),
            ProgressEvent::Damage {
                amount,
                player_damage,
            } => self.on_damage(*amount, *player_damage),
            ProgressEvent::HpSample(hp) => self.on_hp_sample(*hp),
            ProgressEvent::ScoreUpdate(score) => self.on_score(*score),
            ProgressEvent::WaveReached(wave) => self.on_wave_reached(*wave),
            ProgressEvent::RunStart {
                difficulty,
                character,
            } => self.on_run_start(difficulty, character),
            ProgressEvent::RunEnd {
                cleared,
                final_wave,
                final_score,
                duration_ms,
            } => self.on_run_end(*cleared, *final_wave, *final_score, *duration_ms),
        }
    }
}

/// Recorder that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRecorder;

impl ProgressionRecorder for NullRecorder {}
