use serde::{Deserialize, Serialize};
use starfall_core::events::{EnemyTag, FireMode, PowerUpKind};

/// HP the session's high/low watermarks start from.
const INITIAL_HP_MARK: i32 = 100;

/// Combo count at which the score multiplier reaches its cap.
pub const MAX_MULTIPLIER_COMBO: u32 = 10;

/// Statistics of the run in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionStats {
    pub difficulty: String,
    pub character: String,
    pub score: u64,
    pub wave_reached: u32,
    pub kills: u32,
    pub red_kills: u32,
    pub purple_kills: u32,
    pub yellow_kills: u32,
    pub rapid_kills: u32,
    pub three_way_kills: u32,
    pub shots_fired: u32,
    pub max_combo: u32,
    pub powerups_collected: u32,
    /// Distinct power-up kinds picked up this run.
    pub powerup_kinds: Vec<PowerUpKind>,
    pub damage_dealt: u64,
    pub damage_taken: u64,
    pub highest_hp: i32,
    pub lowest_hp: i32,
    pub duration_ms: u64,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self {
            difficulty: "normal".to_string(),
            character: "fighter".to_string(),
            score: 0,
            wave_reached: 0,
            kills: 0,
            red_kills: 0,
            purple_kills: 0,
            yellow_kills: 0,
            rapid_kills: 0,
            three_way_kills: 0,
            shots_fired: 0,
            max_combo: 0,
            powerups_collected: 0,
            powerup_kinds: Vec::new(),
            damage_dealt: 0,
            damage_taken: 0,
            highest_hp: INITIAL_HP_MARK,
            lowest_hp: INITIAL_HP_MARK,
            duration_ms: 0,
        }
    }
}

impl SessionStats {
    pub fn new(difficulty: &str, character: &str) -> Self {
        Self {
            difficulty: difficulty.to_string(),
            character: character.to_string(),
            ..Self::default()
        }
    }

    /// Kills per shot as a whole percentage; 0 before the first shot.
    pub fn accuracy(&self) -> u32 {
        if self.shots_fired == 0 {
            return 0;
        }
        (u64::from(self.kills) * 100 / u64::from(self.shots_fired)) as u32
    }

    pub fn record_kill(&mut self, enemy: EnemyTag, fire_mode: FireMode) {
        self.kills += 1;
        match enemy {
            EnemyTag::Red => self.red_kills += 1,
            EnemyTag::Purple => self.purple_kills += 1,
            EnemyTag::Yellow => self.yellow_kills += 1,
            EnemyTag::Elite | EnemyTag::Boss => {},
        }
        match fire_mode {
            FireMode::Rapid => self.rapid_kills += 1,
            FireMode::ThreeWay => self.three_way_kills += 1,
            FireMode::Normal => {},
        }
    }

    pub fn record_powerup(&mut self, kind: PowerUpKind) {
        self.powerups_collected += 1;
        if !self.powerup_kinds.contains(&kind) {
            self.powerup_kinds.push(kind);
        }
    }

    pub fn record_combo(&mut self, count: u32) {
        self.max_combo = self.max_combo.max(count);
    }

    pub fn record_damage(&mut self, amount: u32, player_damage: bool) {
        if player_damage {
            self.damage_taken += u64::from(amount);
        } else {
            self.damage_dealt += u64::from(amount);
        }
    }

    pub fn record_hp(&mut self, hp: i32) {
        self.highest_hp = self.highest_hp.max(hp);
        self.lowest_hp = self.lowest_hp.min(hp);
    }

    pub fn record_wave(&mut self, wave: u32) {
        self.wave_reached = self.wave_reached.max(wave);
    }

    pub fn reached_max_multiplier(&self) -> bool {
        self.max_combo >= MAX_MULTIPLIER_COMBO
    }

    pub fn collected_every_powerup(&self) -> bool {
        PowerUpKind::ALL.iter().all(|k| self.powerup_kinds.contains(k))
    }
}
