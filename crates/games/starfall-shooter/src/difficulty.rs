use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ShooterError;

/// Difficulty tier selected on the start screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl DifficultyTier {
    pub const ALL: [DifficultyTier; 3] = [DifficultyTier::Easy, DifficultyTier::Normal, DifficultyTier::Hard];

    pub fn key(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
        }
    }

    pub fn config(self) -> &'static DifficultyConfig {
        match self {
            Self::Easy => &EASY,
            Self::Normal => &NORMAL,
            Self::Hard => &HARD,
        }
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DifficultyTier {
    type Err = ShooterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Self::Easy),
            "normal" => Ok(Self::Normal),
            "hard" => Ok(Self::Hard),
            other => Err(ShooterError::InvalidDifficultyTier(other.to_string())),
        }
    }
}

/// Immutable multipliers for one tier.
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyConfig {
    pub display_name: &'static str,
    /// CSS colour used by the start screen.
    pub color: &'static str,
    pub enemy_hp_multiplier: f64,
    pub bullet_speed_multiplier: f64,
    pub player_hp_multiplier: f64,
    pub item_drop_multiplier: f64,
    pub score_multiplier: f64,
    /// Absent on tiers that keep the base wave size.
    pub enemy_count_multiplier: Option<f64>,
}

static EASY: DifficultyConfig = DifficultyConfig {
    display_name: "EASY",
    color: "#4caf50",
    enemy_hp_multiplier: 0.6,
    bullet_speed_multiplier: 0.75,
    player_hp_multiplier: 1.5,
    item_drop_multiplier: 2.0,
    score_multiplier: 0.5,
    enemy_count_multiplier: None,
};

static NORMAL: DifficultyConfig = DifficultyConfig {
    display_name: "NORMAL",
    color: "#2196f3",
    enemy_hp_multiplier: 1.0,
    bullet_speed_multiplier: 1.0,
    player_hp_multiplier: 1.0,
    item_drop_multiplier: 1.0,
    score_multiplier: 1.0,
    enemy_count_multiplier: None,
};

static HARD: DifficultyConfig = DifficultyConfig {
    display_name: "HARD",
    color: "#f44336",
    enemy_hp_multiplier: 1.8,
    bullet_speed_multiplier: 1.4,
    player_hp_multiplier: 1.0,
    item_drop_multiplier: 0.7,
    score_multiplier: 2.0,
    enemy_count_multiplier: Some(1.3),
};

/// Active difficulty and the numeric adjustments it implies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Difficulty {
    tier: DifficultyTier,
}

impl Difficulty {
    pub fn new(tier: DifficultyTier) -> Self {
        Self { tier }
    }

    pub fn tier(&self) -> DifficultyTier {
        self.tier
    }

    pub fn config(&self) -> &'static DifficultyConfig {
        self.tier.config()
    }

    /// Switch tiers by key. Unknown keys leave the current tier active.
    pub fn set_tier_key(&mut self, key: &str) -> Result<(), ShooterError> {
        self.tier = key.parse()?;
        Ok(())
    }

    pub fn adjust_enemy_hp(&self, base: u32) -> u32 {
        ceil_scaled(base, self.config().enemy_hp_multiplier)
    }

    pub fn adjust_boss_hp(&self, base: u32) -> u32 {
        ceil_scaled(base, self.config().enemy_hp_multiplier)
    }

    pub fn adjust_player_hp(&self, base: u32) -> u32 {
        ceil_scaled(base, self.config().player_hp_multiplier)
    }

    pub fn adjust_enemy_count(&self, base: u32) -> u32 {
        ceil_scaled(base, self.config().enemy_count_multiplier.unwrap_or(1.0))
    }

    pub fn adjust_score(&self, base: u32) -> u32 {
        (f64::from(base) * self.config().score_multiplier).floor() as u32
    }

    pub fn adjust_bullet_speed(&self, base: f32) -> f32 {
        (f64::from(base) * self.config().bullet_speed_multiplier) as f32
    }

    /// Probability that a kill drops an item, clamped to `[0, 1]`.
    pub fn drop_probability(&self, base_rate: f64) -> f64 {
        let p = base_rate * self.config().item_drop_multiplier;
        if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
    }

    pub fn should_drop_item(&self, base_rate: f64, rng: &mut impl Rng) -> bool {
        rng.random_bool(self.drop_probability(base_rate))
    }
}

fn ceil_scaled(base: u32, multiplier: f64) -> u32 {
    (f64::from(base) * multiplier).ceil() as u32
}
