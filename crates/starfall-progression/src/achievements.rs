//! Achievement definitions and the unlock book.
//!
//! A [`Milestone`] compares one [`Metric`] of the persisted profile against a
//! threshold. The catalog is data-driven: it loads from TOML and falls back to
//! the built-in list.

use serde::{Deserialize, Serialize};
use starfall_core::store::{self, KeyValueStore, StoreError};

use crate::profile::{DifficultyRecords, ProfileStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

/// A quantity read from the persisted profile. Flags read as 0 or 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    TotalKills,
    MaxScore,
    MaxCombo,
    ReachedMultiplier10,
    TotalPowerups,
    AllPowerupsInOneGame,
    RapidKills,
    ThreeWayKills,
    RedKills,
    PurpleKills,
    YellowKills,
    GamesPlayed,
    PlaytimeSeconds,
    TotalDeaths,
    TotalDamageTaken,
    /// Best recorded wave for a difficulty key.
    MaxWave(String),
}

/// Read-only view over everything milestones can inspect.
#[derive(Debug, Clone, Copy)]
pub struct ProgressView<'a> {
    pub profile: &'a ProfileStats,
    pub records: &'a DifficultyRecords,
}

impl Metric {
    pub fn value(&self, view: &ProgressView<'_>) -> u64 {
        let p = view.profile;
        match self {
            Self::TotalKills => p.total_kills,
            Self::MaxScore => p.max_score,
            Self::MaxCombo => u64::from(p.max_combo),
            Self::ReachedMultiplier10 => u64::from(p.reached_multiplier_10),
            Self::TotalPowerups => p.total_powerups,
            Self::AllPowerupsInOneGame => u64::from(p.all_powerups_in_one_game),
            Self::RapidKills => p.rapid_kills,
            Self::ThreeWayKills => p.three_way_kills,
            Self::RedKills => p.red_kills,
            Self::PurpleKills => p.purple_kills,
            Self::YellowKills => p.yellow_kills,
            Self::GamesPlayed => u64::from(p.games_played),
            Self::PlaytimeSeconds => p.play_time_seconds(),
            Self::TotalDeaths => u64::from(p.total_deaths),
            Self::TotalDamageTaken => p.total_damage_taken,
            Self::MaxWave(difficulty) => u64::from(view.records.get(difficulty).max_wave),
        }
    }
}

/// Something that can be unlocked once its condition holds.
pub trait MilestoneRule {
    fn id(&self) -> &str;

    fn is_met(&self, view: &ProgressView<'_>) -> bool;
}

/// Threshold achievement over a single metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub rarity: Rarity,
    pub metric: Metric,
    pub threshold: u64,
}

impl MilestoneRule for Milestone {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_met(&self, view: &ProgressView<'_>) -> bool {
        self.metric.value(view) >= self.threshold
    }
}

/// The full achievement list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MilestoneCatalog {
    pub milestones: Vec<Milestone>,
}

fn milestone(id: &str, name: &str, description: &str, rarity: Rarity, metric: Metric, threshold: u64) -> Milestone {
    Milestone {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        rarity,
        metric,
        threshold,
    }
}

impl Default for MilestoneCatalog {
    fn default() -> Self {
        use Metric::*;
        use Rarity::*;

        let mut milestones = vec![milestone(
            "first_kill",
            "First Blood",
            "Destroy your first enemy",
            Common,
            TotalKills,
            1,
        )];
        for (n, name, rarity) in [
            (10, "Rookie Hunter", Common),
            (50, "Hunter", Common),
            (100, "Veteran Hunter", Uncommon),
            (300, "Ace Hunter", Rare),
            (500, "Master Hunter", Rare),
            (1000, "Annihilator", Epic),
            (2500, "Legendary Hunter", Legendary),
            (5000, "Ultimate Hunter", Legendary),
        ] {
            milestones.push(milestone(
                &format!("kill_{n}"),
                name,
                &format!("Destroy {n} enemies in total"),
                rarity,
                TotalKills,
                n,
            ));
        }
        for (n, name, rarity) in [
            (100, "Score Beginner", Common),
            (500, "Score Novice", Common),
            (1000, "Score Master", Uncommon),
            (3000, "Score Expert", Rare),
            (5000, "Score Legend", Epic),
            (10000, "Score Deity", Legendary),
        ] {
            milestones.push(milestone(
                &format!("score_{n}"),
                name,
                &format!("Reach {n} points in one run"),
                rarity,
                MaxScore,
                n,
            ));
        }
        for (n, name, rarity) in [
            (5, "Combo Beginner", Common),
            (10, "Combo Master", Uncommon),
            (20, "Combo Expert", Rare),
            (30, "Combo Legend", Epic),
            (50, "Combo Deity", Legendary),
        ] {
            milestones.push(milestone(
                &format!("combo_{n}"),
                name,
                &format!("Chain a {n}-kill combo"),
                rarity,
                MaxCombo,
                n,
            ));
        }
        milestones.extend([
            milestone("multiplier_10", "Multiplier Master", "Reach the x10 combo multiplier", Rare, ReachedMultiplier10, 1),
            milestone("first_powerup", "Powered Up", "Collect your first power-up", Common, TotalPowerups, 1),
            milestone("powerup_collector", "Collector", "Collect every power-up kind in one run", Uncommon, AllPowerupsInOneGame, 1),
            milestone("powerup_50", "Power Hoarder", "Collect 50 power-ups in total", Uncommon, TotalPowerups, 50),
            milestone("powerup_100", "Power Addict", "Collect 100 power-ups in total", Rare, TotalPowerups, 100),
            milestone("rapid_master", "Rapid Master", "Destroy 30 enemies with rapid fire", Uncommon, RapidKills, 30),
            milestone("3way_master", "Three-Way Master", "Destroy 50 enemies with three-way fire", Uncommon, ThreeWayKills, 50),
            milestone("red_enemy_hunter", "Red Hunter", "Destroy 50 red enemies", Common, RedKills, 50),
            milestone("purple_enemy_hunter", "Purple Hunter", "Destroy 30 purple enemies", Uncommon, PurpleKills, 30),
            milestone("yellow_enemy_hunter", "Yellow Hunter", "Destroy 20 yellow enemies", Rare, YellowKills, 20),
            milestone("first_play", "Liftoff", "Play your first run", Common, GamesPlayed, 1),
            milestone("total_playtime_30min", "Regular", "Play for 30 minutes in total", Common, PlaytimeSeconds, 1800),
            milestone("total_playtime_1hour", "Devoted", "Play for an hour in total", Uncommon, PlaytimeSeconds, 3600),
            milestone("total_playtime_3hours", "Obsessed", "Play for three hours in total", Rare, PlaytimeSeconds, 10_800),
            milestone("death_count_10", "Never Give Up", "Get shot down 10 times", Uncommon, TotalDeaths, 10),
            milestone("tank", "Tank", "Take 500 damage in total", Uncommon, TotalDamageTaken, 500),
        ]);
        for (wave, difficulty, rarity) in [
            (5, "easy", Common),
            (5, "normal", Common),
            (5, "hard", Uncommon),
            (10, "normal", Uncommon),
            (10, "hard", Rare),
        ] {
            milestones.push(milestone(
                &format!("wave_{wave}_{difficulty}"),
                &format!("Wave {wave} ({difficulty})"),
                &format!("Clear wave {wave} on {difficulty}"),
                rarity,
                MaxWave(difficulty.to_string()),
                wave,
            ));
        }
        Self { milestones }
    }
}

impl MilestoneCatalog {
    /// Load the catalog from environment or TOML file, falling back to the built-in list.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("STARFALL_ACHIEVEMENTS")
            && let Some(catalog) = Self::from_file(&path)
        {
            return catalog;
        }
        Self::from_file("config/achievements.toml").unwrap_or_default()
    }

    fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        match toml::from_str::<Self>(&contents) {
            Ok(catalog) => Some(catalog),
            Err(e) => {
                tracing::warn!("Failed to parse {path}: {e}, using built-in achievements");
                None
            },
        }
    }

    pub fn get(&self, id: &str) -> Option<&Milestone> {
        self.milestones.iter().find(|m| m.id == id)
    }

    pub fn len(&self) -> usize {
        self.milestones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.milestones.is_empty()
    }
}

/// Unlock summary for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AchievementProgress {
    pub unlocked: usize,
    pub total: usize,
    /// Floored whole percentage.
    pub percentage: u32,
}

/// Ids of unlocked achievements, in unlock order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AchievementBook {
    unlocked: Vec<String>,
}

impl AchievementBook {
    pub const STORE_KEY: &'static str = "unlocked_achievements";

    pub fn load<S: KeyValueStore + ?Sized>(kv: &mut S) -> Self {
        store::load_or_default(kv, Self::STORE_KEY)
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, kv: &mut S) -> Result<(), StoreError> {
        store::save(kv, Self::STORE_KEY, self)
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked.iter().any(|u| u == id)
    }

    pub fn unlocked(&self) -> &[String] {
        &self.unlocked
    }

    /// Unlock every rule that now holds. Returns the ids unlocked by this call.
    pub fn check<R: MilestoneRule>(&mut self, rules: &[R], view: &ProgressView<'_>) -> Vec<String> {
        let mut fresh = Vec::new();
        for rule in rules {
            if !self.is_unlocked(rule.id()) && rule.is_met(view) {
                self.unlocked.push(rule.id().to_string());
                fresh.push(rule.id().to_string());
            }
        }
        fresh
    }

    /// Share of `rules` already unlocked. Ids unknown to `rules` are not counted.
    pub fn progress<R: MilestoneRule>(&self, rules: &[R]) -> AchievementProgress {
        let total = rules.len();
        let unlocked = rules.iter().filter(|r| self.is_unlocked(r.id())).count();
        let percentage = if total == 0 {
            0
        } else {
            (unlocked * 100 / total) as u32
        };
        AchievementProgress {
            unlocked,
            total,
            percentage,
        }
    }
}
