//! Persistent meta-upgrades bought with coins between runs.

use std::fmt;

use serde::{Deserialize, Serialize};
use starfall_core::store::{self, KeyValueStore, StoreError};

/// Coins awarded for clearing the run.
pub const CLEAR_BONUS_COINS: u64 = 50;

/// Coins earned at the end of a run.
pub fn coins_earned(score: u64, cleared: bool) -> u64 {
    score / 100 + if cleared { CLEAR_BONUS_COINS } else { 0 }
}

/// An upgrade track in the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeTrack {
    MaxHp,
    AttackPower,
    MoveSpeed,
    Shield,
}

/// Static pricing and bonuses for a track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSpec {
    pub name: &'static str,
    pub max_level: u8,
    /// Price of level `i + 1`.
    pub costs: &'static [u64],
    /// Bonus granted at level `i + 1`.
    pub bonuses: &'static [f64],
}

impl UpgradeTrack {
    pub const ALL: [UpgradeTrack; 4] = [
        UpgradeTrack::MaxHp,
        UpgradeTrack::AttackPower,
        UpgradeTrack::MoveSpeed,
        UpgradeTrack::Shield,
    ];

    pub fn spec(self) -> TrackSpec {
        match self {
            Self::MaxHp => TrackSpec {
                name: "Max HP",
                max_level: 3,
                costs: &[100, 250, 500],
                bonuses: &[20.0, 50.0, 100.0],
            },
            Self::AttackPower => TrackSpec {
                name: "Attack Power",
                max_level: 3,
                costs: &[150, 300, 600],
                bonuses: &[1.0, 2.0, 3.0],
            },
            Self::MoveSpeed => TrackSpec {
                name: "Move Speed",
                max_level: 3,
                costs: &[120, 280, 550],
                bonuses: &[1.1, 1.25, 1.5],
            },
            Self::Shield => TrackSpec {
                name: "Starting Shield",
                max_level: 2,
                costs: &[200, 500],
                bonuses: &[10.0, 20.0],
            },
        }
    }

    /// Bonus value at level 0 (no purchase).
    fn neutral_bonus(self) -> f64 {
        match self {
            Self::MoveSpeed => 1.0,
            _ => 0.0,
        }
    }
}

/// Why a purchase was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseError {
    MaxLevelReached { track: UpgradeTrack },
    InsufficientFunds { needed: u64, balance: u64 },
}

impl fmt::Display for PurchaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxLevelReached { track } => write!(f, "{} is already at max level", track.spec().name),
            Self::InsufficientFunds { needed, balance } => {
                write!(f, "insufficient coins: need {needed}, have {balance}")
            },
        }
    }
}

impl std::error::Error for PurchaseError {}

/// Successful purchase details.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PurchaseReceipt {
    pub track: UpgradeTrack,
    pub new_level: u8,
    pub cost: u64,
    pub bonus: f64,
}

/// Shop view of one track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpgradeInfo {
    pub track: UpgradeTrack,
    pub name: &'static str,
    pub level: u8,
    pub max_level: u8,
    pub is_maxed: bool,
    pub next_cost: Option<u64>,
    pub current_bonus: f64,
    pub next_bonus: Option<f64>,
}

/// Bonuses applied at run start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveUpgrades {
    pub max_hp: u32,
    pub attack_power: f64,
    pub move_speed: f64,
    pub shield_seconds: u32,
}

impl Default for ActiveUpgrades {
    fn default() -> Self {
        Self {
            max_hp: 0,
            attack_power: 0.0,
            move_speed: 1.0,
            shield_seconds: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
struct UpgradeLevels {
    max_hp: u8,
    attack_power: u8,
    move_speed: u8,
    shield: u8,
}

/// Coin balance and purchased levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeLedger {
    coins: u64,
    levels: UpgradeLevels,
}

impl UpgradeLedger {
    pub const STORE_KEY: &'static str = "upgrade_ledger";

    pub fn new(coins: u64) -> Self {
        Self {
            coins,
            ..Self::default()
        }
    }

    /// Load from the store; missing or malformed blobs yield an empty ledger.
    pub fn load<S: KeyValueStore + ?Sized>(kv: &mut S) -> Self {
        store::load_or_default(kv, Self::STORE_KEY)
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, kv: &mut S) -> Result<(), StoreError> {
        store::save(kv, Self::STORE_KEY, self)
    }

    pub fn coins(&self) -> u64 {
        self.coins
    }

    pub fn add_coins(&mut self, amount: u64) {
        self.coins = self.coins.saturating_add(amount);
    }

    /// Purchased level, clamped to the track maximum.
    pub fn level(&self, track: UpgradeTrack) -> u8 {
        let raw = match track {
            UpgradeTrack::MaxHp => self.levels.max_hp,
            UpgradeTrack::AttackPower => self.levels.attack_power,
            UpgradeTrack::MoveSpeed => self.levels.move_speed,
            UpgradeTrack::Shield => self.levels.shield,
        };
        raw.min(track.spec().max_level)
    }

    fn level_mut(&mut self, track: UpgradeTrack) -> &mut u8 {
        match track {
            UpgradeTrack::MaxHp => &mut self.levels.max_hp,
            UpgradeTrack::AttackPower => &mut self.levels.attack_power,
            UpgradeTrack::MoveSpeed => &mut self.levels.move_speed,
            UpgradeTrack::Shield => &mut self.levels.shield,
        }
    }

    /// Buy the next level of `track`. The max-level check runs before the funds check.
    pub fn purchase(&mut self, track: UpgradeTrack) -> Result<PurchaseReceipt, PurchaseError> {
        let spec = track.spec();
        let level = self.level(track);
        if level >= spec.max_level {
            return Err(PurchaseError::MaxLevelReached { track });
        }
        let cost = spec.costs[usize::from(level)];
        if self.coins < cost {
            return Err(PurchaseError::InsufficientFunds {
                needed: cost,
                balance: self.coins,
            });
        }
        self.coins -= cost;
        let new_level = level + 1;
        *self.level_mut(track) = new_level;
        tracing::info!(?track, new_level, cost, "Upgrade purchased");
        Ok(PurchaseReceipt {
            track,
            new_level,
            cost,
            bonus: spec.bonuses[usize::from(level)],
        })
    }

    /// Bonus at the current level of `track`.
    pub fn bonus(&self, track: UpgradeTrack) -> f64 {
        match self.level(track) {
            0 => track.neutral_bonus(),
            n => track.spec().bonuses[usize::from(n) - 1],
        }
    }

    pub fn info(&self, track: UpgradeTrack) -> UpgradeInfo {
        let spec = track.spec();
        let level = self.level(track);
        let maxed = level >= spec.max_level;
        UpgradeInfo {
            track,
            name: spec.name,
            level,
            max_level: spec.max_level,
            is_maxed: maxed,
            next_cost: (!maxed).then(|| spec.costs[usize::from(level)]),
            current_bonus: self.bonus(track),
            next_bonus: (!maxed).then(|| spec.bonuses[usize::from(level)]),
        }
    }

    pub fn all_info(&self) -> Vec<UpgradeInfo> {
        UpgradeTrack::ALL.iter().map(|t| self.info(*t)).collect()
    }

    pub fn active_bonuses(&self) -> ActiveUpgrades {
        ActiveUpgrades {
            max_hp: self.bonus(UpgradeTrack::MaxHp) as u32,
            attack_power: self.bonus(UpgradeTrack::AttackPower),
            move_speed: self.bonus(UpgradeTrack::MoveSpeed),
            shield_seconds: self.bonus(UpgradeTrack::Shield) as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use starfall_core::store::MemoryStore;

    use super::*;

    #[test]
    fn coins_formula() {
        assert_eq!(coins_earned(0, false), 0);
        assert_eq!(coins_earned(99, false), 0);
        assert_eq!(coins_earned(1250, false), 12);
        assert_eq!(coins_earned(1250, true), 62);
    }

    #[test]
    fn purchase_deducts_and_levels_up() {
        let mut ledger = UpgradeLedger::new(400);
        let receipt = ledger.purchase(UpgradeTrack::MaxHp).unwrap();
        assert_eq!(receipt.new_level, 1);
        assert_eq!(receipt.cost, 100);
        assert_eq!(receipt.bonus, 20.0);
        assert_eq!(ledger.coins(), 300);
        assert_eq!(ledger.level(UpgradeTrack::MaxHp), 1);
        assert_eq!(ledger.active_bonuses().max_hp, 20);
    }

    #[test]
    fn insufficient_funds_changes_nothing() {
        let mut ledger = UpgradeLedger::new(50);
        let err = ledger.purchase(UpgradeTrack::AttackPower).unwrap_err();
        assert_eq!(
            err,
            PurchaseError::InsufficientFunds {
                needed: 150,
                balance: 50
            }
        );
        assert_eq!(ledger.coins(), 50);
        assert_eq!(ledger.level(UpgradeTrack::AttackPower), 0);
    }

    #[test]
    fn max_level_checked_before_funds() {
        let mut ledger = UpgradeLedger::new(700);
        ledger.purchase(UpgradeTrack::Shield).unwrap();
        ledger.purchase(UpgradeTrack::Shield).unwrap();
        assert_eq!(ledger.coins(), 0);
        assert_eq!(
            ledger.purchase(UpgradeTrack::Shield),
            Err(PurchaseError::MaxLevelReached {
                track: UpgradeTrack::Shield
            })
        );
        assert_eq!(ledger.active_bonuses().shield_seconds, 20);

        ledger.add_coins(999_999);
        assert_eq!(
            ledger.purchase(UpgradeTrack::Shield),
            Err(PurchaseError::MaxLevelReached {
                track: UpgradeTrack::Shield
            })
        );
        assert_eq!(ledger.coins(), 999_999);
        assert_eq!(ledger.level(UpgradeTrack::Shield), 2);
    }

    #[test]
    fn level_zero_bonuses_are_neutral() {
        let bonuses = UpgradeLedger::default().active_bonuses();
        assert_eq!(bonuses, ActiveUpgrades::default());
    }

    #[test]
    fn info_reports_next_step() {
        let mut ledger = UpgradeLedger::new(1000);
        ledger.purchase(UpgradeTrack::MoveSpeed).unwrap();
        let info = ledger.info(UpgradeTrack::MoveSpeed);
        assert_eq!(info.level, 1);
        assert_eq!(info.next_cost, Some(280));
        assert_eq!(info.current_bonus, 1.1);
        assert_eq!(info.next_bonus, Some(1.25));
        assert!(!info.is_maxed);

        let shield = ledger.info(UpgradeTrack::Shield);
        assert_eq!(shield.current_bonus, 0.0);
        assert_eq!(ledger.all_info().len(), 4);
    }

    #[test]
    fn ledger_persists_through_store() {
        let mut kv = MemoryStore::new();
        let mut ledger = UpgradeLedger::new(500);
        ledger.purchase(UpgradeTrack::AttackPower).unwrap();
        ledger.save(&mut kv).unwrap();
        assert_eq!(UpgradeLedger::load(&mut kv), ledger);
    }

    #[test]
    fn corrupt_levels_are_clamped() {
        let mut kv = MemoryStore::new();
        kv.set(UpgradeLedger::STORE_KEY, r#"{"coins":5,"levels":{"shield":9}}"#.into())
            .unwrap();
        let ledger = UpgradeLedger::load(&mut kv);
        assert_eq!(ledger.coins(), 5);
        assert_eq!(ledger.level(UpgradeTrack::Shield), 2);
        let mut ledger = ledger;
        assert!(matches!(
            ledger.purchase(UpgradeTrack::Shield),
            Err(PurchaseError::MaxLevelReached { .. })
        ));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn track() -> impl Strategy<Value = UpgradeTrack> {
            prop::sample::select(UpgradeTrack::ALL.to_vec())
        }

        proptest! {
            #[test]
            fn coins_never_go_negative(start in 0u64..3000, buys in prop::collection::vec(track(), 0..20)) {
                let mut ledger = UpgradeLedger::new(start);
                let mut spent = 0;
                for t in buys {
                    if let Ok(r) = ledger.purchase(t) {
                        spent += r.cost;
                    }
                    prop_assert!(ledger.level(t) <= t.spec().max_level);
                }
                prop_assert_eq!(ledger.coins() + spent, start);
            }
        }
    }
}
