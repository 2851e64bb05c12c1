use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

/// Identifier of a stage-clear reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardId {
    MaxHp,
    AttackPower,
    FireRate,
    MoveSpeed,
    ItemRange,
}

impl RewardId {
    pub const ALL: [RewardId; 5] = [
        RewardId::MaxHp,
        RewardId::AttackPower,
        RewardId::FireRate,
        RewardId::MoveSpeed,
        RewardId::ItemRange,
    ];
}

/// Run-scoped buffs accumulated from stage-clear rewards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardBuffs {
    /// Additive max HP.
    pub max_hp: u32,
    pub attack_power: f64,
    pub fire_rate: f64,
    pub move_speed: f64,
    pub item_range: f64,
}

impl Default for RewardBuffs {
    fn default() -> Self {
        Self {
            max_hp: 0,
            attack_power: 1.0,
            fire_rate: 1.0,
            move_speed: 1.0,
            item_range: 1.0,
        }
    }
}

impl RewardBuffs {
    /// Apply one reward. Each reward touches exactly one channel.
    pub fn apply(&mut self, id: RewardId) {
        match id {
            RewardId::MaxHp => self.max_hp += 20,
            RewardId::AttackPower => self.attack_power *= 1.15,
            RewardId::FireRate => self.fire_rate *= 1.2,
            RewardId::MoveSpeed => self.move_speed *= 1.1,
            RewardId::ItemRange => self.item_range *= 1.3,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A reward card shown after a wave is cleared.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardOption {
    pub id: RewardId,
    pub name: &'static str,
    pub description: &'static str,
    /// Relative selection weight.
    pub weight: f64,
}

/// The pool stage-clear offers are drawn from.
#[derive(Debug, Clone)]
pub struct RewardCatalog {
    options: Vec<RewardOption>,
}

impl Default for RewardCatalog {
    fn default() -> Self {
        let option = |id, name, description| RewardOption {
            id,
            name,
            description,
            weight: 1.0,
        };
        Self {
            options: vec![
                option(RewardId::MaxHp, "Max HP +20", "Raises max HP by 20"),
                option(RewardId::AttackPower, "Attack +15%", "Raises bullet damage by 15%"),
                option(RewardId::FireRate, "Fire Rate +20%", "Shortens the shot delay by 20%"),
                option(RewardId::MoveSpeed, "Move Speed +10%", "Raises ship speed by 10%"),
                option(RewardId::ItemRange, "Magnet +30%", "Widens the item pull radius by 30%"),
            ],
        }
    }
}

impl RewardCatalog {
    /// Number of cards in one offer.
    pub const OFFER_SIZE: usize = 3;

    pub fn options(&self) -> &[RewardOption] {
        &self.options
    }

    pub fn get(&self, id: RewardId) -> Option<&RewardOption> {
        self.options.iter().find(|o| o.id == id)
    }

    /// Change the selection weight of one reward. Negative weights are treated as zero.
    pub fn set_weight(&mut self, id: RewardId, weight: f64) {
        if let Some(option) = self.options.iter_mut().find(|o| o.id == id) {
            option.weight = weight.max(0.0);
        }
    }

    /// Draw up to [`Self::OFFER_SIZE`] distinct rewards by weight.
    pub fn offer(&self, rng: &mut impl Rng) -> Vec<RewardId> {
        match self
            .options
            .choose_multiple_weighted(rng, Self::OFFER_SIZE, |o| o.weight)
        {
            Ok(picked) => picked.map(|o| o.id).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Invalid reward weights, offering the first options");
                self.options
                    .iter()
                    .take(Self::OFFER_SIZE)
                    .map(|o| o.id)
                    .collect()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn each_reward_touches_one_channel() {
        for id in RewardId::ALL {
            let mut buffs = RewardBuffs::default();
            buffs.apply(id);
            let base = RewardBuffs::default();
            let changed = [
                buffs.max_hp != base.max_hp,
                buffs.attack_power != base.attack_power,
                buffs.fire_rate != base.fire_rate,
                buffs.move_speed != base.move_speed,
                buffs.item_range != base.item_range,
            ];
            assert_eq!(changed.iter().filter(|c| **c).count(), 1, "{id:?}");
        }
    }

    #[test]
    fn rewards_stack_multiplicatively() {
        let mut buffs = RewardBuffs::default();
        buffs.apply(RewardId::FireRate);
        buffs.apply(RewardId::FireRate);
        assert!((buffs.fire_rate - 1.44).abs() < 1e-9);
        buffs.apply(RewardId::MaxHp);
        buffs.apply(RewardId::MaxHp);
        assert_eq!(buffs.max_hp, 40);
        buffs.reset();
        assert_eq!(buffs, RewardBuffs::default());
    }

    #[test]
    fn offer_draws_three_distinct() {
        let catalog = RewardCatalog::default();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let offer = catalog.offer(&mut rng);
            assert_eq!(offer.len(), RewardCatalog::OFFER_SIZE);
            let unique: HashSet<_> = offer.iter().collect();
            assert_eq!(unique.len(), offer.len());
        }
    }

    #[test]
    fn zero_weight_reward_is_never_offered() {
        let mut catalog = RewardCatalog::default();
        catalog.set_weight(RewardId::ItemRange, 0.0);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..200 {
            assert!(!catalog.offer(&mut rng).contains(&RewardId::ItemRange));
        }
    }

    #[test]
    fn catalog_lists_every_reward() {
        let catalog = RewardCatalog::default();
        for id in RewardId::ALL {
            assert!(catalog.get(id).is_some());
        }
    }
}
