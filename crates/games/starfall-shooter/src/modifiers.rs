//! Combines difficulty, loadout, run rewards and persistent upgrades into the
//! numbers the simulation actually uses.

use serde::{Deserialize, Serialize};
use starfall_core::events::FireMode;
use starfall_core::loadout::LoadoutModifiers;

use crate::config::PlayerConfig;
use crate::difficulty::Difficulty;
use crate::rewards::RewardBuffs;
use crate::upgrades::ActiveUpgrades;

/// Player stats after every modifier layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectiveStats {
    pub max_hp: i32,
    pub bullet_damage: i32,
    pub bullet_speed: f32,
    /// Loadout-adjusted speed before rewards and upgrades.
    pub base_speed: f32,
    pub speed: f32,
    /// Loadout-adjusted delay before rewards.
    pub base_shoot_delay_ms: u32,
    pub shoot_delay_ms: u32,
    pub magnet_range: f32,
}

impl EffectiveStats {
    /// Compute stats for the given layers. `fire_mode` selects the power-up
    /// delay override for rapid fire.
    pub fn compute(
        player: &PlayerConfig,
        difficulty: &Difficulty,
        loadout: &LoadoutModifiers,
        rewards: &RewardBuffs,
        upgrades: &ActiveUpgrades,
        fire_mode: FireMode,
    ) -> Self {
        let loadout = loadout.sanitized();
        let base_max_hp =
            (f64::from(difficulty.adjust_player_hp(player.base_hp)) * f64::from(loadout.hp)).floor() as i32;
        let max_hp = base_max_hp + rewards.max_hp as i32 + upgrades.max_hp as i32;

        let raw_damage = player.base_damage * rewards.attack_power * f64::from(loadout.damage);
        let bullet_damage = ((raw_damage + upgrades.attack_power).round() as i32).max(1);

        let base_shoot_delay_ms = base_shoot_delay(player, &loadout);
        let shoot_delay_ms = match fire_mode {
            FireMode::Rapid => powerup_delay(player.rapid_shoot_delay_ms, rewards),
            _ => player
                .min_shoot_delay_ms
                .max(scaled_delay(base_shoot_delay_ms, rewards.fire_rate)),
        };

        let base_speed = player.base_speed * loadout.speed;
        Self {
            max_hp,
            bullet_damage,
            bullet_speed: difficulty.adjust_bullet_speed(player.bullet_speed),
            base_speed,
            speed: (f64::from(base_speed) * rewards.move_speed * upgrades.move_speed) as f32,
            base_shoot_delay_ms,
            shoot_delay_ms,
            magnet_range: (f64::from(player.magnet_range) * rewards.item_range) as f32,
        }
    }
}

/// Loadout-adjusted delay: `max(min_base, floor(base / fire_rate))`.
pub fn base_shoot_delay(player: &PlayerConfig, loadout: &LoadoutModifiers) -> u32 {
    player
        .min_base_shoot_delay_ms
        .max(scaled_delay(player.base_shoot_delay_ms, f64::from(loadout.fire_rate)))
}

/// Delay while a power-up is active, scaled by the fire-rate reward only.
pub fn powerup_delay(delay_ms: u32, rewards: &RewardBuffs) -> u32 {
    scaled_delay(delay_ms, rewards.fire_rate)
}

fn scaled_delay(delay_ms: u32, fire_rate: f64) -> u32 {
    (f64::from(delay_ms) / fire_rate).floor() as u32
}
