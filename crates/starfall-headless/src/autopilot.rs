use starfall_shooter::rewards::RewardId;
use starfall_shooter::{ShooterInput, ShooterState};

/// Horizontal error the pilot tolerates before steering.
const AIM_DEADZONE: f32 = 6.0;
/// How far above the ship a threat must be before the pilot dodges.
const DODGE_HORIZON: f32 = 120.0;

/// Reward preference when HP is comfortable.
const REWARD_PRIORITY: [RewardId; 5] = [
    RewardId::AttackPower,
    RewardId::FireRate,
    RewardId::MaxHp,
    RewardId::MoveSpeed,
    RewardId::ItemRange,
];

/// Scripted pilot: chase the lowest enemy (or the boss), sidestep anything
/// about to hit the ship, and keep the trigger held.
#[derive(Debug, Default, Clone, Copy)]
pub struct Autopilot;

impl Autopilot {
    pub fn steer(&self, state: &ShooterState) -> ShooterInput {
        let (px, py) = state.player.center();
        let reach = state.player.width;

        if let Some(threat_x) = incoming_threat(state, px, py, reach) {
            return ShooterInput {
                left: threat_x >= px,
                right: threat_x < px,
                fire: true,
            };
        }

        let Some(target) = target_x(state) else {
            return ShooterInput {
                fire: true,
                ..ShooterInput::default()
            };
        };
        ShooterInput {
            left: target < px - AIM_DEADZONE,
            right: target > px + AIM_DEADZONE,
            fire: true,
        }
    }

    /// Below half HP, raise the HP ceiling; otherwise take damage upgrades first.
    pub fn pick_reward(&self, state: &ShooterState, offer: &[RewardId]) -> Option<RewardId> {
        let player = &state.player;
        if player.hp * 2 < player.max_hp && offer.contains(&RewardId::MaxHp) {
            return Some(RewardId::MaxHp);
        }
        REWARD_PRIORITY
            .into_iter()
            .find(|id| offer.contains(id))
            .or_else(|| offer.first().copied())
    }
}

/// X of the closest boss bullet or enemy bearing down on the ship.
fn incoming_threat(state: &ShooterState, px: f32, py: f32, reach: f32) -> Option<f32> {
    let bullets = state
        .boss_bullets
        .iter()
        .map(|b| (b.x + b.width / 2.0, b.y + b.height));
    let enemies = state.enemies.iter().map(|e| (e.x + e.width / 2.0, e.y + e.height));
    bullets
        .chain(enemies)
        .filter(|(x, bottom)| *bottom < py && py - bottom < DODGE_HORIZON && (x - px).abs() < reach)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(x, _)| x)
}

fn target_x(state: &ShooterState) -> Option<f32> {
    if let Some(boss) = &state.boss {
        return Some(boss.x + boss.width / 2.0);
    }
    state
        .enemies
        .iter()
        .max_by(|a, b| a.y.total_cmp(&b.y))
        .map(|e| e.x + e.width / 2.0)
}
