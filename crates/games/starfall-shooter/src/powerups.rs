use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use starfall_core::events::{FireMode, PowerUpKind};
use starfall_core::timer::Countdown;

use crate::collision::{Bounds, Rect};
use crate::config::DropConfig;

/// A power-up item falling toward the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUpDrop {
    pub kind: PowerUpKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub fall_speed: f32,
}

impl PowerUpDrop {
    /// Drop a random kind centred under `center_x`.
    pub fn spawn(center_x: f32, y: f32, drops: &DropConfig, rng: &mut impl Rng) -> Self {
        let kind = PowerUpKind::ALL
            .choose(rng)
            .copied()
            .unwrap_or(PowerUpKind::Rapid);
        Self {
            kind,
            x: center_x - drops.size / 2.0,
            y,
            width: drops.size,
            height: drops.size,
            fall_speed: drops.fall_speed,
        }
    }

    /// Fall one frame, then get pulled toward `target` when inside `magnet_range`.
    pub fn advance(&mut self, target: (f32, f32), magnet_range: f32, pull: f32) {
        self.y += self.fall_speed;
        let (cx, cy) = self.bounds().center();
        let dx = target.0 - cx;
        let dy = target.1 - cy;
        let distance = (dx * dx + dy * dy).sqrt();
        if distance > 0.0 && distance < magnet_range {
            self.x += dx / distance * pull;
            self.y += dy / distance * pull;
        }
    }
}

impl Bounds for PowerUpDrop {
    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Power-up effects on the player. One timer is shared by the fire mode and the shield.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePowerUps {
    pub fire_mode: FireMode,
    pub shield_active: bool,
    pub timer: Countdown,
}

impl ActivePowerUps {
    /// Starting state; a non-zero `shield_frames` grants the upgrade shield.
    pub fn with_starting_shield(shield_frames: u32) -> Self {
        Self {
            fire_mode: FireMode::Normal,
            shield_active: shield_frames > 0,
            timer: Countdown::start(shield_frames),
        }
    }

    /// Apply a pickup and restart the shared timer.
    pub fn collect(&mut self, kind: PowerUpKind, duration_frames: u32) {
        match kind {
            PowerUpKind::Rapid => self.fire_mode = FireMode::Rapid,
            PowerUpKind::ThreeWay => self.fire_mode = FireMode::ThreeWay,
            PowerUpKind::Shield => self.shield_active = true,
        }
        self.timer.set(duration_frames);
    }

    /// Advance one frame. Returns `true` when the effects expired this frame.
    pub fn tick(&mut self) -> bool {
        if !self.timer.tick() {
            return false;
        }
        self.fire_mode = FireMode::Normal;
        self.shield_active = false;
        true
    }
}
