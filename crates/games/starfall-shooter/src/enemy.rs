use rand::Rng;
use serde::{Deserialize, Serialize};
use starfall_core::events::EnemyTag;

use crate::collision::{Bounds, Rect};
use crate::difficulty::Difficulty;

/// Regular enemy archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    Red,
    Purple,
    Yellow,
    Elite,
}

/// Display colour. The renderer maps these to its palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tint {
    Red,
    Magenta,
    Yellow,
    Cyan,
    /// Highlight for buffed last-enemy-phase enemies.
    LastEnemy,
}

/// Base stats before difficulty and wave scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyArchetype {
    pub width: f32,
    pub height: f32,
    pub hp: u32,
    pub speed: f32,
    pub points: u32,
    pub tint: Tint,
}

impl EnemyKind {
    pub fn archetype(self) -> EnemyArchetype {
        match self {
            Self::Red => EnemyArchetype {
                width: 30.0,
                height: 30.0,
                hp: 1,
                speed: 2.0,
                points: 10,
                tint: Tint::Red,
            },
            Self::Purple => EnemyArchetype {
                width: 40.0,
                height: 40.0,
                hp: 3,
                speed: 1.5,
                points: 30,
                tint: Tint::Magenta,
            },
            Self::Yellow => EnemyArchetype {
                width: 50.0,
                height: 50.0,
                hp: 5,
                speed: 1.0,
                points: 50,
                tint: Tint::Yellow,
            },
            Self::Elite => EnemyArchetype {
                width: 45.0,
                height: 45.0,
                hp: 8,
                speed: 2.5,
                points: 80,
                tint: Tint::Cyan,
            },
        }
    }

    pub fn tag(self) -> EnemyTag {
        match self {
            Self::Red => EnemyTag::Red,
            Self::Purple => EnemyTag::Purple,
            Self::Yellow => EnemyTag::Yellow,
            Self::Elite => EnemyTag::Elite,
        }
    }
}

/// Lateral movement style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyMovement {
    Straight,
    Sine,
    Cosine,
}

impl EnemyMovement {
    fn from_index(i: u8) -> Self {
        match i {
            1 => Self::Sine,
            2 => Self::Cosine,
            _ => Self::Straight,
        }
    }
}

/// A live enemy. `base_*` fields snapshot the spawn stats so the last-enemy
/// buff can be reverted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub hp: i32,
    pub max_hp: i32,
    pub base_hp: i32,
    pub speed: f32,
    pub base_speed: f32,
    pub points: u32,
    pub base_points: u32,
    pub tint: Tint,
    pub base_tint: Tint,
    pub movement: EnemyMovement,
    pub is_last_enemy: bool,
}

impl Enemy {
    /// Spawn just above the top edge at a random x.
    pub fn spawn(kind: EnemyKind, difficulty: &Difficulty, wave: u32, canvas_width: f32, rng: &mut impl Rng) -> Self {
        let arch = kind.archetype();
        let hp = difficulty.adjust_enemy_hp(arch.hp) as i32;
        let points = difficulty.adjust_score(arch.points);
        let speed = arch.speed + wave as f32 * 0.1;
        let span = (canvas_width - arch.width).max(0.0);
        let x = if span > 0.0 { rng.random_range(0.0..span) } else { 0.0 };
        Self {
            kind,
            x,
            y: -arch.height,
            width: arch.width,
            height: arch.height,
            hp,
            max_hp: hp,
            base_hp: hp,
            speed,
            base_speed: speed,
            points,
            base_points: points,
            tint: arch.tint,
            base_tint: arch.tint,
            movement: EnemyMovement::from_index(rng.random_range(0..3)),
            is_last_enemy: false,
        }
    }

    /// Apply the last-enemy buff once.
    pub fn apply_last_enemy_buff(&mut self) {
        if self.is_last_enemy {
            return;
        }
        self.is_last_enemy = true;
        let base = f64::from(self.base_hp);
        let bonus_hp = (base * 0.5).ceil() as i32;
        self.max_hp = (base * 1.5).ceil() as i32;
        self.hp = self.max_hp.min(self.hp + bonus_hp);
        self.speed = self.base_speed * 1.2;
        self.points = (f64::from(self.base_points) * 1.5).floor() as u32;
        self.tint = Tint::LastEnemy;
    }

    /// Revert to base stats, keeping damage already taken.
    pub fn revert_last_enemy_buff(&mut self) {
        if !self.is_last_enemy {
            return;
        }
        self.is_last_enemy = false;
        self.max_hp = self.base_hp;
        self.hp = self.hp.min(self.base_hp);
        self.speed = self.base_speed;
        self.points = self.base_points;
        self.tint = self.base_tint;
    }

    /// Descend and drift for one frame, staying inside the canvas horizontally.
    pub fn advance(&mut self, frame: u64, canvas_width: f32) {
        self.y += self.speed;
        let f = frame as f32;
        match self.movement {
            EnemyMovement::Straight => {},
            EnemyMovement::Sine => self.x += (f * 0.05).sin() * 2.0,
            EnemyMovement::Cosine => self.x += (f * 0.03).cos() * 1.5,
        }
        self.x = self.x.min(canvas_width - self.width).max(0.0);
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }
}

impl Bounds for Enemy {
    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}
