//! Boss roster, movement and phase escalation.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::barrage::{BarragePattern, BossBullet, Volley};
use crate::collision::{Bounds, Rect};
use crate::difficulty::Difficulty;
use crate::enemy::Tint;

/// Entrance descends until the boss top reaches this y.
const ENTRANCE_Y: f32 = 50.0;
/// Bosses never move below this y.
const MAX_Y: f32 = 200.0;
/// Pattern ticks before switching to the next movement pattern.
const PATTERN_SWITCH_TICKS: u32 = 300;
const PHASE_TWO_THRESHOLD: f32 = 0.66;
const PHASE_THREE_THRESHOLD: f32 = 0.33;

/// Boss movement styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovePattern {
    Straight,
    Zigzag,
    Circle,
    Rush,
    Teleport,
    Shield,
}

/// Boss escalation phase. Only ever increases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum BossPhase {
    #[default]
    One,
    Two,
    Three,
}

impl BossPhase {
    pub fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }

    /// How many random patterns a regular volley fires.
    fn volley_patterns(self) -> usize {
        usize::from(self.number())
    }
}

/// Stats for one boss encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossConfig {
    pub name: String,
    pub hp: u32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub points: u32,
    pub movement: Vec<MovePattern>,
    pub barrage: Vec<BarragePattern>,
    /// Frames between volleys in phase one.
    pub shoot_rate: u32,
    pub bullet_damage: i32,
    pub tint: Tint,
}

impl BossConfig {
    /// Boss for `level` (1 for wave 5, 2 for wave 10, ...). Levels past the
    /// roster reuse the last boss; every level above 1 scales hp and points by 30%.
    pub fn for_level(level: u32) -> Self {
        let level = level.max(1);
        let mut boss = match level {
            1 => Self {
                name: "Destroyer".into(),
                hp: 300,
                width: 80.0,
                height: 80.0,
                speed: 0.5,
                points: 500,
                movement: vec![MovePattern::Straight, MovePattern::Zigzag],
                barrage: vec![BarragePattern::Spread, BarragePattern::Homing, BarragePattern::Radial],
                shoot_rate: 70,
                bullet_damage: 30,
                tint: Tint::Red,
            },
            2 => Self {
                name: "Assault Drone".into(),
                hp: 500,
                width: 90.0,
                height: 90.0,
                speed: 0.8,
                points: 800,
                movement: vec![MovePattern::Circle, MovePattern::Rush],
                barrage: vec![BarragePattern::Spiral, BarragePattern::Radial, BarragePattern::Curtain],
                shoot_rate: 60,
                bullet_damage: 35,
                tint: Tint::Magenta,
            },
            _ => Self {
                name: "Titan".into(),
                hp: 800,
                width: 100.0,
                height: 100.0,
                speed: 0.4,
                points: 1200,
                movement: vec![MovePattern::Teleport, MovePattern::Shield],
                barrage: vec![
                    BarragePattern::Laser,
                    BarragePattern::Radial,
                    BarragePattern::Spread,
                    BarragePattern::Curtain,
                ],
                shoot_rate: 100,
                bullet_damage: 40,
                tint: Tint::Yellow,
            },
        };
        let multiplier = 1.0 + f64::from(level - 1) * 0.3;
        boss.hp = (f64::from(boss.hp) * multiplier).floor() as u32;
        boss.points = (f64::from(boss.points) * multiplier).floor() as u32;
        boss
    }

    /// Boss for a boss wave number.
    pub fn for_wave(wave: u32) -> Self {
        Self::for_level(wave / 5)
    }

    /// Apply the difficulty's hp and score adjustments.
    pub fn adjusted(mut self, difficulty: &Difficulty) -> Self {
        self.hp = difficulty.adjust_boss_hp(self.hp);
        self.points = difficulty.adjust_score(self.points);
        self
    }
}

/// A live boss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boss {
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub hp: i32,
    pub max_hp: i32,
    pub speed: f32,
    pub base_speed: f32,
    pub points: u32,
    pub tint: Tint,
    movement: Vec<MovePattern>,
    barrage: Vec<BarragePattern>,
    pub shoot_rate: u32,
    base_shoot_rate: u32,
    pub bullet_damage: i32,
    pub shoot_timer: u32,
    current_pattern: usize,
    pattern_timer: u32,
    pub phase: BossPhase,
    pub invulnerable: bool,
    invulnerable_timer: u32,
    rush_target_y: Option<f32>,
    canvas_width: f32,
    special_attacks: u32,
}

impl Boss {
    /// Place the boss horizontally centred, just above the top edge.
    pub fn new(config: BossConfig, canvas_width: f32) -> Self {
        let hp = config.hp as i32;
        Self {
            x: canvas_width / 2.0 - config.width / 2.0,
            y: -config.height,
            width: config.width,
            height: config.height,
            hp,
            max_hp: hp,
            speed: config.speed,
            base_speed: config.speed,
            points: config.points,
            tint: config.tint,
            movement: config.movement,
            barrage: config.barrage,
            shoot_rate: config.shoot_rate,
            base_shoot_rate: config.shoot_rate,
            bullet_damage: config.bullet_damage,
            shoot_timer: 0,
            current_pattern: 0,
            pattern_timer: 0,
            phase: BossPhase::One,
            invulnerable: false,
            invulnerable_timer: 0,
            rush_target_y: None,
            canvas_width,
            special_attacks: 0,
            name: config.name,
        }
    }

    pub fn is_entering(&self) -> bool {
        self.y < ENTRANCE_Y
    }

    pub fn current_movement(&self) -> Option<MovePattern> {
        self.movement.get(self.current_pattern).copied()
    }

    pub fn hp_ratio(&self) -> f32 {
        if self.max_hp <= 0 {
            return 0.0;
        }
        self.hp as f32 / self.max_hp as f32
    }

    /// Volleys fired in phase three.
    pub fn special_attacks(&self) -> u32 {
        self.special_attacks
    }

    /// Advance one frame. Returns the new phase when an escalation happened.
    pub fn update(&mut self, frame: u64, rng: &mut impl Rng) -> Option<BossPhase> {
        if self.is_entering() {
            self.y += 1.0;
            return None;
        }

        if self.invulnerable {
            self.invulnerable_timer = self.invulnerable_timer.saturating_sub(1);
            if self.invulnerable_timer == 0 {
                self.invulnerable = false;
            }
        }

        self.pattern_timer += 1;
        self.apply_movement(frame, rng);

        if self.pattern_timer > PATTERN_SWITCH_TICKS && !self.movement.is_empty() {
            self.current_pattern = (self.current_pattern + 1) % self.movement.len();
            self.pattern_timer = 0;
        }

        self.x = self.x.min(self.canvas_width - self.width).max(0.0);
        self.y = self.y.clamp(0.0, MAX_Y);

        let escalated = self.check_phase();
        self.shoot_timer += 1;
        escalated
    }

    fn apply_movement(&mut self, frame: u64, rng: &mut impl Rng) {
        let f = frame as f32;
        let tempo = if self.base_speed > 0.0 {
            self.speed / self.base_speed
        } else {
            1.0
        };
        match self.current_movement() {
            Some(MovePattern::Straight) => self.x += (f * 0.02).sin() * 3.0 * tempo,
            Some(MovePattern::Zigzag) => {
                self.x += (f * 0.05).sin() * 5.0 * tempo;
                self.y += (f * 0.05).cos() * 2.0 * tempo;
            },
            Some(MovePattern::Circle) => {
                let angle = f * 0.03;
                self.x = self.canvas_width / 2.0 + angle.cos() * 100.0 - self.width / 2.0;
                self.y = 100.0 + angle.sin() * 50.0;
            },
            Some(MovePattern::Rush) => {
                if self.pattern_timer % 180 == 0 {
                    self.rush_target_y = Some(rng.random_range(50.0..250.0));
                }
                if let Some(target) = self.rush_target_y {
                    self.y += (target - self.y) * (0.05 * tempo).min(1.0);
                }
            },
            Some(MovePattern::Teleport) => {
                if self.pattern_timer % 240 == 0 {
                    let span = (self.canvas_width - self.width).max(0.0);
                    self.x = if span > 0.0 { rng.random_range(0.0..span) } else { 0.0 };
                    self.grant_invulnerability(30);
                }
            },
            Some(MovePattern::Shield) => {
                if self.pattern_timer % 300 == 0 {
                    self.grant_invulnerability(120);
                }
            },
            None => {},
        }
    }

    fn grant_invulnerability(&mut self, frames: u32) {
        self.invulnerable = true;
        self.invulnerable_timer = frames;
    }

    /// One escalation per frame at most; a big hit in phase one reaches phase
    /// three over two frames.
    fn check_phase(&mut self) -> Option<BossPhase> {
        let ratio = self.hp_ratio();
        if ratio <= PHASE_THREE_THRESHOLD && self.phase == BossPhase::Two {
            self.phase = BossPhase::Three;
            self.shoot_rate = (f64::from(self.base_shoot_rate) * 0.5).floor() as u32;
            self.speed = self.base_speed * 2.0;
            return Some(self.phase);
        }
        if ratio <= PHASE_TWO_THRESHOLD && self.phase == BossPhase::One {
            self.phase = BossPhase::Two;
            self.shoot_rate = (f64::from(self.base_shoot_rate) * 0.67).floor() as u32;
            self.speed = self.base_speed * 1.5;
            return Some(self.phase);
        }
        None
    }

    /// Fire a volley aimed at `target` once the shoot timer reaches the rate.
    pub fn shoot(&mut self, target: (f32, f32), rng: &mut impl Rng) -> Option<Vec<BossBullet>> {
        if self.shoot_timer < self.shoot_rate || self.barrage.is_empty() {
            return None;
        }
        self.shoot_timer = 0;

        let mut bullets = Vec::new();
        if self.phase == BossPhase::Three {
            self.special_attacks += 1;
            if rng.random_bool(0.3) {
                let volley = self.volley(target);
                for pattern in &self.barrage {
                    pattern.emit(&volley, &mut bullets);
                }
                return Some(bullets);
            }
            if rng.random_bool(0.2) {
                self.shoot_timer = self.shoot_rate.saturating_sub(3);
            }
        }

        let picks: SmallVec<[BarragePattern; 3]> = (0..self.phase.volley_patterns())
            .filter_map(|_| self.barrage.choose(rng).copied())
            .collect();
        let volley = self.volley(target);
        for pattern in picks {
            pattern.emit(&volley, &mut bullets);
        }
        Some(bullets)
    }

    fn volley(&self, target: (f32, f32)) -> Volley {
        Volley {
            origin: (self.x + self.width / 2.0, self.y + self.height),
            target,
            shoot_timer: self.shoot_timer,
            canvas_width: self.canvas_width,
            damage: self.bullet_damage,
        }
    }

    /// Apply damage unless invulnerable. Returns whether the hit landed.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if self.invulnerable {
            return false;
        }
        self.hp -= amount;
        true
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }
}

impl Bounds for Boss {
    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}
