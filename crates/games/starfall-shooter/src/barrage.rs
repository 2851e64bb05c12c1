//! Boss bullet patterns.

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::collision::{Bounds, Rect};

/// A named bullet-emission geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarragePattern {
    /// Five-bullet fan.
    Spread,
    /// Eight-bullet ring rotated by the shoot timer, drifting downward.
    Spiral,
    /// One large fast bolt.
    Laser,
    /// Twelve-bullet ring.
    Radial,
    /// One bullet aimed at the player.
    Homing,
    /// A row of ten bullets across the screen.
    Curtain,
}

/// A bullet fired by a boss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossBullet {
    pub pattern: BarragePattern,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub vx: f32,
    pub vy: f32,
    pub damage: i32,
}

impl BossBullet {
    pub fn advance(&mut self) {
        self.x += self.vx;
        self.y += self.vy;
    }

    /// Boss bullets stay alive while above the bottom edge and strictly inside the sides.
    pub fn is_on_screen(&self, canvas_width: f32, canvas_height: f32) -> bool {
        self.y < canvas_height && self.x > 0.0 && self.x < canvas_width
    }
}

impl Bounds for BossBullet {
    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Where and how a volley is fired.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volley {
    /// Boss bottom-centre.
    pub origin: (f32, f32),
    /// Player centre, used by homing shots.
    pub target: (f32, f32),
    /// Shoot timer after the fire reset; rotates the spiral.
    pub shoot_timer: u32,
    pub canvas_width: f32,
    pub damage: i32,
}

impl BarragePattern {
    /// Emit this pattern's bullets into `out`.
    pub fn emit(self, volley: &Volley, out: &mut Vec<BossBullet>) {
        let (cx, cy) = volley.origin;
        let bullet = |x: f32, width: f32, height: f32, vx: f32, vy: f32| BossBullet {
            pattern: self,
            x,
            y: cy,
            width,
            height,
            vx,
            vy,
            damage: volley.damage,
        };
        match self {
            Self::Spread => {
                for i in -2i8..=2 {
                    out.push(bullet(cx - 3.0, 6.0, 12.0, f32::from(i) * 2.0, 4.0));
                }
            },
            Self::Spiral => {
                let phase = volley.shoot_timer as f32 * 0.1;
                for i in 0..8 {
                    let angle = TAU / 8.0 * i as f32 + phase;
                    out.push(bullet(cx - 3.0, 6.0, 12.0, angle.cos() * 3.0, angle.sin() * 3.0 + 2.0));
                }
            },
            Self::Laser => out.push(bullet(cx - 5.0, 10.0, 30.0, 0.0, 6.0)),
            Self::Radial => {
                for i in 0..12 {
                    let angle = TAU / 12.0 * i as f32;
                    out.push(bullet(cx - 3.0, 6.0, 12.0, angle.cos() * 4.0, angle.sin() * 4.0));
                }
            },
            Self::Homing => {
                let angle = (volley.target.1 - cy).atan2(volley.target.0 - cx);
                out.push(bullet(cx - 4.0, 8.0, 8.0, angle.cos() * 5.0, angle.sin() * 5.0));
            },
            Self::Curtain => {
                let step = volley.canvas_width / 10.0;
                for i in 0..10 {
                    out.push(bullet(step * i as f32, 6.0, 12.0, 0.0, 3.0));
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volley() -> Volley {
        Volley {
            origin: (400.0, 130.0),
            target: (400.0, 545.0),
            shoot_timer: 0,
            canvas_width: 800.0,
            damage: 30,
        }
    }

    fn emit(pattern: BarragePattern) -> Vec<BossBullet> {
        let mut out = Vec::new();
        pattern.emit(&volley(), &mut out);
        out
    }

    #[test]
    fn bullet_counts_match_geometry() {
        for (pattern, count) in [
            (BarragePattern::Spread, 5),
            (BarragePattern::Spiral, 8),
            (BarragePattern::Laser, 1),
            (BarragePattern::Radial, 12),
            (BarragePattern::Homing, 1),
            (BarragePattern::Curtain, 10),
        ] {
            let bullets = emit(pattern);
            assert_eq!(bullets.len(), count, "{pattern:?}");
            assert!(bullets.iter().all(|b| b.damage == 30));
        }
    }

    #[test]
    fn spread_fans_symmetrically() {
        let vx: Vec<f32> = emit(BarragePattern::Spread).iter().map(|b| b.vx).collect();
        assert_eq!(vx, vec![-4.0, -2.0, 0.0, 2.0, 4.0]);
    }

    #[test]
    fn homing_aims_at_target() {
        let b = &emit(BarragePattern::Homing)[0];
        assert!(b.vx.abs() < 1e-4);
        assert!((b.vy - 5.0).abs() < 1e-4);
        assert_eq!(b.x, 396.0);
    }

    #[test]
    fn curtain_spans_canvas() {
        let xs: Vec<f32> = emit(BarragePattern::Curtain).iter().map(|b| b.x).collect();
        assert_eq!(xs.first(), Some(&0.0));
        assert_eq!(xs.last(), Some(&720.0));
    }

    #[test]
    fn spiral_rotates_with_timer() {
        let mut rotated = Vec::new();
        BarragePattern::Spiral.emit(
            &Volley {
                shoot_timer: 10,
                ..volley()
            },
            &mut rotated,
        );
        let plain = emit(BarragePattern::Spiral);
        assert!((plain[0].vx - rotated[0].vx).abs() > 0.1);
    }

    #[test]
    fn pruning_bounds() {
        let mut b = emit(BarragePattern::Laser).remove(0);
        assert!(b.is_on_screen(800.0, 600.0));
        b.y = 600.0;
        assert!(!b.is_on_screen(800.0, 600.0));
        b.y = 10.0;
        b.x = 0.0;
        assert!(!b.is_on_screen(800.0, 600.0));
    }
}
