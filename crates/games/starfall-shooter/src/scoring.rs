use serde::{Deserialize, Serialize};
use starfall_core::timer::Countdown;

/// Score multiplier for a combo count.
pub fn combo_multiplier(count: u32) -> u32 {
    match count {
        10.. => 10,
        7..=9 => 8,
        5..=6 => 5,
        3..=4 => 3,
        2 => 2,
        _ => 1,
    }
}

/// Points awarded for a kill.
pub fn kill_score(points: u32, multiplier: u32) -> u64 {
    u64::from(points) * u64::from(multiplier)
}

/// Level after a kill: one step per kill while `score > level * 100`.
pub fn next_level(level: u32, score: u64) -> u32 {
    if score > u64::from(level) * 100 { level + 1 } else { level }
}

/// Consecutive-kill tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboState {
    pub count: u32,
    pub multiplier: u32,
    pub timer: Countdown,
}

impl Default for ComboState {
    fn default() -> Self {
        Self {
            count: 0,
            multiplier: 1,
            timer: Countdown::idle(),
        }
    }
}

impl ComboState {
    /// Register a kill; refreshes the timer and returns the new multiplier.
    pub fn register_kill(&mut self, timeout_frames: u32) -> u32 {
        self.count += 1;
        self.timer.set(timeout_frames);
        self.multiplier = combo_multiplier(self.count);
        self.multiplier
    }

    /// Advance one frame. Returns `true` when the combo lapsed this frame.
    pub fn tick(&mut self) -> bool {
        if self.timer.tick() {
            self.reset();
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplier_step_function() {
        let expected = [(0, 1), (1, 1), (2, 2), (3, 3), (4, 3), (5, 5), (6, 5), (7, 8), (9, 8), (10, 10), (42, 10)];
        for (count, mult) in expected {
            assert_eq!(combo_multiplier(count), mult, "count {count}");
        }
    }

    #[test]
    fn kills_within_timeout_build_combo() {
        let mut combo = ComboState::default();
        assert_eq!(combo.register_kill(180), 1);
        for _ in 0..100 {
            assert!(!combo.tick());
        }
        assert_eq!(combo.register_kill(180), 2);
        assert_eq!(combo.register_kill(180), 3);
        assert_eq!(combo.count, 3);
    }

    #[test]
    fn combo_lapses_after_timeout() {
        let mut combo = ComboState::default();
        combo.register_kill(180);
        combo.register_kill(180);
        let lapsed = (0..180).filter(|_| combo.tick()).count();
        assert_eq!(lapsed, 1);
        assert_eq!(combo, ComboState::default());
        assert_eq!(combo.register_kill(180), 1);
    }

    #[test]
    fn level_advances_one_step_per_kill() {
        assert_eq!(next_level(1, 100), 1);
        assert_eq!(next_level(1, 101), 2);
        assert_eq!(next_level(2, 950), 3);
    }

    #[test]
    fn kill_score_applies_multiplier() {
        assert_eq!(kill_score(30, 5), 150);
        assert_eq!(kill_score(0, 10), 0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn multiplier_is_monotonic(count in 0u32..1000) {
                prop_assert!(combo_multiplier(count + 1) >= combo_multiplier(count));
                prop_assert!((1..=10).contains(&combo_multiplier(count)));
            }
        }
    }
}
