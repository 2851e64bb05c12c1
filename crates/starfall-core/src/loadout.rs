use serde::{Deserialize, Serialize};

/// Lower bound applied to every loadout multiplier.
pub const MIN_LOADOUT_MULTIPLIER: f32 = 0.5;

/// Character loadout multipliers supplied by the start screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadoutModifiers {
    pub hp: f32,
    pub damage: f32,
    pub speed: f32,
    pub fire_rate: f32,
}

impl Default for LoadoutModifiers {
    fn default() -> Self {
        Self {
            hp: 1.0,
            damage: 1.0,
            speed: 1.0,
            fire_rate: 1.0,
        }
    }
}

impl LoadoutModifiers {
    /// Replace missing (zero or non-finite) values with 1.0 and clamp the
    /// rest to at least [`MIN_LOADOUT_MULTIPLIER`].
    pub fn sanitized(&self) -> Self {
        Self {
            hp: sanitize(self.hp),
            damage: sanitize(self.damage),
            speed: sanitize(self.speed),
            fire_rate: sanitize(self.fire_rate),
        }
    }
}

fn sanitize(value: f32) -> f32 {
    if !value.is_finite() || value == 0.0 {
        return 1.0;
    }
    value.max(MIN_LOADOUT_MULTIPLIER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_values_clamped_to_half() {
        let m = LoadoutModifiers {
            hp: 0.2,
            damage: 0.5,
            speed: 1.4,
            fire_rate: 0.49,
        }
        .sanitized();
        assert_eq!(m.hp, 0.5);
        assert_eq!(m.damage, 0.5);
        assert_eq!(m.speed, 1.4);
        assert_eq!(m.fire_rate, 0.5);
    }

    #[test]
    fn missing_values_fall_back_to_neutral() {
        let m = LoadoutModifiers {
            hp: f32::NAN,
            damage: 0.0,
            speed: f32::INFINITY,
            fire_rate: 1.0,
        }
        .sanitized();
        assert_eq!(m, LoadoutModifiers::default());
    }

    #[test]
    fn negative_values_clamp_to_half() {
        let m = LoadoutModifiers {
            hp: -3.0,
            damage: -0.1,
            ..LoadoutModifiers::default()
        }
        .sanitized();
        assert_eq!(m.hp, 0.5);
        assert_eq!(m.damage, 0.5);
        assert_eq!(m.speed, 1.0);
    }

    #[test]
    fn partial_json_defaults_missing_fields() {
        let m: LoadoutModifiers = serde_json::from_str(r#"{"speed":1.2}"#).unwrap();
        assert_eq!(m.speed, 1.2);
        assert_eq!(m.hp, 1.0);
        assert_eq!(m.fire_rate, 1.0);
    }
}
