use serde::{Deserialize, Serialize};

/// Data-driven configuration for the shooter simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShooterConfig {
    /// Playfield width in pixels.
    pub canvas_width: f32,
    /// Playfield height in pixels.
    pub canvas_height: f32,
    /// Simulation frames per second (used to convert millisecond delays).
    pub frames_per_second: u32,
    pub player: PlayerConfig,
    /// Frames a combo survives without a kill.
    pub combo_timeout_frames: u32,
    pub spawn: SpawnConfig,
    pub drops: DropConfig,
    /// Frames a collected power-up lasts.
    pub powerup_duration_frames: u32,
    /// HP restored by a shield pickup.
    pub shield_heal: i32,
    /// Frames the boss warning banner stays visible.
    pub boss_warning_frames: u32,
    /// Finishing this wave ends the run as cleared. `None` means endless.
    pub clear_wave: Option<u32>,
}

/// Player base stats before any modifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub width: f32,
    pub height: f32,
    /// Distance from the bottom edge to the top of the ship.
    pub bottom_offset: f32,
    pub base_hp: u32,
    pub base_speed: f32,
    pub base_shoot_delay_ms: u32,
    /// Floor for the loadout-adjusted shoot delay.
    pub min_base_shoot_delay_ms: u32,
    /// Floor for the reward-adjusted shoot delay.
    pub min_shoot_delay_ms: u32,
    pub rapid_shoot_delay_ms: u32,
    pub base_damage: f64,
    pub bullet_speed: f32,
    pub bullet_width: f32,
    pub bullet_height: f32,
    /// Horizontal speed of the outer three-way bullets.
    pub spread_vx: f32,
    pub magnet_range: f32,
    pub contact_damage: i32,
    pub shielded_contact_damage: i32,
    pub hit_flash_frames: u32,
}

/// Enemy spawn pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub min_active_enemies: u32,
    pub max_simultaneous_spawn: u32,
    /// Remaining kills at or below which the last-enemy phase starts.
    pub last_enemy_threshold: u32,
}

/// Power-up drop tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DropConfig {
    /// Drop chance per kill before the difficulty multiplier.
    pub base_rate: f64,
    pub size: f32,
    pub fall_speed: f32,
    pub magnet_pull: f32,
}

impl Default for ShooterConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800.0,
            canvas_height: 600.0,
            frames_per_second: 60,
            player: PlayerConfig::default(),
            combo_timeout_frames: 180,
            spawn: SpawnConfig::default(),
            drops: DropConfig::default(),
            powerup_duration_frames: 600,
            shield_heal: 30,
            boss_warning_frames: 180,
            clear_wave: None,
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            width: 50.0,
            height: 50.0,
            bottom_offset: 80.0,
            base_hp: 100,
            base_speed: 5.0,
            base_shoot_delay_ms: 200,
            min_base_shoot_delay_ms: 80,
            min_shoot_delay_ms: 60,
            rapid_shoot_delay_ms: 100,
            base_damage: 1.0,
            bullet_speed: 8.0,
            bullet_width: 4.0,
            bullet_height: 15.0,
            spread_vx: 3.0,
            magnet_range: 50.0,
            contact_damage: 10,
            shielded_contact_damage: 5,
            hit_flash_frames: 12,
        }
    }
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            min_active_enemies: 3,
            max_simultaneous_spawn: 3,
            last_enemy_threshold: 2,
        }
    }
}

impl Default for DropConfig {
    fn default() -> Self {
        Self {
            base_rate: 0.3,
            size: 20.0,
            fall_speed: 2.0,
            magnet_pull: 4.0,
        }
    }
}

impl ShooterConfig {
    /// Load config from environment or TOML file, falling back to defaults.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("STARFALL_SHOOTER_CONFIG")
            && let Some(config) = Self::from_file(&path)
        {
            return config;
        }
        Self::from_file("config/shooter.toml").unwrap_or_default()
    }

    fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        match toml::from_str::<Self>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("Failed to parse {path}: {e}, using defaults");
                None
            },
        }
    }
}
