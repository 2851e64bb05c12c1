use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::loadout::LoadoutModifiers;

/// Core trait that Starfall game simulations implement.
///
/// The host drives exactly one `update` per presented frame and owns
/// rendering, audio and persistence; the game only owns simulation state.
/// There is no delta time: the frame is the timestep.
pub trait ArcadeGame: Send + Sync {
    /// Frame-level event emitted by `update`.
    type Event;

    /// Game metadata for the start screen.
    fn metadata(&self) -> GameMetadata;

    /// Called when a run starts (also on restart).
    fn init(&mut self, session: &SessionConfig);

    /// Advance the simulation by one fixed step. Returns the events of that step.
    fn update(&mut self) -> Vec<Self::Event>;

    /// Serialize the simulation state snapshot.
    fn serialize_state(&self) -> Vec<u8>;

    /// Replace the simulation state with a previously serialized snapshot.
    fn apply_state(&mut self, state: &[u8]);

    /// Queue host input (MessagePack bytes) for the next tick.
    fn apply_input(&mut self, input: &[u8]);

    /// Logical ticks per second.
    fn tick_rate(&self) -> f32 {
        60.0
    }

    /// Freeze the simulation (menus, modal dialogs).
    fn pause(&mut self);

    /// Unfreeze the simulation.
    fn resume(&mut self);

    fn is_paused(&self) -> bool;

    /// Whether the current run has ended.
    fn is_run_over(&self) -> bool;

    /// Summary of the current (or just-finished) run.
    fn run_summary(&self) -> RunSummary;
}

/// Game metadata for the start screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetadata {
    pub name: String,
    pub description: String,
    pub estimated_run_duration: Duration,
}

/// Configuration for a single run, chosen on the start screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Difficulty tier key (e.g. "easy", "normal", "hard").
    pub difficulty: String,
    /// Selected character id, reported to progression.
    pub character_id: String,
    /// Character loadout multipliers.
    pub loadout: LoadoutModifiers,
    /// Seed for the simulation RNG.
    pub seed: u64,
    pub custom: HashMap<String, serde_json::Value>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            difficulty: "normal".to_string(),
            character_id: "fighter".to_string(),
            loadout: LoadoutModifiers::default(),
            seed: 0,
            custom: HashMap::new(),
        }
    }
}

/// Result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub score: u64,
    pub wave: u32,
    pub kills: u32,
    pub cleared: bool,
}

/// Generates the boilerplate `ArcadeGame` methods shared by every game:
/// `serialize_state`, `apply_state`, `pause`, `resume`, `is_paused`, `is_run_over`.
///
/// Requires the implementing struct to have `state: $StateType` and `paused: bool` fields,
/// and `$StateType` to have a `run_over: bool` field.
#[macro_export]
macro_rules! arcade_game_boilerplate {
    (state_type: $StateType:ty) => {
        fn serialize_state(&self) -> Vec<u8> {
            rmp_serde::to_vec(&self.state).expect("game state serialization must succeed")
        }

        fn apply_state(&mut self, state: &[u8]) {
            match rmp_serde::from_slice::<$StateType>(state) {
                Ok(s) => self.state = s,
                Err(e) => tracing::debug!(error = %e, "Dropped malformed state snapshot"),
            }
        }

        fn pause(&mut self) {
            self.paused = true;
        }

        fn resume(&mut self) {
            self.paused = false;
        }

        fn is_paused(&self) -> bool {
            self.paused
        }

        fn is_run_over(&self) -> bool {
            self.state.run_over
        }
    };
}
