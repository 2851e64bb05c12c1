pub mod events;
pub mod game_trait;
pub mod loadout;
pub mod store;
pub mod time;
pub mod timer;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::events::{ProgressEvent, ProgressionRecorder};
    use crate::game_trait::{ArcadeGame, SessionConfig};
    use crate::loadout::LoadoutModifiers;

    /// Create a session on the given difficulty with a fixed seed.
    pub fn session(difficulty: &str, seed: u64) -> SessionConfig {
        SessionConfig {
            difficulty: difficulty.to_string(),
            seed,
            ..SessionConfig::default()
        }
    }

    /// Create a session with a custom loadout.
    pub fn session_with_loadout(difficulty: &str, loadout: LoadoutModifiers) -> SessionConfig {
        SessionConfig {
            loadout,
            ..session(difficulty, 7)
        }
    }

    /// Run N game ticks without input, returning all accumulated events.
    pub fn run_game_ticks<G: ArcadeGame>(game: &mut G, n: usize) -> Vec<G::Event> {
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(game.update());
        }
        all_events
    }

    /// Assert that the game's serialized state differs from `before`.
    pub fn assert_game_state_changed<G: ArcadeGame>(game: &G, before: &[u8]) {
        let after = game.serialize_state();
        assert_ne!(
            before,
            &after[..],
            "Game state should have changed after operation"
        );
    }

    /// Recorder that keeps every event it receives.
    #[derive(Debug, Default)]
    pub struct RecordingRecorder {
        pub events: Vec<ProgressEvent>,
    }

    impl ProgressionRecorder for RecordingRecorder {
        fn record(&mut self, event: &ProgressEvent) {
            self.events.push(event.clone());
        }
    }

    impl RecordingRecorder {
        pub fn count(&self, pred: impl Fn(&ProgressEvent) -> bool) -> usize {
            self.events.iter().filter(|e| pred(e)).count()
        }
    }

    // ================================================================
    // Game Trait Contract Tests
    // ================================================================
    // Every ArcadeGame implementation calls these from its own
    // #[cfg(test)] module with a concrete game instance.

    /// After init(), serialize_state() must return non-empty bytes.
    pub fn contract_init_creates_state<G: ArcadeGame>(game: &mut G) {
        game.init(&session("normal", 1));
        let state = game.serialize_state();
        assert!(
            !state.is_empty(),
            "serialize_state() must return non-empty bytes after init"
        );
    }

    /// update() must advance the frame counter.
    pub fn contract_update_advances_state<G: ArcadeGame>(game: &mut G) {
        let before = game.serialize_state();
        game.update();
        assert_game_state_changed(game, &before);
    }

    /// serialize_state → apply_state must be stable after one roundtrip.
    pub fn contract_state_roundtrip_preserves<G: ArcadeGame>(game: &mut G) {
        let state_a = game.serialize_state();
        game.apply_state(&state_a);
        let state_b = game.serialize_state();
        game.apply_state(&state_b);
        let state_c = game.serialize_state();
        assert_eq!(
            state_b, state_c,
            "State must be stable after serialize→apply→serialize roundtrip"
        );
    }

    /// pause() must freeze the simulation, resume() must unfreeze it.
    pub fn contract_pause_stops_updates<G: ArcadeGame>(game: &mut G) {
        game.pause();
        let before = game.serialize_state();
        game.update();
        let during_pause = game.serialize_state();
        assert_eq!(before, during_pause, "State must not change while paused");

        game.resume();
        game.update();
        let after_resume = game.serialize_state();
        assert_ne!(during_pause, after_resume, "State must change after resume");
    }

    /// Garbage input bytes must be ignored without panicking.
    pub fn contract_garbage_input_ignored<G: ArcadeGame>(game: &mut G) {
        let before = game.serialize_state();
        game.apply_input(&[0xFF, 0x00, 0x13, 0x37]);
        game.apply_input(&[]);
        assert_eq!(
            before,
            game.serialize_state(),
            "Malformed input must not touch state"
        );
    }

    /// Truncated snapshots must be rejected without corrupting state.
    pub fn contract_truncated_state_rejected<G: ArcadeGame>(game: &mut G) {
        let before = game.serialize_state();
        let truncated = &before[..before.len() / 2];
        game.apply_state(truncated);
        assert_eq!(before, game.serialize_state());
    }
}
