//! Tick-counted timers and the run-epoch guard for deferred actions.

use serde::{Deserialize, Serialize};

/// Convert a millisecond duration to whole frames at `fps`, rounding up.
pub fn ms_to_frames(ms: u32, fps: u32) -> u32 {
    (u64::from(ms) * u64::from(fps)).div_ceil(1000) as u32
}

/// A frame countdown. Idle when it reaches zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    remaining: u32,
}

impl Countdown {
    pub const fn idle() -> Self {
        Self { remaining: 0 }
    }

    pub const fn start(frames: u32) -> Self {
        Self { remaining: frames }
    }

    pub fn set(&mut self, frames: u32) {
        self.remaining = frames;
    }

    pub fn clear(&mut self) {
        self.remaining = 0;
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.remaining > 0
    }

    /// Advance one frame. Returns `true` only on the frame the countdown reaches zero.
    pub fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }
}

/// Token captured when a deferred action is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EpochToken(u64);

/// Monotonic run counter. Advancing it invalidates every outstanding [`EpochToken`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunEpoch(u64);

impl RunEpoch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new run and return its token.
    pub fn advance(&mut self) -> EpochToken {
        self.0 = self.0.wrapping_add(1);
        EpochToken(self.0)
    }

    pub fn token(&self) -> EpochToken {
        EpochToken(self.0)
    }

    pub fn is_current(&self, token: EpochToken) -> bool {
        self.0 == token.0
    }
}

/// One-shot actions fired a number of frames after scheduling.
///
/// Each action remembers the epoch it was scheduled under; actions from a
/// previous run are discarded instead of fired.
#[derive(Debug, Clone)]
pub struct DeferredQueue<A> {
    pending: Vec<Deferred<A>>,
}

#[derive(Debug, Clone)]
struct Deferred<A> {
    timer: Countdown,
    token: EpochToken,
    action: A,
}

impl<A> Default for DeferredQueue<A> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<A> DeferredQueue<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` to fire after `frames` ticks (at least one).
    pub fn schedule(&mut self, frames: u32, token: EpochToken, action: A) {
        self.pending.push(Deferred {
            timer: Countdown::start(frames.max(1)),
            token,
            action,
        });
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Advance every pending action by one frame and return those that are due
    /// and still belong to the current epoch.
    pub fn tick(&mut self, epoch: &RunEpoch) -> Vec<A> {
        let mut due = Vec::new();
        let mut keep = Vec::with_capacity(self.pending.len());
        for mut entry in self.pending.drain(..) {
            if !epoch.is_current(entry.token) {
                tracing::debug!("Discarded deferred action from a previous run");
                continue;
            }
            if entry.timer.tick() {
                due.push(entry.action);
            } else {
                keep.push(entry);
            }
        }
        self.pending = keep;
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_fires_once() {
        let mut c = Countdown::start(3);
        assert!(!c.tick());
        assert!(!c.tick());
        assert!(c.tick());
        assert!(!c.is_running());
        assert!(!c.tick(), "idle countdown never fires again");
    }

    #[test]
    fn ms_to_frames_rounds_up() {
        assert_eq!(ms_to_frames(200, 60), 12);
        assert_eq!(ms_to_frames(3000, 60), 180);
        assert_eq!(ms_to_frames(80, 60), 5);
        assert_eq!(ms_to_frames(1, 60), 1);
        assert_eq!(ms_to_frames(0, 60), 0);
    }

    #[test]
    fn stale_epoch_token_is_rejected() {
        let mut epoch = RunEpoch::new();
        let first = epoch.advance();
        assert!(epoch.is_current(first));
        let second = epoch.advance();
        assert!(!epoch.is_current(first));
        assert!(epoch.is_current(second));
    }

    #[test]
    fn deferred_action_fires_after_delay() {
        let mut epoch = RunEpoch::new();
        let token = epoch.advance();
        let mut queue = DeferredQueue::new();
        queue.schedule(2, token, "hide");
        assert!(queue.tick(&epoch).is_empty());
        assert_eq!(queue.tick(&epoch), vec!["hide"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn deferred_action_from_old_run_is_dropped() {
        let mut epoch = RunEpoch::new();
        let token = epoch.advance();
        let mut queue = DeferredQueue::new();
        queue.schedule(5, token, 1u8);
        epoch.advance();
        for _ in 0..10 {
            assert!(queue.tick(&epoch).is_empty());
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn zero_delay_schedules_for_next_tick() {
        let mut epoch = RunEpoch::new();
        let token = epoch.advance();
        let mut queue = DeferredQueue::new();
        queue.schedule(0, token, ());
        assert_eq!(queue.tick(&epoch).len(), 1);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn countdown_fires_exactly_once(frames in 1u32..500) {
                let mut c = Countdown::start(frames);
                let fired = (0..frames + 10).filter(|_| c.tick()).count();
                prop_assert_eq!(fired, 1);
            }
        }
    }
}
