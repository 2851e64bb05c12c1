use std::fmt;

use crate::rewards::RewardId;

/// Errors surfaced by the shooter's public operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShooterError {
    /// Difficulty key outside `easy | normal | hard`.
    InvalidDifficultyTier(String),
    /// `choose_reward` called while no wave-clear offer is open.
    NoRewardPending,
    /// The chosen reward was not part of the current offer.
    RewardNotOffered(RewardId),
}

impl fmt::Display for ShooterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDifficultyTier(key) => write!(f, "invalid difficulty tier: {key}"),
            Self::NoRewardPending => write!(f, "no reward offer is pending"),
            Self::RewardNotOffered(id) => write!(f, "reward {id:?} was not offered"),
        }
    }
}

impl std::error::Error for ShooterError {}
