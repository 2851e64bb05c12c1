//! Progression layer: consumes [`starfall_core::events::ProgressEvent`]s and
//! turns them into session statistics, a persistent profile, per-difficulty
//! records and achievement unlocks.

pub mod achievements;
pub mod profile;
pub mod recorder;
pub mod session;

pub use achievements::{
    AchievementBook, AchievementProgress, Metric, Milestone, MilestoneCatalog, MilestoneRule, ProgressView, Rarity,
};
pub use profile::{DifficultyRecord, DifficultyRecords, ProfileStats};
pub use recorder::StatsRecorder;
pub use session::SessionStats;
