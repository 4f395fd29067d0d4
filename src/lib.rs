#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::cargo)]
#![warn(
    clippy::nursery,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::cast_precision_loss
)]

pub mod game_file;
pub mod scoring;

pub use scoring::box_score::{
    aggregate, line_score, team_totals, BattingCounts, BoxScore, LineScore, OpponentRuns,
    PlayerGameStats,
};
pub use scoring::error::ScoringError;
pub use scoring::field_zone::{clamp, zone_of, FieldLocation, FieldPoint, FieldZone};
pub use scoring::game_state::{derive_state, replay_state, GameState, Replay};
pub use scoring::outcome::{AdvancementCategory, Outcome};
pub use scoring::play::{resolve, BaseState, Play, PlayResult};
pub use scoring::runner::{
    force_walk, project, PerBaseOptions, Projection, RunnerDecision, RunnerResults, SlotOptions,
};
pub use scoring::scorebook::{GameSetup, PlayRequest, Scorebook};
pub use scoring::traits::{Base, HalfInning, Inning, Outs, PlayId, PlayerId, RunnerSlot};
