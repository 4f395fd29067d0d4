pub mod box_score;
pub mod error;
pub mod field_zone;
pub mod game_state;
pub mod outcome;
pub mod play;
pub mod runner;
pub mod schemas;
pub mod scorebook;
pub mod traits;
