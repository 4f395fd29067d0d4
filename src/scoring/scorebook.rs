use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::scoring::box_score::{line_score, BoxScore, LineScore, OpponentRuns};
use crate::scoring::error::ScoringError;
use crate::scoring::field_zone::{FieldLocation, FieldPoint};
use crate::scoring::game_state::{derive_state, GameState, Replay};
use crate::scoring::outcome::Outcome;
use crate::scoring::play::{resolve, Play};
use crate::scoring::runner::{project, Projection, RunnerResults};
use crate::scoring::traits::{next_half_inning, HalfInning, Inning, PlayerId};

/// Everything known about a game before the first pitch.
#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct GameSetup {
    /// Batting order. Each id is at most 36 bytes; a setup naming a longer
    /// id is rejected when it is read.
    pub roster: Vec<PlayerId>,
    #[serde(default)]
    pub batting_half: HalfInning,
    #[serde(default)]
    pub initial_score: u16,
    #[serde(default)]
    pub initial_opponent_score: u16,
}

/// A plate appearance as entered by the scorer. Runner decisions are
/// overrides on top of the projected guess; anything left out is taken as
/// projected.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct PlayRequest {
    pub outcome: Outcome,
    #[serde(default)]
    pub runners: Option<RunnerResults>,
    /// Defaults to whoever is due up.
    #[serde(default)]
    pub batter: Option<PlayerId>,
    #[serde(default)]
    pub location: Option<FieldPoint>,
}

impl PlayRequest {
    pub const fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            runners: None,
            batter: None,
            location: None,
        }
    }
}

/// One team's scorebook for one game: the append-only play log plus the
/// opponent runs entered by hand. Every view is recomputed from those on
/// each call.
#[derive(Debug, Clone)]
pub struct Scorebook {
    setup: GameSetup,
    log: Vec<Play>,
    opponent_runs: Vec<OpponentRuns>,
}

impl Scorebook {
    pub fn new(setup: GameSetup) -> Result<Self, ScoringError> {
        if setup.roster.is_empty() {
            return Err(ScoringError::RosterEmpty);
        }
        Ok(Self {
            setup,
            log: vec![],
            opponent_runs: vec![],
        })
    }

    pub const fn setup(&self) -> &GameSetup {
        &self.setup
    }

    pub fn log(&self) -> &[Play] {
        &self.log
    }

    pub fn opponent_runs(&self) -> &[OpponentRuns] {
        &self.opponent_runs
    }

    fn opponent_score(&self) -> u16 {
        self.opponent_runs
            .iter()
            .map(|entry| entry.runs)
            .fold(self.setup.initial_opponent_score, u16::saturating_add)
    }

    /// The reducer's view of the log, without regard to which half this team
    /// bats in.
    pub fn derived_state(&self) -> Result<GameState, ScoringError> {
        derive_state(
            &self.log,
            &self.setup.roster,
            self.setup.initial_score,
            self.opponent_score(),
        )
    }

    /// The situation for this team's next plate appearance. When the log
    /// leaves off in the opponent's half, play picks up in our next one.
    pub fn state(&self) -> Result<GameState, ScoringError> {
        let state = self.derived_state()?;
        if state.half_inning == self.setup.batting_half {
            return Ok(state);
        }
        let (inning, half_inning) = next_half_inning(state.inning, state.half_inning);
        Ok(GameState {
            inning,
            half_inning,
            ..state
        })
    }

    pub fn project(&self, outcome: Outcome) -> Result<Projection, ScoringError> {
        let state = self.state()?;
        Ok(project(outcome, &state.runners, state.outs))
    }

    /// Resolves a plate appearance and appends it to the log. Nothing is
    /// appended if resolution fails.
    pub fn record(&mut self, request: PlayRequest) -> Result<Play, ScoringError> {
        let state = self.state()?;
        let batter_id = match request.batter {
            Some(batter_id) => batter_id,
            None => *self
                .setup
                .roster
                .get(state.batting_order_index)
                .ok_or(ScoringError::RosterEmpty)?,
        };
        let projection = project(request.outcome, &state.runners, state.outs);
        let confirmed = if projection.advancement_relevant {
            projection.confirm(&request.runners.unwrap_or_default())
        } else {
            if request.runners.as_ref().is_some_and(|r| !r.is_empty()) {
                debug!(
                    outcome = %request.outcome,
                    "Ignoring runner decisions on the third out"
                );
            }
            projection.guess
        };
        let result = resolve(request.outcome, batter_id, &state.runners, Some(&confirmed))?;
        let location = request
            .location
            .map(|point| FieldLocation::tag(point, request.outcome));
        let id = self
            .log
            .iter()
            .map(|play| play.id)
            .max()
            .map_or(1, |max| max + 1);
        let play = Play::new(id, state.frame(), batter_id, request.outcome, result, location);
        debug!(
            id,
            inning = play.inning,
            half = %play.half_inning,
            batter = %play.batter_id,
            outcome = %play.outcome,
            rbi = play.rbi,
            "Recorded play"
        );
        self.push_checked(play.clone())?;
        Ok(play)
    }

    /// Appends `play` only if the log stays consistent with it on the end.
    fn push_checked(&mut self, play: Play) -> Result<(), ScoringError> {
        if play.rbi > play.runs() {
            return Err(ScoringError::inconsistent(play.id, "more RBI than runs scored"));
        }
        if play.rbi > 0 && !play.outcome.credits_rbi() {
            return Err(ScoringError::inconsistent(
                play.id,
                format!("{} never credits an RBI", play.outcome),
            ));
        }
        let mut replay = Replay::new(
            &self.setup.roster,
            self.setup.initial_score,
            self.setup.initial_opponent_score,
        )?;
        for existing in self.log.iter().chain(std::iter::once(&play)) {
            replay.apply(existing)?;
        }
        self.log.push(play);
        Ok(())
    }

    /// Appends a play that was resolved elsewhere, e.g. one loaded back from
    /// storage. A play whose id is already in the log is a double submit and
    /// is skipped. Returns whether the play was appended.
    pub fn append(&mut self, play: Play) -> Result<bool, ScoringError> {
        if self.log.iter().any(|existing| existing.id == play.id) {
            warn!(id = play.id, "Skipping play already in the log");
            return Ok(false);
        }
        debug!(id = play.id, "Appending play");
        self.push_checked(play)?;
        Ok(true)
    }

    /// Removes the most recent play. The state before it is whatever the
    /// shortened log derives to.
    pub fn undo(&mut self) -> Option<Play> {
        let removed = self.log.pop();
        if let Some(play) = &removed {
            debug!(id = play.id, "Undid play");
        }
        removed
    }

    pub fn add_opponent_runs(&mut self, inning: Inning, runs: u16) {
        self.opponent_runs.push(OpponentRuns { inning, runs });
    }

    pub fn undo_opponent_runs(&mut self) -> Option<OpponentRuns> {
        self.opponent_runs.pop()
    }

    pub fn box_score(&self) -> BoxScore {
        BoxScore::from_log(&self.log, &self.setup.roster)
    }

    pub fn line_score(&self) -> LineScore {
        line_score(&self.log, &self.opponent_runs)
    }
}
