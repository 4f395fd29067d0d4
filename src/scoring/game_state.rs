use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::scoring::error::ScoringError;
use crate::scoring::play::{BaseState, Play};
use crate::scoring::traits::{next_half_inning, saturating_outs, HalfInning, Inning, Outs, PlayerId};

pub type Frame = (Inning, HalfInning);

/// Live situation of a game, always derived from the play log and never
/// stored on its own.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub inning: Inning,
    pub half_inning: HalfInning,
    pub outs: Outs,
    pub batting_order_index: usize,
    pub runners: BaseState,
    pub score: u16,
    pub opponent_score: u16,
}

impl GameState {
    pub fn initial(score: u16, opponent_score: u16) -> Self {
        Self {
            inning: 1,
            half_inning: HalfInning::Top,
            outs: saturating_outs(0),
            batting_order_index: 0,
            runners: BaseState::default(),
            score,
            opponent_score,
        }
    }

    pub const fn frame(&self) -> Frame {
        (self.inning, self.half_inning)
    }

    /// Situation at the end of `frame` given the outs recorded in it so far.
    /// Three outs close the half: bases clear and the next half begins.
    fn settle(self, frame: Frame, frame_outs: usize, runners: BaseState) -> Self {
        if frame_outs >= 3 {
            let (inning, half_inning) = next_half_inning(frame.0, frame.1);
            Self {
                inning,
                half_inning,
                outs: saturating_outs(0),
                runners: BaseState::default(),
                ..self
            }
        } else {
            Self {
                inning: frame.0,
                half_inning: frame.1,
                outs: saturating_outs(frame_outs),
                runners,
                ..self
            }
        }
    }
}

/// Tracks the half-inning of the most recent play and the outs recorded in
/// it, refusing any play that cannot follow what came before.
#[derive(Debug, Default)]
struct FrameTracker {
    last_frame: Option<Frame>,
    frame_outs: usize,
}

impl FrameTracker {
    fn advance(&mut self, play: &Play) -> Result<usize, ScoringError> {
        if play.inning == 0 {
            return Err(ScoringError::inconsistent(play.id, "innings start at 1"));
        }
        if play.resulting_base_state.has_ghost_runner() {
            return Err(ScoringError::inconsistent(
                play.id,
                "a runner occupies two bases",
            ));
        }
        let frame = play.frame();
        match self.last_frame {
            Some(last) if frame < last => {
                return Err(ScoringError::inconsistent(
                    play.id,
                    format!(
                        "{} {} comes after {} {}",
                        frame.1, frame.0, last.1, last.0
                    ),
                ));
            }
            Some(last) if frame == last && self.frame_outs >= 3 => {
                return Err(ScoringError::inconsistent(
                    play.id,
                    format!("{} {} already has three outs", frame.1, frame.0),
                ));
            }
            Some(last) if frame == last => self.frame_outs += play.outs_on_play.get(),
            _ => self.frame_outs = play.outs_on_play.get(),
        }
        self.last_frame = Some(frame);
        Ok(self.frame_outs)
    }
}

fn batting_order_index(roster: &[PlayerId], last_batter: &PlayerId, plays: usize) -> usize {
    match roster.iter().position(|player| player == last_batter) {
        Some(position) => (position + 1) % roster.len(),
        None => {
            warn!(
                batter = %last_batter,
                "Batter is not on the roster, falling back to plate appearance count"
            );
            plays % roster.len()
        }
    }
}

fn runs_on(play: &Play) -> u16 {
    u16::from(play.runs())
}

/// Reconstructs the live game state from the full play log.
///
/// Inning, half-inning and runners are read off the last play; outs are the
/// sum over every play in that same half-inning. The batting order pointer
/// is the slot after the last batter, so shortening the log by one always
/// yields the right next batter. Runs are counted from the players who
/// scored rather than from RBI, since runs that score on errors carry none.
pub fn derive_state(
    log: &[Play],
    roster: &[PlayerId],
    initial_score: u16,
    initial_opponent_score: u16,
) -> Result<GameState, ScoringError> {
    if roster.is_empty() {
        return Err(ScoringError::RosterEmpty);
    }
    let mut tracker = FrameTracker::default();
    for play in log {
        tracker.advance(play)?;
    }
    let initial = GameState::initial(initial_score, initial_opponent_score);
    let Some(last) = log.last() else {
        return Ok(initial);
    };

    let frame_outs = log
        .iter()
        .filter(|play| play.frame() == last.frame())
        .map(|play| play.outs_on_play.get())
        .sum();
    let runs = log.iter().map(runs_on).fold(0u16, u16::saturating_add);

    let state = GameState {
        batting_order_index: batting_order_index(roster, &last.batter_id, log.len()),
        score: initial_score.saturating_add(runs),
        ..initial
    };
    Ok(state.settle(last.frame(), frame_outs, last.resulting_base_state))
}

/// Incremental fold over the play log, one play at a time.
#[derive(Debug)]
pub struct Replay<'a> {
    roster: &'a [PlayerId],
    tracker: FrameTracker,
    plays: usize,
    state: GameState,
}

impl<'a> Replay<'a> {
    pub fn new(
        roster: &'a [PlayerId],
        initial_score: u16,
        initial_opponent_score: u16,
    ) -> Result<Self, ScoringError> {
        if roster.is_empty() {
            return Err(ScoringError::RosterEmpty);
        }
        Ok(Self {
            roster,
            tracker: FrameTracker::default(),
            plays: 0,
            state: GameState::initial(initial_score, initial_opponent_score),
        })
    }

    pub fn apply(&mut self, play: &Play) -> Result<GameState, ScoringError> {
        let frame_outs = self.tracker.advance(play)?;
        self.plays += 1;
        let state = GameState {
            batting_order_index: batting_order_index(self.roster, &play.batter_id, self.plays),
            score: self.state.score.saturating_add(runs_on(play)),
            ..self.state
        };
        self.state = state.settle(play.frame(), frame_outs, play.resulting_base_state);
        Ok(self.state)
    }

    pub const fn state(&self) -> GameState {
        self.state
    }
}

/// Same result as `derive_state`, computed by folding every play in order.
pub fn replay_state(
    log: &[Play],
    roster: &[PlayerId],
    initial_score: u16,
    initial_opponent_score: u16,
) -> Result<GameState, ScoringError> {
    let mut replay = Replay::new(roster, initial_score, initial_opponent_score)?;
    for play in log {
        replay.apply(play)?;
    }
    Ok(replay.state())
}
