use arrayvec::ArrayVec;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::scoring::error::ScoringError;
use crate::scoring::field_zone::FieldLocation;
use crate::scoring::outcome::{AdvancementCategory, Outcome};
use crate::scoring::runner::{force_walk, RunnerDecision, RunnerResults};
use crate::scoring::traits::{
    saturating_outs, Base, HalfInning, Inning, Outs, PlayId, PlayerId, RunnerSlot,
};

pub type ScoredPlayers = ArrayVec<PlayerId, 4>;

/// Who is standing on each base.
#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone, Default, Serialize, Deserialize)]
pub struct BaseState {
    pub first: Option<PlayerId>,
    pub second: Option<PlayerId>,
    pub third: Option<PlayerId>,
}

impl BaseState {
    pub const fn get(&self, base: Base) -> Option<PlayerId> {
        match base {
            Base::First => self.first,
            Base::Second => self.second,
            Base::Third => self.third,
        }
    }

    pub fn set(&mut self, base: Base, runner: Option<PlayerId>) {
        *self.slot_mut(base) = runner;
    }

    fn slot_mut(&mut self, base: Base) -> &mut Option<PlayerId> {
        match base {
            Base::First => &mut self.first,
            Base::Second => &mut self.second,
            Base::Third => &mut self.third,
        }
    }

    pub const fn is_occupied(&self, base: Base) -> bool {
        self.get(base).is_some()
    }

    pub const fn is_empty(&self) -> bool {
        self.first.is_none() && self.second.is_none() && self.third.is_none()
    }

    /// Occupied bases with their runners, first to third.
    pub fn runners(&self) -> impl Iterator<Item = (Base, PlayerId)> + '_ {
        Base::ALL
            .into_iter()
            .filter_map(|base| self.get(base).map(|runner| (base, runner)))
    }

    pub fn num_runners_on_base(&self) -> usize {
        self.runners().count()
    }

    pub fn base_of(&self, player: &PlayerId) -> Option<Base> {
        self.runners()
            .find_map(|(base, runner)| (&runner == player).then_some(base))
    }

    // Integer representation of the base state with each binary digit representing a base
    pub fn bits(&self) -> u8 {
        u8::from(self.first.is_some())
            | u8::from(self.second.is_some()) << 1
            | u8::from(self.third.is_some()) << 2
    }

    /// True if one player is listed on two bases at once.
    pub fn has_ghost_runner(&self) -> bool {
        !self.runners().map(|(_, runner)| runner).all_unique()
    }
}

/// The atomic outcome of resolving one plate appearance.
#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct PlayResult {
    pub new_base_state: BaseState,
    pub runs_on_play: u8,
    pub outs_recorded: Outs,
    pub scored_player_ids: ScoredPlayers,
}

impl PlayResult {
    pub(crate) fn batter_out(bases: &BaseState) -> Self {
        Self {
            new_base_state: *bases,
            runs_on_play: 0,
            outs_recorded: saturating_outs(1),
            scored_player_ids: ArrayVec::new(),
        }
    }
}

/// Accumulates runner decisions into a new base state. Runners are placed in
/// the order they are given; landing on a base that has already been claimed
/// is refused rather than silently overwriting whoever got there first.
#[derive(Debug, Default)]
struct ResultBuilder {
    bases: BaseState,
    scored: ScoredPlayers,
    outs: usize,
}

impl ResultBuilder {
    fn place(&mut self, base: Base, runner: PlayerId) -> Result<(), ScoringError> {
        if self.bases.is_occupied(base) {
            return Err(ScoringError::ConflictingRunnerDecision { base });
        }
        self.bases.set(base, Some(runner));
        Ok(())
    }

    fn apply(
        &mut self,
        slot: RunnerSlot,
        runner: PlayerId,
        decision: RunnerDecision,
    ) -> Result<(), ScoringError> {
        match (decision, slot.base()) {
            (RunnerDecision::Stay, None) => Err(ScoringError::IllegalRunnerDecision {
                slot,
                reason: "the batter has no base to stay on",
            }),
            (RunnerDecision::Stay, Some(current)) => self.place(current, runner),
            (RunnerDecision::AdvanceTo(target), Some(current)) if target < current => {
                Err(ScoringError::IllegalRunnerDecision {
                    slot,
                    reason: "runners cannot move backwards",
                })
            }
            (RunnerDecision::AdvanceTo(target), _) => self.place(target, runner),
            (RunnerDecision::Score, _) => {
                self.scored.push(runner);
                Ok(())
            }
            (RunnerDecision::Out, _) if self.outs >= 3 => Err(ScoringError::IllegalRunnerDecision {
                slot,
                reason: "a play cannot record more than three outs",
            }),
            (RunnerDecision::Out, _) => {
                self.outs += 1;
                Ok(())
            }
        }
    }

    fn finish(self) -> PlayResult {
        PlayResult {
            new_base_state: self.bases,
            runs_on_play: u8::try_from(self.scored.len()).unwrap_or(u8::MAX),
            outs_recorded: saturating_outs(self.outs),
            scored_player_ids: self.scored,
        }
    }
}

fn apply_runner_results(
    batter_id: PlayerId,
    bases: &BaseState,
    results: &RunnerResults,
) -> Result<PlayResult, ScoringError> {
    let mut builder = ResultBuilder::default();
    let batter_decision = results
        .get(RunnerSlot::Batter)
        .ok_or(ScoringError::MissingRunnerDecision {
            slot: RunnerSlot::Batter,
        })?;
    builder.apply(RunnerSlot::Batter, batter_id, batter_decision)?;

    for slot in RunnerSlot::RUNNERS_LEAD_FIRST {
        let Some(runner) = slot.base().and_then(|base| bases.get(base)) else {
            continue;
        };
        let decision = results
            .get(slot)
            .ok_or(ScoringError::MissingRunnerDecision { slot })?;
        builder.apply(slot, runner, decision)?;
    }
    Ok(builder.finish())
}

/// Resolves a plate appearance into a `PlayResult`.
///
/// Walks and automatic outs need no runner decisions and ignore any that are
/// passed. Hits and fielded outs with runners aboard must come with a decision
/// for the batter and for every occupied base; the resolver never fills in a
/// missing one.
pub fn resolve(
    outcome: Outcome,
    batter_id: PlayerId,
    current_bases: &BaseState,
    runner_results: Option<&RunnerResults>,
) -> Result<PlayResult, ScoringError> {
    let category = outcome.resolution(current_bases);
    let result = match category {
        AdvancementCategory::Walk => force_walk(batter_id, current_bases),
        AdvancementCategory::AutomaticOut => PlayResult::batter_out(current_bases),
        AdvancementCategory::Hit | AdvancementCategory::Manual => {
            let results = runner_results.ok_or(ScoringError::MissingRunnerDecision {
                slot: RunnerSlot::Batter,
            })?;
            apply_runner_results(batter_id, current_bases, results)?
        }
    };
    debug!(
        %outcome,
        %batter_id,
        %category,
        runs = result.runs_on_play,
        outs = result.outs_recorded.get(),
        "Resolved play"
    );
    Ok(result)
}

/// A confirmed entry in the play log. Never edited after it is appended.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Play {
    pub id: PlayId,
    pub inning: Inning,
    pub half_inning: HalfInning,
    pub batter_id: PlayerId,
    pub outcome: Outcome,
    pub rbi: u8,
    pub outs_on_play: Outs,
    pub resulting_base_state: BaseState,
    pub scored_player_ids: ScoredPlayers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_location: Option<FieldLocation>,
}

impl Play {
    pub fn new(
        id: PlayId,
        (inning, half_inning): (Inning, HalfInning),
        batter_id: PlayerId,
        outcome: Outcome,
        result: PlayResult,
        field_location: Option<FieldLocation>,
    ) -> Self {
        let rbi = if outcome.credits_rbi() {
            result.runs_on_play
        } else {
            0
        };
        Self {
            id,
            inning,
            half_inning,
            batter_id,
            outcome,
            rbi,
            outs_on_play: result.outs_recorded,
            resulting_base_state: result.new_base_state,
            scored_player_ids: result.scored_player_ids,
            field_location,
        }
    }

    pub const fn frame(&self) -> (Inning, HalfInning) {
        (self.inning, self.half_inning)
    }

    pub fn runs(&self) -> u8 {
        u8::try_from(self.scored_player_ids.len()).unwrap_or(u8::MAX)
    }
}
