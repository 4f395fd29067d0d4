use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use fixed_map::Map;
use serde::{Deserialize, Serialize};
use strum::ParseError;

use crate::scoring::outcome::{AdvancementCategory, Outcome};
use crate::scoring::play::{BaseState, PlayResult, ScoredPlayers};
use crate::scoring::traits::{saturating_outs, Base, Outs, PlayerId, RunnerSlot, HOME_STATION};

/// What happens to one runner (or the batter) on a play.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RunnerDecision {
    Stay,
    AdvanceTo(Base),
    Score,
    Out,
}

impl RunnerDecision {
    /// The decision that puts a runner starting from `slot` on `station`.
    fn reaching(slot: RunnerSlot, station: u8) -> Self {
        if station == slot.station() {
            Self::Stay
        } else {
            Base::from_station(station).map_or(Self::Score, Self::AdvanceTo)
        }
    }
}

impl fmt::Display for RunnerDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stay => write!(f, "stay"),
            Self::AdvanceTo(base) => write!(f, "{base}"),
            Self::Score => write!(f, "score"),
            Self::Out => write!(f, "out"),
        }
    }
}

impl FromStr for RunnerDecision {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stay" => Ok(Self::Stay),
            "score" | "home" => Ok(Self::Score),
            "out" => Ok(Self::Out),
            base => Base::from_str(base).map(Self::AdvanceTo),
        }
    }
}

impl TryFrom<String> for RunnerDecision {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value)
    }
}

impl From<RunnerDecision> for String {
    fn from(decision: RunnerDecision) -> Self {
        decision.to_string()
    }
}

/// Per-slot runner decisions for one play.
#[derive(Debug, Eq, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(from = "RunnerResultsRepr", into = "RunnerResultsRepr")]
pub struct RunnerResults(Map<RunnerSlot, RunnerDecision>);

impl RunnerResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: RunnerSlot) -> Option<RunnerDecision> {
        self.0.get(slot).copied()
    }

    pub fn set(&mut self, slot: RunnerSlot, decision: RunnerDecision) -> Option<RunnerDecision> {
        self.0.insert(slot, decision)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RunnerSlot, RunnerDecision)> + '_ {
        self.0.iter().map(|(slot, decision)| (slot, *decision))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn outs(&self) -> usize {
        self.iter()
            .filter(|(_, decision)| *decision == RunnerDecision::Out)
            .count()
    }
}

impl FromIterator<(RunnerSlot, RunnerDecision)> for RunnerResults {
    fn from_iter<T: IntoIterator<Item = (RunnerSlot, RunnerDecision)>>(iter: T) -> Self {
        let mut results = Self::new();
        for (slot, decision) in iter {
            results.set(slot, decision);
        }
        results
    }
}

/// Wire shape of `RunnerResults`: one optional field per slot.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct RunnerResultsRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    batter: Option<RunnerDecision>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    first: Option<RunnerDecision>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    second: Option<RunnerDecision>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    third: Option<RunnerDecision>,
}

impl From<RunnerResultsRepr> for RunnerResults {
    fn from(repr: RunnerResultsRepr) -> Self {
        [
            (RunnerSlot::Batter, repr.batter),
            (RunnerSlot::First, repr.first),
            (RunnerSlot::Second, repr.second),
            (RunnerSlot::Third, repr.third),
        ]
        .into_iter()
        .filter_map(|(slot, decision)| decision.map(|d| (slot, d)))
        .collect()
    }
}

impl From<RunnerResults> for RunnerResultsRepr {
    fn from(results: RunnerResults) -> Self {
        Self {
            batter: results.get(RunnerSlot::Batter),
            first: results.get(RunnerSlot::First),
            second: results.get(RunnerSlot::Second),
            third: results.get(RunnerSlot::Third),
        }
    }
}

/// The choices a caller may offer for one slot.
#[derive(Debug, Eq, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct SlotOptions {
    pub should_show: bool,
    pub choices: Vec<RunnerDecision>,
}

#[derive(Debug, Eq, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct PerBaseOptions {
    pub batter: SlotOptions,
    pub first: SlotOptions,
    pub second: SlotOptions,
    pub third: SlotOptions,
}

impl PerBaseOptions {
    pub const fn get(&self, slot: RunnerSlot) -> &SlotOptions {
        match slot {
            RunnerSlot::Batter => &self.batter,
            RunnerSlot::First => &self.first,
            RunnerSlot::Second => &self.second,
            RunnerSlot::Third => &self.third,
        }
    }

    fn get_mut(&mut self, slot: RunnerSlot) -> &mut SlotOptions {
        match slot {
            RunnerSlot::Batter => &mut self.batter,
            RunnerSlot::First => &mut self.first,
            RunnerSlot::Second => &mut self.second,
            RunnerSlot::Third => &mut self.third,
        }
    }
}

/// A projected runner outcome, shown to a human for confirmation before the
/// play is resolved.
#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct Projection {
    pub outcome: Outcome,
    pub category: AdvancementCategory,
    /// False when the outs already on the play end the half-inning, in which
    /// case no advancement choices should be offered at all.
    pub advancement_relevant: bool,
    pub guess: RunnerResults,
    pub options: PerBaseOptions,
}

impl Projection {
    /// The guess with every override applied on top of it.
    pub fn confirm(&self, overrides: &RunnerResults) -> RunnerResults {
        let mut confirmed = self.guess.clone();
        for (slot, decision) in overrides.iter() {
            confirmed.set(slot, decision);
        }
        confirmed
    }
}

/// Minimum station each occupied base must reach when the batter is headed
/// to `batter_station`. A runner is pushed only while every base behind
/// them is taken; once the chain breaks nobody further ahead is forced.
pub(crate) fn forced_stations(bases: &BaseState, batter_station: u8) -> [Option<u8>; 3] {
    let mut forced = [None; 3];
    let mut lead = batter_station;
    for (i, base) in Base::ALL.into_iter().enumerate() {
        if !bases.is_occupied(base) {
            continue;
        }
        let station = base.station();
        forced[i] = if station <= lead {
            lead = (lead + 1).min(HOME_STATION);
            Some(lead)
        } else {
            Some(station)
        };
    }
    forced
}

fn forced_station(forced: &[Option<u8>; 3], base: Base) -> u8 {
    forced[usize::from(base.station() - 1)].unwrap_or_else(|| base.station())
}

/// Resolves a walk. The batter takes first and a runner moves up exactly one
/// base only when every base behind them is occupied.
pub fn force_walk(batter_id: PlayerId, current_bases: &BaseState) -> PlayResult {
    let forced = forced_stations(current_bases, 1);
    let mut new_base_state = BaseState::default();
    let mut scored = ScoredPlayers::new();
    new_base_state.set(Base::First, Some(batter_id));
    for (base, runner) in current_bases.runners() {
        match Base::from_station(forced_station(&forced, base)) {
            Some(target) => new_base_state.set(target, Some(runner)),
            None => scored.push(runner),
        }
    }
    PlayResult {
        new_base_state,
        runs_on_play: u8::try_from(scored.len()).unwrap_or(u8::MAX),
        outs_recorded: saturating_outs(0),
        scored_player_ids: scored,
    }
}

fn guess(outcome: Outcome, category: AdvancementCategory, bases: &BaseState) -> RunnerResults {
    let mut guess = RunnerResults::new();
    let batter_station = outcome.batter_station();
    let forced = forced_stations(bases, batter_station.unwrap_or(0));
    match (category, batter_station) {
        (AdvancementCategory::Walk | AdvancementCategory::Hit, Some(station)) => {
            guess.set(RunnerSlot::Batter, RunnerDecision::reaching(RunnerSlot::Batter, station));
        }
        _ => {
            guess.set(RunnerSlot::Batter, RunnerDecision::Out);
        }
    }
    for (base, _) in bases.runners() {
        let slot = RunnerSlot::from(base);
        let station = match (category, outcome) {
            (AdvancementCategory::Hit, Outcome::Single | Outcome::Double) => {
                (base.station() + 2).clamp(forced_station(&forced, base), HOME_STATION)
            }
            (AdvancementCategory::Hit, Outcome::Triple | Outcome::HomeRun) => HOME_STATION,
            (AdvancementCategory::Hit | AdvancementCategory::Walk, _) => {
                forced_station(&forced, base)
            }
            (AdvancementCategory::Manual, Outcome::SacrificeFly) if base == Base::Third => {
                HOME_STATION
            }
            _ => base.station(),
        };
        guess.set(slot, RunnerDecision::reaching(slot, station));
    }
    guess
}

/// Every legal decision for `slot` when it must reach at least `minimum`.
fn choices_from(slot: RunnerSlot, minimum: u8) -> Vec<RunnerDecision> {
    let mut choices = Vec::with_capacity(6);
    if slot.base().is_some() && minimum == slot.station() {
        choices.push(RunnerDecision::Stay);
    }
    choices.extend(
        Base::ALL
            .into_iter()
            .filter(|b| b.station() > slot.station() && b.station() >= minimum)
            .map(RunnerDecision::AdvanceTo),
    );
    choices.push(RunnerDecision::Score);
    choices.push(RunnerDecision::Out);
    choices
}

fn options(
    outcome: Outcome,
    category: AdvancementCategory,
    bases: &BaseState,
    show: bool,
) -> PerBaseOptions {
    let mut options = PerBaseOptions::default();
    let discretionary = matches!(category, AdvancementCategory::Hit | AdvancementCategory::Manual);
    if !discretionary {
        return options;
    }
    let batter_station = if category == AdvancementCategory::Hit {
        outcome.batter_station().unwrap_or(1)
    } else {
        1
    };
    let forced = forced_stations(bases, batter_station);

    let batter = options.get_mut(RunnerSlot::Batter);
    batter.should_show = show;
    batter.choices = choices_from(RunnerSlot::Batter, batter_station);
    if category == AdvancementCategory::Manual {
        batter.choices.retain(|c| *c != RunnerDecision::Out);
        batter.choices.insert(0, RunnerDecision::Out);
    }

    for (base, _) in bases.runners() {
        let slot = RunnerSlot::from(base);
        let minimum = if category == AdvancementCategory::Hit {
            forced_station(&forced, base)
        } else {
            base.station()
        };
        let entry = options.get_mut(slot);
        entry.should_show = show;
        entry.choices = choices_from(slot, minimum);
    }
    options
}

/// Projects runner movement for `outcome` against the current bases.
///
/// The guess always holds a decision for the batter and every occupied base,
/// so confirming it unchanged is enough to resolve the play.
/// When the batter's out ends the half-inning nobody advances, so every
/// runner is guessed to stay put.
pub fn project(outcome: Outcome, current_bases: &BaseState, outs: Outs) -> Projection {
    let category = outcome.resolution(current_bases);
    let mut guess = guess(outcome, category, current_bases);
    let advancement_relevant = outs.get() + guess.outs() < 3;
    if !advancement_relevant {
        for (base, _) in current_bases.runners() {
            guess.set(RunnerSlot::from(base), RunnerDecision::Stay);
        }
    }
    Projection {
        outcome,
        category,
        advancement_relevant,
        options: options(outcome, category, current_bases, advancement_relevant),
        guess,
    }
}
