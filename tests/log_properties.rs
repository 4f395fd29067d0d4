//! Property-based tests over generated play logs.
//!
//! Logs are built by driving a `Scorebook` with random outcomes, occasional
//! runner overrides drawn from the projected options, and occasional undos.

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use strum::IntoEnumIterator;

use scorekeeper::{
    aggregate, derive_state, force_walk, replay_state, team_totals, BaseState, BattingCounts,
    GameSetup, GameState, HalfInning, Outcome, PlayRequest, PlayerId, RunnerResults, RunnerSlot,
    Scorebook,
};

const SLOTS: [RunnerSlot; 4] = [
    RunnerSlot::Batter,
    RunnerSlot::First,
    RunnerSlot::Second,
    RunnerSlot::Third,
];

fn id(s: &str) -> PlayerId {
    PlayerId::from(s).unwrap()
}

fn roster() -> Vec<PlayerId> {
    (1..=9).map(|i| id(&format!("P{i}"))).collect()
}

#[derive(Debug, Clone)]
struct Step {
    outcome: Outcome,
    slot: usize,
    choice: Option<usize>,
    undo: bool,
}

fn step() -> impl Strategy<Value = Step> {
    (
        prop::sample::select(Outcome::iter().collect::<Vec<_>>()),
        0usize..4,
        prop::option::weighted(0.3, any::<usize>()),
        prop::bool::weighted(0.1),
    )
        .prop_map(|(outcome, slot, choice, undo)| Step {
            outcome,
            slot,
            choice,
            undo,
        })
}

fn request(book: &Scorebook, step: &Step) -> PlayRequest {
    let slot = SLOTS[step.slot];
    let runners = book.project(step.outcome).ok().and_then(|projection| {
        let choices = &projection.options.get(slot).choices;
        let choice = step.choice?;
        (!choices.is_empty()).then(|| {
            [(slot, choices[choice % choices.len()])]
                .into_iter()
                .collect::<RunnerResults>()
        })
    });
    PlayRequest {
        runners,
        ..PlayRequest::new(step.outcome)
    }
}

/// Plays out `steps` and returns the book with the state observed just
/// before each play still in the log was recorded.
fn play_out(
    steps: &[Step],
    batting_half: HalfInning,
) -> Result<(Scorebook, Vec<GameState>), TestCaseError> {
    let mut book = Scorebook::new(GameSetup {
        roster: roster(),
        batting_half,
        initial_score: 0,
        initial_opponent_score: 0,
    })
    .unwrap();
    let mut history = vec![];
    for step in steps {
        if step.undo {
            if book.undo().is_some() {
                history.pop();
            }
            continue;
        }
        let before = book.state().unwrap();
        let len = book.log().len();
        match book.record(request(&book, step)) {
            Ok(_) => history.push(before),
            Err(_) => prop_assert_eq!(book.log().len(), len),
        }
    }
    prop_assert_eq!(history.len(), book.log().len());
    Ok((book, history))
}

fn half() -> impl Strategy<Value = HalfInning> {
    prop_oneof![Just(HalfInning::Top), Just(HalfInning::Bottom)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Deriving twice gives the same state, and so does folding play by play
    #[test]
    fn derivation_is_idempotent_and_matches_fold(
        steps in prop::collection::vec(step(), 0..80),
        batting_half in half()
    ) {
        let (book, _) = play_out(&steps, batting_half)?;
        let roster = roster();
        let first = derive_state(book.log(), &roster, 0, 0).unwrap();
        let second = derive_state(book.log(), &roster, 0, 0).unwrap();
        prop_assert_eq!(first, second);
        prop_assert_eq!(first, replay_state(book.log(), &roster, 0, 0).unwrap());
    }

    /// Undoing plays one at a time walks back through every earlier state
    #[test]
    fn undo_restores_each_previous_state(
        steps in prop::collection::vec(step(), 1..60),
        batting_half in half()
    ) {
        let (mut book, history) = play_out(&steps, batting_half)?;
        for expected in history.iter().rev() {
            prop_assert!(book.undo().is_some());
            prop_assert_eq!(book.state().unwrap(), *expected);
        }
        prop_assert!(book.log().is_empty());
    }

    /// Team totals are the sum of the player lines, and runs match the score
    #[test]
    fn team_totals_are_sums_of_lines(
        steps in prop::collection::vec(step(), 0..80),
        batting_half in half()
    ) {
        let (book, _) = play_out(&steps, batting_half)?;
        let lines = aggregate(book.log(), &roster());
        let totals = team_totals(&lines);
        let summed = lines.iter().fold(BattingCounts::default(), |mut acc, line| {
            acc += line.counts;
            acc
        });
        prop_assert_eq!(totals, summed);
        prop_assert_eq!(lines.len(), 9);
        prop_assert_eq!(totals.plate_appearances as usize, book.log().len());
        prop_assert_eq!(totals.runs, u32::from(book.state().unwrap().score));
        prop_assert!(totals.rbi <= totals.runs);
    }

    /// The live state never shows three outs or a player on two bases
    #[test]
    fn live_state_is_always_legal(
        steps in prop::collection::vec(step(), 0..80),
        batting_half in half()
    ) {
        let (book, _) = play_out(&steps, batting_half)?;
        let state = book.state().unwrap();
        prop_assert!(state.outs.get() <= 2);
        prop_assert!(!state.runners.has_ghost_runner());
        prop_assert!(state.batting_order_index < 9);
        prop_assert_eq!(state.half_inning, batting_half);
    }
}

#[test]
fn walk_forces_only_when_bases_behind_are_full() {
    let loaded = BaseState {
        first: Some(id("A")),
        second: Some(id("B")),
        third: Some(id("C")),
    };
    let result = force_walk(id("D"), &loaded);
    assert_eq!(
        result.new_base_state,
        BaseState {
            first: Some(id("D")),
            second: Some(id("A")),
            third: Some(id("B")),
        }
    );
    assert_eq!(result.scored_player_ids.as_slice(), &[id("C")]);
    assert_eq!(result.runs_on_play, 1);
}

#[test]
fn nine_innings_of_strikeouts() {
    let mut book = Scorebook::new(GameSetup {
        roster: roster(),
        batting_half: HalfInning::Top,
        initial_score: 0,
        initial_opponent_score: 0,
    })
    .unwrap();
    for n in 0..27 {
        let play = book.record(PlayRequest::new(Outcome::Strikeout)).unwrap();
        assert_eq!(play.batter_id, roster()[n % 9]);
        assert_eq!(play.inning as usize, n / 3 + 1);
    }
    let state = book.state().unwrap();
    assert_eq!(state.inning, 10);
    assert_eq!(state.batting_order_index, 0);
    assert_eq!(book.box_score().totals.strikeouts, 27);
    assert_eq!(book.box_score().totals.rates().avg, ".000");
}
