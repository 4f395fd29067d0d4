use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::scoring::box_score::{BattingCounts, PlayerGameStats};
use crate::scoring::error::ScoringError;
use crate::scoring::game_state::GameState;
use crate::scoring::outcome::Outcome;
use crate::scoring::play::{BaseState, Play};
use crate::scoring::scorebook::Scorebook;
use crate::scoring::traits::{HalfInning, Inning, PlayId, PlayerId};

pub type RowIter<'a, T> = Box<dyn Iterator<Item = T> + 'a>;

/// Flattens one game's scorebook into rows of a single output table.
pub trait ScorebookToVec<'a>: Sized {
    fn from_scorebook(
        game_id: &'a str,
        book: &'a Scorebook,
    ) -> Result<RowIter<'a, Self>, ScoringError>;
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct PlayRow<'a> {
    game_id: &'a str,
    play_id: PlayId,
    inning: Inning,
    half_inning: HalfInning,
    batter_id: PlayerId,
    outcome: Outcome,
    rbi: u8,
    runs: u8,
    outs_on_play: usize,
    runner_on_first: Option<PlayerId>,
    runner_on_second: Option<PlayerId>,
    runner_on_third: Option<PlayerId>,
    scored_player_ids: String,
    location_x: Option<f64>,
    location_y: Option<f64>,
    zone: String,
}

impl<'a> PlayRow<'a> {
    fn new(game_id: &'a str, play: &Play) -> Self {
        let BaseState {
            first,
            second,
            third,
        } = play.resulting_base_state;
        Self {
            game_id,
            play_id: play.id,
            inning: play.inning,
            half_inning: play.half_inning,
            batter_id: play.batter_id,
            outcome: play.outcome,
            rbi: play.rbi,
            runs: play.runs(),
            outs_on_play: play.outs_on_play.get(),
            runner_on_first: first,
            runner_on_second: second,
            runner_on_third: third,
            scored_player_ids: play.scored_player_ids.iter().join(";"),
            location_x: play.field_location.map(|l| l.point.x),
            location_y: play.field_location.map(|l| l.point.y),
            zone: play
                .field_location
                .map(|l| l.zone.to_string())
                .unwrap_or_default(),
        }
    }
}

impl<'a> ScorebookToVec<'a> for PlayRow<'a> {
    fn from_scorebook(
        game_id: &'a str,
        book: &'a Scorebook,
    ) -> Result<RowIter<'a, Self>, ScoringError> {
        Ok(Box::new(book.log().iter().map(move |play| Self::new(game_id, play))))
    }
}

/// A batting line. The team total row has no player id.
#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct BattingLineRow<'a> {
    game_id: &'a str,
    player_id: Option<PlayerId>,
    plate_appearances: u32,
    at_bats: u32,
    hits: u32,
    singles: u32,
    doubles: u32,
    triples: u32,
    home_runs: u32,
    walks: u32,
    strikeouts: u32,
    sacrifice_flies: u32,
    reached_on_error: u32,
    fielders_choices: u32,
    rbi: u32,
    runs: u32,
    avg: String,
    obp: String,
    slg: String,
    ops: String,
}

impl<'a> BattingLineRow<'a> {
    fn new(game_id: &'a str, player_id: Option<PlayerId>, counts: &BattingCounts) -> Self {
        let rates = counts.rates();
        Self {
            game_id,
            player_id,
            plate_appearances: counts.plate_appearances,
            at_bats: counts.at_bats,
            hits: counts.hits(),
            singles: counts.singles,
            doubles: counts.doubles,
            triples: counts.triples,
            home_runs: counts.home_runs,
            walks: counts.walks,
            strikeouts: counts.strikeouts,
            sacrifice_flies: counts.sacrifice_flies,
            reached_on_error: counts.reached_on_error,
            fielders_choices: counts.fielders_choices,
            rbi: counts.rbi,
            runs: counts.runs,
            avg: rates.avg,
            obp: rates.obp,
            slg: rates.slg,
            ops: rates.ops,
        }
    }

    fn from_player(game_id: &'a str, line: &PlayerGameStats) -> Self {
        Self::new(game_id, Some(line.player_id), &line.counts)
    }
}

impl<'a> ScorebookToVec<'a> for BattingLineRow<'a> {
    fn from_scorebook(
        game_id: &'a str,
        book: &'a Scorebook,
    ) -> Result<RowIter<'a, Self>, ScoringError> {
        let box_score = book.box_score();
        let team = Self::new(game_id, None, &box_score.totals);
        let rows = box_score
            .lines
            .iter()
            .map(|line| Self::from_player(game_id, line))
            .chain(std::iter::once(team))
            .collect_vec();
        Ok(Box::new(rows.into_iter()))
    }
}

#[derive(Debug, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct LineScoreRow<'a> {
    game_id: &'a str,
    inning: usize,
    runs: u16,
    opponent_runs: u16,
}

impl<'a> ScorebookToVec<'a> for LineScoreRow<'a> {
    fn from_scorebook(
        game_id: &'a str,
        book: &'a Scorebook,
    ) -> Result<RowIter<'a, Self>, ScoringError> {
        let line = book.line_score();
        let rows = line
            .team
            .iter()
            .zip(&line.opponent)
            .enumerate()
            .map(|(i, (runs, opponent_runs))| Self {
                game_id,
                inning: i + 1,
                runs: *runs,
                opponent_runs: *opponent_runs,
            })
            .collect_vec();
        Ok(Box::new(rows.into_iter()))
    }
}

/// The live situation after the final action in the game file.
#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct GameStateRow<'a> {
    game_id: &'a str,
    plays: usize,
    inning: Inning,
    half_inning: HalfInning,
    outs: usize,
    batting_order_index: usize,
    runner_on_first: Option<PlayerId>,
    runner_on_second: Option<PlayerId>,
    runner_on_third: Option<PlayerId>,
    score: u16,
    opponent_score: u16,
}

impl<'a> GameStateRow<'a> {
    fn new(game_id: &'a str, plays: usize, state: &GameState) -> Self {
        Self {
            game_id,
            plays,
            inning: state.inning,
            half_inning: state.half_inning,
            outs: state.outs.get(),
            batting_order_index: state.batting_order_index,
            runner_on_first: state.runners.first,
            runner_on_second: state.runners.second,
            runner_on_third: state.runners.third,
            score: state.score,
            opponent_score: state.opponent_score,
        }
    }
}

impl<'a> ScorebookToVec<'a> for GameStateRow<'a> {
    fn from_scorebook(
        game_id: &'a str,
        book: &'a Scorebook,
    ) -> Result<RowIter<'a, Self>, ScoringError> {
        let state = book.state()?;
        Ok(Box::new(std::iter::once(Self::new(
            game_id,
            book.log().len(),
            &state,
        ))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::field_zone::FieldPoint;
    use crate::scoring::scorebook::{GameSetup, PlayRequest};

    fn book() -> Scorebook {
        let roster = ["A", "B", "C"]
            .iter()
            .map(|s| PlayerId::from(s).unwrap())
            .collect();
        let mut book = Scorebook::new(GameSetup {
            roster,
            batting_half: HalfInning::Top,
            initial_score: 0,
            initial_opponent_score: 0,
        })
        .unwrap();
        book.record(PlayRequest::new(Outcome::Walk)).unwrap();
        book.record(PlayRequest {
            location: Some(FieldPoint::new(50.0, 20.0)),
            ..PlayRequest::new(Outcome::HomeRun)
        })
        .unwrap();
        book.add_opponent_runs(2, 1);
        book
    }

    fn to_csv<T: Serialize>(rows: impl Iterator<Item = T>) -> String {
        let mut writer = csv::Writer::from_writer(vec![]);
        for row in rows {
            writer.serialize(row).unwrap();
        }
        String::from_utf8(writer.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn play_rows() {
        let book = book();
        let csv = to_csv(PlayRow::from_scorebook("g1", &book).unwrap());
        let lines = csv.lines().collect_vec();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("game_id,play_id,inning,half_inning,batter_id,outcome"));
        assert!(lines[1].starts_with("g1,1,1,top,A,walk,0,0,0,A,,,"));
        assert!(lines[2].contains("B;A"));
        assert!(lines[2].ends_with("deep center"));
    }

    #[test]
    fn batting_lines_end_with_team_total() {
        let book = book();
        let rows = BattingLineRow::from_scorebook("g1", &book).unwrap().collect_vec();
        assert_eq!(rows.len(), 4);
        let team = rows.last().unwrap();
        assert_eq!(team.player_id, None);
        assert_eq!(team.plate_appearances, 2);
        assert_eq!(team.runs, 2);
        assert_eq!(team.obp, "1.000");
    }

    #[test]
    fn line_score_and_state_rows() {
        let book = book();
        let innings = LineScoreRow::from_scorebook("g1", &book).unwrap().collect_vec();
        assert_eq!(innings.len(), 2);
        assert_eq!(innings[0].runs, 2);
        assert_eq!(innings[1].opponent_runs, 1);

        let state = GameStateRow::from_scorebook("g1", &book).unwrap().collect_vec();
        assert_eq!(state[0].plays, 2);
        assert_eq!(state[0].score, 2);
        assert_eq!(state[0].opponent_score, 1);
        assert_eq!(state[0].batting_order_index, 2);
    }
}
