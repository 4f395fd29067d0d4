use std::collections::HashMap;
use std::iter::Sum;
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::scoring::outcome::Outcome;
use crate::scoring::play::Play;
use crate::scoring::traits::{Inning, PlayerId};

/// Counting stats for one batter (or a whole lineup). Rates are never
/// stored; they are recomputed from these tallies on every read.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Default, Serialize, Deserialize)]
pub struct BattingCounts {
    pub plate_appearances: u32,
    pub at_bats: u32,
    pub singles: u32,
    pub doubles: u32,
    pub triples: u32,
    pub home_runs: u32,
    pub walks: u32,
    pub strikeouts: u32,
    pub sacrifice_flies: u32,
    pub reached_on_error: u32,
    pub fielders_choices: u32,
    pub rbi: u32,
    pub runs: u32,
}

impl BattingCounts {
    fn record_plate_appearance(&mut self, play: &Play) {
        self.plate_appearances += 1;
        self.at_bats += u32::from(play.outcome.is_at_bat());
        self.rbi += u32::from(play.rbi);
        match play.outcome {
            Outcome::Single => self.singles += 1,
            Outcome::Double => self.doubles += 1,
            Outcome::Triple => self.triples += 1,
            Outcome::HomeRun => self.home_runs += 1,
            Outcome::Walk => self.walks += 1,
            Outcome::Strikeout => self.strikeouts += 1,
            Outcome::SacrificeFly => self.sacrifice_flies += 1,
            Outcome::ReachedOnError => self.reached_on_error += 1,
            Outcome::FieldersChoice => self.fielders_choices += 1,
            Outcome::GroundOut | Outcome::FlyOut | Outcome::LineOut | Outcome::PopOut => {}
        }
    }

    pub const fn hits(&self) -> u32 {
        self.singles + self.doubles + self.triples + self.home_runs
    }

    pub const fn total_bases(&self) -> u32 {
        self.singles + 2 * self.doubles + 3 * self.triples + 4 * self.home_runs
    }

    pub fn batting_average(&self) -> f64 {
        ratio(self.hits(), self.at_bats)
    }

    pub fn on_base_percentage(&self) -> f64 {
        ratio(
            self.hits() + self.walks,
            self.at_bats + self.walks + self.sacrifice_flies,
        )
    }

    pub fn slugging(&self) -> f64 {
        ratio(self.total_bases(), self.at_bats)
    }

    pub fn ops(&self) -> f64 {
        self.on_base_percentage() + self.slugging()
    }

    pub fn rates(&self) -> RateLine {
        RateLine {
            avg: format_rate(self.batting_average()),
            obp: format_rate(self.on_base_percentage()),
            slg: format_rate(self.slugging()),
            ops: format_rate(self.ops()),
        }
    }
}

impl AddAssign for BattingCounts {
    fn add_assign(&mut self, other: Self) {
        self.plate_appearances += other.plate_appearances;
        self.at_bats += other.at_bats;
        self.singles += other.singles;
        self.doubles += other.doubles;
        self.triples += other.triples;
        self.home_runs += other.home_runs;
        self.walks += other.walks;
        self.strikeouts += other.strikeouts;
        self.sacrifice_flies += other.sacrifice_flies;
        self.reached_on_error += other.reached_on_error;
        self.fielders_choices += other.fielders_choices;
        self.rbi += other.rbi;
        self.runs += other.runs;
    }
}

impl Sum for BattingCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |mut acc, counts| {
            acc += counts;
            acc
        })
    }
}

impl<'a> Sum<&'a Self> for BattingCounts {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

fn ratio(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        f64::from(numerator) / f64::from(denominator)
    }
}

/// Three decimals with no leading zero: ".750", "1.250".
pub fn format_rate(rate: f64) -> String {
    let formatted = format!("{rate:.3}");
    match formatted.strip_prefix('0') {
        Some(trimmed) => trimmed.to_string(),
        None => formatted,
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct RateLine {
    pub avg: String,
    pub obp: String,
    pub slg: String,
    pub ops: String,
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct PlayerGameStats {
    pub player_id: PlayerId,
    #[serde(flatten)]
    pub counts: BattingCounts,
}

/// One line per batter: every roster player in roster order, idle or not,
/// followed by anyone who batted without being on the roster, in order of
/// first appearance. Runs go to whoever crossed the plate, not the batter.
pub fn aggregate(log: &[Play], roster: &[PlayerId]) -> Vec<PlayerGameStats> {
    let mut lines: Vec<PlayerGameStats> = roster
        .iter()
        .map(|player_id| PlayerGameStats {
            player_id: *player_id,
            counts: BattingCounts::default(),
        })
        .collect();
    let mut index: HashMap<PlayerId, usize> = roster
        .iter()
        .enumerate()
        .map(|(i, player_id)| (*player_id, i))
        .collect();

    let mut line_for = |player_id: PlayerId, lines: &mut Vec<PlayerGameStats>| -> usize {
        *index.entry(player_id).or_insert_with(|| {
            lines.push(PlayerGameStats {
                player_id,
                counts: BattingCounts::default(),
            });
            lines.len() - 1
        })
    };

    for play in log {
        let i = line_for(play.batter_id, &mut lines);
        lines[i].counts.record_plate_appearance(play);
        for scorer in &play.scored_player_ids {
            let i = line_for(*scorer, &mut lines);
            lines[i].counts.runs += 1;
        }
    }
    lines
}

/// Field-wise sum of the player lines. Rates on the result are computed from
/// the summed counts, never averaged.
pub fn team_totals(lines: &[PlayerGameStats]) -> BattingCounts {
    lines.iter().map(|line| &line.counts).sum()
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct BoxScore {
    pub lines: Vec<PlayerGameStats>,
    pub totals: BattingCounts,
}

impl BoxScore {
    pub fn from_log(log: &[Play], roster: &[PlayerId]) -> Self {
        let lines = aggregate(log, roster);
        let totals = team_totals(&lines);
        Self { lines, totals }
    }
}

/// Opponent runs entered by hand for one inning.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct OpponentRuns {
    pub inning: Inning,
    pub runs: u16,
}

/// Runs by inning for both teams, first inning first.
#[derive(Debug, Eq, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct LineScore {
    pub team: Vec<u16>,
    pub opponent: Vec<u16>,
}

impl LineScore {
    pub fn innings(&self) -> usize {
        self.team.len()
    }

    pub fn team_total(&self) -> u16 {
        self.team.iter().copied().fold(0, u16::saturating_add)
    }

    pub fn opponent_total(&self) -> u16 {
        self.opponent.iter().copied().fold(0, u16::saturating_add)
    }
}

pub fn line_score(log: &[Play], opponent_runs: &[OpponentRuns]) -> LineScore {
    let innings = log
        .iter()
        .map(|play| play.inning)
        .chain(opponent_runs.iter().map(|entry| entry.inning))
        .max()
        .map_or(0, usize::from);
    let mut line = LineScore {
        team: vec![0; innings],
        opponent: vec![0; innings],
    };
    for play in log.iter().filter(|play| play.inning > 0) {
        let slot = &mut line.team[usize::from(play.inning) - 1];
        *slot = slot.saturating_add(u16::from(play.runs()));
    }
    for entry in opponent_runs.iter().filter(|entry| entry.inning > 0) {
        let slot = &mut line.opponent[usize::from(entry.inning) - 1];
        *slot = slot.saturating_add(entry.runs);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::play::{BaseState, PlayResult, ScoredPlayers};
    use crate::scoring::traits::{saturating_outs, HalfInning};

    fn id(s: &str) -> PlayerId {
        PlayerId::from(s).unwrap()
    }

    fn play(inning: Inning, batter: &str, outcome: Outcome, scored: &[&str]) -> Play {
        let scored_player_ids: ScoredPlayers = scored.iter().map(|s| id(s)).collect();
        let result = PlayResult {
            new_base_state: BaseState::default(),
            runs_on_play: u8::try_from(scored_player_ids.len()).unwrap(),
            outs_recorded: saturating_outs(usize::from(outcome.batter_station().is_none())),
            scored_player_ids,
        };
        Play::new(1, (inning, HalfInning::Top), id(batter), outcome, result, None)
    }

    #[test]
    fn idle_roster_players_get_zero_lines() {
        let roster = vec![id("A"), id("B")];
        let lines = aggregate(&[], &roster);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].player_id, id("B"));
        assert_eq!(lines[1].counts, BattingCounts::default());
        assert_eq!(lines[1].counts.rates().avg, ".000");
        assert_eq!(lines[1].counts.rates().ops, ".000");
    }

    #[test]
    fn rates_from_tallies() {
        let roster = vec![id("A")];
        let log = vec![
            play(1, "A", Outcome::Single, &[]),
            play(2, "A", Outcome::HomeRun, &["A"]),
            play(3, "A", Outcome::Double, &[]),
            play(4, "A", Outcome::Strikeout, &[]),
            play(5, "A", Outcome::Walk, &[]),
            play(6, "A", Outcome::SacrificeFly, &["B"]),
        ];
        let lines = aggregate(&log, &roster);
        let counts = lines[0].counts;
        assert_eq!(counts.plate_appearances, 6);
        assert_eq!(counts.at_bats, 4);
        assert_eq!(counts.hits(), 3);
        assert_eq!(counts.total_bases(), 7);
        assert_eq!(counts.rbi, 2);
        let rates = counts.rates();
        assert_eq!(rates.avg, ".750");
        assert_eq!(rates.obp, ".667");
        assert_eq!(rates.slg, "1.750");
        assert_eq!(rates.ops, "2.417");
    }

    #[test]
    fn runs_go_to_the_scorer_and_strangers_are_appended() {
        let roster = vec![id("A"), id("B")];
        let log = vec![
            play(1, "B", Outcome::Single, &["A"]),
            play(1, "SUB", Outcome::ReachedOnError, &["B"]),
        ];
        let lines = aggregate(&log, &roster);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].counts.runs, 1);
        assert_eq!(lines[0].counts.plate_appearances, 0);
        assert_eq!(lines[1].counts.rbi, 1);
        assert_eq!(lines[2].player_id, id("SUB"));
        assert_eq!(lines[2].counts.reached_on_error, 1);
        assert_eq!(lines[2].counts.at_bats, 1);
        assert_eq!(lines[2].counts.rbi, 0);
    }

    #[test]
    fn team_rates_come_from_summed_counts() {
        let roster = vec![id("A"), id("B")];
        let log = vec![
            play(1, "A", Outcome::Single, &[]),
            play(1, "B", Outcome::GroundOut, &[]),
            play(1, "B", Outcome::FlyOut, &[]),
            play(2, "B", Outcome::PopOut, &[]),
        ];
        let box_score = BoxScore::from_log(&log, &roster);
        assert_eq!(box_score.totals.at_bats, 4);
        assert_eq!(box_score.totals.rates().avg, ".250");
        assert_eq!(box_score.totals, team_totals(&box_score.lines));
    }

    #[test]
    fn format_rate_drops_leading_zero_only() {
        assert_eq!(format_rate(0.0), ".000");
        assert_eq!(format_rate(0.3333), ".333");
        assert_eq!(format_rate(1.25), "1.250");
        assert_eq!(format_rate(4.0), "4.000");
    }

    #[test]
    fn line_score_by_inning() {
        let log = vec![
            play(1, "A", Outcome::HomeRun, &["A"]),
            play(3, "B", Outcome::Double, &["A", "C"]),
        ];
        let opponent = vec![OpponentRuns { inning: 2, runs: 4 }];
        let line = line_score(&log, &opponent);
        assert_eq!(line.team, vec![1, 0, 2]);
        assert_eq!(line.opponent, vec![0, 4, 0]);
        assert_eq!(line.team_total(), 3);
        assert_eq!(line.opponent_total(), 4);
        assert_eq!(line.innings(), 3);
    }
}
