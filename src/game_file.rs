use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::scoring::play::Play;
use crate::scoring::scorebook::{GameSetup, PlayRequest, Scorebook};
use crate::scoring::traits::Inning;

/// One thing the scorer did, in the order they did it.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum GameAction {
    /// A new plate appearance to resolve.
    Play(PlayRequest),
    /// A play that was already resolved, e.g. resent by a client.
    Append(Play),
    Undo,
    OpponentRuns { inning: Inning, runs: u16 },
    UndoOpponentRuns,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct GameFile {
    pub game_id: String,
    pub setup: GameSetup,
    #[serde(default)]
    pub actions: Vec<GameAction>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GameFileContents {
    One(GameFile),
    Many(Vec<GameFile>),
}

impl GameFile {
    /// Reads a file holding either a single game or an array of games.
    pub fn read_all(path: &Path) -> Result<Vec<Self>> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let contents: GameFileContents = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(match contents {
            GameFileContents::One(game) => vec![game],
            GameFileContents::Many(games) => games,
        })
    }

    /// Runs every action through a fresh scorebook. The first action that
    /// the scorebook refuses fails the whole game.
    pub fn replay(&self) -> Result<Scorebook> {
        let mut book = Scorebook::new(self.setup.clone())
            .with_context(|| format!("Invalid setup for game {}", self.game_id))?;
        for (i, action) in self.actions.iter().enumerate() {
            match action {
                GameAction::Play(request) => {
                    book.record(request.clone()).with_context(|| {
                        format!("Game {}: failed to record action {i}", self.game_id)
                    })?;
                }
                GameAction::Append(play) => {
                    book.append(play.clone()).with_context(|| {
                        format!("Game {}: failed to append action {i}", self.game_id)
                    })?;
                }
                GameAction::Undo => {
                    if book.undo().is_none() {
                        warn!(game_id = %self.game_id, action = i, "Undo with an empty log");
                    }
                }
                GameAction::OpponentRuns { inning, runs } => {
                    book.add_opponent_runs(*inning, *runs);
                }
                GameAction::UndoOpponentRuns => {
                    if book.undo_opponent_runs().is_none() {
                        warn!(
                            game_id = %self.game_id,
                            action = i,
                            "Opponent run undo with nothing entered"
                        );
                    }
                }
            }
        }
        debug!(
            game_id = %self.game_id,
            plays = book.log().len(),
            "Replayed game"
        );
        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::outcome::Outcome;
    use crate::scoring::traits::HalfInning;

    const GAME: &str = r#"{
        "game_id": "2024-05-01-tigers",
        "setup": {"roster": ["A", "B", "C"], "batting_half": "bottom"},
        "actions": [
            {"action": "opponent_runs", "inning": 1, "runs": 2},
            {"action": "play", "outcome": "1B"},
            {
                "action": "play",
                "outcome": "double",
                "runners": {"first": "score"},
                "location": {"x": 30.0, "y": 40.0}
            },
            {"action": "play", "outcome": "K"},
            {"action": "undo"},
            {"action": "play", "outcome": "fly_out"}
        ]
    }"#;

    #[test]
    fn replays_actions_in_order() {
        let game: GameFile = serde_json::from_str(GAME).unwrap();
        let book = game.replay().unwrap();
        assert_eq!(book.log().len(), 3);
        assert_eq!(book.log()[2].outcome, Outcome::FlyOut);
        let state = book.state().unwrap();
        assert_eq!(state.frame(), (1, HalfInning::Bottom));
        assert_eq!(state.score, 1);
        assert_eq!(state.opponent_score, 2);
        assert_eq!(state.outs.get(), 1);
        assert_eq!(state.batting_order_index, 0);
    }

    #[test]
    fn unknown_outcomes_are_rejected_on_read() {
        let bad = GAME.replace("\"K\"", "\"balk\"");
        assert!(serde_json::from_str::<GameFile>(&bad).is_err());
    }

    #[test]
    fn player_ids_longer_than_a_uuid_are_rejected_on_read() {
        let long = "x".repeat(37);
        let game = GAME.replace("\"A\"", &format!("\"{long}\""));
        assert!(serde_json::from_str::<GameFile>(&game).is_err());
        let uuid = GAME.replace("\"A\"", "\"123e4567-e89b-12d3-a456-426614174000\"");
        assert!(serde_json::from_str::<GameFile>(&uuid).is_ok());
    }

    #[test]
    fn refused_actions_fail_the_game() {
        let game: GameFile = serde_json::from_str(
            r#"{
                "game_id": "g",
                "setup": {"roster": ["A"]},
                "actions": [
                    {"action": "play", "outcome": "single"},
                    {"action": "play", "outcome": "single", "runners": {"first": "stay"}}
                ]
            }"#,
        )
        .unwrap();
        let err = game.replay().unwrap_err();
        assert!(format!("{err:#}").contains("two runners on first"));
    }

    #[test]
    fn resent_plays_are_skipped() {
        let game: GameFile = serde_json::from_str(GAME).unwrap();
        let book = game.replay().unwrap();
        let mut actions = vec![];
        for play in book.log() {
            actions.push(GameAction::Append(play.clone()));
            actions.push(GameAction::Append(play.clone()));
        }
        let resent = GameFile {
            game_id: "copy".to_string(),
            setup: game.setup.clone(),
            actions,
        };
        let copy = resent.replay().unwrap();
        assert_eq!(copy.log(), book.log());
    }
}
