use std::convert::TryFrom;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::scoring::error::ScoringError;
use crate::scoring::play::BaseState;
use crate::scoring::traits::HOME_STATION;

/// How runners are moved on an outcome.
#[derive(Debug, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum AdvancementCategory {
    /// The batter reaches; runner movement is guessed and then confirmed.
    Hit,
    /// Strict force advancement, no discretion.
    Walk,
    /// Batter out, nobody moves.
    AutomaticOut,
    /// Fielded out with runners aboard; everything is confirmed by hand.
    Manual,
}

/// The closed set of plate-appearance outcomes.
///
/// Both the canonical names and the scorebook short codes parse, ignoring
/// ASCII case. Serialization always uses the canonical name.
#[derive(
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Copy,
    Clone,
    Hash,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Outcome {
    #[strum(to_string = "single", serialize = "1B")]
    Single,
    #[strum(to_string = "double", serialize = "2B")]
    Double,
    #[strum(to_string = "triple", serialize = "3B")]
    Triple,
    #[strum(to_string = "homerun", serialize = "HR", serialize = "home_run")]
    #[serde(rename = "homerun")]
    HomeRun,
    #[strum(to_string = "walk", serialize = "BB")]
    Walk,
    #[strum(to_string = "strikeout", serialize = "K")]
    Strikeout,
    #[strum(to_string = "ground_out", serialize = "GO")]
    GroundOut,
    #[strum(to_string = "fly_out", serialize = "FO")]
    FlyOut,
    #[strum(to_string = "line_out", serialize = "LO")]
    LineOut,
    #[strum(to_string = "pop_out", serialize = "PO")]
    PopOut,
    #[strum(to_string = "error", serialize = "E")]
    #[serde(rename = "error")]
    ReachedOnError,
    #[strum(to_string = "fielders_choice", serialize = "FC")]
    FieldersChoice,
    #[strum(to_string = "sacrifice_fly", serialize = "SF")]
    SacrificeFly,
}

impl Outcome {
    /// Parses an outcome handed to us from outside the engine. This is the
    /// only place an unknown outcome can be rejected.
    pub fn parse(value: &str) -> Result<Self, ScoringError> {
        Self::from_str(value.trim()).map_err(|_| ScoringError::InvalidOutcome(value.to_string()))
    }

    pub const fn category(self) -> AdvancementCategory {
        match self {
            Self::Single
            | Self::Double
            | Self::Triple
            | Self::HomeRun
            | Self::ReachedOnError
            | Self::FieldersChoice => AdvancementCategory::Hit,
            Self::Walk => AdvancementCategory::Walk,
            Self::Strikeout => AdvancementCategory::AutomaticOut,
            Self::GroundOut
            | Self::FlyOut
            | Self::LineOut
            | Self::PopOut
            | Self::SacrificeFly => AdvancementCategory::Manual,
        }
    }

    /// The category the resolvers act on given who is on base. A fielded out
    /// with nobody on has no runners of interest, so it resolves like a
    /// strikeout.
    pub fn resolution(self, bases: &BaseState) -> AdvancementCategory {
        match self.category() {
            AdvancementCategory::Manual if bases.is_empty() => AdvancementCategory::AutomaticOut,
            category => category,
        }
    }

    pub const fn is_at_bat(self) -> bool {
        !matches!(self, Self::Walk | Self::SacrificeFly)
    }

    pub const fn is_hit(self) -> bool {
        matches!(self, Self::Single | Self::Double | Self::Triple | Self::HomeRun)
    }

    pub const fn total_bases(self) -> u8 {
        match self {
            Self::Single => 1,
            Self::Double => 2,
            Self::Triple => 3,
            Self::HomeRun => 4,
            _ => 0,
        }
    }

    /// Where the batter ends up by default when they reach, as a station
    /// number (home is `HOME_STATION`). `None` if the batter does not reach.
    pub const fn batter_station(self) -> Option<u8> {
        match self {
            Self::Single | Self::ReachedOnError | Self::FieldersChoice | Self::Walk => Some(1),
            Self::Double => Some(2),
            Self::Triple => Some(3),
            Self::HomeRun => Some(HOME_STATION),
            _ => None,
        }
    }

    /// Whether a play with this outcome can produce an RBI. Runs that score
    /// on an error are never credited to the batter.
    pub const fn credits_rbi(self) -> bool {
        !matches!(self, Self::ReachedOnError)
    }
}

impl TryFrom<String> for Outcome {
    type Error = ScoringError;

    fn try_from(value: String) -> Result<Self, ScoringError> {
        Self::parse(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn parses_names_and_short_codes() {
        assert_eq!(Outcome::parse("single").unwrap(), Outcome::Single);
        assert_eq!(Outcome::parse("HR").unwrap(), Outcome::HomeRun);
        assert_eq!(Outcome::parse("hr").unwrap(), Outcome::HomeRun);
        assert_eq!(Outcome::parse(" fc ").unwrap(), Outcome::FieldersChoice);
        assert_eq!(Outcome::parse("Sacrifice_Fly").unwrap(), Outcome::SacrificeFly);
    }

    #[test]
    fn rejects_unknown_outcome_at_boundary() {
        assert_eq!(
            Outcome::parse("balk"),
            Err(ScoringError::InvalidOutcome("balk".to_string()))
        );
        assert!(serde_json::from_str::<Outcome>("\"hit_by_pitch\"").is_err());
    }

    #[test]
    fn serializes_canonical_name() {
        assert_eq!(serde_json::to_string(&Outcome::HomeRun).unwrap(), "\"homerun\"");
        assert_eq!(
            serde_json::to_string(&Outcome::FieldersChoice).unwrap(),
            "\"fielders_choice\""
        );
        assert_eq!(serde_json::from_str::<Outcome>("\"K\"").unwrap(), Outcome::Strikeout);
        for outcome in Outcome::iter() {
            assert_eq!(Outcome::parse(&outcome.to_string()).unwrap(), outcome);
        }
    }

    #[test]
    fn strikeout_is_always_automatic() {
        assert_eq!(Outcome::Strikeout.category(), AdvancementCategory::AutomaticOut);
        let mut bases = BaseState::default();
        bases.set(crate::Base::Third, Some(crate::PlayerId::from("C").unwrap()));
        assert_eq!(Outcome::Strikeout.resolution(&bases), AdvancementCategory::AutomaticOut);
    }

    #[test]
    fn fielded_out_with_empty_bases_is_automatic() {
        let empty = BaseState::default();
        assert_eq!(Outcome::GroundOut.resolution(&empty), AdvancementCategory::AutomaticOut);
        let mut bases = BaseState::default();
        bases.set(crate::Base::First, Some(crate::PlayerId::from("A").unwrap()));
        assert_eq!(Outcome::GroundOut.resolution(&bases), AdvancementCategory::Manual);
    }

    #[test]
    fn at_bats_exclude_walks_and_sacrifices() {
        let non_at_bats = Outcome::iter().filter(|o| !o.is_at_bat()).collect::<Vec<_>>();
        assert_eq!(non_at_bats, vec![Outcome::Walk, Outcome::SacrificeFly]);
    }
}
