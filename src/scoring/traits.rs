use arrayvec::ArrayString;
use bounded_integer::BoundedUsize;
use fixed_map::Key;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Stable roster identifier. Sized to hold a hyphenated UUID, which is what the
/// hosted backend hands out. Longer ids fail to deserialize.
pub type PlayerId = ArrayString<36>;
pub type PlayId = u64;
pub type Inning = u8;

pub type Outs = BoundedUsize<0, 3>;

/// Outs, capped at three.
pub fn saturating_outs(outs: usize) -> Outs {
    Outs::new(outs).unwrap_or(Outs::MAX)
}

/// Station number of home plate when it is the destination of a runner.
pub const HOME_STATION: u8 = 4;

#[derive(
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Copy,
    Clone,
    Display,
    EnumString,
    EnumIter,
    TryFromPrimitive,
    IntoPrimitive,
    Serialize,
    Deserialize,
)]
#[repr(u8)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Base {
    First = 1,
    Second,
    Third,
}

impl Base {
    pub const ALL: [Self; 3] = [Self::First, Self::Second, Self::Third];

    pub fn station(self) -> u8 {
        self.into()
    }

    /// Maps a station number onto a base. Anything past third is home, which
    /// is not a base a runner can stand on.
    pub fn from_station(station: u8) -> Option<Self> {
        Self::try_from(station).ok()
    }

    /// Bases strictly in front of this one, nearest first.
    pub fn ahead(self) -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().filter(move |b| *b > self)
    }
}

/// Anyone who can be given a decision on a play: the batter plus the
/// occupant of each base.
#[derive(
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Copy,
    Clone,
    Display,
    EnumString,
    EnumIter,
    Key,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RunnerSlot {
    Batter,
    First,
    Second,
    Third,
}

impl RunnerSlot {
    /// Third to first, which is the order runners are moved in so that a
    /// lead runner has always vacated before a trailing runner arrives.
    pub const RUNNERS_LEAD_FIRST: [Self; 3] = [Self::Third, Self::Second, Self::First];

    pub const fn base(self) -> Option<Base> {
        match self {
            Self::Batter => None,
            Self::First => Some(Base::First),
            Self::Second => Some(Base::Second),
            Self::Third => Some(Base::Third),
        }
    }

    /// The station the runner starts the play from; the batter starts at home.
    pub fn station(self) -> u8 {
        self.base().map_or(0, Base::station)
    }
}

impl From<Base> for RunnerSlot {
    fn from(base: Base) -> Self {
        match base {
            Base::First => Self::First,
            Base::Second => Self::Second,
            Base::Third => Self::Third,
        }
    }
}

#[derive(
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Copy,
    Clone,
    Default,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum HalfInning {
    #[default]
    Top,
    Bottom,
}

impl HalfInning {
    pub const fn flip(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
        }
    }
}

/// The half-inning that follows (`inning`, `half`).
pub const fn next_half_inning(inning: Inning, half: HalfInning) -> (Inning, HalfInning) {
    match half {
        HalfInning::Top => (inning, HalfInning::Bottom),
        HalfInning::Bottom => (inning.saturating_add(1), HalfInning::Top),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bases_ahead_are_nearest_first() {
        assert_eq!(
            Base::First.ahead().collect::<Vec<_>>(),
            vec![Base::Second, Base::Third]
        );
        assert_eq!(Base::Third.ahead().count(), 0);
    }

    #[test]
    fn stations() {
        assert_eq!(RunnerSlot::Batter.station(), 0);
        assert_eq!(RunnerSlot::Third.station(), 3);
        assert_eq!(Base::from_station(2), Some(Base::Second));
        assert_eq!(Base::from_station(HOME_STATION), None);
    }

    #[test]
    fn half_inning_rollover() {
        assert_eq!(next_half_inning(1, HalfInning::Top), (1, HalfInning::Bottom));
        assert_eq!(next_half_inning(1, HalfInning::Bottom), (2, HalfInning::Top));
        assert_eq!(HalfInning::Bottom.flip(), HalfInning::Top);
    }
}
