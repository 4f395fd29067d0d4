use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::scoring::outcome::Outcome;

pub const FIELD_MIN: f64 = 0.0;
pub const FIELD_MAX: f64 = 100.0;
pub const HOME_PLATE: FieldPoint = FieldPoint { x: 50.0, y: 95.0 };

const IN_FRONT_OF_PLATE_MAX: f64 = 5.0;
const INFIELD_MAX: f64 = 28.0;
const SHALLOW_MAX: f64 = 40.0;
const OUTFIELD_MAX: f64 = 52.0;

const CENTER_MAX_DEGREES: f64 = 8.0;
const GAP_MAX_DEGREES: f64 = 22.0;
const FIELD_MAX_DEGREES: f64 = 37.0;

/// Farthest a ball in play can be placed, i.e. the fence.
pub const FENCE_DISTANCE: f64 = 60.0;
pub const HOME_RUN_MIN_DISTANCE: f64 = 62.0;
pub const HOME_RUN_MAX_DISTANCE: f64 = 70.0;

/// A contact point on the normalized field diagram. `y` grows toward the
/// catcher, so the outfield is at small `y`.
#[derive(Debug, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct FieldPoint {
    pub x: f64,
    pub y: f64,
}

impl FieldPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    fn within_square(self) -> Self {
        Self {
            x: self.x.clamp(FIELD_MIN, FIELD_MAX),
            y: self.y.clamp(FIELD_MIN, FIELD_MAX),
        }
    }

    /// Offset from home plate with the outfield in the positive `dy` direction.
    fn offset(self) -> (f64, f64) {
        (self.x - HOME_PLATE.x, HOME_PLATE.y - self.y)
    }

    pub fn distance(self) -> f64 {
        let (dx, dy) = self.offset();
        dx.hypot(dy)
    }

    /// Degrees off the center line, negative toward left field.
    pub fn angle(self) -> f64 {
        let (dx, dy) = self.offset();
        dx.atan2(dy).to_degrees()
    }

    fn at_distance(self, distance: f64) -> Self {
        let (dx, dy) = self.offset();
        let scale = distance / dx.hypot(dy);
        Self {
            x: HOME_PLATE.x + dx * scale,
            y: HOME_PLATE.y - dy * scale,
        }
    }

    /// Moves the point along its own ray from home plate into the legal range
    /// for `outcome`. The angle is never changed.
    pub fn clamp_for(self, outcome: Outcome) -> Self {
        if !self.is_finite() {
            return self;
        }
        let point = self.within_square();
        let distance = point.distance();
        let target = match outcome {
            Outcome::HomeRun => distance.clamp(HOME_RUN_MIN_DISTANCE, HOME_RUN_MAX_DISTANCE),
            _ => distance.min(FENCE_DISTANCE),
        };
        if distance == 0.0 {
            return match outcome {
                Outcome::HomeRun => Self::new(HOME_PLATE.x, HOME_PLATE.y - target),
                _ => point,
            };
        }
        if (target - distance).abs() < f64::EPSILON {
            point
        } else {
            point.at_distance(target)
        }
    }
}

/// Clamps a contact point to a legal distance for the outcome.
pub fn clamp(point: FieldPoint, outcome: Outcome) -> FieldPoint {
    point.clamp_for(outcome)
}

#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Depth {
    Infield,
    Shallow,
    Outfield,
    Deep,
}

#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Center,
    Gap(Side),
    Field(Side),
    Line(Side),
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Center => write!(f, "center"),
            Self::Gap(side) => write!(f, "{side}-center gap"),
            Self::Field(side) => write!(f, "{side} field"),
            Self::Line(side) => write!(f, "{side} field line"),
        }
    }
}

/// A labeled region of the field. Purely descriptive; nothing in the rules
/// depends on it.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldZone {
    Unlocated,
    BehindHomePlate,
    Foul(Side),
    InFrontOfPlate,
    Fair { depth: Depth, direction: Direction },
}

impl fmt::Display for FieldZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlocated => Ok(()),
            Self::BehindHomePlate => write!(f, "foul behind home plate"),
            Self::Foul(side) => write!(f, "foul {side}"),
            Self::InFrontOfPlate => write!(f, "in front of the plate"),
            Self::Fair { depth, direction } => match depth {
                Depth::Infield => write!(f, "infield {direction}"),
                Depth::Shallow => write!(f, "shallow {direction}"),
                Depth::Outfield => write!(f, "{direction}"),
                Depth::Deep => write!(f, "deep {direction}"),
            },
        }
    }
}

fn depth_of(distance: f64) -> Depth {
    if distance < INFIELD_MAX {
        Depth::Infield
    } else if distance < SHALLOW_MAX {
        Depth::Shallow
    } else if distance < OUTFIELD_MAX {
        Depth::Outfield
    } else {
        Depth::Deep
    }
}

fn direction_of(angle: f64) -> Direction {
    let side = if angle < 0.0 { Side::Left } else { Side::Right };
    let magnitude = angle.abs();
    if magnitude < CENTER_MAX_DEGREES {
        Direction::Center
    } else if magnitude < GAP_MAX_DEGREES {
        Direction::Gap(side)
    } else if magnitude < FIELD_MAX_DEGREES {
        Direction::Field(side)
    } else {
        Direction::Line(side)
    }
}

/// Classifies a contact point. Foul territory is checked before anything
/// else; a ball exactly on a foul line is fair.
pub fn zone_of(point: Option<FieldPoint>) -> FieldZone {
    let Some(point) = point.filter(FieldPoint::is_finite) else {
        return FieldZone::Unlocated;
    };
    let point = point.within_square();
    let (dx, dy) = point.offset();
    if dy < 0.0 {
        return FieldZone::BehindHomePlate;
    }
    // The foul lines are the 45 degree diagonals, so compare legs directly.
    if dx.abs() > dy {
        return FieldZone::Foul(if dx < 0.0 { Side::Left } else { Side::Right });
    }
    let distance = point.distance();
    if distance < IN_FRONT_OF_PLATE_MAX {
        return FieldZone::InFrontOfPlate;
    }
    FieldZone::Fair {
        depth: depth_of(distance),
        direction: direction_of(point.angle()),
    }
}

/// Where a ball was put in play, after clamping, with its zone.
#[derive(Debug, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct FieldLocation {
    pub point: FieldPoint,
    pub zone: FieldZone,
}

impl FieldLocation {
    pub fn tag(point: FieldPoint, outcome: Outcome) -> Self {
        let point = point.clamp_for(outcome);
        Self {
            point,
            zone: zone_of(Some(point)),
        }
    }
}
