//! Step gate results.
//!
//! A gate is the local validity predicate of a build step. A closed gate is
//! not a fault: it carries a [`Blocked`] reason the caller can show while the
//! player fixes their input.

use crate::attribute::Attribute;
use crate::skill::Skill;
use crate::wizard::Step;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a step cannot be left yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Blocked {
    /// The character name is blank.
    MissingName,
    /// The gender field is blank.
    MissingGender,
    /// The level is outside the configured bounds.
    LevelOutOfRange { level: i32, min: i32, max: i32 },
    /// Race, Class or Origin was not chosen.
    MissingSelection(Step),
    /// The chosen class has variants and none was picked.
    MissingVariant { class: String },
    /// A purchased attribute value is outside the point-buy range.
    ValueOutOfRange {
        attribute: Attribute,
        value: i32,
        min: i32,
        max: i32,
    },
    /// The point-buy spend exceeds the pool.
    PointsExceeded { spent: i32, pool: i32 },
    /// Not every free-choice racial bonus was given a target.
    FreeBonusUnassigned { required: usize, assigned: usize },
    /// Two free-choice racial bonuses target the same attribute.
    DuplicateFreeBonus(Attribute),
    /// The number of freely chosen skills differs from the class quota.
    SkillCount { selected: usize, required: usize },
    /// A freely chosen skill is not in the class's allowed list.
    SkillNotAllowed(Skill),
}

impl fmt::Display for Blocked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Blocked::MissingName => write!(f, "Enter a name for the character"),
            Blocked::MissingGender => write!(f, "Enter the character's gender"),
            Blocked::LevelOutOfRange { level, min, max } => {
                write!(f, "Level {level} is outside {min}..={max}")
            }
            Blocked::MissingSelection(step) => write!(f, "Choose a {step} to continue"),
            Blocked::MissingVariant { class } => {
                write!(f, "Choose a variant of {class} to continue")
            }
            Blocked::ValueOutOfRange {
                attribute,
                value,
                min,
                max,
            } => write!(f, "{attribute} {value} is outside {min}..={max}"),
            Blocked::PointsExceeded { spent, pool } => {
                write!(f, "You exceeded the limit by {} points", spent - pool)
            }
            Blocked::FreeBonusUnassigned { required, assigned } => write!(
                f,
                "Assign {} more free racial bonus(es)",
                required.saturating_sub(*assigned)
            ),
            Blocked::DuplicateFreeBonus(attribute) => {
                write!(f, "{attribute} already received a free racial bonus")
            }
            Blocked::SkillCount { selected, required } if selected < required => {
                write!(f, "Select {} more skill(s)", required - selected)
            }
            Blocked::SkillCount { selected, required } => {
                write!(f, "Deselect {} skill(s)", selected - required)
            }
            Blocked::SkillNotAllowed(skill) => {
                write!(f, "{skill} is not available to this class")
            }
        }
    }
}

/// Outcome of evaluating a step gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    Open,
    Blocked(Blocked),
}

impl Gate {
    /// Whether the step may be left.
    pub fn can_proceed(&self) -> bool {
        matches!(self, Gate::Open)
    }

    /// The blocking reason, if any.
    pub fn reason(&self) -> Option<&Blocked> {
        match self {
            Gate::Open => None,
            Gate::Blocked(reason) => Some(reason),
        }
    }
}

impl From<Result<(), Blocked>> for Gate {
    fn from(result: Result<(), Blocked>) -> Self {
        match result {
            Ok(()) => Gate::Open,
            Err(reason) => Gate::Blocked(reason),
        }
    }
}
