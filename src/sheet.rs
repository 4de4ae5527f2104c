//! The character sheet and its recalculation pass.
//!
//! A sheet has two kinds of fields: inputs set by the build steps, and
//! derived fields. Derived fields are private and only written by
//! [`CharacterSheet::recalculated`], which makes them a pure function of the
//! inputs.

use crate::attribute::{Attribute, AttributeSet};
use crate::catalog::{ClassDescriptor, RaceDescriptor, Size, DEFAULT_MOVEMENT};
use crate::derived::{
    self, complete_skill_table, defense, hit_points, key_attribute, mana_points,
    max_carry_slots, DefenseBonuses, SkillBreakdown, BASE_CARRY_SLOTS, BASE_DEFENSE,
};
use crate::error::BuildError;
use crate::skill::Skill;
use crate::wizard::Step;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// The origin stored on a sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginSelection {
    pub name: String,
    pub powers: Vec<String>,
}

/// Fields computed by the recalculation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedStats {
    pub hit_points: i32,
    pub mana_points: i32,
    pub defense: i32,
    pub max_carry_slots: i32,
    pub movement_rate: i32,
    pub size: Size,
    pub complete_skill_table: Vec<SkillBreakdown>,
}

impl Default for DerivedStats {
    fn default() -> Self {
        Self {
            hit_points: 0,
            mana_points: 0,
            defense: BASE_DEFENSE,
            max_carry_slots: BASE_CARRY_SLOTS,
            movement_rate: DEFAULT_MOVEMENT,
            size: Size::Medium,
            complete_skill_table: Vec::new(),
        }
    }
}

/// A character record.
///
/// # Examples
///
/// ```rust
/// use sheetsmith::attribute::{Attribute, AttributeSet};
/// use sheetsmith::catalog::{ClassDescriptor, RaceDescriptor};
/// use sheetsmith::CharacterSheet;
///
/// let mut sheet = CharacterSheet::blank();
/// sheet.attributes = AttributeSet::from_values([10, 16, 12, 10, 10, 10]);
/// sheet.race = Some(RaceDescriptor::new("Human"));
/// sheet.class = Some(ClassDescriptor::new("Fighter", 20, 5, 3, 3));
///
/// let sheet = sheet.recalculated().unwrap();
/// assert_eq!(sheet.derived().hit_points, 21);
/// assert_eq!(sheet.derived().defense, 13);
/// ```
///
/// Derived fields are serialized but never read back: deserializing
/// recomputes them from the inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharacterSheet {
    pub id: Uuid,
    pub name: String,
    pub gender: String,
    pub level: i32,
    pub attributes: AttributeSet,
    pub race: Option<RaceDescriptor>,
    pub class: Option<ClassDescriptor>,
    pub skills: BTreeSet<Skill>,
    pub origin: Option<OriginSelection>,
    pub general_powers: Vec<String>,
    pub class_powers: Vec<String>,
    pub spells: Vec<String>,
    pub extra_armor_penalty: i32,
    pub money: i32,
    derived: DerivedStats,
}

impl CharacterSheet {
    /// A new sheet with a fresh id and placeholder values.
    pub fn blank() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            gender: String::new(),
            level: 1,
            attributes: AttributeSet::default(),
            race: None,
            class: None,
            skills: BTreeSet::new(),
            origin: None,
            general_powers: Vec::new(),
            class_powers: Vec::new(),
            spells: Vec::new(),
            extra_armor_penalty: 0,
            money: 0,
            derived: DerivedStats::default(),
        }
    }

    pub fn derived(&self) -> &DerivedStats {
        &self.derived
    }

    pub fn modifier(&self, attribute: Attribute) -> i32 {
        self.attributes.modifier(attribute)
    }

    pub fn is_trained(&self, skill: Skill) -> bool {
        self.skills.contains(&skill)
    }

    /// Total of one skill, trained or not.
    pub fn skill_total(&self, skill: Skill) -> i32 {
        derived::skill_total(skill, self, self.is_trained(skill))
    }

    /// A copy of the sheet with every derived field recomputed.
    ///
    /// Needs a race and a class. Running it on its own output returns an
    /// identical sheet.
    pub fn recalculated(&self) -> Result<CharacterSheet, BuildError> {
        let race = self
            .race
            .as_ref()
            .ok_or(BuildError::MissingPrerequisite(Step::Race))?;
        let class = self
            .class
            .as_ref()
            .ok_or(BuildError::MissingPrerequisite(Step::Class))?;

        let mut sheet = self.clone();
        sheet.derived = DerivedStats {
            hit_points: hit_points(class, self.level, self.modifier(Attribute::Constitution)),
            mana_points: mana_points(class, self.level, self.modifier(key_attribute(class))),
            defense: defense(
                self.modifier(Attribute::Dexterity),
                &DefenseBonuses::default(),
            ),
            max_carry_slots: max_carry_slots(self.modifier(Attribute::Strength)),
            movement_rate: race.movement,
            size: race.size,
            complete_skill_table: complete_skill_table(self),
        };
        Ok(sheet)
    }

    pub fn race_name(&self) -> Option<&str> {
        self.race.as_ref().map(|race| race.name.as_str())
    }

    pub fn class_name(&self) -> Option<&str> {
        self.class.as_ref().map(|class| class.name.as_str())
    }
}

#[derive(Deserialize)]
struct RawSheet {
    id: Uuid,
    name: String,
    gender: String,
    level: i32,
    attributes: AttributeSet,
    race: Option<RaceDescriptor>,
    class: Option<ClassDescriptor>,
    #[serde(default)]
    skills: BTreeSet<Skill>,
    #[serde(default)]
    origin: Option<OriginSelection>,
    #[serde(default)]
    general_powers: Vec<String>,
    #[serde(default)]
    class_powers: Vec<String>,
    #[serde(default)]
    spells: Vec<String>,
    #[serde(default)]
    extra_armor_penalty: i32,
    #[serde(default)]
    money: i32,
}

impl<'de> Deserialize<'de> for CharacterSheet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawSheet::deserialize(deserializer)?;
        let sheet = CharacterSheet {
            id: raw.id,
            name: raw.name,
            gender: raw.gender,
            level: raw.level,
            attributes: raw.attributes,
            race: raw.race,
            class: raw.class,
            skills: raw.skills,
            origin: raw.origin,
            general_powers: raw.general_powers,
            class_powers: raw.class_powers,
            spells: raw.spells,
            extra_armor_penalty: raw.extra_armor_penalty,
            money: raw.money,
            derived: DerivedStats::default(),
        };
        // without race and class the placeholder values stand
        Ok(sheet.recalculated().unwrap_or(sheet))
    }
}

impl Default for CharacterSheet {
    fn default() -> Self {
        Self::blank()
    }
}

/// Free-function form of [`CharacterSheet::recalculated`].
pub fn recalculate(sheet: &CharacterSheet) -> Result<CharacterSheet, BuildError> {
    sheet.recalculated()
}
