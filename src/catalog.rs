//! Read-only reference data: races, classes and origins.
//!
//! The engine never mutates a catalog. Descriptors may carry a setup
//! transform that is applied once, when the player selects them, to produce
//! the descriptor actually stored on the sheet.

use crate::attribute::{Attribute, RacialBonus};
use crate::error::{BuildError, CatalogKind};
use crate::skill::Skill;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Default movement rate, in meters.
pub const DEFAULT_MOVEMENT: i32 = 9;

/// Creature size category.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
pub enum Size {
    Tiny,
    Small,
    #[default]
    Medium,
    Large,
    Huge,
    Colossal,
}

/// Selection-time transform of a race.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RaceSetup {
    /// The race is used as listed.
    #[default]
    Identity,
    /// The race takes the attribute bonuses of a sibling race, e.g. an
    /// undead variant that keeps the bonuses of the people it came from.
    InheritBonuses { from: String },
}

/// A playable race.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceDescriptor {
    pub name: String,
    pub bonuses: Vec<RacialBonus>,
    #[serde(default)]
    pub size: Size,
    #[serde(default = "default_movement")]
    pub movement: i32,
    #[serde(default)]
    pub setup: RaceSetup,
}

fn default_movement() -> i32 {
    DEFAULT_MOVEMENT
}

impl RaceDescriptor {
    /// A medium race with the default movement and no bonuses.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bonuses: Vec::new(),
            size: Size::Medium,
            movement: DEFAULT_MOVEMENT,
            setup: RaceSetup::Identity,
        }
    }

    pub fn with_bonus(mut self, bonus: RacialBonus) -> Self {
        self.bonuses.push(bonus);
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    pub fn with_movement(mut self, movement: i32) -> Self {
        self.movement = movement;
        self
    }

    pub fn with_setup(mut self, setup: RaceSetup) -> Self {
        self.setup = setup;
        self
    }

    /// Number of bonuses the player has to assign.
    pub fn free_bonus_count(&self) -> usize {
        self.bonuses.iter().filter(|b| b.is_free_choice()).count()
    }

    /// Run the setup transform against the full race list.
    ///
    /// The result always has an identity setup, so specializing twice is
    /// the same as specializing once.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sheetsmith::attribute::{Attribute, RacialBonus};
    /// use sheetsmith::catalog::{RaceDescriptor, RaceSetup};
    ///
    /// let dwarf = RaceDescriptor::new("Dwarf").with_bonus(RacialBonus::to(Attribute::Constitution, 2));
    /// let bones = RaceDescriptor::new("Bones").with_setup(RaceSetup::InheritBonuses {
    ///     from: "Dwarf".to_string(),
    /// });
    /// let races = vec![dwarf.clone(), bones.clone()];
    ///
    /// let specialized = bones.specialize(&races).unwrap();
    /// assert_eq!(specialized.name, "Bones");
    /// assert_eq!(specialized.bonuses, dwarf.bonuses);
    /// ```
    pub fn specialize(&self, races: &[RaceDescriptor]) -> Result<RaceDescriptor, BuildError> {
        match &self.setup {
            RaceSetup::Identity => Ok(self.clone()),
            RaceSetup::InheritBonuses { from } => {
                let sibling = races.iter().find(|race| &race.name == from).ok_or_else(|| {
                    BuildError::CatalogMiss {
                        kind: CatalogKind::Race,
                        name: from.clone(),
                    }
                })?;
                Ok(RaceDescriptor {
                    bonuses: sibling.bonuses.clone(),
                    setup: RaceSetup::Identity,
                    ..self.clone()
                })
            }
        }
    }
}

/// Spellcasting data of a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellPath {
    /// Attribute that scales mana points.
    pub key_attribute: Attribute,
}

/// A group of mandatory-skill rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillRuleGroup {
    /// Every listed skill is trained.
    AllOf(Vec<Skill>),
    /// One of the listed skills is trained.
    OneOf(Vec<Skill>),
}

/// "Choose `count` more skills from `allowed`".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FreeSkillRule {
    pub count: usize,
    pub allowed: Vec<Skill>,
}

/// A named specialization of a class, such as a casting tradition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassVariant {
    pub name: String,
    #[serde(default)]
    pub spell_path: Option<SpellPath>,
    #[serde(default)]
    pub proficiencies: Vec<String>,
}

/// Selection-time transform of a class.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClassSetup {
    #[default]
    Identity,
    /// The player must pick one variant.
    Variants(Vec<ClassVariant>),
}

/// A playable class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDescriptor {
    pub name: String,
    #[serde(default)]
    pub subname: Option<String>,
    pub base_pv: i32,
    pub pv_per_level: i32,
    pub base_pm: i32,
    pub pm_per_level: i32,
    #[serde(default)]
    pub proficiencies: Vec<String>,
    #[serde(default)]
    pub skill_groups: Vec<SkillRuleGroup>,
    #[serde(default)]
    pub free_skills: FreeSkillRule,
    #[serde(default)]
    pub spell_path: Option<SpellPath>,
    #[serde(default)]
    pub setup: ClassSetup,
}

impl ClassDescriptor {
    pub fn new(
        name: impl Into<String>,
        base_pv: i32,
        pv_per_level: i32,
        base_pm: i32,
        pm_per_level: i32,
    ) -> Self {
        Self {
            name: name.into(),
            subname: None,
            base_pv,
            pv_per_level,
            base_pm,
            pm_per_level,
            proficiencies: Vec::new(),
            skill_groups: Vec::new(),
            free_skills: FreeSkillRule::default(),
            spell_path: None,
            setup: ClassSetup::Identity,
        }
    }

    pub fn with_proficiency(mut self, proficiency: impl Into<String>) -> Self {
        self.proficiencies.push(proficiency.into());
        self
    }

    pub fn with_skill_group(mut self, group: SkillRuleGroup) -> Self {
        self.skill_groups.push(group);
        self
    }

    pub fn with_free_skills(mut self, count: usize, allowed: Vec<Skill>) -> Self {
        self.free_skills = FreeSkillRule { count, allowed };
        self
    }

    pub fn with_spell_path(mut self, key_attribute: Attribute) -> Self {
        self.spell_path = Some(SpellPath { key_attribute });
        self
    }

    pub fn with_variants(mut self, variants: Vec<ClassVariant>) -> Self {
        self.setup = ClassSetup::Variants(variants);
        self
    }

    /// Whether selecting this class needs a variant choice.
    pub fn requires_variant(&self) -> bool {
        matches!(&self.setup, ClassSetup::Variants(variants) if !variants.is_empty())
    }

    /// Run the setup transform with the player's variant choice.
    ///
    /// An identity setup ignores `variant`. A variant setup folds the chosen
    /// variant into the descriptor (subname, spell path, proficiencies); an
    /// unknown variant name is a catalog miss. Without a choice the
    /// descriptor is returned unresolved.
    pub fn specialize(&self, variant: Option<&str>) -> Result<ClassDescriptor, BuildError> {
        let ClassSetup::Variants(variants) = &self.setup else {
            return Ok(self.clone());
        };
        let Some(choice) = variant else {
            return Ok(self.clone());
        };

        let chosen = variants
            .iter()
            .find(|v| v.name == choice)
            .ok_or_else(|| BuildError::CatalogMiss {
                kind: CatalogKind::ClassVariant,
                name: choice.to_string(),
            })?;

        let mut specialized = self.clone();
        specialized.subname = Some(chosen.name.clone());
        if chosen.spell_path.is_some() {
            specialized.spell_path = chosen.spell_path;
        }
        specialized
            .proficiencies
            .extend(chosen.proficiencies.iter().cloned());
        specialized.setup = ClassSetup::Identity;
        Ok(specialized)
    }
}

/// A background granting skills and powers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub name: String,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub powers: Vec<String>,
}

impl Origin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            skills: Vec::new(),
            powers: Vec::new(),
        }
    }

    pub fn with_skill(mut self, skill: Skill) -> Self {
        self.skills.push(skill);
        self
    }

    pub fn with_power(mut self, power: impl Into<String>) -> Self {
        self.powers.push(power.into());
        self
    }
}

/// Source of reference data consumed by the build.
pub trait Catalog {
    /// Races in display order.
    fn races(&self) -> &[RaceDescriptor];

    /// Classes in display order.
    fn classes(&self) -> &[ClassDescriptor];

    /// Origins keyed by name.
    fn origins(&self) -> &BTreeMap<String, Origin>;

    fn race(&self, name: &str) -> Result<&RaceDescriptor, BuildError> {
        self.races()
            .iter()
            .find(|race| race.name == name)
            .ok_or_else(|| miss(CatalogKind::Race, name))
    }

    fn class(&self, name: &str) -> Result<&ClassDescriptor, BuildError> {
        self.classes()
            .iter()
            .find(|class| class.name == name)
            .ok_or_else(|| miss(CatalogKind::Class, name))
    }

    fn origin(&self, name: &str) -> Result<&Origin, BuildError> {
        self.origins()
            .get(name)
            .ok_or_else(|| miss(CatalogKind::Origin, name))
    }
}

impl<T: Catalog + ?Sized> Catalog for &T {
    fn races(&self) -> &[RaceDescriptor] {
        (**self).races()
    }

    fn classes(&self) -> &[ClassDescriptor] {
        (**self).classes()
    }

    fn origins(&self) -> &BTreeMap<String, Origin> {
        (**self).origins()
    }
}

fn miss(kind: CatalogKind, name: &str) -> BuildError {
    warn!(%kind, name, "catalog lookup failed");
    BuildError::CatalogMiss {
        kind,
        name: name.to_string(),
    }
}

/// An in-memory catalog.
///
/// # Examples
///
/// ```rust
/// use sheetsmith::catalog::{Catalog, ClassDescriptor, Origin, RaceDescriptor, StaticCatalog};
///
/// let catalog = StaticCatalog::new()
///     .with_race(RaceDescriptor::new("Human"))
///     .with_class(ClassDescriptor::new("Fighter", 20, 5, 3, 3))
///     .with_origin(Origin::new("Soldier"));
///
/// assert!(catalog.race("Human").is_ok());
/// assert!(catalog.class("Wizard").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticCatalog {
    #[serde(default)]
    races: Vec<RaceDescriptor>,
    #[serde(default)]
    classes: Vec<ClassDescriptor>,
    #[serde(default)]
    origins: BTreeMap<String, Origin>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, BuildError> {
        serde_json::from_str(json).map_err(|e| BuildError::InvalidCatalog(e.to_string()))
    }

    pub fn with_race(mut self, race: RaceDescriptor) -> Self {
        self.races.push(race);
        self
    }

    pub fn with_class(mut self, class: ClassDescriptor) -> Self {
        self.classes.push(class);
        self
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origins.insert(origin.name.clone(), origin);
        self
    }
}

impl Catalog for StaticCatalog {
    fn races(&self) -> &[RaceDescriptor] {
        &self.races
    }

    fn classes(&self) -> &[ClassDescriptor] {
        &self.classes
    }

    fn origins(&self) -> &BTreeMap<String, Origin> {
        &self.origins
    }
}
