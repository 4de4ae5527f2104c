//! Build orchestrator.
//!
//! A [`Wizard`] owns one in-progress sheet and walks it through a fixed
//! sequence of steps. Each step accepts exactly one kind of typed patch;
//! the patch is checked against the step's gate, merged, and the wizard
//! moves on. Reaching Review runs the full recalculation, and confirming
//! the review freezes the sheet into a [`CompletedSheet`].
//!
//! ```text
//! Identity → Race → Class → Attributes → Skills → Origin
//!          → Powers → Spells → Equipment → Review → (Completed)
//! ```
//!
//! Attributes come after Race and Skills after Class by position in this
//! sequence; their merges read the race and class chosen earlier.

use crate::attribute::{
    apply_free_bonuses, apply_racial_bonuses, Attribute, AttributeSet, PointBudget,
};
use crate::catalog::{Catalog, RaceDescriptor};
use crate::config::RulesConfig;
use crate::derived::initial_money;
use crate::error::BuildError;
use crate::gate::{Blocked, Gate};
use crate::sheet::{CharacterSheet, OriginSelection};
use crate::skill::Skill;
use crate::skill_gate::{SkillGate, SkillSelection};
use crate::store::SheetStore;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::ops::Deref;
use tracing::{debug, info};
use uuid::Uuid;

/// A step of the build, in order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum::AsRefStr,
)]
pub enum Step {
    Identity,
    Race,
    Class,
    Attributes,
    Skills,
    Origin,
    Powers,
    Spells,
    Equipment,
    Review,
}

impl Step {
    pub const ALL: [Step; 10] = [
        Step::Identity,
        Step::Race,
        Step::Class,
        Step::Attributes,
        Step::Skills,
        Step::Origin,
        Step::Powers,
        Step::Spells,
        Step::Equipment,
        Step::Review,
    ];

    /// Zero-based position in the sequence.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<Step> {
        Step::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(self) -> Option<Step> {
        self.index().checked_sub(1).map(|idx| Step::ALL[idx])
    }

    /// Steps whose gate can close. The rest only merge a contribution.
    pub fn is_gated(self) -> bool {
        !matches!(self, Step::Powers | Step::Spells | Step::Equipment | Step::Review)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdentityPatch {
    pub name: String,
    pub gender: String,
    pub level: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RacePatch {
    pub race: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassPatch {
    pub class: Option<String>,
    pub variant: Option<String>,
}

/// The point-buy allocation, before racial bonuses, and the targets of the
/// race's free-choice bonuses in bonus order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttributesPatch {
    pub allocation: AttributeSet,
    pub free_bonuses: Vec<Attribute>,
}

/// Skills picked by the player. Mandatory class skills may be included or
/// left out; they are trained either way.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SkillsPatch {
    pub selected: Vec<Skill>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OriginPatch {
    pub origin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PowersPatch {
    pub general: Vec<String>,
    pub class: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpellsPatch {
    pub spells: Vec<String>,
}

/// Starting money. `None` accepts the wizard's roll.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EquipmentPatch {
    pub money: Option<i32>,
}

/// A step's contribution to the sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepPatch {
    Identity(IdentityPatch),
    Race(RacePatch),
    Class(ClassPatch),
    Attributes(AttributesPatch),
    Skills(SkillsPatch),
    Origin(OriginPatch),
    Powers(PowersPatch),
    Spells(SpellsPatch),
    Equipment(EquipmentPatch),
    /// Confirm the reviewed sheet.
    Review,
}

impl StepPatch {
    /// The step this patch belongs to.
    pub fn step(&self) -> Step {
        match self {
            StepPatch::Identity(_) => Step::Identity,
            StepPatch::Race(_) => Step::Race,
            StepPatch::Class(_) => Step::Class,
            StepPatch::Attributes(_) => Step::Attributes,
            StepPatch::Skills(_) => Step::Skills,
            StepPatch::Origin(_) => Step::Origin,
            StepPatch::Powers(_) => Step::Powers,
            StepPatch::Spells(_) => Step::Spells,
            StepPatch::Equipment(_) => Step::Equipment,
            StepPatch::Review => Step::Review,
        }
    }
}

macro_rules! impl_from_patch {
    ($($patch:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$patch> for StepPatch {
                fn from(patch: $patch) -> Self {
                    StepPatch::$variant(patch)
                }
            }
        )*
    };
}

impl_from_patch! {
    IdentityPatch => Identity,
    RacePatch => Race,
    ClassPatch => Class,
    AttributesPatch => Attributes,
    SkillsPatch => Skills,
    OriginPatch => Origin,
    PowersPatch => Powers,
    SpellsPatch => Spells,
    EquipmentPatch => Equipment,
}

/// Result of submitting a patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The patch was merged; the wizard is now at this step.
    Advanced(Step),
    /// The gate is closed; nothing was merged.
    Blocked(Blocked),
    /// The review was confirmed and the sheet frozen.
    Completed,
}

/// A finished, recalculated sheet. Read-only.
///
/// Deserializing runs the recalculation again and fails for a sheet without
/// a race or class.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CompletedSheet(CharacterSheet);

impl<'de> Deserialize<'de> for CompletedSheet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let sheet = CharacterSheet::deserialize(deserializer)?;
        sheet
            .recalculated()
            .map(CompletedSheet)
            .map_err(de::Error::custom)
    }
}

impl CompletedSheet {
    pub fn sheet(&self) -> &CharacterSheet {
        &self.0
    }

    pub fn into_inner(self) -> CharacterSheet {
        self.0
    }
}

impl Deref for CompletedSheet {
    type Target = CharacterSheet;

    fn deref(&self) -> &CharacterSheet {
        &self.0
    }
}

#[derive(Debug, Clone)]
enum Phase {
    Building(Step),
    Completed(CompletedSheet),
}

/// The step state machine for one character build.
///
/// # Examples
///
/// ```rust
/// use sheetsmith::catalog::{ClassDescriptor, RaceDescriptor, StaticCatalog};
/// use sheetsmith::wizard::{IdentityPatch, RacePatch, Step, Transition, Wizard};
///
/// let catalog = StaticCatalog::new()
///     .with_race(RaceDescriptor::new("Human"))
///     .with_class(ClassDescriptor::new("Fighter", 20, 5, 3, 3));
/// let mut wizard = Wizard::new(&catalog);
///
/// let identity = IdentityPatch {
///     name: "Aria".into(),
///     gender: "Female".into(),
///     level: 1,
/// };
/// assert_eq!(
///     wizard.submit(identity.into()).unwrap(),
///     Transition::Advanced(Step::Race)
/// );
///
/// // no race chosen yet
/// let outcome = wizard.submit(RacePatch::default().into()).unwrap();
/// assert!(matches!(outcome, Transition::Blocked(_)));
/// assert_eq!(wizard.current(), Some(Step::Race));
/// ```
pub struct Wizard<C: Catalog, R: Rng = StdRng> {
    session: Uuid,
    catalog: C,
    rules: RulesConfig,
    rng: R,
    phase: Phase,
    sheet: CharacterSheet,
    allocation: Option<AttributeSet>,
    free_bonus_picks: Vec<Attribute>,
    variant: Option<String>,
    money_offer: Option<(i32, i32)>,
    review: Option<CharacterSheet>,
}

impl<C: Catalog> Wizard<C, StdRng> {
    /// A wizard with the standard rules and an entropy-seeded roller.
    pub fn new(catalog: C) -> Self {
        Self::with_rules(catalog, RulesConfig::default())
    }

    pub fn with_rules(catalog: C, rules: RulesConfig) -> Self {
        Wizard::with_rng(catalog, rules, StdRng::from_entropy())
    }
}

impl<C: Catalog, R: Rng> Wizard<C, R> {
    /// A wizard rolling dice with `rng`.
    pub fn with_rng(catalog: C, rules: RulesConfig, rng: R) -> Self {
        let session = Uuid::new_v4();
        debug!(%session, "starting character build");
        Self {
            session,
            catalog,
            rules,
            rng,
            phase: Phase::Building(Step::Identity),
            sheet: CharacterSheet::blank(),
            allocation: None,
            free_bonus_picks: Vec::new(),
            variant: None,
            money_offer: None,
            review: None,
        }
    }

    /// Build session id, the key under which the result is stored.
    pub fn session(&self) -> Uuid {
        self.session
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    /// The current step, or `None` once completed.
    pub fn current(&self) -> Option<Step> {
        match &self.phase {
            Phase::Building(step) => Some(*step),
            Phase::Completed(_) => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.phase, Phase::Completed(_))
    }

    /// The work-in-progress sheet.
    pub fn sheet(&self) -> &CharacterSheet {
        &self.sheet
    }

    /// The recalculated sheet shown at Review.
    pub fn review(&self) -> Option<&CharacterSheet> {
        self.review.as_ref()
    }

    pub fn completed(&self) -> Option<&CompletedSheet> {
        match &self.phase {
            Phase::Completed(sheet) => Some(sheet),
            Phase::Building(_) => None,
        }
    }

    /// The last submitted point-buy allocation, or all tens.
    pub fn allocation(&self) -> AttributeSet {
        self.allocation.unwrap_or_default()
    }

    /// Targets of the free racial bonuses from the last attributes patch.
    pub fn free_bonus_picks(&self) -> &[Attribute] {
        &self.free_bonus_picks
    }

    /// Class variant chosen at the Class step.
    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    /// Point-buy spend of `allocation` against the configured pool.
    pub fn point_budget(&self, allocation: &AttributeSet) -> PointBudget {
        PointBudget::of(allocation, self.rules.point_pool)
    }

    /// The skill gate of the chosen class, seeded with the sheet's skills.
    pub fn skill_selection(&self) -> Result<SkillSelection, BuildError> {
        let class = self
            .sheet
            .class
            .as_ref()
            .ok_or(BuildError::MissingPrerequisite(Step::Class))?;
        let previous: Vec<Skill> = self.sheet.skills.iter().copied().collect();
        Ok(SkillSelection::new(SkillGate::for_class(class), &previous))
    }

    /// Starting money offered at the Equipment step.
    ///
    /// Rolled on first request and kept while the level stays the same.
    pub fn money_offer(&mut self) -> i32 {
        match self.money_offer {
            Some((level, money)) if level == self.sheet.level => money,
            _ => self.reroll_money(),
        }
    }

    /// Roll the starting money again.
    pub fn reroll_money(&mut self) -> i32 {
        let money = initial_money(self.sheet.level, &mut self.rng);
        debug!(session = %self.session, level = self.sheet.level, money, "rolled starting money");
        self.money_offer = Some((self.sheet.level, money));
        money
    }

    /// Evaluate the gate for `patch` without merging it.
    pub fn gate(&self, patch: &StepPatch) -> Result<Gate, BuildError> {
        self.expect_step(patch.step())?;
        match patch {
            StepPatch::Identity(patch) => Ok(self.identity_gate(patch)),
            StepPatch::Race(patch) => match &patch.race {
                None => Ok(Gate::Blocked(Blocked::MissingSelection(Step::Race))),
                Some(name) => self.catalog.race(name).map(|_| Gate::Open),
            },
            StepPatch::Class(patch) => {
                let Some(name) = &patch.class else {
                    return Ok(Gate::Blocked(Blocked::MissingSelection(Step::Class)));
                };
                let class = self.catalog.class(name)?;
                if class.requires_variant() && patch.variant.is_none() {
                    return Ok(Gate::Blocked(Blocked::MissingVariant {
                        class: class.name.clone(),
                    }));
                }
                class.specialize(patch.variant.as_deref())?;
                Ok(Gate::Open)
            }
            StepPatch::Attributes(patch) => {
                let race = self.chosen_race()?;
                Ok(self.attributes_gate(race, patch))
            }
            StepPatch::Skills(patch) => {
                let class = self
                    .sheet
                    .class
                    .as_ref()
                    .ok_or(BuildError::MissingPrerequisite(Step::Class))?;
                Ok(SkillGate::for_class(class).check(&patch.selected).into())
            }
            StepPatch::Origin(patch) => match &patch.origin {
                None => Ok(Gate::Blocked(Blocked::MissingSelection(Step::Origin))),
                Some(name) => self.catalog.origin(name).map(|_| Gate::Open),
            },
            StepPatch::Powers(_)
            | StepPatch::Spells(_)
            | StepPatch::Equipment(_)
            | StepPatch::Review => Ok(Gate::Open),
        }
    }

    /// Shorthand for `gate(patch)` being open. Errors count as closed.
    pub fn can_proceed(&self, patch: &StepPatch) -> bool {
        self.gate(patch).map(|g| g.can_proceed()).unwrap_or(false)
    }

    /// Merge `patch` into the sheet and advance, if its gate is open.
    ///
    /// A patch for any step but the current one is rejected. Catalog misses
    /// are returned as errors; a closed gate is returned as
    /// [`Transition::Blocked`] and leaves the wizard where it was.
    pub fn submit(&mut self, patch: StepPatch) -> Result<Transition, BuildError> {
        let step = self.expect_step(patch.step())?;
        if let Gate::Blocked(reason) = self.gate(&patch)? {
            debug!(session = %self.session, %step, %reason, "step blocked");
            return Ok(Transition::Blocked(reason));
        }

        match patch {
            StepPatch::Identity(patch) => {
                self.sheet.name = patch.name;
                self.sheet.gender = patch.gender;
                self.sheet.level = patch.level;
            }
            StepPatch::Race(patch) => {
                let name = patch.race.ok_or(BuildError::MissingPrerequisite(Step::Race))?;
                let race = self.catalog.race(&name)?.specialize(self.catalog.races())?;
                self.sheet.race = Some(race);
            }
            StepPatch::Class(patch) => {
                let name = patch
                    .class
                    .ok_or(BuildError::MissingPrerequisite(Step::Class))?;
                let listed = self.catalog.class(&name)?;
                // an identity setup ignores the variant, so none is recorded
                let variant = if listed.requires_variant() {
                    patch.variant
                } else {
                    None
                };
                let class = listed.specialize(variant.as_deref())?;
                self.sheet.class = Some(class);
                self.variant = variant;
            }
            StepPatch::Attributes(patch) => {
                let race = self.chosen_race()?;
                let attributes = match boosted(race, &patch.allocation, &patch.free_bonuses) {
                    Ok(attributes) => attributes,
                    Err(reason) => return Ok(Transition::Blocked(reason)),
                };
                self.sheet.attributes = attributes;
                self.allocation = Some(patch.allocation);
                self.free_bonus_picks = patch.free_bonuses;
            }
            StepPatch::Skills(patch) => {
                let class = self
                    .sheet
                    .class
                    .as_ref()
                    .ok_or(BuildError::MissingPrerequisite(Step::Class))?;
                self.sheet.skills = SkillGate::for_class(class).trained(&patch.selected);
            }
            StepPatch::Origin(patch) => {
                let name = patch
                    .origin
                    .ok_or(BuildError::MissingPrerequisite(Step::Origin))?;
                let origin = self.catalog.origin(&name)?;
                self.sheet.origin = Some(OriginSelection {
                    name: origin.name.clone(),
                    powers: origin.powers.clone(),
                });
            }
            StepPatch::Powers(patch) => {
                self.sheet.general_powers = patch.general;
                self.sheet.class_powers = patch.class;
            }
            StepPatch::Spells(patch) => {
                self.sheet.spells = patch.spells;
            }
            StepPatch::Equipment(patch) => {
                let money = match patch.money {
                    Some(money) => money,
                    None => self.money_offer(),
                };
                self.sheet.money = money;
            }
            StepPatch::Review => return self.complete(),
        }

        debug!(session = %self.session, %step, "merged step");
        self.refresh();
        self.advance_from(step)
    }

    /// Go back one step. Nothing entered so far is discarded.
    pub fn retreat(&mut self) -> Result<Step, BuildError> {
        let step = match &self.phase {
            Phase::Completed(_) => return Err(BuildError::AlreadyCompleted),
            Phase::Building(step) => *step,
        };
        let previous = step.previous().unwrap_or(step);
        if step == Step::Review {
            self.review = None;
        }
        self.phase = Phase::Building(previous);
        debug!(session = %self.session, from = %step, to = %previous, "retreated");
        Ok(previous)
    }

    /// Append the completed sheet to `store` under this session.
    pub fn save_to<S: SheetStore>(&self, store: &mut S) -> Result<(), BuildError> {
        let completed = self
            .completed()
            .ok_or(BuildError::MissingPrerequisite(Step::Review))?;
        store
            .append(self.session, completed)
            .map_err(|e| BuildError::Store(e.to_string()))?;
        info!(session = %self.session, sheet = %completed.id, "stored completed sheet");
        Ok(())
    }

    fn expect_step(&self, found: Step) -> Result<Step, BuildError> {
        match &self.phase {
            Phase::Completed(_) => Err(BuildError::AlreadyCompleted),
            Phase::Building(expected) if *expected == found => Ok(found),
            Phase::Building(expected) => Err(BuildError::StepMismatch {
                expected: *expected,
                found,
            }),
        }
    }

    fn chosen_race(&self) -> Result<&RaceDescriptor, BuildError> {
        self.sheet
            .race
            .as_ref()
            .ok_or(BuildError::MissingPrerequisite(Step::Race))
    }

    fn identity_gate(&self, patch: &IdentityPatch) -> Gate {
        if patch.name.trim().is_empty() {
            return Gate::Blocked(Blocked::MissingName);
        }
        if patch.gender.trim().is_empty() {
            return Gate::Blocked(Blocked::MissingGender);
        }
        if !(self.rules.min_level..=self.rules.max_level).contains(&patch.level) {
            return Gate::Blocked(Blocked::LevelOutOfRange {
                level: patch.level,
                min: self.rules.min_level,
                max: self.rules.max_level,
            });
        }
        Gate::Open
    }

    fn attributes_gate(&self, race: &RaceDescriptor, patch: &AttributesPatch) -> Gate {
        let (min, max) = (self.rules.min_purchase, self.rules.max_purchase);
        for (attribute, score) in patch.allocation.iter() {
            if !(min..=max).contains(&score.value()) {
                return Gate::Blocked(Blocked::ValueOutOfRange {
                    attribute,
                    value: score.value(),
                    min,
                    max,
                });
            }
        }

        let budget = self.point_budget(&patch.allocation);
        if !budget.within() {
            return Gate::Blocked(Blocked::PointsExceeded {
                spent: budget.spent,
                pool: budget.pool,
            });
        }

        boosted(race, &patch.allocation, &patch.free_bonuses)
            .map(|_| ())
            .into()
    }

    /// Recompute derived fields once race and class are both known.
    fn refresh(&mut self) {
        if self.sheet.race.is_none() || self.sheet.class.is_none() {
            return;
        }
        if let Ok(sheet) = self.sheet.recalculated() {
            self.sheet = sheet;
        }
    }

    fn advance_from(&mut self, step: Step) -> Result<Transition, BuildError> {
        let Some(next) = step.next() else {
            return self.complete();
        };
        if next == Step::Review {
            self.review = Some(self.sheet.recalculated()?);
        }
        self.phase = Phase::Building(next);
        Ok(Transition::Advanced(next))
    }

    fn complete(&mut self) -> Result<Transition, BuildError> {
        let sheet = self.sheet.recalculated()?;
        info!(
            session = %self.session,
            sheet = %sheet.id,
            name = %sheet.name,
            level = sheet.level,
            "character build completed"
        );
        self.review = None;
        self.phase = Phase::Completed(CompletedSheet(sheet));
        Ok(Transition::Completed)
    }
}

/// Purchased attributes with every racial bonus applied: fixed bonuses
/// first, then the player's free picks.
fn boosted(
    race: &RaceDescriptor,
    allocation: &AttributeSet,
    picks: &[Attribute],
) -> Result<AttributeSet, Blocked> {
    let fixed = apply_racial_bonuses(allocation, &race.bonuses);
    apply_free_bonuses(&fixed, &race.bonuses, picks)
}
