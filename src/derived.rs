//! Derived stat calculator.
//!
//! Pure functions from a sheet's inputs (class, level, attribute modifiers)
//! to its combat statistics. Nothing here holds state; the recalculation
//! pass in [`crate::sheet`] composes them.

use crate::attribute::Attribute;
use crate::catalog::ClassDescriptor;
use crate::sheet::CharacterSheet;
use crate::skill::Skill;
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// Defense before any modifier.
pub const BASE_DEFENSE: i32 = 10;

/// Carry slots before the Strength modifier.
pub const BASE_CARRY_SLOTS: i32 = 10;

/// Bonus for a trained skill.
pub const TRAINING_BONUS: i32 = 2;

/// Hit points: `base_pv + pv_per_level * (level - 1) + con_mod * level`.
///
/// # Examples
///
/// ```rust
/// use sheetsmith::catalog::ClassDescriptor;
/// use sheetsmith::derived::hit_points;
///
/// let class = ClassDescriptor::new("Fighter", 20, 4, 3, 3);
/// assert_eq!(hit_points(&class, 1, 1), 21);
/// assert_eq!(hit_points(&class, 3, 2), 34);
/// ```
pub fn hit_points(class: &ClassDescriptor, level: i32, con_mod: i32) -> i32 {
    per_level(class.base_pv, class.pv_per_level, level, con_mod)
}

/// Mana points: `base_pm + pm_per_level * (level - 1) + key_mod * level`.
///
/// # Examples
///
/// ```rust
/// use sheetsmith::catalog::ClassDescriptor;
/// use sheetsmith::derived::mana_points;
///
/// let class = ClassDescriptor::new("Mage", 8, 2, 10, 3);
/// assert_eq!(mana_points(&class, 5, 2), 32);
/// ```
pub fn mana_points(class: &ClassDescriptor, level: i32, key_mod: i32) -> i32 {
    per_level(class.base_pm, class.pm_per_level, level, key_mod)
}

/// `base + per_level * (level - 1) + modifier * level`, saturating at the
/// `i32` bounds.
fn per_level(base: i32, per_level: i32, level: i32, modifier: i32) -> i32 {
    base.saturating_add(per_level.saturating_mul(level.saturating_sub(1)))
        .saturating_add(modifier.saturating_mul(level))
}

/// Attribute that scales a class's mana: its spell path key attribute, or
/// Intelligence for classes that do not cast.
pub fn key_attribute(class: &ClassDescriptor) -> Attribute {
    class
        .spell_path
        .map(|path| path.key_attribute)
        .unwrap_or(Attribute::Intelligence)
}

/// Equipment and miscellaneous contributions to defense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DefenseBonuses {
    pub armor: i32,
    pub shield: i32,
    pub other: i32,
}

/// Defense: `10 + dex_mod + armor + shield + other`.
///
/// # Examples
///
/// ```rust
/// use sheetsmith::derived::{defense, DefenseBonuses};
///
/// assert_eq!(defense(3, &DefenseBonuses::default()), 13);
/// let bonuses = DefenseBonuses { armor: 4, shield: 2, other: 0 };
/// assert_eq!(defense(1, &bonuses), 17);
/// ```
pub fn defense(dex_mod: i32, bonuses: &DefenseBonuses) -> i32 {
    BASE_DEFENSE
        .saturating_add(dex_mod)
        .saturating_add(bonuses.armor)
        .saturating_add(bonuses.shield)
        .saturating_add(bonuses.other)
}

/// Inventory slots: `10 + str_mod`.
pub fn max_carry_slots(str_mod: i32) -> i32 {
    BASE_CARRY_SLOTS.saturating_add(str_mod)
}

/// Skill total for a sheet.
///
/// Half the level (rounded down), plus the governing attribute modifier,
/// plus the training bonus, minus the sheet's armor penalty for skills
/// that suffer it.
pub fn skill_total(skill: Skill, sheet: &CharacterSheet, trained: bool) -> i32 {
    let training = if trained { TRAINING_BONUS } else { 0 };
    let penalty = if skill.has_armor_penalty() {
        sheet.extra_armor_penalty
    } else {
        0
    };
    sheet
        .level
        .div_euclid(2)
        .saturating_add(sheet.attributes.modifier(skill.governing_attribute()))
        .saturating_add(training)
        .saturating_sub(penalty)
}

/// One row of the complete skill table.
///
/// The total is not stored; [`SkillBreakdown::total`] recomputes it from the
/// sheet whenever it is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillBreakdown {
    pub skill: Skill,
    pub half_level: i32,
    pub attribute: Attribute,
    pub training: i32,
    pub others: i32,
}

impl SkillBreakdown {
    pub fn total(&self, sheet: &CharacterSheet) -> i32 {
        let penalty = if self.skill.has_armor_penalty() {
            sheet.extra_armor_penalty
        } else {
            0
        };
        self.half_level
            .saturating_add(sheet.attributes.modifier(self.attribute))
            .saturating_add(self.training)
            .saturating_add(self.others)
            .saturating_sub(penalty)
    }

    pub fn is_trained(&self) -> bool {
        self.training > 0
    }
}

/// Breakdown of every skill on the sheet.
///
/// Specialized skills are listed only when trained; all others always are.
pub fn complete_skill_table(sheet: &CharacterSheet) -> Vec<SkillBreakdown> {
    let half_level = sheet.level.div_euclid(2);
    Skill::iter()
        .map(|skill| SkillBreakdown {
            skill,
            half_level,
            attribute: skill.governing_attribute(),
            training: if sheet.skills.contains(&skill) {
                TRAINING_BONUS
            } else {
                0
            },
            others: 0,
        })
        .filter(|row| !row.skill.is_specialized() || row.is_trained())
        .collect()
}

/// Roll one six-sided die.
pub fn roll_d6<R: Rng + ?Sized>(rng: &mut R) -> i32 {
    rng.gen_range(1..=6)
}

/// Starting money: `(2d6 + level) * 10`.
///
/// Every call rolls again.
///
/// # Examples
///
/// ```rust
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use sheetsmith::derived::initial_money;
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let money = initial_money(3, &mut rng);
/// assert!((50..=150).contains(&money));
/// assert_eq!(money % 10, 0);
/// ```
pub fn initial_money<R: Rng + ?Sized>(level: i32, rng: &mut R) -> i32 {
    let d1 = roll_d6(rng);
    let d2 = roll_d6(rng);
    (d1 + d2).saturating_add(level).saturating_mul(10)
}
