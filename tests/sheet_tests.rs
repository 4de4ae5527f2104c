//! Tests for sheet recalculation and rules configuration.
//!
//! These tests verify:
//! - Derived fields follow the raw fields
//! - Recalculation is idempotent
//! - The complete skill table and armor penalties
//! - House-rule limits flow into the gates

use rand::rngs::StdRng;
use rand::SeedableRng;
use sheetsmith::attribute::{Attribute, AttributeSet};
use sheetsmith::catalog::{ClassDescriptor, RaceDescriptor, Size};
use sheetsmith::derived::TRAINING_BONUS;
use sheetsmith::skill::Skill;
use sheetsmith::*;

fn base_sheet() -> CharacterSheet {
    let mut sheet = CharacterSheet::blank();
    sheet.name = "Orrin".to_string();
    sheet.gender = "Male".to_string();
    sheet.level = 4;
    sheet.attributes = AttributeSet::from_values([16, 14, 12, 10, 13, 8]);
    sheet.race = Some(RaceDescriptor::new("Minotaur").with_size(Size::Large));
    sheet.class = Some(ClassDescriptor::new("Barbarian", 24, 6, 3, 3));
    sheet
}

// ============================================================================
// Recalculation
// ============================================================================

#[test]
fn test_recalculation_requires_race_and_class() {
    let mut sheet = base_sheet();
    sheet.class = None;
    assert_eq!(
        sheet.recalculated().unwrap_err(),
        BuildError::MissingPrerequisite(Step::Class)
    );

    sheet.race = None;
    assert_eq!(
        recalculate(&sheet).unwrap_err(),
        BuildError::MissingPrerequisite(Step::Race)
    );
}

#[test]
fn test_derived_fields() {
    let sheet = base_sheet().recalculated().unwrap();
    let derived = sheet.derived();

    // 24 + 6 * 3 + 1 * 4
    assert_eq!(derived.hit_points, 46);
    // no spell path: Intelligence mod 0
    assert_eq!(derived.mana_points, 3 + 3 * 3);
    assert_eq!(derived.defense, 12);
    assert_eq!(derived.max_carry_slots, 13);
    assert_eq!(derived.size, Size::Large);
    assert_eq!(derived.movement_rate, 9);
}

/// Editing a raw field and recalculating moves the derived fields with it.
#[test]
fn test_derived_fields_track_inputs() {
    let first = base_sheet().recalculated().unwrap();

    let mut edited = first.clone();
    edited.attributes.set_value(Attribute::Dexterity, 8);
    edited.level = 5;
    let second = edited.recalculated().unwrap();

    assert_eq!(second.derived().defense, 9);
    assert_eq!(second.derived().hit_points, 24 + 6 * 4 + 1 * 5);
    assert_ne!(first.derived(), second.derived());
}

#[test]
fn test_recalculation_is_idempotent() {
    let mut sheet = base_sheet();
    sheet.skills.insert(Skill::Athletics);
    sheet.skills.insert(Skill::CraftArmorer);

    let once = sheet.recalculated().unwrap();
    let twice = once.recalculated().unwrap();
    assert_eq!(once, twice);
}

// ============================================================================
// Skill table
// ============================================================================

#[test]
fn test_skill_table_hides_untrained_crafts() {
    let mut sheet = base_sheet();
    sheet.skills.insert(Skill::CraftArmorer);
    let sheet = sheet.recalculated().unwrap();

    let table = &sheet.derived().complete_skill_table;
    assert!(table.iter().any(|row| row.skill == Skill::CraftArmorer));
    assert!(!table.iter().any(|row| row.skill == Skill::CraftCook));
    assert!(table.iter().any(|row| row.skill == Skill::Will));
}

#[test]
fn test_skill_totals() {
    let mut sheet = base_sheet();
    sheet.skills.insert(Skill::Athletics);
    let sheet = sheet.recalculated().unwrap();

    // half level 2 + STR 3 + training
    assert_eq!(sheet.skill_total(Skill::Athletics), 2 + 3 + TRAINING_BONUS);
    // half level 2 + CHA -1, untrained
    assert_eq!(sheet.skill_total(Skill::Diplomacy), 1);

    let row = sheet
        .derived()
        .complete_skill_table
        .iter()
        .find(|row| row.skill == Skill::Athletics)
        .unwrap();
    assert!(row.is_trained());
    assert_eq!(row.total(&sheet), sheet.skill_total(Skill::Athletics));
}

#[test]
fn test_armor_penalty_applies_to_marked_skills() {
    let mut sheet = base_sheet();
    sheet.extra_armor_penalty = 3;
    let sheet = sheet.recalculated().unwrap();

    // DEX 14: 2 + 2 - 3
    assert_eq!(sheet.skill_total(Skill::Stealth), 1);
    assert_eq!(sheet.skill_total(Skill::Acrobatics), 1);
    assert_eq!(sheet.skill_total(Skill::Reflexes), 4);
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn test_sheet_json_round_trip() {
    let sheet = base_sheet().recalculated().unwrap();
    let json = serde_json::to_string(&sheet).unwrap();
    assert!(json.contains(r#""mod":3"#));

    let restored: CharacterSheet = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, sheet);
    assert_eq!(restored.id, sheet.id);
}

// ============================================================================
// Rules configuration
// ============================================================================

/// A larger house-rule pool admits an allocation the standard pool rejects.
#[test]
fn test_house_rule_pool() {
    let catalog = StaticCatalog::from_json(
        r#"{
            "races": [{"name": "Human", "bonuses": []}],
            "classes": [{"name": "Fighter", "base_pv": 20, "pv_per_level": 5,
                         "base_pm": 3, "pm_per_level": 3}]
        }"#,
    )
    .unwrap();
    let rules = RulesConfig::from_json(r#"{"point_pool": 32, "max_level": 10}"#).unwrap();
    let mut wizard = Wizard::with_rng(&catalog, rules, StdRng::seed_from_u64(5));

    let too_high = StepPatch::Identity(IdentityPatch {
        name: "Lia".to_string(),
        gender: "Female".to_string(),
        level: 11,
    });
    assert!(!wizard.can_proceed(&too_high));

    wizard
        .submit(
            IdentityPatch {
                name: "Lia".to_string(),
                gender: "Female".to_string(),
                level: 10,
            }
            .into(),
        )
        .unwrap();
    wizard
        .submit(
            RacePatch {
                race: Some("Human".to_string()),
            }
            .into(),
        )
        .unwrap();
    wizard
        .submit(
            ClassPatch {
                class: Some("Fighter".to_string()),
                variant: None,
            }
            .into(),
        )
        .unwrap();

    // 9 + 9 + 9 + 2 + 2 + 0 = 31
    let allocation = AttributeSet::from_values([15, 15, 15, 10, 10, 8]);
    assert_eq!(wizard.point_budget(&allocation).remaining(), 1);
    let outcome = wizard
        .submit(
            AttributesPatch {
                allocation,
                free_bonuses: Vec::new(),
            }
            .into(),
        )
        .unwrap();
    assert_eq!(outcome, Transition::Advanced(Step::Skills));
}

/// Rules built by hand skip `validate`; extreme levels saturate instead of
/// overflowing.
#[test]
fn test_unvalidated_level_bound_does_not_overflow() {
    let catalog = StaticCatalog::new()
        .with_race(RaceDescriptor::new("Human"))
        .with_class(ClassDescriptor::new("Fighter", 20, 5, 3, 3));
    let rules = RulesConfig {
        max_level: i32::MAX,
        ..RulesConfig::default()
    };
    assert!(rules.validate().is_err());
    let mut wizard = Wizard::with_rng(&catalog, rules, StdRng::seed_from_u64(8));

    wizard
        .submit(
            IdentityPatch {
                name: "Vex".to_string(),
                gender: "Female".to_string(),
                level: i32::MAX,
            }
            .into(),
        )
        .unwrap();
    wizard
        .submit(
            RacePatch {
                race: Some("Human".to_string()),
            }
            .into(),
        )
        .unwrap();
    let outcome = wizard
        .submit(
            ClassPatch {
                class: Some("Fighter".to_string()),
                variant: None,
            }
            .into(),
        )
        .unwrap();

    assert_eq!(outcome, Transition::Advanced(Step::Attributes));
    assert_eq!(wizard.sheet().derived().hit_points, i32::MAX);
    assert_eq!(wizard.money_offer(), i32::MAX);
}
