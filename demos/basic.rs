//! Basic example: A complete character build
//!
//! This example demonstrates:
//! - Setting up a catalog of races, classes and origins
//! - Walking every wizard step with typed patches
//! - Handling a blocked step
//! - Reading the completed sheet and storing it as JSON lines

use sheetsmith::attribute::{Attribute, AttributeSet, RacialBonus};
use sheetsmith::catalog::{ClassDescriptor, Origin, RaceDescriptor, SkillRuleGroup};
use sheetsmith::skill::Skill;
use sheetsmith::*;

fn main() -> Result<(), BuildError> {
    // Reference data
    let catalog = StaticCatalog::new()
        .with_race(
            RaceDescriptor::new("Dwarf")
                .with_bonus(RacialBonus::to(Attribute::Constitution, 2))
                .with_bonus(RacialBonus::to(Attribute::Wisdom, 1))
                .with_bonus(RacialBonus::to(Attribute::Dexterity, -1))
                .with_movement(6),
        )
        .with_class(
            ClassDescriptor::new("Fighter", 20, 5, 3, 3)
                .with_skill_group(SkillRuleGroup::AllOf(vec![Skill::Fight, Skill::Fortitude]))
                .with_free_skills(2, vec![Skill::Athletics, Skill::Intimidation, Skill::Riding]),
        )
        .with_origin(Origin::new("Soldier").with_power("Discipline"));

    let mut wizard = Wizard::new(&catalog);
    println!("Build session {}", wizard.session());

    let steps: Vec<StepPatch> = vec![
        IdentityPatch {
            name: "Brom".to_string(),
            gender: "Male".to_string(),
            level: 3,
        }
        .into(),
        RacePatch {
            race: Some("Dwarf".to_string()),
        }
        .into(),
        ClassPatch {
            class: Some("Fighter".to_string()),
            variant: None,
        }
        .into(),
    ];
    for patch in steps {
        println!("  {:?}: {:?}", patch.step(), wizard.submit(patch)?);
    }

    // Over budget: 9 + 9 + 9 + 2 + 2 + 2 = 33 points
    println!("\nAttributes:");
    let greedy = AttributeSet::from_values([15, 15, 15, 10, 10, 10]);
    println!("  {}", wizard.point_budget(&greedy));
    if let Transition::Blocked(reason) = wizard.submit(
        AttributesPatch {
            allocation: greedy,
            free_bonuses: Vec::new(),
        }
        .into(),
    )? {
        println!("  blocked: {}", reason);
    }

    let allocation = AttributeSet::from_values([15, 12, 14, 10, 10, 8]);
    println!("  {}", wizard.point_budget(&allocation));
    wizard.submit(
        AttributesPatch {
            allocation,
            free_bonuses: Vec::new(),
        }
        .into(),
    )?;

    // Skills: the class trains Fight and Fortitude and lets the player pick two more
    let mut selection = wizard.skill_selection()?;
    selection.toggle(Skill::Athletics);
    println!("\nSkills: {}", selection.status());
    selection.toggle(Skill::Intimidation);
    println!("Skills: {}", selection.status());

    wizard.submit(
        SkillsPatch {
            selected: selection.selected(),
        }
        .into(),
    )?;
    wizard.submit(
        OriginPatch {
            origin: Some("Soldier".to_string()),
        }
        .into(),
    )?;
    wizard.submit(PowersPatch::default().into())?;
    wizard.submit(SpellsPatch::default().into())?;

    let offer = wizard.money_offer();
    println!("\nStarting money offer: {}", offer);
    wizard.submit(EquipmentPatch::default().into())?;

    wizard.submit(StepPatch::Review)?;

    // Display results
    let sheet = wizard
        .completed()
        .ok_or(BuildError::MissingPrerequisite(Step::Review))?;
    let derived = sheet.derived();
    println!("\n=== Completed Sheet ===");
    println!("Name: {} (level {})", sheet.name, sheet.level);
    for (attribute, score) in sheet.attributes.iter() {
        println!(
            "  {}: {} ({:+})",
            attribute.abbreviation(),
            score.value(),
            score.modifier()
        );
    }
    println!("Hit points: {}", derived.hit_points);
    println!("Mana points: {}", derived.mana_points);
    println!("Defense: {}", derived.defense);
    println!("Carry slots: {}", derived.max_carry_slots);
    println!("Movement: {}m", derived.movement_rate);
    println!("Money: {}", sheet.money);

    println!("\nTrained skills:");
    for row in derived.complete_skill_table.iter().filter(|row| row.is_trained()) {
        println!("  {}: {:+}", row.skill, row.total(sheet));
    }

    println!("\nHit points: 20 + 5 * 2 + 3 * 3 = {}", derived.hit_points);

    let mut store = JsonLinesStore::new(Vec::new());
    wizard.save_to(&mut store)?;
    println!("\nStored {} bytes of JSON", store.into_inner().len());

    Ok(())
}
