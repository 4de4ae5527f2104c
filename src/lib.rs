//! # sheetsmith - Deterministic Character Build Engine
//!
//! A build and recalculation engine for tabletop RPG character sheets that
//! provides:
//! - **Step-gated** construction (each step has a local validity check)
//! - **Point-buy** attribute economy with racial bonuses
//! - **Class-driven** skill rules (mandatory skills plus a free quota)
//! - **Deterministic** recalculation of every derived field
//!
//! ## Core Concepts
//!
//! ### Build Pipeline
//!
//! A sheet is assembled step by step and recalculated at the end:
//!
//! ```text
//! [StepPatch] → [Gate] → merge → [CharacterSheet] → recalculate → [CompletedSheet]
//! ```
//!
//! 1. **Patches** carry one step's contribution
//! 2. **Gates** decide whether the step may be left
//! 3. **Recalculation** derives hit points, mana, defense, carry slots and
//!    the skill table from the raw fields
//!
//! ### Key Features
//!
//! - **Catalog Lookups**: Races, classes and origins come from a read-only [`Catalog`]
//! - **Setup Transforms**: Selecting a race or class can specialize its descriptor
//! - **Idempotent**: Recalculating a recalculated sheet changes nothing
//! - **Append-Only Storage**: Completed sheets go to a [`SheetStore`]
//!
//! ## Example
//!
//! ```rust
//! use sheetsmith::attribute::{Attribute, AttributeSet};
//! use sheetsmith::catalog::{ClassDescriptor, RaceDescriptor};
//! use sheetsmith::CharacterSheet;
//!
//! let mut sheet = CharacterSheet::blank();
//! sheet.level = 3;
//! sheet.attributes = AttributeSet::from_values([14, 12, 14, 10, 10, 8]);
//! sheet.race = Some(RaceDescriptor::new("Human"));
//! sheet.class = Some(ClassDescriptor::new("Fighter", 20, 5, 3, 3));
//!
//! let sheet = sheet.recalculated().unwrap();
//! assert_eq!(sheet.derived().hit_points, 36); // 20 + 5 * 2 + 2 * 3
//! assert_eq!(sheet.derived().defense, 11);
//! assert_eq!(sheet.modifier(Attribute::Charisma), -1);
//! ```
//!
//! ## Modules
//!
//! - [`attribute`] - Attributes, point-buy and racial bonuses
//! - [`skill`] - The skill list
//! - [`catalog`] - Reference data and setup transforms
//! - [`skill_gate`] - Class skill rules
//! - [`derived`] - Derived-stat formulas
//! - [`sheet`] - The character sheet and its recalculation
//! - [`gate`] - Step gate results
//! - [`wizard`] - The step state machine
//! - [`store`] - Completed-sheet persistence
//! - [`config`] - Rules configuration
//! - [`error`] - Error types

pub mod attribute;
pub mod catalog;
pub mod config;
pub mod derived;
pub mod error;
pub mod gate;
pub mod sheet;
pub mod skill;
pub mod skill_gate;
pub mod store;
pub mod wizard;

// Re-export main types for convenience
pub use config::RulesConfig;
pub use error::{BuildError, CatalogKind};
pub use gate::{Blocked, Gate};
pub use sheet::{recalculate, CharacterSheet, DerivedStats};
pub use wizard::{CompletedSheet, Step, StepPatch, Transition, Wizard};

// Re-export reference data and storage
pub use catalog::{Catalog, StaticCatalog};
pub use store::{JsonLinesStore, MemoryStore, SheetStore, StoredSheet};

// Re-export step patches
pub use wizard::{
    AttributesPatch, ClassPatch, EquipmentPatch, IdentityPatch, OriginPatch, PowersPatch,
    RacePatch, SkillsPatch, SpellsPatch,
};
