//! The closed skill list and its static lookup tables.

use crate::attribute::Attribute;
use serde::{Deserialize, Serialize};

/// A trainable skill.
///
/// Declaration order is the order used by the complete skill table.
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
    strum::EnumString,
    strum::AsRefStr,
)]
pub enum Skill {
    Acrobatics,
    #[strum(to_string = "Animal Handling")]
    AnimalHandling,
    Athletics,
    Performance,
    Riding,
    Knowledge,
    Healing,
    Diplomacy,
    Deception,
    Fortitude,
    Stealth,
    Warfare,
    Initiative,
    Intimidation,
    Insight,
    Investigation,
    Gambling,
    Thievery,
    Fight,
    Mysticism,
    Nobility,
    #[strum(to_string = "Craft (Alchemist)")]
    CraftAlchemist,
    #[strum(to_string = "Craft (Armorer)")]
    CraftArmorer,
    #[strum(to_string = "Craft (Artisan)")]
    CraftArtisan,
    #[strum(to_string = "Craft (Cook)")]
    CraftCook,
    #[strum(to_string = "Craft (Farmer)")]
    CraftFarmer,
    #[strum(to_string = "Craft (Fisher)")]
    CraftFisher,
    #[strum(to_string = "Craft (Miner)")]
    CraftMiner,
    #[strum(to_string = "Craft (Scribe)")]
    CraftScribe,
    #[strum(to_string = "Craft (Tailor)")]
    CraftTailor,
    Perception,
    Piloting,
    Aim,
    Reflexes,
    Religion,
    Survival,
    Will,
}

impl Skill {
    /// The attribute whose modifier the skill adds.
    pub fn governing_attribute(self) -> Attribute {
        use Skill::*;
        match self {
            Athletics | Fight => Attribute::Strength,
            Acrobatics | Riding | Stealth | Initiative | Thievery | Piloting | Aim | Reflexes => {
                Attribute::Dexterity
            }
            Fortitude => Attribute::Constitution,
            Knowledge | Warfare | Investigation | Mysticism | Nobility | CraftAlchemist
            | CraftArmorer | CraftArtisan | CraftCook | CraftFarmer | CraftFisher
            | CraftMiner | CraftScribe | CraftTailor => Attribute::Intelligence,
            Healing | Insight | Perception | Religion | Survival | Will => Attribute::Wisdom,
            AnimalHandling | Performance | Diplomacy | Deception | Intimidation | Gambling => {
                Attribute::Charisma
            }
        }
    }

    /// Whether worn armor penalizes the skill.
    pub fn has_armor_penalty(self) -> bool {
        matches!(self, Skill::Acrobatics | Skill::Stealth | Skill::Thievery)
    }

    /// Specialized skills (the Craft family) only appear on a sheet when trained.
    pub fn is_specialized(self) -> bool {
        use Skill::*;
        matches!(
            self,
            CraftAlchemist
                | CraftArmorer
                | CraftArtisan
                | CraftCook
                | CraftFarmer
                | CraftFisher
                | CraftMiner
                | CraftScribe
                | CraftTailor
        )
    }
}
