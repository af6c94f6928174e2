//! Reference data for Dark Heresy 2E game concepts
//!
//! Hardcoded lookup tables tying skill names to characteristics, trait
//! names to categories, and psychic power names to disciplines. Names not
//! present in a table fall back to a conservative default at the call
//! site instead of failing.

use phf::phf_map;
use serde::{Deserialize, Serialize};

// ============================================================================
// Characteristics
// ============================================================================

/// The nine DH2E characteristics, serialized as their short codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Characteristic {
    #[serde(rename = "ws")]
    WeaponSkill,
    #[serde(rename = "bs")]
    BallisticSkill,
    #[serde(rename = "s")]
    Strength,
    #[serde(rename = "t")]
    Toughness,
    #[serde(rename = "ag")]
    Agility,
    #[serde(rename = "int")]
    Intelligence,
    #[serde(rename = "per")]
    Perception,
    #[serde(rename = "wp")]
    Willpower,
    #[serde(rename = "fel")]
    Fellowship,
}

impl Characteristic {
    /// Short code used as a key in actor data.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WeaponSkill => "ws",
            Self::BallisticSkill => "bs",
            Self::Strength => "s",
            Self::Toughness => "t",
            Self::Agility => "ag",
            Self::Intelligence => "int",
            Self::Perception => "per",
            Self::Willpower => "wp",
            Self::Fellowship => "fel",
        }
    }
}

impl Default for Characteristic {
    fn default() -> Self {
        Self::Intelligence
    }
}

impl std::fmt::Display for Characteristic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Skills
// ============================================================================

/// Characteristic linked to each core skill, keyed by base skill name.
static SKILL_CHARACTERISTICS: phf::Map<&'static str, Characteristic> = phf_map! {
    "Acrobatics" => Characteristic::Agility,
    "Athletics" => Characteristic::Strength,
    "Awareness" => Characteristic::Perception,
    "Charm" => Characteristic::Fellowship,
    "Command" => Characteristic::Fellowship,
    "Commerce" => Characteristic::Intelligence,
    "Common Lore" => Characteristic::Intelligence,
    "Deceive" => Characteristic::Fellowship,
    "Dodge" => Characteristic::Agility,
    "Forbidden Lore" => Characteristic::Intelligence,
    "Inquiry" => Characteristic::Fellowship,
    "Interrogation" => Characteristic::Willpower,
    "Intimidate" => Characteristic::Strength,
    "Linguistics" => Characteristic::Intelligence,
    "Logic" => Characteristic::Intelligence,
    "Medicae" => Characteristic::Intelligence,
    "Navigate" => Characteristic::Intelligence,
    "Operate" => Characteristic::Agility,
    "Parry" => Characteristic::WeaponSkill,
    "Psyniscience" => Characteristic::Perception,
    "Scholastic Lore" => Characteristic::Intelligence,
    "Scrutiny" => Characteristic::Perception,
    "Security" => Characteristic::Intelligence,
    "Sleight of Hand" => Characteristic::Agility,
    "Stealth" => Characteristic::Agility,
    "Survival" => Characteristic::Perception,
    "Tech-Use" => Characteristic::Intelligence,
    "Trade" => Characteristic::Intelligence,
};

/// Get the linked characteristic for a base skill name.
pub fn skill_characteristic(name: &str) -> Option<Characteristic> {
    SKILL_CHARACTERISTICS.get(name).copied()
}

// ============================================================================
// Trait categories
// ============================================================================

/// Broad category a creature trait belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraitCategory {
    Mental,
    Physical,
    Warp,
    Movement,
}

impl TraitCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mental => "mental",
            Self::Physical => "physical",
            Self::Warp => "warp",
            Self::Movement => "movement",
        }
    }
}

impl std::fmt::Display for TraitCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Category for each known creature trait, keyed by base trait name.
static TRAIT_CATEGORIES: phf::Map<&'static str, TraitCategory> = phf_map! {
    "Fear" => TraitCategory::Mental,
    "Dark Sight" => TraitCategory::Physical,
    "Unnatural Strength" => TraitCategory::Physical,
    "Unnatural Toughness" => TraitCategory::Physical,
    "Unnatural Willpower" => TraitCategory::Mental,
    "Unnatural Agility" => TraitCategory::Physical,
    "From Beyond" => TraitCategory::Warp,
    "Warp-Touched" => TraitCategory::Warp,
    "Warp Instability" => TraitCategory::Warp,
    "Regeneration" => TraitCategory::Physical,
    "Machine" => TraitCategory::Physical,
    "Size" => TraitCategory::Physical,
    "Flyer" => TraitCategory::Movement,
    "Bestial" => TraitCategory::Mental,
    "Quadruped" => TraitCategory::Movement,
    "Daemonic" => TraitCategory::Warp,
    "Fearless" => TraitCategory::Mental,
    "Mindless" => TraitCategory::Mental,
    "Shambling" => TraitCategory::Movement,
    "Undying" => TraitCategory::Warp,
    "Natural Armor" => TraitCategory::Physical,
    "Natural Armour" => TraitCategory::Physical,
    "Psyker" => TraitCategory::Warp,
    "Warp Seer" => TraitCategory::Warp,
    "Mechanicus Implants" => TraitCategory::Physical,
    "Multiple Arms" => TraitCategory::Physical,
    "Latent Psyker" => TraitCategory::Warp,
    "Barovus Native" => TraitCategory::Physical,
    "Disturbing" => TraitCategory::Mental,
    "Warp-Animated" => TraitCategory::Warp,
};

/// Get the category for a base trait name.
pub fn trait_category(name: &str) -> Option<TraitCategory> {
    TRAIT_CATEGORIES.get(name).copied()
}

// ============================================================================
// Psychic disciplines
// ============================================================================

/// Discipline each known psychic power belongs to, keyed by power name.
static POWER_DISCIPLINES: phf::Map<&'static str, &'static str> = phf_map! {
    "Warp Fire" => "Pyromancy",
    "Telekinesis" => "Telekinesis",
    "Telekinetic Control" => "Telekinesis",
    "Telekinetic Storm" => "Telekinesis",
    "Domination" => "Telepathy",
    "Psychic Shriek" => "Telepathy",
    "Psychic Scream" => "Telepathy",
    "Flesh Warp" => "Biomancy",
    "Iron Arm" => "Biomancy",
    "Warp Storm" => "Warp",
    "Warp Lightning" => "Warp",
    "True Divination" => "Divination",
};

/// Get the discipline for a psychic power name.
pub fn power_discipline(name: &str) -> Option<&'static str> {
    POWER_DISCIPLINES.get(name).copied()
}
