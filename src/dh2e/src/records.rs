//! Embedded item records created during migration.
//!
//! Actors embed their mechanics as typed item records. These are the
//! shapes this tool writes for the four kinds it derives from narrative
//! text; equipment kinds (weapon, armour, gear, ammunition) are migrated
//! in place as documents and never constructed from scratch.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::reference::Characteristic;
use crate::rules::RuleEffect;

/// Record kinds derived from narrative text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Skill,
    Talent,
    Trait,
    Power,
}

impl RecordKind {
    /// The `type` value stored on the record.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skill => "skill",
            Self::Talent => "talent",
            Self::Trait => "trait",
            Self::Power => "power",
        }
    }

    /// Game-system icon assigned to records created during migration.
    pub fn img(&self) -> &'static str {
        match self {
            Self::Skill => "systems/dh2e/icons/items/skill.svg",
            Self::Talent => "systems/dh2e/icons/items/talent.svg",
            Self::Trait => "systems/dh2e/icons/default-icons/trait.svg",
            Self::Power => "systems/dh2e/icons/items/power.svg",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Common envelope shared by all embedded item records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record<T> {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub img: String,
    pub system: T,
}

impl<T> Record<T> {
    pub fn new(id: String, name: String, kind: RecordKind, system: T) -> Self {
        Self {
            id,
            name,
            kind,
            img: kind.img().to_string(),
            system,
        }
    }
}

impl<T: Serialize> Record<T> {
    /// Serialize for embedding in an actor's items array.
    pub fn into_value(self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// System fields of a skill record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillData {
    pub description: String,
    pub linked_characteristic: Characteristic,
    pub advancement: u32,
    pub is_specialist: bool,
    pub specialization: String,
}

/// System fields of a talent record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TalentData {
    pub description: String,
    pub tier: u32,
    pub aptitudes: Vec<String>,
    pub prerequisites: String,
    pub specialist: bool,
}

/// System fields of a trait record. `rules` and `immunities` start empty
/// and are filled by the rule derivation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitData {
    pub description: String,
    pub rules: Vec<RuleEffect>,
    pub has_rating: bool,
    pub rating: u32,
    pub category: String,
    pub immunities: Vec<String>,
}

/// System fields of a psychic power record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerData {
    pub description: String,
    pub discipline: String,
    pub cost: u32,
    pub prerequisites: String,
    pub focus_test: String,
    pub focus_modifier: i64,
    pub range: String,
    pub sustained: Sustained,
    pub action: String,
    pub subtype: String,
    pub opposed: bool,
}

/// Whether a power can be kept active. The game system stores this as the
/// sustaining action label ("Half Action") when sustainable and as JSON
/// `false` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sustained {
    HalfAction,
    No,
}

impl Serialize for Sustained {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::HalfAction => serializer.serialize_str("Half Action"),
            Self::No => serializer.serialize_bool(false),
        }
    }
}

impl<'de> Deserialize<'de> for Sustained {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Bool(false) => Ok(Self::No),
            Value::String(s) if s == "Half Action" => Ok(Self::HalfAction),
            other => Err(serde::de::Error::custom(format!(
                "invalid sustained value: {other}"
            ))),
        }
    }
}
