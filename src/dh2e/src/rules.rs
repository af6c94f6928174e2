//! Trait rule derivation
//!
//! Creature traits carry their mechanics in `rules` and `immunities`
//! fields read by the game system. Both are derived from the trait's
//! display name by the table in this module, which is the single source
//! of truth: every migration pass regenerates both fields from it, so
//! hand edits to them do not survive. Names the table does not recognize
//! are a modeled case, not an error; they derive one generic roll-option
//! flag from the slug of the name.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::extract::trailing_parenthetical;

// ============================================================================
// Effect descriptors
// ============================================================================

/// Value carried by an effect: a literal number, or a symbolic reference
/// to the owning trait's rating that the game system resolves when it
/// applies the effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectValue {
    Rating,
    Number(i64),
}

impl Serialize for EffectValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Rating => serializer.serialize_str("rating"),
            Self::Number(n) => serializer.serialize_i64(*n),
        }
    }
}

impl<'de> Deserialize<'de> for EffectValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) if s == "rating" => Ok(Self::Rating),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Number)
                .ok_or_else(|| serde::de::Error::custom("effect value out of range")),
            other => Err(serde::de::Error::custom(format!(
                "invalid effect value: {other}"
            ))),
        }
    }
}

/// One mechanical effect, in the `key`-tagged object shape the game
/// system reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "key")]
pub enum RuleEffect {
    RollOption {
        option: String,
    },
    FlatModifier {
        domain: String,
        value: EffectValue,
        #[serde(skip_serializing_if = "Option::is_none")]
        predicate: Option<Vec<String>>,
    },
    AdjustToughness {
        mode: String,
        value: EffectValue,
    },
    Resistance {
        #[serde(rename = "damageType")]
        damage_type: String,
        mode: String,
    },
}

fn roll_option(option: impl Into<String>) -> RuleEffect {
    RuleEffect::RollOption {
        option: option.into(),
    }
}

fn flat_rating(domain: &str) -> RuleEffect {
    RuleEffect::FlatModifier {
        domain: domain.to_string(),
        value: EffectValue::Rating,
        predicate: None,
    }
}

fn adjust_toughness() -> RuleEffect {
    RuleEffect::AdjustToughness {
        mode: "add".to_string(),
        value: EffectValue::Rating,
    }
}

fn resist_half(damage_type: &str) -> RuleEffect {
    RuleEffect::Resistance {
        damage_type: damage_type.to_string(),
        mode: "half".to_string(),
    }
}

// ============================================================================
// Trait identity
// ============================================================================

/// A trait base name resolved against the known-trait table. Campaign
/// custom traits land in `Unrecognized` and keep their raw name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraitIdentity {
    Known(KnownTrait),
    Unrecognized(String),
}

impl TraitIdentity {
    /// Resolve a base name (rating parenthetical already removed).
    pub fn parse(base: &str) -> Self {
        match KnownTrait::parse(base) {
            Some(known) => Self::Known(known),
            None => Self::Unrecognized(base.to_string()),
        }
    }
}

/// Traits with table-defined mechanics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownTrait {
    Fear,
    DarkSight,
    UnnaturalStrength,
    UnnaturalToughness,
    UnnaturalWillpower,
    UnnaturalAgility,
    FromBeyond,
    Regeneration,
    NaturalArmour,
    Daemonic,
    Machine,
    Mindless,
    Fearless,
    StuffOfNightmares,
    Incorporeal,
    BrutalCharge,
    Size,
    LatentPsyker,
    Flyer,
    Toxic,
    Shambling,
    Quadruped,
    Bestial,
    Undying,
    WarpInstability,
    WarpTouched,
    MultipleArms,
    MechanicusImplants,
    Psyker,
    WarpSeer,
    Disturbing,
    WarpAnimated,
}

impl KnownTrait {
    fn parse(base: &str) -> Option<Self> {
        match base {
            "Fear" => Some(Self::Fear),
            "Dark Sight" => Some(Self::DarkSight),
            "Unnatural Strength" => Some(Self::UnnaturalStrength),
            "Unnatural Toughness" => Some(Self::UnnaturalToughness),
            "Unnatural Willpower" => Some(Self::UnnaturalWillpower),
            "Unnatural Agility" => Some(Self::UnnaturalAgility),
            "From Beyond" => Some(Self::FromBeyond),
            "Regeneration" => Some(Self::Regeneration),
            "Natural Armor" | "Natural Armour" => Some(Self::NaturalArmour),
            "Daemonic" => Some(Self::Daemonic),
            "Machine" => Some(Self::Machine),
            "Mindless" => Some(Self::Mindless),
            "Fearless" => Some(Self::Fearless),
            "Stuff of Nightmares" => Some(Self::StuffOfNightmares),
            "Incorporeal" => Some(Self::Incorporeal),
            "Brutal Charge" => Some(Self::BrutalCharge),
            "Size" => Some(Self::Size),
            "Latent Psyker" => Some(Self::LatentPsyker),
            "Flyer" => Some(Self::Flyer),
            "Toxic" => Some(Self::Toxic),
            "Shambling" => Some(Self::Shambling),
            "Quadruped" => Some(Self::Quadruped),
            "Bestial" => Some(Self::Bestial),
            "Undying" => Some(Self::Undying),
            "Warp Instability" => Some(Self::WarpInstability),
            "Warp-Touched" => Some(Self::WarpTouched),
            "Multiple Arms" => Some(Self::MultipleArms),
            "Mechanicus Implants" => Some(Self::MechanicusImplants),
            "Psyker" => Some(Self::Psyker),
            "Warp Seer" => Some(Self::WarpSeer),
            "Disturbing" => Some(Self::Disturbing),
            "Warp-Animated" => Some(Self::WarpAnimated),
            _ => None,
        }
    }

    fn derive(self, qualifier: Option<&str>) -> DerivedRules {
        let (rules, immunities): (Vec<RuleEffect>, &[&str]) = match self {
            Self::Fear => (vec![roll_option("self:fear")], &[]),
            Self::DarkSight => (vec![roll_option("self:dark-sight")], &[]),
            Self::UnnaturalStrength => (vec![flat_rating("damage")], &[]),
            Self::UnnaturalToughness => (vec![adjust_toughness()], &[]),
            Self::UnnaturalWillpower => (vec![flat_rating("characteristic:wp")], &[]),
            Self::UnnaturalAgility => (vec![flat_rating("characteristic:ag")], &[]),
            Self::FromBeyond => (
                vec![roll_option("self:from-beyond")],
                &["Fear", "Pinning", "Insanity"],
            ),
            Self::Regeneration => (vec![roll_option("self:regeneration")], &[]),
            Self::NaturalArmour => (vec![flat_rating("armour")], &[]),
            Self::Daemonic => (
                vec![adjust_toughness(), roll_option("self:daemonic")],
                &["Fear", "Pinning", "Disease", "Poison"],
            ),
            Self::Machine => (
                vec![flat_rating("armour"), roll_option("self:machine")],
                &["Fear", "Pinning", "Disease", "Poison"],
            ),
            Self::Mindless => (
                vec![roll_option("self:mindless")],
                &["Fear", "Pinning", "psychic-mind"],
            ),
            Self::Fearless => (vec![roll_option("self:fearless")], &["Fear"]),
            Self::StuffOfNightmares => (
                vec![roll_option("self:stuff-of-nightmares")],
                &["critical", "bleeding", "stun"],
            ),
            Self::Incorporeal => (
                vec![
                    resist_half("impact"),
                    resist_half("rending"),
                    resist_half("explosive"),
                    roll_option("self:incorporeal"),
                ],
                &[],
            ),
            Self::BrutalCharge => (
                vec![RuleEffect::FlatModifier {
                    domain: "damage".to_string(),
                    value: EffectValue::Rating,
                    predicate: Some(vec!["action:charge".to_string()]),
                }],
                &[],
            ),
            Self::Size => {
                let category = qualifier
                    .map(slugify)
                    .unwrap_or_else(|| "average".to_string());
                (vec![roll_option(format!("self:size:{category}"))], &[])
            }
            Self::LatentPsyker => (
                vec![
                    RuleEffect::FlatModifier {
                        domain: "initiative".to_string(),
                        value: EffectValue::Number(10),
                        predicate: None,
                    },
                    roll_option("self:latent-psyker"),
                ],
                &[],
            ),
            Self::Flyer => (vec![roll_option("self:flyer")], &[]),
            Self::Toxic => (vec![roll_option("self:toxic")], &[]),
            Self::Shambling => (vec![roll_option("self:shambling")], &[]),
            Self::Quadruped => (vec![roll_option("self:quadruped")], &[]),
            Self::Bestial => (vec![roll_option("self:bestial")], &[]),
            Self::Undying => (vec![roll_option("self:undying")], &[]),
            Self::WarpInstability => (vec![roll_option("self:warp-instability")], &[]),
            Self::WarpTouched => (vec![roll_option("self:warp-touched")], &[]),
            Self::MultipleArms => (vec![roll_option("self:multiple-arms")], &[]),
            Self::MechanicusImplants => (vec![roll_option("self:mechanicus-implants")], &[]),
            Self::Psyker => (vec![roll_option("self:psyker")], &[]),
            Self::WarpSeer => (vec![roll_option("self:warp-seer")], &[]),
            Self::Disturbing => (vec![roll_option("self:disturbing")], &[]),
            Self::WarpAnimated => (vec![roll_option("self:warp-animated")], &[]),
        };
        DerivedRules {
            rules,
            immunities: immunities.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

// ============================================================================
// Derivation
// ============================================================================

/// Rules and immunities derived for one trait.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DerivedRules {
    pub rules: Vec<RuleEffect>,
    pub immunities: Vec<String>,
}

/// Derive rules and immunities from a trait's full display name, e.g.
/// "Fear (4)", "Unnatural Strength (x2)", "Size (Hulking)".
pub fn derive(name: &str) -> DerivedRules {
    let (base, qualifier) = match trailing_parenthetical(name) {
        Some((base, inner)) => (base, Some(inner)),
        None => (name.trim(), None),
    };
    match TraitIdentity::parse(base) {
        TraitIdentity::Known(known) => known.derive(qualifier),
        TraitIdentity::Unrecognized(raw) => DerivedRules {
            rules: vec![roll_option(format!("self:{}", slugify(&raw)))],
            immunities: Vec::new(),
        },
    }
}

/// Lower-case a name and replace every run of characters outside
/// `[a-z0-9]` with a single `-`, trimming separators at the ends:
/// "Stuff of Nightmares" becomes "stuff-of-nightmares".
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut separate = false;
    for c in name.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if separate && !slug.is_empty() {
                slug.push('-');
            }
            separate = false;
            slug.push(c);
        } else {
            separate = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Fear"), "fear");
        assert_eq!(slugify("Stuff of Nightmares"), "stuff-of-nightmares");
        assert_eq!(slugify("Warp-Touched"), "warp-touched");
        assert_eq!(slugify("  Void!! Spawn 3 "), "void-spawn-3");
        assert_eq!(slugify("((("), "");
    }

    #[test]
    fn test_identity_parse() {
        assert_eq!(
            TraitIdentity::parse("Fear"),
            TraitIdentity::Known(KnownTrait::Fear)
        );
        assert_eq!(
            TraitIdentity::parse("Natural Armor"),
            TraitIdentity::Known(KnownTrait::NaturalArmour)
        );
        assert_eq!(
            TraitIdentity::parse("Barovus Native"),
            TraitIdentity::Unrecognized("Barovus Native".to_string())
        );
    }

    #[test]
    fn test_fear_derives_roll_option() {
        let derived = derive("Fear (4)");
        assert_eq!(derived.rules, vec![roll_option("self:fear")]);
        assert!(derived.immunities.is_empty());
    }

    #[test]
    fn test_rating_stays_symbolic() {
        let derived = derive("Unnatural Strength (x2)");
        assert_eq!(derived.rules, vec![flat_rating("damage")]);
        let json = serde_json::to_string(&derived.rules[0]).unwrap();
        assert_eq!(
            json,
            "{\"key\":\"FlatModifier\",\"domain\":\"damage\",\"value\":\"rating\"}"
        );
    }

    #[test]
    fn test_immunity_grants() {
        assert_eq!(
            derive("From Beyond").immunities,
            vec!["Fear", "Pinning", "Insanity"]
        );
        assert_eq!(
            derive("Daemonic (2)").immunities,
            vec!["Fear", "Pinning", "Disease", "Poison"]
        );
        assert_eq!(
            derive("Stuff of Nightmares").immunities,
            vec!["critical", "bleeding", "stun"]
        );
        assert_eq!(
            derive("Mindless").immunities,
            vec!["Fear", "Pinning", "psychic-mind"]
        );
    }

    #[test]
    fn test_daemonic_rule_order() {
        let derived = derive("Daemonic (2)");
        assert_eq!(
            derived.rules,
            vec![adjust_toughness(), roll_option("self:daemonic")]
        );
    }

    #[test]
    fn test_incorporeal_resistances() {
        let derived = derive("Incorporeal");
        assert_eq!(
            derived.rules,
            vec![
                resist_half("impact"),
                resist_half("rending"),
                resist_half("explosive"),
                roll_option("self:incorporeal"),
            ]
        );
        let json = serde_json::to_string(&derived.rules[0]).unwrap();
        assert_eq!(
            json,
            "{\"key\":\"Resistance\",\"damageType\":\"impact\",\"mode\":\"half\"}"
        );
    }

    #[test]
    fn test_brutal_charge_predicate() {
        let json = serde_json::to_string(&derive("Brutal Charge (3)").rules[0]).unwrap();
        assert_eq!(
            json,
            "{\"key\":\"FlatModifier\",\"domain\":\"damage\",\"value\":\"rating\",\
             \"predicate\":[\"action:charge\"]}"
        );
    }

    #[test]
    fn test_size_uses_qualifier_slug() {
        assert_eq!(
            derive("Size (Hulking)").rules,
            vec![roll_option("self:size:hulking")]
        );
        assert_eq!(derive("Size").rules, vec![roll_option("self:size:average")]);
    }

    #[test]
    fn test_latent_psyker_literal_value() {
        let derived = derive("Latent Psyker");
        assert_eq!(derived.rules.len(), 2);
        let json = serde_json::to_string(&derived.rules[0]).unwrap();
        assert_eq!(
            json,
            "{\"key\":\"FlatModifier\",\"domain\":\"initiative\",\"value\":10}"
        );
    }

    #[test]
    fn test_unrecognized_name_gets_slug_flag() {
        let derived = derive("Void-Spawned Horror (7)");
        assert_eq!(
            derived.rules,
            vec![roll_option("self:void-spawned-horror")]
        );
        assert!(derived.immunities.is_empty());
    }

    #[test]
    fn test_effect_value_roundtrip() {
        assert_eq!(
            serde_json::from_value::<EffectValue>(Value::String("rating".into())).unwrap(),
            EffectValue::Rating
        );
        assert_eq!(
            serde_json::from_value::<EffectValue>(serde_json::json!(10)).unwrap(),
            EffectValue::Number(10)
        );
        assert!(serde_json::from_value::<EffectValue>(Value::String("other".into())).is_err());
    }
}
