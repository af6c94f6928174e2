//! Per-kind entry parsers
//!
//! Turn single narrative entries ("Command +20", "Fear (4)") into typed
//! records. Parsing never fails: an entry that matches no recognized
//! grammar still yields a minimal record with conservative defaults, so
//! no entry is ever dropped.

use crate::extract::trailing_parenthetical;
use crate::id::IdGenerator;
use crate::records::{
    PowerData, Record, RecordKind, SkillData, Sustained, TalentData, TraitData,
};
use crate::reference;

/// Parse one SKILLS entry. A trailing `+N` becomes advancement tier N/10.
/// A trailing parenthetical is the specialization; several comma-separated
/// specializations fan out into one record each ("Common Lore (Imperial,
/// Ecclesiarchy)" yields two records). Always yields at least one record.
pub fn build_skills(entry: &str, ids: &mut IdGenerator) -> Vec<Record<SkillData>> {
    let entry = entry.trim().trim_end_matches('.');
    let (name, advancement) = split_advancement(entry);

    let skill = |ids: &mut IdGenerator, name: String, base: &str, spec: Option<&str>| {
        Record::new(
            ids.next_id(),
            name,
            RecordKind::Skill,
            SkillData {
                description: String::new(),
                linked_characteristic: reference::skill_characteristic(base).unwrap_or_default(),
                advancement,
                is_specialist: spec.is_some(),
                specialization: spec.unwrap_or("").to_string(),
            },
        )
    };

    match trailing_parenthetical(name) {
        Some((base, qualifier)) if qualifier.contains(',') => qualifier
            .split(',')
            .map(|spec| {
                let spec = spec.trim();
                skill(ids, format!("{base} ({spec})"), base, Some(spec))
            })
            .collect(),
        Some((base, qualifier)) => {
            vec![skill(ids, name.to_string(), base, Some(qualifier))]
        }
        None => vec![skill(ids, name.to_string(), name, None)],
    }
}

/// Parse one TALENTS entry. A trailing parenthetical marks the talent
/// specialist; the stored name keeps the qualifier.
pub fn build_talent(entry: &str, ids: &mut IdGenerator) -> Record<TalentData> {
    let name = entry.trim().trim_end_matches('.');
    let specialist = trailing_parenthetical(name).is_some();
    Record::new(
        ids.next_id(),
        name.to_string(),
        RecordKind::Talent,
        TalentData {
            description: String::new(),
            tier: 1,
            aptitudes: Vec::new(),
            prerequisites: String::new(),
            specialist,
        },
    )
}

/// Parse one TRAITS entry or special-ability name. Rating comes from the
/// trailing parenthetical: a bare integer ("Fear (4)"), a multiplier
/// ("Unnatural Strength (x2)"), or the first integer embedded in any
/// other qualifier; a qualifier without digits ("Size (Hulking)") leaves
/// the trait unrated. The stored name keeps the qualifier.
pub fn build_trait(entry: &str, description: &str, ids: &mut IdGenerator) -> Record<TraitData> {
    let name = entry.trim().trim_end_matches('.');
    let (base, rating) = match trailing_parenthetical(name) {
        Some((base, inner)) => (base, rating_in_group(inner)),
        None => (name, None),
    };
    let category = reference::trait_category(base)
        .map(|c| c.as_str().to_string())
        .unwrap_or_default();
    Record::new(
        ids.next_id(),
        name.to_string(),
        RecordKind::Trait,
        TraitData {
            description: description.to_string(),
            rules: Vec::new(),
            has_rating: rating.is_some(),
            rating: rating.unwrap_or(0),
            category,
            immunities: Vec::new(),
        },
    )
}

/// Build a psychic power record, inferring discipline from the power name
/// and action, sustain, and range from the description text.
pub fn build_power(name: &str, description: &str, ids: &mut IdGenerator) -> Record<PowerData> {
    let lower = description.to_lowercase();
    let action = if description.contains("Full Action") {
        "Full Action"
    } else {
        "Half Action"
    };
    let sustained = if lower.contains("sustained") {
        Sustained::HalfAction
    } else {
        Sustained::No
    };
    let range = infer_range(description, &lower);
    Record::new(
        ids.next_id(),
        name.to_string(),
        RecordKind::Power,
        PowerData {
            description: description.to_string(),
            discipline: reference::power_discipline(name).unwrap_or("").to_string(),
            cost: 200,
            prerequisites: String::new(),
            focus_test: "wp".to_string(),
            focus_modifier: 0,
            range,
            sustained,
            action: action.to_string(),
            subtype: String::new(),
            opposed: false,
        },
    )
}

/// Split a trailing `+N` advancement suffix off a skill entry:
/// `"Command +20"` becomes `("Command", 2)`. Entries without the suffix
/// sit at tier 0.
fn split_advancement(entry: &str) -> (&str, u32) {
    let trimmed = entry.trim_end();
    let digits = trimmed
        .bytes()
        .rev()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return (trimmed, 0);
    }
    let split = trimmed.len() - digits;
    match trimmed[..split].strip_suffix('+') {
        Some(prefix) => {
            let bonus: u32 = trimmed[split..].parse().unwrap_or(0);
            (prefix.trim_end(), bonus / 10)
        }
        None => (trimmed, 0),
    }
}

/// Rating inside a trailing qualifier group, per the precedence above.
fn rating_in_group(inner: &str) -> Option<u32> {
    if !inner.is_empty() && inner.bytes().all(|b| b.is_ascii_digit()) {
        return inner.parse().ok();
    }
    if let Some(digits) = inner.strip_prefix('x') {
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            return digits.parse().ok();
        }
    }
    embedded_integer(inner)
}

/// Leftmost run of ASCII digits, if any.
fn embedded_integer(s: &str) -> Option<u32> {
    let bytes = s.as_bytes();
    let start = bytes.iter().position(|b| b.is_ascii_digit())?;
    let len = bytes[start..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    s[start..start + len].parse().ok()
}

/// First numeric distance token in a power description: "30m", extended
/// to "30m cone" / "30m radius" when the qualifier follows. Falls back to
/// "Touch" when the description mentions touch, else empty.
fn infer_range(description: &str, lower: &str) -> String {
    let bytes = description.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i < bytes.len() && bytes[i] == b'm' {
                let distance = &description[start..=i];
                let rest = description[i + 1..].trim_start();
                for qualifier in ["cone", "radius"] {
                    if rest.starts_with(qualifier) {
                        return format!("{distance} {qualifier}");
                    }
                }
                return distance.to_string();
            }
        } else {
            i += 1;
        }
    }
    if lower.contains("touch") {
        return "Touch".to_string();
    }
    String::new()
}
