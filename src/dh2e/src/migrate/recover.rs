//! Narrative recovery, the second migration pass.
//!
//! A past schema overhaul flattened each actor's stat block into one
//! free-text notes field and dropped the structured records. This pass
//! reads the pre-overhaul revision of the same file, rebuilds the notes
//! text under `details`, and re-extracts skills, talents, traits, and
//! psychic powers as embedded item records.

use std::collections::{HashMap, HashSet};

use serde_json::{json, Value};

use crate::build;
use crate::extract;
use crate::id::IdGenerator;
use crate::migrate::structure::rebuild_notes;
use crate::storage::StorageError;

// ============================================================================
// Pre-overhaul snapshots
// ============================================================================

/// Name-indexed documents from the pre-overhaul revision of one file.
pub struct Snapshot {
    by_name: HashMap<String, Value>,
}

impl Snapshot {
    /// Parse the raw bytes of a collection file. Documents without a
    /// name cannot be matched and are dropped; a duplicated name keeps
    /// the last document carrying it.
    pub fn parse(bytes: &[u8], origin: &str) -> Result<Self, StorageError> {
        let value: Value = serde_json::from_slice(bytes)?;
        let Value::Array(docs) = value else {
            return Err(StorageError::NotAnArray(origin.to_string()));
        };
        let mut by_name = HashMap::new();
        for doc in docs {
            if let Some(name) = doc.get("name").and_then(Value::as_str) {
                by_name.insert(name.to_string(), doc);
            }
        }
        Ok(Self { by_name })
    }

    pub fn counterpart(&self, name: &str) -> Option<&Value> {
        self.by_name.get(name)
    }
}

// ============================================================================
// Per-actor recovery
// ============================================================================

/// Outcome of recovery for one actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovery {
    /// Records rebuilt from the pre-overhaul notes, counted by kind.
    Recovered {
        skills: usize,
        talents: usize,
        traits: usize,
        powers: usize,
    },
    /// The snapshot holds no document with this actor's name.
    NoCounterpart,
    /// The counterpart has no notes text to recover from.
    Nothing,
}

impl Recovery {
    pub fn total(&self) -> usize {
        match self {
            Self::Recovered {
                skills,
                talents,
                traits,
                powers,
            } => skills + talents + traits + powers,
            _ => 0,
        }
    }
}

/// Recover one actor from its snapshot counterpart. When extraction
/// yields any records, every existing embedded record of the recovered
/// kinds is replaced by the fresh set; an empty extraction leaves the
/// existing records alone.
pub fn recover_actor(
    doc: &mut Value,
    snapshot: &Snapshot,
    ids: &mut IdGenerator,
) -> serde_json::Result<Recovery> {
    let name = match doc.get("name").and_then(Value::as_str) {
        Some(name) => name.to_string(),
        None => return Ok(Recovery::NoCounterpart),
    };
    let Some(original) = snapshot.counterpart(&name) else {
        return Ok(Recovery::NoCounterpart);
    };

    let original_system = original.get("system").and_then(Value::as_object);
    let notes = original_system
        .and_then(|system| system.get("notes"))
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    if notes.is_empty() {
        return Ok(Recovery::Nothing);
    }

    let rebuilt = original_system.map(rebuild_notes).unwrap_or_default();
    if let Some(system) = doc.get_mut("system").and_then(Value::as_object_mut) {
        let details = system.entry("details").or_insert_with(|| json!({}));
        if let Some(details) = details.as_object_mut() {
            details.insert("notes".to_string(), Value::String(rebuilt));
        }
    }

    let mut records = Vec::new();
    let mut skills = 0;
    let mut talents = 0;
    let mut traits = 0;
    let mut powers = 0;

    for entry in extract::section_entries(&notes, "SKILLS") {
        for record in build::build_skills(&entry, ids) {
            records.push(record.into_value()?);
            skills += 1;
        }
    }

    for entry in extract::section_entries(&notes, "TALENTS") {
        records.push(build::build_talent(&entry, ids).into_value()?);
        talents += 1;
    }

    let trait_entries = extract::section_entries(&notes, "TRAITS");
    let explicit: HashSet<String> = trait_entries
        .iter()
        .map(|entry| base_name(entry).to_string())
        .collect();
    for entry in &trait_entries {
        records.push(build::build_trait(entry, "", ids).into_value()?);
        traits += 1;
    }

    // a TRAITS entry always beats an ability bullet with the same base
    // name; the bullet's description is dropped with it
    for (ability, description) in abilities(&notes) {
        if explicit.contains(base_name(&ability)) {
            continue;
        }
        records.push(build::build_trait(&ability, &description, ids).into_value()?);
        traits += 1;
    }

    for (power, description) in powers_section(&notes) {
        records.push(build::build_power(&power, &description, ids).into_value()?);
        powers += 1;
    }

    if !records.is_empty() {
        replace_derived_records(doc, records);
    }

    Ok(Recovery::Recovered {
        skills,
        talents,
        traits,
        powers,
    })
}

/// Base name used for suppression checks: the text before the first
/// parenthetical qualifier.
fn base_name(entry: &str) -> &str {
    match entry.find('(') {
        Some(open) => entry[..open].trim(),
        None => entry.trim(),
    }
}

fn abilities(notes: &str) -> Vec<(String, String)> {
    named_bullets(extract::section_any(
        notes,
        &["SPECIAL ABILITIES", "SPECIAL RULES"],
    ))
}

fn powers_section(notes: &str) -> Vec<(String, String)> {
    named_bullets(extract::section(notes, "PSYCHIC POWERS"))
}

/// Named bullets of a section, in text order. A repeated name keeps its
/// first position and last description. Dash-less bullets are discarded.
fn named_bullets(section: Option<String>) -> Vec<(String, String)> {
    let Some(section) = section else {
        return Vec::new();
    };
    let mut entries: Vec<(String, String)> = Vec::new();
    for bullet in extract::split_bullets(&section) {
        if let Some((name, description)) = extract::split_name_description(&bullet) {
            match entries.iter_mut().find(|(existing, _)| *existing == name) {
                Some(slot) => slot.1 = description,
                None => entries.push((name, description)),
            }
        }
    }
    entries
}

/// Remove every embedded record of the recovered kinds, then append the
/// fresh set. Items of other kinds keep their positions.
fn replace_derived_records(doc: &mut Value, records: Vec<Value>) {
    let Some(obj) = doc.as_object_mut() else {
        return;
    };
    let items = obj.entry("items").or_insert_with(|| json!([]));
    let Some(items) = items.as_array_mut() else {
        return;
    };
    items.retain(|item| {
        !matches!(
            item.get("type").and_then(Value::as_str),
            Some("skill" | "talent" | "trait" | "power")
        )
    });
    items.extend(records);
}
