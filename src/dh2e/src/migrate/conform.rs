//! Template conformance, the final migration pass.
//!
//! Brings every document up to the current data templates: renames that
//! postdate the structural pass, defaults for fields the templates grew
//! later, and regeneration of derived trait mechanics.

use serde_json::{json, Map, Value};

use crate::document::{fill, rename};
use crate::migrate::CollectionKind;
use crate::rules;

// ============================================================================
// Actor documents
// ============================================================================

/// Conform an actor document and every embedded item it carries.
pub fn conform_actor(doc: &mut Value) -> serde_json::Result<()> {
    if let Some(system) = doc.get_mut("system").and_then(Value::as_object_mut) {
        fill(system, "eliteAdvances", json!([]));
    }
    if let Some(items) = doc.get_mut("items").and_then(Value::as_array_mut) {
        for item in items {
            conform_embedded_item(item)?;
        }
    }
    Ok(())
}

fn conform_embedded_item(item: &mut Value) -> serde_json::Result<()> {
    let kind = item.get("type").and_then(Value::as_str).map(str::to_string);
    let name = item
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    let Some(system) = item.get_mut("system").and_then(Value::as_object_mut) else {
        return Ok(());
    };
    match kind.as_deref() {
        Some("weapon") => conform_weapon(system),
        Some("armour") | Some("gear") => fill(system, "craftsmanship", json!("common")),
        Some("ammunition") => conform_ammunition(system),
        Some("trait") => regenerate_rules(system, &name)?,
        _ => {}
    }
    Ok(())
}

// ============================================================================
// Item documents
// ============================================================================

/// Conform a standalone item document according to its file's kind.
pub fn conform_item(doc: &mut Value, kind: CollectionKind) -> serde_json::Result<()> {
    let name = doc
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    let Some(system) = doc.get_mut("system").and_then(Value::as_object_mut) else {
        return Ok(());
    };
    match kind {
        CollectionKind::Weapon => conform_weapon(system),
        CollectionKind::Armour | CollectionKind::Gear => {
            fill(system, "craftsmanship", json!("common"));
        }
        CollectionKind::Ammunition => conform_ammunition(system),
        CollectionKind::Trait => conform_trait(system, &name)?,
        CollectionKind::Objective => conform_objective(system),
        CollectionKind::Actor => {}
    }
    Ok(())
}

pub fn conform_weapon(system: &mut Map<String, Value>) {
    rename(system, "clip", "magazine");
    fill(system, "magazine", json!({"value": 0, "max": 0}));
    fill(system, "craftsmanship", json!("common"));
    fill(system, "weaponGroup", json!(""));
    fill(system, "loadedAmmoId", json!(""));
    fill(system, "loadedMagazineName", json!(""));
    fill(system, "loadedRounds", json!([]));
    fill(system, "reloadProgress", json!(0));
    fill(system, "rules", json!([]));

    if !system.contains_key("loadType") {
        let class = system.get("class").and_then(Value::as_str).unwrap_or("");
        let max = system
            .get("magazine")
            .and_then(|magazine| magazine.get("max"))
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        let load_type = if matches!(class, "ranged" | "thrown") && max > 0.0 {
            "magazine"
        } else {
            ""
        };
        system.insert("loadType".to_string(), json!(load_type));
    }

    // melee weapons always strike single
    if system.get("class").and_then(Value::as_str) == Some("melee") {
        if let Some(rof) = system.get_mut("rof").and_then(Value::as_object_mut) {
            rof.insert("single".to_string(), json!(true));
        }
    }
}

pub fn conform_ammunition(system: &mut Map<String, Value>) {
    fill(system, "craftsmanship", json!("common"));
    if !system.contains_key("capacity") {
        let capacity = system.get("quantity").cloned().unwrap_or(json!(1));
        system.insert("capacity".to_string(), capacity);
    }
    fill(system, "loadedRounds", json!([]));
    fill(system, "forWeapon", json!(""));
}

pub fn conform_trait(system: &mut Map<String, Value>, name: &str) -> serde_json::Result<()> {
    merge_notes(system);
    fill(system, "rules", json!([]));
    fill(system, "hasRating", json!(false));
    fill(system, "rating", json!(0));
    fill(system, "category", json!(""));
    fill(system, "immunities", json!([]));
    regenerate_rules(system, name)
}

pub fn conform_objective(system: &mut Map<String, Value>) {
    rename(system, "issuer", "assignedBy");
    fill(system, "assignedBy", json!(""));
    merge_notes(system);
    fill(system, "timestamp", json!(0));
    fill(system, "completedTimestamp", json!(0));
    fill(system, "scope", json!("warband"));
}

/// Overwrite `rules` and `immunities` with the table-derived set. Hand
/// edits to either field do not survive regeneration.
fn regenerate_rules(system: &mut Map<String, Value>, name: &str) -> serde_json::Result<()> {
    let derived = rules::derive(name);
    system.insert("rules".to_string(), serde_json::to_value(&derived.rules)?);
    system.insert(
        "immunities".to_string(),
        serde_json::to_value(&derived.immunities)?,
    );
    Ok(())
}

/// Fold a legacy free-text `notes` field into `description`, unless the
/// description already contains it.
fn merge_notes(system: &mut Map<String, Value>) {
    let Some(Value::String(notes)) = system.shift_remove("notes") else {
        return;
    };
    if notes.is_empty() {
        return;
    }
    let description = system
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    if description.contains(&notes) {
        return;
    }
    let merged = if description.is_empty() {
        notes
    } else {
        format!("{description}\n{notes}")
    };
    system.insert("description".to_string(), Value::String(merged));
}
