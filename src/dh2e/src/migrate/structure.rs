//! Structural normalization, the first migration pass.
//!
//! Documents written under older dataset revisions carry flat or
//! shorthand field shapes. Every transform here detects the current
//! shape first and leaves it untouched, so the pass runs safely over
//! mixed-revision files and over data it has already migrated.

use serde_json::{json, Map, Value};

use crate::document::{fill, rename, render, truthy};
use crate::migrate::CollectionKind;

const HIT_LOCATIONS: [&str; 6] = [
    "head", "rightArm", "leftArm", "body", "rightLeg", "leftLeg",
];

// ============================================================================
// Actor documents
// ============================================================================

/// Normalize an actor document and every embedded item it carries.
pub fn normalize_actor(doc: &mut Value) {
    let derived_armour = armour_from_items(doc);

    if let Some(system) = doc.get_mut("system").and_then(Value::as_object_mut) {
        normalize_characteristics(system);
        normalize_armour_block(system, derived_armour);
        fill_npc_template(system);
        build_details(system);
    }

    if let Some(items) = doc.get_mut("items").and_then(Value::as_array_mut) {
        for item in items {
            normalize_embedded_item(item);
        }
    }
}

fn normalize_embedded_item(item: &mut Value) {
    let kind = item.get("type").and_then(Value::as_str).map(str::to_string);
    let Some(system) = item.get_mut("system").and_then(Value::as_object_mut) else {
        return;
    };
    match kind.as_deref() {
        Some("weapon") => normalize_weapon(system),
        Some("armour") => normalize_armour(system),
        Some("gear") => normalize_gear(system),
        Some("ammunition") => normalize_ammunition(system),
        _ => {}
    }
}

fn normalize_characteristics(system: &mut Map<String, Value>) {
    let Some(characteristics) = system
        .get_mut("characteristics")
        .and_then(Value::as_object_mut)
    else {
        return;
    };
    for (_, entry) in characteristics.iter_mut() {
        let base = match entry {
            Value::Object(fields) => {
                if fields.contains_key("base") {
                    continue;
                }
                fields.get("value").cloned().unwrap_or(json!(25))
            }
            ref other => (**other).clone(),
        };
        *entry = json!({"base": base, "advances": 0});
    }
}

/// Per-location armour block taken from the first embedded armour item,
/// whichever shape its location map is currently in.
fn armour_from_items(doc: &Value) -> Option<Value> {
    let items = doc.get("items")?.as_array()?;
    let armour = items
        .iter()
        .find(|item| item.get("type").and_then(Value::as_str) == Some("armour"))?;
    let system = armour.get("system")?.as_object()?;
    let locations = system
        .get("locations")
        .or_else(|| system.get("ap"))?
        .as_object()?;
    let mut block = Map::new();
    for loc in HIT_LOCATIONS {
        block.insert(loc.to_string(), locations.get(loc).cloned().unwrap_or(json!(0)));
    }
    Some(Value::Object(block))
}

fn normalize_armour_block(system: &mut Map<String, Value>, derived: Option<Value>) {
    if let Some(armour) = system.get("armour").and_then(Value::as_object) {
        if armour.contains_key("head") {
            return;
        }
    }
    let block = derived.unwrap_or_else(|| {
        let flat = system
            .get("armour")
            .and_then(Value::as_object)
            .and_then(|armour| armour.get("value"))
            .cloned()
            .unwrap_or(json!(0));
        let mut block = Map::new();
        for loc in HIT_LOCATIONS {
            block.insert(loc.to_string(), flat.clone());
        }
        Value::Object(block)
    });
    system.insert("armour".to_string(), block);
}

fn fill_npc_template(system: &mut Map<String, Value>) {
    fill(system, "fate", json!({"value": 0, "max": 0}));
    fill(system, "fatigue", json!(0));
    fill(system, "corruption", json!(0));
    fill(system, "insanity", json!(0));
    fill(system, "influence", json!(0));
    fill(system, "xp", json!({"total": 0, "spent": 0}));
    fill(system, "aptitudes", json!([]));
    fill(system, "defeated", json!(false));
}

fn build_details(system: &mut Map<String, Value>) {
    if system.contains_key("details") {
        return;
    }
    let role = system.get("threatRating").cloned().unwrap_or(json!(""));
    let notes = rebuild_notes(system);
    system.insert(
        "details".to_string(),
        json!({
            "homeworld": "",
            "background": "",
            "role": role,
            "divination": "",
            "notes": notes,
        }),
    );
    system.shift_remove("notes");
    system.shift_remove("threatRating");
    system.shift_remove("movement");
}

/// Rebuild the free-text notes block from legacy top-level fields. The
/// threat rating and movement profile were separate fields once; they
/// live on as labeled lines inside the notes text.
pub fn rebuild_notes(system: &Map<String, Value>) -> String {
    let mut parts = Vec::new();
    if let Some(description) = system.get("description") {
        if truthy(description) {
            parts.push(render(description));
        }
    }
    if let Some(threat) = system.get("threatRating") {
        if truthy(threat) {
            parts.push(format!("\nTHREAT RATING: {}", render(threat)));
        }
    }
    if let Some(movement) = system.get("movement") {
        if truthy(movement) {
            parts.push(format!(
                "\nMOVEMENT: Half {}, Full {}, Charge {}, Run {}",
                movement_part(movement, "half"),
                movement_part(movement, "full"),
                movement_part(movement, "charge"),
                movement_part(movement, "run"),
            ));
        }
    }
    if let Some(notes) = system.get("notes") {
        if truthy(notes) {
            parts.push(format!("\n{}", render(notes)));
        }
    }
    parts.join("\n")
}

fn movement_part(movement: &Value, key: &str) -> String {
    movement
        .get(key)
        .map(render)
        .unwrap_or_else(|| "0".to_string())
}

// ============================================================================
// Item shapes, embedded or standalone
// ============================================================================

/// Normalize a standalone item document according to its file's kind.
pub fn normalize_item(doc: &mut Value, kind: CollectionKind) {
    let Some(system) = doc.get_mut("system").and_then(Value::as_object_mut) else {
        return;
    };
    match kind {
        CollectionKind::Weapon => normalize_weapon(system),
        CollectionKind::Armour => normalize_armour(system),
        CollectionKind::Gear => normalize_gear(system),
        CollectionKind::Ammunition => normalize_ammunition(system),
        CollectionKind::Trait | CollectionKind::Objective | CollectionKind::Actor => {}
    }
}

pub fn normalize_weapon(system: &mut Map<String, Value>) {
    let class = system
        .get("class")
        .and_then(Value::as_str)
        .map(|class| match class {
            "Melee" => "melee".to_string(),
            "Pistol" | "Basic" | "Heavy" => "ranged".to_string(),
            "Thrown" => "thrown".to_string(),
            other => other.to_lowercase(),
        });
    if let Some(class) = class {
        system.insert("class".to_string(), Value::String(class));
    }

    if !system.contains_key("rof") {
        let rof = match system.shift_remove("rateOfFire") {
            Some(Value::String(raw)) => parse_rate_of_fire(&raw),
            Some(_) => json!({"single": true, "semi": 0, "full": 0}),
            None => json!({"single": false, "semi": 0, "full": 0}),
        };
        system.insert("rof".to_string(), rof);
    }

    let formula = match system.get("damage") {
        Some(Value::String(formula)) => Some(formula.clone()),
        Some(_) => None,
        None => Some("1d10".to_string()),
    };
    if let Some(formula) = formula {
        let kind = match system.shift_remove("damageType") {
            Some(Value::String(code)) => damage_type_name(&code),
            _ => "impact".to_string(),
        };
        system.insert(
            "damage".to_string(),
            json!({"formula": formula, "type": kind, "bonus": 0}),
        );
    }

    // conformance renames clip to magazine; a document already in the
    // final shape must not grow a second clip
    if !system.contains_key("magazine") {
        let clip = match system.get("clip") {
            Some(Value::Number(n)) => Some(json!({"value": n.clone(), "max": n.clone()})),
            None => Some(json!({"value": 0, "max": 0})),
            Some(_) => None,
        };
        if let Some(clip) = clip {
            system.insert("clip".to_string(), clip);
        }
    }

    if !system.contains_key("qualities") {
        let qualities: Vec<String> = match system.shift_remove("special") {
            Some(Value::String(special)) => special
                .split(',')
                .map(str::trim)
                .filter(|quality| !quality.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };
        system.insert("qualities".to_string(), json!(qualities));
    }

    fill(system, "description", json!(""));
    fill(system, "range", json!(0));
    fill(system, "penetration", json!(0));
    fill(system, "reload", json!(""));
    fill(system, "weight", json!(0));
    fill(system, "equipped", json!(true));
}

/// Parse a legacy rate-of-fire string such as "S/2/-" or "-/3/6".
/// Anything that does not split into three parts means the weapon can
/// at least fire single shots.
fn parse_rate_of_fire(raw: &str) -> Value {
    let parts: Vec<&str> = raw.split('/').collect();
    if parts.len() != 3 {
        return json!({"single": true, "semi": 0, "full": 0});
    }
    json!({
        "single": parts[0].trim().eq_ignore_ascii_case("s"),
        "semi": parts[1].trim().parse::<u64>().unwrap_or(0),
        "full": parts[2].trim().parse::<u64>().unwrap_or(0),
    })
}

fn damage_type_name(code: &str) -> String {
    match code {
        "E" => "energy".to_string(),
        "R" => "rending".to_string(),
        "I" => "impact".to_string(),
        "X" => "explosive".to_string(),
        "" => "impact".to_string(),
        other => other.to_lowercase(),
    }
}

pub fn normalize_armour(system: &mut Map<String, Value>) {
    rename(system, "ap", "locations");
    match system.get_mut("locations").and_then(Value::as_object_mut) {
        Some(locations) => {
            for loc in HIT_LOCATIONS {
                fill(locations, loc, json!(0));
            }
        }
        None => {
            let mut block = Map::new();
            for loc in HIT_LOCATIONS {
                block.insert(loc.to_string(), json!(0));
            }
            system.insert("locations".to_string(), Value::Object(block));
        }
    }

    fill(system, "description", json!(""));
    fill(system, "maxAgility", json!(0));
    fill(system, "qualities", json!([]));
    fill(system, "weight", json!(0));
    fill(system, "equipped", json!(true));
}

pub fn normalize_gear(system: &mut Map<String, Value>) {
    fill(system, "description", json!(""));
    fill(system, "weight", json!(0));
    fill(system, "quantity", json!(1));
}

pub fn normalize_ammunition(system: &mut Map<String, Value>) {
    rename(system, "weaponType", "weaponGroup");
    fill(system, "description", json!(""));
    fill(system, "damageModifier", json!(0));
    fill(system, "damageType", json!(""));
    fill(system, "penetrationModifier", json!(0));
    fill(system, "qualities", json!([]));
    fill(system, "quantity", json!(1));
    fill(system, "weight", json!(0));
    fill(system, "weaponGroup", json!(""));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system_of(doc: &Value) -> &Map<String, Value> {
        doc.get("system").unwrap().as_object().unwrap()
    }

    fn as_map(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_characteristics_value_shape() {
        let mut doc = json!({"system": {"characteristics": {"ws": {"value": 35}, "bs": 42}}});
        normalize_actor(&mut doc);
        let chars = system_of(&doc).get("characteristics").unwrap();
        assert_eq!(chars["ws"], json!({"base": 35, "advances": 0}));
        assert_eq!(chars["bs"], json!({"base": 42, "advances": 0}));
    }

    #[test]
    fn test_characteristics_already_migrated() {
        let mut doc = json!({"system": {"characteristics": {"ws": {"base": 30, "advances": 5}}}});
        normalize_actor(&mut doc);
        let chars = system_of(&doc).get("characteristics").unwrap();
        assert_eq!(chars["ws"], json!({"base": 30, "advances": 5}));
    }

    #[test]
    fn test_characteristics_empty_object_gets_default_base() {
        let mut doc = json!({"system": {"characteristics": {"ws": {}}}});
        normalize_actor(&mut doc);
        let chars = system_of(&doc).get("characteristics").unwrap();
        assert_eq!(chars["ws"], json!({"base": 25, "advances": 0}));
    }

    #[test]
    fn test_armour_per_location_untouched() {
        let before = json!({"head": 2, "rightArm": 1, "leftArm": 1,
                            "body": 3, "rightLeg": 1, "leftLeg": 1});
        let mut doc = json!({"system": {"armour": before.clone()}});
        normalize_actor(&mut doc);
        assert_eq!(system_of(&doc).get("armour").unwrap(), &before);
    }

    #[test]
    fn test_armour_derived_from_armour_item() {
        let mut doc = json!({
            "system": {"armour": {"value": 9}},
            "items": [{"type": "armour", "system": {"ap": {"body": 4, "head": 2}}}],
        });
        normalize_actor(&mut doc);
        assert_eq!(
            system_of(&doc).get("armour").unwrap(),
            &json!({"head": 2, "rightArm": 0, "leftArm": 0,
                    "body": 4, "rightLeg": 0, "leftLeg": 0})
        );
    }

    #[test]
    fn test_armour_uniform_from_flat_value() {
        let mut doc = json!({"system": {"armour": {"value": 3}}});
        normalize_actor(&mut doc);
        assert_eq!(
            system_of(&doc).get("armour").unwrap(),
            &json!({"head": 3, "rightArm": 3, "leftArm": 3,
                    "body": 3, "rightLeg": 3, "leftLeg": 3})
        );
    }

    #[test]
    fn test_armour_defaults_to_zeros() {
        let mut doc = json!({"system": {}});
        normalize_actor(&mut doc);
        assert_eq!(
            system_of(&doc).get("armour").unwrap(),
            &json!({"head": 0, "rightArm": 0, "leftArm": 0,
                    "body": 0, "rightLeg": 0, "leftLeg": 0})
        );
    }

    #[test]
    fn test_npc_template_fill_keeps_existing() {
        let mut doc = json!({"system": {"fatigue": 2}});
        normalize_actor(&mut doc);
        let system = system_of(&doc);
        assert_eq!(system["fatigue"], json!(2));
        assert_eq!(system["fate"], json!({"value": 0, "max": 0}));
        assert_eq!(system["xp"], json!({"total": 0, "spent": 0}));
        assert_eq!(system["aptitudes"], json!([]));
        assert_eq!(system["defeated"], json!(false));
    }

    #[test]
    fn test_details_built_from_legacy_fields() {
        let mut doc = json!({"system": {
            "description": "A hulking brute.",
            "threatRating": "Elite",
            "movement": {"half": 3, "full": 6, "charge": 9, "run": 18},
            "notes": "Found in the underhive.",
        }});
        normalize_actor(&mut doc);
        let system = system_of(&doc);
        let details = system.get("details").unwrap();
        assert_eq!(details["role"], json!("Elite"));
        assert_eq!(details["homeworld"], json!(""));
        assert_eq!(
            details["notes"],
            json!(
                "A hulking brute.\n\nTHREAT RATING: Elite\n\
                 \nMOVEMENT: Half 3, Full 6, Charge 9, Run 18\n\
                 \nFound in the underhive."
            )
        );
        assert!(!system.contains_key("notes"));
        assert!(!system.contains_key("threatRating"));
        assert!(!system.contains_key("movement"));
        assert_eq!(system["description"], json!("A hulking brute."));
    }

    #[test]
    fn test_details_present_is_untouched() {
        let mut doc = json!({"system": {
            "details": {"notes": "hand written"},
            "notes": "legacy leftover",
        }});
        normalize_actor(&mut doc);
        let system = system_of(&doc);
        assert_eq!(system["details"], json!({"notes": "hand written"}));
        assert_eq!(system["notes"], json!("legacy leftover"));
    }

    #[test]
    fn test_rebuild_notes_missing_movement_components() {
        let system = as_map(json!({"movement": {"half": 4}}));
        assert_eq!(
            rebuild_notes(&system),
            "\nMOVEMENT: Half 4, Full 0, Charge 0, Run 0"
        );
    }

    #[test]
    fn test_rebuild_notes_empty_system() {
        assert_eq!(rebuild_notes(&Map::new()), "");
    }

    #[test]
    fn test_weapon_class_mapping() {
        for (legacy, current) in [
            ("Melee", "melee"),
            ("Pistol", "ranged"),
            ("Basic", "ranged"),
            ("Heavy", "ranged"),
            ("Thrown", "thrown"),
            ("Exotic", "exotic"),
            ("melee", "melee"),
        ] {
            let mut system = as_map(json!({"class": legacy}));
            normalize_weapon(&mut system);
            assert_eq!(system["class"], json!(current), "class {legacy}");
        }
    }

    #[test]
    fn test_weapon_rate_of_fire_parsing() {
        let mut system = as_map(json!({"rateOfFire": "S/2/-"}));
        normalize_weapon(&mut system);
        assert_eq!(system["rof"], json!({"single": true, "semi": 2, "full": 0}));
        assert!(!system.contains_key("rateOfFire"));

        let mut system = as_map(json!({"rateOfFire": "-/3/6"}));
        normalize_weapon(&mut system);
        assert_eq!(system["rof"], json!({"single": false, "semi": 3, "full": 6}));

        let mut system = as_map(json!({"rateOfFire": "S/2"}));
        normalize_weapon(&mut system);
        assert_eq!(system["rof"], json!({"single": true, "semi": 0, "full": 0}));

        let mut system = as_map(json!({}));
        normalize_weapon(&mut system);
        assert_eq!(system["rof"], json!({"single": false, "semi": 0, "full": 0}));
    }

    #[test]
    fn test_weapon_damage_restructure() {
        let mut system = as_map(json!({"damage": "1d10+4", "damageType": "R"}));
        normalize_weapon(&mut system);
        assert_eq!(
            system["damage"],
            json!({"formula": "1d10+4", "type": "rending", "bonus": 0})
        );
        assert!(!system.contains_key("damageType"));

        let mut system = as_map(json!({}));
        normalize_weapon(&mut system);
        assert_eq!(
            system["damage"],
            json!({"formula": "1d10", "type": "impact", "bonus": 0})
        );

        let structured = json!({"formula": "2d10", "type": "energy", "bonus": 2});
        let mut system = as_map(json!({"damage": structured.clone()}));
        normalize_weapon(&mut system);
        assert_eq!(system["damage"], structured);
    }

    #[test]
    fn test_weapon_clip_restructure() {
        let mut system = as_map(json!({"clip": 8}));
        normalize_weapon(&mut system);
        assert_eq!(system["clip"], json!({"value": 8, "max": 8}));

        let mut system = as_map(json!({}));
        normalize_weapon(&mut system);
        assert_eq!(system["clip"], json!({"value": 0, "max": 0}));
    }

    #[test]
    fn test_weapon_with_magazine_grows_no_clip() {
        let mut system = as_map(json!({"magazine": {"value": 4, "max": 8}}));
        normalize_weapon(&mut system);
        assert!(!system.contains_key("clip"));
        assert_eq!(system["magazine"], json!({"value": 4, "max": 8}));
    }

    #[test]
    fn test_weapon_qualities_from_special() {
        let mut system = as_map(json!({"special": "Tearing, Smoke , "}));
        normalize_weapon(&mut system);
        assert_eq!(system["qualities"], json!(["Tearing", "Smoke"]));
        assert!(!system.contains_key("special"));
    }

    #[test]
    fn test_weapon_fills() {
        let mut system = as_map(json!({"range": 30}));
        normalize_weapon(&mut system);
        assert_eq!(system["range"], json!(30));
        assert_eq!(system["description"], json!(""));
        assert_eq!(system["penetration"], json!(0));
        assert_eq!(system["reload"], json!(""));
        assert_eq!(system["weight"], json!(0));
        assert_eq!(system["equipped"], json!(true));
    }

    #[test]
    fn test_armour_item_rename_and_locations() {
        let mut system = as_map(json!({"ap": {"body": 4}}));
        normalize_armour(&mut system);
        assert!(!system.contains_key("ap"));
        assert_eq!(
            system["locations"],
            json!({"body": 4, "head": 0, "rightArm": 0,
                   "leftArm": 0, "rightLeg": 0, "leftLeg": 0})
        );
        assert_eq!(system["maxAgility"], json!(0));
        assert_eq!(system["equipped"], json!(true));
    }

    #[test]
    fn test_ammunition_rename_and_fills() {
        let mut system = as_map(json!({"weaponType": "Las"}));
        normalize_ammunition(&mut system);
        assert!(!system.contains_key("weaponType"));
        assert_eq!(system["weaponGroup"], json!("Las"));
        assert_eq!(system["quantity"], json!(1));
        assert_eq!(system["damageModifier"], json!(0));
    }

    #[test]
    fn test_gear_fills() {
        let mut system = as_map(json!({"quantity": 3}));
        normalize_gear(&mut system);
        assert_eq!(system["quantity"], json!(3));
        assert_eq!(system["description"], json!(""));
        assert_eq!(system["weight"], json!(0));
    }
}
