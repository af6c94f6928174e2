//! Dataset migration pipeline.
//!
//! Runs the ordered passes over the fixed list of collection files
//! under a data root: structural normalization, narrative recovery for
//! actor files, then template conformance. Every document goes through
//! the same sequence regardless of which revision wrote it; each
//! transform detects already-migrated shapes, so mixed-revision files
//! converge and a second run writes byte-identical output.

pub mod conform;
pub mod recover;
pub mod structure;

use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::id::IdGenerator;
use crate::revision::RevisionStore;
use crate::storage::{self, StorageError};

use self::recover::{Recovery, Snapshot};

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Document kind held by a collection file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Weapon,
    Armour,
    Gear,
    Ammunition,
    Trait,
    Objective,
    Actor,
}

impl CollectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weapon => "weapon",
            Self::Armour => "armour",
            Self::Gear => "gear",
            Self::Ammunition => "ammunition",
            Self::Trait => "trait",
            Self::Objective => "objective",
            Self::Actor => "actor",
        }
    }
}

impl std::fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Collection files a run processes, in order, relative to the data root.
pub static COLLECTION_FILES: &[(&str, CollectionKind)] = &[
    ("data/items/weapons.json", CollectionKind::Weapon),
    ("data/items/armour.json", CollectionKind::Armour),
    ("data/items/gear.json", CollectionKind::Gear),
    ("data/items/ammunition.json", CollectionKind::Ammunition),
    ("data/items/traits.json", CollectionKind::Trait),
    ("data/items/objectives.json", CollectionKind::Objective),
    ("data/actors/npcs.json", CollectionKind::Actor),
    ("data/actors/enemies.json", CollectionKind::Actor),
];

// ============================================================================
// Reports
// ============================================================================

/// Items recovered for one actor, counted by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorRecovery {
    pub name: String,
    pub skills: usize,
    pub talents: usize,
    pub traits: usize,
    pub powers: usize,
}

impl ActorRecovery {
    pub fn total(&self) -> usize {
        self.skills + self.talents + self.traits + self.powers
    }
}

/// What happened to one collection file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: String,
    pub kind: CollectionKind,
    /// False when the file does not exist under the data root.
    pub found: bool,
    pub documents: usize,
    /// Whether the pass sequence changed the serialized documents.
    pub changed: bool,
    pub recovered: Vec<ActorRecovery>,
    /// Actors skipped by recovery because the snapshot has no
    /// counterpart with their name.
    pub skipped: Vec<String>,
    /// Reason recovery was skipped for the whole file, if it was.
    pub recovery_skipped: Option<String>,
}

impl FileReport {
    fn new(path: &str, kind: CollectionKind) -> Self {
        Self {
            path: path.to_string(),
            kind,
            found: false,
            documents: 0,
            changed: false,
            recovered: Vec::new(),
            skipped: Vec::new(),
            recovery_skipped: None,
        }
    }

    /// Records added to this file's actors by recovery.
    pub fn items_added(&self) -> usize {
        self.recovered.iter().map(ActorRecovery::total).sum()
    }
}

/// Report for a whole run, one entry per listed collection file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub files: Vec<FileReport>,
}

impl RunReport {
    pub fn items_added(&self) -> usize {
        self.files.iter().map(FileReport::items_added).sum()
    }

    pub fn changed_files(&self) -> usize {
        self.files.iter().filter(|file| file.changed).count()
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Run the full pipeline over every collection file under `data_root`.
///
/// `snapshots` supplies the pre-overhaul revision of actor files; pass
/// `None` to skip recovery entirely. With `dry_run` nothing is written
/// and the report shows what would change. A file that fails to read or
/// parse aborts the run before anything is written to it.
pub fn run(
    data_root: &Path,
    snapshots: Option<&dyn RevisionStore>,
    dry_run: bool,
) -> Result<RunReport, MigrateError> {
    let mut ids = IdGenerator::new();
    let mut files = Vec::new();

    for &(rel, kind) in COLLECTION_FILES {
        let mut report = FileReport::new(rel, kind);
        let path = data_root.join(rel);
        if !path.exists() {
            files.push(report);
            continue;
        }
        report.found = true;

        let mut docs = storage::read_collection(&path)?;
        let before = storage::to_collection_bytes(&docs)?;

        let snapshot = match (kind, snapshots) {
            (CollectionKind::Actor, Some(store)) => match load_snapshot(store, rel) {
                Ok(snapshot) => Some(snapshot),
                Err(reason) => {
                    report.recovery_skipped = Some(reason);
                    None
                }
            },
            _ => None,
        };

        for doc in &mut docs {
            migrate_document(doc, kind, snapshot.as_ref(), &mut ids, &mut report)?;
        }

        let after = storage::to_collection_bytes(&docs)?;
        report.documents = docs.len();
        report.changed = after != before;
        if !dry_run {
            storage::write_collection(&path, &docs)?;
        }
        files.push(report);
    }

    Ok(RunReport { files })
}

fn migrate_document(
    doc: &mut Value,
    kind: CollectionKind,
    snapshot: Option<&Snapshot>,
    ids: &mut IdGenerator,
    report: &mut FileReport,
) -> Result<(), MigrateError> {
    match kind {
        CollectionKind::Actor => {
            structure::normalize_actor(doc);
            if let Some(snapshot) = snapshot {
                let name = document_name(doc);
                match recover::recover_actor(doc, snapshot, ids)? {
                    Recovery::Recovered {
                        skills,
                        talents,
                        traits,
                        powers,
                    } => {
                        if skills + talents + traits + powers > 0 {
                            report.recovered.push(ActorRecovery {
                                name,
                                skills,
                                talents,
                                traits,
                                powers,
                            });
                        }
                    }
                    Recovery::NoCounterpart => report.skipped.push(name),
                    Recovery::Nothing => {}
                }
            }
            conform::conform_actor(doc)?;
        }
        _ => {
            structure::normalize_item(doc, kind);
            conform::conform_item(doc, kind)?;
        }
    }
    Ok(())
}

fn document_name(doc: &Value) -> String {
    doc.get("name")
        .and_then(Value::as_str)
        .unwrap_or("(unnamed)")
        .to_string()
}

fn load_snapshot(store: &dyn RevisionStore, rel: &str) -> Result<Snapshot, String> {
    let bytes = store.read_file(rel).map_err(|err| err.to_string())?;
    Snapshot::parse(&bytes, rel).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::revision::MemoryRevisionStore;
    use serde_json::json;
    use std::fs;

    fn write_fixture(root: &Path, rel: &str, docs: &Value) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, serde_json::to_vec(docs).unwrap()).unwrap();
    }

    fn legacy_weapons() -> Value {
        json!([{
            "name": "Autogun",
            "type": "weapon",
            "system": {
                "class": "Basic",
                "damage": "1d10+3",
                "damageType": "I",
                "rateOfFire": "S/3/10",
                "clip": 30,
                "special": "Reliable",
            },
        }])
    }

    fn current_npcs() -> Value {
        json!([{
            "name": "Heretek",
            "type": "npc",
            "system": {"characteristics": {"ws": {"value": 30}}},
            "items": [],
        }])
    }

    fn snapshot_npcs() -> Value {
        json!([{
            "name": "Heretek",
            "system": {
                "description": "A hunched tech-heretic.",
                "threatRating": "Troupe",
                "movement": {"half": 3, "full": 6, "charge": 9, "run": 18},
                "notes": "SKILLS: Tech-Use +10, Dodge.\n\nTRAITS: Machine (2), Mechanicus Implants.",
            },
        }])
    }

    fn snapshot_store() -> MemoryRevisionStore {
        let mut store = MemoryRevisionStore::new();
        store.insert(
            "data/actors/npcs.json",
            serde_json::to_vec(&snapshot_npcs()).unwrap(),
        );
        store
    }

    #[test]
    fn test_run_is_idempotent_to_the_byte() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "data/items/weapons.json", &legacy_weapons());
        write_fixture(dir.path(), "data/actors/npcs.json", &current_npcs());
        let store = snapshot_store();

        let first = run(dir.path(), Some(&store), false).unwrap();
        assert_eq!(first.items_added(), 4);
        let weapons_once = fs::read(dir.path().join("data/items/weapons.json")).unwrap();
        let npcs_once = fs::read(dir.path().join("data/actors/npcs.json")).unwrap();

        let second = run(dir.path(), Some(&store), false).unwrap();
        assert_eq!(second.changed_files(), 0);
        assert_eq!(
            fs::read(dir.path().join("data/items/weapons.json")).unwrap(),
            weapons_once
        );
        assert_eq!(
            fs::read(dir.path().join("data/actors/npcs.json")).unwrap(),
            npcs_once
        );
    }

    #[test]
    fn test_run_reports_recovery_counts() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "data/actors/npcs.json", &current_npcs());
        let store = snapshot_store();

        let report = run(dir.path(), Some(&store), false).unwrap();
        let npcs = report
            .files
            .iter()
            .find(|file| file.path == "data/actors/npcs.json")
            .unwrap();
        assert!(npcs.found);
        assert!(npcs.changed);
        assert_eq!(npcs.documents, 1);
        assert_eq!(npcs.recovered.len(), 1);
        let heretek = &npcs.recovered[0];
        assert_eq!(heretek.name, "Heretek");
        assert_eq!(heretek.skills, 2);
        assert_eq!(heretek.traits, 2);
        assert_eq!(heretek.total(), 4);

        let docs = storage::read_collection(&dir.path().join("data/actors/npcs.json")).unwrap();
        let system = docs[0].get("system").unwrap();
        assert_eq!(
            system["characteristics"]["ws"],
            json!({"base": 30, "advances": 0})
        );
        assert_eq!(system["eliteAdvances"], json!([]));
        assert_eq!(
            system["details"]["notes"],
            json!(
                "A hunched tech-heretic.\n\nTHREAT RATING: Troupe\n\
                 \nMOVEMENT: Half 3, Full 6, Charge 9, Run 18\n\
                 \nSKILLS: Tech-Use +10, Dodge.\n\nTRAITS: Machine (2), Mechanicus Implants."
            )
        );
        let items = docs[0].get("items").unwrap().as_array().unwrap();
        assert_eq!(items.len(), 4);
        assert_eq!(items[0]["_id"], json!("ski11ta1ent0001"));
        let machine = items
            .iter()
            .find(|item| item["name"] == json!("Machine (2)"))
            .unwrap();
        assert_eq!(
            machine["system"]["immunities"],
            json!(["Fear", "Pinning", "Disease", "Poison"])
        );
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "data/items/weapons.json", &legacy_weapons());
        let before = fs::read(dir.path().join("data/items/weapons.json")).unwrap();

        let report = run(dir.path(), None, true).unwrap();
        assert_eq!(report.changed_files(), 1);
        assert_eq!(
            fs::read(dir.path().join("data/items/weapons.json")).unwrap(),
            before
        );
    }

    #[test]
    fn test_missing_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "data/items/gear.json", &json!([]));

        let report = run(dir.path(), None, false).unwrap();
        assert_eq!(report.files.len(), COLLECTION_FILES.len());
        let found: Vec<&str> = report
            .files
            .iter()
            .filter(|file| file.found)
            .map(|file| file.path.as_str())
            .collect();
        assert_eq!(found, vec!["data/items/gear.json"]);
    }

    #[test]
    fn test_recovery_skipped_when_revision_lacks_file() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "data/actors/npcs.json", &current_npcs());
        let store = MemoryRevisionStore::new();

        let report = run(dir.path(), Some(&store), false).unwrap();
        let npcs = &report.files[6];
        assert!(npcs.recovery_skipped.is_some());
        assert!(npcs.recovered.is_empty());
        // the other passes still ran
        assert!(npcs.changed);
    }

    #[test]
    fn test_actor_without_counterpart_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut docs = current_npcs();
        docs.as_array_mut()
            .unwrap()
            .push(json!({"name": "Nameless Thrall", "type": "npc", "system": {}, "items": []}));
        write_fixture(dir.path(), "data/actors/npcs.json", &docs);
        let store = snapshot_store();

        let report = run(dir.path(), Some(&store), false).unwrap();
        let npcs = &report.files[6];
        assert_eq!(npcs.skipped, vec!["Nameless Thrall"]);
        assert_eq!(npcs.recovered.len(), 1);
    }

    #[test]
    fn test_weapon_file_full_shape() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "data/items/weapons.json", &legacy_weapons());

        run(dir.path(), None, false).unwrap();
        let docs = storage::read_collection(&dir.path().join("data/items/weapons.json")).unwrap();
        let system = docs[0].get("system").unwrap();
        assert_eq!(system["class"], json!("ranged"));
        assert_eq!(system["rof"], json!({"single": true, "semi": 3, "full": 10}));
        assert_eq!(
            system["damage"],
            json!({"formula": "1d10+3", "type": "impact", "bonus": 0})
        );
        assert!(system.get("clip").is_none());
        assert_eq!(system["magazine"], json!({"value": 30, "max": 30}));
        assert_eq!(system["loadType"], json!("magazine"));
        assert_eq!(system["qualities"], json!(["Reliable"]));
        assert_eq!(system["craftsmanship"], json!("common"));
        assert_eq!(system["equipped"], json!(true));
    }
}
