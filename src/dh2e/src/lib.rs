//! # dh2e
//!
//! Dark Heresy 2E campaign dataset migration library - schema
//! normalization, narrative recovery, and template conformance.
//!
//! This library provides functionality to:
//! - Normalize legacy document shapes to the current actor and item schema
//! - Recover skills, talents, traits, and psychic powers from the free-text
//!   stat blocks kept at a historical git revision
//! - Conform every document to the current data templates
//! - Derive trait rule effects and immunities from display names
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use dh2e::revision::GitRevisionStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let root = Path::new("/srv/campaign");
//! let snapshots = GitRevisionStore::new(root, "9fceb02");
//!
//! let report = dh2e::migrate::run(root, Some(&snapshots), false)?;
//! for file in &report.files {
//!     println!("{}: +{} items", file.path, file.items_added());
//! }
//! # Ok(())
//! # }
//! ```

pub mod build;
pub mod document;
pub mod extract;
pub mod id;
pub mod migrate;
pub mod records;
pub mod reference;
pub mod revision;
pub mod rules;
pub mod storage;

// Re-export commonly used items
#[doc(inline)]
pub use id::IdGenerator;
#[doc(inline)]
pub use migrate::{
    ActorRecovery, CollectionKind, FileReport, MigrateError, RunReport, COLLECTION_FILES,
};
#[doc(inline)]
pub use records::{PowerData, Record, RecordKind, SkillData, TalentData, TraitData};
#[doc(inline)]
pub use revision::{GitRevisionStore, MemoryRevisionStore, RevisionError, RevisionStore};
#[doc(inline)]
pub use rules::{derive, slugify, DerivedRules, RuleEffect, TraitIdentity};
#[doc(inline)]
pub use storage::{read_collection, write_collection, StorageError};

// Reference data (skill characteristics, trait categories, power disciplines)
#[doc(inline)]
pub use reference::{
    power_discipline, skill_characteristic, trait_category, Characteristic, TraitCategory,
};
