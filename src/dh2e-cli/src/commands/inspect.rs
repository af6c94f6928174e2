//! Collection inspection command handler
//!
//! Prints document counts by type for one collection file, plus the
//! embedded item records carried by its actor documents.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use dh2e::storage;
use serde_json::Value;

/// Counts gathered from one collection file
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Inventory {
    pub documents: usize,
    pub by_type: BTreeMap<String, usize>,
    pub embedded: BTreeMap<String, usize>,
}

/// Tally documents and embedded records by their type field
pub fn tally(docs: &[Value]) -> Inventory {
    let mut inventory = Inventory {
        documents: docs.len(),
        ..Inventory::default()
    };

    for doc in docs {
        *inventory.by_type.entry(type_name(doc)).or_default() += 1;

        let Some(items) = doc.get("items").and_then(Value::as_array) else {
            continue;
        };
        for item in items {
            *inventory.embedded.entry(type_name(item)).or_default() += 1;
        }
    }

    inventory
}

fn type_name(doc: &Value) -> String {
    doc.get("type")
        .and_then(Value::as_str)
        .unwrap_or("(untyped)")
        .to_string()
}

/// Handle the inspect command
pub fn handle(input: &Path) -> Result<()> {
    let docs = storage::read_collection(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let inventory = tally(&docs);

    println!("{}: {} documents", input.display(), inventory.documents);
    for (kind, count) in &inventory.by_type {
        println!("  {:12} {}", kind, count);
    }

    if !inventory.embedded.is_empty() {
        println!();
        println!("Embedded records:");
        for (kind, count) in &inventory.embedded {
            println!("  {:12} {}", kind, count);
        }
    }

    Ok(())
}
