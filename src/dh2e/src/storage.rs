//! Whole-file collection storage.
//!
//! Collection files hold a JSON array of documents, pretty-printed with
//! 4-space indentation and non-ASCII text written verbatim, matching how
//! the dataset has always been committed. A write replaces the file
//! wholly; any failure before the write leaves the file untouched.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Serializer, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not a document array: {0}")]
    NotAnArray(String),
}

/// Read a collection file into its documents.
pub fn read_collection(path: &Path) -> Result<Vec<Value>, StorageError> {
    let text = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&text)?;
    match value {
        Value::Array(docs) => Ok(docs),
        _ => Err(StorageError::NotAnArray(path.display().to_string())),
    }
}

/// Serialize documents to the on-disk form without writing them.
pub fn to_collection_bytes(docs: &[Value]) -> Result<Vec<u8>, StorageError> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    docs.serialize(&mut serializer)?;
    Ok(buf)
}

/// Write a collection wholly, replacing the file contents.
pub fn write_collection(path: &Path, docs: &[Value]) -> Result<(), StorageError> {
    let bytes = to_collection_bytes(docs)?;
    fs::write(path, bytes)?;
    Ok(())
}
