// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Persistent store of the best known record for each size n.
//!
//! The store is a ratchet: an entry is created the first time its key is
//! seen and afterwards replaced only by a strictly larger dimension. Entries
//! are never removed.
//!
//! A run loads the store once, applies every candidate in memory, and
//! rewrites the whole file once at the end. The rewrite goes through a
//! temporary file in the same directory which is then renamed over the
//! destination, so readers see either the old or the new contents.
//!
//! # Examples
//!
//! ```
//! use dashu_int::UBig;
//! use partition_updater::record::PartitionRecord;
//! use partition_updater::store::{PartitionStore, UpsertOutcome};
//!
//! let mut store = PartitionStore::new();
//! let record = |dimension: u32| {
//!     PartitionRecord::candidate(4, UBig::from(dimension), vec![2, 1, 1].into())
//! };
//! assert_eq!(store.upsert(record(2)), UpsertOutcome::Inserted);
//! assert_eq!(store.upsert(record(3)), UpsertOutcome::Replaced);
//! assert_eq!(store.upsert(record(2)), UpsertOutcome::Kept);
//! assert_eq!(store.get(4).unwrap().dimension, UBig::from(3u8));
//! ```

pub mod legacy;
pub mod schema;

use crate::error::{SchemaError, StoreError};
use crate::record::PartitionRecord;
use dashu_int::UBig;
use schema::{EntryDocument, StoreDocument, FORMAT_NAME, SCHEMA_VERSION};
use std::collections::btree_map::{self, Entry};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Result of offering a record to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The key was absent; the record was added.
    Inserted,
    /// The record's dimension was strictly larger; it replaced the entry.
    Replaced,
    /// The stored dimension was at least as large; nothing changed.
    Kept,
}

/// In-memory mapping from n to its best known record, ordered by n.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionStore {
    entries: BTreeMap<u64, PartitionRecord>,
}

impl PartitionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, size: u64) -> Option<&PartitionRecord> {
        self.entries.get(&size)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records in increasing order of n.
    pub fn iter(&self) -> btree_map::Values<'_, u64, PartitionRecord> {
        self.entries.values()
    }

    /// Would [`upsert`](Self::upsert) store a record of this size and dimension?
    pub fn would_accept(&self, size: u64, dimension: &UBig) -> bool {
        match self.entries.get(&size) {
            Some(existing) => *dimension > existing.dimension,
            None => true,
        }
    }

    /// Insert the record if its key is absent, replace the entry if the
    /// record's dimension is strictly larger, and otherwise leave the store
    /// untouched.
    pub fn upsert(&mut self, record: PartitionRecord) -> UpsertOutcome {
        match self.entries.entry(record.size) {
            Entry::Vacant(slot) => {
                slot.insert(record);
                UpsertOutcome::Inserted
            }
            Entry::Occupied(mut slot) => {
                if record.dimension > slot.get().dimension {
                    slot.insert(record);
                    UpsertOutcome::Replaced
                } else {
                    UpsertOutcome::Kept
                }
            }
        }
    }

    /// Parse a document in the strict layout.
    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        let document: StoreDocument = match serde_json::from_str(text) {
            Ok(document) => document,
            Err(error) if legacy::looks_legacy(text) => {
                debug!("Strict parse failed on a legacy-looking store: {}", error);
                return Err(SchemaError::LegacyLayout);
            }
            Err(error) => return Err(SchemaError::Parse(error)),
        };

        if document.format != FORMAT_NAME || document.version != SCHEMA_VERSION {
            return Err(SchemaError::UnsupportedFormat {
                format: document.format,
                version: document.version,
            });
        }

        let mut entries = BTreeMap::new();
        for (key, entry) in document.entries {
            entries.insert(key, entry.into_record(key)?);
        }
        Ok(Self { entries })
    }

    /// Render the whole store in the strict layout.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let entries = self
            .iter()
            .map(|record| Ok((record.size, EntryDocument::from_record(record)?)))
            .collect::<Result<BTreeMap<_, _>, serde_json::Error>>()?;
        let document = StoreDocument {
            format: FORMAT_NAME.to_string(),
            version: SCHEMA_VERSION,
            entries,
        };
        let mut json = serde_json::to_string_pretty(&document)?;
        json.push('\n');
        Ok(json)
    }

    /// Load a store; a missing file gives an empty store.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let Some(text) = read_if_present(path)? else {
            info!(path = %path.display(), "No store found, starting empty");
            return Ok(Self::new());
        };
        let store = Self::from_json(&text).map_err(|source| StoreError::Content {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), entries = store.len(), "Loaded store");
        Ok(store)
    }

    /// One-time import of a store written in the legacy layout.
    ///
    /// A file that already uses the strict layout is loaded normally.
    pub fn import_legacy(path: &Path) -> Result<Self, StoreError> {
        let Some(text) = read_if_present(path)? else {
            info!(path = %path.display(), "No store found, starting empty");
            return Ok(Self::new());
        };
        if !legacy::looks_legacy(&text) {
            warn!(path = %path.display(), "Store already uses the strict layout; import not needed");
            return Self::from_json(&text).map_err(|source| StoreError::Content {
                path: path.to_path_buf(),
                source,
            });
        }
        let store = legacy::import(&text);
        info!(path = %path.display(), entries = store.len(), "Imported legacy store");
        Ok(store)
    }

    /// Atomically replace the file at `path` with the whole store.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let json = self.to_json()?;
        let write_error = |source: io::Error| StoreError::Write {
            path: path.to_path_buf(),
            source,
        };

        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(directory).map_err(write_error)?;
        file.write_all(json.as_bytes()).map_err(write_error)?;
        file.as_file().sync_all().map_err(write_error)?;
        // Keep the permissions of the file being replaced.
        if let Ok(metadata) = fs::metadata(path) {
            fs::set_permissions(file.path(), metadata.permissions()).map_err(write_error)?;
        }
        file.persist(path).map_err(|error| write_error(error.error))?;

        info!(path = %path.display(), entries = self.len(), "Saved store");
        Ok(())
    }
}

fn read_if_present(path: &Path) -> Result<Option<String>, StoreError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StoreError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::fixed::{CLambda, FixedDecimal};
    use crate::record::Partition;

    fn record(size: u64, dimension: &str, parts: Vec<u32>, c_lambda: &str) -> PartitionRecord {
        PartitionRecord {
            size,
            dimension: dimension.parse().unwrap(),
            partition: Partition::new(parts),
            c_lambda: CLambda::Value(FixedDecimal::parse(c_lambda).unwrap()),
        }
    }

    #[test]
    fn test_ratchet_uses_numeric_order() {
        let mut store = PartitionStore::new();
        store.upsert(record(10, "9", vec![4, 3, 2, 1], "0.5"));
        // "10" < "9" as strings; numerically it is larger.
        let outcome = store.upsert(record(10, "10", vec![4, 3, 2, 1], "0.4"));
        assert_eq!(outcome, UpsertOutcome::Replaced);
        assert_eq!(store.get(10).unwrap().dimension.to_string(), "10");
    }

    #[test]
    fn test_equal_dimension_is_kept() {
        let mut store = PartitionStore::new();
        store.upsert(record(7, "35", vec![4, 2, 1], "0.1"));
        let outcome = store.upsert(record(7, "35", vec![3, 2, 1, 1], "0.1"));
        assert_eq!(outcome, UpsertOutcome::Kept);
        assert_eq!(store.get(7).unwrap().partition.parts(), &[4, 2, 1]);
    }

    #[test]
    fn test_would_accept() {
        let mut store = PartitionStore::new();
        assert!(store.would_accept(5, &UBig::from(1u8)));
        store.upsert(record(5, "6", vec![3, 1, 1], "0.2"));
        assert!(!store.would_accept(5, &UBig::from(6u8)));
        assert!(!store.would_accept(5, &UBig::from(5u8)));
        assert!(store.would_accept(5, &UBig::from(7u8)));
    }

    #[test]
    fn test_json_layout() {
        let mut store = PartitionStore::new();
        store.upsert(record(4, "3", vec![2, 1, 1], "0.2452"));
        let expected = "{\n  \"format\": \"partition-store\",\n  \"version\": 1,\n  \"entries\": {\n    \"4\": {\n      \"dimension\": \"3\",\n      \"partition\": [\n        2,\n        1,\n        1\n      ],\n      \"c_lambda\": 0.2452\n    }\n  }\n}\n";
        assert_eq!(store.to_json().unwrap(), expected);
    }

    #[test]
    fn test_keys_in_numeric_order() {
        let mut store = PartitionStore::new();
        for size in [100, 9, 10] {
            let parts = vec![1; size as usize];
            store.upsert(record(size, "1", parts, "1.0"));
        }
        let sizes: Vec<u64> = store.iter().map(|record| record.size).collect();
        assert_eq!(sizes, vec![9, 10, 100]);
        let json = store.to_json().unwrap();
        let nine = json.find("\"9\"").unwrap();
        let ten = json.find("\"10\"").unwrap();
        let hundred = json.find("\"100\"").unwrap();
        assert!(nine < ten && ten < hundred);
    }

    #[test]
    fn test_undefined_is_null() {
        let mut store = PartitionStore::new();
        store.upsert(PartitionRecord::candidate(4, UBig::from(3u8), vec![2, 1, 1].into()));
        let json = store.to_json().unwrap();
        assert!(json.contains("\"c_lambda\": null"));
        let reloaded = PartitionStore::from_json(&json).unwrap();
        assert!(reloaded.get(4).unwrap().c_lambda.is_undefined());
    }

    #[test]
    fn test_rejects_other_versions() {
        let json = "{\"format\": \"partition-store\", \"version\": 2, \"entries\": {}}";
        assert!(matches!(
            PartitionStore::from_json(json),
            Err(SchemaError::UnsupportedFormat { version: 2, .. })
        ));
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let json = "{\"format\": \"partition-store\", \"version\": 1, \"entries\": {}, \"extra\": 1}";
        assert!(matches!(
            PartitionStore::from_json(json),
            Err(SchemaError::Parse(_))
        ));
    }

    #[test]
    fn test_legacy_layout_is_refused() {
        let json = "{\n    \"4\": {\n        \"dimension\": \"3\",\n        \"partition\": [2, 1, 1],\n        \"c_lambda\": 0.2452073132529316\n    }\n}\n";
        assert!(matches!(
            PartitionStore::from_json(json),
            Err(SchemaError::LegacyLayout)
        ));
    }
}
