// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! One-time importer for stores written in the legacy layout.
//!
//! The legacy layout is a bare JSON object keyed by n, one field per line:
//!
//! ```text
//! {
//!     "4": {
//!         "dimension": "3",
//!         "partition": [2, 1, 1],
//!         "c_lambda": 0.2452073132529316
//!     }
//! }
//! ```
//!
//! It is read with a permissive line scanner, not a JSON parser. A line with
//! `{` and a quoted key opens an entry, lines naming `"dimension"`,
//! `"partition"` and `"c_lambda"` fill it, and a line with `}` closes it.
//! Entries that cannot be turned into a valid record are skipped with a
//! warning. A `c_lambda` of `nan` (or anything that is not a plain decimal)
//! is imported as undefined; otherwise its digits are kept as written.
//!
//! Only [`PartitionStore::import_legacy`](super::PartitionStore::import_legacy)
//! uses this module. Everything written afterwards uses the strict layout.

use super::schema::parse_dimension;
use super::PartitionStore;
use crate::numeric::fixed::{CLambda, FixedDecimal};
use crate::parser::partition::parse_list;
use crate::record::{Partition, PartitionRecord};
use tracing::warn;

/// Does `text` look like a legacy store rather than a strict one?
pub(crate) fn looks_legacy(text: &str) -> bool {
    text.trim_start().starts_with('{') && !text.contains("\"format\"")
}

#[derive(Debug, Default)]
struct PendingEntry {
    key: String,
    dimension: Option<String>,
    partition: Option<Option<Vec<u32>>>,
    c_lambda: Option<String>,
}

impl PendingEntry {
    fn into_record(self) -> Result<PartitionRecord, String> {
        let size = self
            .key
            .parse::<u64>()
            .ok()
            .filter(|&size| size > 0)
            .ok_or_else(|| format!("key '{}' is not a positive integer", self.key))?;
        let dimension = self
            .dimension
            .as_deref()
            .and_then(parse_dimension)
            .ok_or_else(|| "missing or invalid dimension".to_string())?;
        let parts = self
            .partition
            .flatten()
            .filter(|parts| !parts.is_empty())
            .ok_or_else(|| "missing or invalid partition".to_string())?;

        Ok(PartitionRecord {
            size,
            dimension,
            partition: Partition::new(parts),
            c_lambda: self.c_lambda.as_deref().map_or(CLambda::Undefined, import_c_lambda),
        })
    }
}

fn import_c_lambda(text: &str) -> CLambda {
    FixedDecimal::parse(text).map_or(CLambda::Undefined, CLambda::Value)
}

/// Text after the first `:` on the line.
fn value_of(line: &str) -> Option<&str> {
    line.split_once(':').map(|(_, value)| value.trim())
}

fn quoted(value: &str) -> Option<&str> {
    let rest = value.strip_prefix('"')?;
    rest.find('"').map(|end| &rest[..end])
}

/// Scan a legacy store. Later entries with the same key replace earlier ones.
pub fn import(text: &str) -> PartitionStore {
    let mut store = PartitionStore::new();
    let mut pending: Option<PendingEntry> = None;

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.contains('{') {
            if let Some(key) = quoted(line) {
                pending = Some(PendingEntry {
                    key: key.to_string(),
                    ..PendingEntry::default()
                });
            }
        } else if line.contains('}') {
            let Some(entry) = pending.take() else {
                continue;
            };
            let key = entry.key.clone();
            match entry.into_record() {
                Ok(record) => {
                    // Imported values bypass the ratchet.
                    store.entries.insert(record.size, record);
                }
                Err(reason) => warn!(line = index + 1, key = %key, "Skipping legacy entry: {}", reason),
            }
        } else if let Some(entry) = pending.as_mut() {
            if line.contains("\"dimension\"") {
                entry.dimension = value_of(line).and_then(quoted).map(str::to_string);
            } else if line.contains("\"partition\"") {
                entry.partition = Some(parse_list(line, usize::MAX).ok());
            } else if line.contains("\"c_lambda\"") {
                entry.c_lambda = value_of(line).map(|value| value.trim_end_matches(',').trim().to_string());
            }
        }
    }

    if let Some(entry) = pending {
        warn!(key = %entry.key, "Skipping unterminated legacy entry");
    }
    store
}
