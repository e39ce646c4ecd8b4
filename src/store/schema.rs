// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! On-disk layout of a partition store, version 1.
//!
//! ```text
//! {
//!   "format": "partition-store",
//!   "version": 1,
//!   "entries": {
//!     "4": {
//!       "dimension": "3",
//!       "partition": [
//!         2,
//!         1,
//!         1
//!       ],
//!       "c_lambda": 0.24520731325293155921
//!     }
//!   }
//! }
//! ```
//!
//! Entries are keyed by the decimal form of n and appear in increasing
//! numeric order. `dimension` is the full decimal string. `c_lambda` is a
//! JSON number written with a fixed number of fractional digits, or `null`
//! when undefined. The document is pretty-printed with two-space indentation
//! and ends with a newline. Unknown fields are rejected.

use crate::error::SchemaError;
use crate::numeric::fixed::{CLambda, FixedDecimal};
use crate::record::{Partition, PartitionRecord};
use dashu_int::UBig;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::collections::BTreeMap;
use std::str::FromStr;

pub const FORMAT_NAME: &str = "partition-store";
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreDocument {
    pub format: String,
    pub version: u32,
    pub entries: BTreeMap<u64, EntryDocument>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntryDocument {
    pub dimension: String,
    pub partition: Vec<u32>,
    pub c_lambda: Option<Number>,
}

impl EntryDocument {
    pub fn from_record(record: &PartitionRecord) -> Result<Self, serde_json::Error> {
        let c_lambda = match &record.c_lambda {
            CLambda::Undefined => None,
            CLambda::Value(value) => Some(Number::from_str(&value.to_string())?),
        };
        Ok(Self {
            dimension: record.dimension.to_string(),
            partition: record.partition.parts().to_vec(),
            c_lambda,
        })
    }

    pub fn into_record(self, key: u64) -> Result<PartitionRecord, SchemaError> {
        let invalid = |reason: &str| SchemaError::InvalidEntry {
            key,
            reason: reason.to_string(),
        };

        if key == 0 {
            return Err(invalid("size must be positive"));
        }
        let dimension = parse_dimension(&self.dimension)
            .ok_or_else(|| invalid("dimension must be a positive decimal integer"))?;
        if self.partition.is_empty() || self.partition.contains(&0) {
            return Err(invalid("partition must be a non-empty list of positive integers"));
        }
        let c_lambda = match self.c_lambda {
            None => CLambda::Undefined,
            Some(number) => CLambda::Value(
                FixedDecimal::parse(&number.to_string())
                    .ok_or_else(|| invalid("c_lambda must be a fixed-point decimal"))?,
            ),
        };

        Ok(PartitionRecord {
            size: key,
            dimension,
            partition: Partition::new(self.partition),
            c_lambda,
        })
    }
}

/// A positive integer written as plain decimal digits.
pub(crate) fn parse_dimension(text: &str) -> Option<UBig> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    UBig::from_str_radix(text, 10)
        .ok()
        .filter(|dimension| *dimension != UBig::ZERO)
}
