// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Fatal errors.
//!
//! Anything here aborts a run before the store is rewritten. Problems local
//! to a single input block are [`MalformedBlock`](crate::parser::MalformedBlock)
//! diagnostics instead, and an undefined c(lambda) is stored as a sentinel.

use crate::config::ConfigError;
use crate::store::schema::{FORMAT_NAME, SCHEMA_VERSION};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Store content that does not follow the strict schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("not a valid store document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(
        "format '{format}' version {version} is not supported (expected '{}' version {})",
        FORMAT_NAME,
        SCHEMA_VERSION
    )]
    UnsupportedFormat { format: String, version: u32 },

    #[error("file uses the legacy layout; run once with --import-legacy to convert it")]
    LegacyLayout,

    #[error("entry n={key}: {reason}")]
    InvalidEntry { key: u64, reason: String },
}

/// Failure to read, decode, encode or write a store file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot read store '{}': {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot write store '{}': {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("store '{}': {source}", .path.display())]
    Content { path: PathBuf, source: SchemaError },

    #[error("cannot encode store: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failure of a whole update run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("cannot read input '{}': {source}", .path.display())]
    Input { path: PathBuf, source: io::Error },

    #[error("cannot read input: {0}")]
    InputStream(#[source] io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}
