// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use partition_updater::{RunSummary, UpdatePipeline, UpdaterConfig};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A scratch directory holding one input log and one store file.
pub struct Workspace {
    pub dir: TempDir,
    pub input: PathBuf,
    pub store: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create scratch directory");
        let input = dir.path().join("search.log");
        let store = dir.path().join("partitions.json");
        Self { dir, input, store }
    }

    pub fn write_log(&self, text: &str) {
        fs::write(&self.input, text).expect("write log");
    }

    pub fn write_store(&self, text: &str) {
        fs::write(&self.store, text).expect("write store");
    }

    pub fn read_store(&self) -> String {
        fs::read_to_string(&self.store).expect("read store")
    }

    /// Run the default pipeline over the current log.
    pub fn run(&self) -> RunSummary {
        self.run_with(UpdaterConfig::default())
    }

    pub fn run_with(&self, config: UpdaterConfig) -> RunSummary {
        UpdatePipeline::new(config)
            .run(&self.input, &self.store)
            .expect("run succeeds")
    }
}

/// One log block in the producer's format.
pub fn block(size: u64, dimension: &str, partition: &str) -> String {
    format!(
        "--- Size {size} ---\n\
         Search rounds: 12\n\
         Max f^lambda: {dimension}\n\
         Partitions achieving maximum: {partition}\n"
    )
}
