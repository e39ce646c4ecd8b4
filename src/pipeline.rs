// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! One update run: read candidates from a log, ratchet them into the store,
//! and save the store once.
//!
//! A run is all-or-nothing with respect to the destination file. The store is
//! loaded before the first candidate is read and saved only after the input
//! is exhausted, so a fatal error at any point leaves the file as it was.

use crate::config::UpdaterConfig;
use crate::error::PipelineError;
use crate::numeric;
use crate::parser::RecordParser;
use crate::record::PartitionRecord;
use crate::statistics::{Counters, Statistics};
use crate::store::{PartitionStore, UpsertOutcome};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Candidate outcomes and dropped blocks.
    pub statistics: Statistics,
    /// Entries in the store as saved.
    pub entries: usize,
}

/// Applies candidate records to a [`PartitionStore`].
#[derive(Debug, Clone)]
pub struct UpdatePipeline {
    config: UpdaterConfig,
}

impl UpdatePipeline {
    pub fn new(config: UpdaterConfig) -> Self {
        Self { config }
    }

    /// Update the store at `store_path` from the log at `input_path`.
    ///
    /// # Errors
    ///
    /// Fails on an invalid configuration, an unreadable input, or a store
    /// that cannot be loaded or saved. The store file is not modified when
    /// this returns an error.
    pub fn run(&self, input_path: &Path, store_path: &Path) -> Result<RunSummary, PipelineError> {
        self.config.validate()?;
        let input = File::open(input_path).map_err(|source| PipelineError::Input {
            path: input_path.to_path_buf(),
            source,
        })?;
        info!(input = %input_path.display(), store = %store_path.display(), "Starting update");

        self.run_reader(BufReader::new(input), store_path)
            .map_err(|error| match error {
                PipelineError::InputStream(source) => PipelineError::Input {
                    path: input_path.to_path_buf(),
                    source,
                },
                other => other,
            })
    }

    /// Update the store at `store_path` from an already opened log.
    pub fn run_reader<R: BufRead>(&self, reader: R, store_path: &Path) -> Result<RunSummary, PipelineError> {
        self.config.validate()?;
        let mut store = if self.config.import_legacy {
            PartitionStore::import_legacy(store_path)?
        } else {
            PartitionStore::load(store_path)?
        };

        let mut statistics = Statistics::new();
        let mut parser = RecordParser::new(reader, self.config.limits);
        for candidate in parser.by_ref() {
            let candidate = candidate.map_err(PipelineError::InputStream)?;
            self.offer(&mut store, candidate, &mut statistics);
        }
        statistics.merge(parser.statistics());

        store.save(store_path)?;
        info!("{}", statistics);
        info!("Successfully completed: results written to '{}'", store_path.display());

        Ok(RunSummary {
            statistics,
            entries: store.len(),
        })
    }

    /// Apply in-memory candidates to `store`, in order.
    pub fn apply<I>(&self, store: &mut PartitionStore, candidates: I) -> Statistics
    where
        I: IntoIterator<Item = PartitionRecord>,
    {
        let mut statistics = Statistics::new();
        for candidate in candidates {
            self.offer(store, candidate, &mut statistics);
        }
        statistics
    }

    /// c(lambda) is computed only for a candidate that will be stored.
    fn offer(&self, store: &mut PartitionStore, candidate: PartitionRecord, statistics: &mut Statistics) {
        statistics.increment(Counters::Candidates);
        let n = candidate.size;

        if !store.would_accept(n, &candidate.dimension) {
            debug!(n, dimension = %candidate.dimension, "Not larger, keeping existing dimension");
            statistics.increment(Counters::Kept);
            return;
        }

        let c_lambda = numeric::compute(
            &candidate.dimension,
            n,
            self.config.precision,
            self.config.output_scale,
        );
        if c_lambda.is_undefined() {
            statistics.increment(Counters::Undefined);
        }
        let record = candidate.with_c_lambda(c_lambda);
        let previous = store.get(n).map(|existing| existing.dimension.to_string());

        match store.upsert(record) {
            UpsertOutcome::Inserted => {
                info!(n, "Adding new entry");
                statistics.increment(Counters::Inserted);
            }
            UpsertOutcome::Replaced => {
                info!(n, previous = previous.as_deref().unwrap_or_default(), "Found larger dimension");
                statistics.increment(Counters::Replaced);
            }
            UpsertOutcome::Kept => statistics.increment(Counters::Kept),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashu_int::UBig;

    fn candidate(size: u64, dimension: u64, parts: Vec<u32>) -> PartitionRecord {
        PartitionRecord::candidate(size, UBig::from(dimension), parts.into())
    }

    #[test]
    fn test_apply_ratchets() {
        let pipeline = UpdatePipeline::new(UpdaterConfig::default());
        let mut store = PartitionStore::new();
        let statistics = pipeline.apply(
            &mut store,
            vec![
                candidate(4, 2, vec![3, 1]),
                candidate(4, 3, vec![2, 1, 1]),
                candidate(4, 1, vec![4]),
            ],
        );

        assert_eq!(statistics.get(Counters::Candidates), 3);
        assert_eq!(statistics.get(Counters::Inserted), 1);
        assert_eq!(statistics.get(Counters::Replaced), 1);
        assert_eq!(statistics.get(Counters::Kept), 1);

        let stored = store.get(4).unwrap();
        assert_eq!(stored.dimension, UBig::from(3u8));
        assert_eq!(stored.partition.parts(), &[2, 1, 1]);
        assert!(stored.c_lambda.to_string().starts_with("0.245207313252931"));
    }

    #[test]
    fn test_kept_candidate_leaves_record_untouched() {
        let pipeline = UpdatePipeline::new(UpdaterConfig::default());
        let mut store = PartitionStore::new();
        pipeline.apply(&mut store, vec![candidate(5, 6, vec![3, 1, 1])]);
        let before = store.clone();
        pipeline.apply(&mut store, vec![candidate(5, 6, vec![2, 2, 1])]);
        assert_eq!(store, before);
    }

    #[test]
    fn test_output_scale_is_applied() {
        let config = UpdaterConfig {
            output_scale: 24,
            ..UpdaterConfig::default()
        };
        let mut store = PartitionStore::new();
        UpdatePipeline::new(config).apply(&mut store, vec![candidate(4, 3, vec![2, 1, 1])]);
        let value = store.get(4).unwrap().c_lambda.value().unwrap().clone();
        assert_eq!(value.scale(), 24);
    }
}
