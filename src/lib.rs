// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Maintains a persistent table of the largest known irreducible dimensions
//! of the symmetric group S_n.
//!
//! A heuristic search writes a plain-text log listing, for each size n, the
//! maximal dimension f(lambda) it found and the partition lambda achieving
//! it. This crate reads such a log and folds it into a keyed store that only
//! ever improves: an entry for n is replaced only by a strictly larger
//! dimension.
//!
//! For every stored entry the normalized statistic
//!
//! ```text
//! c(lambda) = -ln( f(lambda) / sqrt(n!) ) / sqrt(n)
//! ```
//!
//! is kept alongside. Dimensions grow like sqrt(n!), far beyond machine
//! integers, so they are held as exact big integers and c(lambda) is
//! evaluated in arbitrary-precision decimal arithmetic.
//!
//! # Architecture
//!
//! - [`parser`]: streaming reader that turns the log into candidate records.
//! - [`numeric`]: exact factorials and the c(lambda) computation.
//! - [`store`]: the ratcheting store and its strict on-disk layout, with a
//!   one-time importer for the legacy layout.
//! - [`pipeline`]: a run, from input log to saved store.
//! - [`config`], [`error`], [`statistics`]: ambient pieces shared by the above.
//!
//! # Example
//!
//! ```no_run
//! use partition_updater::{UpdatePipeline, UpdaterConfig};
//! use std::path::Path;
//!
//! let pipeline = UpdatePipeline::new(UpdaterConfig::default());
//! let summary = pipeline
//!     .run(Path::new("search.log"), Path::new("partitions.json"))
//!     .unwrap();
//! println!("{}", summary.statistics);
//! ```

pub mod config;
pub mod error;
pub mod numeric;
pub mod parser;
pub mod pipeline;
pub mod record;
pub mod statistics;
pub mod store;

// Re-export commonly used types
pub use config::{ParserLimits, UpdaterConfig, WorkingPrecision};
pub use error::{PipelineError, SchemaError, StoreError};
pub use numeric::fixed::{CLambda, FixedDecimal};
pub use parser::{MalformedBlock, RecordParser};
pub use pipeline::{RunSummary, UpdatePipeline};
pub use record::{Partition, PartitionRecord};
pub use store::{PartitionStore, UpsertOutcome};
