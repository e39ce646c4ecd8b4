// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Run configuration.
//!
//! Every knob that affects a run is carried explicitly in [`UpdaterConfig`]
//! and handed to the components that need it. Nothing is held as
//! process-wide state: the working precision in particular is passed to
//! each computation.

use thiserror::Error;

/// Smallest number of fractional digits written for c(lambda).
pub const MIN_OUTPUT_SCALE: u32 = 16;

/// Default number of fractional digits written for c(lambda).
pub const DEFAULT_OUTPUT_SCALE: u32 = 20;

/// Smallest accepted working precision, in significant decimal digits.
pub const MIN_PRECISION_DIGITS: usize = 32;

/// Default working precision: 160 decimal digits, a little over 512 bits.
pub const DEFAULT_PRECISION_DIGITS: usize = 160;

/// Longest dimension digit run accepted from the input log (one 1 MiB line).
pub const DEFAULT_MAX_DIMENSION_DIGITS: usize = 1 << 20;

/// Longest partition accepted from the input log.
pub const DEFAULT_MAX_PARTITION_PARTS: usize = 1024;

/// Widest partition entry as written in a log, `4294967295, `.
const MAX_PART_WIDTH: usize = 12;

/// Room on a log line for its marker and trailing text.
const LINE_MARGIN: usize = 4096;

/// Number of significant decimal digits kept through the c(lambda) pipeline.
///
/// The value is fixed for a run. It does not grow with n: relative error of
/// the ratio f/sqrt(n!) stays near `10^-digits`, but the absolute error of its
/// logarithm grows with |ln ratio|, so very large n deserve a larger setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingPrecision(usize);

impl WorkingPrecision {
    /// Create a precision of `digits` significant decimal digits.
    pub const fn digits(digits: usize) -> Self {
        Self(digits)
    }

    /// Number of significant decimal digits.
    pub const fn get(self) -> usize {
        self.0
    }
}

impl Default for WorkingPrecision {
    fn default() -> Self {
        Self(DEFAULT_PRECISION_DIGITS)
    }
}

/// Bounds applied to each block of the input log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserLimits {
    /// Maximum length of the dimension digit run.
    pub max_dimension_digits: usize,
    /// Maximum number of parts in a partition.
    pub max_partition_parts: usize,
    /// Drop blocks whose partition does not sum to the block's size.
    pub require_partition_sum: bool,
}

impl ParserLimits {
    /// Longest input line held in memory.
    ///
    /// A line within both field limits always fits. The remainder of a longer
    /// line is skipped without being stored.
    pub fn max_line_bytes(&self) -> usize {
        self.max_dimension_digits
            .max(self.max_partition_parts.saturating_mul(MAX_PART_WIDTH))
            .saturating_add(LINE_MARGIN)
    }
}

impl Default for ParserLimits {
    fn default() -> Self {
        Self {
            max_dimension_digits: DEFAULT_MAX_DIMENSION_DIGITS,
            max_partition_parts: DEFAULT_MAX_PARTITION_PARTS,
            require_partition_sum: true,
        }
    }
}

/// Everything an [`UpdatePipeline`](crate::pipeline::UpdatePipeline) run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdaterConfig {
    /// Working precision of the c(lambda) computation.
    pub precision: WorkingPrecision,
    /// Fractional digits written for newly computed c(lambda) values.
    pub output_scale: u32,
    /// Input block limits.
    pub limits: ParserLimits,
    /// Read the store through the one-time legacy importer.
    pub import_legacy: bool,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            precision: WorkingPrecision::default(),
            output_scale: DEFAULT_OUTPUT_SCALE,
            limits: ParserLimits::default(),
            import_legacy: false,
        }
    }
}

/// A configuration value outside its accepted range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("output scale {0} is below the minimum of {} fractional digits", MIN_OUTPUT_SCALE)]
    ScaleTooSmall(u32),

    #[error("working precision of {0} digits is below the minimum of {}", MIN_PRECISION_DIGITS)]
    PrecisionTooSmall(usize),

    #[error("working precision of {precision} digits cannot carry {scale} fractional digits")]
    PrecisionBelowScale { precision: usize, scale: u32 },

    #[error("{0} limit must be greater than zero")]
    ZeroLimit(&'static str),
}

impl UpdaterConfig {
    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_scale < MIN_OUTPUT_SCALE {
            return Err(ConfigError::ScaleTooSmall(self.output_scale));
        }
        let precision = self.precision.get();
        if precision < MIN_PRECISION_DIGITS {
            return Err(ConfigError::PrecisionTooSmall(precision));
        }
        if precision <= self.output_scale as usize {
            return Err(ConfigError::PrecisionBelowScale {
                precision,
                scale: self.output_scale,
            });
        }
        if self.limits.max_dimension_digits == 0 {
            return Err(ConfigError::ZeroLimit("dimension digits"));
        }
        if self.limits.max_partition_parts == 0 {
            return Err(ConfigError::ZeroLimit("partition parts"));
        }
        Ok(())
    }
}
