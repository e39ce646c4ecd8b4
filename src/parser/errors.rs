// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Reasons an input block is dropped.

use std::fmt;
use strum_macros::EnumCount as EnumCountMacro;

/// A block of the input log that could not become a candidate record.
///
/// Each of these is local: the block is discarded, a diagnostic is logged,
/// and parsing resumes with the next block.
#[derive(Debug, Clone, PartialEq, Eq, EnumCountMacro)]
pub enum MalformedBlock {
    /// The size header did not carry a positive integer.
    InvalidSize { line: usize },

    /// The block was closed without a dimension line.
    MissingDimension { size: u64 },

    /// The dimension was not a positive base-10 integer.
    InvalidDimension { size: u64, text: String },

    /// The dimension digit run exceeded the configured maximum. `digits` is
    /// a lower bound when the line was too long to read whole.
    DimensionTooLong {
        size: u64,
        digits: usize,
        max_allowed: usize,
    },

    /// A new block (or the end of input) arrived before the partition line.
    MissingPartition { size: u64 },

    /// The partition list was not a bracketed list of positive integers.
    InvalidPartition { size: u64 },

    /// The partition list was empty.
    EmptyPartition { size: u64 },

    /// The partition had more parts than the configured maximum.
    PartitionTooLong {
        size: u64,
        parts: usize,
        max_allowed: usize,
    },

    /// The parts do not sum to the block's size.
    PartitionSumMismatch { size: u64, total: u64 },
}

impl MalformedBlock {
    /// Stable index of the variant, used to address per-kind counters.
    pub fn ordinal(&self) -> usize {
        match self {
            MalformedBlock::InvalidSize { .. } => 0,
            MalformedBlock::MissingDimension { .. } => 1,
            MalformedBlock::InvalidDimension { .. } => 2,
            MalformedBlock::DimensionTooLong { .. } => 3,
            MalformedBlock::MissingPartition { .. } => 4,
            MalformedBlock::InvalidPartition { .. } => 5,
            MalformedBlock::EmptyPartition { .. } => 6,
            MalformedBlock::PartitionTooLong { .. } => 7,
            MalformedBlock::PartitionSumMismatch { .. } => 8,
        }
    }

    /// Short label for the variant, used in run summaries.
    pub fn label(ordinal: usize) -> &'static str {
        match ordinal {
            0 => "invalid size",
            1 => "missing dimension",
            2 => "invalid dimension",
            3 => "dimension too long",
            4 => "missing partition",
            5 => "invalid partition",
            6 => "empty partition",
            7 => "partition too long",
            8 => "partition sum mismatch",
            _ => "unknown",
        }
    }
}

impl fmt::Display for MalformedBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedBlock::InvalidSize { line } => {
                write!(f, "Size header on line {} has no positive size", line)
            }
            MalformedBlock::MissingDimension { size } => {
                write!(f, "Block n={} has no Max f^lambda line", size)
            }
            MalformedBlock::InvalidDimension { size, text } => {
                // Dimensions can be enormous; quote only the start.
                let shown: String = text.chars().take(40).collect();
                let ellipsis = if shown.len() < text.len() { "..." } else { "" };
                write!(
                    f,
                    "Block n={} has invalid f^lambda value '{}{}'",
                    size, shown, ellipsis
                )
            }
            MalformedBlock::DimensionTooLong {
                size,
                digits,
                max_allowed,
            } => {
                write!(
                    f,
                    "Block n={} dimension has at least {} digits (max {})",
                    size, digits, max_allowed
                )
            }
            MalformedBlock::MissingPartition { size } => {
                write!(f, "Block n={} ended without a partition line", size)
            }
            MalformedBlock::InvalidPartition { size } => {
                write!(f, "Block n={} has a malformed partition list", size)
            }
            MalformedBlock::EmptyPartition { size } => {
                write!(f, "Block n={} has an empty partition list", size)
            }
            MalformedBlock::PartitionTooLong {
                size,
                parts,
                max_allowed,
            } => {
                write!(
                    f,
                    "Block n={} partition has at least {} parts (max {})",
                    size, parts, max_allowed
                )
            }
            MalformedBlock::PartitionSumMismatch { size, total } => {
                write!(f, "Block n={} partition sums to {}", size, total)
            }
        }
    }
}

impl std::error::Error for MalformedBlock {}
