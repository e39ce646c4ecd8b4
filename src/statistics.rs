// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Statistics
//!
//! Counters for a run: one per pipeline outcome, then one per kind of
//! dropped input block. The parser and the pipeline each keep their own
//! [`Statistics`] and the pipeline merges them at the end of a run.

use crate::parser::MalformedBlock;
use std::fmt;
use strum::EnumCount;
use strum_macros::EnumCount as EnumCountMacro;

#[derive(Debug, EnumCountMacro, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Counters {
    /// Well-formed candidate records read from the input.
    Candidates,
    /// Candidates stored under a previously absent key.
    Inserted,
    /// Candidates that displaced a smaller dimension.
    Replaced,
    /// Candidates not larger than the stored dimension.
    Kept,
    /// Stored records whose c(lambda) came out undefined.
    Undefined,
}

const COUNT: usize = Counters::COUNT + MalformedBlock::COUNT;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Statistics {
    stats: [u64; COUNT],
}

impl Statistics {
    pub fn new() -> Self {
        Statistics::default()
    }

    /// Increment the specified counter by 1.
    pub fn increment(&mut self, counter: Counters) {
        self.stats[counter as usize] += 1;
    }

    /// Count one dropped block of the given kind.
    pub fn record_drop(&mut self, failure: &MalformedBlock) {
        self.stats[Counters::COUNT + failure.ordinal()] += 1;
    }

    /// Get the current value of the specified counter.
    pub fn get(&self, counter: Counters) -> u64 {
        self.stats[counter as usize]
    }

    /// Dropped blocks of the kind with the given [`MalformedBlock::ordinal`].
    pub fn dropped(&self, ordinal: usize) -> u64 {
        self.stats[Counters::COUNT + ordinal]
    }

    /// Dropped blocks of every kind.
    pub fn total_dropped(&self) -> u64 {
        self.stats[Counters::COUNT..].iter().sum()
    }

    /// Add every counter of `other` into this one.
    pub fn merge(&mut self, other: &Statistics) {
        for (mine, theirs) in self.stats.iter_mut().zip(other.stats.iter()) {
            *mine += theirs;
        }
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} candidates: {} inserted, {} replaced, {} kept, {} undefined c(lambda); {} blocks dropped",
            self.get(Counters::Candidates),
            self.get(Counters::Inserted),
            self.get(Counters::Replaced),
            self.get(Counters::Kept),
            self.get(Counters::Undefined),
            self.total_dropped()
        )?;
        let mut first = true;
        for ordinal in 0..MalformedBlock::COUNT {
            let count = self.dropped(ordinal);
            if count > 0 {
                write!(
                    f,
                    "{}{} {}",
                    if first { " (" } else { ", " },
                    count,
                    MalformedBlock::label(ordinal)
                )?;
                first = false;
            }
        }
        if !first {
            write!(f, ")")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let stats = Statistics::new();
        assert_eq!(stats.get(Counters::Inserted), 0);
        assert_eq!(stats.total_dropped(), 0);
    }

    #[test]
    fn test_drops_are_counted_per_kind() {
        let mut stats = Statistics::new();
        stats.record_drop(&MalformedBlock::MissingDimension { size: 3 });
        stats.record_drop(&MalformedBlock::MissingDimension { size: 4 });
        stats.record_drop(&MalformedBlock::EmptyPartition { size: 4 });
        assert_eq!(stats.dropped(1), 2);
        assert_eq!(stats.dropped(6), 1);
        assert_eq!(stats.total_dropped(), 3);
        // Outcome counters are unaffected.
        assert_eq!(stats.get(Counters::Candidates), 0);
    }

    #[test]
    fn test_merge() {
        let mut left = Statistics::new();
        left.increment(Counters::Kept);
        let mut right = Statistics::new();
        right.increment(Counters::Kept);
        right.record_drop(&MalformedBlock::InvalidSize { line: 7 });
        left.merge(&right);
        assert_eq!(left.get(Counters::Kept), 2);
        assert_eq!(left.total_dropped(), 1);
    }

    #[test]
    fn test_display() {
        let mut stats = Statistics::new();
        stats.increment(Counters::Candidates);
        stats.increment(Counters::Inserted);
        stats.record_drop(&MalformedBlock::MissingDimension { size: 3 });
        assert_eq!(
            stats.to_string(),
            "1 candidates: 1 inserted, 0 replaced, 0 kept, 0 undefined c(lambda); 1 blocks dropped (1 missing dimension)"
        );
    }
}
