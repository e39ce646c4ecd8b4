// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The one record shape handled by this crate.
//!
//! A [`PartitionRecord`] pairs a size n with the largest known irreducible
//! dimension f(lambda), the partition lambda achieving it, and the derived
//! statistic c(lambda).

use crate::numeric::fixed::CLambda;
use dashu_int::UBig;
use std::fmt;

/// An integer partition, parts kept in the order they were given.
///
/// # Examples
///
/// ```
/// use partition_updater::record::Partition;
///
/// let lambda = Partition::new(vec![2, 1, 1]);
/// assert_eq!(lambda.total(), 4);
/// assert_eq!(format!("{}", lambda), "[2, 1, 1]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Partition(Vec<u32>);

impl Partition {
    pub fn new(parts: Vec<u32>) -> Self {
        Self(parts)
    }

    pub fn parts(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of the parts, i.e. the n this partition divides.
    pub fn total(&self) -> u64 {
        self.0.iter().map(|&part| u64::from(part)).sum()
    }
}

impl From<Vec<u32>> for Partition {
    fn from(parts: Vec<u32>) -> Self {
        Self(parts)
    }
}

impl fmt::Display for Partition {
    /// Format as "[d1, d2, ..., dk]".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", part)?;
        }
        write!(f, "]")
    }
}

/// Best known dimension for one size n.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionRecord {
    /// The size n; also the store key.
    pub size: u64,
    /// f(lambda), always positive.
    pub dimension: UBig,
    /// lambda, verbatim.
    pub partition: Partition,
    /// c(lambda), or the undefined sentinel.
    pub c_lambda: CLambda,
}

impl PartitionRecord {
    /// A record whose c(lambda) has not been computed yet.
    ///
    /// Parsed candidates start like this; the pipeline fills in the statistic
    /// only for candidates that will actually be stored.
    pub fn candidate(size: u64, dimension: UBig, partition: Partition) -> Self {
        Self {
            size,
            dimension,
            partition,
            c_lambda: CLambda::Undefined,
        }
    }

    /// Replace the statistic, keeping everything else.
    pub fn with_c_lambda(mut self, c_lambda: CLambda) -> Self {
        self.c_lambda = c_lambda;
        self
    }
}
