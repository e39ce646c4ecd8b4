// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Reader for the heuristic search log.
//!
//! The log is plain text made of repeating blocks:
//!
//! ```text
//! --- Size <n> ---
//! ...
//! Max f^lambda: <digits>[ <trailing text>]
//! ...
//! Partitions achieving maximum: [<d1>, <d2>, ..., <dk>]
//! ```
//!
//! [`RecordParser`] walks the log one line at a time with a single open
//! block. A size header opens a block, the dimension line fills it, and the
//! partition line closes it, yielding one candidate [`PartitionRecord`] when
//! the block is complete. Other lines are ignored.
//!
//! Malformed blocks never stop the stream: each is reported once as a
//! [`MalformedBlock`] diagnostic, counted, and discarded. Only a failure to
//! read the underlying stream is returned as an error.
//!
//! At most [`ParserLimits::max_line_bytes`] of any line are held in memory.
//! The rest of a longer line is skipped, and a field cut short that way is
//! reported as too long.
//!
//! # Examples
//!
//! ```
//! use partition_updater::config::ParserLimits;
//! use partition_updater::parser::RecordParser;
//!
//! let log = "--- Size 4 ---\nMax f^lambda: 3\nPartitions achieving maximum: [2, 1, 1]\n";
//! let records: Vec<_> = RecordParser::new(log.as_bytes(), ParserLimits::default())
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].size, 4);
//! assert_eq!(records[0].dimension.to_string(), "3");
//! ```

pub mod errors;
pub mod partition;

pub use errors::MalformedBlock;

use partition::ListError;

use crate::config::ParserLimits;
use crate::record::{Partition, PartitionRecord};
use crate::statistics::Statistics;
use dashu_int::UBig;
use std::io::{self, BufRead, Read};
use tracing::{info, warn};

const SIZE_MARKER: &str = "--- Size ";
const DIMENSION_MARKER: &str = "Max f^lambda: ";
const PARTITION_MARKER: &str = "Partitions achieving maximum: ";

/// The block currently being read.
#[derive(Debug)]
struct OpenBlock {
    /// `None` when the header did not carry a positive size.
    size: Option<u64>,
    header_line: usize,
    /// The most recent dimension line, parsed.
    dimension: Option<Result<UBig, MalformedBlock>>,
}

impl OpenBlock {
    /// Diagnostic for a block abandoned before its partition line.
    fn abandoned(&self) -> MalformedBlock {
        match self.size {
            None => MalformedBlock::InvalidSize {
                line: self.header_line,
            },
            Some(size) if self.dimension.is_none() => MalformedBlock::MissingDimension { size },
            Some(size) => MalformedBlock::MissingPartition { size },
        }
    }

    /// Complete the block with the text following the partition marker.
    ///
    /// `truncated` is set when the end of the line was not read.
    fn close(
        self,
        list: &str,
        limits: &ParserLimits,
        truncated: bool,
    ) -> Result<PartitionRecord, MalformedBlock> {
        let size = self.size.ok_or(MalformedBlock::InvalidSize {
            line: self.header_line,
        })?;
        let dimension = self
            .dimension
            .unwrap_or(Err(MalformedBlock::MissingDimension { size }))?;

        let too_long = |parts: usize| MalformedBlock::PartitionTooLong {
            size,
            parts,
            max_allowed: limits.max_partition_parts,
        };
        let parts = match partition::parse_list(list, limits.max_partition_parts) {
            Ok(parts) => parts,
            Err(ListError::TooLong { parts }) => return Err(too_long(parts)),
            // The list ran past the line cap.
            Err(ListError::Malformed) if truncated => {
                return Err(too_long(list.split(',').count()));
            }
            Err(ListError::Malformed) => return Err(MalformedBlock::InvalidPartition { size }),
        };
        if parts.is_empty() {
            return Err(MalformedBlock::EmptyPartition { size });
        }

        let partition = Partition::new(parts);
        let total = partition.total();
        if limits.require_partition_sum && total != size {
            return Err(MalformedBlock::PartitionSumMismatch { size, total });
        }

        Ok(PartitionRecord::candidate(size, dimension, partition))
    }
}

/// Size from the text after the size marker: the first whitespace-separated token.
fn parse_size(text: &str) -> Option<u64> {
    text.split_whitespace()
        .next()?
        .parse::<u64>()
        .ok()
        .filter(|&size| size > 0)
}

/// Dimension from the text after the dimension marker.
///
/// The value runs up to the next whitespace, or to the end of the line when
/// nothing follows it. A value reaching the end of a `truncated` line is too
/// long whatever its visible length.
fn parse_dimension(
    text: &str,
    size: u64,
    limits: &ParserLimits,
    truncated: bool,
) -> Result<UBig, MalformedBlock> {
    let text = text.trim_start();
    let (digits, cut) = match text.find(char::is_whitespace) {
        Some(end) => (&text[..end], false),
        None => (text.trim_end(), truncated),
    };

    if cut || digits.len() > limits.max_dimension_digits {
        return Err(MalformedBlock::DimensionTooLong {
            size,
            digits: digits.len(),
            max_allowed: limits.max_dimension_digits,
        });
    }

    let invalid = || MalformedBlock::InvalidDimension {
        size,
        text: digits.to_string(),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let dimension = UBig::from_str_radix(digits, 10).map_err(|_| invalid())?;
    if dimension == UBig::ZERO {
        return Err(invalid());
    }
    Ok(dimension)
}

/// Read one line, keeping at most `limit` bytes of it in `buffer`.
///
/// Returns `None` at end of input, otherwise whether bytes of the line were
/// skipped.
fn read_bounded_line<R: BufRead>(
    reader: &mut R,
    buffer: &mut Vec<u8>,
    limit: usize,
) -> io::Result<Option<bool>> {
    let read = reader.by_ref().take(limit as u64).read_until(b'\n', buffer)?;
    if read == 0 {
        return Ok(None);
    }
    if read < limit || buffer.last() == Some(&b'\n') {
        return Ok(Some(false));
    }

    let mut skipped = 0;
    loop {
        let available = match reader.fill_buf() {
            Ok(available) => available,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error),
        };
        if available.is_empty() {
            break;
        }
        match available.iter().position(|&byte| byte == b'\n') {
            Some(end) => {
                skipped += end;
                reader.consume(end + 1);
                break;
            }
            None => {
                let length = available.len();
                skipped += length;
                reader.consume(length);
            }
        }
    }
    Ok(Some(skipped > 0))
}

/// Lazy, single-pass reader of candidate records.
///
/// Yields `Ok(record)` for each complete block and `Err` once if the
/// underlying reader fails, after which it yields nothing more.
pub struct RecordParser<R> {
    reader: R,
    limits: ParserLimits,
    buffer: Vec<u8>,
    line_number: usize,
    block: Option<OpenBlock>,
    statistics: Statistics,
    finished: bool,
}

impl<R: BufRead> RecordParser<R> {
    pub fn new(reader: R, limits: ParserLimits) -> Self {
        Self {
            reader,
            limits,
            buffer: Vec::new(),
            line_number: 0,
            block: None,
            statistics: Statistics::new(),
            finished: false,
        }
    }

    /// Dropped-block counts so far.
    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    fn drop_block(&mut self, failure: MalformedBlock) {
        warn!(line = self.line_number, "Dropping block: {}", failure);
        self.statistics.record_drop(&failure);
    }

    fn abandon_open_block(&mut self) {
        if let Some(block) = self.block.take() {
            self.drop_block(block.abandoned());
        }
    }

    fn consume_line(&mut self, line: &str, truncated: bool) -> Option<PartitionRecord> {
        if let Some(position) = line.find(SIZE_MARKER) {
            self.abandon_open_block();
            let size = parse_size(&line[position + SIZE_MARKER.len()..]);
            if let Some(n) = size {
                info!("Processing n={}", n);
            }
            self.block = Some(OpenBlock {
                size,
                header_line: self.line_number,
                dimension: None,
            });
            return None;
        }

        if let Some(position) = line.find(DIMENSION_MARKER) {
            let limits = self.limits;
            let block = self.block.as_mut()?;
            // A malformed header is reported when the block closes.
            let size = block.size.unwrap_or(0);
            block.dimension = Some(parse_dimension(
                &line[position + DIMENSION_MARKER.len()..],
                size,
                &limits,
                truncated,
            ));
            return None;
        }

        if let Some(position) = line.find(PARTITION_MARKER) {
            let block = self.block.take()?;
            return match block.close(&line[position + PARTITION_MARKER.len()..], &self.limits, truncated) {
                Ok(record) => Some(record),
                Err(failure) => {
                    self.drop_block(failure);
                    None
                }
            };
        }

        None
    }
}

impl<R: BufRead> Iterator for RecordParser<R> {
    type Item = io::Result<PartitionRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            self.buffer.clear();
            let limit = self.limits.max_line_bytes();
            match read_bounded_line(&mut self.reader, &mut self.buffer, limit) {
                Err(error) => {
                    self.finished = true;
                    return Some(Err(error));
                }
                Ok(None) => {
                    self.finished = true;
                    self.abandon_open_block();
                }
                Ok(Some(truncated)) => {
                    self.line_number += 1;
                    if truncated {
                        warn!(line = self.line_number, limit, "Line too long; reading only its start");
                    }
                    let buffer = std::mem::take(&mut self.buffer);
                    let record = self.consume_line(&String::from_utf8_lossy(&buffer), truncated);
                    self.buffer = buffer;
                    if record.is_some() {
                        return record.map(Ok);
                    }
                }
            }
        }
        None
    }
}
