//! Coalesce resolved intervals into contiguous display blocks.
//!
//! Sorts intervals by start time, then walks them keeping a current block that
//! absorbs every interval starting at or before its end. Adjacent intervals
//! (one ends exactly where the next starts) merge into one block.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::exceptions::ResolvedInterval;
use crate::model::SourceId;

/// A contiguous run of availability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeBlock {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Every row that contributed to this block, sorted and de-duplicated.
    pub source_ids: Vec<SourceId>,
    pub is_modified: bool,
}

impl TimeBlock {
    /// Whether `instant` lies in `[start, end)`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

impl From<&ResolvedInterval> for TimeBlock {
    fn from(interval: &ResolvedInterval) -> Self {
        TimeBlock {
            start: interval.start,
            end: interval.end,
            source_ids: vec![interval.source.clone()],
            is_modified: interval.is_modified,
        }
    }
}

/// Merge overlapping or touching intervals into sorted, non-overlapping blocks.
///
/// Zero-length intervals are dropped. The result does not depend on input order.
pub fn merge(intervals: &[ResolvedInterval]) -> Vec<TimeBlock> {
    merge_blocks(intervals.iter().map(TimeBlock::from).collect())
}

/// Same as [`merge`] but over blocks, so already-merged output can be fed back in.
pub fn merge_blocks(mut blocks: Vec<TimeBlock>) -> Vec<TimeBlock> {
    blocks.retain(|b| b.start < b.end);
    if blocks.is_empty() {
        return Vec::new();
    }

    // Sort by start time (then by end time for stability).
    blocks.sort_by_key(|b| (b.start, b.end));

    let mut merged: Vec<(TimeBlock, BTreeSet<SourceId>)> = Vec::new();
    for block in blocks {
        if let Some((last, sources)) = merged.last_mut() {
            if block.start <= last.end {
                // Overlapping or adjacent, extend the current block.
                last.end = last.end.max(block.end);
                last.is_modified |= block.is_modified;
                sources.extend(block.source_ids);
                continue;
            }
        }
        let sources = block.source_ids.iter().cloned().collect();
        merged.push((block, sources));
    }

    merged
        .into_iter()
        .map(|(mut block, sources)| {
            block.source_ids = sources.into_iter().collect();
            block
        })
        .collect()
}
