// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Memory-bounded batches of polygons.
//!
//! A [`Batch`] borrows a caller-owned slice of polygons and optionally
//! carries a partition into contiguous [`Subbatch`]es, each of which fits a
//! memory budget. The partition is one level deep.
//!
//! # Memory Model
//!
//! Every polygon is uploaded as its vertices followed by one pivot entry,
//! so its footprint is:
//!
//! ```text
//! footprint(item) = (vertex_count + 1) * unit_size
//! ```
//!
//! # States
//!
//! ```text
//!                ensure_fit (does not fit)
//!  UNPARTITIONED ─────────────────────────▶ PARTITIONED
//!        ▲                                      │
//!        └──────────────────────────────────────┘
//!          ensure_fit (whole batch fits) or BatchTooLarge
//! ```

use crate::BatchTooLarge;
use geometry::{Point2, SimplePolygon};
use std::ops::Range;

/// A contiguous run of a batch's items that fits the budget it was planned
/// for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Subbatch {
    start: usize,
    end: usize,
    total_vertices: usize,
    footprint_bytes: u64,
}

impl Subbatch {
    /// Item indices covered, into the parent batch.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn total_vertices(&self) -> usize {
        self.total_vertices
    }

    pub fn footprint_bytes(&self) -> u64 {
        self.footprint_bytes
    }
}

/// An ordered view over polygons with an optional memory-bounded partition.
#[derive(Debug, Clone)]
pub struct Batch<'a> {
    items: &'a [SimplePolygon],
    unit_size: u64,
    total_vertices: usize,
    partition: Option<Vec<Subbatch>>,
}

impl<'a> Batch<'a> {
    /// Bytes per uploaded entry unless overridden.
    pub const DEFAULT_UNIT_SIZE: u64 = Point2::BYTES as u64;

    pub fn new(items: &'a [SimplePolygon]) -> Self {
        Self::with_unit_size(items, Self::DEFAULT_UNIT_SIZE)
    }

    pub fn with_unit_size(items: &'a [SimplePolygon], unit_size: u64) -> Self {
        Self {
            items,
            unit_size,
            total_vertices: items.iter().map(SimplePolygon::len).sum(),
            partition: None,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &'a [SimplePolygon] {
        self.items
    }

    pub fn unit_size(&self) -> u64 {
        self.unit_size
    }

    pub fn total_vertices(&self) -> usize {
        self.total_vertices
    }

    /// Footprint of one item, pivot included.
    pub fn item_footprint(&self, item: &SimplePolygon) -> u64 {
        (item.len() as u64 + 1).saturating_mul(self.unit_size)
    }

    /// Footprint of the whole batch.
    pub fn footprint(&self) -> u64 {
        (self.total_vertices as u64 + self.items.len() as u64).saturating_mul(self.unit_size)
    }

    /// Predictor problem size: `[count, average vertices per item]`.
    pub fn problem_size(&self) -> [u64; 2] {
        let count = self.items.len() as u64;
        let average = if count == 0 {
            0
        } else {
            self.total_vertices as u64 / count
        };
        [count, average]
    }

    pub fn is_partitioned(&self) -> bool {
        self.partition.is_some()
    }

    /// The current partition; empty when unpartitioned.
    pub fn subbatches(&self) -> &[Subbatch] {
        self.partition.as_deref().unwrap_or(&[])
    }

    /// Items covered by `subbatch`.
    pub fn items_of(&self, subbatch: &Subbatch) -> &'a [SimplePolygon] {
        &self.items[subbatch.range()]
    }

    /// Makes the batch fit `max_memory`, partitioning it if needed.
    ///
    /// - If the whole batch fits, any partition is dropped.
    /// - If the existing partition already fits, nothing changes.
    /// - Otherwise items are regrouped greedily in order: a group is closed
    ///   when the next item would push it past `max_memory`.
    ///
    /// Fails if one item alone exceeds `max_memory`; the batch is then left
    /// unpartitioned.
    pub fn ensure_fit(&mut self, max_memory: u64) -> Result<(), BatchTooLarge> {
        if self.footprint() <= max_memory {
            if self.partition.take().is_some() {
                tracing::debug!("batch of {} items fits {max_memory} bytes, partition dropped", self.len());
            }
            return Ok(());
        }

        if let Some(current) = &self.partition {
            if current.iter().all(|s| s.footprint_bytes <= max_memory) {
                return Ok(());
            }
        }

        let mut groups = Vec::new();
        let mut open: Option<Subbatch> = None;

        for (index, item) in self.items.iter().enumerate() {
            let bytes = self.item_footprint(item);
            if bytes > max_memory {
                self.partition = None;
                tracing::warn!("item {index} needs {bytes} bytes, over the {max_memory} byte budget");
                return Err(BatchTooLarge {
                    item_index: index,
                    item_bytes: bytes,
                    max_memory,
                });
            }

            match open.as_mut() {
                Some(group)
                    if group
                        .footprint_bytes
                        .checked_add(bytes)
                        .is_some_and(|total| total <= max_memory) =>
                {
                    group.end = index + 1;
                    group.total_vertices += item.len();
                    group.footprint_bytes = group.footprint_bytes.saturating_add(bytes);
                }
                _ => {
                    groups.extend(open.take());
                    open = Some(Subbatch {
                        start: index,
                        end: index + 1,
                        total_vertices: item.len(),
                        footprint_bytes: bytes,
                    });
                }
            }
        }
        groups.extend(open);

        tracing::info!(
            "partitioned {} items ({} bytes) into {} subbatches of at most {max_memory} bytes",
            self.len(),
            self.footprint(),
            groups.len()
        );
        self.partition = Some(groups);
        Ok(())
    }

    /// One-line summary.
    pub fn summary(&self) -> String {
        let partition = match &self.partition {
            Some(subs) => format!("{} subbatches", subs.len()),
            None => "unpartitioned".to_string(),
        };
        format!(
            "{} items, {} vertices, {} bytes, {partition}",
            self.len(),
            self.total_vertices,
            self.footprint()
        )
    }
}
