// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `polyd plan` command: partition a batch against a memory budget.

use batch_planner::{Batch, MemoryBudget};
use dispatch::DispatchConfig;
use geometry::SimplePolygon;
use std::path::{Path, PathBuf};

pub fn execute(config: &DispatchConfig, input: PathBuf, budget: &str, unit_size: Option<u64>) -> anyhow::Result<()> {
    super::banner("polyd · Batch Planner");

    let items = read_batch(&input)?;
    let budget = MemoryBudget::parse(budget).map_err(|e| anyhow::anyhow!("invalid budget: {e}"))?;
    let unit_size = unit_size
        .or(config.unit_size)
        .unwrap_or(Batch::DEFAULT_UNIT_SIZE);
    let mut batch = Batch::with_unit_size(&items, unit_size);

    println!("  Batch:  {}", batch.summary());
    println!("  Budget: {budget} ({} bytes)", budget.as_bytes());
    println!();

    match batch.ensure_fit(budget.as_bytes()) {
        Ok(()) if !batch.is_partitioned() => {
            println!("  Fits without partitioning ({} bytes).", batch.footprint());
        }
        Ok(()) => {
            println!("  {:<6} {:>12} {:>10} {:>12}", "Group", "Items", "Vertices", "Bytes");
            println!("  {}", "-".repeat(44));
            for (i, s) in batch.subbatches().iter().enumerate() {
                println!(
                    "  {:<6} {:>12} {:>10} {:>12}",
                    i,
                    format!("{}..{}", s.range().start, s.range().end),
                    s.total_vertices(),
                    s.footprint_bytes()
                );
            }
        }
        Err(e) => println!("  Cannot partition: {e}"),
    }
    Ok(())
}

/// Reads a JSON list of polygons.
pub fn read_batch(path: &Path) -> anyhow::Result<Vec<SimplePolygon>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("cannot read '{}': {e}", path.display()))?;
    serde_json::from_str(&content).map_err(|e| anyhow::anyhow!("invalid batch '{}': {e}", path.display()))
}
