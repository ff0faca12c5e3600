// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `polyd area` and `polyd contains` commands.

use batch_planner::Batch;
use dispatch::DispatchConfig;
use geometry::{EdgeInclusion, FillType, Point2, Polygon};
use std::path::{Path, PathBuf};
use std::time::Instant;

pub fn area(config: &DispatchConfig, input: PathBuf, batch: bool) -> anyhow::Result<()> {
    let dispatcher = super::dispatcher(config)?;

    if batch {
        let items = super::plan::read_batch(&input)?;
        let mut batch = Batch::with_unit_size(&items, dispatcher.context().unit_size());
        let start = Instant::now();
        let areas = dispatcher.batch_area(&mut batch)?;
        let elapsed = start.elapsed();
        for (i, a) in areas.iter().enumerate() {
            println!("{i:>6}  {a}");
        }
        println!("{} polygons in {:.3} ms", areas.len(), elapsed.as_secs_f64() * 1e3);
        return Ok(());
    }

    let polygon = load_polygon(&input)?;
    let start = Instant::now();
    let area = dispatcher.polygon_area(&polygon)?;
    tracing::info!("area computed in {:?}", start.elapsed());
    println!("{area}");
    Ok(())
}

pub fn contains(
    config: &DispatchConfig,
    input: PathBuf,
    point: &str,
    fill: FillType,
    inclusion: EdgeInclusion,
) -> anyhow::Result<()> {
    let dispatcher = super::dispatcher(config)?;
    let polygon = load_polygon(&input)?;
    let point = parse_point(point)?;
    let inside = dispatcher.polygon_contains(&polygon, point, inclusion, fill)?;
    println!("{}", if inside { "inside" } else { "outside" });
    Ok(())
}

fn load_polygon(path: &Path) -> anyhow::Result<Polygon> {
    Polygon::from_file(path).map_err(|e| anyhow::anyhow!("failed to load polygon: {e}"))
}

/// Parses `"x,y"`.
fn parse_point(s: &str) -> anyhow::Result<Point2> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| anyhow::anyhow!("point must be 'x,y', got '{s}'"))?;
    Ok(Point2::new(x.trim().parse()?, y.trim().parse()?))
}
