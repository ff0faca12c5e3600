// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Example: Sweep problem sizes and show which strategy the predictor picks.
//!
//! Uses the embedded benchmark corpus and a simulated GeForce GTX 560, then
//! runs one large polygon through the chosen path and checks it against the
//! host result.
//!
//! ```bash
//! cargo run -p dispatch --example strategy_sweep
//! ```

use dispatch::{DispatchConfig, Dispatcher};
use geometry::{Point2, SimplePolygon};

const SIZES: [u64; 7] = [10, 1_000, 10_000, 50_000, 100_000, 1_000_000, 10_000_000];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("warn").init();

    let config = DispatchConfig::default();
    let context = config.build_context(config.build_backend())?;
    let dispatcher = Dispatcher::new(context);
    let selector = dispatcher.selector();
    println!("Corpus: {}\n", dispatcher.context().corpus().summary());

    for candidates in [
        ["area_host", "area_device"],
        ["contains_host", "contains_device"],
        ["batch_area_host", "batch_area_device"],
    ] {
        println!("{:<12} {:<20} {:<12} {:>14}", "Size", "Algorithm", "Device", "Predicted s");
        println!("{}", "-".repeat(62));
        for size in SIZES {
            match selector.choose(&candidates, &[size]) {
                Ok(s) => println!(
                    "{:<12} {:<20} {:<12} {:>14.3e}",
                    size,
                    s.algorithm,
                    s.device.to_string(),
                    s.predicted_seconds
                ),
                Err(e) => println!("{size:<12} FAIL: {e}"),
            }
        }
        println!();
    }

    println!("--- Area of a 200 000-vertex polygon ---\n");
    let polygon: SimplePolygon = (0..200_000)
        .map(|i| {
            let angle = i as f64 / 200_000.0 * std::f64::consts::TAU;
            Point2::new((50_000.0 * angle.cos()) as i32, (50_000.0 * angle.sin()) as i32)
        })
        .collect();
    let dispatched = dispatcher.area(&polygon)?;
    println!("dispatched: {dispatched}");
    println!("host:       {}", polygon.area());
    assert_eq!(dispatched, polygon.area());

    Ok(())
}
