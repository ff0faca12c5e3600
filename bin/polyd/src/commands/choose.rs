// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `polyd choose` command: evaluate the predictor and report the winner.

use dispatch::DispatchConfig;

pub fn execute(config: &DispatchConfig, candidates: &str, size: &[u64]) -> anyhow::Result<()> {
    super::banner("polyd · Strategy Selection");
    let dispatcher = super::dispatcher(config)?;
    let selector = dispatcher.selector();

    let names: Vec<&str> = candidates
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    println!("  Problem size: {size:?}");
    println!();
    println!("  {:<20} {:<10} {:<40} {:>12}", "Algorithm", "Device", "Identifier", "Predicted s");
    println!("  {}", "-".repeat(86));
    for p in selector.predictions(&names, size)? {
        let predicted = p
            .predicted_seconds
            .map_or_else(|| "n/a".to_string(), |s| format!("{s:.3e}"));
        println!(
            "  {:<20} {:<10} {:<40} {:>12}",
            p.algorithm,
            p.device.to_string(),
            truncate(&p.device_identifier, 40),
            predicted
        );
    }
    println!();

    let strategy = selector.choose(&names, size)?;
    println!(
        "  Selected: {} on {} ({:.3e} s)",
        strategy.algorithm, strategy.device, strategy.predicted_seconds
    );
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max - 3).collect();
        format!("{cut}...")
    }
}
