// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `polyd devices` command: show the captured device profiles.

use device_profile::DeviceProfile;
use dispatch::DispatchConfig;

pub fn execute(config: &DispatchConfig) -> anyhow::Result<()> {
    super::banner("polyd · Compute Devices");
    let dispatcher = super::dispatcher(config)?;
    let context = dispatcher.context();

    // ── Host ───────────────────────────────────────────────────
    println!("  Host");
    print_profile(context.host_profile());
    println!();

    // ── Accelerators ───────────────────────────────────────────
    let accelerators = context.accelerators()?;
    println!("  Accelerators ({} on '{}' backend)", accelerators.len(), context.backend().name());
    for entry in accelerators.iter() {
        println!("   [{}]", entry.id);
        print_profile(&entry.profile);
    }
    println!();

    // ── Corpus ─────────────────────────────────────────────────
    println!("  Corpus");
    println!("   {}", context.corpus().summary());
    for algorithm in context.corpus().algorithms() {
        println!("   - {algorithm}");
    }

    Ok(())
}

fn print_profile(p: &DeviceProfile) {
    println!("   Identifier:     {}", p.identifier);
    println!("   Class:          {:?}", p.device_class);
    println!("   Compute units:  {}", p.compute_unit_count);
    println!("   Items per unit: {}", p.max_items_per_unit);
    println!("   Clock:          {} MHz", p.clock_mhz);
    if p.has_unbounded_memory() {
        println!("   Global memory:  unbounded");
    } else {
        println!("   Global memory:  {:.1} MB", p.global_memory_bytes as f64 / (1024.0 * 1024.0));
    }
    println!("   Local memory:   {:.1} KB", p.local_memory_bytes as f64 / 1024.0);
}
