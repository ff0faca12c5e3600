// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

pub mod choose;
pub mod devices;
pub mod plan;
pub mod run;

use dispatch::{DispatchConfig, Dispatcher};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` overrides the `-v` level.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose >= 2)
        .init();
}

/// Reads the configuration file, or the defaults without one.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<DispatchConfig> {
    match path {
        Some(path) => DispatchConfig::from_file(path)
            .map_err(|e| anyhow::anyhow!("failed to load config '{}': {e}", path.display())),
        None => Ok(DispatchConfig::default()),
    }
}

pub fn dispatcher(config: &DispatchConfig) -> anyhow::Result<Dispatcher> {
    let context = config.build_context(config.build_backend())?;
    Ok(Dispatcher::new(context))
}

pub fn banner(title: &str) {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║{:^54}║", title);
    println!("╚══════════════════════════════════════════════════════╝");
    println!();
}
