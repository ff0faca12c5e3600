// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # polyd
//!
//! Command-line interface for predictor-driven polygon workloads.
//!
//! ## Usage
//! ```bash
//! # List the host and simulated accelerators
//! polyd devices
//!
//! # Ask the predictor which implementation wins at a given size
//! polyd choose --candidates area_host,area_device --size 250000
//!
//! # Partition a batch of polygons against a memory budget
//! polyd plan --input batch.json --budget 4K
//!
//! # Run workloads
//! polyd area --input polygon.json
//! polyd contains --input polygon.json --point 10,20 --fill non-zero
//! ```

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "polyd",
    about = "Dispatch polygon area and containment to the fastest compute device",
    version,
    author
)]
struct Cli {
    /// Path to a TOML dispatch configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the host profile and every accelerator the backend exposes.
    Devices,

    /// Evaluate the predictor for candidate algorithms on every device.
    Choose {
        /// Comma-separated algorithm names.
        #[arg(long, default_value = "area_host,area_device")]
        candidates: String,

        /// Problem size; repeat for extra dimensions.
        #[arg(short, long, required = true)]
        size: Vec<u64>,
    },

    /// Partition a batch of polygons so every subbatch fits a budget.
    Plan {
        /// JSON file holding a list of polygons.
        #[arg(short, long)]
        input: PathBuf,

        /// Memory budget (e.g., "4K", "1M").
        #[arg(short, long)]
        budget: String,

        /// Bytes per packed entry (defaults to the configured unit size).
        #[arg(long)]
        unit_size: Option<u64>,
    },

    /// Signed area of a polygon, or of every polygon with --batch.
    Area {
        /// JSON file holding a polygon (or a list of boundaries).
        #[arg(short, long)]
        input: PathBuf,

        /// Treat the input as independent polygons and report each area.
        #[arg(long)]
        batch: bool,
    },

    /// Whether a point lies inside a polygon.
    Contains {
        /// JSON file holding a polygon (or a list of boundaries).
        #[arg(short, long)]
        input: PathBuf,

        /// Query point as "x,y".
        #[arg(short, long, allow_hyphen_values = true)]
        point: String,

        #[arg(long, value_enum, default_value_t = Fill::EvenOdd)]
        fill: Fill,

        /// Whether points on the boundary count as inside.
        #[arg(long, value_enum, default_value_t = Edge::Inside)]
        edge: Edge,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Fill {
    EvenOdd,
    NonZero,
}

#[derive(Clone, Copy, ValueEnum)]
enum Edge {
    Inside,
    Outside,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Devices => commands::devices::execute(&config),
        Commands::Choose { candidates, size } => commands::choose::execute(&config, &candidates, &size),
        Commands::Plan {
            input,
            budget,
            unit_size,
        } => commands::plan::execute(&config, input, &budget, unit_size),
        Commands::Area { input, batch } => commands::run::area(&config, input, batch),
        Commands::Contains {
            input,
            point,
            fill,
            edge,
        } => {
            let fill = match fill {
                Fill::EvenOdd => geometry::FillType::EvenOdd,
                Fill::NonZero => geometry::FillType::NonZero,
            };
            let edge = match edge {
                Edge::Inside => geometry::EdgeInclusion::Inside,
                Edge::Outside => geometry::EdgeInclusion::Outside,
            };
            commands::run::contains(&config, input, &point, fill, edge)
        }
    }
}
