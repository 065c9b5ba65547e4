// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # stream-infer
//!
//! Command-line interface for the streaming batcher.
//!
//! ## Usage
//! ```bash
//! # Stream 100 synthetic timestamps through 4 instances sharing one throttle
//! stream-infer run --config ./engine.toml --timestamps 100 --instances 4
//!
//! # Validate a configuration against a model signature
//! stream-infer inspect --config ./engine.toml --signature ./model.json
//! ```

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "stream-infer",
    about = "Streaming batched inference with recurrent state threading",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream synthetic tensors through one or more engine instances.
    Run {
        /// Path to the engine TOML configuration.
        #[arg(short, long)]
        config: PathBuf,

        /// Path to a JSON model signature. Defaults to the configured tags.
        #[arg(short, long)]
        signature: Option<PathBuf>,

        /// Number of timestamps each instance receives.
        #[arg(short, long, default_value_t = 32)]
        timestamps: i64,

        /// Number of engine instances sharing the throttle.
        #[arg(short, long, default_value_t = 1)]
        instances: usize,

        /// Per-timestamp tensor shape (comma-separated, e.g. "2,3").
        #[arg(short, long, default_value = "4")]
        dims: String,

        /// Override the configured throttle ("unbounded" or a maximum).
        #[arg(long)]
        throttle: Option<String>,

        /// Simulated engine latency per run, in microseconds.
        #[arg(long, default_value_t = 500)]
        engine_delay_us: u64,
    },

    /// Validate a configuration and print the resolved port layout.
    Inspect {
        /// Path to the engine TOML configuration.
        #[arg(short, long)]
        config: PathBuf,

        /// Path to a JSON model signature. Defaults to the configured tags.
        #[arg(short, long)]
        signature: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            config,
            signature,
            timestamps,
            instances,
            dims,
            throttle,
            engine_delay_us,
        } => {
            let args = commands::run::RunArgs {
                config,
                signature,
                timestamps,
                instances,
                dims,
                throttle,
                engine_delay_us,
            };
            commands::run::execute(args).await
        }
        Commands::Inspect { config, signature } => {
            commands::inspect::execute(config, signature).await
        }
    }
}
