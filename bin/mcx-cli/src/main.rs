// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # mcx
//!
//! Command-line tooling for model containers.
//!
//! ## Usage
//! ```bash
//! # List items, types, shapes and sizes
//! mcx inspect --model model.bin
//!
//! # Same, as JSON
//! mcx inspect --model model.bin --json
//!
//! # Dump the raw bytes of one item
//! mcx extract --model model.bin --name encoder_Wemb --output wemb.raw
//!
//! # Convert a SafeTensors file
//! mcx import --input model.safetensors --output model.bin
//!
//! # Rewrite a container with the current writer
//! mcx repack --input legacy.bin --output model.bin
//! ```

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "mcx",
    about = "Inspect, convert and rewrite aligned model containers",
    version,
    author
)]
struct Cli {
    /// Path to a TOML loader configuration file.
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
    /// Print every item with its type, shape and size.
    Inspect {
        /// Path to the container.
        #[arg(short, long)]
        model: PathBuf,

        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Write the bytes of one item to a file.
    Extract {
        /// Path to the container.
        #[arg(short, long)]
        model: PathBuf,

        /// Name of the item to extract.
        #[arg(short, long)]
        name: String,

        /// Destination file for the raw bytes.
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Convert a SafeTensors file into a container.
    Import {
        /// Path to the SafeTensors file.
        #[arg(short, long)]
        input: PathBuf,

        /// Path of the container to write.
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Load a container and save it again (realigns legacy files).
    ///
    /// Quantized embeddings are written back dequantized.
    Repack {
        /// Path to the source container.
        #[arg(short, long)]
        input: PathBuf,

        /// Path of the container to write.
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging based on verbosity.
    commands::init_tracing(cli.verbose);
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Inspect { model, json } => commands::inspect::execute(&config, model, json),
        Commands::Extract {
            model,
            name,
            output,
        } => commands::extract::execute(&config, model, name, output),
        Commands::Import { input, output } => commands::import::execute(input, output),
        Commands::Repack { input, output } => commands::repack::execute(&config, input, output),
    }
}
