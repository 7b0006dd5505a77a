// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `mcx repack` command: load a container and write it back out.
//!
//! The output always has an aligned data section, whatever the input's
//! writer did.

use super::human_bytes;
use anyhow::Context;
use model_container::{save_items, ContainerConfig};
use std::path::PathBuf;

pub fn execute(config: &ContainerConfig, input: PathBuf, output: PathBuf) -> anyhow::Result<()> {
    let reader = config.build_reader();
    let mut items = Vec::new();
    let report = reader
        .load_items_from_file(&input, &mut items)
        .with_context(|| format!("failed to load container '{}'", input.display()))?;

    let written = save_items(&output, &items)
        .with_context(|| format!("failed to write '{}'", output.display()))?;

    println!(
        "  Repacked {} items: {} ({}) -> {} ({})",
        report.items,
        input.display(),
        human_bytes(report.bytes_consumed),
        output.display(),
        human_bytes(written),
    );
    Ok(())
}
