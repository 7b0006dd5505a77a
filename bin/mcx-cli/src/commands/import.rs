// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `mcx import` command: convert a SafeTensors file into a container.

use super::human_bytes;
use anyhow::Context;
use model_container::{convert::items_from_safetensors, save_items};
use std::path::PathBuf;

pub fn execute(input: PathBuf, output: PathBuf) -> anyhow::Result<()> {
    let bytes = std::fs::read(&input)
        .with_context(|| format!("failed to read '{}'", input.display()))?;
    let items = items_from_safetensors(&bytes)
        .with_context(|| format!("failed to convert '{}'", input.display()))?;

    let written = save_items(&output, &items)
        .with_context(|| format!("failed to write '{}'", output.display()))?;

    println!(
        "  Imported {} tensors from {} -> {} ({})",
        items.len(),
        input.display(),
        output.display(),
        human_bytes(written),
    );
    Ok(())
}
