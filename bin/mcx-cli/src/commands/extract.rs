// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `mcx extract` command: dump one item's bytes to a file.

use super::human_bytes;
use anyhow::Context;
use model_container::{get_item_from_file, ContainerConfig, Item, MappedContainer};
use std::path::{Path, PathBuf};

pub fn execute(
    config: &ContainerConfig,
    model: PathBuf,
    name: String,
    output: PathBuf,
) -> anyhow::Result<()> {
    let reader = config.build_reader();
    let load_err = || format!("failed to load container '{}'", model.display());

    if config.mapped {
        let container = MappedContainer::open(&model).with_context(load_err)?;
        let item = container.get_item(&reader, &name).with_context(load_err)?;
        write_item(&item, &name, &model, &output)
    } else {
        let item = get_item_from_file(&reader, &model, &name).with_context(load_err)?;
        write_item(&item, &name, &model, &output)
    }
}

fn write_item(item: &Item<'_>, name: &str, model: &Path, output: &Path) -> anyhow::Result<()> {
    if item.is_empty() {
        anyhow::bail!("no item named '{name}' in '{}'", model.display());
    }
    std::fs::write(output, item.bytes())
        .with_context(|| format!("failed to write '{}'", output.display()))?;

    println!(
        "  {name}: {} {} -> {} ({})",
        item.element_type,
        item.shape,
        output.display(),
        human_bytes(item.bytes().len() as u64),
    );
    Ok(())
}
