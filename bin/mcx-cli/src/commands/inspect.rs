// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `mcx inspect` command: list the items of a container.
//!
//! Items are loaded through the configured reader, so quantized embeddings
//! show up already dequantized to `float32`.

use super::human_bytes;
use anyhow::Context;
use model_container::{ContainerConfig, Item, LoadReport, MappedContainer};
use std::path::{Path, PathBuf};

/// One row of the listing.
#[derive(Debug, serde::Serialize)]
struct ItemSummary {
    name: String,
    element_type: String,
    shape: Vec<usize>,
    /// `None` when the element count does not fit in `usize`.
    elements: Option<usize>,
    bytes: usize,
    mapped: bool,
}

impl ItemSummary {
    fn from_item(item: &Item<'_>) -> Self {
        Self {
            name: item.name.clone(),
            element_type: item.element_type.to_string(),
            shape: item.shape.dims().to_vec(),
            elements: item.shape.checked_num_elements().ok(),
            bytes: item.bytes().len(),
            mapped: item.is_mapped(),
        }
    }
}

#[derive(Debug, serde::Serialize)]
struct Listing<'p> {
    path: &'p Path,
    report: LoadReport,
    items: Vec<ItemSummary>,
}

pub fn execute(config: &ContainerConfig, model: PathBuf, json: bool) -> anyhow::Result<()> {
    let reader = config.build_reader();
    let load_err = || format!("failed to load container '{}'", model.display());

    let listing = if config.mapped {
        let container = MappedContainer::open(&model).with_context(load_err)?;
        let mut items = Vec::new();
        let report = container.load(&reader, &mut items).with_context(load_err)?;
        listing(&model, report, &items)
    } else {
        let mut items = Vec::new();
        let report = reader
            .load_items_from_file(&model, &mut items)
            .with_context(load_err)?;
        listing(&model, report, &items)
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
    } else {
        print_table(&listing);
    }
    Ok(())
}

fn listing<'p>(path: &'p Path, report: LoadReport, items: &[Item<'_>]) -> Listing<'p> {
    Listing {
        path,
        report,
        items: items.iter().map(ItemSummary::from_item).collect(),
    }
}

fn print_table(listing: &Listing<'_>) {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║               mcx · Container Inspector              ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    // ── Summary ────────────────────────────────────────────────
    let data: usize = listing.items.iter().map(|i| i.bytes).sum();
    println!("  File: {}", listing.path.display());
    println!("  Items: {}", listing.report.items);
    println!("  Data: {}", human_bytes(data as u64));
    println!("  Read: {}", human_bytes(listing.report.bytes_consumed));
    println!();

    // ── Items ──────────────────────────────────────────────────
    println!(
        "  {:<4} {:<36} {:<20} {:<18} {:>14} {:>12}",
        "Idx", "Name", "Type", "Shape", "Elements", "Size",
    );
    println!("  {}", "-".repeat(109));
    for (idx, item) in listing.items.iter().enumerate() {
        println!(
            "  {:<4} {:<36} {:<20} {:<18} {:>14} {:>12}",
            idx,
            truncate(&item.name, 36),
            item.element_type,
            format!("{:?}", item.shape),
            item.elements.map_or_else(|| "overflow".to_string(), |n| n.to_string()),
            human_bytes(item.bytes as u64),
        );
    }
    println!();
}

/// Truncates a string to `max_len` characters with ellipsis if needed.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{head}...")
    }
}
