// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: save → load → lookup through the public API.
//!
//! These tests go through real files (via `tempfile`) and hand-built
//! buffers, covering the paths a model loader takes at startup.

use model_container::{
    get_item, get_item_from_file, load_items, load_items_from_file, save_items, ContainerConfig,
    ContainerError, ContainerReader, ContainerWriter, Item, MappedContainer, DATA_ALIGNMENT,
};
use tensor_core::{ElementType, Shape};

// ── Helpers ────────────────────────────────────────────────────

fn f32_item(name: &str, dims: Vec<usize>) -> Item<'static> {
    let shape = Shape::new(dims);
    let bytes = (0..shape.num_elements())
        .flat_map(|i| (i as f32 * 0.5).to_le_bytes())
        .collect();
    Item::owned(name, ElementType::Float32, shape, bytes)
}

fn small_model() -> Vec<Item<'static>> {
    vec![
        f32_item("encoder_l1_self_Wq", vec![4, 4]),
        f32_item("encoder_l1_self_bq", vec![1, 4]),
        Item::owned("special:model.yml", ElementType::Int8, Shape::vector(5), b"a: 1\n".to_vec()),
        Item::owned("steps", ElementType::Uint64, Shape::scalar(), 42u64.to_le_bytes().to_vec()),
    ]
}

/// Byte offset of the data section, recomputed from the headers.
fn data_start(buf: &[u8]) -> usize {
    let word = |at: usize| u64::from_le_bytes(buf[at..at + 8].try_into().unwrap()) as usize;
    let count = word(8);
    let mut pos = 16;
    let mut names = 0;
    let mut shapes = 0;
    for i in 0..count {
        names += word(16 + i * 32);
        shapes += word(16 + i * 32 + 16) * 4;
    }
    pos += count * 32 + names + shapes;
    pos + 8 + word(pos)
}

// ── File Round Trip ────────────────────────────────────────────

#[test]
fn test_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.bin");
    let items = small_model();

    let written = save_items(&path, &items).unwrap();
    assert_eq!(written, std::fs::metadata(&path).unwrap().len());

    let mut loaded = Vec::new();
    let report = load_items_from_file(&path, &mut loaded).unwrap();
    assert_eq!(report.items, items.len());
    assert_eq!(report.bytes_consumed, written);
    assert_eq!(loaded, items);
    assert!(loaded.iter().all(|i| !i.is_mapped()));
}

#[test]
fn test_single_float_matrix_layout() {
    let item = Item::owned("W", ElementType::Float32, Shape::matrix(2, 3), vec![0u8; 24]);
    let mut buf = Vec::new();
    ContainerWriter::new().write_to(&mut buf, &[item.clone()]).unwrap();

    // version + count + header + "W\0" + two i32 dims + offset.
    let metadata = 8 + 8 + 32 + 2 + 8 + 8;
    assert!(metadata <= 256);
    assert_eq!(data_start(&buf), 256);
    assert_eq!(buf.len(), 256 + 24);

    let mut loaded = Vec::new();
    load_items(&buf, &mut loaded, false).unwrap();
    assert_eq!(loaded, vec![item]);
}

#[test]
fn test_data_section_is_aligned() {
    for n in 0..12 {
        let items: Vec<_> = (0..n).map(|i| f32_item(&"x".repeat(i + 1), vec![i + 1])).collect();
        let mut buf = Vec::new();
        ContainerWriter::new().write_to(&mut buf, &items).unwrap();
        assert_eq!(data_start(&buf) as u64 % DATA_ALIGNMENT, 0, "{n} items");
    }
}

#[test]
fn test_save_overwrites_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.bin");
    save_items(&path, &small_model()).unwrap();
    save_items(&path, &[f32_item("only", vec![2])]).unwrap();

    let mut loaded = Vec::new();
    load_items_from_file(&path, &mut loaded).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].name, "only");
}

// ── Quantization Dispatch ──────────────────────────────────────

#[test]
fn test_encoder_wemb_retyped_to_float32() {
    let mut payload: Vec<u8> = (1..=8i8).map(|v| v as u8).collect();
    payload.extend_from_slice(&4.0f32.to_le_bytes());
    let items = vec![Item::owned(
        "encoder_Wemb",
        ElementType::Intgemm8,
        Shape::matrix(2, 4),
        payload,
    )];

    let mut buf = Vec::new();
    ContainerWriter::new().write_to(&mut buf, &items).unwrap();

    let mut loaded = Vec::new();
    load_items(&buf, &mut loaded, false).unwrap();
    let wemb = &loaded[0];
    assert_eq!(wemb.element_type, ElementType::Float32);
    assert_eq!(wemb.bytes().len(), 4 * 8);
    let last = f32::from_le_bytes(wemb.bytes()[28..32].try_into().unwrap());
    assert_eq!(last, 2.0);
}

#[test]
fn test_configured_embedding_pattern() {
    let mut payload = vec![10u8, 20];
    payload.extend_from_slice(&10.0f32.to_le_bytes());
    let items = vec![Item::owned("tok_emb", ElementType::Intgemm8Avx512, Shape::vector(2), payload)];
    let mut buf = Vec::new();
    ContainerWriter::new().write_to(&mut buf, &items).unwrap();

    // The default pattern leaves the item quantized.
    let mut loaded = Vec::new();
    load_items(&buf, &mut loaded, false).unwrap();
    assert_eq!(loaded[0].element_type, ElementType::Intgemm8Avx512);

    let config = ContainerConfig::from_toml("embedding_pattern = \"emb\"").unwrap();
    let mut loaded = Vec::new();
    config.build_reader().load_items(&buf, &mut loaded, config.mapped).unwrap();
    assert_eq!(loaded[0].element_type, ElementType::Float32);
    assert_eq!(
        loaded[0].bytes().to_vec(),
        [1.0f32.to_le_bytes(), 2.0f32.to_le_bytes()].concat()
    );
}

// ── Reload And Lookup ──────────────────────────────────────────

#[test]
fn test_reload_into_populated_list_is_noop() {
    let mut buf = Vec::new();
    ContainerWriter::new().write_to(&mut buf, &small_model()).unwrap();

    let mut loaded = Vec::new();
    load_items(&buf, &mut loaded, true).unwrap();
    let before = loaded.clone();
    let report = load_items(&buf, &mut loaded, true).unwrap();
    assert!(report.skipped);
    assert_eq!(loaded, before);
}

#[test]
fn test_lookup_miss_is_sentinel() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.bin");
    save_items(&path, &small_model()).unwrap();

    let reader = ContainerReader::new();
    let item = get_item_from_file(&reader, &path, "doesNotExist").unwrap();
    assert!(item.is_empty());
    assert_eq!(item, Item::empty());

    let hit = get_item_from_file(&reader, &path, "steps").unwrap();
    assert_eq!(hit.bytes(), &42u64.to_le_bytes());
}

#[test]
fn test_mapped_container() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.bin");
    let items = small_model();
    save_items(&path, &items).unwrap();

    let container = MappedContainer::open(&path).unwrap();
    let reader = ContainerReader::new();
    let mut loaded = Vec::new();
    container.load(&reader, &mut loaded).unwrap();
    assert_eq!(loaded, items);
    assert!(loaded.iter().all(Item::is_mapped));

    let bq = container.get_item(&reader, "encoder_l1_self_bq").unwrap();
    assert_eq!(bq.shape, Shape::matrix(1, 4));
}

// ── Legacy And Malformed Input ─────────────────────────────────

#[test]
fn test_unaligned_legacy_container_loads() {
    // A container whose writer skipped alignment: offset = 0.
    let mut buf = Vec::new();
    buf.extend_from_slice(&1u64.to_le_bytes());
    buf.extend_from_slice(&1u64.to_le_bytes());
    for word in [2u64, ElementType::Float32.tag(), 1, 4] {
        buf.extend_from_slice(&word.to_le_bytes());
    }
    buf.extend_from_slice(b"a\0");
    buf.extend_from_slice(&1i32.to_le_bytes());
    buf.extend_from_slice(&0u64.to_le_bytes());
    buf.extend_from_slice(&3.5f32.to_le_bytes());

    let item = get_item(&ContainerReader::new(), &buf, "a").unwrap();
    assert_eq!(item.element_type, ElementType::Float32);
    assert_eq!(item.shape, Shape::vector(1));
    assert_eq!(item.bytes(), &3.5f32.to_le_bytes());
}

#[test]
fn test_truncated_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.bin");
    save_items(&path, &small_model()).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..bytes.len() - 1]).unwrap();

    let mut loaded = Vec::new();
    let err = load_items_from_file(&path, &mut loaded).unwrap_err();
    assert!(matches!(err, ContainerError::TruncatedInput { .. }));
    assert!(loaded.is_empty());
}

#[test]
fn test_wrong_version_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.bin");
    save_items(&path, &small_model()).unwrap();
    let mut bytes = std::fs::read(&path).unwrap();
    bytes[..8].copy_from_slice(&0u64.to_le_bytes());
    std::fs::write(&path, &bytes).unwrap();

    let mut loaded = Vec::new();
    let err = load_items_from_file(&path, &mut loaded).unwrap_err();
    assert!(matches!(err, ContainerError::VersionMismatch { found: 0, .. }));
}
