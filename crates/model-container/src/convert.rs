// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Conversion from HuggingFace SafeTensors files.

use crate::{ContainerError, Item};
use tensor_core::{ElementType, Shape};

/// Builds container items from a SafeTensors buffer.
///
/// Items borrow their data from `bytes` and come out in file order, i.e.
/// sorted by data offset.
pub fn items_from_safetensors(bytes: &[u8]) -> Result<Vec<Item<'_>>, ContainerError> {
    let tensors = safetensors::SafeTensors::deserialize(bytes)
        .map_err(|e| ContainerError::SafeTensors(format!("parse error: {e}")))?;

    let mut views = tensors.tensors();
    views.sort_by_key(|(_, view)| view.data().as_ptr() as usize);

    let mut items = Vec::with_capacity(views.len());
    for (name, view) in views {
        let element_type = convert_safetensor_dtype(view.dtype()).map_err(|detail| {
            ContainerError::SafeTensors(format!("tensor '{name}': {detail}"))
        })?;
        let shape = Shape::new(view.shape().to_vec());
        items.push(Item::borrowed(name, element_type, shape, view.data()));
    }

    tracing::debug!("converted {} SafeTensors tensors", items.len());
    Ok(items)
}

/// Converts a SafeTensors `Dtype` to our [`ElementType`].
fn convert_safetensor_dtype(dtype: safetensors::Dtype) -> Result<ElementType, String> {
    match dtype {
        safetensors::Dtype::F16 => Ok(ElementType::Float16),
        safetensors::Dtype::F32 => Ok(ElementType::Float32),
        safetensors::Dtype::F64 => Ok(ElementType::Float64),
        safetensors::Dtype::I8 => Ok(ElementType::Int8),
        safetensors::Dtype::I16 => Ok(ElementType::Int16),
        safetensors::Dtype::I32 => Ok(ElementType::Int32),
        safetensors::Dtype::I64 => Ok(ElementType::Int64),
        safetensors::Dtype::U8 => Ok(ElementType::Uint8),
        safetensors::Dtype::U16 => Ok(ElementType::Uint16),
        safetensors::Dtype::U32 => Ok(ElementType::Uint32),
        safetensors::Dtype::U64 => Ok(ElementType::Uint64),
        other => Err(format!("unsupported dtype {other:?}")),
    }
}
