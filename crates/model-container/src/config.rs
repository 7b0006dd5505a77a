// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Loader configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! embedding_pattern = "Wemb"
//! mapped = false
//! warn_on_duplicates = true
//! ```

use crate::transform::{TransformTable, DEFAULT_EMBEDDING_PATTERN};
use crate::{ContainerError, ContainerReader};
use std::path::Path;

/// Configuration for container loading.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ContainerConfig {
    /// Substring marking quantized embedding matrices.
    #[serde(default = "default_embedding_pattern")]
    pub embedding_pattern: String,
    /// Whether non-quantized items may borrow from the source buffer.
    #[serde(default)]
    pub mapped: bool,
    /// Whether to log a warning for duplicate item names.
    #[serde(default = "default_true")]
    pub warn_on_duplicates: bool,
}

fn default_embedding_pattern() -> String {
    DEFAULT_EMBEDDING_PATTERN.to_string()
}

fn default_true() -> bool {
    true
}

impl ContainerConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ContainerError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ContainerError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ContainerError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| ContainerError::Config(format!("TOML parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, ContainerError> {
        toml::to_string_pretty(self)
            .map_err(|e| ContainerError::Config(format!("TOML serialise error: {e}")))
    }

    /// Rejects settings that would make every name an embedding.
    pub fn validate(&self) -> Result<(), ContainerError> {
        if self.embedding_pattern.is_empty() {
            return Err(ContainerError::Config(
                "embedding_pattern must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Builds a reader with the reference kernels and this configuration.
    pub fn build_reader(&self) -> ContainerReader {
        ContainerReader::new()
            .with_table(TransformTable::with_embedding_pattern(
                self.embedding_pattern.as_str(),
            ))
            .with_duplicate_warning(self.warn_on_duplicates)
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            embedding_pattern: default_embedding_pattern(),
            mapped: false,
            warn_on_duplicates: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Dispatch;
    use tensor_core::{ElementType, QuantWidth};

    #[test]
    fn test_default() {
        let c = ContainerConfig::default();
        assert_eq!(c.embedding_pattern, "Wemb");
        assert!(!c.mapped);
        assert!(c.warn_on_duplicates);
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
embedding_pattern = "embed"
mapped = true
warn_on_duplicates = false
"#;
        let c = ContainerConfig::from_toml(toml).unwrap();
        assert_eq!(c.embedding_pattern, "embed");
        assert!(c.mapped);
        assert!(!c.warn_on_duplicates);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let c = ContainerConfig::from_toml("").unwrap();
        assert_eq!(c, ContainerConfig::default());
    }

    #[test]
    fn test_empty_pattern_rejected() {
        assert!(ContainerConfig::from_toml("embedding_pattern = \"\"").is_err());
    }

    #[test]
    fn test_bad_toml() {
        assert!(matches!(
            ContainerConfig::from_toml("mapped = 3"),
            Err(ContainerError::Config(_))
        ));
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let c = ContainerConfig {
            mapped: true,
            ..Default::default()
        };
        let back = ContainerConfig::from_toml(&c.to_toml().unwrap()).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_build_reader_uses_pattern() {
        let c = ContainerConfig {
            embedding_pattern: "tok_emb".into(),
            ..Default::default()
        };
        let reader = c.build_reader();
        assert_eq!(
            reader.table().resolve(ElementType::Intgemm8, "tok_emb"),
            Dispatch::DequantizeEmbedding(QuantWidth::Bits8)
        );
    }

    #[test]
    fn test_from_missing_file() {
        assert!(ContainerConfig::from_file(Path::new("/nonexistent/config.toml")).is_err());
    }
}
