//! Partition registry.
//!
//! A partition is a named subset of the indexed legal corpus, backed by
//! its own searchable collection in the vector store. The registry is
//! built once at startup (from built-in defaults or a YAML file) and is
//! never mutated afterwards; every pipeline component receives it by
//! reference.

use mevzuat_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One knowledge-base partition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partition {
    /// Unique, stable identifier (e.g., "rent_law")
    pub key: String,

    /// Human-readable name shown to users
    #[serde(rename = "displayName")]
    pub display_name: String,

    /// Backing collection name in the vector store
    pub collection: String,

    /// Keywords used by the fast classifier, checked as substrings
    pub keywords: Vec<String>,

    /// Display icon label
    #[serde(default)]
    pub icon: String,

    /// Natural-language description, used by the fallback classifier
    #[serde(default)]
    pub description: String,
}

/// Immutable lookup table of partitions.
///
/// Constructed once at startup; safely shared across concurrent
/// retrieval tasks because it is read-only.
#[derive(Debug, Clone)]
pub struct PartitionRegistry {
    partitions: Vec<Partition>,
}

impl PartitionRegistry {
    /// Build a registry from an explicit partition list.
    ///
    /// Keys must be unique and the list must not be empty.
    pub fn from_partitions(partitions: Vec<Partition>) -> AppResult<Self> {
        if partitions.is_empty() {
            return Err(AppError::Config(
                "Partition registry must not be empty".to_string(),
            ));
        }

        for (i, partition) in partitions.iter().enumerate() {
            if partition.key.is_empty() {
                return Err(AppError::Config(
                    "Partition key must not be empty".to_string(),
                ));
            }
            if partitions[..i].iter().any(|p| p.key == partition.key) {
                return Err(AppError::Config(format!(
                    "Duplicate partition key: {}",
                    partition.key
                )));
            }
        }

        Ok(Self { partitions })
    }

    /// Load a registry from a YAML file (a list of partitions).
    pub fn from_yaml(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read registry file {:?}: {}", path, e))
        })?;

        let partitions: Vec<Partition> = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse registry file {:?}: {}", path, e))
        })?;

        Self::from_partitions(partitions)
    }

    /// Built-in default partitions for the Turkish legal corpus.
    pub fn default_registry() -> Self {
        let partitions = vec![
            Partition {
                key: "rent_law".to_string(),
                display_name: "Kira Hukuku".to_string(),
                collection: "KiraDoc".to_string(),
                keywords: [
                    "kira", "kiracı", "kiraya veren", "tahliye", "depozito", "aidat",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
                icon: "🏠".to_string(),
                description: "Kira sözleşmeleri, kira artışı, tahliye ve depozito \
                              uyuşmazlıkları"
                    .to_string(),
            },
            Partition {
                key: "labor_law".to_string(),
                display_name: "İş Hukuku".to_string(),
                collection: "IsDoc".to_string(),
                keywords: [
                    "işçi", "işveren", "tazminat", "kıdem", "ihbar", "mesai", "sigorta",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
                icon: "💼".to_string(),
                description: "İş sözleşmeleri, kıdem ve ihbar tazminatı, fazla mesai ve \
                              işten çıkarma"
                    .to_string(),
            },
            Partition {
                key: "consumer_law".to_string(),
                display_name: "Tüketici Hukuku".to_string(),
                collection: "TuketiciDoc".to_string(),
                keywords: [
                    "tüketici", "ayıplı", "iade", "cayma", "garanti", "abonelik",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
                icon: "🛒".to_string(),
                description: "Ayıplı mal ve hizmetler, iade ve cayma hakkı, garanti \
                              uyuşmazlıkları"
                    .to_string(),
            },
        ];

        // Built-ins are statically valid
        Self { partitions }
    }

    /// All registered partitions, in registration order.
    pub fn all(&self) -> &[Partition] {
        &self.partitions
    }

    /// Look up a partition by key.
    pub fn get(&self, key: &str) -> Option<&Partition> {
        self.partitions.iter().find(|p| p.key == key)
    }

    /// All partition keys, in registration order.
    pub fn keys(&self) -> Vec<String> {
        self.partitions.iter().map(|p| p.key.clone()).collect()
    }

    /// Number of registered partitions.
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    /// Whether the registry is empty. Never true for a constructed
    /// registry; present for completeness.
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }
}
