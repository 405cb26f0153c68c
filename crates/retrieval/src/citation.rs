//! Statute citation extraction.
//!
//! Post-processes a generated answer and reports which known statutes
//! it references. The statute table is declarative data (built-in
//! defaults or a YAML file): each entry carries case-insensitive
//! substring patterns plus canonical read/download links, so new
//! statutes are added without touching control flow.
//!
//! This is purely a string-matching pass over the answer text. It does
//! not verify that a match really is a legal reference; a statute's
//! numeric code appearing in an unrelated number will produce a false
//! positive.

use crate::text::fold;
use mevzuat_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A statute reference mined from generated answer text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Unique statute key (e.g., "tbk")
    #[serde(rename = "statuteKey")]
    pub statute_key: String,

    /// Canonical display name
    #[serde(rename = "displayName")]
    pub display_name: String,

    /// Link to read the statute text
    #[serde(rename = "canonicalUrl")]
    pub canonical_url: String,

    /// Link to download the statute document
    #[serde(rename = "downloadUrl")]
    pub download_url: String,
}

/// One statute entry in the declarative table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatuteEntry {
    pub key: String,

    #[serde(rename = "displayName")]
    pub display_name: String,

    #[serde(rename = "canonicalUrl")]
    pub canonical_url: String,

    #[serde(rename = "downloadUrl")]
    pub download_url: String,

    /// Case-insensitive substring patterns: abbreviation, full name,
    /// numeric code
    pub patterns: Vec<String>,
}

/// Fixed table of known statutes.
#[derive(Debug, Clone)]
pub struct StatuteTable {
    entries: Vec<StatuteEntry>,
}

impl StatuteTable {
    /// Build a table from explicit entries.
    pub fn from_entries(entries: Vec<StatuteEntry>) -> Self {
        Self { entries }
    }

    /// Load a table from a YAML file (a list of statute entries).
    pub fn from_yaml(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read statute file {:?}: {}", path, e))
        })?;

        let entries: Vec<StatuteEntry> = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse statute file {:?}: {}", path, e))
        })?;

        Ok(Self { entries })
    }

    /// Built-in table covering the statutes most often cited in the
    /// corpus. Links point at mevzuat.gov.tr.
    pub fn default_table() -> Self {
        let entries = vec![
            statute(
                "tbk",
                "Türk Borçlar Kanunu (6098)",
                6098,
                &["tbk", "borçlar kanunu", "6098"],
            ),
            statute(
                "tmk",
                "Türk Medeni Kanunu (4721)",
                4721,
                &["tmk", "medeni kanun", "4721"],
            ),
            statute(
                "is_kanunu",
                "İş Kanunu (4857)",
                4857,
                &["iş kanunu", "4857"],
            ),
            statute(
                "hmk",
                "Hukuk Muhakemeleri Kanunu (6100)",
                6100,
                &["hmk", "muhakemeleri kanunu", "6100"],
            ),
            statute(
                "tkhk",
                "Tüketicinin Korunması Hakkında Kanun (6502)",
                6502,
                &["tkhk", "tüketicinin korunması", "6502"],
            ),
            statute(
                "iik",
                "İcra ve İflas Kanunu (2004)",
                2004,
                &["iik", "icra ve iflas", "2004 sayılı"],
            ),
        ];

        Self { entries }
    }

    /// All entries, in table order.
    pub fn entries(&self) -> &[StatuteEntry] {
        &self.entries
    }

    /// Extract citations from answer text.
    ///
    /// A statute is reported once no matter how many of its patterns
    /// match or how often; emission order follows the table, not order
    /// of appearance in the text. Idempotent by construction.
    pub fn extract(&self, answer: &str) -> Vec<Citation> {
        let answer_lower = fold(answer);

        self.entries
            .iter()
            .filter(|entry| {
                entry
                    .patterns
                    .iter()
                    .any(|pattern| answer_lower.contains(&fold(pattern)))
            })
            .map(|entry| Citation {
                statute_key: entry.key.clone(),
                display_name: entry.display_name.clone(),
                canonical_url: entry.canonical_url.clone(),
                download_url: entry.download_url.clone(),
            })
            .collect()
    }
}

/// Helper for the built-in table: mevzuat.gov.tr uses the statute
/// number in both the reading page and the PDF path.
fn statute(key: &str, display_name: &str, number: u32, patterns: &[&str]) -> StatuteEntry {
    StatuteEntry {
        key: key.to_string(),
        display_name: display_name.to_string(),
        canonical_url: format!(
            "https://www.mevzuat.gov.tr/mevzuat?MevzuatNo={}&MevzuatTur=1&MevzuatTertip=5",
            number
        ),
        download_url: format!(
            "https://www.mevzuat.gov.tr/mevzuatmetin/1.5.{}.pdf",
            number
        ),
        patterns: patterns.iter().map(|s| s.to_string()).collect(),
    }
}
