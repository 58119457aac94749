use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::PublishStatus;

/// Current schema version written into new snapshots.
pub const CONFIG_SCHEMA_VERSION: u32 = 2;

/// The full catalog of selectable categories and brands at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ConfigSnapshot {
    pub schema_version: u32,
    pub status: PublishStatus,
    #[serde(default)]
    pub sections: Vec<ConfigSection>,
    /// Lowercased synonym → canonical brand name (e.g., `"sap s4" → "SAP S/4HANA"`).
    #[serde(default)]
    pub synonyms: BTreeMap<String, String>,
}

impl ConfigSnapshot {
    /// An empty draft at the current schema version.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            schema_version: CONFIG_SCHEMA_VERSION,
            status: PublishStatus::Draft,
            sections: Vec::new(),
            synonyms: BTreeMap::new(),
        }
    }

    /// Resolve a user-entered brand to its canonical catalog name.
    ///
    /// Synonyms win over direct catalog matches. Matching is case-insensitive
    /// and ignores surrounding whitespace. Returns `None` for unknown brands.
    #[must_use]
    pub fn canonical_brand(&self, name: &str) -> Option<&str> {
        let key = name.trim().to_lowercase();
        if let Some(canonical) = self.synonyms.get(&key) {
            return Some(canonical.as_str());
        }
        self.sections
            .iter()
            .flat_map(|section| &section.options)
            .flat_map(|option| &option.brands)
            .find(|brand| brand.to_lowercase() == key)
            .map(String::as_str)
    }

    /// Add or replace a synonym. The key is stored lowercased.
    pub fn set_synonym(&mut self, synonym: &str, canonical: &str) {
        self.synonyms
            .insert(synonym.trim().to_lowercase(), canonical.to_string());
    }
}

/// A wizard step / category section.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ConfigSection {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub options: Vec<ConfigOption>,
}

/// A selectable option inside a section.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ConfigOption {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub brands: Vec<String>,
}

/// A recorded configuration snapshot in the bounded history.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ConfigVersion {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub description: Option<String>,
    pub config: ConfigSnapshot,
}

impl ConfigVersion {
    /// File name for a downloaded export: embeds the version id and publish status.
    #[must_use]
    pub fn export_file_name(&self) -> String {
        format!("stackfit-config-{}-{}.json", self.id, self.config.status)
    }
}

/// A version rendered for download.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ConfigExport {
    pub file_name: String,
    /// Pretty-printed JSON of the full snapshot.
    pub json: String,
}
