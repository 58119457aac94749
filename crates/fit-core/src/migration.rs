//! Legacy sensor-category migration.
//!
//! Assessments saved before the sensor taxonomy was consolidated carry
//! category labels that no longer exist in the catalog. The shim rewrites
//! those labels to their current canonical names so old records (and old
//! share tokens) keep rendering.
//!
//! Detection ([`CategoryShim::needs_migration`]) is separate from the rewrite
//! ([`CategoryShim::migrate`]) so callers can skip the copy when nothing
//! needs changing. Unknown labels always pass through untouched.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::entities::{AssessmentData, SystemEntry};

/// Legacy sensor category → canonical sensor category.
pub const LEGACY_SENSOR_CATEGORIES: &[(&str, &str)] = &[
    ("temperature_humidity", "environmental"),
    ("air_quality", "environmental"),
    ("vibration", "condition_monitoring"),
    ("acoustic", "condition_monitoring"),
    ("energy_meter", "energy"),
    ("power_quality", "energy"),
    ("gps_tracker", "asset_tracking"),
    ("rfid", "asset_tracking"),
    ("tank_level", "fill_level"),
    ("camera", "vision"),
];

static BUILTIN: LazyLock<CategoryShim> =
    LazyLock::new(|| CategoryShim::from_pairs(LEGACY_SENSOR_CATEGORIES.iter().copied()));

/// Table-driven rewriter for legacy sensor category labels.
#[derive(Debug, Clone, Default)]
pub struct CategoryShim {
    table: HashMap<String, String>,
}

impl CategoryShim {
    /// The shim backed by [`LEGACY_SENSOR_CATEGORIES`], built once.
    #[must_use]
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// Build a shim from `(legacy, canonical)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            table: pairs
                .into_iter()
                .map(|(legacy, canonical)| (legacy.to_string(), canonical.to_string()))
                .collect(),
        }
    }

    /// Whether `label` is a known legacy label.
    #[must_use]
    pub fn is_legacy(&self, label: &str) -> bool {
        self.table.contains_key(label)
    }

    /// Canonical form of `label`; unknown labels are returned unchanged.
    #[must_use]
    pub fn canonical<'a>(&'a self, label: &'a str) -> &'a str {
        self.table.get(label).map_or(label, String::as_str)
    }

    /// True if any sensor in `data` carries a legacy category label.
    #[must_use]
    pub fn needs_migration(&self, data: &AssessmentData) -> bool {
        data.integrations
            .sensors
            .iter()
            .any(|sensor| self.is_legacy(&sensor.category))
    }

    /// Return a copy of `data` with every legacy sensor category rewritten.
    ///
    /// Everything other than sensor categories is copied verbatim.
    #[must_use]
    pub fn migrate(&self, data: &AssessmentData) -> AssessmentData {
        let mut migrated = data.clone();
        migrated.integrations.sensors = data
            .integrations
            .sensors
            .iter()
            .map(|sensor| SystemEntry {
                brand: sensor.brand.clone(),
                category: self.canonical(&sensor.category).to_string(),
            })
            .collect();
        migrated
    }
}

/// [`CategoryShim::needs_migration`] against the builtin table.
#[must_use]
pub fn needs_migration(data: &AssessmentData) -> bool {
    CategoryShim::builtin().needs_migration(data)
}

/// [`CategoryShim::migrate`] against the builtin table.
#[must_use]
pub fn migrate(data: &AssessmentData) -> AssessmentData {
    CategoryShim::builtin().migrate(data)
}

/// Migrate only when needed, logging when a rewrite happens.
#[must_use]
pub fn migrate_if_needed(data: &AssessmentData) -> AssessmentData {
    if needs_migration(data) {
        tracing::debug!("rewriting legacy sensor categories");
        migrate(data)
    } else {
        data.clone()
    }
}
