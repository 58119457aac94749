use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{CompanySize, ComplexityTier};

/// Full wizard output. Value semantics: migration produces a new value.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AssessmentData {
    pub company: CompanyInfo,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub integrations: IntegrationDetails,
    #[serde(default)]
    pub patterns: Vec<IntegrationPattern>,
    pub scorecard: Scorecard,
}

/// Company profile answers from the first wizard step.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CompanyInfo {
    pub size: CompanySize,
    pub industry: String,
}

/// Systems in use, grouped by integration category.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct IntegrationDetails {
    #[serde(default)]
    pub erp: Vec<SystemEntry>,
    /// Sensor `category` values may carry labels from an older taxonomy.
    #[serde(default)]
    pub sensors: Vec<SystemEntry>,
    #[serde(default)]
    pub automation: Vec<SystemEntry>,
    #[serde(default)]
    pub other_systems: Vec<SystemEntry>,
    #[serde(default)]
    pub data_analytics: Vec<SystemEntry>,
}

impl IntegrationDetails {
    /// Iterate every entry across all categories.
    pub fn all(&self) -> impl Iterator<Item = &SystemEntry> {
        self.erp
            .iter()
            .chain(&self.sensors)
            .chain(&self.automation)
            .chain(&self.other_systems)
            .chain(&self.data_analytics)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.erp.len()
            + self.sensors.len()
            + self.automation.len()
            + self.other_systems.len()
            + self.data_analytics.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One selected system: a brand within a category.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SystemEntry {
    pub brand: String,
    pub category: String,
}

/// A data flow between two systems.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct IntegrationPattern {
    pub from: String,
    pub to: String,
    /// e.g., `rest`, `opc_ua`, `mqtt`, `file`.
    pub protocol: String,
    #[serde(default)]
    pub realtime: bool,
}

/// Derived metrics shown to the user after the wizard.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Scorecard {
    /// 0–100.
    pub compatibility_pct: u8,
    pub integration_count: u32,
    pub goals_matched: u32,
    pub complexity: ComplexityTier,
}

/// A persisted assessment.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Assessment {
    pub id: String,
    /// Opaque token used in `/s/{public_id}` share links.
    pub public_id: String,
    pub company_id: Option<String>,
    pub data: AssessmentData,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Scorecard row stored alongside an assessment (one-to-one).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AssessmentResult {
    pub id: String,
    pub assessment_id: String,
    pub scorecard: Scorecard,
    pub visualization: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Identifiers returned by a successful save.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SavedAssessment {
    pub assessment_id: String,
    pub public_id: String,
    pub company_id: Option<String>,
}

/// Both halves of a shared assessment, resolved together.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SharedAssessment {
    pub assessment: Assessment,
    pub result: AssessmentResult,
}
