//! Entity structs for all Stackfit domain objects.
//!
//! Persisted entities map to tables in the libSQL database (see
//! `fit-db/migrations`). All structs derive `Serialize`, `Deserialize`, and
//! `JsonSchema` for JSON roundtrip and schema validation.

mod assessment;
mod company;
mod config;
mod flag;

pub use assessment::{
    Assessment, AssessmentData, AssessmentResult, CompanyInfo, IntegrationDetails,
    IntegrationPattern, SavedAssessment, Scorecard, SharedAssessment, SystemEntry,
};
pub use company::Company;
pub use config::{
    CONFIG_SCHEMA_VERSION, ConfigExport, ConfigOption, ConfigSection, ConfigSnapshot,
    ConfigVersion,
};
pub use flag::FeatureFlag;
