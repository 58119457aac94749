use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::CompanySize;

/// A company referenced by one or more assessments.
///
/// Looked up by exact (case-sensitive) name.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Company {
    pub id: String,
    pub name: String,
    /// Filled in out-of-band by the logo worker.
    pub logo_url: Option<String>,
    pub logo_fetched_at: Option<DateTime<Utc>>,
    pub industry: String,
    pub size: CompanySize,
    pub created_at: DateTime<Utc>,
}
