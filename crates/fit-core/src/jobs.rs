//! Background job messages.

use serde::{Deserialize, Serialize};

/// Request to resolve and store a logo for a newly created company.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogoJob {
    pub company_id: String,
    pub company_name: String,
}
