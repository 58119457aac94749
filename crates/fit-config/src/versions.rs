//! Configuration history settings.

use serde::{Deserialize, Serialize};

const fn default_retention() -> u32 {
    20
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VersionsConfig {
    /// Number of configuration versions kept; older ones are evicted first.
    #[serde(default = "default_retention")]
    pub retention: u32,
}

impl Default for VersionsConfig {
    fn default() -> Self {
        Self {
            retention: default_retention(),
        }
    }
}
