//! Feature flag cache configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const fn default_cache_ttl_secs() -> u64 {
    30
}

fn default_preload() -> Vec<String> {
    ["logo_fetch", "pdf_export", "email_capture", "share_links"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FlagsConfig {
    /// How long a looked-up flag value is served from cache.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Flags looked up once at startup.
    #[serde(default = "default_preload")]
    pub preload: Vec<String>,
}

impl Default for FlagsConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
            preload: default_preload(),
        }
    }
}

impl FlagsConfig {
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = FlagsConfig::default();
        assert_eq!(config.cache_ttl(), Duration::from_secs(30));
        assert!(config.preload.iter().any(|f| f == "logo_fetch"));
    }
}
