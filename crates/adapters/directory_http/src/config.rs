//! Metadata service connection settings.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the HTTP device directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Base URL of the metadata service, e.g. `http://localhost:48081`.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:48081".to_string(),
            timeout_secs: 5,
        }
    }
}

impl DirectoryConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
