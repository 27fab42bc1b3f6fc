//! Runtime policy shared by every service.

/// Immutable core configuration, passed to each service constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreSettings {
    /// Write events and readings to the store.
    pub persist_data: bool,
    /// Check reading values against their descriptors during ingestion.
    pub validate_readings_on_ingest: bool,
    /// Reject operations whose device token does not resolve.
    pub metadata_check_strict: bool,
    /// Let the side-effect consumer bump device timestamps.
    pub update_device_last_connected: bool,
    /// Let the side-effect consumer bump device service timestamps.
    pub update_service_last_connected: bool,
    /// Upper bound on the size of any list result.
    pub read_max_limit: usize,
}

impl Default for CoreSettings {
    fn default() -> Self {
        Self {
            persist_data: true,
            validate_readings_on_ingest: true,
            metadata_check_strict: true,
            update_device_last_connected: true,
            update_service_last_connected: true,
            read_max_limit: 100,
        }
    }
}

impl CoreSettings {
    /// Clamp a caller-supplied limit down to `read_max_limit`.
    #[must_use]
    pub fn clamp_limit(&self, limit: usize) -> usize {
        limit.min(self.read_max_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_clamp_limit_down_only() {
        let settings = CoreSettings {
            read_max_limit: 2,
            ..CoreSettings::default()
        };
        assert_eq!(settings.clamp_limit(10), 2);
        assert_eq!(settings.clamp_limit(1), 1);
        assert_eq!(settings.clamp_limit(0), 0);
    }
}
