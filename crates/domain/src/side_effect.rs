//! Side-effect messages emitted after an event passes validation.
//!
//! They carry only the device name; consumers re-resolve the device (and its
//! service) against the directory before updating timestamps.

/// Post-ingestion bookkeeping request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    /// Bump the device's last-connected and last-reported timestamps.
    DeviceLastReported { device_name: String },
    /// Bump the owning device service's last-connected and last-reported timestamps.
    DeviceServiceLastReported { device_name: String },
}

/// Discriminant of a [`SideEffect`], used to route it to its queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SideEffectKind {
    Device,
    DeviceService,
}

impl SideEffect {
    /// The pair emitted for every validated ingestion, in emission order.
    #[must_use]
    pub fn last_reported_pair(device_name: &str) -> [Self; 2] {
        [
            Self::DeviceLastReported {
                device_name: device_name.to_string(),
            },
            Self::DeviceServiceLastReported {
                device_name: device_name.to_string(),
            },
        ]
    }

    #[must_use]
    pub fn device_name(&self) -> &str {
        match self {
            Self::DeviceLastReported { device_name }
            | Self::DeviceServiceLastReported { device_name } => device_name,
        }
    }

    #[must_use]
    pub fn kind(&self) -> SideEffectKind {
        match self {
            Self::DeviceLastReported { .. } => SideEffectKind::Device,
            Self::DeviceServiceLastReported { .. } => SideEffectKind::DeviceService,
        }
    }
}
