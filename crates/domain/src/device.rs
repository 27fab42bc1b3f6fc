//! Device: the directory's view of a physical or virtual data source.
//!
//! Devices are owned by the external directory service. The core only reads
//! them (to canonicalise the `device` field of events and readings) and asks
//! the directory to bump their last-connected/last-reported timestamps.

use serde::{Deserialize, Serialize};

use crate::time::Millis;

/// A device record as returned by the directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Device {
    /// Opaque directory identifier.
    pub id: String,
    /// Canonical, unique device name.
    pub name: String,
    /// The device service that manages this device.
    pub service: DeviceServiceRef,
    /// Profile describing the device's commands and resources.
    pub profile: DeviceProfile,
    pub last_connected: Millis,
    pub last_reported: Millis,
}

/// Reference to the device service owning a device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceServiceRef {
    pub id: String,
    pub name: String,
}

/// Device profile as far as value descriptors are concerned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceProfile {
    pub name: String,
    pub commands: Vec<ProfileCommand>,
}

/// A single profile command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileCommand {
    pub name: String,
    /// Value descriptor names a GET on this command may report.
    pub get_expected_values: Vec<String>,
    /// Value descriptor names a PUT on this command accepts.
    pub put_parameter_names: Vec<String>,
}

impl Device {
    /// Every value descriptor name referenced by the device's profile.
    ///
    /// GET expected values come before PUT parameter names within each
    /// command; duplicates keep their first position.
    #[must_use]
    pub fn associated_value_descriptors(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for command in &self.profile.commands {
            for name in command
                .get_expected_values
                .iter()
                .chain(&command.put_parameter_names)
            {
                if !names.iter().any(|n| n == name) {
                    names.push(name.clone());
                }
            }
        }
        names
    }
}

/// Result of resolving a caller-supplied device token.
///
/// `Found` carries the directory record; `Unresolved` carries the raw token
/// when the directory had no match and strict metadata checking is off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedDevice {
    Found(Device),
    Unresolved(String),
}

impl ResolvedDevice {
    /// The name to persist and query by: canonical when found, raw otherwise.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Found(device) => &device.name,
            Self::Unresolved(token) => token,
        }
    }

    /// Whether the directory confirmed the device.
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Consume and return the name.
    #[must_use]
    pub fn into_name(self) -> String {
        match self {
            Self::Found(device) => device.name,
            Self::Unresolved(token) => token,
        }
    }
}
