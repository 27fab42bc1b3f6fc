//! Reading: a single named measurement value.
//!
//! A reading's `name` must reference a registered value descriptor. Readings
//! ingested as part of an event take their `device` from that event.

use serde::{Deserialize, Serialize};

use crate::id::ReadingId;
use crate::time::Millis;

/// A stored or incoming measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub id: ReadingId,
    /// Value descriptor name.
    pub name: String,
    /// Opaque string payload.
    pub value: String,
    /// Device name (canonical after resolution).
    pub device: String,
    /// Producer timestamp.
    pub origin: Millis,
    pub pushed: Millis,
    /// Assigned by the store.
    pub created: Millis,
    /// Assigned by the store.
    pub modified: Millis,
}

impl Reading {
    /// Create an unsaved reading with a fresh identifier.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: ReadingId::new(),
            name: name.into(),
            value: value.into(),
            device: String::new(),
            origin: 0,
            pushed: 0,
            created: 0,
            modified: 0,
        }
    }

    /// Set the device name.
    #[must_use]
    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = device.into();
        self
    }

    /// Set the producer timestamp.
    #[must_use]
    pub fn with_origin(mut self, origin: Millis) -> Self {
        self.origin = origin;
        self
    }
}

/// Merge-by-presence update for a [`Reading`].
///
/// `None`, empty strings and a zero origin leave the stored field untouched.
#[derive(Debug, Clone, Default)]
pub struct ReadingPatch {
    pub id: ReadingId,
    pub value: Option<String>,
    pub name: Option<String>,
    pub origin: Option<Millis>,
}

impl ReadingPatch {
    /// The new descriptor name, when one is actually supplied.
    #[must_use]
    pub fn new_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    /// The new value, when one is actually supplied.
    #[must_use]
    pub fn new_value(&self) -> Option<&str> {
        self.value.as_deref().filter(|v| !v.is_empty())
    }

    /// Apply the present fields onto `reading`.
    pub fn apply(&self, reading: &mut Reading) {
        if let Some(value) = self.new_value() {
            reading.value = value.to_string();
        }
        if let Some(name) = self.new_name() {
            reading.name = name.to_string();
        }
        if let Some(origin) = self.origin.filter(|o| *o != 0) {
            reading.origin = origin;
        }
    }
}
