//! Event: a timestamped ingestion unit grouping readings from one device.
//!
//! Once persisted, `device` holds the canonical device name (or the raw
//! caller token when resolution was skipped by configuration).

use serde::{Deserialize, Serialize};

use crate::id::EventId;
use crate::reading::Reading;
use crate::time::Millis;

/// A stored or incoming event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub device: String,
    /// Producer timestamp.
    pub origin: Millis,
    /// `0` until the event is marked as exported downstream.
    pub pushed: Millis,
    /// Assigned by the store.
    pub created: Millis,
    /// Assigned by the store.
    pub modified: Millis,
    /// Owned readings, in ingestion order.
    pub readings: Vec<Reading>,
}

impl Event {
    /// Create an unsaved event with a fresh identifier.
    #[must_use]
    pub fn new(device: impl Into<String>, readings: Vec<Reading>) -> Self {
        Self {
            id: EventId::new(),
            device: device.into(),
            origin: 0,
            pushed: 0,
            created: 0,
            modified: 0,
            readings,
        }
    }

    /// Set the producer timestamp.
    #[must_use]
    pub fn with_origin(mut self, origin: Millis) -> Self {
        self.origin = origin;
        self
    }

    /// Whether the event has been marked as exported.
    #[must_use]
    pub fn is_pushed(&self) -> bool {
        self.pushed != 0
    }
}

/// Merge-by-presence update for an [`Event`].
///
/// `None`, empty strings and zero timestamps leave the stored field untouched.
/// A present `device` is re-resolved by the caller before it is applied.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub id: EventId,
    pub device: Option<String>,
    pub pushed: Option<Millis>,
    pub origin: Option<Millis>,
}

impl EventPatch {
    /// The device token to resolve, when one is actually supplied.
    #[must_use]
    pub fn device_token(&self) -> Option<&str> {
        self.device.as_deref().filter(|d| !d.is_empty())
    }

    /// Apply the timestamp fields onto `event`.
    pub fn apply_timestamps(&self, event: &mut Event) {
        if let Some(pushed) = self.pushed.filter(|p| *p != 0) {
            event.pushed = pushed;
        }
        if let Some(origin) = self.origin.filter(|o| *o != 0) {
            event.origin = origin;
        }
    }
}
