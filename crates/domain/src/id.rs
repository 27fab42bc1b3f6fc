//! Typed identifier newtypes backed by UUIDs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(uuid::Uuid);

        impl Default for $name {
            fn default() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Access the inner UUID.
            #[must_use]
            pub fn as_uuid(self) -> uuid::Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s).map(Self)
            }
        }
    };
}

define_id!(
    /// Unique identifier for an [`Event`](crate::event::Event).
    EventId
);

define_id!(
    /// Unique identifier for a [`Reading`](crate::reading::Reading).
    ReadingId
);

define_id!(
    /// Unique identifier for a [`ValueDescriptor`](crate::value_descriptor::ValueDescriptor).
    ValueDescriptorId
);

/// Identifier returned by ingestion when persistence is disabled.
pub const UNSAVED: &str = "unsaved";

/// Outcome of an ingestion that may or may not have reached the store.
///
/// Renders as the stored identifier, or as [`UNSAVED`] when the write was
/// skipped by configuration. Callers check for `Unsaved`; it is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome<I> {
    Saved(I),
    Unsaved,
}

impl<I: Copy> SaveOutcome<I> {
    /// The stored identifier, if any.
    #[must_use]
    pub fn id(&self) -> Option<I> {
        match self {
            Self::Saved(id) => Some(*id),
            Self::Unsaved => None,
        }
    }
}

impl<I: fmt::Display> fmt::Display for SaveOutcome<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Saved(id) => id.fmt(f),
            Self::Unsaved => f.write_str(UNSAVED),
        }
    }
}
