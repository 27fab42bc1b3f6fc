//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

use std::str::FromStr;

use coredata_domain::error::{CoreDataError, NotFoundError};

pub mod device_resolver;
pub mod event_service;
pub mod reading_service;
pub mod value_descriptor_service;

/// Parse a caller-supplied identifier.
///
/// An identifier that does not parse cannot name a stored record, so the
/// failure is reported as not found.
///
/// # Errors
///
/// Returns [`CoreDataError::NotFound`] when `raw` is not a valid identifier.
pub fn parse_id<I: FromStr>(entity: &'static str, raw: &str) -> Result<I, CoreDataError> {
    raw.parse().map_err(|_| {
        NotFoundError {
            entity,
            id: raw.to_string(),
        }
        .into()
    })
}

pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> CoreDataError {
    NotFoundError {
        entity,
        id: id.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use coredata_domain::id::EventId;

    #[test]
    fn should_report_unparseable_id_as_not_found() {
        let result = parse_id::<EventId>("Event", "not-an-id");
        assert!(matches!(result, Err(CoreDataError::NotFound(_))));
    }

    #[test]
    fn should_parse_valid_id() {
        let id = EventId::new();
        let parsed: EventId = parse_id("Event", &id.to_string()).unwrap();
        assert_eq!(parsed, id);
    }
}
