//! Common error types used across the workspace.
//!
//! Every fallible operation in the core returns [`CoreDataError`]. Callers
//! branch on the variant, never on message text.

/// Top-level error for every core operation.
#[derive(Debug, thiserror::Error)]
pub enum CoreDataError {
    /// The addressed record does not exist.
    #[error("{0}")]
    NotFound(#[from] NotFoundError),

    /// A record with the same unique key already exists.
    #[error("{0}")]
    NotUnique(#[from] NotUniqueError),

    /// Input failed a domain rule.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The operation would break referential integrity.
    #[error("{0}")]
    Integrity(#[from] IntegrityError),

    /// A collaborator (store, directory, transport) could not serve the request.
    #[error("collaborator unavailable")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl CoreDataError {
    /// `true` when this is a [`CoreDataError::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// A lookup by identifier or key returned nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} not found: {id}")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A unique key is already taken.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} already exists: {key}")]
pub struct NotUniqueError {
    pub entity: &'static str,
    pub key: String,
}

/// Domain validation failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("no value descriptor registered for reading {0}")]
    UnknownValueDescriptor(String),

    #[error("format string {0:?} does not match the required pattern")]
    FormatMismatch(String),

    #[error("format pattern could not be evaluated")]
    FormatPattern(#[source] regex::Error),

    #[error("value {value:?} of reading {name} is not a valid {expected}")]
    ValueType {
        name: String,
        value: String,
        expected: &'static str,
    },

    #[error("age must not be negative, got {0}")]
    NegativeAge(i64),

    #[error("value {value} of reading {name} is outside [{min}, {max}]")]
    OutOfRange {
        name: String,
        value: String,
        min: String,
        max: String,
    },
}

/// Referential-integrity failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityError {
    #[error("value descriptor {0} is still referenced by existing readings")]
    DescriptorInUse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_sub_errors_with_from() {
        let err: CoreDataError = NotFoundError {
            entity: "Event",
            id: "abc".to_string(),
        }
        .into();
        assert!(err.is_not_found());

        let err: CoreDataError = IntegrityError::DescriptorInUse("Temperature".to_string()).into();
        assert!(matches!(err, CoreDataError::Integrity(_)));
    }

    #[test]
    fn should_render_not_found_message() {
        let err = NotFoundError {
            entity: "Reading",
            id: "42".to_string(),
        };
        assert_eq!(err.to_string(), "Reading not found: 42");
    }

    #[test]
    fn should_prefix_validation_messages() {
        let err: CoreDataError = ValidationError::EmptyName.into();
        assert_eq!(err.to_string(), "validation failed: name must not be empty");
    }
}
