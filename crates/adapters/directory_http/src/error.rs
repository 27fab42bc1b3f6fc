//! Directory adapter error types.

use coredata_domain::error::CoreDataError;

/// Errors specific to the HTTP directory adapter.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// The configured base URL cannot carry path segments.
    #[error("invalid metadata base url {0:?}")]
    BaseUrl(String),

    /// The request could not be sent or the body could not be read.
    #[error("metadata request failed")]
    Http(#[from] reqwest::Error),

    /// The metadata service answered with an unexpected status.
    #[error("metadata service answered {status} for {path}")]
    Status { status: u16, path: String },
}

impl From<DirectoryError> for CoreDataError {
    fn from(err: DirectoryError) -> Self {
        CoreDataError::Unavailable(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_to_unavailable() {
        let err: CoreDataError = DirectoryError::Status {
            status: 500,
            path: "/api/v1/device/1".to_string(),
        }
        .into();
        assert!(matches!(err, CoreDataError::Unavailable(_)));
    }

    #[test]
    fn should_display_status_error() {
        let err = DirectoryError::Status {
            status: 502,
            path: "/api/v1/device/abc".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "metadata service answered 502 for /api/v1/device/abc"
        );
    }
}
