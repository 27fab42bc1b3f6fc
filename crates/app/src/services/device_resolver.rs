//! Device identity resolution.
//!
//! Callers hand in a device token that may be either a directory id or a
//! device name. Resolution turns it into a canonical device before anything
//! else happens, so nothing downstream has to guess.

use tracing::{debug, warn};

use coredata_domain::device::{Device, ResolvedDevice};
use coredata_domain::error::CoreDataError;

use crate::ports::DeviceDirectory;
use crate::services::not_found;

/// Resolves caller tokens against the device directory.
#[derive(Clone)]
pub struct DeviceResolver<D> {
    directory: D,
    strict: bool,
}

impl<D: DeviceDirectory> DeviceResolver<D> {
    /// Create a resolver. With `strict` set, unresolved tokens are errors.
    pub fn new(directory: D, strict: bool) -> Self {
        Self { directory, strict }
    }

    /// Look a token up by id, then by name.
    ///
    /// A failed id lookup is swallowed; only the name lookup's outcome is
    /// surfaced.
    ///
    /// # Errors
    ///
    /// Returns [`CoreDataError::NotFound`] when neither lookup matches, or
    /// [`CoreDataError::Unavailable`] when the name lookup itself fails.
    #[tracing::instrument(skip(self))]
    pub async fn lookup(&self, token: &str) -> Result<Device, CoreDataError> {
        match self.directory.device_by_id(token).await {
            Ok(Some(device)) => return Ok(device),
            Ok(None) => {}
            Err(err) => debug!(error = %err, "device lookup by id failed, trying name"),
        }
        self.directory
            .device_by_name(token)
            .await?
            .ok_or_else(|| not_found("Device", token))
    }

    /// Resolve a token under the configured strict/permissive policy.
    ///
    /// In permissive mode an unresolved token comes back verbatim as
    /// [`ResolvedDevice::Unresolved`].
    ///
    /// # Errors
    ///
    /// In strict mode, returns whatever [`DeviceResolver::lookup`] returns.
    pub async fn resolve(&self, token: &str) -> Result<ResolvedDevice, CoreDataError> {
        match self.lookup(token).await {
            Ok(device) => Ok(ResolvedDevice::Found(device)),
            Err(err) if self.strict => Err(err),
            Err(err) => {
                warn!(token, error = %err, "device not resolved, keeping raw token");
                Ok(ResolvedDevice::Unresolved(token.to_string()))
            }
        }
    }

    /// Resolve a token to the name to store or query by.
    ///
    /// # Errors
    ///
    /// Same as [`DeviceResolver::resolve`].
    pub async fn canonical_name(&self, token: &str) -> Result<String, CoreDataError> {
        Ok(self.resolve(token).await?.into_name())
    }

    /// Look a device up strictly by id, regardless of policy.
    ///
    /// # Errors
    ///
    /// Returns [`CoreDataError::NotFound`] when the directory has no such id,
    /// or a directory error.
    pub async fn device_by_id(&self, id: &str) -> Result<Device, CoreDataError> {
        self.directory
            .device_by_id(id)
            .await?
            .ok_or_else(|| not_found("Device", id))
    }

    /// Look a device up strictly by name, regardless of policy.
    ///
    /// # Errors
    ///
    /// Returns [`CoreDataError::NotFound`] when the directory has no such
    /// name, or a directory error.
    pub async fn device_by_name(&self, name: &str) -> Result<Device, CoreDataError> {
        self.directory
            .device_by_name(name)
            .await?
            .ok_or_else(|| not_found("Device", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryDirectory, TEST_DEVICE_ID, TEST_DEVICE_NAME};

    fn resolver(strict: bool) -> (DeviceResolver<InMemoryDirectory>, InMemoryDirectory) {
        let directory = InMemoryDirectory::with_test_device();
        (DeviceResolver::new(directory.clone(), strict), directory)
    }

    #[tokio::test]
    async fn should_resolve_same_name_by_id_and_by_name() {
        let (resolver, _) = resolver(true);

        let by_id = resolver.canonical_name(TEST_DEVICE_ID).await.unwrap();
        let by_name = resolver.canonical_name(TEST_DEVICE_NAME).await.unwrap();

        assert_eq!(by_id, TEST_DEVICE_NAME);
        assert_eq!(by_name, TEST_DEVICE_NAME);
    }

    #[tokio::test]
    async fn should_return_not_found_when_strict_and_unknown() {
        let (resolver, _) = resolver(true);
        let result = resolver.resolve("unknown-xyz").await;
        assert!(matches!(result, Err(CoreDataError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_keep_raw_token_when_permissive_and_unknown() {
        let (resolver, _) = resolver(false);
        let resolved = resolver.resolve("unknown-xyz").await.unwrap();
        assert_eq!(resolved, ResolvedDevice::Unresolved("unknown-xyz".to_string()));
    }

    #[tokio::test]
    async fn should_surface_unavailable_when_strict_and_directory_offline() {
        let (resolver, directory) = resolver(true);
        directory.set_offline(true);

        let result = resolver.resolve(TEST_DEVICE_NAME).await;
        assert!(matches!(result, Err(CoreDataError::Unavailable(_))));
    }

    #[tokio::test]
    async fn should_fall_back_to_raw_token_when_permissive_and_directory_offline() {
        let (resolver, directory) = resolver(false);
        directory.set_offline(true);

        let name = resolver.canonical_name("raw-token").await.unwrap();
        assert_eq!(name, "raw-token");
    }

    #[tokio::test]
    async fn should_not_match_name_when_looking_up_strictly_by_id() {
        let (resolver, _) = resolver(false);
        let result = resolver.device_by_id(TEST_DEVICE_NAME).await;
        assert!(matches!(result, Err(CoreDataError::NotFound(_))));
    }
}
