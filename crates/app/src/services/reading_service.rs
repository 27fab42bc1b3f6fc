//! Reading service: CRUD and bounded queries over readings.

use coredata_domain::error::{CoreDataError, ValidationError};
use coredata_domain::id::{ReadingId, SaveOutcome};
use coredata_domain::reading::{Reading, ReadingPatch};
use coredata_domain::time::Millis;
use coredata_domain::value_descriptor::ValueDescriptor;

use crate::ports::{DeviceDirectory, ReadingRepository, ValueDescriptorRepository};
use crate::services::device_resolver::DeviceResolver;
use crate::services::not_found;
use crate::services::value_descriptor_service::check_readings;
use crate::settings::CoreSettings;

/// Application service for readings outside of event ingestion.
pub struct ReadingService<R, V, D> {
    readings: R,
    descriptors: V,
    resolver: DeviceResolver<D>,
    settings: CoreSettings,
}

impl<R, V, D> ReadingService<R, V, D>
where
    R: ReadingRepository,
    V: ValueDescriptorRepository,
    D: DeviceDirectory,
{
    /// Create a new service backed by the given repositories and directory.
    pub fn new(
        readings: R,
        descriptors: V,
        resolver: DeviceResolver<D>,
        settings: CoreSettings,
    ) -> Self {
        Self {
            readings,
            descriptors,
            resolver,
            settings,
        }
    }

    /// Largest list any query on this service returns.
    #[must_use]
    pub fn read_max_limit(&self) -> usize {
        self.settings.read_max_limit
    }

    /// Add a standalone reading.
    ///
    /// A non-empty `device` is resolved like event ingestion does. The
    /// reading's descriptor must exist whatever the validation and
    /// persistence flags say. With persistence off nothing is written and
    /// the outcome is [`SaveOutcome::Unsaved`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreDataError::NotFound`] for an unresolved device in strict
    /// mode, [`CoreDataError::Validation`] when the reading fails its
    /// descriptor, or a storage/directory error.
    #[tracing::instrument(skip(self, reading), fields(name = %reading.name, device = %reading.device))]
    pub async fn add_reading(
        &self,
        mut reading: Reading,
    ) -> Result<SaveOutcome<ReadingId>, CoreDataError> {
        if !reading.device.is_empty() {
            reading.device = self.resolver.canonical_name(&reading.device).await?;
        }
        if self.descriptors.get_by_name(&reading.name).await?.is_none() {
            return Err(ValidationError::UnknownValueDescriptor(reading.name.clone()).into());
        }
        check_readings(&self.descriptors, std::slice::from_ref(&reading), &self.settings).await?;
        if !self.settings.persist_data {
            return Ok(SaveOutcome::Unsaved);
        }
        let stored = self.readings.create(reading).await?;
        Ok(SaveOutcome::Saved(stored.id))
    }

    /// # Errors
    ///
    /// Returns [`CoreDataError::NotFound`] when no reading has `id`.
    #[tracing::instrument(skip(self))]
    pub async fn get_reading(&self, id: ReadingId) -> Result<Reading, CoreDataError> {
        self.readings
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found("Reading", id))
    }

    /// List every stored reading, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_readings(&self) -> Result<Vec<Reading>, CoreDataError> {
        self.readings.get_all().await
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn count_readings(&self) -> Result<u64, CoreDataError> {
        self.readings.count().await
    }

    /// Merge `patch` into the stored reading.
    ///
    /// A new name must belong to a registered descriptor. The merged reading
    /// is re-checked against its descriptor only when its name or value
    /// changes.
    ///
    /// # Errors
    ///
    /// Returns [`CoreDataError::NotFound`] when the reading does not exist,
    /// [`CoreDataError::Validation`] when the new name or value fails its
    /// descriptor, or a storage error.
    #[tracing::instrument(skip(self, patch), fields(id = %patch.id))]
    pub async fn update_reading(&self, patch: ReadingPatch) -> Result<Reading, CoreDataError> {
        let mut reading = self.get_reading(patch.id).await?;
        if let Some(name) = patch.new_name()
            && self.descriptors.get_by_name(name).await?.is_none()
        {
            return Err(ValidationError::UnknownValueDescriptor(name.to_string()).into());
        }
        let revalidate = patch.new_name().is_some() || patch.new_value().is_some();
        patch.apply(&mut reading);
        if revalidate && self.settings.validate_readings_on_ingest {
            check_readings(&self.descriptors, std::slice::from_ref(&reading), &self.settings)
                .await?;
        }
        self.readings.update(reading).await
    }

    /// # Errors
    ///
    /// Returns [`CoreDataError::NotFound`] when no reading has `id`, or a
    /// storage error.
    #[tracing::instrument(skip(self))]
    pub async fn delete_reading(&self, id: ReadingId) -> Result<(), CoreDataError> {
        self.get_reading(id).await?;
        self.readings.delete(id).await
    }

    /// # Errors
    ///
    /// Returns [`CoreDataError::NotFound`] for an unresolved device in strict
    /// mode, or a storage/directory error.
    #[tracing::instrument(skip(self))]
    pub async fn readings_by_device(
        &self,
        token: &str,
        limit: usize,
    ) -> Result<Vec<Reading>, CoreDataError> {
        let device = self.resolver.canonical_name(token).await?;
        self.readings
            .find_by_device(&device, self.settings.clamp_limit(limit))
            .await
    }

    /// Readings carrying a registered descriptor name.
    ///
    /// # Errors
    ///
    /// Returns [`CoreDataError::NotFound`] when no descriptor has `name`, or
    /// a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn readings_by_value_descriptor(
        &self,
        name: &str,
        limit: usize,
    ) -> Result<Vec<Reading>, CoreDataError> {
        self.require_descriptor(name).await?;
        self.readings
            .find_by_name(name, self.settings.clamp_limit(limit))
            .await
    }

    /// Readings of one device carrying one registered descriptor name.
    ///
    /// # Errors
    ///
    /// Returns [`CoreDataError::NotFound`] when the descriptor does not exist
    /// or the device does not resolve in strict mode, or a storage/directory
    /// error.
    #[tracing::instrument(skip(self))]
    pub async fn readings_by_value_descriptor_and_device(
        &self,
        name: &str,
        token: &str,
        limit: usize,
    ) -> Result<Vec<Reading>, CoreDataError> {
        let device = self.resolver.canonical_name(token).await?;
        self.require_descriptor(name).await?;
        self.readings
            .find_by_device_and_name(&device, name, self.settings.clamp_limit(limit))
            .await
    }

    /// Readings whose descriptor has the given unit-of-measure label.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repositories.
    #[tracing::instrument(skip(self))]
    pub async fn readings_by_uom_label(
        &self,
        uom_label: &str,
        limit: usize,
    ) -> Result<Vec<Reading>, CoreDataError> {
        let descriptors = self.descriptors.find_by_uom_label(uom_label).await?;
        self.readings_for(&descriptors, limit).await
    }

    /// Readings whose descriptor carries `label`.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repositories.
    #[tracing::instrument(skip(self))]
    pub async fn readings_by_label(
        &self,
        label: &str,
        limit: usize,
    ) -> Result<Vec<Reading>, CoreDataError> {
        let descriptors = self.descriptors.find_by_label(label).await?;
        self.readings_for(&descriptors, limit).await
    }

    /// Readings whose descriptor has the given type code.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repositories.
    #[tracing::instrument(skip(self))]
    pub async fn readings_by_type(
        &self,
        value_type: &str,
        limit: usize,
    ) -> Result<Vec<Reading>, CoreDataError> {
        let descriptors = self.descriptors.find_by_type(value_type).await?;
        self.readings_for(&descriptors, limit).await
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn readings_by_created(
        &self,
        start: Millis,
        end: Millis,
        limit: usize,
    ) -> Result<Vec<Reading>, CoreDataError> {
        self.readings
            .find_by_created(start, end, self.settings.clamp_limit(limit))
            .await
    }

    async fn readings_for(
        &self,
        descriptors: &[ValueDescriptor],
        limit: usize,
    ) -> Result<Vec<Reading>, CoreDataError> {
        if descriptors.is_empty() {
            return Ok(Vec::new());
        }
        let names: Vec<String> = descriptors.iter().map(|d| d.name.clone()).collect();
        self.readings
            .find_by_names(&names, self.settings.clamp_limit(limit))
            .await
    }

    async fn require_descriptor(&self, name: &str) -> Result<(), CoreDataError> {
        match self.descriptors.get_by_name(name).await? {
            Some(_) => Ok(()),
            None => Err(not_found("ValueDescriptor", name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        InMemoryDirectory, InMemoryStore, TEST_DEVICE_ID, TEST_DEVICE_NAME, humidity_descriptor,
        temperature_descriptor,
    };

    type Service = ReadingService<InMemoryStore, InMemoryStore, InMemoryDirectory>;

    async fn make_service(settings: CoreSettings) -> (Service, InMemoryStore) {
        let store = InMemoryStore::default();
        ValueDescriptorRepository::create(&store, temperature_descriptor())
            .await
            .unwrap();
        ValueDescriptorRepository::create(&store, humidity_descriptor())
            .await
            .unwrap();
        let resolver = DeviceResolver::new(
            InMemoryDirectory::with_test_device(),
            settings.metadata_check_strict,
        );
        (
            ReadingService::new(store.clone(), store.clone(), resolver, settings),
            store,
        )
    }

    async fn add(svc: &Service, name: &str, value: &str) -> ReadingId {
        svc.add_reading(Reading::new(name, value).with_device(TEST_DEVICE_ID))
            .await
            .unwrap()
            .id()
            .unwrap()
    }

    #[tokio::test]
    async fn should_add_reading_with_canonical_device() {
        let (svc, _) = make_service(CoreSettings::default()).await;
        let id = add(&svc, "Temperature", "20").await;

        let reading = svc.get_reading(id).await.unwrap();
        assert_eq!(reading.device, TEST_DEVICE_NAME);
    }

    #[tokio::test]
    async fn should_skip_resolution_when_device_is_empty() {
        let (svc, _) = make_service(CoreSettings::default()).await;
        let outcome = svc.add_reading(Reading::new("Temperature", "20")).await.unwrap();
        let reading = svc.get_reading(outcome.id().unwrap()).await.unwrap();
        assert!(reading.device.is_empty());
    }

    #[tokio::test]
    async fn should_reject_reading_for_unregistered_descriptor() {
        let (svc, store) = make_service(CoreSettings::default()).await;
        let result = svc.add_reading(Reading::new("Voltage", "3.3")).await;
        assert!(matches!(result, Err(CoreDataError::Validation(_))));
        assert_eq!(store.reading_count(), 0);
    }

    #[tokio::test]
    async fn should_reject_unregistered_descriptor_when_not_persisting() {
        let (svc, store) = make_service(CoreSettings {
            persist_data: false,
            validate_readings_on_ingest: false,
            ..CoreSettings::default()
        })
        .await;

        let result = svc
            .add_reading(Reading::new("Unregistered", "x").with_device(TEST_DEVICE_NAME))
            .await;

        assert!(matches!(
            result,
            Err(CoreDataError::Validation(ValidationError::UnknownValueDescriptor(_)))
        ));
        assert_eq!(store.reading_count(), 0);
    }

    #[tokio::test]
    async fn should_return_unsaved_when_persistence_disabled() {
        let (svc, store) = make_service(CoreSettings {
            persist_data: false,
            ..CoreSettings::default()
        })
        .await;

        let outcome = svc.add_reading(Reading::new("Temperature", "20")).await.unwrap();

        assert_eq!(outcome, SaveOutcome::Unsaved);
        assert_eq!(store.reading_count(), 0);
    }

    #[tokio::test]
    async fn should_clamp_device_query_to_read_max_limit() {
        let (svc, _) = make_service(CoreSettings {
            read_max_limit: 2,
            ..CoreSettings::default()
        })
        .await;
        for value in ["1", "2", "3", "4"] {
            add(&svc, "Temperature", value).await;
        }

        let readings = svc.readings_by_device(TEST_DEVICE_NAME, 10).await.unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].value, "4");
    }

    #[tokio::test]
    async fn should_update_reading_by_presence() {
        let (svc, _) = make_service(CoreSettings::default()).await;
        let id = add(&svc, "Temperature", "20").await;

        let updated = svc
            .update_reading(ReadingPatch {
                id,
                value: Some("22".to_string()),
                name: None,
                origin: Some(0),
            })
            .await
            .unwrap();

        assert_eq!(updated.value, "22");
        assert_eq!(updated.name, "Temperature");
    }

    #[tokio::test]
    async fn should_patch_origin_of_reading_stored_without_validation() {
        let (lenient, store) = make_service(CoreSettings {
            validate_readings_on_ingest: false,
            ..CoreSettings::default()
        })
        .await;
        let id = add(&lenient, "Temperature", "not-a-number").await;

        let resolver = DeviceResolver::new(InMemoryDirectory::with_test_device(), true);
        let strict = ReadingService::new(store.clone(), store, resolver, CoreSettings::default());
        let updated = strict
            .update_reading(ReadingPatch {
                id,
                origin: Some(5_000),
                ..ReadingPatch::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.origin, 5_000);
        assert_eq!(updated.value, "not-a-number");

        let result = strict
            .update_reading(ReadingPatch {
                id,
                value: Some("still-not-a-number".to_string()),
                ..ReadingPatch::default()
            })
            .await;
        assert!(matches!(result, Err(CoreDataError::Validation(_))));
    }

    #[tokio::test]
    async fn should_reject_rename_to_unregistered_descriptor() {
        let (svc, _) = make_service(CoreSettings::default()).await;
        let id = add(&svc, "Temperature", "20").await;

        let result = svc
            .update_reading(ReadingPatch {
                id,
                name: Some("Voltage".to_string()),
                ..ReadingPatch::default()
            })
            .await;
        assert!(matches!(result, Err(CoreDataError::Validation(_))));
        assert_eq!(svc.get_reading(id).await.unwrap().name, "Temperature");
    }

    #[tokio::test]
    async fn should_delete_reading() {
        let (svc, _) = make_service(CoreSettings::default()).await;
        let id = add(&svc, "Temperature", "20").await;

        svc.delete_reading(id).await.unwrap();

        assert!(matches!(
            svc.delete_reading(id).await,
            Err(CoreDataError::NotFound(_))
        ));
        assert_eq!(svc.count_readings().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn should_query_through_descriptor_attributes() {
        let (svc, _) = make_service(CoreSettings::default()).await;
        add(&svc, "Temperature", "20").await;
        add(&svc, "Humidity", "40").await;

        assert_eq!(svc.readings_by_uom_label("percent", 10).await.unwrap().len(), 1);
        assert_eq!(svc.readings_by_label("climate", 10).await.unwrap().len(), 2);
        assert_eq!(svc.readings_by_type("F", 10).await.unwrap().len(), 1);
        assert!(svc.readings_by_label("nothing", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_descriptor_query() {
        let (svc, _) = make_service(CoreSettings::default()).await;
        let result = svc.readings_by_value_descriptor("Voltage", 10).await;
        assert!(matches!(result, Err(CoreDataError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_filter_by_descriptor_and_device() {
        let (svc, _) = make_service(CoreSettings::default()).await;
        add(&svc, "Temperature", "20").await;
        add(&svc, "Humidity", "40").await;

        let readings = svc
            .readings_by_value_descriptor_and_device("Humidity", TEST_DEVICE_ID, 10)
            .await
            .unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(
            svc.readings_by_value_descriptor("Temperature", 10)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn should_filter_by_creation_window() {
        let (svc, store) = make_service(CoreSettings::default()).await;
        store.set_clock(1_000);
        add(&svc, "Temperature", "20").await;
        store.set_clock(5_000);
        add(&svc, "Temperature", "21").await;

        let readings = svc.readings_by_created(0, 2_000, 10).await.unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].value, "20");
    }
}
