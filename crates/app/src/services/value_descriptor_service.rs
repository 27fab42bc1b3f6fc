//! Value descriptor service: registry, format checks and integrity rules.

use coredata_domain::device::Device;
use coredata_domain::error::{CoreDataError, IntegrityError, NotUniqueError, ValidationError};
use coredata_domain::id::ValueDescriptorId;
use coredata_domain::reading::Reading;
use coredata_domain::value_descriptor::{
    ValueDescriptor, ValueDescriptorPatch, validate_format_string,
};

use crate::ports::{DeviceDirectory, ReadingRepository, ValueDescriptorRepository};
use crate::services::device_resolver::DeviceResolver;
use crate::services::not_found;
use crate::settings::CoreSettings;

/// Check readings against the registry before they are written.
///
/// Descriptors must exist whenever data is persisted or validation is on;
/// values are only checked when validation is on. Every reading is checked
/// before the caller writes anything.
pub(crate) async fn check_readings<V: ValueDescriptorRepository>(
    descriptors: &V,
    readings: &[Reading],
    settings: &CoreSettings,
) -> Result<(), CoreDataError> {
    if !settings.persist_data && !settings.validate_readings_on_ingest {
        return Ok(());
    }
    for reading in readings {
        let descriptor = descriptors
            .get_by_name(&reading.name)
            .await?
            .ok_or_else(|| ValidationError::UnknownValueDescriptor(reading.name.clone()))?;
        if settings.validate_readings_on_ingest {
            descriptor.check_value(&reading.value)?;
        }
    }
    Ok(())
}

/// Application service for the value descriptor registry.
pub struct ValueDescriptorService<V, R, D> {
    descriptors: V,
    readings: R,
    resolver: DeviceResolver<D>,
}

impl<V, R, D> ValueDescriptorService<V, R, D>
where
    V: ValueDescriptorRepository,
    R: ReadingRepository,
    D: DeviceDirectory,
{
    /// Create a new service backed by the given repositories and directory.
    pub fn new(descriptors: V, readings: R, resolver: DeviceResolver<D>) -> Self {
        Self {
            descriptors,
            readings,
            resolver,
        }
    }

    /// Register a new descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`CoreDataError::Validation`] for an empty name or a formatting
    /// pattern that does not match, [`CoreDataError::NotUnique`] when the name
    /// is taken, or a storage error.
    #[tracing::instrument(skip(self, descriptor), fields(name = %descriptor.name))]
    pub async fn add_value_descriptor(
        &self,
        descriptor: ValueDescriptor,
    ) -> Result<ValueDescriptor, CoreDataError> {
        descriptor.validate()?;
        if self.descriptors.get_by_name(&descriptor.name).await?.is_some() {
            return Err(NotUniqueError {
                entity: "ValueDescriptor",
                key: descriptor.name,
            }
            .into());
        }
        self.descriptors.create(descriptor).await
    }

    /// List every descriptor.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_value_descriptors(&self) -> Result<Vec<ValueDescriptor>, CoreDataError> {
        self.descriptors.get_all().await
    }

    /// # Errors
    ///
    /// Returns [`CoreDataError::NotFound`] when no descriptor has `id`.
    pub async fn get_value_descriptor(
        &self,
        id: ValueDescriptorId,
    ) -> Result<ValueDescriptor, CoreDataError> {
        self.descriptors
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found("ValueDescriptor", id))
    }

    /// # Errors
    ///
    /// Returns [`CoreDataError::NotFound`] when no descriptor has `name`.
    pub async fn get_value_descriptor_by_name(
        &self,
        name: &str,
    ) -> Result<ValueDescriptor, CoreDataError> {
        self.descriptors
            .get_by_name(name)
            .await?
            .ok_or_else(|| not_found("ValueDescriptor", name))
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn value_descriptors_by_label(
        &self,
        label: &str,
    ) -> Result<Vec<ValueDescriptor>, CoreDataError> {
        self.descriptors.find_by_label(label).await
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn value_descriptors_by_uom_label(
        &self,
        uom_label: &str,
    ) -> Result<Vec<ValueDescriptor>, CoreDataError> {
        self.descriptors.find_by_uom_label(uom_label).await
    }

    /// Whether the descriptor's formatting pattern is acceptable.
    ///
    /// # Errors
    ///
    /// Returns [`CoreDataError::Validation`] only when the pattern matcher
    /// itself fails; a non-matching pattern is `Ok(false)`.
    pub fn validate_format_string(&self, descriptor: &ValueDescriptor) -> Result<bool, CoreDataError> {
        Ok(validate_format_string(&descriptor.formatting)?)
    }

    /// Merge `patch` into the descriptor it addresses.
    ///
    /// The target is found by `patch.id` when present, falling back to
    /// `patch.name` when the id is absent or unknown. A rename is refused
    /// while readings still use the old name.
    ///
    /// # Errors
    ///
    /// Returns [`CoreDataError::NotFound`] when the target does not exist,
    /// [`CoreDataError::Validation`] when the new formatting does not match,
    /// [`CoreDataError::Integrity`] when renaming a descriptor in use,
    /// [`CoreDataError::NotUnique`] when the new name is taken, or a storage
    /// error.
    #[tracing::instrument(skip(self, patch), fields(id = ?patch.id, name = ?patch.name))]
    pub async fn update_value_descriptor(
        &self,
        patch: ValueDescriptorPatch,
    ) -> Result<ValueDescriptor, CoreDataError> {
        let by_id = match patch.id {
            Some(id) => self.descriptors.get_by_id(id).await?,
            None => None,
        };
        let (mut target, renaming) = match (by_id, patch.new_name()) {
            (Some(found), _) => (found, true),
            (None, Some(name)) => (self.get_value_descriptor_by_name(name).await?, false),
            (None, None) => {
                let id = patch.id.map(|id| id.to_string()).unwrap_or_default();
                return Err(not_found("ValueDescriptor", id));
            }
        };

        if let Some(formatting) = patch.new_formatting()
            && !validate_format_string(formatting)?
        {
            return Err(ValidationError::FormatMismatch(formatting.to_string()).into());
        }

        // when the name located the record it cannot also rename it
        if renaming && let Some(new_name) = patch.new_name().filter(|n| *n != target.name) {
            self.ensure_unused(&target.name).await?;
            if self.descriptors.get_by_name(new_name).await?.is_some() {
                return Err(NotUniqueError {
                    entity: "ValueDescriptor",
                    key: new_name.to_string(),
                }
                .into());
            }
        }

        patch.apply(&mut target);
        self.descriptors.update(target).await
    }

    /// Delete a descriptor no reading refers to.
    ///
    /// # Errors
    ///
    /// Returns [`CoreDataError::NotFound`] when no descriptor has `id`,
    /// [`CoreDataError::Integrity`] while readings use its name, or a storage
    /// error.
    #[tracing::instrument(skip(self))]
    pub async fn delete_value_descriptor(&self, id: ValueDescriptorId) -> Result<(), CoreDataError> {
        let descriptor = self.get_value_descriptor(id).await?;
        self.ensure_unused(&descriptor.name).await?;
        self.descriptors.delete(id).await
    }

    /// Delete a descriptor by name, under the same rule as by id.
    ///
    /// # Errors
    ///
    /// See [`ValueDescriptorService::delete_value_descriptor`].
    #[tracing::instrument(skip(self))]
    pub async fn delete_value_descriptor_by_name(&self, name: &str) -> Result<(), CoreDataError> {
        let descriptor = self.get_value_descriptor_by_name(name).await?;
        self.ensure_unused(&descriptor.name).await?;
        self.descriptors.delete(descriptor.id).await
    }

    /// Descriptors named by the profile of the device with directory id `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreDataError::NotFound`] when the directory has no such
    /// device, or a directory/storage error.
    #[tracing::instrument(skip(self))]
    pub async fn value_descriptors_for_device_id(
        &self,
        id: &str,
    ) -> Result<Vec<ValueDescriptor>, CoreDataError> {
        let device = self.resolver.device_by_id(id).await?;
        self.descriptors_for(&device).await
    }

    /// Descriptors named by the profile of the device called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreDataError::NotFound`] when the directory has no such
    /// device, or a directory/storage error.
    #[tracing::instrument(skip(self))]
    pub async fn value_descriptors_for_device_name(
        &self,
        name: &str,
    ) -> Result<Vec<ValueDescriptor>, CoreDataError> {
        let device = self.resolver.device_by_name(name).await?;
        self.descriptors_for(&device).await
    }

    /// Names with no registered descriptor are skipped.
    async fn descriptors_for(&self, device: &Device) -> Result<Vec<ValueDescriptor>, CoreDataError> {
        let mut found = Vec::new();
        for name in device.associated_value_descriptors() {
            if let Some(descriptor) = self.descriptors.get_by_name(&name).await? {
                found.push(descriptor);
            }
        }
        Ok(found)
    }

    async fn ensure_unused(&self, name: &str) -> Result<(), CoreDataError> {
        if self.readings.find_by_name(name, 1).await?.is_empty() {
            Ok(())
        } else {
            Err(IntegrityError::DescriptorInUse(name.to_string()).into())
        }
    }
}
