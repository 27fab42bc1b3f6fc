//! Event service: ingestion, queries and cascade deletes.
//!
//! Ingestion runs resolve → validate → persist (or skip) → emit side effects
//! → publish. A failure in any of the first three steps aborts the rest.

use tracing::{debug, info};

use coredata_domain::error::{CoreDataError, ValidationError};
use coredata_domain::event::{Event, EventPatch};
use coredata_domain::id::{EventId, SaveOutcome};
use coredata_domain::reading::Reading;
use coredata_domain::side_effect::SideEffect;
use coredata_domain::time::{Millis, now_millis};

use crate::ports::{
    DeviceDirectory, EventRepository, EventTransport, ReadingRepository, SideEffectEmitter,
    ValueDescriptorRepository,
};
use crate::publisher::ExternalPublisher;
use crate::services::device_resolver::DeviceResolver;
use crate::services::not_found;
use crate::services::value_descriptor_service::check_readings;
use crate::settings::CoreSettings;

/// Application service for the event aggregate.
pub struct EventService<E, R, V, D, S, T> {
    events: E,
    readings: R,
    descriptors: V,
    resolver: DeviceResolver<D>,
    side_effects: S,
    publisher: ExternalPublisher<T>,
    settings: CoreSettings,
}

impl<E, R, V, D, S, T> EventService<E, R, V, D, S, T>
where
    E: EventRepository,
    R: ReadingRepository,
    V: ValueDescriptorRepository,
    D: DeviceDirectory,
    S: SideEffectEmitter,
    T: EventTransport,
{
    /// Create a new service from its collaborators.
    pub fn new(
        events: E,
        readings: R,
        descriptors: V,
        resolver: DeviceResolver<D>,
        side_effects: S,
        publisher: ExternalPublisher<T>,
        settings: CoreSettings,
    ) -> Self {
        Self {
            events,
            readings,
            descriptors,
            resolver,
            side_effects,
            publisher,
            settings,
        }
    }

    /// Largest list any query on this service returns.
    #[must_use]
    pub fn read_max_limit(&self) -> usize {
        self.settings.read_max_limit
    }

    /// Ingest an event and its readings.
    ///
    /// Readings take the event's canonical device name. With persistence on,
    /// readings are written first, then the event referencing them. With
    /// persistence off nothing is written and the outcome is
    /// [`SaveOutcome::Unsaved`]. Either way, once the event is accepted the
    /// device and device-service side effects are emitted in that order and
    /// the event is handed to the publisher.
    ///
    /// # Errors
    ///
    /// Returns [`CoreDataError::NotFound`] for an unresolved device in strict
    /// mode, [`CoreDataError::Validation`] when a reading fails its
    /// descriptor, or a storage/directory error. No side effect is emitted on
    /// error.
    #[tracing::instrument(
        skip(self, event),
        fields(device = %event.device, readings = event.readings.len())
    )]
    pub async fn add_event(&self, mut event: Event) -> Result<SaveOutcome<EventId>, CoreDataError> {
        event.device = self.resolver.canonical_name(&event.device).await?;
        check_readings(&self.descriptors, &event.readings, &self.settings).await?;
        for reading in &mut event.readings {
            reading.device.clone_from(&event.device);
        }

        let outcome = if self.settings.persist_data {
            let pending = std::mem::take(&mut event.readings);
            let mut stored = Vec::with_capacity(pending.len());
            for reading in pending {
                stored.push(self.readings.create(reading).await?);
            }
            event.readings = stored;
            event = self.events.create(event).await?;
            SaveOutcome::Saved(event.id)
        } else {
            debug!("persistence disabled, event not stored");
            SaveOutcome::Unsaved
        };

        for effect in SideEffect::last_reported_pair(&event.device) {
            self.side_effects.emit(effect).await;
        }
        self.publisher.publish(&event).await;

        info!(event_id = %outcome, "event accepted");
        Ok(outcome)
    }

    /// # Errors
    ///
    /// Returns [`CoreDataError::NotFound`] when no event has `id`.
    #[tracing::instrument(skip(self))]
    pub async fn get_event(&self, id: EventId) -> Result<Event, CoreDataError> {
        self.events
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found("Event", id))
    }

    /// List every stored event, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_events(&self) -> Result<Vec<Event>, CoreDataError> {
        self.events.get_all().await
    }

    /// Events created within `[start, end]`, at most `limit` (clamped).
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn events_by_created(
        &self,
        start: Millis,
        end: Millis,
        limit: usize,
    ) -> Result<Vec<Event>, CoreDataError> {
        self.events
            .find_by_created(start, end, self.settings.clamp_limit(limit))
            .await
    }

    /// Events of the device named or identified by `token`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreDataError::NotFound`] for an unresolved device in strict
    /// mode, or a storage/directory error.
    #[tracing::instrument(skip(self))]
    pub async fn events_by_device(
        &self,
        token: &str,
        limit: usize,
    ) -> Result<Vec<Event>, CoreDataError> {
        let device = self.resolver.canonical_name(token).await?;
        self.events
            .find_by_device(&device, self.settings.clamp_limit(limit))
            .await
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn count_events(&self) -> Result<u64, CoreDataError> {
        self.events.count().await
    }

    /// # Errors
    ///
    /// Returns [`CoreDataError::NotFound`] for an unresolved device in strict
    /// mode, or a storage/directory error.
    #[tracing::instrument(skip(self))]
    pub async fn count_events_by_device(&self, token: &str) -> Result<u64, CoreDataError> {
        let device = self.resolver.canonical_name(token).await?;
        self.events.count_by_device(&device).await
    }

    /// Readings of one device carrying one descriptor name.
    ///
    /// # Errors
    ///
    /// Returns [`CoreDataError::NotFound`] for an unresolved device in strict
    /// mode, or a storage/directory error.
    #[tracing::instrument(skip(self))]
    pub async fn readings_by_device_and_value_descriptor(
        &self,
        token: &str,
        descriptor: &str,
        limit: usize,
    ) -> Result<Vec<Reading>, CoreDataError> {
        let device = self.resolver.canonical_name(token).await?;
        self.readings
            .find_by_device_and_name(&device, descriptor, self.settings.clamp_limit(limit))
            .await
    }

    /// Delete an event and every reading it owns.
    ///
    /// # Errors
    ///
    /// Returns [`CoreDataError::NotFound`] when no event has `id`, or a
    /// storage error. A storage error part-way leaves the event in place.
    #[tracing::instrument(skip(self))]
    pub async fn delete_event(&self, id: EventId) -> Result<(), CoreDataError> {
        let event = self.get_event(id).await?;
        self.cascade_delete(&event).await
    }

    /// Delete every event of a device. Returns how many were deleted.
    ///
    /// # Errors
    ///
    /// Returns [`CoreDataError::NotFound`] for an unresolved device in strict
    /// mode, or a storage/directory error.
    #[tracing::instrument(skip(self))]
    pub async fn delete_by_device(&self, token: &str) -> Result<u64, CoreDataError> {
        let device = self.resolver.canonical_name(token).await?;
        let events = self.events.find_by_device(&device, usize::MAX).await?;
        self.cascade_delete_all(&events).await
    }

    /// Delete every event created more than `max_age` milliseconds ago.
    ///
    /// # Errors
    ///
    /// Returns [`CoreDataError::Validation`] for a negative `max_age`, or a
    /// storage error propagated from the repositories.
    #[tracing::instrument(skip(self))]
    pub async fn delete_by_age(&self, max_age: Millis) -> Result<u64, CoreDataError> {
        if max_age < 0 {
            return Err(ValidationError::NegativeAge(max_age).into());
        }
        let cutoff = now_millis().saturating_sub(max_age);
        let events = self.events.find_older_than(cutoff).await?;
        self.cascade_delete_all(&events).await
    }

    /// Mark an event as exported.
    ///
    /// # Errors
    ///
    /// Returns [`CoreDataError::NotFound`] when no event has `id`.
    #[tracing::instrument(skip(self))]
    pub async fn touch(&self, id: EventId) -> Result<Event, CoreDataError> {
        let mut event = self.get_event(id).await?;
        event.pushed = now_millis();
        self.events.update(event).await
    }

    /// Merge `patch` into the stored event.
    ///
    /// A supplied device is resolved with the same policy as ingestion.
    ///
    /// # Errors
    ///
    /// Returns [`CoreDataError::NotFound`] when the event does not exist or
    /// its new device does not resolve in strict mode, or a storage error.
    #[tracing::instrument(skip(self, patch), fields(id = %patch.id))]
    pub async fn update_event(&self, patch: EventPatch) -> Result<Event, CoreDataError> {
        let mut event = self.get_event(patch.id).await?;
        if let Some(token) = patch.device_token() {
            event.device = self.resolver.canonical_name(token).await?;
        }
        patch.apply_timestamps(&mut event);
        self.events.update(event).await
    }

    /// Delete every reading, then every event.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repositories.
    #[tracing::instrument(skip(self))]
    pub async fn purge(&self) -> Result<u64, CoreDataError> {
        let readings = self.readings.delete_all().await?;
        let events = self.events.delete_all().await?;
        info!(events, readings, "store purged");
        Ok(events)
    }

    /// Delete every event already exported, with its readings.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repositories.
    #[tracing::instrument(skip(self))]
    pub async fn purge_if_published(&self) -> Result<u64, CoreDataError> {
        let events = self.events.find_pushed().await?;
        self.cascade_delete_all(&events).await
    }

    async fn cascade_delete_all(&self, events: &[Event]) -> Result<u64, CoreDataError> {
        let mut deleted = 0;
        for event in events {
            self.cascade_delete(event).await?;
            deleted += 1;
        }
        info!(deleted, "events deleted");
        Ok(deleted)
    }

    /// Readings first; the event record goes only once all of them are gone.
    async fn cascade_delete(&self, event: &Event) -> Result<(), CoreDataError> {
        for reading in &event.readings {
            self.readings.delete(reading.id).await?;
        }
        self.events.delete(event.id).await
    }
}
