//! Storage port: repository traits for persistence.
//!
//! The store assigns `created` and `modified` on write. List queries return
//! newest first. Nothing here spans more than one record atomically.

use std::future::Future;

use coredata_domain::error::CoreDataError;
use coredata_domain::event::Event;
use coredata_domain::id::{EventId, ReadingId, ValueDescriptorId};
use coredata_domain::reading::Reading;
use coredata_domain::time::Millis;
use coredata_domain::value_descriptor::ValueDescriptor;

/// Persistence for [`Event`] records.
///
/// An event references its readings by id; loading an event loads its
/// readings in ingestion order. Writing an event never writes readings.
pub trait EventRepository {
    fn create(&self, event: Event) -> impl Future<Output = Result<Event, CoreDataError>> + Send;

    fn get_by_id(
        &self,
        id: EventId,
    ) -> impl Future<Output = Result<Option<Event>, CoreDataError>> + Send;

    fn get_all(&self) -> impl Future<Output = Result<Vec<Event>, CoreDataError>> + Send;

    fn count(&self) -> impl Future<Output = Result<u64, CoreDataError>> + Send;

    fn count_by_device(
        &self,
        device: &str,
    ) -> impl Future<Output = Result<u64, CoreDataError>> + Send;

    fn find_by_device(
        &self,
        device: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Event>, CoreDataError>> + Send;

    /// Events with `start <= created <= end`.
    fn find_by_created(
        &self,
        start: Millis,
        end: Millis,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Event>, CoreDataError>> + Send;

    /// Events with `created < cutoff`.
    fn find_older_than(
        &self,
        cutoff: Millis,
    ) -> impl Future<Output = Result<Vec<Event>, CoreDataError>> + Send;

    /// Events with a non-zero `pushed`.
    fn find_pushed(&self) -> impl Future<Output = Result<Vec<Event>, CoreDataError>> + Send;

    /// Overwrite `device`, `pushed` and `origin` of an existing event.
    fn update(&self, event: Event) -> impl Future<Output = Result<Event, CoreDataError>> + Send;

    fn delete(&self, id: EventId) -> impl Future<Output = Result<(), CoreDataError>> + Send;

    /// Delete every event record. Returns the number deleted.
    fn delete_all(&self) -> impl Future<Output = Result<u64, CoreDataError>> + Send;
}

/// Persistence for [`Reading`] records.
pub trait ReadingRepository {
    fn create(
        &self,
        reading: Reading,
    ) -> impl Future<Output = Result<Reading, CoreDataError>> + Send;

    fn get_by_id(
        &self,
        id: ReadingId,
    ) -> impl Future<Output = Result<Option<Reading>, CoreDataError>> + Send;

    fn get_all(&self) -> impl Future<Output = Result<Vec<Reading>, CoreDataError>> + Send;

    fn count(&self) -> impl Future<Output = Result<u64, CoreDataError>> + Send;

    /// Overwrite `name`, `value`, `origin` and `pushed` of an existing reading.
    fn update(
        &self,
        reading: Reading,
    ) -> impl Future<Output = Result<Reading, CoreDataError>> + Send;

    fn delete(&self, id: ReadingId) -> impl Future<Output = Result<(), CoreDataError>> + Send;

    /// Delete every reading. Returns the number deleted.
    fn delete_all(&self) -> impl Future<Output = Result<u64, CoreDataError>> + Send;

    fn find_by_device(
        &self,
        device: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Reading>, CoreDataError>> + Send;

    fn find_by_name(
        &self,
        name: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Reading>, CoreDataError>> + Send;

    /// Readings whose name is any of `names`.
    fn find_by_names(
        &self,
        names: &[String],
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Reading>, CoreDataError>> + Send;

    fn find_by_device_and_name(
        &self,
        device: &str,
        name: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Reading>, CoreDataError>> + Send;

    /// Readings with `start <= created <= end`.
    fn find_by_created(
        &self,
        start: Millis,
        end: Millis,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Reading>, CoreDataError>> + Send;
}

/// Persistence for [`ValueDescriptor`] records.
pub trait ValueDescriptorRepository {
    fn create(
        &self,
        descriptor: ValueDescriptor,
    ) -> impl Future<Output = Result<ValueDescriptor, CoreDataError>> + Send;

    fn get_by_id(
        &self,
        id: ValueDescriptorId,
    ) -> impl Future<Output = Result<Option<ValueDescriptor>, CoreDataError>> + Send;

    fn get_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<ValueDescriptor>, CoreDataError>> + Send;

    fn get_all(&self) -> impl Future<Output = Result<Vec<ValueDescriptor>, CoreDataError>> + Send;

    /// Descriptors whose `labels` contain `label`.
    fn find_by_label(
        &self,
        label: &str,
    ) -> impl Future<Output = Result<Vec<ValueDescriptor>, CoreDataError>> + Send;

    fn find_by_uom_label(
        &self,
        uom_label: &str,
    ) -> impl Future<Output = Result<Vec<ValueDescriptor>, CoreDataError>> + Send;

    fn find_by_type(
        &self,
        value_type: &str,
    ) -> impl Future<Output = Result<Vec<ValueDescriptor>, CoreDataError>> + Send;

    fn update(
        &self,
        descriptor: ValueDescriptor,
    ) -> impl Future<Output = Result<ValueDescriptor, CoreDataError>> + Send;

    fn delete(
        &self,
        id: ValueDescriptorId,
    ) -> impl Future<Output = Result<(), CoreDataError>> + Send;
}
