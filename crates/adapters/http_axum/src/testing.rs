//! Stub collaborators for router tests.

use coredata_app::ports::{
    DeviceDirectory, EventRepository, EventTransport, ReadingRepository, SideEffectEmitter,
    ValueDescriptorRepository,
};
use coredata_app::publisher::ExternalPublisher;
use coredata_app::services::device_resolver::DeviceResolver;
use coredata_app::services::event_service::EventService;
use coredata_app::services::reading_service::ReadingService;
use coredata_app::services::value_descriptor_service::ValueDescriptorService;
use coredata_app::settings::CoreSettings;
use coredata_domain::device::Device;
use coredata_domain::error::CoreDataError;
use coredata_domain::event::Event;
use coredata_domain::id::{EventId, ReadingId, ValueDescriptorId};
use coredata_domain::reading::Reading;
use coredata_domain::side_effect::SideEffect;
use coredata_domain::time::Millis;
use coredata_domain::value_descriptor::ValueDescriptor;

use crate::state::{AppState, Backend};

/// Read-only store holding a fixed set of events.
#[derive(Clone, Default)]
pub struct StubStore {
    pub events: Vec<Event>,
}

impl EventRepository for StubStore {
    async fn create(&self, event: Event) -> Result<Event, CoreDataError> {
        Ok(event)
    }
    async fn get_by_id(&self, id: EventId) -> Result<Option<Event>, CoreDataError> {
        Ok(self.events.iter().find(|e| e.id == id).cloned())
    }
    async fn get_all(&self) -> Result<Vec<Event>, CoreDataError> {
        Ok(self.events.clone())
    }
    async fn count(&self) -> Result<u64, CoreDataError> {
        Ok(self.events.len() as u64)
    }
    async fn count_by_device(&self, _device: &str) -> Result<u64, CoreDataError> {
        Ok(0)
    }
    async fn find_by_device(&self, _device: &str, _limit: usize) -> Result<Vec<Event>, CoreDataError> {
        Ok(vec![])
    }
    async fn find_by_created(
        &self,
        _start: Millis,
        _end: Millis,
        _limit: usize,
    ) -> Result<Vec<Event>, CoreDataError> {
        Ok(vec![])
    }
    async fn find_older_than(&self, _cutoff: Millis) -> Result<Vec<Event>, CoreDataError> {
        Ok(vec![])
    }
    async fn find_pushed(&self) -> Result<Vec<Event>, CoreDataError> {
        Ok(vec![])
    }
    async fn update(&self, event: Event) -> Result<Event, CoreDataError> {
        Ok(event)
    }
    async fn delete(&self, _id: EventId) -> Result<(), CoreDataError> {
        Ok(())
    }
    async fn delete_all(&self) -> Result<u64, CoreDataError> {
        Ok(0)
    }
}

impl ReadingRepository for StubStore {
    async fn create(&self, reading: Reading) -> Result<Reading, CoreDataError> {
        Ok(reading)
    }
    async fn get_by_id(&self, _id: ReadingId) -> Result<Option<Reading>, CoreDataError> {
        Ok(None)
    }
    async fn get_all(&self) -> Result<Vec<Reading>, CoreDataError> {
        Ok(vec![])
    }
    async fn count(&self) -> Result<u64, CoreDataError> {
        Ok(0)
    }
    async fn update(&self, reading: Reading) -> Result<Reading, CoreDataError> {
        Ok(reading)
    }
    async fn delete(&self, _id: ReadingId) -> Result<(), CoreDataError> {
        Ok(())
    }
    async fn delete_all(&self) -> Result<u64, CoreDataError> {
        Ok(0)
    }
    async fn find_by_device(&self, _device: &str, _limit: usize) -> Result<Vec<Reading>, CoreDataError> {
        Ok(vec![])
    }
    async fn find_by_name(&self, _name: &str, _limit: usize) -> Result<Vec<Reading>, CoreDataError> {
        Ok(vec![])
    }
    async fn find_by_names(
        &self,
        _names: &[String],
        _limit: usize,
    ) -> Result<Vec<Reading>, CoreDataError> {
        Ok(vec![])
    }
    async fn find_by_device_and_name(
        &self,
        _device: &str,
        _name: &str,
        _limit: usize,
    ) -> Result<Vec<Reading>, CoreDataError> {
        Ok(vec![])
    }
    async fn find_by_created(
        &self,
        _start: Millis,
        _end: Millis,
        _limit: usize,
    ) -> Result<Vec<Reading>, CoreDataError> {
        Ok(vec![])
    }
}

impl ValueDescriptorRepository for StubStore {
    async fn create(&self, descriptor: ValueDescriptor) -> Result<ValueDescriptor, CoreDataError> {
        Ok(descriptor)
    }
    async fn get_by_id(
        &self,
        _id: ValueDescriptorId,
    ) -> Result<Option<ValueDescriptor>, CoreDataError> {
        Ok(None)
    }
    async fn get_by_name(&self, _name: &str) -> Result<Option<ValueDescriptor>, CoreDataError> {
        Ok(None)
    }
    async fn get_all(&self) -> Result<Vec<ValueDescriptor>, CoreDataError> {
        Ok(vec![])
    }
    async fn find_by_label(&self, _label: &str) -> Result<Vec<ValueDescriptor>, CoreDataError> {
        Ok(vec![])
    }
    async fn find_by_uom_label(&self, _uom: &str) -> Result<Vec<ValueDescriptor>, CoreDataError> {
        Ok(vec![])
    }
    async fn find_by_type(&self, _value_type: &str) -> Result<Vec<ValueDescriptor>, CoreDataError> {
        Ok(vec![])
    }
    async fn update(&self, descriptor: ValueDescriptor) -> Result<ValueDescriptor, CoreDataError> {
        Ok(descriptor)
    }
    async fn delete(&self, _id: ValueDescriptorId) -> Result<(), CoreDataError> {
        Ok(())
    }
}

/// A directory that knows no devices.
#[derive(Clone)]
pub struct EmptyDirectory;

impl DeviceDirectory for EmptyDirectory {
    async fn device_by_id(&self, _id: &str) -> Result<Option<Device>, CoreDataError> {
        Ok(None)
    }
    async fn device_by_name(&self, _name: &str) -> Result<Option<Device>, CoreDataError> {
        Ok(None)
    }
    async fn update_device_last_connected(&self, _id: &str, _at: Millis) -> Result<(), CoreDataError> {
        Ok(())
    }
    async fn update_device_last_reported(&self, _id: &str, _at: Millis) -> Result<(), CoreDataError> {
        Ok(())
    }
    async fn update_service_last_connected(&self, _id: &str, _at: Millis) -> Result<(), CoreDataError> {
        Ok(())
    }
    async fn update_service_last_reported(&self, _id: &str, _at: Millis) -> Result<(), CoreDataError> {
        Ok(())
    }
}

pub struct NoopEmitter;

impl SideEffectEmitter for NoopEmitter {
    async fn emit(&self, _effect: SideEffect) {}
}

pub struct NoopTransport;

impl EventTransport for NoopTransport {
    async fn send(&self, _event: &Event) -> Result<(), CoreDataError> {
        Ok(())
    }
}

pub struct StubBackend;

impl Backend for StubBackend {
    type Events = StubStore;
    type Readings = StubStore;
    type Descriptors = StubStore;
    type Directory = EmptyDirectory;
    type SideEffects = NoopEmitter;
    type Transport = NoopTransport;
}

/// State over a [`StubStore`] holding `events`, with the given read limit.
pub fn stub_state(events: Vec<Event>, read_max_limit: usize) -> AppState<StubBackend> {
    let settings = CoreSettings {
        read_max_limit,
        ..CoreSettings::default()
    };
    let store = StubStore { events };
    let resolver = DeviceResolver::new(EmptyDirectory, settings.metadata_check_strict);

    AppState::new(
        EventService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            resolver.clone(),
            NoopEmitter,
            ExternalPublisher::new(NoopTransport),
            settings,
        ),
        ReadingService::new(store.clone(), store.clone(), resolver.clone(), settings),
        ValueDescriptorService::new(store.clone(), store, resolver),
    )
}
