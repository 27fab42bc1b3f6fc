//! In-memory port implementations shared by the service tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use coredata_domain::device::{Device, DeviceServiceRef, DeviceProfile, ProfileCommand};
use coredata_domain::error::CoreDataError;
use coredata_domain::event::Event;
use coredata_domain::id::{EventId, ReadingId, ValueDescriptorId};
use coredata_domain::reading::Reading;
use coredata_domain::side_effect::SideEffect;
use coredata_domain::time::Millis;
use coredata_domain::value_descriptor::ValueDescriptor;

use crate::ports::{
    DeviceDirectory, EventRepository, EventTransport, ReadingRepository, SideEffectEmitter,
    ValueDescriptorRepository,
};

#[derive(Debug, thiserror::Error)]
#[error("offline")]
struct Offline;

pub(crate) fn unavailable() -> CoreDataError {
    CoreDataError::Unavailable(Box::new(Offline))
}

/// Stored event: readings kept by id, like a document store would.
#[derive(Clone)]
struct StoredEvent {
    event: Event,
    reading_ids: Vec<ReadingId>,
}

#[derive(Default)]
struct StoreState {
    clock: Millis,
    events: Vec<StoredEvent>,
    readings: Vec<Reading>,
    descriptors: Vec<ValueDescriptor>,
    /// Reading writes still allowed before every further one fails.
    reading_writes_left: Option<usize>,
}

impl StoreState {
    fn tick(&mut self) -> Millis {
        self.clock += 1;
        self.clock
    }

    fn reading_write(&mut self) -> Result<(), CoreDataError> {
        match &mut self.reading_writes_left {
            None => Ok(()),
            Some(0) => Err(unavailable()),
            Some(left) => {
                *left -= 1;
                Ok(())
            }
        }
    }

    fn load(&self, stored: &StoredEvent) -> Event {
        let mut event = stored.event.clone();
        event.readings = stored
            .reading_ids
            .iter()
            .filter_map(|id| self.readings.iter().find(|r| r.id == *id).cloned())
            .collect();
        event
    }

    fn events_where(&self, pred: impl Fn(&Event) -> bool, limit: usize) -> Vec<Event> {
        self.events
            .iter()
            .rev()
            .filter(|s| pred(&s.event))
            .take(limit)
            .map(|s| self.load(s))
            .collect()
    }

    fn readings_where(&self, pred: impl Fn(&Reading) -> bool, limit: usize) -> Vec<Reading> {
        self.readings
            .iter()
            .rev()
            .filter(|r| pred(r))
            .take(limit)
            .cloned()
            .collect()
    }
}

/// One store implementing all three repositories over shared state.
///
/// `created` comes from a logical clock that advances by one per write, so
/// insertion order and creation order agree.
#[derive(Clone, Default)]
pub(crate) struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    pub(crate) fn event_count(&self) -> usize {
        self.state.lock().unwrap().events.len()
    }

    pub(crate) fn reading_count(&self) -> usize {
        self.state.lock().unwrap().readings.len()
    }

    /// Set the logical clock, e.g. to place records relative to "now".
    pub(crate) fn set_clock(&self, at: Millis) {
        self.state.lock().unwrap().clock = at;
    }

    /// Let `n` more reading creates/deletes succeed, then fail the rest.
    pub(crate) fn set_failing_after(&self, n: usize) {
        self.state.lock().unwrap().reading_writes_left = Some(n);
    }
}

impl EventRepository for InMemoryStore {
    async fn create(&self, mut event: Event) -> Result<Event, CoreDataError> {
        let mut state = self.state.lock().unwrap();
        let ts = state.tick();
        event.created = ts;
        event.modified = ts;
        let reading_ids = event.readings.iter().map(|r| r.id).collect();
        state.events.push(StoredEvent {
            event: Event {
                readings: Vec::new(),
                ..event.clone()
            },
            reading_ids,
        });
        Ok(event)
    }

    async fn get_by_id(&self, id: EventId) -> Result<Option<Event>, CoreDataError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .events
            .iter()
            .find(|s| s.event.id == id)
            .map(|s| state.load(s)))
    }

    async fn get_all(&self) -> Result<Vec<Event>, CoreDataError> {
        let state = self.state.lock().unwrap();
        Ok(state.events_where(|_| true, usize::MAX))
    }

    async fn count(&self) -> Result<u64, CoreDataError> {
        Ok(self.state.lock().unwrap().events.len() as u64)
    }

    async fn count_by_device(&self, device: &str) -> Result<u64, CoreDataError> {
        let state = self.state.lock().unwrap();
        Ok(state.events.iter().filter(|s| s.event.device == device).count() as u64)
    }

    async fn find_by_device(&self, device: &str, limit: usize) -> Result<Vec<Event>, CoreDataError> {
        let state = self.state.lock().unwrap();
        Ok(state.events_where(|e| e.device == device, limit))
    }

    async fn find_by_created(
        &self,
        start: Millis,
        end: Millis,
        limit: usize,
    ) -> Result<Vec<Event>, CoreDataError> {
        let state = self.state.lock().unwrap();
        Ok(state.events_where(|e| e.created >= start && e.created <= end, limit))
    }

    async fn find_older_than(&self, cutoff: Millis) -> Result<Vec<Event>, CoreDataError> {
        let state = self.state.lock().unwrap();
        Ok(state.events_where(|e| e.created < cutoff, usize::MAX))
    }

    async fn find_pushed(&self) -> Result<Vec<Event>, CoreDataError> {
        let state = self.state.lock().unwrap();
        Ok(state.events_where(Event::is_pushed, usize::MAX))
    }

    async fn update(&self, event: Event) -> Result<Event, CoreDataError> {
        let mut state = self.state.lock().unwrap();
        let ts = state.tick();
        let stored = state
            .events
            .iter_mut()
            .find(|s| s.event.id == event.id)
            .ok_or_else(unavailable)?;
        stored.event.device.clone_from(&event.device);
        stored.event.pushed = event.pushed;
        stored.event.origin = event.origin;
        stored.event.modified = ts;
        let snapshot = stored.clone();
        Ok(state.load(&snapshot))
    }

    async fn delete(&self, id: EventId) -> Result<(), CoreDataError> {
        self.state.lock().unwrap().events.retain(|s| s.event.id != id);
        Ok(())
    }

    async fn delete_all(&self) -> Result<u64, CoreDataError> {
        let mut state = self.state.lock().unwrap();
        let n = state.events.len() as u64;
        state.events.clear();
        Ok(n)
    }
}

impl ReadingRepository for InMemoryStore {
    async fn create(&self, mut reading: Reading) -> Result<Reading, CoreDataError> {
        let mut state = self.state.lock().unwrap();
        state.reading_write()?;
        let ts = state.tick();
        reading.created = ts;
        reading.modified = ts;
        state.readings.push(reading.clone());
        Ok(reading)
    }

    async fn get_by_id(&self, id: ReadingId) -> Result<Option<Reading>, CoreDataError> {
        let state = self.state.lock().unwrap();
        Ok(state.readings.iter().find(|r| r.id == id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Reading>, CoreDataError> {
        let state = self.state.lock().unwrap();
        Ok(state.readings_where(|_| true, usize::MAX))
    }

    async fn count(&self) -> Result<u64, CoreDataError> {
        Ok(self.state.lock().unwrap().readings.len() as u64)
    }

    async fn update(&self, reading: Reading) -> Result<Reading, CoreDataError> {
        let mut state = self.state.lock().unwrap();
        let ts = state.tick();
        let stored = state
            .readings
            .iter_mut()
            .find(|r| r.id == reading.id)
            .ok_or_else(unavailable)?;
        stored.name.clone_from(&reading.name);
        stored.value.clone_from(&reading.value);
        stored.origin = reading.origin;
        stored.pushed = reading.pushed;
        stored.modified = ts;
        Ok(stored.clone())
    }

    async fn delete(&self, id: ReadingId) -> Result<(), CoreDataError> {
        let mut state = self.state.lock().unwrap();
        state.reading_write()?;
        state.readings.retain(|r| r.id != id);
        Ok(())
    }

    async fn delete_all(&self) -> Result<u64, CoreDataError> {
        let mut state = self.state.lock().unwrap();
        let n = state.readings.len() as u64;
        state.readings.clear();
        Ok(n)
    }

    async fn find_by_device(
        &self,
        device: &str,
        limit: usize,
    ) -> Result<Vec<Reading>, CoreDataError> {
        let state = self.state.lock().unwrap();
        Ok(state.readings_where(|r| r.device == device, limit))
    }

    async fn find_by_name(&self, name: &str, limit: usize) -> Result<Vec<Reading>, CoreDataError> {
        let state = self.state.lock().unwrap();
        Ok(state.readings_where(|r| r.name == name, limit))
    }

    async fn find_by_names(
        &self,
        names: &[String],
        limit: usize,
    ) -> Result<Vec<Reading>, CoreDataError> {
        let state = self.state.lock().unwrap();
        Ok(state.readings_where(|r| names.contains(&r.name), limit))
    }

    async fn find_by_device_and_name(
        &self,
        device: &str,
        name: &str,
        limit: usize,
    ) -> Result<Vec<Reading>, CoreDataError> {
        let state = self.state.lock().unwrap();
        Ok(state.readings_where(|r| r.device == device && r.name == name, limit))
    }

    async fn find_by_created(
        &self,
        start: Millis,
        end: Millis,
        limit: usize,
    ) -> Result<Vec<Reading>, CoreDataError> {
        let state = self.state.lock().unwrap();
        Ok(state.readings_where(|r| r.created >= start && r.created <= end, limit))
    }
}

impl ValueDescriptorRepository for InMemoryStore {
    async fn create(&self, mut descriptor: ValueDescriptor) -> Result<ValueDescriptor, CoreDataError> {
        let mut state = self.state.lock().unwrap();
        let ts = state.tick();
        descriptor.created = ts;
        descriptor.modified = ts;
        state.descriptors.push(descriptor.clone());
        Ok(descriptor)
    }

    async fn get_by_id(
        &self,
        id: ValueDescriptorId,
    ) -> Result<Option<ValueDescriptor>, CoreDataError> {
        let state = self.state.lock().unwrap();
        Ok(state.descriptors.iter().find(|d| d.id == id).cloned())
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<ValueDescriptor>, CoreDataError> {
        let state = self.state.lock().unwrap();
        Ok(state.descriptors.iter().find(|d| d.name == name).cloned())
    }

    async fn get_all(&self) -> Result<Vec<ValueDescriptor>, CoreDataError> {
        Ok(self.state.lock().unwrap().descriptors.clone())
    }

    async fn find_by_label(&self, label: &str) -> Result<Vec<ValueDescriptor>, CoreDataError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .descriptors
            .iter()
            .filter(|d| d.labels.iter().any(|l| l == label))
            .cloned()
            .collect())
    }

    async fn find_by_uom_label(
        &self,
        uom_label: &str,
    ) -> Result<Vec<ValueDescriptor>, CoreDataError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .descriptors
            .iter()
            .filter(|d| d.uom_label == uom_label)
            .cloned()
            .collect())
    }

    async fn find_by_type(&self, value_type: &str) -> Result<Vec<ValueDescriptor>, CoreDataError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .descriptors
            .iter()
            .filter(|d| d.value_type == value_type)
            .cloned()
            .collect())
    }

    async fn update(&self, mut descriptor: ValueDescriptor) -> Result<ValueDescriptor, CoreDataError> {
        let mut state = self.state.lock().unwrap();
        let ts = state.tick();
        let stored = state
            .descriptors
            .iter_mut()
            .find(|d| d.id == descriptor.id)
            .ok_or_else(unavailable)?;
        descriptor.created = stored.created;
        descriptor.modified = ts;
        *stored = descriptor.clone();
        Ok(descriptor)
    }

    async fn delete(&self, id: ValueDescriptorId) -> Result<(), CoreDataError> {
        self.state.lock().unwrap().descriptors.retain(|d| d.id != id);
        Ok(())
    }
}

/// Timestamp update recorded by [`InMemoryDirectory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DirectoryUpdate {
    DeviceLastConnected(String),
    DeviceLastReported(String),
    ServiceLastConnected(String),
    ServiceLastReported(String),
}

#[derive(Default)]
struct DirectoryState {
    devices: HashMap<String, Device>,
    updates: Vec<DirectoryUpdate>,
    offline: bool,
}

/// Directory double keyed by device id.
#[derive(Clone, Default)]
pub(crate) struct InMemoryDirectory {
    state: Arc<Mutex<DirectoryState>>,
}

impl InMemoryDirectory {
    /// A directory holding [`test_device`].
    pub(crate) fn with_test_device() -> Self {
        let directory = Self::default();
        directory.insert(test_device());
        directory
    }

    pub(crate) fn insert(&self, device: Device) {
        let mut state = self.state.lock().unwrap();
        state.devices.insert(device.id.clone(), device);
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    pub(crate) fn updates(&self) -> Vec<DirectoryUpdate> {
        self.state.lock().unwrap().updates.clone()
    }

    fn record(&self, update: DirectoryUpdate) -> Result<(), CoreDataError> {
        let mut state = self.state.lock().unwrap();
        if state.offline {
            return Err(unavailable());
        }
        state.updates.push(update);
        Ok(())
    }
}

impl DeviceDirectory for InMemoryDirectory {
    async fn device_by_id(&self, id: &str) -> Result<Option<Device>, CoreDataError> {
        let state = self.state.lock().unwrap();
        if state.offline {
            return Err(unavailable());
        }
        Ok(state.devices.get(id).cloned())
    }

    async fn device_by_name(&self, name: &str) -> Result<Option<Device>, CoreDataError> {
        let state = self.state.lock().unwrap();
        if state.offline {
            return Err(unavailable());
        }
        Ok(state.devices.values().find(|d| d.name == name).cloned())
    }

    async fn update_device_last_connected(&self, device_id: &str, _at: Millis) -> Result<(), CoreDataError> {
        self.record(DirectoryUpdate::DeviceLastConnected(device_id.to_string()))
    }

    async fn update_device_last_reported(&self, device_id: &str, _at: Millis) -> Result<(), CoreDataError> {
        self.record(DirectoryUpdate::DeviceLastReported(device_id.to_string()))
    }

    async fn update_service_last_connected(&self, service_id: &str, _at: Millis) -> Result<(), CoreDataError> {
        self.record(DirectoryUpdate::ServiceLastConnected(service_id.to_string()))
    }

    async fn update_service_last_reported(&self, service_id: &str, _at: Millis) -> Result<(), CoreDataError> {
        self.record(DirectoryUpdate::ServiceLastReported(service_id.to_string()))
    }
}

/// Emitter double recording every message in order.
#[derive(Clone, Default)]
pub(crate) struct RecordingEmitter {
    effects: Arc<Mutex<Vec<SideEffect>>>,
}

impl RecordingEmitter {
    pub(crate) fn effects(&self) -> Vec<SideEffect> {
        self.effects.lock().unwrap().clone()
    }
}

impl SideEffectEmitter for RecordingEmitter {
    async fn emit(&self, effect: SideEffect) {
        self.effects.lock().unwrap().push(effect);
    }
}

/// Transport double recording sent events; can be switched to fail.
#[derive(Clone, Default)]
pub(crate) struct RecordingTransport {
    sent: Arc<Mutex<Vec<Event>>>,
    failing: Arc<Mutex<bool>>,
}

impl RecordingTransport {
    pub(crate) fn sent(&self) -> Vec<Event> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }
}

impl EventTransport for RecordingTransport {
    async fn send(&self, event: &Event) -> Result<(), CoreDataError> {
        if *self.failing.lock().unwrap() {
            return Err(unavailable());
        }
        self.sent.lock().unwrap().push(event.clone());
        Ok(())
    }
}

pub(crate) const TEST_DEVICE_ID: &str = "5f9d2a";
pub(crate) const TEST_DEVICE_NAME: &str = "Test Device";
pub(crate) const TEST_SERVICE_ID: &str = "svc-01";

/// "Test Device", whose profile reports Temperature and Humidity.
pub(crate) fn test_device() -> Device {
    Device {
        id: TEST_DEVICE_ID.to_string(),
        name: TEST_DEVICE_NAME.to_string(),
        service: DeviceServiceRef {
            id: TEST_SERVICE_ID.to_string(),
            name: "test-service".to_string(),
        },
        profile: DeviceProfile {
            name: "test-profile".to_string(),
            commands: vec![ProfileCommand {
                name: "climate".to_string(),
                get_expected_values: vec!["Temperature".to_string(), "Humidity".to_string()],
                put_parameter_names: vec!["Pressure".to_string()],
            }],
        },
        ..Device::default()
    }
}

/// Float descriptor named "Temperature" with bounds [-40, 125].
pub(crate) fn temperature_descriptor() -> ValueDescriptor {
    ValueDescriptor::builder()
        .name("Temperature")
        .value_type("F")
        .formatting("%.2f")
        .min("-40")
        .max("125")
        .uom_label("degC")
        .label("climate")
        .build()
        .unwrap()
}

/// Integer descriptor named "Humidity" with bounds [0, 100].
pub(crate) fn humidity_descriptor() -> ValueDescriptor {
    ValueDescriptor::builder()
        .name("Humidity")
        .value_type("I")
        .formatting("%d")
        .min("0")
        .max("100")
        .uom_label("percent")
        .label("climate")
        .build()
        .unwrap()
}
