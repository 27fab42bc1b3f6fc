//! Shared application state for axum handlers.

use std::sync::Arc;

use coredata_app::ports::{
    DeviceDirectory, EventRepository, EventTransport, ReadingRepository, SideEffectEmitter,
    ValueDescriptorRepository,
};
use coredata_app::services::event_service::EventService;
use coredata_app::services::reading_service::ReadingService;
use coredata_app::services::value_descriptor_service::ValueDescriptorService;

/// The concrete adapter types a deployment plugs into the services.
///
/// Grouping them behind one trait keeps handler signatures to a single
/// generic parameter.
pub trait Backend: Send + Sync + 'static {
    type Events: EventRepository + Send + Sync + 'static;
    type Readings: ReadingRepository + Send + Sync + 'static;
    type Descriptors: ValueDescriptorRepository + Send + Sync + 'static;
    type Directory: DeviceDirectory + Send + Sync + 'static;
    type SideEffects: SideEffectEmitter + Send + Sync + 'static;
    type Transport: EventTransport + Send + Sync + 'static;
}

pub type EventServiceOf<B> = EventService<
    <B as Backend>::Events,
    <B as Backend>::Readings,
    <B as Backend>::Descriptors,
    <B as Backend>::Directory,
    <B as Backend>::SideEffects,
    <B as Backend>::Transport,
>;

pub type ReadingServiceOf<B> = ReadingService<
    <B as Backend>::Readings,
    <B as Backend>::Descriptors,
    <B as Backend>::Directory,
>;

pub type ValueDescriptorServiceOf<B> = ValueDescriptorService<
    <B as Backend>::Descriptors,
    <B as Backend>::Readings,
    <B as Backend>::Directory,
>;

/// Application state shared across all axum handlers.
///
/// `Clone` is implemented manually so the underlying types themselves do not
/// need to be `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<B: Backend> {
    pub event_service: Arc<EventServiceOf<B>>,
    pub reading_service: Arc<ReadingServiceOf<B>>,
    pub value_descriptor_service: Arc<ValueDescriptorServiceOf<B>>,
    /// Largest list an unbounded `GET` may return.
    pub read_max_limit: usize,
}

impl<B: Backend> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            event_service: Arc::clone(&self.event_service),
            reading_service: Arc::clone(&self.reading_service),
            value_descriptor_service: Arc::clone(&self.value_descriptor_service),
            read_max_limit: self.read_max_limit,
        }
    }
}

impl<B: Backend> AppState<B> {
    /// Create a new application state from service instances.
    pub fn new(
        event_service: EventServiceOf<B>,
        reading_service: ReadingServiceOf<B>,
        value_descriptor_service: ValueDescriptorServiceOf<B>,
    ) -> Self {
        let read_max_limit = event_service.read_max_limit();
        Self {
            event_service: Arc::new(event_service),
            reading_service: Arc::new(reading_service),
            value_descriptor_service: Arc::new(value_descriptor_service),
            read_max_limit,
        }
    }
}
