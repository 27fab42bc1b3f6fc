//! In-process side-effect bus backed by bounded tokio [`mpsc`] channels.
//!
//! Each side-effect kind has its own queue and its own consumer task, so a
//! stalled directory call only delays messages of that kind. Emission waits
//! for free capacity once a queue is full.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use coredata_domain::device::Device;
use coredata_domain::error::CoreDataError;
use coredata_domain::side_effect::{SideEffect, SideEffectKind};
use coredata_domain::time::{Millis, now_millis};

use crate::ports::{DeviceDirectory, SideEffectEmitter};

/// Default number of pending messages per queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// Producer half of the bus.
#[derive(Clone)]
pub struct SideEffectBus {
    device: mpsc::Sender<SideEffect>,
    service: mpsc::Sender<SideEffect>,
}

/// Consumer half of the bus, turned into tasks by [`SideEffectQueues::spawn`].
pub struct SideEffectQueues {
    device: mpsc::Receiver<SideEffect>,
    service: mpsc::Receiver<SideEffect>,
}

/// Create a bus whose queues each hold up to `capacity` pending messages.
///
/// A zero capacity is raised to one.
#[must_use]
pub fn channel(capacity: usize) -> (SideEffectBus, SideEffectQueues) {
    let capacity = capacity.max(1);
    let (device_tx, device_rx) = mpsc::channel(capacity);
    let (service_tx, service_rx) = mpsc::channel(capacity);
    (
        SideEffectBus {
            device: device_tx,
            service: service_tx,
        },
        SideEffectQueues {
            device: device_rx,
            service: service_rx,
        },
    )
}

impl SideEffectEmitter for SideEffectBus {
    async fn emit(&self, effect: SideEffect) {
        let queue = match effect.kind() {
            SideEffectKind::Device => &self.device,
            SideEffectKind::DeviceService => &self.service,
        };
        // send only fails once the consumer is gone (shutdown).
        if let Err(err) = queue.send(effect).await {
            warn!(device = err.0.device_name(), "side-effect consumer stopped, dropping message");
        }
    }
}

impl SideEffectQueues {
    /// Spawn one consumer task per queue.
    ///
    /// Each task drains its queue in arrival order and exits when every
    /// [`SideEffectBus`] clone has been dropped.
    pub fn spawn<D>(self, updater: LastReportedUpdater<D>) -> [JoinHandle<()>; 2]
    where
        D: DeviceDirectory + Clone + Send + Sync + 'static,
    {
        [
            tokio::spawn(consume(self.device, updater.clone())),
            tokio::spawn(consume(self.service, updater)),
        ]
    }
}

async fn consume<D: DeviceDirectory>(
    mut queue: mpsc::Receiver<SideEffect>,
    updater: LastReportedUpdater<D>,
) {
    while let Some(effect) = queue.recv().await {
        updater.handle(&effect).await;
    }
    info!("side-effect queue closed");
}

/// Applies side-effect messages to the directory.
///
/// Failures are logged and the message is discarded. Nothing is retried.
#[derive(Clone)]
pub struct LastReportedUpdater<D> {
    directory: D,
    update_device: bool,
    update_service: bool,
}

impl<D: DeviceDirectory> LastReportedUpdater<D> {
    /// Create an updater; the flags gate each message kind.
    pub fn new(directory: D, update_device: bool, update_service: bool) -> Self {
        Self {
            directory,
            update_device,
            update_service,
        }
    }

    /// Process one message.
    #[tracing::instrument(skip(self), fields(device = effect.device_name()))]
    pub async fn handle(&self, effect: &SideEffect) {
        let enabled = match effect.kind() {
            SideEffectKind::Device => self.update_device,
            SideEffectKind::DeviceService => self.update_service,
        };
        if !enabled {
            debug!(kind = ?effect.kind(), "last-connected updates disabled, dropping");
            return;
        }

        let Some(device) = self.find(effect.device_name()).await else {
            warn!("device not found, dropping side effect");
            return;
        };

        let now = now_millis();
        let result = match effect {
            SideEffect::DeviceLastReported { .. } => self.touch_device(&device, now).await,
            SideEffect::DeviceServiceLastReported { .. } => self.touch_service(&device, now).await,
        };
        if let Err(err) = result {
            warn!(error = %err, "last-reported update failed");
        }
    }

    /// Name first, then id; errors count as "not found".
    async fn find(&self, token: &str) -> Option<Device> {
        match self.directory.device_by_name(token).await {
            Ok(Some(device)) => return Some(device),
            Ok(None) => {}
            Err(err) => debug!(error = %err, "device lookup by name failed, trying id"),
        }
        match self.directory.device_by_id(token).await {
            Ok(found) => found,
            Err(err) => {
                debug!(error = %err, "device lookup by id failed");
                None
            }
        }
    }

    async fn touch_device(
        &self,
        device: &Device,
        now: Millis,
    ) -> Result<(), CoreDataError> {
        self.directory
            .update_device_last_connected(&device.id, now)
            .await?;
        self.directory
            .update_device_last_reported(&device.id, now)
            .await
    }

    async fn touch_service(
        &self,
        device: &Device,
        now: Millis,
    ) -> Result<(), CoreDataError> {
        let service_id = &device.service.id;
        self.directory
            .update_service_last_connected(service_id, now)
            .await?;
        self.directory
            .update_service_last_reported(service_id, now)
            .await
    }
}
