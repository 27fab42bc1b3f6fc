//! Best-effort forwarding of accepted events.

use tracing::{debug, warn};

use coredata_domain::event::Event;

use crate::ports::EventTransport;

/// Wraps an [`EventTransport`] so that send failures never reach the caller.
///
/// One attempt per event. A failed send is logged and the event is not
/// buffered for later.
pub struct ExternalPublisher<T> {
    transport: T,
}

impl<T: EventTransport> ExternalPublisher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Forward `event` downstream, logging any failure.
    #[tracing::instrument(skip(self, event), fields(event_id = %event.id, device = %event.device))]
    pub async fn publish(&self, event: &Event) {
        match self.transport.send(event).await {
            Ok(()) => debug!("event published"),
            Err(err) => warn!(error = %err, "event publish failed, dropping"),
        }
    }
}
