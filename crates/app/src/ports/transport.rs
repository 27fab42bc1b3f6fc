//! Transport port: forwards accepted events downstream.

use std::future::Future;

use coredata_domain::error::CoreDataError;
use coredata_domain::event::Event;

/// Outbound message transport. One attempt per call, no retry.
pub trait EventTransport {
    fn send(&self, event: &Event) -> impl Future<Output = Result<(), CoreDataError>> + Send;
}
