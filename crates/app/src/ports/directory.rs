//! Directory port: read access to devices and timestamp bookkeeping.

use std::future::Future;

use coredata_domain::device::Device;
use coredata_domain::error::CoreDataError;
use coredata_domain::time::Millis;

/// The external device/service directory.
///
/// Lookups answer `Ok(None)` for "no such device"; every other failure is an
/// error, so callers can tell the two apart.
pub trait DeviceDirectory {
    fn device_by_id(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Device>, CoreDataError>> + Send;

    fn device_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Device>, CoreDataError>> + Send;

    fn update_device_last_connected(
        &self,
        device_id: &str,
        at: Millis,
    ) -> impl Future<Output = Result<(), CoreDataError>> + Send;

    fn update_device_last_reported(
        &self,
        device_id: &str,
        at: Millis,
    ) -> impl Future<Output = Result<(), CoreDataError>> + Send;

    fn update_service_last_connected(
        &self,
        service_id: &str,
        at: Millis,
    ) -> impl Future<Output = Result<(), CoreDataError>> + Send;

    fn update_service_last_reported(
        &self,
        service_id: &str,
        at: Millis,
    ) -> impl Future<Output = Result<(), CoreDataError>> + Send;
}
