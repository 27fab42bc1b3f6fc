//! REST client implementing [`DeviceDirectory`].

use reqwest::{StatusCode, Url};

use coredata_app::ports::DeviceDirectory;
use coredata_domain::device::Device;
use coredata_domain::error::CoreDataError;
use coredata_domain::time::Millis;

use crate::config::DirectoryConfig;
use crate::error::DirectoryError;

const API_PREFIX: [&str; 2] = ["api", "v1"];

/// Device directory backed by the metadata service REST API.
#[derive(Debug, Clone)]
pub struct HttpDeviceDirectory {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpDeviceDirectory {
    /// Build a client for the configured metadata service.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::BaseUrl`] when the base URL does not parse or
    /// cannot carry a path, and [`DirectoryError::Http`] when the underlying
    /// HTTP client cannot be built.
    pub fn new(config: &DirectoryConfig) -> Result<Self, DirectoryError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|_| DirectoryError::BaseUrl(config.base_url.clone()))?;
        if base_url.cannot_be_a_base() {
            return Err(DirectoryError::BaseUrl(config.base_url.clone()));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self { http, base_url })
    }

    /// Build `{base}/api/v1/{segments..}`, percent-encoding each segment.
    fn url(&self, segments: &[&str]) -> Result<Url, DirectoryError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| DirectoryError::BaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(API_PREFIX)
            .extend(segments);
        Ok(url)
    }

    async fn fetch_device(&self, segments: &[&str]) -> Result<Option<Device>, DirectoryError> {
        let url = self.url(segments)?;
        tracing::debug!(path = url.path(), "looking up device");

        let resp = self.http.get(url.clone()).send().await?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(DirectoryError::Status {
                status: status.as_u16(),
                path: url.path().to_string(),
            });
        }
        Ok(Some(resp.json().await?))
    }

    async fn put(&self, segments: &[&str]) -> Result<(), DirectoryError> {
        let url = self.url(segments)?;
        tracing::debug!(path = url.path(), "updating directory timestamp");

        let resp = self.http.put(url.clone()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DirectoryError::Status {
                status: status.as_u16(),
                path: url.path().to_string(),
            });
        }
        Ok(())
    }
}

impl DeviceDirectory for HttpDeviceDirectory {
    async fn device_by_id(&self, id: &str) -> Result<Option<Device>, CoreDataError> {
        Ok(self.fetch_device(&["device", id]).await?)
    }

    async fn device_by_name(&self, name: &str) -> Result<Option<Device>, CoreDataError> {
        Ok(self.fetch_device(&["device", "name", name]).await?)
    }

    async fn update_device_last_connected(
        &self,
        device_id: &str,
        at: Millis,
    ) -> Result<(), CoreDataError> {
        let at = at.to_string();
        Ok(self.put(&["device", device_id, "lastconnected", &at]).await?)
    }

    async fn update_device_last_reported(
        &self,
        device_id: &str,
        at: Millis,
    ) -> Result<(), CoreDataError> {
        let at = at.to_string();
        Ok(self.put(&["device", device_id, "lastreported", &at]).await?)
    }

    async fn update_service_last_connected(
        &self,
        service_id: &str,
        at: Millis,
    ) -> Result<(), CoreDataError> {
        let at = at.to_string();
        Ok(self
            .put(&["deviceservice", service_id, "lastconnected", &at])
            .await?)
    }

    async fn update_service_last_reported(
        &self,
        service_id: &str,
        at: Millis,
    ) -> Result<(), CoreDataError> {
        let at = at.to_string();
        Ok(self
            .put(&["deviceservice", service_id, "lastreported", &at])
            .await?)
    }
}
