//! # coredata-adapter-directory-http
//!
//! Directory adapter: talks to the device metadata service over HTTP.
//!
//! ## Responsibilities
//! - Look devices up by opaque id or by canonical name
//! - Push last-connected / last-reported timestamps for devices and device services
//!
//! ## Dependency rule
//! Depends on `coredata-app` (for the [`DeviceDirectory`](coredata_app::ports::DeviceDirectory)
//! port) and `coredata-domain`.

pub mod client;
pub mod config;
pub mod error;

pub use client::HttpDeviceDirectory;
pub use config::DirectoryConfig;
pub use error::DirectoryError;
