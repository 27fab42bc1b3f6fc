//! # coredata-adapter-mqtt
//!
//! MQTT adapter: forwards accepted events to a broker as JSON.
//!
//! Publishing is fire-and-forget from the caller's point of view. The client
//! queues the message and a background task drives the connection.
//!
//! ## Dependency rule
//! Same as other adapters: depends on `coredata-app` and `coredata-domain`.

pub mod config;
pub mod error;
pub mod transport;

pub use config::MqttConfig;
pub use error::MqttError;
pub use transport::MqttTransport;
