//! MQTT publisher configuration.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the MQTT event publisher.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// MQTT broker hostname or IP address.
    pub broker_host: String,
    /// MQTT broker port.
    pub broker_port: u16,
    /// MQTT client identifier.
    pub client_id: String,
    /// Topic every accepted event is published to.
    pub topic: String,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u16,
    /// Outgoing requests buffered while the broker is unreachable.
    pub queue_capacity: usize,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_host: "localhost".to_string(),
            broker_port: 1883,
            client_id: "coredata".to_string(),
            topic: "coredata/events".to_string(),
            keep_alive_secs: 30,
            queue_capacity: 64,
        }
    }
}

impl MqttConfig {
    #[must_use]
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(u64::from(self.keep_alive_secs))
    }
}
