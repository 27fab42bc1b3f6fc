//! [`EventTransport`] over MQTT.

use std::time::Duration;

use rumqttc::{AsyncClient, Event as MqttEvent, EventLoop, MqttOptions, Packet, QoS};
use tokio::task::JoinHandle;

use coredata_app::ports::EventTransport;
use coredata_domain::error::CoreDataError;
use coredata_domain::event::Event;

use crate::config::MqttConfig;
use crate::error::MqttError;

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Publishes events as JSON to a single topic.
#[derive(Clone)]
pub struct MqttTransport {
    client: AsyncClient,
    topic: String,
}

impl MqttTransport {
    /// Create the client and spawn the task driving its event loop.
    ///
    /// The connection is established lazily by the event loop; publishing
    /// before it is up queues the message.
    #[must_use]
    pub fn connect(config: &MqttConfig) -> (Self, JoinHandle<()>) {
        let mut options = MqttOptions::new(
            config.client_id.clone(),
            config.broker_host.clone(),
            config.broker_port,
        );
        options.set_keep_alive(config.keep_alive());

        let (client, eventloop) = AsyncClient::new(options, config.queue_capacity.max(1));
        let handle = tokio::spawn(drive(eventloop));

        (Self::new(client, config.topic.clone()), handle)
    }

    fn new(client: AsyncClient, topic: String) -> Self {
        Self { client, topic }
    }

    fn publish(&self, event: &Event) -> Result<(), MqttError> {
        let payload = serde_json::to_vec(event).map_err(MqttError::Payload)?;
        self.client
            .try_publish(self.topic.as_str(), QoS::AtLeastOnce, false, payload)
            .map_err(MqttError::Client)
    }
}

impl EventTransport for MqttTransport {
    async fn send(&self, event: &Event) -> Result<(), CoreDataError> {
        self.publish(event)?;
        tracing::debug!(topic = %self.topic, event_id = %event.id, "event queued for publish");
        Ok(())
    }
}

async fn drive(mut eventloop: EventLoop) {
    loop {
        match eventloop.poll().await {
            Ok(MqttEvent::Incoming(Packet::ConnAck(_))) => {
                tracing::info!("connected to MQTT broker");
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(error = %err, "MQTT connection error, retrying");
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}
