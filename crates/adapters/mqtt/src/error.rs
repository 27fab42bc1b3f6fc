//! MQTT adapter error types.

use coredata_domain::error::CoreDataError;

/// Errors specific to the MQTT adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// The rumqttc client refused the request (queue full or loop gone).
    #[error("MQTT client error")]
    Client(#[source] rumqttc::ClientError),

    /// Failed to encode an event as JSON.
    #[error("failed to encode MQTT payload")]
    Payload(#[source] serde_json::Error),
}

impl From<MqttError> for CoreDataError {
    fn from(err: MqttError) -> Self {
        CoreDataError::Unavailable(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_payload_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{{bad").unwrap_err();
        let err = MqttError::Payload(json_err);
        assert_eq!(err.to_string(), "failed to encode MQTT payload");
    }

    #[test]
    fn should_convert_to_unavailable() {
        let json_err = serde_json::from_str::<serde_json::Value>("{{bad").unwrap_err();
        let err: CoreDataError = MqttError::Payload(json_err).into();
        assert!(matches!(err, CoreDataError::Unavailable(_)));
    }
}
