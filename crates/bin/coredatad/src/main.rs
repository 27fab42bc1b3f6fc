//! # coredatad: core data daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Install the `tracing` subscriber
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct the directory client, the MQTT publisher and the side-effect bus
//! - Construct application services, injecting adapters via port traits
//! - Build the axum router and serve until SIGINT/SIGTERM
//! - Drain the side-effect queues before exiting
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use coredata_adapter_directory_http::HttpDeviceDirectory;
use coredata_adapter_http_axum::{AppState, Backend};
use coredata_adapter_mqtt::MqttTransport;
use coredata_adapter_storage_sqlite_sqlx::{
    Config as StorageConfig, SqliteEventRepository, SqliteReadingRepository,
    SqliteValueDescriptorRepository,
};
use coredata_app::ports::EventTransport;
use coredata_app::publisher::ExternalPublisher;
use coredata_app::services::device_resolver::DeviceResolver;
use coredata_app::services::event_service::EventService;
use coredata_app::services::reading_service::ReadingService;
use coredata_app::services::value_descriptor_service::ValueDescriptorService;
use coredata_app::side_effects::{self, LastReportedUpdater, SideEffectBus};
use coredata_domain::error::CoreDataError;
use coredata_domain::event::Event;

use crate::config::Config;

/// Outbound transport selected by configuration.
enum Transport {
    Mqtt(MqttTransport),
    Disabled,
}

impl EventTransport for Transport {
    async fn send(&self, event: &Event) -> Result<(), CoreDataError> {
        match self {
            Self::Mqtt(transport) => transport.send(event).await,
            Self::Disabled => Ok(()),
        }
    }
}

/// The production adapter set.
struct Daemon;

impl Backend for Daemon {
    type Events = SqliteEventRepository;
    type Readings = SqliteReadingRepository;
    type Descriptors = SqliteValueDescriptorRepository;
    type Directory = HttpDeviceDirectory;
    type SideEffects = SideEffectBus;
    type Transport = Transport;
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    let filter = EnvFilter::try_new(&config.logging.filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = config.core_settings();
    tracing::info!(?settings, "starting coredatad");

    // Database
    let db = StorageConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();

    // Repositories
    let events = SqliteEventRepository::new(pool.clone());
    let readings = SqliteReadingRepository::new(pool.clone());
    let descriptors = SqliteValueDescriptorRepository::new(pool);

    // Directory and side effects
    let directory = HttpDeviceDirectory::new(&config.metadata)?;
    let resolver = DeviceResolver::new(directory.clone(), settings.metadata_check_strict);
    let (bus, queues) = side_effects::channel(config.side_effects.queue_capacity);
    let consumers = queues.spawn(LastReportedUpdater::new(
        directory,
        settings.update_device_last_connected,
        settings.update_service_last_connected,
    ));

    // Publisher
    let transport = if config.publisher.enabled {
        let (transport, _event_loop) = MqttTransport::connect(&config.publisher.mqtt);
        tracing::info!(topic = %config.publisher.mqtt.topic, "publishing events over MQTT");
        Transport::Mqtt(transport)
    } else {
        Transport::Disabled
    };

    // Services
    let event_service = EventService::new(
        events,
        readings.clone(),
        descriptors.clone(),
        resolver.clone(),
        bus,
        ExternalPublisher::new(transport),
        settings,
    );
    let reading_service = ReadingService::new(
        readings.clone(),
        descriptors.clone(),
        resolver.clone(),
        settings,
    );
    let value_descriptor_service = ValueDescriptorService::new(descriptors, readings, resolver);

    // HTTP
    let state = AppState::<Daemon>::new(event_service, reading_service, value_descriptor_service);
    let app = coredata_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "coredatad listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router owned the last bus sender; the consumers exit once drained.
    for consumer in consumers {
        consumer.await?;
    }
    tracing::info!("coredatad shut down");

    Ok(())
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received SIGINT, initiating graceful shutdown"),
        () = terminate => tracing::info!("received SIGTERM, initiating graceful shutdown"),
    }
}
