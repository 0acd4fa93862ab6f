use crate::config::DatabaseConfig;
use crate::connection::{ConnectionMonitor, ConnectionState};
use crate::error::Result;
use mongodb::Client;
use mongodb::bson::doc;
use mongodb::event::EventHandler;
use mongodb::event::sdam::SdamEvent;
use mongodb::options::ClientOptions;
use std::time::Duration;

/// Connects to the document store and verifies connectivity with a ping.
///
/// The attempt is bounded by the configured server-selection timeout. On
/// failure the monitor is left in `Errored` and the error is returned; the
/// caller treats this as fatal, so there is no retry or backoff here.
///
/// # Errors
/// Returns `AppError::Database` if the URI cannot be parsed or no server
/// responds within the selection timeout.
pub async fn connect(config: &DatabaseConfig, monitor: &ConnectionMonitor) -> Result<Client> {
    monitor.transition(ConnectionState::Connecting);

    match try_connect(config, monitor).await {
        Ok(client) => {
            monitor.transition(ConnectionState::Connected);
            Ok(client)
        }
        Err(e) => {
            monitor.transition(ConnectionState::Errored);
            Err(e)
        }
    }
}

async fn try_connect(config: &DatabaseConfig, monitor: &ConnectionMonitor) -> Result<Client> {
    let mut options = ClientOptions::parse(&config.mongo_uri).await?;
    options.server_selection_timeout =
        Some(Duration::from_millis(config.server_selection_timeout_ms));
    options.max_idle_time = Some(Duration::from_millis(config.socket_idle_timeout_ms));
    options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
    options.sdam_event_handler = Some(heartbeat_bridge(monitor.clone()));

    let client = Client::with_options(options)?;

    // The driver connects lazily; force an I/O round trip so startup
    // failures surface here instead of on the first real operation.
    client.database("admin").run_command(doc! { "ping": 1 }).await?;

    Ok(client)
}

/// Bridges driver heartbeat events into the connection monitor.
///
/// Mid-life failures are observed and logged through the monitor; they never
/// terminate the process or the listener.
fn heartbeat_bridge(monitor: ConnectionMonitor) -> EventHandler<SdamEvent> {
    EventHandler::callback(move |event: SdamEvent| match event {
        SdamEvent::ServerHeartbeatSucceeded(_) => {
            monitor.transition(ConnectionState::Connected);
        }
        SdamEvent::ServerHeartbeatFailed(ev) => {
            tracing::warn!(error = %ev.failure, "server heartbeat failed");
            monitor.transition(ConnectionState::Errored);
        }
        _ => {}
    })
}

/// Scoped release of the database handle on the shutdown path.
pub async fn disconnect(client: Client, monitor: &ConnectionMonitor) {
    client.shutdown().await;
    monitor.transition(ConnectionState::Disconnected);
    tracing::info!("MongoDB connection closed");
}
