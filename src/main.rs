#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

use k8s_demo_server::api::{self, AppState};
use k8s_demo_server::config::Config;
use k8s_demo_server::connection::{self, ConnectionMonitor};
use k8s_demo_server::{storage, telemetry};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    telemetry::init_telemetry(&config.telemetry);

    k8s_demo_server::setup_panic_hook();

    // Phase 1: Infrastructure Setup (Resources)
    let monitor = ConnectionMonitor::new();
    let state_logger = connection::spawn_state_logger(monitor.subscribe());

    // A startup connection failure is fatal: the listener never binds and the
    // process exits non-zero.
    let client = match storage::connect(&config.database, &monitor).await {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "Fatal: could not connect to MongoDB");
            return Err(e.into());
        }
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    k8s_demo_server::spawn_signal_handler(shutdown_tx);

    // Phase 2: Runtime Setup (Listener and Router)
    let app = api::app_router(AppState { connection: monitor.subscribe() });

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, "listening");

    let mut serve_rx = shutdown_rx.clone();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = serve_rx.wait_for(|&s| s).await;
    });

    // Phase 3: Serve until the cancellation signal fires, bounding the drain.
    let mut drain_rx = shutdown_rx;
    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Server error");
            }
        }
        () = async {
            let _ = drain_rx.wait_for(|&s| s).await;
            tokio::time::sleep(Duration::from_secs(config.server.shutdown_timeout_secs)).await;
        } => {
            tracing::warn!("Timeout waiting for connections to drain");
        }
    }

    // Phase 4: Scoped release of the database handle before exiting.
    storage::disconnect(client, &monitor).await;

    // Give the observer a moment to flush the terminal transition.
    let _ = tokio::time::timeout(Duration::from_secs(1), state_logger).await;

    Ok(())
}
