#![allow(dead_code)]

use k8s_demo_server::api::{self, AppState};
use k8s_demo_server::connection::ConnectionMonitor;
use std::net::SocketAddr;
use std::sync::Once;
use tokio::sync::watch;
use tokio::task::JoinHandle;

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("k8s_demo_server=debug".parse().unwrap())
            .add_directive("tower=warn".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}

pub struct TestApp {
    pub base_url: String,
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    pub monitor: ConnectionMonitor,
    pub shutdown_tx: watch::Sender<bool>,
    pub server_handle: JoinHandle<Result<(), std::io::Error>>,
}

impl TestApp {
    /// Spawns the router on an ephemeral port without a live database.
    ///
    /// The liveness route never touches the store, so the tests only need the
    /// monitor handle to drive connection states.
    pub async fn spawn() -> Self {
        setup_tracing();

        let monitor = ConnectionMonitor::new();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let app = api::app_router(AppState { connection: monitor.subscribe() });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read listener address");

        let mut serve_rx = shutdown_rx;
        let server_handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = serve_rx.wait_for(|&s| s).await;
                })
                .await
        });

        Self {
            base_url: format!("http://{addr}"),
            addr,
            client: reqwest::Client::new(),
            monitor,
            shutdown_tx,
            server_handle,
        }
    }
}
