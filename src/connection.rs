//! Connection lifecycle tracking.
//!
//! The database connection is modelled as a small state machine published
//! over a watch channel. The monitor handle is explicitly owned and passed
//! around; there is no ambient global connection state.

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Lifecycle state of the managed database connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Errored,
}

impl ConnectionState {
    /// Legal edges of the lifecycle state machine.
    const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Disconnected, Self::Connecting)
                | (Self::Connecting, Self::Connected | Self::Errored)
                | (Self::Connected, Self::Disconnected | Self::Errored)
                | (Self::Errored, Self::Connected | Self::Disconnected)
        )
    }
}

/// Single-writer handle for publishing connection state transitions.
///
/// Clones share the same underlying channel, so the bootstrap path and the
/// driver's event callback can both publish through it.
#[derive(Clone, Debug)]
pub struct ConnectionMonitor {
    tx: Arc<watch::Sender<ConnectionState>>,
}

impl ConnectionMonitor {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ConnectionState::Disconnected);
        Self { tx: Arc::new(tx) }
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.tx.borrow()
    }

    /// Hands out a receiver for observing transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.tx.subscribe()
    }

    /// Publishes a state change.
    ///
    /// Same-state transitions are suppressed; illegal edges are dropped with
    /// a warning rather than corrupting the state machine.
    pub fn transition(&self, next: ConnectionState) {
        self.tx.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            if !current.can_transition_to(next) {
                tracing::warn!(from = ?current, to = ?next, "ignoring illegal connection state transition");
                return false;
            }
            *current = next;
            true
        });
    }
}

impl Default for ConnectionMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns the observer task that logs connection state transitions.
///
/// Observation is diagnostic only; nothing branches on it. The task exits
/// once the terminal `Disconnected` state is reached or every sender is gone.
pub fn spawn_state_logger(mut rx: watch::Receiver<ConnectionState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = *rx.borrow_and_update();
            match state {
                ConnectionState::Connecting => tracing::info!("Connecting to MongoDB"),
                ConnectionState::Connected => tracing::info!("MongoDB Atlas Connected"),
                ConnectionState::Errored => tracing::warn!("MongoDB connection error"),
                ConnectionState::Disconnected => {
                    tracing::info!("MongoDB Disconnected");
                    break;
                }
            }
        }
    })
}
