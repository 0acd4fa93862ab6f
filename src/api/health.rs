use crate::api::AppState;
use axum::extract::State;

/// Liveness route: returns a fixed body confirming the process is alive.
///
/// The response is independent of database health; the current connection
/// state is logged at debug level for diagnostics only.
pub async fn root(State(state): State<AppState>) -> &'static str {
    tracing::debug!(connection_state = ?*state.connection.borrow(), "liveness probe");
    "Node K8s App running!"
}
