//! `/health` — liveness probe that also reports store connectivity.

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use vitrin_core::store::CatalogStore;

use crate::AppState;

/// `GET /health`
///
/// Always 200; a broken store is reported in the body so load balancers
/// keep the process alive while operators see the failure.
pub async fn handler<S>(State(state): State<AppState<S>>) -> impl IntoResponse
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let db = match state.store.ping().await {
    Ok(()) => "connected",
    Err(error) => {
      tracing::warn!(%error, "health check failed to reach store");
      "disconnected"
    }
  };

  Json(json!({
    "ok": true,
    "db": db,
    "environment": state.config.environment,
  }))
}
