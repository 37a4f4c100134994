//! Handler for `GET /home` — the composed homepage payload.

use axum::{
  Json,
  extract::State,
  http::{HeaderValue, header},
  response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;
use vitrin_core::store::CatalogStore;
use vitrin_home::{CachePolicy, compose_home};

use crate::{AppState, error::ApiError};

/// `GET /home`
///
/// Every successful response carries the declarative cache policy so
/// browsers and CDNs can serve repeats without recomposition; the server
/// itself recomposes on every request.
pub async fn handler<S>(
  State(state): State<AppState<S>>,
) -> Result<Response, ApiError>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let payload = compose_home(state.store.as_ref(), Utc::now()).await?;

  let mut response =
    Json(json!({ "success": true, "data": payload })).into_response();
  response.headers_mut().insert(
    header::CACHE_CONTROL,
    HeaderValue::from_str(&CachePolicy::default().header_value())
      .map_err(ApiError::store)?,
  );
  Ok(response)
}
