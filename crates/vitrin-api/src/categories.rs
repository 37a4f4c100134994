//! `/categories` endpoints.

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use vitrin_core::{category::NewCategory, store::CatalogStore};

use crate::{AppState, auth::AdminUser, error::ApiError};

/// `GET /categories`
///
/// All categories with derived product counts, best-stocked first. Ties
/// keep insertion order.
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let mut categories = state
    .store
    .list_categories()
    .await
    .map_err(ApiError::store)?;
  categories.sort_by(|a, b| b.product_count.cmp(&a.product_count));

  Ok(Json(json!({
    "success": true,
    "count": categories.len(),
    "data": categories,
  })))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:        String,
  pub description: Option<String>,
}

/// `POST /categories` (admin)
pub async fn create<S>(
  State(state): State<AppState<S>>,
  AdminUser(_): AdminUser,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let name = body.name.trim();
  if name.is_empty() {
    return Err(ApiError::BadRequest("category name is required".into()));
  }

  let existing = state
    .store
    .list_categories()
    .await
    .map_err(ApiError::store)?;
  if existing.iter().any(|c| c.name.eq_ignore_ascii_case(name)) {
    return Err(ApiError::BadRequest("category already exists".into()));
  }

  let category = state
    .store
    .add_category(NewCategory {
      name:        name.to_owned(),
      description: body.description,
    })
    .await
    .map_err(ApiError::store)?;

  Ok((
    StatusCode::CREATED,
    Json(json!({ "success": true, "data": category })),
  ))
}
