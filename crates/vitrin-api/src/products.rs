//! `/products` endpoints — browsing, search and admin CRUD.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use vitrin_core::{
  product::{NewProduct, ProductUpdate},
  store::{CatalogStore, ProductQuery, ProductSort},
};

use crate::{AppState, auth::AdminUser, error::ApiError};

const DEFAULT_PAGE_SIZE: usize = 20;
const MAX_PAGE_SIZE: usize = 100;

// ─── Browsing ────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub page:      Option<usize>,
  pub limit:     Option<usize>,
  pub sort:      Option<String>,
  pub category:  Option<Uuid>,
  pub min_price: Option<f64>,
  pub max_price: Option<f64>,
}

fn parse_sort(sort: Option<&str>) -> Result<ProductSort, ApiError> {
  match sort {
    None | Some("newest") => Ok(ProductSort::Newest),
    Some("bestselling") => Ok(ProductSort::Bestselling),
    Some("price-asc") => Ok(ProductSort::PriceAsc),
    Some(other) => {
      Err(ApiError::BadRequest(format!("unknown sort order: {other}")))
    }
  }
}

/// `GET /products?page=&limit=&sort=&category=&minPrice=&maxPrice=`
///
/// Paginated catalog listing, newest first by default.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let page = params.page.unwrap_or(1).max(1);
  let limit = params
    .limit
    .unwrap_or(DEFAULT_PAGE_SIZE)
    .clamp(1, MAX_PAGE_SIZE);
  let offset = (page - 1)
    .checked_mul(limit)
    .ok_or_else(|| ApiError::BadRequest("page is out of range".into()))?;

  let query = ProductQuery {
    category_id: params.category,
    min_price: params.min_price,
    max_price: params.max_price,
    sort: parse_sort(params.sort.as_deref())?,
    limit: Some(limit),
    offset: Some(offset),
  };

  let total = state
    .store
    .count_products(query)
    .await
    .map_err(ApiError::store)?;
  let products = state
    .store
    .list_products(query)
    .await
    .map_err(ApiError::store)?;

  Ok(Json(json!({
    "success": true,
    "page": page,
    "limit": limit,
    "total": total,
    "totalPages": (total as usize).div_ceil(limit),
    "data": products,
  })))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  pub q: Option<String>,
}

/// `GET /products/search?q=`
///
/// A blank or missing query is an empty result, not an error.
pub async fn search<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let terms = params.q.unwrap_or_default();
  let products = if terms.trim().is_empty() {
    Vec::new()
  } else {
    state
      .store
      .search_products(&terms)
      .await
      .map_err(ApiError::store)?
  };

  Ok(Json(json!({
    "success": true,
    "count": products.len(),
    "data": products,
  })))
}

#[derive(Debug, Deserialize)]
pub struct PriceRangeParams {
  pub min: Option<f64>,
  pub max: Option<f64>,
}

/// `GET /products/price-range?min=&max=` — cheapest first.
pub async fn price_range<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<PriceRangeParams>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  if let (Some(min), Some(max)) = (params.min, params.max)
    && min > max
  {
    return Err(ApiError::BadRequest(
      "min must not be greater than max".into(),
    ));
  }

  let products = state
    .store
    .list_products(ProductQuery {
      min_price: params.min,
      max_price: params.max,
      sort: ProductSort::PriceAsc,
      ..ProductQuery::default()
    })
    .await
    .map_err(ApiError::store)?;

  Ok(Json(json!({
    "success": true,
    "count": products.len(),
    "data": products,
  })))
}

/// `GET /products/category/{category_id}` — newest first within a category.
pub async fn by_category<S>(
  State(state): State<AppState<S>>,
  Path(category_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let products = state
    .store
    .list_products(ProductQuery {
      category_id: Some(category_id),
      ..ProductQuery::default()
    })
    .await
    .map_err(ApiError::store)?;

  Ok(Json(json!({
    "success": true,
    "count": products.len(),
    "data": products,
  })))
}

/// `GET /products/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let product = state
    .store
    .get_product(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("product {id} not found")))?;

  Ok(Json(json!({ "success": true, "data": product })))
}

// ─── Admin CRUD ──────────────────────────────────────────────────────────────

/// Create body — rating and review counts are never client-supplied.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  pub name:        String,
  pub description: String,
  pub price:       f64,
  pub image:       String,
  pub category_id: Uuid,
  #[serde(default)]
  pub stock:       i64,
}

/// `POST /products` (admin)
pub async fn create<S>(
  State(state): State<AppState<S>>,
  AdminUser(_): AdminUser,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("product name is required".into()));
  }
  if body.price < 0.0 {
    return Err(ApiError::BadRequest("price must not be negative".into()));
  }
  if body.stock < 0 {
    return Err(ApiError::BadRequest("stock must not be negative".into()));
  }

  let product = state
    .store
    .add_product(NewProduct {
      name:        body.name.trim().to_owned(),
      description: body.description,
      price:       body.price,
      image:       body.image,
      category_id: body.category_id,
      stock:       body.stock,
      rating:      0.0,
      num_reviews: 0,
    })
    .await
    .map_err(ApiError::store)?;

  Ok((
    StatusCode::CREATED,
    Json(json!({ "success": true, "data": product })),
  ))
}

/// `PUT /products/{id}` (admin)
pub async fn update<S>(
  State(state): State<AppState<S>>,
  AdminUser(_): AdminUser,
  Path(id): Path<Uuid>,
  Json(body): Json<ProductUpdate>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  if body.price.is_some_and(|p| p < 0.0) {
    return Err(ApiError::BadRequest("price must not be negative".into()));
  }
  if body.stock.is_some_and(|s| s < 0) {
    return Err(ApiError::BadRequest("stock must not be negative".into()));
  }

  if state
    .store
    .get_product(id)
    .await
    .map_err(ApiError::store)?
    .is_none()
  {
    return Err(ApiError::NotFound(format!("product {id} not found")));
  }

  let product = state
    .store
    .update_product(id, body)
    .await
    .map_err(ApiError::store)?;

  Ok(Json(json!({ "success": true, "data": product })))
}

#[derive(Debug, Deserialize)]
pub struct StockBody {
  pub stock: i64,
}

/// `PATCH /products/{id}/stock` (admin)
pub async fn set_stock<S>(
  State(state): State<AppState<S>>,
  AdminUser(_): AdminUser,
  Path(id): Path<Uuid>,
  Json(body): Json<StockBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  if body.stock < 0 {
    return Err(ApiError::BadRequest("stock must not be negative".into()));
  }

  if state
    .store
    .get_product(id)
    .await
    .map_err(ApiError::store)?
    .is_none()
  {
    return Err(ApiError::NotFound(format!("product {id} not found")));
  }

  let product = state
    .store
    .set_product_stock(id, body.stock)
    .await
    .map_err(ApiError::store)?;

  Ok(Json(json!({ "success": true, "data": product })))
}

/// `DELETE /products/{id}` (admin)
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  AdminUser(_): AdminUser,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  if state
    .store
    .get_product(id)
    .await
    .map_err(ApiError::store)?
    .is_none()
  {
    return Err(ApiError::NotFound(format!("product {id} not found")));
  }

  state.store.delete_product(id).await.map_err(ApiError::store)?;

  Ok(Json(json!({ "success": true, "data": { "id": id } })))
}
