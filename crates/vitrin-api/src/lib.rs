//! JSON REST API for Vitrin.
//!
//! Exposes an axum [`Router`] backed by any
//! [`vitrin_core::store::CatalogStore`]. TLS, CORS and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", vitrin_api::api_router(state))
//! ```

pub mod auth;
pub mod categories;
pub mod error;
pub mod health;
pub mod home;
pub mod products;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, patch, post},
};
use vitrin_core::store::CatalogStore;

pub use error::ApiError;

// ─── Configuration and state ─────────────────────────────────────────────────

/// API-level settings, independent of any storage backend.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  /// Lifetime of issued bearer tokens, in days.
  pub session_ttl_days: i64,
  /// Deployment environment label reported by `/health`.
  pub environment:      String,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self { session_ttl_days: 7, environment: "development".to_owned() }
  }
}

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: CatalogStore> {
  pub store:  Arc<S>,
  pub config: Arc<ApiConfig>,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Homepage
    .route("/home", get(home::handler::<S>))
    // Products
    .route(
      "/products",
      get(products::list::<S>).post(products::create::<S>),
    )
    .route("/products/search", get(products::search::<S>))
    .route("/products/price-range", get(products::price_range::<S>))
    .route(
      "/products/category/{category_id}",
      get(products::by_category::<S>),
    )
    .route(
      "/products/{id}",
      get(products::get_one::<S>)
        .put(products::update::<S>)
        .delete(products::delete::<S>),
    )
    .route("/products/{id}/stock", patch(products::set_stock::<S>))
    // Categories
    .route(
      "/categories",
      get(categories::list::<S>).post(categories::create::<S>),
    )
    // Auth
    .route("/auth/register", post(auth::register::<S>))
    .route("/auth/login", post(auth::login::<S>))
    .route(
      "/auth/me",
      get(auth::profile::<S>).put(auth::update_profile::<S>),
    )
    // Health
    .route("/health", get(health::handler::<S>))
    .with_state(state)
}
