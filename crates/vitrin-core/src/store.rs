//! The `CatalogStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `vitrin-store-sqlite`).
//! Higher layers (`vitrin-home`, `vitrin-api`) depend on this abstraction,
//! not on any concrete backend, so the homepage composer can be tested
//! against an in-memory fake.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  brand::{Brand, NewBrand},
  campaign::{Campaign, NewCampaign},
  category::{Category, CategoryWithCount, NewCategory},
  deal::{ActiveDeal, Deal, NewDeal},
  product::{NewProduct, Product, ProductUpdate},
  testimonial::{NewTestimonial, Testimonial},
  user::{NewUser, User, UserUpdate},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`CatalogStore::list_campaigns`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CampaignQuery {
  /// Restrict to campaigns with this `active` flag.
  pub active:  Option<bool>,
  /// Restrict to campaigns whose display window contains this instant.
  /// Absent window bounds are unbounded on their side.
  pub live_at: Option<DateTime<Utc>>,
}

/// Sort order for [`CatalogStore::list_products`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductSort {
  /// `created_at` descending.
  #[default]
  Newest,
  /// `num_reviews` descending, then `rating` descending.
  Bestselling,
  /// `price` ascending.
  PriceAsc,
}

/// Parameters for [`CatalogStore::list_products`] and
/// [`CatalogStore::count_products`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductQuery {
  pub category_id: Option<Uuid>,
  pub min_price:   Option<f64>,
  pub max_price:   Option<f64>,
  pub sort:        ProductSort,
  pub limit:       Option<usize>,
  pub offset:      Option<usize>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Vitrin catalog store backend.
///
/// Read operations take typed filter/sort/limit parameters, return plain
/// snapshots with foreign references resolved where documented, and have no
/// side effects. A failed query yields an error with no partial results;
/// callers decide whether to degrade or abort.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CatalogStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// List campaigns matching `query`, in insertion order.
  fn list_campaigns(
    &self,
    query: CampaignQuery,
  ) -> impl Future<Output = Result<Vec<Campaign>, Self::Error>> + Send + '_;

  /// List all categories with their derived product counts, in insertion
  /// order. The count is computed by the read, never persisted.
  fn list_categories(
    &self,
  ) -> impl Future<Output = Result<Vec<CategoryWithCount>, Self::Error>> + Send + '_;

  /// List products matching `query`, category reference resolved.
  fn list_products(
    &self,
    query: ProductQuery,
  ) -> impl Future<Output = Result<Vec<Product>, Self::Error>> + Send + '_;

  /// Count products matching `query` (sort/limit/offset are ignored).
  fn count_products(
    &self,
    query: ProductQuery,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Retrieve a product by id. Returns `None` if not found.
  fn get_product(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Product>, Self::Error>> + Send + '_;

  /// Full-text product search with a typed fallback tier (substring match)
  /// when the primary index yields nothing.
  fn search_products<'a>(
    &'a self,
    terms: &'a str,
  ) -> impl Future<Output = Result<Vec<Product>, Self::Error>> + Send + 'a;

  /// List deals whose validity window contains `live_at`, product resolved.
  /// Deals whose product no longer exists are dropped, not errors.
  fn list_deals(
    &self,
    live_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<ActiveDeal>, Self::Error>> + Send + '_;

  /// List up to `limit` brands, in insertion order.
  fn list_brands(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Brand>, Self::Error>> + Send + '_;

  /// List up to `limit` testimonials, newest first.
  fn list_testimonials(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Testimonial>, Self::Error>> + Send + '_;

  /// Cheap connectivity probe for health checks.
  fn ping(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Catalog writes ────────────────────────────────────────────────────

  /// Create a category. Fails if the name is already taken.
  fn add_category(
    &self,
    input: NewCategory,
  ) -> impl Future<Output = Result<Category, Self::Error>> + Send + '_;

  /// Create a product. Fails if the referenced category does not exist.
  fn add_product(
    &self,
    input: NewProduct,
  ) -> impl Future<Output = Result<Product, Self::Error>> + Send + '_;

  /// Apply a partial update; `None` fields are left untouched.
  /// Fails if the product (or a newly referenced category) does not exist.
  fn update_product(
    &self,
    id: Uuid,
    update: ProductUpdate,
  ) -> impl Future<Output = Result<Product, Self::Error>> + Send + '_;

  /// Overwrite a product's stock level.
  fn set_product_stock(
    &self,
    id: Uuid,
    stock: i64,
  ) -> impl Future<Output = Result<Product, Self::Error>> + Send + '_;

  /// Delete a product and return its id. Fails if not found.
  fn delete_product(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Uuid, Self::Error>> + Send + '_;

  // ── Merchandising writes (seed tooling and admin surfaces) ────────────

  fn add_campaign(
    &self,
    input: NewCampaign,
  ) -> impl Future<Output = Result<Campaign, Self::Error>> + Send + '_;

  fn add_deal(
    &self,
    input: NewDeal,
  ) -> impl Future<Output = Result<Deal, Self::Error>> + Send + '_;

  fn add_brand(
    &self,
    input: NewBrand,
  ) -> impl Future<Output = Result<Brand, Self::Error>> + Send + '_;

  fn add_testimonial(
    &self,
    input: NewTestimonial,
  ) -> impl Future<Output = Result<Testimonial, Self::Error>> + Send + '_;

  // ── Users and sessions ────────────────────────────────────────────────

  /// Create a user. Fails if the email is already registered.
  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user by id. Returns `None` if not found.
  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Look up a user by (case-insensitive) email.
  fn find_user_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Apply a partial profile update. Fails if the user does not exist or a
  /// new email is already taken.
  fn update_user(
    &self,
    id: Uuid,
    update: UserUpdate,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Persist a bearer-token session. `token_hash` is the hex SHA-256 of
  /// the opaque token; the token itself is never stored.
  fn add_session(
    &self,
    user_id: Uuid,
    token_hash: String,
    expires_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Resolve a token hash to its user and expiry instant. Expired
  /// sessions are swept on lookup and resolve to `None`.
  fn find_session<'a>(
    &'a self,
    token_hash: &'a str,
  ) -> impl Future<Output = Result<Option<(User, DateTime<Utc>)>, Self::Error>> + Send + 'a;
}
