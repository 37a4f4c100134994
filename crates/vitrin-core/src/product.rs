//! Product — the catalog item every other merchandising entity hangs off.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::category::CategoryRef;

/// A catalog product as read out of the store, with its category
/// reference already resolved into an embedded `{id, name}` summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id:          Uuid,
  pub name:        String,
  pub description: String,
  pub price:       f64,
  pub image:       String,
  pub category:    CategoryRef,
  pub stock:       i64,
  pub rating:      f64,
  pub num_reviews: i64,
  pub created_at:  DateTime<Utc>,
}

/// Input for creating a product (id and `created_at` are store-assigned).
/// Rating and review count default to zero; only seed tooling sets them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
  pub name:        String,
  pub description: String,
  pub price:       f64,
  pub image:       String,
  pub category_id: Uuid,
  #[serde(default)]
  pub stock:       i64,
  #[serde(default)]
  pub rating:      f64,
  #[serde(default)]
  pub num_reviews: i64,
}

/// Partial update for a product. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
  pub name:        Option<String>,
  pub description: Option<String>,
  pub price:       Option<f64>,
  pub image:       Option<String>,
  pub category_id: Option<Uuid>,
  pub stock:       Option<i64>,
}
