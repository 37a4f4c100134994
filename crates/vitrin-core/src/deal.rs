//! Deal — a time-limited discount on a single product.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::product::Product;

/// A discount with a closed validity window `[starts_at, ends_at]`.
/// Nothing enforces one-deal-per-product; overlapping deals may coexist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
  pub id:               Uuid,
  pub product_id:       Uuid,
  pub discount_percent: i64,
  pub starts_at:        DateTime<Utc>,
  pub ends_at:          DateTime<Utc>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub limited_stock:    Option<i64>,
  pub created_at:       DateTime<Utc>,
}

/// A live deal with its product reference resolved. Deals whose product
/// has since been deleted never materialise into this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveDeal {
  pub id:               Uuid,
  pub discount_percent: i64,
  pub starts_at:        DateTime<Utc>,
  pub ends_at:          DateTime<Utc>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub limited_stock:    Option<i64>,
  pub product:          Product,
}

impl ActiveDeal {
  /// Whether `now` falls inside the closed validity window.
  pub fn is_live(&self, now: DateTime<Utc>) -> bool {
    self.starts_at <= now && self.ends_at >= now
  }
}

/// Input for creating a deal (id and `created_at` are store-assigned).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDeal {
  pub product_id:       Uuid,
  pub discount_percent: i64,
  pub starts_at:        DateTime<Utc>,
  pub ends_at:          DateTime<Utc>,
  pub limited_stock:    Option<i64>,
}
