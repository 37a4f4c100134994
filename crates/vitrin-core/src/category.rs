//! Category — a product grouping with a unique name.
//!
//! A category's product count is derived at read time by counting products
//! that reference it; it is never persisted on the category itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
  pub id:          Uuid,
  pub name:        String,
  pub description: Option<String>,
  pub created_at:  DateTime<Utc>,
}

/// A category together with its derived product count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithCount {
  pub id:            Uuid,
  pub name:          String,
  pub description:   Option<String>,
  pub created_at:    DateTime<Utc>,
  pub product_count: u64,
}

/// The slim embedded form a product carries after resolving its
/// category reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRef {
  pub id:   Uuid,
  pub name: String,
}

/// Input for creating a category (id and `created_at` are store-assigned).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
  pub name:        String,
  pub description: Option<String>,
}
