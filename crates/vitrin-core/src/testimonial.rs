//! Testimonial — a customer quote, listed by recency.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
  pub id:         Uuid,
  pub name:       String,
  pub text:       String,
  pub rating:     f64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub image:      Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub product_id: Option<Uuid>,
  pub created_at: DateTime<Utc>,
}

/// Input for creating a testimonial (id and `created_at` are
/// store-assigned; rating defaults to 5).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTestimonial {
  pub name:       String,
  pub text:       String,
  #[serde(default = "default_rating")]
  pub rating:     f64,
  pub image:      Option<String>,
  pub product_id: Option<Uuid>,
}

fn default_rating() -> f64 { 5.0 }
