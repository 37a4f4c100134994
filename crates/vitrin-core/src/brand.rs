//! Brand — listed on the homepage verbatim, no ranking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
  pub id:         Uuid,
  pub name:       String,
  pub logo:       Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub website:    Option<String>,
  pub created_at: DateTime<Utc>,
}

/// Input for creating a brand (id and `created_at` are store-assigned).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBrand {
  pub name:    String,
  pub logo:    Option<String>,
  pub website: Option<String>,
}
