//! User account types.
//!
//! Password hashing and token issuance live in the API layer; the store
//! only ever sees finished PHC hash strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id:            Uuid,
  pub name:          String,
  pub email:         String,
  /// Argon2 PHC string. Never serialized outward.
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub is_admin:      bool,
  pub created_at:    DateTime<Utc>,
}

/// Input for creating a user (id and `created_at` are store-assigned).
#[derive(Debug, Clone)]
pub struct NewUser {
  pub name:          String,
  pub email:         String,
  pub password_hash: String,
  pub is_admin:      bool,
}

/// Partial update for the authenticated user's own profile.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
  pub name:          Option<String>,
  pub email:         Option<String>,
  pub password_hash: Option<String>,
}
