//! Error types for `vitrin-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("category not found: {0}")]
  CategoryNotFound(Uuid),

  #[error("product not found: {0}")]
  ProductNotFound(Uuid),

  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("category name already taken: {0:?}")]
  DuplicateCategoryName(String),

  #[error("email already registered: {0:?}")]
  DuplicateEmail(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
