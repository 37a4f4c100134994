//! Error type for `vitrin-store-sqlite`.
//!
//! Domain failures (unknown ids, duplicate names) are expressed as
//! [`vitrin_core::Error`] values wrapped in [`Error::Core`]; the remaining
//! variants cover backend-specific decoding and connectivity failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] vitrin_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
