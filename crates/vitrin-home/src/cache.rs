//! Declarative response freshness policy for the homepage payload.
//!
//! The composer itself never memoises; recomputation happens on every
//! call. This policy is attached to the HTTP response so any fronting
//! cache (browser, CDN) can elide repeat requests instead.

use std::time::Duration;

/// Cache lifetimes advertised with a composed homepage response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
  /// How long a client may reuse the payload without revalidation.
  pub max_age:                Duration,
  /// How long a shared cache (CDN) may serve it without origin contact.
  pub s_maxage:               Duration,
  /// How long a shared cache may serve a stale copy while refreshing
  /// in the background.
  pub stale_while_revalidate: Duration,
}

impl Default for CachePolicy {
  fn default() -> Self {
    Self {
      max_age:                Duration::from_secs(60),
      s_maxage:               Duration::from_secs(120),
      stale_while_revalidate: Duration::from_secs(60),
    }
  }
}

impl CachePolicy {
  /// Render the policy as a `Cache-Control` header value.
  pub fn header_value(&self) -> String {
    format!(
      "public, max-age={}, s-maxage={}, stale-while-revalidate={}",
      self.max_age.as_secs(),
      self.s_maxage.as_secs(),
      self.stale_while_revalidate.as_secs(),
    )
  }
}
