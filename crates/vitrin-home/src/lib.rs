//! Homepage composition for Vitrin.
//!
//! Builds the aggregate homepage payload from six independent catalog
//! collections (campaigns, categories, products, deals, brands,
//! testimonials) through any [`CatalogStore`](vitrin_core::store::CatalogStore)
//! backend, and declares the freshness policy intermediary caches should
//! honour. No HTTP and no database code lives here.

pub mod cache;
pub mod compose;

pub use cache::CachePolicy;
pub use compose::{ComposeError, HomePayload, TrustSignal, compose_home};

#[cfg(test)]
mod tests;
