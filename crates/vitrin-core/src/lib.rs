//! Core types and trait definitions for the Vitrin storefront.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod brand;
pub mod campaign;
pub mod category;
pub mod deal;
pub mod error;
pub mod product;
pub mod store;
pub mod testimonial;
pub mod user;

pub use error::{Error, Result};
