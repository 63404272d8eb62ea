//! Storefront REST API access.

mod client;
mod errors;

pub use client::*;
pub use errors::ApiError;
