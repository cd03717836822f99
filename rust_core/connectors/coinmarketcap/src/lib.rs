//! CoinMarketCap listings connector: one-shot fetch with synthetic fallback, and
//! flattening of the nested listings payload into [`AssetQuoteRecord`] rows.
//!
//! [`AssetQuoteRecord`]: connectors_common::types::AssetQuoteRecord

pub mod normalize;
pub mod rest;
pub mod synthetic;

pub use normalize::normalize_listings;
pub use rest::{FetchOutcome, ListingsClient};
