//! In-memory collection of listing rows and everything computed from it:
//! per-asset trend means, summary statistics, and CSV persistence.

pub mod dataset;
pub mod storage;
pub mod summary;
pub mod trend;

pub use dataset::Dataset;
pub use storage::{load_dataset, save_dataset, StorageError};
pub use summary::{summarize, DatasetSummary, SummaryStats};
pub use trend::{analyze_trends, TrendRow, TrendSummary};

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use connectors_common::types::{AssetQuoteRecord, Quote, QuoteField};
    use std::collections::BTreeMap;

    pub fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    pub fn at(secs: i64) -> DateTime<Utc> {
        t0() + Duration::seconds(secs)
    }

    /// USD record whose price is `price` and whose percent changes are `changes`.
    pub fn record(name: &str, price: f64, changes: [f64; 6], ts: DateTime<Utc>) -> AssetQuoteRecord {
        let mut quote = Quote { price: Some(price), ..Quote::default() };
        for (field, v) in QuoteField::PERCENT_CHANGES.iter().zip(changes) {
            quote.set(*field, Some(v));
        }
        let mut quotes = BTreeMap::new();
        quotes.insert("USD".to_string(), quote);
        AssetQuoteRecord {
            id: Some(1),
            name: Some(name.to_string()),
            symbol: Some(name.chars().take(3).collect::<String>().to_uppercase()),
            slug: Some(name.to_lowercase()),
            cmc_rank: Some(1),
            quotes,
            timestamp: ts,
        }
    }
}
