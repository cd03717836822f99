use chrono::{DateTime, Utc};
use connectors_common::types::{AssetQuoteRecord, Quote, QuoteField};
use log::debug;
use serde_json::Value;
use std::collections::BTreeMap;

/// Flatten a listings payload into one record per entry of its `data` array,
/// each stamped with `collected_at`.
///
/// A payload without a `data` array yields no records. Fields that are missing
/// or carry the wrong JSON type are kept as `None`.
pub fn normalize_listings(payload: &Value, collected_at: DateTime<Utc>) -> Vec<AssetQuoteRecord> {
    let entries = match payload.get("data").and_then(|d| d.as_array()) {
        Some(arr) => arr,
        None => {
            debug!("listings payload has no data array");
            return Vec::new();
        }
    };
    entries
        .iter()
        .filter(|e| e.is_object())
        .map(|e| normalize_entry(e, collected_at))
        .collect()
}

fn normalize_entry(entry: &Value, collected_at: DateTime<Utc>) -> AssetQuoteRecord {
    let text = |key: &str| entry.get(key).and_then(|v| v.as_str()).map(str::to_string);
    let mut quotes = BTreeMap::new();
    if let Some(obj) = entry.get("quote").and_then(|q| q.as_object()) {
        for (currency, fields) in obj {
            if fields.is_object() {
                quotes.insert(currency.clone(), normalize_quote(fields));
            }
        }
    }
    AssetQuoteRecord {
        id: entry.get("id").and_then(|v| v.as_u64()),
        name: text("name"),
        symbol: text("symbol"),
        slug: text("slug"),
        cmc_rank: entry
            .get("cmc_rank")
            .and_then(|v| v.as_u64())
            .and_then(|r| u32::try_from(r).ok()),
        quotes,
        timestamp: collected_at,
    }
}

fn normalize_quote(fields: &Value) -> Quote {
    let mut quote = Quote::default();
    for field in QuoteField::ALL {
        quote.set(field, fields.get(field.key()).and_then(|v| v.as_f64()));
    }
    quote
}
