use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fields of a per-currency quote, in the order the listings endpoint returns them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteField {
    Price,
    PercentChange1h,
    PercentChange24h,
    PercentChange7d,
    PercentChange30d,
    PercentChange60d,
    PercentChange90d,
    MarketCap,
    Volume24h,
}

impl QuoteField {
    pub const ALL: [QuoteField; 9] = [
        QuoteField::Price,
        QuoteField::PercentChange1h,
        QuoteField::PercentChange24h,
        QuoteField::PercentChange7d,
        QuoteField::PercentChange30d,
        QuoteField::PercentChange60d,
        QuoteField::PercentChange90d,
        QuoteField::MarketCap,
        QuoteField::Volume24h,
    ];

    /// The six percent-change horizons, shortest first.
    pub const PERCENT_CHANGES: [QuoteField; 6] = [
        QuoteField::PercentChange1h,
        QuoteField::PercentChange24h,
        QuoteField::PercentChange7d,
        QuoteField::PercentChange30d,
        QuoteField::PercentChange60d,
        QuoteField::PercentChange90d,
    ];

    /// Key used by the listings API inside a `quote.<CUR>` object.
    pub fn key(self) -> &'static str {
        match self {
            QuoteField::Price => "price",
            QuoteField::PercentChange1h => "percent_change_1h",
            QuoteField::PercentChange24h => "percent_change_24h",
            QuoteField::PercentChange7d => "percent_change_7d",
            QuoteField::PercentChange30d => "percent_change_30d",
            QuoteField::PercentChange60d => "percent_change_60d",
            QuoteField::PercentChange90d => "percent_change_90d",
            QuoteField::MarketCap => "market_cap",
            QuoteField::Volume24h => "volume_24h",
        }
    }

    pub fn from_key(key: &str) -> Option<QuoteField> {
        QuoteField::ALL.iter().copied().find(|f| f.key() == key)
    }

    /// Short horizon label ("1h", "7d", ...) for percent-change fields, the key otherwise.
    pub fn label(self) -> &'static str {
        let key = self.key();
        key.strip_prefix("percent_change_").unwrap_or(key)
    }

    /// Flattened column name, e.g. `quote.USD.price`.
    pub fn column(self, currency: &str) -> String {
        format!("quote.{}.{}", currency, self.key())
    }
}

/// Priced snapshot of an asset in one currency. `None` marks a value the source did not provide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub price: Option<f64>,
    pub percent_change_1h: Option<f64>,
    pub percent_change_24h: Option<f64>,
    pub percent_change_7d: Option<f64>,
    pub percent_change_30d: Option<f64>,
    pub percent_change_60d: Option<f64>,
    pub percent_change_90d: Option<f64>,
    pub market_cap: Option<f64>,
    pub volume_24h: Option<f64>,
}

impl Quote {
    pub fn get(&self, field: QuoteField) -> Option<f64> {
        match field {
            QuoteField::Price => self.price,
            QuoteField::PercentChange1h => self.percent_change_1h,
            QuoteField::PercentChange24h => self.percent_change_24h,
            QuoteField::PercentChange7d => self.percent_change_7d,
            QuoteField::PercentChange30d => self.percent_change_30d,
            QuoteField::PercentChange60d => self.percent_change_60d,
            QuoteField::PercentChange90d => self.percent_change_90d,
            QuoteField::MarketCap => self.market_cap,
            QuoteField::Volume24h => self.volume_24h,
        }
    }

    pub fn set(&mut self, field: QuoteField, value: Option<f64>) {
        let slot = match field {
            QuoteField::Price => &mut self.price,
            QuoteField::PercentChange1h => &mut self.percent_change_1h,
            QuoteField::PercentChange24h => &mut self.percent_change_24h,
            QuoteField::PercentChange7d => &mut self.percent_change_7d,
            QuoteField::PercentChange30d => &mut self.percent_change_30d,
            QuoteField::PercentChange60d => &mut self.percent_change_60d,
            QuoteField::PercentChange90d => &mut self.percent_change_90d,
            QuoteField::MarketCap => &mut self.market_cap,
            QuoteField::Volume24h => &mut self.volume_24h,
        };
        *slot = value;
    }

    pub fn is_empty(&self) -> bool {
        QuoteField::ALL.iter().all(|f| self.get(*f).is_none())
    }
}

/// One row per (asset, poll timestamp).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetQuoteRecord {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub slug: Option<String>,
    pub cmc_rank: Option<u32>,
    /// Quotes keyed by currency code.
    pub quotes: BTreeMap<String, Quote>,
    pub timestamp: DateTime<Utc>,
}

impl AssetQuoteRecord {
    pub fn quote(&self, currency: &str) -> Option<&Quote> {
        self.quotes.get(currency)
    }

    pub fn value(&self, currency: &str, field: QuoteField) -> Option<f64> {
        self.quote(currency).and_then(|q| q.get(field))
    }

    pub fn price(&self, currency: &str) -> Option<f64> {
        self.value(currency, QuoteField::Price)
    }
}
