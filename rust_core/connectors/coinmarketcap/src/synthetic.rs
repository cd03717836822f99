use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde_json::{json, Map, Value};

struct Baseline {
    id: u64,
    name: &'static str,
    symbol: &'static str,
    slug: &'static str,
    price: f64,
    price_sigma: f64,
    // sigma for 1h, 24h, 7d, 30d, 60d, 90d
    change_sigmas: [f64; 6],
    market_cap: f64,
    volume_24h: f64,
}

const BASELINES: [Baseline; 3] = [
    Baseline {
        id: 1,
        name: "Bitcoin",
        symbol: "BTC",
        slug: "bitcoin",
        price: 45000.50,
        price_sigma: 1000.0,
        change_sigmas: [2.0, 5.0, 10.0, 15.0, 20.0, 25.0],
        market_cap: 800_000_000_000.0,
        volume_24h: 25_000_000_000.0,
    },
    Baseline {
        id: 2,
        name: "Ethereum",
        symbol: "ETH",
        slug: "ethereum",
        price: 3200.75,
        price_sigma: 200.0,
        change_sigmas: [2.0, 5.0, 10.0, 15.0, 20.0, 25.0],
        market_cap: 400_000_000_000.0,
        volume_24h: 15_000_000_000.0,
    },
    Baseline {
        id: 3,
        name: "Tether",
        symbol: "USDT",
        slug: "tether",
        price: 1.00,
        price_sigma: 0.01,
        change_sigmas: [0.1, 0.2, 0.3, 0.5, 0.7, 1.0],
        market_cap: 90_000_000_000.0,
        volume_24h: 50_000_000_000.0,
    },
];

const CHANGE_KEYS: [&str; 6] = [
    "percent_change_1h",
    "percent_change_24h",
    "percent_change_7d",
    "percent_change_30d",
    "percent_change_60d",
    "percent_change_90d",
];

/// Listings-shaped payload with three fixed assets, prices and percent changes
/// perturbed with gaussian noise. The quote is keyed by `currency`.
pub fn synthetic_listings<R: Rng + ?Sized>(rng: &mut R, currency: &str) -> Value {
    let data: Vec<Value> = BASELINES
        .iter()
        .enumerate()
        .map(|(rank, b)| {
            let mut quote = Map::new();
            quote.insert("price".to_string(), json!(b.price + noise(rng, b.price_sigma)));
            for (key, sigma) in CHANGE_KEYS.iter().zip(b.change_sigmas.iter()) {
                quote.insert(key.to_string(), json!(noise(rng, *sigma)));
            }
            quote.insert("market_cap".to_string(), json!(b.market_cap));
            quote.insert("volume_24h".to_string(), json!(b.volume_24h));

            let mut quotes = Map::new();
            quotes.insert(currency.to_string(), Value::Object(quote));
            json!({
                "id": b.id,
                "name": b.name,
                "symbol": b.symbol,
                "slug": b.slug,
                "cmc_rank": rank + 1,
                "quote": Value::Object(quotes),
            })
        })
        .collect();
    json!({ "data": data })
}

fn noise<R: Rng + ?Sized>(rng: &mut R, sigma: f64) -> f64 {
    // sigma is a positive constant from BASELINES, so construction cannot fail
    match Normal::new(0.0, sigma) {
        Ok(normal) => normal.sample(rng),
        Err(_) => 0.0,
    }
}
