use crate::synthetic::synthetic_listings;
use connectors_common::errors::ConnectorError;
use log::{info, warn};
use reqwest::Client;
use serde_json::Value;

pub const PRODUCTION_URL: &str = "https://pro-api.coinmarketcap.com/v1/cryptocurrency/listings/latest";
pub const SANDBOX_URL: &str = "https://sandbox-api.coinmarketcap.com/v1/cryptocurrency/listings/latest";
pub const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";

/// Result of one listings request. Failures never escape: they are replaced by
/// a synthetic payload that carries the reason.
#[derive(Debug)]
pub enum FetchOutcome {
    LiveData(Value),
    SyntheticFallback { payload: Value, reason: ConnectorError },
}

impl FetchOutcome {
    pub fn payload(&self) -> &Value {
        match self {
            FetchOutcome::LiveData(v) => v,
            FetchOutcome::SyntheticFallback { payload, .. } => payload,
        }
    }

    pub fn into_payload(self) -> Value {
        match self {
            FetchOutcome::LiveData(v) => v,
            FetchOutcome::SyntheticFallback { payload, .. } => payload,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, FetchOutcome::LiveData(_))
    }
}

pub struct ListingsClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ListingsClient {
    pub fn new(api_key: Option<String>, use_sandbox: bool) -> Self {
        let url = if use_sandbox { SANDBOX_URL } else { PRODUCTION_URL };
        Self::with_base_url(api_key, url)
    }

    pub fn with_base_url(api_key: Option<String>, base_url: &str) -> Self {
        ListingsClient {
            client: Client::new(),
            base_url: base_url.to_string(),
            api_key,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Single attempt at the listings endpoint; any failure falls back to synthetic data.
    pub async fn fetch_listings(&self, start: u32, limit: u32, convert: &str) -> FetchOutcome {
        match self.try_fetch(start, limit, convert).await {
            Ok(v) => {
                info!("fetched listings start={} limit={} convert={}", start, limit, convert);
                FetchOutcome::LiveData(v)
            }
            Err(reason) => {
                warn!("listings request failed: {}; using synthetic data", reason);
                let payload = synthetic_listings(&mut rand::thread_rng(), convert);
                FetchOutcome::SyntheticFallback { payload, reason }
            }
        }
    }

    async fn try_fetch(&self, start: u32, limit: u32, convert: &str) -> Result<Value, ConnectorError> {
        let key = self.api_key.as_deref().ok_or(ConnectorError::MissingCredential)?;
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("start", start.to_string()), ("limit", limit.to_string()), ("convert", convert.to_string())])
            .header("Accepts", "application/json")
            .header(API_KEY_HEADER, key)
            .send()
            .await
            .map_err(|e| ConnectorError::Network(e.to_string()))?;
        let status = resp.status();
        let text = resp.text().await.map_err(|e| ConnectorError::Network(e.to_string()))?;
        if !status.is_success() {
            return Err(ConnectorError::Status { status: status.as_u16(), body: text });
        }
        serde_json::from_str::<Value>(&text).map_err(|e| ConnectorError::Parse(e.to_string()))
    }
}
