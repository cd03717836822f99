use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const API_KEY_ENV: &str = "CMC_PRO_API_KEY";
pub const SANDBOX_ENV: &str = "CMC_USE_SANDBOX";
pub const BASE_URL_ENV: &str = "CMC_BASE_URL";

/// Console rendering options, passed explicitly to the report functions.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayConfig {
    /// Decimal places for floating point cells.
    pub float_precision: usize,
    /// Maximum rows per table; `None` prints everything.
    pub max_rows: Option<usize>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            float_precision: 5,
            max_rows: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Must come from the environment; there is no built-in key.
    pub api_key: Option<String>,
    pub use_sandbox: bool,
    /// Overrides the production/sandbox listings URL.
    pub base_url: Option<String>,
    pub start: u32,
    pub limit: u32,
    pub convert: String,
    pub iterations: usize,
    pub sleep_interval: Duration,
    pub save_plots: bool,
    pub trend_plot_path: PathBuf,
    pub price_plot_path: PathBuf,
    /// Asset drawn on the price-over-time chart.
    pub price_asset: String,
    pub csv_path: PathBuf,
    pub display: DisplayConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            api_key: None,
            use_sandbox: false,
            base_url: None,
            start: 1,
            limit: 15,
            convert: "USD".to_string(),
            iterations: 3,
            sleep_interval: Duration::from_secs(2),
            save_plots: true,
            trend_plot_path: PathBuf::from("crypto_trends.svg"),
            price_plot_path: PathBuf::from("bitcoin_price.svg"),
            price_asset: "Bitcoin".to_string(),
            csv_path: PathBuf::from("crypto_pipeline_demo_data.csv"),
            display: DisplayConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Demo defaults with credentials and endpoint taken from the environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|k| env::var(k).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let non_empty = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        PipelineConfig {
            api_key: non_empty(API_KEY_ENV),
            use_sandbox: non_empty(SANDBOX_ENV).map(|v| parse_flag(&v)).unwrap_or(false),
            base_url: non_empty(BASE_URL_ENV),
            ..PipelineConfig::default()
        }
    }
}

fn parse_flag(v: &str) -> bool {
    matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
