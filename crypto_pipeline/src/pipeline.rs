use crate::config::PipelineConfig;
use crate::plot::{self, PlotError};
use aggregator::{analyze_trends, load_dataset, save_dataset, summarize, Dataset, StorageError, SummaryStats, TrendSummary};
use chrono::Utc;
use connector_coinmarketcap::{normalize_listings, FetchOutcome, ListingsClient};
use log::{info, warn};
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;

/// Owns the listings client and the dataset it accumulates. Every step degrades
/// to a log line and an empty or unchanged result instead of failing.
pub struct CryptoPipeline {
    config: PipelineConfig,
    client: ListingsClient,
    dataset: Dataset,
}

impl CryptoPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let client = match &config.base_url {
            Some(url) => ListingsClient::with_base_url(config.api_key.clone(), url),
            None => ListingsClient::new(config.api_key.clone(), config.use_sandbox),
        };
        if config.api_key.is_none() {
            warn!("no API key configured; listings will use synthetic data");
        }
        CryptoPipeline {
            config,
            client,
            dataset: Dataset::new(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Fetch one batch, flatten it and append it. Returns the batch size.
    pub async fn collect_once(&mut self) -> usize {
        let outcome = self
            .client
            .fetch_listings(self.config.start, self.config.limit, &self.config.convert)
            .await;
        if let FetchOutcome::SyntheticFallback { reason, .. } = &outcome {
            info!("collected synthetic batch ({})", reason);
        }
        // wall clock may step backwards; keep poll timestamps non-decreasing
        let now = Utc::now();
        let collected_at = self.dataset.latest_timestamp().map_or(now, |last| now.max(last));
        let batch = normalize_listings(outcome.payload(), collected_at);
        let n = batch.len();
        self.dataset.append(batch);
        n
    }

    pub async fn run_data_collection(&mut self, iterations: usize, sleep_interval: Duration) {
        info!("starting data collection for {} iterations", iterations);
        for i in 0..iterations {
            info!("iteration {}/{}", i + 1, iterations);
            let n = self.collect_once().await;
            info!("collected {} records, dataset size {}", n, self.dataset.len());
            if i + 1 < iterations {
                info!("sleeping for {:?}", sleep_interval);
                sleep(sleep_interval).await;
            }
        }
        info!("data collection completed");
    }

    pub fn summary_stats(&self) -> SummaryStats {
        summarize(&self.dataset)
    }

    pub fn analyze_price_trends(&self) -> TrendSummary {
        let trends = analyze_trends(&self.dataset, &self.config.convert);
        if self.dataset.is_empty() {
            info!("no data available for analysis");
        } else if trends.is_empty() {
            info!("no trend data available");
        }
        trends
    }

    /// Renders the trend chart when plots are enabled. Returns whether a file was written.
    pub fn visualize_trends(&self) -> bool {
        if !self.config.save_plots {
            return false;
        }
        let trends = self.analyze_price_trends();
        if trends.is_empty() {
            info!("no trend data available for visualization");
            return false;
        }
        report_plot(plot::render_trend_chart(&trends, &self.config.trend_plot_path))
    }

    /// Renders the configured asset's price chart when plots are enabled.
    pub fn visualize_price(&self) -> bool {
        if !self.config.save_plots {
            return false;
        }
        report_plot(plot::render_price_chart(
            &self.dataset,
            &self.config.price_asset,
            &self.config.convert,
            &self.config.price_plot_path,
        ))
    }

    /// Writes the dataset as CSV; an empty dataset writes nothing.
    pub fn save_to_csv<P: AsRef<Path>>(&self, path: P) -> bool {
        if self.dataset.is_empty() {
            info!("no data to save");
            return false;
        }
        match save_dataset(&self.dataset, path.as_ref()) {
            Ok(()) => true,
            Err(e) => {
                warn!("failed to save {}: {}", path.as_ref().display(), e);
                false
            }
        }
    }

    /// Replaces the dataset with the file's contents. On any failure the
    /// current dataset is kept as is.
    pub fn load_from_csv<P: AsRef<Path>>(&mut self, path: P) -> bool {
        match load_dataset(path.as_ref()) {
            Ok(ds) => {
                info!("dataset shape: ({} records)", ds.len());
                self.dataset = ds;
                true
            }
            Err(StorageError::NotFound(p)) => {
                warn!("file {} not found", p.display());
                false
            }
            Err(e) => {
                warn!("failed to load {}: {}", path.as_ref().display(), e);
                false
            }
        }
    }
}

fn report_plot(result: Result<(), PlotError>) -> bool {
    match result {
        Ok(()) => true,
        Err(PlotError::NoData(why)) => {
            info!("{}", why);
            false
        }
        Err(e) => {
            warn!("{}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connectors_common::types::QuoteField;
    use std::fs;
    use tempfile::tempdir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const LISTINGS: &str = r#"{"data":[
        {"id":1,"name":"Bitcoin","symbol":"BTC","slug":"bitcoin","cmc_rank":1,
         "quote":{"USD":{"price":61000.0,"percent_change_1h":1.0,"percent_change_24h":2.0,"percent_change_7d":3.0,
                         "percent_change_30d":4.0,"percent_change_60d":5.0,"percent_change_90d":6.0,
                         "market_cap":1.2e12,"volume_24h":3.0e10}}},
        {"id":1027,"name":"Ethereum","symbol":"ETH","slug":"ethereum","cmc_rank":2,
         "quote":{"USD":{"price":3000.0,"percent_change_1h":-1.0,"percent_change_24h":-2.0,"percent_change_7d":-3.0,
                         "percent_change_30d":-4.0,"percent_change_60d":-5.0,"percent_change_90d":-6.0,
                         "market_cap":3.6e11,"volume_24h":1.5e10}}},
        {"id":825,"name":"Tether","symbol":"USDT","slug":"tether","cmc_rank":3,
         "quote":{"USD":{"price":1.0,"percent_change_1h":0.0,"percent_change_24h":0.0,"percent_change_7d":0.0,
                         "percent_change_30d":0.0,"percent_change_60d":0.0,"percent_change_90d":0.0,
                         "market_cap":1.1e11,"volume_24h":5.0e10}}}
    ]}"#;

    async fn serve_listings() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut sock, _)) = listener.accept().await {
                let mut buf = vec![0u8; 8192];
                let mut read = 0;
                while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                    match sock.read(&mut buf[read..]).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => read += n,
                    }
                }
                let resp = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    LISTINGS.len(),
                    LISTINGS
                );
                let _ = sock.write_all(resp.as_bytes()).await;
                let _ = sock.shutdown().await;
            }
        });
        format!("http://{}/listings", addr)
    }

    fn config_for(url: Option<String>, dir: &Path) -> PipelineConfig {
        PipelineConfig {
            api_key: url.as_ref().map(|_| "test-key".to_string()),
            base_url: url,
            sleep_interval: Duration::from_millis(10),
            trend_plot_path: dir.join("trends.svg"),
            price_plot_path: dir.join("price.svg"),
            csv_path: dir.join("data.csv"),
            ..PipelineConfig::default()
        }
    }

    #[tokio::test]
    async fn test_three_live_iterations_accumulate_nine_rows() {
        let dir = tempdir().unwrap();
        let url = serve_listings().await;
        let mut pipeline = CryptoPipeline::new(config_for(Some(url), dir.path()));
        pipeline.run_data_collection(3, Duration::from_millis(10)).await;

        let ds = pipeline.dataset();
        assert_eq!(ds.len(), 9);
        assert!(ds.records().windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        assert_eq!(ds.records()[3].name.as_deref(), Some("Bitcoin"));
        assert_eq!(ds.records()[4].price("USD"), Some(3000.0));

        let trends = pipeline.analyze_price_trends();
        assert_eq!(trends.rows.len(), 3);
        assert_eq!(trends.mean("Bitcoin", QuoteField::PercentChange90d), Some(6.0));
        assert_eq!(trends.mean("Ethereum", QuoteField::PercentChange1h), Some(-1.0));

        match pipeline.summary_stats() {
            SummaryStats::Stats(s) => {
                assert_eq!(s.total_records, 9);
                assert_eq!(s.unique_assets, 3);
            }
            SummaryStats::NoData => panic!("expected stats"),
        }
    }

    #[tokio::test]
    async fn test_fallback_batch_without_credential() {
        let dir = tempdir().unwrap();
        let mut pipeline = CryptoPipeline::new(config_for(None, dir.path()));
        assert_eq!(pipeline.collect_once().await, 3);
        let names: Vec<&str> = pipeline.dataset().iter().filter_map(|r| r.name.as_deref()).collect();
        assert_eq!(names, vec!["Bitcoin", "Ethereum", "Tether"]);
        let ranks: Vec<Option<u32>> = pipeline.dataset().iter().map(|r| r.cmc_rank).collect();
        assert_eq!(ranks, vec![Some(1), Some(2), Some(3)]);
    }

    #[tokio::test]
    async fn test_save_load_and_plots() {
        let dir = tempdir().unwrap();
        let cfg = config_for(None, dir.path());
        let csv_path = cfg.csv_path.clone();
        let mut pipeline = CryptoPipeline::new(cfg);

        assert!(!pipeline.save_to_csv(&csv_path));
        assert!(!csv_path.exists());
        assert!(pipeline.summary_stats().is_no_data());
        assert!(!pipeline.visualize_trends());

        pipeline.run_data_collection(2, Duration::from_millis(1)).await;
        assert!(pipeline.visualize_trends());
        assert!(pipeline.visualize_price());
        assert!(dir.path().join("trends.svg").exists());
        assert!(fs::read_to_string(dir.path().join("price.svg")).unwrap().contains("Bitcoin"));

        assert!(pipeline.save_to_csv(&csv_path));
        let saved = pipeline.dataset().clone();

        let mut reloaded = CryptoPipeline::new(config_for(None, dir.path()));
        assert!(reloaded.load_from_csv(&csv_path));
        assert_eq!(reloaded.dataset().len(), saved.len());
        for (a, b) in reloaded.dataset().iter().zip(saved.iter()) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.quotes, b.quotes);
            let lost = b.timestamp - a.timestamp;
            assert!(lost >= chrono::Duration::zero() && lost < chrono::Duration::microseconds(1));
        }
    }

    #[tokio::test]
    async fn test_failed_load_keeps_dataset() {
        let dir = tempdir().unwrap();
        let mut pipeline = CryptoPipeline::new(config_for(None, dir.path()));
        pipeline.collect_once().await;
        let before = pipeline.dataset().clone();

        assert!(!pipeline.load_from_csv(dir.path().join("missing.csv")));
        assert_eq!(pipeline.dataset(), &before);

        let bad = dir.path().join("bad.csv");
        fs::write(&bad, "name,timestamp\nBitcoin,not-a-time\n").unwrap();
        assert!(!pipeline.load_from_csv(&bad));
        assert_eq!(pipeline.dataset(), &before);
    }

    #[tokio::test]
    async fn test_plots_skipped_when_disabled() {
        let dir = tempdir().unwrap();
        let cfg = PipelineConfig { save_plots: false, ..config_for(None, dir.path()) };
        let mut pipeline = CryptoPipeline::new(cfg);
        pipeline.collect_once().await;
        assert!(!pipeline.visualize_trends());
        assert!(!pipeline.visualize_price());
        assert!(!dir.path().join("trends.svg").exists());
    }
}
