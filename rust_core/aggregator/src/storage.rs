//! Flat CSV persistence for a [`Dataset`].
//!
//! Columns are `id,name,symbol,slug,cmc_rank`, then `quote.<CUR>.<field>` for
//! every currency in the dataset, then `timestamp`. Absent values are written
//! as empty cells.

use crate::dataset::Dataset;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use connectors_common::types::{AssetQuoteRecord, Quote, QuoteField};
use csv::{ReaderBuilder, StringRecord, Writer};
use log::info;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
const TIMESTAMP_COLUMN: &str = "timestamp";
const QUOTE_PREFIX: &str = "quote.";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("file {} not found", .0.display())]
    NotFound(PathBuf),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing column: {0}")]
    MissingColumn(String),

    #[error("row {row}: invalid value {value:?} in column {column}")]
    InvalidValue { row: usize, column: String, value: String },
}

pub fn save_dataset<P: AsRef<Path>>(dataset: &Dataset, path: P) -> Result<(), StorageError> {
    let currencies = dataset.currencies();
    let mut writer = Writer::from_path(path.as_ref())?;

    let mut header: Vec<String> = ["id", "name", "symbol", "slug", "cmc_rank"].iter().map(|s| s.to_string()).collect();
    for cur in &currencies {
        header.extend(QuoteField::ALL.iter().map(|f| f.column(cur)));
    }
    header.push(TIMESTAMP_COLUMN.to_string());
    writer.write_record(&header)?;

    for r in dataset {
        let mut row: Vec<String> = vec![
            opt_cell(r.id),
            r.name.clone().unwrap_or_default(),
            r.symbol.clone().unwrap_or_default(),
            r.slug.clone().unwrap_or_default(),
            opt_cell(r.cmc_rank),
        ];
        for cur in &currencies {
            let quote = r.quote(cur);
            row.extend(QuoteField::ALL.iter().map(|f| opt_cell(quote.and_then(|q| q.get(*f)))));
        }
        row.push(r.timestamp.format(TIMESTAMP_FORMAT).to_string());
        writer.write_record(&row)?;
    }
    writer.flush().map_err(csv::Error::from)?;
    info!("saved {} records to {}", dataset.len(), path.as_ref().display());
    Ok(())
}

fn opt_cell<T: ToString>(v: Option<T>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

/// Read a file written by [`save_dataset`]. Any malformed cell fails the whole load.
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<Dataset, StorageError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(StorageError::NotFound(path.to_path_buf()));
    }
    let mut reader = ReaderBuilder::new().from_path(path)?;
    let layout = Layout::from_headers(reader.headers()?)?;

    let mut records = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let row = result?;
        records.push(layout.parse_row(&row, i + 1)?);
    }
    info!("loaded {} records from {}", records.len(), path.display());
    Ok(Dataset::from_records(records))
}

/// Column positions resolved from a header row.
struct Layout {
    names: Vec<String>,
    id: Option<usize>,
    name: Option<usize>,
    symbol: Option<usize>,
    slug: Option<usize>,
    cmc_rank: Option<usize>,
    timestamp: usize,
    quotes: Vec<(usize, String, QuoteField)>,
}

impl Layout {
    fn from_headers(headers: &StringRecord) -> Result<Layout, StorageError> {
        let names: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
        let find = |col: &str| names.iter().position(|n| n == col);
        let timestamp = find(TIMESTAMP_COLUMN).ok_or_else(|| StorageError::MissingColumn(TIMESTAMP_COLUMN.to_string()))?;
        let quotes = names
            .iter()
            .enumerate()
            .filter_map(|(i, n)| {
                let (cur, key) = n.strip_prefix(QUOTE_PREFIX)?.rsplit_once('.')?;
                QuoteField::from_key(key).map(|f| (i, cur.to_string(), f))
            })
            .collect();
        Ok(Layout {
            id: find("id"),
            name: find("name"),
            symbol: find("symbol"),
            slug: find("slug"),
            cmc_rank: find("cmc_rank"),
            timestamp,
            quotes,
            names,
        })
    }

    fn cell<'r>(&self, row: &'r StringRecord, idx: Option<usize>) -> Option<&'r str> {
        idx.and_then(|i| row.get(i)).filter(|s| !s.is_empty())
    }

    fn parse<T: FromStr>(&self, row: &StringRecord, idx: Option<usize>, line: usize) -> Result<Option<T>, StorageError> {
        match self.cell(row, idx) {
            None => Ok(None),
            Some(s) => s.trim().parse::<T>().map(Some).map_err(|_| self.invalid(idx, line, s)),
        }
    }

    fn invalid(&self, idx: Option<usize>, line: usize, value: &str) -> StorageError {
        StorageError::InvalidValue {
            row: line,
            column: idx.and_then(|i| self.names.get(i)).cloned().unwrap_or_default(),
            value: value.to_string(),
        }
    }

    fn parse_row(&self, row: &StringRecord, line: usize) -> Result<AssetQuoteRecord, StorageError> {
        let mut quotes: BTreeMap<String, Quote> = BTreeMap::new();
        for (idx, cur, field) in &self.quotes {
            if let Some(v) = self.parse::<f64>(row, Some(*idx), line)? {
                quotes.entry(cur.clone()).or_default().set(*field, Some(v));
            }
        }

        let raw_ts = self.cell(row, Some(self.timestamp)).unwrap_or_default();
        let timestamp = parse_timestamp(raw_ts).ok_or_else(|| self.invalid(Some(self.timestamp), line, raw_ts))?;

        let text = |idx: Option<usize>| self.cell(row, idx).map(str::to_string);
        Ok(AssetQuoteRecord {
            id: self.parse(row, self.id, line)?,
            name: text(self.name),
            symbol: text(self.symbol),
            slug: text(self.slug),
            cmc_rank: self.parse(row, self.cmc_rank, line)?,
            quotes,
            timestamp,
        })
    }
}

/// Accepts the save format (fraction optional) and RFC 3339.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    DateTime::parse_from_rfc3339(s).ok().map(|d| d.with_timezone(&Utc))
}
