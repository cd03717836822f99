//! Plain-text tables for the console.

use crate::config::DisplayConfig;
use aggregator::{Dataset, SummaryStats, TrendSummary};
use aggregator::storage::TIMESTAMP_FORMAT;
use connectors_common::types::QuoteField;

pub fn render_summary(stats: &SummaryStats) -> String {
    stats.to_string()
}

/// First `n` rows as `name, symbol, quote.<CUR>.price, timestamp`.
pub fn render_sample(dataset: &Dataset, currency: &str, n: usize, display: &DisplayConfig) -> String {
    let headers = vec![
        String::new(),
        "name".to_string(),
        "symbol".to_string(),
        QuoteField::Price.column(currency),
        "timestamp".to_string(),
    ];
    let rows = dataset
        .head(n)
        .iter()
        .enumerate()
        .map(|(i, r)| {
            vec![
                i.to_string(),
                r.name.clone().unwrap_or_else(|| "NaN".to_string()),
                r.symbol.clone().unwrap_or_else(|| "NaN".to_string()),
                fmt_float(r.price(currency), display.float_precision),
                r.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            ]
        })
        .collect();
    render_table(&headers, rows, display.max_rows)
}

pub fn render_trends(trends: &TrendSummary, display: &DisplayConfig) -> String {
    let mut headers = vec!["name".to_string()];
    headers.extend(trends.fields.iter().map(|f| f.column(&trends.currency)));
    let rows = trends
        .rows
        .iter()
        .map(|r| {
            let mut row = vec![r.name.clone()];
            row.extend(r.means.iter().map(|m| fmt_float(*m, display.float_precision)));
            row
        })
        .collect();
    render_table(&headers, rows, display.max_rows)
}

pub fn fmt_float(v: Option<f64>, precision: usize) -> String {
    match v {
        Some(x) => format!("{:.*}", precision, x),
        None => "NaN".to_string(),
    }
}

fn render_table(headers: &[String], mut rows: Vec<Vec<String>>, max_rows: Option<usize>) -> String {
    let hidden = match max_rows {
        Some(max) if rows.len() > max => {
            let hidden = rows.len() - max;
            rows.truncate(max);
            hidden
        }
        _ => 0,
    };
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.len());
        }
    }
    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:>width$}", c, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
    };
    let mut out = line(headers);
    out.push('\n');
    for row in &rows {
        out.push_str(&line(row.as_slice()));
        out.push('\n');
    }
    if hidden > 0 {
        out.push_str(&format!("... {} more rows\n", hidden));
    }
    out
}
