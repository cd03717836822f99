use crate::dataset::Dataset;
use serde::Serialize;
use std::fmt;

pub const PERIOD_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const TOP_N: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub total_records: usize,
    pub unique_assets: usize,
    pub period_start: String,
    pub period_end: String,
    /// Most frequent asset names, highest count first.
    pub top_assets: Vec<(String, usize)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SummaryStats {
    NoData,
    Stats(DatasetSummary),
}

impl SummaryStats {
    pub fn is_no_data(&self) -> bool {
        matches!(self, SummaryStats::NoData)
    }
}

pub fn summarize(dataset: &Dataset) -> SummaryStats {
    let (start, end) = match (dataset.earliest_timestamp(), dataset.latest_timestamp()) {
        (Some(s), Some(e)) => (s, e),
        _ => return SummaryStats::NoData,
    };

    let mut counts: Vec<(String, usize)> = Vec::new();
    for name in dataset.iter().filter_map(|r| r.name.as_ref()) {
        match counts.iter_mut().find(|(n, _)| n == name) {
            Some((_, c)) => *c += 1,
            None => counts.push((name.clone(), 1)),
        }
    }
    let unique_assets = counts.len();
    // stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(TOP_N);

    SummaryStats::Stats(DatasetSummary {
        total_records: dataset.len(),
        unique_assets,
        period_start: start.format(PERIOD_FORMAT).to_string(),
        period_end: end.format(PERIOD_FORMAT).to_string(),
        top_assets: counts,
    })
}

impl fmt::Display for SummaryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryStats::NoData => writeln!(f, "   message: No data available"),
            SummaryStats::Stats(s) => {
                writeln!(f, "   total_records: {}", s.total_records)?;
                writeln!(f, "   unique_cryptocurrencies: {}", s.unique_assets)?;
                writeln!(f, "   data_collection_period: {} .. {}", s.period_start, s.period_end)?;
                let top: Vec<String> = s.top_assets.iter().map(|(n, c)| format!("{}: {}", n, c)).collect();
                writeln!(f, "   top_cryptocurrencies: {{{}}}", top.join(", "))
            }
        }
    }
}
