use chrono::{DateTime, Utc};
use connectors_common::types::AssetQuoteRecord;
use log::debug;

/// Ordered, append-only collection of listing rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<AssetQuoteRecord>,
}

impl Dataset {
    pub fn new() -> Self {
        Dataset::default()
    }

    pub fn from_records(records: Vec<AssetQuoteRecord>) -> Self {
        Dataset { records }
    }

    /// Append a whole batch after the existing rows, keeping its order.
    pub fn append(&mut self, batch: Vec<AssetQuoteRecord>) {
        if batch.is_empty() {
            return;
        }
        if self.records.is_empty() {
            self.records = batch;
        } else {
            self.records.extend(batch);
        }
        debug!("dataset now holds {} records", self.records.len());
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[AssetQuoteRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AssetQuoteRecord> {
        self.records.iter()
    }

    pub fn head(&self, n: usize) -> &[AssetQuoteRecord] {
        &self.records[..n.min(self.records.len())]
    }

    pub fn records_for<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a AssetQuoteRecord> + 'a {
        self.records.iter().filter(move |r| r.name.as_deref() == Some(name))
    }

    pub fn earliest_timestamp(&self) -> Option<DateTime<Utc>> {
        self.records.iter().map(|r| r.timestamp).min()
    }

    pub fn latest_timestamp(&self) -> Option<DateTime<Utc>> {
        self.records.iter().map(|r| r.timestamp).max()
    }

    /// Quote currencies in the order they first appear.
    pub fn currencies(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for r in &self.records {
            for cur in r.quotes.keys() {
                if !out.contains(cur) {
                    out.push(cur.clone());
                }
            }
        }
        out
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a AssetQuoteRecord;
    type IntoIter = std::slice::Iter<'a, AssetQuoteRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{at, record};

    fn batch(secs: i64) -> Vec<AssetQuoteRecord> {
        vec![
            record("Bitcoin", 45000.0, [1.0; 6], at(secs)),
            record("Ethereum", 3200.0, [2.0; 6], at(secs)),
            record("Tether", 1.0, [0.0; 6], at(secs)),
        ]
    }

    #[test]
    fn test_append_empty_batch_is_noop() {
        let mut ds = Dataset::from_records(batch(0));
        let before = ds.clone();
        ds.append(Vec::new());
        assert_eq!(ds, before);
        assert_eq!(ds.len(), 3);
    }

    #[test]
    fn test_append_to_empty_copies_batch() {
        let mut ds = Dataset::new();
        let b = batch(0);
        ds.append(b.clone());
        assert_eq!(ds.records(), b.as_slice());
    }

    #[test]
    fn test_append_preserves_order() {
        let mut ds = Dataset::new();
        ds.append(batch(0));
        ds.append(batch(2));
        ds.append(batch(4));
        assert_eq!(ds.len(), 9);
        let names: Vec<&str> = ds.iter().map(|r| r.name.as_deref().unwrap()).collect();
        assert_eq!(&names[3..6], &["Bitcoin", "Ethereum", "Tether"]);
        assert!(ds.records().windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        assert_eq!(ds.earliest_timestamp(), Some(at(0)));
        assert_eq!(ds.latest_timestamp(), Some(at(4)));
    }

    #[test]
    fn test_head_and_filter() {
        let mut ds = Dataset::new();
        ds.append(batch(0));
        ds.append(batch(1));
        assert_eq!(ds.head(10).len(), 6);
        assert_eq!(ds.head(2).len(), 2);
        assert_eq!(ds.records_for("Ethereum").count(), 2);
        assert_eq!(ds.records_for("Dogecoin").count(), 0);
        assert_eq!(ds.currencies(), vec!["USD".to_string()]);
    }
}
