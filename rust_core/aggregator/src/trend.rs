use crate::dataset::Dataset;
use connectors_common::types::QuoteField;
use serde::Serialize;

/// Mean percent change per horizon for one asset. `means` lines up with
/// [`TrendSummary::fields`]; `None` when the asset had no value for that horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendRow {
    pub name: String,
    pub means: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSummary {
    pub currency: String,
    pub fields: Vec<QuoteField>,
    pub rows: Vec<TrendRow>,
}

impl TrendSummary {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.fields.is_empty()
    }

    pub fn row(&self, name: &str) -> Option<&TrendRow> {
        self.rows.iter().find(|r| r.name == name)
    }

    pub fn mean(&self, name: &str, field: QuoteField) -> Option<f64> {
        let idx = self.fields.iter().position(|f| *f == field)?;
        self.row(name).and_then(|r| r.means[idx])
    }
}

/// Group rows by asset name (first-seen order) and average each percent-change
/// horizon that at least one row carries for `currency`.
pub fn analyze_trends(dataset: &Dataset, currency: &str) -> TrendSummary {
    let fields: Vec<QuoteField> = QuoteField::PERCENT_CHANGES
        .iter()
        .copied()
        .filter(|f| dataset.iter().any(|r| r.value(currency, *f).is_some()))
        .collect();

    let mut summary = TrendSummary {
        currency: currency.to_string(),
        fields,
        rows: Vec::new(),
    };
    if summary.fields.is_empty() {
        return summary;
    }

    // (name, per-field sum, per-field count)
    let mut groups: Vec<(String, Vec<f64>, Vec<usize>)> = Vec::new();
    for r in dataset {
        let name = match &r.name {
            Some(n) => n,
            None => continue,
        };
        let idx = match groups.iter().position(|g| &g.0 == name) {
            Some(i) => i,
            None => {
                let width = summary.fields.len();
                groups.push((name.clone(), vec![0.0; width], vec![0; width]));
                groups.len() - 1
            }
        };
        let group = &mut groups[idx];
        for (i, field) in summary.fields.iter().enumerate() {
            if let Some(v) = r.value(currency, *field) {
                group.1[i] += v;
                group.2[i] += 1;
            }
        }
    }

    summary.rows = groups
        .into_iter()
        .map(|(name, sums, counts)| TrendRow {
            name,
            means: sums
                .iter()
                .zip(counts.iter())
                .map(|(s, c)| if *c == 0 { None } else { Some(s / *c as f64) })
                .collect(),
        })
        .collect();
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{at, record};

    #[test]
    fn test_single_record_per_asset_returns_values() {
        let ds = Dataset::from_records(vec![
            record("Bitcoin", 1.0, [0.1, 0.2, 0.3, 0.4, 0.5, 0.6], at(0)),
            record("Ethereum", 1.0, [-1.0, -2.0, -3.0, -4.0, -5.0, -6.0], at(0)),
        ]);
        let t = analyze_trends(&ds, "USD");
        assert_eq!(t.fields, QuoteField::PERCENT_CHANGES.to_vec());
        assert_eq!(t.rows.len(), 2);
        assert_eq!(
            t.row("Bitcoin").unwrap().means,
            vec![Some(0.1), Some(0.2), Some(0.3), Some(0.4), Some(0.5), Some(0.6)]
        );
        assert_eq!(t.mean("Ethereum", QuoteField::PercentChange90d), Some(-6.0));
    }

    #[test]
    fn test_means_across_polls_in_first_seen_order() {
        let ds = Dataset::from_records(vec![
            record("Tether", 1.0, [0.0; 6], at(0)),
            record("Bitcoin", 1.0, [1.0; 6], at(0)),
            record("Tether", 1.0, [2.0; 6], at(1)),
            record("Bitcoin", 1.0, [3.0; 6], at(1)),
        ]);
        let t = analyze_trends(&ds, "USD");
        let names: Vec<&str> = t.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Tether", "Bitcoin"]);
        assert_eq!(t.mean("Tether", QuoteField::PercentChange1h), Some(1.0));
        assert_eq!(t.mean("Bitcoin", QuoteField::PercentChange7d), Some(2.0));
    }

    #[test]
    fn test_only_present_fields_are_reported() {
        let mut a = record("Bitcoin", 1.0, [1.0; 6], at(0));
        let mut b = record("Ethereum", 1.0, [3.0; 6], at(0));
        for r in [&mut a, &mut b] {
            let q = r.quotes.get_mut("USD").unwrap();
            q.percent_change_60d = None;
            q.percent_change_90d = None;
        }
        b.quotes.get_mut("USD").unwrap().percent_change_1h = None;
        let t = analyze_trends(&Dataset::from_records(vec![a, b]), "USD");
        assert_eq!(t.fields.len(), 4);
        assert_eq!(t.mean("Ethereum", QuoteField::PercentChange1h), None);
        assert_eq!(t.mean("Ethereum", QuoteField::PercentChange24h), Some(3.0));
        assert_eq!(t.mean("Bitcoin", QuoteField::PercentChange90d), None);
    }

    #[test]
    fn test_empty_results() {
        assert!(analyze_trends(&Dataset::new(), "USD").is_empty());
        let ds = Dataset::from_records(vec![record("Bitcoin", 1.0, [1.0; 6], at(0))]);
        let other = analyze_trends(&ds, "EUR");
        assert!(other.is_empty());
        assert!(other.fields.is_empty());
    }
}
