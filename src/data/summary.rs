use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use super::model::NormalizedDataset;

/// Headline figures shown above the data preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSummary {
    pub row_count: usize,
    /// Distinct station names.
    pub station_count: usize,
    pub time_slot_count: usize,
    pub missing_count: usize,
    /// In order of first appearance.
    pub weekday_types: Vec<String>,
    /// Sorted.
    pub lines: Vec<String>,
    /// (min, max) over present values; `None` when every value is missing.
    pub congestion_range: Option<(f64, f64)>,
}

/// Aggregate counts over a dataset. Pure; memoization lives in the cache.
pub fn summarize(dataset: &NormalizedDataset) -> DataSummary {
    let mut stations: HashSet<&str> = HashSet::new();
    let mut labels: HashSet<&str> = HashSet::new();
    let mut lines: BTreeSet<&str> = BTreeSet::new();
    let mut weekday_types: Vec<String> = Vec::new();
    let mut missing_count = 0;
    let mut range: Option<(f64, f64)> = None;

    for rec in &dataset.records {
        stations.insert(&rec.station.station_name);
        labels.insert(&rec.time_label);
        lines.insert(&rec.station.line);
        if !weekday_types.contains(&rec.station.weekday_type) {
            weekday_types.push(rec.station.weekday_type.clone());
        }
        match rec.congestion {
            Some(v) => {
                range = Some(match range {
                    Some((lo, hi)) => (lo.min(v), hi.max(v)),
                    None => (v, v),
                });
            }
            None => missing_count += 1,
        }
    }

    DataSummary {
        row_count: dataset.len(),
        station_count: stations.len(),
        time_slot_count: labels.len(),
        missing_count,
        weekday_types,
        lines: lines.into_iter().map(str::to_string).collect(),
        congestion_range: range,
    }
}
