use std::collections::{BTreeMap, BTreeSet};

use super::model::{IdentifyingColumn, NormalizedDataset};

// ---------------------------------------------------------------------------
// Filter predicate: which unique values are selected per identifying column
// ---------------------------------------------------------------------------

/// Per-column selection state: maps column → set of selected values.
/// If a column is absent it means "no filter" (show all).
pub type FilterState = BTreeMap<IdentifyingColumn, BTreeSet<String>>;

/// Column selections plus a free-text station search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub columns: FilterState,
    /// Substring of the station name; empty matches everything.
    pub station_search: String,
}

impl RecordFilter {
    /// Restrict `column` to exactly `values`.
    pub fn select<I, S>(mut self, column: IdentifyingColumn, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns
            .insert(column, values.into_iter().map(Into::into).collect());
        self
    }

    pub fn search_station(mut self, query: impl Into<String>) -> Self {
        self.station_search = query.into();
        self
    }

    /// Toggle a single value in a column's selection.
    pub fn toggle(&mut self, column: IdentifyingColumn, value: &str) {
        let selected = self.columns.entry(column).or_default();
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
    }
}

/// Initialise a [`RecordFilter`] with all values selected (i.e., show everything).
pub fn init_filter(dataset: &NormalizedDataset) -> RecordFilter {
    RecordFilter {
        columns: dataset.unique_values.clone(),
        station_search: String::new(),
    }
}

/// Return indices of records that pass the filter.
///
/// A record passes a column filter when:
/// * The column is not present in the filter → passes (no constraint)
/// * The selected set for that column is empty → nothing selected → fails
/// * The record's value for that column is in the selected set → passes
pub fn filtered_indices(dataset: &NormalizedDataset, filter: &RecordFilter) -> Vec<usize> {
    let query = filter.station_search.trim();

    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| {
            for (column, selected) in &filter.columns {
                if selected.is_empty() {
                    return false;
                }
                // Every known value selected → no effective filter
                if let Some(all_vals) = dataset.unique_values.get(column) {
                    if selected.is_superset(all_vals) {
                        continue;
                    }
                }
                if !selected.contains(rec.station.get(*column)) {
                    return false;
                }
            }
            query.is_empty() || rec.station.station_name.contains(query)
        })
        .map(|(i, _)| i)
        .collect()
}
