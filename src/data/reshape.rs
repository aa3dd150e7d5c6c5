use std::collections::HashSet;

use log::debug;

use super::encoding::RawTable;
use super::model::{IdentifyingColumn, StationKey};
use crate::error::{PipelineError, Result};

/// One (station tuple, time column) pair, before time labels are parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct MeltedRow {
    pub station: StationKey,
    pub time_label: String,
    pub congestion: Option<f64>,
}

/// The long form of a [`RawTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct LongTable {
    /// Time columns in source header order.
    pub time_labels: Vec<String>,
    pub rows: Vec<MeltedRow>,
}

/// Pivot every non-identifying column into (label, value) rows.
///
/// Produces exactly `source rows × time columns` rows. Blank or non-numeric
/// cells become `None`.
pub fn reshape(table: &RawTable) -> Result<LongTable> {
    let id_idx = locate_identifying_columns(&table.headers)?;

    let time_cols: Vec<(usize, &String)> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(i, _)| !id_idx.contains(i))
        .collect();
    if time_cols.is_empty() {
        return Err(PipelineError::NoTimeColumns);
    }

    let mut seen: HashSet<StationKey> = HashSet::with_capacity(table.rows.len());
    let mut rows = Vec::with_capacity(table.rows.len() * time_cols.len());
    let mut coerced = 0usize;

    for record in &table.rows {
        let cell = |i: usize| record.get(i).map(String::as_str).unwrap_or("");
        let station = StationKey {
            weekday_type: cell(id_idx[0]).to_string(),
            line: cell(id_idx[1]).to_string(),
            station_number: cell(id_idx[2]).to_string(),
            station_name: cell(id_idx[3]).to_string(),
            direction: cell(id_idx[4]).to_string(),
        };
        if !seen.insert(station.clone()) {
            return Err(PipelineError::DuplicateEntity {
                key: station.to_string(),
            });
        }

        for &(i, label) in &time_cols {
            let raw = cell(i).trim();
            let congestion = parse_congestion(raw);
            if congestion.is_none() && !raw.is_empty() {
                coerced += 1;
            }
            rows.push(MeltedRow {
                station: station.clone(),
                time_label: label.clone(),
                congestion,
            });
        }
    }

    if coerced > 0 {
        debug!("{coerced} non-numeric congestion cells treated as missing");
    }

    Ok(LongTable {
        time_labels: time_cols.into_iter().map(|(_, l)| l.clone()).collect(),
        rows,
    })
}

/// Header index of each identifying column, in [`IdentifyingColumn::ALL`] order.
fn locate_identifying_columns(headers: &[String]) -> Result<[usize; 5]> {
    let mut idx = [0usize; 5];
    let mut missing = Vec::new();

    for (slot, column) in IdentifyingColumn::ALL.into_iter().enumerate() {
        match headers.iter().position(|h| column.matches_header(h)) {
            Some(i) => idx[slot] = i,
            None => missing.push(column.source_names()[0]),
        }
    }

    if missing.is_empty() {
        Ok(idx)
    } else {
        Err(PipelineError::MissingColumns { missing })
    }
}

fn parse_congestion(s: &str) -> Option<f64> {
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}
