use std::path::{Path, PathBuf};

use log::{info, warn};

use super::encoding::{load_raw_table, SourceEncoding};
use super::model::{NormalizedDataset, ObservationRecord};
use super::reference_date::parse_reference_date;
use super::reshape::reshape;
use super::time_label::parse_time_header;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};

// ---------------------------------------------------------------------------
// Source discovery
// ---------------------------------------------------------------------------

/// Find the single export in `config.data_dir` whose name contains the
/// marker and ends in the configured extension.
///
/// Zero or several matches fail with [`PipelineError::FileResolution`].
pub fn locate_source(config: &PipelineConfig) -> Result<PathBuf> {
    let dir = &config.data_dir;
    let entries = std::fs::read_dir(dir).map_err(|e| PipelineError::io(dir, e))?;

    let mut candidates = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| PipelineError::io(dir, e))?.path();
        if path.is_file() && is_candidate(&path, config) {
            candidates.push(path);
        }
    }
    candidates.sort();

    if candidates.len() == 1 {
        let path = candidates.remove(0);
        info!("source file: {}", path.display());
        return Ok(path);
    }
    Err(PipelineError::FileResolution {
        dir: dir.clone(),
        pattern: config.search_pattern(),
        count: candidates.len(),
        candidates,
    })
}

fn is_candidate(path: &Path, config: &PipelineConfig) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let extension_matches = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(&config.extension));
    extension_matches && name.contains(config.name_marker.as_str())
}

// ---------------------------------------------------------------------------
// One-shot load
// ---------------------------------------------------------------------------

/// Decode, reshape and time-index one export. No caching.
pub fn build_dataset(path: &Path, encodings: &[SourceEncoding]) -> Result<NormalizedDataset> {
    let (raw, encoding) = load_raw_table(path, encodings)?;
    let long = reshape(&raw)?;
    let slots = parse_time_header(&long.time_labels)?;

    // Reshaped rows come station by station, time columns in header order.
    let records: Vec<ObservationRecord> = long
        .rows
        .into_iter()
        .zip(slots.iter().cycle())
        .map(|(row, slot)| {
            debug_assert_eq!(row.time_label, slot.label);
            ObservationRecord {
                station: row.station,
                time_label: row.time_label,
                hour: slot.hour,
                minute: slot.minute,
                time_key: slot.key(),
                congestion: row.congestion,
            }
        })
        .collect();

    let reference_date = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(parse_reference_date);
    if reference_date.is_none() {
        warn!("no reference date in file name {}", path.display());
    }

    let dataset = NormalizedDataset::from_records(
        path.to_path_buf(),
        encoding,
        reference_date,
        slots,
        records,
    );
    info!(
        "loaded {} records, {} time slots from {}",
        dataset.len(),
        dataset.time_slots.len(),
        path.display()
    );
    Ok(dataset)
}
