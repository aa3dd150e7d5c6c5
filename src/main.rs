use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;

use subway_crowding::{DatasetCache, PipelineConfig};

/// Rows shown in the preview.
const PREVIEW_ROWS: usize = 20;

/// Shown when the file name carries no date.
const UNKNOWN_DATE: &str = "미상";

fn main() -> Result<()> {
    env_logger::init();

    let mut config = PipelineConfig::from_env();
    if let Some(dir) = std::env::args_os().nth(1) {
        config = config.with_data_dir(PathBuf::from(dir));
    }
    info!("searching {} for {}", config.data_dir.display(), config.search_pattern());

    let cache = DatasetCache::new(config);
    let dataset = cache.load().context("loading congestion data")?;

    let reference_date = cache
        .reference_date()
        .map(|d| d.to_string())
        .unwrap_or_else(|| UNKNOWN_DATE.to_string());
    println!("source:         {}", dataset.source.display());
    println!("encoding:       {}", dataset.encoding);
    println!("reference date: {reference_date}");

    let summary = cache.data_summary().context("summarizing congestion data")?;
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("serializing summary")?
    );

    println!("first {PREVIEW_ROWS} records:");
    for rec in dataset.records.iter().take(PREVIEW_ROWS) {
        let value = rec
            .congestion
            .map(|v| format!("{v:.1}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {} | {} ({:02}:{:02}, key {}) | {}",
            rec.station, rec.time_label, rec.hour, rec.minute, rec.time_key, value
        );
    }
    Ok(())
}
