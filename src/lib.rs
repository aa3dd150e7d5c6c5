//! Ingestion and normalization of Seoul subway congestion exports.
//!
//! The export is a wide CSV, one row per (weekday type, line, station,
//! direction) and one column per half-hour slot, usually in a legacy Korean
//! encoding. [`DatasetCache::load`] turns it into a sorted, time-indexed long
//! table and keeps it in memory until the file changes or the cache is
//! invalidated.

pub mod cache;
pub mod config;
pub mod data;
pub mod error;

pub use cache::{CacheStats, DatasetCache};
pub use config::PipelineConfig;
pub use data::encoding::SourceEncoding;
pub use data::filter::{filtered_indices, init_filter, RecordFilter};
pub use data::loader::{build_dataset, locate_source};
pub use data::model::{
    IdentifyingColumn, NormalizedDataset, ObservationRecord, ReferenceDate, StationKey, TimeSlot,
};
pub use data::reference_date::parse_reference_date;
pub use data::summary::{summarize, DataSummary};
pub use data::time_label::{parse_time_column, parse_time_header, TimeFormatError};
pub use error::{PipelineError, Result};
