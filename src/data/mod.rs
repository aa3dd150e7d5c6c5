/// Data layer: core types, decoding, reshaping, and filtering.
///
/// Architecture:
/// ```text
///  *혼잡도*.csv  (cp949 / euc-kr / utf-8)
///        │
///        ▼
///   ┌──────────┐
///   │ encoding  │  bytes → RawTable, first encoding that decodes
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ reshape   │  wide → long, one row per (station, time column)
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ time_label  │  HH시MM분 → hour, minute, ordering key
///   └────────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ NormalizedDataset │  sorted records + reference date (file name)
///   └──────────────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ summary / filter  │  counts, ranges, selected indices
///   └──────────────────┘
/// ```

pub mod encoding;
pub mod filter;
pub mod loader;
pub mod model;
pub mod reference_date;
pub mod reshape;
pub mod summary;
pub mod time_label;
