//! Configuration and constants for locating and decoding the source export.

use std::path::PathBuf;

use crate::data::encoding::SourceEncoding;

/// Substring every congestion export carries in its file name.
pub const NAME_MARKER: &str = "혼잡도";

/// Extension of the source export.
pub const SOURCE_EXTENSION: &str = "csv";

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "SUBWAY_CROWDING_DIR";

/// Encodings tried in order. Adding or removing a candidate is a one-line change.
pub const DEFAULT_ENCODINGS: &[SourceEncoding] = &[
    SourceEncoding::Cp949,
    SourceEncoding::EucKr,
    SourceEncoding::Utf8,
];

/// Where to look for the export and how to decode it.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub name_marker: String,
    pub extension: String,
    pub encodings: Vec<SourceEncoding>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            name_marker: NAME_MARKER.to_string(),
            extension: SOURCE_EXTENSION.to_string(),
            encodings: DEFAULT_ENCODINGS.to_vec(),
        }
    }
}

impl PipelineConfig {
    /// Defaults, with `data_dir` taken from `SUBWAY_CROWDING_DIR` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(dir);
        }
        config
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_encodings(mut self, encodings: Vec<SourceEncoding>) -> Self {
        self.encodings = encodings;
        self
    }

    /// Human-readable form of the file-name pattern, e.g. `*혼잡도*.csv`.
    pub fn search_pattern(&self) -> String {
        format!("*{}*.{}", self.name_marker, self.extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pattern_and_encoding_order() {
        let config = PipelineConfig::default();
        assert_eq!(config.search_pattern(), "*혼잡도*.csv");
        assert_eq!(
            config.encodings,
            vec![SourceEncoding::Cp949, SourceEncoding::EucKr, SourceEncoding::Utf8]
        );
    }

    #[test]
    fn builder_overrides() {
        let config = PipelineConfig::default()
            .with_data_dir("/tmp/exports")
            .with_encodings(vec![SourceEncoding::Utf8]);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/exports"));
        assert_eq!(config.encodings, vec![SourceEncoding::Utf8]);
    }
}
