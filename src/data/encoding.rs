use std::borrow::Cow;
use std::fmt;
use std::path::Path;

use encoding_rs::{Encoding, EUC_KR, UTF_8};
use log::{debug, info};

use crate::error::{PipelineError, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// ---------------------------------------------------------------------------
// SourceEncoding – one candidate in the fallback chain
// ---------------------------------------------------------------------------

/// Text encodings a congestion export may come in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceEncoding {
    /// Windows code page 949, what most transit exports are written in.
    Cp949,
    EucKr,
    Utf8,
}

impl SourceEncoding {
    pub fn label(self) -> &'static str {
        match self {
            SourceEncoding::Cp949 => "cp949",
            SourceEncoding::EucKr => "euc-kr",
            SourceEncoding::Utf8 => "utf-8",
        }
    }

    // WHATWG's EUC-KR decoder is the Windows-949 superset, so both legacy
    // candidates share it.
    fn encoding(self) -> &'static Encoding {
        match self {
            SourceEncoding::Cp949 | SourceEncoding::EucKr => EUC_KR,
            SourceEncoding::Utf8 => UTF_8,
        }
    }

    /// Strict decode: `None` on the first malformed or unmapped sequence.
    pub fn decode(self, bytes: &[u8]) -> Option<Cow<'_, str>> {
        let bytes = match self {
            SourceEncoding::Utf8 => bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes),
            _ => bytes,
        };
        self.encoding()
            .decode_without_bom_handling_and_without_replacement(bytes)
    }
}

impl fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// RawTable – untyped rows handed from the loader to the reshaper
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Header cells, trimmed.
    pub headers: Vec<String>,
    /// Each data row, one string per field.
    pub rows: Vec<Vec<String>>,
}

/// Read `path` and decode it with the first encoding in `encodings` that
/// accepts every byte. Fails with [`PipelineError::Decode`] listing every
/// attempted encoding when none does.
pub fn load_raw_table(path: &Path, encodings: &[SourceEncoding]) -> Result<(RawTable, SourceEncoding)> {
    let bytes = std::fs::read(path).map_err(|e| PipelineError::io(path, e))?;

    for &encoding in encodings {
        let Some(text) = encoding.decode(&bytes) else {
            debug!("{} is not valid {encoding}", path.display());
            continue;
        };
        let table = parse_csv(&text).map_err(|source| PipelineError::Csv {
            path: path.to_path_buf(),
            encoding: encoding.label(),
            source,
        })?;
        info!(
            "decoded {} as {encoding}: {} columns, {} rows",
            path.display(),
            table.headers.len(),
            table.rows.len()
        );
        return Ok((table, encoding));
    }

    Err(PipelineError::Decode {
        path: path.to_path_buf(),
        attempted: encodings.iter().map(|e| e.label()).collect(),
    })
}

fn parse_csv(text: &str) -> csv::Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new().from_reader(text.as_bytes());
    let headers = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let rows = reader
        .records()
        .map(|result| result.map(|record| record.iter().map(str::to_string).collect()))
        .collect::<csv::Result<Vec<Vec<String>>>>()?;

    Ok(RawTable { headers, rows })
}
