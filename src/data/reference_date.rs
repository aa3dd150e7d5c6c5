//! Reference date taken from the export's file name.

use std::sync::LazyLock;

use regex::Regex;

use super::model::ReferenceDate;

/// An 8-digit `YYYYMMDD` run anywhere in the file name.
pub const REFERENCE_DATE_PATTERN: &str = r"(\d{4})(\d{2})(\d{2})";

static REFERENCE_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(REFERENCE_DATE_PATTERN).expect("Invalid regex"));

/// Extract the reference date from a file name such as
/// `서울교통공사_지하철혼잡도정보_20250930.csv`.
///
/// The first 8-digit run (scanning left to right, non-overlapping) decides.
/// Returns `None` when there is no such run or its month/day are out of
/// range; absence is never an error.
pub fn parse_reference_date(filename: &str) -> Option<ReferenceDate> {
    let caps = REFERENCE_DATE_RE.captures(filename)?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;

    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    Some(ReferenceDate { year, month, day })
}
