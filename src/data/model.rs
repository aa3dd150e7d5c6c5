use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use super::encoding::SourceEncoding;

// ---------------------------------------------------------------------------
// IdentifyingColumn – the five columns that name a station/route/day/direction
// ---------------------------------------------------------------------------

/// The fixed identifying columns of the export, in source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum IdentifyingColumn {
    WeekdayType,
    Line,
    StationNumber,
    StationName,
    Direction,
}

impl IdentifyingColumn {
    pub const ALL: [IdentifyingColumn; 5] = [
        IdentifyingColumn::WeekdayType,
        IdentifyingColumn::Line,
        IdentifyingColumn::StationNumber,
        IdentifyingColumn::StationName,
        IdentifyingColumn::Direction,
    ];

    /// Name used for the column once normalized.
    pub fn canonical_name(self) -> &'static str {
        match self {
            IdentifyingColumn::WeekdayType => "요일구분",
            IdentifyingColumn::Line => "호선",
            IdentifyingColumn::StationNumber => "역번호",
            IdentifyingColumn::StationName => "역명",
            IdentifyingColumn::Direction => "상하선구분",
        }
    }

    /// Header spellings accepted in the source file. The first entry is the
    /// one current exports use.
    pub fn source_names(self) -> &'static [&'static str] {
        match self {
            IdentifyingColumn::WeekdayType => &["요일구분"],
            IdentifyingColumn::Line => &["호선"],
            IdentifyingColumn::StationNumber => &["역번호"],
            IdentifyingColumn::StationName => &["출발역", "역명"],
            IdentifyingColumn::Direction => &["상하구분", "상하선구분"],
        }
    }

    pub fn matches_header(self, header: &str) -> bool {
        self.source_names().contains(&header)
    }
}

impl fmt::Display for IdentifyingColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

// ---------------------------------------------------------------------------
// StationKey – one identifying-column tuple
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StationKey {
    pub weekday_type: String,
    pub line: String,
    pub station_number: String,
    pub station_name: String,
    pub direction: String,
}

impl StationKey {
    pub fn get(&self, column: IdentifyingColumn) -> &str {
        match column {
            IdentifyingColumn::WeekdayType => &self.weekday_type,
            IdentifyingColumn::Line => &self.line,
            IdentifyingColumn::StationNumber => &self.station_number,
            IdentifyingColumn::StationName => &self.station_name,
            IdentifyingColumn::Direction => &self.direction,
        }
    }

    /// Canonical ordering: line, station number, weekday type, direction.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then_with(|| cmp_station_number(&self.station_number, &other.station_number))
            .then_with(|| self.weekday_type.cmp(&other.weekday_type))
            .then_with(|| self.direction.cmp(&other.direction))
    }
}

impl fmt::Display for StationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} / {} {} / {}",
            self.weekday_type, self.line, self.station_number, self.station_name, self.direction
        )
    }
}

/// Station numbers are compared numerically when both sides are numbers.
fn cmp_station_number(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        _ => a.cmp(b),
    }
}

// ---------------------------------------------------------------------------
// TimeSlot – a parsed time-label column
// ---------------------------------------------------------------------------

/// A time-label column with its parsed service-day hour (0–29) and minute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TimeSlot {
    pub label: String,
    pub hour: u8,
    pub minute: u8,
}

impl TimeSlot {
    /// `hour * 60 + minute`; exceeds 1440 for post-midnight slots.
    pub fn key(&self) -> u16 {
        u16::from(self.hour) * 60 + u16::from(self.minute)
    }

    pub fn is_post_midnight(&self) -> bool {
        self.hour >= 24
    }
}

// ---------------------------------------------------------------------------
// ObservationRecord – one row of the long table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationRecord {
    #[serde(flatten)]
    pub station: StationKey,
    pub time_label: String,
    pub hour: u8,
    pub minute: u8,
    pub time_key: u16,
    /// `None` when the source cell was blank or not a number.
    pub congestion: Option<f64>,
}

// ---------------------------------------------------------------------------
// ReferenceDate – the calendar date a whole export represents
// ---------------------------------------------------------------------------

/// Only the ranges month 1–12 and day 1–31 are guaranteed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReferenceDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl ReferenceDate {
    /// Calendar-checked date, `None` for e.g. February 30th.
    pub fn to_naive_date(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

impl fmt::Display for ReferenceDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl Serialize for ReferenceDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// NormalizedDataset – the complete, immutable result of one load
// ---------------------------------------------------------------------------

/// The normalized long table plus everything known about its source.
#[derive(Debug, Clone)]
pub struct NormalizedDataset {
    pub source: PathBuf,
    /// Encoding that decoded the source file.
    pub encoding: SourceEncoding,
    pub reference_date: Option<ReferenceDate>,
    /// Time-label columns in chronological order.
    pub time_slots: Vec<TimeSlot>,
    /// Records in canonical order (see [`StationKey::sort_cmp`], then time key).
    pub records: Vec<ObservationRecord>,
    /// For each identifying column the sorted set of unique values.
    pub unique_values: BTreeMap<IdentifyingColumn, BTreeSet<String>>,
}

impl NormalizedDataset {
    /// Sort the records and build the per-column value index.
    pub fn from_records(
        source: PathBuf,
        encoding: SourceEncoding,
        reference_date: Option<ReferenceDate>,
        mut time_slots: Vec<TimeSlot>,
        mut records: Vec<ObservationRecord>,
    ) -> Self {
        records.sort_by(|a, b| {
            a.station
                .sort_cmp(&b.station)
                .then_with(|| a.time_key.cmp(&b.time_key))
        });
        time_slots.sort_by_key(TimeSlot::key);

        let mut unique_values: BTreeMap<IdentifyingColumn, BTreeSet<String>> = BTreeMap::new();
        for rec in &records {
            for column in IdentifyingColumn::ALL {
                unique_values
                    .entry(column)
                    .or_default()
                    .insert(rec.station.get(column).to_string());
            }
        }

        NormalizedDataset {
            source,
            encoding,
            reference_date,
            time_slots,
            records,
            unique_values,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(line: &str, number: &str, day: &str, dir: &str) -> StationKey {
        StationKey {
            weekday_type: day.into(),
            line: line.into(),
            station_number: number.into(),
            station_name: "역".into(),
            direction: dir.into(),
        }
    }

    fn record(station: StationKey, hour: u8, minute: u8) -> ObservationRecord {
        ObservationRecord {
            station,
            time_label: format!("{:02}시{:02}분", hour % 24, minute),
            hour,
            minute,
            time_key: u16::from(hour) * 60 + u16::from(minute),
            congestion: None,
        }
    }

    #[test]
    fn station_numbers_sort_numerically() {
        let a = key("2호선", "239", "평일", "상선");
        let b = key("2호선", "1239", "평일", "상선");
        assert_eq!(a.sort_cmp(&b), Ordering::Less);
    }

    #[test]
    fn from_records_sorts_by_station_then_time() {
        let late = record(key("1호선", "150", "평일", "상선"), 24, 30);
        let early = record(key("1호선", "150", "평일", "상선"), 5, 30);
        let other = record(key("1호선", "151", "평일", "상선"), 5, 30);
        let ds = NormalizedDataset::from_records(
            PathBuf::from("x.csv"),
            SourceEncoding::Utf8,
            None,
            Vec::new(),
            vec![other.clone(), late.clone(), early.clone()],
        );
        assert_eq!(ds.records, vec![early, late, other]);
        assert_eq!(
            ds.unique_values[&IdentifyingColumn::StationNumber]
                .iter()
                .collect::<Vec<_>>(),
            vec!["150", "151"]
        );
    }

    #[test]
    fn reference_date_display_and_calendar_check() {
        let date = ReferenceDate { year: 2025, month: 9, day: 30 };
        assert_eq!(date.to_string(), "2025-09-30");
        assert!(date.to_naive_date().is_some());
        let bogus = ReferenceDate { year: 2025, month: 2, day: 30 };
        assert!(bogus.to_naive_date().is_none());
    }

    #[test]
    fn post_midnight_slot_key() {
        let slot = TimeSlot { label: "00시30분".into(), hour: 24, minute: 30 };
        assert_eq!(slot.key(), 1470);
        assert!(slot.is_post_midnight());
    }
}
