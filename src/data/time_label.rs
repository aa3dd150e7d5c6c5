//! Time-label columns (`HH시MM분`) and the post-midnight convention.
//!
//! Exports list the service day as one column per slot, starting early in the
//! morning and running past midnight: `... 23시30분, 00시00분, 00시30분`.
//! Labels after the late-evening ones carry a small literal hour but belong
//! to the same service day, so they are shifted by 24 hours to keep the
//! ordering key monotonic.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use super::model::TimeSlot;

/// Hour and minute, e.g. `05시30분` or `8시30분`. Surrounding whitespace is
/// ignored; anything else fails with [`TimeFormatKind::Pattern`].
pub const TIME_LABEL_PATTERN: &str = r"^(\d{1,2})시(\d{2})분$";

static TIME_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(TIME_LABEL_PATTERN).expect("Invalid regex"));

/// Largest literal hour a label may carry (`24시00분` closes some days).
const MAX_LITERAL_HOUR: u8 = 24;

/// Literal hours that mark the start of the late-evening block.
const LATE_EVENING_HOURS: [u8; 2] = [23, 24];

/// Literal hours that are shifted once the late-evening block has been seen.
const POST_MIDNIGHT_HOURS: [u8; 2] = [0, 1];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeFormatKind {
    /// The label does not match [`TIME_LABEL_PATTERN`].
    Pattern,
    /// Hour above 24 or minute above 59.
    OutOfRange,
    /// The label does not come strictly after the previous column.
    OutOfSequence { previous: String },
}

impl fmt::Display for TimeFormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeFormatKind::Pattern => write!(f, "expected HH시MM분"),
            TimeFormatKind::OutOfRange => write!(f, "hour or minute out of range"),
            TimeFormatKind::OutOfSequence { previous } => {
                write!(f, "does not follow '{previous}' chronologically")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("bad time label '{label}': {kind}")]
pub struct TimeFormatError {
    pub label: String,
    pub kind: TimeFormatKind,
}

impl TimeFormatError {
    fn new(label: &str, kind: TimeFormatKind) -> Self {
        TimeFormatError {
            label: label.to_string(),
            kind,
        }
    }
}

/// Literal hour and minute of a label, without any post-midnight shift.
pub fn parse_time_label(label: &str) -> Result<(u8, u8), TimeFormatError> {
    let caps = TIME_LABEL_RE
        .captures(label.trim())
        .ok_or_else(|| TimeFormatError::new(label, TimeFormatKind::Pattern))?;

    let hour: u8 = caps[1]
        .parse()
        .map_err(|_| TimeFormatError::new(label, TimeFormatKind::OutOfRange))?;
    let minute: u8 = caps[2]
        .parse()
        .map_err(|_| TimeFormatError::new(label, TimeFormatKind::OutOfRange))?;

    if hour > MAX_LITERAL_HOUR || minute > 59 {
        return Err(TimeFormatError::new(label, TimeFormatKind::OutOfRange));
    }
    Ok((hour, minute))
}

/// Parse one label. `after_late_evening` tells whether a 23- or 24-hour
/// label precedes it in the header; if so, literal hours 00 and 01 become
/// 24 and 25.
pub fn parse_time_column(label: &str, after_late_evening: bool) -> Result<TimeSlot, TimeFormatError> {
    let (hour, minute) = parse_time_label(label)?;
    let hour = if after_late_evening && POST_MIDNIGHT_HOURS.contains(&hour) {
        hour + 24
    } else {
        hour
    };
    Ok(TimeSlot {
        label: label.to_string(),
        hour,
        minute,
    })
}

/// Parse every time column of a header, in header order.
///
/// The header must be strictly chronological once the post-midnight shift is
/// applied; a duplicated or reordered label is a [`TimeFormatError`] rather
/// than a guess.
pub fn parse_time_header<S: AsRef<str>>(labels: &[S]) -> Result<Vec<TimeSlot>, TimeFormatError> {
    let mut slots: Vec<TimeSlot> = Vec::with_capacity(labels.len());
    let mut after_late_evening = false;

    for label in labels {
        let label = label.as_ref();
        let slot = parse_time_column(label, after_late_evening)?;

        if let Some(prev) = slots.last() {
            if slot.key() <= prev.key() {
                return Err(TimeFormatError::new(
                    label,
                    TimeFormatKind::OutOfSequence {
                        previous: prev.label.clone(),
                    },
                ));
            }
        }
        if LATE_EVENING_HOURS.contains(&slot.hour) {
            after_late_evening = true;
        }
        slots.push(slot);
    }
    Ok(slots)
}
