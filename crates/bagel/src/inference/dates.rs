//! Date and timestamp auto-detection for generic columns.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::input::TableColumn;

/// Date-only formats, ISO first, then month-first before day-first.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%m/%d/%y",
    "%d/%m/%y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%B %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

/// Decides whether a column holds only dates or timestamps.
///
/// Parsing is tried against a fixed battery of ISO, US and European layouts,
/// RFC 3339 and RFC 2822 timestamps, and bare times of day. Bare numbers are
/// never read as dates.
#[derive(Debug, Clone, Default)]
pub struct DateDetector;

impl DateDetector {
    /// Create a new detector.
    pub fn new() -> Self {
        Self
    }

    /// Parse one value, returning the timestamp it denotes.
    pub fn parse(&self, value: &str) -> Option<NaiveDateTime> {
        let value = value.trim();
        if value.is_empty() || !value.chars().any(|c| !c.is_ascii_digit()) {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.naive_utc());
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
            return Some(dt.naive_utc());
        }

        for fmt in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
                return Some(dt);
            }
        }

        for fmt in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
                return date.and_hms_opt(0, 0, 0);
            }
        }

        for fmt in TIME_FORMATS {
            if let Ok(time) = NaiveTime::parse_from_str(value, fmt) {
                return Some(NaiveDate::MIN.and_time(time));
            }
        }

        None
    }

    /// Returns true if every non-missing value parses.
    ///
    /// A column without any non-missing value is not a date column.
    pub fn is_date_column(&self, column: &TableColumn) -> bool {
        let mut values = column.non_missing().peekable();
        if values.peek().is_none() {
            return false;
        }
        values.all(|v| self.parse(v).is_some())
    }
}
