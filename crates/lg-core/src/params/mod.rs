//! # Search Parameters
//!
//! The typed search state of the leads table. It is rebuilt from the URL
//! query string on every request (see [`codec`]) and never mutated while the
//! pipeline runs.

pub mod codec;

pub use codec::{cache_key, decode, decode_with_page_size, encode};

use crate::lead::{CallStatus, LeadStatus, Outcome};
use crate::sort::SortField;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Joins members of set-membership filters (`status=open,claimed`).
pub const ARRAY_DELIMITER: char = ',';
/// Joins the one or two numeric tokens of slider filters (`responseTime=10~60`).
pub const SLIDER_DELIMITER: char = '~';
/// Joins the one or two epoch-millis tokens of date filters (`claimAt=1700000000000:1700086400000`).
pub const RANGE_DELIMITER: char = ':';
/// Separates the field id from the direction in `sort=lastActivity.desc`.
pub const SORT_DELIMITER: char = '.';

pub const DEFAULT_PAGE_SIZE: u32 = 40;

/// Pagination direction relative to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Older rows, strictly before the cursor.
    #[default]
    Next,
    /// Newer rows, strictly after the cursor (live mode).
    Prev,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Next => "next",
            Direction::Prev => "prev",
        }
    }
}

impl FromStr for Direction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "next" => Ok(Direction::Next),
            "prev" => Ok(Direction::Prev),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Slider filter: one token means exact match, two mean an inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericFilter {
    Exact(i64),
    Between(i64, i64),
}

impl NumericFilter {
    pub fn matches(&self, value: i64) -> bool {
        match *self {
            NumericFilter::Exact(v) => value == v,
            NumericFilter::Between(lo, hi) => value >= lo && value <= hi,
        }
    }
}

/// Date filter: one token means the same UTC calendar day, two mean an
/// inclusive range compared in epoch millis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    Day(DateTime<Utc>),
    Between(DateTime<Utc>, DateTime<Utc>),
}

impl DateFilter {
    pub fn matches(&self, value: &DateTime<Utc>) -> bool {
        match self {
            DateFilter::Day(day) => crate::time::same_utc_day(value, day),
            DateFilter::Between(lo, hi) => {
                let ms = value.timestamp_millis();
                ms >= lo.timestamp_millis() && ms <= hi.timestamp_millis()
            }
        }
    }

    /// Time range used for chart bucketing; a single day is widened to
    /// `[day, day + 1 day)`.
    pub fn chart_range(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        match *self {
            DateFilter::Day(day) => (
                day,
                day.checked_add_signed(chrono::Duration::days(1))
                    .unwrap_or(DateTime::<Utc>::MAX_UTC),
            ),
            DateFilter::Between(lo, hi) => (lo, hi),
        }
    }
}

/// Requested ordering. The comparator is fixed by `field` when the sort parameter is
/// parsed, not when rows are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub desc: bool,
}

/// Parsed query state for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    // Filters
    pub status: Option<Vec<LeadStatus>>,
    pub call_status: Option<Vec<CallStatus>>,
    pub outcome: Option<Vec<Outcome>>,
    pub company_id: Option<String>,
    pub visitor_id: Option<String>,
    pub claimed_by: Option<String>,
    pub response_time: Option<NumericFilter>,
    pub call_duration: Option<NumericFilter>,
    pub claim_at: Option<DateFilter>,
    pub last_activity: Option<DateFilter>,

    // Sorting and pagination
    pub sort: Option<SortSpec>,
    pub size: u32,
    pub direction: Direction,
    pub cursor: DateTime<Utc>,
    pub live: bool,

    /// Selected row; volatile, so it never takes part in the cache key.
    pub id: Option<String>,
}

impl SearchParams {
    /// Empty filter set with the documented defaults; the cursor is `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            status: None,
            call_status: None,
            outcome: None,
            company_id: None,
            visitor_id: None,
            claimed_by: None,
            response_time: None,
            call_duration: None,
            claim_at: None,
            last_activity: None,
            sort: None,
            size: DEFAULT_PAGE_SIZE,
            direction: Direction::Next,
            cursor: crate::time::truncate_millis(now),
            live: false,
            id: None,
        }
    }

    pub fn has_filters(&self) -> bool {
        self.status.is_some()
            || self.call_status.is_some()
            || self.outcome.is_some()
            || self.company_id.is_some()
            || self.visitor_id.is_some()
            || self.claimed_by.is_some()
            || self.response_time.is_some()
            || self.call_duration.is_some()
            || self.claim_at.is_some()
            || self.last_activity.is_some()
    }
}

impl Default for SearchParams {
    fn default() -> Self {
        Self::new(crate::time::now_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::from_millis;

    #[test]
    fn test_delimiters_are_distinct() {
        let all = [ARRAY_DELIMITER, SLIDER_DELIMITER, RANGE_DELIMITER];
        assert_ne!(all[0], all[1]);
        assert_ne!(all[1], all[2]);
        assert_ne!(all[0], all[2]);
    }

    #[test]
    fn test_numeric_filter_exact_and_range() {
        assert!(NumericFilter::Exact(30).matches(30));
        assert!(!NumericFilter::Exact(30).matches(31));
        assert!(NumericFilter::Between(10, 20).matches(10));
        assert!(NumericFilter::Between(10, 20).matches(20));
        assert!(!NumericFilter::Between(10, 20).matches(21));
    }

    #[test]
    fn test_single_day_widens_chart_range() {
        let day = from_millis(1_700_000_000_000).unwrap();
        let (lo, hi) = DateFilter::Day(day).chart_range();
        assert_eq!(lo, day);
        assert_eq!((hi - lo).num_milliseconds(), 86_400_000);

        let last = DateTime::<Utc>::MAX_UTC;
        assert_eq!(DateFilter::Day(last).chart_range(), (last, last));
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let lo = from_millis(1_000).unwrap();
        let hi = from_millis(2_000).unwrap();
        let filter = DateFilter::Between(lo, hi);
        assert!(filter.matches(&lo));
        assert!(filter.matches(&hi));
        assert!(!filter.matches(&from_millis(2_001).unwrap()));
    }

    #[test]
    fn test_defaults() {
        let now = from_millis(5_000).unwrap();
        let params = SearchParams::new(now);
        assert_eq!(params.size, 40);
        assert_eq!(params.direction, Direction::Next);
        assert_eq!(params.cursor, now);
        assert!(!params.live);
        assert!(!params.has_filters());
    }
}
