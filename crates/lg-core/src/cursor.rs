//! # Cursor Paginator
//!
//! Cuts one page out of the sorted rows relative to a `lastActivity` cursor
//! and derives the cursors for the following fetches. Nothing is stored on
//! the server; a cursor is just the epoch millis of a boundary row.

use crate::lead::Lead;
use crate::params::Direction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Select one page from `rows`.
///
/// `Next` takes rows strictly older than `cursor` until `size` rows are in
/// the page, then keeps taking rows whose `lastActivity` equals the last
/// accepted row's, so a run of identical timestamps is never split across
/// pages. `Prev` takes every row strictly between `cursor` and `now`.
pub fn paginate(
    rows: Vec<Lead>,
    cursor: DateTime<Utc>,
    direction: Direction,
    size: usize,
    now: DateTime<Utc>,
) -> Vec<Lead> {
    let cursor = cursor.timestamp_millis();
    let mut page: Vec<Lead> = Vec::new();

    match direction {
        Direction::Next => {
            for row in rows {
                let ts = row.last_activity.timestamp_millis();
                let tied = page
                    .last()
                    .is_some_and(|last| last.last_activity.timestamp_millis() == ts);
                if (ts < cursor && page.len() < size) || tied {
                    page.push(row);
                }
            }
        }
        Direction::Prev => {
            let now = now.timestamp_millis();
            page.extend(rows.into_iter().filter(|row| {
                let ts = row.last_activity.timestamp_millis();
                ts > cursor && ts < now
            }));
        }
    }
    page
}

/// Cursors handed back with a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursors {
    /// First row of the page, or `now` when the page is empty.
    pub prev_cursor: i64,
    /// Last row of the page, or `None` once there is nothing left.
    pub next_cursor: Option<i64>,
}

pub fn cursors(page: &[Lead], now: DateTime<Utc>) -> Cursors {
    Cursors {
        prev_cursor: page
            .first()
            .map_or(now, |row| row.last_activity)
            .timestamp_millis(),
        next_cursor: page.last().map(|row| row.last_activity.timestamp_millis()),
    }
}
