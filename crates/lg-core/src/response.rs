//! # Response Assembler
//!
//! Runs the full pipeline for one request and assembles the page, its
//! metadata and the cursors:
//!
//! ```text
//! rows ─▶ filter ─┬─▶ chart buckets
//!                 ├─▶ facets
//!                 ├─▶ percentiles
//!                 └─▶ sort ─▶ paginate ─▶ cursors
//! ```

use crate::chart::{self, ChartBucket};
use crate::cursor;
use crate::facets::{self, Facets};
use crate::filter;
use crate::lead::Lead;
use crate::params::SearchParams;
use crate::percentile::{Distribution, Percentiles};
use crate::sort;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A lead as served, annotated with the percentile rank of its response
/// time within the filtered rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadRow {
    #[serde(flatten)]
    pub lead: Lead,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentile: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub current_percentiles: Percentiles,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    /// Rows before filtering.
    pub total_row_count: usize,
    /// Rows after filtering, before pagination.
    pub filter_row_count: usize,
    pub chart_data: Vec<ChartBucket>,
    pub facets: Facets,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadsResponse {
    pub data: Vec<LeadRow>,
    pub meta: Meta,
    pub prev_cursor: i64,
    pub next_cursor: Option<i64>,
}

/// Run the pipeline over `rows` (upstream order, newest first) for one
/// request. `now` bounds live (`prev`) pages and stands in for the cursor
/// of an empty page.
pub fn execute(rows: Vec<Lead>, params: &SearchParams, now: DateTime<Utc>) -> LeadsResponse {
    let total_row_count = rows.len();
    let filtered = filter::filter(rows, params);
    let filter_row_count = filtered.len();

    let chart_data = chart::bucket(&filtered, params.last_activity.as_ref());
    let facets = facets::facets(&filtered);
    let distribution = Distribution::new(
        filtered
            .iter()
            .filter_map(|row| row.response_time)
            .map(f64::from),
    );

    let sorted = sort::sort(filtered, params.sort.as_ref());
    let page = cursor::paginate(
        sorted,
        params.cursor,
        params.direction,
        params.size as usize,
        now,
    );
    let cursors = cursor::cursors(&page, now);

    let data = page
        .into_iter()
        .map(|lead| LeadRow {
            percentile: lead
                .response_time
                .filter(|v| *v != 0)
                .map(|v| distribution.rank(f64::from(v))),
            lead,
        })
        .collect();

    LeadsResponse {
        data,
        meta: Meta {
            total_row_count,
            filter_row_count,
            chart_data,
            facets,
            metadata: Metadata {
                current_percentiles: distribution.checkpoints(),
            },
        },
        prev_cursor: cursors.prev_cursor,
        next_cursor: cursors.next_cursor,
    }
}
