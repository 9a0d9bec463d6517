//! # Filter Engine
//!
//! Applies the filters of a [`SearchParams`] to a row set. Every present
//! filter must pass (logical AND); rows lacking a filtered field are
//! excluded. Sorting and pagination fields are not filters and are ignored
//! here.

use crate::lead::Lead;
use crate::params::SearchParams;

/// Keep the rows that pass every filter, preserving their order.
pub fn filter(rows: Vec<Lead>, params: &SearchParams) -> Vec<Lead> {
    if !params.has_filters() {
        return rows;
    }
    rows.into_iter().filter(|row| matches(row, params)).collect()
}

/// Whether a single row passes all filters of `params`.
pub fn matches(row: &Lead, params: &SearchParams) -> bool {
    // Set membership
    if let Some(statuses) = &params.status {
        if !statuses.contains(&row.status) {
            return false;
        }
    }
    if let Some(call_statuses) = &params.call_status {
        if !call_statuses.contains(&row.call_status) {
            return false;
        }
    }
    if let Some(outcomes) = &params.outcome {
        match row.outcome {
            Some(outcome) if outcomes.contains(&outcome) => {}
            _ => return false,
        }
    }

    // Exact strings
    if let Some(company_id) = &params.company_id {
        if &row.company_id != company_id {
            return false;
        }
    }
    if let Some(visitor_id) = &params.visitor_id {
        if &row.visitor_id != visitor_id {
            return false;
        }
    }
    if let Some(claimed_by) = &params.claimed_by {
        if row.claimed_by.as_ref() != Some(claimed_by) {
            return false;
        }
    }

    // Numeric sliders
    if let Some(range) = &params.response_time {
        match row.response_time {
            Some(value) if range.matches(i64::from(value)) => {}
            _ => return false,
        }
    }
    if let Some(range) = &params.call_duration {
        match row.call_duration {
            Some(value) if range.matches(i64::from(value)) => {}
            _ => return false,
        }
    }

    // Dates
    if let Some(range) = &params.claim_at {
        match &row.claim_at {
            Some(value) if range.matches(value) => {}
            _ => return false,
        }
    }
    if let Some(range) = &params.last_activity {
        if !range.matches(&row.last_activity) {
            return false;
        }
    }

    true
}
