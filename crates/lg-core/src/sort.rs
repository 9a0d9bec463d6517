//! # Sorter
//!
//! In-memory ordering by a named column. Each [`SortField`] has a typed
//! comparator, so rows are never compared through loose coercion.

use crate::lead::Lead;
use crate::params::SortSpec;
use std::cmp::Ordering;
use std::str::FromStr;

/// Outcome of comparing one column of two rows in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Compared {
    Both(Ordering),
    LeftOnly,
    RightOnly,
    Neither,
}

type Comparator = fn(&Lead, &Lead) -> Compared;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Id,
    CompanyId,
    VisitorId,
    Status,
    ClaimedBy,
    ClaimAt,
    CallStatus,
    VisitorName,
    CompanyName,
    LastActivity,
    ResponseTime,
    CallDuration,
    Outcome,
}

impl SortField {
    pub const ALL: &'static [SortField] = &[
        SortField::Id,
        SortField::CompanyId,
        SortField::VisitorId,
        SortField::Status,
        SortField::ClaimedBy,
        SortField::ClaimAt,
        SortField::CallStatus,
        SortField::VisitorName,
        SortField::CompanyName,
        SortField::LastActivity,
        SortField::ResponseTime,
        SortField::CallDuration,
        SortField::Outcome,
    ];

    /// Column id as it appears in `sort=<id>.<asc|desc>`.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::CompanyId => "companyId",
            SortField::VisitorId => "visitorId",
            SortField::Status => "status",
            SortField::ClaimedBy => "claimedBy",
            SortField::ClaimAt => "claimAt",
            SortField::CallStatus => "callStatus",
            SortField::VisitorName => "visitorName",
            SortField::CompanyName => "companyName",
            SortField::LastActivity => "lastActivity",
            SortField::ResponseTime => "responseTime",
            SortField::CallDuration => "callDuration",
            SortField::Outcome => "outcome",
        }
    }

    fn comparator(&self) -> Comparator {
        match self {
            SortField::Id => |a, b| compared(Some(a.id.as_str()), Some(b.id.as_str())),
            SortField::CompanyId => {
                |a, b| compared(Some(a.company_id.as_str()), Some(b.company_id.as_str()))
            }
            SortField::VisitorId => {
                |a, b| compared(Some(a.visitor_id.as_str()), Some(b.visitor_id.as_str()))
            }
            SortField::Status => {
                |a, b| compared(Some(a.status.as_str()), Some(b.status.as_str()))
            }
            SortField::ClaimedBy => {
                |a, b| compared(a.claimed_by.as_deref(), b.claimed_by.as_deref())
            }
            SortField::ClaimAt => |a, b| compared(a.claim_at, b.claim_at),
            SortField::CallStatus => {
                |a, b| compared(Some(a.call_status.as_str()), Some(b.call_status.as_str()))
            }
            SortField::VisitorName => {
                |a, b| compared(a.visitor_name.as_deref(), b.visitor_name.as_deref())
            }
            SortField::CompanyName => {
                |a, b| compared(a.company_name.as_deref(), b.company_name.as_deref())
            }
            SortField::LastActivity => {
                |a, b| compared(Some(a.last_activity), Some(b.last_activity))
            }
            SortField::ResponseTime => |a, b| compared(a.response_time, b.response_time),
            SortField::CallDuration => |a, b| compared(a.call_duration, b.call_duration),
            SortField::Outcome => {
                |a, b| compared(a.outcome.map(|o| o.as_str()), b.outcome.map(|o| o.as_str()))
            }
        }
    }
}

impl FromStr for SortField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortField::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or(())
    }
}

fn compared<T: Ord>(a: Option<T>, b: Option<T>) -> Compared {
    match (a, b) {
        (Some(x), Some(y)) => Compared::Both(x.cmp(&y)),
        (Some(_), None) => Compared::LeftOnly,
        (None, Some(_)) => Compared::RightOnly,
        (None, None) => Compared::Neither,
    }
}

/// Stable sort by `spec`. Without one the upstream order (newest first)
/// is kept. Rows missing the column go last in both directions.
pub fn sort(mut rows: Vec<Lead>, spec: Option<&SortSpec>) -> Vec<Lead> {
    let Some(spec) = spec else {
        return rows;
    };
    let compare = spec.field.comparator();
    let desc = spec.desc;

    rows.sort_by(|a, b| match compare(a, b) {
        Compared::Both(order) if desc => order.reverse(),
        Compared::Both(order) => order,
        Compared::LeftOnly => Ordering::Less,
        Compared::RightOnly => Ordering::Greater,
        Compared::Neither => Ordering::Equal,
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::from_millis;

    fn lead(id: &str, ts: i64, response_time: Option<u32>) -> Lead {
        let mut lead = Lead::new(id, from_millis(ts).unwrap());
        lead.response_time = response_time;
        lead
    }

    fn ids(rows: &[Lead]) -> Vec<&str> {
        rows.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_no_spec_keeps_order() {
        let rows = vec![lead("b", 2, None), lead("a", 1, None)];
        assert_eq!(ids(&sort(rows, None)), vec!["b", "a"]);
    }

    #[test]
    fn test_number_ascending_and_descending() {
        let rows = vec![lead("a", 0, Some(30)), lead("b", 0, Some(5)), lead("c", 0, Some(12))];
        let asc = SortSpec { field: SortField::ResponseTime, desc: false };
        let desc = SortSpec { field: SortField::ResponseTime, desc: true };
        assert_eq!(ids(&sort(rows.clone(), Some(&asc))), vec!["b", "c", "a"]);
        assert_eq!(ids(&sort(rows, Some(&desc))), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_numbers_are_not_compared_as_text() {
        let rows = vec![lead("a", 0, Some(100)), lead("b", 0, Some(9))];
        let asc = SortSpec { field: SortField::ResponseTime, desc: false };
        assert_eq!(ids(&sort(rows, Some(&asc))), vec!["b", "a"]);
    }

    #[test]
    fn test_missing_values_go_last_both_ways() {
        let rows = vec![lead("none", 0, None), lead("x", 0, Some(2)), lead("y", 0, Some(1))];
        let asc = SortSpec { field: SortField::ResponseTime, desc: false };
        let desc = SortSpec { field: SortField::ResponseTime, desc: true };
        assert_eq!(ids(&sort(rows.clone(), Some(&asc))), vec!["y", "x", "none"]);
        assert_eq!(ids(&sort(rows, Some(&desc))), vec!["x", "y", "none"]);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let rows = vec![lead("first", 5, None), lead("second", 5, None), lead("third", 1, None)];
        let asc = SortSpec { field: SortField::LastActivity, desc: false };
        assert_eq!(ids(&sort(rows, Some(&asc))), vec!["third", "first", "second"]);
    }

    #[test]
    fn test_field_ids_parse() {
        for field in SortField::ALL {
            assert_eq!(field.as_str().parse::<SortField>(), Ok(*field));
        }
        assert!("latency".parse::<SortField>().is_err());
    }
}
